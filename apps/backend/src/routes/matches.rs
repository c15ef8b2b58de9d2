use std::time::Duration;

use actix_web::http::header::ETAG;
use actix_web::{web, HttpRequest, HttpResponse};
use serde::Deserialize;

use crate::domain::{ImageRef, NewMatch, PlayerId};
use crate::error::AppError;
use crate::extractors::{MatchIdPath, RoundOrdinalPath, ValidatedJson};
use crate::http::etag::{if_none_match_hits, match_etag};
use crate::repos::MatchSnapshot;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateMatchRequest {
    pub creator_id: PlayerId,
    pub invited_ids: Vec<PlayerId>,
    #[serde(default)]
    pub total_rounds: Option<u16>,
    #[serde(default)]
    pub phase_timeout_secs: Option<u64>,
}

#[derive(Debug, Deserialize)]
pub struct InvitationRequest {
    pub player_id: PlayerId,
    pub accept: bool,
}

/// Body for both submissions and votes.
#[derive(Debug, Deserialize)]
pub struct ImageRequest {
    pub player_id: PlayerId,
    pub image: String,
}

fn snapshot_response(mut builder: actix_web::HttpResponseBuilder, snapshot: &MatchSnapshot) -> HttpResponse {
    builder
        .insert_header((ETAG, match_etag(snapshot.aggregate.id, snapshot.version)))
        .json(snapshot)
}

async fn create_match(
    state: web::Data<AppState>,
    body: ValidatedJson<CreateMatchRequest>,
) -> Result<HttpResponse, AppError> {
    let body = body.into_inner();
    let snapshot = state
        .orchestrator()
        .create_match(NewMatch {
            creator: body.creator_id,
            invited: body.invited_ids,
            total_rounds: body.total_rounds,
            phase_timeout: body.phase_timeout_secs.map(Duration::from_secs),
        })
        .await?;
    Ok(snapshot_response(HttpResponse::Created(), &snapshot))
}

/// Current snapshot; honours `If-None-Match` with 304.
async fn get_match(
    req: HttpRequest,
    match_id: MatchIdPath,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let snapshot = state.orchestrator().get_match(match_id.0).await?;
    let etag = match_etag(snapshot.aggregate.id, snapshot.version);
    if if_none_match_hits(req.headers(), &etag) {
        return Ok(HttpResponse::NotModified()
            .insert_header((ETAG, etag))
            .finish());
    }
    Ok(snapshot_response(HttpResponse::Ok(), &snapshot))
}

async fn respond_to_invitation(
    match_id: MatchIdPath,
    state: web::Data<AppState>,
    body: ValidatedJson<InvitationRequest>,
) -> Result<HttpResponse, AppError> {
    let snapshot = state
        .orchestrator()
        .respond_to_invitation(match_id.0, body.player_id, body.accept)
        .await?;
    Ok(snapshot_response(HttpResponse::Ok(), &snapshot))
}

async fn submit_image(
    match_id: MatchIdPath,
    state: web::Data<AppState>,
    body: ValidatedJson<ImageRequest>,
) -> Result<HttpResponse, AppError> {
    let body = body.into_inner();
    let snapshot = state
        .orchestrator()
        .submit_image(match_id.0, body.player_id, ImageRef::new(body.image))
        .await?;
    Ok(snapshot_response(HttpResponse::Ok(), &snapshot))
}

async fn cast_vote(
    match_id: MatchIdPath,
    state: web::Data<AppState>,
    body: ValidatedJson<ImageRequest>,
) -> Result<HttpResponse, AppError> {
    let body = body.into_inner();
    let snapshot = state
        .orchestrator()
        .cast_vote(match_id.0, body.player_id, ImageRef::new(body.image))
        .await?;
    Ok(snapshot_response(HttpResponse::Ok(), &snapshot))
}

async fn get_round(
    match_id: MatchIdPath,
    ordinal: RoundOrdinalPath,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let round = state.orchestrator().get_round(match_id.0, ordinal.0).await?;
    Ok(HttpResponse::Ok().json(round))
}

async fn get_standings(
    match_id: MatchIdPath,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let table = state.orchestrator().standings(match_id.0).await?;
    Ok(HttpResponse::Ok().json(table))
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("").route(web::post().to(create_match)))
        .service(web::resource("/{match_id}").route(web::get().to(get_match)))
        .service(
            web::resource("/{match_id}/invitation").route(web::post().to(respond_to_invitation)),
        )
        .service(web::resource("/{match_id}/submissions").route(web::post().to(submit_image)))
        .service(web::resource("/{match_id}/votes").route(web::post().to(cast_vote)))
        .service(web::resource("/{match_id}/rounds/{ordinal}").route(web::get().to(get_round)))
        .service(web::resource("/{match_id}/standings").route(web::get().to(get_standings)));
}
