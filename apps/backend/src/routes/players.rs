use actix_web::{web, HttpResponse};

use crate::domain::PlayerId;
use crate::error::AppError;
use crate::errors::ErrorCode;
use crate::state::AppState;

/// Every match the player is rostered in, newest first.
async fn list_matches(
    path: web::Path<String>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let raw = path.into_inner();
    let player_id = raw.parse::<PlayerId>().map_err(|_| {
        AppError::bad_request(ErrorCode::InvalidPlayerId, format!("Invalid player id: {raw}"))
    })?;
    let matches = state
        .orchestrator()
        .list_matches_for_player(player_id)
        .await?;
    Ok(HttpResponse::Ok().json(matches))
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/{player_id}/matches").route(web::get().to(list_matches)));
}
