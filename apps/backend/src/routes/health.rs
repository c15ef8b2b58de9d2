use actix_web::{web, HttpResponse};
use migration::latest_migration;
use sea_orm::ConnectionTrait;
use serde::Serialize;
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

use crate::state::AppState;

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    app_version: &'static str,
    store: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    store_error: Option<String>,
    migrations: String,
    armed_deadlines: usize,
    time: String,
}

async fn health(state: web::Data<AppState>) -> HttpResponse {
    let time = OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .unwrap_or_else(|_| "unknown".to_string());

    let (store, store_error, migrations) = match state.db() {
        None => ("in_memory".to_string(), None, "n/a".to_string()),
        Some(db) => {
            let ping = db
                .execute_unprepared("SELECT 1")
                .await
                .map_err(|e| format!("DB query failed: {e}"));
            match ping {
                Ok(_) => {
                    let migrations = match latest_migration(db).await {
                        Ok(Some(name)) => name,
                        Ok(None) => "no_migrations".to_string(),
                        Err(_) => "unknown".to_string(),
                    };
                    ("ok".to_string(), None, migrations)
                }
                Err(e) => ("error".to_string(), Some(e), "unknown".to_string()),
            }
        }
    };

    HttpResponse::Ok().json(HealthResponse {
        status: "ok",
        app_version: env!("CARGO_PKG_VERSION"),
        store,
        store_error,
        migrations,
        armed_deadlines: state.orchestrator().armed_deadlines(),
        time,
    })
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("", web::get().to(health));
}
