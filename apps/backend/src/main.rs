use std::sync::Arc;

use actix_web::{web, App, HttpServer};
use picmatch::config::db::StoreKind;
use picmatch::domain::MatchRules;
use picmatch::infra::state::build_state;
use picmatch::middleware::RequestTrace;
use picmatch::routes;
use picmatch::services::match_flow::OrchestratorConfig;
use picmatch::services::notifications::{BroadcastEmitter, FanoutEmitter, TracingEmitter};
use picmatch::services::realtime::RedisEmitter;
use picmatch::telemetry;
use tracing::{error, info};

fn exit_with(message: impl std::fmt::Display) -> ! {
    error!("{message}");
    eprintln!("{message}");
    std::process::exit(1);
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    telemetry::init_tracing();

    let host = std::env::var("BACKEND_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
    let port = std::env::var("BACKEND_PORT")
        .unwrap_or_else(|_| "3001".to_string())
        .parse::<u16>()
        .unwrap_or_else(|_| exit_with("BACKEND_PORT must be a valid port number"));

    let store = StoreKind::from_env().unwrap_or_else(|e| exit_with(e));
    let rules = MatchRules::from_env().unwrap_or_else(|e| exit_with(e));
    let config = OrchestratorConfig::from_env().unwrap_or_else(|e| exit_with(e));

    let mut emitter = FanoutEmitter::new()
        .with(Arc::new(TracingEmitter))
        .with(Arc::new(BroadcastEmitter::new(256)));
    if let Ok(redis_url) = std::env::var("REDIS_URL") {
        match RedisEmitter::connect(&redis_url).await {
            Ok(redis) => {
                info!("Realtime publisher connected");
                emitter = emitter.with(Arc::new(redis));
            }
            Err(e) => exit_with(format!("Failed to connect to Redis: {e}")),
        }
    }

    let state = build_state()
        .with_store(store)
        .with_rules(rules)
        .with_config(config)
        .with_emitter(Arc::new(emitter))
        .build()
        .await
        .unwrap_or_else(|e| exit_with(format!("Failed to build application state: {e}")));

    info!(%host, port, store = ?store, "Starting picmatch backend");
    let data = web::Data::new(state);
    let server_data = data.clone();

    let result = HttpServer::new(move || {
        App::new()
            .wrap(RequestTrace)
            .app_data(server_data.clone())
            .configure(routes::configure)
    })
    .bind((host.as_str(), port))?
    .run()
    .await;

    data.shutdown();
    info!("Server stopped");
    result
}
