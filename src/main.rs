use std::net::SocketAddr;
use std::sync::Arc;

use axum::http::{header, HeaderValue, Method};
use boutique_api::{config, db, events, handlers::AppServices, AppState};
use tokio::signal;
use tokio::sync::mpsc;
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tower_sessions::{cookie::time::Duration, Expiry, MemoryStore, SessionManagerLayer};
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let app_config = config::load_config()?;
    config::init_tracing(app_config.log_level(), app_config.log_json);

    let db_pool = db::establish_connection_from_app_config(&app_config).await?;
    if app_config.auto_migrate {
        db::run_migrations(&db_pool).await?;
    }
    db::check_connection(&db_pool).await?;
    let db = Arc::new(db_pool);

    let (event_tx, event_rx) = mpsc::channel(1024);
    let event_sender = events::EventSender::new(event_tx);
    tokio::spawn(events::process_events(event_rx));

    let services = AppServices::new(db.clone(), Arc::new(event_sender.clone()), &app_config);
    let state = Arc::new(AppState {
        db,
        config: app_config.clone(),
        event_sender,
        services,
    });

    let session_store = MemoryStore::default();
    let session_layer = SessionManagerLayer::new(session_store)
        .with_name("boutique_session")
        .with_secure(app_config.session_secure)
        .with_expiry(Expiry::OnInactivity(Duration::seconds(
            app_config.session_expiry_secs,
        )));

    let cors_layer = build_cors_layer(&app_config)?;

    let app = boutique_api::api_routes()
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(cors_layer)
        .layer(session_layer)
        .with_state(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], app_config.port));
    info!(%addr, environment = %app_config.environment, "boutique-api listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("server stopped");
    Ok(())
}

fn build_cors_layer(
    app_config: &config::AppConfig,
) -> Result<CorsLayer, Box<dyn std::error::Error>> {
    let methods = [
        Method::GET,
        Method::POST,
        Method::PUT,
        Method::DELETE,
        Method::OPTIONS,
    ];
    let headers = [header::CONTENT_TYPE, header::ACCEPT];

    match &app_config.cors_allowed_origins {
        Some(origins) => {
            let parsed: Result<Vec<HeaderValue>, _> = origins
                .split(',')
                .map(str::trim)
                .filter(|o| !o.is_empty())
                .map(HeaderValue::from_str)
                .collect();
            Ok(CorsLayer::new()
                .allow_origin(parsed?)
                .allow_methods(methods)
                .allow_headers(headers)
                .allow_credentials(true))
        }
        // cookie sessions rule out a wildcard origin with credentials, so
        // the default is same-origin only
        None => {
            if !app_config.is_development() {
                error!("no cors_allowed_origins configured; cross-origin requests will fail");
            }
            Ok(CorsLayer::new()
                .allow_methods(methods)
                .allow_headers(headers))
        }
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = %e, "failed to install Ctrl+C handler");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => error!(error = %e, "failed to install SIGTERM handler"),
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("received Ctrl+C, shutting down"),
        _ = terminate => info!("received SIGTERM, shutting down"),
    }
}
