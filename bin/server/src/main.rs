mod config;
mod error;
mod routes;
mod state;

use config::ServerConfig;
use quizpress_access::{AuthCoordinator, RosterManager};
use quizpress_backend::{DocumentClient, IdentityClient};
use quizpress_catalog::QuizRepository;
use state::AppState;
use std::sync::Arc;
use tower_http::services::ServeDir;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ServerConfig::from_env().expect("failed to load configuration");
    tracing::info!("Loaded configuration");

    let provider = Arc::new(IdentityClient::new(config.backend.clone()));
    let documents = Arc::new(DocumentClient::new(config.backend, provider.clone()));

    let coordinator = Arc::new(AuthCoordinator::new(provider.clone(), documents.clone()));
    // Enforce on every session change for the life of the process.
    let _listener = coordinator.listen();

    let mut roster = RosterManager::new(provider, documents.clone());
    if let Some(email) = config.roster.protected_email {
        roster = roster.with_protected_email(email);
    }

    let app_state = AppState {
        coordinator,
        roster: Arc::new(roster),
        quizzes: Arc::new(QuizRepository::new(documents)),
    };

    let app = routes::router(app_state).fallback_service(ServeDir::new(&config.assets_dir));

    let listener = tokio::net::TcpListener::bind(&config.listen_addr)
        .await
        .expect("failed to bind to address");

    tracing::info!("listening on http://{}", config.listen_addr);

    axum::serve(listener, app.into_make_service())
        .await
        .expect("server error");
}
