use axum::{Router, middleware, routing::get};
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tower_sessions::{Expiry, MemoryStore, SessionManagerLayer, cookie::Key};

use time;

use crate::config::Config;
use crate::db::Store;
use crate::services::CredentialService;

pub mod auth;
mod error;
mod pages;
mod render;

pub use error::AppError;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,

    pub store: Store,

    credentials: CredentialService,
}

impl AppState {
    #[must_use]
    pub const fn config(&self) -> &Config {
        &self.config
    }

    #[must_use]
    pub const fn store(&self) -> &Store {
        &self.store
    }

    #[must_use]
    pub const fn credentials(&self) -> &CredentialService {
        &self.credentials
    }
}

pub async fn create_app_state(config: Config) -> anyhow::Result<Arc<AppState>> {
    let store = Store::with_pool_options(
        &config.database_url(),
        config.general.max_db_connections,
        config.general.min_db_connections,
    )
    .await?;
    let credentials = CredentialService::new(store.clone());

    Ok(Arc::new(AppState {
        config,
        store,
        credentials,
    }))
}

pub fn router(state: Arc<AppState>) -> Router {
    let session_store = MemoryStore::default();
    let session_layer = SessionManagerLayer::new(session_store)
        .with_signed(session_key(&state.config.server.secret_key))
        .with_secure(state.config.server.secure_cookies)
        .with_same_site(tower_sessions::cookie::SameSite::Lax)
        .with_expiry(Expiry::OnInactivity(time::Duration::minutes(60)));

    let protected_routes = Router::new()
        .route("/me", get(pages::me))
        .route_layer(middleware::from_fn(auth::require_login));

    Router::new()
        .route("/", get(pages::index))
        .route("/hello", get(pages::hello))
        .route(
            "/auth/register",
            get(auth::register_form).post(auth::register),
        )
        .route("/auth/login", get(auth::login_form).post(auth::login))
        .route("/auth/logout", get(auth::logout))
        .merge(protected_routes)
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth::load_user,
        ))
        .layer(session_layer)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Derive the cookie signing key from the configured secret. `cookie::Key`
/// wants at least 64 bytes of material, so short secrets are cycled to fill
/// the buffer.
fn session_key(secret: &str) -> Key {
    let mut material = [0u8; 64];
    for (slot, byte) in material.iter_mut().zip(secret.bytes().cycle()) {
        *slot = byte;
    }
    Key::from(&material)
}
