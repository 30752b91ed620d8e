use axum::{
    Extension,
    Form,
    extract::{Request, State},
    middleware::Next,
    response::{Html, IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use std::sync::Arc;
use tower_sessions::Session;

use super::{AppError, AppState, render};
use crate::db::User;

/// Session key holding the authenticated user's id.
const SESSION_USER_KEY: &str = "user_id";

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Deserialize)]
pub struct CredentialForm {
    pub username: String,
    pub password: String,
}

/// Identity attached to every request by [`load_user`]. `None` means the
/// request is anonymous.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub Option<User>);

impl CurrentUser {
    #[must_use]
    pub const fn user(&self) -> Option<&User> {
        self.0.as_ref()
    }
}

// ============================================================================
// Middleware
// ============================================================================

/// Runs before every request: resolves the session's `user_id` to a user row
/// and attaches it to the request. A missing key, an unreadable session, or
/// an id that no longer matches a row all attach the anonymous marker; the
/// cookie itself is left alone.
pub async fn load_user(
    State(state): State<Arc<AppState>>,
    session: Session,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let current = if let Ok(Some(user_id)) = session.get::<i32>(SESSION_USER_KEY).await {
        state
            .store()
            .find_user_by_id(user_id)
            .await
            .map_err(AppError::from)?
    } else {
        None
    };

    if let Some(user) = &current {
        tracing::Span::current().record("user_id", user.id);
    }

    request.extensions_mut().insert(CurrentUser(current));
    Ok(next.run(request).await)
}

/// Guard for protected views: anonymous requests are redirected to the login
/// form without the wrapped handler ever running.
pub async fn require_login(request: Request, next: Next) -> Response {
    let logged_in = request
        .extensions()
        .get::<CurrentUser>()
        .is_some_and(|current| current.user().is_some());

    if logged_in {
        next.run(request).await
    } else {
        Redirect::to("/auth/login").into_response()
    }
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /auth/register
pub async fn register_form(
    Extension(current): Extension<CurrentUser>,
) -> Html<String> {
    register_page(current.user(), None)
}

/// POST /auth/register
/// Validates the form, creates the user, and redirects to the login form.
pub async fn register(
    State(state): State<Arc<AppState>>,
    Extension(current): Extension<CurrentUser>,
    Form(form): Form<CredentialForm>,
) -> Result<Response, AppError> {
    match state
        .credentials()
        .register(&form.username, &form.password)
        .await
    {
        Ok(_) => Ok(Redirect::to("/auth/login").into_response()),
        Err(err) if err.is_user_error() => {
            Ok(register_page(current.user(), Some(&err.to_string())).into_response())
        }
        Err(err) => Err(AppError::internal(err.to_string())),
    }
}

/// GET /auth/login
pub async fn login_form(Extension(current): Extension<CurrentUser>) -> Html<String> {
    login_page(current.user(), None)
}

/// POST /auth/login
/// Verifies credentials, then clears and repopulates the session before
/// redirecting to the landing page.
pub async fn login(
    State(state): State<Arc<AppState>>,
    session: Session,
    Extension(current): Extension<CurrentUser>,
    Form(form): Form<CredentialForm>,
) -> Result<Response, AppError> {
    match state
        .credentials()
        .authenticate(&form.username, &form.password)
        .await
    {
        Ok(user) => {
            session.clear().await;
            session
                .insert(SESSION_USER_KEY, user.id)
                .await
                .map_err(|e| AppError::session(e.to_string()))?;

            tracing::info!("User {} logged in", user.username);

            Ok(Redirect::to("/").into_response())
        }
        Err(err) if err.is_user_error() => {
            Ok(login_page(current.user(), Some(&err.to_string())).into_response())
        }
        Err(err) => Err(AppError::internal(err.to_string())),
    }
}

/// GET /auth/logout
/// Clears all session state unconditionally; always redirects home.
pub async fn logout(session: Session) -> Redirect {
    let _ = session.flush().await;
    Redirect::to("/")
}

// ============================================================================
// Helpers
// ============================================================================

fn register_page(user: Option<&User>, error: Option<&str>) -> Html<String> {
    let body = format!(
        "{}{}",
        render::flash(error),
        render::credential_form("/auth/register", "Register")
    );
    render::layout("Register", user, &body)
}

fn login_page(user: Option<&User>, error: Option<&str>) -> Html<String> {
    let body = format!(
        "{}{}",
        render::flash(error),
        render::credential_form("/auth/login", "Log In")
    );
    render::layout("Log In", user, &body)
}
