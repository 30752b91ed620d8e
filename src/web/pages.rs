use axum::{
    Extension,
    response::{Html, IntoResponse, Redirect, Response},
};

use super::{auth::CurrentUser, render};

/// GET /
/// Public landing page; also the redirect target for login and logout.
pub async fn index(Extension(current): Extension<CurrentUser>) -> Html<String> {
    let body = match current.user() {
        Some(user) => format!(
            "<p>Welcome back, {}.</p><p><a href=\"/me\">Your account</a></p>",
            html_escape::encode_text(&user.username)
        ),
        None => "<p><a href=\"/auth/login\">Log in</a> or \
                 <a href=\"/auth/register\">register</a> to get started.</p>"
            .to_string(),
    };

    render::layout("Welcome", current.user(), &body)
}

/// GET /hello
/// Unauthenticated smoke-test endpoint.
pub async fn hello() -> &'static str {
    "Hello World!"
}

/// GET /me
/// Protected account page; `require_login` guards the route, so an
/// anonymous request never reaches this handler.
pub async fn me(Extension(current): Extension<CurrentUser>) -> Response {
    match current.user() {
        Some(user) => {
            let body = format!(
                "<p>Logged in as <strong>{}</strong> (user #{}).</p>",
                html_escape::encode_text(&user.username),
                user.id
            );
            render::layout("Your Account", Some(user), &body).into_response()
        }
        None => Redirect::to("/auth/login").into_response(),
    }
}
