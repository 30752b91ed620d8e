//! Minimal server-side HTML rendering. Everything user-controlled goes
//! through `html_escape` before landing in a page.

use axum::response::Html;
use html_escape::encode_text;

use crate::db::User;

const SITE_NAME: &str = "Blogr";

/// Base page layout: header with login-state navigation, then the body.
pub fn layout(title: &str, user: Option<&User>, body: &str) -> Html<String> {
    let nav = match user {
        Some(user) => format!(
            "<li><span>{}</span></li><li><a href=\"/auth/logout\">Log Out</a></li>",
            encode_text(&user.username)
        ),
        None => concat!(
            "<li><a href=\"/auth/register\">Register</a></li>",
            "<li><a href=\"/auth/login\">Log In</a></li>"
        )
        .to_string(),
    };

    Html(format!(
        "<!doctype html>\
         <html lang=\"en\">\
         <head><meta charset=\"utf-8\"><title>{title} - {SITE_NAME}</title></head>\
         <body>\
         <nav><h1><a href=\"/\">{SITE_NAME}</a></h1><ul>{nav}</ul></nav>\
         <section class=\"content\"><header><h1>{title}</h1></header>{body}</section>\
         </body></html>",
        title = encode_text(title),
    ))
}

/// One-shot status message rendered above the form on this response.
pub fn flash(message: Option<&str>) -> String {
    message.map_or_else(String::new, |message| {
        format!("<div class=\"flash\">{}</div>", encode_text(message))
    })
}

/// The shared username/password form used by register and login.
pub fn credential_form(action: &str, submit: &str) -> String {
    format!(
        "<form method=\"post\" action=\"{action}\">\
         <label for=\"username\">Username</label>\
         <input name=\"username\" id=\"username\" required>\
         <label for=\"password\">Password</label>\
         <input type=\"password\" name=\"password\" id=\"password\" required>\
         <input type=\"submit\" value=\"{submit}\">\
         </form>"
    )
}
