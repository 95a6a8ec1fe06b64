//! The 404 page returned for unknown routes.

use axum::{http::StatusCode, response::Response};
use maud::html;

use crate::{
    endpoints,
    html::{base, render},
};

/// Route handler for unknown routes.
pub async fn get_404_not_found() -> Response {
    get_404_not_found_response()
}

/// Get a 404 response with a page linking back to the accounts view.
pub fn get_404_not_found_response() -> Response {
    let content = html! {
        h1 { "Page not found" }
        p
        {
            "The page you are looking for does not exist. "
            a href=(endpoints::ACCOUNTS_VIEW) { "Back to your accounts" }
        }
    };

    render(StatusCode::NOT_FOUND, base("Not Found", &content))
}
