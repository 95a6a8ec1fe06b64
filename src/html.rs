//! Shared maud fragments and helpers for the server-rendered pages.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use maud::{DOCTYPE, Markup, html};

use crate::endpoints;

const STYLESHEET: &str = "\
    body { font-family: sans-serif; max-width: 60rem; margin: 2rem auto; padding: 0 1rem; }\n\
    nav a { margin-right: 1rem; }\n\
    table { border-collapse: collapse; width: 100%; }\n\
    th, td { border: 1px solid #ccc; padding: 0.4rem 0.6rem; text-align: left; }\n\
    form div { margin-bottom: 0.75rem; }\n\
    label { display: block; margin-bottom: 0.25rem; }\n\
    .error { color: #b00020; }\n";

/// Render `content` inside the shared page skeleton.
pub fn base(title: &str, content: &Markup) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en"
        {
            head
            {
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                title { (title) " - Finledger" }
                style { (STYLESHEET) }
            }

            body
            {
                (content)
            }
        }
    }
}

/// The navigation bar shown on pages for logged-in users.
pub fn nav_bar() -> Markup {
    html! {
        nav
        {
            a href=(endpoints::ACCOUNTS_VIEW) { "Accounts" }
            a href=(endpoints::TRANSACTIONS_VIEW) { "Transactions" }
            a href=(endpoints::LOG_OUT) { "Log out" }
        }
    }
}

/// A labelled text input for a form.
pub fn text_input(label: &str, name: &str, input_type: &str, value: &str) -> Markup {
    html! {
        div
        {
            label for=(name) { (label) }
            input type=(input_type) name=(name) id=(name) value=(value) required;
        }
    }
}

/// An inline error paragraph, rendered only when there is a message to show.
pub fn error_message(message: Option<&str>) -> Markup {
    html! {
        @if let Some(message) = message
        {
            p class="error" { (message) }
        }
    }
}

/// Convert a maud template into an HTML response with the given status code.
pub fn render(status_code: StatusCode, template: Markup) -> Response {
    (status_code, template).into_response()
}
