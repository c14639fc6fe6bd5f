//! TwiML replies for the messaging provider.

use axum::http::header;
use axum::response::{IntoResponse, Response};

/// XML body replying with a single message.
pub fn message_xml(text: &str) -> String {
    format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?><Response><Message>{}</Message></Response>",
        quick_xml::escape::escape(text)
    )
}

/// `application/xml` response carrying one message.
pub fn message(text: &str) -> Response {
    ([(header::CONTENT_TYPE, "application/xml")], message_xml(text)).into_response()
}
