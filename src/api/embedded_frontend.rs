//! Embedded frontend serving via rust-embed.
//!
//! The chat page under `frontend/` is baked into the binary at compile time
//! and looked up by request path. There is no SPA fallback: a path that does
//! not name an asset is a 404, the same as for an on-disk asset directory.

use axum::{
    body::Body,
    http::{header, Method, StatusCode, Uri},
    response::{IntoResponse, Response},
};
use rust_embed::RustEmbed;

/// Embedded frontend assets compiled from the frontend/ directory.
#[derive(RustEmbed)]
#[folder = "frontend/"]
struct FrontendAssets;

/// Map a request path to an asset key: `/` and `dir/` resolve to their index.html
fn asset_key(path: &str) -> String {
    let key = path.trim_start_matches('/');
    if key.is_empty() || key.ends_with('/') {
        format!("{}index.html", key)
    } else {
        key.to_string()
    }
}

/// Axum handler that serves embedded frontend assets.
pub async fn serve_embedded(method: Method, uri: Uri) -> Response {
    if method != Method::GET && method != Method::HEAD {
        return StatusCode::METHOD_NOT_ALLOWED.into_response();
    }

    let key = asset_key(uri.path());
    match FrontendAssets::get(&key) {
        Some(file) => serve_file(&key, &file.data),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

/// Build an HTTP response with the correct Content-Type for the given file path.
fn serve_file(path: &str, data: &[u8]) -> Response {
    let mime = mime_guess::from_path(path).first_or_octet_stream();

    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, mime.to_string())],
        Body::from(data.to_vec()),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_asset_key() {
        assert_eq!(asset_key("/"), "index.html");
        assert_eq!(asset_key(""), "index.html");
        assert_eq!(asset_key("/docs/"), "docs/index.html");
        assert_eq!(asset_key("/app.js"), "app.js");
    }

    #[tokio::test]
    async fn test_serves_index() {
        let resp = serve_embedded(Method::GET, Uri::from_static("/")).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(
            resp.headers().get(header::CONTENT_TYPE).unwrap(),
            "text/html"
        );
    }

    #[tokio::test]
    async fn test_missing_asset_is_404() {
        let resp = serve_embedded(Method::GET, Uri::from_static("/unknown")).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_post_is_405() {
        let resp = serve_embedded(Method::POST, Uri::from_static("/")).await;
        assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED);
    }

    #[test]
    fn test_page_releases_pending_turn_on_close() {
        let page = FrontendAssets::get("index.html").unwrap();
        let script = std::str::from_utf8(&page.data).unwrap();

        let onclose = script.find("socket.onclose").unwrap();
        let release = script[onclose..].find("releasePendingTurn(session, view)").unwrap();
        let reconnect = script[onclose..].find("setTimeout").unwrap();
        assert!(release < reconnect);

        let body_start = script.find("function releasePendingTurn").unwrap();
        let body = &script[body_start..];
        let body = &body[..body.find("\n    }").unwrap()];
        assert!(body.contains("session.isProcessing = false"));
        assert!(body.contains(r#"view.typing.style.display = "none""#));
        assert!(body.contains("setInputEnabled(view, true)"));
    }
}
