//! Static asset serving via rust-embed

use axum::{
    body::Body,
    http::{header, Request, Response, StatusCode},
};
use rust_embed::Embed;

#[derive(Embed)]
#[folder = "frontend/"]
struct Asset;

/// Fallback handler that serves the embedded frontend
pub async fn static_handler(req: Request<Body>) -> Response<Body> {
    let path = req.uri().path().trim_start_matches('/');

    // Default to index.html for root
    let path = if path.is_empty() { "index.html" } else { path };

    match Asset::get(path) {
        Some(content) => {
            let mime = mime_guess::from_path(path)
                .first_or_octet_stream()
                .to_string();

            response_or_500(
                Response::builder()
                    .status(StatusCode::OK)
                    .header(header::CONTENT_TYPE, mime)
                    .header(header::CACHE_CONTROL, "no-cache, no-store, must-revalidate")
                    .body(Body::from(content.data.to_vec())),
            )
        }
        None => {
            // SPA fallback: serve index.html for any non-API, non-file path
            if !path.contains('.') && !path.starts_with("api/") {
                if let Some(content) = Asset::get("index.html") {
                    return response_or_500(
                        Response::builder()
                            .status(StatusCode::OK)
                            .header(header::CONTENT_TYPE, "text/html")
                            .header(header::CACHE_CONTROL, "no-cache, no-store, must-revalidate")
                            .body(Body::from(content.data.to_vec())),
                    );
                }
            }
            response_or_500(
                Response::builder()
                    .status(StatusCode::NOT_FOUND)
                    .body(Body::from("Not found")),
            )
        }
    }
}

fn response_or_500(result: Result<Response<Body>, axum::http::Error>) -> Response<Body> {
    result.unwrap_or_else(|_| {
        let mut response = Response::new(Body::from("Internal error"));
        *response.status_mut() = StatusCode::INTERNAL_SERVER_ERROR;
        response
    })
}
