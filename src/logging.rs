//! Middleware for logging requests and responses.

use axum::{
    body::Body,
    extract::Request,
    http::{StatusCode, request, response},
    middleware::Next,
    response::{IntoResponse, Response},
};

/// The number of bytes of a request or response body that are logged at the
/// `info` level.
pub const LOG_BODY_LENGTH_LIMIT: usize = 64;

/// Log the request and response for each request.
///
/// Both the request and response are logged at the `info` level.
/// If a body is longer than [LOG_BODY_LENGTH_LIMIT] bytes, it is
/// truncated and the full body is logged at the `debug` level.
pub async fn logging_middleware(request: Request, next: Next) -> Response {
    let (parts, body_text) = match extract_request_parts_and_body_text(request).await {
        Ok(parts_and_body) => parts_and_body,
        Err(error) => {
            tracing::error!("could not read request body: {error}");
            return StatusCode::BAD_REQUEST.into_response();
        }
    };
    log_request(&parts, &body_text);

    let request = Request::from_parts(parts, Body::from(body_text));
    let response = next.run(request).await;

    let (parts, body_text) = match extract_response_parts_and_body_text(response).await {
        Ok(parts_and_body) => parts_and_body,
        Err(error) => {
            tracing::error!("could not read response body: {error}");
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };
    log_response(&parts, &body_text);

    Response::from_parts(parts, Body::from(body_text))
}

async fn extract_request_parts_and_body_text(
    request: Request,
) -> Result<(request::Parts, String), axum::Error> {
    let (parts, body) = request.into_parts();
    let body_bytes = axum::body::to_bytes(body, usize::MAX).await?;

    Ok((parts, String::from_utf8_lossy(&body_bytes).to_string()))
}

async fn extract_response_parts_and_body_text(
    response: Response,
) -> Result<(response::Parts, String), axum::Error> {
    let (parts, body) = response.into_parts();
    let body_bytes = axum::body::to_bytes(body, usize::MAX).await?;

    Ok((parts, String::from_utf8_lossy(&body_bytes).to_string()))
}

/// Get at most [LOG_BODY_LENGTH_LIMIT] bytes of `body` without splitting a
/// character, or `None` if the body is short enough to log in full.
fn truncate_body(body: &str) -> Option<&str> {
    if body.len() <= LOG_BODY_LENGTH_LIMIT {
        return None;
    }

    let mut end = LOG_BODY_LENGTH_LIMIT;
    while !body.is_char_boundary(end) {
        end -= 1;
    }

    Some(&body[..end])
}

fn log_request(parts: &request::Parts, body: &str) {
    match truncate_body(body) {
        Some(truncated) => {
            tracing::info!("Received request: {parts:#?}\nbody: {truncated}...");
            tracing::debug!("Full request body: {body:?}");
        }
        None => tracing::info!("Received request: {parts:#?}\nbody: {body:?}"),
    }
}

fn log_response(parts: &response::Parts, body: &str) {
    match truncate_body(body) {
        Some(truncated) => {
            tracing::info!("Sending response: {parts:#?}\nbody: {truncated}...");
            tracing::debug!("Full response body: {body:?}");
        }
        None => tracing::info!("Sending response: {parts:#?}\nbody: {body:?}"),
    }
}

#[cfg(test)]
mod tests {
    use axum::{Router, middleware, routing::post};
    use axum_test::TestServer;

    use super::{LOG_BODY_LENGTH_LIMIT, logging_middleware, truncate_body};

    #[test]
    fn short_body_is_not_truncated() {
        assert_eq!(truncate_body("amount=12.50"), None);
    }

    #[test]
    fn long_body_is_cut_at_limit() {
        let body = "a".repeat(LOG_BODY_LENGTH_LIMIT + 10);

        assert_eq!(truncate_body(&body).map(str::len), Some(LOG_BODY_LENGTH_LIMIT));
    }

    #[test]
    fn truncation_does_not_split_characters() {
        // Each 'ё' takes two bytes, so the limit falls inside a character.
        let body = format!("a{}", "ё".repeat(LOG_BODY_LENGTH_LIMIT));

        let truncated = truncate_body(&body).unwrap();

        assert_eq!(truncated.len(), LOG_BODY_LENGTH_LIMIT - 1);
    }

    #[tokio::test]
    async fn middleware_passes_bodies_through() {
        let app = Router::new()
            .route("/echo", post(|body: String| async move { body }))
            .layer(middleware::from_fn(logging_middleware));
        let server = TestServer::new(app);
        let body = "comment=".to_owned() + &"x".repeat(200);

        let response = server.post("/echo").text(body.clone()).await;

        response.assert_status_ok();
        response.assert_text(body);
    }
}
