//! Bearer-token guard for the admin and kitchen routes.
//!
//! There are no user accounts. When `ADMIN_TOKEN` is configured every
//! protected request must carry `Authorization: Bearer <token>`; when it is
//! not configured the routes are open (local development).

use axum::extract::{Request, State};
use axum::http::header::AUTHORIZATION;
use axum::middleware::Next;
use axum::response::Response;

use crate::error::{ApiError, ErrorCode};
use crate::state::AppState;

pub async fn require_admin_token(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let Some(expected) = state.config.admin_token.as_deref() else {
        return Ok(next.run(request).await);
    };

    let provided = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim);

    let verdict = match provided {
        None => Err(ApiError::new(ErrorCode::Unauthorized, "Missing bearer token")),
        Some(token) if !constant_time_eq(token.as_bytes(), expected.as_bytes()) => {
            tracing::warn!(path = %request.uri().path(), "Rejected admin token");
            Err(ApiError::new(ErrorCode::Forbidden, "Invalid token"))
        }
        Some(_) => Ok(()),
    };
    verdict?;

    Ok(next.run(request).await)
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}
