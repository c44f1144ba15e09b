//! Basic authentication middleware
//!
//! Guards everything under `/api/v1`. The account table is read from the
//! runtime configuration on every request, so a reload takes effect at once.

use axum::extract::{Request, State};
use axum::http::Method;
use axum::middleware::Next;
use axum::response::Response;
use axum_extra::TypedHeader;
use axum_extra::headers::Authorization;
use axum_extra::headers::authorization::Basic;
use log::debug;

use crate::auth::{AuthUser, validate_credentials};
use crate::error::ApiError;
use crate::state::SharedState;

pub async fn require_basic_auth(
    State(state): State<SharedState>,
    credentials: Option<TypedHeader<Authorization<Basic>>>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    // CORS preflights carry no credentials
    if request.method() == Method::OPTIONS {
        return Ok(next.run(request).await);
    }

    let Some(TypedHeader(basic)) = credentials else {
        debug!("Rejected {}: no basic credentials", request.uri().path());
        return Err(ApiError::Unauthorized);
    };

    {
        let runtime = state.runtime.read().await;
        if let Err(e) = validate_credentials(basic.username(), basic.password(), &runtime.auth)
        {
            debug!("Rejected {}: {}", request.uri().path(), e);
            return Err(ApiError::Unauthorized);
        }
    }

    request
        .extensions_mut()
        .insert(AuthUser(basic.username().to_string()));
    Ok(next.run(request).await)
}
