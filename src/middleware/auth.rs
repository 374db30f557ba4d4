use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::{request::Parts, HeaderMap},
};
use std::convert::Infallible;

use crate::auth::{self, Secrets, SHOW_ARCHIVED_HEADER, TOKEN_HEADER};
use crate::error::ApiError;

/// Proof that the request carried the write token.
///
/// Taken before the body extractor so an unauthorized write is rejected
/// without reading or decoding the payload.
#[derive(Debug, Clone, Copy)]
pub struct WriteAccess;

#[async_trait]
impl<St> FromRequestParts<St> for WriteAccess
where
    Secrets: FromRef<St>,
    St: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &St) -> Result<Self, Self::Rejection> {
        let secrets = Secrets::from_ref(state);
        let presented = header_str(&parts.headers, TOKEN_HEADER);

        auth::authorize(secrets.write_token.as_deref(), presented).map_err(|e| {
            tracing::warn!("Rejected {} {}: {}", parts.method, parts.uri.path(), e);
            ApiError::from(e)
        })?;

        Ok(WriteAccess)
    }
}

/// Whether this request may see archived records
#[derive(Debug, Clone, Copy)]
pub struct ArchivedAccess(pub bool);

#[async_trait]
impl<St> FromRequestParts<St> for ArchivedAccess
where
    Secrets: FromRef<St>,
    St: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &St) -> Result<Self, Self::Rejection> {
        let secrets = Secrets::from_ref(state);
        let presented = header_str(&parts.headers, SHOW_ARCHIVED_HEADER);

        Ok(ArchivedAccess(auth::archived_visible(
            secrets.show_archived.as_deref(),
            presented,
        )))
    }
}

/// Non-UTF-8 header values count as absent
fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}
