//! API extractors whose rejections are [`Notice`]s.
//!
//! Axum's own `Json`, `Path` and `Query` reject with plain text. These wrap
//! them so a malformed body, id, or query string reads like every other API
//! failure. The rejection detail goes to the debug log.

use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{FromRequest, FromRequestParts, Path, Query, Request};
use axum::http::request::Parts;
use axum::response::Json;
use serde::de::DeserializeOwned;

use super::notice::Notice;

pub struct ApiJson<T>(pub T);

pub struct ApiPath<T>(pub T);

pub struct ApiQuery<T>(pub T);

pub(crate) fn json_rejection_to_notice(rejection: &JsonRejection) -> Notice {
    tracing::debug!(detail = %rejection.body_text(), "json body rejected");
    Notice::error(rejection.status(), "Invalid request body")
}

pub(crate) fn path_rejection_to_notice(rejection: &PathRejection) -> Notice {
    tracing::debug!(detail = %rejection.body_text(), "path rejected");
    Notice::error(rejection.status(), "Invalid URL")
}

pub(crate) fn query_rejection_to_notice(rejection: &QueryRejection) -> Notice {
    tracing::debug!(detail = %rejection.body_text(), "query string rejected");
    Notice::error(rejection.status(), "Invalid query string")
}

impl<T, S> FromRequest<S> for ApiJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = Notice;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(Self(value)),
            Err(rejection) => Err(json_rejection_to_notice(&rejection)),
        }
    }
}

impl<T, S> FromRequestParts<S> for ApiPath<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = Notice;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match Path::<T>::from_request_parts(parts, state).await {
            Ok(Path(value)) => Ok(Self(value)),
            Err(rejection) => Err(path_rejection_to_notice(&rejection)),
        }
    }
}

impl<T, S> FromRequestParts<S> for ApiQuery<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = Notice;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match Query::<T>::from_request_parts(parts, state).await {
            Ok(Query(value)) => Ok(Self(value)),
            Err(rejection) => Err(query_rejection_to_notice(&rejection)),
        }
    }
}
