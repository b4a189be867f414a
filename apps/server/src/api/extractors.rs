//! Request extractors that report failures in the API's error envelope.

use axum::{
    async_trait,
    extract::{rejection::JsonRejection, FromRequest, FromRequestParts, Path, Query, Request},
    http::request::Parts,
};
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use uuid::Uuid;

use crate::{
    db::search::{parse_id, parse_uuid},
    Error,
};

/// JSON body whose syntax or shape errors become a 400 `Validation` error.
pub struct JsonBody<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for JsonBody<T>
where
    S: Send + Sync,
    T: DeserializeOwned,
{
    type Rejection = Error;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match axum::Json::<T>::from_request(req, state).await {
            Ok(axum::Json(value)) => Ok(JsonBody(value)),
            Err(rejection) => Err(json_rejection(rejection)),
        }
    }
}

fn json_rejection(rejection: JsonRejection) -> Error {
    match rejection {
        JsonRejection::MissingJsonContentType(_) => {
            Error::Validation("Expected Content-Type: application/json".to_string())
        }
        JsonRejection::JsonSyntaxError(_) => Error::Validation("Malformed JSON body".to_string()),
        JsonRejection::JsonDataError(e) => Error::Validation(e.body_text()),
        other => Error::Validation(other.body_text()),
    }
}

/// Single UUID path parameter; anything else is a 400.
pub struct UuidPath(pub Uuid);

#[async_trait]
impl<S> FromRequestParts<S> for UuidPath
where
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|e| Error::Validation(e.body_text()))?;
        parse_uuid("id", &raw).map(UuidPath)
    }
}

/// `/customers/:id/favorites/:favorite_id`: a customer UUID and a favorite id.
pub struct FavoritePath {
    pub customer_id: Uuid,
    pub favorite_id: i32,
}

#[async_trait]
impl<S> FromRequestParts<S> for FavoritePath
where
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path((customer, favorite)) = Path::<(String, String)>::from_request_parts(parts, state)
            .await
            .map_err(|e| Error::Validation(e.body_text()))?;

        let customer_id = parse_uuid("id", &customer)?;
        let favorite_id = parse_id("favorite_id", Some(favorite.trim()))?
            .ok_or_else(|| Error::field("favorite_id", "favorite_id must be a positive integer"))?;

        Ok(FavoritePath {
            customer_id,
            favorite_id,
        })
    }
}

/// Raw query string pairs. Typed parsing happens in the params layer so every
/// bad field is reported at once.
pub struct QueryPairs(pub HashMap<String, String>);

#[async_trait]
impl<S> FromRequestParts<S> for QueryPairs
where
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(pairs) = Query::<HashMap<String, String>>::from_request_parts(parts, state)
            .await
            .map_err(|e| Error::Validation(e.body_text()))?;
        Ok(QueryPairs(pairs))
    }
}
