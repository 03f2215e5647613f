use axum::{
    async_trait,
    body::Bytes,
    extract::{FromRequest, Path, Request, State},
    http::{header::CONTENT_TYPE, HeaderMap},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{Map, Value};

use common::types::Message;
use service::product::{Product, RequestedId};

use crate::errors::ApiError;
use crate::routes::AppState;

/// Request body fields. A request without a JSON content type or with an
/// empty body reads as `{}`; a JSON body that is not an object is rejected.
pub struct BodyFields(pub Map<String, Value>);

fn is_json(headers: &HeaderMap) -> bool {
    headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(';').next())
        .map(|mime| {
            let mime = mime.trim().to_ascii_lowercase();
            mime == "application/json" || (mime.starts_with("application/") && mime.ends_with("+json"))
        })
        .unwrap_or(false)
}

#[async_trait]
impl<S> FromRequest<S> for BodyFields
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        if !is_json(req.headers()) {
            return Ok(Self(Map::new()));
        }
        let bytes = Bytes::from_request(req, state).await.map_err(IntoResponse::into_response)?;
        if bytes.is_empty() {
            return Ok(Self(Map::new()));
        }
        let Json(fields) = Json::<Map<String, Value>>::from_bytes(&bytes).map_err(IntoResponse::into_response)?;
        Ok(Self(fields))
    }
}

/// List every stored product, verbatim.
pub async fn list_products(State(state): State<AppState>) -> Result<Json<Vec<Product>>, ApiError> {
    Ok(Json(state.products.list().await?))
}

/// Create a product from any JSON object; the response carries the assigned id.
pub async fn create_product(
    State(state): State<AppState>,
    BodyFields(fields): BodyFields,
) -> Result<Json<Product>, ApiError> {
    Ok(Json(state.products.create(fields).await?))
}

/// Shallow-merge the body onto the product; 404 when the id is unknown.
pub async fn update_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
    BodyFields(patch): BodyFields,
) -> Result<Json<Message>, ApiError> {
    let id = RequestedId::parse(&id);
    state.products.update(&id, patch).await?;
    Ok(Json(Message::new(format!("Updated product with ID {id}"))))
}

/// The reply is the same whether or not anything was removed.
pub async fn delete_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Message>, ApiError> {
    let id = RequestedId::parse(&id);
    state.products.delete(&id).await?;
    Ok(Json(Message::new(format!("Deleted product with ID {id}"))))
}
