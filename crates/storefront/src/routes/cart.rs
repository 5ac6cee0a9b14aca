//! Cart route handlers.
//!
//! Every handler resolves the signed-in user's stored cart with
//! [`RequireUser`] and hands it to the [`CartService`](cartkeeper_core::CartService).
//! Mutations respond with the canonical cart lines; reads respond with lines
//! joined to live product data.

use axum::{Json, body::Bytes, extract::State};
use serde::de::{self, Unexpected};
use serde::{Deserialize, Deserializer};
use tracing::instrument;

use cartkeeper_core::{Cart, CartItem, ProductId};

use crate::error::{AppError, Result, add_breadcrumb};
use crate::extract::{ApiJson, ApiPath};
use crate::middleware::RequireUser;
use crate::state::AppState;

/// Product ID as clients send it: a JSON number or a numeric string.
#[derive(Deserialize)]
#[serde(untagged, expecting = "a product id")]
enum ProductIdInput {
    Number(i32),
    Text(String),
}

fn parse_product_id<E: de::Error>(input: ProductIdInput) -> std::result::Result<ProductId, E> {
    match input {
        ProductIdInput::Number(id) => Ok(ProductId::new(id)),
        ProductIdInput::Text(text) => text
            .parse()
            .map_err(|_| E::invalid_value(Unexpected::Str(&text), &"a product id")),
    }
}

fn product_id<'de, D>(deserializer: D) -> std::result::Result<ProductId, D::Error>
where
    D: Deserializer<'de>,
{
    parse_product_id(ProductIdInput::deserialize(deserializer)?)
}

fn optional_product_id<'de, D>(deserializer: D) -> std::result::Result<Option<ProductId>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<ProductIdInput>::deserialize(deserializer)?
        .map(parse_product_id::<D::Error>)
        .transpose()
}

/// Add to cart request body.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddToCartRequest {
    #[serde(deserialize_with = "product_id")]
    pub product_id: ProductId,
}

/// Remove from cart request body.
///
/// A missing or null `productId` clears the whole cart.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoveFromCartRequest {
    #[serde(default, deserialize_with = "optional_product_id")]
    pub product_id: Option<ProductId>,
}

impl RemoveFromCartRequest {
    /// Parse a possibly empty request body.
    fn from_body(body: &[u8]) -> Result<Self> {
        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self::default());
        }
        serde_json::from_slice(body)
            .map_err(|e| AppError::BadRequest(format!("invalid request body: {e}")))
    }
}

/// Update quantity request body.
#[derive(Debug, Deserialize)]
pub struct UpdateQuantityRequest {
    pub quantity: i64,
}

/// Show the cart with current product data.
#[instrument(skip(state, owner))]
pub async fn show(
    State(state): State<AppState>,
    RequireUser(owner): RequireUser,
) -> Result<Json<Vec<CartItem>>> {
    let items = state.carts().get(owner).await?;
    Ok(Json(items))
}

/// Add one unit of a product.
#[instrument(skip(state, owner))]
pub async fn add(
    State(state): State<AppState>,
    RequireUser(owner): RequireUser,
    ApiJson(request): ApiJson<AddToCartRequest>,
) -> Result<Json<Cart>> {
    let cart = state.carts().add(owner, request.product_id).await?;

    let product_id = request.product_id.to_string();
    add_breadcrumb("cart", "Added product", Some(&[("product_id", product_id.as_str())]));
    Ok(Json(cart))
}

/// Remove a product entirely, or clear the cart.
#[instrument(skip(state, owner, body))]
pub async fn remove_all(
    State(state): State<AppState>,
    RequireUser(owner): RequireUser,
    body: Bytes,
) -> Result<Json<Cart>> {
    let request = RemoveFromCartRequest::from_body(&body)?;
    let cart = state.carts().remove_all(owner, request.product_id).await?;

    match request.product_id {
        Some(product_id) => {
            let product_id = product_id.to_string();
            add_breadcrumb("cart", "Removed product", Some(&[("product_id", product_id.as_str())]));
        }
        None => add_breadcrumb("cart", "Cleared cart", None),
    }
    Ok(Json(cart))
}

/// Set the quantity of a product already in the cart.
#[instrument(skip(state, owner))]
pub async fn update_quantity(
    State(state): State<AppState>,
    RequireUser(owner): RequireUser,
    ApiPath(product_id): ApiPath<ProductId>,
    ApiJson(request): ApiJson<UpdateQuantityRequest>,
) -> Result<Json<Cart>> {
    let cart = state
        .carts()
        .set_quantity(owner, product_id, request.quantity)
        .await?;

    let product_id = product_id.to_string();
    let quantity = request.quantity.to_string();
    add_breadcrumb(
        "cart",
        "Updated quantity",
        Some(&[("product_id", product_id.as_str()), ("quantity", quantity.as_str())]),
    );
    Ok(Json(cart))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_remove_request_empty_body_clears() {
        let request = RemoveFromCartRequest::from_body(b"").unwrap();
        assert!(request.product_id.is_none());

        let request = RemoveFromCartRequest::from_body(b"  \n").unwrap();
        assert!(request.product_id.is_none());
    }

    #[test]
    fn test_remove_request_null_and_missing_product() {
        let request = RemoveFromCartRequest::from_body(br#"{"productId": null}"#).unwrap();
        assert!(request.product_id.is_none());

        let request = RemoveFromCartRequest::from_body(b"{}").unwrap();
        assert!(request.product_id.is_none());
    }

    #[test]
    fn test_remove_request_with_product() {
        let request = RemoveFromCartRequest::from_body(br#"{"productId": 12}"#).unwrap();
        assert_eq!(request.product_id, Some(ProductId::new(12)));
    }

    #[test]
    fn test_remove_request_numeric_string_product() {
        let request = RemoveFromCartRequest::from_body(br#"{"productId": " 12"}"#).unwrap();
        assert_eq!(request.product_id, Some(ProductId::new(12)));
    }

    #[test]
    fn test_add_request_accepts_number_or_numeric_string() {
        let request: AddToCartRequest = serde_json::from_str(r#"{"productId": 20}"#).unwrap();
        assert_eq!(request.product_id, ProductId::new(20));

        let request: AddToCartRequest = serde_json::from_str(r#"{"productId": "20"}"#).unwrap();
        assert_eq!(request.product_id, ProductId::new(20));
    }

    #[test]
    fn test_add_request_rejects_bad_product() {
        for body in [
            "{}",
            r#"{"productId": null}"#,
            r#"{"productId": "abc"}"#,
            r#"{"productId": 2.5}"#,
            r#"{"productId": true}"#,
        ] {
            assert!(
                serde_json::from_str::<AddToCartRequest>(body).is_err(),
                "accepted {body}"
            );
        }
    }

    #[test]
    fn test_remove_request_malformed() {
        let err = RemoveFromCartRequest::from_body(b"{not json").unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }
}
