//! Request extractors that reject with [`AppError`].
//!
//! axum's own `Json` and `Path` reject with plain-text bodies and a mix of
//! `400`, `415` and `422`. These wrappers turn every rejection into a
//! `400` with the usual `{"message": ...}` body.

use axum::extract::{FromRequest, FromRequestParts};

use crate::error::AppError;

/// JSON request body.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct ApiJson<T>(pub T);

/// URL path parameters.
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(AppError))]
pub struct ApiPath<T>(pub T);
