//! `Json` and `Path` extractors whose rejections render as `WebError`.

use axum::extract::{FromRequest, FromRequestParts};

use crate::error::WebError;

/// JSON body extractor; malformed bodies answer with the standard error body.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(WebError))]
pub struct AppJson<T>(pub T);

/// Path extractor; unparsable segments answer with the standard error body.
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(WebError))]
pub struct AppPath<T>(pub T);
