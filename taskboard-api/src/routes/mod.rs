/// API route handlers
///
/// This module contains all route handlers organized by resource:
///
/// - `health`: Health check endpoint
/// - `cards`: Card listing, creation and update (with task reconciliation)
/// - `todos`: Task creation and update
use axum::extract::FromRequest;
use axum::extract::FromRequestParts;
use serde::{Deserialize, Serialize};

use crate::error::ApiError;

pub mod cards;
pub mod health;
pub mod todos;

/// Success envelope: `{"data": ...}`
#[derive(Debug, Serialize, Deserialize)]
pub struct DataResponse<T> {
    pub data: T,
}

impl<T> DataResponse<T> {
    pub fn new(data: T) -> Self {
        Self { data }
    }
}

/// JSON body extractor whose rejections are [`ApiError`]s
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct Payload<T>(pub T);

/// Path extractor whose rejections are [`ApiError`]s
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(ApiError))]
pub struct IdPath<T>(pub T);
