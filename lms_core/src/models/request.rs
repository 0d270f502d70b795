//! Request and response models

use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub message: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
        }
    }
}

/// Query string for the content gate endpoint.
///
/// The learner is passed explicitly; an absent or unknown username is
/// evaluated as an anonymous request.
#[derive(Debug, Deserialize)]
pub struct GateQuery {
    pub user: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct GateResponse {
    pub gated: bool,
    pub fragment: Option<String>,
}
