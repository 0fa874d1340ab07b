pub mod alerts;
pub mod dashboard;
pub mod health;
pub mod metrics;
pub mod tokens;
pub mod trades;
pub mod wallets;
pub mod ws;

use serde::Serialize;

/// Uniform JSON envelope for the REST surface.
#[derive(Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn err(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}
