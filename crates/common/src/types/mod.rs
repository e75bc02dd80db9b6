use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug)]
pub struct Health {
    pub status: &'static str,
}

/// Body of the uniform error envelope: one entry per offending field.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ErrorDetail {
    pub field: String,
    pub message: String,
    pub status: u16,
}

/// `{"error": ..., "details": [...]}` returned by every failing endpoint.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ErrorEnvelope {
    pub error: String,
    pub details: Vec<ErrorDetail>,
}

impl ErrorEnvelope {
    pub fn single(error: impl Into<String>, detail: ErrorDetail) -> Self {
        Self { error: error.into(), details: vec![detail] }
    }
}
