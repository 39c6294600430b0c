// src/error.rs

use axum::http::StatusCode;

use crate::rota::AlgorithmError;

/// Failures of a rota generation run or one of the rota endpoints.
#[derive(Debug, thiserror::Error)]
pub enum RotaError {
    #[error("{0}")]
    Validation(String),
    #[error("missing input: {0}")]
    MissingInput(String),
    #[error("failed to load {what}: {source:#}")]
    Fetch {
        what: &'static str,
        #[source]
        source: anyhow::Error,
    },
    #[error(transparent)]
    Algorithm(#[from] AlgorithmError),
    #[error("failed to save schedule: {0:#}")]
    Persist(#[source] anyhow::Error),
    #[error("{0} not found")]
    NotFound(String),
}

impl RotaError {
    pub fn fetch(what: &'static str) -> impl FnOnce(anyhow::Error) -> Self {
        move |source| Self::Fetch { what, source }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::MissingInput(_) | Self::Algorithm(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Fetch { .. } | Self::Persist(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

// Common error mapper
pub fn rota_error(e: RotaError) -> (StatusCode, String) {
    let status = e.status();
    if status.is_server_error() {
        tracing::error!(error = %e, "rota request failed");
    }
    (status, e.to_string())
}
