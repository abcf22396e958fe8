// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use reqwest::StatusCode;
use serde::Deserialize;
use thiserror::Error;

const PLAIN_BODY_LIMIT: usize = 200;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("cannot reach {base_url} -- check [server].base_url and that the backend is up ({source})")]
    Transport {
        base_url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{message}")]
    Status { status: u16, message: String },

    #[error("unexpected response from {path}: {detail}")]
    Shape { path: String, detail: String },

    #[error("decode response from {path}: {source}")]
    Decode {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid request url: {0}")]
    Url(#[from] url::ParseError),
}

impl ApiError {
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self.status(), Some(401 | 403))
    }
}

#[derive(Debug, Default, Deserialize)]
struct ErrorEnvelope {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

/// Builds the error for a non-2xx reply. Prefers `message`, then `error`,
/// then a short plain-text body.
pub fn status_error(status: StatusCode, body: &str) -> ApiError {
    let code = status.as_u16();
    let body = body.trim();

    if let Ok(envelope) = serde_json::from_str::<ErrorEnvelope>(body) {
        let extracted = [envelope.message, envelope.error]
            .into_iter()
            .flatten()
            .map(|text| text.trim().to_owned())
            .find(|text| !text.is_empty());
        if let Some(message) = extracted {
            return ApiError::Status {
                status: code,
                message,
            };
        }
    }

    if !body.is_empty()
        && body.len() < PLAIN_BODY_LIMIT
        && !body.contains('{')
        && !body.starts_with('<')
    {
        return ApiError::Status {
            status: code,
            message: body.to_owned(),
        };
    }

    ApiError::Status {
        status: code,
        message: format!("request failed with status {code}"),
    }
}
