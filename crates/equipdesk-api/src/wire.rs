// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use equipdesk_app::MutationReply;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::ApiError;

/// Accepts a bare array, `{"data": [...]}`, or `null` (an empty server-side
/// slice). Anything else is a shape error.
pub fn decode_list<T: DeserializeOwned>(path: &str, body: &str) -> Result<Vec<T>, ApiError> {
    let value = parse_value(path, body)?;
    let items = match value {
        Value::Null => return Ok(Vec::new()),
        Value::Array(items) => items,
        Value::Object(mut fields) => match fields.remove("data") {
            Some(Value::Array(items)) => items,
            Some(Value::Null) => return Ok(Vec::new()),
            Some(other) => {
                return Err(shape(
                    path,
                    format!("expected data to be an array, got {}", describe(&other)),
                ));
            }
            None => {
                return Err(shape(
                    path,
                    "expected an array or an object with a data array".to_owned(),
                ));
            }
        },
        other => {
            return Err(shape(
                path,
                format!("expected an array, got {}", describe(&other)),
            ));
        }
    };
    serde_json::from_value(Value::Array(items)).map_err(|source| ApiError::Decode {
        path: path.to_owned(),
        source,
    })
}

/// An object carrying an `id` is the authoritative record; an empty body,
/// `null`, or any other object is a plain acknowledgement.
pub fn decode_reply<T: DeserializeOwned>(
    path: &str,
    body: &str,
) -> Result<MutationReply<T>, ApiError> {
    if body.trim().is_empty() {
        return Ok(MutationReply::Acknowledged);
    }
    match parse_value(path, body)? {
        Value::Null => Ok(MutationReply::Acknowledged),
        Value::Object(fields) if fields.contains_key("id") => {
            serde_json::from_value(Value::Object(fields))
                .map(MutationReply::Record)
                .map_err(|source| ApiError::Decode {
                    path: path.to_owned(),
                    source,
                })
        }
        Value::Object(_) => Ok(MutationReply::Acknowledged),
        other => Err(shape(
            path,
            format!("expected an object, got {}", describe(&other)),
        )),
    }
}

pub fn decode_value<T: DeserializeOwned>(path: &str, body: &str) -> Result<T, ApiError> {
    serde_json::from_str(body.trim()).map_err(|source| ApiError::Decode {
        path: path.to_owned(),
        source,
    })
}

fn parse_value(path: &str, body: &str) -> Result<Value, ApiError> {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return Err(shape(path, "empty body".to_owned()));
    }
    decode_value(path, trimmed)
}

fn shape(path: &str, detail: String) -> ApiError {
    ApiError::Shape {
        path: path.to_owned(),
        detail,
    }
}

fn describe(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
