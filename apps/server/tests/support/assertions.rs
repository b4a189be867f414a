use anyhow::Context as _;
use axum::http::StatusCode;
use serde_json::Value;

use super::TestResponse;

pub fn assert_status(response: &TestResponse, expected: StatusCode, context: &str) {
    assert_eq!(
        response.status,
        expected,
        "{context}: expected {expected}, got {} with body {}",
        response.status,
        String::from_utf8_lossy(&response.body)
    );
}

/// Assert a `{success: true}` body and return it.
pub fn assert_success(response: &TestResponse) -> anyhow::Result<Value> {
    let body = response.json()?;
    assert_eq!(body["success"], Value::Bool(true), "expected success envelope: {body}");
    Ok(body)
}

/// Assert a `{success: false, error}` body and return the error message.
pub fn assert_failure(response: &TestResponse) -> anyhow::Result<String> {
    let body = response.json()?;
    assert_eq!(body["success"], Value::Bool(false), "expected failure envelope: {body}");
    body["error"]
        .as_str()
        .map(str::to_string)
        .context("error message is a string")
}

/// Field names listed in a validation error's `details`.
pub fn detail_fields(body: &Value) -> Vec<String> {
    body["details"]
        .as_array()
        .map(|issues| {
            issues
                .iter()
                .filter_map(|issue| issue["field"].as_str().map(str::to_string))
                .collect()
        })
        .unwrap_or_default()
}

/// Values of `key` across `data[]`.
pub fn data_strings(body: &Value, key: &str) -> Vec<String> {
    body["data"]
        .as_array()
        .map(|rows| {
            rows.iter()
                .filter_map(|row| row[key].as_str().map(str::to_string))
                .collect()
        })
        .unwrap_or_default()
}
