//! Response assertions and raw requests shared by every feature.

use serde_json::{Map, Number, Value};

use crate::api::{ApiRequest, Method};
use crate::context::ScenarioContext;
use crate::error::{AssertionError, ContextError, Result};

/// Fragment an invalid-key response body must contain.
pub const INVALID_KEY_MESSAGE: &str = "invalid key";

/// `the API should return a success status`
///
/// # Errors
///
/// Fails without a response or on any status but 200.
pub fn assert_success(ctx: &mut ScenarioContext) -> Result<()> {
    assert_status(ctx, 200)
}

/// `the response status should be {int}`
///
/// # Errors
///
/// Fails without a response or on a different status.
pub fn assert_status(ctx: &mut ScenarioContext, expected: u16) -> Result<()> {
    let actual = ctx.require_response()?.status();
    if actual == expected {
        return Ok(());
    }
    Err(AssertionError::Mismatch {
        field: String::from("status"),
        expected: expected.to_string(),
        actual: actual.to_string(),
    }
    .into())
}

/// `the response status should indicate an unauthorized request`
///
/// # Errors
///
/// Fails without a response or on anything but 401 or 403.
pub fn assert_unauthorized(ctx: &mut ScenarioContext) -> Result<()> {
    let actual = ctx.require_response()?.status();
    if matches!(actual, 401 | 403) {
        return Ok(());
    }
    Err(AssertionError::Mismatch {
        field: String::from("status for unauthorized request"),
        expected: String::from("401 or 403"),
        actual: actual.to_string(),
    }
    .into())
}

/// `the response body should contain {string}`
///
/// # Errors
///
/// Fails without a response or when the body lacks `expected`.
pub fn assert_body_contains(ctx: &mut ScenarioContext, expected: &str) -> Result<()> {
    let body = ctx.require_response()?.body_or_unavailable();
    if body.contains(expected) {
        return Ok(());
    }
    Err(AssertionError::MissingText {
        expected: expected.to_owned(),
        actual: body.to_owned(),
    }
    .into())
}

/// `the response should have a property {string} with value {string}`
///
/// A value that parses as a number is compared numerically, anything else
/// as a string.
///
/// # Errors
///
/// Fails without a JSON response or when the property differs.
pub fn assert_property(ctx: &mut ScenarioContext, property: &str, expected: &str) -> Result<()> {
    let body = ctx.require_response()?.json()?;
    let actual = body.get(property).unwrap_or(&Value::Null);
    if property_matches(actual, expected) {
        return Ok(());
    }
    Err(AssertionError::Mismatch {
        field: format!("property '{property}'"),
        expected: expected.to_owned(),
        actual: actual.to_string(),
    }
    .into())
}

/// `the response should have a property {string} with value {int}`
///
/// Only an integral JSON number matches; the string `"7"` does not.
///
/// # Errors
///
/// Fails without a JSON response or when the property differs.
pub fn assert_integer_property(
    ctx: &mut ScenarioContext,
    property: &str,
    expected: i64,
) -> Result<()> {
    let body = ctx.require_response()?.json()?;
    let actual = body.get(property).unwrap_or(&Value::Null);
    if actual.as_i64() == Some(expected) {
        return Ok(());
    }
    Err(AssertionError::Mismatch {
        field: format!("property '{property}'"),
        expected: expected.to_string(),
        actual: actual.to_string(),
    }
    .into())
}

fn property_matches(actual: &Value, expected: &str) -> bool {
    if let Some(number) = finite_number(expected) {
        return actual.as_f64().map(f64::to_bits) == Some(number.to_bits());
    }
    actual.as_str() == Some(expected)
}

/// Read `raw` as a number the way a table cell or expected value is meant:
/// `NaN` and the infinities stay text.
fn finite_number(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|n| n.is_finite())
}

fn cell_value(raw: &str) -> Value {
    if let Ok(integer) = raw.trim().parse::<i64>() {
        return Value::Number(integer.into());
    }
    finite_number(raw)
        .and_then(Number::from_f64)
        .map_or_else(|| Value::String(raw.to_owned()), Value::Number)
}

/// Build a JSON object from `key | value` rows.
///
/// Cells that read as finite numbers become JSON numbers; everything else
/// is sent as a string. Cells beyond the second are ignored.
///
/// # Errors
///
/// Returns `ContextError::MalformedTable` for a row without a value.
pub fn table_body(rows: &[Vec<String>]) -> Result<Value> {
    let mut body = Map::new();
    for (index, row) in rows.iter().enumerate() {
        let [key, value, ..] = row.as_slice() else {
            return Err(ContextError::MalformedTable { row: index + 1 }.into());
        };
        body.insert(key.clone(), cell_value(value));
    }
    Ok(Value::Object(body))
}

/// `I send a POST request to {string} with body:`
///
/// The data table is sent as a JSON object built by [`table_body`]. Like
/// [`send_get`], no credentials are attached.
///
/// # Errors
///
/// Fails on a malformed table or if the call could not be made.
pub async fn send_post(ctx: &mut ScenarioContext, url: &str, rows: &[Vec<String>]) -> Result<()> {
    let body = table_body(rows)?;
    let transport = ctx.transport();
    let request = ApiRequest::new(Method::Post, url).with_json(body);
    ctx.response = Some(transport.send(request).await?);
    Ok(())
}

/// `I send a GET request to {string}`
///
/// No credentials are attached. `url` may be absolute or relative to the
/// service base URL.
///
/// # Errors
///
/// Fails only if the call could not be made.
pub async fn send_get(ctx: &mut ScenarioContext, url: &str) -> Result<()> {
    let transport = ctx.transport();
    ctx.response = Some(transport.send(ApiRequest::new(Method::Get, url)).await?);
    Ok(())
}
