//! The endpoint contract the client is generic over.
//!
//! # Design
//! A contract is a set of types implementing [`Operation`], one per
//! (method, path) pair. Each declares the shapes it sends and receives; the
//! client never names a concrete route. Contracts are maintained outside the
//! client (normally generated from the backend's OpenAPI document) and can be
//! swapped without touching client code.
//!
//! Parameters are any `Serialize` type that encodes to a JSON object. Keys
//! matching `{name}` placeholders in [`Operation::PATH`] fill the path; the
//! rest become the query string. Absent and `null` values count as missing.

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::ApiError;
use crate::http::HttpMethod;

/// Unreserved characters stay as-is in a path segment; everything else is escaped.
const PATH_SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// One route of an endpoint contract.
///
/// ```rust
/// use serde::{Deserialize, Serialize};
/// use vital_core::{HttpMethod, Operation};
///
/// #[derive(Serialize)]
/// struct FoodPath { id: u64 }
///
/// #[derive(Deserialize)]
/// struct Food { name: String }
///
/// struct GetFood;
///
/// impl Operation for GetFood {
///     type Params = FoodPath;
///     type Body = ();
///     type Response = Food;
///
///     const ID: &'static str = "get-food";
///     const METHOD: HttpMethod = HttpMethod::Get;
///     const PATH: &'static str = "/api/foods/{id}";
/// }
/// ```
pub trait Operation {
    type Params: Serialize;
    type Body: Serialize;
    type Response: DeserializeOwned;

    /// Operation id, used in errors and traces.
    const ID: &'static str;
    const METHOD: HttpMethod;
    /// Path template, `{name}` marks a path parameter.
    const PATH: &'static str;
    /// Query parameters that must be present and non-null.
    const REQUIRED_QUERY: &'static [&'static str] = &[];
    const BODY_REQUIRED: bool = false;
}

/// Expand `O::PATH` and append the query string built from `params`.
pub(crate) fn expand_target<O: Operation>(params: Option<&O::Params>) -> Result<String, ApiError> {
    let mut values = match params {
        None => Map::new(),
        Some(params) => match serde_json::to_value(params) {
            Ok(Value::Null) => Map::new(),
            Ok(Value::Object(map)) => map,
            Ok(_) => {
                return Err(ApiError::Serialization(format!(
                    "{}: parameters must serialize to an object",
                    O::ID
                )))
            }
            Err(e) => return Err(ApiError::Serialization(e.to_string())),
        },
    };

    let mut target = String::with_capacity(O::PATH.len());
    let mut rest = O::PATH;
    let mut used = Vec::new();
    while let Some(open) = rest.find('{') {
        let Some(close) = rest[open..].find('}').map(|i| open + i) else {
            break;
        };
        let name = &rest[open + 1..close];
        target.push_str(&rest[..open]);

        let value = present(&values, name).ok_or_else(|| ApiError::MissingParameter {
            operation: O::ID,
            name: name.to_string(),
        })?;
        let raw = scalar::<O>(name, value)?;
        target.extend(utf8_percent_encode(&raw, PATH_SEGMENT));
        used.push(name);

        rest = &rest[close + 1..];
    }
    target.push_str(rest);
    for name in used {
        values.remove(name);
    }

    for name in O::REQUIRED_QUERY {
        if !matches!(values.get(*name), Some(v) if !v.is_null()) {
            return Err(ApiError::MissingParameter {
                operation: O::ID,
                name: (*name).to_string(),
            });
        }
    }

    let mut query = url::form_urlencoded::Serializer::new(String::new());
    let mut has_query = false;
    for (name, value) in &values {
        match value {
            Value::Null => {}
            Value::Array(items) => {
                for item in items {
                    query.append_pair(name, &scalar::<O>(name, item)?);
                    has_query = true;
                }
            }
            other => {
                query.append_pair(name, &scalar::<O>(name, other)?);
                has_query = true;
            }
        }
    }
    if has_query {
        target.push('?');
        target.push_str(&query.finish());
    }

    Ok(target)
}

fn present<'a>(values: &'a Map<String, Value>, name: &str) -> Option<&'a Value> {
    values.get(name).filter(|v| !v.is_null())
}

fn scalar<O: Operation>(name: &str, value: &Value) -> Result<String, ApiError> {
    match value {
        Value::String(s) => Ok(s.clone()),
        Value::Number(n) => Ok(n.to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        _ => Err(ApiError::Serialization(format!(
            "{}: parameter `{name}` must be a string, number or boolean",
            O::ID
        ))),
    }
}
