//! Small helpers over string slices and JSON maps.

use std::collections::HashMap;

use serde_json::{Map, Value};

use crate::{HttpError, Result};

/// Reports whether `value` is an element of `slice`.
pub fn string_in_slice<S: AsRef<str>>(value: &str, slice: &[S]) -> bool {
    slice.iter().any(|item| item.as_ref() == value)
}

/// Elements of `left` that are absent from `right`, in `left` order.
pub fn difference<L, R>(left: &[L], right: &[R]) -> Vec<String>
where
    L: AsRef<str>,
    R: AsRef<str>,
{
    left.iter()
        .map(|item| item.as_ref())
        .filter(|item| !string_in_slice(item, right))
        .map(str::to_owned)
        .collect()
}

/// Flattens a JSON object into string values.
///
/// Strings are kept verbatim; numbers, booleans and null use their JSON
/// rendering. Arrays and objects are rejected with [`HttpError::Convert`].
pub fn to_string_map(map: &Map<String, Value>) -> Result<HashMap<String, String>> {
    map.iter()
        .map(|(key, value)| {
            let flat = match value {
                Value::String(text) => text.clone(),
                Value::Array(_) | Value::Object(_) => {
                    return Err(HttpError::Convert { key: key.clone() })
                }
                scalar => scalar.to_string(),
            };
            Ok((key.clone(), flat))
        })
        .collect()
}
