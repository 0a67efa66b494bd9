//! Projection of metric values out of a snapshot.
//!
//! Everything here is a pure function of the snapshot and a locator; every
//! read walks the snapshot again.

use serde_json::Value;
use thiserror::Error;

use xmrwatch_types::{Locator, HASHRATE_PATH};

/// Errors raised by an indexed locator whose array is not usable.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProjectionError {
    /// The array field is missing from the snapshot.
    #[error("'{path}' is missing")]
    MissingSequence { path: String },

    /// The array field holds something other than an array.
    #[error("'{path}' is {found}, not an array")]
    NotASequence { path: String, found: &'static str },

    /// The index is past the end of the array.
    #[error("index {index} out of range for '{path}' of length {len}")]
    IndexOutOfRange {
        path: String,
        index: usize,
        len: usize,
    },
}

/// Walk `root` by successive object keys.
///
/// Returns `None` as soon as a key is missing, an intermediate value is not
/// an object, or the value found is `null`. An empty path yields the root.
pub fn lookup<'a>(root: &'a Value, path: &[&str]) -> Option<&'a Value> {
    let mut current = root;
    for key in path {
        current = current.as_object()?.get(*key)?;
    }
    if current.is_null() {
        None
    } else {
        Some(current)
    }
}

/// Compute a metric's value from the current snapshot.
///
/// An absent snapshot projects to `Ok(None)` for every locator. A path
/// locator never fails. An indexed locator fails when the hashrate array is
/// missing, is not an array, or is shorter than the index; a `null` sample
/// projects to `Ok(None)`.
pub fn project(snapshot: Option<&Value>, locator: &Locator) -> Result<Option<Value>, ProjectionError> {
    let Some(root) = snapshot else {
        return Ok(None);
    };

    match locator {
        Locator::Path(path) => Ok(lookup(root, path).cloned()),
        Locator::Indexed(index) => {
            let path = HASHRATE_PATH.join(".");
            let samples = match lookup(root, HASHRATE_PATH) {
                None => return Err(ProjectionError::MissingSequence { path }),
                Some(Value::Array(samples)) => samples,
                Some(other) => {
                    return Err(ProjectionError::NotASequence {
                        path,
                        found: type_name(other),
                    })
                }
            };

            match samples.get(*index) {
                Some(Value::Null) => Ok(None),
                Some(value) => Ok(Some(value.clone())),
                None => Err(ProjectionError::IndexOutOfRange {
                    path,
                    index: *index,
                    len: samples.len(),
                }),
            }
        }
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
