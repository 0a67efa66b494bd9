//! Presentation state of a metric.

use std::fmt;

use serde::{Serialize, Serializer};
use serde_json::Value;

/// The value shown for a metric.
///
/// `Unknown` is the canonical sentinel for "no value can be derived": the
/// controller is in error, the key is missing, or the value is `null`.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum MetricState {
    /// No value available.
    #[default]
    Unknown,
    /// A value read from the latest snapshot.
    Value(Value),
}

impl MetricState {
    /// The string rendered for the unknown sentinel.
    pub const UNKNOWN: &'static str = "unknown";

    /// Build a state from an optional value; `None` and `null` become `Unknown`.
    pub fn from_option(value: Option<Value>) -> Self {
        match value {
            None | Some(Value::Null) => MetricState::Unknown,
            Some(v) => MetricState::Value(v),
        }
    }

    /// Check if this is the unknown sentinel.
    pub fn is_unknown(&self) -> bool {
        matches!(self, MetricState::Unknown)
    }

    /// The wrapped value, if any.
    pub fn value(&self) -> Option<&Value> {
        match self {
            MetricState::Unknown => None,
            MetricState::Value(v) => Some(v),
        }
    }

    /// The value as a float, if it is numeric.
    pub fn as_f64(&self) -> Option<f64> {
        self.value().and_then(Value::as_f64)
    }
}

impl fmt::Display for MetricState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetricState::Unknown => f.write_str(Self::UNKNOWN),
            // Strings are shown bare, without JSON quoting
            MetricState::Value(Value::String(s)) => f.write_str(s),
            MetricState::Value(v) => write!(f, "{}", v),
        }
    }
}

impl Serialize for MetricState {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            MetricState::Unknown => serializer.serialize_str(Self::UNKNOWN),
            MetricState::Value(v) => v.serialize(serializer),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_null_is_unknown() {
        assert!(MetricState::from_option(Some(Value::Null)).is_unknown());
        assert!(MetricState::from_option(None).is_unknown());
    }

    #[test]
    fn test_display() {
        assert_eq!(MetricState::Unknown.to_string(), "unknown");
        assert_eq!(MetricState::Value(json!("rx/0")).to_string(), "rx/0");
        assert_eq!(MetricState::Value(json!(20.1)).to_string(), "20.1");
        assert_eq!(MetricState::Value(json!(1234)).to_string(), "1234");
    }

    #[test]
    fn test_serialize() {
        let states = vec![MetricState::Unknown, MetricState::Value(json!(5))];
        assert_eq!(serde_json::to_string(&states).unwrap(), r#"["unknown",5]"#);
    }

    #[test]
    fn test_as_f64() {
        assert_eq!(MetricState::Value(json!(90)).as_f64(), Some(90.0));
        assert_eq!(MetricState::Value(json!("x")).as_f64(), None);
        assert_eq!(MetricState::Unknown.as_f64(), None);
    }
}
