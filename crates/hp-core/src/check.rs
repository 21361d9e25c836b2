//! Status validators
//!
//! Every validator discriminates JSON types strictly: a boolean never
//! satisfies a numeric check, a string never satisfies anything but an
//! enumerated string value.

use crate::device::json_kind;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Expected shape of a device's `status` value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StatusCheck {
    /// JSON `true` / `false`
    Boolean,
    /// Mathematical integer in `[min, max]`
    IntegerRange { min: i64, max: i64 },
    /// Any finite number in `[min, max]`
    FloatRange { min: f64, max: f64 },
    /// Member of an explicit set of JSON values
    OneOf { values: Vec<Value> },
}

/// Why a value failed a [`StatusCheck`]
#[derive(Debug, Clone, PartialEq)]
pub struct Violation {
    /// The constraint that was applied, e.g. "integer in [0, 100]"
    pub expected: String,
    /// The offending value
    pub actual: Value,
    /// Short description of the mismatch
    pub reason: String,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: expected {}, got {}",
            self.reason, self.expected, self.actual
        )
    }
}

impl std::error::Error for Violation {}

impl StatusCheck {
    /// Apply the check to a status value
    pub fn validate(&self, value: &Value) -> Result<(), Violation> {
        match self {
            StatusCheck::Boolean => {
                if value.is_boolean() {
                    Ok(())
                } else {
                    Err(self.violation(value, format!("{} is not a boolean", json_kind(value))))
                }
            }
            StatusCheck::IntegerRange { min, max } => {
                let Value::Number(n) = value else {
                    return Err(
                        self.violation(value, format!("{} is not a number", json_kind(value)))
                    );
                };
                let in_range = if let Some(i) = n.as_i64() {
                    *min <= i && i <= *max
                } else if n.is_u64() {
                    // larger than i64::MAX, so above any i64 max
                    false
                } else {
                    match n.as_f64() {
                        Some(f) if f.is_finite() && f.fract() == 0.0 => {
                            (*min as f64) <= f && f <= (*max as f64)
                        }
                        _ => return Err(self.violation(value, "value is not an integer")),
                    }
                };
                if in_range {
                    Ok(())
                } else {
                    Err(self.violation(value, "value out of range"))
                }
            }
            StatusCheck::FloatRange { min, max } => {
                let Some(f) = value.as_f64() else {
                    return Err(
                        self.violation(value, format!("{} is not a number", json_kind(value)))
                    );
                };
                if !f.is_finite() {
                    return Err(self.violation(value, "value is not finite"));
                }
                if *min <= f && f <= *max {
                    Ok(())
                } else {
                    Err(self.violation(value, "value out of range"))
                }
            }
            StatusCheck::OneOf { values } => {
                if values.iter().any(|allowed| strict_eq(allowed, value)) {
                    Ok(())
                } else {
                    Err(self.violation(value, "value not in allowed set"))
                }
            }
        }
    }

    fn violation(&self, value: &Value, reason: impl Into<String>) -> Violation {
        Violation {
            expected: self.to_string(),
            actual: value.clone(),
            reason: reason.into(),
        }
    }
}

impl fmt::Display for StatusCheck {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatusCheck::Boolean => write!(f, "boolean"),
            StatusCheck::IntegerRange { min, max } => write!(f, "integer in [{}, {}]", min, max),
            StatusCheck::FloatRange { min, max } => write!(f, "number in [{}, {}]", min, max),
            StatusCheck::OneOf { values } => {
                let items: Vec<String> = values.iter().map(Value::to_string).collect();
                write!(f, "one of [{}]", items.join(", "))
            }
        }
    }
}

/// Same JSON type and value; numbers compare numerically so `1` matches `1.0`
fn strict_eq(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => {
            if let (Some(x), Some(y)) = (x.as_i64(), y.as_i64()) {
                return x == y;
            }
            if let (Some(x), Some(y)) = (x.as_u64(), y.as_u64()) {
                return x == y;
            }
            match (x.as_f64(), y.as_f64()) {
                (Some(x), Some(y)) => x == y,
                _ => false,
            }
        }
        _ => a == b,
    }
}
