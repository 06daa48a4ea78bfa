//! Comparands and comparison operators.
//!
//! A comparand's representation selects the dictionary a comparison scans:
//! byte sequences scan the term dictionary in byte order, longs and doubles
//! scan the numeric companion dictionaries in numeric order.

use std::fmt;
use std::ops::Bound;

use serde::{Deserialize, Serialize};

use crate::error::{QuarryError, Result};

/// The value a field is compared against.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Comparand {
    Bytes(Vec<u8>),
    Long(i64),
    Double(f64),
}

impl Comparand {
    pub fn is_numeric(&self) -> bool {
        !matches!(self, Comparand::Bytes(_))
    }

    fn as_double(&self) -> Option<f64> {
        match self {
            Comparand::Long(v) => Some(*v as f64),
            Comparand::Double(v) => Some(*v),
            Comparand::Bytes(_) => None,
        }
    }
}

impl fmt::Display for Comparand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Comparand::Bytes(bytes) => write!(f, "{:?}", String::from_utf8_lossy(bytes)),
            Comparand::Long(v) => write!(f, "{v}"),
            Comparand::Double(v) => write!(f, "{v}"),
        }
    }
}

impl From<&str> for Comparand {
    fn from(value: &str) -> Self {
        Comparand::Bytes(value.as_bytes().to_vec())
    }
}

impl From<String> for Comparand {
    fn from(value: String) -> Self {
        Comparand::Bytes(value.into_bytes())
    }
}

impl From<&[u8]> for Comparand {
    fn from(value: &[u8]) -> Self {
        Comparand::Bytes(value.to_vec())
    }
}

impl From<Vec<u8>> for Comparand {
    fn from(value: Vec<u8>) -> Self {
        Comparand::Bytes(value)
    }
}

impl From<i64> for Comparand {
    fn from(value: i64) -> Self {
        Comparand::Long(value)
    }
}

impl From<i32> for Comparand {
    fn from(value: i32) -> Self {
        Comparand::Long(value as i64)
    }
}

impl From<f64> for Comparand {
    fn from(value: f64) -> Self {
        Comparand::Double(value)
    }
}

/// Comparison operators of the match algebra.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompareOp {
    GreaterThan,
    GreaterThanOrEqual,
    LessThan,
    LessThanOrEqual,
    Equals,
    NotEquals,
    Between,
    NotBetween,
}

impl CompareOp {
    pub fn name(self) -> &'static str {
        match self {
            CompareOp::GreaterThan => "GreaterThan",
            CompareOp::GreaterThanOrEqual => "GreaterThanOrEqual",
            CompareOp::LessThan => "LessThan",
            CompareOp::LessThanOrEqual => "LessThanOrEqual",
            CompareOp::Equals => "Equals",
            CompareOp::NotEquals => "NotEquals",
            CompareOp::Between => "Between",
            CompareOp::NotBetween => "NotBetween",
        }
    }

    /// Whether the operator keeps the input ids outside the selected range.
    pub fn is_negated(self) -> bool {
        matches!(self, CompareOp::NotEquals | CompareOp::NotBetween)
    }

    pub fn is_two_sided(self) -> bool {
        matches!(self, CompareOp::Between | CompareOp::NotBetween)
    }
}

/// Dictionary range selected by an operator, in the comparand's representation.
#[derive(Debug, Clone, PartialEq)]
pub enum ValueRange {
    Bytes(Bound<Vec<u8>>, Bound<Vec<u8>>),
    Long(Bound<i64>, Bound<i64>),
    Double(Bound<f64>, Bound<f64>),
}

impl ValueRange {
    /// The range an operator selects. Negated operators select the range of
    /// their positive form; two-sided operators need `high`.
    ///
    /// A long and a double comparand together are compared as doubles; a
    /// byte sequence cannot be mixed with a number.
    pub fn resolve(op: CompareOp, low: Comparand, high: Option<Comparand>) -> Result<Self> {
        if op.is_two_sided() {
            let Some(high) = high else {
                return Err(QuarryError::query(format!("{} needs two comparands", op.name())));
            };
            return Self::between(low, high);
        }

        Ok(match low {
            Comparand::Bytes(v) => {
                let (lower, upper) = one_sided(op, v);
                ValueRange::Bytes(lower, upper)
            }
            Comparand::Long(v) => {
                let (lower, upper) = one_sided(op, v);
                ValueRange::Long(lower, upper)
            }
            Comparand::Double(v) => {
                let (lower, upper) = one_sided(op, v);
                ValueRange::Double(lower, upper)
            }
        })
    }

    fn between(low: Comparand, high: Comparand) -> Result<Self> {
        match (low, high) {
            (Comparand::Bytes(l), Comparand::Bytes(h)) => Ok(ValueRange::Bytes(Bound::Included(l), Bound::Included(h))),
            (Comparand::Long(l), Comparand::Long(h)) => Ok(ValueRange::Long(Bound::Included(l), Bound::Included(h))),
            (l, h) => match (l.as_double(), h.as_double()) {
                (Some(l), Some(h)) => Ok(ValueRange::Double(Bound::Included(l), Bound::Included(h))),
                _ => Err(QuarryError::query("cannot compare a byte sequence with a number")),
            },
        }
    }
}

fn one_sided<T: Clone>(op: CompareOp, value: T) -> (Bound<T>, Bound<T>) {
    match op {
        CompareOp::GreaterThan => (Bound::Excluded(value), Bound::Unbounded),
        CompareOp::GreaterThanOrEqual => (Bound::Included(value), Bound::Unbounded),
        CompareOp::LessThan => (Bound::Unbounded, Bound::Excluded(value)),
        CompareOp::LessThanOrEqual => (Bound::Unbounded, Bound::Included(value)),
        _ => (Bound::Included(value.clone()), Bound::Included(value)),
    }
}
