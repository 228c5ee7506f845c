//! Axis resolution.
//!
//! An axis is declared either as an explicit `values` list or as a
//! regular `start`/`stop`/`num` triple. Both forms resolve to an ordered
//! sequence of [`AxisValue`]s.

use chrono::{DateTime, Utc};
use covjson_common::parse_iso8601;
use covjson_protocol::{Axis, Domain};
use serde_json::Value;
use std::fmt;

use crate::error::{DecodeError, Result};

/// One resolved axis coordinate.
#[derive(Debug, Clone, PartialEq)]
pub enum AxisValue {
    Number(f64),
    Text(String),
}

impl AxisValue {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            AxisValue::Number(n) => Some(*n),
            AxisValue::Text(_) => None,
        }
    }

    /// Parse as an ISO 8601 timestamp.
    pub fn as_time(&self) -> Option<DateTime<Utc>> {
        match self {
            AxisValue::Text(s) => parse_iso8601(s).ok(),
            AxisValue::Number(_) => None,
        }
    }
}

impl fmt::Display for AxisValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AxisValue::Number(n) => write!(f, "{}", n),
            AxisValue::Text(s) => f.write_str(s),
        }
    }
}

/// An axis with its values materialized.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedAxis {
    pub name: String,
    pub values: Vec<AxisValue>,
}

impl ResolvedAxis {
    /// Resolve a declared axis.
    pub fn resolve(name: &str, axis: &Axis) -> Result<Self> {
        let values = match (&axis.values, axis.start, axis.stop, &axis.num) {
            (Some(values), _, _, _) => values
                .iter()
                .map(|v| scalar_value(name, v))
                .collect::<Result<Vec<_>>>()?,
            (None, Some(start), Some(stop), Some(num)) => {
                let count = axis.count().ok_or_else(|| {
                    DecodeError::invalid_axis(
                        name,
                        format!("num must be a non-negative integer, found {}", num),
                    )
                })?;
                linspace(start, stop, count)
                    .into_iter()
                    .map(AxisValue::Number)
                    .collect()
            }
            _ => {
                return Err(DecodeError::invalid_axis(
                    name,
                    "axis has neither values nor a start/stop/num triple",
                ))
            }
        };

        Ok(Self {
            name: name.to_string(),
            values,
        })
    }

    /// Resolve the axis `name` of `domain`.
    pub fn from_domain(domain: &Domain, name: &str) -> Result<Self> {
        let axis = domain
            .axes
            .get(name)
            .ok_or_else(|| DecodeError::MissingAxis(name.to_string()))?;
        Self::resolve(name, axis)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Numeric coordinates; fails on any non-numeric value.
    pub fn numeric(&self) -> Result<Vec<f64>> {
        self.values
            .iter()
            .map(|v| {
                v.as_f64().ok_or_else(|| {
                    DecodeError::invalid_axis(&self.name, format!("non-numeric value '{}'", v))
                })
            })
            .collect()
    }

    /// Timestamps, `None` where a value does not parse.
    pub fn times(&self) -> Vec<Option<DateTime<Utc>>> {
        self.values.iter().map(AxisValue::as_time).collect()
    }
}

fn scalar_value(axis: &str, value: &Value) -> Result<AxisValue> {
    match value {
        Value::Number(n) => n
            .as_f64()
            .map(AxisValue::Number)
            .ok_or_else(|| DecodeError::invalid_axis(axis, format!("unrepresentable number {}", n))),
        Value::String(s) => Ok(AxisValue::Text(s.clone())),
        other => Err(DecodeError::invalid_axis(
            axis,
            format!("expected number or string, found {}", other),
        )),
    }
}

/// `num` evenly spaced samples from `start` to `stop`, both inclusive.
pub fn linspace(start: f64, stop: f64, num: usize) -> Vec<f64> {
    match num {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (stop - start) / (num - 1) as f64;
            (0..num)
                .map(|i| if i == num - 1 { stop } else { start + step * i as f64 })
                .collect()
        }
    }
}
