//! Range decoding: validate a parameter's `NdArray` and reshape its flat
//! values into an N-dimensional array.

use covjson_protocol::{NdArray, ScalarValue};
use ndarray::{ArrayD, IxDyn};
use serde::Serialize;
use std::fmt;

use crate::error::{DecodeError, Result};

/// Declared element type of a range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RangeDataType {
    Integer,
    Float,
    String,
}

impl RangeDataType {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "integer" => Some(RangeDataType::Integer),
            "float" => Some(RangeDataType::Float),
            "string" => Some(RangeDataType::String),
            _ => None,
        }
    }

    pub fn is_numeric(&self) -> bool {
        !matches!(self, RangeDataType::String)
    }
}

impl fmt::Display for RangeDataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RangeDataType::Integer => "integer",
            RangeDataType::Float => "float",
            RangeDataType::String => "string",
        };
        f.write_str(s)
    }
}

/// Reshaped values of a range.
#[derive(Debug, Clone, PartialEq)]
pub enum RangeValues {
    Numeric(ArrayD<Option<f64>>),
    Text(ArrayD<Option<String>>),
}

/// A parameter range reshaped according to its `shape`.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedRange {
    pub parameter: String,
    pub data_type: RangeDataType,
    pub axis_names: Vec<String>,
    pub values: RangeValues,
}

impl DecodedRange {
    pub fn shape(&self) -> &[usize] {
        match &self.values {
            RangeValues::Numeric(a) => a.shape(),
            RangeValues::Text(a) => a.shape(),
        }
    }

    /// Position of an axis in `axis_names`.
    pub fn axis_index(&self, name: &str) -> Option<usize> {
        self.axis_names.iter().position(|a| a == name)
    }

    /// Numeric array, or `UnsupportedDataType` for string ranges.
    pub fn numeric(&self) -> Result<&ArrayD<Option<f64>>> {
        match &self.values {
            RangeValues::Numeric(a) => Ok(a),
            RangeValues::Text(_) => Err(DecodeError::UnsupportedDataType {
                parameter: self.parameter.clone(),
                data_type: self.data_type.to_string(),
            }),
        }
    }
}

/// Validates and reshapes one parameter's range.
#[derive(Debug, Clone, Copy)]
pub struct RangeDecoder<'a> {
    parameter: &'a str,
    range: &'a NdArray,
}

impl<'a> RangeDecoder<'a> {
    pub fn new(parameter: &'a str, range: &'a NdArray) -> Self {
        Self { parameter, range }
    }

    pub fn parameter(&self) -> &str {
        self.parameter
    }

    /// Check the range is an inline `NdArray` and return its data type.
    pub fn data_type(&self) -> Result<RangeDataType> {
        let range_type = self.range.type_.as_deref().unwrap_or_default();
        if range_type != "NdArray" {
            return Err(DecodeError::UnsupportedRangeType {
                parameter: self.parameter.to_string(),
                range_type: range_type.to_string(),
            });
        }

        let data_type = self.range.data_type.as_deref().unwrap_or_default();
        RangeDataType::parse(data_type).ok_or_else(|| DecodeError::UnsupportedDataType {
            parameter: self.parameter.to_string(),
            data_type: data_type.to_string(),
        })
    }

    /// Validated flat values, in row-major order.
    ///
    /// When a shape is declared it must match the number of values.
    pub fn flat_values(&self) -> Result<&'a [Option<ScalarValue>]> {
        let data_type = self.data_type()?;
        if let Some(shape) = &self.range.shape {
            self.check_size(shape)?;
        }
        let unexpected = self.range.values.iter().flatten().find_map(|v| match v {
            ScalarValue::Other(other) => Some(other),
            _ => None,
        });
        if let Some(other) = unexpected {
            return Err(self.unexpected_value(data_type, other));
        }
        Ok(&self.range.values)
    }

    /// Axis names and shape, validated against each other and the values.
    ///
    /// A single value without `axisNames`/`shape` is a 0-d range.
    pub fn layout(&self) -> Result<(Vec<String>, Vec<usize>)> {
        match (&self.range.axis_names, &self.range.shape) {
            (Some(names), Some(shape)) => {
                if names.len() != shape.len() {
                    return Err(DecodeError::DimensionMismatch {
                        parameter: self.parameter.to_string(),
                        axes: names.len(),
                        dims: shape.len(),
                    });
                }
                self.check_size(shape)?;
                Ok((names.clone(), shape.clone()))
            }
            (None, None) if self.range.values.len() == 1 => Ok((Vec::new(), Vec::new())),
            _ => Err(DecodeError::MissingShape(self.parameter.to_string())),
        }
    }

    /// Reshape without any axis-order requirement.
    pub fn decode(&self) -> Result<DecodedRange> {
        let data_type = self.data_type()?;
        let (axis_names, shape) = self.layout()?;
        let values = self.reshape(data_type, &shape)?;

        tracing::debug!(
            parameter = self.parameter,
            axes = ?axis_names,
            shape = ?shape,
            "Decoded range"
        );

        Ok(DecodedRange {
            parameter: self.parameter.to_string(),
            data_type,
            axis_names,
            values,
        })
    }

    /// Reshape a gridded range.
    ///
    /// `x` and `y` must be present and adjacent. When the range holds more
    /// values than one `x`/`y` plane, the order must additionally follow
    /// `[t?, z?, y, x]`: the spatial pair comes last as `y, x` and `t`
    /// precedes `z`. Other axes may appear before the spatial pair.
    pub fn decode_grid(&self) -> Result<DecodedRange> {
        let decoded = self.decode()?;
        validate_grid_axes(&decoded.axis_names, decoded.shape())?;
        Ok(decoded)
    }

    fn check_size(&self, shape: &[usize]) -> Result<()> {
        let expected = element_count(shape).ok_or_else(|| DecodeError::ShapeOverflow {
            parameter: self.parameter.to_string(),
            shape: shape.to_vec(),
        })?;
        if expected != self.range.values.len() {
            return Err(DecodeError::ShapeMismatch {
                parameter: self.parameter.to_string(),
                expected,
                actual: self.range.values.len(),
            });
        }
        Ok(())
    }

    fn reshape(&self, data_type: RangeDataType, shape: &[usize]) -> Result<RangeValues> {
        let dim = IxDyn(shape);
        let shape_err = |_| DecodeError::ShapeMismatch {
            parameter: self.parameter.to_string(),
            expected: element_count(shape).unwrap_or(usize::MAX),
            actual: self.range.values.len(),
        };

        if data_type.is_numeric() {
            let flat = self
                .range
                .values
                .iter()
                .map(|v| self.numeric_value(data_type, v))
                .collect::<Result<Vec<_>>>()?;
            Ok(RangeValues::Numeric(
                ArrayD::from_shape_vec(dim, flat).map_err(shape_err)?,
            ))
        } else {
            let flat = self
                .range
                .values
                .iter()
                .map(|v| match v {
                    None => Ok(None),
                    Some(ScalarValue::Text(t)) => Ok(Some(t.clone())),
                    Some(ScalarValue::Number(n)) => Ok(Some(n.to_string())),
                    Some(ScalarValue::Other(other)) => Err(self.unexpected_value(data_type, other)),
                })
                .collect::<Result<Vec<_>>>()?;
            Ok(RangeValues::Text(
                ArrayD::from_shape_vec(dim, flat).map_err(shape_err)?,
            ))
        }
    }

    fn numeric_value(
        &self,
        data_type: RangeDataType,
        value: &Option<ScalarValue>,
    ) -> Result<Option<f64>> {
        match value {
            None => Ok(None),
            Some(ScalarValue::Number(n)) => Ok(Some(*n)),
            Some(ScalarValue::Text(t)) => Err(self.unexpected_value(data_type, t)),
            Some(ScalarValue::Other(other)) => Err(self.unexpected_value(data_type, other)),
        }
    }

    fn unexpected_value(&self, data_type: RangeDataType, value: &dyn fmt::Display) -> DecodeError {
        DecodeError::UnsupportedDataType {
            parameter: self.parameter.to_string(),
            data_type: format!("{} range holding value '{}'", data_type, value),
        }
    }
}

/// Number of elements in an array of `shape`, `None` on overflow.
pub fn element_count(shape: &[usize]) -> Option<usize> {
    shape.iter().try_fold(1usize, |count, &dim| count.checked_mul(dim))
}

fn validate_grid_axes(axis_names: &[String], shape: &[usize]) -> Result<()> {
    let position = |name: &str| axis_names.iter().position(|a| a == name);
    let x = position("x").ok_or_else(|| DecodeError::MissingAxis("x".to_string()))?;
    let y = position("y").ok_or_else(|| DecodeError::MissingAxis("y".to_string()))?;

    let order_error = || DecodeError::AxisOrder(axis_names.to_vec());

    if x.abs_diff(y) != 1 {
        return Err(order_error());
    }

    // `shape` already passed `check_size`, so neither count overflows.
    if element_count(shape) == element_count(&[shape[x], shape[y]]) {
        return Ok(());
    }

    let n = axis_names.len();
    if n < 2 || y != n - 2 || x != n - 1 {
        return Err(order_error());
    }
    if let (Some(t), Some(z)) = (position("t"), position("z")) {
        if t > z {
            return Err(order_error());
        }
    }

    let mut seen = std::collections::HashSet::new();
    if !axis_names.iter().all(|a| seen.insert(a.as_str())) {
        return Err(order_error());
    }

    Ok(())
}
