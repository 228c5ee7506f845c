//! Error types for the decode pipeline.

use serde::Serialize;
use thiserror::Error;

/// Errors that can occur while decoding a CoverageJSON document.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DecodeError {
    /// Missing or invalid top-level structure.
    #[error("invalid document: {0}")]
    DocumentFormat(String),

    /// A required axis is not declared by the domain.
    #[error("missing axis: {0}")]
    MissingAxis(String),

    /// An axis definition cannot be resolved.
    #[error("invalid axis '{axis}': {reason}")]
    InvalidAxis { axis: String, reason: String },

    /// Axis order violates the `[t?, z?, y, x]` convention.
    #[error("axis order {0:?} does not follow [t?, z?, y, x]")]
    AxisOrder(Vec<String>),

    /// Range is not an inline `NdArray`.
    #[error("parameter '{parameter}': unsupported range type '{range_type}'")]
    UnsupportedRangeType { parameter: String, range_type: String },

    /// Range data type is not integer, float or string.
    #[error("parameter '{parameter}': unsupported data type '{data_type}'")]
    UnsupportedDataType { parameter: String, data_type: String },

    /// Range is missing `axisNames` or `shape`.
    #[error("parameter '{0}': range has no axisNames/shape")]
    MissingShape(String),

    /// `len(shape) != len(axisNames)`.
    #[error("parameter '{parameter}': {axes} axis names but {dims} shape dimensions")]
    DimensionMismatch {
        parameter: String,
        axes: usize,
        dims: usize,
    },

    /// `product(shape) != len(values)`.
    #[error("parameter '{parameter}': shape implies {expected} values, found {actual}")]
    ShapeMismatch {
        parameter: String,
        expected: usize,
        actual: usize,
    },

    /// `product(shape)` does not fit in `usize`.
    #[error("parameter '{parameter}': shape {shape:?} is too large")]
    ShapeOverflow { parameter: String, shape: Vec<usize> },

    /// A range does not carry one value per feature.
    #[error("parameter '{parameter}': expected {expected} values (one per feature), found {actual}")]
    FeatureCountMismatch {
        parameter: String,
        expected: usize,
        actual: usize,
    },

    /// A parameter has no range in this coverage.
    #[error("parameter '{0}' has no range")]
    MissingRange(String),

    /// Composite axis is malformed for the domain type.
    #[error("composite axis error: {0}")]
    CompositeGeometry(String),

    /// Domain type has no decode rule.
    #[error("unsupported domain type: {0}")]
    UnsupportedDomainType(String),

    /// Every cell of a slice is no-data.
    #[error("no data in {0}")]
    EmptyResult(String),

    /// The referencing system cannot be resolved locally.
    #[error("unresolvable CRS: {0}")]
    UnresolvableCrs(String),
}

/// Coarse error categories callers can branch on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    DocumentFormat,
    Axis,
    Range,
    CompositeGeometry,
    DomainType,
    EmptyResult,
    UnresolvableCrs,
}

impl DecodeError {
    /// Category of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            DecodeError::DocumentFormat(_) => ErrorKind::DocumentFormat,
            DecodeError::MissingAxis(_)
            | DecodeError::InvalidAxis { .. }
            | DecodeError::AxisOrder(_) => ErrorKind::Axis,
            DecodeError::UnsupportedRangeType { .. }
            | DecodeError::UnsupportedDataType { .. }
            | DecodeError::MissingShape(_)
            | DecodeError::DimensionMismatch { .. }
            | DecodeError::ShapeMismatch { .. }
            | DecodeError::ShapeOverflow { .. }
            | DecodeError::FeatureCountMismatch { .. }
            | DecodeError::MissingRange(_) => ErrorKind::Range,
            DecodeError::CompositeGeometry(_) => ErrorKind::CompositeGeometry,
            DecodeError::UnsupportedDomainType(_) => ErrorKind::DomainType,
            DecodeError::EmptyResult(_) => ErrorKind::EmptyResult,
            DecodeError::UnresolvableCrs(_) => ErrorKind::UnresolvableCrs,
        }
    }

    /// Create a DocumentFormat error.
    pub fn document(msg: impl Into<String>) -> Self {
        Self::DocumentFormat(msg.into())
    }

    /// Create an InvalidAxis error.
    pub fn invalid_axis(axis: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidAxis {
            axis: axis.into(),
            reason: reason.into(),
        }
    }

    /// Create a CompositeGeometry error.
    pub fn composite(msg: impl Into<String>) -> Self {
        Self::CompositeGeometry(msg.into())
    }
}

impl From<serde_json::Error> for DecodeError {
    fn from(err: serde_json::Error) -> Self {
        Self::DocumentFormat(err.to_string())
    }
}

impl From<std::io::Error> for DecodeError {
    fn from(err: std::io::Error) -> Self {
        Self::DocumentFormat(err.to_string())
    }
}

/// Result type for decode operations.
pub type Result<T> = std::result::Result<T, DecodeError>;
