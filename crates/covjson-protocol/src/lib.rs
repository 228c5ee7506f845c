//! CoverageJSON document model.
//!
//! This crate provides serde types for reading (and building) CoverageJSON
//! documents: single coverages and coverage collections, their domains and
//! axes, NdArray ranges and parameter metadata.
//!
//! Maps that carry meaning through their declaration order (`parameters`,
//! `ranges`, `axes`, `categoryEncoding`, localized labels) are backed by
//! [`indexmap::IndexMap`], so iteration follows the document.
//!
//! # Example
//!
//! ```rust
//! use covjson_protocol::CoverageJson;
//!
//! let json = r#"{
//!     "type": "Coverage",
//!     "domain": {
//!         "type": "Domain",
//!         "domainType": "Point",
//!         "axes": { "x": { "values": [5.0] }, "y": { "values": [52.0] } }
//!     },
//!     "ranges": {}
//! }"#;
//! let doc: CoverageJson = serde_json::from_str(json).unwrap();
//! assert_eq!(doc.type_.as_deref(), Some("Coverage"));
//! ```

pub mod coverage_json;
pub mod parameters;

pub use coverage_json::{
    Axis, CoverageJson, CoverageType, Domain, NdArray, ReferenceSystem,
    ReferenceSystemConnection, ScalarValue, CRS84_ID,
};
pub use parameters::{Category, I18nString, ObservedProperty, Parameter, Unit, UnitSymbol};
