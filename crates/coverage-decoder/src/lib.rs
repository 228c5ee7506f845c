//! CoverageJSON decode pipeline.
//!
//! Turns a parsed CoverageJSON document into two kinds of products:
//! georeferenced raster slices for `Grid` coverages, and geometry plus
//! attribute feature sets for polygon, trajectory and point coverages.
//!
//! # Pipeline
//!
//! - [`CoverageJsonReader`] validates the document and exposes its coverages
//! - [`Coverage`] resolves a member's domain type, CRS and inherited parameters
//! - [`RangeDecoder`] reshapes flat range values into N-dimensional arrays
//! - [`DimensionAccessor`] enumerates the non-spatial planes of a range
//! - [`RasterExporter`] georeferences and fills one plane
//! - [`decode_geometries`] and [`FeatureAssembler`] build vector features
//! - [`CollectionAggregator`] merges and aggregates the members of a collection
//!
//! # Example
//!
//! ```rust
//! use coverage_decoder::{CoverageJsonReader, DecoderConfig};
//!
//! let json = r#"{
//!   "type": "Coverage",
//!   "domain": {
//!     "type": "Domain",
//!     "domainType": "Point",
//!     "axes": { "x": { "values": [5.0] }, "y": { "values": [52.0] } },
//!     "referencing": [{
//!       "coordinates": ["x", "y"],
//!       "system": { "type": "GeographicCRS", "id": "http://www.opengis.net/def/crs/OGC/1.3/CRS84" }
//!     }]
//!   },
//!   "ranges": {
//!     "temp": { "type": "NdArray", "dataType": "float", "axisNames": ["x"], "shape": [1], "values": [281.5] }
//!   }
//! }"#;
//!
//! let reader = CoverageJsonReader::from_str(json)?;
//! let decoded = reader.decode(&DecoderConfig::default());
//! assert_eq!(decoded.vectors[0].features.len(), 1);
//! # Ok::<(), coverage_decoder::DecodeError>(())
//! ```

pub mod axis;
pub mod classification;
pub mod collection;
pub mod config;
pub mod coverage;
pub mod crs;
pub mod dimension;
pub mod domain;
pub mod error;
pub mod features;
pub mod geometry;
pub mod range;
pub mod raster;
pub mod reader;
pub mod vector_render;

pub use axis::{linspace, AxisValue, ResolvedAxis};
pub use classification::{build_raster_legend, LegendStop, RasterLegend};
pub use collection::{CollectionAggregator, CoverageFailure, DecodedDocument, TimeAggregate};
pub use config::{ConfigError, DecoderConfig, DEFAULT_NO_DATA_COLOR, DEFAULT_NO_DATA_VALUE};
pub use coverage::Coverage;
pub use crs::{resolve_crs, resolve_system};
pub use dimension::{slice_plane, AxisSelector, DimensionAccessor, DimensionSlice};
pub use domain::DomainType;
pub use error::{DecodeError, ErrorKind, Result};
pub use features::{
    find_field, prepare_fields, Feature, FeatureAssembler, Field, FieldType, FieldValue,
    VectorProduct,
};
pub use geometry::{decode_geometries, validate_composite_axis, Geometry, GeometryKind};
pub use range::{DecodedRange, RangeDataType, RangeDecoder, RangeValues};
pub use raster::{sanitize_name, BandDataType, Georeference, RasterExporter, RasterProduct};
pub use reader::CoverageJsonReader;
pub use vector_render::{build_vector_renderer, CategoryValue, RenderCategory, VectorRenderer};
