//! CoverageJSON document types.
//!
//! The same [`CoverageJson`] struct models a standalone `Coverage`, a
//! `CoverageCollection`, and each member of a collection's `coverages`
//! list. Fields are deliberately lenient (mostly optional) so that
//! structural problems surface as typed decode errors downstream instead
//! of opaque deserialization failures.
//!
//! See: <https://covjson.org/spec/>

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};

use crate::parameters::Parameter;

/// Default CRS identifier used by the builders.
pub const CRS84_ID: &str = "http://www.opengis.net/def/crs/OGC/1.3/CRS84";

/// A CoverageJSON document, or one member of a collection.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct CoverageJson {
    /// Document type ("Coverage" or "CoverageCollection").
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub type_: Option<String>,

    /// Collection-level domain type, inherited by members that omit one.
    #[serde(rename = "domainType", default, skip_serializing_if = "Option::is_none")]
    pub domain_type: Option<String>,

    /// The domain of a single coverage.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain: Option<Domain>,

    /// Parameter definitions, in declaration order.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameters: Option<IndexMap<String, Parameter>>,

    /// Collection-level referencing shared by every member.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub referencing: Option<Vec<ReferenceSystemConnection>>,

    /// Members of a collection.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coverages: Option<Vec<CoverageJson>>,

    /// Data ranges for each parameter, in declaration order.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ranges: Option<IndexMap<String, NdArray>>,
}

impl CoverageJson {
    /// Create a single coverage over `domain`.
    pub fn coverage(domain: Domain) -> Self {
        Self {
            type_: Some("Coverage".to_string()),
            domain: Some(domain),
            parameters: Some(IndexMap::new()),
            ranges: Some(IndexMap::new()),
            ..Default::default()
        }
    }

    /// Create a collection with geographic referencing.
    pub fn collection(coverages: Vec<CoverageJson>) -> Self {
        Self {
            type_: Some("CoverageCollection".to_string()),
            referencing: Some(vec![ReferenceSystemConnection::geographic(CRS84_ID)]),
            coverages: Some(coverages),
            ..Default::default()
        }
    }

    /// Parsed document type, if recognized.
    pub fn coverage_type(&self) -> Option<CoverageType> {
        self.type_.as_deref().and_then(CoverageType::parse)
    }

    /// Add a parameter definition together with its range.
    pub fn with_parameter(mut self, name: &str, param: Parameter, range: NdArray) -> Self {
        self.parameters
            .get_or_insert_with(IndexMap::new)
            .insert(name.to_string(), param);
        self.ranges
            .get_or_insert_with(IndexMap::new)
            .insert(name.to_string(), range);
        self
    }

    /// Add a range without a parameter definition.
    pub fn with_range(mut self, name: &str, range: NdArray) -> Self {
        self.ranges
            .get_or_insert_with(IndexMap::new)
            .insert(name.to_string(), range);
        self
    }

    /// Add a collection-level parameter definition.
    pub fn with_shared_parameter(mut self, name: &str, param: Parameter) -> Self {
        self.parameters
            .get_or_insert_with(IndexMap::new)
            .insert(name.to_string(), param);
        self
    }

    /// Set the collection-level domain type.
    pub fn with_domain_type(mut self, domain_type: impl Into<String>) -> Self {
        self.domain_type = Some(domain_type.into());
        self
    }

    /// Replace the top-level referencing.
    pub fn with_referencing(mut self, referencing: Vec<ReferenceSystemConnection>) -> Self {
        self.referencing = Some(referencing);
        self
    }
}

/// Top-level document kinds accepted by the decoder.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum CoverageType {
    /// Single coverage.
    Coverage,
    /// Collection of coverages.
    CoverageCollection,
}

impl CoverageType {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Coverage" => Some(CoverageType::Coverage),
            "CoverageCollection" => Some(CoverageType::CoverageCollection),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CoverageType::Coverage => "Coverage",
            CoverageType::CoverageCollection => "CoverageCollection",
        }
    }
}

/// The domain of a coverage.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Domain {
    /// Domain type (always "Domain").
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub type_: Option<String>,

    /// The domain type (Grid, Polygon, Trajectory, ...).
    #[serde(rename = "domainType", default, skip_serializing_if = "Option::is_none")]
    pub domain_type: Option<String>,

    /// Axis definitions, in declaration order.
    #[serde(default)]
    pub axes: IndexMap<String, Axis>,

    /// Reference systems for axes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub referencing: Option<Vec<ReferenceSystemConnection>>,
}

impl Domain {
    fn with_type(domain_type: &str) -> Self {
        Self {
            type_: Some("Domain".to_string()),
            domain_type: Some(domain_type.to_string()),
            axes: IndexMap::new(),
            referencing: None,
        }
    }

    /// Create a grid domain with optional `t` and `z` axes.
    pub fn grid(
        x_values: Vec<f64>,
        y_values: Vec<f64>,
        t_values: Option<Vec<String>>,
        z_values: Option<Vec<f64>>,
    ) -> Self {
        let mut domain = Self::with_type("Grid");
        domain.axes.insert("x".to_string(), Axis::numbers(x_values));
        domain.axes.insert("y".to_string(), Axis::numbers(y_values));
        if let Some(t) = t_values {
            domain.axes.insert("t".to_string(), Axis::strings(t));
        }
        if let Some(z) = z_values {
            domain.axes.insert("z".to_string(), Axis::numbers(z));
        }
        domain.with_geographic_referencing()
    }

    /// Create a point series domain (time series at a single point).
    pub fn point_series(x: f64, y: f64, t_values: Vec<String>) -> Self {
        let mut domain = Self::with_type("PointSeries");
        domain.axes.insert("x".to_string(), Axis::numbers(vec![x]));
        domain.axes.insert("y".to_string(), Axis::numbers(vec![y]));
        domain.axes.insert("t".to_string(), Axis::strings(t_values));
        domain.with_geographic_referencing()
    }

    /// Create a point domain.
    pub fn point(x: f64, y: f64) -> Self {
        let mut domain = Self::with_type("Point");
        domain.axes.insert("x".to_string(), Axis::numbers(vec![x]));
        domain.axes.insert("y".to_string(), Axis::numbers(vec![y]));
        domain.with_geographic_referencing()
    }

    /// Create a polygon domain; each polygon is a list of rings of `[x, y]` pairs.
    pub fn polygons(polygons: Vec<Vec<Vec<[f64; 2]>>>) -> Self {
        let values = polygons
            .into_iter()
            .map(|rings| Value::Array(rings.into_iter().map(ring_value).collect()))
            .collect();
        let mut domain = Self::with_type("Polygon");
        domain
            .axes
            .insert("composite".to_string(), Axis::composite("polygon", values));
        domain.with_geographic_referencing()
    }

    /// Create a trajectory domain through `coords`.
    pub fn trajectory(coords: Vec<[f64; 2]>) -> Self {
        let values = coords.into_iter().map(pair_value).collect();
        let mut domain = Self::with_type("Trajectory");
        domain
            .axes
            .insert("composite".to_string(), Axis::composite("tuple", values));
        domain.with_geographic_referencing()
    }

    /// Create a multi-point domain.
    pub fn multipoint(coords: Vec<[f64; 2]>) -> Self {
        let values = coords.into_iter().map(pair_value).collect();
        let mut domain = Self::with_type("MultiPoint");
        domain
            .axes
            .insert("composite".to_string(), Axis::composite("tuple", values));
        domain.with_geographic_referencing()
    }

    /// Add or replace an axis.
    pub fn with_axis(mut self, name: &str, axis: Axis) -> Self {
        self.axes.insert(name.to_string(), axis);
        self
    }

    /// Drop the domain-level referencing (collections carry it at the top).
    pub fn without_referencing(mut self) -> Self {
        self.referencing = None;
        self
    }

    fn with_geographic_referencing(mut self) -> Self {
        self.referencing = Some(vec![ReferenceSystemConnection::geographic(CRS84_ID)]);
        self
    }
}

fn pair_value(pair: [f64; 2]) -> Value {
    Value::Array(vec![Value::from(pair[0]), Value::from(pair[1])])
}

fn ring_value(ring: Vec<[f64; 2]>) -> Value {
    Value::Array(ring.into_iter().map(pair_value).collect())
}

/// An axis of a domain.
///
/// An axis is either an explicit `values` list or a regular
/// `start`/`stop`/`num` triple. Composite axes additionally carry a
/// `dataType` and the names of the coordinates packed into each value.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Axis {
    /// Explicit values (numbers, timestamps or coordinate tuples).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub values: Option<Vec<Value>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stop: Option<f64>,

    /// Sample count. Kept as a raw number and checked by [`Axis::count`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub num: Option<Number>,

    /// Composite value kind ("polygon", "tuple").
    #[serde(rename = "dataType", default, skip_serializing_if = "Option::is_none")]
    pub data_type: Option<String>,

    /// Coordinate names packed into composite values.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coordinates: Option<Vec<String>>,
}

impl Axis {
    /// Explicit list of raw values.
    pub fn values(values: Vec<Value>) -> Self {
        Self {
            values: Some(values),
            ..Default::default()
        }
    }

    /// Explicit list of numbers.
    pub fn numbers(values: Vec<f64>) -> Self {
        Self::values(values.into_iter().map(Value::from).collect())
    }

    /// Explicit list of strings (e.g. ISO 8601 timestamps).
    pub fn strings(values: Vec<String>) -> Self {
        Self::values(values.into_iter().map(Value::String).collect())
    }

    /// Regular axis defined by start, stop, and number of points.
    pub fn regular(start: f64, stop: f64, num: usize) -> Self {
        Self {
            start: Some(start),
            stop: Some(stop),
            num: Some(Number::from(num)),
            ..Default::default()
        }
    }

    /// Composite axis over `x`/`y`.
    pub fn composite(data_type: &str, values: Vec<Value>) -> Self {
        Self {
            values: Some(values),
            data_type: Some(data_type.to_string()),
            coordinates: Some(vec!["x".to_string(), "y".to_string()]),
            ..Default::default()
        }
    }

    /// `num` as a count; `None` when absent, negative or fractional.
    pub fn count(&self) -> Option<usize> {
        let num = self.num.as_ref()?;
        let whole = match num.as_u64() {
            Some(n) => n,
            None => num
                .as_f64()
                .filter(|f| *f >= 0.0 && f.fract() == 0.0 && *f <= u64::MAX as f64)
                .map(|f| f as u64)?,
        };
        usize::try_from(whole).ok()
    }

    /// Number of declared values, if the axis is well formed.
    pub fn len(&self) -> Option<usize> {
        match &self.values {
            Some(values) => Some(values.len()),
            None => self.count(),
        }
    }

    /// Check if the axis declares no values.
    pub fn is_empty(&self) -> bool {
        self.len().unwrap_or(0) == 0
    }
}

/// Connection between axes and their reference system.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReferenceSystemConnection {
    /// Axes that use this reference system.
    #[serde(default)]
    pub coordinates: Vec<String>,

    /// The reference system.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system: Option<ReferenceSystem>,
}

impl ReferenceSystemConnection {
    /// Geographic CRS over `x`/`y`.
    pub fn geographic(id: &str) -> Self {
        Self {
            coordinates: vec!["x".to_string(), "y".to_string()],
            system: Some(ReferenceSystem::geographic(id)),
        }
    }

    /// Gregorian temporal system over `t`.
    pub fn temporal() -> Self {
        Self {
            coordinates: vec!["t".to_string()],
            system: Some(ReferenceSystem::temporal("Gregorian")),
        }
    }

    /// Check if this connection covers both horizontal coordinates.
    pub fn covers_xy(&self) -> bool {
        self.coordinates.iter().any(|c| c == "x") && self.coordinates.iter().any(|c| c == "y")
    }
}

/// A reference system definition.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ReferenceSystem {
    /// System type ("GeographicCRS", "ProjectedCRS", "TemporalRS", ...).
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub type_: Option<String>,

    /// CRS identifier (URI or authority code).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Embedded WKT definition.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wkt: Option<String>,

    /// Calendar of a temporal system.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub calendar: Option<String>,
}

impl ReferenceSystem {
    pub fn geographic(id: &str) -> Self {
        Self {
            type_: Some("GeographicCRS".to_string()),
            id: Some(id.to_string()),
            ..Default::default()
        }
    }

    pub fn temporal(calendar: &str) -> Self {
        Self {
            type_: Some("TemporalRS".to_string()),
            calendar: Some(calendar.to_string()),
            ..Default::default()
        }
    }

    pub fn with_wkt(mut self, wkt: impl Into<String>) -> Self {
        self.wkt = Some(wkt.into());
        self
    }
}

/// A single range value.
///
/// Values that are neither numbers nor strings are kept as `Other` so that
/// they fail only the range holding them.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum ScalarValue {
    Number(f64),
    Text(String),
    Other(Value),
}

impl ScalarValue {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            ScalarValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            ScalarValue::Text(s) => Some(s),
            _ => None,
        }
    }
}

/// N-dimensional array containing data values.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct NdArray {
    /// Type (always "NdArray" for inline ranges).
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub type_: Option<String>,

    /// Data type of values ("integer", "float", "string").
    #[serde(rename = "dataType", default, skip_serializing_if = "Option::is_none")]
    pub data_type: Option<String>,

    /// Names of axes in order.
    #[serde(rename = "axisNames", default, skip_serializing_if = "Option::is_none")]
    pub axis_names: Option<Vec<String>>,

    /// Shape of the array.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shape: Option<Vec<usize>>,

    /// Flat values in row-major order; `null` marks missing data.
    #[serde(default)]
    pub values: Vec<Option<ScalarValue>>,
}

impl NdArray {
    fn build(
        data_type: &str,
        values: Vec<Option<ScalarValue>>,
        shape: Vec<usize>,
        axis_names: &[&str],
    ) -> Self {
        Self {
            type_: Some("NdArray".to_string()),
            data_type: Some(data_type.to_string()),
            axis_names: Some(axis_names.iter().map(|s| s.to_string()).collect()),
            shape: Some(shape),
            values,
        }
    }

    /// Create a float array without missing values.
    pub fn new(values: Vec<f64>, shape: Vec<usize>, axis_names: &[&str]) -> Self {
        let values = values.into_iter().map(|v| Some(ScalarValue::Number(v))).collect();
        Self::build("float", values, shape, axis_names)
    }

    /// Create a float array with missing values.
    pub fn with_missing(values: Vec<Option<f64>>, shape: Vec<usize>, axis_names: &[&str]) -> Self {
        let values = values
            .into_iter()
            .map(|v| v.map(ScalarValue::Number))
            .collect();
        Self::build("float", values, shape, axis_names)
    }

    /// Create an integer array.
    pub fn integers(values: Vec<Option<i64>>, shape: Vec<usize>, axis_names: &[&str]) -> Self {
        let values = values
            .into_iter()
            .map(|v| v.map(|i| ScalarValue::Number(i as f64)))
            .collect();
        Self::build("integer", values, shape, axis_names)
    }

    /// Create a string array.
    pub fn text(values: Vec<Option<String>>, shape: Vec<usize>, axis_names: &[&str]) -> Self {
        let values = values.into_iter().map(|v| v.map(ScalarValue::Text)).collect();
        Self::build("string", values, shape, axis_names)
    }

    /// Number of elements implied by the shape; `None` without a shape or
    /// when the product overflows.
    pub fn size(&self) -> Option<usize> {
        self.shape
            .as_ref()?
            .iter()
            .try_fold(1usize, |count, &dim| count.checked_mul(dim))
    }
}
