//! Geometry decoding from domain axes.
//!
//! Polygon, trajectory and multi-point domains carry their geometry in a
//! `composite` axis whose values are coordinate tuples, rings or lists of
//! rings. Point and point-series domains use the plain `x`/`y` axes.

use covjson_protocol::Domain;
use serde::Serialize;
use serde_json::Value;

use crate::axis::ResolvedAxis;
use crate::domain::DomainType;
use crate::error::{DecodeError, Result};

/// A ring or line as `[x, y]` pairs.
pub type Ring = Vec<[f64; 2]>;

/// Decoded geometry in the coverage's CRS.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum Geometry {
    Point {
        coordinates: [f64; 2],
    },
    LineString {
        coordinates: Ring,
    },
    /// First ring is the exterior, the rest are holes.
    Polygon {
        coordinates: Vec<Ring>,
    },
    MultiPolygon {
        coordinates: Vec<Vec<Ring>>,
    },
}

impl Geometry {
    pub fn point(x: f64, y: f64) -> Self {
        Geometry::Point {
            coordinates: [x, y],
        }
    }

    pub fn line_string(coordinates: Ring) -> Self {
        Geometry::LineString { coordinates }
    }

    pub fn polygon(rings: Vec<Ring>) -> Self {
        Geometry::Polygon { coordinates: rings }
    }

    pub fn kind(&self) -> GeometryKind {
        match self {
            Geometry::Point { .. } => GeometryKind::Point,
            Geometry::LineString { .. } => GeometryKind::LineString,
            Geometry::Polygon { .. } => GeometryKind::Polygon,
            Geometry::MultiPolygon { .. } => GeometryKind::MultiPolygon,
        }
    }

    /// Exterior ring of a polygon.
    pub fn exterior(&self) -> Option<&Ring> {
        match self {
            Geometry::Polygon { coordinates } => coordinates.first(),
            _ => None,
        }
    }

    /// Interior rings (holes) of a polygon.
    pub fn interiors(&self) -> &[Ring] {
        match self {
            Geometry::Polygon { coordinates } if !coordinates.is_empty() => &coordinates[1..],
            _ => &[],
        }
    }

    /// Total number of vertices.
    pub fn vertex_count(&self) -> usize {
        match self {
            Geometry::Point { .. } => 1,
            Geometry::LineString { coordinates } => coordinates.len(),
            Geometry::Polygon { coordinates } => coordinates.iter().map(Vec::len).sum(),
            Geometry::MultiPolygon { coordinates } => coordinates
                .iter()
                .flat_map(|p| p.iter().map(Vec::len))
                .sum(),
        }
    }
}

/// Geometry type of a vector product.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum GeometryKind {
    Point,
    LineString,
    Polygon,
    MultiPolygon,
}

impl GeometryKind {
    /// Layer geometry type for a domain type.
    pub fn for_domain_type(domain_type: DomainType) -> Result<Self> {
        match domain_type {
            DomainType::Polygon => Ok(GeometryKind::Polygon),
            DomainType::MultiPolygon => Ok(GeometryKind::MultiPolygon),
            DomainType::Trajectory => Ok(GeometryKind::LineString),
            DomainType::PointSeries | DomainType::Point | DomainType::MultiPoint => {
                Ok(GeometryKind::Point)
            }
            DomainType::Grid => Err(DecodeError::UnsupportedDomainType(format!(
                "{} has no vector geometry",
                domain_type
            ))),
        }
    }
}

/// Composite `dataType`s accepted for a domain type.
fn accepted_composite_types(domain_type: DomainType) -> &'static [&'static str] {
    match domain_type {
        DomainType::Polygon | DomainType::MultiPolygon => &["polygon"],
        DomainType::Trajectory | DomainType::MultiPoint => &["tuple"],
        DomainType::Grid | DomainType::PointSeries | DomainType::Point => &[],
    }
}

/// Check the composite axis is usable for `domain_type`.
///
/// Skipped for domain types that decode from the plain `x`/`y` axes.
pub fn validate_composite_axis(domain: &Domain, domain_type: DomainType) -> Result<()> {
    if !domain_type.uses_composite_axis() {
        return Ok(());
    }

    let composite = domain
        .axes
        .get("composite")
        .ok_or_else(|| DecodeError::MissingAxis("composite".to_string()))?;

    let data_type = composite.data_type.as_deref().unwrap_or_default();
    if !accepted_composite_types(domain_type)
        .iter()
        .any(|t| *t == data_type)
    {
        return Err(DecodeError::composite(format!(
            "unsupported data type '{}' for {} domain",
            data_type, domain_type
        )));
    }

    match composite.coordinates.as_deref() {
        Some([x, y]) if x == "x" && y == "y" => Ok(()),
        other => Err(DecodeError::composite(format!(
            "unsupported coordinates {:?}, expected [\"x\", \"y\"]",
            other.unwrap_or_default()
        ))),
    }
}

/// Decode every geometry of a domain, dispatched on its domain type.
pub fn decode_geometries(domain: &Domain, domain_type: DomainType) -> Result<Vec<Geometry>> {
    validate_composite_axis(domain, domain_type)?;

    let geometries = match domain_type {
        DomainType::Polygon => composite_values(domain)?
            .iter()
            .map(|v| parse_polygon(v).map(Geometry::polygon))
            .collect::<Result<Vec<_>>>()?,
        DomainType::MultiPolygon => composite_values(domain)?
            .iter()
            .map(parse_multipolygon)
            .collect::<Result<Vec<_>>>()?,
        DomainType::Trajectory => {
            let coords = composite_values(domain)?
                .iter()
                .map(parse_pair)
                .collect::<Result<Ring>>()?;
            vec![Geometry::line_string(coords)]
        }
        DomainType::MultiPoint => composite_values(domain)?
            .iter()
            .map(|v| parse_pair(v).map(|[x, y]| Geometry::point(x, y)))
            .collect::<Result<Vec<_>>>()?,
        DomainType::PointSeries | DomainType::Point => axis_points(domain)?,
        DomainType::Grid => {
            return Err(DecodeError::UnsupportedDomainType(format!(
                "{} has no vector geometry",
                domain_type
            )))
        }
    };

    tracing::debug!(
        domain_type = %domain_type,
        count = geometries.len(),
        "Decoded geometries"
    );

    Ok(geometries)
}

fn composite_values(domain: &Domain) -> Result<&[Value]> {
    domain
        .axes
        .get("composite")
        .and_then(|a| a.values.as_deref())
        .ok_or_else(|| DecodeError::composite("composite axis has no values"))
}

fn axis_points(domain: &Domain) -> Result<Vec<Geometry>> {
    let x = ResolvedAxis::from_domain(domain, "x")?.numeric()?;
    let y = ResolvedAxis::from_domain(domain, "y")?.numeric()?;
    if x.len() != y.len() {
        return Err(DecodeError::invalid_axis(
            "y",
            format!("{} values but x has {}", y.len(), x.len()),
        ));
    }
    Ok(x.into_iter()
        .zip(y)
        .map(|(x, y)| Geometry::point(x, y))
        .collect())
}

fn parse_pair(value: &Value) -> Result<[f64; 2]> {
    let invalid = || DecodeError::composite(format!("expected [x, y] pair, found {}", value));
    match value.as_array().map(Vec::as_slice) {
        Some([x, y, ..]) => Ok([
            x.as_f64().ok_or_else(invalid)?,
            y.as_f64().ok_or_else(invalid)?,
        ]),
        _ => Err(invalid()),
    }
}

fn parse_ring(value: &Value) -> Result<Ring> {
    value
        .as_array()
        .ok_or_else(|| DecodeError::composite(format!("expected ring, found {}", value)))?
        .iter()
        .map(parse_pair)
        .collect()
}

fn parse_polygon(value: &Value) -> Result<Vec<Ring>> {
    let rings = value
        .as_array()
        .ok_or_else(|| DecodeError::composite(format!("expected polygon, found {}", value)))?;
    if rings.is_empty() {
        return Err(DecodeError::composite("polygon without rings"));
    }
    rings.iter().map(parse_ring).collect()
}

/// A multipolygon element is either a list of polygons or a single polygon.
fn parse_multipolygon(value: &Value) -> Result<Geometry> {
    let is_nested = value
        .pointer("/0/0/0")
        .map(Value::is_array)
        .unwrap_or(false);

    let polygons = if is_nested {
        value
            .as_array()
            .map(|polys| polys.iter().map(parse_polygon).collect::<Result<Vec<_>>>())
            .unwrap_or_else(|| Err(DecodeError::composite("expected multipolygon")))?
    } else {
        vec![parse_polygon(value)?]
    };

    Ok(Geometry::MultiPolygon {
        coordinates: polygons,
    })
}
