//! Domain types with a decode rule.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::DecodeError;

/// Geometric/topological kind of a coverage.
///
/// Parsed case-insensitively from the document's `domainType`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum DomainType {
    Grid,
    Polygon,
    MultiPolygon,
    Trajectory,
    PointSeries,
    Point,
    MultiPoint,
}

impl DomainType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DomainType::Grid => "Grid",
            DomainType::Polygon => "Polygon",
            DomainType::MultiPolygon => "MultiPolygon",
            DomainType::Trajectory => "Trajectory",
            DomainType::PointSeries => "PointSeries",
            DomainType::Point => "Point",
            DomainType::MultiPoint => "MultiPoint",
        }
    }

    /// Whether geometries come from a composite axis.
    pub fn uses_composite_axis(&self) -> bool {
        matches!(
            self,
            DomainType::Polygon
                | DomainType::MultiPolygon
                | DomainType::Trajectory
                | DomainType::MultiPoint
        )
    }

    /// Whether each range contributes one value per coverage instead of one per geometry.
    pub fn simplifies_attributes(&self) -> bool {
        matches!(self, DomainType::Trajectory)
    }

    /// Whether the coverage decodes to raster slices.
    pub fn is_raster(&self) -> bool {
        matches!(self, DomainType::Grid)
    }
}

impl FromStr for DomainType {
    type Err = DecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "grid" => Ok(DomainType::Grid),
            "polygon" => Ok(DomainType::Polygon),
            "multipolygon" => Ok(DomainType::MultiPolygon),
            "trajectory" => Ok(DomainType::Trajectory),
            "pointseries" => Ok(DomainType::PointSeries),
            "point" => Ok(DomainType::Point),
            "multipoint" => Ok(DomainType::MultiPoint),
            _ => Err(DecodeError::UnsupportedDomainType(s.to_string())),
        }
    }
}

impl TryFrom<String> for DomainType {
    type Error = DecodeError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<DomainType> for String {
    fn from(d: DomainType) -> Self {
        d.as_str().to_string()
    }
}

impl fmt::Display for DomainType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
