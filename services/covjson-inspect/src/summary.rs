//! JSON report of a decoded document.

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use coverage_decoder::{
    BandDataType, CoverageFailure, DecodedDocument, DomainType, GeometryKind, RasterProduct,
    VectorProduct, VectorRenderer,
};
use covjson_common::TimeRange;

#[derive(Debug, Serialize)]
pub struct RasterSummary {
    pub name: String,
    pub parameter: String,
    pub width: usize,
    pub height: usize,
    pub band_type: BandDataType,
    /// `[x_min, y_min, x_max, y_max]`
    pub bounds: [f64; 4],
    pub crs: Option<String>,
    pub time: Option<DateTime<Utc>>,
    pub z: Option<String>,
    pub valid_cells: usize,
    pub no_data_value: f64,
    pub temporal_window: Option<TimeRange>,
    pub has_legend: bool,
}

impl From<&RasterProduct> for RasterSummary {
    fn from(raster: &RasterProduct) -> Self {
        let geo = &raster.georeference;
        Self {
            name: raster.name.clone(),
            parameter: raster.parameter.clone(),
            width: geo.width,
            height: geo.height,
            band_type: raster.band_type,
            bounds: [geo.x_min, geo.y_min, geo.x_max, geo.y_max],
            crs: geo.crs.authid(),
            time: raster.time,
            z: raster.z.clone(),
            valid_cells: raster.valid_cells(),
            no_data_value: raster.no_data_value,
            temporal_window: raster.temporal_window,
            has_legend: raster.legend.is_some(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct VectorSummary {
    pub name: String,
    pub domain_type: DomainType,
    pub geometry_kind: GeometryKind,
    pub crs: Option<String>,
    pub fields: Vec<String>,
    pub feature_count: usize,
    pub renderer: VectorRenderer,
    pub time_range: Option<TimeRange>,
}

impl From<&VectorProduct> for VectorSummary {
    fn from(vector: &VectorProduct) -> Self {
        Self {
            name: vector.name.clone(),
            domain_type: vector.domain_type,
            geometry_kind: vector.geometry_kind,
            crs: vector.crs.authid(),
            fields: vector.fields.iter().map(|f| f.display_name.clone()).collect(),
            feature_count: vector.len(),
            renderer: vector.renderer.clone(),
            time_range: vector.time_range,
        }
    }
}

/// Top-level report printed by the inspector.
#[derive(Debug, Serialize)]
pub struct DocumentSummary {
    pub source: String,
    pub coverage_type: String,
    pub coverages: usize,
    pub rasters: Vec<RasterSummary>,
    pub vectors: Vec<VectorSummary>,
    pub failures: Vec<CoverageFailure>,
    pub time_range: Option<TimeRange>,
    /// Time step in seconds.
    pub time_step: Option<i64>,
}

impl DocumentSummary {
    pub fn new(source: &str, coverage_type: &str, coverages: usize, decoded: &DecodedDocument) -> Self {
        Self {
            source: source.to_string(),
            coverage_type: coverage_type.to_string(),
            coverages,
            rasters: decoded.rasters.iter().map(RasterSummary::from).collect(),
            vectors: decoded.vectors.iter().map(VectorSummary::from).collect(),
            failures: decoded.failures.clone(),
            time_range: decoded.time_range,
            time_step: decoded.time_step.as_ref().map(Duration::num_seconds),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use coverage_decoder::{CoverageJsonReader, DecoderConfig};
    use test_utils::{grid_coverage, track, trajectory_collection, trajectory_member};

    #[test]
    fn test_grid_summary() {
        let reader = CoverageJsonReader::new(grid_coverage(3, 2, 2)).unwrap();
        let decoded = reader.decode(&DecoderConfig::default());
        let summary = DocumentSummary::new("grid", "Coverage", 1, &decoded);

        assert_eq!(summary.rasters.len(), 2);
        assert_eq!(summary.rasters[0].width, 3);
        assert_eq!(summary.rasters[0].valid_cells, 6);
        assert_eq!(summary.time_step, Some(3600));
        assert!(summary.failures.is_empty());
    }

    #[test]
    fn test_vector_summary_serializes() {
        let members = vec![
            trajectory_member(track([0.0, 0.0], 3), 1.0),
            trajectory_member(track([1.0, 0.0], 3), 2.0),
        ];
        let reader = CoverageJsonReader::new(trajectory_collection(members)).unwrap();
        let decoded = reader.decode(&DecoderConfig::default());
        let summary = DocumentSummary::new("tracks", "CoverageCollection", 2, &decoded);

        assert_eq!(summary.vectors[0].feature_count, 2);
        assert_eq!(summary.vectors[0].fields, vec!["speed (m/s)"]);

        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["vectors"][0]["name"], "Trajectory");
        assert_eq!(json["vectors"][0]["renderer"]["type"], "single_symbol");
    }

    #[test]
    fn test_failures_are_reported_per_coverage() {
        let mut broken = trajectory_member(track([0.0, 0.0], 3), 1.0);
        broken.domain = None;
        let members = vec![broken, trajectory_member(track([1.0, 0.0], 3), 2.0)];
        let reader = CoverageJsonReader::new(trajectory_collection(members)).unwrap();
        let decoded = reader.decode(&DecoderConfig::default());
        let summary = DocumentSummary::new("tracks", "CoverageCollection", 2, &decoded);

        assert_eq!(summary.coverages, 2);
        assert_eq!(summary.vectors[0].feature_count, 1);

        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["failures"][0]["index"], 0);
        assert_eq!(json["failures"][0]["kind"], "document_format");
        assert!(json["time_step"].is_null());
    }
}
