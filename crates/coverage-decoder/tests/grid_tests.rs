//! Raster export of gridded coverages.

use chrono::{Duration, TimeZone, Utc};
use coverage_decoder::{
    CoverageJsonReader, DecodeError, DecoderConfig, ErrorKind, RangeDecoder,
};
use covjson_protocol::{CoverageJson, Domain, NdArray, Parameter};
use test_utils::{assert_approx_eq, grid_coverage, grid_coverage_with_levels, plane_coverage};

fn reader(doc: CoverageJson) -> CoverageJsonReader {
    CoverageJsonReader::new(doc).unwrap()
}

// ============================================================================
// Slice enumeration
// ============================================================================

#[test]
fn test_thirteen_time_steps_give_thirteen_slices() {
    let reader = reader(grid_coverage(3, 2, 13));
    let coverage = reader.coverage(0).unwrap();
    let products = coverage
        .raster_products("temp", &DecoderConfig::default(), coverage.time_step())
        .unwrap();

    assert_eq!(products.len(), 13);
    assert_eq!(products[0].name, "temp_t_2024-01-01T00_00Z");
    assert_eq!(products[12].name, "temp_t_2024-01-01T12_00Z");
    assert!(products.iter().all(|p| p.data.dim() == (2, 3)));
}

#[test]
fn test_time_and_levels_give_four_slices() {
    let reader = reader(grid_coverage_with_levels(2, 2, 2));
    let decoded = reader.decode(&DecoderConfig::default());

    let names: Vec<&str> = decoded.rasters.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(
        names,
        vec![
            "temp_t_2024-01-01T00_00Z_z_850",
            "temp_t_2024-01-01T00_00Z_z_500",
            "temp_t_2024-01-01T01_00Z_z_850",
            "temp_t_2024-01-01T01_00Z_z_500",
        ]
    );
    assert_eq!(decoded.rasters[1].z.as_deref(), Some("500"));
    assert!(decoded.is_complete());
}

#[test]
fn test_slice_values_follow_time_index() {
    let reader = reader(grid_coverage(3, 2, 2));
    let decoded = reader.decode(&DecoderConfig::default());

    // Second step is offset by 100000; top row is the northern (row 1) one.
    let second = &decoded.rasters[1].data;
    assert_eq!(second[[0, 0]], 100_001.0);
    assert_eq!(second[[1, 2]], 102_000.0);
}

// ============================================================================
// Georeferencing and time windows
// ============================================================================

#[test]
fn test_georeference_edges() {
    let reader = reader(grid_coverage(3, 2, 1));
    let decoded = reader.decode(&DecoderConfig::default());
    let geo = &decoded.rasters[0].georeference;

    assert_approx_eq!(geo.pixel_width(), 10.0, 1e-9);
    assert_approx_eq!(geo.x_min, -5.0, 1e-9);
    assert_approx_eq!(geo.x_max, 25.0, 1e-9);
    assert_approx_eq!(geo.y_min, 49.5, 1e-9);
    assert_approx_eq!(geo.y_max, 51.5, 1e-9);
}

#[test]
fn test_temporal_window_uses_time_step() {
    let reader = reader(grid_coverage(2, 2, 3));
    let decoded = reader.decode(&DecoderConfig::default());

    assert_eq!(decoded.time_step, Some(Duration::hours(1)));
    let window = decoded.rasters[1].temporal_window.unwrap();
    assert_eq!(window.start, Utc.with_ymd_and_hms(2024, 1, 1, 0, 30, 0).unwrap());
    assert_eq!(window.end, Utc.with_ymd_and_hms(2024, 1, 1, 1, 30, 0).unwrap());

    let range = decoded.time_range.unwrap();
    assert_eq!(range.end, Utc.with_ymd_and_hms(2024, 1, 1, 2, 0, 0).unwrap());
}

// ============================================================================
// Failures
// ============================================================================

#[test]
fn test_all_null_slice_is_empty_result() {
    let reader = reader(plane_coverage(2, 2, vec![None; 4]));
    let err = reader
        .coverage(0)
        .unwrap()
        .raster_products("value", &DecoderConfig::default(), None)
        .unwrap_err();
    assert_eq!(err, DecodeError::EmptyResult("value".into()));

    let decoded = reader.decode(&DecoderConfig::default());
    assert!(decoded.rasters.is_empty());
    assert_eq!(decoded.failures.len(), 1);
    assert_eq!(decoded.failures[0].kind, ErrorKind::EmptyResult);
}

#[test]
fn test_partially_null_slice_uses_no_data_value() {
    let reader = reader(plane_coverage(2, 2, vec![Some(3.0), None, None, None]));
    let config = DecoderConfig::default().with_no_data_value(-1.0);
    let decoded = reader.decode(&config);
    let raster = &decoded.rasters[0];

    assert_eq!(raster.no_data_value, -1.0);
    assert_eq!(raster.data[[1, 0]], 3.0);
    assert_eq!(raster.data[[0, 0]], -1.0);
    assert_eq!(raster.valid_cells(), 1);
}

#[test]
fn test_x_y_t_order_is_rejected() {
    let values: Vec<f64> = (0..12).map(f64::from).collect();
    let range = NdArray::new(values, vec![3, 2, 2], &["x", "y", "t"]);
    let err = RangeDecoder::new("temp", &range).decode_grid().unwrap_err();

    assert_eq!(
        err,
        DecodeError::AxisOrder(vec!["x".into(), "y".into(), "t".into()])
    );
    assert_eq!(err.kind(), ErrorKind::Axis);
}

#[test]
fn test_shape_value_mismatch() {
    let mut doc = grid_coverage(2, 2, 1);
    if let Some(ranges) = doc.ranges.as_mut() {
        ranges["temp"].values.pop();
    }
    let decoded = reader(doc).decode(&DecoderConfig::default());
    assert_eq!(decoded.failures[0].kind, ErrorKind::Range);
}

#[test]
fn test_string_range_cannot_be_rasterized() {
    let doc = CoverageJson::coverage(Domain::grid(vec![0.0, 1.0], vec![0.0, 1.0], None, None))
        .with_parameter(
            "label",
            Parameter::new("Label"),
            NdArray::text(
                vec![Some("a".into()), Some("b".into()), None, Some("d".into())],
                vec![2, 2],
                &["y", "x"],
            ),
        );
    let decoded = reader(doc).decode(&DecoderConfig::default());
    assert_eq!(decoded.failures[0].kind, ErrorKind::Range);
}

// ============================================================================
// Legends
// ============================================================================

fn encoded_grid(encoding: &[(&str, f64)]) -> CoverageJson {
    let parameter = encoding
        .iter()
        .fold(Parameter::new("Class"), |p, (k, v)| p.with_encoding(*k, *v));
    CoverageJson::coverage(Domain::grid(vec![0.0, 1.0], vec![0.0, 1.0], None, None)).with_parameter(
        "class",
        parameter,
        NdArray::new(vec![1.0, 10.0, 4.0, 2.0], vec![2, 2], &["y", "x"]),
    )
}

#[test]
fn test_legend_max_is_first_encoding_above_data() {
    let decoded = reader(encoded_grid(&[("#ff0000", 1.0), ("#00ff00", 15.0)]))
        .decode(&DecoderConfig::default());
    let legend = decoded.rasters[0].legend.as_ref().unwrap();

    assert_eq!(legend.classification_max, 15.0);
    assert_eq!(legend.minimum, 1.0);
    assert_eq!(legend.maximum, 10.0);
}

#[test]
fn test_legend_max_defaults_to_zero() {
    let decoded = reader(encoded_grid(&[("#ff0000", 1.0), ("#00ff00", 5.0)]))
        .decode(&DecoderConfig::default());
    let legend = decoded.rasters[0].legend.as_ref().unwrap();
    assert_eq!(legend.classification_max, 0.0);
}
