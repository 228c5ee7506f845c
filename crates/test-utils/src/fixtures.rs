//! Ready-made CoverageJSON documents for decoder tests.
//!
//! Each builder returns a [`CoverageJson`] that is valid unless its name
//! says otherwise; tests tweak fields directly to produce broken input.

use covjson_protocol::{
    Category, CoverageJson, Domain, NdArray, Parameter, Unit,
};

use crate::generators::{create_test_grid, create_time_stacked_grid, hourly_times, regular_coords};

/// A `[t, y, x]` grid coverage of `temp` in Kelvin.
///
/// `x` starts at 0 with spacing 10, `y` starts at 50 with spacing 1, and
/// `t` is hourly. Values follow [`create_time_stacked_grid`].
pub fn grid_coverage(width: usize, height: usize, steps: usize) -> CoverageJson {
    let domain = Domain::grid(
        regular_coords(0.0, 10.0, width),
        regular_coords(50.0, 1.0, height),
        Some(hourly_times(steps)),
        None,
    );
    CoverageJson::coverage(domain).with_parameter(
        "temp",
        Parameter::new("Air temperature").with_unit(Unit::kelvin()),
        NdArray::new(
            create_time_stacked_grid(width, height, steps),
            vec![steps, height, width],
            &["t", "y", "x"],
        ),
    )
}

/// A `[t, z, y, x]` grid coverage with two levels (850 and 500).
pub fn grid_coverage_with_levels(width: usize, height: usize, steps: usize) -> CoverageJson {
    let levels = vec![850.0, 500.0];
    let domain = Domain::grid(
        regular_coords(0.0, 10.0, width),
        regular_coords(50.0, 1.0, height),
        Some(hourly_times(steps)),
        Some(levels.clone()),
    );
    let values: Vec<f64> = (0..steps * levels.len())
        .flat_map(|plane| {
            create_test_grid(width, height)
                .into_iter()
                .map(move |v| v + (plane * 100_000) as f64)
        })
        .collect();
    CoverageJson::coverage(domain).with_parameter(
        "temp",
        Parameter::new("Air temperature").with_unit(Unit::kelvin()),
        NdArray::new(
            values,
            vec![steps, levels.len(), height, width],
            &["t", "z", "y", "x"],
        ),
    )
}

/// A 2-D `[y, x]` grid coverage with a given flat value list.
pub fn plane_coverage(width: usize, height: usize, values: Vec<Option<f64>>) -> CoverageJson {
    let domain = Domain::grid(
        regular_coords(0.0, 1.0, width),
        regular_coords(0.0, 1.0, height),
        None,
        None,
    );
    CoverageJson::coverage(domain).with_parameter(
        "value",
        Parameter::new("Value"),
        NdArray::with_missing(values, vec![height, width], &["y", "x"]),
    )
}

/// A categorical land-cover parameter.
///
/// Categories `forest` and `water` carry preferred colors; encoding maps
/// them to 1 and 2.
pub fn land_cover_parameter() -> Parameter {
    Parameter::new("Land cover")
        .with_categories(vec![
            Category::new("forest", "Forest").with_color("#228b22"),
            Category::new("water", "Water").with_color("#1e90ff"),
        ])
        .with_encoding("forest", 1.0)
        .with_encoding("water", 2.0)
}

/// A polygon coverage with one value of `landcover` per polygon.
pub fn polygon_coverage(polygons: Vec<Vec<Vec<[f64; 2]>>>, codes: Vec<i64>) -> CoverageJson {
    let n = polygons.len();
    CoverageJson::coverage(Domain::polygons(polygons)).with_parameter(
        "landcover",
        land_cover_parameter(),
        NdArray::integers(codes.into_iter().map(Some).collect(), vec![n], &["composite"]),
    )
}

/// A trajectory member coverage with a `speed` range over its positions.
///
/// Referencing is left to the enclosing collection.
pub fn trajectory_member(positions: Vec<[f64; 2]>, speed: f64) -> CoverageJson {
    let n = positions.len();
    CoverageJson {
        type_: Some("Coverage".to_string()),
        domain: Some(Domain::trajectory(positions).without_referencing()),
        ..Default::default()
    }
    .with_range("speed", NdArray::new(vec![speed; n], vec![n], &["composite"]))
}

/// A collection of trajectories sharing a `speed` parameter in m/s.
pub fn trajectory_collection(members: Vec<CoverageJson>) -> CoverageJson {
    CoverageJson::collection(members)
        .with_domain_type("Trajectory")
        .with_shared_parameter(
            "speed",
            Parameter::new("Speed").with_unit(Unit::from_symbol("m/s")),
        )
}

/// A point-series member at `(x, y)` with hourly `temp` values.
pub fn point_series_member(x: f64, y: f64, values: Vec<f64>) -> CoverageJson {
    let n = values.len();
    CoverageJson {
        type_: Some("Coverage".to_string()),
        domain: Some(Domain::point_series(x, y, hourly_times(n)).without_referencing()),
        ..Default::default()
    }
    .with_range("temp", NdArray::new(values, vec![n], &["t"]))
}

/// A collection of point series sharing a `temp` parameter in Kelvin.
pub fn point_series_collection(members: Vec<CoverageJson>) -> CoverageJson {
    CoverageJson::collection(members)
        .with_domain_type("PointSeries")
        .with_shared_parameter(
            "temp",
            Parameter::new("Air temperature").with_unit(Unit::kelvin()),
        )
}
