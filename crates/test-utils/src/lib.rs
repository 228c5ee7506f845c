//! Test support for the CoverageJSON crates.
//!
//! - [`fixtures`]: ready-made grid, polygon, trajectory and point-series documents
//! - [`generators`]: predictable value grids, coordinates, timestamps and tracks
//! - [`paths`]: sample document lookup and temporary documents
//!
//! ```ignore
//! use test_utils::{grid_coverage, require_test_file};
//! ```

pub mod fixtures;
pub mod generators;
pub mod paths;

pub use fixtures::*;
pub use generators::*;
pub use paths::*;

/// Resolve a sample document, or skip the calling test when it is absent.
///
/// ```ignore
/// #[test]
/// fn test_sample_grid() {
///     let path = test_utils::require_test_file!("grid_temperature.covjson");
///     // ...
/// }
/// ```
#[macro_export]
macro_rules! require_test_file {
    ($name:expr) => {{
        match $crate::find_test_file($name) {
            Some(path) => path,
            None => {
                eprintln!("SKIPPED: sample '{}' not found (set TEST_DATA_DIR)", $name);
                return;
            }
        }
    }};
}

/// Assert `|left - right| <= tolerance`, comparing as `f64`.
#[macro_export]
macro_rules! assert_approx_eq {
    ($left:expr, $right:expr, $tolerance:expr) => {{
        let (actual, expected, tolerance) = ($left as f64, $right as f64, $tolerance as f64);
        assert!(
            (actual - expected).abs() <= tolerance,
            "values not within {}: {} vs {}",
            tolerance,
            actual,
            expected
        );
    }};
}
