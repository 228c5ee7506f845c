//! Common types shared by the CoverageJSON protocol and decoder crates.

pub mod crs;
pub mod style;
pub mod time;

pub use crs::{Crs, CrsCode, CrsParseError};
pub use style::{Color, ColorParseError};
pub use time::{parse_iso8601, TimeParseError, TimeRange};
