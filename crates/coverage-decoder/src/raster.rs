//! Raster export: georeferencing and band preparation for 2-D slices.

use chrono::{DateTime, Duration, Utc};
use covjson_common::{Crs, TimeRange};
use ndarray::{s, Array2};
use serde::Serialize;

use crate::classification::RasterLegend;
use crate::error::{DecodeError, Result};
use crate::range::RangeDataType;

/// Pixel type of the output band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BandDataType {
    Int32,
    Float32,
}

impl BandDataType {
    /// Band type for a range; string ranges cannot be rasterized.
    pub fn for_range(parameter: &str, data_type: RangeDataType) -> Result<Self> {
        match data_type {
            RangeDataType::Integer => Ok(BandDataType::Int32),
            RangeDataType::Float => Ok(BandDataType::Float32),
            RangeDataType::String => Err(DecodeError::UnsupportedDataType {
                parameter: parameter.to_string(),
                data_type: data_type.to_string(),
            }),
        }
    }
}

/// North-up placement of a raster built from cell-center coordinates.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Georeference {
    pub crs: Crs,
    pub width: usize,
    pub height: usize,
    pub x_min: f64,
    pub x_max: f64,
    pub y_min: f64,
    pub y_max: f64,
}

impl Georeference {
    /// Compute outer edges from ascending cell-center coordinates.
    ///
    /// Each edge lies half a spacing beyond the outermost center, using the
    /// spacing of the two samples at that end.
    pub fn from_axes(x: &[f64], y: &[f64], crs: Crs) -> Result<Self> {
        let (x_min, x_max) = edges("x", x)?;
        let (y_min, y_max) = edges("y", y)?;

        Ok(Self {
            crs,
            width: x.len(),
            height: y.len(),
            x_min,
            x_max,
            y_min,
            y_max,
        })
    }

    pub fn pixel_width(&self) -> f64 {
        (self.x_max - self.x_min) / self.width as f64
    }

    pub fn pixel_height(&self) -> f64 {
        (self.y_max - self.y_min) / self.height as f64
    }

    /// Upper-left corner.
    pub fn origin(&self) -> (f64, f64) {
        (self.x_min, self.y_max)
    }

    /// GDAL-style affine transform.
    pub fn geotransform(&self) -> [f64; 6] {
        [
            self.x_min,
            self.pixel_width(),
            0.0,
            self.y_max,
            0.0,
            -self.pixel_height(),
        ]
    }
}

fn edges(axis: &str, coords: &[f64]) -> Result<(f64, f64)> {
    let n = coords.len();
    if n < 2 {
        return Err(DecodeError::invalid_axis(
            axis,
            format!("{} coordinate(s), at least 2 are needed to georeference", n),
        ));
    }
    let min = coords[0] - (coords[1] - coords[0]) / 2.0;
    let max = coords[n - 1] + (coords[n - 1] - coords[n - 2]) / 2.0;
    Ok((min, max))
}

/// A georeferenced single-band raster.
#[derive(Debug, Clone, PartialEq)]
pub struct RasterProduct {
    /// Sanitized product name.
    pub name: String,
    pub parameter: String,
    pub georeference: Georeference,
    pub band_type: BandDataType,
    pub no_data_value: f64,
    /// Cells in north-up row order; the first row is the maximum `y`.
    pub data: Array2<f64>,
    pub time: Option<DateTime<Utc>>,
    pub z: Option<String>,
    /// Fixed validity window centered on `time`.
    pub temporal_window: Option<TimeRange>,
    pub legend: Option<RasterLegend>,
}

impl RasterProduct {
    pub fn crs_wkt(&self) -> &str {
        self.georeference.crs.to_wkt()
    }

    pub fn pixel_size(&self) -> (f64, f64) {
        (self.georeference.pixel_width(), self.georeference.pixel_height())
    }

    /// Number of cells carrying data.
    pub fn valid_cells(&self) -> usize {
        self.data.iter().filter(|v| **v != self.no_data_value).count()
    }
}

/// Builds [`RasterProduct`]s sharing one georeference.
#[derive(Debug, Clone)]
pub struct RasterExporter {
    georeference: Georeference,
    band_type: BandDataType,
    no_data_value: f64,
    time_step: Option<Duration>,
}

impl RasterExporter {
    pub fn new(georeference: Georeference, band_type: BandDataType, no_data_value: f64) -> Self {
        Self {
            georeference,
            band_type,
            no_data_value,
            time_step: None,
        }
    }

    /// Attach a time step; slices with a time tag then get a fixed window.
    pub fn with_time_step(mut self, step: Option<Duration>) -> Self {
        self.time_step = step;
        self
    }

    pub fn georeference(&self) -> &Georeference {
        &self.georeference
    }

    /// Export one `(y, x)` ordered plane.
    pub fn export(
        &self,
        parameter: &str,
        name: &str,
        plane: &Array2<Option<f64>>,
        time: Option<DateTime<Utc>>,
        z: Option<String>,
    ) -> Result<RasterProduct> {
        let expected = (self.georeference.height, self.georeference.width);
        if plane.dim() != expected {
            return Err(DecodeError::ShapeMismatch {
                parameter: parameter.to_string(),
                expected: expected.0 * expected.1,
                actual: plane.len(),
            });
        }

        let name = sanitize_name(name);
        let data = write_band(&name, plane, self.no_data_value)?;

        let temporal_window = match (time, self.time_step) {
            (Some(t), Some(step)) => Some(TimeRange::centered_on(t, step)),
            _ => None,
        };

        tracing::debug!(
            name = %name,
            width = self.georeference.width,
            height = self.georeference.height,
            "Exported raster slice"
        );

        Ok(RasterProduct {
            name,
            parameter: parameter.to_string(),
            georeference: self.georeference.clone(),
            band_type: self.band_type,
            no_data_value: self.no_data_value,
            data,
            time,
            z,
            temporal_window,
            legend: None,
        })
    }
}

/// Substitute `no_data` for nulls and flip rows to north-up order.
///
/// Fails with `EmptyResult` when no cell carries data afterwards.
pub fn write_band(name: &str, plane: &Array2<Option<f64>>, no_data: f64) -> Result<Array2<f64>> {
    let filled = plane.mapv(|v| v.unwrap_or(no_data));

    if !filled.iter().any(|v| *v != no_data) {
        return Err(DecodeError::EmptyResult(name.to_string()));
    }

    Ok(filled.slice(s![..;-1, ..]).as_standard_layout().into_owned())
}

/// Make a name usable as a file stem.
pub fn sanitize_name(name: &str) -> String {
    name.chars()
        .map(|c| match c {
            ' ' | ':' => '_',
            '/' | '\\' => '-',
            other => other,
        })
        .collect()
}
