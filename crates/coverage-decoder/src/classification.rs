//! Raster legends built from a parameter's `categoryEncoding`.

use covjson_common::Color;
use covjson_protocol::Parameter;
use serde::Serialize;

/// One legend entry.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LegendStop {
    pub value: f64,
    pub color: Color,
    pub label: String,
}

/// Interpolated color legend for a raster.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RasterLegend {
    /// Stops in `categoryEncoding` declaration order.
    pub stops: Vec<LegendStop>,
    /// Smallest value in the data.
    pub minimum: f64,
    /// Largest value in the data.
    pub maximum: f64,
    /// Upper bound used for classification.
    ///
    /// The first encoded value that exceeds the data maximum, or `0` when
    /// no encoded value does. The `0` case yields an inverted range when the
    /// data is positive.
    pub classification_max: f64,
}

/// Build a legend for `parameter` over `values` (nulls already removed).
///
/// Returns `None` without a `categoryEncoding` or without any data.
/// Entries are consumed in declaration order; iteration stops after the
/// first entry whose encoded value exceeds the data maximum.
pub fn build_raster_legend(
    parameter: &Parameter,
    values: impl IntoIterator<Item = f64>,
) -> Option<RasterLegend> {
    let encoding = parameter.category_encoding.as_ref()?;

    let (minimum, maximum) = values
        .into_iter()
        .filter(|v| !v.is_nan())
        .fold(None, |acc: Option<(f64, f64)>, v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })?;

    let mut stops = Vec::new();
    let mut classification_max = 0.0;

    for (key, &value) in encoding {
        stops.push(LegendStop {
            value,
            color: stop_color(parameter, key),
            label: format!("{}", value),
        });

        if value > maximum {
            classification_max = value;
            break;
        }
    }

    tracing::debug!(
        stops = stops.len(),
        minimum,
        maximum,
        classification_max,
        "Built raster legend"
    );

    Some(RasterLegend {
        stops,
        minimum,
        maximum,
        classification_max,
    })
}

/// Color of an encoding entry: the key itself when it is a color,
/// otherwise the preferred color of the category with that id.
fn stop_color(parameter: &Parameter, key: &str) -> Color {
    if let Ok(color) = Color::parse(key) {
        return color;
    }

    parameter
        .observed_property
        .categories
        .iter()
        .flatten()
        .find(|c| c.id == key)
        .and_then(|c| c.preferred_color.as_deref())
        .and_then(|c| Color::parse(c).ok())
        .unwrap_or_else(|| {
            tracing::debug!(key, "No color for category encoding entry");
            Color::transparent()
        })
}
