//! Feature assembly: pair decoded geometries with per-feature attributes.

use covjson_common::{Crs, TimeRange};
use covjson_protocol::{Parameter, ScalarValue};
use indexmap::IndexMap;
use serde::Serialize;

use crate::axis::ResolvedAxis;
use crate::domain::DomainType;
use crate::error::{DecodeError, Result};
use crate::geometry::{Geometry, GeometryKind};
use crate::range::{RangeDataType, RangeDecoder};
use crate::vector_render::VectorRenderer;

/// Declared type of an attribute field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FieldType {
    Integer,
    Double,
    String,
}

impl From<RangeDataType> for FieldType {
    fn from(data_type: RangeDataType) -> Self {
        match data_type {
            RangeDataType::Integer => FieldType::Integer,
            RangeDataType::Float => FieldType::Double,
            RangeDataType::String => FieldType::String,
        }
    }
}

/// One attribute column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Field {
    /// Parameter (range) key.
    pub name: String,
    /// `"<name> (<unit>)"` when the parameter declares a unit.
    pub display_name: String,
    pub field_type: FieldType,
}

/// Build the attribute schema, one field per range in declaration order.
pub fn prepare_fields(
    ranges: &[RangeDecoder<'_>],
    parameters: Option<&IndexMap<String, Parameter>>,
) -> Result<Vec<Field>> {
    ranges
        .iter()
        .map(|range| {
            let name = range.parameter().to_string();
            let unit = parameters
                .and_then(|p| p.get(&name))
                .and_then(Parameter::unit_label);
            let display_name = match unit {
                Some(unit) => format!("{} ({})", name, unit),
                None => name.clone(),
            };
            Ok(Field {
                display_name,
                field_type: range.data_type()?.into(),
                name,
            })
        })
        .collect()
}

/// First field whose display name starts with `prefix`.
pub fn find_field<'a>(fields: &'a [Field], prefix: &str) -> Option<&'a Field> {
    fields.iter().find(|f| f.display_name.starts_with(prefix))
}

/// A typed attribute value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    Null,
    Integer(i64),
    Double(f64),
    Text(String),
}

impl FieldValue {
    fn from_scalar(data_type: RangeDataType, value: Option<&ScalarValue>) -> Self {
        match (data_type, value) {
            (_, None) => FieldValue::Null,
            (RangeDataType::Integer, Some(ScalarValue::Number(n))) => FieldValue::Integer(*n as i64),
            (_, Some(ScalarValue::Number(n))) => FieldValue::Double(*n),
            (_, Some(ScalarValue::Text(s))) => FieldValue::Text(s.clone()),
            (_, Some(ScalarValue::Other(other))) => FieldValue::Text(other.to_string()),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, FieldValue::Null)
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            FieldValue::Integer(i) => Some(*i as f64),
            FieldValue::Double(d) => Some(*d),
            _ => None,
        }
    }
}

/// A geometry with its attributes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Feature {
    pub geometry: Geometry,
    /// One value per field, in field order.
    pub attributes: Vec<FieldValue>,
    /// Value of the domain's `t` axis for this feature.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time: Option<String>,
}

/// Features of one coverage, or of a merged group of coverages.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VectorProduct {
    pub name: String,
    pub domain_type: DomainType,
    pub geometry_kind: GeometryKind,
    pub crs: Crs,
    pub fields: Vec<Field>,
    pub features: Vec<Feature>,
    pub renderer: VectorRenderer,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_range: Option<TimeRange>,
}

impl VectorProduct {
    /// Append the features of `other`.
    ///
    /// The schema of `self` is kept; `other`'s fields are not compared.
    pub fn append(&mut self, other: VectorProduct) {
        self.features.extend(other.features);
        self.time_range = match (self.time_range, other.time_range) {
            (Some(mut range), Some(next)) => {
                range.extend(&next);
                Some(range)
            }
            (range, next) => range.or(next),
        };
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }
}

/// Zips geometries with attribute values drawn from ranges.
#[derive(Debug, Clone, Copy)]
pub struct FeatureAssembler {
    simplify: bool,
}

impl FeatureAssembler {
    pub fn for_domain_type(domain_type: DomainType) -> Self {
        Self {
            simplify: domain_type.simplifies_attributes(),
        }
    }

    /// Assemble features.
    ///
    /// Without simplification and with a time axis of length `T`, the `B`
    /// base geometries are repeated `T` times: feature `i` uses geometry
    /// `i mod B` at time `i div B`, and every range must carry exactly
    /// `B * T` values. Values are located through the range's `axisNames`,
    /// so `[t, composite]` and `[composite, t]` both work; a range without
    /// `axisNames` is read as `[t, composite]`. With simplification every
    /// feature receives the first value of each range.
    pub fn assemble(
        &self,
        geometries: Vec<Geometry>,
        time_axis: Option<&ResolvedAxis>,
        ranges: &[RangeDecoder<'_>],
    ) -> Result<Vec<Feature>> {
        if self.simplify {
            return self.assemble_simplified(geometries, ranges);
        }

        let base = geometries.len();
        let times: Vec<String> = time_axis
            .filter(|t| !t.is_empty())
            .map(|t| t.values.iter().map(|v| v.to_string()).collect())
            .unwrap_or_default();
        let repeats = times.len().max(1);
        let count = base * repeats;

        let mut columns = Vec::with_capacity(ranges.len());
        for range in ranges {
            let values = range.flat_values()?;
            if values.len() != count {
                return Err(DecodeError::FeatureCountMismatch {
                    parameter: range.parameter().to_string(),
                    expected: count,
                    actual: values.len(),
                });
            }
            let strides = FeatureStrides::of(range, base, repeats)?;
            columns.push((range.data_type()?, values, strides));
        }

        let features = (0..count)
            .map(|i| {
                let (step, item) = (i / base, i % base);
                Feature {
                    geometry: geometries[item].clone(),
                    attributes: columns
                        .iter()
                        .map(|(data_type, values, strides)| {
                            let value = values[strides.index(step, item)].as_ref();
                            FieldValue::from_scalar(*data_type, value)
                        })
                        .collect(),
                    time: times.get(step).cloned(),
                }
            })
            .collect::<Vec<_>>();

        tracing::debug!(
            geometries = base,
            time_steps = times.len(),
            features = features.len(),
            "Assembled features"
        );

        Ok(features)
    }

    fn assemble_simplified(
        &self,
        geometries: Vec<Geometry>,
        ranges: &[RangeDecoder<'_>],
    ) -> Result<Vec<Feature>> {
        let mut first_values = Vec::with_capacity(ranges.len());
        for range in ranges {
            let data_type = range.data_type()?;
            let first = range.flat_values()?.first().and_then(Option::as_ref);
            first_values.push(FieldValue::from_scalar(data_type, first));
        }

        Ok(geometries
            .into_iter()
            .map(|geometry| Feature {
                geometry,
                attributes: first_values.clone(),
                time: None,
            })
            .collect())
    }
}

/// Row-major strides of the `t` and `composite` axes of one range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct FeatureStrides {
    time: usize,
    geometry: usize,
}

impl FeatureStrides {
    /// Strides for a range already known to hold `base * repeats` values.
    ///
    /// Every axis other than `t` and `composite` must have length 1.
    fn of(range: &RangeDecoder<'_>, base: usize, repeats: usize) -> Result<Self> {
        let (names, shape) = match range.layout() {
            Ok(layout) => layout,
            Err(DecodeError::MissingShape(_)) => {
                return Ok(Self {
                    time: base,
                    geometry: 1,
                })
            }
            Err(e) => return Err(e),
        };

        let mut strides = Self {
            time: 0,
            geometry: 0,
        };
        let mut stride = 1;
        for (name, &len) in names.iter().zip(&shape).rev() {
            match name.as_str() {
                "t" if len == repeats => strides.time = stride,
                "composite" if len == base => strides.geometry = stride,
                _ if len == 1 => {}
                _ => {
                    return Err(DecodeError::invalid_axis(
                        name.as_str(),
                        format!(
                            "parameter '{}': length {} does not match {} geometries over {} time steps",
                            range.parameter(),
                            len,
                            base,
                            repeats
                        ),
                    ))
                }
            }
            stride *= len;
        }
        Ok(strides)
    }

    fn index(&self, step: usize, item: usize) -> usize {
        step * self.time + item * self.geometry
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use covjson_protocol::{Axis, NdArray, Unit};

    fn points(n: usize) -> Vec<Geometry> {
        (0..n).map(|i| Geometry::point(i as f64, 0.0)).collect()
    }

    #[test]
    fn test_fields_are_unit_qualified() {
        let temp = NdArray::new(vec![1.0], vec![1], &["t"]);
        let count = NdArray::integers(vec![Some(1)], vec![1], &["t"]);
        let ranges = vec![RangeDecoder::new("temp", &temp), RangeDecoder::new("count", &count)];

        let mut params = IndexMap::new();
        params.insert("temp".to_string(), Parameter::new("Temperature").with_unit(Unit::kelvin()));
        params.insert("count".to_string(), Parameter::new("Count"));

        let fields = prepare_fields(&ranges, Some(&params)).unwrap();
        assert_eq!(fields[0].display_name, "temp (Kelvin)");
        assert_eq!(fields[0].field_type, FieldType::Double);
        assert_eq!(fields[1].display_name, "count");
        assert_eq!(fields[1].field_type, FieldType::Integer);

        assert_eq!(find_field(&fields, "temp").unwrap().name, "temp");
        assert!(find_field(&fields, "humidity").is_none());
    }

    #[test]
    fn test_one_value_per_geometry() {
        let range = NdArray::with_missing(vec![Some(1.5), None, Some(3.0)], vec![3], &["composite"]);
        let ranges = vec![RangeDecoder::new("depth", &range)];
        let features = FeatureAssembler::for_domain_type(DomainType::Polygon)
            .assemble(points(3), None, &ranges)
            .unwrap();

        assert_eq!(features.len(), 3);
        assert_eq!(features[0].attributes, vec![FieldValue::Double(1.5)]);
        assert!(features[1].attributes[0].is_null());
        assert_eq!(features[2].time, None);
    }

    #[test]
    fn test_feature_count_mismatch() {
        let range = NdArray::new(vec![1.0, 2.0], vec![2], &["composite"]);
        let ranges = vec![RangeDecoder::new("depth", &range)];
        let err = FeatureAssembler::for_domain_type(DomainType::Polygon)
            .assemble(points(3), None, &ranges)
            .unwrap_err();
        assert_eq!(
            err,
            DecodeError::FeatureCountMismatch {
                parameter: "depth".into(),
                expected: 3,
                actual: 2
            }
        );
    }

    #[test]
    fn test_trajectory_simplification() {
        let speed = NdArray::new(vec![4.0, 5.0, 6.0], vec![3], &["composite"]);
        let name = NdArray::text(
            vec![Some("ship".into()), Some("ship".into()), None],
            vec![3],
            &["composite"],
        );
        let ranges = vec![RangeDecoder::new("speed", &speed), RangeDecoder::new("name", &name)];
        let line = Geometry::line_string(vec![[0.0, 0.0], [1.0, 1.0], [2.0, 2.0]]);

        let features = FeatureAssembler::for_domain_type(DomainType::Trajectory)
            .assemble(vec![line], None, &ranges)
            .unwrap();

        assert_eq!(features.len(), 1);
        assert_eq!(
            features[0].attributes,
            vec![FieldValue::Double(4.0), FieldValue::Text("ship".into())]
        );
    }

    #[test]
    fn test_point_series_expands_over_time() {
        let t = ResolvedAxis::resolve(
            "t",
            &Axis::strings(vec![
                "2024-01-01T00:00Z".into(),
                "2024-01-01T01:00Z".into(),
                "2024-01-01T02:00Z".into(),
            ]),
        )
        .unwrap();
        let range = NdArray::new(vec![10.0, 11.0, 12.0], vec![3], &["t"]);
        let ranges = vec![RangeDecoder::new("temp", &range)];

        let features = FeatureAssembler::for_domain_type(DomainType::PointSeries)
            .assemble(points(1), Some(&t), &ranges)
            .unwrap();

        assert_eq!(features.len(), 3);
        assert_eq!(features[2].time.as_deref(), Some("2024-01-01T02:00Z"));
        assert_eq!(features[2].attributes, vec![FieldValue::Double(12.0)]);
        assert_eq!(features[0].geometry, features[2].geometry);
    }

    #[test]
    fn test_append_keeps_first_schema() {
        let product = |name: &str, x: f64| VectorProduct {
            name: name.to_string(),
            domain_type: DomainType::Point,
            geometry_kind: GeometryKind::Point,
            crs: Crs::default(),
            fields: vec![Field {
                name: name.to_string(),
                display_name: name.to_string(),
                field_type: FieldType::Double,
            }],
            features: vec![Feature {
                geometry: Geometry::point(x, 0.0),
                attributes: vec![FieldValue::Double(x)],
                time: None,
            }],
            renderer: VectorRenderer::default(),
            time_range: None,
        };

        let mut merged = product("a", 1.0);
        merged.append(product("b", 2.0));
        assert_eq!(merged.len(), 2);
        assert_eq!(merged.fields[0].name, "a");
        assert_eq!(merged.features[1].geometry, Geometry::point(2.0, 0.0));
    }

    #[test]
    fn test_repeated_geometries_over_time() {
        let t = ResolvedAxis::resolve(
            "t",
            &Axis::strings(vec!["2024-01-01".into(), "2024-01-02".into()]),
        )
        .unwrap();
        let range = NdArray::integers(
            vec![Some(1), Some(2), Some(3), Some(4)],
            vec![2, 2],
            &["t", "composite"],
        );
        let ranges = vec![RangeDecoder::new("count", &range)];

        let features = FeatureAssembler::for_domain_type(DomainType::MultiPoint)
            .assemble(points(2), Some(&t), &ranges)
            .unwrap();

        assert_eq!(features.len(), 4);
        assert_eq!(features[1].geometry, Geometry::point(1.0, 0.0));
        assert_eq!(features[1].time.as_deref(), Some("2024-01-01"));
        assert_eq!(features[2].geometry, Geometry::point(0.0, 0.0));
        assert_eq!(features[2].time.as_deref(), Some("2024-01-02"));
        assert_eq!(features[3].attributes, vec![FieldValue::Integer(4)]);
    }

    #[test]
    fn test_composite_before_time_axis() {
        let t = ResolvedAxis::resolve(
            "t",
            &Axis::strings(vec!["2024-01-01".into(), "2024-01-02".into()]),
        )
        .unwrap();
        // Geometry-major: values for point 0 first, then point 1.
        let range = NdArray::integers(
            vec![Some(1), Some(2), Some(3), Some(4)],
            vec![2, 2],
            &["composite", "t"],
        );
        let ranges = vec![RangeDecoder::new("count", &range)];

        let features = FeatureAssembler::for_domain_type(DomainType::MultiPoint)
            .assemble(points(2), Some(&t), &ranges)
            .unwrap();

        let by_feature: Vec<_> = features
            .iter()
            .map(|f| (f.geometry.clone(), f.time.clone().unwrap(), f.attributes[0].clone()))
            .collect();
        assert_eq!(
            by_feature,
            vec![
                (Geometry::point(0.0, 0.0), "2024-01-01".to_string(), FieldValue::Integer(1)),
                (Geometry::point(1.0, 0.0), "2024-01-01".to_string(), FieldValue::Integer(3)),
                (Geometry::point(0.0, 0.0), "2024-01-02".to_string(), FieldValue::Integer(2)),
                (Geometry::point(1.0, 0.0), "2024-01-02".to_string(), FieldValue::Integer(4)),
            ]
        );
    }

    #[test]
    fn test_unknown_axis_with_extent_is_rejected() {
        let range = NdArray::new(vec![1.0, 2.0, 3.0], vec![3], &["member"]);
        let ranges = vec![RangeDecoder::new("depth", &range)];
        let err = FeatureAssembler::for_domain_type(DomainType::Polygon)
            .assemble(points(3), None, &ranges)
            .unwrap_err();
        assert!(matches!(err, DecodeError::InvalidAxis { ref axis, .. } if axis == "member"));
    }

    #[test]
    fn test_singleton_axes_are_ignored() {
        let range = NdArray::new(vec![7.0, 8.0], vec![1, 2], &["z", "composite"]);
        let ranges = vec![RangeDecoder::new("depth", &range)];
        let features = FeatureAssembler::for_domain_type(DomainType::Polygon)
            .assemble(points(2), None, &ranges)
            .unwrap();
        assert_eq!(features[1].attributes, vec![FieldValue::Double(8.0)]);
    }

    #[test]
    fn test_range_without_axis_names_reads_time_major() {
        let t = ResolvedAxis::resolve(
            "t",
            &Axis::strings(vec!["2024-01-01".into(), "2024-01-02".into()]),
        )
        .unwrap();
        let mut range = NdArray::new(vec![1.0, 2.0, 3.0, 4.0], vec![4], &["t"]);
        range.axis_names = None;
        range.shape = None;
        let ranges = vec![RangeDecoder::new("temp", &range)];

        let features = FeatureAssembler::for_domain_type(DomainType::MultiPoint)
            .assemble(points(2), Some(&t), &ranges)
            .unwrap();
        assert_eq!(features[1].attributes, vec![FieldValue::Double(2.0)]);
        assert_eq!(features[2].time.as_deref(), Some("2024-01-02"));
    }
}
