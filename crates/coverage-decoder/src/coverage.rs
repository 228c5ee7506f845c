//! Read-only view over one coverage of a document.

use chrono::Duration;
use covjson_common::{Crs, TimeRange};
use covjson_protocol::{CoverageJson, Domain, NdArray, Parameter, ReferenceSystemConnection};
use indexmap::IndexMap;
use tracing::{debug, info};

use crate::axis::ResolvedAxis;
use crate::classification::build_raster_legend;
use crate::config::DecoderConfig;
use crate::crs::resolve_crs;
use crate::dimension::{slice_plane, DimensionAccessor};
use crate::domain::DomainType;
use crate::error::{DecodeError, Result};
use crate::features::{prepare_fields, FeatureAssembler, VectorProduct};
use crate::geometry::{decode_geometries, GeometryKind};
use crate::range::RangeDecoder;
use crate::raster::{BandDataType, Georeference, RasterExporter, RasterProduct};
use crate::vector_render::{build_vector_renderer, VectorRenderer};

/// One coverage with its inherited context resolved.
///
/// Parameters and domain type fall back to the enclosing collection when the
/// member does not declare its own.
#[derive(Debug, Clone)]
pub struct Coverage<'a> {
    index: usize,
    member: &'a CoverageJson,
    domain: &'a Domain,
    domain_type: DomainType,
    parameters: Option<&'a IndexMap<String, Parameter>>,
    crs: Crs,
}

impl<'a> Coverage<'a> {
    /// Build the view of `member`, the `index`-th coverage of `parent`.
    ///
    /// For a standalone coverage `member` and `parent` are the same document.
    pub fn new(index: usize, member: &'a CoverageJson, parent: &'a CoverageJson) -> Result<Self> {
        let domain = member
            .domain
            .as_ref()
            .ok_or_else(|| DecodeError::document(format!("coverage {} has no domain", index)))?;

        let domain_type: DomainType = domain
            .domain_type
            .as_deref()
            .or(member.domain_type.as_deref())
            .or(parent.domain_type.as_deref())
            .ok_or_else(|| {
                DecodeError::document(format!("coverage {} declares no domainType", index))
            })?
            .parse()?;

        let referencing = referencing_for(member, parent).ok_or_else(|| {
            DecodeError::document(format!("coverage {} has no referencing", index))
        })?;
        let crs = resolve_crs(referencing)?;

        let parameters = member
            .parameters
            .as_ref()
            .filter(|p| !p.is_empty())
            .or(parent.parameters.as_ref());

        Ok(Self {
            index,
            member,
            domain,
            domain_type,
            parameters,
            crs,
        })
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn domain(&self) -> &'a Domain {
        self.domain
    }

    pub fn domain_type(&self) -> DomainType {
        self.domain_type
    }

    pub fn crs(&self) -> &Crs {
        &self.crs
    }

    /// Own parameters, or the collection's.
    pub fn parameters(&self) -> Option<&'a IndexMap<String, Parameter>> {
        self.parameters
    }

    pub fn parameter(&self, name: &str) -> Option<&'a Parameter> {
        self.parameters.and_then(|p| p.get(name))
    }

    /// Parameter names, falling back to the range keys.
    pub fn parameter_names(&self) -> Vec<&'a str> {
        match self.parameters {
            Some(params) if !params.is_empty() => params.keys().map(String::as_str).collect(),
            _ => self.ranges().map(|(name, _)| name.as_str()).collect(),
        }
    }

    /// Ranges in declaration order.
    pub fn ranges(&self) -> impl Iterator<Item = (&'a String, &'a NdArray)> {
        self.member.ranges.iter().flatten()
    }

    pub fn range(&self, parameter: &str) -> Result<RangeDecoder<'a>> {
        self.member
            .ranges
            .as_ref()
            .and_then(|r| r.get_key_value(parameter))
            .map(|(name, range)| RangeDecoder::new(name, range))
            .ok_or_else(|| DecodeError::MissingRange(parameter.to_string()))
    }

    pub fn has_t(&self) -> bool {
        self.domain.axes.contains_key("t")
    }

    pub fn has_z(&self) -> bool {
        self.domain.axes.contains_key("z")
    }

    pub fn has_composite_axis(&self) -> bool {
        self.domain.axes.contains_key("composite")
    }

    /// Whether the range of `parameter` varies along `t`.
    pub fn has_t_in_data(&self, parameter: &str) -> bool {
        self.range_has_axis(parameter, "t")
    }

    /// Whether the range of `parameter` varies along `z`.
    pub fn has_z_in_data(&self, parameter: &str) -> bool {
        self.range_has_axis(parameter, "z")
    }

    fn range_has_axis(&self, parameter: &str, axis: &str) -> bool {
        self.member
            .ranges
            .as_ref()
            .and_then(|r| r.get(parameter))
            .and_then(|r| r.axis_names.as_ref())
            .is_some_and(|names| names.iter().any(|n| n == axis))
    }

    /// The resolved `t` axis, if declared.
    pub fn time_axis(&self) -> Result<Option<ResolvedAxis>> {
        if !self.has_t() {
            return Ok(None);
        }
        ResolvedAxis::from_domain(self.domain, "t").map(Some)
    }

    /// From the first to the last `t` value.
    ///
    /// `None` without a `t` axis or when either end does not parse.
    pub fn time_range(&self) -> Option<TimeRange> {
        let times = self.time_axis().ok()??.times();
        let start = (*times.first()?)?;
        let end = (*times.last()?)?;
        Some(TimeRange::new(start, end))
    }

    /// Spacing of the first two `t` values.
    pub fn time_step(&self) -> Option<Duration> {
        let times = self.time_axis().ok()??.times();
        match times.as_slice() {
            [Some(first), Some(second), ..] => Some(*second - *first),
            _ => None,
        }
    }

    /// Export every 2-D slice of a gridded parameter.
    ///
    /// `time_step` (usually the collection-wide step) gives each
    /// time-tagged slice a fixed validity window.
    pub fn raster_products(
        &self,
        parameter: &str,
        config: &DecoderConfig,
        time_step: Option<Duration>,
    ) -> Result<Vec<RasterProduct>> {
        if !self.domain_type.is_raster() {
            return Err(DecodeError::UnsupportedDomainType(format!(
                "{} cannot be exported as raster",
                self.domain_type
            )));
        }

        let decoded = self.range(parameter)?.decode_grid()?;
        let band_type = BandDataType::for_range(parameter, decoded.data_type)?;
        let values = decoded.numeric()?;

        let x = self.spatial_axis("x", &decoded.axis_names, decoded.shape())?;
        let y = self.spatial_axis("y", &decoded.axis_names, decoded.shape())?;
        let georeference = Georeference::from_axes(&x, &y, self.crs.clone())?;
        let exporter = RasterExporter::new(georeference, band_type, config.no_data_value)
            .with_time_step(time_step);

        // Planes come out as (y, x) only when y precedes x in the range.
        let transpose = decoded.axis_index("x") < decoded.axis_index("y");

        let legend = self
            .parameter(parameter)
            .and_then(|p| build_raster_legend(p, values.iter().flatten().copied()));

        let accessor = DimensionAccessor::new(&decoded.axis_names, decoded.shape(), self.domain)?;
        let mut products = Vec::with_capacity(accessor.slice_count());

        for slice in &accessor {
            let plane = slice_plane(values, &slice.selectors, transpose)?;
            let name = if slice.label.is_empty() {
                parameter.to_string()
            } else {
                format!("{}_{}", parameter, slice.label)
            };
            let time = slice.time.as_ref().and_then(|t| t.as_time());
            let z = slice.z.as_ref().map(|z| z.to_string());

            let mut product = exporter.export(parameter, &name, &plane, time, z)?;
            product.legend = legend.clone();
            products.push(product);
        }

        info!(
            coverage = self.index,
            parameter,
            slices = products.len(),
            "Exported raster products"
        );

        Ok(products)
    }

    /// Raster products for every parameter of a grid coverage.
    pub fn all_raster_products(
        &self,
        config: &DecoderConfig,
        time_step: Option<Duration>,
    ) -> Result<Vec<RasterProduct>> {
        let mut products = Vec::new();
        for parameter in self.parameter_names() {
            products.extend(self.raster_products(parameter, config, time_step)?);
        }
        Ok(products)
    }

    /// Decode geometries and attributes into one vector product.
    pub fn vector_product(&self, config: &DecoderConfig) -> Result<VectorProduct> {
        let geometry_kind = GeometryKind::for_domain_type(self.domain_type)?;
        let geometries = decode_geometries(self.domain, self.domain_type)?;

        let ranges: Vec<RangeDecoder<'a>> = self
            .ranges()
            .map(|(name, range)| RangeDecoder::new(name, range))
            .collect();
        let fields = prepare_fields(&ranges, self.parameters)?;

        let time_axis = self.time_axis()?;
        let features = FeatureAssembler::for_domain_type(self.domain_type).assemble(
            geometries,
            time_axis.as_ref(),
            &ranges,
        )?;

        let renderer =
            build_vector_renderer(VectorRenderer::default(), self.parameters, &fields, config);

        info!(
            coverage = self.index,
            domain_type = %self.domain_type,
            features = features.len(),
            "Decoded vector product"
        );

        Ok(VectorProduct {
            name: format!("{}_{}", self.domain_type, self.index),
            domain_type: self.domain_type,
            geometry_kind,
            crs: self.crs.clone(),
            fields,
            features,
            renderer,
            time_range: self.time_range(),
        })
    }

    /// Numeric coordinates of `x` or `y`, checked against the range extent.
    fn spatial_axis(&self, name: &str, axis_names: &[String], shape: &[usize]) -> Result<Vec<f64>> {
        let coords = ResolvedAxis::from_domain(self.domain, name)?.numeric()?;
        let extent = axis_names
            .iter()
            .position(|a| a == name)
            .and_then(|i| shape.get(i).copied())
            .unwrap_or_default();
        if coords.len() != extent {
            return Err(DecodeError::invalid_axis(
                name,
                format!("domain has {} values, range extent is {}", coords.len(), extent),
            ));
        }
        debug!(axis = name, len = coords.len(), "Resolved spatial axis");
        Ok(coords)
    }
}

/// Collection members use the shared referencing; a standalone coverage
/// uses its domain's. Either falls back to the other.
fn referencing_for<'a>(
    member: &'a CoverageJson,
    parent: &'a CoverageJson,
) -> Option<&'a [ReferenceSystemConnection]> {
    let own = member
        .domain
        .as_ref()
        .and_then(|d| d.referencing.as_deref())
        .or(member.referencing.as_deref());
    let shared = parent.referencing.as_deref();

    if std::ptr::eq(member, parent) {
        own.or(shared)
    } else {
        shared.or(own)
    }
}
