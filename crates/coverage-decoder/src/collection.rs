//! Collection-wide decoding: time aggregation, merging and failure isolation.

use chrono::Duration;
use covjson_common::TimeRange;
use rayon::prelude::*;
use serde::Serialize;
use tracing::{info, warn};

use crate::config::DecoderConfig;
use crate::coverage::Coverage;
use crate::domain::DomainType;
use crate::error::{DecodeError, ErrorKind, Result};
use crate::features::VectorProduct;
use crate::raster::RasterProduct;

/// A coverage that could not be decoded.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CoverageFailure {
    /// Position of the coverage in the document.
    pub index: usize,
    pub kind: ErrorKind,
    pub message: String,
}

impl CoverageFailure {
    fn new(index: usize, error: &DecodeError) -> Self {
        Self {
            index,
            kind: error.kind(),
            message: error.to_string(),
        }
    }
}

/// Every product decoded from a document.
#[derive(Debug, Clone, Default)]
pub struct DecodedDocument {
    pub rasters: Vec<RasterProduct>,
    pub vectors: Vec<VectorProduct>,
    pub failures: Vec<CoverageFailure>,
    /// Union of the coverages' time ranges.
    pub time_range: Option<TimeRange>,
    /// Smallest time step over all coverages.
    pub time_step: Option<Duration>,
}

impl DecodedDocument {
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Running `(time range, time step)` over coverages in declaration order.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TimeAggregate {
    pub range: Option<TimeRange>,
    pub step: Option<Duration>,
    seeded: bool,
}

impl TimeAggregate {
    /// Fold in one coverage's local range and step.
    ///
    /// The first coverage seeds both values; later ones widen the range and
    /// keep the smaller step.
    pub fn add(&mut self, range: Option<TimeRange>, step: Option<Duration>) {
        if !self.seeded {
            self.range = range;
            self.step = step;
            self.seeded = true;
            return;
        }

        self.range = match (self.range, range) {
            (Some(mut current), Some(next)) => {
                current.extend(&next);
                Some(current)
            }
            (current, next) => current.or(next),
        };
        self.step = match (self.step, step) {
            (Some(current), Some(next)) => Some(current.min(next)),
            (current, next) => current.or(next),
        };
    }
}

enum Products {
    Rasters(Vec<RasterProduct>),
    Vector(VectorProduct),
}

/// Decodes the coverages of a document into products.
#[derive(Debug, Clone, Copy)]
pub struct CollectionAggregator<'c> {
    config: &'c DecoderConfig,
}

impl<'c> CollectionAggregator<'c> {
    pub fn new(config: &'c DecoderConfig) -> Self {
        Self { config }
    }

    /// Aggregate time range and step in declaration order.
    pub fn aggregate_time(&self, coverages: &[Coverage<'_>]) -> TimeAggregate {
        let mut aggregate = TimeAggregate::default();
        for coverage in coverages {
            aggregate.add(coverage.time_range(), coverage.time_step());
        }
        aggregate
    }

    /// Merge coverages into one vector product.
    ///
    /// The first coverage's schema is kept; any member failure fails the
    /// whole merge.
    pub fn merge(&self, coverages: &[Coverage<'_>]) -> Result<VectorProduct> {
        let (first, rest) = coverages
            .split_first()
            .ok_or_else(|| DecodeError::EmptyResult("no coverages to merge".to_string()))?;

        let mut merged = first.vector_product(self.config)?;
        for coverage in rest {
            merged.append(coverage.vector_product(self.config)?);
        }
        merged.name = first.domain_type().to_string();

        info!(
            coverages = coverages.len(),
            features = merged.len(),
            domain_type = %first.domain_type(),
            "Merged coverages"
        );

        Ok(merged)
    }

    /// Decode every coverage.
    ///
    /// `members` holds one entry per coverage in declaration order; entries
    /// that failed to resolve are reported as failures. Coverages of a
    /// mergeable domain type are merged per domain type, all others are
    /// decoded independently.
    pub fn decode(&self, members: Vec<Result<Coverage<'_>>>) -> DecodedDocument {
        let mut document = DecodedDocument::default();
        let mut coverages = Vec::with_capacity(members.len());

        for (index, member) in members.into_iter().enumerate() {
            match member {
                Ok(coverage) => coverages.push(coverage),
                Err(e) => {
                    warn!(coverage = index, error = %e, "Skipping coverage");
                    document.failures.push(CoverageFailure::new(index, &e));
                }
            }
        }

        let time = self.aggregate_time(&coverages);
        document.time_range = time.range;
        document.time_step = time.step;

        let (mergeable, independent): (Vec<_>, Vec<_>) = coverages
            .into_iter()
            .partition(|c| self.config.is_mergeable(c.domain_type()));

        for group in group_by_domain_type(mergeable) {
            match self.merge(&group) {
                Ok(product) => document.vectors.push(product),
                Err(e) => {
                    warn!(
                        coverages = group.len(),
                        error = %e,
                        "Merge failed"
                    );
                    document
                        .failures
                        .extend(group.iter().map(|c| CoverageFailure::new(c.index(), &e)));
                }
            }
        }

        let decode_one = |coverage: &Coverage<'_>| self.decode_independent(coverage, time.step);
        let results: Vec<(usize, Result<Products>)> = if self.config.parallel {
            independent
                .par_iter()
                .map(|c| (c.index(), decode_one(c)))
                .collect()
        } else {
            independent
                .iter()
                .map(|c| (c.index(), decode_one(c)))
                .collect()
        };

        for (index, result) in results {
            match result {
                Ok(Products::Rasters(rasters)) => document.rasters.extend(rasters),
                Ok(Products::Vector(vector)) => document.vectors.push(vector),
                Err(e) => {
                    warn!(coverage = index, error = %e, "Coverage decode failed");
                    document.failures.push(CoverageFailure::new(index, &e));
                }
            }
        }

        document.failures.sort_by_key(|f| f.index);

        info!(
            rasters = document.rasters.len(),
            vectors = document.vectors.len(),
            failures = document.failures.len(),
            "Decoded document"
        );

        document
    }

    fn decode_independent(
        &self,
        coverage: &Coverage<'_>,
        time_step: Option<Duration>,
    ) -> Result<Products> {
        if coverage.domain_type().is_raster() {
            coverage
                .all_raster_products(self.config, time_step)
                .map(Products::Rasters)
        } else {
            coverage.vector_product(self.config).map(Products::Vector)
        }
    }
}

/// Split into per-domain-type groups, ordered by first appearance.
fn group_by_domain_type(coverages: Vec<Coverage<'_>>) -> Vec<Vec<Coverage<'_>>> {
    let mut groups: Vec<(DomainType, Vec<Coverage<'_>>)> = Vec::new();
    for coverage in coverages {
        match groups.iter_mut().find(|(t, _)| *t == coverage.domain_type()) {
            Some((_, group)) => group.push(coverage),
            None => groups.push((coverage.domain_type(), vec![coverage])),
        }
    }
    groups.into_iter().map(|(_, group)| group).collect()
}
