//! Entry point: parse and validate a CoverageJSON document.

use std::io::Read;
use std::path::Path;

use covjson_common::Crs;
use covjson_protocol::{CoverageJson, CoverageType};
use tracing::{debug, info};

use crate::collection::{CollectionAggregator, DecodedDocument};
use crate::config::DecoderConfig;
use crate::coverage::Coverage;
use crate::crs::resolve_crs;
use crate::domain::DomainType;
use crate::error::{DecodeError, Result};

/// A validated, immutable CoverageJSON document.
#[derive(Debug, Clone)]
pub struct CoverageJsonReader {
    document: CoverageJson,
    kind: CoverageType,
}

impl CoverageJsonReader {
    /// Validate an already parsed document.
    ///
    /// `type` must be `Coverage` or `CoverageCollection`; a coverage needs a
    /// `domain` and a collection needs `coverages`.
    pub fn new(document: CoverageJson) -> Result<Self> {
        let kind = match document.type_.as_deref() {
            None => return Err(DecodeError::document("missing 'type'")),
            Some(t) => CoverageType::parse(t).ok_or_else(|| {
                DecodeError::document(format!(
                    "unsupported type '{}', expected Coverage or CoverageCollection",
                    t
                ))
            })?,
        };

        match kind {
            CoverageType::Coverage if document.domain.is_none() => {
                return Err(DecodeError::document("coverage has no 'domain'"));
            }
            CoverageType::CoverageCollection if document.coverages.is_none() => {
                return Err(DecodeError::document("collection has no 'coverages'"));
            }
            _ => {}
        }

        let reader = Self { document, kind };
        debug!(
            kind = reader.kind.as_str(),
            coverages = reader.coverages_count(),
            "Read CoverageJSON document"
        );
        Ok(reader)
    }

    #[allow(clippy::should_implement_trait)]
    pub fn from_str(json: &str) -> Result<Self> {
        Self::new(serde_json::from_str(json)?)
    }

    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        Self::new(serde_json::from_slice(bytes)?)
    }

    pub fn from_reader(reader: impl Read) -> Result<Self> {
        Self::new(serde_json::from_reader(reader)?)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let file = std::fs::File::open(path.as_ref())?;
        Self::from_reader(std::io::BufReader::new(file))
    }

    pub fn document(&self) -> &CoverageJson {
        &self.document
    }

    pub fn coverage_type(&self) -> CoverageType {
        self.kind
    }

    pub fn is_collection(&self) -> bool {
        self.kind == CoverageType::CoverageCollection
    }

    /// Document-level domain type: the collection's, or the coverage domain's.
    pub fn domain_type(&self) -> Result<Option<DomainType>> {
        let declared = match self.kind {
            CoverageType::CoverageCollection => self.document.domain_type.as_deref(),
            CoverageType::Coverage => self
                .document
                .domain
                .as_ref()
                .and_then(|d| d.domain_type.as_deref())
                .or(self.document.domain_type.as_deref()),
        };
        declared.map(str::parse).transpose()
    }

    /// CRS of the document-level referencing.
    pub fn crs(&self) -> Result<Crs> {
        let referencing = match self.kind {
            CoverageType::CoverageCollection => self.document.referencing.as_deref(),
            CoverageType::Coverage => self
                .document
                .domain
                .as_ref()
                .and_then(|d| d.referencing.as_deref())
                .or(self.document.referencing.as_deref()),
        };
        resolve_crs(referencing.ok_or_else(|| DecodeError::document("missing 'referencing'"))?)
    }

    pub fn coverages_count(&self) -> usize {
        match self.kind {
            CoverageType::CoverageCollection => {
                self.document.coverages.as_ref().map_or(0, Vec::len)
            }
            CoverageType::Coverage => 1,
        }
    }

    /// View of the `index`-th coverage.
    pub fn coverage(&self, index: usize) -> Result<Coverage<'_>> {
        match self.kind {
            CoverageType::Coverage if index == 0 => Coverage::new(0, &self.document, &self.document),
            CoverageType::CoverageCollection => {
                let member = self
                    .document
                    .coverages
                    .as_ref()
                    .and_then(|c| c.get(index))
                    .ok_or_else(|| {
                        DecodeError::document(format!(
                            "coverage index {} out of range ({} coverages)",
                            index,
                            self.coverages_count()
                        ))
                    })?;
                Coverage::new(index, member, &self.document)
            }
            CoverageType::Coverage => Err(DecodeError::document(format!(
                "coverage index {} out of range (1 coverage)",
                index
            ))),
        }
    }

    /// Views of every coverage, in declaration order.
    pub fn coverages(&self) -> Vec<Result<Coverage<'_>>> {
        (0..self.coverages_count()).map(|i| self.coverage(i)).collect()
    }

    /// Decode every coverage into products.
    pub fn decode(&self, config: &DecoderConfig) -> DecodedDocument {
        info!(
            kind = self.kind.as_str(),
            coverages = self.coverages_count(),
            "Decoding document"
        );
        CollectionAggregator::new(config).decode(self.coverages())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_rejects_unknown_type() {
        let err = CoverageJsonReader::from_str(r#"{"type": "Feature"}"#).unwrap_err();
        assert!(matches!(err, DecodeError::DocumentFormat(ref m) if m.contains("Feature")));
    }

    #[test]
    fn test_rejects_missing_type() {
        let err = CoverageJsonReader::from_str("{}").unwrap_err();
        assert_eq!(err, DecodeError::document("missing 'type'"));
    }

    #[test]
    fn test_rejects_coverage_without_domain() {
        let err = CoverageJsonReader::from_str(r#"{"type": "Coverage"}"#).unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::DocumentFormat);
    }

    #[test]
    fn test_rejects_malformed_json() {
        let err = CoverageJsonReader::from_slice(b"{not json").unwrap_err();
        assert!(matches!(err, DecodeError::DocumentFormat(_)));
    }

    #[test]
    fn test_collection_inspection() {
        let doc = json!({
            "type": "CoverageCollection",
            "domainType": "PointSeries",
            "referencing": [{
                "coordinates": ["x", "y"],
                "system": {"type": "GeographicCRS", "id": "http://www.opengis.net/def/crs/OGC/1.3/CRS84"}
            }],
            "coverages": [
                {"type": "Coverage", "domain": {"type": "Domain", "axes": {"x": {"values": [1.0]}, "y": {"values": [2.0]}}}},
                {"type": "Coverage", "domain": {"type": "Domain", "axes": {"x": {"values": [3.0]}, "y": {"values": [4.0]}}}}
            ]
        });
        let reader = CoverageJsonReader::from_str(&doc.to_string()).unwrap();

        assert!(reader.is_collection());
        assert_eq!(reader.coverages_count(), 2);
        assert_eq!(reader.domain_type().unwrap(), Some(DomainType::PointSeries));
        assert!(reader.crs().is_ok());
        assert_eq!(reader.coverage(1).unwrap().index(), 1);
        assert!(reader.coverage(2).is_err());
    }

    #[test]
    fn test_single_coverage_index() {
        let doc = json!({
            "type": "Coverage",
            "domain": {
                "type": "Domain",
                "domainType": "Point",
                "axes": {"x": {"values": [1.0]}, "y": {"values": [2.0]}},
                "referencing": [{"coordinates": ["x", "y"], "system": {"id": "EPSG:4326"}}]
            }
        });
        let reader = CoverageJsonReader::from_str(&doc.to_string()).unwrap();
        assert!(!reader.is_collection());
        assert_eq!(reader.coverages_count(), 1);
        assert!(reader.coverage(0).is_ok());
        assert!(reader.coverage(1).is_err());
    }
}
