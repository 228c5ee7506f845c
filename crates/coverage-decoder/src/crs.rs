//! Resolve a document's referencing list to a usable CRS.

use covjson_common::{Crs, CrsCode};
use covjson_protocol::{ReferenceSystem, ReferenceSystemConnection};

use crate::error::{DecodeError, Result};

/// Pick the horizontal reference system and resolve it.
///
/// The first connection whose `coordinates` include both `x` and `y` wins.
pub fn resolve_crs(referencing: &[ReferenceSystemConnection]) -> Result<Crs> {
    let connection = referencing
        .iter()
        .find(|c| c.covers_xy())
        .ok_or_else(|| {
            DecodeError::UnresolvableCrs("no referencing entry covers x and y".to_string())
        })?;

    let system = connection
        .system
        .as_ref()
        .ok_or_else(|| DecodeError::document("referencing entry has no system"))?;

    resolve_system(system)
}

/// Resolve one reference system.
///
/// An embedded `wkt` takes precedence over `id`. HTTP-style ids are only
/// resolved when they name CRS84/4326, which needs no remote lookup.
pub fn resolve_system(system: &ReferenceSystem) -> Result<Crs> {
    if let Some(wkt) = system.wkt.as_deref() {
        return Crs::from_wkt(wkt).map_err(|e| DecodeError::UnresolvableCrs(e.to_string()));
    }

    let id = system
        .id
        .as_deref()
        .ok_or_else(|| DecodeError::UnresolvableCrs("reference system has no id or wkt".into()))?;

    if id.starts_with("http:") || id.starts_with("https:") {
        if id.contains("CRS84") || id.contains("4326") {
            return Ok(Crs::new(CrsCode::Epsg4326));
        }
        return Err(DecodeError::UnresolvableCrs(id.to_string()));
    }

    CrsCode::from_identifier(id)
        .map(Crs::new)
        .map_err(|_| DecodeError::UnresolvableCrs(id.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use covjson_protocol::CRS84_ID;

    #[test]
    fn test_crs84_uri() {
        let referencing = vec![ReferenceSystemConnection::geographic(CRS84_ID)];
        assert_eq!(resolve_crs(&referencing).unwrap(), Crs::new(CrsCode::Epsg4326));
    }

    #[test]
    fn test_epsg_4326_uri() {
        let referencing = vec![ReferenceSystemConnection::geographic(
            "http://www.opengis.net/def/crs/EPSG/0/4326",
        )];
        assert_eq!(resolve_crs(&referencing).unwrap(), Crs::new(CrsCode::Epsg4326));
    }

    #[test]
    fn test_other_uri_is_unresolvable() {
        let referencing = vec![ReferenceSystemConnection::geographic(
            "http://www.opengis.net/def/crs/EPSG/0/28992",
        )];
        let err = resolve_crs(&referencing).unwrap_err();
        assert_eq!(
            err,
            DecodeError::UnresolvableCrs("http://www.opengis.net/def/crs/EPSG/0/28992".into())
        );
    }

    #[test]
    fn test_wkt_wins_over_id() {
        let wkt = CrsCode::Epsg3857.wkt();
        let system = ReferenceSystem::geographic("http://example.com/unknown").with_wkt(wkt);
        let crs = resolve_system(&system).unwrap();
        assert_eq!(crs.authid(), Some("EPSG:3857".to_string()));
    }

    #[test]
    fn test_authority_code() {
        let system = ReferenceSystem::geographic("EPSG:3857");
        assert_eq!(resolve_system(&system).unwrap(), Crs::new(CrsCode::Epsg3857));
    }

    #[test]
    fn test_skips_temporal_entries() {
        let referencing = vec![
            ReferenceSystemConnection::temporal(),
            ReferenceSystemConnection::geographic(CRS84_ID),
        ];
        assert!(resolve_crs(&referencing).is_ok());
    }

    #[test]
    fn test_no_horizontal_entry() {
        let referencing = vec![ReferenceSystemConnection::temporal()];
        let err = resolve_crs(&referencing).unwrap_err();
        assert!(matches!(err, DecodeError::UnresolvableCrs(_)));
    }
}
