//! CRS codes known without a projection database, and their WKT.

use serde::{Deserialize, Serialize};
use std::fmt;

const WKT_EPSG_4326: &str = concat!(
    r#"GEOGCS["WGS 84",DATUM["WGS_1984",SPHEROID["WGS 84",6378137,298.257223563,AUTHORITY["EPSG","7030"]],"#,
    r#"AUTHORITY["EPSG","6326"]],PRIMEM["Greenwich",0,AUTHORITY["EPSG","8901"]],"#,
    r#"UNIT["degree",0.0174532925199433,AUTHORITY["EPSG","9122"]],"#,
    r#"AXIS["Latitude",NORTH],AXIS["Longitude",EAST],AUTHORITY["EPSG","4326"]]"#,
);

const WKT_EPSG_4269: &str = concat!(
    r#"GEOGCS["NAD83",DATUM["North_American_Datum_1983",SPHEROID["GRS 1980",6378137,298.257222101,"#,
    r#"AUTHORITY["EPSG","7019"]],AUTHORITY["EPSG","6269"]],PRIMEM["Greenwich",0,AUTHORITY["EPSG","8901"]],"#,
    r#"UNIT["degree",0.0174532925199433,AUTHORITY["EPSG","9122"]],AUTHORITY["EPSG","4269"]]"#,
);

const WKT_EPSG_3857: &str = concat!(
    r#"PROJCS["WGS 84 / Pseudo-Mercator",GEOGCS["WGS 84",DATUM["WGS_1984",SPHEROID["WGS 84",6378137,298.257223563,"#,
    r#"AUTHORITY["EPSG","7030"]],AUTHORITY["EPSG","6326"]],PRIMEM["Greenwich",0,AUTHORITY["EPSG","8901"]],"#,
    r#"UNIT["degree",0.0174532925199433,AUTHORITY["EPSG","9122"]],AUTHORITY["EPSG","4326"]],"#,
    r#"PROJECTION["Mercator_1SP"],PARAMETER["central_meridian",0],PARAMETER["scale_factor",1],"#,
    r#"PARAMETER["false_easting",0],PARAMETER["false_northing",0],UNIT["metre",1,AUTHORITY["EPSG","9001"]],"#,
    r#"AXIS["Easting",EAST],AXIS["Northing",NORTH],AUTHORITY["EPSG","3857"]]"#,
);

/// Well-known CRS codes that can be described without an external database.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CrsCode {
    /// WGS 84, degrees.
    Epsg4326,
    /// Pseudo-Mercator, metres.
    Epsg3857,
    Epsg4269,
}

impl CrsCode {
    /// Case-insensitive `EPSG:<n>` lookup. `CRS84` spellings map to 4326.
    pub fn from_identifier(s: &str) -> Result<Self, CrsParseError> {
        let normalized = s.trim().to_uppercase();

        match normalized.as_str() {
            "EPSG:4326" | "CRS:84" | "CRS84" | "OGC:CRS84" => Ok(CrsCode::Epsg4326),
            "EPSG:3857" | "EPSG:900913" => Ok(CrsCode::Epsg3857),
            "EPSG:4269" => Ok(CrsCode::Epsg4269),
            _ => Err(CrsParseError::UnsupportedCrs(s.to_string())),
        }
    }

    /// WKT1 definition of this CRS.
    pub fn wkt(&self) -> &'static str {
        match self {
            CrsCode::Epsg4326 => WKT_EPSG_4326,
            CrsCode::Epsg3857 => WKT_EPSG_3857,
            CrsCode::Epsg4269 => WKT_EPSG_4269,
        }
    }
}

impl fmt::Display for CrsCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let code = match self {
            CrsCode::Epsg4326 => "EPSG:4326",
            CrsCode::Epsg3857 => "EPSG:3857",
            CrsCode::Epsg4269 => "EPSG:4269",
        };
        write!(f, "{}", code)
    }
}

/// A usable CRS handle: either a well-known code or an embedded WKT definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Crs {
    /// Well-known code with a built-in definition.
    Code(CrsCode),
    /// Definition text supplied by the document.
    Wkt(String),
}

impl Crs {
    pub fn new(code: CrsCode) -> Self {
        Crs::Code(code)
    }

    /// Build from embedded WKT text.
    pub fn from_wkt(wkt: impl Into<String>) -> Result<Self, CrsParseError> {
        let wkt = wkt.into();
        let trimmed = wkt.trim();
        if trimmed.is_empty() || !trimmed.ends_with(']') || !trimmed.contains('[') {
            return Err(CrsParseError::InvalidWkt(wkt));
        }
        Ok(Crs::Wkt(trimmed.to_string()))
    }

    /// WKT text of this CRS.
    pub fn to_wkt(&self) -> &str {
        match self {
            Crs::Code(code) => code.wkt(),
            Crs::Wkt(wkt) => wkt,
        }
    }

    /// Authority identifier (e.g. `EPSG:4326`) when one is known.
    ///
    /// For WKT definitions this is the outermost (last) `AUTHORITY` clause.
    pub fn authid(&self) -> Option<String> {
        match self {
            Crs::Code(code) => Some(code.to_string()),
            Crs::Wkt(wkt) => {
                let start = wkt.rfind("AUTHORITY[")?;
                let inner = &wkt[start + "AUTHORITY[".len()..];
                let end = inner.find(']')?;
                let parts: Vec<&str> = inner[..end]
                    .split(',')
                    .map(|p| p.trim().trim_matches('"'))
                    .collect();
                match parts.as_slice() {
                    [authority, code] => Some(format!("{}:{}", authority, code)),
                    _ => None,
                }
            }
        }
    }
}

impl Default for Crs {
    fn default() -> Self {
        Crs::Code(CrsCode::Epsg4326)
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CrsParseError {
    #[error("Unsupported CRS: {0}")]
    UnsupportedCrs(String),

    #[error("Invalid WKT definition: {0}")]
    InvalidWkt(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identifier_lookup() {
        assert_eq!(
            CrsCode::from_identifier("EPSG:4326").unwrap(),
            CrsCode::Epsg4326
        );
        assert_eq!(
            CrsCode::from_identifier("epsg:3857").unwrap(),
            CrsCode::Epsg3857
        );
        assert_eq!(
            CrsCode::from_identifier("OGC:CRS84").unwrap(),
            CrsCode::Epsg4326
        );
        assert!(CrsCode::from_identifier("EPSG:99999").is_err());
    }

    #[test]
    fn test_wkt_authid() {
        let crs = Crs::new(CrsCode::Epsg3857);
        assert!(crs.to_wkt().starts_with("PROJCS"));
        assert_eq!(crs.authid(), Some("EPSG:3857".to_string()));

        let embedded = Crs::from_wkt(WKT_EPSG_4269).unwrap();
        assert_eq!(embedded.authid(), Some("EPSG:4269".to_string()));
    }

    #[test]
    fn test_wkt_without_authority() {
        let crs = Crs::from_wkt(
            r#"GEOGCS["Unknown",DATUM["Unknown",SPHEROID["WGS_1984",6378137,298.257223563]],PRIMEM["Greenwich",0],UNIT["degree",0.017453]]"#,
        )
        .unwrap();
        assert_eq!(crs.authid(), None);
        assert!(crs.to_wkt().starts_with("GEOGCS[\"Unknown\""));
    }

    #[test]
    fn test_invalid_wkt() {
        assert!(Crs::from_wkt("").is_err());
        assert!(Crs::from_wkt("not a crs").is_err());
    }
}
