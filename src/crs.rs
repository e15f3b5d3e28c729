//! Spatial reference identifiers attached to bounding boxes.

use std::{fmt, str::FromStr, sync::LazyLock};

use regex::Regex;
use thiserror::Error as ThisError;

static AUTHORITY_CODE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?i)([a-z][a-z0-9_-]*):(\w+)$").expect("authority:code pattern is valid")
});

static URN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?i)urn:(?:x-)?ogc:def:crs:([a-z][a-z0-9_-]*):(?:[0-9.]*:)?(\w+)$")
        .expect("crs urn pattern is valid")
});

static HTTP: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?i)https?://www\.opengis\.net/(?:gml/srs/([a-z]+)\.xml#(\w+)|def/crs/([a-z][a-z0-9_-]*)/[0-9.]+/(\w+))$",
    )
    .expect("crs uri pattern is valid")
});

#[derive(Debug, Clone, PartialEq, Eq, ThisError)]
#[error("malformed CRS identifier '{0}'")]
pub struct CrsError(pub String);

/// Coordinate reference system named by authority and code (`EPSG:4326`).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Crs {
    authority: String,
    code: String,
}

impl Crs {
    pub fn new(authority: impl Into<String>, code: impl Into<String>) -> Self {
        Crs {
            authority: authority.into().to_ascii_uppercase(),
            code: code.into(),
        }
    }

    pub fn authority(&self) -> &str {
        &self.authority
    }

    pub fn code(&self) -> &str {
        &self.code
    }
}

impl FromStr for Crs {
    type Err = CrsError;

    /// Accepts `AUTH:CODE`, OGC URNs and opengis.net URIs.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let text = s.trim();

        if let Some(caps) = URN.captures(text) {
            return Ok(Crs::new(&caps[1], &caps[2]));
        }
        if let Some(caps) = HTTP.captures(text) {
            return match (caps.get(1), caps.get(2), caps.get(3), caps.get(4)) {
                (Some(auth), Some(code), _, _) | (_, _, Some(auth), Some(code)) => {
                    Ok(Crs::new(auth.as_str(), code.as_str()))
                }
                _ => Err(CrsError(s.to_string())),
            };
        }
        if let Some(caps) = AUTHORITY_CODE.captures(text) {
            return Ok(Crs::new(&caps[1], &caps[2]));
        }

        Err(CrsError(s.to_string()))
    }
}

impl fmt::Display for Crs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.authority, self.code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_form() {
        let crs: Crs = "epsg:4326".parse().unwrap();
        assert_eq!(crs.authority(), "EPSG");
        assert_eq!(crs.code(), "4326");
        assert_eq!(crs.to_string(), "EPSG:4326");
        assert_eq!("CRS:84".parse::<Crs>().unwrap().code(), "84");
    }

    #[test]
    fn urn_and_uri_forms() {
        let expected = Crs::new("EPSG", "4326");
        for text in [
            "urn:ogc:def:crs:EPSG::4326",
            "urn:ogc:def:crs:EPSG:6.6:4326",
            "urn:x-ogc:def:crs:EPSG:4326",
            "http://www.opengis.net/gml/srs/epsg.xml#4326",
            "http://www.opengis.net/def/crs/EPSG/0/4326",
        ] {
            assert_eq!(text.parse::<Crs>().unwrap(), expected, "{text}");
        }
    }

    #[test]
    fn rejects_garbage() {
        assert!("4326".parse::<Crs>().is_err());
        assert!("EPSG:".parse::<Crs>().is_err());
        assert!("".parse::<Crs>().is_err());
    }
}
