//! Geometry literals.
//!
//! A small well-known-text reader covering the forms the filter grammar
//! accepts. Geometries are carried opaquely through the filter tree; no
//! spatial operations are implemented here.

use std::fmt;

use thiserror::Error as ThisError;

use crate::{config::DEFAULT_MAX_DEPTH, crs::Crs};

#[derive(Debug, Clone, PartialEq, ThisError)]
#[error("invalid geometry at offset {offset}: {message}")]
pub struct GeometryError {
    pub message: String,
    pub offset: usize,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coord {
    pub x: f64,
    pub y: f64,
    pub z: Option<f64>,
}

impl Coord {
    pub fn xy(x: f64, y: f64) -> Self {
        Coord { x, y, z: None }
    }
}

impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.x, self.y)?;
        if let Some(z) = self.z {
            write!(f, " {}", z)?;
        }
        Ok(())
    }
}

/// Axis-aligned bounding box.
#[derive(Debug, Clone, PartialEq)]
pub struct Envelope {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
    pub crs: Option<Crs>,
}

impl Envelope {
    pub fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        Envelope {
            min_x,
            min_y,
            max_x,
            max_y,
            crs: None,
        }
    }

    pub fn with_crs(mut self, crs: Crs) -> Self {
        self.crs = Some(crs);
        self
    }
}

/// Geometry value. Empty sequences stand for the `EMPTY` form.
#[derive(Debug, Clone, PartialEq)]
pub enum Geometry {
    Point(Option<Coord>),
    LineString(Vec<Coord>),
    Polygon(Vec<Vec<Coord>>),
    MultiPoint(Vec<Coord>),
    MultiLineString(Vec<Vec<Coord>>),
    MultiPolygon(Vec<Vec<Vec<Coord>>>),
    GeometryCollection(Vec<Geometry>),
    /// `ENVELOPE(west, east, north, south)`
    Envelope(Envelope),
}

impl Geometry {
    pub fn from_wkt(text: &str) -> Result<Geometry, GeometryError> {
        let mut reader = WktReader {
            text,
            pos: 0,
            collections: 0,
        };
        let geometry = reader.geometry()?;
        reader.skip_whitespace();
        if reader.pos < text.len() {
            return Err(reader.error("trailing characters after geometry"));
        }
        Ok(geometry)
    }

    pub fn tag(&self) -> &'static str {
        match self {
            Geometry::Point(_) => "POINT",
            Geometry::LineString(_) => "LINESTRING",
            Geometry::Polygon(_) => "POLYGON",
            Geometry::MultiPoint(_) => "MULTIPOINT",
            Geometry::MultiLineString(_) => "MULTILINESTRING",
            Geometry::MultiPolygon(_) => "MULTIPOLYGON",
            Geometry::GeometryCollection(_) => "GEOMETRYCOLLECTION",
            Geometry::Envelope(_) => "ENVELOPE",
        }
    }
}

struct WktReader<'a> {
    text: &'a str,
    pos: usize,
    collections: usize,
}

impl<'a> WktReader<'a> {
    fn error(&self, message: impl Into<String>) -> GeometryError {
        GeometryError {
            message: message.into(),
            offset: self.pos,
        }
    }

    fn rest(&self) -> &'a str {
        &self.text[self.pos..]
    }

    fn skip_whitespace(&mut self) {
        let trimmed = self.rest().trim_start();
        self.pos = self.text.len() - trimmed.len();
    }

    fn peek(&mut self) -> Option<char> {
        self.skip_whitespace();
        self.rest().chars().next()
    }

    fn eat(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.pos += expected.len_utf8();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, expected: char) -> Result<(), GeometryError> {
        if self.eat(expected) {
            Ok(())
        } else {
            Err(self.error(format!("expected '{}'", expected)))
        }
    }

    fn word(&mut self) -> String {
        self.skip_whitespace();
        let len = self
            .rest()
            .find(|c: char| !c.is_ascii_alphabetic())
            .unwrap_or(self.rest().len());
        let word = self.rest()[..len].to_ascii_uppercase();
        self.pos += len;
        word
    }

    /// Consumes `EMPTY`, or the opening parenthesis of a non-empty body.
    fn open(&mut self) -> Result<bool, GeometryError> {
        if self.eat('(') {
            return Ok(true);
        }
        let checkpoint = self.pos;
        if self.word() == "EMPTY" {
            return Ok(false);
        }
        self.pos = checkpoint;
        Err(self.error("expected '(' or EMPTY"))
    }

    fn number(&mut self) -> Result<f64, GeometryError> {
        self.skip_whitespace();
        let len = self
            .rest()
            .find(|c: char| !(c.is_ascii_digit() || matches!(c, '+' | '-' | '.' | 'e' | 'E')))
            .unwrap_or(self.rest().len());
        let text = &self.rest()[..len];
        let value = text
            .parse::<f64>()
            .map_err(|_| self.error(format!("expected a number, found '{}'", text)))?;
        self.pos += len;
        Ok(value)
    }

    fn at_number(&mut self) -> bool {
        self.peek()
            .is_some_and(|c| c.is_ascii_digit() || matches!(c, '+' | '-' | '.'))
    }

    fn coord(&mut self) -> Result<Coord, GeometryError> {
        let x = self.number()?;
        let y = self.number()?;
        let z = if self.at_number() {
            Some(self.number()?)
        } else {
            None
        };
        Ok(Coord { x, y, z })
    }

    fn separated<T>(
        &mut self,
        mut item: impl FnMut(&mut Self) -> Result<T, GeometryError>,
    ) -> Result<Vec<T>, GeometryError> {
        let mut items = vec![item(self)?];
        while self.eat(',') {
            items.push(item(self)?);
        }
        self.expect(')')?;
        Ok(items)
    }

    fn coords(&mut self) -> Result<Vec<Coord>, GeometryError> {
        if !self.open()? {
            return Ok(Vec::new());
        }
        self.separated(Self::coord)
    }

    fn rings(&mut self) -> Result<Vec<Vec<Coord>>, GeometryError> {
        if !self.open()? {
            return Ok(Vec::new());
        }
        self.separated(Self::coords)
    }

    /// Both `(1 2, 3 4)` and `((1 2), (3 4))`.
    fn point_list(&mut self) -> Result<Vec<Coord>, GeometryError> {
        if !self.open()? {
            return Ok(Vec::new());
        }
        self.separated(|reader| {
            if reader.eat('(') {
                let coord = reader.coord()?;
                reader.expect(')')?;
                Ok(coord)
            } else {
                reader.coord()
            }
        })
    }

    fn geometry(&mut self) -> Result<Geometry, GeometryError> {
        let tag = self.word();
        // A third ordinate is always Z; measures have nowhere to go.
        let checkpoint = self.pos;
        match self.word().as_str() {
            "Z" => {}
            marker @ ("M" | "ZM") => {
                self.pos = checkpoint;
                return Err(self.error(format!("{} coordinates are not supported", marker)));
            }
            _ => self.pos = checkpoint,
        }

        match tag.as_str() {
            "POINT" => {
                if !self.open()? {
                    return Ok(Geometry::Point(None));
                }
                let coord = self.coord()?;
                self.expect(')')?;
                Ok(Geometry::Point(Some(coord)))
            }
            "LINESTRING" => Ok(Geometry::LineString(self.coords()?)),
            "POLYGON" => Ok(Geometry::Polygon(self.rings()?)),
            "MULTIPOINT" => Ok(Geometry::MultiPoint(self.point_list()?)),
            "MULTILINESTRING" => Ok(Geometry::MultiLineString(self.rings()?)),
            "MULTIPOLYGON" => {
                if !self.open()? {
                    return Ok(Geometry::MultiPolygon(Vec::new()));
                }
                Ok(Geometry::MultiPolygon(self.separated(Self::rings)?))
            }
            "GEOMETRYCOLLECTION" => {
                if !self.open()? {
                    return Ok(Geometry::GeometryCollection(Vec::new()));
                }
                if self.collections == DEFAULT_MAX_DEPTH {
                    return Err(self.error(format!(
                        "geometry collections nested deeper than {} levels",
                        DEFAULT_MAX_DEPTH
                    )));
                }
                self.collections += 1;
                let members = self.separated(Self::geometry)?;
                self.collections -= 1;
                Ok(Geometry::GeometryCollection(members))
            }
            "ENVELOPE" => {
                self.expect('(')?;
                let west = self.number()?;
                self.expect(',')?;
                let east = self.number()?;
                self.expect(',')?;
                let north = self.number()?;
                self.expect(',')?;
                let south = self.number()?;
                self.expect(')')?;
                Ok(Geometry::Envelope(Envelope::new(west, south, east, north)))
            }
            "" => Err(self.error("expected a geometry tag")),
            other => Err(self.error(format!("unknown geometry type '{}'", other))),
        }
    }
}

fn write_coords(f: &mut fmt::Formatter<'_>, coords: &[Coord]) -> fmt::Result {
    f.write_str("(")?;
    for (i, coord) in coords.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{}", coord)?;
    }
    f.write_str(")")
}

fn write_rings(f: &mut fmt::Formatter<'_>, rings: &[Vec<Coord>]) -> fmt::Result {
    f.write_str("(")?;
    for (i, ring) in rings.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write_coords(f, ring)?;
    }
    f.write_str(")")
}

impl fmt::Display for Geometry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())?;
        let empty = match self {
            Geometry::Point(point) => point.is_none(),
            Geometry::LineString(c) | Geometry::MultiPoint(c) => c.is_empty(),
            Geometry::Polygon(r) | Geometry::MultiLineString(r) => r.is_empty(),
            Geometry::MultiPolygon(p) => p.is_empty(),
            Geometry::GeometryCollection(g) => g.is_empty(),
            Geometry::Envelope(_) => false,
        };
        if empty {
            return f.write_str(" EMPTY");
        }

        match self {
            Geometry::Point(Some(coord)) => write!(f, "({})", coord),
            Geometry::LineString(coords) | Geometry::MultiPoint(coords) => write_coords(f, coords),
            Geometry::Polygon(rings) | Geometry::MultiLineString(rings) => write_rings(f, rings),
            Geometry::MultiPolygon(polygons) => {
                f.write_str("(")?;
                for (i, polygon) in polygons.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write_rings(f, polygon)?;
                }
                f.write_str(")")
            }
            Geometry::GeometryCollection(members) => {
                f.write_str("(")?;
                for (i, member) in members.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", member)?;
                }
                f.write_str(")")
            }
            Geometry::Envelope(env) => write!(
                f,
                "({}, {}, {}, {})",
                env.min_x, env.max_x, env.max_y, env.min_y
            ),
            Geometry::Point(None) => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_points_and_lines() {
        assert_eq!(
            Geometry::from_wkt("POINT(1 2)").unwrap(),
            Geometry::Point(Some(Coord::xy(1.0, 2.0)))
        );
        assert_eq!(
            Geometry::from_wkt("LINESTRING (1 2, 10 15)").unwrap(),
            Geometry::LineString(vec![Coord::xy(1.0, 2.0), Coord::xy(10.0, 15.0)])
        );
        assert_eq!(
            Geometry::from_wkt("point(1.5 -2 3)").unwrap(),
            Geometry::Point(Some(Coord {
                x: 1.5,
                y: -2.0,
                z: Some(3.0)
            }))
        );
    }

    #[test]
    fn multipoint_accepts_both_forms() {
        let bare = Geometry::from_wkt("MULTIPOINT(1 2, 3 4)").unwrap();
        let wrapped = Geometry::from_wkt("MULTIPOINT((1 2), (3 4))").unwrap();
        assert_eq!(bare, wrapped);
    }

    #[test]
    fn empty_and_collections() {
        assert_eq!(Geometry::from_wkt("POINT EMPTY").unwrap(), Geometry::Point(None));
        let collection = Geometry::from_wkt(
            "GEOMETRYCOLLECTION (POINT (10 10), POLYGON ((0 0, 1 0, 1 1, 0 0)))",
        )
        .unwrap();
        assert!(matches!(collection, Geometry::GeometryCollection(ref m) if m.len() == 2));
        assert_eq!(
            collection.to_string(),
            "GEOMETRYCOLLECTION(POINT(10 10), POLYGON((0 0, 1 0, 1 1, 0 0)))"
        );
    }

    #[test]
    fn envelope_argument_order() {
        let geometry = Geometry::from_wkt("ENVELOPE(-180, 180, 90, -90)").unwrap();
        assert_eq!(
            geometry,
            Geometry::Envelope(Envelope::new(-180.0, -90.0, 180.0, 90.0))
        );
        assert_eq!(geometry.to_string(), "ENVELOPE(-180, 180, 90, -90)");
    }

    #[test]
    fn rejects_malformed_text() {
        assert!(Geometry::from_wkt("POINT(1)").is_err());
        assert!(Geometry::from_wkt("POINT(1 2").is_err());
        assert!(Geometry::from_wkt("CIRCLE(1 2)").is_err());
        assert!(Geometry::from_wkt("POINT(1 2) x").is_err());
    }

    #[test]
    fn z_marker_is_optional_and_measures_are_refused() {
        let marked = Geometry::from_wkt("POINT Z (1 2 3)").unwrap();
        assert_eq!(marked, Geometry::from_wkt("POINT(1 2 3)").unwrap());

        let err = Geometry::from_wkt("POINT M (1 2 3)").unwrap_err();
        assert!(err.message.contains("M coordinates"));
        assert!(Geometry::from_wkt("LINESTRING ZM (1 2 3 4, 5 6 7 8)").is_err());
    }

    #[test]
    fn collection_nesting_is_bounded() {
        let nested = |levels: usize| {
            format!(
                "{}POINT(1 2){}",
                "GEOMETRYCOLLECTION(".repeat(levels),
                ")".repeat(levels)
            )
        };
        assert!(Geometry::from_wkt(&nested(3)).is_ok());
        let err = Geometry::from_wkt(&nested(20_000)).unwrap_err();
        assert!(err.message.contains("nested deeper"));
    }
}
