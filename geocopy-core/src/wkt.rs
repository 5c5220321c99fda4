//! WKT/EWKT text decomposition.
//!
//! A hand-rolled recursive-descent parser for the seven OGC Simple Features
//! kinds in their 2D form. Inputs the parser does not handle (dimension
//! qualifiers, `EMPTY` bodies, curved subtypes, grammar errors) are reported
//! as recoverable errors so the caller can route the original text through
//! the geozero fallback instead of failing the conversion.

use geo::{
    Coord, Geometry, GeometryCollection, LineString, MultiLineString, MultiPoint, MultiPolygon,
    Point, Polygon,
};
use tracing::trace;

use crate::error::{GeoCopyError, Result};

/// Maximum accepted `GEOMETRYCOLLECTION` nesting depth.
///
/// Untrusted input could otherwise force unbounded recursion. Exceeding the
/// bound fails with [`GeoCopyError::TooDeeplyNested`] and is never retried
/// through the fallback.
pub const MAX_COLLECTION_DEPTH: usize = 32;

/// Split an `SRID=<n>;` prefix off an EWKT string.
///
/// Returns the input untouched when no well-formed prefix is present; the
/// downstream parse then decides whether the text is usable at all.
///
/// # Example
///
/// ```
/// use geocopy_core::wkt::split_srid;
///
/// assert_eq!(split_srid("SRID=4326;POINT(1 2)"), (Some(4326), "POINT(1 2)"));
/// assert_eq!(split_srid("POINT(1 2)"), (None, "POINT(1 2)"));
/// ```
pub fn split_srid(input: &str) -> (Option<i32>, &str) {
    let trimmed = input.trim();
    if let Some(rest) = trimmed.strip_prefix("SRID=") {
        if let Some((digits, wkt)) = rest.split_once(';') {
            if let Ok(srid) = digits.trim().parse::<i32>() {
                return (Some(srid), wkt.trim_start());
            }
        }
    }
    (None, trimmed)
}

/// Parse a 2D WKT string into a geometry tree.
///
/// # Example
///
/// ```
/// use geocopy_core::wkt::parse_wkt;
///
/// let geom = parse_wkt("POINT(1 2)").unwrap();
/// assert!(matches!(geom, geo::Geometry::Point(_)));
/// ```
pub fn parse_wkt(text: &str) -> Result<Geometry<f64>> {
    let mut cur = Cursor::new(text);
    let geom = parse_geometry(&mut cur, 0)?;
    if cur.peek().is_some() {
        return Err(GeoCopyError::MalformedInput(format!(
            "trailing characters after geometry: {:?}",
            snippet(cur.rest)
        )));
    }
    Ok(geom)
}

fn parse_geometry(cur: &mut Cursor<'_>, depth: usize) -> Result<Geometry<f64>> {
    let kw = cur.keyword();
    match kw {
        "POINT" => {
            reject_modifiers(cur)?;
            Ok(Geometry::Point(parse_point(cur)?))
        }
        "LINESTRING" => {
            reject_modifiers(cur)?;
            Ok(Geometry::LineString(LineString::new(parse_coord_list(cur)?)))
        }
        "POLYGON" => {
            reject_modifiers(cur)?;
            Ok(Geometry::Polygon(parse_polygon(cur)?))
        }
        "MULTIPOINT" => {
            reject_modifiers(cur)?;
            Ok(Geometry::MultiPoint(parse_multipoint(cur)?))
        }
        "MULTILINESTRING" => {
            reject_modifiers(cur)?;
            Ok(Geometry::MultiLineString(parse_multilinestring(cur)?))
        }
        "MULTIPOLYGON" => {
            reject_modifiers(cur)?;
            Ok(Geometry::MultiPolygon(parse_multipolygon(cur)?))
        }
        "GEOMETRYCOLLECTION" => {
            reject_modifiers(cur)?;
            if depth >= MAX_COLLECTION_DEPTH {
                return Err(GeoCopyError::TooDeeplyNested {
                    max: MAX_COLLECTION_DEPTH,
                });
            }
            Ok(Geometry::GeometryCollection(parse_collection(
                cur,
                depth + 1,
            )?))
        }
        "CIRCULARSTRING" | "COMPOUNDCURVE" | "CURVEPOLYGON" | "MULTICURVE" | "MULTISURFACE"
        | "POLYHEDRALSURFACE" | "TIN" | "TRIANGLE" => {
            Err(GeoCopyError::UnsupportedKind("curved or surface geometries"))
        }
        _ => Err(GeoCopyError::MalformedInput(format!(
            "unknown geometry keyword {kw:?}"
        ))),
    }
}

/// Reject dimension qualifiers and `EMPTY` bodies between keyword and `(`.
///
/// Both are legal WKT the fast path does not encode; the fallback owns them.
fn reject_modifiers(cur: &mut Cursor<'_>) -> Result<()> {
    if cur.peek() == Some('(') {
        return Ok(());
    }
    match cur.keyword() {
        "Z" | "M" | "ZM" => Err(GeoCopyError::UnsupportedKind("Z/M coordinates")),
        "EMPTY" => Err(GeoCopyError::UnsupportedKind("EMPTY geometries")),
        _ => Err(GeoCopyError::MalformedInput(format!(
            "expected '(' near {:?}",
            snippet(cur.rest)
        ))),
    }
}

fn parse_coord(cur: &mut Cursor<'_>) -> Result<Coord<f64>> {
    let x = cur.number()?;
    let y = cur.number()?;
    Ok(Coord { x, y })
}

fn parse_point(cur: &mut Cursor<'_>) -> Result<Point<f64>> {
    cur.expect('(')?;
    let coord = parse_coord(cur)?;
    cur.expect(')')?;
    Ok(Point::from(coord))
}

/// `( x y, x y, ... )`
fn parse_coord_list(cur: &mut Cursor<'_>) -> Result<Vec<Coord<f64>>> {
    cur.expect('(')?;
    let mut coords = vec![parse_coord(cur)?];
    while cur.eat(',') {
        coords.push(parse_coord(cur)?);
    }
    cur.expect(')')?;
    Ok(coords)
}

/// First ring is the exterior, the remainder are holes. Ring closure is the
/// producer's responsibility and is not verified here.
fn parse_polygon(cur: &mut Cursor<'_>) -> Result<Polygon<f64>> {
    cur.expect('(')?;
    let mut rings = vec![LineString::new(parse_coord_list(cur)?)];
    while cur.eat(',') {
        rings.push(LineString::new(parse_coord_list(cur)?));
    }
    cur.expect(')')?;
    let exterior = rings.remove(0);
    Ok(Polygon::new(exterior, rings))
}

fn parse_multipoint(cur: &mut Cursor<'_>) -> Result<MultiPoint<f64>> {
    cur.expect('(')?;
    let mut points = vec![parse_multipoint_member(cur)?];
    while cur.eat(',') {
        points.push(parse_multipoint_member(cur)?);
    }
    cur.expect(')')?;
    Ok(MultiPoint::new(points))
}

/// WKT allows both `(x y)` and bare `x y` members inside `MULTIPOINT`.
fn parse_multipoint_member(cur: &mut Cursor<'_>) -> Result<Point<f64>> {
    if cur.eat('(') {
        let coord = parse_coord(cur)?;
        cur.expect(')')?;
        Ok(Point::from(coord))
    } else {
        Ok(Point::from(parse_coord(cur)?))
    }
}

fn parse_multilinestring(cur: &mut Cursor<'_>) -> Result<MultiLineString<f64>> {
    cur.expect('(')?;
    let mut lines = vec![LineString::new(parse_coord_list(cur)?)];
    while cur.eat(',') {
        lines.push(LineString::new(parse_coord_list(cur)?));
    }
    cur.expect(')')?;
    Ok(MultiLineString::new(lines))
}

fn parse_multipolygon(cur: &mut Cursor<'_>) -> Result<MultiPolygon<f64>> {
    cur.expect('(')?;
    let mut polygons = vec![parse_polygon(cur)?];
    while cur.eat(',') {
        polygons.push(parse_polygon(cur)?);
    }
    cur.expect(')')?;
    Ok(MultiPolygon::new(polygons))
}

fn parse_collection(cur: &mut Cursor<'_>, depth: usize) -> Result<GeometryCollection<f64>> {
    cur.expect('(')?;
    let mut members = vec![parse_geometry(cur, depth)?];
    while cur.eat(',') {
        members.push(parse_geometry(cur, depth)?);
    }
    cur.expect(')')?;
    trace!(members = members.len(), depth, "parsed geometry collection");
    Ok(GeometryCollection::new_from(members))
}

// ── Cursor over the remaining input ───────────────────────────────────────────

struct Cursor<'a> {
    rest: &'a str,
}

impl<'a> Cursor<'a> {
    fn new(text: &'a str) -> Self {
        Cursor { rest: text }
    }

    fn skip_ws(&mut self) {
        self.rest = self.rest.trim_start();
    }

    fn peek(&mut self) -> Option<char> {
        self.skip_ws();
        self.rest.chars().next()
    }

    /// Consume `c` if it is next, after whitespace.
    fn eat(&mut self, c: char) -> bool {
        if self.peek() == Some(c) {
            self.rest = &self.rest[c.len_utf8()..];
            true
        } else {
            false
        }
    }

    fn expect(&mut self, c: char) -> Result<()> {
        if self.eat(c) {
            Ok(())
        } else {
            Err(GeoCopyError::MalformedInput(format!(
                "expected '{c}' near {:?}",
                snippet(self.rest)
            )))
        }
    }

    /// Consume a run of uppercase ASCII letters.
    fn keyword(&mut self) -> &'a str {
        self.skip_ws();
        let end = self
            .rest
            .find(|ch: char| !ch.is_ascii_uppercase())
            .unwrap_or(self.rest.len());
        let (kw, rest) = self.rest.split_at(end);
        self.rest = rest;
        kw
    }

    /// Consume one coordinate token, up to whitespace or a delimiter.
    fn number(&mut self) -> Result<f64> {
        self.skip_ws();
        let end = self
            .rest
            .find(|ch: char| ch.is_ascii_whitespace() || matches!(ch, ',' | '(' | ')'))
            .unwrap_or(self.rest.len());
        if end == 0 {
            return Err(GeoCopyError::MalformedInput(format!(
                "expected coordinate near {:?}",
                snippet(self.rest)
            )));
        }
        let (token, rest) = self.rest.split_at(end);
        self.rest = rest;
        Ok(token.parse::<f64>()?)
    }
}

fn snippet(rest: &str) -> &str {
    match rest.char_indices().nth(24) {
        Some((idx, _)) => &rest[..idx],
        None => rest,
    }
}
