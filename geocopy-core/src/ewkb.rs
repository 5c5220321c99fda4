//! EWKB (Extended Well-Known Binary) fast-path writer.
//!
//! Wire format, always little-endian:
//!   [0x01]        byte order marker
//!   [u32]         geometry type word
//!                 Bit 29 (0x20000000): SRID present
//!                 Bits 0-28: geometry type (1=Point, 2=LineString, ...)
//!   [i32]         SRID (only when the SRID flag is set)
//!   ...           geometry payload (u32 counts, f64 coordinate pairs)
//!
//! Every multi-byte field is serialized with `to_le_bytes`, never in host
//! byte order, so the output is identical on any machine. The SRID field is
//! written only on the outermost geometry: elements of Multi* geometries and
//! members of a GeometryCollection always carry plain headers.

use geo::{Coord, Geometry, LineString, Polygon};

use crate::error::{GeoCopyError, Result};

pub const EWKB_SRID_FLAG: u32 = 0x20000000;

// ── Geometry type codes ───────────────────────────────────────────────────────
pub const WKB_POINT: u32 = 1;
pub const WKB_LINESTRING: u32 = 2;
pub const WKB_POLYGON: u32 = 3;
pub const WKB_MULTIPOINT: u32 = 4;
pub const WKB_MULTILINESTRING: u32 = 5;
pub const WKB_MULTIPOLYGON: u32 = 6;
pub const WKB_GEOMETRYCOLLECTION: u32 = 7;

/// Encode a geometry tree to EWKB with an optional top-level SRID.
///
/// The `geo` enum's non-OGC variants (`Line`, `Rect`, `Triangle`) are
/// rejected with [`GeoCopyError::UnsupportedKind`].
///
/// # Example
///
/// ```
/// use geo::{Geometry, Point};
/// use geocopy_core::ewkb::encode_geometry;
///
/// let blob = encode_geometry(&Geometry::Point(Point::new(1.0, 2.0)), None).unwrap();
/// // byte order(1) + type(4) + x(8) + y(8)
/// assert_eq!(blob.len(), 21);
/// ```
pub fn encode_geometry(geom: &Geometry<f64>, srid: Option<i32>) -> Result<Vec<u8>> {
    let mut out = Vec::with_capacity(64);
    encode_into(&mut out, geom, srid)?;
    Ok(out)
}

fn encode_into(out: &mut Vec<u8>, geom: &Geometry<f64>, srid: Option<i32>) -> Result<()> {
    match geom {
        Geometry::Point(point) => {
            write_header(out, WKB_POINT, srid);
            write_coord(out, &point.0);
        }
        Geometry::LineString(line) => {
            write_header(out, WKB_LINESTRING, srid);
            write_linestring_body(out, line);
        }
        Geometry::Polygon(polygon) => {
            write_header(out, WKB_POLYGON, srid);
            write_polygon_body(out, polygon);
        }
        Geometry::MultiPoint(mp) => {
            write_header(out, WKB_MULTIPOINT, srid);
            write_count(out, mp.0.len());
            for point in &mp.0 {
                write_header(out, WKB_POINT, None);
                write_coord(out, &point.0);
            }
        }
        Geometry::MultiLineString(mls) => {
            write_header(out, WKB_MULTILINESTRING, srid);
            write_count(out, mls.0.len());
            for line in &mls.0 {
                write_header(out, WKB_LINESTRING, None);
                write_linestring_body(out, line);
            }
        }
        Geometry::MultiPolygon(mp) => {
            write_header(out, WKB_MULTIPOLYGON, srid);
            write_count(out, mp.0.len());
            for polygon in &mp.0 {
                write_header(out, WKB_POLYGON, None);
                write_polygon_body(out, polygon);
            }
        }
        Geometry::GeometryCollection(gc) => {
            write_header(out, WKB_GEOMETRYCOLLECTION, srid);
            write_count(out, gc.0.len());
            for member in &gc.0 {
                // members never carry their own SRID field
                encode_into(out, member, None)?;
            }
        }
        other => return Err(GeoCopyError::UnsupportedKind(variant_name(other))),
    }
    Ok(())
}

fn write_header(out: &mut Vec<u8>, type_code: u32, srid: Option<i32>) {
    out.push(0x01);
    let mut word = type_code;
    if srid.is_some() {
        word |= EWKB_SRID_FLAG;
    }
    out.extend_from_slice(&word.to_le_bytes());
    if let Some(srid) = srid {
        out.extend_from_slice(&srid.to_le_bytes());
    }
}

fn write_count(out: &mut Vec<u8>, n: usize) {
    out.extend_from_slice(&(n as u32).to_le_bytes());
}

fn write_coord(out: &mut Vec<u8>, coord: &Coord<f64>) {
    out.extend_from_slice(&coord.x.to_le_bytes());
    out.extend_from_slice(&coord.y.to_le_bytes());
}

fn write_linestring_body(out: &mut Vec<u8>, line: &LineString<f64>) {
    write_count(out, line.0.len());
    for coord in &line.0 {
        write_coord(out, coord);
    }
}

fn write_polygon_body(out: &mut Vec<u8>, polygon: &Polygon<f64>) {
    // A fully empty polygon is written with a zero ring count, matching the
    // ISO WKB form the fallback produces.
    if polygon.exterior().0.is_empty() && polygon.interiors().is_empty() {
        write_count(out, 0);
        return;
    }
    write_count(out, 1 + polygon.interiors().len());
    write_linestring_body(out, polygon.exterior());
    for ring in polygon.interiors() {
        write_linestring_body(out, ring);
    }
}

fn variant_name(geom: &Geometry<f64>) -> &'static str {
    match geom {
        Geometry::Line(_) => "Line",
        Geometry::Rect(_) => "Rect",
        Geometry::Triangle(_) => "Triangle",
        _ => "geometry",
    }
}
