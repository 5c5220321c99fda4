//! Fallback conversion through geozero.
//!
//! Any input the fast path cannot parse or encode is handed here verbatim.
//! geozero covers the full WKT grammar, including the dimension qualifiers,
//! `EMPTY` bodies and exotic subtypes the fast path rejects, and emits ISO
//! WKB; the SRID is then spliced into the header to form EWKB. Failures on
//! this path are fatal: there is no further fallback.

use geo::Geometry;
use geozero::{CoordDimensions, ToGeo, ToWkb};

use crate::error::{GeoCopyError, Result};
use crate::ewkb::{EWKB_SRID_FLAG, WKB_POINT};

/// Convert a WKT string (without SRID prefix) through geozero.
///
/// # Example
///
/// ```
/// use geocopy_core::fallback::fallback_encode;
///
/// let blob = fallback_encode("POINT(1 2)", Some(4326)).unwrap();
/// assert_eq!(blob.len(), 25);
/// ```
pub fn fallback_encode(wkt: &str, srid: Option<i32>) -> Result<Vec<u8>> {
    let geom: Geometry<f64> = geozero::wkt::Wkt(wkt.as_bytes()).to_geo()?;
    write_ewkb(&geom, srid)
}

/// Serialize a `geo::Geometry<f64>` through geozero with an optional SRID.
pub fn write_ewkb(geom: &Geometry<f64>, srid: Option<i32>) -> Result<Vec<u8>> {
    // geozero cannot round-trip POINT EMPTY (NaN coordinates); write it
    // directly in the same layout the fast path would use.
    if let Geometry::Point(point) = geom {
        if point.x().is_nan() && point.y().is_nan() {
            let mut out = Vec::with_capacity(25);
            out.push(0x01);
            let mut word = WKB_POINT;
            if srid.is_some() {
                word |= EWKB_SRID_FLAG;
            }
            out.extend_from_slice(&word.to_le_bytes());
            if let Some(srid) = srid {
                out.extend_from_slice(&srid.to_le_bytes());
            }
            out.extend_from_slice(&f64::NAN.to_le_bytes());
            out.extend_from_slice(&f64::NAN.to_le_bytes());
            return Ok(out);
        }
    }

    let iso = geom
        .to_wkb(CoordDimensions::xy())
        .map_err(GeoCopyError::Fallback)?;
    match srid {
        Some(srid) => patch_srid(&iso, srid),
        None => Ok(iso),
    }
}

/// Splice the SRID flag and value into an ISO WKB header.
///
/// ISO WKB: `[byte_order(1)][type_u32(4)][payload...]`
/// EWKB:    `[byte_order(1)][type_u32|SRID_FLAG(4)][srid_i32(4)][payload...]`
fn patch_srid(iso: &[u8], srid: i32) -> Result<Vec<u8>> {
    if iso.len() < 5 || iso[0] != 0x01 {
        return Err(GeoCopyError::InvalidEwkb("fallback produced no WKB header"));
    }
    let raw_type = u32::from_le_bytes([iso[1], iso[2], iso[3], iso[4]]);

    let mut out = Vec::with_capacity(iso.len() + 4);
    out.push(iso[0]);
    out.extend_from_slice(&(raw_type | EWKB_SRID_FLAG).to_le_bytes());
    out.extend_from_slice(&srid.to_le_bytes());
    out.extend_from_slice(&iso[5..]);
    Ok(out)
}
