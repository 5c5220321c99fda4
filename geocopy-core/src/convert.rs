//! The WKT/EWKT to EWKB conversion pipeline.
//!
//! Control flow: split the SRID prefix, hand-parse the WKT body and pack the
//! bytes directly. Any recoverable fast-path failure routes the body through
//! the geozero fallback instead; only over-deep nesting and fallback failures
//! surface to the caller. The fast path is a pure optimization and both paths
//! produce identical bytes for identical input.

use tracing::debug;

use crate::copy::CopyField;
use crate::error::Result;
use crate::ewkb::encode_geometry;
use crate::fallback::fallback_encode;
use crate::wkt::{parse_wkt, split_srid};

/// Convert a WKT or EWKT string into EWKB bytes.
///
/// # Example
///
/// ```
/// use geocopy_core::geometry_to_ewkb;
///
/// let blob = geometry_to_ewkb("SRID=4326;POINT(1 2)").unwrap();
/// assert_eq!(blob.len(), 25);
/// assert_eq!(blob[0], 0x01);
/// ```
pub fn geometry_to_ewkb(input: &str) -> Result<Vec<u8>> {
    let (srid, wkt) = split_srid(input);
    match parse_wkt(wkt).and_then(|geom| encode_geometry(&geom, srid)) {
        Ok(ewkb) => Ok(ewkb),
        Err(err) if err.is_recoverable() => {
            debug!(error = %err, "fast path rejected input, using geozero fallback");
            fallback_encode(wkt, srid)
        }
        Err(err) => Err(err),
    }
}

/// Convert a WKT or EWKT string into a framed binary COPY field.
///
/// # Example
///
/// ```
/// use geocopy_core::geometry_field;
///
/// let field = geometry_field("POINT(10.1 20)").unwrap();
/// assert_eq!(field.descriptor(), "i21s");
/// assert_eq!(field.len(), 21);
/// ```
pub fn geometry_field(input: &str) -> Result<CopyField> {
    Ok(CopyField::new(geometry_to_ewkb(input)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GeoCopyError;
    use crate::ewkb::{
        EWKB_SRID_FLAG, WKB_GEOMETRYCOLLECTION, WKB_LINESTRING, WKB_MULTIPOLYGON, WKB_POINT,
        WKB_POLYGON,
    };
    use crate::wkt::MAX_COLLECTION_DEPTH;

    fn le_u32(blob: &[u8], at: usize) -> u32 {
        u32::from_le_bytes(blob[at..at + 4].try_into().unwrap())
    }

    fn le_i32(blob: &[u8], at: usize) -> i32 {
        i32::from_le_bytes(blob[at..at + 4].try_into().unwrap())
    }

    fn le_f64(blob: &[u8], at: usize) -> f64 {
        f64::from_le_bytes(blob[at..at + 8].try_into().unwrap())
    }

    #[test]
    fn point_without_srid() {
        let blob = geometry_to_ewkb("POINT(10.1 20)").unwrap();
        assert_eq!(blob.len(), 21);
        assert_eq!(blob[0], 0x01);
        assert_eq!(le_u32(&blob, 1), WKB_POINT);
        assert_eq!(le_f64(&blob, 5), 10.1);
        assert_eq!(le_f64(&blob, 13), 20.0);
    }

    #[test]
    fn linestring_with_srid() {
        let blob = geometry_to_ewkb("SRID=4326;LINESTRING(10 10,20 30,100.456 40)").unwrap();
        assert_eq!(le_u32(&blob, 1), WKB_LINESTRING | EWKB_SRID_FLAG);
        assert_eq!(le_i32(&blob, 5), 4326);
        assert_eq!(le_u32(&blob, 9), 3);
        assert_eq!(le_f64(&blob, 13 + 32), 100.456);
    }

    #[test]
    fn polygon_counts() {
        let blob = geometry_to_ewkb("POLYGON((30 10,40 40,20 40,10 20,30 10))").unwrap();
        assert_eq!(le_u32(&blob, 1), WKB_POLYGON);
        assert_eq!(le_u32(&blob, 5), 1);
        assert_eq!(le_u32(&blob, 9), 5);
    }

    #[test]
    fn collection_srid_stays_on_the_outer_header() {
        let blob =
            geometry_to_ewkb("SRID=4326;GEOMETRYCOLLECTION(POINT(40 10),LINESTRING(10 10,20 20,10 40))")
                .unwrap();
        assert_eq!(le_u32(&blob, 1), WKB_GEOMETRYCOLLECTION | EWKB_SRID_FLAG);
        assert_eq!(le_i32(&blob, 5), 4326);
        assert_eq!(le_u32(&blob, 9), 2);
        // member 1: Point with a plain header, no SRID flag, 21 bytes
        assert_eq!(blob[13], 0x01);
        assert_eq!(le_u32(&blob, 14), WKB_POINT);
        assert_eq!(le_f64(&blob, 18), 40.0);
        // member 2: LineString with a plain header
        assert_eq!(blob[34], 0x01);
        assert_eq!(le_u32(&blob, 35), WKB_LINESTRING);
        assert_eq!(le_u32(&blob, 39), 3);
    }

    #[test]
    fn multipolygon_counts() {
        let blob = geometry_to_ewkb(
            "MULTIPOLYGON(((30 20,45 40,10 40,30 20)),((15 5,40 10,10 20,5 10,15 5)))",
        )
        .unwrap();
        assert_eq!(le_u32(&blob, 1), WKB_MULTIPOLYGON);
        assert_eq!(le_u32(&blob, 5), 2);
        // each polygon carries a single ring
        assert_eq!(le_u32(&blob, 14), 1);
    }

    #[test]
    fn fast_path_matches_fallback() {
        // The fast path must never change observable output versus always
        // using the fallback. Corpus covers all seven kinds, SRID and
        // whitespace variants, holes, nesting and mixed member lists.
        let corpus = [
            "POINT(10.1 20)",
            "POINT(30.5 40.6)",
            "POINT (30.5 40.6)",
            "POINT(-71.064544 42.28787)",
            "SRID=4326;POINT(40.123 50.345)",
            "LINESTRING(10 10,20 30,100.456 40)",
            "SRID=4326;LINESTRING(30 10,10 30,40.12 40.23)",
            "POLYGON((30 10,40 40,20 40,10 20,30 10))",
            "SRID=4326;POLYGON((35 10,45 45,15 40,10 20,35 10),(20 30,35 35,30 20,20 30))",
            "MULTIPOINT(10 40,40 30,20 20,30 10)",
            "MULTIPOINT((10 40),(40 30),(20 20),(30 10))",
            "SRID=4326;MULTIPOINT(10 40,40 30,20 20,30 10)",
            "MULTILINESTRING((10 10,20 20,10 40),(40 40,30 30,40 20,30 10))",
            "SRID=4326;MULTILINESTRING((10 10,20 20,10 40),(40 40,30 30,40 20,30 10))",
            "MULTIPOLYGON(((30 20,45 40,10 40,30 20)),((15 5,40 10,10 20,5 10,15 5)))",
            "SRID=4326;MULTIPOLYGON(((30 20,45 40,10 40,30 20)),((15 5,40 10,10 20,5 10,15 5)))",
            "SRID=4326;GEOMETRYCOLLECTION(POINT(40 10),LINESTRING(10 10,20 20,10 40))",
            "SRID=4326;GEOMETRYCOLLECTION(GEOMETRYCOLLECTION(POINT(40 10),POINT(45 45),LINESTRING(10 10,20 20,10 40)))",
            "SRID=4326;GEOMETRYCOLLECTION(POINT(10 40),POINT(20 40))",
        ];
        for input in corpus {
            let (srid, wkt) = crate::wkt::split_srid(input);
            let geom = crate::wkt::parse_wkt(wkt)
                .unwrap_or_else(|err| panic!("fast path must parse {input}: {err}"));
            let fast = encode_geometry(&geom, srid).unwrap();
            let slow = fallback_encode(wkt, srid).unwrap();
            assert_eq!(fast, slow, "fast/fallback mismatch for {input}");
        }
    }

    #[test]
    fn coordinate_fidelity() {
        let blob = geometry_to_ewkb("POINT(100.456 -0.000001)").unwrap();
        assert_eq!(le_f64(&blob, 5), 100.456);
        assert_eq!(le_f64(&blob, 13), -0.000001);
    }

    #[test]
    fn unsupported_input_falls_back() {
        // EMPTY bodies are rejected by the fast path and served by geozero.
        let blob = geometry_to_ewkb("POINT EMPTY").unwrap();
        assert_eq!(blob.len(), 21);
        assert!(le_f64(&blob, 5).is_nan());

        let blob = geometry_to_ewkb("LINESTRING EMPTY").unwrap();
        assert_eq!(le_u32(&blob, 1), WKB_LINESTRING);
        assert_eq!(le_u32(&blob, 5), 0);
    }

    #[test]
    fn fallback_failure_is_fatal() {
        let err = geometry_to_ewkb("THIS IS NOT WKT").unwrap_err();
        assert!(matches!(err, GeoCopyError::Fallback(_)));
    }

    #[test]
    fn too_deep_nesting_does_not_fall_back() {
        let levels = MAX_COLLECTION_DEPTH + 1;
        let mut wkt = String::from("SRID=4326;");
        for _ in 0..levels {
            wkt.push_str("GEOMETRYCOLLECTION(");
        }
        wkt.push_str("POINT(1 2)");
        for _ in 0..levels {
            wkt.push(')');
        }
        let err = geometry_to_ewkb(&wkt).unwrap_err();
        assert!(matches!(err, GeoCopyError::TooDeeplyNested { .. }));
    }

    #[test]
    fn framed_field_wraps_the_blob() {
        let field = geometry_field("SRID=4326;POINT(1 2)").unwrap();
        assert_eq!(field.len(), 25);
        assert_eq!(field.descriptor(), "i25s");
        assert_eq!(field.payload()[0], 0x01);
    }
}
