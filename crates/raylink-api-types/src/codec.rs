//! Fixed-layout encoding of the values exchanged on the wire.
//!
//! Vectors are three IEEE-754 single-precision floats in `x, y, z` order,
//! little-endian. A query is its start vector followed by its end vector, and
//! a result is a single byte.

use crate::error::WireError;
use crate::queries::RaycastQuery;
use bincode::Options;
use rapier::math::{Point, Real};

pub const VECTOR3_LEN: usize = 12;
pub const QUERY_LEN: usize = 2 * VECTOR3_LEN;
pub const RESULT_LEN: usize = 1;

pub const HIT: u8 = 1;
pub const MISS: u8 = 0;

#[derive(Copy, Clone, Debug, serde::Serialize, serde::Deserialize)]
struct WireVector3 {
    x: Real,
    y: Real,
    z: Real,
}

impl From<Point<Real>> for WireVector3 {
    fn from(p: Point<Real>) -> Self {
        Self {
            x: p.x,
            y: p.y,
            z: p.z,
        }
    }
}

impl From<WireVector3> for Point<Real> {
    fn from(v: WireVector3) -> Self {
        Point::new(v.x, v.y, v.z)
    }
}

#[derive(Copy, Clone, Debug, serde::Serialize, serde::Deserialize)]
struct WireQuery {
    start: WireVector3,
    end: WireVector3,
}

fn wire_options() -> impl Options {
    bincode::DefaultOptions::new()
        .with_fixint_encoding()
        .with_little_endian()
}

fn malformed(expected: usize, bytes: &[u8]) -> WireError {
    WireError::MalformedInput {
        expected,
        received: bytes.len(),
    }
}

pub fn encode_vector3(v: &Point<Real>) -> Result<[u8; VECTOR3_LEN], WireError> {
    let mut bytes = [0; VECTOR3_LEN];
    wire_options().serialize_into(&mut bytes[..], &WireVector3::from(*v))?;
    Ok(bytes)
}

/// Decodes the first [`VECTOR3_LEN`] bytes of `bytes`.
pub fn decode_vector3(bytes: &[u8]) -> Result<Point<Real>, WireError> {
    let frame = bytes
        .get(..VECTOR3_LEN)
        .ok_or_else(|| malformed(VECTOR3_LEN, bytes))?;
    let wire: WireVector3 = wire_options().deserialize(frame)?;
    Ok(wire.into())
}

pub fn encode_query(query: &RaycastQuery) -> Result<[u8; QUERY_LEN], WireError> {
    let wire = WireQuery {
        start: query.start.into(),
        end: query.end.into(),
    };
    let mut bytes = [0; QUERY_LEN];
    wire_options().serialize_into(&mut bytes[..], &wire)?;
    Ok(bytes)
}

pub fn decode_query(bytes: &[u8]) -> Result<RaycastQuery, WireError> {
    let frame = bytes
        .get(..QUERY_LEN)
        .ok_or_else(|| malformed(QUERY_LEN, bytes))?;
    let wire: WireQuery = wire_options().deserialize(frame)?;
    Ok(RaycastQuery::new(wire.start.into(), wire.end.into()))
}

pub fn encode_result(hit: bool) -> u8 {
    if hit {
        HIT
    } else {
        MISS
    }
}

/// Any nonzero byte counts as a hit.
pub fn decode_result(byte: u8) -> bool {
    byte != MISS
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rapier::na::point;
    use rstest::rstest;

    fn bits(p: &Point<Real>) -> [u32; 3] {
        [p.x.to_bits(), p.y.to_bits(), p.z.to_bits()]
    }

    #[rstest]
    #[case(point![0.0, 0.0, 0.0])]
    #[case(point![0.0, 0.0, -1000.0])]
    #[case(point![-0.0, 1.5e-42, Real::MAX])]
    #[case(point![Real::MIN_POSITIVE, Real::EPSILON, -123.456])]
    #[case(point![Real::INFINITY, Real::NEG_INFINITY, 1.0e30])]
    fn vectors_decode_to_the_same_bits(#[case] v: Point<Real>) {
        let bytes = encode_vector3(&v).unwrap();
        let decoded = decode_vector3(&bytes).unwrap();
        assert_eq!(bits(&decoded), bits(&v));
    }

    #[test]
    fn vector_layout_is_little_endian_xyz() {
        let bytes = encode_vector3(&point![1.0, -2.0, 0.5]).unwrap();

        assert_eq!(&bytes[0..4], &1.0f32.to_le_bytes());
        assert_eq!(&bytes[4..8], &(-2.0f32).to_le_bytes());
        assert_eq!(&bytes[8..12], &0.5f32.to_le_bytes());
    }

    #[test]
    fn short_vector_is_malformed() {
        let err = decode_vector3(&[0; 8]).unwrap_err();
        assert!(matches!(
            err,
            WireError::MalformedInput {
                expected: VECTOR3_LEN,
                received: 8
            }
        ));
    }

    #[test]
    fn query_is_start_then_end() {
        let query = RaycastQuery::new(point![0.0, 0.0, 0.0], point![1000.0, 1000.0, 1000.0]);
        let bytes = encode_query(&query).unwrap();

        assert_eq!(&bytes[..VECTOR3_LEN], &encode_vector3(&query.start).unwrap()[..]);
        assert_eq!(&bytes[VECTOR3_LEN..], &encode_vector3(&query.end).unwrap()[..]);
        assert_eq!(decode_query(&bytes).unwrap(), query);
    }

    #[test]
    fn short_query_is_malformed() {
        let err = decode_query(&[0; QUERY_LEN - 1]).unwrap_err();
        assert!(matches!(
            err,
            WireError::MalformedInput {
                expected: QUERY_LEN,
                received: 23
            }
        ));
    }

    #[rstest]
    #[case(0x00, false)]
    #[case(0x01, true)]
    #[case(0x02, true)]
    #[case(0xff, true)]
    fn nonzero_result_bytes_are_hits(#[case] byte: u8, #[case] hit: bool) {
        assert_eq!(decode_result(byte), hit);
    }

    #[test]
    fn results_encode_to_one_and_zero() {
        assert_eq!(encode_result(true), 0x01);
        assert_eq!(encode_result(false), 0x00);
    }
}
