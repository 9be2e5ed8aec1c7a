//! Decoders for the two polyline encodings providers return.
//!
//! Google and OSRM use the classic encoded polyline; HERE uses its flexible
//! polyline, which adds a header with precision and an optional third
//! dimension.

use super::error::RoutingError;
use crate::sdk::area::Coordinate;

const FLEXIBLE_ALPHABET: &[u8; 64] =
    b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789-_";

fn zigzag(value: u64) -> i64 {
    let shifted = (value >> 1) as i64;
    if value & 1 == 1 {
        !shifted
    } else {
        shifted
    }
}

/// Splits a 5-bit varint stream into raw unsigned values.
fn read_varints(
    encoded: &str,
    to_chunk: impl Fn(u8) -> Option<u64>,
) -> Result<Vec<u64>, RoutingError> {
    let mut values = Vec::new();
    let mut current: u64 = 0;
    let mut shift = 0;

    for byte in encoded.bytes() {
        let chunk = to_chunk(byte).ok_or_else(|| {
            RoutingError::Malformed(format!("invalid polyline character '{}'", byte as char))
        })?;
        if shift > 60 {
            return Err(RoutingError::Malformed("polyline value overflow".to_string()));
        }
        current |= (chunk & 0x1f) << shift;
        shift += 5;
        if chunk < 0x20 {
            values.push(current);
            current = 0;
            shift = 0;
        }
    }

    if shift != 0 {
        return Err(RoutingError::Malformed("truncated polyline".to_string()));
    }
    Ok(values)
}

/// Decodes a Google-style encoded polyline with `precision` decimal digits (5 or 6).
pub fn decode_polyline(encoded: &str, precision: u32) -> Result<Vec<Coordinate>, RoutingError> {
    let values = read_varints(encoded, |b| (63..=126).contains(&b).then(|| u64::from(b - 63)))?;
    if values.len() % 2 != 0 {
        return Err(RoutingError::Malformed(
            "polyline has an odd number of values".to_string(),
        ));
    }

    let factor = 10f64.powi(precision as i32);
    let (mut lat, mut lng) = (0i64, 0i64);
    Ok(values
        .chunks_exact(2)
        .map(|pair| {
            lat += zigzag(pair[0]);
            lng += zigzag(pair[1]);
            Coordinate::new(lat as f64 / factor, lng as f64 / factor)
        })
        .collect())
}

/// Decodes a HERE flexible polyline. A third dimension, if present, is dropped.
pub fn decode_flexible(encoded: &str) -> Result<Vec<Coordinate>, RoutingError> {
    let values = read_varints(encoded, |b| {
        FLEXIBLE_ALPHABET
            .iter()
            .position(|&c| c == b)
            .map(|i| i as u64)
    })?;

    let (version, header) = match values.as_slice() {
        [version, header, ..] => (*version, *header),
        _ => {
            return Err(RoutingError::Malformed(
                "flexible polyline is missing its header".to_string(),
            ))
        }
    };
    if version != 1 {
        return Err(RoutingError::Malformed(format!(
            "unsupported flexible polyline version {version}"
        )));
    }

    let precision = (header & 15) as i32;
    let third_dim = (header >> 4) & 7;
    let dims = if third_dim == 0 { 2 } else { 3 };

    let body = &values[2..];
    if body.len() % dims != 0 {
        return Err(RoutingError::Malformed(
            "flexible polyline body is not a whole number of points".to_string(),
        ));
    }

    let factor = 10f64.powi(precision);
    let (mut lat, mut lng) = (0i64, 0i64);
    Ok(body
        .chunks_exact(dims)
        .map(|point| {
            lat += zigzag(point[0]);
            lng += zigzag(point[1]);
            Coordinate::new(lat as f64 / factor, lng as f64 / factor)
        })
        .collect())
}
