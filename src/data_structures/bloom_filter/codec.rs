// Copyright (c) 2025 Ring Filter Authors
//
// Licensed under dual license:
// - MIT License (LICENSE-MIT or https://opensource.org/licenses/MIT)
// - Apache License, Version 2.0 (LICENSE-APACHE or https://www.apache.org/licenses/LICENSE-2.0)

//! Versioned binary encoding of a filter.
//!
//! ```text
//! offset  width               field
//! 0       1                   version tag (FORMAT_VERSION)
//! 1       8                   bit count, u64 big-endian
//! 9       8                   hash rounds, u64 big-endian
//! 17      ceil(bits / 8)      packed bit buffer
//! ```

use byteorder::{BigEndian, ByteOrder};

use super::error::{BloomError, Result};
use super::filter::FilterState;
use super::params::FilterParams;

/// The only format version this build reads and writes.
pub const FORMAT_VERSION: u8 = 1;

/// Length of the fixed header preceding the bit buffer.
pub const HEADER_LEN: usize = 17;

pub(crate) fn encode(params: &FilterParams, bits: &[u8]) -> Vec<u8> {
    let mut out = vec![0u8; HEADER_LEN + bits.len()];
    out[0] = FORMAT_VERSION;
    BigEndian::write_u64(&mut out[1..9], params.bit_count());
    BigEndian::write_u64(&mut out[9..HEADER_LEN], params.hash_rounds());
    out[HEADER_LEN..].copy_from_slice(bits);
    out
}

/// Validate and decode `data`. Nothing is built until every check passes.
pub(crate) fn decode(data: &[u8]) -> Result<FilterState> {
    if data.len() < HEADER_LEN {
        return Err(BloomError::TruncatedData {
            expected: HEADER_LEN,
            actual: data.len(),
        });
    }
    if data[0] != FORMAT_VERSION {
        return Err(BloomError::UnsupportedVersion {
            found: data[0],
            supported: FORMAT_VERSION,
        });
    }

    let bit_count = BigEndian::read_u64(&data[1..9]);
    let hash_rounds = BigEndian::read_u64(&data[9..HEADER_LEN]);
    let params = FilterParams::new(bit_count, hash_rounds)
        .map_err(|err| BloomError::CorruptData(format!("bad header: {err}")))?;

    let payload = &data[HEADER_LEN..];
    if payload.len() != params.byte_len() {
        return Err(BloomError::CorruptData(format!(
            "header declares {bit_count} bits ({} bytes) but {} bytes follow",
            params.byte_len(),
            payload.len()
        )));
    }

    // Bits past bit_count are never set by add.
    let tail_bits = bit_count % 8;
    if tail_bits != 0 {
        let padding_mask = !((1u8 << tail_bits) - 1);
        if payload[payload.len() - 1] & padding_mask != 0 {
            return Err(BloomError::CorruptData(
                "padding bits past the bit count are set".to_string(),
            ));
        }
    }

    Ok(FilterState {
        params,
        bits: payload.to_vec(),
    })
}
