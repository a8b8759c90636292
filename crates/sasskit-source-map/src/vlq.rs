/*
 * vlq.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Base64 VLQ encoding for source map mappings.
 */

const BASE64_CHARS: &[u8; 64] =
    b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789+/";

/// Encode a single value as base64 VLQ and append it to `out`.
///
/// The source map format stores the sign in the least significant bit,
/// then emits the magnitude in 5-bit groups, least significant first,
/// with the sixth bit of each base64 digit as a continuation flag.
pub(crate) fn encode(value: i64, out: &mut String) {
    let mut vlq: u64 = if value < 0 {
        ((value.unsigned_abs()) << 1) | 1
    } else {
        (value as u64) << 1
    };

    loop {
        let mut digit = (vlq & 0b1_1111) as usize;
        vlq >>= 5;
        if vlq > 0 {
            digit |= 0b10_0000;
        }
        out.push(BASE64_CHARS[digit] as char);
        if vlq == 0 {
            break;
        }
    }
}
