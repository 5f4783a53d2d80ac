// Copyright (c) the rjpeg Authors. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

//! Quantization, sample conversion, and the per-variant divisor /
//! dequantization tables.

use crate::{AAN_SCALE_FACTORS, DCTSIZE, DCTSIZE2};
use rjpeg_simd::{F32SimdVec, SimdDescriptor};

/// Center of the unsigned sample range.
pub const CENTER_SAMPLE: i32 = 128;

#[derive(Debug, thiserror::Error)]
pub enum QuantTableError {
    #[error("quantization divisor at index {0} is zero")]
    ZeroDivisor(usize),
}

/// Loads an 8x8 region of samples into a centered integer workspace for the
/// integer forward DCT variants.
pub fn convsamp(sample_data: &[&[u8]], start_col: usize, workspace: &mut [i32; DCTSIZE2]) {
    for (r, row) in sample_data.iter().take(DCTSIZE).enumerate() {
        for (c, out) in workspace[r * DCTSIZE..][..DCTSIZE].iter_mut().enumerate() {
            *out = row[start_col + c] as i32 - CENTER_SAMPLE;
        }
    }
}

/// Float counterpart of [`convsamp`].
pub fn convsamp_float(sample_data: &[&[u8]], start_col: usize, workspace: &mut [f32; DCTSIZE2]) {
    for (r, row) in sample_data.iter().take(DCTSIZE).enumerate() {
        for (c, out) in workspace[r * DCTSIZE..][..DCTSIZE].iter_mut().enumerate() {
            *out = (row[start_col + c] as i32 - CENTER_SAMPLE) as f32;
        }
    }
}

/// Per-element {reciprocal, correction, shift} triples implementing exact
/// round-half-up division without a divide instruction.
///
/// For a divisor `d` with `b = floor(log2(d))`, the reciprocal is
/// `round(2^(16+b) / d)` (adjusted so that adding the correction before the
/// multiply reproduces `round(x / d)` exactly for the legal coefficient
/// range), and the shift is `b`. A divisor of 1 stores {1, 0, -16}, which
/// makes the quantization step the identity.
#[derive(Debug)]
pub struct ReciprocalTable {
    recip: [u32; DCTSIZE2],
    corr: [u32; DCTSIZE2],
    shift: [i32; DCTSIZE2],
}

impl ReciprocalTable {
    pub fn new(divisors: &[u32; DCTSIZE2]) -> Result<Self, QuantTableError> {
        let mut table = ReciprocalTable {
            recip: [0; DCTSIZE2],
            corr: [0; DCTSIZE2],
            shift: [0; DCTSIZE2],
        };
        for (i, &d) in divisors.iter().enumerate() {
            if d == 0 {
                return Err(QuantTableError::ZeroDivisor(i));
            }
            if d == 1 {
                table.recip[i] = 1;
                table.corr[i] = 0;
                table.shift[i] = -16;
                continue;
            }
            let b = 31 - d.leading_zeros() as i32;
            let r = 16 + b;
            let mut fq = (1u64 << r) / d as u64;
            let fr = (1u64 << r) % d as u64;
            let mut c = d / 2;
            if fr == 0 {
                // Power of two; fq is one bit too high to allow adding c.
                fq >>= 1;
            } else if fr <= (d / 2) as u64 {
                c += 1;
            } else {
                fq += 1;
            }
            // The reciprocal needs 17 bits and the correction up to
            // `log2(d)` bits; 16-bit quantization values can push both past
            // u16 (islow divisors reach 2^19), so the fields stay u32.
            table.recip[i] = fq as u32;
            table.corr[i] = c;
            table.shift[i] = if fr == 0 { b - 1 } else { b };
        }
        Ok(table)
    }
}

/// Quantizes a coefficient workspace into the output block using the
/// reciprocal table: strip the sign, add the correction, widening-multiply by
/// the reciprocal, shift, and restore the sign. Reproduces round-half-up
/// division exactly; zero always quantizes to zero.
pub fn quantize(
    coef_block: &mut [i16; DCTSIZE2],
    divisors: &ReciprocalTable,
    workspace: &[i32; DCTSIZE2],
) {
    for i in 0..DCTSIZE2 {
        let t = workspace[i];
        let magnitude = (t.unsigned_abs() + divisors.corr[i]) as u64;
        let product = magnitude * divisors.recip[i] as u64;
        let q = (product >> (16 + divisors.shift[i])) as i32;
        coef_block[i] = if t < 0 { -q as i16 } else { q as i16 };
    }
}

/// Float quantization: multiply by the reciprocal divisor, then round
/// half-up via the bias-and-truncate idiom.
pub fn quantize_float<D: SimdDescriptor>(
    d: D,
    coef_block: &mut [i16; DCTSIZE2],
    divisors: &[f32; DCTSIZE2],
    workspace: &[f32; DCTSIZE2],
) {
    let mut scaled = [0f32; DCTSIZE2];
    let bias = D::F32Vec::splat(d, 16384.5);
    let mut i = 0;
    while i < DCTSIZE2 {
        let w = D::F32Vec::load(d, &workspace[i..]);
        let r = D::F32Vec::load(d, &divisors[i..]);
        (w * r + bias).store(&mut scaled[i..]);
        i += D::F32Vec::LEN;
    }
    for (out, &s) in coef_block.iter_mut().zip(scaled.iter()) {
        *out = (s as i32 - 16384) as i16;
    }
}

/// Divisors for the accurate integer forward DCT, whose output is the DCT
/// scaled by 8.
pub fn islow_divisors(quantvals: &[u16; DCTSIZE2]) -> Result<ReciprocalTable, QuantTableError> {
    let mut divisors = [0u32; DCTSIZE2];
    for (out, &q) in divisors.iter_mut().zip(quantvals.iter()) {
        *out = (q as u32) << 3;
    }
    ReciprocalTable::new(&divisors)
}

/// Divisors for the fast integer forward DCT: the quantization values scaled
/// by the AAN factors (14-bit fixed point, descaled by `14 - 3` with
/// rounding).
pub fn ifast_divisors(quantvals: &[u16; DCTSIZE2]) -> Result<ReciprocalTable, QuantTableError> {
    let mut divisors = [0u32; DCTSIZE2];
    for (i, (out, &q)) in divisors.iter_mut().zip(quantvals.iter()).enumerate() {
        let scaled = q as i64 * aan_scale_fixed(i) as i64;
        *out = ((scaled + (1 << 10)) >> 11) as u32;
    }
    ReciprocalTable::new(&divisors)
}

/// Reciprocal divisors for the float forward DCT:
/// `1 / (q * 8 * aan[row] * aan[col])`.
pub fn float_divisors(quantvals: &[u16; DCTSIZE2]) -> Result<[f32; DCTSIZE2], QuantTableError> {
    let mut divisors = [0f32; DCTSIZE2];
    for (i, (out, &q)) in divisors.iter_mut().zip(quantvals.iter()).enumerate() {
        if q == 0 {
            return Err(QuantTableError::ZeroDivisor(i));
        }
        *out = (1.0 / (q as f64 * aan_scale_2d(i) * 8.0)) as f32;
    }
    Ok(divisors)
}

/// Dequantization multipliers for the accurate integer inverse DCT: the raw
/// quantization values.
pub fn islow_dequant(quantvals: &[u16; DCTSIZE2]) -> [i32; DCTSIZE2] {
    let mut table = [0i32; DCTSIZE2];
    for (out, &q) in table.iter_mut().zip(quantvals.iter()) {
        *out = q as i32;
    }
    table
}

/// Dequantization multipliers for the fast integer inverse DCT: the
/// quantization values scaled by the AAN factors (descaled by `14 - 2` with
/// rounding).
pub fn ifast_dequant(quantvals: &[u16; DCTSIZE2]) -> [i32; DCTSIZE2] {
    let mut table = [0i32; DCTSIZE2];
    for (i, (out, &q)) in table.iter_mut().zip(quantvals.iter()).enumerate() {
        let scaled = q as i64 * aan_scale_fixed(i) as i64;
        *out = ((scaled + (1 << 11)) >> 12) as i32;
    }
    table
}

/// Dequantization multipliers for the float inverse DCT:
/// `q * aan[row] * aan[col] / 8` (the final 1/8 of the inverse transform is
/// folded in here).
pub fn float_dequant(quantvals: &[u16; DCTSIZE2]) -> [f32; DCTSIZE2] {
    let mut table = [0f32; DCTSIZE2];
    for (i, (out, &q)) in table.iter_mut().zip(quantvals.iter()).enumerate() {
        *out = (q as f64 * aan_scale_2d(i) / 8.0) as f32;
    }
    table
}

fn aan_scale_2d(i: usize) -> f64 {
    AAN_SCALE_FACTORS[i / DCTSIZE] * AAN_SCALE_FACTORS[i % DCTSIZE]
}

/// The 2-D AAN scale factor at 14-bit fixed point, rounded to nearest.
fn aan_scale_fixed(i: usize) -> i32 {
    (aan_scale_2d(i) * (1 << 14) as f64 + 0.5) as i32
}
