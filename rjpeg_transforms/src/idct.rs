// Copyright (c) the rjpeg Authors. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

//! Full-size 8x8 inverse DCT family.
//!
//! Each kernel dequantizes a coefficient block, runs the inverse butterfly
//! over the columns and then the rows, and writes level-shifted, clamped
//! samples into the caller's row buffers at the given column offset.
//!
//! When all 63 AC coefficients are zero the butterfly is skipped and the
//! block is filled with a single value derived from the DC term; the fill
//! value is exactly what the full network produces for that input, so the
//! shortcut is observationally invisible.

use crate::fdct::{
    descale, CONST_BITS, F_0_298, F_0_390, F_0_541, F_0_765, F_0_899, F_1_175, F_1_501, F_1_847,
    F_1_961, F_2_053, F_2_562, F_3_072, PASS1_BITS,
};
use crate::quant::CENTER_SAMPLE;
use crate::{transpose8, DCTSIZE, DCTSIZE2};
use rjpeg_simd::{F32SimdVec, I32SimdVec, SimdDescriptor};

// 8-bit constants for the fast variant.
const FI_1_082: i32 = 277; // FIX(1.082392200)
const FI_1_414: i32 = 362; // FIX(1.414213562)
const FI_1_847: i32 = 473; // FIX(1.847759065)
const FI_2_613: i32 = 669; // FIX(2.613125930)

#[inline]
fn clamp_sample(v: i32) -> u8 {
    v.clamp(0, 255) as u8
}

fn fill_dc(output: &mut [&mut [u8]], output_col: usize, value: u8) {
    for row in output.iter_mut().take(DCTSIZE) {
        row[output_col..output_col + DCTSIZE].fill(value);
    }
}

fn ac_coefs_all_zero(coef_block: &[i16; DCTSIZE2]) -> bool {
    coef_block[1..].iter().all(|&c| c == 0)
}

/// Accurate integer inverse DCT. `dequant` is the raw quantization table.
pub fn idct_islow<D: SimdDescriptor>(
    d: D,
    dequant: &[i32; DCTSIZE2],
    coef_block: &[i16; DCTSIZE2],
    output: &mut [&mut [u8]],
    output_col: usize,
) {
    if ac_coefs_all_zero(coef_block) {
        let dc = coef_block[0] as i32 * dequant[0];
        fill_dc(
            output,
            output_col,
            clamp_sample(((dc + 4) >> 3) + CENTER_SAMPLE),
        );
        return;
    }

    let mut ws = [0i32; DCTSIZE2];
    for (out, (&c, &q)) in ws.iter_mut().zip(coef_block.iter().zip(dequant.iter())) {
        *out = c as i32 * q;
    }

    // Columns, then rows; the butterfly always combines vertically, so the
    // row pass runs on the transposed workspace.
    islow_pass::<D, { CONST_BITS - PASS1_BITS }>(d, &mut ws);
    transpose8(&mut ws);
    islow_pass::<D, { CONST_BITS + PASS1_BITS + 3 }>(d, &mut ws);

    store_clamped(d, &ws, output, output_col);
}

/// Writes the transposed spatial workspace (`ws[x * 8 + y]`) into the output
/// rows, level-shifting and clamping each value.
fn store_clamped<D: SimdDescriptor>(
    d: D,
    ws: &[i32; DCTSIZE2],
    output: &mut [&mut [u8]],
    output_col: usize,
) {
    let mut shifted = [0i32; DCTSIZE2];
    let center = D::I32Vec::splat(d, CENTER_SAMPLE);
    let lo = D::I32Vec::splat(d, 0);
    let hi = D::I32Vec::splat(d, 255);
    let mut i = 0;
    while i < DCTSIZE2 {
        let v = D::I32Vec::load(d, &ws[i..]);
        (v + center).max(lo).min(hi).store(&mut shifted[i..]);
        i += D::I32Vec::LEN;
    }
    for (y, row) in output.iter_mut().take(DCTSIZE).enumerate() {
        for x in 0..DCTSIZE {
            row[output_col + x] = shifted[x * DCTSIZE + y] as u8;
        }
    }
}

fn islow_pass<D: SimdDescriptor, const SHIFT: i32>(d: D, data: &mut [i32; DCTSIZE2]) {
    let mut j = 0;
    while j < DCTSIZE {
        let load = |i: usize| D::I32Vec::load(d, &data[i * DCTSIZE + j..]);
        let mul = |x: D::I32Vec, c: i32| x * D::I32Vec::splat(d, c);

        // Even part.
        let z2 = load(2);
        let z3 = load(6);
        let z1 = mul(z2 + z3, F_0_541);
        let tmp2 = z1 - mul(z3, F_1_847);
        let tmp3 = z1 + mul(z2, F_0_765);

        let z2 = load(0);
        let z3 = load(4);
        let tmp0 = (z2 + z3).shl::<CONST_BITS>();
        let tmp1 = (z2 - z3).shl::<CONST_BITS>();

        let tmp10 = tmp0 + tmp3;
        let tmp13 = tmp0 - tmp3;
        let tmp11 = tmp1 + tmp2;
        let tmp12 = tmp1 - tmp2;

        // Odd part.
        let tmp0 = load(7);
        let tmp1 = load(5);
        let tmp2 = load(3);
        let tmp3 = load(1);

        let z1 = tmp0 + tmp3;
        let z2 = tmp1 + tmp2;
        let z3 = tmp0 + tmp2;
        let z4 = tmp1 + tmp3;
        let z5 = mul(z3 + z4, F_1_175);

        let tmp0 = mul(tmp0, F_0_298);
        let tmp1 = mul(tmp1, F_2_053);
        let tmp2 = mul(tmp2, F_3_072);
        let tmp3 = mul(tmp3, F_1_501);
        let z1 = mul(z1, -F_0_899);
        let z2 = mul(z2, -F_2_562);
        let z3 = mul(z3, -F_1_961) + z5;
        let z4 = mul(z4, -F_0_390) + z5;

        let tmp0 = tmp0 + z1 + z3;
        let tmp1 = tmp1 + z2 + z4;
        let tmp2 = tmp2 + z2 + z3;
        let tmp3 = tmp3 + z1 + z4;

        let out = [
            descale::<D, SHIFT>(d, tmp10 + tmp3),
            descale::<D, SHIFT>(d, tmp11 + tmp2),
            descale::<D, SHIFT>(d, tmp12 + tmp1),
            descale::<D, SHIFT>(d, tmp13 + tmp0),
            descale::<D, SHIFT>(d, tmp13 - tmp0),
            descale::<D, SHIFT>(d, tmp12 - tmp1),
            descale::<D, SHIFT>(d, tmp11 - tmp2),
            descale::<D, SHIFT>(d, tmp10 - tmp3),
        ];
        for (i, v) in out.iter().enumerate() {
            v.store(&mut data[i * DCTSIZE + j..]);
        }
        j += D::I32Vec::LEN;
    }
}

/// Fast integer inverse DCT. `dequant` must come from
/// [`crate::quant::ifast_dequant`].
pub fn idct_ifast<D: SimdDescriptor>(
    d: D,
    dequant: &[i32; DCTSIZE2],
    coef_block: &[i16; DCTSIZE2],
    output: &mut [&mut [u8]],
    output_col: usize,
) {
    if ac_coefs_all_zero(coef_block) {
        let dc = coef_block[0] as i32 * dequant[0];
        fill_dc(output, output_col, clamp_sample((dc >> 5) + CENTER_SAMPLE));
        return;
    }

    let mut ws = [0i32; DCTSIZE2];
    for (out, (&c, &q)) in ws.iter_mut().zip(coef_block.iter().zip(dequant.iter())) {
        *out = c as i32 * q;
    }

    ifast_pass(d, &mut ws);
    transpose8(&mut ws);
    ifast_pass(d, &mut ws);

    // Final truncating descale of the AAN flow.
    let mut i = 0;
    while i < DCTSIZE2 {
        let v = D::I32Vec::load(d, &ws[i..]);
        v.shr::<{ PASS1_BITS + 3 }>().store(&mut ws[i..]);
        i += D::I32Vec::LEN;
    }

    store_clamped(d, &ws, output, output_col);
}

fn ifast_pass<D: SimdDescriptor>(d: D, data: &mut [i32; DCTSIZE2]) {
    let mut j = 0;
    while j < DCTSIZE {
        let load = |i: usize| D::I32Vec::load(d, &data[i * DCTSIZE + j..]);
        // Truncating 8-bit fixed-point multiply.
        let mul = |x: D::I32Vec, c: i32| (x * D::I32Vec::splat(d, c)).shr::<8>();

        // Even part.
        let tmp10 = load(0) + load(4);
        let tmp11 = load(0) - load(4);
        let tmp13 = load(2) + load(6);
        let tmp12 = mul(load(2) - load(6), FI_1_414) - tmp13;

        let tmp0 = tmp10 + tmp13;
        let tmp3 = tmp10 - tmp13;
        let tmp1 = tmp11 + tmp12;
        let tmp2 = tmp11 - tmp12;

        // Odd part.
        let z13 = load(5) + load(3);
        let z10 = load(5) - load(3);
        let z11 = load(1) + load(7);
        let z12 = load(1) - load(7);

        let tmp7 = z11 + z13;
        let tmp11 = mul(z11 - z13, FI_1_414);

        let z5 = mul(z10 + z12, FI_1_847);
        let tmp10 = mul(z12, FI_1_082) - z5;
        let tmp12 = mul(z10, -FI_2_613) + z5;

        let tmp6 = tmp12 - tmp7;
        let tmp5 = tmp11 - tmp6;
        let tmp4 = tmp10 + tmp5;

        let out = [
            tmp0 + tmp7,
            tmp1 + tmp6,
            tmp2 + tmp5,
            tmp3 - tmp4,
            tmp3 + tmp4,
            tmp2 - tmp5,
            tmp1 - tmp6,
            tmp0 - tmp7,
        ];
        for (i, v) in out.iter().enumerate() {
            v.store(&mut data[i * DCTSIZE + j..]);
        }
        j += D::I32Vec::LEN;
    }
}

/// Float inverse DCT. `dequant` must come from
/// [`crate::quant::float_dequant`] (the 1/8 normalization is folded into the
/// table).
pub fn idct_float<D: SimdDescriptor>(
    d: D,
    dequant: &[f32; DCTSIZE2],
    coef_block: &[i16; DCTSIZE2],
    output: &mut [&mut [u8]],
    output_col: usize,
) {
    if ac_coefs_all_zero(coef_block) {
        let dc = coef_block[0] as f32 * dequant[0];
        fill_dc(
            output,
            output_col,
            ((dc + (CENTER_SAMPLE as f32 + 0.5)) as i32).clamp(0, 255) as u8,
        );
        return;
    }

    let mut ws = [0f32; DCTSIZE2];
    for (out, (&c, &q)) in ws.iter_mut().zip(coef_block.iter().zip(dequant.iter())) {
        *out = c as f32 * q;
    }

    float_pass(d, &mut ws);
    transpose8(&mut ws);
    float_pass(d, &mut ws);

    // Level-shift with the 0.5 rounding bias folded in, then truncate.
    let mut shifted = [0f32; DCTSIZE2];
    let bias = D::F32Vec::splat(d, CENTER_SAMPLE as f32 + 0.5);
    let mut i = 0;
    while i < DCTSIZE2 {
        let v = D::F32Vec::load(d, &ws[i..]);
        (v + bias).store(&mut shifted[i..]);
        i += D::F32Vec::LEN;
    }
    for (y, row) in output.iter_mut().take(DCTSIZE).enumerate() {
        for x in 0..DCTSIZE {
            row[output_col + x] = (shifted[x * DCTSIZE + y] as i32).clamp(0, 255) as u8;
        }
    }
}

fn float_pass<D: SimdDescriptor>(d: D, data: &mut [f32; DCTSIZE2]) {
    let mut j = 0;
    while j < DCTSIZE {
        let load = |i: usize| D::F32Vec::load(d, &data[i * DCTSIZE + j..]);
        let mul = |x: D::F32Vec, c: f32| x * D::F32Vec::splat(d, c);

        // Even part.
        let tmp10 = load(0) + load(4);
        let tmp11 = load(0) - load(4);
        let tmp13 = load(2) + load(6);
        let tmp12 = mul(load(2) - load(6), 1.414213562) - tmp13;

        let tmp0 = tmp10 + tmp13;
        let tmp3 = tmp10 - tmp13;
        let tmp1 = tmp11 + tmp12;
        let tmp2 = tmp11 - tmp12;

        // Odd part.
        let z13 = load(5) + load(3);
        let z10 = load(5) - load(3);
        let z11 = load(1) + load(7);
        let z12 = load(1) - load(7);

        let tmp7 = z11 + z13;
        let tmp11 = mul(z11 - z13, 1.414213562);

        let z5 = mul(z10 + z12, 1.847759065);
        let tmp10 = z5 - mul(z12, 1.082392200);
        let tmp12 = z5 - mul(z10, 2.613125930);

        let tmp6 = tmp12 - tmp7;
        let tmp5 = tmp11 - tmp6;
        let tmp4 = tmp10 - tmp5;

        let out = [
            tmp0 + tmp7,
            tmp1 + tmp6,
            tmp2 + tmp5,
            tmp3 + tmp4,
            tmp3 - tmp4,
            tmp2 - tmp5,
            tmp1 - tmp6,
            tmp0 - tmp7,
        ];
        for (i, v) in out.iter().enumerate() {
            v.store(&mut data[i * DCTSIZE + j..]);
        }
        j += D::F32Vec::LEN;
    }
}
