// Copyright (c) the rjpeg Authors. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

//! Reduced-output-size inverse DCT variants for direct scaled decoding.
//!
//! Each variant maps a full 8x8 coefficient block to an NxN spatial block
//! (N in {2, 4, 6, 12}) using fused per-size constant sets at 13-bit
//! precision: the `sqrt(2) * cos(k*pi/2N)` basis values rounded at 2^13, the
//! same precision as the accurate full-size kernel. All variants consume the
//! raw quantization table.
//!
//! These are portable scalar kernels; the reduced sizes are rare enough in
//! practice that they do not get vector counterparts.

use crate::fdct::{CONST_BITS, F_0_765, F_0_899, F_1_847, PASS1_BITS};
use crate::quant::CENTER_SAMPLE;
use crate::{DCTSIZE, DCTSIZE2};

// 2x2 constants: sqrt(2) * cos(k*pi/4) basis, k odd, at 2^13.
const F2_0_720: i32 = 5906; // FIX(0.720959822)
const F2_0_850: i32 = 6967; // FIX(0.850430095)
const F2_1_272: i32 = 10426; // FIX(1.272758580)
const F2_3_624: i32 = 29692; // FIX(3.624509785)

// 4x4 constants.
const F4_0_211: i32 = 1730; // FIX(0.211164243)
const F4_0_509: i32 = 4176; // FIX(0.509795579)
const F4_0_601: i32 = 4926; // FIX(0.601344887)
const F4_1_061: i32 = 8697; // FIX(1.061594337)
const F4_1_451: i32 = 11893; // FIX(1.451774981)
const F4_2_172: i32 = 17799; // FIX(2.172734803)
const F4_2_562: i32 = 20995; // FIX(2.562915447)

// 6x6 constants.
const F6_0_366: i32 = 2998; // FIX(0.366025404)
const F6_0_707: i32 = 5793; // FIX(0.707106781)
const F6_1_224: i32 = 10033; // FIX(1.224744871)

// 12x12 constants: sqrt(2) * cos(k*pi/24), k odd.
const C12_1: i32 = 11486; // FIX(1.402114298)
const C12_3: i32 = 10703; // FIX(1.306562965)
const C12_5: i32 = 9191; // FIX(1.121971054)
const C12_7: i32 = 7053; // FIX(0.860918669)
const C12_9: i32 = 4433; // FIX(0.541196100)
const C12_11: i32 = 1512; // FIX(0.184591911)

// 12x12 even basis: sqrt(2) * cos((2x+1) * u * pi / 24) for u = 2 and 4.
const E12_2: [i32; 6] = [11190, 8192, 2998, -2998, -8192, -11190];
const E12_4: [i32; 6] = [10033, 0, -10033, -10033, 0, 10033];
// u = 6 reduces to +-1 exactly.
const E12_6_SIGN: [i32; 6] = [1, -1, -1, 1, 1, -1];

#[inline]
fn descale(x: i32, n: i32) -> i32 {
    (x + (1 << (n - 1))) >> n
}

#[inline]
fn clamp_sample(v: i32) -> u8 {
    v.clamp(0, 255) as u8
}

#[inline]
fn deq(coef_block: &[i16; DCTSIZE2], dequant: &[i32; DCTSIZE2], i: usize) -> i32 {
    coef_block[i] as i32 * dequant[i]
}

/// Fills an NxN output block from the DC term alone. For every reduced size
/// (and the accurate full-size kernel) the full network collapses to exactly
/// `((dc + 4) >> 3) + 128` on an all-AC-zero block, so this is the shared
/// fast path.
fn fill_dc(output: &mut [&mut [u8]], output_col: usize, n: usize, dc: i32) {
    let value = clamp_sample(((dc + 4) >> 3) + CENTER_SAMPLE);
    for row in output.iter_mut().take(n) {
        row[output_col..output_col + n].fill(value);
    }
}

fn ac_coefs_all_zero(coef_block: &[i16; DCTSIZE2]) -> bool {
    coef_block[1..].iter().all(|&c| c == 0)
}

/// 2x2 inverse DCT: frequencies (0,1,3,5,7) in each direction contribute.
pub fn idct_2x2(
    dequant: &[i32; DCTSIZE2],
    coef_block: &[i16; DCTSIZE2],
    output: &mut [&mut [u8]],
    output_col: usize,
) {
    if ac_coefs_all_zero(coef_block) {
        fill_dc(output, output_col, 2, deq(coef_block, dequant, 0));
        return;
    }

    // Pass 1: columns 0, 1, 3, 5, 7 (the rest are never read by pass 2).
    let mut ws = [0i32; 2 * DCTSIZE];
    for c in [0, 1, 3, 5, 7] {
        let tmp10 = deq(coef_block, dequant, c) << (CONST_BITS + 2);
        let tmp0 = deq(coef_block, dequant, 7 * DCTSIZE + c) * -F2_0_720
            + deq(coef_block, dequant, 5 * DCTSIZE + c) * F2_0_850
            + deq(coef_block, dequant, 3 * DCTSIZE + c) * -F2_1_272
            + deq(coef_block, dequant, DCTSIZE + c) * F2_3_624;
        ws[c] = descale(tmp10 + tmp0, CONST_BITS - PASS1_BITS + 2);
        ws[DCTSIZE + c] = descale(tmp10 - tmp0, CONST_BITS - PASS1_BITS + 2);
    }

    // Pass 2: rows.
    for (y, row) in output.iter_mut().take(2).enumerate() {
        let w = &ws[y * DCTSIZE..];
        let tmp10 = w[0] << (CONST_BITS + 2);
        let tmp0 = w[7] * -F2_0_720 + w[5] * F2_0_850 + w[3] * -F2_1_272 + w[1] * F2_3_624;
        let shift = CONST_BITS + PASS1_BITS + 3 + 2;
        row[output_col] = clamp_sample(descale(tmp10 + tmp0, shift) + CENTER_SAMPLE);
        row[output_col + 1] = clamp_sample(descale(tmp10 - tmp0, shift) + CENTER_SAMPLE);
    }
}

/// 4x4 inverse DCT: every frequency except row/column 4 contributes.
pub fn idct_4x4(
    dequant: &[i32; DCTSIZE2],
    coef_block: &[i16; DCTSIZE2],
    output: &mut [&mut [u8]],
    output_col: usize,
) {
    if ac_coefs_all_zero(coef_block) {
        fill_dc(output, output_col, 4, deq(coef_block, dequant, 0));
        return;
    }

    let idct_1d = |f: [i32; DCTSIZE], shift: i32| -> [i32; 4] {
        // Even part.
        let tmp0 = f[0] << (CONST_BITS + 1);
        let tmp2 = f[2] * F_1_847 + f[6] * -F_0_765;
        let tmp10 = tmp0 + tmp2;
        let tmp12 = tmp0 - tmp2;

        // Odd part.
        let (z1, z2, z3, z4) = (f[7], f[5], f[3], f[1]);
        let tmp0 = z1 * -F4_0_211 + z2 * F4_1_451 + z3 * -F4_2_172 + z4 * F4_1_061;
        let tmp2 = z1 * -F4_0_509 + z2 * -F4_0_601 + z3 * F_0_899 + z4 * F4_2_562;

        [
            descale(tmp10 + tmp2, shift),
            descale(tmp12 + tmp0, shift),
            descale(tmp12 - tmp0, shift),
            descale(tmp10 - tmp2, shift),
        ]
    };

    // Pass 1: columns (column 4 is never read by pass 2).
    let mut ws = [0i32; 4 * DCTSIZE];
    for c in (0..DCTSIZE).filter(|&c| c != 4) {
        let mut f = [0i32; DCTSIZE];
        for (v, out) in f.iter_mut().enumerate() {
            *out = deq(coef_block, dequant, v * DCTSIZE + c);
        }
        let col = idct_1d(f, CONST_BITS - PASS1_BITS + 1);
        for (y, &v) in col.iter().enumerate() {
            ws[y * DCTSIZE + c] = v;
        }
    }

    // Pass 2: rows.
    for (y, row) in output.iter_mut().take(4).enumerate() {
        let mut f = [0i32; DCTSIZE];
        f.copy_from_slice(&ws[y * DCTSIZE..][..DCTSIZE]);
        let out = idct_1d(f, CONST_BITS + PASS1_BITS + 3 + 1);
        for (x, &v) in out.iter().enumerate() {
            row[output_col + x] = clamp_sample(v + CENTER_SAMPLE);
        }
    }
}

/// 6x6 inverse DCT: the lowest 6 frequencies in each direction contribute.
pub fn idct_6x6(
    dequant: &[i32; DCTSIZE2],
    coef_block: &[i16; DCTSIZE2],
    output: &mut [&mut [u8]],
    output_col: usize,
) {
    if ac_coefs_all_zero(coef_block) {
        fill_dc(output, output_col, 6, deq(coef_block, dequant, 0));
        return;
    }

    // Pass 1: columns. The rounding bias for the final right shift is folded
    // into the DC term.
    let mut ws = [0i32; 6 * 6];
    for c in 0..6 {
        let f = |v: usize| deq(coef_block, dequant, v * DCTSIZE + c);

        // Even part.
        let mut tmp0 = f(0) << CONST_BITS;
        tmp0 += 1 << (CONST_BITS - PASS1_BITS - 1);
        let tmp10 = f(4) * F6_0_707;
        let tmp1 = tmp0 + tmp10;
        let tmp11 = (tmp0 - tmp10 - tmp10) >> (CONST_BITS - PASS1_BITS);
        let tmp0 = f(2) * F6_1_224;
        let tmp10 = tmp1 + tmp0;
        let tmp12 = tmp1 - tmp0;

        // Odd part.
        let (z1, z2, z3) = (f(1), f(3), f(5));
        let tmp1 = (z1 + z3) * F6_0_366;
        let tmp0 = tmp1 + ((z1 + z2) << CONST_BITS);
        let tmp2 = tmp1 + ((z3 - z2) << CONST_BITS);
        let tmp1 = (z1 - z2 - z3) << PASS1_BITS;

        ws[c] = (tmp10 + tmp0) >> (CONST_BITS - PASS1_BITS);
        ws[5 * 6 + c] = (tmp10 - tmp0) >> (CONST_BITS - PASS1_BITS);
        ws[6 + c] = tmp11 + tmp1;
        ws[4 * 6 + c] = tmp11 - tmp1;
        ws[2 * 6 + c] = (tmp12 + tmp2) >> (CONST_BITS - PASS1_BITS);
        ws[3 * 6 + c] = (tmp12 - tmp2) >> (CONST_BITS - PASS1_BITS);
    }

    // Pass 2: rows.
    for (y, row) in output.iter_mut().take(6).enumerate() {
        let w = &ws[y * 6..][..6];

        // Even part.
        let mut tmp0 = w[0] << CONST_BITS;
        tmp0 += 1 << (CONST_BITS + PASS1_BITS + 2);
        let tmp10 = w[4] * F6_0_707;
        let tmp1 = tmp0 + tmp10;
        let tmp11 = tmp0 - tmp10 - tmp10;
        let tmp0 = w[2] * F6_1_224;
        let tmp10 = tmp1 + tmp0;
        let tmp12 = tmp1 - tmp0;

        // Odd part.
        let (z1, z2, z3) = (w[1], w[3], w[5]);
        let tmp1 = (z1 + z3) * F6_0_366;
        let tmp0 = tmp1 + ((z1 + z2) << CONST_BITS);
        let tmp2 = tmp1 + ((z3 - z2) << CONST_BITS);
        let tmp1 = (z1 - z2 - z3) << CONST_BITS;

        let shift = CONST_BITS + PASS1_BITS + 3;
        let out = [
            (tmp10 + tmp0) >> shift,
            (tmp11 + tmp1) >> shift,
            (tmp12 + tmp2) >> shift,
            (tmp12 - tmp2) >> shift,
            (tmp11 - tmp1) >> shift,
            (tmp10 - tmp0) >> shift,
        ];
        for (x, &v) in out.iter().enumerate() {
            row[output_col + x] = clamp_sample(v + CENTER_SAMPLE);
        }
    }
}

/// 12x12 inverse DCT: all 8 input frequencies in each direction map to 12
/// output positions via the fused upsampling basis.
pub fn idct_12x12(
    dequant: &[i32; DCTSIZE2],
    coef_block: &[i16; DCTSIZE2],
    output: &mut [&mut [u8]],
    output_col: usize,
) {
    if ac_coefs_all_zero(coef_block) {
        fill_dc(output, output_col, 12, deq(coef_block, dequant, 0));
        return;
    }

    // One 12-point 1-D stage: 8 input frequencies to 12 spatial values. The
    // even half uses the u = 2/4/6 basis rows (u = 6 is exactly +-1); the odd
    // half uses the sqrt(2)*cos(k*pi/24) combinations.
    let idct_1d = |f: [i32; DCTSIZE], shift: i32| -> [i32; 12] {
        let (z1, z2, z3, z4) = (f[1], f[3], f[5], f[7]);
        let odd = [
            C12_1 * z1 + C12_3 * z2 + C12_5 * z3 + C12_7 * z4,
            C12_3 * (z1 - z4) + C12_9 * (z2 - z3),
            C12_5 * z1 - C12_9 * z2 - C12_1 * z3 - C12_11 * z4,
            C12_7 * z1 - C12_3 * z2 - C12_11 * z3 + C12_1 * z4,
            C12_9 * (z1 - z4) - C12_3 * (z2 - z3),
            C12_11 * z1 - C12_9 * z2 + C12_7 * z3 - C12_5 * z4,
        ];

        let dc = f[0] << CONST_BITS;
        let f6 = f[6] << CONST_BITS;
        let mut out = [0i32; 12];
        for x in 0..6 {
            let even = dc + E12_6_SIGN[x] * f6 + f[2] * E12_2[x] + f[4] * E12_4[x];
            out[x] = descale(even + odd[x], shift);
            out[11 - x] = descale(even - odd[x], shift);
        }
        out
    };

    // Pass 1: columns.
    let mut ws = [0i32; 12 * DCTSIZE];
    for c in 0..DCTSIZE {
        let mut f = [0i32; DCTSIZE];
        for (v, out) in f.iter_mut().enumerate() {
            *out = deq(coef_block, dequant, v * DCTSIZE + c);
        }
        let col = idct_1d(f, CONST_BITS - PASS1_BITS);
        for (y, &v) in col.iter().enumerate() {
            ws[y * DCTSIZE + c] = v;
        }
    }

    // Pass 2: rows.
    for (y, row) in output.iter_mut().take(12).enumerate() {
        let mut f = [0i32; DCTSIZE];
        f.copy_from_slice(&ws[y * DCTSIZE..][..DCTSIZE]);
        let out = idct_1d(f, CONST_BITS + PASS1_BITS + 3);
        for (x, &v) in out.iter().enumerate() {
            row[output_col + x] = clamp_sample(v + CENTER_SAMPLE);
        }
    }
}
