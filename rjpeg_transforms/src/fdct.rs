// Copyright (c) the rjpeg Authors. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

//! Forward 8x8 DCT family.
//!
//! All three variants share the same separable topology: a 1-D 8-point
//! butterfly over the rows, a transpose, and the same butterfly over the
//! columns. The vector passes operate on whole rows of the (transposed)
//! block, so every lane performs exactly the scalar sequence of operations
//! and all descriptors produce bit-identical output.
//!
//! - accurate integer: 13-bit constants, round-half-up descaling after every
//!   scaled stage; output is the DCT scaled by 8, matching divisors of
//!   `q << 3`.
//! - fast integer: 8-bit constants, truncating multiplies; output carries the
//!   AAN per-coefficient scale factors, folded back in by the fast divisors.
//! - float: the AAN flow in f32, no scaling games.

use crate::{transpose8, DCTSIZE, DCTSIZE2};
use rjpeg_simd::{F32SimdVec, I32SimdVec, SimdDescriptor};

pub(crate) const CONST_BITS: i32 = 13;
pub(crate) const PASS1_BITS: i32 = 2;

pub(crate) const F_0_298: i32 = 2446; // FIX(0.298631336)
pub(crate) const F_0_390: i32 = 3196; // FIX(0.390180644)
pub(crate) const F_0_541: i32 = 4433; // FIX(0.541196100)
pub(crate) const F_0_765: i32 = 6270; // FIX(0.765366865)
pub(crate) const F_0_899: i32 = 7373; // FIX(0.899976223)
pub(crate) const F_1_175: i32 = 9633; // FIX(1.175875602)
pub(crate) const F_1_501: i32 = 12299; // FIX(1.501321110)
pub(crate) const F_1_847: i32 = 15137; // FIX(1.847759065)
pub(crate) const F_1_961: i32 = 16069; // FIX(1.961570560)
pub(crate) const F_2_053: i32 = 16819; // FIX(2.053119869)
pub(crate) const F_2_562: i32 = 20995; // FIX(2.562915447)
pub(crate) const F_3_072: i32 = 25172; // FIX(3.072711026)

// 8-bit constants for the fast variant.
const FF_0_382: i32 = 98; // FIX(0.382683433)
const FF_0_541: i32 = 139; // FIX(0.541196100)
const FF_0_707: i32 = 181; // FIX(0.707106781)
const FF_1_306: i32 = 334; // FIX(1.306562965)

/// Round-half-up fixed-point descale: `(x + (1 << (N-1))) >> N`.
#[inline(always)]
pub(crate) fn descale<D: SimdDescriptor, const N: i32>(d: D, x: D::I32Vec) -> D::I32Vec {
    (x + D::I32Vec::splat(d, 1 << (N - 1))).shr::<N>()
}

/// Accurate integer forward DCT. Input is a centered sample block; output is
/// the DCT scaled by 8.
pub fn forward_dct_islow<D: SimdDescriptor>(d: D, data: &mut [i32; DCTSIZE2]) {
    // Rows: the butterfly below combines vertically, so transpose first.
    transpose8(data);
    islow_pass::<D, true, { CONST_BITS - PASS1_BITS }>(d, data);
    transpose8(data);
    // Columns.
    islow_pass::<D, false, { CONST_BITS + PASS1_BITS }>(d, data);
}

/// One 1-D pass of the accurate forward DCT, combining vertically across the
/// 8 rows of `data` with every lane carrying an independent 8-point input.
/// `FIRST` selects the pass-1 scaling (results kept scaled up by
/// `PASS1_BITS`); `SHIFT` is the descale amount for the multiplied terms.
fn islow_pass<D: SimdDescriptor, const FIRST: bool, const SHIFT: i32>(
    d: D,
    data: &mut [i32; DCTSIZE2],
) {
    let mut j = 0;
    while j < DCTSIZE {
        let load = |i: usize| D::I32Vec::load(d, &data[i * DCTSIZE + j..]);
        let mul = |x: D::I32Vec, c: i32| x * D::I32Vec::splat(d, c);

        let tmp0 = load(0) + load(7);
        let tmp7 = load(0) - load(7);
        let tmp1 = load(1) + load(6);
        let tmp6 = load(1) - load(6);
        let tmp2 = load(2) + load(5);
        let tmp5 = load(2) - load(5);
        let tmp3 = load(3) + load(4);
        let tmp4 = load(3) - load(4);

        // Even part.
        let tmp10 = tmp0 + tmp3;
        let tmp13 = tmp0 - tmp3;
        let tmp11 = tmp1 + tmp2;
        let tmp12 = tmp1 - tmp2;

        let (out0, out4) = if FIRST {
            (
                (tmp10 + tmp11).shl::<PASS1_BITS>(),
                (tmp10 - tmp11).shl::<PASS1_BITS>(),
            )
        } else {
            (
                descale::<D, PASS1_BITS>(d, tmp10 + tmp11),
                descale::<D, PASS1_BITS>(d, tmp10 - tmp11),
            )
        };

        let z1 = mul(tmp12 + tmp13, F_0_541);
        let out2 = descale::<D, SHIFT>(d, z1 + mul(tmp13, F_0_765));
        let out6 = descale::<D, SHIFT>(d, z1 - mul(tmp12, F_1_847));

        // Odd part.
        let z1 = tmp4 + tmp7;
        let z2 = tmp5 + tmp6;
        let z3 = tmp4 + tmp6;
        let z4 = tmp5 + tmp7;
        let z5 = mul(z3 + z4, F_1_175);

        let tmp4 = mul(tmp4, F_0_298);
        let tmp5 = mul(tmp5, F_2_053);
        let tmp6 = mul(tmp6, F_3_072);
        let tmp7 = mul(tmp7, F_1_501);
        let z1 = mul(z1, -F_0_899);
        let z2 = mul(z2, -F_2_562);
        let z3 = mul(z3, -F_1_961) + z5;
        let z4 = mul(z4, -F_0_390) + z5;

        let out7 = descale::<D, SHIFT>(d, tmp4 + z1 + z3);
        let out5 = descale::<D, SHIFT>(d, tmp5 + z2 + z4);
        let out3 = descale::<D, SHIFT>(d, tmp6 + z2 + z3);
        let out1 = descale::<D, SHIFT>(d, tmp7 + z1 + z4);

        for (i, out) in [out0, out1, out2, out3, out4, out5, out6, out7]
            .iter()
            .enumerate()
        {
            out.store(&mut data[i * DCTSIZE + j..]);
        }
        j += D::I32Vec::LEN;
    }
}

/// Fast integer forward DCT. Output is scaled by the AAN per-coefficient
/// factors; the fast divisor table compensates.
pub fn forward_dct_ifast<D: SimdDescriptor>(d: D, data: &mut [i32; DCTSIZE2]) {
    transpose8(data);
    ifast_pass(d, data);
    transpose8(data);
    ifast_pass(d, data);
}

fn ifast_pass<D: SimdDescriptor>(d: D, data: &mut [i32; DCTSIZE2]) {
    let mut j = 0;
    while j < DCTSIZE {
        let load = |i: usize| D::I32Vec::load(d, &data[i * DCTSIZE + j..]);
        // Truncating 8-bit fixed-point multiply.
        let mul = |x: D::I32Vec, c: i32| (x * D::I32Vec::splat(d, c)).shr::<8>();

        let tmp0 = load(0) + load(7);
        let tmp7 = load(0) - load(7);
        let tmp1 = load(1) + load(6);
        let tmp6 = load(1) - load(6);
        let tmp2 = load(2) + load(5);
        let tmp5 = load(2) - load(5);
        let tmp3 = load(3) + load(4);
        let tmp4 = load(3) - load(4);

        // Even part.
        let tmp10 = tmp0 + tmp3;
        let tmp13 = tmp0 - tmp3;
        let tmp11 = tmp1 + tmp2;
        let tmp12 = tmp1 - tmp2;

        let out0 = tmp10 + tmp11;
        let out4 = tmp10 - tmp11;

        let z1 = mul(tmp12 + tmp13, FF_0_707);
        let out2 = tmp13 + z1;
        let out6 = tmp13 - z1;

        // Odd part.
        let tmp10 = tmp4 + tmp5;
        let tmp11 = tmp5 + tmp6;
        let tmp12 = tmp6 + tmp7;

        let z5 = mul(tmp10 - tmp12, FF_0_382);
        let z2 = mul(tmp10, FF_0_541) + z5;
        let z4 = mul(tmp12, FF_1_306) + z5;
        let z3 = mul(tmp11, FF_0_707);

        let z11 = tmp7 + z3;
        let z13 = tmp7 - z3;

        let out5 = z13 + z2;
        let out3 = z13 - z2;
        let out1 = z11 + z4;
        let out7 = z11 - z4;

        for (i, out) in [out0, out1, out2, out3, out4, out5, out6, out7]
            .iter()
            .enumerate()
        {
            out.store(&mut data[i * DCTSIZE + j..]);
        }
        j += D::I32Vec::LEN;
    }
}

/// Float forward DCT (AAN). Output carries the AAN scale factors, folded
/// into the float divisor table.
pub fn forward_dct_float<D: SimdDescriptor>(d: D, data: &mut [f32; DCTSIZE2]) {
    transpose8(data);
    float_pass(d, data);
    transpose8(data);
    float_pass(d, data);
}

fn float_pass<D: SimdDescriptor>(d: D, data: &mut [f32; DCTSIZE2]) {
    let mut j = 0;
    while j < DCTSIZE {
        let load = |i: usize| D::F32Vec::load(d, &data[i * DCTSIZE + j..]);
        let mul = |x: D::F32Vec, c: f32| x * D::F32Vec::splat(d, c);

        let tmp0 = load(0) + load(7);
        let tmp7 = load(0) - load(7);
        let tmp1 = load(1) + load(6);
        let tmp6 = load(1) - load(6);
        let tmp2 = load(2) + load(5);
        let tmp5 = load(2) - load(5);
        let tmp3 = load(3) + load(4);
        let tmp4 = load(3) - load(4);

        // Even part.
        let tmp10 = tmp0 + tmp3;
        let tmp13 = tmp0 - tmp3;
        let tmp11 = tmp1 + tmp2;
        let tmp12 = tmp1 - tmp2;

        let out0 = tmp10 + tmp11;
        let out4 = tmp10 - tmp11;

        let z1 = mul(tmp12 + tmp13, 0.707106781);
        let out2 = tmp13 + z1;
        let out6 = tmp13 - z1;

        // Odd part.
        let tmp10 = tmp4 + tmp5;
        let tmp11 = tmp5 + tmp6;
        let tmp12 = tmp6 + tmp7;

        let z5 = mul(tmp10 - tmp12, 0.382683433);
        let z2 = mul(tmp10, 0.541196100) + z5;
        let z4 = mul(tmp12, 1.306562965) + z5;
        let z3 = mul(tmp11, 0.707106781);

        let z11 = tmp7 + z3;
        let z13 = tmp7 - z3;

        let out5 = z13 + z2;
        let out3 = z13 - z2;
        let out1 = z11 + z4;
        let out7 = z11 - z4;

        for (i, out) in [out0, out1, out2, out3, out4, out5, out6, out7]
            .iter()
            .enumerate()
        {
            out.store(&mut data[i * DCTSIZE + j..]);
        }
        j += D::F32Vec::LEN;
    }
}
