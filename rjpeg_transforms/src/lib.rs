// Copyright (c) the rjpeg Authors. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

pub mod fdct;
pub mod idct;
pub mod idct_scaled;
pub mod quant;

#[cfg(test)]
mod tests;

/// Side length of the transform unit.
pub const DCTSIZE: usize = 8;
/// Number of elements in one block.
pub const DCTSIZE2: usize = 64;

/// The AAN scale factors: `cos(k*pi/16) * sqrt(2)` for `k` in 1..8, 1 for
/// `k = 0`. The fast DCT variants produce output scaled by the outer product
/// of these factors, which the fast divisor/multiplier tables fold back in.
pub(crate) const AAN_SCALE_FACTORS: [f64; DCTSIZE] = [
    1.0,
    1.387039845,
    1.306562965,
    1.175875602,
    1.0,
    0.785694958,
    0.541196100,
    0.275899379,
];

/// In-place transpose of an 8x8 block stored in raster order.
pub(crate) fn transpose8<T: Copy>(data: &mut [T; DCTSIZE2]) {
    for r in 0..DCTSIZE {
        for c in (r + 1)..DCTSIZE {
            data.swap(r * DCTSIZE + c, c * DCTSIZE + r);
        }
    }
}
