// Copyright (c) the rjpeg Authors. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

//! Chroma up- and downsampling.
//!
//! Downsampling averages 2 or 4 contributing samples with a rounding bias
//! that alternates between adjacent output columns, so that rounding error
//! carries no directional drift. Callers replicate the right image edge
//! first ([`expand_right_edge`]) so every output sample sees a full group.
//!
//! Upsampling comes in two flavors: box replication, and the triangle
//! filter that blends each output with its nearest neighbor in a 3:1 ratio
//! (9:3:3:1 in 2-D). Row ends have only one neighbor and are copied
//! unblended.

/// Replicates the sample at `valid - 1` into the rest of the row.
pub fn expand_right_edge(row: &mut [u8], valid: usize) {
    let value = row[valid - 1];
    row[valid..].fill(value);
}

/// 2:1 horizontal downsampling; `input` must hold two samples per output.
pub fn downsample_h2v1(input: &[u8], output: &mut [u8]) {
    for (i, out) in output.iter_mut().enumerate() {
        let bias = (i & 1) as u16;
        let a = input[2 * i] as u16;
        let b = input[2 * i + 1] as u16;
        *out = ((a + b + bias) >> 1) as u8;
    }
}

/// 2:1 horizontal and vertical downsampling of a row pair.
pub fn downsample_h2v2(row0: &[u8], row1: &[u8], output: &mut [u8]) {
    for (i, out) in output.iter_mut().enumerate() {
        let bias = 1 + (i & 1) as u16;
        let sum = row0[2 * i] as u16
            + row0[2 * i + 1] as u16
            + row1[2 * i] as u16
            + row1[2 * i + 1] as u16;
        *out = ((sum + bias) >> 2) as u8;
    }
}

/// Box upsampling: each input sample covers two output columns.
pub fn upsample_h2v1(input: &[u8], output: &mut [u8]) {
    for (i, out) in output.iter_mut().enumerate() {
        *out = input[i / 2];
    }
}

/// Box upsampling in both directions: one chroma row fills two output rows.
pub fn upsample_h2v2(input: &[u8], output0: &mut [u8], output1: &mut [u8]) {
    upsample_h2v1(input, output0);
    output1.copy_from_slice(output0);
}

/// Triangle-filter horizontal upsampling: each output blends its containing
/// sample with the nearest neighbor 3:1. The first and last output columns
/// have no outer neighbor and copy the edge sample.
pub fn upsample_h2v1_fancy(input: &[u8], output: &mut [u8]) {
    let n = input.len();
    debug_assert_eq!(output.len(), 2 * n);

    if n == 1 {
        // No neighbor to blend with; both outputs copy the lone sample.
        output[0] = input[0];
        output[1] = input[0];
        return;
    }

    output[0] = input[0];
    output[1] = ((3 * input[0] as u16 + input[1] as u16 + 2) >> 2) as u8;
    for i in 1..n - 1 {
        let this = 3 * input[i] as u16;
        output[2 * i] = ((this + input[i - 1] as u16 + 1) >> 2) as u8;
        output[2 * i + 1] = ((this + input[i + 1] as u16 + 2) >> 2) as u8;
    }
    output[2 * n - 2] = ((3 * input[n - 1] as u16 + input[n - 2] as u16 + 1) >> 2) as u8;
    output[2 * n - 1] = input[n - 1];
}

/// Triangle-filter upsampling in both directions, producing one output row
/// from the nearest chroma row (`near`, weight 3) and the adjacent one
/// (`far`, weight 1). At the top and bottom of the image the caller passes
/// the boundary row for both. The column sums are blended 3:1 again
/// horizontally, for an effective 9:3:3:1 kernel.
pub fn upsample_h2v2_fancy(near: &[u8], far: &[u8], output: &mut [u8]) {
    let n = near.len();
    debug_assert_eq!(far.len(), n);
    debug_assert_eq!(output.len(), 2 * n);

    let colsum = |i: usize| 3 * near[i] as u32 + far[i] as u32;

    if n == 1 {
        let cs = colsum(0);
        output[0] = ((cs * 4 + 8) >> 4) as u8;
        output[1] = ((cs * 4 + 7) >> 4) as u8;
        return;
    }

    output[0] = ((colsum(0) * 4 + 8) >> 4) as u8;
    output[1] = ((colsum(0) * 3 + colsum(1) + 7) >> 4) as u8;
    for i in 1..n - 1 {
        let this = colsum(i) * 3;
        output[2 * i] = ((this + colsum(i - 1) + 8) >> 4) as u8;
        output[2 * i + 1] = ((this + colsum(i + 1) + 7) >> 4) as u8;
    }
    output[2 * n - 2] = ((colsum(n - 1) * 3 + colsum(n - 2) + 8) >> 4) as u8;
    output[2 * n - 1] = ((colsum(n - 1) * 4 + 7) >> 4) as u8;
}
