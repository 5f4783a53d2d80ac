// Copyright (c) the rjpeg Authors. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

//! RGB-family <-> YCbCr conversion.
//!
//! All arithmetic is 16-bit fixed point with round-half-up rounding. The
//! channel order and filler position of the packed pixel format are described
//! by a [`PixelLayout`], resolved once per row, never per pixel.

const SCALE_BITS: i32 = 16;
const ONE_HALF: i32 = 1 << (SCALE_BITS - 1);
const CENTER: i32 = 128;

// Forward constants: FIX(x) = round(x * 2^16).
const FY_R: i32 = 19595; // FIX(0.299)
const FY_G: i32 = 38470; // FIX(0.587)
const FY_B: i32 = 7471; // FIX(0.114)
const FCB_R: i32 = -11059; // -FIX(0.168735892)
const FCB_G: i32 = -21709; // -FIX(0.331264108)
const FCB_B: i32 = 32768; // FIX(0.5)
const FCR_R: i32 = 32768; // FIX(0.5)
const FCR_G: i32 = -27439; // -FIX(0.418687589)
const FCR_B: i32 = -5329; // -FIX(0.081312411)

// Inverse constants.
const ICR_R: i32 = 91881; // FIX(1.402)
const ICB_B: i32 = 116130; // FIX(1.772)
const ICB_G: i32 = -22554; // -FIX(0.344136286)
const ICR_G: i32 = -46802; // -FIX(0.714136286)

/// Channel order and filler position of a packed RGB-family pixel.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PixelLayout {
    Rgb,
    Bgr,
    /// RGB with a trailing filler byte.
    Rgbx,
    /// BGR with a trailing filler byte.
    Bgrx,
    /// RGB with a leading filler byte.
    Xrgb,
    /// BGR with a leading filler byte.
    Xbgr,
}

impl PixelLayout {
    pub const fn bytes_per_pixel(self) -> usize {
        match self {
            PixelLayout::Rgb | PixelLayout::Bgr => 3,
            _ => 4,
        }
    }

    /// Byte offsets of the (red, green, blue) channels within a pixel.
    pub const fn offsets(self) -> (usize, usize, usize) {
        match self {
            PixelLayout::Rgb | PixelLayout::Rgbx => (0, 1, 2),
            PixelLayout::Bgr | PixelLayout::Bgrx => (2, 1, 0),
            PixelLayout::Xrgb => (1, 2, 3),
            PixelLayout::Xbgr => (3, 2, 1),
        }
    }

    const fn filler_offset(self) -> Option<usize> {
        match self {
            PixelLayout::Rgb | PixelLayout::Bgr => None,
            PixelLayout::Rgbx | PixelLayout::Bgrx => Some(3),
            PixelLayout::Xrgb | PixelLayout::Xbgr => Some(0),
        }
    }
}

#[inline]
fn clamp(v: i32) -> u8 {
    v.clamp(0, 255) as u8
}

/// Converts one row of packed pixels to planar Y/Cb/Cr. The pixel count is
/// the length of the output rows; `input` must hold at least that many
/// pixels.
pub fn rgb_to_ycbcr(
    layout: PixelLayout,
    input: &[u8],
    y_row: &mut [u8],
    cb_row: &mut [u8],
    cr_row: &mut [u8],
) {
    let bpp = layout.bytes_per_pixel();
    let (ro, go, bo) = layout.offsets();
    for (i, ((y, cb), cr)) in y_row
        .iter_mut()
        .zip(cb_row.iter_mut())
        .zip(cr_row.iter_mut())
        .enumerate()
    {
        let pixel = &input[i * bpp..][..bpp];
        let r = pixel[ro] as i32;
        let g = pixel[go] as i32;
        let b = pixel[bo] as i32;
        *y = ((FY_R * r + FY_G * g + FY_B * b + ONE_HALF) >> SCALE_BITS) as u8;
        // The chroma bias is one less than half so that the network cannot
        // round up to 256 at the positive extreme.
        *cb = ((FCB_R * r + FCB_G * g + FCB_B * b + (CENTER << SCALE_BITS) + ONE_HALF - 1)
            >> SCALE_BITS) as u8;
        *cr = ((FCR_R * r + FCR_G * g + FCR_B * b + (CENTER << SCALE_BITS) + ONE_HALF - 1)
            >> SCALE_BITS) as u8;
    }
}

/// Luma-only forward conversion for grayscale output.
pub fn rgb_to_gray(layout: PixelLayout, input: &[u8], y_row: &mut [u8]) {
    let bpp = layout.bytes_per_pixel();
    let (ro, go, bo) = layout.offsets();
    for (i, y) in y_row.iter_mut().enumerate() {
        let pixel = &input[i * bpp..][..bpp];
        let r = pixel[ro] as i32;
        let g = pixel[go] as i32;
        let b = pixel[bo] as i32;
        *y = ((FY_R * r + FY_G * g + FY_B * b + ONE_HALF) >> SCALE_BITS) as u8;
    }
}

#[inline]
fn ycbcr_to_rgb_pixel(y: i32, cb: i32, cr: i32) -> (u8, u8, u8) {
    let cb = cb - CENTER;
    let cr = cr - CENTER;
    let r = y + ((ICR_R * cr + ONE_HALF) >> SCALE_BITS);
    let g = y + ((ICB_G * cb + ICR_G * cr + ONE_HALF - 1) >> SCALE_BITS);
    let b = y + ((ICB_B * cb + ONE_HALF) >> SCALE_BITS);
    (clamp(r), clamp(g), clamp(b))
}

#[inline]
fn write_pixel(layout: PixelLayout, pixel: &mut [u8], rgb: (u8, u8, u8)) {
    let (ro, go, bo) = layout.offsets();
    pixel[ro] = rgb.0;
    pixel[go] = rgb.1;
    pixel[bo] = rgb.2;
    if let Some(xo) = layout.filler_offset() {
        pixel[xo] = 0xff;
    }
}

/// Converts one row of planar Y/Cb/Cr to packed pixels.
pub fn ycbcr_to_rgb(
    layout: PixelLayout,
    y_row: &[u8],
    cb_row: &[u8],
    cr_row: &[u8],
    output: &mut [u8],
) {
    let bpp = layout.bytes_per_pixel();
    for (i, (&y, (&cb, &cr))) in y_row
        .iter()
        .zip(cb_row.iter().zip(cr_row.iter()))
        .enumerate()
    {
        let rgb = ycbcr_to_rgb_pixel(y as i32, cb as i32, cr as i32);
        write_pixel(layout, &mut output[i * bpp..][..bpp], rgb);
    }
}

/// Inverse conversion packing each pixel as little-endian RGB565.
pub fn ycbcr_to_rgb565(y_row: &[u8], cb_row: &[u8], cr_row: &[u8], output: &mut [u8]) {
    for (i, (&y, (&cb, &cr))) in y_row
        .iter()
        .zip(cb_row.iter().zip(cr_row.iter()))
        .enumerate()
    {
        let (r, g, b) = ycbcr_to_rgb_pixel(y as i32, cb as i32, cr as i32);
        let packed =
            (((r & 0xf8) as u16) << 8) | (((g & 0xfc) as u16) << 3) | ((b >> 3) as u16);
        output[i * 2..][..2].copy_from_slice(&packed.to_le_bytes());
    }
}

/// Fused 2:1-horizontal chroma upsample + inverse conversion: consumes a
/// full-resolution luma row and half-resolution chroma rows directly, so no
/// full-resolution chroma intermediate is materialized. Equivalent to box
/// upsampling followed by [`ycbcr_to_rgb`].
pub fn merged_upsample_h2v1(
    layout: PixelLayout,
    y_row: &[u8],
    cb_row: &[u8],
    cr_row: &[u8],
    output: &mut [u8],
) {
    let bpp = layout.bytes_per_pixel();
    for (i, &y) in y_row.iter().enumerate() {
        let cb = cb_row[i / 2] as i32;
        let cr = cr_row[i / 2] as i32;
        let rgb = ycbcr_to_rgb_pixel(y as i32, cb, cr);
        write_pixel(layout, &mut output[i * bpp..][..bpp], rgb);
    }
}

/// Fused 2:1-horizontal-and-vertical upsample + inverse conversion: two luma
/// rows share one pair of chroma rows.
#[allow(clippy::too_many_arguments)]
pub fn merged_upsample_h2v2(
    layout: PixelLayout,
    y_row0: &[u8],
    y_row1: &[u8],
    cb_row: &[u8],
    cr_row: &[u8],
    output0: &mut [u8],
    output1: &mut [u8],
) {
    merged_upsample_h2v1(layout, y_row0, cb_row, cr_row, output0);
    merged_upsample_h2v1(layout, y_row1, cb_row, cr_row, output1);
}
