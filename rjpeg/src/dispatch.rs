// Copyright (c) the rjpeg Authors. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

//! Kernel selection.
//!
//! Every operation is bound exactly once per pipeline instance to the
//! fastest implementation whose capability and format preconditions hold,
//! with the portable scalar kernel as the unconditional fallback: an
//! operation is never left unresolved, and after binding each call is a
//! plain function-pointer call.
//!
//! The accelerated bindings re-enter the vector kernels through the
//! descriptor `call()` gateway, so the whole transform body is compiled
//! with the family's target features enabled.

use crate::error::{Error, Result};
use rjpeg_simd::{cpu_caps, CpuCaps, ScalarDescriptor, SimdDescriptor};
use rjpeg_transforms::quant::ReciprocalTable;
use rjpeg_transforms::{fdct, idct, idct_scaled, quant, DCTSIZE2};
use tracing::{debug, trace};

/// Operations subject to capability-based selection.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Operation {
    ForwardDctIslow,
    ForwardDctIfast,
    ForwardDctFloat,
    Quantize,
    QuantizeFloat,
    InverseDctIslow,
    InverseDctIfast,
    InverseDctFloat,
    InverseDctReduced,
    ColorConvert,
    Resample,
}

/// Which implementation family a binding resolved to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum CapabilityTag {
    Scalar,
    Sse42,
    Avx2,
    Neon,
}

/// Format preconditions checked before any accelerated family is
/// considered. These describe the surrounding pipeline's data layout, not
/// per-call state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Preconditions {
    /// Bits per sample; only 8 is supported.
    pub sample_bits: u32,
    /// Bits per DCT coefficient; only 16 is supported.
    pub coef_bits: u32,
    /// Bits per row/column index the surrounding pipeline hands to the
    /// kernels; only 32 is supported.
    pub index_bits: u32,
    /// Bytes per packed output pixel (3 or 4); only relevant to color
    /// conversion.
    pub pixel_bytes: u32,
}

impl Default for Preconditions {
    fn default() -> Self {
        Preconditions {
            sample_bits: 8,
            coef_bits: 16,
            index_bits: 32,
            pixel_bytes: 3,
        }
    }
}

impl Preconditions {
    fn check(&self) -> Result<()> {
        if self.sample_bits != 8 {
            return Err(Error::UnsupportedSampleDepth(self.sample_bits));
        }
        if self.coef_bits != 16 {
            return Err(Error::UnsupportedCoefWidth(self.coef_bits));
        }
        if self.index_bits != 32 {
            return Err(Error::UnsupportedIndexWidth(self.index_bits));
        }
        if self.pixel_bytes != 3 && self.pixel_bytes != 4 {
            return Err(Error::UnsupportedPixelBytes(self.pixel_bytes));
        }
        Ok(())
    }
}

/// Returns the family `op` would bind to under `caps`, or `None` when the
/// preconditions rule the operation out entirely.
pub fn can_use(op: Operation, caps: CpuCaps, pre: &Preconditions) -> Option<CapabilityTag> {
    if pre.check().is_err() {
        return None;
    }
    let vectorized = matches!(
        op,
        Operation::ForwardDctIslow
            | Operation::ForwardDctIfast
            | Operation::ForwardDctFloat
            | Operation::QuantizeFloat
            | Operation::InverseDctIslow
            | Operation::InverseDctIfast
            | Operation::InverseDctFloat
    );
    if vectorized {
        if caps.contains(CpuCaps::AVX2) {
            return Some(CapabilityTag::Avx2);
        }
        if caps.contains(CpuCaps::SSE42) {
            return Some(CapabilityTag::Sse42);
        }
        if caps.contains(CpuCaps::NEON) {
            return Some(CapabilityTag::Neon);
        }
    }
    Some(CapabilityTag::Scalar)
}

pub type FdctIntKernel = fn(&mut [i32; DCTSIZE2]);
pub type FdctFloatKernel = fn(&mut [f32; DCTSIZE2]);
pub type QuantizeKernel = fn(&mut [i16; DCTSIZE2], &ReciprocalTable, &[i32; DCTSIZE2]);
pub type QuantizeFloatKernel = fn(&mut [i16; DCTSIZE2], &[f32; DCTSIZE2], &[f32; DCTSIZE2]);
pub type IdctIntKernel = fn(&[i32; DCTSIZE2], &[i16; DCTSIZE2], &mut [&mut [u8]], usize);
pub type IdctFloatKernel = fn(&[f32; DCTSIZE2], &[i16; DCTSIZE2], &mut [&mut [u8]], usize);

/// Per-family wrappers with function-pointer-compatible signatures. A
/// family's wrapper is only ever bound when that family is in the
/// capability mask; if the probe unexpectedly fails anyway, the wrapper
/// degrades to the scalar kernel rather than faulting.
macro_rules! kernel_family {
    ($mod_name:ident, ($($arg:ident: $ty:ty),*), $kernel:path) => {
        mod $mod_name {
            use super::*;

            pub(super) fn scalar($($arg: $ty),*) {
                $kernel(ScalarDescriptor, $($arg),*);
            }

            #[cfg(all(target_arch = "x86_64", feature = "sse42"))]
            pub(super) fn sse42($($arg: $ty),*) {
                match rjpeg_simd::Sse42Descriptor::new() {
                    Some(d) => d.call(
                        #[inline(always)]
                        |d| $kernel(d, $($arg),*),
                    ),
                    None => scalar($($arg),*),
                }
            }

            #[cfg(all(target_arch = "x86_64", feature = "avx"))]
            pub(super) fn avx2($($arg: $ty),*) {
                match rjpeg_simd::AvxDescriptor::new() {
                    Some(d) => d.call(
                        #[inline(always)]
                        |d| $kernel(d, $($arg),*),
                    ),
                    None => scalar($($arg),*),
                }
            }

            #[cfg(all(target_arch = "aarch64", feature = "neon"))]
            pub(super) fn neon($($arg: $ty),*) {
                match rjpeg_simd::NeonDescriptor::new() {
                    Some(d) => d.call(
                        #[inline(always)]
                        |d| $kernel(d, $($arg),*),
                    ),
                    None => scalar($($arg),*),
                }
            }
        }
    };
}

kernel_family!(fdct_islow, (data: &mut [i32; DCTSIZE2]), fdct::forward_dct_islow);
kernel_family!(fdct_ifast, (data: &mut [i32; DCTSIZE2]), fdct::forward_dct_ifast);
kernel_family!(fdct_float, (data: &mut [f32; DCTSIZE2]), fdct::forward_dct_float);
kernel_family!(
    quantize_float,
    (
        coef_block: &mut [i16; DCTSIZE2],
        divisors: &[f32; DCTSIZE2],
        workspace: &[f32; DCTSIZE2]
    ),
    quant::quantize_float
);
kernel_family!(
    idct_islow,
    (
        dequant: &[i32; DCTSIZE2],
        coef_block: &[i16; DCTSIZE2],
        output: &mut [&mut [u8]],
        output_col: usize
    ),
    idct::idct_islow
);
kernel_family!(
    idct_ifast,
    (
        dequant: &[i32; DCTSIZE2],
        coef_block: &[i16; DCTSIZE2],
        output: &mut [&mut [u8]],
        output_col: usize
    ),
    idct::idct_ifast
);
kernel_family!(
    idct_float,
    (
        dequant: &[f32; DCTSIZE2],
        coef_block: &[i16; DCTSIZE2],
        output: &mut [&mut [u8]],
        output_col: usize
    ),
    idct::idct_float
);

macro_rules! bind {
    ($tag:expr, $family:ident) => {{
        match $tag {
            #[cfg(all(target_arch = "x86_64", feature = "sse42"))]
            CapabilityTag::Sse42 => $family::sse42 as _,
            #[cfg(all(target_arch = "x86_64", feature = "avx"))]
            CapabilityTag::Avx2 => $family::avx2 as _,
            #[cfg(all(target_arch = "aarch64", feature = "neon"))]
            CapabilityTag::Neon => $family::neon as _,
            _ => $family::scalar as _,
        }
    }};
}

/// The operations of one encode or decode pipeline, each bound to a
/// concrete kernel. Built once per pipeline; cheap to copy.
#[derive(Clone, Copy, Debug)]
pub struct KernelSet {
    pub forward_dct_islow: FdctIntKernel,
    pub forward_dct_ifast: FdctIntKernel,
    pub forward_dct_float: FdctFloatKernel,
    pub quantize: QuantizeKernel,
    pub quantize_float: QuantizeFloatKernel,
    pub idct_islow: IdctIntKernel,
    pub idct_ifast: IdctIntKernel,
    pub idct_float: IdctFloatKernel,
    pub idct_2x2: IdctIntKernel,
    pub idct_4x4: IdctIntKernel,
    pub idct_6x6: IdctIntKernel,
    pub idct_12x12: IdctIntKernel,
}

impl KernelSet {
    /// Binds every operation for the process-wide capability mask.
    pub fn new(pre: &Preconditions) -> Result<Self> {
        Self::with_caps(cpu_caps(), pre)
    }

    /// Binds every operation for an explicit capability mask. The mask must
    /// not claim families the hardware lacks; [`cpu_caps`] never does.
    pub fn with_caps(caps: CpuCaps, pre: &Preconditions) -> Result<Self> {
        pre.check()?;
        debug!(?caps, "binding kernels");

        let tag = |op| {
            // Preconditions already checked; every op resolves.
            let tag = can_use(op, caps, pre).unwrap_or(CapabilityTag::Scalar);
            trace!(?op, ?tag, "bound");
            tag
        };

        Ok(KernelSet {
            forward_dct_islow: bind!(tag(Operation::ForwardDctIslow), fdct_islow),
            forward_dct_ifast: bind!(tag(Operation::ForwardDctIfast), fdct_ifast),
            forward_dct_float: bind!(tag(Operation::ForwardDctFloat), fdct_float),
            quantize: {
                let _ = tag(Operation::Quantize);
                quant::quantize
            },
            quantize_float: bind!(tag(Operation::QuantizeFloat), quantize_float),
            idct_islow: bind!(tag(Operation::InverseDctIslow), idct_islow),
            idct_ifast: bind!(tag(Operation::InverseDctIfast), idct_ifast),
            idct_float: bind!(tag(Operation::InverseDctFloat), idct_float),
            idct_2x2: {
                let _ = tag(Operation::InverseDctReduced);
                idct_scaled::idct_2x2
            },
            idct_4x4: idct_scaled::idct_4x4,
            idct_6x6: idct_scaled::idct_6x6,
            idct_12x12: idct_scaled::idct_12x12,
        })
    }
}

// The colorspace and resampling operations have a single (reference)
// implementation; they are re-exported here so a pipeline can treat every
// operation uniformly as "ask dispatch for it".
pub use crate::color::{
    merged_upsample_h2v1, merged_upsample_h2v2, rgb_to_gray, rgb_to_ycbcr, ycbcr_to_rgb,
    ycbcr_to_rgb565,
};
pub use crate::sample::{
    downsample_h2v1, downsample_h2v2, expand_right_edge, upsample_h2v1, upsample_h2v1_fancy,
    upsample_h2v2, upsample_h2v2_fancy,
};

#[cfg(test)]
mod tests {
    use super::*;
    use rjpeg_transforms::quant::islow_dequant;
    use test_log::test;

    #[test]
    fn empty_mask_binds_scalar_everywhere() {
        for op in [
            Operation::ForwardDctIslow,
            Operation::ForwardDctIfast,
            Operation::ForwardDctFloat,
            Operation::Quantize,
            Operation::QuantizeFloat,
            Operation::InverseDctIslow,
            Operation::InverseDctIfast,
            Operation::InverseDctFloat,
            Operation::InverseDctReduced,
            Operation::ColorConvert,
            Operation::Resample,
        ] {
            assert_eq!(
                can_use(op, CpuCaps::NONE, &Preconditions::default()),
                Some(CapabilityTag::Scalar),
                "{op:?}"
            );
        }
    }

    #[test]
    fn bad_preconditions_are_rejected() {
        let pre = Preconditions {
            sample_bits: 12,
            ..Preconditions::default()
        };
        assert_eq!(can_use(Operation::ForwardDctIslow, CpuCaps::NONE, &pre), None);
        assert!(KernelSet::with_caps(CpuCaps::NONE, &pre).is_err());

        let pre = Preconditions {
            index_bits: 16,
            ..Preconditions::default()
        };
        assert_eq!(can_use(Operation::InverseDctIslow, CpuCaps::NONE, &pre), None);
        assert!(KernelSet::with_caps(CpuCaps::NONE, &pre).is_err());

        let pre = Preconditions {
            pixel_bytes: 5,
            ..Preconditions::default()
        };
        assert!(KernelSet::with_caps(CpuCaps::NONE, &pre).is_err());
    }

    #[test]
    fn fastest_family_wins() {
        let pre = Preconditions::default();
        assert_eq!(
            can_use(
                Operation::InverseDctIslow,
                CpuCaps::SSE42.union(CpuCaps::AVX2),
                &pre
            ),
            Some(CapabilityTag::Avx2)
        );
        assert_eq!(
            can_use(Operation::InverseDctIslow, CpuCaps::SSE42, &pre),
            Some(CapabilityTag::Sse42)
        );
        assert_eq!(
            can_use(Operation::InverseDctIslow, CpuCaps::NEON, &pre),
            Some(CapabilityTag::Neon)
        );
    }

    #[test]
    fn reduced_sizes_stay_scalar_under_any_mask() {
        let pre = Preconditions::default();
        for caps in [CpuCaps::NONE, CpuCaps::SSE42.union(CpuCaps::AVX2)] {
            assert_eq!(
                can_use(Operation::InverseDctReduced, caps, &pre),
                Some(CapabilityTag::Scalar)
            );
        }
    }

    /// The scalar-bound set and the full-capability set must produce
    /// identical output for the same variant.
    #[test]
    fn bindings_agree_with_scalar() {
        let pre = Preconditions::default();
        let scalar_set = KernelSet::with_caps(CpuCaps::NONE, &pre).unwrap();
        let native_set = KernelSet::new(&pre).unwrap();

        let mut data_a = [0i32; DCTSIZE2];
        for (i, v) in data_a.iter_mut().enumerate() {
            *v = (i as i32 * 7) % 255 - 128;
        }
        let mut data_b = data_a;
        (scalar_set.forward_dct_islow)(&mut data_a);
        (native_set.forward_dct_islow)(&mut data_b);
        assert_eq!(data_a, data_b);

        let dequant = islow_dequant(&[3u16; DCTSIZE2]);
        let mut coefs = [0i16; DCTSIZE2];
        for (i, c) in coefs.iter_mut().enumerate() {
            *c = (i as i16 * 13) % 128 - 64;
        }
        let mut pixels_a = [0u8; DCTSIZE2];
        let mut pixels_b = [0u8; DCTSIZE2];
        let mut rows_a: Vec<&mut [u8]> = pixels_a.chunks_mut(8).collect();
        let mut rows_b: Vec<&mut [u8]> = pixels_b.chunks_mut(8).collect();
        (scalar_set.idct_islow)(&dequant, &coefs, &mut rows_a, 0);
        (native_set.idct_islow)(&dequant, &coefs, &mut rows_b, 0);
        drop((rows_a, rows_b));
        assert_eq!(pixels_a, pixels_b);
    }
}
