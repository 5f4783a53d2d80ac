// Copyright (c) the rjpeg Authors. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

//! JPEG signal-processing kernels with runtime instruction-set dispatch.
//!
//! The numeric primitives of a JPEG codec: the forward and inverse DCT
//! families, quantization, colorspace conversion, and chroma resampling.
//! Entropy coding, bitstream I/O, and row-buffer management live elsewhere;
//! this layer consumes and produces coefficient blocks and sample rows.
//!
//! Each block transform exists once, generic over an instruction-set
//! descriptor; [`dispatch::KernelSet`] binds every operation to the fastest
//! implementation the running CPU (and the `RJPEG_FORCE*` environment
//! overrides) allows.

pub mod color;
pub mod dispatch;
pub mod error;
pub mod sample;

pub use error::{Error, Result};
pub use rjpeg_simd::{cpu_caps, CpuCaps};
