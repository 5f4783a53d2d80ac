// Copyright (c) the rjpeg Authors. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

use std::{
    fmt::Debug,
    ops::{Add, AddAssign, Div, Mul, MulAssign, Sub, SubAssign},
};

#[cfg(target_arch = "x86_64")]
mod x86_64;

#[cfg(target_arch = "aarch64")]
mod aarch64;

pub mod capability;
mod scalar;

#[cfg(all(target_arch = "x86_64", feature = "avx"))]
pub use x86_64::avx::AvxDescriptor;
#[cfg(all(target_arch = "x86_64", feature = "sse42"))]
pub use x86_64::sse42::Sse42Descriptor;

#[cfg(all(target_arch = "aarch64", feature = "neon"))]
pub use aarch64::neon::NeonDescriptor;

pub use capability::{cpu_caps, CpuCaps};
pub use scalar::ScalarDescriptor;

/// A zero-sized witness for one instruction family. A value of a descriptor
/// type exists only if the corresponding target features are available, so
/// kernels generic over a descriptor may be compiled with those features
/// enabled.
pub trait SimdDescriptor: Sized + Copy + Debug + Send + Sync {
    type F32Vec: F32SimdVec<Descriptor = Self>;

    type I32Vec: I32SimdVec<Descriptor = Self>;

    fn new() -> Option<Self>;

    /// Calls the given closure within a target feature context.
    /// This enables establishing an unbroken chain of inline functions from the
    /// feature-annotated gateway up to the closure, allowing SIMD intrinsics to
    /// be used safely.
    fn call<R>(self, f: impl FnOnce(Self) -> R) -> R;
}

/// A vector of f32 lanes.
///
/// Implementations must be element-wise IEEE-exact: every lane behaves exactly
/// like the corresponding scalar f32 operation, so a kernel written against
/// this trait produces bit-identical output under every descriptor.
pub trait F32SimdVec:
    Sized
    + Copy
    + Debug
    + Send
    + Sync
    + Add<Self, Output = Self>
    + Mul<Self, Output = Self>
    + Sub<Self, Output = Self>
    + Div<Self, Output = Self>
    + AddAssign<Self>
    + MulAssign<Self>
    + SubAssign<Self>
{
    type Descriptor: SimdDescriptor;

    const LEN: usize;

    /// Converts v to a vector of v.
    fn splat(d: Self::Descriptor, v: f32) -> Self;

    // Requires `mem.len() >= Self::LEN` or it will panic.
    fn load(d: Self::Descriptor, mem: &[f32]) -> Self;

    // Requires `mem.len() >= Self::LEN` or it will panic.
    fn store(&self, mem: &mut [f32]);

    fn min(self, other: Self) -> Self;

    fn max(self, other: Self) -> Self;
}

/// A vector of i32 lanes, wide enough for every fixed-point product the JPEG
/// kernels form (13-bit constants against 13-bit data).
pub trait I32SimdVec:
    Sized
    + Copy
    + Debug
    + Send
    + Sync
    + Add<Self, Output = Self>
    + Sub<Self, Output = Self>
    + Mul<Self, Output = Self>
    + AddAssign<Self>
    + SubAssign<Self>
    + MulAssign<Self>
{
    type Descriptor: SimdDescriptor;

    const LEN: usize;

    /// Converts v to a vector of v.
    fn splat(d: Self::Descriptor, v: i32) -> Self;

    // Requires `mem.len() >= Self::LEN` or it will panic.
    fn load(d: Self::Descriptor, mem: &[i32]) -> Self;

    // Requires `mem.len() >= Self::LEN` or it will panic.
    fn store(&self, mem: &mut [i32]);

    fn shl<const AMOUNT: i32>(self) -> Self;

    /// Arithmetic right shift.
    fn shr<const AMOUNT: i32>(self) -> Self;

    fn min(self, other: Self) -> Self;

    fn max(self, other: Self) -> Self;
}

#[cfg(test)]
mod test {
    use arbtest::arbitrary::Unstructured;

    use crate::{test_all_instruction_sets, F32SimdVec, I32SimdVec, ScalarDescriptor, SimdDescriptor};

    fn arb_f32_vec<D: SimdDescriptor>(_: D, u: &mut Unstructured) -> Vec<f32> {
        let mut res = vec![0.0; D::F32Vec::LEN * 4];
        for v in res.iter_mut() {
            *v = u.arbitrary::<i32>().unwrap() as f32 / (1.0 + u.arbitrary::<u32>().unwrap() as f32)
        }
        res
    }

    fn arb_i32_vec<D: SimdDescriptor>(_: D, u: &mut Unstructured) -> Vec<i32> {
        let mut res = vec![0; D::I32Vec::LEN * 4];
        for v in res.iter_mut() {
            // Stay in the range of fixed-point intermediates so that `mul`
            // and `shl` cannot overflow.
            *v = u.arbitrary::<i16>().unwrap() as i32;
        }
        res
    }

    macro_rules! test_f32_op {
        ($name:ident, |$a:ident, $b:ident| $block:expr) => {
            fn $name<D: SimdDescriptor>(d: D) {
                fn compute<D: SimdDescriptor>(d: D, a: &[f32], b: &[f32]) -> Vec<f32> {
                    let closure = |$a: D::F32Vec, $b: D::F32Vec| $block;
                    let mut res = vec![0f32; a.len()];
                    for idx in (0..a.len()).step_by(D::F32Vec::LEN) {
                        closure(D::F32Vec::load(d, &a[idx..]), D::F32Vec::load(d, &b[idx..]))
                            .store(&mut res[idx..]);
                    }
                    res
                }
                arbtest::arbtest(|u| {
                    let a = arb_f32_vec(d, u);
                    let b = arb_f32_vec(d, u);
                    let scalar_res = compute(ScalarDescriptor::new().unwrap(), &a, &b);
                    let simd_res = compute(d, &a, &b);
                    for (scalar, simd) in scalar_res.iter().zip(simd_res.iter()) {
                        // Bit-identical, including NaN payloads from 0/0.
                        assert_eq!(scalar.to_bits(), simd.to_bits());
                    }
                    Ok(())
                })
                .size_min(256);
            }
            test_all_instruction_sets!($name);
        };
    }

    macro_rules! test_i32_op {
        ($name:ident, |$a:ident, $b:ident| $block:expr) => {
            fn $name<D: SimdDescriptor>(d: D) {
                fn compute<D: SimdDescriptor>(d: D, a: &[i32], b: &[i32]) -> Vec<i32> {
                    let closure = |$a: D::I32Vec, $b: D::I32Vec| $block;
                    let mut res = vec![0i32; a.len()];
                    for idx in (0..a.len()).step_by(D::I32Vec::LEN) {
                        closure(D::I32Vec::load(d, &a[idx..]), D::I32Vec::load(d, &b[idx..]))
                            .store(&mut res[idx..]);
                    }
                    res
                }
                arbtest::arbtest(|u| {
                    let a = arb_i32_vec(d, u);
                    let b = arb_i32_vec(d, u);
                    let scalar_res = compute(ScalarDescriptor::new().unwrap(), &a, &b);
                    let simd_res = compute(d, &a, &b);
                    assert_eq!(scalar_res, simd_res);
                    Ok(())
                })
                .size_min(256);
            }
            test_all_instruction_sets!($name);
        };
    }

    test_f32_op!(f32_add, |a, b| { a + b });
    test_f32_op!(f32_sub, |a, b| { a - b });
    test_f32_op!(f32_mul, |a, b| { a * b });
    test_f32_op!(f32_div, |a, b| { a / b });
    test_f32_op!(f32_min, |a, b| { a.min(b) });
    test_f32_op!(f32_max, |a, b| { a.max(b) });

    test_i32_op!(i32_add, |a, b| { a + b });
    test_i32_op!(i32_sub, |a, b| { a - b });
    test_i32_op!(i32_mul, |a, b| { a * b });
    test_i32_op!(i32_min, |a, b| { a.min(b) });
    test_i32_op!(i32_max, |a, b| { a.max(b) });
    test_i32_op!(i32_shifts, |a, b| {
        let _ = b;
        a.shl::<13>().shr::<11>()
    });

    // The descriptor `call()` gateway must run the closure exactly once and
    // pass captures through.
    fn test_call<D: SimdDescriptor>(d: D) {
        let offset = 3;
        let result = d.call(|_d| 39 + offset);
        assert_eq!(result, 42);
    }
    test_all_instruction_sets!(test_call);
}
