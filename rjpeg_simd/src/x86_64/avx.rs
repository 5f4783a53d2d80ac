// Copyright (c) the rjpeg Authors. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

use super::super::{F32SimdVec, I32SimdVec, SimdDescriptor};
use std::{
    arch::x86_64::*,
    ops::{Add, AddAssign, Div, Mul, MulAssign, Sub, SubAssign},
};

// Safety invariant: this type is only ever constructed if avx2 is available.
#[derive(Clone, Copy, Debug)]
pub struct AvxDescriptor(());

impl AvxDescriptor {
    /// # Safety
    /// The caller must guarantee that the avx2 target feature is available.
    pub unsafe fn new_unchecked() -> Self {
        Self(())
    }
}

impl SimdDescriptor for AvxDescriptor {
    type F32Vec = F32VecAvx;
    type I32Vec = I32VecAvx;

    fn new() -> Option<Self> {
        if is_x86_feature_detected!("avx2") {
            // SAFETY: we just checked avx2.
            Some(unsafe { Self::new_unchecked() })
        } else {
            None
        }
    }

    fn call<R>(self, f: impl FnOnce(Self) -> R) -> R {
        #[target_feature(enable = "avx2")]
        #[inline(never)]
        unsafe fn inner<R>(d: AvxDescriptor, f: impl FnOnce(AvxDescriptor) -> R) -> R {
            f(d)
        }
        // SAFETY: the safety invariant on `self` guarantees avx2.
        unsafe { inner(self, f) }
    }
}

macro_rules! fn_avx {
    (
        $this:ident: $self_ty:ty,
        fn $name:ident($($arg:ident: $ty:ty),* $(,)?) $(-> $ret:ty )? $body: block) => {
        #[inline(always)]
        fn $name(self: $self_ty, $($arg: $ty),*) $(-> $ret)? {
            #[target_feature(enable = "avx2")]
            #[inline]
            fn inner($this: $self_ty, $($arg: $ty),*) $(-> $ret)? {
                $body
            }
            // SAFETY: `self.1` is constructed iff avx2 is available.
            unsafe { inner(self, $($arg),*) }
        }
    };
}

#[derive(Clone, Copy, Debug)]
pub struct F32VecAvx(__m256, AvxDescriptor);

#[derive(Clone, Copy, Debug)]
pub struct I32VecAvx(__m256i, AvxDescriptor);

impl F32SimdVec for F32VecAvx {
    type Descriptor = AvxDescriptor;

    const LEN: usize = 8;

    #[inline(always)]
    fn splat(d: Self::Descriptor, v: f32) -> Self {
        // SAFETY: we know avx2 is available from the safety invariant on `d`.
        Self(unsafe { _mm256_set1_ps(v) }, d)
    }

    #[inline(always)]
    fn load(d: Self::Descriptor, mem: &[f32]) -> Self {
        assert!(mem.len() >= Self::LEN);
        // SAFETY: we just checked that `mem` has enough space. Moreover, we
        // know avx2 is available from the safety invariant on `d`.
        Self(unsafe { _mm256_loadu_ps(mem.as_ptr()) }, d)
    }

    #[inline(always)]
    fn store(&self, mem: &mut [f32]) {
        assert!(mem.len() >= Self::LEN);
        // SAFETY: we just checked that `mem` has enough space. Moreover, we
        // know avx2 is available from the safety invariant on `self.1`.
        unsafe { _mm256_storeu_ps(mem.as_mut_ptr(), self.0) }
    }

    fn_avx!(this: F32VecAvx, fn min(other: F32VecAvx) -> F32VecAvx {
        F32VecAvx(_mm256_min_ps(this.0, other.0), this.1)
    });

    fn_avx!(this: F32VecAvx, fn max(other: F32VecAvx) -> F32VecAvx {
        F32VecAvx(_mm256_max_ps(this.0, other.0), this.1)
    });
}

impl Add for F32VecAvx {
    type Output = Self;
    fn_avx!(this: F32VecAvx, fn add(rhs: F32VecAvx) -> F32VecAvx {
        F32VecAvx(_mm256_add_ps(this.0, rhs.0), this.1)
    });
}

impl Sub for F32VecAvx {
    type Output = Self;
    fn_avx!(this: F32VecAvx, fn sub(rhs: F32VecAvx) -> F32VecAvx {
        F32VecAvx(_mm256_sub_ps(this.0, rhs.0), this.1)
    });
}

impl Mul for F32VecAvx {
    type Output = Self;
    fn_avx!(this: F32VecAvx, fn mul(rhs: F32VecAvx) -> F32VecAvx {
        F32VecAvx(_mm256_mul_ps(this.0, rhs.0), this.1)
    });
}

impl Div for F32VecAvx {
    type Output = Self;
    fn_avx!(this: F32VecAvx, fn div(rhs: F32VecAvx) -> F32VecAvx {
        F32VecAvx(_mm256_div_ps(this.0, rhs.0), this.1)
    });
}

impl AddAssign for F32VecAvx {
    #[inline(always)]
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl SubAssign for F32VecAvx {
    #[inline(always)]
    fn sub_assign(&mut self, rhs: Self) {
        *self = *self - rhs;
    }
}

impl MulAssign for F32VecAvx {
    #[inline(always)]
    fn mul_assign(&mut self, rhs: Self) {
        *self = *self * rhs;
    }
}

impl I32SimdVec for I32VecAvx {
    type Descriptor = AvxDescriptor;

    const LEN: usize = 8;

    #[inline(always)]
    fn splat(d: Self::Descriptor, v: i32) -> Self {
        // SAFETY: we know avx2 is available from the safety invariant on `d`.
        Self(unsafe { _mm256_set1_epi32(v) }, d)
    }

    #[inline(always)]
    fn load(d: Self::Descriptor, mem: &[i32]) -> Self {
        assert!(mem.len() >= Self::LEN);
        // SAFETY: we just checked that `mem` has enough space. Moreover, we
        // know avx2 is available from the safety invariant on `d`.
        Self(
            unsafe { _mm256_loadu_si256(mem.as_ptr() as *const __m256i) },
            d,
        )
    }

    #[inline(always)]
    fn store(&self, mem: &mut [i32]) {
        assert!(mem.len() >= Self::LEN);
        // SAFETY: we just checked that `mem` has enough space. Moreover, we
        // know avx2 is available from the safety invariant on `self.1`.
        unsafe { _mm256_storeu_si256(mem.as_mut_ptr() as *mut __m256i, self.0) }
    }

    #[inline(always)]
    fn shl<const AMOUNT: i32>(self) -> Self {
        #[target_feature(enable = "avx2")]
        #[inline]
        fn inner<const AMOUNT: i32>(v: __m256i) -> __m256i {
            _mm256_slli_epi32::<AMOUNT>(v)
        }
        // SAFETY: `self.1` is constructed iff avx2 is available.
        Self(unsafe { inner::<AMOUNT>(self.0) }, self.1)
    }

    #[inline(always)]
    fn shr<const AMOUNT: i32>(self) -> Self {
        #[target_feature(enable = "avx2")]
        #[inline]
        fn inner<const AMOUNT: i32>(v: __m256i) -> __m256i {
            _mm256_srai_epi32::<AMOUNT>(v)
        }
        // SAFETY: `self.1` is constructed iff avx2 is available.
        Self(unsafe { inner::<AMOUNT>(self.0) }, self.1)
    }

    fn_avx!(this: I32VecAvx, fn min(other: I32VecAvx) -> I32VecAvx {
        I32VecAvx(_mm256_min_epi32(this.0, other.0), this.1)
    });

    fn_avx!(this: I32VecAvx, fn max(other: I32VecAvx) -> I32VecAvx {
        I32VecAvx(_mm256_max_epi32(this.0, other.0), this.1)
    });
}

impl Add for I32VecAvx {
    type Output = Self;
    fn_avx!(this: I32VecAvx, fn add(rhs: I32VecAvx) -> I32VecAvx {
        I32VecAvx(_mm256_add_epi32(this.0, rhs.0), this.1)
    });
}

impl Sub for I32VecAvx {
    type Output = Self;
    fn_avx!(this: I32VecAvx, fn sub(rhs: I32VecAvx) -> I32VecAvx {
        I32VecAvx(_mm256_sub_epi32(this.0, rhs.0), this.1)
    });
}

impl Mul for I32VecAvx {
    type Output = Self;
    fn_avx!(this: I32VecAvx, fn mul(rhs: I32VecAvx) -> I32VecAvx {
        I32VecAvx(_mm256_mullo_epi32(this.0, rhs.0), this.1)
    });
}

impl AddAssign for I32VecAvx {
    #[inline(always)]
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl SubAssign for I32VecAvx {
    #[inline(always)]
    fn sub_assign(&mut self, rhs: Self) {
        *self = *self - rhs;
    }
}

impl MulAssign for I32VecAvx {
    #[inline(always)]
    fn mul_assign(&mut self, rhs: Self) {
        *self = *self * rhs;
    }
}
