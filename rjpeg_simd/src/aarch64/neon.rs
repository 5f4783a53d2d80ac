// Copyright (c) the rjpeg Authors. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

use super::super::{F32SimdVec, I32SimdVec, SimdDescriptor};
use std::{
    arch::aarch64::*,
    ops::{Add, AddAssign, Div, Mul, MulAssign, Sub, SubAssign},
};

// Safety invariant: this type is only ever constructed if neon is available.
#[derive(Clone, Copy, Debug)]
pub struct NeonDescriptor(());

impl NeonDescriptor {
    /// # Safety
    /// The caller must guarantee that the neon target feature is available.
    pub unsafe fn new_unchecked() -> Self {
        Self(())
    }
}

impl SimdDescriptor for NeonDescriptor {
    type F32Vec = F32VecNeon;
    type I32Vec = I32VecNeon;

    fn new() -> Option<Self> {
        if std::arch::is_aarch64_feature_detected!("neon") {
            // SAFETY: we just checked neon.
            Some(unsafe { Self::new_unchecked() })
        } else {
            None
        }
    }

    fn call<R>(self, f: impl FnOnce(Self) -> R) -> R {
        #[target_feature(enable = "neon")]
        #[inline(never)]
        unsafe fn inner<R>(d: NeonDescriptor, f: impl FnOnce(NeonDescriptor) -> R) -> R {
            f(d)
        }
        // SAFETY: the safety invariant on `self` guarantees neon.
        unsafe { inner(self, f) }
    }
}

macro_rules! fn_neon {
    (
        $this:ident: $self_ty:ty,
        fn $name:ident($($arg:ident: $ty:ty),* $(,)?) $(-> $ret:ty )? $body: block) => {
        #[inline(always)]
        fn $name(self: $self_ty, $($arg: $ty),*) $(-> $ret)? {
            #[target_feature(enable = "neon")]
            #[inline]
            fn inner($this: $self_ty, $($arg: $ty),*) $(-> $ret)? {
                $body
            }
            // SAFETY: `self.1` is constructed iff neon is available.
            unsafe { inner(self, $($arg),*) }
        }
    };
}

#[derive(Clone, Copy, Debug)]
pub struct F32VecNeon(float32x4_t, NeonDescriptor);

#[derive(Clone, Copy, Debug)]
pub struct I32VecNeon(int32x4_t, NeonDescriptor);

impl F32SimdVec for F32VecNeon {
    type Descriptor = NeonDescriptor;

    const LEN: usize = 4;

    #[inline(always)]
    fn splat(d: Self::Descriptor, v: f32) -> Self {
        // SAFETY: we know neon is available from the safety invariant on `d`.
        Self(unsafe { vdupq_n_f32(v) }, d)
    }

    #[inline(always)]
    fn load(d: Self::Descriptor, mem: &[f32]) -> Self {
        assert!(mem.len() >= Self::LEN);
        // SAFETY: we just checked that `mem` has enough space. Moreover, we
        // know neon is available from the safety invariant on `d`.
        Self(unsafe { vld1q_f32(mem.as_ptr()) }, d)
    }

    #[inline(always)]
    fn store(&self, mem: &mut [f32]) {
        assert!(mem.len() >= Self::LEN);
        // SAFETY: we just checked that `mem` has enough space. Moreover, we
        // know neon is available from the safety invariant on `self.1`.
        unsafe { vst1q_f32(mem.as_mut_ptr(), self.0) }
    }

    fn_neon!(this: F32VecNeon, fn min(other: F32VecNeon) -> F32VecNeon {
        F32VecNeon(vminq_f32(this.0, other.0), this.1)
    });

    fn_neon!(this: F32VecNeon, fn max(other: F32VecNeon) -> F32VecNeon {
        F32VecNeon(vmaxq_f32(this.0, other.0), this.1)
    });
}

impl Add for F32VecNeon {
    type Output = Self;
    fn_neon!(this: F32VecNeon, fn add(rhs: F32VecNeon) -> F32VecNeon {
        F32VecNeon(vaddq_f32(this.0, rhs.0), this.1)
    });
}

impl Sub for F32VecNeon {
    type Output = Self;
    fn_neon!(this: F32VecNeon, fn sub(rhs: F32VecNeon) -> F32VecNeon {
        F32VecNeon(vsubq_f32(this.0, rhs.0), this.1)
    });
}

impl Mul for F32VecNeon {
    type Output = Self;
    fn_neon!(this: F32VecNeon, fn mul(rhs: F32VecNeon) -> F32VecNeon {
        F32VecNeon(vmulq_f32(this.0, rhs.0), this.1)
    });
}

impl Div for F32VecNeon {
    type Output = Self;
    fn_neon!(this: F32VecNeon, fn div(rhs: F32VecNeon) -> F32VecNeon {
        F32VecNeon(vdivq_f32(this.0, rhs.0), this.1)
    });
}

impl AddAssign for F32VecNeon {
    #[inline(always)]
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl SubAssign for F32VecNeon {
    #[inline(always)]
    fn sub_assign(&mut self, rhs: Self) {
        *self = *self - rhs;
    }
}

impl MulAssign for F32VecNeon {
    #[inline(always)]
    fn mul_assign(&mut self, rhs: Self) {
        *self = *self * rhs;
    }
}

impl I32SimdVec for I32VecNeon {
    type Descriptor = NeonDescriptor;

    const LEN: usize = 4;

    #[inline(always)]
    fn splat(d: Self::Descriptor, v: i32) -> Self {
        // SAFETY: we know neon is available from the safety invariant on `d`.
        Self(unsafe { vdupq_n_s32(v) }, d)
    }

    #[inline(always)]
    fn load(d: Self::Descriptor, mem: &[i32]) -> Self {
        assert!(mem.len() >= Self::LEN);
        // SAFETY: we just checked that `mem` has enough space. Moreover, we
        // know neon is available from the safety invariant on `d`.
        Self(unsafe { vld1q_s32(mem.as_ptr()) }, d)
    }

    #[inline(always)]
    fn store(&self, mem: &mut [i32]) {
        assert!(mem.len() >= Self::LEN);
        // SAFETY: we just checked that `mem` has enough space. Moreover, we
        // know neon is available from the safety invariant on `self.1`.
        unsafe { vst1q_s32(mem.as_mut_ptr(), self.0) }
    }

    #[inline(always)]
    fn shl<const AMOUNT: i32>(self) -> Self {
        #[target_feature(enable = "neon")]
        #[inline]
        fn inner<const AMOUNT: i32>(v: int32x4_t) -> int32x4_t {
            vshlq_n_s32::<AMOUNT>(v)
        }
        // SAFETY: `self.1` is constructed iff neon is available.
        Self(unsafe { inner::<AMOUNT>(self.0) }, self.1)
    }

    #[inline(always)]
    fn shr<const AMOUNT: i32>(self) -> Self {
        #[target_feature(enable = "neon")]
        #[inline]
        fn inner<const AMOUNT: i32>(v: int32x4_t) -> int32x4_t {
            vshrq_n_s32::<AMOUNT>(v)
        }
        // SAFETY: `self.1` is constructed iff neon is available.
        Self(unsafe { inner::<AMOUNT>(self.0) }, self.1)
    }

    fn_neon!(this: I32VecNeon, fn min(other: I32VecNeon) -> I32VecNeon {
        I32VecNeon(vminq_s32(this.0, other.0), this.1)
    });

    fn_neon!(this: I32VecNeon, fn max(other: I32VecNeon) -> I32VecNeon {
        I32VecNeon(vmaxq_s32(this.0, other.0), this.1)
    });
}

impl Add for I32VecNeon {
    type Output = Self;
    fn_neon!(this: I32VecNeon, fn add(rhs: I32VecNeon) -> I32VecNeon {
        I32VecNeon(vaddq_s32(this.0, rhs.0), this.1)
    });
}

impl Sub for I32VecNeon {
    type Output = Self;
    fn_neon!(this: I32VecNeon, fn sub(rhs: I32VecNeon) -> I32VecNeon {
        I32VecNeon(vsubq_s32(this.0, rhs.0), this.1)
    });
}

impl Mul for I32VecNeon {
    type Output = Self;
    fn_neon!(this: I32VecNeon, fn mul(rhs: I32VecNeon) -> I32VecNeon {
        I32VecNeon(vmulq_s32(this.0, rhs.0), this.1)
    });
}

impl AddAssign for I32VecNeon {
    #[inline(always)]
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl SubAssign for I32VecNeon {
    #[inline(always)]
    fn sub_assign(&mut self, rhs: Self) {
        *self = *self - rhs;
    }
}

impl MulAssign for I32VecNeon {
    #[inline(always)]
    fn mul_assign(&mut self, rhs: Self) {
        *self = *self * rhs;
    }
}
