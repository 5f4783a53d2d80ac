// Copyright (c) the rjpeg Authors. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

#![allow(unsafe_code)]

#[cfg(feature = "avx")]
pub(super) mod avx;
#[cfg(feature = "sse42")]
pub(super) mod sse42;

#[macro_export]
macro_rules! test_all_instruction_sets {
    (
        $name:ident
    ) => {
        paste::paste! {
            #[test]
            fn [<$name _scalar>]() {
                use $crate::SimdDescriptor;
                $name($crate::ScalarDescriptor::new().unwrap())
            }
            #[cfg(feature = "sse42")]
            #[allow(unsafe_code)]
            #[test]
            fn [<$name _sse42>]() {
                use $crate::SimdDescriptor;
                let Some(d) = $crate::Sse42Descriptor::new() else { return; };
                #[target_feature(enable = "sse4.2")]
                fn inner(d: $crate::Sse42Descriptor) {
                    $name(d)
                }
                // SAFETY: we just checked for sse4.2.
                return unsafe { inner(d) };
            }
            #[cfg(feature = "avx")]
            #[allow(unsafe_code)]
            #[test]
            fn [<$name _avx>]() {
                use $crate::SimdDescriptor;
                let Some(d) = $crate::AvxDescriptor::new() else { return; };
                #[target_feature(enable = "avx2")]
                fn inner(d: $crate::AvxDescriptor) {
                    $name(d)
                }
                // SAFETY: we just checked for avx2.
                return unsafe { inner(d) };
            }
        }
    };
}

#[macro_export]
macro_rules! bench_all_instruction_sets {
    (
        $name:ident,
        $criterion:ident
    ) => {
        use $crate::SimdDescriptor;
        #[cfg(feature = "avx")]
        if let Some(d) = $crate::AvxDescriptor::new() {
            #[target_feature(enable = "avx2")]
            fn inner(
                d: $crate::AvxDescriptor,
                criterion: &mut ::criterion::BenchmarkGroup<
                    '_,
                    impl ::criterion::measurement::Measurement,
                >,
                name: &str,
            ) {
                $name(d, criterion, name)
            }
            // SAFETY: we just checked for avx2.
            unsafe { inner(d, $criterion, "avx") };
        }
        #[cfg(feature = "sse42")]
        if let Some(d) = $crate::Sse42Descriptor::new() {
            #[target_feature(enable = "sse4.2")]
            fn inner(
                d: $crate::Sse42Descriptor,
                criterion: &mut ::criterion::BenchmarkGroup<
                    '_,
                    impl ::criterion::measurement::Measurement,
                >,
                name: &str,
            ) {
                $name(d, criterion, name)
            }
            // SAFETY: we just checked for sse4.2.
            unsafe { inner(d, $criterion, "sse42") };
        }
        $name(
            $crate::ScalarDescriptor::new().unwrap(),
            $criterion,
            "scalar",
        );
    };
}
