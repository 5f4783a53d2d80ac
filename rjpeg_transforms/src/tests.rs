// Copyright (c) the rjpeg Authors. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

use super::*;
use crate::fdct::{forward_dct_float, forward_dct_ifast, forward_dct_islow};
use crate::idct::{idct_float, idct_ifast, idct_islow};
use crate::idct_scaled::{idct_12x12, idct_2x2, idct_4x4, idct_6x6};
use crate::quant::{
    convsamp, convsamp_float, float_dequant, float_divisors, ifast_dequant, ifast_divisors,
    islow_dequant, islow_divisors, quantize, quantize_float, QuantTableError, ReciprocalTable,
};
use rjpeg_simd::{test_all_instruction_sets, ScalarDescriptor, SimdDescriptor};
use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha12Rng;
use test_log::test;

use std::f64::consts::{PI, SQRT_2};

#[inline(always)]
fn alpha(u: usize) -> f64 {
    if u == 0 {
        1.0
    } else {
        SQRT_2
    }
}

/// Reference forward DCT with the JPEG normalization: `islow` output equals
/// 8x this, before quantization.
fn reference_fdct(samples: &[f64; DCTSIZE2]) -> [f64; DCTSIZE2] {
    let mut out = [0.0; DCTSIZE2];
    for v in 0..DCTSIZE {
        for u in 0..DCTSIZE {
            let mut sum = 0.0;
            for y in 0..DCTSIZE {
                for x in 0..DCTSIZE {
                    sum += samples[y * DCTSIZE + x]
                        * ((2 * x + 1) as f64 * u as f64 * PI / 16.0).cos()
                        * ((2 * y + 1) as f64 * v as f64 * PI / 16.0).cos();
                }
            }
            out[v * DCTSIZE + u] = sum * alpha(u) * alpha(v) / 8.0;
        }
    }
    out
}

/// Reference inverse transform producing an NxN spatial block from the first
/// K frequencies in each direction, with the 1/8 JPEG output normalization
/// and no level shift. With `N = K = 8` this is the exact inverse of
/// [`reference_fdct`].
fn reference_idct(coefs: &[f64; DCTSIZE2], n: usize, k: usize) -> Vec<f64> {
    let mut out = vec![0.0; n * n];
    for y in 0..n {
        for x in 0..n {
            let mut sum = 0.0;
            for v in 0..k {
                for u in 0..k {
                    sum += coefs[v * DCTSIZE + u]
                        * alpha(u)
                        * alpha(v)
                        * ((2 * x + 1) as f64 * u as f64 * PI / (2 * n) as f64).cos()
                        * ((2 * y + 1) as f64 * v as f64 * PI / (2 * n) as f64).cos();
                }
            }
            out[y * n + x] = sum / 8.0;
        }
    }
    out
}

/// Reference for the 2x2 and 4x4 kernels: those compute the box average of
/// the full-size reconstruction over 8/N x 8/N tiles.
fn reference_idct_boxed(coefs: &[f64; DCTSIZE2], n: usize) -> Vec<f64> {
    let full = reference_idct(coefs, DCTSIZE, DCTSIZE);
    let step = DCTSIZE / n;
    let mut out = vec![0.0; n * n];
    for y in 0..n {
        for x in 0..n {
            let mut sum = 0.0;
            for dy in 0..step {
                for dx in 0..step {
                    sum += full[(y * step + dy) * DCTSIZE + x * step + dx];
                }
            }
            out[y * n + x] = sum / (step * step) as f64;
        }
    }
    out
}

#[track_caller]
fn check_close(a: f64, b: f64, max_err: f64) {
    let abs = (a - b).abs();
    assert!(abs <= max_err, "a: {a} b: {b} abs diff: {abs:?}");
}

fn random_samples(rng: &mut ChaCha12Rng) -> [u8; DCTSIZE2] {
    let mut samples = [0u8; DCTSIZE2];
    for s in samples.iter_mut() {
        *s = rng.random_range(0..=255);
    }
    samples
}

fn sample_rows(samples: &[u8; DCTSIZE2]) -> [&[u8]; DCTSIZE] {
    let mut rows: [&[u8]; DCTSIZE] = [&[]; DCTSIZE];
    for (r, row) in rows.iter_mut().enumerate() {
        *row = &samples[r * DCTSIZE..][..DCTSIZE];
    }
    rows
}

fn centered(samples: &[u8; DCTSIZE2]) -> [f64; DCTSIZE2] {
    let mut out = [0.0; DCTSIZE2];
    for (o, &s) in out.iter_mut().zip(samples.iter()) {
        *o = s as f64 - 128.0;
    }
    out
}

/// Runs an NxN-output inverse kernel into a flat pixel buffer.
fn run_idct<F>(kernel: F, n: usize) -> Vec<u8>
where
    F: FnOnce(&mut [&mut [u8]], usize),
{
    let mut pixels = vec![0u8; n * n];
    let mut rows: Vec<&mut [u8]> = pixels.chunks_mut(n).collect();
    kernel(&mut rows, 0);
    pixels
}

fn forward_islow_matches_reference<D: SimdDescriptor>(d: D) {
    let mut rng = ChaCha12Rng::seed_from_u64(0x1d5);
    for _ in 0..50 {
        let samples = random_samples(&mut rng);
        let mut ws = [0i32; DCTSIZE2];
        convsamp(&sample_rows(&samples), 0, &mut ws);
        forward_dct_islow(d, &mut ws);

        let expected = reference_fdct(&centered(&samples));
        for (got, want) in ws.iter().zip(expected.iter()) {
            check_close(*got as f64, want * 8.0, 12.0);
        }
    }
}
test_all_instruction_sets!(forward_islow_matches_reference);

fn forward_float_quantized_matches_reference<D: SimdDescriptor>(d: D) {
    let divisors = float_divisors(&[1u16; DCTSIZE2]).unwrap();
    let mut rng = ChaCha12Rng::seed_from_u64(0xf10a7);
    for _ in 0..50 {
        let samples = random_samples(&mut rng);
        let mut ws = [0f32; DCTSIZE2];
        convsamp_float(&sample_rows(&samples), 0, &mut ws);
        forward_dct_float(d, &mut ws);
        let mut coefs = [0i16; DCTSIZE2];
        quantize_float(d, &mut coefs, &divisors, &ws);

        let expected = reference_fdct(&centered(&samples));
        for (got, want) in coefs.iter().zip(expected.iter()) {
            check_close(*got as f64, *want, 1.0);
        }
    }
}
test_all_instruction_sets!(forward_float_quantized_matches_reference);

fn forward_ifast_quantized_matches_reference<D: SimdDescriptor>(d: D) {
    // A moderate quantizer keeps the truncation error of the fast flow well
    // under two quantization steps.
    let quantvals = [16u16; DCTSIZE2];
    let divisors = ifast_divisors(&quantvals).unwrap();
    let mut rng = ChaCha12Rng::seed_from_u64(0x1fa57);
    for _ in 0..50 {
        let samples = random_samples(&mut rng);
        let mut ws = [0i32; DCTSIZE2];
        convsamp(&sample_rows(&samples), 0, &mut ws);
        forward_dct_ifast(d, &mut ws);
        let mut coefs = [0i16; DCTSIZE2];
        quantize(&mut coefs, &divisors, &ws);

        let expected = reference_fdct(&centered(&samples));
        for (got, want) in coefs.iter().zip(expected.iter()) {
            check_close(*got as f64, want / 16.0, 2.0);
        }
    }
}
test_all_instruction_sets!(forward_ifast_quantized_matches_reference);

fn roundtrip_islow<D: SimdDescriptor>(d: D) {
    let quantvals = [1u16; DCTSIZE2];
    let divisors = islow_divisors(&quantvals).unwrap();
    let dequant = islow_dequant(&quantvals);
    let mut rng = ChaCha12Rng::seed_from_u64(0x0157);
    for _ in 0..50 {
        let samples = random_samples(&mut rng);
        let mut ws = [0i32; DCTSIZE2];
        convsamp(&sample_rows(&samples), 0, &mut ws);
        forward_dct_islow(d, &mut ws);
        let mut coefs = [0i16; DCTSIZE2];
        quantize(&mut coefs, &divisors, &ws);

        let pixels = run_idct(
            |rows, col| idct_islow(d, &dequant, &coefs, rows, col),
            DCTSIZE,
        );
        for (got, want) in pixels.iter().zip(samples.iter()) {
            check_close(*got as f64, *want as f64, 3.0);
        }
    }
}
test_all_instruction_sets!(roundtrip_islow);

fn roundtrip_float<D: SimdDescriptor>(d: D) {
    let quantvals = [1u16; DCTSIZE2];
    let divisors = float_divisors(&quantvals).unwrap();
    let dequant = float_dequant(&quantvals);
    let mut rng = ChaCha12Rng::seed_from_u64(0xf2157);
    for _ in 0..50 {
        let samples = random_samples(&mut rng);
        let mut ws = [0f32; DCTSIZE2];
        convsamp_float(&sample_rows(&samples), 0, &mut ws);
        forward_dct_float(d, &mut ws);
        let mut coefs = [0i16; DCTSIZE2];
        quantize_float(d, &mut coefs, &divisors, &ws);

        let pixels = run_idct(
            |rows, col| idct_float(d, &dequant, &coefs, rows, col),
            DCTSIZE,
        );
        for (got, want) in pixels.iter().zip(samples.iter()) {
            check_close(*got as f64, *want as f64, 2.0);
        }
    }
}
test_all_instruction_sets!(roundtrip_float);

fn random_coefs(rng: &mut ChaCha12Rng, limit: i16) -> [i16; DCTSIZE2] {
    let mut coefs = [0i16; DCTSIZE2];
    for c in coefs.iter_mut() {
        *c = rng.random_range(-limit..=limit);
    }
    coefs
}

fn inverse_islow_matches_reference<D: SimdDescriptor>(d: D) {
    let dequant = islow_dequant(&[2u16; DCTSIZE2]);
    let mut rng = ChaCha12Rng::seed_from_u64(0x1dc7);
    for _ in 0..50 {
        let coefs = random_coefs(&mut rng, 512);
        let mut dequantized = [0.0; DCTSIZE2];
        for (o, (&c, &q)) in dequantized.iter_mut().zip(coefs.iter().zip(dequant.iter())) {
            *o = c as f64 * q as f64;
        }
        let expected = reference_idct(&dequantized, DCTSIZE, DCTSIZE);

        let pixels = run_idct(
            |rows, col| idct_islow(d, &dequant, &coefs, rows, col),
            DCTSIZE,
        );
        for (got, want) in pixels.iter().zip(expected.iter()) {
            check_close(*got as f64, (want + 128.0).clamp(0.0, 255.0), 2.5);
        }
    }
}
test_all_instruction_sets!(inverse_islow_matches_reference);

fn inverse_ifast_matches_reference<D: SimdDescriptor>(d: D) {
    let quantvals = [16u16; DCTSIZE2];
    let dequant = ifast_dequant(&quantvals);
    let mut rng = ChaCha12Rng::seed_from_u64(0x1fa57);
    for _ in 0..50 {
        // Small coefficients: the 8-bit constants of the fast flow lose
        // precision proportionally to the working magnitude.
        let coefs = random_coefs(&mut rng, 15);
        // The kernel's effective input is the rounded multiplier table, so
        // the reference must use it too: the fast dequantizer folds in
        // 4 * aan[row] * aan[col].
        let mut dequantized = [0.0; DCTSIZE2];
        for (i, (o, (&c, &q))) in dequantized
            .iter_mut()
            .zip(coefs.iter().zip(dequant.iter()))
            .enumerate()
        {
            let aan2d = AAN_SCALE_FACTORS[i / DCTSIZE] * AAN_SCALE_FACTORS[i % DCTSIZE];
            *o = c as f64 * q as f64 / (4.0 * aan2d);
        }
        let expected = reference_idct(&dequantized, DCTSIZE, DCTSIZE);

        let pixels = run_idct(
            |rows, col| idct_ifast(d, &dequant, &coefs, rows, col),
            DCTSIZE,
        );
        for (got, want) in pixels.iter().zip(expected.iter()) {
            check_close(*got as f64, (want + 128.0).clamp(0.0, 255.0), 4.0);
        }
    }
}
test_all_instruction_sets!(inverse_ifast_matches_reference);

fn inverse_float_matches_reference<D: SimdDescriptor>(d: D) {
    let dequant = float_dequant(&[2u16; DCTSIZE2]);
    let mut rng = ChaCha12Rng::seed_from_u64(0xf2dc7);
    for _ in 0..50 {
        let coefs = random_coefs(&mut rng, 512);
        let mut dequantized = [0.0; DCTSIZE2];
        for (i, (o, &c)) in dequantized.iter_mut().zip(coefs.iter()).enumerate() {
            let aan2d = AAN_SCALE_FACTORS[i / DCTSIZE] * AAN_SCALE_FACTORS[i % DCTSIZE];
            // The float table folds in aan2d / 8; undo everything but the
            // plain quantizer to recover the coefficient value.
            *o = c as f64 * dequant[i] as f64 * 8.0 / aan2d;
        }
        let expected = reference_idct(&dequantized, DCTSIZE, DCTSIZE);

        let pixels = run_idct(
            |rows, col| idct_float(d, &dequant, &coefs, rows, col),
            DCTSIZE,
        );
        for (got, want) in pixels.iter().zip(expected.iter()) {
            check_close(*got as f64, (want + 128.0).clamp(0.0, 255.0), 1.0);
        }
    }
}
test_all_instruction_sets!(inverse_float_matches_reference);

/// A dequantization table that zeroes every AC coefficient makes the full
/// butterfly network see the same input as the DC-only shortcut, so the two
/// paths must produce identical pixels.
fn dc_shortcut_matches_full_network<D: SimdDescriptor>(d: D) {
    let mut ac_killed = islow_dequant(&[3u16; DCTSIZE2]);
    for q in ac_killed.iter_mut().skip(1) {
        *q = 0;
    }
    let mut rng = ChaCha12Rng::seed_from_u64(0xdc0);
    for _ in 0..100 {
        let dc: i16 = rng.random_range(-1024..=1024);

        // AC coefficients present, but dequantized to zero: full path.
        let mut coefs = random_coefs(&mut rng, 255);
        coefs[0] = dc;
        let full = run_idct(
            |rows, col| idct_islow(d, &ac_killed, &coefs, rows, col),
            DCTSIZE,
        );

        // No AC coefficients at all: shortcut path.
        let mut dc_only = [0i16; DCTSIZE2];
        dc_only[0] = dc;
        let shortcut = run_idct(
            |rows, col| idct_islow(d, &ac_killed, &dc_only, rows, col),
            DCTSIZE,
        );

        assert_eq!(full, shortcut, "dc: {dc}");
    }
}
test_all_instruction_sets!(dc_shortcut_matches_full_network);

fn dc_shortcut_matches_full_network_ifast<D: SimdDescriptor>(d: D) {
    let mut ac_killed = ifast_dequant(&[3u16; DCTSIZE2]);
    for q in ac_killed.iter_mut().skip(1) {
        *q = 0;
    }
    let mut rng = ChaCha12Rng::seed_from_u64(0xdc1);
    for _ in 0..100 {
        let dc: i16 = rng.random_range(-1024..=1024);
        let mut coefs = random_coefs(&mut rng, 255);
        coefs[0] = dc;
        let full = run_idct(
            |rows, col| idct_ifast(d, &ac_killed, &coefs, rows, col),
            DCTSIZE,
        );
        let mut dc_only = [0i16; DCTSIZE2];
        dc_only[0] = dc;
        let shortcut = run_idct(
            |rows, col| idct_ifast(d, &ac_killed, &dc_only, rows, col),
            DCTSIZE,
        );
        assert_eq!(full, shortcut, "dc: {dc}");
    }
}
test_all_instruction_sets!(dc_shortcut_matches_full_network_ifast);

fn dc_shortcut_matches_full_network_float<D: SimdDescriptor>(d: D) {
    let mut ac_killed = float_dequant(&[3u16; DCTSIZE2]);
    for q in ac_killed.iter_mut().skip(1) {
        *q = 0.0;
    }
    let mut rng = ChaCha12Rng::seed_from_u64(0xdc2);
    for _ in 0..100 {
        let dc: i16 = rng.random_range(-1024..=1024);
        let mut coefs = random_coefs(&mut rng, 255);
        coefs[0] = dc;
        let full = run_idct(
            |rows, col| idct_float(d, &ac_killed, &coefs, rows, col),
            DCTSIZE,
        );
        let mut dc_only = [0i16; DCTSIZE2];
        dc_only[0] = dc;
        let shortcut = run_idct(
            |rows, col| idct_float(d, &ac_killed, &dc_only, rows, col),
            DCTSIZE,
        );
        assert_eq!(full, shortcut, "dc: {dc}");
    }
}
test_all_instruction_sets!(dc_shortcut_matches_full_network_float);

#[test]
fn dc_shortcut_matches_full_network_reduced() {
    type Kernel = fn(&[i32; DCTSIZE2], &[i16; DCTSIZE2], &mut [&mut [u8]], usize);
    let kernels: [(Kernel, usize); 4] = [
        (idct_2x2, 2),
        (idct_4x4, 4),
        (idct_6x6, 6),
        (idct_12x12, 12),
    ];
    let mut ac_killed = islow_dequant(&[3u16; DCTSIZE2]);
    for q in ac_killed.iter_mut().skip(1) {
        *q = 0;
    }
    let mut rng = ChaCha12Rng::seed_from_u64(0xdc3);
    for (kernel, n) in kernels {
        for _ in 0..100 {
            let dc: i16 = rng.random_range(-1024..=1024);
            let mut coefs = random_coefs(&mut rng, 255);
            coefs[0] = dc;
            let full = run_idct(|rows, col| kernel(&ac_killed, &coefs, rows, col), n);
            let mut dc_only = [0i16; DCTSIZE2];
            dc_only[0] = dc;
            let shortcut = run_idct(|rows, col| kernel(&ac_killed, &dc_only, rows, col), n);
            assert_eq!(full, shortcut, "n: {n} dc: {dc}");
        }
    }
}

#[test]
fn reduced_2x2_matches_reference() {
    let dequant = islow_dequant(&[2u16; DCTSIZE2]);
    let mut rng = ChaCha12Rng::seed_from_u64(0x22);
    for _ in 0..50 {
        let coefs = random_coefs(&mut rng, 512);
        let mut dequantized = [0.0; DCTSIZE2];
        for (o, (&c, &q)) in dequantized.iter_mut().zip(coefs.iter().zip(dequant.iter())) {
            *o = c as f64 * q as f64;
        }
        let expected = reference_idct_boxed(&dequantized, 2);
        let pixels = run_idct(|rows, col| idct_2x2(&dequant, &coefs, rows, col), 2);
        for (got, want) in pixels.iter().zip(expected.iter()) {
            check_close(*got as f64, (want + 128.0).clamp(0.0, 255.0), 2.5);
        }
    }
}

#[test]
fn reduced_4x4_matches_reference() {
    let dequant = islow_dequant(&[2u16; DCTSIZE2]);
    let mut rng = ChaCha12Rng::seed_from_u64(0x44);
    for _ in 0..50 {
        let coefs = random_coefs(&mut rng, 512);
        let mut dequantized = [0.0; DCTSIZE2];
        for (o, (&c, &q)) in dequantized.iter_mut().zip(coefs.iter().zip(dequant.iter())) {
            *o = c as f64 * q as f64;
        }
        // Frequency 4 does not contribute to the half-size reconstruction:
        // its basis function is zero at the sampled positions.
        for u in 0..DCTSIZE {
            dequantized[4 * DCTSIZE + u] = 0.0;
            dequantized[u * DCTSIZE + 4] = 0.0;
        }
        let expected = reference_idct_boxed(&dequantized, 4);
        let pixels = run_idct(|rows, col| idct_4x4(&dequant, &coefs, rows, col), 4);
        for (got, want) in pixels.iter().zip(expected.iter()) {
            check_close(*got as f64, (want + 128.0).clamp(0.0, 255.0), 2.5);
        }
    }
}

#[test]
fn reduced_6x6_matches_reference() {
    let dequant = islow_dequant(&[2u16; DCTSIZE2]);
    let mut rng = ChaCha12Rng::seed_from_u64(0x66);
    for _ in 0..50 {
        let coefs = random_coefs(&mut rng, 512);
        let mut dequantized = [0.0; DCTSIZE2];
        for (o, (&c, &q)) in dequantized.iter_mut().zip(coefs.iter().zip(dequant.iter())) {
            *o = c as f64 * q as f64;
        }
        let expected = reference_idct(&dequantized, 6, 6);
        let pixels = run_idct(|rows, col| idct_6x6(&dequant, &coefs, rows, col), 6);
        for (got, want) in pixels.iter().zip(expected.iter()) {
            check_close(*got as f64, (want + 128.0).clamp(0.0, 255.0), 2.5);
        }
    }
}

#[test]
fn reduced_12x12_matches_reference() {
    let dequant = islow_dequant(&[2u16; DCTSIZE2]);
    let mut rng = ChaCha12Rng::seed_from_u64(0x1212);
    for _ in 0..50 {
        let coefs = random_coefs(&mut rng, 512);
        let mut dequantized = [0.0; DCTSIZE2];
        for (o, (&c, &q)) in dequantized.iter_mut().zip(coefs.iter().zip(dequant.iter())) {
            *o = c as f64 * q as f64;
        }
        let expected = reference_idct(&dequantized, 12, DCTSIZE);
        let pixels = run_idct(|rows, col| idct_12x12(&dequant, &coefs, rows, col), 12);
        for (got, want) in pixels.iter().zip(expected.iter()) {
            check_close(*got as f64, (want + 128.0).clamp(0.0, 255.0), 2.5);
        }
    }
}

#[test]
fn quantize_is_round_half_up_division() {
    let mut rng = ChaCha12Rng::seed_from_u64(0x9045);
    for _ in 0..200 {
        let mut quantvals = [0u16; DCTSIZE2];
        for q in quantvals.iter_mut() {
            *q = rng.random_range(1..=255);
        }
        let divisors = islow_divisors(&quantvals).unwrap();

        let mut ws = [0i32; DCTSIZE2];
        for w in ws.iter_mut() {
            *w = rng.random_range(-8192..=8192);
        }
        let mut coefs = [0i16; DCTSIZE2];
        quantize(&mut coefs, &divisors, &ws);

        for i in 0..DCTSIZE2 {
            let d = (quantvals[i] as i32) << 3;
            let expected = (ws[i].abs() + d / 2) / d * ws[i].signum();
            assert_eq!(
                coefs[i] as i32, expected,
                "value: {} divisor: {d}",
                ws[i]
            );
        }
    }
}

#[test]
fn large_divisors_divide_exactly() {
    // Legal 16-bit quantization values push the islow divisors up to 2^19,
    // where the reciprocal needs 17 bits and the correction up to 2^18.
    // Probe values straddle the rounding boundary at half the divisor and
    // the quotient step at the divisor itself.
    let cases: [(u32, [i32; 7]); 4] = [
        (131072, [0, 1, 65535, 65536, 65537, 131071, 131072]),
        (131073, [0, 1, 65535, 65537, 131072, 131073, 131073]),
        (160000, [0, 1, 79999, 80000, 80001, 159999, 160000]),
        (524280, [0, 1, 262123, 262140, 262141, 524279, 524280]),
    ];
    for (d, probes) in cases {
        let divisors = ReciprocalTable::new(&[d; DCTSIZE2]).unwrap();
        let d = d as i32;
        let mut ws = [0i32; DCTSIZE2];
        for (i, w) in ws.iter_mut().enumerate() {
            let value = probes[i % probes.len()];
            *w = if (i / probes.len()) % 2 == 0 { value } else { -value };
        }
        let mut coefs = [0i16; DCTSIZE2];
        quantize(&mut coefs, &divisors, &ws);
        for i in 0..DCTSIZE2 {
            let expected = (ws[i].abs() + d / 2) / d * ws[i].signum();
            assert_eq!(
                coefs[i] as i32, expected,
                "value: {} divisor: {d}",
                ws[i]
            );
        }
    }
}

#[test]
fn unit_divisor_is_identity() {
    let divisors = ReciprocalTable::new(&[1u32; DCTSIZE2]).unwrap();
    let mut ws = [0i32; DCTSIZE2];
    for (i, w) in ws.iter_mut().enumerate() {
        *w = (i as i32 - 32) * 377;
    }
    let mut coefs = [0i16; DCTSIZE2];
    quantize(&mut coefs, &divisors, &ws);
    for (got, want) in coefs.iter().zip(ws.iter()) {
        assert_eq!(*got as i32, *want);
    }
}

#[test]
fn zero_divisor_is_rejected() {
    let mut quantvals = [1u16; DCTSIZE2];
    quantvals[17] = 0;
    assert!(matches!(
        islow_divisors(&quantvals),
        Err(QuantTableError::ZeroDivisor(17))
    ));
    assert!(matches!(
        float_divisors(&quantvals),
        Err(QuantTableError::ZeroDivisor(17))
    ));
}

#[test]
fn output_col_offsets_into_wider_rows() {
    let dequant = islow_dequant(&[1u16; DCTSIZE2]);
    let mut coefs = [0i16; DCTSIZE2];
    coefs[0] = 80;

    let width = 24;
    let mut pixels = vec![0xa5u8; width * DCTSIZE];
    let mut rows: Vec<&mut [u8]> = pixels.chunks_mut(width).collect();
    let d = ScalarDescriptor::new().unwrap();
    idct_islow(d, &dequant, &coefs, &mut rows, 8);

    let value = ((80 + 4) >> 3) + 128;
    for row in pixels.chunks(width) {
        assert!(row[..8].iter().all(|&p| p == 0xa5));
        assert!(row[8..16].iter().all(|&p| p == value as u8));
        assert!(row[16..].iter().all(|&p| p == 0xa5));
    }
}

fn kernels_agree_across_descriptors<D: SimdDescriptor>(d: D) {
    let scalar = ScalarDescriptor::new().unwrap();
    let quantvals = [5u16; DCTSIZE2];
    let islow_deq = islow_dequant(&quantvals);
    let ifast_deq = ifast_dequant(&quantvals);
    let float_deq = float_dequant(&quantvals);
    let float_div = float_divisors(&quantvals).unwrap();

    let mut rng = ChaCha12Rng::seed_from_u64(0xb17);
    for _ in 0..20 {
        let samples = random_samples(&mut rng);

        let mut ws_scalar = [0i32; DCTSIZE2];
        convsamp(&sample_rows(&samples), 0, &mut ws_scalar);
        let mut ws_simd = ws_scalar;
        forward_dct_islow(scalar, &mut ws_scalar);
        forward_dct_islow(d, &mut ws_simd);
        assert_eq!(ws_scalar, ws_simd);

        let mut ws_scalar = [0i32; DCTSIZE2];
        convsamp(&sample_rows(&samples), 0, &mut ws_scalar);
        let mut ws_simd = ws_scalar;
        forward_dct_ifast(scalar, &mut ws_scalar);
        forward_dct_ifast(d, &mut ws_simd);
        assert_eq!(ws_scalar, ws_simd);

        let mut wf_scalar = [0f32; DCTSIZE2];
        convsamp_float(&sample_rows(&samples), 0, &mut wf_scalar);
        let mut wf_simd = wf_scalar;
        forward_dct_float(scalar, &mut wf_scalar);
        forward_dct_float(d, &mut wf_simd);
        for (a, b) in wf_scalar.iter().zip(wf_simd.iter()) {
            assert_eq!(a.to_bits(), b.to_bits());
        }

        let mut coefs_scalar = [0i16; DCTSIZE2];
        let mut coefs_simd = [0i16; DCTSIZE2];
        quantize_float(scalar, &mut coefs_scalar, &float_div, &wf_scalar);
        quantize_float(d, &mut coefs_simd, &float_div, &wf_simd);
        assert_eq!(coefs_scalar, coefs_simd);

        let coefs = random_coefs(&mut rng, 512);
        let a = run_idct(
            |rows, col| idct_islow(scalar, &islow_deq, &coefs, rows, col),
            DCTSIZE,
        );
        let b = run_idct(
            |rows, col| idct_islow(d, &islow_deq, &coefs, rows, col),
            DCTSIZE,
        );
        assert_eq!(a, b);

        let a = run_idct(
            |rows, col| idct_ifast(scalar, &ifast_deq, &coefs, rows, col),
            DCTSIZE,
        );
        let b = run_idct(
            |rows, col| idct_ifast(d, &ifast_deq, &coefs, rows, col),
            DCTSIZE,
        );
        assert_eq!(a, b);

        let a = run_idct(
            |rows, col| idct_float(scalar, &float_deq, &coefs, rows, col),
            DCTSIZE,
        );
        let b = run_idct(
            |rows, col| idct_float(d, &float_deq, &coefs, rows, col),
            DCTSIZE,
        );
        assert_eq!(a, b);
    }
}
test_all_instruction_sets!(kernels_agree_across_descriptors);
