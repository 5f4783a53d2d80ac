// Copyright (c) the rjpeg Authors. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

//! Runtime CPU capability detection.
//!
//! The process-wide capability mask is computed once and cached. Environment
//! toggles (`RJPEG_FORCENONE`, `RJPEG_FORCESSE42`, `RJPEG_FORCEAVX2`,
//! `RJPEG_FORCENEON`, each honoured when set to `1`) can only narrow the
//! detected mask, never extend it, so a set bit always implies the
//! corresponding instructions are actually available.

use std::sync::OnceLock;

use crate::SimdDescriptor;

/// Bitmask of instruction families usable on the current CPU.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct CpuCaps(u32);

impl CpuCaps {
    pub const NONE: CpuCaps = CpuCaps(0);
    pub const SSE42: CpuCaps = CpuCaps(1 << 0);
    pub const AVX2: CpuCaps = CpuCaps(1 << 1);
    pub const NEON: CpuCaps = CpuCaps(1 << 2);

    #[inline]
    pub fn contains(self, other: CpuCaps) -> bool {
        self.0 & other.0 == other.0
    }

    #[inline]
    pub fn intersect(self, other: CpuCaps) -> CpuCaps {
        CpuCaps(self.0 & other.0)
    }

    #[inline]
    pub fn union(self, other: CpuCaps) -> CpuCaps {
        CpuCaps(self.0 | other.0)
    }

    #[inline]
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl std::fmt::Debug for CpuCaps {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_empty() {
            return write!(f, "none");
        }
        let mut sep = "";
        for (bit, name) in [
            (CpuCaps::SSE42, "sse42"),
            (CpuCaps::AVX2, "avx2"),
            (CpuCaps::NEON, "neon"),
        ] {
            if self.contains(bit) {
                write!(f, "{sep}{name}")?;
                sep = "|";
            }
        }
        Ok(())
    }
}

/// Returns the capability mask for the current process, computing it on first
/// use.
pub fn cpu_caps() -> CpuCaps {
    static CAPS: OnceLock<CpuCaps> = OnceLock::new();
    *CAPS.get_or_init(|| apply_overrides(detect(), |name| std::env::var(name).ok()))
}

fn detect() -> CpuCaps {
    #[allow(unused_mut)]
    let mut caps = CpuCaps::NONE;
    #[cfg(all(target_arch = "x86_64", feature = "sse42"))]
    if crate::Sse42Descriptor::new().is_some() {
        caps = caps.union(CpuCaps::SSE42);
    }
    #[cfg(all(target_arch = "x86_64", feature = "avx"))]
    if crate::AvxDescriptor::new().is_some() {
        caps = caps.union(CpuCaps::AVX2);
    }
    #[cfg(all(target_arch = "aarch64", feature = "neon"))]
    if crate::NeonDescriptor::new().is_some() && os_reports_neon() {
        caps = caps.union(CpuCaps::NEON);
    }
    caps
}

fn apply_overrides(detected: CpuCaps, lookup: impl Fn(&str) -> Option<String>) -> CpuCaps {
    let forced = |name| lookup(name).as_deref() == Some("1");
    if forced("RJPEG_FORCENONE") {
        return CpuCaps::NONE;
    }
    if forced("RJPEG_FORCESSE42") {
        return detected.intersect(CpuCaps::SSE42);
    }
    if forced("RJPEG_FORCEAVX2") {
        return detected.intersect(CpuCaps::SSE42.union(CpuCaps::AVX2));
    }
    if forced("RJPEG_FORCENEON") {
        return detected.intersect(CpuCaps::NEON);
    }
    detected
}

/// On aarch64 Linux the kernel's `Features` line is cross-checked against the
/// hardware detection. The file has no stat'able size, so it is read into a
/// fixed buffer that is doubled and re-read until the contents fit.
#[cfg(all(target_arch = "aarch64", target_os = "linux"))]
fn os_reports_neon() -> bool {
    use std::io::Read;

    const MAX_BUF: usize = 1 << 20;
    let mut size = 1024;
    loop {
        let Ok(mut file) = std::fs::File::open("/proc/cpuinfo") else {
            return false;
        };
        let mut buf = vec![0u8; size];
        let mut filled = 0;
        loop {
            match file.read(&mut buf[filled..]) {
                Ok(0) => break,
                Ok(n) => {
                    filled += n;
                    if filled == size {
                        break;
                    }
                }
                Err(_) => return false,
            }
        }
        if filled < size {
            return features_line_has_neon(&String::from_utf8_lossy(&buf[..filled]));
        }
        size *= 2;
        if size > MAX_BUF {
            return false;
        }
    }
}

#[cfg(all(target_arch = "aarch64", not(target_os = "linux")))]
fn os_reports_neon() -> bool {
    // aarch64 always has Advanced SIMD outside of Linux-specific
    // configurations; trust the hardware detection alone.
    true
}

#[cfg_attr(
    not(all(target_arch = "aarch64", target_os = "linux")),
    allow(dead_code)
)]
fn features_line_has_neon(cpuinfo: &str) -> bool {
    cpuinfo.lines().any(|line| {
        let Some((key, value)) = line.split_once(':') else {
            return false;
        };
        key.trim() == "Features"
            && value
                .split_whitespace()
                .any(|feature| feature == "neon" || feature == "asimd")
    })
}
