// Copyright (c) the rjpeg Authors. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    QuantTable(#[from] rjpeg_transforms::quant::QuantTableError),
    #[error("Unsupported sample depth: {0} bits")]
    UnsupportedSampleDepth(u32),
    #[error("Unsupported coefficient width: {0} bits")]
    UnsupportedCoefWidth(u32),
    #[error("Unsupported index width: {0} bits")]
    UnsupportedIndexWidth(u32),
    #[error("Unsupported pixel size: {0} bytes")]
    UnsupportedPixelBytes(u32),
}

pub type Result<T> = std::result::Result<T, Error>;
