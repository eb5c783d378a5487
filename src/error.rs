/*MIT License

Copyright (c) 2025 David Maseda Neira

Permission is hereby granted, free of charge, to any person obtaining a copy
of this software and associated documentation files (the "Software"), to deal
in the Software without restriction, including without limitation the rights
to use, copy, modify, merge, publish, distribute, sublicense, and/or sell
copies of the Software, and to permit persons to whom the Software is
furnished to do so, subject to the following conditions:

The above copyright notice and this permission notice shall be included in all
copies or substantial portions of the Software.

THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM,
OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE
SOFTWARE.
*/

use std::collections::TryReserveError;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("{name} must be positive, got {value}")]
    InvalidSize { name: &'static str, value: usize },

    #[error(
        "signal length {len} must be at least the window length {window} and divisible by the hop size {hop}"
    )]
    InvalidLength { len: usize, hop: usize, window: usize },

    #[error("{name} buffer has {got} elements, expected {expected}")]
    BufferLength {
        name: &'static str,
        expected: usize,
        got: usize,
    },

    #[error("FFT engine could not plan an inverse transform of size {size}: {reason}")]
    EngineInitFailed { size: usize, reason: String },

    #[error("failed to allocate {len} elements")]
    OutOfMemory {
        len: usize,
        #[source]
        source: TryReserveError,
    },

    #[error("unknown phase convention {0}")]
    InvalidConvention(i32),

    #[error("plan handle is null or has already been released")]
    InvalidHandle,
}

pub type Result<T> = std::result::Result<T, Error>;
