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

//! Inverse discrete Gabor transform (IDGT) using the filter bank algorithm.
//!
//! A [`IdgtFbPlan`] reconstructs a periodic signal of length `L` from an
//! `M x N x W` grid of Gabor coefficients (`M` frequency channels, `N = L / a`
//! frames, `W` signal channels). Every frame is turned back into time domain by
//! a size-`M` inverse FFT, re-centred according to the [`PhaseConvention`],
//! periodized to the window length, windowed and overlap-added into the output
//! with circular wrap-around at both ends of the signal.
//!
//! Plans own all scratch memory and the FFT handle, so repeated synthesis with
//! the same window and lattice does no allocation.
//!
//! ```
//! use gabor_rs::prelude::*;
//!
//! let window: Vec<f64> = fir_window(WindowType::Sine, 8);
//! let config = IdgtFbConfig::new(4, 8, PhaseConvention::FrequencyInvariant).unwrap();
//! let mut plan = IdgtFbPlan::new(&window, config).unwrap();
//!
//! let mut grid = CoefficientGrid::new(8, 4, 1);
//! grid.set(0, 0, 0, Complex::new(1.0, 0.0));
//! let signal = plan.process(&grid).unwrap();
//! assert_eq!(signal.len(), 16);
//! ```

use std::fmt;

pub mod error;
pub mod fft_backend;
pub mod plan;
pub mod utils;
pub mod window;

pub use error::{Error, Result};
pub use fft_backend::{Complex, FftBackend, FftNum, FftPlanner, FftPlannerTrait};
pub use plan::IdgtFbPlan;
pub use window::{WindowSample, WindowType, fir_window};

#[cfg(feature = "microfft-backend")]
pub use fft_backend::MicroFftPlanner;

pub mod prelude {
    pub use crate::{
        CoefficientGrid, Complex, IdgtFbConfig, IdgtFbPlan, PhaseConvention, PlannerMode,
        WindowType, fir_window, idgt_fb,
    };
}

/// Real `f32` window.
pub type IdgtFbPlanF32 = IdgtFbPlan<f32, f32>;
/// Real `f64` window.
pub type IdgtFbPlanF64 = IdgtFbPlan<f64, f64>;
/// Complex `f32` window.
pub type IdgtFbPlanC32 = IdgtFbPlan<f32, Complex<f32>>;
/// Complex `f64` window.
pub type IdgtFbPlanC64 = IdgtFbPlan<f64, Complex<f64>>;

/// Reference point of the per-frame spectral phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(i32)]
pub enum PhaseConvention {
    /// Phase measured from the start of the signal: the frame at `n * a`
    /// carries the modulation `exp(2*pi*i*m*l / M)`.
    #[default]
    FrequencyInvariant = 0,

    /// Phase measured from each frame's centre: the modulation is
    /// `exp(2*pi*i*m*(l - n*a) / M)`.
    TimeInvariant = 1,
}

impl TryFrom<i32> for PhaseConvention {
    type Error = Error;

    fn try_from(value: i32) -> Result<Self> {
        match value {
            0 => Ok(PhaseConvention::FrequencyInvariant),
            1 => Ok(PhaseConvention::TimeInvariant),
            other => Err(Error::InvalidConvention(other)),
        }
    }
}

impl fmt::Display for PhaseConvention {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PhaseConvention::FrequencyInvariant => write!(f, "freqinv"),
            PhaseConvention::TimeInvariant => write!(f, "timeinv"),
        }
    }
}

/// Which rustfft planner builds the per-frame inverse FFT.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlannerMode {
    /// Detect AVX/SSE/NEON at runtime and use the fastest implementation.
    #[default]
    Auto,

    /// Portable scalar implementation only.
    Scalar,
}

/// Lattice and phase parameters of a synthesis plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IdgtFbConfig {
    hop_size: usize,
    channels: usize,
    phase: PhaseConvention,
    planner: PlannerMode,
}

impl IdgtFbConfig {
    /// `hop_size` is the time shift `a` between frames, `channels` the number
    /// of frequency channels `M` (the FFT size). Both must be positive.
    pub fn new(hop_size: usize, channels: usize, phase: PhaseConvention) -> Result<Self> {
        if hop_size == 0 {
            return Err(Error::InvalidSize {
                name: "hop size",
                value: hop_size,
            });
        }
        if channels == 0 {
            return Err(Error::InvalidSize {
                name: "channel count",
                value: channels,
            });
        }

        Ok(Self {
            hop_size,
            channels,
            phase,
            planner: PlannerMode::Auto,
        })
    }

    pub fn with_planner(mut self, planner: PlannerMode) -> Self {
        self.planner = planner;
        self
    }

    pub fn hop_size(&self) -> usize {
        self.hop_size
    }

    pub fn channels(&self) -> usize {
        self.channels
    }

    pub fn phase(&self) -> PhaseConvention {
        self.phase
    }

    pub fn planner(&self) -> PlannerMode {
        self.planner
    }

    /// Redundancy `M / a` of the lattice.
    pub fn redundancy(&self) -> f64 {
        self.channels as f64 / self.hop_size as f64
    }

    /// Number of frames `N` for a signal of length `signal_len`, if the
    /// length is a positive multiple of the hop size.
    pub fn num_frames(&self, signal_len: usize) -> Option<usize> {
        (signal_len > 0 && signal_len % self.hop_size == 0).then(|| signal_len / self.hop_size)
    }
}

/// Owned grid of Gabor coefficients.
///
/// Stored channel-major with the frequency index fastest: element
/// `(m, n, w)` lives at `m + n * M + w * M * N`, the layout
/// [`IdgtFbPlan::execute`] reads.
#[derive(Debug, Clone, PartialEq)]
pub struct CoefficientGrid<T: FftNum> {
    pub channels: usize,
    pub num_frames: usize,
    pub num_signals: usize,
    data: Vec<Complex<T>>,
}

impl<T: FftNum> CoefficientGrid<T> {
    pub fn new(channels: usize, num_frames: usize, num_signals: usize) -> Self {
        Self {
            channels,
            num_frames,
            num_signals,
            data: vec![Complex::new(T::zero(), T::zero()); channels * num_frames * num_signals],
        }
    }

    pub fn from_data(
        channels: usize,
        num_frames: usize,
        num_signals: usize,
        data: Vec<Complex<T>>,
    ) -> Result<Self> {
        let expected = channels * num_frames * num_signals;
        if data.len() != expected {
            return Err(Error::BufferLength {
                name: "coefficient",
                expected,
                got: data.len(),
            });
        }
        Ok(Self {
            channels,
            num_frames,
            num_signals,
            data,
        })
    }

    #[inline]
    fn index(&self, channel: usize, frame: usize, signal: usize) -> usize {
        channel + frame * self.channels + signal * self.channels * self.num_frames
    }

    #[inline]
    pub fn get(&self, channel: usize, frame: usize, signal: usize) -> Complex<T> {
        self.data[self.index(channel, frame, signal)]
    }

    #[inline]
    pub fn set(&mut self, channel: usize, frame: usize, signal: usize, value: Complex<T>) {
        let idx = self.index(channel, frame, signal);
        self.data[idx] = value;
    }

    /// The `M` coefficients of one frame of one signal channel.
    pub fn frame(&self, frame: usize, signal: usize) -> &[Complex<T>] {
        let start = self.index(0, frame, signal);
        &self.data[start..start + self.channels]
    }

    pub fn frame_mut(&mut self, frame: usize, signal: usize) -> &mut [Complex<T>] {
        let start = self.index(0, frame, signal);
        &mut self.data[start..start + self.channels]
    }

    pub fn as_slice(&self) -> &[Complex<T>] {
        &self.data
    }

    pub fn as_mut_slice(&mut self) -> &mut [Complex<T>] {
        &mut self.data
    }

    pub fn into_vec(self) -> Vec<Complex<T>> {
        self.data
    }
}

/// One-shot synthesis: plan, execute once, release.
///
/// `coefficients` is laid out as in [`IdgtFbPlan::execute`]; `signal` receives
/// `signal_len * num_signals` samples. Use a [`IdgtFbPlan`] directly when
/// synthesizing repeatedly with the same window and lattice.
pub fn idgt_fb<T, G>(
    coefficients: &[Complex<T>],
    window: &[G],
    signal_len: usize,
    num_signals: usize,
    config: &IdgtFbConfig,
    signal: &mut [Complex<T>],
) -> Result<()>
where
    T: FftNum,
    G: WindowSample<T>,
{
    let mut plan = IdgtFbPlan::new(window, *config)?;
    let status = plan.execute(coefficients, signal_len, num_signals, signal);

    let mut slot = Some(plan);
    let released = IdgtFbPlan::done(&mut slot);
    status.and(released)
}
