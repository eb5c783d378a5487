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

//! FFT backend abstraction layer
//!
//! The synthesis plan only needs one primitive from an FFT library: an
//! unnormalized, in-place inverse transform of a fixed size. This module
//! wraps that primitive behind [`FftBackend`] and [`FftPlannerTrait`] so the
//! plan does not care which library computes it:
//! - `rustfft`: full-featured engine, any positive size (always available)
//! - `microfft`: lightweight `f32` engine for power-of-two sizes up to 4096
//!   (feature `microfft-backend`)
//!
//! Every backend computes `X[k] = sum_m c[m] * exp(+2*pi*i*m*k / M)` without
//! the `1/M` factor.

use std::sync::Arc;

use num_traits::Float;
pub use rustfft::num_complex::Complex;
use rustfft::{Fft, FftPlannerScalar, Length};

use crate::PlannerMode;
use crate::error::Result;

/// Sample types the plan can run on (`f32` and `f64`).
pub trait FftNum: Float + rustfft::FftNum + Send + Sync + 'static {}

impl FftNum for f32 {}
impl FftNum for f64 {}

/// An in-place transform of a fixed size.
pub trait FftBackend<T: FftNum>: Send + Sync {
    /// Transform `buffer` in place. `scratch` must hold at least
    /// [`scratch_len`](Self::scratch_len) elements.
    fn process_with_scratch(&self, buffer: &mut [Complex<T>], scratch: &mut [Complex<T>]);

    /// Scratch space required by [`process_with_scratch`](Self::process_with_scratch).
    fn scratch_len(&self) -> usize {
        0
    }

    /// Get the FFT size
    fn len(&self) -> usize;

    /// Check if FFT size is zero (always false for valid FFTs)
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Creates inverse transforms for a plan.
pub trait FftPlannerTrait<T: FftNum> {
    /// Plan an unnormalized inverse FFT of the given size.
    ///
    /// Returns [`Error::EngineInitFailed`](crate::Error::EngineInitFailed) when
    /// the engine cannot provide a transform of that size.
    fn plan_fft_inverse(&mut self, size: usize) -> Result<Arc<dyn FftBackend<T>>>;
}

// ============================================================================
// RustFFT Backend
// ============================================================================

struct RustFftWrapper<T: FftNum> {
    fft: Arc<dyn Fft<T>>,
}

impl<T: FftNum> FftBackend<T> for RustFftWrapper<T> {
    fn process_with_scratch(&self, buffer: &mut [Complex<T>], scratch: &mut [Complex<T>]) {
        self.fft.process_with_scratch(buffer, scratch);
    }

    fn scratch_len(&self) -> usize {
        self.fft.get_inplace_scratch_len()
    }

    fn len(&self) -> usize {
        self.fft.len()
    }
}

enum RustFftPlanner<T: FftNum> {
    Auto(rustfft::FftPlanner<T>),
    Scalar(FftPlannerScalar<T>),
}

/// FFT planner using rustfft.
///
/// Plans are cached, so one planner can serve many plans of the same size.
pub struct FftPlanner<T: FftNum> {
    planner: RustFftPlanner<T>,
}

impl<T: FftNum> FftPlanner<T> {
    /// Planner that picks the fastest instruction set available at runtime.
    pub fn new() -> Self {
        Self::with_mode(PlannerMode::Auto)
    }

    pub fn with_mode(mode: PlannerMode) -> Self {
        let planner = match mode {
            PlannerMode::Auto => RustFftPlanner::Auto(rustfft::FftPlanner::new()),
            PlannerMode::Scalar => RustFftPlanner::Scalar(FftPlannerScalar::new()),
        };
        Self { planner }
    }
}

impl<T: FftNum> Default for FftPlanner<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: FftNum> FftPlannerTrait<T> for FftPlanner<T> {
    fn plan_fft_inverse(&mut self, size: usize) -> Result<Arc<dyn FftBackend<T>>> {
        let fft = match &mut self.planner {
            RustFftPlanner::Auto(planner) => planner.plan_fft_inverse(size),
            RustFftPlanner::Scalar(planner) => planner.plan_fft_inverse(size),
        };
        Ok(Arc::new(RustFftWrapper { fft }))
    }
}

// ============================================================================
// MicroFFT Backend
// ============================================================================

#[cfg(feature = "microfft-backend")]
mod microfft_impl {
    use super::*;
    use crate::error::Error;
    use microfft::Complex32;

    macro_rules! cfft_dispatch {
        ($buffer:expr, $($size:literal => $func:ident),+ $(,)?) => {
            match $buffer.len() {
                $(
                    $size => {
                        if let Ok(array) = <&mut [Complex32; $size]>::try_from(&mut *$buffer) {
                            let _ = microfft::complex::$func(array);
                        }
                    }
                )+
                _ => {}
            }
        };
    }

    /// Inverse transform built from microfft's forward transform:
    /// IFFT(x) = conj(FFT(conj(x))), left unnormalized.
    struct MicroFftInverse {
        size: usize,
    }

    impl FftBackend<f32> for MicroFftInverse {
        fn process_with_scratch(&self, buffer: &mut [Complex<f32>], _scratch: &mut [Complex<f32>]) {
            debug_assert_eq!(buffer.len(), self.size);
            for val in buffer.iter_mut() {
                val.im = -val.im;
            }

            cfft_dispatch!(buffer,
                2 => cfft_2,
                4 => cfft_4,
                8 => cfft_8,
                16 => cfft_16,
                32 => cfft_32,
                64 => cfft_64,
                128 => cfft_128,
                256 => cfft_256,
                512 => cfft_512,
                1024 => cfft_1024,
                2048 => cfft_2048,
                4096 => cfft_4096,
            );

            for val in buffer.iter_mut() {
                val.im = -val.im;
            }
        }

        fn len(&self) -> usize {
            self.size
        }
    }

    /// `f32`-only planner backed by microfft.
    ///
    /// Only power-of-two sizes from 2 to 4096 are available; anything else
    /// fails plan creation.
    #[derive(Debug, Default)]
    pub struct MicroFftPlanner;

    impl MicroFftPlanner {
        pub const MAX_SIZE: usize = 4096;

        pub fn new() -> Self {
            Self
        }
    }

    impl FftPlannerTrait<f32> for MicroFftPlanner {
        fn plan_fft_inverse(&mut self, size: usize) -> Result<Arc<dyn FftBackend<f32>>> {
            if !size.is_power_of_two() || !(2..=Self::MAX_SIZE).contains(&size) {
                tracing::warn!(size, "microfft cannot plan this transform size");
                return Err(Error::EngineInitFailed {
                    size,
                    reason: format!(
                        "microfft only supports power-of-2 sizes from 2 to {}",
                        Self::MAX_SIZE
                    ),
                });
            }
            Ok(Arc::new(MicroFftInverse { size }))
        }
    }
}

#[cfg(feature = "microfft-backend")]
pub use microfft_impl::MicroFftPlanner;

#[cfg(test)]
mod tests {
    use super::*;

    fn naive_inverse(input: &[Complex<f64>]) -> Vec<Complex<f64>> {
        let n = input.len();
        (0..n)
            .map(|k| {
                input
                    .iter()
                    .enumerate()
                    .map(|(m, c)| {
                        let angle = 2.0 * std::f64::consts::PI * ((m * k) % n) as f64 / n as f64;
                        c * Complex::new(angle.cos(), angle.sin())
                    })
                    .sum()
            })
            .collect()
    }

    #[test]
    fn test_rustfft_inverse_is_unnormalized() {
        for mode in [PlannerMode::Auto, PlannerMode::Scalar] {
            let mut planner = FftPlanner::<f64>::with_mode(mode);
            let fft = planner.plan_fft_inverse(6).unwrap();
            assert_eq!(fft.len(), 6);

            let input: Vec<Complex<f64>> = (0..6)
                .map(|i| Complex::new(i as f64 * 0.5 - 1.0, (i as f64).sin()))
                .collect();
            let expected = naive_inverse(&input);

            let mut buffer = input.clone();
            let mut scratch = vec![Complex::new(0.0, 0.0); fft.scratch_len()];
            fft.process_with_scratch(&mut buffer, &mut scratch);

            for (got, want) in buffer.iter().zip(expected.iter()) {
                assert!((got - want).norm() < 1e-10, "{got} vs {want}");
            }
        }
    }

    #[test]
    fn test_dc_impulse_gives_constant() {
        let mut planner = FftPlanner::<f32>::new();
        let fft = planner.plan_fft_inverse(4).unwrap();
        let mut buffer = vec![Complex::new(0.0f32, 0.0); 4];
        buffer[0] = Complex::new(1.0, 0.0);
        let mut scratch = vec![Complex::new(0.0, 0.0); fft.scratch_len()];
        fft.process_with_scratch(&mut buffer, &mut scratch);
        for val in buffer {
            assert!((val.re - 1.0).abs() < 1e-6);
            assert!(val.im.abs() < 1e-6);
        }
    }

    #[cfg(feature = "microfft-backend")]
    #[test]
    fn test_microfft_matches_rustfft() {
        let mut micro = MicroFftPlanner::new();
        let mut reference = FftPlanner::<f32>::new();
        let fft = micro.plan_fft_inverse(16).unwrap();
        let ref_fft = reference.plan_fft_inverse(16).unwrap();

        let input: Vec<Complex<f32>> = (0..16)
            .map(|i| Complex::new((i as f32 * 0.3).cos(), (i as f32 * 0.7).sin()))
            .collect();
        let mut a = input.clone();
        let mut b = input;
        fft.process_with_scratch(&mut a, &mut []);
        let mut scratch = vec![Complex::new(0.0, 0.0); ref_fft.scratch_len()];
        ref_fft.process_with_scratch(&mut b, &mut scratch);

        for (x, y) in a.iter().zip(b.iter()) {
            assert!((x - y).norm() < 1e-4);
        }
    }

    #[cfg(feature = "microfft-backend")]
    #[test]
    fn test_microfft_rejects_unsupported_sizes() {
        let mut micro = MicroFftPlanner::new();
        for size in [1, 3, 12, 8192] {
            assert!(matches!(
                micro.plan_fft_inverse(size),
                Err(crate::Error::EngineInitFailed { .. })
            ));
        }
    }

    #[cfg(all(feature = "microfft-backend", debug_assertions))]
    #[test]
    #[should_panic]
    fn test_microfft_panics_on_wrong_buffer_length() {
        let mut micro = MicroFftPlanner::new();
        let fft = micro.plan_fft_inverse(8).unwrap();
        let mut buffer = vec![Complex::new(1.0f32, 0.0); 4];
        fft.process_with_scratch(&mut buffer, &mut []);
    }
}
