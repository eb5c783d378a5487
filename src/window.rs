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

//! Synthesis windows.
//!
//! Windows are passed to the plan in FIR layout: the sample at time offset 0
//! sits at index 0, positive offsets follow, and negative offsets wrap around
//! to the end of the buffer. [`fir_window`] produces this layout directly.

use std::fmt;

use num_traits::Float;

use crate::fft_backend::{Complex, FftNum};
use crate::utils::ifftshift;

/// Element type of a synthesis window: either a real sample `T` or a complex
/// sample `Complex<T>`.
pub trait WindowSample<T: FftNum>: Copy + Send + Sync + fmt::Debug + 'static {
    fn zero() -> Self;

    /// Multiply a synthesized sample by this window sample.
    fn apply(self, sample: Complex<T>) -> Complex<T>;
}

macro_rules! impl_window_sample {
    ($($real:ty),+) => {
        $(
            impl WindowSample<$real> for $real {
                #[inline]
                fn zero() -> Self {
                    0.0
                }

                #[inline]
                fn apply(self, sample: Complex<$real>) -> Complex<$real> {
                    sample * self
                }
            }

            impl WindowSample<$real> for Complex<$real> {
                #[inline]
                fn zero() -> Self {
                    Complex::new(0.0, 0.0)
                }

                #[inline]
                fn apply(self, sample: Complex<$real>) -> Complex<$real> {
                    sample * self
                }
            }
        )+
    };
}

impl_window_sample!(f32, f64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowType {
    Hann,
    /// Square root of Hann; power complementary at 50% overlap.
    Sine,
    Hamming,
    Blackman,
    Rectangular,
}

impl WindowType {
    /// Window value at normalized position `x` in `[-0.5, 0.5)`.
    fn evaluate(self, x: f64) -> f64 {
        let two_pi_x = 2.0 * std::f64::consts::PI * x;
        match self {
            WindowType::Hann => 0.5 + 0.5 * two_pi_x.cos(),
            WindowType::Sine => (std::f64::consts::PI * x).cos(),
            WindowType::Hamming => 0.54 + 0.46 * two_pi_x.cos(),
            WindowType::Blackman => 0.42 + 0.5 * two_pi_x.cos() + 0.08 * (2.0 * two_pi_x).cos(),
            WindowType::Rectangular => 1.0,
        }
    }
}

/// Generate a periodic window of length `len` in FIR layout.
///
/// The natural layout covers time offsets `-len/2 .. len - len/2`; the result
/// is its [`ifftshift`], so index 0 holds the peak.
pub fn fir_window<T: Float>(window_type: WindowType, len: usize) -> Vec<T> {
    let half = (len / 2) as f64;
    let natural: Vec<T> = (0..len)
        .map(|i| {
            let x = (i as f64 - half) / len as f64;
            T::from(window_type.evaluate(x)).unwrap_or_else(T::zero)
        })
        .collect();

    let mut fir = natural.clone();
    ifftshift(&natural, &mut fir);
    fir
}
