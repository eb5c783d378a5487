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

//! Filter bank synthesis plan.

use std::sync::Arc;

use tracing::{debug, trace};

use crate::error::{Error, Result};
use crate::fft_backend::{Complex, FftBackend, FftNum, FftPlanner, FftPlannerTrait};
use crate::utils::{circshift, fftshift, periodize, positive_rem};
use crate::window::WindowSample;
use crate::{CoefficientGrid, IdgtFbConfig, PhaseConvention};

/// Allocate `len` copies of `value`, reporting allocation failure instead of
/// aborting.
fn try_alloc<E: Clone>(len: usize, value: E) -> Result<Vec<E>> {
    let mut buffer = Vec::new();
    buffer
        .try_reserve_exact(len)
        .map_err(|source| Error::OutOfMemory { len, source })?;
    buffer.resize(len, value);
    Ok(buffer)
}

/// Reusable inverse Gabor transform for one window and lattice.
///
/// The plan owns its scratch buffers and FFT handle. `execute` takes
/// `&mut self`, so a single plan can never run two syntheses at once; use one
/// plan per thread for concurrent work.
pub struct IdgtFbPlan<T: FftNum, G: WindowSample<T> = T> {
    config: IdgtFbConfig,
    window_len: usize,
    /// Coefficients of the current frame, transformed in place.
    cbuf: Vec<Complex<T>>,
    /// Window after `fftshift`, so index 0 is the start of the frame support.
    gw: Vec<G>,
    /// Synthesized frame, `max(gl, M)` long.
    ff: Vec<Complex<T>>,
    scratch: Vec<Complex<T>>,
    ifft: Arc<dyn FftBackend<T>>,
}

impl<T: FftNum, G: WindowSample<T>> IdgtFbPlan<T, G> {
    /// Create a plan using rustfft with the config's [`PlannerMode`](crate::PlannerMode).
    ///
    /// `window` is read once, in FIR layout, and copied; the plan never refers
    /// to it again.
    pub fn new(window: &[G], config: IdgtFbConfig) -> Result<Self> {
        let mut planner = FftPlanner::with_mode(config.planner());
        Self::with_planner(window, config, &mut planner)
    }

    /// Create a plan whose inverse FFT comes from `planner`.
    pub fn with_planner<P>(window: &[G], config: IdgtFbConfig, planner: &mut P) -> Result<Self>
    where
        P: FftPlannerTrait<T> + ?Sized,
    {
        let window_len = window.len();
        if window_len == 0 {
            return Err(Error::InvalidSize {
                name: "window length",
                value: window_len,
            });
        }
        let channels = config.channels();

        let cbuf = try_alloc(channels, Complex::new(T::zero(), T::zero()))?;
        let mut gw = try_alloc(window_len, G::zero())?;
        let ff = try_alloc(window_len.max(channels), Complex::new(T::zero(), T::zero()))?;

        let ifft = planner.plan_fft_inverse(channels)?;
        if ifft.len() != channels {
            return Err(Error::EngineInitFailed {
                size: channels,
                reason: format!("engine returned a transform of size {}", ifft.len()),
            });
        }
        let scratch = try_alloc(ifft.scratch_len(), Complex::new(T::zero(), T::zero()))?;

        fftshift(window, &mut gw);

        debug!(
            a = config.hop_size(),
            m = channels,
            gl = window_len,
            phase = %config.phase(),
            planner = ?config.planner(),
            "created IDGT filter bank plan"
        );

        Ok(Self {
            config,
            window_len,
            cbuf,
            gw,
            ff,
            scratch,
            ifft,
        })
    }

    /// Release a plan held in `plan`, leaving `None` behind.
    ///
    /// Releasing an empty slot is an error rather than a no-op, so a double
    /// release is reported. Dropping the plan releases it as well.
    pub fn done(plan: &mut Option<Self>) -> Result<()> {
        let released = plan.take().ok_or(Error::InvalidHandle)?;
        debug!(
            m = released.channels(),
            gl = released.window_len(),
            "released IDGT filter bank plan"
        );
        drop(released);
        Ok(())
    }

    pub fn hop_size(&self) -> usize {
        self.config.hop_size()
    }

    pub fn channels(&self) -> usize {
        self.config.channels()
    }

    pub fn window_len(&self) -> usize {
        self.window_len
    }

    pub fn phase(&self) -> PhaseConvention {
        self.config.phase()
    }

    pub fn config(&self) -> &IdgtFbConfig {
        &self.config
    }

    /// Synthesize `num_signals` signals of length `signal_len` from
    /// `coefficients`.
    ///
    /// `coefficients` holds `M * N * W` values with `N = signal_len / a`,
    /// element `(m, n, w)` at `m + n * M + w * M * N`. `signal` receives
    /// `signal_len * W` samples, signal `w` at `w * signal_len ..`. The output
    /// is overwritten, not accumulated into.
    pub fn execute(
        &mut self,
        coefficients: &[Complex<T>],
        signal_len: usize,
        num_signals: usize,
        signal: &mut [Complex<T>],
    ) -> Result<()> {
        self.validate(signal_len, num_signals)?;

        let a = self.hop_size();
        let m = self.channels();
        let gl = self.window_len;
        let l = signal_len;
        let n_frames = l / a;
        let slab_len = m * n_frames;
        if coefficients.len() != slab_len * num_signals {
            return Err(Error::BufferLength {
                name: "coefficient",
                expected: slab_len * num_signals,
                got: coefficients.len(),
            });
        }
        if signal.len() != l * num_signals {
            return Err(Error::BufferLength {
                name: "signal",
                expected: l * num_signals,
                got: signal.len(),
            });
        }

        let glh = gl / 2;
        // Frames before this one start at a negative position and wrap.
        let leading_end = glh.div_ceil(a);
        // Frames from here on end past `l` and wrap.
        let trailing_start = ((l - gl.div_ceil(2)) / a + 1).max(leading_end);

        trace!(
            l,
            w = num_signals,
            n = n_frames,
            leading_end,
            trailing_start,
            "executing IDGT filter bank plan"
        );

        signal.fill(Complex::new(T::zero(), T::zero()));

        for (slab, out) in coefficients
            .chunks_exact(slab_len)
            .zip(signal.chunks_exact_mut(l))
        {
            for n in 0..leading_end {
                self.synthesize_frame(&slab[n * m..(n + 1) * m], n);
                self.accumulate_wrapped(out, n);
            }

            for n in leading_end..trailing_start {
                self.synthesize_frame(&slab[n * m..(n + 1) * m], n);
                let sp = n * a - glh;
                for (o, &x) in out[sp..sp + gl].iter_mut().zip(&self.ff[..gl]) {
                    *o = *o + x;
                }
            }

            for n in trailing_start..n_frames {
                self.synthesize_frame(&slab[n * m..(n + 1) * m], n);
                self.accumulate_wrapped(out, n);
            }
        }

        Ok(())
    }

    /// Synthesize every signal in `grid`; the signal length is `N * a`.
    pub fn process(&mut self, grid: &CoefficientGrid<T>) -> Result<Vec<Complex<T>>> {
        let mut signal = Vec::new();
        self.process_into(grid, &mut signal)?;
        Ok(signal)
    }

    /// Like [`process`](Self::process), reusing `output`'s allocation.
    pub fn process_into(
        &mut self,
        grid: &CoefficientGrid<T>,
        output: &mut Vec<Complex<T>>,
    ) -> Result<()> {
        if grid.channels != self.channels() {
            return Err(Error::BufferLength {
                name: "frame",
                expected: self.channels(),
                got: grid.channels,
            });
        }

        let signal_len = grid.num_frames * self.hop_size();
        self.validate(signal_len, grid.num_signals)?;

        let total = signal_len * grid.num_signals;
        output
            .try_reserve_exact(total.saturating_sub(output.len()))
            .map_err(|source| Error::OutOfMemory { len: total, source })?;
        output.clear();
        output.resize(total, Complex::new(T::zero(), T::zero()));

        self.execute(grid.as_slice(), signal_len, grid.num_signals, output)
    }

    /// Check the signal length against the lattice and window, and the signal
    /// count.
    fn validate(&self, signal_len: usize, num_signals: usize) -> Result<()> {
        let a = self.hop_size();
        let gl = self.window_len;
        if signal_len < gl || signal_len % a != 0 {
            return Err(Error::InvalidLength {
                len: signal_len,
                hop: a,
                window: gl,
            });
        }
        if num_signals == 0 {
            return Err(Error::InvalidSize {
                name: "signal count",
                value: num_signals,
            });
        }
        Ok(())
    }

    /// Turn the `M` coefficients of frame `n` into the windowed, `gl` long
    /// time-domain contribution in `ff`.
    ///
    /// The order inverse FFT, shift, periodize, window is fixed: the shift is
    /// taken modulo `M` before the period is repeated to `gl` samples.
    fn synthesize_frame(&mut self, frame: &[Complex<T>], n: usize) {
        let m = self.channels();
        let gl = self.window_len;
        let glh = (gl / 2) as isize;

        self.cbuf.copy_from_slice(frame);
        self.ifft
            .process_with_scratch(&mut self.cbuf, &mut self.scratch);

        let shift = match self.phase() {
            PhaseConvention::TimeInvariant => glh,
            PhaseConvention::FrequencyInvariant => glh - (n * self.hop_size()) as isize,
        };
        circshift(&self.cbuf, shift, &mut self.ff[..m]);
        periodize(&mut self.ff, m, gl);

        for (x, &g) in self.ff[..gl].iter_mut().zip(&self.gw) {
            *x = g.apply(*x);
        }
    }

    /// Add `ff` into `out` starting at `(n * a - gl / 2) mod L`, continuing
    /// from the start of `out` once the end is reached.
    fn accumulate_wrapped(&self, out: &mut [Complex<T>], n: usize) {
        let l = out.len();
        let gl = self.window_len;
        let sp = positive_rem(
            (n * self.hop_size()) as isize - (gl / 2) as isize,
            l,
        );

        let (tail, head) = self.ff[..gl].split_at((l - sp).min(gl));
        for (o, &x) in out[sp..].iter_mut().zip(tail) {
            *o = *o + x;
        }
        for (o, &x) in out.iter_mut().zip(head) {
            *o = *o + x;
        }
    }
}

impl<T: FftNum, G: WindowSample<T>> std::fmt::Debug for IdgtFbPlan<T, G> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IdgtFbPlan")
            .field("config", &self.config)
            .field("window_len", &self.window_len)
            .finish_non_exhaustive()
    }
}
