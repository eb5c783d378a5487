/// Common test utilities
use gabor_rs::{Complex, PhaseConvention, WindowSample};
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg64;

fn unit_phasor(numerator: isize, denominator: usize, sign: f64) -> Complex<f64> {
    let k = numerator.rem_euclid(denominator as isize) as f64;
    let angle = sign * 2.0 * std::f64::consts::PI * k / denominator as f64;
    Complex::new(angle.cos(), angle.sin())
}

/// Time offsets covered by a window of length `gl`, in FIR order of support.
fn support(gl: usize) -> impl Iterator<Item = isize> {
    let glh = (gl / 2) as isize;
    -glh..(gl as isize - glh)
}

/// Brute-force synthesis: every sample placed with an explicit modulo.
#[allow(dead_code)]
pub fn reference_synthesis<G: WindowSample<f64>>(
    coefficients: &[Complex<f64>],
    window: &[G],
    signal_len: usize,
    num_signals: usize,
    a: usize,
    m: usize,
    phase: PhaseConvention,
) -> Vec<Complex<f64>> {
    let gl = window.len();
    let n_frames = signal_len / a;
    let mut out = vec![Complex::new(0.0, 0.0); signal_len * num_signals];

    for w in 0..num_signals {
        for n in 0..n_frames {
            for t in support(gl) {
                let pos = (n * a) as isize + t;
                let arg = match phase {
                    PhaseConvention::FrequencyInvariant => pos,
                    PhaseConvention::TimeInvariant => t,
                };
                let mut sum = Complex::new(0.0, 0.0);
                for k in 0..m {
                    let c = coefficients[k + n * m + w * m * n_frames];
                    sum += c * unit_phasor(k as isize * arg, m, 1.0);
                }
                let g = window[t.rem_euclid(gl as isize) as usize];
                let idx = pos.rem_euclid(signal_len as isize) as usize;
                out[w * signal_len + idx] += g.apply(sum);
            }
        }
    }

    out
}

/// Naive Gabor analysis matching [`reference_synthesis`] (its adjoint).
#[allow(dead_code)]
pub fn reference_analysis(
    signal: &[Complex<f64>],
    window: &[f64],
    signal_len: usize,
    num_signals: usize,
    a: usize,
    m: usize,
    phase: PhaseConvention,
) -> Vec<Complex<f64>> {
    let gl = window.len();
    let n_frames = signal_len / a;
    let mut coefficients = vec![Complex::new(0.0, 0.0); m * n_frames * num_signals];

    for w in 0..num_signals {
        for n in 0..n_frames {
            for k in 0..m {
                let mut sum = Complex::new(0.0, 0.0);
                for t in support(gl) {
                    let pos = (n * a) as isize + t;
                    let arg = match phase {
                        PhaseConvention::FrequencyInvariant => pos,
                        PhaseConvention::TimeInvariant => t,
                    };
                    let f = signal[w * signal_len + pos.rem_euclid(signal_len as isize) as usize];
                    let g = window[t.rem_euclid(gl as isize) as usize];
                    sum += f * g * unit_phasor(k as isize * arg, m, -1.0);
                }
                coefficients[k + n * m + w * m * n_frames] = sum;
            }
        }
    }

    coefficients
}

#[allow(dead_code)]
pub fn random_complex(len: usize, seed: u64) -> Vec<Complex<f64>> {
    let mut rng = Pcg64::seed_from_u64(seed);
    (0..len)
        .map(|_| Complex::new(rng.gen_range(-1.0..1.0), rng.gen_range(-1.0..1.0)))
        .collect()
}

#[allow(dead_code)]
pub fn to_f32(values: &[Complex<f64>]) -> Vec<Complex<f32>> {
    values
        .iter()
        .map(|c| Complex::new(c.re as f32, c.im as f32))
        .collect()
}

#[allow(dead_code)]
pub fn to_f64(values: &[Complex<f32>]) -> Vec<Complex<f64>> {
    values
        .iter()
        .map(|c| Complex::new(c.re as f64, c.im as f64))
        .collect()
}

#[allow(dead_code)]
pub fn max_abs_error(expected: &[Complex<f64>], actual: &[Complex<f64>]) -> f64 {
    assert_eq!(expected.len(), actual.len());
    expected
        .iter()
        .zip(actual.iter())
        .map(|(e, a)| (e - a).norm())
        .fold(0.0, f64::max)
}

#[allow(dead_code)]
pub fn calculate_snr(original: &[Complex<f64>], reconstructed: &[Complex<f64>]) -> f64 {
    assert_eq!(original.len(), reconstructed.len());

    let signal_power: f64 = original.iter().map(|x| x.norm_sqr()).sum();
    let noise_power: f64 = original
        .iter()
        .zip(reconstructed.iter())
        .map(|(o, r)| (o - r).norm_sqr())
        .sum();

    if noise_power == 0.0 {
        f64::INFINITY
    } else {
        10.0 * (signal_power / noise_power).log10()
    }
}
