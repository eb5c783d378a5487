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

//! Circular array helpers used by the synthesis plan and the window utilities.
//!
//! All shifts follow one convention: shifting by `s` moves the element at
//! index `i` to index `(i + s) mod len`.

/// Remainder of `x / modulus` in `[0, modulus)`, also for negative `x`.
///
/// # Panics
///
/// Panics if `modulus` is 0.
#[inline]
pub fn positive_rem(x: isize, modulus: usize) -> usize {
    x.rem_euclid(modulus as isize) as usize
}

/// Circularly shift `input` by `shift` places into `output`.
///
/// `output[(i + shift) mod len] = input[i]`. Negative shifts move elements
/// towards the start.
///
/// # Panics
///
/// Panics if the slices differ in length.
pub fn circshift<T: Copy>(input: &[T], shift: isize, output: &mut [T]) {
    assert_eq!(input.len(), output.len(), "circshift length mismatch");
    let len = input.len();
    if len == 0 {
        return;
    }

    let s = positive_rem(shift, len);
    output[s..].copy_from_slice(&input[..len - s]);
    output[..s].copy_from_slice(&input[len - s..]);
}

/// Move the element at index 0 to the middle (`len / 2`).
///
/// Converts a zero-centred (FIR) layout into a natural left-to-right layout.
pub fn fftshift<T: Copy>(input: &[T], output: &mut [T]) {
    circshift(input, (input.len() / 2) as isize, output);
}

/// Inverse of [`fftshift`]: the element at `len / 2` moves to index 0.
pub fn ifftshift<T: Copy>(input: &[T], output: &mut [T]) {
    circshift(input, -((input.len() / 2) as isize), output);
}

/// Periodize the first `period` elements of `buffer` over the first `len`
/// elements, in place: `buffer[i] = buffer[i mod period]` for `i < len`.
///
/// When `len <= period` this is a truncation and nothing moves.
///
/// # Panics
///
/// Panics if `period` is 0 or `buffer` is shorter than `len`.
pub fn periodize<T: Copy>(buffer: &mut [T], period: usize, len: usize) {
    assert!(period > 0, "period must be positive");
    assert!(buffer.len() >= len, "buffer shorter than periodized length");

    let mut start = period;
    while start < len {
        let chunk = period.min(len - start);
        buffer.copy_within(0..chunk, start);
        start += period;
    }
}
