/// Inner product of two equally long slices.
///
/// Four independent partial sums keep the loop free of a serial dependency chain, so the
/// summation order differs from a left-to-right fold.
#[inline]
pub fn dot(a: &[f64], b: &[f64]) -> f64 {
    debug_assert_eq!(a.len(), b.len());
    let mut acc = [0.0f64; 4];
    let a_chunks = a.chunks_exact(4);
    let b_chunks = b.chunks_exact(4);
    let tail: f64 = a_chunks
        .remainder()
        .iter()
        .zip(b_chunks.remainder())
        .map(|(x, y)| x * y)
        .sum();
    for (xs, ys) in a_chunks.zip(b_chunks) {
        for ((sum, x), y) in acc.iter_mut().zip(xs).zip(ys) {
            *sum += x * y;
        }
    }
    (acc[0] + acc[1]) + (acc[2] + acc[3]) + tail
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_vectors() {
        assert_eq!(dot(&[], &[]), 0.0);
        assert_eq!(dot(&[2.0], &[3.0]), 6.0);
        assert_eq!(dot(&[1.0, 2.0, 3.0], &[4.0, 5.0, 6.0]), 32.0);
    }

    #[test]
    fn matches_naive_sum() {
        let a: [f64; 11] = core::array::from_fn(|i| i as f64 * 0.5 - 2.0);
        let b: [f64; 11] = core::array::from_fn(|i| 1.0 / (i as f64 + 1.0));
        let naive: f64 = a.iter().zip(&b).map(|(x, y)| x * y).sum();
        assert!((dot(&a, &b) - naive).abs() <= 1e-12 * naive.abs().max(1.0));
    }
}
