//! The Poisson distribution: exact probability mass and sampling.

use tinyrand::Rand;

/// Largest mean drawn in a single pass of the multiplicative sampler. `exp(-λ)` stays well clear
/// of subnormal territory below this value.
const MAX_CHUNK_LAMBDA: f64 = 500.0;

/// Probability of exactly `k` events, given a mean of `lambda`.
#[inline]
pub fn univariate(k: u16, lambda: f64) -> f64 {
    debug_assert!(lambda >= 0.0, "invalid lambda {lambda}");
    // accumulated in log space so that neither e^-λ nor λ^k/k! over/underflows
    let mut log_prob = -lambda;
    for i in 1..=k {
        log_prob += f64::ln(lambda / i as f64);
    }
    log_prob.exp()
}

/// Draws a single variate with mean `lambda`.
///
/// Uses Knuth's multiplicative method. Larger means are split into chunks and the partial draws
/// summed, relying on the sum of independent Poisson variates being Poisson.
#[inline]
pub fn sample(lambda: f64, rand: &mut impl Rand) -> u16 {
    debug_assert!(lambda.is_finite() && lambda >= 0.0, "invalid lambda {lambda}");
    let mut remaining = lambda;
    let mut total: u16 = 0;
    while remaining > MAX_CHUNK_LAMBDA {
        total = total.saturating_add(sample_chunk(MAX_CHUNK_LAMBDA, rand));
        remaining -= MAX_CHUNK_LAMBDA;
    }
    total.saturating_add(sample_chunk(remaining, rand))
}

#[inline(always)]
fn sample_chunk(lambda: f64, rand: &mut impl Rand) -> u16 {
    let limit = f64::exp(-lambda);
    let mut k: u16 = 0;
    let mut product = random_f64(rand);
    while product > limit {
        k = k.saturating_add(1);
        product *= random_f64(rand);
    }
    k
}

#[inline(always)]
fn random_f64(rand: &mut impl Rand) -> f64 {
    rand.next_u64() as f64 / u64::MAX as f64
}

#[cfg(test)]
mod tests {
    use assert_float_eq::*;
    use tinyrand::{Seeded, StdRand};

    use super::*;

    #[test]
    fn test_univariate() {
        assert_float_relative_eq!(0.36787944117144233, univariate(0, 1.0));
        assert_float_relative_eq!(0.36787944117144233, univariate(1, 1.0));
        assert_float_relative_eq!(0.18393972058572117, univariate(2, 1.0));
        assert_float_relative_eq!(0.0820849986238988, univariate(0, 2.5));
        assert_float_relative_eq!(0.205212496559747, univariate(1, 2.5));
        assert_float_relative_eq!(0.25651562069968376, univariate(2, 2.5));
        assert_float_relative_eq!(0.29753799879885576, univariate(1, 1.8));
        assert_float_relative_eq!(0.2677841989189702, univariate(2, 1.8));
    }

    #[test]
    fn univariate_zero_lambda() {
        assert_eq!(1.0, univariate(0, 0.0));
        assert_eq!(0.0, univariate(1, 0.0));
        assert_eq!(0.0, univariate(5, 0.0));
    }

    #[test]
    fn univariate_large_k_stays_finite() {
        let prob = univariate(200, 2.0);
        assert!(prob.is_finite());
        assert!(prob >= 0.0);
        let total: f64 = (0..=60).map(|k| univariate(k, 12.0)).sum();
        assert_float_absolute_eq!(1.0, total, 1e-9);
    }

    #[test]
    fn univariate_large_lambda() {
        assert_float_relative_eq!(0.012614611348719664, univariate(1_000, 1_000.0), 1e-9);
        assert_eq!(0.0, univariate(0, 1_000.0));
        let total: f64 = (800..=1_200).map(|k| univariate(k, 1_000.0)).sum();
        assert_float_absolute_eq!(1.0, total, 1e-6);
    }

    #[test]
    fn sample_zero_lambda() {
        let mut rand = StdRand::seed(42);
        for _ in 0..1_000 {
            assert_eq!(0, sample(0.0, &mut rand));
        }
    }

    #[test]
    fn sample_mean_and_variance() {
        const SAMPLES: usize = 200_000;
        let mut rand = StdRand::seed(7);
        for lambda in [0.4, 1.25, 2.592, 6.0] {
            let draws: Vec<_> = (0..SAMPLES).map(|_| sample(lambda, &mut rand) as f64).collect();
            let mean = draws.iter().sum::<f64>() / SAMPLES as f64;
            let variance =
                draws.iter().map(|draw| (draw - mean).powi(2)).sum::<f64>() / SAMPLES as f64;
            assert_float_relative_eq!(lambda, mean, 0.02);
            assert_float_relative_eq!(lambda, variance, 0.04);
        }
    }

    #[test]
    fn sample_frequencies_match_pmf() {
        const SAMPLES: usize = 200_000;
        let lambda = 1.8;
        let mut rand = StdRand::seed(11);
        let mut counts = [0u64; 16];
        for _ in 0..SAMPLES {
            let k = sample(lambda, &mut rand) as usize;
            if k < counts.len() {
                counts[k] += 1;
            }
        }
        for (k, &count) in counts.iter().enumerate().take(6) {
            let freq = count as f64 / SAMPLES as f64;
            assert_float_absolute_eq!(univariate(k as u16, lambda), freq, 0.005);
        }
    }

    #[test]
    fn sample_large_lambda() {
        const SAMPLES: usize = 2_000;
        let lambda = 1_200.0;
        let mut rand = StdRand::seed(3);
        let mean = (0..SAMPLES)
            .map(|_| sample(lambda, &mut rand) as f64)
            .sum::<f64>()
            / SAMPLES as f64;
        assert_float_relative_eq!(lambda, mean, 0.01);
    }
}
