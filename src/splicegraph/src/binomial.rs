//! Binomial tail score used by the (uninvoked-by-default) boundary
//! identification heuristic in [`crate::boundary`].

const LANCZOS_G: f64 = 7.0;
const LANCZOS_COEFFICIENTS: [f64; 9] = [
    0.999_999_999_999_809_93,
    676.520_368_121_885_1,
    -1_259.139_216_722_402_8,
    771.323_428_777_653_1,
    -176.615_029_162_140_6,
    12.507_343_278_686_905,
    -0.138_571_095_265_720_12,
    9.984_369_578_019_572e-6,
    1.505_632_735_149_311_6e-7,
];

/// Natural log of the gamma function, via the Lanczos approximation.
/// Accurate to ~15 significant digits for `x > 0`.
fn ln_gamma(x: f64) -> f64 {
    if x < 0.5 {
        // Reflection formula: keep the argument away from the pole at 0.
        let pi = std::f64::consts::PI;
        (pi / (pi * x).sin()).ln() - ln_gamma(1.0 - x)
    } else {
        let x = x - 1.0;
        let mut a = LANCZOS_COEFFICIENTS[0];
        let t = x + LANCZOS_G + 0.5;
        for (i, c) in LANCZOS_COEFFICIENTS.iter().enumerate().skip(1) {
            a += c / (x + i as f64);
        }
        0.5 * (2.0 * std::f64::consts::PI).ln() + (x + 0.5) * t.ln() - t + a.ln()
    }
}

fn ln_binomial_coefficient(n: u32, k: u32) -> f64 {
    ln_gamma(n as f64 + 1.0) - ln_gamma(k as f64 + 1.0) - ln_gamma((n - k) as f64 + 1.0)
}

/// `-log10( P(X >= k) )` for `X ~ Binomial(n, r)`, computed via a
/// numerically stable log-space tail sum (log-sum-exp over each term's log
/// pmf). Returns `0.0` for `n == 0` or `k` outside `[0, n]`, matching the
/// reference behaviour of treating those as "no evidence either way".
pub fn compute_binomial_score(n: u32, r: f64, k: u32) -> f64 {
    if n == 0 || k > n {
        return 0.0;
    }
    assert!((0.0..=1.0).contains(&r), "binomial success probability must be in [0, 1]");

    if r <= 0.0 {
        return if k == 0 { 0.0 } else { f64::INFINITY };
    }
    if r >= 1.0 {
        return if k == n { 0.0 } else { f64::INFINITY };
    }

    let log_terms: Vec<f64> = (k..=n)
        .map(|i| ln_binomial_coefficient(n, i) + i as f64 * r.ln() + (n - i) as f64 * (1.0 - r).ln())
        .collect();

    let max_log = log_terms.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    let sum: f64 = log_terms.iter().map(|l| (l - max_log).exp()).sum();
    let ln_survival = max_log + sum.ln();

    -(ln_survival / std::f64::consts::LN_10)
}
