//! Maximum-net-profit projection for a Masaniello plan.
//!
//! A plan of `N` events requiring `K` wins at decimal odds `q` reaches its
//! target exactly when the worst qualifying win/loss ordering still pays
//! out. The payout multiple is `q^N / D` where the denominator
//!
//! `D = Σ_{i=K..N} count(N, i) · (q-1)^(N-i)`
//!
//! sums the admissible outcome sequences weighted by their loss exposure.
//! Unconstrained, `count(N, i)` is the binomial `C(N, i)`; with a
//! consecutive-loss cap it shrinks to the sequences whose longest loss run
//! stays within the cap.

/// Maximum net profit achievable if the win quota is met under worst-case
/// ordering. `max_consecutive_losses = 0` means unconstrained.
///
/// Degenerate inputs return 0 rather than erroring: `odds <= 1`,
/// `expected_wins > total_events`, non-finite or non-positive capital.
/// `expected_wins == 0` degenerates to the full compounding payout.
pub fn max_net_profit(
    capital: f64,
    total_events: u32,
    expected_wins: u32,
    odds: f64,
    max_consecutive_losses: u32,
) -> f64 {
    if !capital.is_finite() || capital <= 0.0 {
        return 0.0;
    }
    if !odds.is_finite() || odds <= 1.0 {
        return 0.0;
    }
    if total_events == 0 || expected_wins > total_events {
        return 0.0;
    }
    let n = total_events as usize;
    if expected_wins == 0 {
        // Every event must win: the plan compounds the whole bankroll.
        return capital * odds.powi(n as i32) - capital;
    }

    let counts = sequence_counts(n, max_consecutive_losses as usize);
    let mut denominator = 0.0;
    for i in (expected_wins as usize)..=n {
        denominator += counts[i] * (odds - 1.0).powi((n - i) as i32);
    }
    if denominator <= 0.0 || !denominator.is_finite() {
        return 0.0;
    }

    let payout = capital * odds.powi(n as i32) / denominator;
    if !payout.is_finite() {
        return 0.0;
    }
    payout - capital
}

/// Number of length-`n` win/loss sequences with exactly `i` wins, indexed
/// by `i`. With `max_run == 0` (unconstrained) this is the binomial row;
/// otherwise sequences containing a loss run longer than `max_run` are
/// excluded, via a DP over (wins so far, trailing loss run).
fn sequence_counts(n: usize, max_run: usize) -> Vec<f64> {
    if max_run == 0 || max_run >= n {
        return (0..=n).map(|i| binomial(n as u32, i as u32)).collect();
    }

    // dp[w][r] = prefixes with w wins ending in a run of r losses
    let mut dp = vec![vec![0.0_f64; max_run + 1]; n + 1];
    dp[0][0] = 1.0;
    for _ in 0..n {
        let mut next = vec![vec![0.0_f64; max_run + 1]; n + 1];
        for w in 0..=n {
            for r in 0..=max_run {
                let c = dp[w][r];
                if c == 0.0 {
                    continue;
                }
                if w < n {
                    next[w + 1][0] += c;
                }
                if r < max_run {
                    next[w][r + 1] += c;
                }
            }
        }
        dp = next;
    }
    dp.iter().map(|row| row.iter().sum()).collect()
}

/// Binomial coefficient via the multiplicative formula with symmetry
/// reduction; avoids factorial overflow for n up to ~50.
fn binomial(n: u32, k: u32) -> f64 {
    if k > n {
        return 0.0;
    }
    let k = k.min(n - k);
    let mut c = 1.0;
    for j in 0..k {
        c = c * (n - j) as f64 / (j + 1) as f64;
    }
    c
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_binomial_symmetry() {
        assert_eq!(binomial(14, 5), binomial(14, 9));
        assert_eq!(binomial(14, 5), 2002.0);
        assert_eq!(binomial(5, 0), 1.0);
        assert_eq!(binomial(5, 6), 0.0);
    }

    #[test]
    fn test_binomial_large_n_stays_finite() {
        assert!(binomial(50, 25).is_finite());
        assert!(binomial(50, 25) > 1e13);
    }

    #[test]
    fn test_reference_projection() {
        // 1000 capital, 14 events, 5 wins at 3.0 odds.
        let profit = max_net_profit(1000.0, 14, 5, 3.0, 0);
        assert!(
            (profit - 906.58).abs() < 0.01,
            "expected ~906.58, got {profit}"
        );
    }

    #[test]
    fn test_profit_positive_for_valid_inputs() {
        for n in 1..=20 {
            for k in 1..=n {
                let profit = max_net_profit(500.0, n, k, 1.8, 0);
                assert!(profit > 0.0, "profit not positive for N={n} K={k}");
            }
        }
    }

    #[test]
    fn test_odds_at_or_below_one_yield_zero() {
        assert_eq!(max_net_profit(1000.0, 10, 5, 1.0, 0), 0.0);
        assert_eq!(max_net_profit(1000.0, 10, 5, 0.8, 0), 0.0);
    }

    #[test]
    fn test_degenerate_inputs_yield_zero() {
        assert_eq!(max_net_profit(0.0, 10, 5, 2.0, 0), 0.0);
        assert_eq!(max_net_profit(-100.0, 10, 5, 2.0, 0), 0.0);
        assert_eq!(max_net_profit(f64::NAN, 10, 5, 2.0, 0), 0.0);
        assert_eq!(max_net_profit(1000.0, 10, 11, 2.0, 0), 0.0);
        assert_eq!(max_net_profit(1000.0, 0, 0, 2.0, 0), 0.0);
    }

    #[test]
    fn test_zero_expected_wins_compounds() {
        let profit = max_net_profit(100.0, 3, 0, 2.0, 0);
        assert!((profit - 700.0).abs() < 1e-9); // 100 * 2^3 - 100
    }

    #[test]
    fn test_all_wins_required_compounds() {
        // K == N: the only qualifying sequence is all wins, D = 1.
        let profit = max_net_profit(100.0, 4, 4, 2.0, 0);
        assert!((profit - 1500.0).abs() < 1e-9); // 100 * 16 - 100
    }

    #[test]
    fn test_sequence_counts_unconstrained_match_binomial() {
        let counts = sequence_counts(14, 0);
        for (i, c) in counts.iter().enumerate() {
            assert_eq!(*c, binomial(14, i as u32));
        }
    }

    #[test]
    fn test_sequence_counts_hand_counted() {
        // Length 5, max loss run 2. With 2 wins and 3 losses, the ten
        // arrangements of WWLLL lose the three containing an LLL block.
        let counts = sequence_counts(5, 2);
        assert_eq!(counts[2], 7.0);
        // 3 wins / 2 losses cannot form a run of 3: all C(5,3) survive.
        assert_eq!(counts[3], 10.0);
        assert_eq!(counts[4], 5.0);
        assert_eq!(counts[5], 1.0);
        // All-loss sequence violates any cap below 5.
        assert_eq!(counts[0], 0.0);
    }

    #[test]
    fn test_loss_cap_raises_payout() {
        // Fewer admissible sequences shrink the denominator, so the same
        // quota must pay out more per qualifying path.
        let unconstrained = max_net_profit(1000.0, 5, 2, 2.0, 0);
        let constrained = max_net_profit(1000.0, 5, 2, 2.0, 2);
        assert!(constrained > unconstrained);
        // Hand check: D = 26 unconstrained, 23 with the cap, payout 32/D.
        assert!((unconstrained - (1000.0 * 32.0 / 26.0 - 1000.0)).abs() < 1e-6);
        assert!((constrained - (1000.0 * 32.0 / 23.0 - 1000.0)).abs() < 1e-6);
    }

    #[test]
    fn test_loss_cap_wider_than_plan_is_noop() {
        let a = max_net_profit(1000.0, 8, 4, 2.5, 0);
        let b = max_net_profit(1000.0, 8, 4, 2.5, 8);
        assert!((a - b).abs() < 1e-9);
    }
}
