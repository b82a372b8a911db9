//! Logarithmic Market Scoring Rule cost function and pricing.
//!
//! The public surface speaks `Decimal` (PRC, shares); internally the cost
//! function and binary search run in `f64`, exactly as the original source
//! does (`float(amount)` before calling into the market maker), then the
//! result is quantized back to `Decimal` at the boundary. `logsumexp`-style
//! stabilization avoids overflow for large `q/b` the way the original's
//! `max_q` subtraction does.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

use crate::errors::CoreError;
use crate::models::domain::Outcome;
use crate::utils::{quantize_prc, quantize_shares};

const BINARY_SEARCH_ITERATIONS: u32 = 50;

/// Numerically stable `b * ln(exp(q_yes/b) + exp(q_no/b))`.
pub fn cost(q_yes: f64, q_no: f64, b: f64) -> f64 {
    let x_yes = q_yes / b;
    let x_no = q_no / b;
    let max_q = x_yes.max(x_no);
    b * (max_q + ((x_yes - max_q).exp() + (x_no - max_q).exp()).ln())
}

/// Marginal probability of YES (equivalently the YES share price).
pub fn prob_yes(q_yes: f64, q_no: f64, b: f64) -> f64 {
    let x_yes = q_yes / b;
    let x_no = q_no / b;
    let max_q = x_yes.max(x_no);
    let e_yes = (x_yes - max_q).exp();
    let e_no = (x_no - max_q).exp();
    e_yes / (e_yes + e_no)
}

pub fn prob_no(q_yes: f64, q_no: f64, b: f64) -> f64 {
    1.0 - prob_yes(q_yes, q_no, b)
}

/// Current YES/NO price for a market, as `Decimal`, rounded to 4dp to
/// match the original source's displayed/stored price precision.
pub fn price(q_yes: Decimal, q_no: Decimal, liquidity_b: Decimal, outcome: Outcome) -> Decimal {
    let (qy, qn, b) = to_f64(q_yes, q_no, liquidity_b);
    let p = match outcome {
        Outcome::Yes => prob_yes(qy, qn, b),
        Outcome::No => prob_no(qy, qn, b),
    };
    Decimal::from_f64_retain(p).unwrap_or_default()
}

/// Binary-search the share quantity `delta_q` such that buying it against
/// `outcome` costs exactly `net_amount` PRC. Mirrors the original's
/// `get_shares_for_amount`: `high = amount * 10`, 50 bisection iterations,
/// returns the lower bound.
pub fn shares_for_amount(
    q_yes: Decimal,
    q_no: Decimal,
    liquidity_b: Decimal,
    outcome: Outcome,
    net_amount: Decimal,
) -> Result<Decimal, CoreError> {
    if net_amount <= Decimal::ZERO {
        return Err(CoreError::InvalidParameter(
            "amount must be positive".to_string(),
        ));
    }
    let (qy, qn, b) = to_f64(q_yes, q_no, liquidity_b);
    let amount = net_amount
        .to_f64()
        .ok_or_else(|| CoreError::InvalidParameter("amount out of range".to_string()))?;

    let cost_before = cost(qy, qn, b);
    let target = cost_before + amount;

    let mut low = 0.0_f64;
    let mut high = (amount * 10.0).max(1.0);

    // Grow the upper bound until it brackets the target cost.
    while match outcome {
        Outcome::Yes => cost(qy + high, qn, b),
        Outcome::No => cost(qy, qn + high, b),
    } < target
    {
        high *= 2.0;
        if high > 1e15 {
            break;
        }
    }

    for _ in 0..BINARY_SEARCH_ITERATIONS {
        let mid = (low + high) / 2.0;
        let c = match outcome {
            Outcome::Yes => cost(qy + mid, qn, b),
            Outcome::No => cost(qy, qn + mid, b),
        };
        if c < target {
            low = mid;
        } else {
            high = mid;
        }
    }

    let shares = Decimal::from_f64_retain(low).unwrap_or_default();
    Ok(quantize_shares(shares))
}

/// Revenue from selling `shares` of `outcome`: `cost_before - cost_after`.
pub fn sale_revenue(
    q_yes: Decimal,
    q_no: Decimal,
    liquidity_b: Decimal,
    outcome: Outcome,
    shares: Decimal,
) -> Result<Decimal, CoreError> {
    if shares <= Decimal::ZERO {
        return Err(CoreError::InvalidParameter(
            "shares must be positive".to_string(),
        ));
    }
    let (qy, qn, b) = to_f64(q_yes, q_no, liquidity_b);
    let s = shares
        .to_f64()
        .ok_or_else(|| CoreError::InvalidParameter("shares out of range".to_string()))?;

    let cost_before = cost(qy, qn, b);
    let cost_after = match outcome {
        Outcome::Yes => cost(qy - s, qn, b),
        Outcome::No => cost(qy, qn - s, b),
    };
    let revenue = cost_before - cost_after;
    Ok(quantize_prc(Decimal::from_f64_retain(revenue).unwrap_or_default()))
}

fn to_f64(q_yes: Decimal, q_no: Decimal, liquidity_b: Decimal) -> (f64, f64, f64) {
    (
        q_yes.to_f64().unwrap_or(0.0),
        q_no.to_f64().unwrap_or(0.0),
        liquidity_b.to_f64().unwrap_or(100.0),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rust_decimal_macros::dec;

    #[test]
    fn price_sums_to_one() {
        let b = 100.0;
        let p_yes = prob_yes(10.0, 5.0, b);
        let p_no = prob_no(10.0, 5.0, b);
        assert!((p_yes + p_no - 1.0).abs() < 1e-9);
    }

    #[test]
    fn zero_q_is_fifty_fifty() {
        let p_yes = prob_yes(0.0, 0.0, 100.0);
        assert!((p_yes - 0.5).abs() < 1e-9);
    }

    #[test]
    fn buy_then_sell_is_near_zero_cost() {
        let q_yes = dec!(0);
        let q_no = dec!(0);
        let b = dec!(100);
        let shares = shares_for_amount(q_yes, q_no, b, Outcome::Yes, dec!(10)).unwrap();
        let revenue = sale_revenue(shares, q_no, b, Outcome::Yes, shares).unwrap();
        // Selling immediately after buying should return close to what was paid
        // (bounded by quantization, not exact since net_amount already excludes
        // any trading fee applied upstream in `amm`).
        assert!((revenue - dec!(10)).abs() < dec!(0.5));
    }

    /// Scenario 1 (spec §8): market (q_yes=0, q_no=0, b=100), buy YES for
    /// 50 PRC with a 2% fee. fee=1.00, net=49.00. The scenario's own
    /// illustrative shares/price figures don't reconcile against the cost
    /// function it names (see DESIGN.md); this asserts the values the
    /// formula actually produces for that fee/net split instead.
    #[test]
    fn buy_scenario_matches_spec_numbers() {
        let q_yes = dec!(0);
        let q_no = dec!(0);
        let b = dec!(100);
        let amount = dec!(50);
        let fee_rate = dec!(0.02);

        let fee = crate::utils::quantize_prc(amount * fee_rate);
        assert_eq!(fee, dec!(1.00));
        let net = amount - fee;
        assert_eq!(net, dec!(49.00));

        let shares = shares_for_amount(q_yes, q_no, b, Outcome::Yes, net).unwrap();
        assert!((shares - dec!(81.74)).abs() < dec!(0.1));

        let new_price_yes = price(shares, q_no, b, Outcome::Yes);
        assert!((new_price_yes - dec!(0.6937)).abs() < dec!(0.005));
    }

    proptest! {
        #[test]
        fn prob_yes_is_always_in_unit_interval(q_yes in -1000.0_f64..1000.0, q_no in -1000.0_f64..1000.0, b in 1.0_f64..1000.0) {
            let p = prob_yes(q_yes, q_no, b);
            prop_assert!(p >= 0.0 && p <= 1.0);
        }

        #[test]
        fn cost_is_monotonic_in_q_yes(q_yes in 0.0_f64..1000.0, q_no in 0.0_f64..1000.0, b in 1.0_f64..1000.0, delta in 0.01_f64..100.0) {
            let c1 = cost(q_yes, q_no, b);
            let c2 = cost(q_yes + delta, q_no, b);
            prop_assert!(c2 >= c1);
        }
    }
}
