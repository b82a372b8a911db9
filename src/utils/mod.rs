use rust_decimal::Decimal;
use rust_decimal::RoundingStrategy;

/// Quantize a PRC amount to 2 fractional digits, half-up, mirroring the
/// original source's `Decimal.quantize(Decimal("0.01"))` default rounding.
pub fn quantize_prc(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Quantize a share count to 6 fractional digits.
pub fn quantize_shares(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(6, RoundingStrategy::MidpointAwayFromZero)
}

/// Quantize a probability/price to 4 fractional digits (price history,
/// price-at-trade), matching the original source's `round(price, 4)`.
pub fn quantize_price_4dp(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(4, RoundingStrategy::MidpointAwayFromZero)
}

/// Quantize a CLOB limit price to 2 fractional digits (tick size PRC 0.01).
pub fn quantize_price_2dp(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn quantize_prc_rounds_half_away_from_zero() {
        assert_eq!(quantize_prc(dec!(1.005)), dec!(1.01));
        assert_eq!(quantize_prc(dec!(-1.005)), dec!(-1.01));
        assert_eq!(quantize_prc(dec!(1.004)), dec!(1.00));
    }

    #[test]
    fn quantize_shares_keeps_six_digits() {
        assert_eq!(quantize_shares(dec!(1.1234565)), dec!(1.123457));
    }

    #[test]
    fn quantize_price_4dp_and_2dp_differ_in_precision() {
        assert_eq!(quantize_price_4dp(dec!(0.123456)), dec!(0.1235));
        assert_eq!(quantize_price_2dp(dec!(0.567)), dec!(0.57));
    }
}
