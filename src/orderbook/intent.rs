use rust_decimal::Decimal;

use crate::models::domain::{OrderIntent, OrderSide, Outcome};

/// Translate a user-facing order intent into the unified book's
/// (side, price) pair. `buy_yes`/`sell_yes` pass the intent price through
/// unchanged; `buy_no`/`sell_no` invert both side and price, since a NO
/// order at price `p` is economically a YES order at `1 - p`. Exact match
/// for the original source's `_translate_intent`.
pub fn translate(intent: OrderIntent, intent_price: Decimal) -> (OrderSide, Decimal) {
    match intent {
        OrderIntent::BuyYes => (OrderSide::Buy, intent_price),
        OrderIntent::SellYes => (OrderSide::Sell, intent_price),
        OrderIntent::BuyNo => (OrderSide::Sell, Decimal::ONE - intent_price),
        OrderIntent::SellNo => (OrderSide::Buy, Decimal::ONE - intent_price),
    }
}

/// Inverse of `translate`'s price half: recovers the intent-denominated
/// price from a book price, given the intent. `buy_no`/`sell_no` invert
/// again since `1 - (1 - p) == p`.
pub fn intent_price_from_book(intent: OrderIntent, book_price: Decimal) -> Decimal {
    match intent {
        OrderIntent::BuyYes | OrderIntent::SellYes => book_price,
        OrderIntent::BuyNo | OrderIntent::SellNo => Decimal::ONE - book_price,
    }
}

pub fn outcome_of(intent: OrderIntent) -> Outcome {
    match intent {
        OrderIntent::BuyYes | OrderIntent::SellYes => Outcome::Yes,
        OrderIntent::BuyNo | OrderIntent::SellNo => Outcome::No,
    }
}

/// True for intents that reserve cash (`buy_yes`/`buy_no`); false for
/// intents that reserve existing shares (`sell_yes`/`sell_no`).
pub fn reserves_cash(intent: OrderIntent) -> bool {
    matches!(intent, OrderIntent::BuyYes | OrderIntent::BuyNo)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn buy_no_inverts_side_and_price() {
        assert_eq!(
            translate(OrderIntent::BuyNo, dec!(0.30)),
            (OrderSide::Sell, dec!(0.70))
        );
    }

    #[test]
    fn sell_no_inverts_side_and_price() {
        assert_eq!(
            translate(OrderIntent::SellNo, dec!(0.30)),
            (OrderSide::Buy, dec!(0.70))
        );
    }

    #[test]
    fn yes_intents_pass_through_unchanged() {
        assert_eq!(
            translate(OrderIntent::BuyYes, dec!(0.45)),
            (OrderSide::Buy, dec!(0.45))
        );
        assert_eq!(
            translate(OrderIntent::SellYes, dec!(0.45)),
            (OrderSide::Sell, dec!(0.45))
        );
    }

    #[test]
    fn intent_price_from_book_is_translate_s_inverse() {
        for intent in [
            OrderIntent::BuyYes,
            OrderIntent::SellYes,
            OrderIntent::BuyNo,
            OrderIntent::SellNo,
        ] {
            let (_, book_price) = translate(intent, dec!(0.37));
            assert_eq!(intent_price_from_book(intent, book_price), dec!(0.37));
        }
    }

    #[test]
    fn reserves_cash_matches_buy_intents_only() {
        assert!(reserves_cash(OrderIntent::BuyYes));
        assert!(reserves_cash(OrderIntent::BuyNo));
        assert!(!reserves_cash(OrderIntent::SellYes));
        assert!(!reserves_cash(OrderIntent::SellNo));
    }

    #[test]
    fn outcome_of_matches_yes_no_grouping() {
        assert_eq!(outcome_of(OrderIntent::BuyYes), Outcome::Yes);
        assert_eq!(outcome_of(OrderIntent::SellYes), Outcome::Yes);
        assert_eq!(outcome_of(OrderIntent::BuyNo), Outcome::No);
        assert_eq!(outcome_of(OrderIntent::SellNo), Outcome::No);
    }
}
