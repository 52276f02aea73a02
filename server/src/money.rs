use rust_decimal::{prelude::ToPrimitive, Decimal, RoundingStrategy};

/// Decimal places the ledger supports for XRP amounts.
pub const XRP_PRECISION: u32 = 6;

/// Drops per XRP, the smallest ledger-native unit.
pub const DROPS_PER_XRP: i64 = 1_000_000;

/// Smallest accepted donation, in XRP.
pub const MIN_DONATION_XRP: i64 = 1;

/// XP granted per donated XRP; partial XRP earn no XP.
pub const XP_PER_XRP: i64 = 10;

/// Fraction of each donation retained by the platform.
pub fn platform_fee_rate() -> Decimal {
    Decimal::new(5, 2)
}

/// A gross donation split into the platform fee and the net amount
/// forwarded to the organization wallet.
#[derive(Clone, Debug, PartialEq)]
pub struct DonationSplit {
    pub amount: Decimal,
    pub platform_fee: Decimal,
    pub net_amount: Decimal,
}

/// Splits a gross donation into fee and net at ledger precision. The input
/// is quantized first so `platform_fee + net_amount == amount` holds
/// exactly.
pub fn split_donation(amount: Decimal) -> DonationSplit {
    let amount =
        amount.round_dp_with_strategy(XRP_PRECISION, RoundingStrategy::MidpointAwayFromZero);
    let platform_fee = (amount * platform_fee_rate())
        .round_dp_with_strategy(XRP_PRECISION, RoundingStrategy::MidpointAwayFromZero);
    let net_amount = amount - platform_fee;
    DonationSplit {
        amount,
        platform_fee,
        net_amount,
    }
}

/// Converts an XRP amount to integral drops. None when the amount carries
/// more precision than the ledger supports or does not fit an i64.
pub fn xrp_to_drops(amount: Decimal) -> Option<i64> {
    let drops = amount.checked_mul(Decimal::from(DROPS_PER_XRP))?;
    if drops.fract() != Decimal::ZERO {
        return None;
    }
    drops.to_i64()
}

/// XP earned for a donation: floor of amount times the XP rate.
pub fn xp_for_amount(amount: Decimal) -> i64 {
    (amount * Decimal::from(XP_PER_XRP))
        .floor()
        .to_i64()
        .unwrap_or(i64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    pub fn splits_ten_xrp() {
        let split = split_donation(dec!(10));
        assert_eq!(split.platform_fee, dec!(0.5));
        assert_eq!(split.net_amount, dec!(9.5));
        assert_eq!(xrp_to_drops(split.net_amount), Some(9_500_000));
    }

    #[test]
    pub fn fee_plus_net_equals_amount() {
        for amount in [
            dec!(1),
            dec!(2.5),
            dec!(10),
            dec!(33.333333),
            dec!(100.000001),
            dec!(987654.321),
        ] {
            let split = split_donation(amount);
            assert_eq!(split.platform_fee + split.net_amount, split.amount);
            assert_eq!(
                split.platform_fee,
                (amount * dec!(0.05)).round_dp_with_strategy(
                    XRP_PRECISION,
                    RoundingStrategy::MidpointAwayFromZero
                )
            );
        }
    }

    #[test]
    pub fn quantizes_oversized_precision() {
        // 7 decimal places round into the ledger's 6.
        let split = split_donation(dec!(1.2345675));
        assert_eq!(split.amount, dec!(1.234568));
        assert_eq!(split.platform_fee + split.net_amount, split.amount);
        assert!(xrp_to_drops(split.net_amount).is_some());
    }

    #[test]
    pub fn drops_reject_sub_drop_precision() {
        assert_eq!(xrp_to_drops(dec!(9.5)), Some(9_500_000));
        assert_eq!(xrp_to_drops(dec!(0.0000001)), None);
    }

    #[test]
    pub fn xp_uses_integer_floor() {
        assert_eq!(xp_for_amount(dec!(10)), 100);
        assert_eq!(xp_for_amount(dec!(2.59)), 25);
        assert_eq!(xp_for_amount(dec!(0.09)), 0);
    }
}
