//! Packaging arithmetic and the derived fields that hang off it.
//!
//! Every numeric input on an [`ItemRecord`] is free text. Parsing reads the
//! leading numeric prefix and never fails: counts and amounts fall back to
//! zero, multipliers fall back to one so a blank multiplier cannot wipe out the
//! line total.

use std::str::FromStr;

use rust_decimal::{Decimal, RoundingStrategy};

use crate::models::{ItemRecord, PackagingType};

pub const ZERO_PRICE: &str = "0.00";

pub fn parse_count(raw: &str) -> i64 {
    leading_integer(raw).unwrap_or(0)
}

/// A multiplier that is blank, unparseable or zero counts as one.
pub fn parse_multiplier(raw: &str) -> i64 {
    match leading_integer(raw) {
        None | Some(0) => 1,
        Some(value) => value,
    }
}

pub fn parse_amount(raw: &str) -> Decimal {
    leading_decimal(raw).unwrap_or(Decimal::ZERO)
}

pub fn derive_total_quantity(item: &ItemRecord) -> i64 {
    let total_units = parse_count(&item.total_units);

    match &item.packaging_type {
        PackagingType::Simple | PackagingType::Unrecognized(_) => total_units,
        PackagingType::Carton | PackagingType::Pieces => {
            total_units.saturating_mul(parse_multiplier(&item.units_per_pack))
        }
        PackagingType::BoxPiecesPacks => total_units
            .saturating_mul(parse_multiplier(&item.units_per_pack))
            .saturating_mul(parse_multiplier(&item.packs_per_unit)),
    }
}

/// Per-unit cost back-computed from the amount paid for the whole line.
pub fn derive_purchase_price(item: &ItemRecord) -> String {
    unit_price(parse_amount(&item.final_amount), derive_total_quantity(item))
}

pub fn unit_price(amount: Decimal, quantity: i64) -> String {
    if quantity <= 0 || amount <= Decimal::ZERO {
        return ZERO_PRICE.to_string();
    }

    amount
        .checked_div(Decimal::from(quantity))
        .map(format_money)
        .unwrap_or_else(|| ZERO_PRICE.to_string())
}

/// The value auto mode pins `openingStock` to, or `None` in manual mode.
pub fn derive_opening_stock(item: &ItemRecord) -> Option<String> {
    item.auto_calculate_stock
        .then(|| derive_total_quantity(item).to_string())
}

pub fn describe_quantity(item: &ItemRecord) -> String {
    let total_units = &item.total_units;
    let units_per_pack = &item.units_per_pack;

    match &item.packaging_type {
        PackagingType::Simple | PackagingType::Unrecognized(_) => format!("{total_units} units"),
        PackagingType::Carton => format!("{total_units} cartons × {units_per_pack} units each"),
        PackagingType::Pieces => format!("{total_units} pieces × {units_per_pack} units each"),
        PackagingType::BoxPiecesPacks => format!(
            "{total_units} boxes × {units_per_pack} pieces × {} packs each",
            item.packs_per_unit
        ),
    }
}

pub fn sum_final_amounts<'a>(items: impl IntoIterator<Item = &'a ItemRecord>) -> Decimal {
    items
        .into_iter()
        .map(|item| parse_amount(&item.final_amount))
        .fold(Decimal::ZERO, Decimal::saturating_add)
}

/// Two fraction digits, halves rounded away from zero.
pub fn format_money(value: Decimal) -> String {
    let rounded = value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    format!("{rounded:.2}")
}

fn leading_integer(raw: &str) -> Option<i64> {
    let text = raw.trim_start();
    let bytes = text.as_bytes();

    let mut end = usize::from(matches!(bytes.first(), Some(b'+' | b'-')));
    let digits_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    if end == digits_start {
        return None;
    }

    let prefix = &text[..end];
    match prefix.parse::<i64>() {
        Ok(value) => Some(value),
        Err(_) if prefix.starts_with('-') => Some(i64::MIN),
        Err(_) => Some(i64::MAX),
    }
}

const MAX_FRACTION_DIGITS: usize = 28;

fn leading_decimal(raw: &str) -> Option<Decimal> {
    let text = raw.trim_start();
    let bytes = text.as_bytes();
    let digits_in = |from: usize| {
        bytes[from..]
            .iter()
            .take_while(|byte| byte.is_ascii_digit())
            .count()
    };

    let negative = bytes.first() == Some(&b'-');
    let mut end = usize::from(matches!(bytes.first(), Some(b'+' | b'-')));

    let whole = &text[end..end + digits_in(end)];
    end += whole.len();

    let mut fraction = "";
    if bytes.get(end) == Some(&b'.') {
        let len = digits_in(end + 1);
        if whole.len() + len > 0 {
            fraction = &text[end + 1..end + 1 + len];
            end += 1 + len;
        }
    }
    if whole.is_empty() && fraction.is_empty() {
        return None;
    }

    let fraction = &fraction[..fraction.len().min(MAX_FRACTION_DIGITS)];
    let mut canonical = String::with_capacity(end + 4);
    if negative {
        canonical.push('-');
    }
    canonical.push_str(if whole.is_empty() { "0" } else { whole });
    if !fraction.is_empty() {
        canonical.push('.');
        canonical.push_str(fraction);
    }

    let sign_len = usize::from(matches!(bytes.get(end + 1), Some(b'+' | b'-')));
    let exponent_len = match bytes.get(end) {
        Some(b'e' | b'E') => digits_in(end + 1 + sign_len),
        _ => 0,
    };
    let shrinking = exponent_len > 0 && bytes.get(end + 1) == Some(&b'-');
    let parsed = if exponent_len > 0 {
        let start = end + 1 + sign_len;
        canonical.push_str(if shrinking { "e-" } else { "e" });
        canonical.push_str(&text[start..start + exponent_len]);
        Decimal::from_scientific(&canonical)
    } else {
        Decimal::from_str(&canonical)
    };

    let is_zero = whole.bytes().chain(fraction.bytes()).all(|digit| digit == b'0');
    Some(match parsed {
        Ok(value) => value,
        Err(_) if is_zero || shrinking => Decimal::ZERO,
        Err(_) if negative => Decimal::MIN,
        Err(_) => Decimal::MAX,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(packaging_type: PackagingType, total: &str, per_pack: &str, packs: &str) -> ItemRecord {
        ItemRecord {
            packaging_type,
            total_units: total.to_string(),
            units_per_pack: per_pack.to_string(),
            packs_per_unit: packs.to_string(),
            ..ItemRecord::empty(1)
        }
    }

    fn dec(value: &str) -> Decimal {
        Decimal::from_str(value).unwrap()
    }

    #[test]
    fn simple_quantity_is_the_plain_count() {
        assert_eq!(derive_total_quantity(&item(PackagingType::Simple, "20", "", "")), 20);
    }

    #[test]
    fn carton_and_pieces_multiply_two_levels() {
        assert_eq!(derive_total_quantity(&item(PackagingType::Carton, "4", "5", "")), 20);
        assert_eq!(derive_total_quantity(&item(PackagingType::Pieces, "4", "30", "")), 120);
    }

    #[test]
    fn box_pieces_packs_multiplies_three_levels() {
        assert_eq!(
            derive_total_quantity(&item(PackagingType::BoxPiecesPacks, "2", "12", "10")),
            240
        );
    }

    #[test]
    fn blank_multiplier_counts_as_one() {
        assert_eq!(derive_total_quantity(&item(PackagingType::Carton, "7", "", "")), 7);
        assert_eq!(
            derive_total_quantity(&item(PackagingType::BoxPiecesPacks, "3", "abc", "")),
            3
        );
    }

    #[test]
    fn zero_multiplier_counts_as_one() {
        assert_eq!(derive_total_quantity(&item(PackagingType::Carton, "6", "0", "")), 6);
    }

    #[test]
    fn inactive_fields_are_ignored() {
        assert_eq!(derive_total_quantity(&item(PackagingType::Simple, "9", "4", "3")), 9);
        assert_eq!(derive_total_quantity(&item(PackagingType::Carton, "2", "4", "3")), 8);
        assert_eq!(derive_total_quantity(&item(PackagingType::from_wire("tin"), "5", "4", "3")), 5);
    }

    #[test]
    fn blank_count_yields_zero() {
        assert_eq!(derive_total_quantity(&item(PackagingType::Carton, "", "5", "")), 0);
    }

    #[test]
    fn counts_read_the_leading_integer_prefix() {
        assert_eq!(parse_count("12.7"), 12);
        assert_eq!(parse_count("  5kg"), 5);
        assert_eq!(parse_count("+8"), 8);
        assert_eq!(parse_count("-3"), -3);
        assert_eq!(parse_count("kg5"), 0);
        assert_eq!(parse_count("-"), 0);
        assert_eq!(parse_count("99999999999999999999"), i64::MAX);
    }

    #[test]
    fn negative_counts_propagate() {
        assert_eq!(derive_total_quantity(&item(PackagingType::Carton, "-2", "5", "")), -10);
    }

    #[test]
    fn amounts_read_the_leading_decimal_prefix() {
        assert_eq!(parse_amount("100.5"), dec("100.5"));
        assert_eq!(parse_amount(" 49.50 rupees"), dec("49.50"));
        assert_eq!(parse_amount(".5"), dec("0.5"));
        assert_eq!(parse_amount("5."), dec("5"));
        assert_eq!(parse_amount("-2.25"), dec("-2.25"));
        assert_eq!(parse_amount("1e3"), dec("1000"));
        assert_eq!(parse_amount("2.5E-1"), dec("0.25"));
        assert_eq!(parse_amount("3e"), dec("3"));
        assert_eq!(parse_amount("."), Decimal::ZERO);
        assert_eq!(parse_amount(""), Decimal::ZERO);
        assert_eq!(parse_amount("₹100"), Decimal::ZERO);
    }

    #[test]
    fn oversized_amounts_saturate() {
        assert_eq!(parse_amount("1e30"), Decimal::MAX);
        assert_eq!(parse_amount("123456789012345678901234567890"), Decimal::MAX);
        assert_eq!(parse_amount("-9e40"), Decimal::MIN);
        assert_eq!(parse_amount("0e99"), Decimal::ZERO);
        assert_eq!(parse_amount("1e-40"), Decimal::ZERO);
    }

    #[test]
    fn purchase_price_divides_amount_by_quantity() {
        let mut record = item(PackagingType::Simple, "20", "", "");
        record.final_amount = "100".to_string();
        assert_eq!(derive_purchase_price(&record), "5.00");

        record.final_amount = "10".to_string();
        record.total_units = "3".to_string();
        assert_eq!(derive_purchase_price(&record), "3.33");

        record.final_amount = "1".to_string();
        record.total_units = "8".to_string();
        assert_eq!(derive_purchase_price(&record), "0.13");
    }

    #[test]
    fn purchase_price_is_zero_without_quantity_or_amount() {
        let mut record = item(PackagingType::Simple, "0", "", "");
        record.final_amount = "100".to_string();
        assert_eq!(derive_purchase_price(&record), ZERO_PRICE);

        record.total_units = "".to_string();
        assert_eq!(derive_purchase_price(&record), ZERO_PRICE);

        record.total_units = "10".to_string();
        record.final_amount = "".to_string();
        assert_eq!(derive_purchase_price(&record), ZERO_PRICE);

        record.final_amount = "-50".to_string();
        assert_eq!(derive_purchase_price(&record), ZERO_PRICE);
    }

    #[test]
    fn opening_stock_follows_mode() {
        let mut record = item(PackagingType::Carton, "4", "5", "");
        assert_eq!(derive_opening_stock(&record).as_deref(), Some("20"));

        record.auto_calculate_stock = false;
        assert_eq!(derive_opening_stock(&record), None);
    }

    #[test]
    fn quantity_description_depends_on_packaging() {
        assert_eq!(
            describe_quantity(&item(PackagingType::Simple, "20", "", "")),
            "20 units"
        );
        assert_eq!(
            describe_quantity(&item(PackagingType::Carton, "4", "5", "")),
            "4 cartons × 5 units each"
        );
        assert_eq!(
            describe_quantity(&item(PackagingType::Pieces, "4", "30", "")),
            "4 pieces × 30 units each"
        );
        assert_eq!(
            describe_quantity(&item(PackagingType::BoxPiecesPacks, "2", "12", "10")),
            "2 boxes × 12 pieces × 10 packs each"
        );
    }

    #[test]
    fn total_sums_final_amounts() {
        let mut first = ItemRecord::empty(1);
        first.final_amount = "100.5".to_string();
        let mut second = ItemRecord::empty(2);
        second.final_amount = "49.50".to_string();
        let mut third = ItemRecord::empty(3);
        third.final_amount = "n/a".to_string();

        let total = sum_final_amounts([&first, &second, &third]);
        assert_eq!(format_money(total), "150.00");
    }

    #[test]
    fn money_rounds_half_away_from_zero() {
        assert_eq!(format_money(dec("2.345")), "2.35");
        assert_eq!(format_money(dec("2.344")), "2.34");
        assert_eq!(format_money(dec("7")), "7.00");
        assert_eq!(format_money(dec("-1.005")), "-1.01");
    }
}
