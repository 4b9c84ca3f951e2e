use super::*;
use rstest::rstest;
use rust_decimal_macros::dec;

#[rstest]
#[case(dec!(25.2), dec!(25.20))]
#[case(dec!(0.005), dec!(0.01))]
#[case(dec!(0.004), dec!(0.00))]
#[case(dec!(-0.005), dec!(-0.01))]
#[case(dec!(205.199999), dec!(205.20))]
fn test_round_currency(#[case] input: Decimal, #[case] expected: Decimal) {
    assert_eq!(round_currency(input), expected);
}

#[test]
fn test_normalize_digits() {
    assert_eq!(normalize_digits("١٢٣٫٥٠"), "123.50");
    assert_eq!(normalize_digits("۴۵۶"), "456");
    assert_eq!(normalize_digits("١٬٢٠٠"), "1200");
    assert_eq!(normalize_digits("abc 42"), "abc 42");
}

#[rstest]
#[case("200", Some(dec!(200)))]
#[case(" 1,250.75 ", Some(dec!(1250.75)))]
#[case("٥٠٠", Some(dec!(500)))]
#[case("-3.5", Some(dec!(-3.5)))]
#[case("", None)]
#[case("twelve", None)]
fn test_parse_amount(#[case] input: &str, #[case] expected: Option<Decimal>) {
    assert_eq!(parse_amount(input), expected);
}

#[rstest]
#[case(dec!(1234.5), "ج.م", "1,234.50 ج.م")]
#[case(dec!(0), "", "0.00")]
#[case(dec!(999), "", "999.00")]
#[case(dec!(1000000), "EGP", "1,000,000.00 EGP")]
#[case(dec!(-205.2), "", "-205.20")]
#[case(dec!(12.345), "", "12.35")]
fn test_format_amount(#[case] amount: Decimal, #[case] symbol: &str, #[case] expected: &str) {
    assert_eq!(format_amount(amount, symbol), expected);
}

#[test]
fn test_bounds_match_column_precision() {
    assert_eq!(MAX_AMOUNT, dec!(999999999999.99));
    assert_eq!(MAX_QUANTITY, dec!(999999999.999));
}

#[rstest]
#[case(dec!(0.01), true)]
#[case(dec!(12.50), true)]
#[case(dec!(12.500), true)]
#[case(dec!(0.004), false)]
#[case(dec!(999999999999.99), true)]
#[case(dec!(1000000000000), false)]
#[case(dec!(-999999999999.99), true)]
fn test_fits_amount(#[case] amount: Decimal, #[case] expected: bool) {
    assert_eq!(fits_amount(amount), expected);
}

#[test]
fn test_fits_quantity_scale() {
    assert!(fits(dec!(1.125), QUANTITY_SCALE, MAX_QUANTITY));
    assert!(!fits(dec!(1.1255), QUANTITY_SCALE, MAX_QUANTITY));
    let huge = Decimal::from_i128_with_scale(10_i128.pow(28), 0);
    assert!(!fits(huge, QUANTITY_SCALE, MAX_QUANTITY));
}
