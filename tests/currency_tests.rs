use sokoni::services::currency;

#[test]
fn identity_conversion_returns_amount() {
    let v = currency::convert(1234.5, "KES", "KES").unwrap();
    assert_eq!(v, 1234.5);
}

#[test]
fn every_supported_pair_has_a_rate() {
    for from in currency::SUPPORTED {
        for to in currency::SUPPORTED {
            let v = currency::convert(100.0, from, to).unwrap();
            assert!(v.is_finite() && v > 0.0, "{from}->{to} produced {v}");
        }
    }
}

#[test]
fn unknown_currency_is_an_error_not_a_silent_rate_of_one() {
    assert!(currency::convert(100.0, "GBP", "KES").is_err());
    assert!(currency::convert(100.0, "KES", "GBP").is_err());
    assert!(currency::format(100.0, "KES", "GBP").is_err());
}

#[test]
fn round_trip_is_stable() {
    let usd = currency::convert(10_000.0, "KES", "USD").unwrap();
    let back = currency::convert(usd, "USD", "KES").unwrap();
    assert!((back - 10_000.0).abs() < 1e-6);
}

#[test]
fn format_kes_groups_thousands_with_no_decimals() {
    let s = currency::format(1000.0, "KES", "KES").unwrap();
    assert_eq!(s, "KSh 1,000");

    let s = currency::format(1_234_567.0, "KES", "KES").unwrap();
    assert_eq!(s, "KSh 1,234,567");
}

#[test]
fn format_usd_has_two_decimals_and_symbol_prefix() {
    let s = currency::format(1234.5, "USD", "USD").unwrap();
    assert_eq!(s, "$1,234.50");
}

#[test]
fn switching_display_currency_converts_for_display_only() {
    // The same recorded KES amount renders differently per active currency,
    // but the inputs are untouched.
    let kes = currency::format(12_900.0, "KES", "KES").unwrap();
    let usd = currency::format(12_900.0, "KES", "USD").unwrap();
    assert_eq!(kes, "KSh 12,900");
    assert_eq!(usd, "$100.00");
}

#[test]
fn negative_amounts_keep_the_sign_in_front() {
    let s = currency::format(-1500.0, "KES", "KES").unwrap();
    assert_eq!(s, "-KSh 1,500");
}

#[test]
fn resolve_active_prefers_cookie_then_default_then_kes() {
    assert_eq!(currency::resolve_active(Some("USD"), "KES"), "USD");
    assert_eq!(currency::resolve_active(Some("XXX"), "EUR"), "EUR");
    assert_eq!(currency::resolve_active(None, "EUR"), "EUR");
    assert_eq!(currency::resolve_active(None, "nope"), "KES");
}

#[test]
fn resolve_active_with_no_stored_value_is_idempotent() {
    let a = currency::resolve_active(None, "KES");
    let b = currency::resolve_active(None, "KES");
    assert_eq!(a, b);
}
