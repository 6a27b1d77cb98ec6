#![allow(clippy::unwrap_used)]

use rust_decimal_macros::dec;

use super::util::*;

// ── truncate ──────────────────────────────────────────────────

#[test]
fn test_truncate_short_string() {
    assert_eq!(truncate("hello", 10), "hello");
}

#[test]
fn test_truncate_long_string() {
    assert_eq!(truncate("hello world", 5), "hell…");
}

#[test]
fn test_truncate_zero_max() {
    assert_eq!(truncate("hello", 0), "");
}

#[test]
fn test_truncate_unicode() {
    assert_eq!(truncate("café résumé", 5), "café…");
}

// ── format_amount ─────────────────────────────────────────────

#[test]
fn test_format_amount_basic() {
    assert_eq!(format_amount(dec!(1234.56)), "₹1,234.56");
}

#[test]
fn test_format_amount_pads_decimals() {
    assert_eq!(format_amount(dec!(5)), "₹5.00");
    assert_eq!(format_amount(dec!(0.5)), "₹0.50");
}

#[test]
fn test_format_amount_large() {
    assert_eq!(format_amount(dec!(1234567.89)), "₹1,234,567.89");
}

#[test]
fn test_format_amount_negative() {
    assert_eq!(format_amount(dec!(-42.1)), "-₹42.10");
}

// ── progress_bar ──────────────────────────────────────────────

#[test]
fn test_progress_bar_empty() {
    assert_eq!(progress_bar(dec!(0), 4), "[░░░░]");
}

#[test]
fn test_progress_bar_half() {
    assert_eq!(progress_bar(dec!(50), 4), "[██░░]");
}

#[test]
fn test_progress_bar_rounds_down() {
    assert_eq!(progress_bar(dec!(74.99), 4), "[██░░]");
}

#[test]
fn test_progress_bar_capped() {
    assert_eq!(progress_bar(dec!(250), 4), "[████]");
}
