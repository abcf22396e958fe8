// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use time::OffsetDateTime;

pub const CURRENCY_SUFFIX: &str = " ₫";
pub const EMPTY_CELL: &str = "-";

/// Whole-dong amount grouped with `.`: `1500000.0` -> `1.500.000 ₫`.
pub fn format_price(amount: f64) -> String {
    if !amount.is_finite() {
        return EMPTY_CELL.to_owned();
    }
    let rounded = amount.round();
    let sign = if rounded < 0.0 { "-" } else { "" };
    let whole = rounded.abs() as u64;
    format!("{sign}{}{CURRENCY_SUFFIX}", group_digits(whole))
}

pub fn format_optional_price(amount: Option<f64>) -> String {
    amount.map_or_else(|| EMPTY_CELL.to_owned(), format_price)
}

/// Day-first calendar date, or `-` when unset.
pub fn format_date(value: Option<OffsetDateTime>) -> String {
    match value {
        Some(value) => format!(
            "{:02}/{:02}/{}",
            value.day(),
            u8::from(value.month()),
            value.year()
        ),
        None => EMPTY_CELL.to_owned(),
    }
}

/// Calendar date as forms edit it.
pub fn date_input_value(value: Option<OffsetDateTime>) -> String {
    match value {
        Some(value) => format!(
            "{}-{:02}-{:02}",
            value.year(),
            u8::from(value.month()),
            value.day()
        ),
        None => String::new(),
    }
}

fn group_digits(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (index, ch) in digits.chars().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            out.push('.');
        }
        out.push(ch);
    }
    out
}
