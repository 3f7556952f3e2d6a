//! Display helpers shared by the text report and the web UI.
//!
//! Output is meant to match the browser calculator character for character,
//! so rounding follows `Number.prototype.toFixed` and the `en-IN` locale.

use super::types::{CRORE, LAKH};

/// Short label for an amount: crores, lakhs, or an Indian-grouped number.
pub fn format_amount(amount: f64) -> String {
    if amount >= CRORE {
        return format!("{} Cr", to_fixed(amount / CRORE, 1));
    }
    if amount >= LAKH {
        return format!("{} L", to_fixed(amount / LAKH, 1));
    }
    format_grouped(amount)
}

/// Rupee value in crores with two decimals, e.g. `₹1.23 Cr`.
pub fn format_crores(amount: f64) -> String {
    format!("₹{} Cr", to_fixed(amount / CRORE, 2))
}

pub fn milestone_label(threshold: f64) -> String {
    format!("₹{} Cr", format_grouped(threshold / CRORE))
}

/// `value` rounded to `digits` decimals, rounding exact halves away from zero.
pub fn to_fixed(value: f64, digits: usize) -> String {
    if value.is_nan() {
        return "NaN".to_string();
    }
    if value < 0.0 {
        return format!("-{}", to_fixed(-value, digits));
    }
    if value.is_infinite() {
        return "Infinity".to_string();
    }
    // std prints a sign for -0.0
    let value = value + 0.0;
    match half_up_tie(value, digits) {
        Some(scaled) => {
            let unit = 10u128.pow(digits as u32);
            let whole = scaled / unit;
            if digits == 0 {
                whole.to_string()
            } else {
                format!("{whole}.{:0digits$}", scaled % unit)
            }
        }
        // std formatting rounds the exact binary value, which agrees with
        // toFixed everywhere except on exact ties.
        None => format!("{value:.digits$}"),
    }
}

/// For an exact tie at `digits` decimals, the rounded-up value scaled by
/// `10^digits`. `value * 10^digits` ends in exactly `.5` iff
/// `value * 2^(digits+1)` is an odd integer.
fn half_up_tie(value: f64, digits: usize) -> Option<u128> {
    if digits > 10 {
        return None;
    }
    let doubled = value * 2f64.powi(digits as i32 + 1);
    if doubled >= 9_007_199_254_740_992.0 || doubled.fract() != 0.0 || doubled % 2.0 != 1.0 {
        return None;
    }
    let odd = doubled as u128;
    Some((odd * 5u128.pow(digits as u32) + 1) / 2)
}

/// `en-IN` grouping (`12,34,567.891`) with at most three decimals.
pub fn format_grouped(amount: f64) -> String {
    if amount.is_nan() {
        return "NaN".to_string();
    }
    if amount.is_infinite() {
        return if amount > 0.0 { "∞" } else { "-∞" }.to_string();
    }

    // Shortest round-trip digits, then decimal half-up rounding.
    let shortest = format!("{}", amount.abs());
    let (int_part, frac_part) = shortest
        .split_once('.')
        .unwrap_or((shortest.as_str(), ""));
    let (int_digits, frac_digits) = round_decimal(int_part, frac_part, 3);

    let mut out = String::new();
    if amount < 0.0 {
        out.push('-');
    }
    out.push_str(&group_indian(&int_digits));
    let frac_digits = frac_digits.trim_end_matches('0');
    if !frac_digits.is_empty() {
        out.push('.');
        out.push_str(frac_digits);
    }
    out
}

fn round_decimal(int_part: &str, frac_part: &str, digits: usize) -> (String, String) {
    if frac_part.len() <= digits {
        return (int_part.to_string(), frac_part.to_string());
    }
    let round_up = frac_part.as_bytes()[digits] >= b'5';
    let mut kept = format!("{int_part}{}", &frac_part[..digits]).into_bytes();
    if round_up {
        let mut idx = kept.len();
        loop {
            if idx == 0 {
                kept.insert(0, b'1');
                break;
            }
            idx -= 1;
            if kept[idx] == b'9' {
                kept[idx] = b'0';
            } else {
                kept[idx] += 1;
                break;
            }
        }
    }
    let split = kept.len() - digits;
    let text = String::from_utf8_lossy(&kept).into_owned();
    (text[..split].to_string(), text[split..].to_string())
}

/// Last three digits, then pairs: 1234567 -> 12,34,567.
fn group_indian(digits: &str) -> String {
    if digits.len() <= 3 {
        return digits.to_string();
    }
    let (head, tail) = digits.split_at(digits.len() - 3);
    let mut groups = Vec::new();
    let mut end = head.len();
    while end > 0 {
        let start = end.saturating_sub(2);
        groups.push(&head[start..end]);
        end = start;
    }
    groups.reverse();
    format!("{},{tail}", groups.join(","))
}
