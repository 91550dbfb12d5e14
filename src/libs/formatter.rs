//! Conversion between stored amounts and their textual form.
//!
//! Budgets, consumption, estimated time to complete and durations are all
//! stored as integer hundredths of a unit. Humans (and the XML document)
//! read and write them as decimal entries with two fraction digits.
//!
//! ## Usage
//!
//! ```rust
//! use actman::libs::formatter::{entry_to_hundredth, hundredth_to_entry};
//!
//! assert_eq!(hundredth_to_entry(150), "1.50");
//! assert_eq!(entry_to_hundredth("0.25").unwrap(), 25);
//! ```

use super::error::{ModelMgrError, ModelMgrResult};

pub fn hundredth_to_entry(value: i64) -> String {
    let sign = if value < 0 { "-" } else { "" };
    let abs = value.unsigned_abs();
    format!("{}{}.{:02}", sign, abs / 100, abs % 100)
}

pub fn entry_to_hundredth(entry: &str) -> ModelMgrResult<i64> {
    let invalid = || ModelMgrError::InvalidAmount(entry.to_string());
    let trimmed = entry.trim();
    let (negative, digits) = match trimmed.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, trimmed),
    };
    let (units, fraction) = digits.split_once('.').unwrap_or((digits, ""));
    if units.is_empty() && fraction.is_empty() {
        return Err(invalid());
    }
    if !units.chars().all(|c| c.is_ascii_digit()) || !fraction.chars().all(|c| c.is_ascii_digit()) || fraction.len() > 2 {
        return Err(invalid());
    }

    let units: i64 = if units.is_empty() { 0 } else { units.parse().map_err(|_| invalid())? };
    // "1.5" reads as 1.50
    let fraction: i64 = match fraction.len() {
        0 => 0,
        1 => fraction.parse::<i64>().map_err(|_| invalid())? * 10,
        _ => fraction.parse().map_err(|_| invalid())?,
    };
    let value = units.checked_mul(100).and_then(|v| v.checked_add(fraction)).ok_or_else(invalid)?;
    Ok(if negative { -value } else { value })
}

/// Renders a `/`-joined code path from root-first task codes.
pub fn code_path<'a>(codes: impl IntoIterator<Item = &'a str>) -> String {
    codes.into_iter().fold(String::new(), |mut acc, code| {
        acc.push('/');
        acc.push_str(code);
        acc
    })
}

/// Splits a `/`-joined code path into its codes, ignoring empty segments.
pub fn split_code_path(code_path: &str) -> Vec<&str> {
    code_path.split('/').filter(|code| !code.is_empty()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hundredths_render_with_two_digits() {
        assert_eq!(hundredth_to_entry(0), "0.00");
        assert_eq!(hundredth_to_entry(5), "0.05");
        assert_eq!(hundredth_to_entry(1234), "12.34");
        assert_eq!(hundredth_to_entry(-25), "-0.25");
    }

    #[test]
    fn entries_parse_to_hundredths() {
        assert_eq!(entry_to_hundredth("2").unwrap(), 200);
        assert_eq!(entry_to_hundredth("1.5").unwrap(), 150);
        assert_eq!(entry_to_hundredth("1.05").unwrap(), 105);
        assert_eq!(entry_to_hundredth(".25").unwrap(), 25);
        assert_eq!(entry_to_hundredth(" -0.75 ").unwrap(), -75);
    }

    #[test]
    fn malformed_entries_are_rejected() {
        for entry in ["", ".", "1.234", "abc", "1,5", "--1"] {
            assert!(entry_to_hundredth(entry).is_err(), "{entry} should be rejected");
        }
    }

    #[test]
    fn code_paths_join_and_split() {
        assert_eq!(code_path(["A", "B", "C"]), "/A/B/C");
        assert_eq!(split_code_path("/A/B/C"), vec!["A", "B", "C"]);
        assert!(split_code_path("/").is_empty());
    }
}
