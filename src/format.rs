//! Display formatting for emissions figures.
//!
//! Every helper takes `impl Into<Option<f64>>` so callers can pass a plain
//! `f64` or a possibly-missing backend value; missing values render as
//! `N/A`.

/// Placeholder shown for missing values.
pub const PLACEHOLDER: &str = "N/A";

/// One decimal place: `123.45` → `"123.5"`.
pub fn format_emission(value: impl Into<Option<f64>>) -> String {
    match value.into() {
        Some(v) => format!("{v:.1}"),
        None => PLACEHOLDER.to_string(),
    }
}

/// Values of 1000 and above get en-US digit grouping with at most one
/// fraction digit (`12345.67` → `"12,345.7"`, `2000.0` → `"2,000"`).
/// Smaller values use one fixed decimal.
pub fn format_large_number(value: impl Into<Option<f64>>) -> String {
    let Some(v) = value.into() else {
        return PLACEHOLDER.to_string();
    };
    if v < 1000.0 {
        return format!("{v:.1}");
    }

    let tenths = (v * 10.0).round() as u64;
    let whole = group_thousands(tenths / 10);
    match tenths % 10 {
        0 => whole,
        frac => format!("{whole}.{frac}"),
    }
}

/// One decimal plus a percent sign: `12.345` → `"12.3%"`.
pub fn format_percentage(value: impl Into<Option<f64>>) -> String {
    match value.into() {
        Some(v) => format!("{v:.1}%"),
        None => PLACEHOLDER.to_string(),
    }
}

/// Regional currency layout. Unknown regions use the US layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct CurrencyFormat {
    symbol: &'static str,
    symbol_first: bool,
}

fn currency_format(region: &str) -> CurrencyFormat {
    match region {
        "EU" => CurrencyFormat {
            symbol: "€",
            symbol_first: false,
        },
        "UK" => CurrencyFormat {
            symbol: "£",
            symbol_first: true,
        },
        "JP" => CurrencyFormat {
            symbol: "¥",
            symbol_first: true,
        },
        _ => CurrencyFormat {
            symbol: "$",
            symbol_first: true,
        },
    }
}

/// Whole currency units with en-US grouping: `("EU", 1234.4)` → `"1,234€"`.
pub fn format_currency(value: impl Into<Option<f64>>, region: &str) -> String {
    let Some(v) = value.into() else {
        return PLACEHOLDER.to_string();
    };
    let fmt = currency_format(region);
    let rounded = v.round();
    let sign = if rounded < 0.0 { "-" } else { "" };
    let amount = format!("{sign}{}", group_thousands(rounded.abs() as u64));

    if fmt.symbol_first {
        format!("{}{amount}", fmt.symbol)
    } else {
        format!("{amount}{}", fmt.symbol)
    }
}

/// `Some(x)` as its display form, `None` as the placeholder.
pub fn placeholder<T: ToString>(value: Option<T>) -> String {
    value
        .map(|v| v.to_string())
        .unwrap_or_else(|| PLACEHOLDER.to_string())
}

/// Insert `,` every three digits: `1234567` → `"1,234,567"`.
pub fn group_thousands(n: u64) -> String {
    let s = n.to_string();
    let mut result = String::with_capacity(s.len() + s.len() / 3);
    for (i, ch) in s.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            result.push(',');
        }
        result.push(ch);
    }
    result.chars().rev().collect()
}

/// One CSV cell. Quoted when it holds a comma, quote or line break, with
/// inner quotes doubled.
pub fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn emission_has_one_decimal() {
        assert_eq!(format_emission(123.45), "123.5");
        assert_eq!(format_emission(0.0), "0.0");
        assert_eq!(format_emission(None), "N/A");
    }

    #[test]
    fn large_number_groups_above_one_thousand() {
        assert_eq!(format_large_number(999.94), "999.9");
        assert_eq!(format_large_number(1000.0), "1,000");
        assert_eq!(format_large_number(12345.67), "12,345.7");
        assert_eq!(format_large_number(278_600.0), "278,600");
        assert_eq!(format_large_number(1_234_567.04), "1,234,567");
        assert_eq!(format_large_number(-5.0), "-5.0");
        assert_eq!(format_large_number(None), "N/A");
    }

    #[test]
    fn percentage_formatting() {
        assert_eq!(format_percentage(12.345), "12.3%");
        assert_eq!(format_percentage(None), "N/A");
    }

    #[test]
    fn currency_symbol_placement() {
        assert_eq!(format_currency(1234.4, "US"), "$1,234");
        assert_eq!(format_currency(1234.5, "UK"), "£1,235");
        assert_eq!(format_currency(50000.0, "EU"), "50,000€");
        assert_eq!(format_currency(980.0, "JP"), "¥980");
        assert_eq!(format_currency(10.0, "BR"), "$10");
        assert_eq!(format_currency(-2500.0, "US"), "$-2,500");
        assert_eq!(format_currency(None, "US"), "N/A");
    }

    #[test]
    fn placeholder_passes_values_through() {
        assert_eq!(placeholder(Some("Tesla")), "Tesla");
        assert_eq!(placeholder::<i32>(None), "N/A");
    }

    #[test]
    fn csv_field_quotes_only_when_needed() {
        assert_eq!(csv_field("Model 3"), "Model 3");
        assert_eq!(csv_field("Golf, GTE"), "\"Golf, GTE\"");
        assert_eq!(csv_field("5\" wheel"), "\"5\"\" wheel\"");
    }

    #[test]
    fn group_thousands_boundaries() {
        assert_eq!(group_thousands(0), "0");
        assert_eq!(group_thousands(999), "999");
        assert_eq!(group_thousands(1000), "1,000");
        assert_eq!(group_thousands(1_000_000), "1,000,000");
    }
}
