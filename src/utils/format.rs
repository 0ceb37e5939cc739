/// Compact display of registration totals (`1.23M`, `45.6K`).
pub fn format_big_number(value: f64) -> String {
    if !value.is_finite() {
        return value.to_string();
    }
    if value >= 1e9 {
        return format!("{:.2}B", value / 1e9);
    }
    if value >= 1e6 {
        return format!("{:.2}M", value / 1e6);
    }
    if value >= 1e3 {
        return format!("{:.1}K", value / 1e3);
    }
    format!("{}", value.trunc() as i64)
}

/// Percentage with two decimals, `N/A` when the growth is undefined.
pub fn safe_pct(value: Option<f64>) -> String {
    match value {
        Some(v) if v.is_finite() => format!("{:.2}%", v),
        _ => "N/A".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_big_number() {
        assert_eq!(format_big_number(999.0), "999");
        assert_eq!(format_big_number(12_345.0), "12.3K");
        assert_eq!(format_big_number(2_500_000.0), "2.50M");
        assert_eq!(format_big_number(3_100_000_000.0), "3.10B");
    }

    #[test]
    fn test_safe_pct() {
        assert_eq!(safe_pct(Some(50.0)), "50.00%");
        assert_eq!(safe_pct(Some(-12.346)), "-12.35%");
        assert_eq!(safe_pct(None), "N/A");
        assert_eq!(safe_pct(Some(f64::NAN)), "N/A");
    }
}
