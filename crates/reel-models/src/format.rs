//! Display formatting for counters.

/// Format a counter for display: `532`, `1.5K`, `2.3M`.
///
/// Negative counts (possible transiently if a decrement races a read) are
/// clamped to zero.
pub fn format_count(count: i64) -> String {
    let count = count.max(0);
    match count {
        0..=999 => count.to_string(),
        1_000..=999_999 => format!("{:.1}K", count as f64 / 1_000.0),
        _ => format!("{:.1}M", count as f64 / 1_000_000.0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_small_counts_verbatim() {
        assert_eq!(format_count(0), "0");
        assert_eq!(format_count(999), "999");
    }

    #[test]
    fn test_thousands() {
        assert_eq!(format_count(1_000), "1.0K");
        assert_eq!(format_count(1_450), "1.4K");
        assert_eq!(format_count(999_999), "1000.0K");
    }

    #[test]
    fn test_millions() {
        assert_eq!(format_count(1_000_000), "1.0M");
        assert_eq!(format_count(2_345_678), "2.3M");
    }

    #[test]
    fn test_negative_clamped() {
        assert_eq!(format_count(-5), "0");
    }
}
