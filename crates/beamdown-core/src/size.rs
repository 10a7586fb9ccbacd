//! Size labels such as `"420 MB"` or `"8.4 GB"`.
//!
//! The simulator counts in megabytes, so every label is normalized to MB using
//! binary steps of 1024.

use crate::errors::SizeLabelError;

/// Total used when a size label cannot be parsed. Matches the built-in
/// `windows` catalog entry.
pub const DEFAULT_TOTAL_MB: f64 = 420.0;

const UNITS: &[(&str, f64)] = &[
    ("KB", 1.0 / 1024.0),
    ("MB", 1.0),
    ("GB", 1024.0),
    ("TB", 1024.0 * 1024.0),
];

/// Parse `<number> <unit>` into megabytes.
pub fn parse_size_label(label: &str) -> Result<f64, SizeLabelError> {
    let trimmed = label.trim();
    if trimmed.is_empty() {
        return Err(SizeLabelError::Empty);
    }

    let split = trimmed
        .find(|c: char| !(c.is_ascii_digit() || c == '.' || c == '-' || c == '+'))
        .unwrap_or(trimmed.len());
    let (number, unit) = trimmed.split_at(split);

    let value: f64 = number
        .parse()
        .map_err(|_| SizeLabelError::MissingNumber(trimmed.to_string()))?;

    let unit = unit.trim();
    let factor = UNITS
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(unit))
        .map(|(_, factor)| *factor)
        .ok_or_else(|| SizeLabelError::UnknownUnit {
            label: trimmed.to_string(),
            unit: unit.to_string(),
        })?;

    let total = value * factor;
    if !(total.is_finite() && total > 0.0) {
        return Err(SizeLabelError::NotPositive(trimmed.to_string()));
    }
    Ok(total)
}

/// Parse a label, falling back to [`DEFAULT_TOTAL_MB`].
pub fn resolve_total(label: &str) -> f64 {
    match parse_size_label(label) {
        Ok(total) => total,
        Err(err) => {
            log::warn!("{err}; using default size of {DEFAULT_TOTAL_MB} MB");
            DEFAULT_TOTAL_MB
        }
    }
}

/// Render a megabyte count the way the catalog writes sizes.
pub fn format_size(total_mb: f64) -> String {
    if total_mb >= 1024.0 {
        format!("{:.1} GB", total_mb / 1024.0)
    } else {
        format!("{:.0} MB", total_mb)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_megabytes_as_is() {
        assert_eq!(parse_size_label("420 MB").unwrap(), 420.0);
        assert_eq!(parse_size_label("420MB").unwrap(), 420.0);
        assert_eq!(parse_size_label("  12 mb ").unwrap(), 12.0);
    }

    #[test]
    fn gigabytes_use_binary_steps() {
        assert_eq!(parse_size_label("2 GB").unwrap(), 2048.0);
        let total = parse_size_label("8.4 GB").unwrap();
        assert!((total - 8601.6).abs() < 1e-9);
    }

    #[test]
    fn rejects_garbage() {
        assert_eq!(parse_size_label(""), Err(SizeLabelError::Empty));
        assert!(matches!(
            parse_size_label("big"),
            Err(SizeLabelError::MissingNumber(_))
        ));
        assert!(matches!(
            parse_size_label("3 PB"),
            Err(SizeLabelError::UnknownUnit { .. })
        ));
        assert!(matches!(
            parse_size_label("12"),
            Err(SizeLabelError::UnknownUnit { .. })
        ));
    }

    #[test]
    fn rejects_zero_and_negative_sizes() {
        assert!(matches!(
            parse_size_label("0 MB"),
            Err(SizeLabelError::NotPositive(_))
        ));
        assert!(matches!(
            parse_size_label("-5 GB"),
            Err(SizeLabelError::NotPositive(_))
        ));
    }

    #[test]
    fn unparseable_label_falls_back_to_default() {
        assert_eq!(resolve_total("lots"), DEFAULT_TOTAL_MB);
        assert_eq!(resolve_total("1 GB"), 1024.0);
    }

    #[test]
    fn formats_sizes_for_display() {
        assert_eq!(format_size(420.0), "420 MB");
        assert_eq!(format_size(8601.6), "8.4 GB");
    }
}
