//! Text helpers shared by the pipeline and verification reports.

use crate::stats::{percent_of, FrequencyTable};
use std::io::{self, Write};

pub const BANNER_WIDTH: usize = 60;

/// `1234567` -> `1,234,567`
pub fn format_count(n: usize) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Percentage with one decimal, or an explicit marker when undefined.
pub fn format_share(share: Option<f64>) -> String {
    match share {
        Some(p) => format!("{p:.1}%"),
        None => "undefined (no motorcycle accidents)".to_string(),
    }
}

pub fn write_banner<W: Write>(w: &mut W, title: &str) -> io::Result<()> {
    let rule = "=".repeat(BANNER_WIDTH);
    writeln!(w, "{rule}")?;
    writeln!(w, "{title}")?;
    writeln!(w, "{rule}")
}

/// One `label: count` line per entry, with the share of `base` when given.
pub fn write_distribution<W: Write>(
    w: &mut W,
    title: &str,
    table: &FrequencyTable,
    base: Option<usize>,
) -> io::Result<()> {
    writeln!(w, "{title}")?;
    for entry in &table.rows {
        match base {
            Some(base) => writeln!(
                w,
                "  {}: {} ({})",
                entry.label,
                format_count(entry.count),
                format_share(percent_of(entry.count, base))
            )?,
            None => writeln!(w, "  {}: {}", entry.label, format_count(entry.count))?,
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::Frequency;

    #[test]
    fn counts_get_thousands_separators() {
        assert_eq!(format_count(0), "0");
        assert_eq!(format_count(999), "999");
        assert_eq!(format_count(1000), "1,000");
        assert_eq!(format_count(1234567), "1,234,567");
    }

    #[test]
    fn undefined_share_is_explicit() {
        assert_eq!(format_share(Some(12.345)), "12.3%");
        assert_eq!(format_share(None), "undefined (no motorcycle accidents)");
    }

    #[test]
    fn distribution_lines_include_percentages() {
        let table = FrequencyTable {
            column: "Sexo".to_string(),
            rows: vec![
                Frequency { label: "M".to_string(), count: 3 },
                Frequency { label: "F".to_string(), count: 1 },
            ],
        };
        let mut out = Vec::new();

        write_distribution(&mut out, "Gender distribution:", &table, Some(4)).unwrap();

        let text = String::from_utf8(out).unwrap();
        assert_eq!(text, "Gender distribution:\n  M: 3 (75.0%)\n  F: 1 (25.0%)\n");
    }
}
