use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::system::report::MemoryUsageReport;

pub fn truncate_unicode(s: &str, max_width: usize) -> String {
    if s.width() <= max_width {
        return s.to_string();
    }
    let mut result = String::new();
    let mut width = 0;
    for ch in s.chars() {
        let ch_width = ch.width().unwrap_or(0);
        if width + ch_width > max_width.saturating_sub(1) {
            result.push('\u{2026}');
            break;
        }
        result.push(ch);
        width += ch_width;
    }
    result
}

/// Pad or truncate to exactly `width` display columns.
pub fn fit_column(s: &str, width: usize) -> String {
    let truncated = truncate_unicode(s, width);
    let pad = width.saturating_sub(truncated.width());
    format!("{truncated}{}", " ".repeat(pad))
}

pub fn format_kilobytes(kilobytes: u64) -> String {
    const MB: u64 = 1024;
    const GB: u64 = 1024 * 1024;

    if kilobytes >= GB {
        format!("{:.1} GB", kilobytes as f64 / GB as f64)
    } else if kilobytes >= MB {
        format!("{:.1} MB", kilobytes as f64 / MB as f64)
    } else {
        format!("{} KB", kilobytes)
    }
}

pub fn format_memory(report: &MemoryUsageReport) -> String {
    format!(
        "{} ({} KB, {:.2} MB, {:.3} GB)",
        format_kilobytes(report.kilobytes()),
        report.kilobytes(),
        report.megabytes(),
        report.gigabytes()
    )
}
