//! Text utilities for TUI rendering.

use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Truncates a string with ellipsis if it exceeds `max_width` terminal
/// columns (unicode-aware).
pub fn truncate_with_ellipsis(text: &str, max_width: usize) -> String {
    if text.width() <= max_width {
        return text.to_string();
    }
    if max_width <= 1 {
        return "…".to_string();
    }
    let mut truncated = String::new();
    let mut width = 0;
    for ch in text.chars() {
        let next_width = width + ch.width().unwrap_or(0);
        if next_width + 1 > max_width {
            break;
        }
        width = next_width;
        truncated.push(ch);
    }
    truncated.push('…');
    truncated
}

/// Truncates from the start, keeping the tail visible. Used for input lines
/// so the cursor end stays on screen.
pub fn truncate_start_with_ellipsis(text: &str, max_width: usize) -> String {
    if text.width() <= max_width {
        return text.to_string();
    }
    if max_width <= 1 {
        return "…".to_string();
    }
    let mut tail: Vec<char> = Vec::new();
    let mut width = 0;
    for ch in text.chars().rev() {
        let next_width = width + ch.width().unwrap_or(0);
        if next_width + 1 > max_width {
            break;
        }
        width = next_width;
        tail.push(ch);
    }
    let mut out = String::from("…");
    out.extend(tail.into_iter().rev());
    out
}

/// Renders a rating as five filled or empty stars, clamped to 0..=5.
pub fn stars(rating: i64) -> String {
    let filled = rating.clamp(0, 5) as usize;
    format!("{}{}", "★".repeat(filled), "☆".repeat(5 - filled))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_with_ellipsis_short() {
        assert_eq!(truncate_with_ellipsis("hello", 10), "hello");
    }

    #[test]
    fn test_truncate_with_ellipsis_long() {
        assert_eq!(truncate_with_ellipsis("hello world", 6), "hello…");
    }

    #[test]
    fn test_truncate_with_ellipsis_tiny() {
        assert_eq!(truncate_with_ellipsis("hello", 1), "…");
    }

    #[test]
    fn test_truncate_start_keeps_tail() {
        assert_eq!(truncate_start_with_ellipsis("hello world", 6), "…world");
    }

    #[test]
    fn test_stars() {
        assert_eq!(stars(4), "★★★★☆");
        assert_eq!(stars(9), "★★★★★");
        assert_eq!(stars(-3), "☆☆☆☆☆");
    }
}
