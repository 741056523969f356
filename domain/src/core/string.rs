//! String utilities for the domain layer.

/// Shorten free text (justifications, chat messages) to at most `max_chars`
/// characters for one-line display, collapsing line breaks.
///
/// Counts characters rather than bytes, so accented names and emoji are never
/// split mid-codepoint.
pub fn preview(text: &str, max_chars: usize) -> String {
    let flat: String = text
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");

    if flat.chars().count() <= max_chars {
        return flat;
    }

    let keep = max_chars.saturating_sub(3);
    let mut shortened: String = flat.chars().take(keep).collect();
    shortened.push_str("...");
    shortened
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preview_short_text_unchanged() {
        assert_eq!(preview("solid quarter", 20), "solid quarter");
    }

    #[test]
    fn test_preview_truncates_with_ellipsis() {
        assert_eq!(preview("exceeded every delivery target", 12), "exceeded ...");
    }

    #[test]
    fn test_preview_collapses_newlines() {
        assert_eq!(preview("line one\nline   two", 40), "line one line two");
    }

    #[test]
    fn test_preview_multibyte() {
        assert_eq!(preview("Avaliação calibrada", 30), "Avaliação calibrada");
        assert_eq!(preview("Avaliação calibrada", 10), "Avaliaç...");
    }
}
