//! Turning display text into something safe to read aloud.

use regex::Regex;
use std::sync::LazyLock;

/// Appended whenever a link had to be dropped from spoken output.
pub const SCREEN_POINTER: &str = "Please check your screen for the details.";

static MARKDOWN_LINK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[([^\]]*)\]\(([^)]*)\)").unwrap());

static BARE_URL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(?:https?://|www\.)\S+").unwrap());

static EMPHASIS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^[ \t]*#{1,6}[ \t]*|^[ \t]*[-*][ \t]+|\*{1,3}|_{2,3}|`+").unwrap());

static WHITESPACE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

/// Returns `text` with links and markdown removed, ready for synthesis.
pub fn speakable(text: &str) -> String {
    let had_link = MARKDOWN_LINK_RE.is_match(text) || BARE_URL_RE.is_match(text);

    let text = MARKDOWN_LINK_RE.replace_all(text, "$1");
    let text = BARE_URL_RE.replace_all(&text, "");
    let text = EMPHASIS_RE.replace_all(&text, "");
    let text = WHITESPACE_RE.replace_all(&text, " ");
    let mut spoken = text.trim().to_string();

    if had_link {
        if !spoken.is_empty() {
            if !spoken.ends_with(['.', '!', '?']) {
                spoken.push('.');
            }
            spoken.push(' ');
        }
        spoken.push_str(SCREEN_POINTER);
    }
    spoken
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_sentences_are_untouched() {
        let text = "Would you prefer window or aisle seats?";
        assert_eq!(speakable(text), text);
    }

    #[test]
    fn markdown_link_keeps_label_and_points_to_screen() {
        assert_eq!(
            speakable("Pay here: [payment page](https://mytrip.ai/pay/ABC123)"),
            "Pay here: payment page. Please check your screen for the details."
        );
    }

    #[test]
    fn bare_urls_are_dropped() {
        let spoken = speakable("Your hotel is listed at https://maps.google.com/?q=riyadh today!");
        assert!(!spoken.contains("http"));
        assert!(spoken.ends_with(SCREEN_POINTER));
    }

    #[test]
    fn emphasis_is_stripped() {
        assert_eq!(
            speakable("**Booking Reference:** ATR-1001\n- Flight: __SV 759__"),
            "Booking Reference: ATR-1001 Flight: SV 759"
        );
    }

    #[test]
    fn link_only_text_is_just_the_pointer() {
        assert_eq!(speakable("https://example.com"), SCREEN_POINTER);
    }
}
