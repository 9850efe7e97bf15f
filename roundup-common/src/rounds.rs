//! Round extraction from free-form scheduling text
//!
//! The "Scheduling method" column of an imported row carries one or more
//! interview-round links, usually written as `Round1: https://...`. This
//! module turns that text into an ordered list of [`Round`] values.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

/// Matches `Round<N>:<whitespace?><URL>` markers
static ROUND_MARKER_REGEX: OnceLock<Regex> = OnceLock::new();

/// Matches bare `http://` / `https://` tokens
static BARE_URL_REGEX: OnceLock<Regex> = OnceLock::new();

fn round_marker_regex() -> &'static Regex {
    ROUND_MARKER_REGEX.get_or_init(|| {
        Regex::new(r"(?i)Round(\d+):\s*(https?://\S+)").expect("Invalid round marker regex")
    })
}

fn bare_url_regex() -> &'static Regex {
    BARE_URL_REGEX.get_or_init(|| Regex::new(r"(?i)https?://\S+").expect("Invalid URL regex"))
}

/// One interview stage and its scheduling link
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Round {
    /// 1-based round number
    pub round_number: u32,
    /// Scheduling link for this round
    pub link: String,
}

impl Round {
    pub fn new(round_number: u32, link: impl Into<String>) -> Self {
        Self {
            round_number,
            link: link.into(),
        }
    }
}

/// Extract rounds from a scheduling-method text field
///
/// ## Algorithm
///
/// 1. Every `Round<N>: <URL>` marker (case-insensitive) yields `{N, URL}`,
///    in order of appearance. Duplicate round numbers are kept.
/// 2. With no markers, every bare URL yields `{position, URL}` where
///    position is 1-based among the URLs found.
/// 3. With no URLs at all, the result is empty and the caller synthesizes
///    a single default round.
///
/// Markers without a URL, or with a round number of zero or beyond `u32`,
/// are ignored.
///
/// ## Examples
///
/// ```rust
/// use roundup_common::rounds::{extract_rounds, Round};
///
/// assert_eq!(
///     extract_rounds("Round2: http://b.com Round1: http://a.com"),
///     vec![Round::new(2, "http://b.com"), Round::new(1, "http://a.com")]
/// );
/// assert_eq!(
///     extract_rounds("http://x.com\nhttp://y.com"),
///     vec![Round::new(1, "http://x.com"), Round::new(2, "http://y.com")]
/// );
/// assert!(extract_rounds("call me maybe").is_empty());
/// ```
pub fn extract_rounds(text: &str) -> Vec<Round> {
    let marked: Vec<Round> = round_marker_regex()
        .captures_iter(text)
        .filter_map(|caps| {
            let round_number = caps[1].parse::<u32>().ok().filter(|n| *n >= 1)?;
            Some(Round::new(round_number, &caps[2]))
        })
        .collect();

    if !marked.is_empty() {
        return marked;
    }

    bare_url_regex()
        .find_iter(text)
        .zip(1u32..)
        .map(|(m, position)| Round::new(position, m.as_str()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_markers_no_urls_is_empty() {
        assert!(extract_rounds("").is_empty());
        assert!(extract_rounds("Round1: to be decided").is_empty());
        assert!(extract_rounds("ftp://files.example.com").is_empty());
    }

    #[test]
    fn test_markers_keep_order_of_appearance() {
        let rounds = extract_rounds("Round2: http://b.com Round1: http://a.com");
        assert_eq!(
            rounds,
            vec![Round::new(2, "http://b.com"), Round::new(1, "http://a.com")]
        );
    }

    #[test]
    fn test_bare_urls_numbered_by_position() {
        let rounds = extract_rounds("http://x.com\nhttp://y.com");
        assert_eq!(
            rounds,
            vec![Round::new(1, "http://x.com"), Round::new(2, "http://y.com")]
        );
    }

    #[test]
    fn test_marker_is_case_insensitive_and_whitespace_optional() {
        let rounds = extract_rounds("ROUND3:https://cal.com/r3 round4:   https://cal.com/r4");
        assert_eq!(
            rounds,
            vec![
                Round::new(3, "https://cal.com/r3"),
                Round::new(4, "https://cal.com/r4"),
            ]
        );
    }

    #[test]
    fn test_duplicate_round_numbers_preserved() {
        let rounds = extract_rounds("Round1: http://a.com Round1: http://b.com");
        assert_eq!(rounds.len(), 2);
        assert!(rounds.iter().all(|r| r.round_number == 1));
    }

    #[test]
    fn test_marker_without_url_ignored() {
        let rounds = extract_rounds("Round1: pending Round2: https://cal.com/two");
        assert_eq!(rounds, vec![Round::new(2, "https://cal.com/two")]);
    }

    #[test]
    fn test_markers_take_precedence_over_bare_urls() {
        let rounds = extract_rounds("see https://intro.example.com then Round5: https://cal.com/5");
        assert_eq!(rounds, vec![Round::new(5, "https://cal.com/5")]);
    }

    #[test]
    fn test_round_zero_and_overflow_skipped() {
        let rounds = extract_rounds("Round0: http://zero.com Round99999999999: http://big.com");
        // No valid markers, so the URLs fall through to bare URL extraction
        assert_eq!(
            rounds,
            vec![Round::new(1, "http://zero.com"), Round::new(2, "http://big.com")]
        );
    }

    #[test]
    fn test_round_zero_dropped_next_to_valid_marker() {
        let rounds = extract_rounds("Round0: http://a.com Round1: http://b.com");
        assert_eq!(rounds, vec![Round::new(1, "http://b.com")]);
    }

    #[test]
    fn test_extraction_is_deterministic() {
        let text = "Round1: http://cal/1 Round2: http://cal/2";
        assert_eq!(extract_rounds(text), extract_rounds(text));
    }
}
