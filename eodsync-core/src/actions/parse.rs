//! Ratio extraction from free-text corporate-action subjects.
//!
//! Subjects are human-written announcements, e.g.
//! `"Face Value Split (Sub-Division) - From Rs 10/- Per Share To Rs 2/- Per Share"`
//! or `"Bonus 1:2"`. Extraction contract:
//!
//! - split: two numbers separated by slash/dash/space/unit text; the
//!   adjustment factor is `first / second`.
//! - bonus: `N:M`; the adjustment factor is `1 + N/M`.
//!
//! "No match" is a first-class outcome (`None`), never an error: a
//! malformed subject must not abort the session.

use regex::Regex;

/// Keyword gate for split actions.
pub fn is_split(subject: &str) -> bool {
    let subject = subject.to_lowercase();
    subject.contains("split") || subject.contains("splt")
}

/// Keyword gate for bonus actions.
pub fn is_bonus(subject: &str) -> bool {
    subject.to_lowercase().contains("bonus")
}

/// Compiled ratio patterns. Build once per run.
pub struct ActionParser {
    split_re: Regex,
    bonus_re: Regex,
}

impl ActionParser {
    pub fn new() -> Self {
        Self {
            split_re: Regex::new(r"(\d+\.?\d*)[/\- a-z.]+(\d+\.?\d*)")
                .expect("split pattern is valid"),
            bonus_re: Regex::new(r"(\d+) ?: ?(\d+)").expect("bonus pattern is valid"),
        }
    }

    /// Split factor: `first / second` of the two captured numbers.
    ///
    /// `"FV Rs 10/- to Rs 2/-"` gives 5.0 — historical prices divide by 5.
    pub fn split_factor(&self, subject: &str) -> Option<f64> {
        let subject = subject.to_lowercase();
        let caps = self.split_re.captures(&subject)?;

        let from: f64 = caps[1].parse().ok()?;
        let to: f64 = caps[2].parse().ok()?;
        Some(from / to)
    }

    /// Bonus factor: `1 + N/M` for a `N:M` subject.
    ///
    /// `"1:1"` gives 2.0, `"1:2"` gives 1.5. The new:old reading of `N:M`
    /// is the feed's convention; see DESIGN.md.
    pub fn bonus_factor(&self, subject: &str) -> Option<f64> {
        let subject = subject.to_lowercase();
        let caps = self.bonus_re.captures(&subject)?;

        let new: f64 = caps[1].parse().ok()?;
        let old: f64 = caps[2].parse().ok()?;
        Some(1.0 + new / old)
    }
}

impl Default for ActionParser {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_keyword_variants() {
        assert!(is_split("Face Value Split (Sub-Division)"));
        assert!(is_split("FV SPLT RS 10 TO RS 5"));
        assert!(!is_split("Dividend Rs 2 Per Share"));
    }

    #[test]
    fn split_factor_slash_form() {
        let parser = ActionParser::new();
        let f = parser
            .split_factor("Face Value Split From Rs 10/- Per Share To Rs 2/- Per Share")
            .unwrap();
        assert_eq!(f, 5.0);
    }

    #[test]
    fn split_factor_word_separated_form() {
        let parser = ActionParser::new();
        let f = parser.split_factor("Sub-division of shares 10 to 2").unwrap();
        assert_eq!(f, 5.0);
    }

    #[test]
    fn split_factor_below_one_halves_prices_doubled() {
        // "1/2": face value rises, historical prices divide by 0.5 (double).
        let parser = ActionParser::new();
        let f = parser.split_factor("Consolidation 1/2").unwrap();
        assert_eq!(f, 0.5);
    }

    #[test]
    fn split_factor_decimal_values() {
        let parser = ActionParser::new();
        let f = parser.split_factor("split from rs 2.50 to rs 0.50").unwrap();
        assert_eq!(f, 5.0);
    }

    #[test]
    fn split_without_numbers_is_none() {
        let parser = ActionParser::new();
        assert_eq!(parser.split_factor("stock split announced"), None);
    }

    #[test]
    fn bonus_factor_convention() {
        let parser = ActionParser::new();
        assert_eq!(parser.bonus_factor("Bonus 1:1").unwrap(), 2.0);
        assert_eq!(parser.bonus_factor("Bonus 1:2").unwrap(), 1.5);
        assert_eq!(parser.bonus_factor("Bonus 2:1").unwrap(), 3.0);
    }

    #[test]
    fn bonus_tolerates_spaces_around_colon() {
        let parser = ActionParser::new();
        assert_eq!(parser.bonus_factor("bonus issue 3 : 2").unwrap(), 2.5);
    }

    #[test]
    fn bonus_without_ratio_is_none() {
        let parser = ActionParser::new();
        assert_eq!(parser.bonus_factor("bonus issue deferred"), None);
    }
}
