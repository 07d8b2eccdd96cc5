//! Text classification over article titles and descriptions.
//!
//! Pure functions, no I/O:
//! - [`count_query_occurrences`]: literal, case-insensitive query counting
//! - [`mentions_money`]: currency amount detection
//! - [`normalize_for_filename`]: strip a title down to a safe file stem

use once_cell::sync::Lazy;
use regex::{Regex, RegexBuilder};

/// Currency amounts: `$1,234.56`-style or `12.5 dollars` / `12 USD`.
///
/// The amount may not touch another word character on either side. The
/// `regex` crate has no look-around, so the boundary is matched as a
/// non-word character or the start/end of the text; for a yes/no answer
/// that is equivalent.
static MONEY_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?ix)
        (?:^|[^\w])
        (?:
            \$\d{1,3}(?:,\d{3})*(?:\.\d{2})?
          | \d+(?:\.\d{1,2})?\s?(?:dollars|usd)
        )
        (?:[^\w]|$)
        ",
    )
    .expect("money pattern is valid")
});

/// Count case-insensitive occurrences of `query` in `title` and `description`.
///
/// The query is matched as literal text, never as a pattern.
///
/// # Arguments
///
/// * `query` - The search text; regex metacharacters are escaped
/// * `title` - Article title
/// * `description` - Article description
///
/// # Returns
///
/// The total number of non-overlapping matches across both fields, or `-1`
/// for an empty query so "no query given" stays distinct from "no matches".
///
/// # Examples
///
/// ```ignore
/// assert_eq!(count_query_occurrences("", "anything", "at all"), -1);
/// assert_eq!(count_query_occurrences("fed", "Fed holds", "the FED said"), 2);
/// ```
pub fn count_query_occurrences(query: &str, title: &str, description: &str) -> i64 {
    if query.is_empty() {
        return -1;
    }

    match RegexBuilder::new(&regex::escape(query))
        .case_insensitive(true)
        .build()
    {
        Ok(re) => (re.find_iter(title).count() + re.find_iter(description).count()) as i64,
        Err(e) => {
            tracing::warn!(error = %e, "Query too large for matcher; counting lowercase text");
            let needle = query.to_lowercase();
            (title.to_lowercase().matches(&needle).count()
                + description.to_lowercase().matches(&needle).count()) as i64
        }
    }
}

/// Whether `text` mentions a currency amount.
///
/// # Arguments
///
/// * `text` - Usually the title and description joined by a space
///
/// # Returns
///
/// `true` if a `$`-prefixed amount or an amount followed by `dollars`/`USD`
/// appears with no letter or digit glued to either end.
pub fn mentions_money(text: &str) -> bool {
    MONEY_RE.is_match(text)
}

/// Drop every character that is not an ASCII letter, digit or whitespace.
///
/// Casing and whitespace are kept as-is.
pub fn normalize_for_filename(text: &str) -> String {
    text.chars()
        .filter(|c| c.is_ascii_alphanumeric() || c.is_whitespace())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_query_is_not_applicable() {
        assert_eq!(count_query_occurrences("", "", ""), -1);
        assert_eq!(count_query_occurrences("", "Fed news", "fed fed"), -1);
    }

    #[test]
    fn test_count_is_case_insensitive_across_fields() {
        assert_eq!(
            count_query_occurrences("Fed", "FED raises rates", "the fed and the Fed"),
            3
        );
        assert_eq!(count_query_occurrences("climate", "Wildfire", "Drought"), 0);
    }

    #[test]
    fn test_count_treats_query_literally() {
        assert_eq!(count_query_occurrences("a.c", "abc a.c", "A.C"), 2);
        assert_eq!(count_query_occurrences("C++", "c++ and C++", ""), 2);
        assert_eq!(count_query_occurrences("(", "f(x)", "g(y)"), 2);
    }

    #[test]
    fn test_count_does_not_overlap() {
        assert_eq!(count_query_occurrences("aa", "aaaa", ""), 2);
    }

    #[test]
    fn test_mentions_money_dollar_sign() {
        assert!(mentions_money("$11.10"));
        assert!(mentions_money("costs $1,234,567.89 in total"));
        assert!(mentions_money("a $5 fee"));
        assert!(mentions_money("($20)"));
    }

    #[test]
    fn test_mentions_money_units() {
        assert!(mentions_money("11 dollars"));
        assert!(mentions_money("about 3.5 Dollars each"));
        assert!(mentions_money("20USD"));
        assert!(mentions_money("paid 99.99 usd."));
    }

    #[test]
    fn test_mentions_money_word_boundaries() {
        assert!(!mentions_money("a$50x"));
        assert!(!mentions_money("x11 dollars"));
        assert!(!mentions_money("5 dollarsign"));
        assert!(!mentions_money("no money here"));
        assert!(!mentions_money("$1234"));
    }

    #[test]
    fn test_normalize_for_filename() {
        assert_eq!(normalize_for_filename("Fed's $ Plan: Q&A!"), "Feds  Plan QA");
        assert_eq!(normalize_for_filename("Café 2024"), "Caf 2024");
        assert_eq!(normalize_for_filename("Tabs\tstay"), "Tabs\tstay");
    }
}
