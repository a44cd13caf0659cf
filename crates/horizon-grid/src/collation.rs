//! Locale-aware string ordering for sort keys.
//!
//! With the `localization` feature, strings compare with the ICU root
//! collator. Without it, a deterministic fallback approximates the same
//! order: text is compared case-insensitively first, and strings that differ
//! only by case put lowercase before uppercase.

use std::cmp::Ordering;

/// Compares two strings the way text sort keys are ordered.
pub fn compare_text(a: &str, b: &str) -> Ordering {
    imp::compare(a, b)
}

#[cfg(feature = "localization")]
mod imp {
    use std::cmp::Ordering;
    use std::sync::OnceLock;

    use icu::collator::{Collator, CollatorBorrowed};
    use horizon_grid_core::logging::targets;

    fn collator() -> Option<&'static CollatorBorrowed<'static>> {
        static COLLATOR: OnceLock<Option<CollatorBorrowed<'static>>> = OnceLock::new();
        COLLATOR
            .get_or_init(|| match Collator::try_new(Default::default(), Default::default()) {
                Ok(collator) => Some(collator),
                Err(err) => {
                    tracing::warn!(
                        target: targets::PIPELINE,
                        error = %err,
                        "root collator unavailable, using fallback text ordering"
                    );
                    None
                }
            })
            .as_ref()
    }

    pub(super) fn compare(a: &str, b: &str) -> Ordering {
        match collator() {
            Some(collator) => collator.compare(a, b),
            None => super::fallback::compare(a, b),
        }
    }
}

#[cfg(not(feature = "localization"))]
mod imp {
    pub(super) use super::fallback::compare;
}

mod fallback {
    use std::cmp::Ordering;

    pub(crate) fn compare(a: &str, b: &str) -> Ordering {
        let folded_a = a.chars().flat_map(char::to_lowercase);
        let folded_b = b.chars().flat_map(char::to_lowercase);
        // Lowercase sorts before uppercase, the reverse of code point order.
        folded_a.cmp(folded_b).then_with(|| b.cmp(a))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_case_insensitive_primary_order() {
        assert_eq!(compare_text("apple", "Banana"), Ordering::Less);
        assert_eq!(compare_text("Banana", "apple"), Ordering::Greater);
        assert_eq!(compare_text("Cherry", "cherry pie"), Ordering::Less);
    }

    #[test]
    fn test_case_tie_break() {
        assert_eq!(compare_text("a", "A"), Ordering::Less);
        assert_eq!(compare_text("A", "a"), Ordering::Greater);
        assert_eq!(compare_text("same", "same"), Ordering::Equal);
    }

    #[test]
    fn test_digits_before_letters() {
        assert_eq!(compare_text("10", "abc"), Ordering::Less);
        assert_eq!(compare_text("", "a"), Ordering::Less);
    }

    #[test]
    fn test_fallback_is_a_total_order() {
        let mut words = vec!["b", "B", "a", "A", "ab", "Ab", ""];
        words.sort_by(|a, b| fallback::compare(a, b));
        assert_eq!(words, vec!["", "a", "A", "ab", "Ab", "b", "B"]);
    }
}
