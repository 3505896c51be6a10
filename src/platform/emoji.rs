//! # Emoji identity.
//!
//! An emoji reaching the core is either plain unicode text or a reference
//! to a platform-defined custom emoji carrying a textual identifier. The
//! two forms can denote the same emoji, so identity is a comparison rule
//! ([`compare_emoji`]) rather than `Eq` — which is why option maps and
//! reaction sets are comparator-keyed.

use std::fmt;
use std::sync::Arc;

use crate::collections::Comparator;

/// Opaque emoji handle.
#[derive(Clone, Debug)]
pub enum Emoji {
    /// A unicode emoji, carried verbatim.
    Unicode(Arc<str>),
    /// A platform-defined custom emoji, known by its textual identifier.
    Custom {
        identifier: Arc<str>,
    },
}

impl Emoji {
    pub fn unicode(text: impl Into<Arc<str>>) -> Self {
        Emoji::Unicode(text.into())
    }

    pub fn custom(identifier: impl Into<Arc<str>>) -> Self {
        Emoji::Custom {
            identifier: identifier.into(),
        }
    }

    /// The textual identifier: the unicode text itself, or the custom
    /// emoji's identifier.
    pub fn identifier(&self) -> &str {
        match self {
            Emoji::Unicode(text) => text,
            Emoji::Custom { identifier } => identifier,
        }
    }

    /// True for an exactly-empty reference.
    pub fn is_empty(&self) -> bool {
        self.identifier().is_empty()
    }
}

impl fmt::Display for Emoji {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.identifier())
    }
}

/// Compares two emoji handles for identity.
///
/// A custom emoji and the unicode/textual form of its identifier compare
/// equal. Two empty references compare equal only because both are exactly
/// empty; an empty reference never matches a non-empty one.
///
/// # Example
/// ```
/// use queueboard::platform::{compare_emoji, Emoji};
///
/// let text = Emoji::unicode("🎫");
/// let custom = Emoji::custom("🎫");
/// assert!(compare_emoji(&text, &custom));
/// assert!(!compare_emoji(&text, &Emoji::unicode("✔️")));
/// ```
pub fn compare_emoji(a: &Emoji, b: &Emoji) -> bool {
    a.identifier() == b.identifier()
}

/// [`compare_emoji`] packaged for comparator-keyed containers.
pub fn emoji_comparator() -> Comparator<Emoji> {
    Arc::new(compare_emoji)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_custom_matches_textual_identifier() {
        assert!(compare_emoji(&Emoji::unicode("📋"), &Emoji::custom("📋")));
        assert!(compare_emoji(&Emoji::custom("x:1"), &Emoji::custom("x:1")));
    }

    #[test]
    fn test_distinct_emoji_differ() {
        assert!(!compare_emoji(&Emoji::unicode("🎫"), &Emoji::unicode("📋")));
        assert!(!compare_emoji(&Emoji::custom("a:1"), &Emoji::custom("a:2")));
    }

    #[test]
    fn test_empty_only_matches_empty() {
        let empty = Emoji::unicode("");
        assert!(compare_emoji(&empty, &Emoji::custom("")));
        assert!(!compare_emoji(&empty, &Emoji::unicode("🎫")));
        assert!(empty.is_empty());
    }
}
