//! Layout warnings with per-document deduplication.
//!
//! Recoverable content problems (an unsupported value, a missing image, an
//! iteration bound being hit) never abort a layout. They are recorded here,
//! forwarded once to the `log` facade, and returned to the caller alongside
//! the laid-out document.

use std::collections::HashSet;

/// A sink for warnings raised while styling or laying out one document.
///
/// Each unique `(component, message)` pair is kept once, in the order it was
/// first reported.
///
/// # Example
/// ```
/// use quire_common::Diagnostics;
///
/// let mut diagnostics = Diagnostics::new();
/// diagnostics.warn("image", "no image for 'logo.png'");
/// diagnostics.warn("image", "no image for 'logo.png'");
/// assert_eq!(diagnostics.messages().len(), 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Diagnostics {
    seen: HashSet<String>,
    messages: Vec<String>,
}

impl Diagnostics {
    /// Create an empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a warning. Prints through `log::warn!` the first time a given
    /// message is seen, silently drops repeats.
    pub fn warn(&mut self, component: &str, message: &str) {
        let key = format!("[{component}] {message}");
        if self.seen.insert(key.clone()) {
            log::warn!("{key}");
            self.messages.push(key);
        }
    }

    /// Warnings recorded so far, in first-seen order.
    #[must_use]
    pub fn messages(&self) -> &[String] {
        &self.messages
    }

    /// True if any warning mentions `needle`.
    #[must_use]
    pub fn contains(&self, needle: &str) -> bool {
        self.messages.iter().any(|m| m.contains(needle))
    }

    /// Move every warning of `other` into this sink, keeping deduplication.
    pub fn merge(&mut self, other: Self) {
        self.extend(other.messages);
    }

    /// Consume the sink and return the collected warnings.
    #[must_use]
    pub fn into_messages(self) -> Vec<String> {
        self.messages
    }

    /// Forget everything recorded, e.g. between independent layout passes.
    pub fn clear(&mut self) {
        self.seen.clear();
        self.messages.clear();
    }
}

/// Adds messages that were already tagged and logged by another sink.
impl Extend<String> for Diagnostics {
    fn extend<I: IntoIterator<Item = String>>(&mut self, messages: I) {
        for message in messages {
            if self.seen.insert(message.clone()) {
                self.messages.push(message);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deduplicates_per_component() {
        let mut d = Diagnostics::new();
        d.warn("css", "unknown property 'foo'");
        d.warn("css", "unknown property 'foo'");
        d.warn("layout", "unknown property 'foo'");
        assert_eq!(d.messages().len(), 2);
        assert!(d.contains("[layout]"));
    }

    #[test]
    fn test_merge_keeps_order_and_uniqueness() {
        let mut a = Diagnostics::new();
        a.warn("a", "one");
        let mut b = Diagnostics::new();
        b.warn("a", "one");
        b.warn("b", "two");
        a.merge(b);
        assert_eq!(a.into_messages(), vec!["[a] one".to_string(), "[b] two".to_string()]);
    }

    #[test]
    fn test_extend_keeps_tagged_messages_as_they_are() {
        let mut d = Diagnostics::new();
        d.warn("style", "bad value");
        d.extend(vec!["[style] bad value".to_string(), "[style] other".to_string()]);
        assert_eq!(d.messages(), ["[style] bad value", "[style] other"]);
    }
}
