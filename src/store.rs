//! The line store: the ordered list of text payloads awaiting encoding.
//!
//! One element per input line, duplicates allowed, blank lines kept (they
//! matter for numbering). The store is mutated by user edits, by decode
//! results being appended, by whole-store truncation, and by clearing.

/// Practical DataMatrix payload cap enforced by [`LineStore::truncate_all`].
///
/// A defensive limit applied on request, not derived from the encoder — the
/// encoder itself accepts far longer payloads, but downstream consumers of
/// these codes expect at most 31 characters.
pub const PAYLOAD_LIMIT: usize = 31;

/// Ordered sequence of raw payload lines.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LineStore {
    lines: Vec<String>,
}

impl LineStore {
    /// An empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from a block of text, one line per element.
    ///
    /// Leading and trailing whitespace of the whole block is trimmed before
    /// splitting, so a trailing newline does not produce a phantom blank
    /// line. Interior blank lines are kept.
    pub fn from_text(text: &str) -> Self {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Self::new();
        }
        Self {
            lines: trimmed.lines().map(|l| l.to_string()).collect(),
        }
    }

    /// All lines, in order.
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Count of lines that are not blank after trimming.
    pub fn non_blank_count(&self) -> usize {
        self.lines.iter().filter(|l| !l.trim().is_empty()).count()
    }

    /// Append a single line.
    pub fn push_line(&mut self, line: impl Into<String>) {
        self.lines.push(line.into());
    }

    /// Append decoded payloads as new lines, preserving their order.
    pub fn append_payloads(&mut self, payloads: &[String]) {
        self.lines.extend(payloads.iter().cloned());
    }

    /// Truncate every line to at most [`PAYLOAD_LIMIT`] characters.
    ///
    /// Counts characters (code points), not bytes. Returns the number of
    /// lines that were actually shortened.
    pub fn truncate_all(&mut self) -> usize {
        let mut changed = 0;
        for line in &mut self.lines {
            if line.chars().count() > PAYLOAD_LIMIT {
                *line = line.chars().take(PAYLOAD_LIMIT).collect();
                changed += 1;
            }
        }
        changed
    }

    /// Render the store with a `N: ` line-number gutter, 1-based.
    ///
    /// This is the "line-number refresh" view shown after every decode
    /// append, so freshly imported payloads pick up their positions.
    pub fn numbered_text(&self) -> String {
        self.lines
            .iter()
            .enumerate()
            .map(|(i, line)| format!("{}: {}", i + 1, line))
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Remove every line.
    pub fn clear(&mut self) {
        self.lines.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_text_splits_lines() {
        let store = LineStore::from_text("alpha\nbeta\n\ngamma\n");
        assert_eq!(store.len(), 4);
        assert_eq!(store.lines()[2], "");
        assert_eq!(store.non_blank_count(), 3);
    }

    #[test]
    fn from_text_of_blank_input_is_empty() {
        assert!(LineStore::from_text("").is_empty());
        assert!(LineStore::from_text("  \n \n").is_empty());
    }

    #[test]
    fn truncate_caps_long_lines_at_limit() {
        let long = "x".repeat(80);
        let short = "short".to_string();
        let exact = "y".repeat(PAYLOAD_LIMIT);
        let mut store = LineStore::from_text(&format!("{long}\n{short}\n{exact}"));

        let changed = store.truncate_all();

        assert_eq!(changed, 1);
        assert_eq!(store.lines()[0].chars().count(), PAYLOAD_LIMIT);
        assert_eq!(store.lines()[1], "short");
        assert_eq!(store.lines()[2].chars().count(), PAYLOAD_LIMIT);
    }

    #[test]
    fn truncate_counts_characters_not_bytes() {
        // 40 two-byte characters; a byte-based cut would split one in half.
        let line: String = "ё".repeat(40);
        let mut store = LineStore::from_text(&line);
        store.truncate_all();
        assert_eq!(store.lines()[0].chars().count(), PAYLOAD_LIMIT);
        assert_eq!(store.lines()[0], "ё".repeat(PAYLOAD_LIMIT));
    }

    #[test]
    fn append_payloads_keeps_order() {
        let mut store = LineStore::from_text("one");
        store.append_payloads(&["two".into(), "three".into()]);
        assert_eq!(store.lines(), &["one", "two", "three"]);
    }

    #[test]
    fn numbered_text_is_one_based() {
        let store = LineStore::from_text("a\nb");
        assert_eq!(store.numbered_text(), "1: a\n2: b");
    }

    #[test]
    fn clear_wipes_everything() {
        let mut store = LineStore::from_text("a\nb");
        store.clear();
        assert!(store.is_empty());
        assert_eq!(store.numbered_text(), "");
    }
}
