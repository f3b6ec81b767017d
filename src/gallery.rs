//! Cyclic gallery index over the generated code entries.
//!
//! The gallery shows exactly one entry at a time; `next`/`prev` wrap around
//! with modulo arithmetic and are no-ops while the gallery is empty.

use crate::output::CodeEntry;

/// A cyclic cursor over the generated entry list.
#[derive(Debug, Clone, Default)]
pub struct Gallery {
    entries: Vec<CodeEntry>,
    index: usize,
}

impl Gallery {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace all entries, resetting the cursor to the first one.
    pub fn replace(&mut self, entries: Vec<CodeEntry>) {
        self.entries = entries;
        self.index = 0;
    }

    /// Drop all entries and reset the cursor.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.index = 0;
    }

    pub fn entries(&self) -> &[CodeEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Current cursor position, 0-based.
    pub fn index(&self) -> usize {
        self.index
    }

    /// The entry under the cursor, if any.
    pub fn current(&self) -> Option<&CodeEntry> {
        self.entries.get(self.index)
    }

    /// Advance the cursor, wrapping past the end. No-op when empty.
    pub fn next(&mut self) -> Option<&CodeEntry> {
        if self.entries.is_empty() {
            return None;
        }
        self.index = (self.index + 1) % self.entries.len();
        self.current()
    }

    /// Step the cursor back, wrapping before the start. No-op when empty.
    pub fn prev(&mut self) -> Option<&CodeEntry> {
        if self.entries.is_empty() {
            return None;
        }
        self.index = (self.index + self.entries.len() - 1) % self.entries.len();
        self.current()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::GrayImage;

    fn entry(line_number: usize) -> CodeEntry {
        CodeEntry {
            line_number,
            text: format!("code-{line_number}"),
            image: GrayImage::new(1, 1),
        }
    }

    fn gallery_of(n: usize) -> Gallery {
        let mut g = Gallery::new();
        g.replace((1..=n).map(entry).collect());
        g
    }

    #[test]
    fn empty_gallery_navigation_is_noop() {
        let mut g = Gallery::new();
        assert!(g.next().is_none());
        assert!(g.prev().is_none());
        assert!(g.current().is_none());
        assert_eq!(g.index(), 0);
    }

    #[test]
    fn next_wraps_after_full_cycle() {
        let mut g = gallery_of(4);
        for _ in 0..4 {
            g.next();
        }
        assert_eq!(g.index(), 0);
        assert_eq!(g.current().unwrap().line_number, 1);
    }

    #[test]
    fn prev_wraps_from_first_to_last() {
        let mut g = gallery_of(3);
        g.prev();
        assert_eq!(g.index(), 2);
        assert_eq!(g.current().unwrap().line_number, 3);
    }

    #[test]
    fn replace_resets_cursor() {
        let mut g = gallery_of(3);
        g.next();
        g.next();
        g.replace(vec![entry(7), entry(8)]);
        assert_eq!(g.index(), 0);
        assert_eq!(g.current().unwrap().line_number, 7);
    }

    #[test]
    fn single_entry_cycles_onto_itself() {
        let mut g = gallery_of(1);
        g.next();
        assert_eq!(g.index(), 0);
        g.prev();
        assert_eq!(g.index(), 0);
    }
}
