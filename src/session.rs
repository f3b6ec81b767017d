//! The application-state struct tying store, gallery, and pipelines together.
//!
//! The original tool kept the entry list and the gallery cursor as
//! process-wide globals mutated from UI handlers. [`BatchSession`] is the
//! explicit equivalent: one owned value holding all mutable state, with the
//! pipeline operations exposed as methods that keep the pieces consistent
//! (generate resets the gallery, decode appends to the store, clear wipes
//! everything).

use crate::batch;
use crate::config::BatchConfig;
use crate::error::DmBatchError;
use crate::export;
use crate::gallery::Gallery;
use crate::output::DecodeOutput;
use crate::store::LineStore;
use std::path::{Path, PathBuf};

/// All mutable state of one batch-processing session.
#[derive(Debug, Default)]
pub struct BatchSession {
    config: BatchConfig,
    store: LineStore,
    gallery: Gallery,
}

impl BatchSession {
    pub fn new(config: BatchConfig) -> Self {
        Self {
            config,
            store: LineStore::new(),
            gallery: Gallery::new(),
        }
    }

    pub fn config(&self) -> &BatchConfig {
        &self.config
    }

    pub fn store(&self) -> &LineStore {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut LineStore {
        &mut self.store
    }

    pub fn gallery(&self) -> &Gallery {
        &self.gallery
    }

    pub fn gallery_mut(&mut self) -> &mut Gallery {
        &mut self.gallery
    }

    /// Replace the store contents with a block of text.
    pub fn set_text(&mut self, text: &str) {
        self.store = LineStore::from_text(text);
    }

    /// Encode the current store, replacing any previously generated entries
    /// and resetting the gallery cursor to the first one.
    ///
    /// Returns the number of entries generated.
    pub fn generate(&mut self) -> Result<usize, DmBatchError> {
        let entries = batch::encode_lines(&self.store, &self.config)?;
        let count = entries.len();
        self.gallery.replace(entries);
        Ok(count)
    }

    /// Decode an image or PDF file and append every recovered payload to the
    /// store, after which [`LineStore::numbered_text`] reflects the new
    /// numbering.
    pub async fn import(&mut self, path: impl AsRef<Path>) -> Result<DecodeOutput, DmBatchError> {
        let output = batch::decode_auto(path, &self.config).await?;
        self.store.append_payloads(&output.payloads);
        Ok(output)
    }

    /// Truncate every stored line to the payload limit. Returns the number
    /// of lines shortened.
    pub fn truncate(&mut self) -> usize {
        self.store.truncate_all()
    }

    /// Export the generated entries as PNG files into `dir`.
    pub async fn export(&self, dir: impl AsRef<Path>) -> Result<Vec<PathBuf>, DmBatchError> {
        export::export_entries(self.gallery.entries(), dir).await
    }

    /// Wipe the store, the generated entries, and the gallery cursor.
    pub fn clear(&mut self) {
        self.store.clear();
        self.gallery.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generate_fills_gallery_and_resets_cursor() {
        let mut session = BatchSession::default();
        session.set_text("one\ntwo\nthree");

        let count = session.generate().unwrap();

        assert_eq!(count, 3);
        assert_eq!(session.gallery().len(), 3);
        assert_eq!(session.gallery().index(), 0);
    }

    #[test]
    fn regenerate_replaces_previous_entries() {
        let mut session = BatchSession::default();
        session.set_text("one\ntwo");
        session.generate().unwrap();
        session.gallery_mut().next();

        session.set_text("only");
        session.generate().unwrap();

        assert_eq!(session.gallery().len(), 1);
        assert_eq!(session.gallery().index(), 0);
        assert_eq!(session.gallery().current().unwrap().text, "only");
    }

    #[test]
    fn generate_on_empty_session_warns() {
        let mut session = BatchSession::default();
        let err = session.generate().unwrap_err();
        assert!(matches!(err, DmBatchError::EmptyBatch));
    }

    #[test]
    fn clear_wipes_store_and_gallery() {
        let mut session = BatchSession::default();
        session.set_text("a\nb");
        session.generate().unwrap();

        session.clear();

        assert!(session.store().is_empty());
        assert!(session.gallery().is_empty());
        assert!(session.gallery().current().is_none());
    }

    #[test]
    fn truncate_reports_shortened_lines() {
        let mut session = BatchSession::default();
        session.set_text(&format!("{}\nshort", "x".repeat(64)));
        assert_eq!(session.truncate(), 1);
    }

    #[tokio::test]
    async fn export_before_generate_warns() {
        let session = BatchSession::default();
        let dir = tempfile::tempdir().unwrap();
        let err = session.export(dir.path()).await.unwrap_err();
        assert!(matches!(err, DmBatchError::NothingToExport));
    }
}
