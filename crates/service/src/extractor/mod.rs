//! Pulling student fields out of free text.
//!
//! Extraction never fails: whatever could not be recognized stays `None`
//! in the returned draft and is asked for later.

mod rules;

use school_assist_core::{ClassCatalog, StudentDraft};

pub use rules::RuleBasedExtractor;

/// What an extractor may consult besides the message itself.
#[derive(Debug, Clone, Copy)]
pub struct ExtractionContext<'a> {
    pub catalog: &'a ClassCatalog,
    /// Class already chosen in an earlier turn, used to disambiguate arms.
    pub known_class_id: Option<&'a str>,
}

impl<'a> ExtractionContext<'a> {
    #[must_use]
    pub const fn new(catalog: &'a ClassCatalog) -> Self {
        Self { catalog, known_class_id: None }
    }

    #[must_use]
    pub const fn with_known_class(mut self, class_id: Option<&'a str>) -> Self {
        self.known_class_id = class_id;
        self
    }
}

/// Turns one normalized, lowercased message into a partial student draft.
pub trait StudentExtractor: Send + Sync {
    fn extract(&self, message: &str, context: &ExtractionContext<'_>) -> StudentDraft;
}
