//! Seams to the user-interaction collaborators: a sink for user-visible
//! notices and the confirmation step that guards destructive imports.

use async_trait::async_trait;
use log::info;

use super::models::Notice;

/// Receives the notices raised at operation boundaries
pub trait NoticeSink: Send + Sync {
    fn notify(&self, notice: Notice);
}

/// Question shown before an operation that overwrites user data
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfirmationPrompt {
    pub title: String,
    pub message: String,
    pub confirm_label: String,
    pub cancel_label: String,
}

impl ConfirmationPrompt {
    /// Prompt shown before an import replaces the whole wardrobe
    pub fn replace_wardrobe() -> Self {
        Self {
            title: "Import Wardrobe".to_string(),
            message: "This will replace your current wardrobe data. Are you sure?".to_string(),
            confirm_label: "Import".to_string(),
            cancel_label: "Cancel".to_string(),
        }
    }
}

/// Asks the user to confirm a destructive operation. The caller is suspended
/// until the user answers.
#[async_trait]
pub trait ImportConfirmation: Send + Sync {
    async fn confirm(&self, prompt: &ConfirmationPrompt) -> bool;
}

/// Confirms without asking (non-interactive runs)
#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysConfirm;

#[async_trait]
impl ImportConfirmation for AlwaysConfirm {
    async fn confirm(&self, prompt: &ConfirmationPrompt) -> bool {
        info!("Auto-confirming '{}'", prompt.title);
        true
    }
}

#[cfg(test)]
pub mod testing {
    use super::*;
    use parking_lot::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Keeps every notice for later assertions
    #[derive(Default)]
    pub struct RecordingNoticeSink {
        notices: Mutex<Vec<Notice>>,
    }

    impl RecordingNoticeSink {
        pub fn notices(&self) -> Vec<Notice> {
            self.notices.lock().clone()
        }

        pub fn titles(&self) -> Vec<String> {
            self.notices.lock().iter().map(|n| n.title.clone()).collect()
        }

        pub fn last(&self) -> Option<Notice> {
            self.notices.lock().last().cloned()
        }
    }

    impl NoticeSink for RecordingNoticeSink {
        fn notify(&self, notice: Notice) {
            self.notices.lock().push(notice);
        }
    }

    /// Answers every prompt with a fixed choice and counts the prompts
    pub struct ScriptedConfirmation {
        answer: bool,
        asked: AtomicUsize,
    }

    impl ScriptedConfirmation {
        pub fn accepting() -> Self {
            Self { answer: true, asked: AtomicUsize::new(0) }
        }

        pub fn declining() -> Self {
            Self { answer: false, asked: AtomicUsize::new(0) }
        }

        pub fn times_asked(&self) -> usize {
            self.asked.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl ImportConfirmation for ScriptedConfirmation {
        async fn confirm(&self, _prompt: &ConfirmationPrompt) -> bool {
            self.asked.fetch_add(1, Ordering::SeqCst);
            self.answer
        }
    }
}
