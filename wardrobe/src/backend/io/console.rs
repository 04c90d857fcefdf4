use async_trait::async_trait;
use log::{debug, warn};
use std::io::{self, BufRead, Write};

use crate::backend::domain::{ConfirmationPrompt, ImportConfirmation, Notice, NoticeKind, NoticeSink};

/// Prints notices to the terminal: failures to stderr, everything else to stdout
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleNoticeSink;

impl NoticeSink for ConsoleNoticeSink {
    fn notify(&self, notice: Notice) {
        debug!("Notice {:?}: {} - {}", notice.kind, notice.title, notice.message);
        match notice.kind {
            NoticeKind::Success => println!("✅ {}: {}", notice.title, notice.message),
            NoticeKind::Info => println!("ℹ️  {}: {}", notice.title, notice.message),
            NoticeKind::Failure => eprintln!("❌ {}: {}", notice.title, notice.message),
        }
    }
}

/// Asks on stdin and waits for the answer
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleConfirmation;

#[async_trait]
impl ImportConfirmation for ConsoleConfirmation {
    async fn confirm(&self, prompt: &ConfirmationPrompt) -> bool {
        let prompt = prompt.clone();
        match tokio::task::spawn_blocking(move || ask(&prompt)).await {
            Ok(answer) => answer,
            Err(e) => {
                warn!("Confirmation prompt failed: {}", e);
                false
            }
        }
    }
}

fn ask(prompt: &ConfirmationPrompt) -> bool {
    print!(
        "{}\n{} [{}/{}]: ",
        prompt.title, prompt.message, prompt.confirm_label, prompt.cancel_label
    );
    if io::stdout().flush().is_err() {
        return false;
    }

    let mut answer = String::new();
    match io::stdin().lock().read_line(&mut answer) {
        Ok(_) => is_affirmative(&answer, prompt),
        Err(e) => {
            warn!("Could not read confirmation: {}", e);
            false
        }
    }
}

/// Anything other than the confirm label, `y` or `yes` counts as cancel
fn is_affirmative(answer: &str, prompt: &ConfirmationPrompt) -> bool {
    let answer = answer.trim();
    answer.eq_ignore_ascii_case(&prompt.confirm_label)
        || answer.eq_ignore_ascii_case("y")
        || answer.eq_ignore_ascii_case("yes")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_explicit_answers_confirm() {
        let prompt = ConfirmationPrompt::replace_wardrobe();

        assert!(is_affirmative("Import\n", &prompt));
        assert!(is_affirmative("  y ", &prompt));
        assert!(is_affirmative("YES", &prompt));
        assert!(!is_affirmative("", &prompt));
        assert!(!is_affirmative("cancel", &prompt));
        assert!(!is_affirmative("nope", &prompt));
    }
}
