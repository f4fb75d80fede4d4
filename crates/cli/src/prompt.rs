//! Terminal implementations of the dashboard's user-interaction seams

use console::style;
use dialoguer::{theme::ColorfulTheme, Confirm as ConfirmPrompt};
use tracing::warn;

use taskdash_core::dashboard::{Confirm, Notifier};
use taskdash_core::task::Task;

/// Prints alerts to stderr
pub struct TerminalNotifier;

impl Notifier for TerminalNotifier {
    fn alert(&self, message: &str) {
        eprintln!("{} {}", style("✗").red().bold(), message);
    }

    fn task_completed(&self, task: &Task) {
        println!("🎉 Nice work, \"{}\" is done!", task.title);
    }
}

/// Asks on the terminal unless confirmation was given up front
pub struct TerminalConfirm {
    pub assume_yes: bool,
}

impl Confirm for TerminalConfirm {
    fn confirm(&self, prompt: &str) -> bool {
        if self.assume_yes {
            return true;
        }
        match ConfirmPrompt::with_theme(&ColorfulTheme::default())
            .with_prompt(prompt)
            .default(false)
            .interact()
        {
            Ok(answer) => answer,
            Err(e) => {
                warn!("Confirmation prompt failed: {}", e);
                false
            }
        }
    }
}
