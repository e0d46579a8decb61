use folio_core::{Confirm, FixedPolicy, Prompt};
use std::io::{stderr, stdin, IsTerminal};
use tracing::warn;

/// Asks on the terminal when one is attached, otherwise takes each prompt's default.
pub struct TerminalConfirm {
    interactive: bool,
}

impl TerminalConfirm {
    pub fn detect() -> Self {
        Self {
            interactive: stdin().is_terminal() && stderr().is_terminal(),
        }
    }
}

impl Confirm for TerminalConfirm {
    fn confirm(&mut self, prompt: &Prompt) -> bool {
        let default = prompt.default_answer();
        if !self.interactive {
            eprintln!(
                "{prompt} [{}] (no terminal, using default)",
                if default { "yes" } else { "no" }
            );
            return default;
        }
        dialoguer::Confirm::new()
            .with_prompt(prompt.to_string())
            .default(default)
            .interact()
            .unwrap_or_else(|e| {
                warn!("prompt failed ({e}); using default");
                default
            })
    }
}

/// Pick the confirmation strategy for the `publish` flags.
pub fn for_flags(yes: bool, non_interactive: bool) -> Box<dyn Confirm> {
    if yes {
        Box::new(FixedPolicy::AcceptAll)
    } else if non_interactive {
        Box::new(FixedPolicy::Defaults)
    } else {
        Box::new(TerminalConfirm::detect())
    }
}
