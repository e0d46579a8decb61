use std::fmt;

/// A question the publisher needs answered before it can continue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Prompt {
    /// The registry already has this name at the same or a newer version.
    OverrideConflict {
        name: String,
        existing: String,
        incoming: String,
        same_version: bool,
    },
    /// A newer version is replacing an older one; delete the old archive?
    RemovePrevious { name: String, file: String },
    /// The destination artifact already exists.
    Overwrite { path: String },
}

impl Prompt {
    /// Answer taken when nobody is asked.
    pub fn default_answer(&self) -> bool {
        match self {
            Self::OverrideConflict { .. } | Self::Overwrite { .. } => false,
            Self::RemovePrevious { .. } => true,
        }
    }
}

impl fmt::Display for Prompt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OverrideConflict {
                name,
                existing,
                incoming,
                same_version,
            } => {
                let relation = if *same_version { "the same" } else { "older" };
                write!(
                    f,
                    "{name} v{existing} already exists and v{incoming} is {relation}. Continue anyway?"
                )
            }
            Self::RemovePrevious { file, .. } => write!(f, "Remove old version ({file})?"),
            Self::Overwrite { path } => write!(f, "File already exists: {path}. Overwrite?"),
        }
    }
}

/// Something that can answer publisher prompts.
pub trait Confirm {
    fn confirm(&mut self, prompt: &Prompt) -> bool;
}

/// Non-interactive answers for scripted callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FixedPolicy {
    /// Take each prompt's default.
    #[default]
    Defaults,
    AcceptAll,
    RejectAll,
}

impl Confirm for FixedPolicy {
    fn confirm(&mut self, prompt: &Prompt) -> bool {
        match self {
            Self::Defaults => prompt.default_answer(),
            Self::AcceptAll => true,
            Self::RejectAll => false,
        }
    }
}
