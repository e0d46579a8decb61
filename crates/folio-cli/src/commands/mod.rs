pub mod completions;
pub mod inspect;
pub mod list;
pub mod man_pages;
pub mod publish;
pub mod validate;
pub mod verify;

use folio_core::{CoreError, Publisher};
use folio_registry::{EntryKind, Registry, RegistryStore};
use folio_schema::ExtensionType;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;
use std::time::Duration;

pub const EXIT_SUCCESS: u8 = 0;
pub const EXIT_FAILURE: u8 = 1;
pub const EXIT_VALIDATION_ERROR: u8 = 2;
pub const EXIT_STORE_ERROR: u8 = 3;
pub const EXIT_CONFLICT: u8 = 4;

pub fn json_pretty(value: &impl serde::Serialize) -> Result<String, String> {
    serde_json::to_string_pretty(value).map_err(|e| format!("JSON serialization failed: {e}"))
}

pub fn spinner(msg: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::with_template("{spinner:.cyan} {msg}")
            .expect("valid template")
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
    );
    pb.set_message(msg.to_owned());
    pb.enable_steady_tick(Duration::from_millis(80));
    pb
}

pub fn spin_ok(pb: &ProgressBar, msg: &str) {
    pb.set_style(ProgressStyle::with_template("{msg}").expect("valid template"));
    pb.finish_with_message(format!("✓ {msg}"));
}

pub fn spin_fail(pb: &ProgressBar, msg: &str) {
    pb.set_style(ProgressStyle::with_template("{msg}").expect("valid template"));
    pb.finish_with_message(format!("✗ {msg}"));
}

pub fn colorize_type(kind: &EntryKind) -> String {
    use console::Style;
    let style = match kind.known() {
        Some(ExtensionType::Theme) => Style::new().magenta(),
        Some(ExtensionType::Mapping) => Style::new().cyan(),
        Some(ExtensionType::Localization) => Style::new().green(),
        Some(ExtensionType::Bundle) => Style::new().yellow().bold(),
        None => return kind.as_str().to_owned(),
    };
    style.apply_to(kind.as_str()).to_string()
}

/// `12,345 bytes (12.1 KB)`.
pub fn format_size(bytes: u64) -> String {
    let digits = bytes.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    format!("{grouped} bytes ({:.1} KB)", bytes as f64 / 1024.0)
}

pub fn exit_code(err: &CoreError) -> u8 {
    match err {
        CoreError::Archive(_)
        | CoreError::NoManifest
        | CoreError::InvalidManifestJson(_)
        | CoreError::Manifest(_)
        | CoreError::ContentErrors(_) => EXIT_VALIDATION_ERROR,
        CoreError::RegistryConflict { .. } | CoreError::Cancelled(_) => EXIT_CONFLICT,
        CoreError::Store(_) | CoreError::Lock(_) | CoreError::Io(_) => EXIT_STORE_ERROR,
        CoreError::ArchiveNotFound(_) | CoreError::Config(_) => EXIT_FAILURE,
    }
}

/// Print a publish or validation failure with every audit detail; returns the exit code.
pub fn report_failure(err: &CoreError, json: bool) -> Result<u8, String> {
    let details: Vec<String> = match err {
        CoreError::ContentErrors(errors) => errors.iter().map(ToString::to_string).collect(),
        _ => Vec::new(),
    };
    if json {
        let payload = serde_json::json!({
            "status": "rejected",
            "error": err.to_string(),
            "details": details,
        });
        println!("{}", json_pretty(&payload)?);
    } else {
        eprintln!("error: {err}");
        for d in &details {
            eprintln!("  - {d}");
        }
    }
    Ok(exit_code(err))
}

pub fn open_repo(repo: &Path) -> Result<Publisher, String> {
    Publisher::open(repo).map_err(|e| e.to_string())
}

/// Load the registry, or `None` when the repository has not published anything yet.
pub fn load_registry(publisher: &Publisher) -> Result<Option<Registry>, String> {
    RegistryStore::new(publisher.layout().clone())
        .load()
        .map_err(|e| format!("store error: {e}"))
}
