use super::{
    format_size, json_pretty, open_repo, report_failure, spin_fail, spin_ok, spinner,
    EXIT_SUCCESS,
};
use crate::prompt;
use folio_registry::Reconciliation;
use std::path::Path;

pub fn run(
    repo: &Path,
    archive: &Path,
    yes: bool,
    non_interactive: bool,
    json: bool,
) -> Result<u8, String> {
    let publisher = open_repo(repo)?;
    let mut confirm = prompt::for_flags(yes, non_interactive || json);

    let pb = if json {
        None
    } else {
        Some(spinner(&format!("validating {}...", archive.display())))
    };
    let summary = match publisher.validate(archive) {
        Ok(s) => {
            if let Some(ref pb) = pb {
                spin_ok(pb, "manifest and files valid");
            }
            s
        }
        Err(e) => {
            if let Some(ref pb) = pb {
                spin_fail(pb, "validation failed");
            }
            return report_failure(&e, json);
        }
    };

    let m = &summary.manifest;
    if !json {
        println!("  name:    {}", m.name);
        println!("  version: {}", m.version);
        println!("  type:    {}", m.kind);
        println!("  author:  {}", m.author);
        println!("  sha256:  {}", summary.digest.sha256);
        println!("  size:    {}", format_size(summary.digest.size));
    }

    let outcome = match publisher.admit(archive, &summary, confirm.as_mut()) {
        Ok(o) => o,
        Err(e) => return report_failure(&e, json),
    };

    if json {
        let payload = serde_json::json!({
            "status": "published",
            "decision": outcome.decision.label(),
            "entry": outcome.entry,
            "artifact": outcome.artifact_path,
            "removed_previous": outcome.removed_previous,
            "registry": outcome.registry_path,
            "finalize": outcome.finalize.command,
        });
        println!("{}", json_pretty(&payload)?);
        return Ok(EXIT_SUCCESS);
    }

    if let Reconciliation::Supersede { existing } = &outcome.decision {
        println!(
            "updated {} from v{} to v{}",
            outcome.entry.name, existing.version, outcome.entry.version
        );
    }
    if let Some(old) = &outcome.removed_previous {
        println!("removed {}", old.display());
    }
    println!("copied to {}", outcome.artifact_path.display());
    println!("updated {}", outcome.registry_path.display());
    println!();
    println!("to commit and push, run:");
    println!("  {}", outcome.finalize.command);
    Ok(EXIT_SUCCESS)
}
