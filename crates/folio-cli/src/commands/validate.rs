use super::{
    format_size, json_pretty, open_repo, report_failure, spin_fail, spin_ok, spinner,
    EXIT_SUCCESS,
};
use std::path::Path;

pub fn run(repo: &Path, archive: &Path, json: bool) -> Result<u8, String> {
    let publisher = open_repo(repo)?;

    let pb = if json {
        None
    } else {
        Some(spinner(&format!("validating {}...", archive.display())))
    };
    let summary = match publisher.validate(archive) {
        Ok(s) => {
            if let Some(ref pb) = pb {
                spin_ok(pb, "archive is valid");
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
    if json {
        let payload = serde_json::json!({
            "status": "valid",
            "name": m.name,
            "version": m.version,
            "type": m.kind,
            "files": m.files,
            "files_checked": summary.files_checked,
            "artifact": summary.artifact_name,
            "sha256": summary.digest.sha256,
            "size": summary.digest.size,
        });
        println!("{}", json_pretty(&payload)?);
    } else {
        println!("  name:    {}", m.name);
        println!("  version: {}", m.version);
        println!("  type:    {}", m.kind);
        println!("  files:   {} checked", summary.files_checked);
        if let Some(langs) = &m.languages {
            let pairs: Vec<String> = langs
                .pairs()
                .map(|(name, code)| format!("{name} ({code})"))
                .collect();
            println!("  langs:   {}", pairs.join(", "));
        }
        println!("  stored:  {}", summary.artifact_name);
        println!("  sha256:  {}", summary.digest.sha256);
        println!("  size:    {}", format_size(summary.digest.size));
    }
    Ok(EXIT_SUCCESS)
}
