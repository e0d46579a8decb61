use super::{json_pretty, load_registry, open_repo, EXIT_STORE_ERROR, EXIT_SUCCESS};
use folio_registry::verify_registry_integrity;
use std::path::Path;

pub fn run(repo: &Path, json: bool) -> Result<u8, String> {
    let publisher = open_repo(repo)?;
    let Some(registry) = load_registry(&publisher)? else {
        return Err(format!(
            "no registry at {}",
            publisher.layout().registry_path().display()
        ));
    };
    let report = verify_registry_integrity(publisher.layout(), &registry)
        .map_err(|e| format!("store error: {e}"))?;

    if json {
        let failed: Vec<_> = report
            .failed
            .iter()
            .map(|f| serde_json::json!({"name": f.name, "reason": f.reason}))
            .collect();
        let payload = serde_json::json!({
            "checked": report.checked,
            "passed": report.passed,
            "failed": failed,
            "orphaned": report.orphaned,
        });
        println!("{}", json_pretty(&payload)?);
    } else {
        println!(
            "registry integrity: {}/{} artifacts passed",
            report.passed, report.checked
        );
        for f in &report.failed {
            println!("  FAIL {}: {}", f.name, f.reason);
        }
        for o in &report.orphaned {
            println!("  orphan {o}");
        }
    }

    if report.is_clean() {
        Ok(EXIT_SUCCESS)
    } else {
        Ok(EXIT_STORE_ERROR)
    }
}
