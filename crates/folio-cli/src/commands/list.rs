use super::{colorize_type, json_pretty, load_registry, open_repo, EXIT_SUCCESS};
use console::{pad_str, Alignment};
use std::path::Path;

pub fn run(repo: &Path, json: bool) -> Result<u8, String> {
    let publisher = open_repo(repo)?;
    let registry = load_registry(&publisher)?;
    let entries = registry.as_ref().map_or(&[][..], |r| r.extensions.as_slice());

    if json {
        println!("{}", json_pretty(&entries)?);
    } else if entries.is_empty() {
        println!("no extensions published");
    } else {
        println!(
            "{:<28} {:<10} {:<14} {:>10} PUBLISHED",
            "NAME", "VERSION", "TYPE", "SIZE"
        );
        for e in entries {
            let kind = colorize_type(&e.kind);
            println!(
                "{:<28} {:<10} {} {:>10} {}",
                e.name.as_str(),
                e.version,
                pad_str(&kind, 14, Alignment::Left, None),
                e.size,
                e.published_date
            );
        }
    }
    Ok(EXIT_SUCCESS)
}
