use super::{colorize_type, json_pretty, load_registry, open_repo, EXIT_SUCCESS};
use std::path::Path;

pub fn run(repo: &Path, name: &str, json: bool) -> Result<u8, String> {
    let publisher = open_repo(repo)?;
    let registry = load_registry(&publisher)?;
    let entry = registry
        .as_ref()
        .and_then(|r| r.find(name))
        .ok_or_else(|| format!("extension '{name}' not found in registry"))?;

    if json {
        println!("{}", json_pretty(entry)?);
    } else {
        println!("name:           {}", entry.name);
        println!("version:        {}", entry.version);
        println!("type:           {}", colorize_type(&entry.kind));
        println!("description:    {}", entry.description);
        println!("author:         {}", entry.author);
        for (category, files) in entry.files.iter() {
            println!("{:<15} {}", format!("{category}:"), files.join(", "));
        }
        if let (Some(langs), Some(codes)) = (&entry.languages, &entry.lang_codes) {
            println!("languages:      {}", langs.join(", "));
            println!("lang_codes:     {}", codes.join(", "));
        }
        println!("download_url:   {}", entry.download_url);
        println!("size:           {}", entry.size);
        println!("sha256:         {}", entry.sha256);
        println!("published_date: {}", entry.published_date);
    }
    Ok(EXIT_SUCCESS)
}
