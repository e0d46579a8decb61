//! End-to-end publish scenarios against scratch repositories.

use folio_core::{
    ArchiveError, AuditError, ConflictKind, Confirm, CoreError, FixedPolicy, Prompt, Publisher,
    RepoConfig, MAX_ENTRY_SIZE,
};
use folio_registry::{digest_bytes, Reconciliation, RegistryStore};
use folio_schema::ContentError;
use serde_json::json;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use zip::write::SimpleFileOptions;

const THEME_FILE: &str = r##"{
  "lookAndFeelClassName": "javax.swing.plaf.metal.MetalLookAndFeel",
  "formatString": "<b>%s</b>",
  "styles": {
    "verse": {"fontName": "Serif", "fontStyle": "plain", "fontSize": 14, "color": "#202020"},
    "heading": {"fontName": "Serif", "fontStyle": "bold", "fontSize": 18, "color": "#000000"}
  },
  "textAreaBackground": "#fdfbf5"
}"##;

/// Records every prompt and answers from a fixed policy.
struct Recorder {
    policy: FixedPolicy,
    seen: Vec<Prompt>,
}

impl Recorder {
    fn new(policy: FixedPolicy) -> Self {
        Self {
            policy,
            seen: Vec::new(),
        }
    }
}

impl Confirm for Recorder {
    fn confirm(&mut self, prompt: &Prompt) -> bool {
        self.seen.push(prompt.clone());
        self.policy.confirm(prompt)
    }
}

fn write_zip(path: &Path, entries: &[(&str, &[u8])]) {
    let file = File::create(path).unwrap();
    let mut writer = zip::ZipWriter::new(file);
    for (name, content) in entries {
        writer.start_file(*name, SimpleFileOptions::default()).unwrap();
        writer.write_all(content).unwrap();
    }
    writer.finish().unwrap();
}

fn theme_archive(dir: &Path, version: &str) -> PathBuf {
    let manifest = json!({
        "name": "kjv-theme",
        "version": version,
        "type": "theme",
        "description": "Classic KJV look",
        "author": "Folio Team",
        "files": {"themes": ["kjv.json"]}
    })
    .to_string();
    let path = dir.join(format!("kjv-theme-{version}-upload.zip"));
    write_zip(
        &path,
        &[
            ("manifest.json", manifest.as_bytes()),
            ("kjv.json", THEME_FILE.as_bytes()),
        ],
    );
    path
}

fn setup() -> (tempfile::TempDir, tempfile::TempDir, Publisher) {
    let repo = tempfile::tempdir().unwrap();
    let uploads = tempfile::tempdir().unwrap();
    let publisher = Publisher::open(repo.path()).unwrap();
    (repo, uploads, publisher)
}

fn registry_bytes(publisher: &Publisher) -> Vec<u8> {
    fs::read(publisher.layout().registry_path()).unwrap()
}

#[test]
fn new_theme_is_accepted_with_matching_digest() {
    let (_repo, uploads, publisher) = setup();
    let archive = theme_archive(uploads.path(), "1.0.0");
    let bytes = fs::read(&archive).unwrap();

    let outcome = publisher
        .publish(&archive, &mut FixedPolicy::Defaults)
        .unwrap();
    assert_eq!(outcome.decision, Reconciliation::Accept);

    let expected = digest_bytes(&bytes);
    assert_eq!(outcome.entry.sha256, expected.sha256);
    assert_eq!(outcome.entry.size, bytes.len() as u64);
    assert!(outcome.entry.published_date.ends_with('Z'));
    assert_eq!(
        outcome.entry.download_url,
        "https://github.com/mybible-cli/mybible-cli-extensions/raw/main/extensions/kjv-theme-1.0.0.zip"
    );
    assert_eq!(fs::read(&outcome.artifact_path).unwrap(), bytes);
    assert!(outcome.artifact_path.ends_with("extensions/kjv-theme-1.0.0.zip"));

    let registry = RegistryStore::new(publisher.layout().clone())
        .load()
        .unwrap()
        .unwrap();
    assert_eq!(registry.version, "1.0");
    assert_eq!(registry.extensions.len(), 1);
    assert_eq!(registry.extensions[0], outcome.entry);

    let sh = fs::read_to_string(&outcome.scripts.sh).unwrap();
    assert!(sh.contains("git commit -m \"Add extension: kjv-theme v1.0.0\""));
    assert!(outcome.finalize.command.contains("commit-and-push"));
}

#[test]
fn older_version_is_rejected_and_registry_untouched() {
    let (_repo, uploads, publisher) = setup();
    publisher
        .publish(&theme_archive(uploads.path(), "1.0.0"), &mut FixedPolicy::Defaults)
        .unwrap();
    let before = registry_bytes(&publisher);

    let mut confirm = Recorder::new(FixedPolicy::Defaults);
    let err = publisher
        .publish(&theme_archive(uploads.path(), "0.9.0"), &mut confirm)
        .unwrap_err();
    assert!(matches!(
        err,
        CoreError::RegistryConflict {
            kind: ConflictKind::Stale,
            ..
        }
    ));
    assert!(matches!(
        confirm.seen.as_slice(),
        [Prompt::OverrideConflict {
            same_version: false,
            ..
        }]
    ));
    assert_eq!(registry_bytes(&publisher), before);
    assert!(!publisher
        .layout()
        .artifact_path("kjv-theme-0.9.0.zip")
        .exists());
}

#[test]
fn republish_with_override_keeps_one_entry() {
    let (_repo, uploads, publisher) = setup();
    let archive = theme_archive(uploads.path(), "1.0.0");
    let first = publisher
        .publish(&archive, &mut FixedPolicy::Defaults)
        .unwrap();

    let mut confirm = Recorder::new(FixedPolicy::AcceptAll);
    let second = publisher.publish(&archive, &mut confirm).unwrap();
    assert!(matches!(second.decision, Reconciliation::Duplicate { .. }));
    assert!(matches!(
        confirm.seen.as_slice(),
        [
            Prompt::OverrideConflict {
                same_version: true,
                ..
            },
            Prompt::Overwrite { .. }
        ]
    ));

    let registry = RegistryStore::new(publisher.layout().clone())
        .load()
        .unwrap()
        .unwrap();
    assert_eq!(registry.extensions.len(), 1);
    let mut stored = registry.extensions[0].clone();
    stored.published_date.clone_from(&first.entry.published_date);
    assert_eq!(stored, first.entry);
}

#[test]
fn duplicate_declined_at_overwrite_is_cancelled() {
    let (_repo, uploads, publisher) = setup();
    let archive = theme_archive(uploads.path(), "1.0.0");
    publisher
        .publish(&archive, &mut FixedPolicy::Defaults)
        .unwrap();

    struct OverrideOnly;
    impl Confirm for OverrideOnly {
        fn confirm(&mut self, prompt: &Prompt) -> bool {
            matches!(prompt, Prompt::OverrideConflict { .. })
        }
    }
    let err = publisher.publish(&archive, &mut OverrideOnly).unwrap_err();
    assert!(matches!(err, CoreError::Cancelled(_)));
}

#[test]
fn newer_version_supersedes_and_removes_previous_artifact() {
    let (_repo, uploads, publisher) = setup();
    publisher
        .publish(&theme_archive(uploads.path(), "1.2.0"), &mut FixedPolicy::Defaults)
        .unwrap();
    let old = publisher.layout().artifact_path("kjv-theme-1.2.0.zip");
    assert!(old.exists());

    let outcome = publisher
        .publish(&theme_archive(uploads.path(), "1.10.0"), &mut FixedPolicy::Defaults)
        .unwrap();
    assert!(matches!(outcome.decision, Reconciliation::Supersede { .. }));
    assert_eq!(outcome.removed_previous.as_deref(), Some(old.as_path()));
    assert!(!old.exists());
    assert_eq!(outcome.entry.version, "1.10.0");
}

#[test]
fn supersede_keeps_previous_artifact_when_declined() {
    let (_repo, uploads, publisher) = setup();
    publisher
        .publish(&theme_archive(uploads.path(), "1.0.0"), &mut FixedPolicy::Defaults)
        .unwrap();
    let outcome = publisher
        .publish(&theme_archive(uploads.path(), "2.0.0"), &mut FixedPolicy::RejectAll)
        .unwrap();
    assert!(outcome.removed_previous.is_none());
    assert!(publisher
        .layout()
        .artifact_path("kjv-theme-1.0.0.zip")
        .exists());
}

#[test]
fn supersede_tolerates_missing_previous_artifact() {
    let (_repo, uploads, publisher) = setup();
    publisher
        .publish(&theme_archive(uploads.path(), "1.0.0"), &mut FixedPolicy::Defaults)
        .unwrap();
    fs::remove_file(publisher.layout().artifact_path("kjv-theme-1.0.0.zip")).unwrap();

    let outcome = publisher
        .publish(&theme_archive(uploads.path(), "1.0.1"), &mut FixedPolicy::Defaults)
        .unwrap();
    assert!(outcome.removed_previous.is_none());
}

#[test]
fn misnamed_mapping_is_not_looked_up() {
    let (_repo, uploads, publisher) = setup();
    let manifest = json!({
        "name": "rst-mapping", "version": "1.0.0", "type": "mapping",
        "description": "d", "author": "a",
        "files": {"mappings": ["books.json"]}
    })
    .to_string();
    let path = uploads.path().join("rst.zip");
    write_zip(&path, &[("manifest.json", manifest.as_bytes())]);

    let err = publisher.validate(&path).unwrap_err();
    let CoreError::ContentErrors(errors) = err else {
        panic!("expected content errors, got {err}");
    };
    assert_eq!(errors.len(), 1);
    assert!(matches!(
        &errors[0],
        AuditError::FilenamePatternMismatch { file, .. } if file == "books.json"
    ));
}

#[test]
fn broken_properties_report_line_number() {
    let (_repo, uploads, publisher) = setup();
    let manifest = json!({
        "name": "en-localization", "version": "1.0.0", "type": "localization",
        "description": "d", "author": "a",
        "files": {"resources": ["messages_en.properties"]},
        "languages": ["English"], "lang_codes": ["en"]
    })
    .to_string();
    let path = uploads.path().join("en.zip");
    write_zip(
        &path,
        &[
            ("manifest.json", manifest.as_bytes()),
            ("messages_en.properties", b"# UI\ntitle=Bible\nhello world\n"),
        ],
    );

    let err = publisher
        .publish(&path, &mut FixedPolicy::AcceptAll)
        .unwrap_err();
    let CoreError::ContentErrors(errors) = err else {
        panic!("expected content errors, got {err}");
    };
    assert!(matches!(
        errors.as_slice(),
        [AuditError::InvalidContent {
            source: ContentError::InvalidPropertiesLine { line: 3 },
            ..
        }]
    ));
    assert!(!publisher.layout().registry_path().exists());
}

#[test]
fn oversized_content_entry_is_reported_not_fatal() {
    let (_repo, uploads, publisher) = setup();
    let path = theme_archive(uploads.path(), "1.0.0");

    // kjv.json is written last, so its central directory header is the last one.
    let mut bytes = fs::read(&path).unwrap();
    let header = bytes
        .windows(4)
        .rposition(|w| w == b"PK\x01\x02")
        .unwrap();
    bytes[header + 24..header + 28].copy_from_slice(&0xFFFF_FFF0_u32.to_le_bytes());
    fs::write(&path, bytes).unwrap();

    let Err(CoreError::ContentErrors(errors)) = publisher.validate(&path) else {
        panic!("expected content errors");
    };
    assert!(matches!(
        errors.as_slice(),
        [AuditError::UnreadableEntry {
            file,
            source: ArchiveError::EntryTooLarge { max, .. },
        }] if file == "kjv.json" && *max == MAX_ENTRY_SIZE
    ));
}

#[test]
fn two_broken_mappings_give_two_errors() {
    let (_repo, uploads, publisher) = setup();
    let manifest = json!({
        "name": "multi-mapping", "version": "1.0.0", "type": "mapping",
        "description": "d", "author": "a",
        "files": {"mappings": ["de_mapping.json", "ru_mapping.json"]}
    })
    .to_string();
    let path = uploads.path().join("multi.zip");
    write_zip(
        &path,
        &[
            ("manifest.json", manifest.as_bytes()),
            ("de_mapping.json", br#"{"one": ["Genesis"]}"#),
            ("ru_mapping.json", br#"{"1": [{"ru": "Bytie"}]}"#),
        ],
    );

    let Err(CoreError::ContentErrors(errors)) = publisher.validate(&path) else {
        panic!("expected content errors");
    };
    let files: Vec<&str> = errors.iter().map(AuditError::file).collect();
    assert_eq!(files, ["de_mapping.json", "ru_mapping.json"]);
}

#[test]
fn localization_entry_carries_language_fields() {
    let (_repo, uploads, publisher) = setup();
    let manifest = json!({
        "name": "de-localization", "version": "1.0.0", "type": "localization",
        "description": "German", "author": "a",
        "files": {"resources": ["messages_de.properties", "gui_de.properties"]},
        "languages": ["Deutsch"], "lang_codes": ["de"]
    })
    .to_string();
    let path = uploads.path().join("de.zip");
    write_zip(
        &path,
        &[
            ("manifest.json", manifest.as_bytes()),
            ("messages_de.properties", b"greeting=Hallo\n"),
            ("gui_de.properties", b"menu.file: Datei\n"),
        ],
    );

    let outcome = publisher
        .publish(&path, &mut FixedPolicy::Defaults)
        .unwrap();
    assert_eq!(outcome.entry.languages, Some(vec!["Deutsch".to_owned()]));
    assert_eq!(outcome.entry.lang_codes, Some(vec!["de".to_owned()]));
}

#[test]
fn registry_stays_sorted_across_publishes() {
    let (_repo, uploads, publisher) = setup();
    publisher
        .publish(&theme_archive(uploads.path(), "1.0.0"), &mut FixedPolicy::Defaults)
        .unwrap();

    let manifest = json!({
        "name": "de-theme", "version": "0.1.0", "type": "theme",
        "description": "d", "author": "a", "files": {"themes": ["de.json"]}
    })
    .to_string();
    let path = uploads.path().join("de-theme.zip");
    write_zip(
        &path,
        &[
            ("manifest.json", manifest.as_bytes()),
            ("de.json", THEME_FILE.as_bytes()),
        ],
    );
    publisher
        .publish(&path, &mut FixedPolicy::Defaults)
        .unwrap();

    let registry = RegistryStore::new(publisher.layout().clone())
        .load()
        .unwrap()
        .unwrap();
    let names: Vec<&str> = registry.extensions.iter().map(|e| e.name.as_str()).collect();
    assert_eq!(names, ["de-theme", "kjv-theme"]);
}

#[test]
fn base_url_comes_from_repo_config() {
    let repo = tempfile::tempdir().unwrap();
    let uploads = tempfile::tempdir().unwrap();
    fs::write(
        repo.path().join("folio.toml"),
        "base_url = \"https://mirror.example.org/folio/\"\n",
    )
    .unwrap();
    let publisher = Publisher::open(repo.path()).unwrap();
    assert_eq!(
        publisher.config(),
        &RepoConfig {
            base_url: "https://mirror.example.org/folio".to_owned(),
            ..RepoConfig::default()
        }
    );

    let outcome = publisher
        .publish(&theme_archive(uploads.path(), "1.0.0"), &mut FixedPolicy::Defaults)
        .unwrap();
    assert_eq!(
        outcome.entry.download_url,
        "https://mirror.example.org/folio/extensions/kjv-theme-1.0.0.zip"
    );
}

#[test]
fn archive_without_manifest_is_rejected() {
    let (_repo, uploads, publisher) = setup();
    let path = uploads.path().join("empty.zip");
    write_zip(&path, &[("kjv.json", THEME_FILE.as_bytes())]);
    assert!(matches!(
        publisher.validate(&path),
        Err(CoreError::NoManifest)
    ));
}
