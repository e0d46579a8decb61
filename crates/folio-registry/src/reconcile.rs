use crate::registry::{Registry, RegistryEntry};
use folio_schema::Version;
use std::cmp::Ordering;
use tracing::warn;

/// Outcome of comparing a submission against the current catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reconciliation {
    /// No entry with this name yet.
    Accept,
    /// Incoming version is older than the published one.
    Stale { existing: RegistryEntry },
    /// Incoming version equals the published one.
    Duplicate { existing: RegistryEntry },
    /// Incoming version is newer; the previous artifact should be dropped.
    Supersede { existing: RegistryEntry },
}

impl Reconciliation {
    /// Stale and duplicate submissions need an explicit override to proceed.
    pub fn requires_override(&self) -> bool {
        matches!(self, Self::Stale { .. } | Self::Duplicate { .. })
    }

    pub fn existing(&self) -> Option<&RegistryEntry> {
        match self {
            Self::Accept => None,
            Self::Stale { existing }
            | Self::Duplicate { existing }
            | Self::Supersede { existing } => Some(existing),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Accept => "new",
            Self::Stale { .. } => "older version",
            Self::Duplicate { .. } => "same version",
            Self::Supersede { .. } => "update",
        }
    }
}

/// Decide how a submission of `name` at `incoming` relates to the catalog.
pub fn reconcile(registry: &Registry, name: &str, incoming: &Version) -> Reconciliation {
    let Some(existing) = registry.find(name) else {
        return Reconciliation::Accept;
    };
    let existing = existing.clone();

    let ordering = match existing.parsed_version() {
        Ok(current) => incoming.cmp(&current),
        Err(e) => {
            warn!(
                "registry entry '{name}' has unparsable version '{}' ({e}); treating it as older",
                existing.version
            );
            Ordering::Greater
        }
    };

    match ordering {
        Ordering::Less => Reconciliation::Stale { existing },
        Ordering::Equal => Reconciliation::Duplicate { existing },
        Ordering::Greater => Reconciliation::Supersede { existing },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use folio_schema::{DeclaredFiles, ExtensionName, ExtensionType, Sha256Hex};

    fn registry_with(name: &str, version: &str) -> Registry {
        let now = Utc.timestamp_opt(1_790_000_000, 0).unwrap();
        let mut reg = Registry::new(now);
        reg.upsert(
            RegistryEntry {
                name: ExtensionName::new(name),
                version: version.to_owned(),
                kind: ExtensionType::Theme.into(),
                description: "d".to_owned(),
                author: "a".to_owned(),
                files: DeclaredFiles::new().with("themes", &["t.json"]),
                download_url: format!("https://example.com/extensions/{name}-{version}.zip"),
                size: 1,
                sha256: Sha256Hex::new("ab"),
                published_date: "2026-01-01T00:00:00Z".to_owned(),
                languages: None,
                lang_codes: None,
            },
            now,
        );
        reg
    }

    fn v(s: &str) -> Version {
        s.parse().unwrap()
    }

    #[test]
    fn unknown_name_is_accepted() {
        let reg = registry_with("kjv-theme", "1.0.0");
        assert_eq!(
            reconcile(&reg, "rst-mapping", &v("1.0.0")),
            Reconciliation::Accept
        );
    }

    #[test]
    fn older_version_is_stale() {
        let reg = registry_with("kjv-theme", "1.0.0");
        let r = reconcile(&reg, "kjv-theme", &v("0.9.0"));
        assert!(matches!(r, Reconciliation::Stale { .. }));
        assert!(r.requires_override());
        assert_eq!(r.existing().unwrap().version, "1.0.0");
    }

    #[test]
    fn equal_version_is_duplicate() {
        let reg = registry_with("kjv-theme", "1.0.0");
        let r = reconcile(&reg, "kjv-theme", &v("1.0.0"));
        assert!(matches!(r, Reconciliation::Duplicate { .. }));
        assert!(r.requires_override());
        assert_eq!(r.label(), "same version");
    }

    #[test]
    fn newer_version_supersedes_numerically() {
        let reg = registry_with("kjv-theme", "1.2.0");
        let r = reconcile(&reg, "kjv-theme", &v("1.10.0"));
        assert!(matches!(r, Reconciliation::Supersede { .. }));
        assert!(!r.requires_override());
    }

    #[test]
    fn unparsable_existing_version_is_superseded() {
        let reg = registry_with("kjv-theme", "1.0");
        let r = reconcile(&reg, "kjv-theme", &v("0.0.1"));
        assert!(matches!(r, Reconciliation::Supersede { .. }));
    }
}
