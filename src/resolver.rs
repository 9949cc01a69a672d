//! Name to id resolution over a freshly fetched listing.
//!
//! Folder and group references in configuration are names. Every operation
//! that needs the id lists the whole collection and scans it; nothing is
//! cached between operations, so renamed or deleted entities are never
//! served from a stale lookup.
//!
//! Names are not unique on the server. With duplicates the first entry in
//! listing order wins, and that order is whatever the server returned.

use tfpb_passbolt::{FolderEntry, GroupEntry};
use thiserror::Error;

/// Something that can be looked up by name.
pub trait Named {
    /// Entity kind used in error messages, e.g. `folder`.
    const KIND: &'static str;

    fn id(&self) -> &str;
    fn name(&self) -> &str;
}

impl Named for FolderEntry {
    const KIND: &'static str = "folder";

    fn id(&self) -> &str {
        &self.id
    }
    fn name(&self) -> &str {
        &self.name
    }
}

impl Named for GroupEntry {
    const KIND: &'static str = "group";

    fn id(&self) -> &str {
        &self.id
    }
    fn name(&self) -> &str {
        &self.name
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    #[error("{kind} '{name}' not found")]
    NotFound { kind: &'static str, name: String },
}

/// Id of the first entry named exactly `name`.
pub fn resolve_id<T: Named>(entries: &[T], name: &str) -> Result<String, ResolveError> {
    entries
        .iter()
        .find(|e| e.name() == name)
        .map(|e| e.id().to_string())
        .ok_or_else(|| ResolveError::NotFound {
            kind: T::KIND,
            name: name.to_string(),
        })
}

/// Name of the entry with id `id`, if it is in the listing.
pub fn resolve_name<'a, T: Named>(entries: &'a [T], id: &str) -> Option<&'a str> {
    entries.iter().find(|e| e.id() == id).map(|e| e.name())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn folder(id: &str, name: &str) -> FolderEntry {
        FolderEntry {
            id: id.into(),
            name: name.into(),
            folder_parent_id: None,
            personal: false,
        }
    }

    #[test]
    fn no_match_is_not_found() {
        let folders = vec![folder("f1", "Infra")];
        let err = resolve_id(&folders, "Apps").unwrap_err();
        assert_eq!(
            err,
            ResolveError::NotFound {
                kind: "folder",
                name: "Apps".into()
            }
        );
        assert_eq!(err.to_string(), "folder 'Apps' not found");
    }

    #[test]
    fn empty_listing_is_not_found() {
        let groups: Vec<GroupEntry> = Vec::new();
        assert!(resolve_id(&groups, "Ops").is_err());
    }

    #[test]
    fn single_match_returns_its_id() {
        let folders = vec![folder("f1", "Infra"), folder("f2", "Apps")];
        assert_eq!(resolve_id(&folders, "Apps").unwrap(), "f2");
    }

    #[test]
    fn match_is_exact() {
        let folders = vec![folder("f1", "infra"), folder("f2", "Infra ")];
        assert!(resolve_id(&folders, "Infra").is_err());
    }

    #[test]
    fn duplicates_resolve_to_one_of_them() {
        let folders = vec![folder("f1", "Infra"), folder("f2", "Infra")];
        let id = resolve_id(&folders, "Infra").unwrap();
        assert!(id == "f1" || id == "f2");
    }

    #[test]
    fn reverse_lookup() {
        let groups = vec![GroupEntry {
            id: "g1".into(),
            name: "Ops".into(),
        }];
        assert_eq!(resolve_name(&groups, "g1"), Some("Ops"));
        assert_eq!(resolve_name(&groups, "g2"), None);
    }
}
