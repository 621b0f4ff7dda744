//! Descriptor format migration
//!
//! Upgrades a descriptor document one version at a time:
//! - Each [`Migration`] moves a document from version N to N+1
//! - [`MigrationChain`] applies steps until the target version is reached
//! - Documents newer than the target are refused

use crate::descriptor::{set_version, stored_version, LEGACY_VERSION_KEY};
use crate::error::MigrationError;
use serde_yaml::{Mapping, Value};

/// Descriptor format written by this build
pub const CURRENT_FORMAT_VERSION: u32 = 1;

/// One upgrade step
pub trait Migration {
    /// Version this step upgrades from
    fn source_version(&self) -> u32;

    /// Short human description
    fn description(&self) -> &'static str;

    /// Rewrite `document` in place
    ///
    /// # Errors
    /// [`MigrationError`] if the document cannot be upgraded
    fn apply(&self, document: &mut Mapping) -> Result<(), MigrationError>;
}

/// Version 0 to 1: container members live under `content`
///
/// Manuscripts used to list members under `chapters`, chapters under
/// `scenes`. Also drops the unversioned `version` key some early writers
/// emitted.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnifyContainerContent;

impl Migration for UnifyContainerContent {
    fn source_version(&self) -> u32 {
        0
    }

    fn description(&self) -> &'static str {
        "rename chapters/scenes to content"
    }

    fn apply(&self, document: &mut Mapping) -> Result<(), MigrationError> {
        document.remove(LEGACY_VERSION_KEY);

        let Some(resources) = document.get_mut("resources") else {
            return Ok(());
        };
        let records = match resources {
            Value::Sequence(records) => records,
            Value::Null => return Ok(()),
            _ => return Err(MigrationError::Malformed("resources is not a list".into())),
        };

        for record in records {
            let Value::Mapping(record) = record else {
                return Err(MigrationError::Malformed("resource record is not a mapping".into()));
            };
            let legacy = match record.get("a").and_then(Value::as_str) {
                Some("Manuscript") => "chapters",
                Some("Chapter") => "scenes",
                _ => continue,
            };
            let Some(members) = record.remove(legacy) else {
                continue;
            };
            if record.contains_key("content") {
                let identifier = record
                    .get("identifier")
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string();
                return Err(MigrationError::Conflict {
                    identifier,
                    field: "content".into(),
                });
            }
            record.insert(Value::String("content".into()), members);
        }
        Ok(())
    }
}

/// Ordered set of upgrade steps
pub struct MigrationChain {
    steps: Vec<Box<dyn Migration>>,
}

impl std::fmt::Debug for MigrationChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.steps.iter().map(|step| step.description()))
            .finish()
    }
}

impl MigrationChain {
    /// Chain with no steps
    #[must_use]
    pub fn empty() -> Self {
        Self { steps: Vec::new() }
    }

    /// Register a step
    #[must_use]
    pub fn with_step(mut self, step: impl Migration + 'static) -> Self {
        self.steps.push(Box::new(step));
        self
    }

    /// Step leaving `version`, if registered
    #[must_use]
    pub fn step_for(&self, version: u32) -> Option<&dyn Migration> {
        let step = self
            .steps
            .iter()
            .find(|step| step.source_version() == version)?;
        Some(step.as_ref())
    }

    /// Upgrade `document` to `target`, returning the version it started at
    ///
    /// The version key is rewritten after every step. A document already
    /// at `target` is left untouched.
    ///
    /// # Errors
    /// - [`MigrationError::UnsupportedVersion`] if the document is newer than `target`
    /// - [`MigrationError::MissingStep`] if the chain has a gap
    /// - any error a step raises
    pub fn migrate(&self, document: &mut Value, target: u32) -> Result<u32, MigrationError> {
        let mapping = document
            .as_mapping_mut()
            .ok_or_else(|| MigrationError::Malformed("descriptor is not a mapping".into()))?;
        let found = stored_version(mapping)?;
        if found > target {
            return Err(MigrationError::UnsupportedVersion {
                found,
                supported: target,
            });
        }

        let mut version = found;
        while version < target {
            let step = self
                .step_for(version)
                .ok_or(MigrationError::MissingStep { from: version })?;
            tracing::debug!("Applying migration {version}: {}", step.description());
            step.apply(mapping)?;
            version += 1;
            set_version(mapping, version);
        }
        Ok(found)
    }
}

impl Default for MigrationChain {
    fn default() -> Self {
        Self::empty().with_step(UnifyContainerContent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const V0: &str = "
title: Old
resources:
  - a: Manuscript
    identifier: m
    chapters: [c]
  - a: Chapter
    identifier: c
    scenes: [s]
  - a: Scene
    identifier: s
    entities: []
";

    #[test]
    fn upgrades_legacy_container_keys() {
        let mut document: Value = serde_yaml::from_str(V0).unwrap();
        let from = MigrationChain::default()
            .migrate(&mut document, CURRENT_FORMAT_VERSION)
            .unwrap();
        assert_eq!(from, 0);
        assert_eq!(document["format_version"], Value::Number(1.into()));
        assert_eq!(document["resources"][0]["content"][0], Value::String("c".into()));
        assert_eq!(document["resources"][1]["content"][0], Value::String("s".into()));
        assert!(document["resources"][0].get("chapters").is_none());
    }

    #[test]
    fn current_version_is_untouched() {
        let text = "format_version: 1\ntitle: New\n";
        let mut document: Value = serde_yaml::from_str(text).unwrap();
        let before = document.clone();
        let from = MigrationChain::default().migrate(&mut document, 1).unwrap();
        assert_eq!(from, 1);
        assert_eq!(document, before);
    }

    #[test]
    fn newer_version_is_refused() {
        let mut document: Value = serde_yaml::from_str("format_version: 7\n").unwrap();
        let err = MigrationChain::default().migrate(&mut document, 1).unwrap_err();
        assert_eq!(err, MigrationError::UnsupportedVersion { found: 7, supported: 1 });
    }

    #[test]
    fn gap_in_chain_is_reported() {
        let mut document: Value = serde_yaml::from_str("title: x\n").unwrap();
        let err = MigrationChain::empty().migrate(&mut document, 1).unwrap_err();
        assert_eq!(err, MigrationError::MissingStep { from: 0 });
    }

    #[test]
    fn conflicting_content_key_fails() {
        let text = "resources:\n  - a: Chapter\n    identifier: c\n    scenes: [a]\n    content: [b]\n";
        let mut document: Value = serde_yaml::from_str(text).unwrap();
        let err = MigrationChain::default().migrate(&mut document, 1).unwrap_err();
        assert!(matches!(err, MigrationError::Conflict { .. }));
    }
}
