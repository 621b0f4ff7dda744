//! On-disk project descriptor
//!
//! One YAML document per project:
//!
//! ```yaml
//! format_version: 1
//! title: My Novel
//! manuscript: 0f0c...
//! resources:
//!   - a: Chapter
//!     identifier: 4b1e...
//!     title: Arrival
//!     synopsis: ''
//!     content: [9a2d..., 77c3...]
//! ```
//!
//! Records store references as identifiers. Scalars are decoded here;
//! references are resolved by the project, which owns the resource arena.

use crate::error::{MigrationError, ProjectError, ProjectResult};
use crate::migration::CURRENT_FORMAT_VERSION;
use scriptorium_model::{FieldKind, FieldSpec, FieldValue, Resource, ResourceId};
use serde::{Deserialize, Deserializer, Serialize};
use serde_yaml::{Mapping, Value};
use std::collections::BTreeMap;
use std::path::Path;

/// Key holding the descriptor format version
pub const FORMAT_VERSION_KEY: &str = "format_version";
/// Key older writers stored the format version under
pub const LEGACY_VERSION_KEY: &str = "version";

/// Whole-project descriptor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Descriptor {
    /// Format the document is written in
    pub format_version: u32,
    /// Project title
    #[serde(default, deserialize_with = "nullable_string")]
    pub title: String,
    /// Identifier of the designated manuscript
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manuscript: Option<ResourceId>,
    /// Every resource, in project order
    #[serde(default)]
    pub resources: Vec<ResourceRecord>,
}

impl Descriptor {
    /// Empty descriptor at the current format
    #[must_use]
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            format_version: CURRENT_FORMAT_VERSION,
            title: title.into(),
            manuscript: None,
            resources: Vec::new(),
        }
    }

    /// Read and decode a descriptor file
    ///
    /// # Errors
    /// I/O and YAML failures
    pub fn read(path: &Path) -> ProjectResult<Self> {
        let document = read_document(path)?;
        serde_yaml::from_value(document).map_err(|e| ProjectError::yaml_error(path, e))
    }

    /// Encode and write to `path`
    ///
    /// # Errors
    /// I/O and YAML failures
    pub fn write(&self, path: &Path) -> ProjectResult<()> {
        let text = serde_yaml::to_string(self).map_err(|e| ProjectError::yaml_error(path, e))?;
        std::fs::write(path, text).map_err(|e| ProjectError::io_error(path, e))
    }
}

/// One serialized resource
///
/// Fields beyond the shared ones are kept as raw YAML until the schema of
/// the record's kind decides how to read them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceRecord {
    /// Kind tag
    pub a: String,
    /// Unique identifier
    pub identifier: ResourceId,
    /// Display title
    #[serde(default, deserialize_with = "nullable_string")]
    pub title: String,
    /// Short description
    #[serde(default, deserialize_with = "nullable_string")]
    pub synopsis: String,
    /// Kind-specific fields
    #[serde(flatten)]
    pub fields: BTreeMap<String, Value>,
}

impl ResourceRecord {
    /// Encode a resource through its kind's schema
    #[must_use]
    pub fn encode(resource: &Resource) -> Self {
        let fields = resource
            .fields()
            .into_iter()
            .filter_map(|(spec, value)| encode_value(value).map(|v| (spec.name.to_string(), v)))
            .collect();
        Self {
            a: resource.kind().tag().to_string(),
            identifier: resource.identifier().clone(),
            title: resource.title().to_string(),
            synopsis: resource.synopsis().to_string(),
            fields,
        }
    }
}

fn nullable_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(Option::unwrap_or_default)
}

fn encode_value(value: FieldValue) -> Option<Value> {
    match value {
        FieldValue::Text(text) => Some(Value::String(text)),
        FieldValue::Integer(n) => Some(Value::Number(n.into())),
        FieldValue::Reference(target) => target.map(|id| Value::String(id.as_str().to_string())),
        FieldValue::Collection(ids) => Some(Value::Sequence(
            ids.into_iter()
                .map(|id| Value::String(id.as_str().to_string()))
                .collect(),
        )),
    }
}

/// Decode a text or integer field
///
/// Returns `None` for values that cannot be read as the declared shape.
#[must_use]
pub fn decode_scalar(spec: &FieldSpec, raw: &Value) -> Option<FieldValue> {
    match (spec.kind, raw) {
        (FieldKind::Text, Value::String(text)) => Some(FieldValue::Text(text.clone())),
        (FieldKind::Text, Value::Null) => Some(FieldValue::Text(String::new())),
        (FieldKind::Text, Value::Number(n)) => Some(FieldValue::Text(n.to_string())),
        (FieldKind::Text, Value::Bool(b)) => Some(FieldValue::Text(b.to_string())),
        (FieldKind::Integer, Value::Number(n)) => n.as_i64().map(FieldValue::Integer),
        (FieldKind::Integer, Value::String(text)) => text.trim().parse().ok().map(FieldValue::Integer),
        (FieldKind::Integer, Value::Null) => Some(FieldValue::Integer(0)),
        _ => None,
    }
}

/// Identifiers stored in a reference or collection field
///
/// A single identifier, a list of identifiers and null are all accepted;
/// non-string entries are skipped.
#[must_use]
pub fn reference_ids(raw: &Value) -> Vec<ResourceId> {
    match raw {
        Value::String(id) => vec![ResourceId::new(id.clone())],
        Value::Sequence(items) => items
            .iter()
            .filter_map(Value::as_str)
            .map(ResourceId::from)
            .collect(),
        _ => Vec::new(),
    }
}

/// Read a descriptor as an untyped YAML document
///
/// # Errors
/// I/O and YAML failures
pub fn read_document(path: &Path) -> ProjectResult<Value> {
    let text = std::fs::read_to_string(path).map_err(|e| ProjectError::io_error(path, e))?;
    serde_yaml::from_str(&text).map_err(|e| ProjectError::yaml_error(path, e))
}

/// Format version stored in a descriptor document
///
/// Falls back to the legacy `version` key. Documents written before
/// versioning carry neither and count as version 0.
///
/// # Errors
/// [`MigrationError::Malformed`] if the version is not a small non-negative integer
pub fn stored_version(document: &Mapping) -> Result<u32, MigrationError> {
    let Some((key, raw)) = [FORMAT_VERSION_KEY, LEGACY_VERSION_KEY]
        .into_iter()
        .find_map(|key| document.get(key).map(|raw| (key, raw)))
    else {
        return Ok(0);
    };
    raw.as_u64()
        .and_then(|v| u32::try_from(v).ok())
        .ok_or_else(|| MigrationError::Malformed(format!("invalid {key}: {raw:?}")))
}

/// Record `version` under the current key, dropping the legacy one
pub fn set_version(document: &mut Mapping, version: u32) {
    document.remove(LEGACY_VERSION_KEY);
    document.insert(
        Value::String(FORMAT_VERSION_KEY.into()),
        Value::Number(version.into()),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use scriptorium_model::ResourceKind;

    #[test]
    fn encode_uses_schema_order_and_omits_unset_references() {
        let mut link = Resource::new(ResourceKind::Link, "l1".into());
        link.set_title("Ann knows Bob");
        link.assign("source", FieldValue::Reference(Some("ann".into())))
            .unwrap();
        link.assign("predicate", FieldValue::Text("knows".into()))
            .unwrap();

        let record = ResourceRecord::encode(&link);
        assert_eq!(record.a, "Link");
        assert_eq!(record.fields.get("source"), Some(&Value::String("ann".into())));
        assert!(!record.fields.contains_key("target"));
        assert_eq!(record.fields.get("index"), Some(&Value::Number(0.into())));
    }

    #[test]
    fn records_accept_null_title() {
        let yaml = "a: Entity\nidentifier: e1\ntitle: null\ncategory: person\n";
        let record: ResourceRecord = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(record.title, "");
        assert_eq!(record.synopsis, "");
        assert_eq!(
            record.fields.get("category"),
            Some(&Value::String("person".into()))
        );
    }

    #[test]
    fn descriptor_encodes_shared_keys_first() {
        let mut descriptor = Descriptor::new("Novel");
        let scene = Resource::new(ResourceKind::Scene, "s1".into());
        descriptor.resources.push(ResourceRecord::encode(&scene));
        let text = serde_yaml::to_string(&descriptor).unwrap();

        assert!(text.starts_with("format_version: 1\ntitle: Novel\n"));
        let a = text.find("- a: Scene").unwrap();
        let entities = text.find("entities:").unwrap();
        assert!(a < entities);
    }

    #[test]
    fn scalars_decode_leniently() {
        let text = FieldSpec::new("category", FieldKind::Text);
        let int = FieldSpec::new("index", FieldKind::Integer);
        assert_eq!(
            decode_scalar(&int, &Value::String(" 3 ".into())),
            Some(FieldValue::Integer(3))
        );
        assert_eq!(
            decode_scalar(&text, &Value::Null),
            Some(FieldValue::Text(String::new()))
        );
        assert_eq!(decode_scalar(&int, &Value::Sequence(vec![])), None);
    }

    #[test]
    fn reference_ids_accept_scalar_and_list() {
        assert_eq!(reference_ids(&Value::String("a".into())), vec![ResourceId::from("a")]);
        let list = Value::Sequence(vec![Value::String("a".into()), Value::Null, Value::String("b".into())]);
        assert_eq!(reference_ids(&list), vec![ResourceId::from("a"), ResourceId::from("b")]);
        assert!(reference_ids(&Value::Null).is_empty());
    }

    #[test]
    fn missing_version_is_zero() {
        let document: Mapping = serde_yaml::from_str("title: Old\n").unwrap();
        assert_eq!(stored_version(&document), Ok(0));
        let document: Mapping = serde_yaml::from_str("format_version: 1\n").unwrap();
        assert_eq!(stored_version(&document), Ok(1));
        let document: Mapping = serde_yaml::from_str("format_version: -2\n").unwrap();
        assert!(stored_version(&document).is_err());
    }

    #[test]
    fn legacy_version_key_is_read() {
        let mut document: Mapping = serde_yaml::from_str("version: 1\nresources: []\n").unwrap();
        assert_eq!(stored_version(&document), Ok(1));
        let both: Mapping = serde_yaml::from_str("version: 1\nformat_version: 0\n").unwrap();
        assert_eq!(stored_version(&both), Ok(0));

        set_version(&mut document, 1);
        assert!(document.get(LEGACY_VERSION_KEY).is_none());
        let descriptor: Descriptor = serde_yaml::from_value(Value::Mapping(document)).unwrap();
        assert_eq!(descriptor.format_version, 1);
    }
}
