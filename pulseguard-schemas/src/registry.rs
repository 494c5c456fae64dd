//! Schema Registry
//!
//! Exported measurements outlive the app version that wrote them. The
//! registry keeps every known schema version under a qualified name
//! (`measurement_result_v1`) so an importer can find the reader schema for
//! a container's writer schema and learn when a version was superseded.

use apache_avro::Schema;
use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::SchemaError;

/// Registry entry details
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaMetadata {
    /// Base name without version (e.g., "measurement_result")
    pub name: String,

    /// Version number, the `N` in `_vN`
    pub version: u32,

    /// `<name>_v<version>`
    pub qualified_name: String,

    /// Avro namespace of the record, empty if none
    pub namespace: String,

    /// Superseded versions stay readable but are skipped by `reader_for`
    pub deprecated: bool,

    /// Qualified name to use instead, if deprecated
    pub replacement: Option<String>,
}

impl SchemaMetadata {
    /// Metadata for `schema` registered as `<name>_v<version>`
    pub fn new(name: &str, version: u32, schema: &Schema) -> Self {
        Self {
            name: name.to_string(),
            version,
            qualified_name: format!("{}_v{}", name, version),
            namespace: schema
                .name()
                .and_then(|n| n.namespace.clone())
                .unwrap_or_default(),
            deprecated: false,
            replacement: None,
        }
    }
}

#[derive(Default)]
struct Entries {
    by_qualified: HashMap<String, (Schema, SchemaMetadata)>,
    /// base name -> versions, ascending
    versions: HashMap<String, Vec<u32>>,
}

/// Thread-safe, versioned schema store
#[derive(Default)]
pub struct SchemaRegistry {
    entries: RwLock<Entries>,
}

/// Split "measurement_result_v2" into ("measurement_result", 2)
fn split_qualified(qualified: &str) -> Result<(&str, u32), SchemaError> {
    qualified
        .rsplit_once("_v")
        .and_then(|(base, n)| Some((base, n.parse().ok()?)))
        .filter(|(base, _)| !base.is_empty())
        .ok_or_else(|| {
            SchemaError::ValidationError(format!("'{}' is not of the form <name>_v<N>", qualified))
        })
}

impl SchemaRegistry {
    /// Empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry preloaded with every built-in schema
    pub fn with_defaults() -> Result<Self, SchemaError> {
        let registry = Self::new();
        registry.load_defaults()?;
        Ok(registry)
    }

    /// Register every built-in PulseGuard schema
    pub fn load_defaults(&self) -> Result<(), SchemaError> {
        self.register("measurement_result_v1", crate::schemas::measurement_result_v1()?)
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Entries>, SchemaError> {
        self.entries
            .read()
            .map_err(|_| SchemaError::ValidationError("Registry lock poisoned".to_string()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Entries>, SchemaError> {
        self.entries
            .write()
            .map_err(|_| SchemaError::ValidationError("Registry lock poisoned".to_string()))
    }

    /// Register `schema` under a "<name>_vN" qualified name
    pub fn register(&self, qualified_name: &str, schema: Schema) -> Result<(), SchemaError> {
        let (name, version) = split_qualified(qualified_name)?;
        let metadata = SchemaMetadata::new(name, version, &schema);
        self.register_with_metadata(schema, metadata)
    }

    /// Register with explicit metadata
    ///
    /// Only record schemas are accepted, and a qualified name can be
    /// registered once.
    pub fn register_with_metadata(
        &self,
        schema: Schema,
        metadata: SchemaMetadata,
    ) -> Result<(), SchemaError> {
        if !matches!(schema, Schema::Record(_)) {
            return Err(SchemaError::ValidationError(format!(
                "Schema {} is not a record",
                metadata.qualified_name
            )));
        }

        let mut entries = self.write()?;
        if entries.by_qualified.contains_key(&metadata.qualified_name) {
            return Err(SchemaError::ValidationError(format!(
                "Schema {} already registered",
                metadata.qualified_name
            )));
        }

        let versions = entries.versions.entry(metadata.name.clone()).or_default();
        let at = versions.partition_point(|v| *v < metadata.version);
        versions.insert(at, metadata.version);

        log::debug!("Registered schema {}", metadata.qualified_name);
        entries
            .by_qualified
            .insert(metadata.qualified_name.clone(), (schema, metadata));
        Ok(())
    }

    /// Schema by qualified name
    pub fn get(&self, qualified_name: &str) -> Result<Schema, SchemaError> {
        self.read()?
            .by_qualified
            .get(qualified_name)
            .map(|(schema, _)| schema.clone())
            .ok_or_else(|| SchemaError::NotFound(qualified_name.to_string()))
    }

    /// Metadata by qualified name
    pub fn metadata(&self, qualified_name: &str) -> Result<SchemaMetadata, SchemaError> {
        self.read()?
            .by_qualified
            .get(qualified_name)
            .map(|(_, metadata)| metadata.clone())
            .ok_or_else(|| SchemaError::NotFound(qualified_name.to_string()))
    }

    /// Registered versions of `name`, ascending
    pub fn versions(&self, name: &str) -> Result<Vec<u32>, SchemaError> {
        Ok(self.read()?.versions.get(name).cloned().unwrap_or_default())
    }

    /// Highest registered version of `name`
    pub fn get_latest(&self, name: &str) -> Result<Schema, SchemaError> {
        let latest = self
            .versions(name)?
            .last()
            .copied()
            .ok_or_else(|| SchemaError::NotFound(format!("No versions of {}", name)))?;
        self.get(&format!("{}_v{}", name, latest))
    }

    /// Newest non-deprecated schema for the same Avro record as `writer`
    ///
    /// Used to pick a reader schema for a container whose header carries an
    /// older writer schema.
    pub fn reader_for(&self, writer: &Schema) -> Result<Schema, SchemaError> {
        let wanted = writer
            .name()
            .ok_or_else(|| SchemaError::ValidationError("Writer schema is not named".to_string()))?;

        self.read()?
            .by_qualified
            .values()
            .filter(|(schema, meta)| !meta.deprecated && schema.name() == Some(wanted))
            .max_by_key(|(_, meta)| meta.version)
            .map(|(schema, _)| schema.clone())
            .ok_or_else(|| SchemaError::NotFound(wanted.fullname(None)))
    }

    /// True if both qualified names describe the same Avro record
    ///
    /// Field-level resolution is left to the Avro reader.
    pub fn is_compatible(&self, writer: &str, reader: &str) -> Result<bool, SchemaError> {
        Ok(self.get(writer)?.name() == self.get(reader)?.name())
    }

    /// Mark a version as superseded
    pub fn deprecate(&self, qualified_name: &str, replacement: Option<String>) -> Result<(), SchemaError> {
        let mut entries = self.write()?;
        let (_, metadata) = entries
            .by_qualified
            .get_mut(qualified_name)
            .ok_or_else(|| SchemaError::NotFound(qualified_name.to_string()))?;

        metadata.deprecated = true;
        metadata.replacement = replacement;
        log::info!("Schema {} deprecated", qualified_name);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schemas;

    fn measurement() -> Schema {
        schemas::measurement_result_v1().unwrap()
    }

    #[test]
    fn defaults_are_loaded() {
        let registry = SchemaRegistry::with_defaults().unwrap();
        let meta = registry.metadata("measurement_result_v1").unwrap();
        assert_eq!(meta.name, "measurement_result");
        assert_eq!(meta.version, 1);
        assert_eq!(meta.namespace, schemas::MEASUREMENT_NAMESPACE);
        assert_eq!(registry.get_latest("measurement_result").unwrap(), measurement());
    }

    #[test]
    fn qualified_names_need_a_version() {
        let registry = SchemaRegistry::new();
        for bad in ["measurement", "measurement_vX", "_v1"] {
            assert!(registry.register(bad, measurement()).is_err(), "{bad}");
        }
    }

    #[test]
    fn duplicate_registration_rejected() {
        let registry = SchemaRegistry::with_defaults().unwrap();
        assert!(matches!(
            registry.register("measurement_result_v1", measurement()),
            Err(SchemaError::ValidationError(_))
        ));
    }

    #[test]
    fn non_record_schema_rejected() {
        let registry = SchemaRegistry::new();
        let schema = Schema::parse_str(r#""string""#).unwrap();
        assert!(registry.register("plain_v1", schema).is_err());
    }

    #[test]
    fn versions_sort_numerically() {
        let registry = SchemaRegistry::new();
        registry.register("m_v10", measurement()).unwrap();
        registry.register("m_v9", measurement()).unwrap();
        registry.register("m_v2", measurement()).unwrap();
        assert_eq!(registry.versions("m").unwrap(), vec![2, 9, 10]);
        assert!(registry.versions("other").unwrap().is_empty());
        assert!(matches!(registry.get_latest("other"), Err(SchemaError::NotFound(_))));
    }

    #[test]
    fn reader_skips_deprecated_versions() {
        let registry = SchemaRegistry::with_defaults().unwrap();
        registry.register("measurement_result_v2", measurement()).unwrap();
        registry
            .deprecate("measurement_result_v2", Some("measurement_result_v1".to_string()))
            .unwrap();

        let meta = registry.metadata("measurement_result_v2").unwrap();
        assert!(meta.deprecated);
        assert_eq!(meta.replacement.as_deref(), Some("measurement_result_v1"));
        assert_eq!(registry.reader_for(&measurement()).unwrap(), measurement());
    }

    #[test]
    fn unknown_writer_has_no_reader() {
        let registry = SchemaRegistry::with_defaults().unwrap();
        let other = Schema::parse_str(
            r#"{"type": "record", "name": "Other", "fields": [{"name": "x", "type": "int"}]}"#,
        )
        .unwrap();
        assert!(matches!(registry.reader_for(&other), Err(SchemaError::NotFound(_))));
    }

    #[test]
    fn compatibility_by_record_name() {
        let registry = SchemaRegistry::with_defaults().unwrap();
        registry.register("measurement_result_v2", measurement()).unwrap();
        assert!(registry.is_compatible("measurement_result_v1", "measurement_result_v2").unwrap());
        assert!(registry.is_compatible("measurement_result_v1", "missing_v1").is_err());
    }
}
