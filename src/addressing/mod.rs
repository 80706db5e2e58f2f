//! Identity context and storage addressing.
//!
//! The host knows which logical cell (schema, table, primary key, field) a movie
//! belongs to; the codec only needs that identity turned into a storage address.
//! [`AddressResolver`] is that narrow capability. [`SchemaAddressing`] is the
//! default resolver and builds schema-addressed paths with [`build_path`].

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::error::PhotonError;

pub mod path;

pub use path::build_path;

/// The file extension of stored artifacts.
pub const ARTIFACT_EXTENSION: &str = ".zarr";

//==================================================================================
// I. Identity Context
//==================================================================================

/// A single primary-key value.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Hash)]
#[serde(untagged)]
pub enum KeyValue {
    Bool(bool),
    Int(i64),
    UInt(u64),
    Text(String),
}

impl fmt::Display for KeyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(v) => write!(f, "{}", v),
            Self::Int(v) => write!(f, "{}", v),
            Self::UInt(v) => write!(f, "{}", v),
            Self::Text(v) => f.write_str(v),
        }
    }
}

impl From<i64> for KeyValue {
    fn from(v: i64) -> Self {
        KeyValue::Int(v)
    }
}

impl From<i32> for KeyValue {
    fn from(v: i32) -> Self {
        KeyValue::Int(v as i64)
    }
}

impl From<u64> for KeyValue {
    fn from(v: u64) -> Self {
        KeyValue::UInt(v)
    }
}

impl From<&str> for KeyValue {
    fn from(v: &str) -> Self {
        KeyValue::Text(v.to_string())
    }
}

impl From<String> for KeyValue {
    fn from(v: String) -> Self {
        KeyValue::Text(v)
    }
}

impl From<bool> for KeyValue {
    fn from(v: bool) -> Self {
        KeyValue::Bool(v)
    }
}

/// Primary-key column -> value. Ordered by column name so that the rendered
/// path does not depend on the order the host listed the columns in.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(transparent)]
pub struct PrimaryKey(BTreeMap<String, KeyValue>);

impl PrimaryKey {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, column: impl Into<String>, value: impl Into<KeyValue>) -> Self {
        self.0.insert(column.into(), value.into());
        self
    }

    pub fn insert(&mut self, column: impl Into<String>, value: impl Into<KeyValue>) {
        self.0.insert(column.into(), value.into());
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &KeyValue)> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(String, KeyValue)> for PrimaryKey {
    fn from_iter<I: IntoIterator<Item = (String, KeyValue)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Everything the host supplies about the cell being encoded or decoded.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct IdentityContext {
    pub schema: String,
    pub table: String,
    pub field: String,
    pub primary_key: PrimaryKey,
    /// Logical store name. `None` selects the default store.
    #[serde(default)]
    pub store: Option<String>,
}

impl IdentityContext {
    pub fn new(
        schema: impl Into<String>,
        table: impl Into<String>,
        field: impl Into<String>,
        primary_key: PrimaryKey,
    ) -> Self {
        Self {
            schema: schema.into(),
            table: table.into(),
            field: field.into(),
            primary_key,
            store: None,
        }
    }

    pub fn with_store(mut self, store: impl Into<String>) -> Self {
        self.store = Some(store.into());
        self
    }
}

//==================================================================================
// II. Storage Address & Resolver
//==================================================================================

/// Where an artifact lives: a path within a logical store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageAddress {
    pub path: String,
    pub store: Option<String>,
    /// Opaque, stable handle for the address.
    pub token: String,
}

/// The host capability the codec depends on: turning a stable identity into a
/// storage address.
pub trait AddressResolver: Send + Sync + fmt::Debug {
    fn resolve(&self, context: &IdentityContext, extension: &str) -> Result<StorageAddress, PhotonError>;
}

/// Resolves identities to `{schema}/{table}/{pk}/{field}{ext}` paths.
#[derive(Debug, Default, Clone, Copy)]
pub struct SchemaAddressing;

impl AddressResolver for SchemaAddressing {
    fn resolve(&self, context: &IdentityContext, extension: &str) -> Result<StorageAddress, PhotonError> {
        let (path, token) = build_path(
            &context.schema,
            &context.table,
            &context.field,
            &context.primary_key,
            extension,
            context.store.as_deref(),
        )?;
        Ok(StorageAddress {
            path,
            store: context.store.clone(),
            token,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context() -> IdentityContext {
        IdentityContext::new(
            "calcium_imaging",
            "Recording",
            "movie",
            PrimaryKey::new().with("recording_id", 1),
        )
    }

    #[test]
    fn test_same_identity_same_address() {
        let a = SchemaAddressing.resolve(&context(), ARTIFACT_EXTENSION).unwrap();
        let b = SchemaAddressing.resolve(&context(), ARTIFACT_EXTENSION).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_each_identity_component_changes_the_path() {
        let base = SchemaAddressing.resolve(&context(), ARTIFACT_EXTENSION).unwrap().path;

        let mut variants = Vec::new();
        let mut c = context();
        c.schema = "other_schema".into();
        variants.push(c);
        let mut c = context();
        c.table = "Other".into();
        variants.push(c);
        let mut c = context();
        c.field = "mask".into();
        variants.push(c);
        let mut c = context();
        c.primary_key = PrimaryKey::new().with("recording_id", 2);
        variants.push(c);

        for variant in variants {
            let path = SchemaAddressing.resolve(&variant, ARTIFACT_EXTENSION).unwrap().path;
            assert_ne!(path, base, "{:?} collided", variant);
        }
    }

    #[test]
    fn test_store_is_carried_into_address() {
        let address = SchemaAddressing
            .resolve(&context().with_store("archive"), ARTIFACT_EXTENSION)
            .unwrap();
        assert_eq!(address.store.as_deref(), Some("archive"));
    }

    #[test]
    fn test_context_deserializes_from_host_json() {
        let ctx: IdentityContext = serde_json::from_str(
            r#"{"schema":"s","table":"t","field":"f","primary_key":{"id":3,"name":"x"}}"#,
        )
        .unwrap();
        assert_eq!(ctx.primary_key.len(), 2);
        assert_eq!(ctx.store, None);
        let path = SchemaAddressing.resolve(&ctx, ARTIFACT_EXTENSION).unwrap().path;
        assert_eq!(path, "s/t/id=3,name=x/f.zarr");
    }
}
