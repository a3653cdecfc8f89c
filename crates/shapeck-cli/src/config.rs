use anyhow::{Context, Result};
use clap::ValueEnum;
use indexmap::IndexMap;
use serde::Deserialize;
use serde_json::Value;
use shapeck_solver::UnionKeyPolicy;
use std::path::Path;

/// A declaration file: options, shape declarations and queries.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct DeclarationFile {
    #[serde(default)]
    pub options: FileOptions,
    #[serde(default)]
    pub declarations: Vec<Declaration>,
    #[serde(default)]
    pub queries: Vec<Query>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct FileOptions {
    #[serde(default)]
    pub union_keys: Option<UnionKeys>,
}

/// Union key policy as spelled on the command line and in files.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum UnionKeys {
    Common,
    Any,
}

impl From<UnionKeys> for UnionKeyPolicy {
    fn from(keys: UnionKeys) -> Self {
        match keys {
            UnionKeys::Common => UnionKeyPolicy::Common,
            UnionKeys::Any => UnionKeyPolicy::Any,
        }
    }
}

/// Ordered field table of a declaration.
pub type FieldExprs = IndexMap<String, TypeExpr>;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Declaration {
    /// `{ "interface": "Dog", "extends": ["Animal"], "fields": { ... } }`
    Interface {
        interface: String,
        #[serde(default)]
        extends: Vec<String>,
        #[serde(default)]
        fields: FieldExprs,
    },
    /// `{ "type": "Status", "body": ... }` or `{ "type": "Point", "fields": { ... } }`
    Alias {
        #[serde(rename = "type")]
        name: String,
        #[serde(default)]
        fields: Option<FieldExprs>,
        #[serde(default)]
        body: Option<TypeExpr>,
    },
}

impl Declaration {
    pub fn name(&self) -> &str {
        match self {
            Self::Interface { interface, .. } => interface,
            Self::Alias { name, .. } => name,
        }
    }
}

/// A type expression.
///
/// A bare string is a primitive keyword or the name of a declared shape.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum TypeExpr {
    Name(String),
    Literal { literal: Value },
    Union { union: Vec<TypeExpr> },
    Intersection { intersection: Vec<TypeExpr> },
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Query {
    KeysOf(String),
    ValidateKey {
        shape: String,
        key: String,
    },
    AccessValue {
        shape: String,
        key: String,
        value: serde_json::Map<String, Value>,
    },
    Matches {
        shape: String,
        value: Value,
    },
    IsSubtype {
        source: String,
        target: String,
    },
}

impl Query {
    /// Short label used when reporting the query.
    pub fn label(&self) -> String {
        match self {
            Self::KeysOf(shape) => format!("keysOf({shape})"),
            Self::ValidateKey { shape, key } => format!("validateKey({shape}, {key})"),
            Self::AccessValue { shape, key, .. } => format!("accessValue({shape}, {key})"),
            Self::Matches { shape, .. } => format!("matches({shape})"),
            Self::IsSubtype { source, target } => format!("isSubtype({source}, {target})"),
        }
    }
}

pub fn parse_declarations(source: &str) -> Result<DeclarationFile> {
    serde_json::from_str(source).context("invalid declaration file")
}

pub fn load_declarations(path: &Path) -> Result<DeclarationFile> {
    let source = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read declaration file: {}", path.display()))?;
    parse_declarations(&source)
        .with_context(|| format!("failed to parse declaration file: {}", path.display()))
}

/// Union key policy after applying the command-line override.
pub fn resolve_policy(file: &FileOptions, cli: Option<UnionKeys>) -> UnionKeyPolicy {
    cli.or(file.union_keys)
        .map(UnionKeyPolicy::from)
        .unwrap_or_default()
}
