//! Runs a declaration file against a fresh registry.

use anyhow::{Context, Result};
use indexmap::IndexMap;
use rustc_hash::FxBuildHasher;
use serde_json::Value;
use shapeck_solver::{
    Atom, ShapeError, ShapeId, ShapeRegistry, ShapeResult, TypeFormatter, UnionKeyPolicy,
    ValueChecker, is_shape_subtype_of,
};
use tracing::{debug, info_span};

use crate::config::{DeclarationFile, Query};
use crate::lower::Lowering;

/// Successful result of one declaration or query.
#[derive(Debug, Clone, PartialEq)]
pub enum Answer {
    Declared,
    Keys(Vec<String>),
    FieldType(String),
    Value(Value),
    Matches(bool),
    Subtype(bool),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Outcome {
    /// Shape name for declarations, query label for queries.
    pub subject: String,
    pub result: ShapeResult<Answer>,
}

impl Outcome {
    pub fn is_error(&self) -> bool {
        self.result.is_err()
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunReport {
    pub declarations: Vec<Outcome>,
    pub queries: Vec<Outcome>,
}

impl RunReport {
    pub fn has_errors(&self) -> bool {
        self.declarations.iter().any(Outcome::is_error) || self.queries.iter().any(Outcome::is_error)
    }

    pub fn error_count(&self) -> usize {
        self.declarations
            .iter()
            .chain(&self.queries)
            .filter(|o| o.is_error())
            .count()
    }
}

/// Declare everything in `file`, then answer its queries followed by
/// `extra_keys` (one `keysOf` query per name).
pub fn run(file: &DeclarationFile, policy: UnionKeyPolicy, extra_keys: &[String]) -> Result<RunReport> {
    let registry = ShapeRegistry::new().with_policy(policy);
    let lowering = Lowering::new(&registry);
    let mut report = RunReport::default();

    for declaration in &file.declarations {
        let name = declaration.name();
        let _span = info_span!("declare", shape = name).entered();
        let result = lowering
            .declare(declaration)
            .with_context(|| format!("invalid declaration of `{name}`"))?;
        if let Err(err) = &result {
            debug!(code = err.code(), "declaration rejected");
        }
        report.declarations.push(Outcome {
            subject: name.to_string(),
            result: result.map(|_| Answer::Declared),
        });
    }

    let extra = extra_keys.iter().map(|name| Query::KeysOf(name.clone()));
    for query in file.queries.iter().cloned().chain(extra) {
        let label = query.label();
        let _span = info_span!("query", query = %label).entered();
        report.queries.push(Outcome {
            subject: label,
            result: answer(&registry, &query),
        });
    }

    Ok(report)
}

fn answer(registry: &ShapeRegistry, query: &Query) -> ShapeResult<Answer> {
    let formatter = TypeFormatter::new(registry);
    match query {
        Query::KeysOf(shape) => {
            let keys = registry.keys_of(lookup(registry, shape)?)?;
            Ok(Answer::Keys(
                keys.into_iter()
                    .map(|k| registry.resolve_atom(k).to_string())
                    .collect(),
            ))
        }
        Query::ValidateKey { shape, key } => {
            let ty = registry.validate_key(lookup(registry, shape)?, registry.intern(key))?;
            Ok(Answer::FieldType(formatter.format(&ty)))
        }
        Query::AccessValue { shape, key, value } => {
            let id = lookup(registry, shape)?;
            let fields: IndexMap<Atom, &Value, FxBuildHasher> = value
                .iter()
                .map(|(k, v)| (registry.intern(k), v))
                .collect();
            let found = registry.access_value(id, &fields, registry.intern(key))?;
            Ok(Answer::Value((*found).clone()))
        }
        Query::Matches { shape, value } => {
            let resolved = registry.resolve(lookup(registry, shape)?)?;
            Ok(Answer::Matches(
                ValueChecker::new(registry).matches_shape(&resolved, value),
            ))
        }
        Query::IsSubtype { source, target } => {
            let source = lookup(registry, source)?;
            let target = lookup(registry, target)?;
            // Surface resolution errors instead of reporting "not a subtype".
            registry.resolve(source)?;
            registry.resolve(target)?;
            Ok(Answer::Subtype(is_shape_subtype_of(registry, source, target)))
        }
    }
}

fn lookup(registry: &ShapeRegistry, name: &str) -> ShapeResult<ShapeId> {
    registry
        .lookup(registry.intern(name))
        .ok_or_else(|| ShapeError::UnknownShape {
            name: name.into(),
        })
}
