//! Three-mode entity resolution.
//!
//! # Responsibility
//! - Apply the select / insert / insert-or-select policy to any entity kind.
//! - Delegate per-kind lookup and creation to an `EntityStore`.
//!
//! # Invariants
//! - `SelectOnly` never creates.
//! - `InsertOnly` never looks up.
//! - `InsertOrSelect` creates only after a lookup miss.

use crate::model::feature::{EntityKind, EntityRecord, RecordId};
use crate::model::upsert::UpsertMode;
use crate::repo::chado_repo::{EntityStore, RepoError};
use log::debug;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type ResolveResult<T> = Result<T, ResolveError>;

/// Resolution failure with the caller-supplied entity label.
#[derive(Debug)]
pub enum ResolveError {
    /// Select-only lookup found nothing.
    NotFound { label: String, kind: EntityKind },
    LookupFailed {
        label: String,
        kind: EntityKind,
        source: RepoError,
    },
    CreationFailed {
        label: String,
        kind: EntityKind,
        source: RepoError,
    },
}

impl ResolveError {
    pub fn label(&self) -> &str {
        match self {
            Self::NotFound { label, .. }
            | Self::LookupFailed { label, .. }
            | Self::CreationFailed { label, .. } => label.as_str(),
        }
    }

    pub fn kind(&self) -> EntityKind {
        match self {
            Self::NotFound { kind, .. }
            | Self::LookupFailed { kind, .. }
            | Self::CreationFailed { kind, .. } => *kind,
        }
    }
}

impl Display for ResolveError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound { label, kind } => write!(f, "{label} not found in {kind}"),
            Self::LookupFailed {
                label,
                kind,
                source,
            } => write!(f, "lookup of {label} in {kind} failed: {source}"),
            Self::CreationFailed {
                label,
                kind,
                source,
            } => write!(f, "creating {label} in {kind} failed: {source}"),
        }
    }
}

impl Error for ResolveError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::NotFound { .. } => None,
            Self::LookupFailed { source, .. } | Self::CreationFailed { source, .. } => {
                Some(source)
            }
        }
    }
}

/// Resolver facade over an entity store.
pub struct EntityResolver<S: EntityStore> {
    store: S,
}

impl<S: EntityStore> EntityResolver<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Underlying store, for callers that write other record families.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Returns the id of an existing or newly created record.
    ///
    /// `label` names the entity in errors and logs (e.g. `variant Variant1`).
    pub fn resolve(
        &self,
        label: &str,
        mode: UpsertMode,
        record: &EntityRecord,
    ) -> ResolveResult<RecordId> {
        let kind = record.kind();

        if mode != UpsertMode::InsertOnly {
            let found = self
                .store
                .find_entity(record)
                .map_err(|source| ResolveError::LookupFailed {
                    label: label.to_string(),
                    kind,
                    source,
                })?;
            if let Some(id) = found {
                debug!(
                    "event=entity_resolve module=resolver status=ok kind={kind} mode={mode} action=select id={id}"
                );
                return Ok(id);
            }
            if mode == UpsertMode::SelectOnly {
                return Err(ResolveError::NotFound {
                    label: label.to_string(),
                    kind,
                });
            }
        }

        let id = self
            .store
            .create_entity(record)
            .map_err(|source| ResolveError::CreationFailed {
                label: label.to_string(),
                kind,
                source,
            })?;
        debug!(
            "event=entity_resolve module=resolver status=ok kind={kind} mode={mode} action=insert id={id}"
        );
        Ok(id)
    }
}
