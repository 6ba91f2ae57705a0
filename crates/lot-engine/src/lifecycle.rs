use lot_model::{Entity, Field};
use lot_store::StateStore;
use lot_types::EntityKind;

use crate::error::{EngineError, EngineResult};

/// Create, read and patch operations over ledger-stored entities.
///
/// Every operation finishes all local validation and fetch steps before its
/// single write, so a failure never leaves a partial write behind.
pub struct EntityLifecycle;

impl EntityLifecycle {
    /// Create a new entity from positional arguments.
    ///
    /// Fails with [`EngineError::Validation`] on a bad argument list (no
    /// ledger access) and [`EngineError::Conflict`] if the key is taken.
    pub fn create<S: StateStore + ?Sized>(
        store: &S,
        kind: EntityKind,
        args: &[String],
    ) -> EngineResult<Entity> {
        let entity = Entity::from_args(kind, args)?;
        let id = entity.id();
        tracing::debug!(%kind, id, "creating entity");

        if store.get_state(id)?.is_some() {
            tracing::debug!(%kind, id, "entity already exists");
            return Err(EngineError::Conflict {
                kind,
                id: id.to_string(),
            });
        }

        let bytes = entity.to_vec()?;
        store.put_state(id, bytes)?;
        tracing::info!(%kind, id, "entity created");
        Ok(entity)
    }

    /// Return the stored document for `id` exactly as written.
    pub fn read<S: StateStore + ?Sized>(
        store: &S,
        kind: EntityKind,
        id: &str,
    ) -> EngineResult<Vec<u8>> {
        require_key(kind, id)?;
        store.get_state(id)?.ok_or_else(|| EngineError::NotFound {
            kind,
            id: id.to_string(),
        })
    }

    /// Overwrite one attribute of an existing entity and rewrite the document.
    ///
    /// This is a fetch followed by a write. Atomicity against concurrent
    /// invocations comes from the enclosing ledger transaction.
    pub fn patch<S: StateStore + ?Sized>(
        store: &S,
        kind: EntityKind,
        id: &str,
        field: Field,
        value: &str,
    ) -> EngineResult<Entity> {
        require_key(kind, id)?;
        if field.kind() != kind {
            return Err(EngineError::Validation(format!(
                "field {field} does not belong to {kind} documents"
            )));
        }
        tracing::debug!(%kind, id, %field, value, "patching entity");

        let current = store.get_state(id)?.ok_or_else(|| EngineError::NotFound {
            kind,
            id: id.to_string(),
        })?;

        let mut entity = Entity::decode_as(kind, &current)?;
        entity.set(field, value)?;
        let bytes = entity.to_vec()?;
        store.put_state(id, bytes)?;

        tracing::info!(%kind, id, %field, "entity patched");
        Ok(entity)
    }
}

fn require_key(kind: EntityKind, id: &str) -> EngineResult<()> {
    if id.is_empty() {
        return Err(EngineError::Validation(format!(
            "{} must not be empty",
            kind.id_field()
        )));
    }
    Ok(())
}
