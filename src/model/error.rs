use crate::model::types::Archetype;

/// Conditions the core can raise. Everything here has a defined local
/// recovery; nothing propagates as an unhandled fault.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ModelError {
    /// The prior table has no entry for the requested archetype. Callers
    /// substitute a default archetype instead of letting this escape.
    #[error("no community prior registered for archetype {0:?}")]
    UnknownArchetype(Archetype),
}
