//! Alias identifiers and storage.
//!
//! A `DefId` names a registered (possibly generic) type alias. The store is
//! the only process-wide state in the engine; types themselves are immutable
//! interned values.
//!
//! Declaration merging is out of scope: re-registering a name simply
//! overwrites the previous definition (last registration wins).

use dashmap::DashMap;
use indexmap::IndexMap;
use std::sync::RwLock;
use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use tracing::trace;
use tya_common::interner::Atom;

use crate::types::{TypeId, TypeParamInfo};

/// Global counter for assigning unique instance IDs to `DefinitionStore`
/// instances, for tracing.
static NEXT_INSTANCE_ID: AtomicU64 = AtomicU64::new(1);

/// Store-owned alias identifier.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, serde::Serialize)]
pub struct DefId(pub u32);

impl DefId {
    /// Sentinel value for invalid `DefId`.
    pub const INVALID: Self = Self(0);

    /// First valid `DefId`.
    pub const FIRST_VALID: u32 = 1;

    /// Check if this `DefId` is valid.
    pub const fn is_valid(self) -> bool {
        self.0 >= Self::FIRST_VALID
    }
}

/// Complete information about a registered alias.
#[derive(Clone, Debug)]
pub struct DefinitionInfo {
    /// Name of the alias (for diagnostics and name lookup).
    pub name: Atom,

    /// Type parameters for generic aliases; empty for plain aliases.
    pub type_params: Vec<TypeParamInfo>,

    /// The alias body.
    pub body: TypeId,
}

impl DefinitionInfo {
    /// Create a plain (non-generic) alias definition.
    pub const fn alias(name: Atom, body: TypeId) -> Self {
        Self {
            name,
            type_params: Vec::new(),
            body,
        }
    }

    /// Create a generic alias definition.
    pub const fn generic_alias(name: Atom, type_params: Vec<TypeParamInfo>, body: TypeId) -> Self {
        Self {
            name,
            type_params,
            body,
        }
    }
}

/// Thread-safe storage for alias definitions.
///
/// Uses `DashMap` for the id-indexed table and an ordered name index so
/// iteration over registered names is deterministic.
pub struct DefinitionStore {
    /// Unique instance ID for tracing.
    instance_id: u64,

    /// `DefId` -> `DefinitionInfo` mapping.
    definitions: DashMap<DefId, DefinitionInfo>,

    /// Name -> current `DefId`. Re-registration replaces the entry, so the
    /// index always points at the latest definition of each name.
    by_name: RwLock<IndexMap<Atom, DefId>>,

    /// Next available `DefId`.
    next_id: AtomicU32,
}

impl Default for DefinitionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl DefinitionStore {
    /// Create a new definition store.
    pub fn new() -> Self {
        let instance_id = NEXT_INSTANCE_ID.fetch_add(1, Ordering::SeqCst);
        trace!(instance_id, "DefinitionStore::new");
        Self {
            instance_id,
            definitions: DashMap::new(),
            by_name: RwLock::new(IndexMap::new()),
            next_id: AtomicU32::new(DefId::FIRST_VALID),
        }
    }

    fn allocate(&self) -> DefId {
        DefId(self.next_id.fetch_add(1, Ordering::SeqCst))
    }

    /// Register a definition and return its `DefId`.
    ///
    /// If the name was registered before, the new definition shadows the old
    /// one in name lookups (last registration wins); the old `DefId` stays
    /// resolvable for types that already reference it.
    pub fn register(&self, info: DefinitionInfo) -> DefId {
        let id = self.allocate();
        trace!(
            instance_id = self.instance_id,
            def_id = id.0,
            name = info.name.0,
            params = info.type_params.len(),
            "DefinitionStore::register"
        );
        if let Ok(mut by_name) = self.by_name.write() {
            by_name.insert(info.name, id);
        }
        self.definitions.insert(id, info);
        id
    }

    /// Get definition info by `DefId`.
    pub fn get(&self, id: DefId) -> Option<DefinitionInfo> {
        self.definitions.get(&id).map(|r| r.clone())
    }

    /// Check if a `DefId` exists.
    pub fn contains(&self, id: DefId) -> bool {
        self.definitions.contains_key(&id)
    }

    /// Look up the current `DefId` for a name.
    pub fn resolve_name(&self, name: Atom) -> Option<DefId> {
        self.by_name.read().ok()?.get(&name).copied()
    }

    /// Get type parameters for a definition.
    pub fn get_type_params(&self, id: DefId) -> Option<Vec<TypeParamInfo>> {
        self.definitions.get(&id).map(|r| r.type_params.clone())
    }

    /// Get the body for a definition.
    pub fn get_body(&self, id: DefId) -> Option<TypeId> {
        self.definitions.get(&id).map(|r| r.body)
    }

    /// Get the name of a definition.
    pub fn get_name(&self, id: DefId) -> Option<Atom> {
        self.definitions.get(&id).map(|r| r.name)
    }

    /// Update the body for a definition. Self-referential aliases register
    /// with a placeholder body first, then patch in the body that mentions
    /// their own `DefId`.
    pub fn set_body(&self, id: DefId, body: TypeId) {
        if let Some(mut entry) = self.definitions.get_mut(&id) {
            entry.body = body;
        }
    }

    /// Number of definitions ever registered (shadowed ones included).
    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    /// Check if empty.
    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    /// Registered names, in first-registration order.
    pub fn names(&self) -> Vec<Atom> {
        self.by_name
            .read()
            .map(|by_name| by_name.keys().copied().collect())
            .unwrap_or_default()
    }

    /// Clear all definitions (for testing).
    pub fn clear(&self) {
        self.definitions.clear();
        if let Ok(mut by_name) = self.by_name.write() {
            by_name.clear();
        }
        self.next_id.store(DefId::FIRST_VALID, Ordering::SeqCst);
    }
}

#[cfg(test)]
#[path = "../tests/def_tests.rs"]
mod tests;
