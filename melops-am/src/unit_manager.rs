//! Unit registry: interns context-independent units.

use crate::unit::{Context, Unit};
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Base phone name of the silence filler.
pub const SILENCE_NAME: &str = "SIL";

/// Resolves and interns units.
///
/// Context-independent units are interned by name so every lookup of `AE`
/// yields the same instance. Context-dependent units are cheap value types
/// and are built fresh on each request.
#[derive(Debug)]
pub struct UnitManager {
    ci_units: RwLock<BTreeMap<String, Arc<Unit>>>,
    silence: Arc<Unit>,
}

impl Default for UnitManager {
    fn default() -> Self {
        Self::new()
    }
}

impl UnitManager {
    /// Create a registry holding only the silence filler.
    pub fn new() -> Self {
        let silence = Arc::new(Unit::new(SILENCE_NAME, true, Context::Empty));
        let ci_units = BTreeMap::from([(SILENCE_NAME.to_string(), silence.clone())]);

        Self {
            ci_units: RwLock::new(ci_units),
            silence,
        }
    }

    /// The designated silence filler unit.
    pub fn silence(&self) -> &Arc<Unit> {
        &self.silence
    }

    /// Resolve a unit, interning it when context-independent.
    ///
    /// An already interned context-independent unit is returned as is, with
    /// the filler flag it was first registered with.
    pub fn get_unit(&self, name: &str, filler: bool, context: Context) -> Arc<Unit> {
        if !context.is_empty() {
            return Arc::new(Unit::new(name, filler, context));
        }

        if let Some(unit) = self.ci_units.read().get(name) {
            return unit.clone();
        }

        self.ci_units
            .write()
            .entry(name.to_string())
            .or_insert_with(|| Arc::new(Unit::new(name, filler, Context::Empty)))
            .clone()
    }

    /// Look up an interned context-independent unit.
    pub fn context_independent(&self, name: &str) -> Option<Arc<Unit>> {
        self.ci_units.read().get(name).cloned()
    }

    /// All interned context-independent units, ordered by name.
    pub fn context_independent_units(&self) -> Vec<Arc<Unit>> {
        self.ci_units.read().values().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interns_context_independent_units() {
        let manager = UnitManager::new();

        let a = manager.get_unit("AE", false, Context::Empty);
        let b = manager.get_unit("AE", false, Context::Empty);

        assert!(Arc::ptr_eq(&a, &b));
        assert!(Arc::ptr_eq(
            &manager.context_independent("AE").unwrap(),
            &a
        ));
    }

    #[test]
    fn keeps_first_filler_flag() {
        let manager = UnitManager::new();

        let sil = manager.get_unit(SILENCE_NAME, false, Context::Empty);

        assert!(sil.is_filler());
        assert!(Arc::ptr_eq(&sil, manager.silence()));
    }

    #[test]
    fn builds_context_dependent_units_fresh() {
        let manager = UnitManager::new();
        let k = manager.get_unit("K", false, Context::Empty);
        let context = Context::left_right(Some(vec![k]), None);

        let a = manager.get_unit("AE", false, context.clone());
        let b = manager.get_unit("AE", false, context);

        assert!(!Arc::ptr_eq(&a, &b));
        assert_eq!(a, b);
        assert!(manager.context_independent("AE").is_none());
    }

    #[test]
    fn lists_units_by_name() {
        let manager = UnitManager::new();
        manager.get_unit("T", false, Context::Empty);
        manager.get_unit("AE", false, Context::Empty);

        let names: Vec<_> = manager
            .context_independent_units()
            .iter()
            .map(|u| u.name().to_string())
            .collect();

        assert_eq!(names, ["AE", SILENCE_NAME, "T"]);
    }
}
