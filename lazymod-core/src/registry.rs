//! Module records keyed by id, kept in registration order.

use std::rc::Rc;

use indexmap::IndexMap;

/// Type-erased factory. Receives exactly one value per declared dependency.
pub(crate) type FactoryFn<V> = dyn Fn(Vec<V>) -> anyhow::Result<V>;

pub(crate) struct ModuleRecord<V> {
    dependencies: Rc<[String]>,
    factory: Rc<FactoryFn<V>>,
    memo: Option<V>,
    /// Distinguishes this record from earlier or later definitions of the same id.
    generation: u64,
}

impl<V> ModuleRecord<V> {
    pub(crate) fn dependencies(&self) -> &Rc<[String]> {
        &self.dependencies
    }

    pub(crate) fn factory(&self) -> &Rc<FactoryFn<V>> {
        &self.factory
    }

    pub(crate) fn memo(&self) -> Option<&V> {
        self.memo.as_ref()
    }

    pub(crate) fn generation(&self) -> u64 {
        self.generation
    }
}

pub(crate) struct Registry<V> {
    records: IndexMap<String, ModuleRecord<V>>,
    next_generation: u64,
}

impl<V> Registry<V> {
    pub(crate) fn new() -> Self {
        Self {
            records: IndexMap::new(),
            next_generation: 0,
        }
    }

    /// Installs a fresh record with an empty memo slot.
    ///
    /// Returns the record it replaced, if any. A replaced id keeps its
    /// original registration position.
    pub(crate) fn insert(
        &mut self,
        id: &str,
        dependencies: Vec<String>,
        factory: Rc<FactoryFn<V>>,
    ) -> Option<ModuleRecord<V>> {
        let generation = self.next_generation;
        self.next_generation += 1;
        self.records.insert(
            id.to_string(),
            ModuleRecord {
                dependencies: dependencies.into(),
                factory,
                memo: None,
                generation,
            },
        )
    }

    pub(crate) fn get(&self, id: &str) -> Option<&ModuleRecord<V>> {
        self.records.get(id)
    }

    pub(crate) fn is_defined(&self, id: &str) -> bool {
        self.records.contains_key(id)
    }

    /// Stores `value` as the memo of record `generation` of `id` and returns
    /// the value consumers should see.
    ///
    /// A memo that is already populated is never overwritten; its value is
    /// returned instead. If the record was replaced or removed meanwhile the
    /// value is handed back without being stored.
    pub(crate) fn memoize(&mut self, id: &str, generation: u64, value: V) -> V
    where
        V: Clone,
    {
        match self.records.get_mut(id) {
            Some(record) if record.generation == generation => match &record.memo {
                Some(existing) => existing.clone(),
                None => {
                    record.memo = Some(value.clone());
                    value
                }
            },
            _ => value,
        }
    }

    pub(crate) fn ids(&self) -> Vec<String> {
        self.records.keys().cloned().collect()
    }

    /// Ids whose factory has not produced a value yet.
    pub(crate) fn unused(&self) -> Vec<String> {
        self.records
            .iter()
            .filter(|(_, record)| record.memo.is_none())
            .map(|(id, _)| id.clone())
            .collect()
    }

    pub(crate) fn len(&self) -> usize {
        self.records.len()
    }

    /// Removes every record, handing them back so the caller controls when they drop.
    pub(crate) fn clear(&mut self) -> IndexMap<String, ModuleRecord<V>> {
        std::mem::take(&mut self.records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn constant(value: u32) -> Rc<FactoryFn<u32>> {
        Rc::new(move |_| Ok(value))
    }

    #[test]
    fn insert_reports_replacement() {
        let mut registry = Registry::new();

        assert!(registry.insert("a", vec![], constant(1)).is_none());
        assert!(registry.is_defined("a"));
        assert!(registry.insert("a", vec![], constant(2)).is_some());
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn redefinition_keeps_position_and_resets_memo() {
        let mut registry = Registry::new();
        registry.insert("a", vec![], constant(1));
        registry.insert("b", vec!["a".to_string()], constant(2));

        let generation = registry.get("a").unwrap().generation();
        assert_eq!(registry.memoize("a", generation, 1), 1);
        assert_eq!(registry.unused(), vec!["b"]);

        registry.insert("a", vec![], constant(3));
        assert_eq!(registry.ids(), vec!["a", "b"]);
        assert_eq!(registry.unused(), vec!["a", "b"]);
        assert!(registry.get("a").unwrap().memo().is_none());
    }

    #[test]
    fn memo_is_written_once() {
        let mut registry = Registry::new();
        registry.insert("a", vec![], constant(1));
        let generation = registry.get("a").unwrap().generation();

        assert_eq!(registry.memoize("a", generation, 10), 10);
        assert_eq!(registry.memoize("a", generation, 20), 10);
        assert_eq!(registry.get("a").unwrap().memo(), Some(&10));
    }

    #[test]
    fn stale_generation_is_not_stored() {
        let mut registry = Registry::new();
        registry.insert("a", vec![], constant(1));
        let stale = registry.get("a").unwrap().generation();
        registry.insert("a", vec![], constant(2));

        assert_eq!(registry.memoize("a", stale, 1), 1);
        assert!(registry.get("a").unwrap().memo().is_none());
        assert_eq!(registry.memoize("gone", stale, 5), 5);
    }

    #[test]
    fn clear_empties_but_keeps_generations_moving() {
        let mut registry = Registry::new();
        registry.insert("a", vec![], constant(1));
        let before = registry.get("a").unwrap().generation();

        let removed = registry.clear();
        assert_eq!(removed.len(), 1);
        assert_eq!(registry.len(), 0);

        registry.insert("a", vec![], constant(1));
        assert!(registry.get("a").unwrap().generation() > before);
    }
}
