//! Dimension name ↔ id registry.

use hashbrown::HashMap;
use serde::{Deserialize, Serialize};

use crate::model::{DimensionId, DimensionSet};

/// Assigns each first-seen dimension name the next id (0, 1, 2, …).
///
/// Ids are stable within a run only. Once encoding is done the registry is
/// owned by the run context and never mutated again.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DimensionRegistry {
    names: Vec<String>,
    ids: HashMap<String, DimensionId>,
}

impl DimensionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Id of `name`, registering it if unseen.
    pub fn register(&mut self, name: &str) -> DimensionId {
        if let Some(&id) = self.ids.get(name) {
            return id;
        }
        let id = self.names.len() as DimensionId;
        self.names.push(name.to_string());
        self.ids.insert(name.to_string(), id);
        id
    }

    pub fn id(&self, name: &str) -> Option<DimensionId> {
        self.ids.get(name).copied()
    }

    pub fn name(&self, id: DimensionId) -> Option<&str> {
        self.names.get(id as usize).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Names in id order.
    pub fn iter(&self) -> impl Iterator<Item = (DimensionId, &str)> {
        self.names.iter().enumerate().map(|(i, n)| (i as DimensionId, n.as_str()))
    }

    /// Names of the dimensions in `set`, in id order. Unregistered ids are skipped.
    pub fn names_of(&self, set: &DimensionSet) -> Vec<String> {
        set.iter().filter_map(|id| self.name(id)).map(str::to_string).collect()
    }

    /// Bit set of `names`; `None` if any name is unregistered.
    pub fn set_of<'a>(&self, names: impl IntoIterator<Item = &'a str>) -> Option<DimensionSet> {
        names.into_iter().map(|n| self.id(n)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_seen_ids() {
        let mut reg = DimensionRegistry::new();
        assert_eq!(reg.register("work"), 0);
        assert_eq!(reg.register("family"), 1);
        assert_eq!(reg.register("work"), 0);
        assert_eq!(reg.len(), 2);
        assert_eq!(reg.name(1), Some("family"));
        assert_eq!(reg.id("school"), None);
    }

    #[test]
    fn test_names_of_set() {
        let mut reg = DimensionRegistry::new();
        for n in ["a", "b", "c"] {
            reg.register(n);
        }
        let set = reg.set_of(["c", "a"]).unwrap();
        assert_eq!(reg.names_of(&set), vec!["a", "c"]);
        assert!(reg.set_of(["a", "zz"]).is_none());
    }
}
