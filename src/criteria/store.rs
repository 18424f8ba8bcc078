//! Criteria-Tree Store
//!
//! Re-nests flat parent-linked criteria-tree records into owned trees
//! and serves root lookups. Step and POI loading validate their tree
//! references against this store.

use std::collections::{HashMap, HashSet};
use std::path::Path;
use tracing::{info, warn};

use super::tree::CriteriaTree;
use crate::data::records::{CriteriaTreeRecord, RawCriteriaTreeFile};

/// Store of criteria trees, keyed by root node id
pub struct CriteriaTreeStore {
    trees: HashMap<u32, CriteriaTree>,
}

impl CriteriaTreeStore {
    pub fn new() -> Self {
        Self {
            trees: HashMap::new(),
        }
    }

    /// Build a store directly from records (used by tests and tools)
    pub fn from_records(records: Vec<CriteriaTreeRecord>) -> Self {
        let mut store = Self::new();
        store.rebuild(records);
        store
    }

    /// Load all record files from `<data_dir>/criteria_trees` and
    /// rebuild the store wholesale
    pub fn load_from_directory(&mut self, data_dir: &Path) -> Result<(), String> {
        let trees_dir = data_dir.join("criteria_trees");

        if !trees_dir.exists() {
            warn!("Criteria tree directory does not exist: {:?}", trees_dir);
            return Ok(());
        }

        let entries = std::fs::read_dir(&trees_dir)
            .map_err(|e| format!("Failed to read criteria tree directory: {}", e))?;

        let mut records = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| format!("Failed to read entry: {}", e))?;
            let path = entry.path();

            if path.extension().map_or(false, |ext| ext == "toml") {
                let content = std::fs::read_to_string(&path)
                    .map_err(|e| format!("Failed to read {:?}: {}", path, e))?;

                let file: RawCriteriaTreeFile = toml::from_str(&content)
                    .map_err(|e| format!("Failed to parse {:?}: {}", path, e))?;

                records.extend(file.criteria_tree);
            }
        }

        self.rebuild(records);
        info!("Loaded {} criteria trees", self.trees.len());

        Ok(())
    }

    fn rebuild(&mut self, records: Vec<CriteriaTreeRecord>) {
        let mut by_id: HashMap<u32, CriteriaTreeRecord> = HashMap::new();
        for record in records {
            by_id.insert(record.id, record);
        }

        // Child links from the parent field, sorted for deterministic
        // walk order
        let mut children: HashMap<u32, Vec<u32>> = HashMap::new();
        for record in by_id.values() {
            if record.parent != 0 && by_id.contains_key(&record.parent) {
                children.entry(record.parent).or_default().push(record.id);
            }
        }
        for ids in children.values_mut() {
            ids.sort_unstable();
        }

        let mut roots: Vec<u32> = Vec::new();
        for record in by_id.values() {
            if record.parent == 0 {
                roots.push(record.id);
            } else if !by_id.contains_key(&record.parent) {
                warn!(
                    "Criteria tree node {} references unknown parent {}, treating as root",
                    record.id, record.parent
                );
                roots.push(record.id);
            }
        }
        roots.sort_unstable();

        let mut trees = HashMap::new();
        let mut placed = HashSet::new();
        for root in roots {
            if let Some(tree) = Self::assemble(root, &by_id, &children, &mut placed) {
                trees.insert(root, tree);
            }
        }

        if placed.len() != by_id.len() {
            warn!(
                "{} criteria tree nodes are unreachable from any root and were dropped",
                by_id.len() - placed.len()
            );
        }

        self.trees = trees;
    }

    fn assemble(
        id: u32,
        by_id: &HashMap<u32, CriteriaTreeRecord>,
        children: &HashMap<u32, Vec<u32>>,
        placed: &mut HashSet<u32>,
    ) -> Option<CriteriaTree> {
        if !placed.insert(id) {
            warn!("Criteria tree node {} reached twice, keeping first placement", id);
            return None;
        }

        let record = by_id.get(&id)?;
        let mut node = CriteriaTree {
            id: record.id,
            criteria_id: record.criteria_id,
            amount: record.amount,
            operator: record.operator,
            children: Vec::new(),
        };

        if let Some(child_ids) = children.get(&id) {
            for &child_id in child_ids {
                if let Some(child) = Self::assemble(child_id, by_id, children, placed) {
                    node.children.push(child);
                }
            }
        }

        Some(node)
    }

    /// Look up a tree by its root node id
    pub fn get(&self, criteria_tree_id: u32) -> Option<&CriteriaTree> {
        self.trees.get(&criteria_tree_id)
    }

    pub fn len(&self) -> usize {
        self.trees.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trees.is_empty()
    }
}

impl Default for CriteriaTreeStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: u32, parent: u32) -> CriteriaTreeRecord {
        CriteriaTreeRecord {
            id,
            parent,
            criteria_id: 0,
            amount: 0,
            operator: 0,
        }
    }

    #[test]
    fn renests_parent_linked_records() {
        let store = CriteriaTreeStore::from_records(vec![
            record(1, 0),
            record(2, 1),
            record(3, 1),
            record(4, 2),
        ]);

        let tree = store.get(1).unwrap();
        let mut visited = Vec::new();
        tree.walk(&mut |node| visited.push(node.id));
        assert_eq!(visited, vec![1, 2, 4, 3]);
        assert_eq!(tree.node_count(), 4);
    }

    #[test]
    fn non_root_ids_do_not_resolve() {
        let store = CriteriaTreeStore::from_records(vec![record(1, 0), record(2, 1)]);
        assert!(store.get(2).is_none());
    }

    #[test]
    fn orphan_parent_becomes_root() {
        let store = CriteriaTreeStore::from_records(vec![record(1, 0), record(5, 999)]);
        assert_eq!(store.len(), 2);
        assert_eq!(store.get(5).unwrap().node_count(), 1);
    }

    #[test]
    fn loads_from_directory() {
        use tempfile::TempDir;

        let temp_dir = TempDir::new().unwrap();
        let trees_dir = temp_dir.path().join("criteria_trees");
        std::fs::create_dir_all(&trees_dir).unwrap();

        std::fs::write(
            trees_dir.join("trees.toml"),
            r#"
[[criteria_tree]]
id = 10

[[criteria_tree]]
id = 11
parent = 10
criteria_id = 77
amount = 3
"#,
        )
        .unwrap();

        let mut store = CriteriaTreeStore::new();
        store.load_from_directory(temp_dir.path()).unwrap();

        let tree = store.get(10).unwrap();
        assert_eq!(tree.node_count(), 2);
        assert_eq!(tree.children[0].criteria_id, 77);
    }
}
