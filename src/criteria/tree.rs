//! Criteria Trees
//!
//! Hierarchical completion conditions. The evaluation engine lives
//! elsewhere; this module only carries the tree shape, lookup happens in
//! the store and traversal here.

/// One node of a criteria tree, owning its children
#[derive(Debug, Clone)]
pub struct CriteriaTree {
    pub id: u32,
    pub criteria_id: u32,
    pub amount: i64,
    pub operator: u8,
    pub children: Vec<CriteriaTree>,
}

impl CriteriaTree {
    /// Visit every node reachable from this one, depth-first pre-order.
    /// The visitor is called exactly once per node; there is no
    /// cancellation.
    pub fn walk(&self, visitor: &mut impl FnMut(&CriteriaTree)) {
        visitor(self);
        for child in &self.children {
            child.walk(visitor);
        }
    }

    /// Number of nodes reachable from this node (including itself)
    pub fn node_count(&self) -> usize {
        let mut count = 0;
        self.walk(&mut |_| count += 1);
        count
    }
}
