//! Specialized collection types
//!
//! The spatial index stores nodes and items in slot maps so that handles
//! stay valid while the tree is subdivided, rebuilt or collapsed.

pub use slotmap::SlotMap;

slotmap::new_key_type! {
    /// Handle to a partition node inside the spatial index arena
    pub struct NodeKey;

    /// Handle to a spatial item inside the spatial index arena
    pub struct ItemKey;
}

/// Arena of partition nodes
pub type NodeArena<T> = SlotMap<NodeKey, T>;

/// Arena of spatial items
pub type ItemArena<T> = SlotMap<ItemKey, T>;
