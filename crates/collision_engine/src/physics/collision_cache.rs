//! Per-tick collision pair cache
//!
//! Holds the classified result of every candidate pair found by the last
//! incremental update, keyed by the unordered pair, and the collided pair
//! sets of the last two updates for entered/exited reporting.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::entity::EntityId;
use crate::geometry::CollisionResponse;

/// Unordered pair of entities
///
/// Always stores the smaller identifier first, so `(a, b)` and `(b, a)`
/// compare and hash equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CollisionPair {
    first: EntityId,
    second: EntityId,
}

impl CollisionPair {
    /// Create a pair in canonical order
    pub fn new(a: impl Into<EntityId>, b: impl Into<EntityId>) -> Self {
        let (a, b) = (a.into(), b.into());
        if a <= b {
            Self { first: a, second: b }
        } else {
            Self { first: b, second: a }
        }
    }

    /// Smaller identifier
    pub fn first(&self) -> &EntityId {
        &self.first
    }

    /// Larger identifier
    pub fn second(&self) -> &EntityId {
        &self.second
    }

    /// Whether the pair involves an entity
    pub fn contains(&self, id: &str) -> bool {
        self.first.as_str() == id || self.second.as_str() == id
    }

    /// The partner of `id` in this pair
    pub fn other(&self, id: &str) -> Option<&EntityId> {
        if self.first.as_str() == id {
            Some(&self.second)
        } else if self.second.as_str() == id {
            Some(&self.first)
        } else {
            None
        }
    }
}

/// Both orientations of one classified pair
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CachedPair {
    /// `first` classified against `second`
    pub forward: CollisionResponse,
    /// `second` classified against `first`
    pub reverse: CollisionResponse,
}

/// Pairs that started or stopped colliding between two updates
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CollisionEvents {
    /// Pairs colliding now that were not colliding before, sorted
    pub entered: Vec<CollisionPair>,
    /// Pairs colliding before that are not colliding now, sorted
    pub exited: Vec<CollisionPair>,
}

impl CollisionEvents {
    /// Whether nothing changed
    pub fn is_empty(&self) -> bool {
        self.entered.is_empty() && self.exited.is_empty()
    }
}

/// Cache of classified pairs
#[derive(Debug, Default)]
pub struct CollisionCache {
    pairs: HashMap<CollisionPair, CachedPair>,
    current: HashSet<CollisionPair>,
    previous: HashSet<CollisionPair>,
}

impl CollisionCache {
    /// Create an empty cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new tick: forget classifications, keep last tick's collided set
    pub fn begin_tick(&mut self) {
        std::mem::swap(&mut self.current, &mut self.previous);
        self.current.clear();
        self.pairs.clear();
    }

    /// Store both orientations of a pair
    ///
    /// `a_vs_b` classifies `a` against `b`; `b_vs_a` the reverse.
    pub fn record(
        &mut self,
        a: &EntityId,
        b: &EntityId,
        a_vs_b: CollisionResponse,
        b_vs_a: CollisionResponse,
    ) {
        let pair = CollisionPair::new(a, b);
        let cached = if pair.first() == a {
            CachedPair { forward: a_vs_b, reverse: b_vs_a }
        } else {
            CachedPair { forward: b_vs_a, reverse: a_vs_b }
        };

        if cached.forward.collided || cached.reverse.collided {
            self.current.insert(pair.clone());
        }
        self.pairs.insert(pair, cached);
    }

    /// Cached classification of `a` against `b`
    ///
    /// Pairs not seen by the last update report no collision.
    pub fn lookup(&self, a: &str, b: &str) -> CollisionResponse {
        let pair = CollisionPair::new(a, b);
        match self.pairs.get(&pair) {
            Some(cached) if pair.first().as_str() == a => cached.forward,
            Some(cached) => cached.reverse,
            None => CollisionResponse::NONE,
        }
    }

    /// Drop every trace of an entity
    ///
    /// A purged entity never shows up in later entered/exited events.
    pub fn purge(&mut self, id: &str) {
        self.pairs.retain(|pair, _| !pair.contains(id));
        self.current.retain(|pair| !pair.contains(id));
        self.previous.retain(|pair| !pair.contains(id));
    }

    /// Transitions between the last two ticks
    pub fn events(&self) -> CollisionEvents {
        let mut entered: Vec<CollisionPair> =
            self.current.difference(&self.previous).cloned().collect();
        let mut exited: Vec<CollisionPair> =
            self.previous.difference(&self.current).cloned().collect();
        entered.sort();
        exited.sort();
        CollisionEvents { entered, exited }
    }

    /// Pairs collided in the last tick, sorted
    pub fn colliding_pairs(&self) -> Vec<CollisionPair> {
        let mut pairs: Vec<CollisionPair> = self.current.iter().cloned().collect();
        pairs.sort();
        pairs
    }

    /// Number of cached pairs
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    /// Whether no pairs are cached
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Forget everything
    pub fn clear(&mut self) {
        self.pairs.clear();
        self.current.clear();
        self.previous.clear();
    }
}
