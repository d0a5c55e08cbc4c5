//! Collision and trigger event tracking
//!
//! Pair sets from consecutive ticks are diffed into enter/stay/exit
//! lists, with trigger pairs reported separately from blocking pairs.

use std::collections::HashSet;

use super::collision_world::ShapeHandle;

/// An unordered pair of shapes that are in contact
///
/// Always stores the smaller handle first so the same two shapes hash to
/// the same pair regardless of detection order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CollisionPair {
    /// First shape of the pair
    pub first: ShapeHandle,
    /// Second shape of the pair
    pub second: ShapeHandle,
    /// Whether either shape is a trigger volume
    pub trigger: bool,
}

impl CollisionPair {
    /// Create a new pair with canonical ordering
    pub fn new(a: ShapeHandle, b: ShapeHandle, trigger: bool) -> Self {
        if a < b {
            Self { first: a, second: b, trigger }
        } else {
            Self { first: b, second: a, trigger }
        }
    }
}

/// Kind of pair transition observed this tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PairEvent {
    /// Pair started overlapping this tick
    Enter,
    /// Pair was already overlapping last tick
    Stay,
    /// Pair stopped overlapping this tick
    Exit,
}

/// Per-tick collision/trigger event state
///
/// Updated once per `step`; consumers read the event lists after the
/// step and before the next one.
#[derive(Debug, Default)]
pub struct CollisionEvents {
    current: HashSet<CollisionPair>,
    previous: HashSet<CollisionPair>,
    entered: Vec<CollisionPair>,
    stayed: Vec<CollisionPair>,
    exited: Vec<CollisionPair>,
}

impl CollisionEvents {
    /// Create an empty event tracker
    pub fn new() -> Self {
        Self::default()
    }

    /// Install this tick's detected pairs and compute the transitions
    pub fn update(&mut self, pairs: impl IntoIterator<Item = CollisionPair>) {
        std::mem::swap(&mut self.current, &mut self.previous);
        self.current.clear();
        self.current.extend(pairs);

        self.entered.clear();
        self.stayed.clear();
        self.exited.clear();

        for pair in &self.current {
            if self.previous.contains(pair) {
                self.stayed.push(*pair);
            } else {
                self.entered.push(*pair);
            }
        }
        for pair in &self.previous {
            if !self.current.contains(pair) {
                self.exited.push(*pair);
            }
        }
    }

    /// Pairs that started overlapping this tick
    pub fn entered(&self) -> &[CollisionPair] {
        &self.entered
    }

    /// Pairs still overlapping from last tick
    pub fn stayed(&self) -> &[CollisionPair] {
        &self.stayed
    }

    /// Pairs that stopped overlapping this tick
    pub fn exited(&self) -> &[CollisionPair] {
        &self.exited
    }

    /// All currently overlapping pairs
    pub fn current(&self) -> impl Iterator<Item = &CollisionPair> {
        self.current.iter()
    }

    /// Forget all tracked pairs (e.g. on scene teardown)
    pub fn clear(&mut self) {
        self.current.clear();
        self.previous.clear();
        self.entered.clear();
        self.stayed.clear();
        self.exited.clear();
    }
}
