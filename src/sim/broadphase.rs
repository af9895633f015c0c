//! Broad-phase candidate pair generation
//!
//! The manager asks a [`BroadPhase`] for pairs that *might* be in contact and
//! runs the exact narrow-phase test on each one. Implementations must:
//! - return every pair within reach at the positions given (no false negatives)
//! - return each pair once, as `(i, j)` with `i < j`
//! - sort pairs ascending
//!
//! Pairs are collected once per pass. A culling broad phase therefore misses
//! contacts that corrections create later in the same pass; the next pass picks
//! them up. Only [`AllPairs`] matches a full Gauss-Seidel sweep exactly.

use std::collections::HashMap;
use std::fmt;

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Broad-phase view of one circle
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Proxy {
    pub position: Vec2,
    /// Padded radius: two proxies can touch only if `distance < reach_a + reach_b`
    pub reach: f32,
}

/// Candidate-pair source for the collision passes
pub trait BroadPhase: fmt::Debug {
    /// Fill `pairs` (cleared by the caller) with candidate index pairs.
    /// The manager ignores any pair that is not `i < j < proxies.len()`.
    fn collect_pairs(&mut self, proxies: &[Proxy], pairs: &mut Vec<(usize, usize)>);
}

/// Every unordered pair, O(n²)
#[derive(Debug, Clone, Copy, Default)]
pub struct AllPairs;

impl BroadPhase for AllPairs {
    fn collect_pairs(&mut self, proxies: &[Proxy], pairs: &mut Vec<(usize, usize)>) {
        let len = proxies.len();
        for i in 0..len {
            for j in (i + 1)..len {
                pairs.push((i, j));
            }
        }
    }
}

/// Uniform grid hash
///
/// Each proxy is bucketed by its center. The effective cell size is never
/// smaller than the largest possible contact distance, so any touching pair
/// lands in the same or adjacent cells.
#[derive(Debug, Clone)]
pub struct SpatialHash {
    cell_size: f32,
    cells: HashMap<(i32, i32), Vec<usize>>,
}

impl Default for SpatialHash {
    fn default() -> Self {
        Self::new(64.0)
    }
}

impl SpatialHash {
    pub fn new(cell_size: f32) -> Self {
        Self {
            cell_size,
            cells: HashMap::new(),
        }
    }

    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    #[inline]
    fn cell_of(position: Vec2, size: f32) -> (i32, i32) {
        // `as` saturates; NaN lands in cell 0
        (
            (position.x / size).floor() as i32,
            (position.y / size).floor() as i32,
        )
    }
}

impl BroadPhase for SpatialHash {
    fn collect_pairs(&mut self, proxies: &[Proxy], pairs: &mut Vec<(usize, usize)>) {
        let max_reach = proxies
            .iter()
            .map(|p| p.reach)
            .filter(|r| r.is_finite())
            .fold(0.0f32, f32::max);
        let size = self.cell_size.max(max_reach * 2.0);
        if !(size > 0.0) {
            // Degenerate (zero radii, zero cell): nothing can be in reach
            return;
        }

        for bucket in self.cells.values_mut() {
            bucket.clear();
        }
        for (i, proxy) in proxies.iter().enumerate() {
            self.cells
                .entry(Self::cell_of(proxy.position, size))
                .or_default()
                .push(i);
        }

        for (i, proxy) in proxies.iter().enumerate() {
            let (cx, cy) = Self::cell_of(proxy.position, size);
            for dy in -1..=1 {
                for dx in -1..=1 {
                    let key = (cx.saturating_add(dx), cy.saturating_add(dy));
                    if let Some(bucket) = self.cells.get(&key) {
                        pairs.extend(bucket.iter().filter(|&&j| j > i).map(|&j| (i, j)));
                    }
                }
            }
        }

        // Saturated cells at the i32 edge can alias; dedup keeps pairs unique
        pairs.sort_unstable();
        pairs.dedup();
        self.cells.retain(|_, bucket| !bucket.is_empty());
    }
}

/// Serializable broad-phase selection
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BroadPhaseKind {
    #[default]
    AllPairs,
    SpatialHash { cell_size: f32 },
}

impl BroadPhaseKind {
    pub fn build(&self) -> Box<dyn BroadPhase> {
        match *self {
            BroadPhaseKind::AllPairs => Box::new(AllPairs),
            BroadPhaseKind::SpatialHash { cell_size } => Box::new(SpatialHash::new(cell_size)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn proxy(x: f32, y: f32, reach: f32) -> Proxy {
        Proxy {
            position: Vec2::new(x, y),
            reach,
        }
    }

    fn touching(proxies: &[Proxy], pairs: &[(usize, usize)]) -> Vec<(usize, usize)> {
        pairs
            .iter()
            .copied()
            .filter(|&(i, j)| {
                let reach = proxies[i].reach + proxies[j].reach;
                proxies[i].position.distance_squared(proxies[j].position) < reach * reach
            })
            .collect()
    }

    #[test]
    fn test_all_pairs_enumerates_upper_triangle() {
        let proxies = vec![proxy(0.0, 0.0, 1.0); 4];
        let mut pairs = Vec::new();
        AllPairs.collect_pairs(&proxies, &mut pairs);
        assert_eq!(pairs, vec![(0, 1), (0, 2), (0, 3), (1, 2), (1, 3), (2, 3)]);
    }

    #[test]
    fn test_spatial_hash_skips_distant_pairs() {
        let proxies = vec![
            proxy(0.0, 0.0, 5.0),
            proxy(8.0, 0.0, 5.0),
            proxy(500.0, 500.0, 5.0),
        ];
        let mut hash = SpatialHash::new(16.0);
        let mut pairs = Vec::new();
        hash.collect_pairs(&proxies, &mut pairs);
        assert_eq!(pairs, vec![(0, 1)]);
    }

    #[test]
    fn test_spatial_hash_grows_small_cells() {
        // Cell size far below the proxy reach still finds the contact
        let proxies = vec![proxy(0.0, 0.0, 40.0), proxy(70.0, 0.0, 40.0)];
        let mut hash = SpatialHash::new(1.0);
        let mut pairs = Vec::new();
        hash.collect_pairs(&proxies, &mut pairs);
        assert_eq!(pairs, vec![(0, 1)]);
    }

    #[test]
    fn test_spatial_hash_reuse_between_calls() {
        let mut hash = SpatialHash::new(10.0);
        let mut pairs = Vec::new();
        hash.collect_pairs(&[proxy(0.0, 0.0, 5.0), proxy(3.0, 0.0, 5.0)], &mut pairs);
        assert_eq!(pairs.len(), 1);

        pairs.clear();
        hash.collect_pairs(&[proxy(0.0, 0.0, 5.0), proxy(300.0, 0.0, 5.0)], &mut pairs);
        assert!(pairs.is_empty());
    }

    #[test]
    fn test_kind_from_json() {
        let kind: BroadPhaseKind =
            serde_json::from_str(r#"{"kind": "spatial_hash", "cell_size": 32.0}"#).unwrap();
        assert_eq!(kind, BroadPhaseKind::SpatialHash { cell_size: 32.0 });
        let kind: BroadPhaseKind = serde_json::from_str(r#"{"kind": "all_pairs"}"#).unwrap();
        assert_eq!(kind, BroadPhaseKind::AllPairs);
    }

    proptest! {
        #[test]
        fn prop_spatial_hash_finds_every_contact(
            points in proptest::collection::vec((-200.0f32..200.0, -200.0f32..200.0, 1.0f32..30.0), 0..40),
            cell_size in 1.0f32..100.0,
        ) {
            let proxies: Vec<Proxy> = points.iter().map(|&(x, y, r)| proxy(x, y, r)).collect();

            let mut all = Vec::new();
            AllPairs.collect_pairs(&proxies, &mut all);
            let mut hashed = Vec::new();
            SpatialHash::new(cell_size).collect_pairs(&proxies, &mut hashed);

            prop_assert!(hashed.windows(2).all(|w| w[0] < w[1]));
            prop_assert_eq!(touching(&proxies, &all), touching(&proxies, &hashed));
        }
    }
}
