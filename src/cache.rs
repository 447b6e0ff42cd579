//! Converged positions remembered per chart instance, keyed by item id.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use eframe::egui::Vec2;

use crate::model::{Bubble, Category, Item, Viewport};

/// The radius-affecting inputs of one item.
#[derive(Clone, Debug, PartialEq, Eq)]
struct Fingerprint {
    weight_bits: u32,
    category: Category,
}

/// Identity of an item set plus everything that feeds its radii.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct LayoutSignature {
    entries: BTreeMap<String, Fingerprint>,
}

impl LayoutSignature {
    pub fn from_items(items: &[Item]) -> Self {
        let entries = items
            .iter()
            .map(|item| {
                (
                    item.id.clone(),
                    Fingerprint {
                        weight_bits: item.sanitized_weight().to_bits(),
                        category: item.category(),
                    },
                )
            })
            .collect();
        Self { entries }
    }

    pub fn ids(&self) -> BTreeSet<&str> {
        self.entries.keys().map(String::as_str).collect()
    }

    pub fn same_ids(&self, other: &Self) -> bool {
        self.entries.len() == other.entries.len()
            && self.entries.keys().zip(other.entries.keys()).all(|(a, b)| a == b)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// What the cache can offer a new run.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum CacheLookup {
    /// Same ids and same radius inputs: reuse the settled layout without simulating.
    Reuse { settled_viewport: Viewport },
    /// Same ids but some weight or category changed: cached positions are seeds only.
    Seed,
    /// The id set changed: ids present in both sets may be seeded, then the cache is cleared.
    Changed,
    Empty,
}

pub struct SettleCache {
    positions: HashMap<String, Vec2>,
    signature: Option<LayoutSignature>,
    viewport: Option<Viewport>,
    radius_scale: f32,
}

impl Default for SettleCache {
    fn default() -> Self {
        Self {
            positions: HashMap::new(),
            signature: None,
            viewport: None,
            radius_scale: 1.0,
        }
    }
}

impl SettleCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: &str) -> Option<Vec2> {
        self.positions.get(id).copied()
    }

    pub fn put(&mut self, id: &str, position: Vec2) {
        self.positions.insert(id.to_owned(), position);
    }

    pub fn clear(&mut self) {
        if !self.positions.is_empty() {
            tracing::debug!(entries = self.positions.len(), "settle cache cleared");
        }
        self.positions.clear();
        self.signature = None;
        self.viewport = None;
        self.radius_scale = 1.0;
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn settled_viewport(&self) -> Option<Viewport> {
        self.viewport
    }

    /// Shrink applied to the formula radii so the settled set fit its viewport.
    pub fn radius_scale(&self) -> f32 {
        self.radius_scale
    }

    pub fn lookup(&self, signature: &LayoutSignature) -> CacheLookup {
        let Some(cached) = &self.signature else {
            return if self.positions.is_empty() {
                CacheLookup::Empty
            } else {
                CacheLookup::Changed
            };
        };

        if !cached.same_ids(signature) {
            return CacheLookup::Changed;
        }

        let complete = signature.entries.keys().all(|id| self.positions.contains_key(id));
        match (cached == signature, complete, self.viewport) {
            (true, true, Some(settled_viewport)) => CacheLookup::Reuse { settled_viewport },
            _ => CacheLookup::Seed,
        }
    }

    /// Records a settled layout. Called only once a run has terminated.
    pub fn commit(
        &mut self,
        signature: LayoutSignature,
        viewport: Viewport,
        bubbles: &[Bubble],
        radius_scale: f32,
    ) {
        for bubble in bubbles {
            self.put(&bubble.id, bubble.pos);
        }
        self.positions.retain(|id, _| signature.entries.contains_key(id));
        self.signature = Some(signature);
        self.viewport = Some(viewport);
        self.radius_scale = radius_scale;
    }
}

#[cfg(test)]
mod tests {
    use eframe::egui::vec2;

    use super::*;

    fn items(entries: &[(&str, f32)]) -> Vec<Item> {
        entries
            .iter()
            .map(|(id, weight)| Item::new(*id, *id, *weight).with_category("emotion"))
            .collect()
    }

    fn settled(items: &[Item]) -> Vec<Bubble> {
        items
            .iter()
            .enumerate()
            .map(|(index, item)| {
                Bubble::from_item(item, 10.0, vec2(20.0 + index as f32 * 25.0, 40.0))
            })
            .collect()
    }

    #[test]
    fn empty_cache_reports_empty() {
        let cache = SettleCache::new();
        let signature = LayoutSignature::from_items(&items(&[("a", 1.0)]));
        assert_eq!(cache.lookup(&signature), CacheLookup::Empty);
        assert!(cache.get("a").is_none());
    }

    #[test]
    fn identical_set_is_reused() {
        let set = items(&[("a", 9.0), ("b", 3.0)]);
        let mut cache = SettleCache::new();
        let viewport = Viewport::new(110.0, 110.0);
        cache.commit(
            LayoutSignature::from_items(&set),
            viewport,
            &settled(&set),
            1.0,
        );

        assert_eq!(
            cache.lookup(&LayoutSignature::from_items(&set)),
            CacheLookup::Reuse {
                settled_viewport: viewport
            }
        );
        assert_eq!(cache.get("b"), Some(vec2(45.0, 40.0)));
    }

    #[test]
    fn weight_change_only_seeds() {
        let set = items(&[("a", 9.0), ("b", 3.0)]);
        let mut cache = SettleCache::new();
        cache.commit(
            LayoutSignature::from_items(&set),
            Viewport::new(110.0, 110.0),
            &settled(&set),
            1.0,
        );

        let heavier = items(&[("a", 9.0), ("b", 7.0)]);
        assert_eq!(cache.lookup(&LayoutSignature::from_items(&heavier)), CacheLookup::Seed);

        let recategorized = vec![set[0].clone(), set[1].clone().with_category("need")];
        assert_eq!(
            cache.lookup(&LayoutSignature::from_items(&recategorized)),
            CacheLookup::Seed
        );
    }

    #[test]
    fn id_set_change_is_detected() {
        let set = items(&[("a", 9.0), ("b", 3.0)]);
        let mut cache = SettleCache::new();
        cache.commit(
            LayoutSignature::from_items(&set),
            Viewport::new(110.0, 110.0),
            &settled(&set),
            1.0,
        );

        let grown = items(&[("a", 9.0), ("b", 3.0), ("c", 1.0)]);
        assert_eq!(cache.lookup(&LayoutSignature::from_items(&grown)), CacheLookup::Changed);
        let shrunk = items(&[("a", 9.0)]);
        assert_eq!(cache.lookup(&LayoutSignature::from_items(&shrunk)), CacheLookup::Changed);
    }

    #[test]
    fn commit_drops_positions_of_removed_ids() {
        let set = items(&[("a", 9.0), ("b", 3.0)]);
        let mut cache = SettleCache::new();
        let viewport = Viewport::new(110.0, 110.0);
        cache.commit(
            LayoutSignature::from_items(&set),
            viewport,
            &settled(&set),
            1.0,
        );

        let smaller = items(&[("a", 9.0)]);
        cache.commit(
            LayoutSignature::from_items(&smaller),
            viewport,
            &settled(&smaller),
            1.0,
        );
        assert_eq!(cache.len(), 1);
        assert!(cache.get("b").is_none());
    }

    #[test]
    fn commit_remembers_radius_scale() {
        let set = items(&[("a", 1.0), ("b", 2.0)]);
        let mut cache = SettleCache::new();
        assert_eq!(cache.radius_scale(), 1.0);

        cache.commit(
            LayoutSignature::from_items(&set),
            Viewport::new(100.0, 100.0),
            &settled(&set),
            0.9,
        );
        assert_eq!(cache.radius_scale(), 0.9);
        cache.clear();
        assert_eq!(cache.radius_scale(), 1.0);
    }

    #[test]
    fn clear_forgets_everything() {
        let set = items(&[("a", 1.0)]);
        let mut cache = SettleCache::new();
        cache.commit(
            LayoutSignature::from_items(&set),
            Viewport::new(50.0, 50.0),
            &settled(&set),
            1.0,
        );
        cache.clear();
        assert!(cache.is_empty());
        assert!(cache.settled_viewport().is_none());
        assert_eq!(cache.lookup(&LayoutSignature::from_items(&set)), CacheLookup::Empty);
    }
}
