//! Speed modifiers contributed by movement-affecting status effects.
//!
//! Each source (usually one effect instance) contributes one multiplier tagged
//! with an effect type. Multipliers of the same type are averaged first, then
//! the per-type averages are averaged, so stacking three slows of one type
//! weighs the same as a single slow of another type.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A single multiplier on base locomotion speed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpeedModifier {
    /// Effect type used for grouping (e.g. "slow", "haste").
    pub effect_type: String,
    /// Multiplier applied to desired speed.
    pub value: f32,
}

/// Registry of active speed modifiers keyed by source.
///
/// # Example
///
/// ```
/// use drift::SpeedModifiers;
///
/// let mut mods = SpeedModifiers::new();
/// assert!((mods.combined() - 1.0).abs() < f32::EPSILON);
///
/// mods.set("frost#1", "slow", 0.5);
/// mods.set("frost#2", "slow", 0.7);
/// mods.set("sprint", "haste", 1.4);
/// // slow averages to 0.6, haste is 1.4, combined is their mean
/// assert!((mods.combined() - 1.0).abs() < 1e-6);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SpeedModifiers {
    entries: BTreeMap<String, SpeedModifier>,
}

impl SpeedModifiers {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces the modifier contributed by `source`.
    pub fn set(&mut self, source: impl Into<String>, effect_type: impl Into<String>, value: f32) {
        self.entries.insert(
            source.into(),
            SpeedModifier {
                effect_type: effect_type.into(),
                value,
            },
        );
    }

    /// Removes the modifier contributed by `source`.
    ///
    /// Returns true if one was present.
    pub fn remove(&mut self, source: &str) -> bool {
        self.entries.remove(source).is_some()
    }

    /// Removes every modifier.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Number of active sources.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when no modifiers are active.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Combined multiplier: mean per effect type, then mean across types.
    ///
    /// Returns 1.0 when nothing is active.
    #[must_use]
    pub fn combined(&self) -> f32 {
        if self.entries.is_empty() {
            return 1.0;
        }

        let mut per_type: BTreeMap<&str, (f32, u32)> = BTreeMap::new();
        for modifier in self.entries.values() {
            let slot = per_type.entry(modifier.effect_type.as_str()).or_insert((0.0, 0));
            slot.0 += modifier.value;
            slot.1 += 1;
        }

        #[allow(clippy::cast_precision_loss)]
        let type_count = per_type.len() as f32;
        #[allow(clippy::cast_precision_loss)]
        let total: f32 = per_type
            .values()
            .map(|(sum, count)| sum / *count as f32)
            .sum();
        total / type_count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_is_identity() {
        assert!((SpeedModifiers::new().combined() - 1.0).abs() < f32::EPSILON);
    }

    #[test]
    fn same_source_replaces() {
        let mut mods = SpeedModifiers::new();
        mods.set("a", "slow", 0.2);
        mods.set("a", "slow", 0.8);
        assert_eq!(mods.len(), 1);
        assert!((mods.combined() - 0.8).abs() < 1e-6);
    }

    #[test]
    fn types_are_weighted_equally() {
        let mut mods = SpeedModifiers::new();
        mods.set("s1", "slow", 0.5);
        mods.set("s2", "slow", 0.5);
        mods.set("s3", "slow", 0.5);
        mods.set("h1", "haste", 1.5);
        assert!((mods.combined() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn remove_reports_presence() {
        let mut mods = SpeedModifiers::new();
        mods.set("a", "slow", 0.5);
        assert!(mods.remove("a"));
        assert!(!mods.remove("a"));
        assert!(mods.is_empty());
    }
}
