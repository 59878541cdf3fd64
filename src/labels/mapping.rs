//! Old → new class index table.

use std::collections::BTreeMap;

/// Class order the original labels were drawn with (old `classes.txt`).
pub const OLD_CLASSES: [&str; 7] = ["Player", "Plane", "Roadblock", "Coin", "Cone", "Ball", "Hole"];

/// Class order of the current dataset YAML.
pub const NEW_CLASSES: [&str; 7] = ["Player", "Cone", "Coin", "Hole", "Plane", "Roadblock", "Ball"];

/// Where an old class index goes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ClassTarget {
    /// A known class with a well-defined new index
    Mapped(u32),
    /// An index with no class behind it that is still folded into `to`.
    /// Every use is reported so the labels can be reviewed.
    Ambiguous { to: u32, note: &'static str },
}

impl ClassTarget {
    pub fn new_index(&self) -> u32 {
        match *self {
            ClassTarget::Mapped(to) | ClassTarget::Ambiguous { to, .. } => to,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RemapTable {
    entries: BTreeMap<u32, ClassTarget>,
}

impl RemapTable {
    /// The NeckDeep table: old → new by class name, plus stray index 7.
    ///
    /// Index 7 appears in some label files although the old order only has
    /// seven classes (0-6). Those boxes are assumed to be holes.
    pub fn neckdeep() -> Self {
        let mut entries: BTreeMap<u32, ClassTarget> = OLD_CLASSES
            .iter()
            .enumerate()
            .filter_map(|(old_idx, name)| {
                NEW_CLASSES
                    .iter()
                    .position(|n| n == name)
                    .map(|new_idx| (old_idx as u32, ClassTarget::Mapped(new_idx as u32)))
            })
            .collect();
        entries.insert(
            7,
            ClassTarget::Ambiguous {
                to: 3,
                note: "class 7 does not exist in the old order, assumed Hole",
            },
        );
        Self { entries }
    }

    pub fn get(&self, old_index: u32) -> Option<ClassTarget> {
        self.entries.get(&old_index).copied()
    }

    /// Old indices that share a new index with another old index.
    pub fn collisions(&self) -> Vec<(u32, Vec<u32>)> {
        let mut by_target: BTreeMap<u32, Vec<u32>> = BTreeMap::new();
        for (&old, target) in &self.entries {
            by_target.entry(target.new_index()).or_default().push(old);
        }
        by_target.into_iter().filter(|(_, olds)| olds.len() > 1).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (u32, ClassTarget)> + '_ {
        self.entries.iter().map(|(&k, &v)| (k, v))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_neckdeep_table() {
        let table = RemapTable::neckdeep();
        let expected = [(0, 0), (1, 4), (2, 5), (3, 2), (4, 1), (5, 6), (6, 3)];
        for (old, new) in expected {
            assert_eq!(table.get(old), Some(ClassTarget::Mapped(new)), "old {}", old);
        }
        assert!(matches!(table.get(7), Some(ClassTarget::Ambiguous { to: 3, .. })));
        assert_eq!(table.get(8), None);
    }

    #[test]
    fn test_names_follow_their_index() {
        let table = RemapTable::neckdeep();
        for (old, target) in table.iter() {
            if let ClassTarget::Mapped(new) = target {
                assert_eq!(OLD_CLASSES[old as usize], NEW_CLASSES[new as usize]);
            }
        }
    }

    #[test]
    fn test_only_collision_is_the_ambiguous_entry() {
        let table = RemapTable::neckdeep();
        assert_eq!(table.collisions(), vec![(3, vec![6, 7])]);
    }
}
