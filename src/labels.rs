//! Class and group label utilities for combinato sorting output.

use ndarray::{Array1, Array2};
use std::collections::{HashMap, HashSet};

use crate::error::{Result, SortingError};
use crate::types::check_groups_shape;

/// Lookup from class label to group label.
///
/// Built from the `[num_classes, 2]` groups array of a sort file. Each class
/// must appear exactly once.
#[derive(Debug, Clone)]
pub struct GroupMap {
    map: HashMap<i64, i64>,
}

impl GroupMap {
    /// Builds the lookup, rejecting malformed arrays and repeated classes.
    pub fn from_groups(groups: &Array2<i64>) -> Result<Self> {
        check_groups_shape(groups)?;

        let mut map = HashMap::with_capacity(groups.nrows());
        for row in groups.rows() {
            if map.insert(row[0], row[1]).is_some() {
                return Err(SortingError::DuplicateClass { class: row[0] });
            }
        }

        Ok(GroupMap { map })
    }

    /// Returns the group assigned to `class`, if any.
    pub fn group_of(&self, class: i64) -> Option<i64> {
        self.map.get(&class).copied()
    }

    /// Number of classes in the mapping.
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Returns true if the mapping holds no classes.
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

/// Returns true if a group label denotes an accepted unit.
///
/// Group 0 is unassigned and negative groups were rejected.
pub fn is_valid_group(group: i64) -> bool {
    group > 0
}

/// Selects the classes whose group is a valid unit.
///
/// Returns `(valid_classes, valid_groups)`, paired by position and in the
/// row order of `groups`. Both are empty if no class maps to a positive group.
pub fn sorting_kept_labels(groups: &Array2<i64>) -> Result<(Array1<i64>, Array1<i64>)> {
    check_groups_shape(groups)?;

    let (classes, kept_groups): (Vec<i64>, Vec<i64>) = groups
        .rows()
        .into_iter()
        .filter(|row| is_valid_group(row[1]))
        .map(|row| (row[0], row[1]))
        .unzip();

    Ok((Array1::from(classes), Array1::from(kept_groups)))
}

/// Gets the group label of each event from its class.
///
/// Covers every event, whether its group is valid or not. Fails if a class
/// has no entry in `groups`.
pub fn group_labels(classes: &Array1<i64>, groups: &Array2<i64>) -> Result<Array1<i64>> {
    let group_map = GroupMap::from_groups(groups)?;

    classes
        .iter()
        .enumerate()
        .map(|(position, &class)| {
            group_map
                .group_of(class)
                .ok_or(SortingError::UnmappedClass { class, position })
        })
        .collect::<Result<Vec<_>>>()
        .map(Array1::from)
}

/// Marks the events whose class is one of `valid_classes`.
pub fn valid_class_mask(classes: &Array1<i64>, valid_classes: &Array1<i64>) -> Array1<bool> {
    let valid: HashSet<i64> = valid_classes.iter().copied().collect();
    classes.mapv(|class| valid.contains(&class))
}
