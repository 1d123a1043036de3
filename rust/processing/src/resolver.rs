// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Element relationships rebuilt while the inspector walks the model.
//!
//! Two facts are collected:
//! - which wall a door is embedded in (from each wall's door list)
//! - which walls are measured by at least one dimension (from the base
//!   references of dimension sub-elements)
//!
//! Both grow monotonically within a pass. Dimensions are walked before walls,
//! so the wall flag is complete by the time walls are classified.

use bim_annotate_core::{ElementId, ElementRef, ElementType};
use rustc_hash::{FxHashMap, FxHashSet};

#[derive(Debug, Clone, Default)]
pub struct RelationshipResolver {
    door_walls: FxHashMap<ElementId, ElementId>,
    dimensioned_walls: FxHashSet<ElementId>,
}

impl RelationshipResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the doors embedded in a wall. A door already seen in another
    /// wall is moved to this one.
    pub fn record_wall_doors(&mut self, wall: ElementId, doors: &[ElementId]) {
        for &door in doors {
            if door.is_null() {
                continue;
            }
            if let Some(previous) = self.door_walls.insert(door, wall) {
                if previous != wall {
                    tracing::debug!(
                        door = %door,
                        previous = %previous,
                        wall = %wall,
                        "Door listed by more than one wall"
                    );
                }
            }
        }
    }

    /// Record the base element of a dimension sub-element.
    ///
    /// Returns true when the base is a wall.
    pub fn record_dimension_base(&mut self, base: Option<ElementRef>) -> bool {
        match base {
            Some(base) if base.ty == ElementType::Wall && !base.id.is_null() => {
                self.dimensioned_walls.insert(base.id);
                true
            }
            _ => false,
        }
    }

    /// Wall a door is embedded in.
    pub fn containing_wall(&self, door: ElementId) -> Option<ElementId> {
        self.door_walls.get(&door).copied()
    }

    pub fn has_dimension(&self, wall: ElementId) -> bool {
        self.dimensioned_walls.contains(&wall)
    }

    pub fn embedded_door_count(&self) -> usize {
        self.door_walls.len()
    }

    pub fn dimensioned_wall_count(&self) -> usize {
        self.dimensioned_walls.len()
    }

    /// All door-to-wall pairs, in no particular order.
    pub fn door_walls(&self) -> impl Iterator<Item = (ElementId, ElementId)> + '_ {
        self.door_walls.iter().map(|(&door, &wall)| (door, wall))
    }

    pub fn clear(&mut self) {
        self.door_walls.clear();
        self.dimensioned_walls.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn last_wall_wins() {
        let mut resolver = RelationshipResolver::new();
        let (w1, w2, door) = (ElementId::new_v4(), ElementId::new_v4(), ElementId::new_v4());
        resolver.record_wall_doors(w1, &[door]);
        resolver.record_wall_doors(w2, &[door]);
        assert_eq!(resolver.containing_wall(door), Some(w2));
        assert_eq!(resolver.embedded_door_count(), 1);
    }

    #[test]
    fn null_doors_are_ignored() {
        let mut resolver = RelationshipResolver::new();
        resolver.record_wall_doors(ElementId::new_v4(), &[ElementId::NULL]);
        assert_eq!(resolver.embedded_door_count(), 0);
    }

    #[test]
    fn only_wall_bases_flag_walls() {
        let mut resolver = RelationshipResolver::new();
        let wall = ElementId::new_v4();
        let slab = ElementId::new_v4();
        assert!(resolver.record_dimension_base(Some(ElementRef::new(wall, ElementType::Wall))));
        assert!(!resolver.record_dimension_base(Some(ElementRef::new(slab, ElementType::Slab))));
        assert!(!resolver.record_dimension_base(None));
        assert!(resolver.has_dimension(wall));
        assert!(!resolver.has_dimension(slab));

        resolver.clear();
        assert!(!resolver.has_dimension(wall));
    }
}
