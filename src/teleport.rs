//! Teleport zones and first-match lookup.

use std::collections::HashSet;

use tracing::{debug, warn};

use crate::error::ZoneConfigError;
use crate::loader::descriptor::{coordinate_zone, rect_zone, CollisionDescriptor, ZoneList};
use crate::spatial::TileCoord;

/// Region of tile space that triggers a teleport.
#[derive(Debug, Clone, PartialEq)]
pub enum ZoneShape {
    /// Covers `x..x + width` by `y..y + height`.
    Rectangle {
        x: i32,
        y: i32,
        width: i32,
        height: i32,
    },
    CoordinateSet(HashSet<TileCoord>),
}

impl ZoneShape {
    pub fn contains(&self, c: TileCoord) -> bool {
        match self {
            ZoneShape::Rectangle {
                x,
                y,
                width,
                height,
            } => c.x >= *x && c.x < x + width && c.y >= *y && c.y < y + height,
            ZoneShape::CoordinateSet(tiles) => tiles.contains(&c),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TeleportZone {
    pub shape: ZoneShape,
    /// Map identifier handed to the map loader.
    pub target_map: String,
    /// Not checked against the target map's collision set.
    pub target_spawn: TileCoord,
}

/// Zones of one map in declaration order.
#[derive(Debug, Default)]
pub struct TeleportRegistry {
    zones: Vec<TeleportZone>,
    rejected: Vec<ZoneConfigError>,
}

impl TeleportRegistry {
    pub fn new(zones: Vec<TeleportZone>) -> Self {
        Self {
            zones,
            rejected: Vec::new(),
        }
    }

    /// Builds the registry from the rectangle `teleporters` entries.
    pub fn from_descriptor(descriptor: &CollisionDescriptor) -> Self {
        let mut registry = Self::default();
        registry.extend_with(&descriptor.teleporters, rect_zone);
        registry
    }

    /// Builds the registry from the coordinate-set form.
    pub fn from_zone_list(list: &ZoneList) -> Self {
        let mut registry = Self::default();
        registry.extend_with(&list.zones, coordinate_zone);
        registry
    }

    /// Appends the zones of `other` after this registry's own.
    pub fn merge(&mut self, other: TeleportRegistry) {
        self.zones.extend(other.zones);
        self.rejected.extend(other.rejected);
    }

    fn extend_with(
        &mut self,
        entries: &[serde_json::Value],
        convert: fn(usize, &serde_json::Value) -> Result<TeleportZone, ZoneConfigError>,
    ) {
        for (index, raw) in entries.iter().enumerate() {
            match convert(index, raw) {
                Ok(zone) => {
                    debug!(
                        target_map = %zone.target_map,
                        spawn = %zone.target_spawn,
                        "teleporter added: {:?}",
                        zone.shape
                    );
                    self.zones.push(zone);
                }
                Err(err) => {
                    warn!("skipping teleporter: {err} ({raw})");
                    self.rejected.push(err);
                }
            }
        }
    }

    /// First declared zone containing `coord`.
    pub fn find_zone_at(&self, coord: TileCoord) -> Option<&TeleportZone> {
        self.zones.iter().find(|z| z.shape.contains(coord))
    }

    pub fn zones(&self) -> &[TeleportZone] {
        &self.zones
    }

    /// Entries skipped while building, in the order they were met.
    pub fn rejected(&self) -> &[ZoneConfigError] {
        &self.rejected
    }

    pub fn len(&self) -> usize {
        self.zones.len()
    }

    pub fn is_empty(&self) -> bool {
        self.zones.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn rect(x: i32, y: i32, width: i32, height: i32, target: &str) -> TeleportZone {
        TeleportZone {
            shape: ZoneShape::Rectangle {
                x,
                y,
                width,
                height,
            },
            target_map: target.to_owned(),
            target_spawn: TileCoord::new(0, 0),
        }
    }

    #[test]
    fn first_declared_zone_wins_on_overlap() {
        let registry = TeleportRegistry::new(vec![
            rect(0, 0, 4, 4, "first"),
            rect(2, 2, 1, 1, "second"),
        ]);
        let hit = registry.find_zone_at(TileCoord::new(2, 2)).expect("zone");
        assert_eq!(hit.target_map, "first");
    }

    #[test]
    fn rectangle_covers_exactly_its_tiles() {
        let shape = ZoneShape::Rectangle {
            x: 5,
            y: 5,
            width: 2,
            height: 1,
        };
        assert!(shape.contains(TileCoord::new(5, 5)));
        assert!(shape.contains(TileCoord::new(6, 5)));
        assert!(!shape.contains(TileCoord::new(7, 5)));
        assert!(!shape.contains(TileCoord::new(5, 6)));
        assert!(!shape.contains(TileCoord::new(4, 5)));
    }

    #[test]
    fn coordinate_set_uses_exact_membership() {
        let shape = ZoneShape::CoordinateSet(
            [TileCoord::new(1, 1), TileCoord::new(3, 1)].into_iter().collect(),
        );
        assert!(shape.contains(TileCoord::new(3, 1)));
        assert!(!shape.contains(TileCoord::new(2, 1)));
    }

    #[test]
    fn malformed_entries_are_skipped_not_fatal() {
        let descriptor = CollisionDescriptor {
            layers: vec![],
            teleporters_layer: "teleporters".to_owned(),
            teleporters: vec![
                json!({"zone": {"x": 1, "y": 1}, "target_map": "a.json", "target_spawn": {"x": 2, "y": 3}}),
                json!({"target_map": "broken.json"}),
                json!({"zone": {"x": 8, "y": 8, "width": 2}, "target_map": "c.json", "target_spawn": {"x": 0}}),
            ],
        };
        let registry = TeleportRegistry::from_descriptor(&descriptor);

        assert_eq!(registry.len(), 2);
        assert_eq!(registry.rejected().len(), 1);
        assert!(matches!(
            registry.rejected()[0],
            ZoneConfigError::MalformedEntry { index: 1, .. }
        ));
        assert_eq!(
            registry.find_zone_at(TileCoord::new(9, 8)).map(|z| z.target_map.as_str()),
            Some("c.json")
        );
    }

    #[test]
    fn merged_zone_list_resolves_through_the_same_lookup() {
        let mut registry = TeleportRegistry::new(vec![rect(0, 0, 1, 1, "rect.json")]);
        let list = ZoneList {
            zones: vec![json!({
                "coordinates": [[0, 0], [4, 4]],
                "target_map": "set.json",
                "spawn_position": [1, 1]
            })],
        };
        registry.merge(TeleportRegistry::from_zone_list(&list));

        assert_eq!(registry.len(), 2);
        assert_eq!(
            registry.find_zone_at(TileCoord::new(0, 0)).map(|z| z.target_map.as_str()),
            Some("rect.json")
        );
        let hit = registry.find_zone_at(TileCoord::new(4, 4)).expect("zone");
        assert_eq!(hit.target_map, "set.json");
        assert_eq!(hit.target_spawn, TileCoord::new(1, 1));
        assert!(registry.find_zone_at(TileCoord::new(2, 2)).is_none());
    }
}
