// tests/map_load.rs

mod common;

use serde_json::json;
use tiled_explorer::loader::descriptor::{load_collision_descriptor, load_zone_list};
use tiled_explorer::render::tile_cache::TileImageSource;
use tiled_explorer::render::tileset::TilesetImages;
use tiled_explorer::{MapInstance, MapLoadError, TileCoord, TileGrid, TileId, ZoneConfigError};

#[test]
fn loads_map_collisions_and_both_zone_forms() {
    let dir = tempfile::tempdir().expect("temp dir");
    common::write_tileset_png(dir.path());
    let map_a = common::write_map(dir.path(), "a.json", 6, 6, &[(2, 3), (4, 0)]);

    let descriptor_path = common::write_json(
        dir.path(),
        "collidable_layers.json",
        json!({
            "layers": ["walls"],
            "teleporters": [
                {"zone": {"x": 5, "y": 5, "width": 1, "height": 1}, "target_map": "b.json", "target_spawn": {"x": 1, "y": 1}},
                {"target_map": "broken.json"}
            ]
        }),
    );
    let zones_path = common::write_json(
        dir.path(),
        "teleport-zones.json",
        json!({"zones": [{"coordinates": [[0, 5], [1, 5]], "target_map": "c.json", "spawn_position": [2, 2]}]}),
    );

    let descriptor = load_collision_descriptor(&descriptor_path).expect("descriptor");
    let zones = load_zone_list(&zones_path).expect("zones");
    let map = MapInstance::load(&map_a, &descriptor, Some(&zones)).expect("map");

    assert_eq!(map.id(), map_a);
    assert_eq!((map.grid().width(), map.grid().height()), (6, 6));

    // one row above each wall tile
    assert!(map.is_blocked(TileCoord::new(2, 2)));
    assert!(map.is_blocked(TileCoord::new(4, -1)));
    assert!(!map.is_blocked(TileCoord::new(2, 3)));
    assert_eq!(map.collision().len(), 2);

    assert_eq!(map.teleports().len(), 2);
    assert_eq!(map.teleports().rejected().len(), 1);
    let rect = map.teleports().find_zone_at(TileCoord::new(5, 5)).expect("rectangle zone");
    assert_eq!((rect.target_map.as_str(), rect.target_spawn), ("b.json", TileCoord::new(1, 1)));
    let set = map.teleports().find_zone_at(TileCoord::new(1, 5)).expect("coordinate zone");
    assert_eq!((set.target_map.as_str(), set.target_spawn), ("c.json", TileCoord::new(2, 2)));
    assert!(map.teleports().find_zone_at(TileCoord::new(2, 5)).is_none());
}

#[test]
fn tileset_atlas_is_cropped_per_gid() {
    let dir = tempfile::tempdir().expect("temp dir");
    common::write_tileset_png(dir.path());
    let map_path = common::write_map(dir.path(), "a.json", 2, 2, &[]);

    let grid = TileGrid::load(&map_path).expect("grid");
    let images = TilesetImages::load(grid.tilesets()).expect("tileset images");

    let wall = images.unscaled(TileId(2)).expect("wall tile");
    assert_eq!(wall.dimensions(), (16, 16));
    assert_eq!(wall.get_pixel(0, 0).0, [90, 90, 90, 255]);
    assert!(images.unscaled(TileId(3)).is_none());
}

#[test]
fn missing_map_reports_the_path() {
    let dir = tempfile::tempdir().expect("temp dir");
    let descriptor = common::write_json(dir.path(), "collidable_layers.json", json!({"layers": []}));
    let descriptor = load_collision_descriptor(&descriptor).expect("descriptor");

    let missing = dir.path().join("nowhere.json");
    let err = MapInstance::load(&missing.to_string_lossy(), &descriptor, None)
        .err()
        .expect("load should fail");
    assert!(matches!(
        err.downcast_ref::<MapLoadError>(),
        Some(MapLoadError::Io { path, .. }) if *path == missing
    ));
}

#[test]
fn missing_tileset_image_is_an_error() {
    let dir = tempfile::tempdir().expect("temp dir");
    let map_path = common::write_map(dir.path(), "a.json", 2, 2, &[]);
    let descriptor = common::write_json(dir.path(), "collidable_layers.json", json!({"layers": ["walls"]}));
    let descriptor = load_collision_descriptor(&descriptor).expect("descriptor");

    let err = MapInstance::load(&map_path, &descriptor, None).err().expect("load should fail");
    assert!(matches!(
        err.downcast_ref::<MapLoadError>(),
        Some(MapLoadError::TilesetImage { .. })
    ));
}

#[test]
fn unreadable_descriptor_is_a_typed_error() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("collidable_layers.json");
    std::fs::write(&path, "{ \"layers\": [").expect("write descriptor");

    assert!(matches!(load_collision_descriptor(&path), Err(ZoneConfigError::Json { .. })));
    assert!(matches!(
        load_zone_list(&dir.path().join("absent.json")),
        Err(ZoneConfigError::Io { .. })
    ));
}
