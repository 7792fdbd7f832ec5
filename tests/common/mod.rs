// tests/common/mod.rs

use std::fs;
use std::path::{Path, PathBuf};

use image::{Rgba, RgbaImage};

/// Two 16px tiles side by side: gid 1 grass, gid 2 wall.
pub fn write_tileset_png(dir: &Path) -> PathBuf {
    let mut img = RgbaImage::from_pixel(32, 16, Rgba([40, 160, 40, 255]));
    for y in 0..16 {
        for x in 16..32 {
            img.put_pixel(x, y, Rgba([90, 90, 90, 255]));
        }
    }
    let path = dir.join("tiles.png");
    img.save(&path).expect("write tileset png");
    path
}

/// `width x height` map with a full "ground" layer and a "walls" layer
/// holding gid 2 on every cell of `walls`.
pub fn write_map(dir: &Path, name: &str, width: usize, height: usize, walls: &[(usize, usize)]) -> String {
    let ground = vec![1u32; width * height];
    let mut wall_data = vec![0u32; width * height];
    for &(x, y) in walls {
        wall_data[y * width + x] = 2;
    }

    let json = serde_json::json!({
        "width": width,
        "height": height,
        "tilewidth": 16,
        "tileheight": 16,
        "layers": [
            {"type": "tilelayer", "name": "ground", "width": width, "height": height, "data": ground},
            {"type": "tilelayer", "name": "walls", "width": width, "height": height, "data": wall_data},
            {"type": "objectgroup", "name": "teleporters", "objects": []}
        ],
        "tilesets": [
            {"firstgid": 1, "image": "tiles.png", "tilewidth": 16, "tileheight": 16, "tilecount": 2, "columns": 2}
        ]
    });

    let path = dir.join(name);
    fs::write(&path, json.to_string()).expect("write map");
    path.to_string_lossy().into_owned()
}

pub fn write_json(dir: &Path, name: &str, value: serde_json::Value) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, value.to_string()).expect("write json");
    path
}
