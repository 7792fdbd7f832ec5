use std::collections::HashMap;

use crate::spatial::TileId;

/// Supplies unscaled tile images and knows how to scale them.
pub trait TileImageSource {
    type Image;
    /// Cheap-to-clone handle to a scaled image (a GPU texture in the game).
    type Scaled: Clone;

    fn unscaled(&self, gid: TileId) -> Option<Self::Image>;
    fn scale(&self, image: &Self::Image, width: u32, height: u32) -> Self::Scaled;
}

/// Pixel size of a `tile_w x tile_h` tile drawn at `zoom`, never below 1.
#[inline]
pub fn scaled_size(tile_w: u32, tile_h: u32, zoom: f32) -> (u32, u32) {
    (
        ((tile_w as f32 * zoom) as u32).max(1),
        ((tile_h as f32 * zoom) as u32).max(1),
    )
}

/// Scaled tile images keyed by (gid, zoom). Only ever cleared as a whole.
#[derive(Debug)]
pub struct TileImageCache<B> {
    tile_w: u32,
    tile_h: u32,
    entries: HashMap<(TileId, u32), B>,
}

impl<B: Clone> TileImageCache<B> {
    pub fn new(tile_w: u32, tile_h: u32) -> Self {
        Self {
            tile_w,
            tile_h,
            entries: HashMap::new(),
        }
    }

    /// Cached image for `gid` at `zoom`, scaling it on first request.
    /// `None` when the source has no image for the gid; misses are not cached.
    pub fn get_scaled<S>(&mut self, source: &S, gid: TileId, zoom: f32) -> Option<B>
    where
        S: TileImageSource<Scaled = B>,
    {
        let key = (TileId(gid.clean()), zoom.to_bits());
        if let Some(hit) = self.entries.get(&key) {
            return Some(hit.clone());
        }

        let original = source.unscaled(key.0)?;
        let (w, h) = scaled_size(self.tile_w, self.tile_h, zoom);
        let scaled = source.scale(&original, w, h);
        self.entries.insert(key, scaled.clone());
        Some(scaled)
    }

    pub fn invalidate_all(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}


#[cfg(test)]
mod tests {
    use super::fixtures::CountingSource;
    use super::*;
    use std::rc::Rc;

    #[test]
    fn second_lookup_returns_the_same_handle() {
        let source = CountingSource::new(4);
        let mut cache = TileImageCache::new(16, 16);

        let a = cache.get_scaled(&source, TileId(3), 4.0).expect("image");
        let b = cache.get_scaled(&source, TileId(3), 4.0).expect("image");

        assert!(Rc::ptr_eq(&a, &b));
        assert_eq!(source.requests.get(), 1);
        assert_eq!(*a, (3, 64, 64));
    }

    #[test]
    fn invalidate_forces_a_new_request() {
        let source = CountingSource::new(4);
        let mut cache = TileImageCache::new(16, 16);

        let before = cache.get_scaled(&source, TileId(2), 4.0).expect("image");
        cache.invalidate_all();
        assert!(cache.is_empty());

        let after = cache.get_scaled(&source, TileId(2), 4.0).expect("image");
        assert_eq!(source.requests.get(), 2);
        assert!(!Rc::ptr_eq(&before, &after));
    }

    #[test]
    fn zoom_is_part_of_the_key_and_sizes_truncate() {
        let source = CountingSource::new(1);
        let mut cache = TileImageCache::new(16, 8);

        cache.get_scaled(&source, TileId(1), 4.0);
        cache.get_scaled(&source, TileId(1), 4.1);

        assert_eq!(cache.len(), 2);
        assert_eq!(*source.scaled_sizes.borrow(), vec![(64, 32), (65, 32)]);
    }

    #[test]
    fn unknown_gids_are_not_cached() {
        let source = CountingSource::new(1);
        let mut cache = TileImageCache::new(16, 16);

        assert!(cache.get_scaled(&source, TileId(9), 1.0).is_none());
        assert!(cache.is_empty());
    }

    #[test]
    fn scaled_size_never_collapses_to_zero() {
        assert_eq!(scaled_size(16, 16, 0.01), (1, 1));
        assert_eq!(scaled_size(16, 16, 0.1), (1, 1));
        assert_eq!(scaled_size(32, 32, 0.5), (16, 16));
    }
}
