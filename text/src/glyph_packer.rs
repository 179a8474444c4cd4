use std::collections::HashMap;

use anyhow::Result;
use cosmic_text::{CacheKey, FontSystem, SwashCache, SwashContent};
use derive_more::{Display, Error};
use etagere::{BucketedAtlasAllocator, size2};
use log::{debug, warn};
use tracing::instrument;

use quill_renderer::{AtlasError, GlyphAtlas};

/// The atlas has no room left for a glyph. Glyphs are never evicted.
#[derive(Debug, Clone, PartialEq, Eq, Display, Error)]
#[display("Glyph atlas is full, there is no room for a {width}x{height} glyph")]
pub struct AtlasFull {
    pub width: u32,
    pub height: u32,
}

/// Where a rasterized glyph was put into the atlas.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PackedGlyph {
    pub atlas_x: u32,
    pub atlas_y: u32,
    pub width: u32,
    pub height: u32,
    /// Offset of the bitmap's left edge from the pen position.
    pub left: i32,
    /// Offset of the bitmap's top edge above the baseline.
    pub top: i32,
}

/// Rasterizes glyphs and packs them into page 0 of a glyph atlas.
pub struct GlyphPacker {
    allocator: BucketedAtlasAllocator,
    /// `None` for glyphs that have no visible pixels.
    packed: HashMap<CacheKey, Option<PackedGlyph>>,
    swash_cache: SwashCache,
}

impl GlyphPacker {
    /// A packer for an empty atlas of `atlas_dim` x `atlas_dim` texels.
    pub fn new(atlas_dim: u32) -> Self {
        let dim = atlas_dim as i32;
        Self {
            allocator: BucketedAtlasAllocator::new(size2(dim, dim)),
            packed: HashMap::new(),
            swash_cache: SwashCache::new(),
        }
    }

    pub fn packed_count(&self) -> usize {
        self.packed.values().flatten().count()
    }

    /// Returns the placement of the glyph, rasterizing and uploading it if it's not yet in the
    /// atlas.
    ///
    /// Returns `None` for glyphs without visible pixels.
    #[instrument(skip_all)]
    pub fn pack(
        &mut self,
        font_system: &mut FontSystem,
        atlas: &GlyphAtlas,
        queue: &wgpu::Queue,
        key: CacheKey,
    ) -> Result<Option<PackedGlyph>> {
        if let Some(packed) = self.packed.get(&key) {
            return Ok(*packed);
        }

        let Some(image) = self.swash_cache.get_image_uncached(font_system, key) else {
            warn!("No image for glyph {:?}", key.glyph_id);
            self.packed.insert(key, None);
            return Ok(None);
        };

        let (width, height) = (image.placement.width, image.placement.height);
        if width == 0 || height == 0 {
            self.packed.insert(key, None);
            return Ok(None);
        }

        let coverage = coverage(image.content, &image.data);
        let (atlas_x, atlas_y) = self.place(width, height, |x, y| {
            atlas.insert(queue, 0, x, y, width, height, &coverage)
        })?;
        debug!("Packed {width}x{height} glyph at ({atlas_x}, {atlas_y})");

        let packed = PackedGlyph {
            atlas_x,
            atlas_y,
            width,
            height,
            left: image.placement.left,
            top: image.placement.top,
        };
        self.packed.insert(key, Some(packed));
        Ok(Some(packed))
    }

    /// Allocates a `width` x `height` rectangle and uploads the glyph into it.
    ///
    /// If the upload fails, the rectangle is freed again.
    fn place(
        &mut self,
        width: u32,
        height: u32,
        upload: impl FnOnce(u32, u32) -> Result<(), AtlasError>,
    ) -> Result<(u32, u32)> {
        let Some(allocation) = self
            .allocator
            .allocate(size2(width as i32, height as i32))
        else {
            return Err(AtlasFull { width, height }.into());
        };

        let (x, y) = (
            allocation.rectangle.min.x as u32,
            allocation.rectangle.min.y as u32,
        );
        if let Err(e) = upload(x, y) {
            self.allocator.deallocate(allocation.id);
            return Err(e.into());
        }

        Ok((x, y))
    }
}

/// Converts image data to one coverage byte per pixel.
fn coverage(content: SwashContent, data: &[u8]) -> Vec<u8> {
    match content {
        SwashContent::Mask => data.to_vec(),
        SwashContent::SubpixelMask => data
            .chunks_exact(4)
            .map(|p| ((p[0] as u32 + p[1] as u32 + p[2] as u32) / 3) as u8)
            .collect(),
        SwashContent::Color => data.chunks_exact(4).map(|p| p[3]).collect(),
    }
}
