//! A single page wgpu glyph atlas for u8 coverage textures.
//!
//! The atlas is a plain write target: where a glyph goes is decided by the layout collaborator,
//! which also owns the policy for a full atlas. There is no CPU side copy of the texels.
use anyhow::{Result, bail};
use derive_more::{Display, Error};
use tracing::instrument;
use wgpu::{
    Device, Extent3d, Origin3d, Queue, TexelCopyBufferLayout, TexelCopyTextureInfo, Texture,
    TextureAspect, TextureDescriptor, TextureDimension, TextureFormat, TextureUsages, TextureView,
    TextureViewDescriptor,
};

#[derive(Debug, Clone, PartialEq, Eq, Display, Error)]
pub enum AtlasError {
    /// Only page 0 exists, there are no multi-page atlases.
    #[display("Atlas page {page} is not supported, the atlas has a single page")]
    UnsupportedPage { page: u32 },
    #[display(
        "Atlas region {width}x{height} at ({x}, {y}) does not fit into the atlas of {dim}x{dim}"
    )]
    OutOfBounds {
        x: u32,
        y: u32,
        width: u32,
        height: u32,
        dim: u32,
    },
    #[display("Expected {expected} bytes of glyph data, but got {actual}")]
    DataSizeMismatch { expected: usize, actual: usize },
}

#[derive(Debug)]
pub struct GlyphAtlas {
    view: TextureView,
}

impl GlyphAtlas {
    pub const FORMAT: TextureFormat = TextureFormat::R8Unorm;

    /// Creates an atlas texture of `dim` x `dim` texels.
    pub fn new(device: &Device, dim: u32) -> Result<Self> {
        let max_texture_dimension_2d = device.limits().max_texture_dimension_2d;
        if dim == 0 || dim > max_texture_dimension_2d {
            bail!("Atlas size {dim} is not supported, must be in 1..={max_texture_dimension_2d}");
        }

        let texture = device.create_texture(&TextureDescriptor {
            label: Some("Glyph Atlas"),
            size: Extent3d {
                width: dim,
                height: dim,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: TextureDimension::D2,
            format: Self::FORMAT,
            usage: TextureUsages::TEXTURE_BINDING
                | TextureUsages::COPY_DST
                // Needed for reading back the atlas.
                | TextureUsages::COPY_SRC,
            view_formats: &[],
        });

        let view = texture.create_view(&TextureViewDescriptor::default());

        Ok(Self { view })
    }

    pub fn width(&self) -> u32 {
        self.texture().width()
    }

    pub fn texture(&self) -> &Texture {
        self.view.texture()
    }

    /// The view shaders sample the glyphs from.
    pub fn texture_view(&self) -> &TextureView {
        &self.view
    }

    /// Writes `data`, one byte per texel, into the region at `x`, `y` of `page`.
    ///
    /// Nothing is written if the region is rejected.
    #[instrument(skip_all)]
    #[allow(clippy::too_many_arguments)]
    pub fn insert(
        &self,
        queue: &Queue,
        page: u32,
        x: u32,
        y: u32,
        width: u32,
        height: u32,
        data: &[u8],
    ) -> Result<(), AtlasError> {
        validate_region(self.width(), page, x, y, width, height, data.len())?;
        if width == 0 || height == 0 {
            return Ok(());
        }

        queue.write_texture(
            TexelCopyTextureInfo {
                texture: self.texture(),
                mip_level: 0,
                origin: Origin3d { x, y, z: 0 },
                aspect: TextureAspect::All,
            },
            data,
            TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(width),
                rows_per_image: None,
            },
            Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
        );

        Ok(())
    }
}

#[allow(clippy::too_many_arguments)]
fn validate_region(
    dim: u32,
    page: u32,
    x: u32,
    y: u32,
    width: u32,
    height: u32,
    data_len: usize,
) -> Result<(), AtlasError> {
    if page != 0 {
        return Err(AtlasError::UnsupportedPage { page });
    }

    let fits = |pos: u32, extent: u32| pos.checked_add(extent).is_some_and(|end| end <= dim);
    if !fits(x, width) || !fits(y, height) {
        return Err(AtlasError::OutOfBounds {
            x,
            y,
            width,
            height,
            dim,
        });
    }

    let expected = width as usize * height as usize;
    if data_len != expected {
        return Err(AtlasError::DataSizeMismatch {
            expected,
            actual: data_len,
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn other_pages_are_unsupported() {
        for page in [1, 2, u32::MAX] {
            assert_eq!(
                validate_region(256, page, 0, 0, 2, 2, 4),
                Err(AtlasError::UnsupportedPage { page })
            );
        }
    }

    #[test]
    fn page_is_checked_before_the_region() {
        assert_eq!(
            validate_region(256, 1, 300, 300, 2, 2, 0),
            Err(AtlasError::UnsupportedPage { page: 1 })
        );
    }

    #[test]
    fn regions_inside_and_at_the_edge_are_accepted() {
        assert_eq!(validate_region(256, 0, 0, 0, 16, 8, 128), Ok(()));
        assert_eq!(validate_region(256, 0, 240, 248, 16, 8, 128), Ok(()));
        assert_eq!(validate_region(256, 0, 0, 0, 256, 256, 65536), Ok(()));
        assert_eq!(validate_region(256, 0, 256, 256, 0, 0, 0), Ok(()));
    }

    #[test]
    fn regions_crossing_the_edge_are_rejected() {
        assert!(matches!(
            validate_region(256, 0, 250, 0, 7, 1, 7),
            Err(AtlasError::OutOfBounds { .. })
        ));
        assert!(matches!(
            validate_region(256, 0, 0, 250, 1, 7, 7),
            Err(AtlasError::OutOfBounds { .. })
        ));
        assert!(matches!(
            validate_region(256, 0, u32::MAX, 0, 2, 1, 2),
            Err(AtlasError::OutOfBounds { .. })
        ));
    }

    #[test]
    fn data_must_cover_the_region_exactly() {
        assert_eq!(
            validate_region(256, 0, 0, 0, 4, 4, 15),
            Err(AtlasError::DataSizeMismatch {
                expected: 16,
                actual: 15
            })
        );
    }

    #[test]
    fn errors_describe_the_problem() {
        let error = AtlasError::UnsupportedPage { page: 1 };
        assert_eq!(
            error.to_string(),
            "Atlas page 1 is not supported, the atlas has a single page"
        );
    }
}
