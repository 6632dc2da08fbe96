use std::path::{Path, PathBuf};

use image::ImageReader;
use thiserror::Error;

/// Pixels per tile; shared by the atlas, the tilemap and actor movement.
pub const TILE_SIZE: u32 = 32;

/// Top-left pixel corner of one `TILE_SIZE` square tile inside an atlas.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AtlasRect {
    pub x: u32,
    pub y: u32,
}

#[derive(Debug, Error)]
pub enum AtlasError {
    #[error("atlas width {width} is not a positive multiple of tile size {tile_size}")]
    WidthNotTileAligned { width: u32, tile_size: u32 },
    #[error("atlas pixel buffer holds {actual} bytes, expected {expected}")]
    PixelCountMismatch { expected: usize, actual: usize },
    #[error("failed to read atlas image at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to decode atlas image at {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
}

/// A single RGBA8 image holding many fixed-size tiles, addressed by a
/// linear integer ID via a width-derived row/column mapping.
#[derive(Debug, Clone)]
pub struct TileAtlas {
    width: u32,
    height: u32,
    rgba: Vec<u8>,
}

impl TileAtlas {
    pub fn from_rgba(width: u32, height: u32, rgba: Vec<u8>) -> Result<Self, AtlasError> {
        if width == 0 || width % TILE_SIZE != 0 {
            return Err(AtlasError::WidthNotTileAligned {
                width,
                tile_size: TILE_SIZE,
            });
        }
        let expected = width as usize * height as usize * 4;
        let actual = rgba.len();
        if expected != actual {
            return Err(AtlasError::PixelCountMismatch { expected, actual });
        }
        Ok(Self {
            width,
            height,
            rgba,
        })
    }

    pub fn load_png(path: &Path) -> Result<Self, AtlasError> {
        let reader = ImageReader::open(path).map_err(|source| AtlasError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let image = reader
            .decode()
            .map_err(|source| AtlasError::Decode {
                path: path.to_path_buf(),
                source,
            })?
            .into_rgba8();
        Self::from_rgba(image.width(), image.height(), image.into_raw())
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn rgba(&self) -> &[u8] {
        &self.rgba
    }

    pub fn columns(&self) -> u32 {
        self.width / TILE_SIZE
    }

    /// ID → pixel rectangle: `col = id mod columns`,
    /// `row = id * TILE_SIZE / width` (equivalent to `id / columns`).
    /// Total over all IDs; out-of-image rows simply clip at blit time.
    pub fn tile_rect(&self, id: u16) -> AtlasRect {
        let id = id as u32;
        let col = id % self.columns();
        let row = (id * TILE_SIZE) / self.width;
        AtlasRect {
            x: col * TILE_SIZE,
            y: row * TILE_SIZE,
        }
    }
}
