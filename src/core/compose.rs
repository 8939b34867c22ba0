use crate::domain::layout::TileLayout;
use crate::domain::model::Tile;
use crate::utils::error::Result;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::{self, FilterType};
use image::RgbImage;

pub const JPEG_QUALITY: u8 = 75;

/// Decode a tile and resize it to a `tile_dim` square with a Lanczos3 filter.
pub fn decode_tile(bytes: &[u8], tile_dim: u32) -> Result<RgbImage> {
    let img = image::load_from_memory(bytes)?;
    Ok(imageops::resize(
        &img.to_rgb8(),
        tile_dim,
        tile_dim,
        FilterType::Lanczos3,
    ))
}

/// Paste every tile onto a black `dim x dim` canvas, then copy the first
/// grid into each repeat slot. Anything outside the canvas is clipped.
pub fn compose(layout: &TileLayout, tiles: &[Tile]) -> RgbImage {
    let mut canvas = RgbImage::new(layout.dim, layout.dim);

    for tile in tiles {
        let (x_min, y_min) = layout.tile_origin(tile.coord);
        imageops::replace(&mut canvas, &tile.image, x_min, y_min);
        tracing::debug!(
            row = tile.coord.row,
            col = tile.coord.col,
            x_min,
            y_min,
            "placed tile"
        );
    }

    let origins = layout.repeat_origins();
    if !origins.is_empty() {
        let edge = layout.single_dim().min(layout.dim);
        let first = imageops::crop_imm(&canvas, 0, 0, edge, edge).to_image();
        for (x, y) in origins {
            imageops::replace(&mut canvas, &first, x, y);
        }
    }

    canvas
}

pub fn encode_jpeg(image: &RgbImage) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    let mut encoder = JpegEncoder::new_with_quality(&mut buf, JPEG_QUALITY);
    encoder.encode_image(image)?;
    Ok(buf)
}
