use crate::core::compose::{compose, decode_tile, encode_jpeg};
use crate::core::{Composite, Pipeline, Storage, Tile, TileCoord, TileJobConfig, TileLayout};
use crate::utils::error::{GalleryError, Result};
use std::path::Path;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

/// Stitches one pyramid level into a single preview image.
pub struct TilePipeline<S: Storage, C: TileJobConfig> {
    pub(crate) source: S,
    pub(crate) storage: S,
    pub(crate) config: C,
    layout: TileLayout,
}

impl<S, C> TilePipeline<S, C>
where
    S: Storage + Clone + 'static,
    C: TileJobConfig,
{
    /// `source` is rooted at the pyramid base directory, `storage` at the
    /// output directory.
    pub fn new(source: S, storage: S, config: C) -> Result<Self> {
        let layout = TileLayout::new(config.dim(), config.factor(), config.repeat())?;
        Ok(Self {
            source,
            storage,
            config,
            layout,
        })
    }

    pub fn layout(&self) -> &TileLayout {
        &self.layout
    }

    fn output_file_name(&self) -> String {
        format!("{}.jpg", self.config.fname())
    }
}

async fn load_tile<S: Storage>(source: &S, coord: TileCoord, path: String, tile_dim: u32) -> Result<Tile> {
    let bytes = source.read_file(&path).await.map_err(|e| match e {
        GalleryError::IoError(io) if io.kind() == std::io::ErrorKind::NotFound => {
            GalleryError::MissingTileError { path: path.clone() }
        }
        other => other,
    })?;

    let image = tokio::task::spawn_blocking(move || decode_tile(&bytes, tile_dim))
        .await
        .map_err(|e| GalleryError::ProcessingError {
            message: format!("Tile decode task failed: {}", e),
        })??;

    Ok(Tile { coord, image })
}

#[async_trait::async_trait]
impl<S, C> Pipeline for TilePipeline<S, C>
where
    S: Storage + Clone + 'static,
    C: TileJobConfig,
{
    type Extracted = Vec<Tile>;
    type Transformed = Composite;

    fn name(&self) -> &'static str {
        "create-tile"
    }

    async fn extract(&self) -> Result<Vec<Tile>> {
        let tile_dim = self.layout.tile_dim();
        tracing::info!(
            "🧩 Loading {} tiles from {} (factor {}, tile size {}px)",
            self.layout.tile_count(),
            self.config.base_dir(),
            self.layout.factor,
            tile_dim
        );

        let semaphore = Arc::new(Semaphore::new(self.config.concurrent_loads().max(1)));
        let mut loaders = JoinSet::new();

        for coord in self.layout.coords() {
            let semaphore = semaphore.clone();
            let source = self.source.clone();
            let path = self.layout.tile_path(coord);

            loaders.spawn(async move {
                let _permit = semaphore.acquire_owned().await.map_err(|e| {
                    GalleryError::ProcessingError {
                        message: format!("Tile loader closed: {}", e),
                    }
                })?;
                load_tile(&source, coord, path, tile_dim).await
            });
        }

        // 第一個錯誤即返回，drop 掉 JoinSet 會中止其餘載入
        let mut tiles = Vec::with_capacity(self.layout.tile_count());
        while let Some(joined) = loaders.join_next().await {
            let tile = joined.map_err(|e| GalleryError::ProcessingError {
                message: format!("Tile loader task failed: {}", e),
            })??;
            tiles.push(tile);
        }
        tiles.sort_by_key(|tile| (tile.coord.row, tile.coord.col));

        tracing::debug!("Loaded {} tiles", tiles.len());
        Ok(tiles)
    }

    async fn transform(&self, tiles: Vec<Tile>) -> Result<Composite> {
        let layout = self.layout;
        let image = tokio::task::spawn_blocking(move || compose(&layout, &tiles))
            .await
            .map_err(|e| GalleryError::ProcessingError {
                message: format!("Compose task failed: {}", e),
            })?;

        tracing::info!(
            "🖼️ Composed {}x{} image (repeat {})",
            image.width(),
            image.height(),
            layout.repeat
        );

        Ok(Composite {
            file_name: self.output_file_name(),
            image,
        })
    }

    async fn load(&self, composite: Composite) -> Result<Vec<String>> {
        let Composite { file_name, image } = composite;
        let data = tokio::task::spawn_blocking(move || encode_jpeg(&image))
            .await
            .map_err(|e| GalleryError::ProcessingError {
                message: format!("JPEG encode task failed: {}", e),
            })??;

        self.storage.write_file(&file_name, &data).await?;

        let output = Path::new(self.config.output_dir()).join(&file_name);
        Ok(vec![output.to_string_lossy().into_owned()])
    }
}
