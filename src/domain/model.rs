use crate::domain::layout::TileCoord;
use image::RgbImage;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A decoded tile, already resized to the layout's tile edge.
#[derive(Debug, Clone)]
pub struct Tile {
    pub coord: TileCoord,
    pub image: RgbImage,
}

#[derive(Debug, Clone)]
pub struct Composite {
    pub file_name: String,
    pub image: RgbImage,
}

/// One entry of the query log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryStat {
    pub start_nblocks: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fair_quality_time: Option<f64>,
    #[serde(flatten)]
    pub extra: HashMap<String, serde_json::Value>,
}

/// Query log keyed by query identifier.
pub type QueryLog = HashMap<String, QueryStat>;

/// Share of queries that prefetched a given number of blocks.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PrefetchBucket {
    pub nblocks: u64,
    pub count: usize,
    pub percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HalfBlocksHistogram {
    pub edges: Vec<f64>,
    pub counts: Vec<usize>,
    /// Sorted timings after clamping to the histogram range.
    pub values: Vec<f64>,
}

impl HalfBlocksHistogram {
    pub fn total(&self) -> usize {
        self.counts.iter().sum()
    }

    pub fn max_count(&self) -> usize {
        self.counts.iter().copied().max().unwrap_or(0)
    }
}

/// An encoded output file waiting to be written.
#[derive(Debug, Clone)]
pub struct OutputFile {
    pub path: String,
    pub data: Vec<u8>,
}
