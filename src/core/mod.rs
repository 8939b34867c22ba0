pub mod chart;
pub mod compose;
pub mod engine;
pub mod stats;

pub use crate::domain::layout::{TileCoord, TileLayout};
pub use crate::domain::model::{Composite, OutputFile, QueryLog, QueryStat, Tile};
pub use crate::domain::ports::{Pipeline, StatsJobConfig, Storage, TileJobConfig};
pub use crate::utils::error::Result;
