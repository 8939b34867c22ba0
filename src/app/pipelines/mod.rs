pub mod stats_pipeline;
pub mod tile_pipeline;

pub use stats_pipeline::StatsPipeline;
pub use tile_pipeline::TilePipeline;
