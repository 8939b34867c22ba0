use crate::utils::error::Result;
use async_trait::async_trait;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

pub trait TileJobConfig: Send + Sync {
    fn base_dir(&self) -> &str;
    fn dim(&self) -> u32;
    fn factor(&self) -> u32;
    fn repeat(&self) -> u32;
    fn fname(&self) -> &str;
    fn output_dir(&self) -> &str;
    fn concurrent_loads(&self) -> usize;
}

pub trait StatsJobConfig: Send + Sync {
    fn log_path(&self) -> &str;
    fn output_path(&self) -> &str;
    fn prefix(&self) -> &str;
    fn max_time(&self) -> f64;
    fn bins(&self) -> usize;
    fn emit_svg(&self) -> bool;
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    type Extracted: Send + 'static;
    type Transformed: Send + 'static;

    fn name(&self) -> &'static str;
    async fn extract(&self) -> Result<Self::Extracted>;
    async fn transform(&self, data: Self::Extracted) -> Result<Self::Transformed>;
    /// Returns the paths written.
    async fn load(&self, result: Self::Transformed) -> Result<Vec<String>>;
}
