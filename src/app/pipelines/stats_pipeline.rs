use crate::core::chart::{half_blocks_chart, prefetch_chart, ChartSpec};
use crate::core::stats::{half_blocks_histogram, parse_query_log, prefetch_distribution};
use crate::core::{OutputFile, Pipeline, QueryLog, StatsJobConfig, Storage};
use crate::utils::error::{GalleryError, Result};
use std::path::Path;

pub const PREFETCH_BLOCKS_STEM: &str = "prefetch_blocks";
pub const HALF_BLOCKS_STEM: &str = "half_blocks";

/// Renders the prefetch and half-blocks charts for a query log.
pub struct StatsPipeline<S: Storage, C: StatsJobConfig> {
    pub(crate) source: S,
    pub(crate) storage: S,
    pub(crate) config: C,
}

impl<S: Storage, C: StatsJobConfig> StatsPipeline<S, C> {
    pub fn new(source: S, storage: S, config: C) -> Self {
        Self {
            source,
            storage,
            config,
        }
    }

    /// `<prefix>-<stem>.<ext>`; an empty prefix still keeps the dash.
    pub fn output_name(&self, stem: &str, ext: &str) -> String {
        format!("{}-{}.{}", self.config.prefix(), stem, ext)
    }
}

async fn render_chart(spec: ChartSpec) -> Result<Vec<u8>> {
    tokio::task::spawn_blocking(move || spec.render_png())
        .await
        .map_err(|e| GalleryError::RenderError {
            message: format!("Chart render task failed: {}", e),
        })?
}

#[async_trait::async_trait]
impl<S: Storage, C: StatsJobConfig> Pipeline for StatsPipeline<S, C> {
    type Extracted = QueryLog;
    type Transformed = Vec<OutputFile>;

    fn name(&self) -> &'static str {
        "analyse-stats"
    }

    async fn extract(&self) -> Result<QueryLog> {
        tracing::info!("📄 Reading query log: {}", self.config.log_path());
        let bytes = self.source.read_file(self.config.log_path()).await?;
        let log = parse_query_log(&bytes)?;
        tracing::info!("Parsed {} query records", log.len());
        Ok(log)
    }

    async fn transform(&self, log: QueryLog) -> Result<Vec<OutputFile>> {
        if log.is_empty() {
            tracing::warn!("Query log is empty, charts will have no bars");
        }

        let buckets = prefetch_distribution(&log);
        for bucket in &buckets {
            tracing::info!(
                "prefetch {} blocks: {} queries ({:.1}%)",
                bucket.nblocks,
                bucket.count,
                bucket.percentage * 100.0
            );
        }

        let hist = half_blocks_histogram(&log, self.config.max_time(), self.config.bins())?;
        tracing::info!(
            "half blocks timings: {} of {} queries, counts {:?}",
            hist.total(),
            log.len(),
            hist.counts
        );

        let charts = [
            (PREFETCH_BLOCKS_STEM, prefetch_chart(&buckets)),
            (HALF_BLOCKS_STEM, half_blocks_chart(&hist)),
        ];

        let mut outputs = Vec::new();
        for (stem, spec) in charts {
            if self.config.emit_svg() {
                outputs.push(OutputFile {
                    path: self.output_name(stem, "svg"),
                    data: spec.to_svg().into_bytes(),
                });
            }
            outputs.push(OutputFile {
                path: self.output_name(stem, "png"),
                data: render_chart(spec).await?,
            });
        }

        Ok(outputs)
    }

    async fn load(&self, outputs: Vec<OutputFile>) -> Result<Vec<String>> {
        let mut written = Vec::with_capacity(outputs.len());
        for output in outputs {
            self.storage.write_file(&output.path, &output.data).await?;
            let full = Path::new(self.config.output_path()).join(&output.path);
            written.push(full.to_string_lossy().into_owned());
        }
        Ok(written)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Arc;
    use tokio::sync::Mutex;

    #[derive(Clone)]
    struct MockStorage {
        files: Arc<Mutex<HashMap<String, Vec<u8>>>>,
    }

    impl MockStorage {
        fn new() -> Self {
            Self {
                files: Arc::new(Mutex::new(HashMap::new())),
            }
        }

        fn with_file(path: &str, data: &[u8]) -> Self {
            let mut files = HashMap::new();
            files.insert(path.to_string(), data.to_vec());
            Self {
                files: Arc::new(Mutex::new(files)),
            }
        }

        async fn names(&self) -> Vec<String> {
            let mut names: Vec<String> = self.files.lock().await.keys().cloned().collect();
            names.sort();
            names
        }
    }

    impl Storage for MockStorage {
        async fn read_file(&self, path: &str) -> Result<Vec<u8>> {
            let files = self.files.lock().await;
            files.get(path).cloned().ok_or_else(|| {
                GalleryError::IoError(std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    format!("File not found: {}", path),
                ))
            })
        }

        async fn write_file(&self, path: &str, data: &[u8]) -> Result<()> {
            let mut files = self.files.lock().await;
            files.insert(path.to_string(), data.to_vec());
            Ok(())
        }
    }

    struct MockConfig {
        prefix: String,
        emit_svg: bool,
    }

    impl StatsJobConfig for MockConfig {
        fn log_path(&self) -> &str {
            "stats.json"
        }

        fn output_path(&self) -> &str {
            "analysis"
        }

        fn prefix(&self) -> &str {
            &self.prefix
        }

        fn max_time(&self) -> f64 {
            2000.0
        }

        fn bins(&self) -> usize {
            10
        }

        fn emit_svg(&self) -> bool {
            self.emit_svg
        }
    }

    const LOG: &[u8] = br#"{
        "q1": {"start_nblocks": 3, "fair_quality_time": 120},
        "q2": {"start_nblocks": 3},
        "q3": {"start_nblocks": 6, "fair_quality_time": 3000}
    }"#;

    #[test]
    fn test_output_name_keeps_dash_for_empty_prefix() {
        let pipeline = StatsPipeline::new(
            MockStorage::new(),
            MockStorage::new(),
            MockConfig {
                prefix: String::new(),
                emit_svg: false,
            },
        );
        assert_eq!(
            pipeline.output_name(PREFETCH_BLOCKS_STEM, "png"),
            "-prefetch_blocks.png"
        );
    }

    #[tokio::test]
    async fn test_pipeline_writes_both_charts() {
        let storage = MockStorage::new();
        let pipeline = StatsPipeline::new(
            MockStorage::with_file("stats.json", LOG),
            storage.clone(),
            MockConfig {
                prefix: "run1".to_string(),
                emit_svg: false,
            },
        );

        let log = pipeline.extract().await.unwrap();
        assert_eq!(log.len(), 3);

        let outputs = pipeline.transform(log).await.unwrap();
        let written = pipeline.load(outputs).await.unwrap();
        assert_eq!(written.len(), 2);
        assert!(written[0].ends_with("run1-prefetch_blocks.png"));

        assert_eq!(
            storage.names().await,
            vec!["run1-half_blocks.png", "run1-prefetch_blocks.png"]
        );
    }

    #[tokio::test]
    async fn test_pipeline_emits_svg_sources() {
        let storage = MockStorage::new();
        let pipeline = StatsPipeline::new(
            MockStorage::with_file("stats.json", LOG),
            storage.clone(),
            MockConfig {
                prefix: "x".to_string(),
                emit_svg: true,
            },
        );

        let log = pipeline.extract().await.unwrap();
        let outputs = pipeline.transform(log).await.unwrap();
        pipeline.load(outputs).await.unwrap();
        assert_eq!(storage.names().await.len(), 4);
    }

    #[tokio::test]
    async fn test_missing_log_is_an_error() {
        let pipeline = StatsPipeline::new(
            MockStorage::new(),
            MockStorage::new(),
            MockConfig {
                prefix: String::new(),
                emit_svg: false,
            },
        );
        assert!(matches!(
            pipeline.extract().await,
            Err(GalleryError::IoError(_))
        ));
    }
}
