use crate::core::Pipeline;
use crate::utils::error::Result;
use crate::utils::monitor::SystemMonitor;

/// Runs a pipeline's extract, transform and load stages in order.
pub struct JobEngine<P: Pipeline> {
    pipeline: P,
    monitor: SystemMonitor,
}

impl<P: Pipeline> JobEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self::new_with_monitoring(pipeline, false)
    }

    pub fn new_with_monitoring(pipeline: P, monitor_enabled: bool) -> Self {
        Self {
            pipeline,
            monitor: SystemMonitor::new(monitor_enabled),
        }
    }

    pub fn pipeline(&self) -> &P {
        &self.pipeline
    }

    pub async fn run(&self) -> Result<Vec<String>> {
        let name = self.pipeline.name();
        tracing::info!("🚀 Starting {} job", name);
        self.monitor.log_stats("Start");

        tracing::info!("📥 Extracting...");
        let extracted = self.pipeline.extract().await?;
        self.monitor.log_stats("Extract");

        tracing::info!("🔄 Transforming...");
        let transformed = self.pipeline.transform(extracted).await?;
        self.monitor.log_stats("Transform");

        tracing::info!("💾 Loading...");
        let outputs = self.pipeline.load(transformed).await?;
        self.monitor.log_stats("Load");

        for output in &outputs {
            tracing::info!("📁 Output saved to: {}", output);
        }
        self.monitor.log_final_stats();

        Ok(outputs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingPipeline {
        calls: AtomicUsize,
    }

    #[async_trait::async_trait]
    impl Pipeline for CountingPipeline {
        type Extracted = Vec<u32>;
        type Transformed = u32;

        fn name(&self) -> &'static str {
            "counting"
        }

        async fn extract(&self) -> Result<Vec<u32>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(vec![1, 2, 3])
        }

        async fn transform(&self, data: Vec<u32>) -> Result<u32> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(data.iter().sum())
        }

        async fn load(&self, result: u32) -> Result<Vec<String>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(vec![format!("sum-{}", result)])
        }
    }

    #[tokio::test]
    async fn test_engine_runs_stages_in_order() {
        let engine = JobEngine::new(CountingPipeline {
            calls: AtomicUsize::new(0),
        });
        let outputs = engine.run().await.unwrap();
        assert_eq!(outputs, vec!["sum-6".to_string()]);
        assert_eq!(engine.pipeline().calls.load(Ordering::SeqCst), 3);
    }
}
