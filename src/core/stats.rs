use crate::domain::model::{HalfBlocksHistogram, PrefetchBucket, QueryLog};
use crate::utils::error::{GalleryError, Result};
use std::collections::BTreeMap;

pub const DEFAULT_MAX_TIME: f64 = 2000.0;
pub const DEFAULT_BINS: usize = 10;

/// Parse a query log: a JSON object whose values are query records.
pub fn parse_query_log(bytes: &[u8]) -> Result<QueryLog> {
    Ok(serde_json::from_slice(bytes)?)
}

/// Share of queries per prefetched block count, ordered by block count.
pub fn prefetch_distribution(log: &QueryLog) -> Vec<PrefetchBucket> {
    let mut counts: BTreeMap<u64, usize> = BTreeMap::new();
    for stat in log.values() {
        *counts.entry(stat.start_nblocks).or_insert(0) += 1;
    }

    let total: usize = counts.values().sum();
    counts
        .into_iter()
        .map(|(nblocks, count)| PrefetchBucket {
            nblocks,
            count,
            percentage: count as f64 / total as f64,
        })
        .collect()
}

/// Histogram of `fair_quality_time` over `[0, max_time]`.
///
/// Timings above `max_time` are clamped into the last bin, which is closed on
/// the right. Negative timings fall outside the range and are not counted.
pub fn half_blocks_histogram(
    log: &QueryLog,
    max_time: f64,
    bins: usize,
) -> Result<HalfBlocksHistogram> {
    if bins == 0 {
        return Err(GalleryError::ValidationError {
            message: "histogram needs at least one bin".to_string(),
        });
    }
    if !(max_time > 0.0) || !max_time.is_finite() {
        return Err(GalleryError::ValidationError {
            message: format!("histogram range must be positive, got {}", max_time),
        });
    }

    let mut values: Vec<f64> = log
        .values()
        .filter_map(|stat| stat.fair_quality_time)
        .filter(|t| !t.is_nan())
        .collect();
    values.sort_by(|a, b| a.total_cmp(b));
    let values: Vec<f64> = values.into_iter().map(|t| t.min(max_time)).collect();

    let width = max_time / bins as f64;
    let edges: Vec<f64> = (0..=bins).map(|i| i as f64 * width).collect();
    let mut counts = vec![0usize; bins];
    for &t in &values {
        if t < 0.0 {
            continue;
        }
        let index = ((t / width).floor() as usize).min(bins - 1);
        counts[index] += 1;
    }

    tracing::debug!("half blocks time: {:?}", values);
    tracing::debug!("histogram counts: {:?}, edges: {:?}", counts, edges);

    Ok(HalfBlocksHistogram {
        edges,
        counts,
        values,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_log() -> QueryLog {
        parse_query_log(
            br#"{
                "q1": {"start_nblocks": 4, "fair_quality_time": 150.0},
                "q2": {"start_nblocks": 2, "fair_quality_time": 2500},
                "q3": {"start_nblocks": 4},
                "q4": {"start_nblocks": 8, "fair_quality_time": 200, "user": "a"},
                "q5": {"start_nblocks": 4, "fair_quality_time": 1999.5}
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn test_parse_keeps_extra_fields() {
        let log = sample_log();
        assert_eq!(log.len(), 5);
        assert_eq!(log["q4"].extra["user"], serde_json::json!("a"));
        assert!(log["q3"].fair_quality_time.is_none());
    }

    #[test]
    fn test_parse_rejects_missing_block_count() {
        let result = parse_query_log(br#"{"q1": {"fair_quality_time": 10}}"#);
        assert!(matches!(result, Err(GalleryError::SerializationError(_))));
    }

    #[test]
    fn test_prefetch_distribution() {
        let buckets = prefetch_distribution(&sample_log());
        let blocks: Vec<u64> = buckets.iter().map(|b| b.nblocks).collect();
        assert_eq!(blocks, vec![2, 4, 8]);
        assert_eq!(buckets[1].count, 3);
        assert!((buckets[1].percentage - 0.6).abs() < 1e-9);

        let sum: f64 = buckets.iter().map(|b| b.percentage).sum();
        assert!((sum - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_prefetch_distribution_empty_log() {
        assert!(prefetch_distribution(&QueryLog::new()).is_empty());
    }

    #[test]
    fn test_half_blocks_histogram() {
        let hist = half_blocks_histogram(&sample_log(), DEFAULT_MAX_TIME, DEFAULT_BINS).unwrap();
        assert_eq!(hist.edges.len(), 11);
        assert_eq!(hist.edges[10], 2000.0);
        // 150 -> bin 0, 200 -> bin 1, 1999.5 和被截斷的 2500 -> bin 9
        assert_eq!(hist.counts, vec![1, 1, 0, 0, 0, 0, 0, 0, 0, 2]);
        assert_eq!(hist.values, vec![150.0, 200.0, 1999.5, 2000.0]);
        assert_eq!(hist.total(), 4);
        assert_eq!(hist.max_count(), 2);
    }

    #[test]
    fn test_half_blocks_histogram_skips_negative_values() {
        let log = parse_query_log(
            br#"{"a": {"start_nblocks": 1, "fair_quality_time": -5}, "b": {"start_nblocks": 1, "fair_quality_time": 0}}"#,
        )
        .unwrap();
        let hist = half_blocks_histogram(&log, 100.0, 4).unwrap();
        assert_eq!(hist.counts, vec![1, 0, 0, 0]);
    }

    #[test]
    fn test_half_blocks_histogram_rejects_bad_range() {
        let log = sample_log();
        assert!(half_blocks_histogram(&log, 0.0, 10).is_err());
        assert!(half_blocks_histogram(&log, 2000.0, 0).is_err());
    }
}
