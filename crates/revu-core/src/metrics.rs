//! Synthetic project metrics with time-boxed memoization
//!
//! Dashboard-facing mock data. Responses are memoized per request key with
//! an explicit TTL and explicit invalidation; nothing in the review pipeline
//! depends on this service.

use chrono::{DateTime, Duration as ChronoDuration, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use crate::quality::QualityBreakdown;

/// Default cache lifetime
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(300);

/// Envelope for every metrics response
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub timestamp: String,
}

impl<T> ApiResponse<T> {
    fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            timestamp: Utc::now().to_rfc3339(),
        }
    }

    fn err(error: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error.into()),
            timestamp: Utc::now().to_rfc3339(),
        }
    }
}

/// Aggregate project quality snapshot
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectMetrics {
    pub id: String,
    pub overall_score: f64,
    pub code_quality: QualityBreakdown,
    pub commit_count: u32,
    pub last_updated: DateTime<Utc>,
    pub trends: Vec<QualityTrend>,
}

/// One scored point in a quality trend series
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QualityTrend {
    pub date: DateTime<Utc>,
    pub score: f64,
    pub category: TrendCategory,
}

/// Quality dimension a trend point belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendCategory {
    Readability,
    Maintainability,
    Security,
    Performance,
}

const TREND_CATEGORIES: [TrendCategory; 4] = [
    TrendCategory::Readability,
    TrendCategory::Maintainability,
    TrendCategory::Security,
    TrendCategory::Performance,
];

/// Commit activity statistics
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommitStats {
    pub total_commits: u32,
    pub commits_by_author: HashMap<String, u32>,
    pub commits_by_day: HashMap<String, u32>,
    pub average_commit_size: f64,
}

#[derive(Debug, Clone)]
enum CachedValue {
    Project(ProjectMetrics),
    Trends(Vec<QualityTrend>),
    Commits(CommitStats),
}

#[derive(Debug)]
struct CacheEntry {
    stored_at: Instant,
    value: CachedValue,
}

/// Metrics provider with per-key memoization
#[derive(Debug)]
pub struct MetricsService {
    cache: Mutex<HashMap<String, CacheEntry>>,
    ttl: Duration,
}

impl Default for MetricsService {
    fn default() -> Self {
        Self::new()
    }
}

impl MetricsService {
    pub fn new() -> Self {
        Self::with_ttl(DEFAULT_CACHE_TTL)
    }

    /// Create a service with a custom cache lifetime
    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            cache: Mutex::new(HashMap::new()),
            ttl,
        }
    }

    /// Project-level quality snapshot
    pub fn project_metrics(&self) -> ApiResponse<ProjectMetrics> {
        const KEY: &str = "project-metrics";
        if let Some(CachedValue::Project(metrics)) = self.get_cached(KEY) {
            return ApiResponse::ok(metrics);
        }

        let metrics = ProjectMetrics {
            id: "project-1".to_string(),
            overall_score: 8.5,
            code_quality: QualityBreakdown {
                readability: 9.0,
                maintainability: 8.5,
                security: 8.0,
                performance: 8.5,
            },
            commit_count: 42,
            last_updated: Utc::now(),
            trends: synthesize_trends(30),
        };
        self.store(KEY, CachedValue::Project(metrics.clone()));
        ApiResponse::ok(metrics)
    }

    /// Quality trend series over the given window
    pub fn quality_trends(&self, days: u32) -> ApiResponse<Vec<QualityTrend>> {
        if !(1..=365).contains(&days) {
            return ApiResponse::err("days must be between 1 and 365");
        }

        let key = format!("quality-trends-{days}");
        if let Some(CachedValue::Trends(trends)) = self.get_cached(&key) {
            return ApiResponse::ok(trends);
        }

        let trends = synthesize_trends(days);
        self.store(&key, CachedValue::Trends(trends.clone()));
        ApiResponse::ok(trends)
    }

    /// Commit activity statistics
    pub fn commit_stats(&self) -> ApiResponse<CommitStats> {
        const KEY: &str = "commit-stats";
        if let Some(CachedValue::Commits(stats)) = self.get_cached(KEY) {
            return ApiResponse::ok(stats);
        }

        let mut rng = rand::thread_rng();
        let mut commits_by_day = HashMap::new();
        for i in 0..30 {
            let date = Utc::now() - ChronoDuration::days(i);
            commits_by_day.insert(date.format("%Y-%m-%d").to_string(), rng.gen_range(0..10));
        }

        let stats = CommitStats {
            total_commits: 156,
            commits_by_author: HashMap::from([
                ("developer1".to_string(), 89),
                ("developer2".to_string(), 45),
                ("review-agent".to_string(), 22),
            ]),
            commits_by_day,
            average_commit_size: 3.2,
        };
        self.store(KEY, CachedValue::Commits(stats.clone()));
        ApiResponse::ok(stats)
    }

    /// Drop one cached entry
    pub fn invalidate(&self, key: &str) {
        if let Ok(mut cache) = self.cache.lock() {
            cache.remove(key);
        }
    }

    /// Drop every cached entry
    pub fn clear(&self) {
        if let Ok(mut cache) = self.cache.lock() {
            cache.clear();
        }
    }

    fn get_cached(&self, key: &str) -> Option<CachedValue> {
        let cache = self.cache.lock().ok()?;
        let entry = cache.get(key)?;
        if entry.stored_at.elapsed() < self.ttl {
            Some(entry.value.clone())
        } else {
            None
        }
    }

    fn store(&self, key: &str, value: CachedValue) {
        if let Ok(mut cache) = self.cache.lock() {
            cache.insert(
                key.to_string(),
                CacheEntry {
                    stored_at: Instant::now(),
                    value,
                },
            );
        }
    }
}

fn synthesize_trends(days: u32) -> Vec<QualityTrend> {
    let mut rng = rand::thread_rng();
    let mut trends = Vec::with_capacity(days as usize * TREND_CATEGORIES.len());

    for i in 0..days {
        let date = Utc::now() - ChronoDuration::days(i64::from(i));
        for category in TREND_CATEGORIES {
            trends.push(QualityTrend {
                date,
                score: rng.gen_range(7.0..9.0),
                category,
            });
        }
    }

    trends.sort_by_key(|t| t.date);
    trends
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_responses_are_cached_within_ttl() {
        let service = MetricsService::new();
        let first = serde_json::to_string(&service.quality_trends(7).data).unwrap();
        let second = serde_json::to_string(&service.quality_trends(7).data).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_invalidation_drops_the_entry() {
        let service = MetricsService::new();
        let _ = service.project_metrics();
        assert!(service.get_cached("project-metrics").is_some());

        service.invalidate("project-metrics");
        assert!(service.get_cached("project-metrics").is_none());

        let regenerated = serde_json::to_string(&service.project_metrics().data).unwrap();
        let cached = serde_json::to_string(&service.project_metrics().data).unwrap();
        assert_eq!(regenerated, cached);
    }

    #[test]
    fn test_zero_ttl_disables_caching() {
        let service = MetricsService::with_ttl(Duration::ZERO);
        assert!(service.commit_stats().success);
        assert!(service.get_cached("commit-stats").is_none());
    }

    #[test]
    fn test_day_window_is_validated() {
        let service = MetricsService::new();
        assert!(!service.quality_trends(0).success);
        assert!(!service.quality_trends(366).success);
        assert!(service.quality_trends(365).success);
    }

    #[test]
    fn test_trends_are_sorted_ascending() {
        let service = MetricsService::new();
        let trends = service.quality_trends(5).data.unwrap();
        assert_eq!(trends.len(), 5 * TREND_CATEGORIES.len());
        assert!(trends.windows(2).all(|pair| pair[0].date <= pair[1].date));
    }
}
