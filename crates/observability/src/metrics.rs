//! 分发与 HTTP 指标记录模块
//!
//! 所有函数在未安装 recorder 时为空操作 (metrics facade 语义)。

use std::time::Duration;

use metrics::{counter, gauge, histogram};

/// 记录一次投递尝试 (attempt)
///
/// `accepted` 为 true 表示生产者返回 200/201。
pub fn record_dispatch_attempt(accepted: bool, elapsed: Duration) {
    let result = if accepted { "accepted" } else { "failed" };
    counter!("album_store_dispatch_attempts_total", "result" => result).increment(1);
    histogram!("album_store_dispatch_attempt_duration_ms").record(elapsed.as_secs_f64() * 1000.0);
}

/// 记录一次逻辑分发的最终结果
///
/// `outcome`: `success` / `exhausted` / `cancelled` / `shutdown` / `rejected`
pub fn record_dispatch_outcome(outcome: &'static str, attempts: u32) {
    counter!("album_store_dispatch_outcomes_total", "outcome" => outcome).increment(1);
    histogram!("album_store_dispatch_attempts_per_dispatch").record(f64::from(attempts));
}

/// 记录入站 HTTP 请求
///
/// `route` 为匹配到的路由模板 (例如 `/review/{likeornot}/{album_id}`)，避免标签基数膨胀。
pub fn record_http_request(route: &str, status: u16) {
    counter!(
        "album_store_http_requests_total",
        "route" => route.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
}

/// 计数器快照 (用于 gauge 导出)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatsGauges {
    pub sent: u64,
    pub succeeded: u64,
    pub failed: u64,
    /// 成功率 (整数百分比)
    pub success_rate: u64,
}

/// 导出统计快照为 gauge
pub fn record_stats_snapshot(stats: StatsGauges) {
    gauge!("album_store_dispatch_sent").set(stats.sent as f64);
    gauge!("album_store_dispatch_succeeded").set(stats.succeeded as f64);
    gauge!("album_store_dispatch_failed").set(stats.failed as f64);
    gauge!("album_store_dispatch_success_rate").set(stats.success_rate as f64);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_without_recorder_is_noop() {
        record_dispatch_attempt(true, Duration::from_millis(12));
        record_dispatch_attempt(false, Duration::from_millis(3));
        record_dispatch_outcome("success", 1);
        record_http_request("/review/{likeornot}/{album_id}", 201);
        record_stats_snapshot(StatsGauges {
            sent: 3,
            succeeded: 2,
            failed: 1,
            success_rate: 66,
        });
    }
}
