use chrono::{DateTime, Utc};
use tracing::{info, warn};

/// Per-request metrics for the aggregation endpoints
#[derive(Debug, Clone)]
pub struct ApiRequestMetrics {
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub duration_ms: u64,
    pub status: ApiStatus,
    pub http_status: u16,
    pub endpoint: String,
    pub symbol_count: usize,
    pub upstream_calls: usize,
    pub language: Option<String>,
    pub error_message: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiStatus {
    Success,
    Fail,
}

impl ApiRequestMetrics {
    pub fn new(endpoint: impl Into<String>, start_time: DateTime<Utc>) -> Self {
        Self {
            start_time,
            end_time: start_time,
            duration_ms: 0,
            status: ApiStatus::Success,
            http_status: 200,
            endpoint: endpoint.into(),
            symbol_count: 0,
            upstream_calls: 0,
            language: None,
            error_message: None,
        }
    }

    pub fn complete(&mut self, http_status: u16) {
        self.end_time = Utc::now();
        self.duration_ms = (self.end_time - self.start_time).num_milliseconds().max(0) as u64;
        self.http_status = http_status;
    }

    pub fn fail(&mut self, http_status: u16, error: impl Into<String>) {
        self.status = ApiStatus::Fail;
        self.error_message = Some(error.into());
        self.complete(http_status);
    }
}

fn format_duration(duration_ms: u64) -> String {
    if duration_ms >= 1000 {
        format!("{}.{:01}s", duration_ms / 1000, (duration_ms % 1000) / 100)
    } else {
        format!("{}ms", duration_ms)
    }
}

/// Compact single-line summary of a request
pub fn format_api_log_line(metrics: &ApiRequestMetrics) -> String {
    let status_str = match metrics.status {
        ApiStatus::Success => "OK",
        ApiStatus::Fail => "FAIL",
    };

    let language = metrics.language.as_deref().unwrap_or("-");
    let error_info = match metrics.error_message {
        Some(ref error) => format!(" error:{}", error),
        None => String::new(),
    };

    format!(
        "{} | {} | {} | {} {} | symbols:{} upstream:{} lang:{}{}",
        metrics.start_time.format("%Y-%m-%d %H:%M:%S"),
        format_duration(metrics.duration_ms),
        metrics.endpoint,
        status_str,
        metrics.http_status,
        metrics.symbol_count,
        metrics.upstream_calls,
        language,
        error_info
    )
}

/// Emit the request summary on the `api_requests` tracing target
pub fn write_api_log_entry(metrics: &ApiRequestMetrics) {
    let line = format_api_log_line(metrics);
    match metrics.status {
        ApiStatus::Success => info!(target: "api_requests", duration_ms = metrics.duration_ms, "{}", line),
        ApiStatus::Fail => warn!(target: "api_requests", duration_ms = metrics.duration_ms, "{}", line),
    }
}
