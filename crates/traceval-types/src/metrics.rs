use serde::{Deserialize, Serialize};

/// Run metrics for one task evaluation.
///
/// Every field defaults to zero so a partial metrics document never fails
/// deserialization. A snapshot is replaced wholesale between evaluations,
/// never patched field by field.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricsSnapshot {
    pub error_count: f64,
    pub retry_count: f64,
    pub completion_time_s: f64,
    pub total_api_calls: f64,
    pub memory_usage_mb: f64,
    pub cpu_usage_percent: f64,
    pub cost_usd: f64,
    pub human_or_agent_requests: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_default_to_zero() {
        let snapshot: MetricsSnapshot =
            serde_json::from_str(r#"{"error_count": 2}"#).unwrap();
        assert_eq!(snapshot.error_count, 2.0);
        assert_eq!(snapshot.retry_count, 0.0);
        assert_eq!(snapshot.cost_usd, 0.0);
    }

    #[test]
    fn empty_document_is_valid() {
        let snapshot: MetricsSnapshot = serde_json::from_str("{}").unwrap();
        assert_eq!(snapshot, MetricsSnapshot::default());
    }
}
