use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TotalCount {
    pub total: Option<u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EngagementStats {
    pub subscribers: Option<u64>,
}

/// Response of `/api/core/stats/`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SiteStats {
    pub programs: Option<TotalCount>,
    pub events: Option<TotalCount>,
    pub news: Option<TotalCount>,
    pub engagement: Option<EngagementStats>,
}

impl SiteStats {
    // Zero counts are treated as missing so the template figure stays
    // in place rather than showing "0".
    fn nonzero(value: Option<u64>) -> Option<u64> {
        value.filter(|&n| n != 0)
    }

    pub fn subscribers(&self) -> Option<u64> {
        Self::nonzero(self.engagement.as_ref().and_then(|e| e.subscribers))
    }

    pub fn programs_total(&self) -> Option<u64> {
        Self::nonzero(self.programs.as_ref().and_then(|p| p.total))
    }

    pub fn events_total(&self) -> Option<u64> {
        Self::nonzero(self.events.as_ref().and_then(|e| e.total))
    }

    pub fn news_total(&self) -> Option<u64> {
        Self::nonzero(self.news.as_ref().and_then(|n| n.total))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats_accessors() {
        let stats: SiteStats = serde_json::from_str(
            r#"{"programs": {"total": 12}, "events": {"total": 0}, "news": {"total": 4},
                "engagement": {"subscribers": 1250}}"#,
        )
        .unwrap();
        assert_eq!(stats.subscribers(), Some(1250));
        assert_eq!(stats.programs_total(), Some(12));
        assert_eq!(stats.events_total(), None);
        assert_eq!(stats.news_total(), Some(4));
    }

    #[test]
    fn test_stats_empty_object() {
        let stats: SiteStats = serde_json::from_str("{}").unwrap();
        assert_eq!(stats, SiteStats::default());
        assert_eq!(stats.subscribers(), None);
    }
}
