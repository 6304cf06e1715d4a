//! Cache statistics

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Point-in-time snapshot of cache contents and lifetime counters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheStats {
    /// Number of live entries.
    pub entries: usize,
    /// Total payload bytes across live entries.
    pub total_bytes: u64,
    /// Configured byte budget.
    pub budget_bytes: u64,
    /// Lifetime lookup hits.
    pub hits: u64,
    /// Lifetime lookup misses.
    pub misses: u64,
    /// Lifetime evictions under byte pressure.
    pub evictions: u64,
    /// Lifetime insertions.
    pub insertions: u64,
    /// When this snapshot was taken.
    pub calculated_at: DateTime<Utc>,
}

impl CacheStats {
    /// Fraction of lookups that hit, or 0.0 before any lookup.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            return 0.0;
        }
        self.hits as f64 / total as f64
    }

    /// Fraction of the byte budget currently in use.
    pub fn utilization(&self) -> f64 {
        if self.budget_bytes == 0 {
            return 0.0;
        }
        self.total_bytes as f64 / self.budget_bytes as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stats() -> CacheStats {
        CacheStats {
            entries: 2,
            total_bytes: 25 * 1024 * 1024,
            budget_bytes: 50 * 1024 * 1024,
            hits: 3,
            misses: 1,
            evictions: 0,
            insertions: 2,
            calculated_at: Utc::now(),
        }
    }

    #[test]
    fn test_hit_rate() {
        assert_eq!(stats().hit_rate(), 0.75);

        let empty = CacheStats {
            hits: 0,
            misses: 0,
            ..stats()
        };
        assert_eq!(empty.hit_rate(), 0.0);
    }

    #[test]
    fn test_utilization() {
        assert_eq!(stats().utilization(), 0.5);
    }
}
