use std::time::Duration;

/// Counters kept by a [`super::Preprocessor`]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PreprocessorStats {
    pub definitions: usize,
    pub expansions: usize,
    pub failed_expansions: usize,
    pub tokens_emitted: usize,
    pub bytes_expanded: usize,
    pub total_expansion_time: Duration,
}

impl PreprocessorStats {
    pub fn success_rate(&self) -> f64 {
        if self.expansions == 0 {
            0.0
        } else {
            (self.expansions - self.failed_expansions) as f64 / self.expansions as f64
        }
    }

    pub fn average_expansion_time(&self) -> Duration {
        match u32::try_from(self.expansions) {
            Ok(count) if count > 0 => self.total_expansion_time / count,
            _ => Duration::ZERO,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rates_without_expansions() {
        let stats = PreprocessorStats::default();
        assert_eq!(stats.success_rate(), 0.0);
        assert_eq!(stats.average_expansion_time(), Duration::ZERO);
    }

    #[test]
    fn test_success_rate() {
        let stats = PreprocessorStats {
            expansions: 4,
            failed_expansions: 1,
            total_expansion_time: Duration::from_millis(8),
            ..Default::default()
        };
        assert_eq!(stats.success_rate(), 0.75);
        assert_eq!(stats.average_expansion_time(), Duration::from_millis(2));
    }
}
