//! Debug and statistics module

use std::collections::VecDeque;
use std::time::Duration;

use crate::ai::{SearchOutcome, SearchStats};

/// Tick timing tracker
#[derive(Debug)]
pub struct TickStats {
    /// Tick time history for averaging
    tick_times: VecDeque<Duration>,
    max_samples: usize,
    avg_tick_time_ms: f32,
    max_tick_time_ms: f32,
    total_ticks: u64,
}

impl TickStats {
    pub fn new() -> Self {
        Self {
            tick_times: VecDeque::with_capacity(120),
            max_samples: 120,
            avg_tick_time_ms: 0.0,
            max_tick_time_ms: 0.0,
            total_ticks: 0,
        }
    }

    /// Record how long one tick took to compute
    pub fn record_tick(&mut self, elapsed: Duration) {
        self.total_ticks += 1;

        if self.tick_times.len() >= self.max_samples {
            self.tick_times.pop_front();
        }
        self.tick_times.push_back(elapsed);

        let total: Duration = self.tick_times.iter().sum();
        let max = self.tick_times.iter().max().copied().unwrap_or_default();
        let count = self.tick_times.len() as f32;

        self.avg_tick_time_ms = total.as_secs_f32() * 1000.0 / count;
        self.max_tick_time_ms = max.as_secs_f32() * 1000.0;
    }

    /// Average tick time in milliseconds
    pub fn avg_tick_time_ms(&self) -> f32 {
        self.avg_tick_time_ms
    }

    /// Slowest recent tick in milliseconds
    pub fn max_tick_time_ms(&self) -> f32 {
        self.max_tick_time_ms
    }

    pub fn total_ticks(&self) -> u64 {
        self.total_ticks
    }
}

impl Default for TickStats {
    fn default() -> Self {
        Self::new()
    }
}

/// Counters for the path searches made by every agent
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PathStats {
    pub requests: u64,
    pub found: u64,
    pub partial: u64,
    pub failed: u64,
    /// Nodes expanded across all searches
    pub expansions: u64,
}

impl PathStats {
    /// Count one search
    pub fn record(&mut self, stats: SearchStats) {
        self.requests += 1;
        self.expansions += stats.expansions as u64;
        match stats.outcome {
            SearchOutcome::Found => self.found += 1,
            SearchOutcome::Partial => self.partial += 1,
            SearchOutcome::NoPath => self.failed += 1,
        }
    }
}

/// Aggregate simulation statistics
#[derive(Debug, Default)]
pub struct SimStats {
    pub ticks: TickStats,
    pub paths: PathStats,
    pub deaths: u64,
}

impl SimStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// One-line summary for logging
    pub fn format_stats(&self) -> String {
        format!(
            "ticks: {} ({:.3}ms avg, {:.3}ms max) | paths: {} ({} partial, {} failed, {} expansions) | deaths: {}",
            self.ticks.total_ticks(),
            self.ticks.avg_tick_time_ms(),
            self.ticks.max_tick_time_ms(),
            self.paths.requests,
            self.paths.partial,
            self.paths.failed,
            self.paths.expansions,
            self.deaths
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tick_stats_window() {
        let mut stats = TickStats::new();
        stats.record_tick(Duration::from_millis(2));
        stats.record_tick(Duration::from_millis(4));

        assert_eq!(stats.total_ticks(), 2);
        assert!((stats.avg_tick_time_ms() - 3.0).abs() < 1e-3);
        assert!((stats.max_tick_time_ms() - 4.0).abs() < 1e-3);
    }

    #[test]
    fn test_path_stats_record() {
        let mut stats = PathStats::default();
        stats.record(SearchStats {
            expansions: 12,
            outcome: SearchOutcome::Found,
        });
        stats.record(SearchStats {
            expansions: 1000,
            outcome: SearchOutcome::Partial,
        });
        stats.record(SearchStats::default());

        assert_eq!(stats.requests, 3);
        assert_eq!(stats.found, 1);
        assert_eq!(stats.partial, 1);
        assert_eq!(stats.failed, 1);
        assert_eq!(stats.expansions, 1012);
    }
}
