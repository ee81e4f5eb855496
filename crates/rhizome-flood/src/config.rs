use crate::heuristics::ScoringOptions;
use crate::settings::SettingValue;

// ─────────────────────────────────────────────
// Enums
// ─────────────────────────────────────────────

/// How the scheduler distributes growth across instances.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FillProcessing {
    /// Grow every active instance by one step per round, with a barrier
    /// between rounds.
    #[default]
    Parallel,
    /// Drive each instance to completion before its worker takes the next.
    /// Concurrency exists across instances, never within one.
    Sequential,
}

/// Primary frontier ordering key; the other key breaks ties.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FillPriority {
    #[default]
    Score,
    Depth,
}

/// Direction applied to the priority keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    /// Lowest value pops first.
    #[default]
    Ascending,
    /// Highest value pops first.
    Descending,
}

// ─────────────────────────────────────────────
// FillConfig
// ─────────────────────────────────────────────

/// Tuning parameters for one flood-fill run.
#[derive(Debug, Clone)]
pub struct FillConfig {
    /// Scheduling mode.
    pub processing: FillProcessing,
    /// Frontier ordering key.
    pub priority: FillPriority,
    /// Direction of the frontier ordering.
    pub direction: SortDirection,
    /// Score components accumulated on probe.
    pub scoring: ScoringOptions,
    /// Candidates accepted per growth step.
    pub fill_rate: SettingValue<u32>,
    /// Stop once captured + staged reaches this many nodes.
    pub count_limit: SettingValue<u32>,
    /// Do not probe past this hop depth.
    pub depth_limit: SettingValue<u32>,
    /// Discard candidates whose cumulative traveled distance exceeds this.
    pub distance_limit: SettingValue<f64>,
    /// Worker threads for the growth/blend pools. `None` uses the global
    /// rayon pool.
    pub workers: Option<usize>,
}

impl Default for FillConfig {
    fn default() -> Self {
        Self {
            processing: FillProcessing::Parallel,
            priority: FillPriority::Score,
            direction: SortDirection::Ascending,
            scoring: ScoringOptions::default(),
            fill_rate: SettingValue::Constant(1),
            count_limit: SettingValue::Constant(u32::MAX),
            depth_limit: SettingValue::Constant(u32::MAX),
            distance_limit: SettingValue::Constant(f64::INFINITY),
            workers: None,
        }
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seeds::Seed;

    #[test]
    fn default_config_is_unbounded() {
        let config = FillConfig::default();
        let seed = Seed { node: 0, origin: None };
        assert_eq!(config.fill_rate.read(&seed), 1);
        assert_eq!(config.count_limit.read(&seed), u32::MAX);
        assert_eq!(config.depth_limit.read(&seed), u32::MAX);
        assert_eq!(config.distance_limit.read(&seed), f64::INFINITY);
        assert_eq!(config.processing, FillProcessing::Parallel);
    }
}
