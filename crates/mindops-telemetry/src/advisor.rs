//! Sampling policy advisor (component G): a tabular Q-learning lookup over
//! `(cost_bin, anomaly_flag)` states.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

const BIN_COUNT: usize = 10;
const COST_RANGE: f64 = 2.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SamplingAction {
    DecreaseSampling,
    MaintainSampling,
    IncreaseSampling,
}

impl SamplingAction {
    fn from_index(index: usize) -> Self {
        match index {
            0 => Self::DecreaseSampling,
            2 => Self::IncreaseSampling,
            _ => Self::MaintainSampling,
        }
    }
}

/// `relative_cost` is `cost / budget`, typically clipped to `[0, 2]`;
/// `anomaly_flag` is `true` when an anomaly was observed this step.
#[derive(Debug, Clone, Copy)]
pub struct SamplingState {
    pub relative_cost: f64,
    pub anomaly_flag: bool,
}

type StateKey = (u32, u32);

#[derive(Debug, Clone, Default)]
pub struct SamplingAdvisor {
    q_table: HashMap<StateKey, [f64; 3]>,
}

impl SamplingAdvisor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_table(q_table: HashMap<StateKey, [f64; 3]>) -> Self {
        Self { q_table }
    }

    pub(crate) fn discretize_state(state: SamplingState) -> StateKey {
        let cost_bin = digitize_cost(state.relative_cost);
        let anomaly_flag = if state.anomaly_flag { 1 } else { 0 };
        (cost_bin, anomaly_flag)
    }

    /// Greedy lookup over the learned Q-table. An untrained (or unseen)
    /// state has no recorded preference and defaults to maintaining the
    /// current sampling rate.
    pub fn act(&self, state: SamplingState) -> SamplingAction {
        let key = Self::discretize_state(state);
        match self.q_table.get(&key) {
            Some(values) => {
                let best = values
                    .iter()
                    .enumerate()
                    .max_by(|(_, a), (_, b)| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal))
                    .map(|(index, _)| index)
                    .unwrap_or(1);
                SamplingAction::from_index(best)
            }
            None => SamplingAction::MaintainSampling,
        }
    }

    #[cfg(feature = "training")]
    pub fn q_table_mut(&mut self) -> &mut HashMap<StateKey, [f64; 3]> {
        &mut self.q_table
    }
}

/// Bins `relative_cost` into `[0, BIN_COUNT)` over the range `[0, COST_RANGE]`,
/// matching `numpy.digitize` against the interior bin edges.
fn digitize_cost(relative_cost: f64) -> u32 {
    let step = COST_RANGE / BIN_COUNT as f64;
    let mut bin = 0u32;
    for i in 1..BIN_COUNT {
        let edge = step * i as f64;
        if relative_cost >= edge {
            bin = i as u32;
        } else {
            break;
        }
    }
    bin
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn untrained_advisor_maintains_sampling() {
        let advisor = SamplingAdvisor::new();
        let action = advisor.act(SamplingState {
            relative_cost: 0.5,
            anomaly_flag: true,
        });
        assert_eq!(action, SamplingAction::MaintainSampling);
    }

    #[test]
    fn trained_state_takes_greedy_action() {
        let mut table = HashMap::new();
        table.insert((2, 1), [0.1, 0.2, 0.9]);
        let advisor = SamplingAdvisor::from_table(table);
        let action = advisor.act(SamplingState {
            relative_cost: 0.5,
            anomaly_flag: true,
        });
        assert_eq!(action, SamplingAction::IncreaseSampling);
    }

    #[test]
    fn digitize_cost_matches_bin_boundaries() {
        assert_eq!(digitize_cost(0.0), 0);
        assert_eq!(digitize_cost(0.19), 0);
        assert_eq!(digitize_cost(0.2), 1);
        assert_eq!(digitize_cost(2.0), 9);
    }
}
