//! Optional in-process Q-learning trainer (behind the `training` feature).
//! Not part of the mandatory inference path; exists so the Q-table used
//! by [`crate::advisor::SamplingAdvisor`] can be populated without an
//! external training pipeline.

#![cfg(feature = "training")]

use crate::advisor::{SamplingAction, SamplingAdvisor, SamplingState};
use rand::Rng;

#[derive(Debug, Clone, Copy)]
pub struct AgentConfig {
    pub alpha: f64,
    pub gamma: f64,
    pub epsilon_start: f64,
    pub epsilon_end: f64,
    pub episodes: u32,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            alpha: 0.1,
            gamma: 0.95,
            epsilon_start: 1.0,
            epsilon_end: 0.1,
            episodes: 2000,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct EnvConfig {
    pub max_steps: u32,
    pub budget_limit: f64,
    pub anomaly_rate: f64,
    pub base_cost: f64,
}

impl Default for EnvConfig {
    fn default() -> Self {
        Self {
            max_steps: 100,
            budget_limit: 1.0,
            anomaly_rate: 0.05,
            base_cost: 0.01,
        }
    }
}

struct TelemetryEnv {
    config: EnvConfig,
    step: u32,
    relative_cost: f64,
}

impl TelemetryEnv {
    fn new(config: EnvConfig) -> Self {
        Self {
            config,
            step: 0,
            relative_cost: 0.0,
        }
    }

    fn reset(&mut self) -> SamplingState {
        self.step = 0;
        self.relative_cost = 0.0;
        SamplingState {
            relative_cost: 0.0,
            anomaly_flag: false,
        }
    }

    fn step(&mut self, action: usize, rng: &mut impl Rng) -> (SamplingState, f64, bool) {
        self.step += 1;
        let anomaly = rng.random_bool(self.config.anomaly_rate);

        let sampling_multiplier = match action {
            0 => 0.5,
            2 => 2.0,
            _ => 1.0,
        };
        self.relative_cost += self.config.base_cost * sampling_multiplier;

        let mut reward = 0.0;
        if anomaly {
            let catch_prob = match action {
                2 => 0.9,
                1 => 0.5,
                _ => 0.1,
            };
            let caught = rng.random_bool(catch_prob);
            reward += if caught { 1.0 } else { -1.0 };
        }
        if self.relative_cost > self.config.budget_limit {
            reward -= (self.relative_cost - self.config.budget_limit) * 5.0;
        }

        let state = SamplingState {
            relative_cost: (self.relative_cost / self.config.budget_limit).min(2.0),
            anomaly_flag: anomaly,
        };
        let done = self.step >= self.config.max_steps;
        (state, reward, done)
    }
}

/// Trains a [`SamplingAdvisor`]'s Q-table with tabular Q-learning and an
/// epsilon-greedy behavior policy, linearly annealed across episodes.
pub fn train(agent_config: AgentConfig, env_config: EnvConfig) -> SamplingAdvisor {
    let mut advisor = SamplingAdvisor::new();
    let mut env = TelemetryEnv::new(env_config);
    let mut rng = rand::rng();

    for episode in 0..agent_config.episodes {
        let mut state = env.reset();
        let epsilon = if agent_config.episodes <= 1 {
            agent_config.epsilon_end
        } else {
            agent_config.epsilon_start
                - (agent_config.epsilon_start - agent_config.epsilon_end)
                    * (episode as f64 / (agent_config.episodes - 1) as f64)
        };

        loop {
            let action = select_action(&advisor, state, epsilon, &mut rng);
            let (next_state, reward, done) = env.step(action, &mut rng);
            update_q(&mut advisor, state, action, reward, next_state, &agent_config);
            state = next_state;
            if done {
                break;
            }
        }
    }
    advisor
}

fn select_action(
    advisor: &SamplingAdvisor,
    state: SamplingState,
    epsilon: f64,
    rng: &mut impl Rng,
) -> usize {
    if rng.random_bool(epsilon) {
        rng.random_range(0..3)
    } else {
        match advisor.act(state) {
            SamplingAction::DecreaseSampling => 0,
            SamplingAction::MaintainSampling => 1,
            SamplingAction::IncreaseSampling => 2,
        }
    }
}

fn update_q(
    advisor: &mut SamplingAdvisor,
    state: SamplingState,
    action: usize,
    reward: f64,
    next_state: SamplingState,
    config: &AgentConfig,
) {
    let next_max_q = match advisor.act(next_state) {
        SamplingAction::DecreaseSampling => 0,
        SamplingAction::MaintainSampling => 1,
        SamplingAction::IncreaseSampling => 2,
    };
    let next_key = crate::advisor::SamplingAdvisor::discretize_state(next_state);
    let state_key = crate::advisor::SamplingAdvisor::discretize_state(state);
    let table = advisor.q_table_mut();
    let next_values = *table.entry(next_key).or_insert([0.0; 3]);
    let next_max = next_values[next_max_q];
    let entry = table.entry(state_key).or_insert([0.0; 3]);
    let current = entry[action];
    entry[action] = current + config.alpha * (reward + config.gamma * next_max - current);
}
