use serde::{Deserialize, Serialize};

/// How an empty queue is refilled.
#[derive(Debug, Deserialize, Serialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ExtrapolationMode {
    /// Never refill; the playback loop ends when the queue runs dry.
    None,
    /// Ask the chat backend for songs similar to recent history.
    #[default]
    History,
    /// Ask the chat backend for playlist themes and search those.
    Themes,
}

#[derive(Debug, Deserialize, Serialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum QueuePriority {
    #[default]
    Fifo,
    UserFirst,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct BotConfig {
    #[serde(default = "default_true")]
    pub extrapolate_when_empty: bool,
    /// Refill strategy used while `extrapolate_when_empty` is set.
    #[serde(default)]
    pub extrapolation: ExtrapolationMode,
    /// History entries shown to the chat backend when extrapolating.
    #[serde(default = "default_lookback")]
    pub extrapolation_lookback: usize,
    /// Consecutive failed entries before playback gives up.
    #[serde(default = "default_failure_budget")]
    pub failure_budget: u32,
    /// Suggestions moved into the queue per refill.
    #[serde(default = "default_suggestion_batch")]
    pub suggestion_batch: usize,
    #[serde(default)]
    pub queue_priority: QueuePriority,
}

impl BotConfig {
    /// The mode playback starts in, and returns to after a stop.
    pub fn initial_extrapolation(&self) -> ExtrapolationMode {
        if self.extrapolate_when_empty {
            self.extrapolation
        } else {
            ExtrapolationMode::None
        }
    }
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            extrapolate_when_empty: default_true(),
            extrapolation: ExtrapolationMode::default(),
            extrapolation_lookback: default_lookback(),
            failure_budget: default_failure_budget(),
            suggestion_batch: default_suggestion_batch(),
            queue_priority: QueuePriority::default(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_lookback() -> usize {
    10
}

fn default_failure_budget() -> u32 {
    5
}

fn default_suggestion_batch() -> usize {
    5
}
