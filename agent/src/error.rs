use thiserror::Error;

#[derive(Debug, Error)]
pub enum AgentError {
    #[error("Invalid agent configuration: {0}")]
    InvalidConfig(#[from] serde_json::Error),

    #[error("{name} must be a probability between 0 and 1, got {value}")]
    InvalidProbability { name: &'static str, value: f64 },
}
