//! Agent transport implementations.

pub mod weather_agent;

// Re-export for convenience
pub use weather_agent::WeatherAgentClient;
