//! # cpustat Agent
//!
//! Library half of the agent binary: configuration, the sampling loop and
//! the event reporter. Exposed so the pieces can be driven from tests with a
//! scripted collector.

pub mod cli;
pub mod config;
pub mod reporter;
pub mod sampler;

pub use config::{AgentConfig, Config, DEFAULT_CONFIG_PATH};
pub use reporter::{CpuEvent, EventReporter, HostInfo};
pub use sampler::{run, run_sampler, CycleReport, Sampler};
