//! mcsim - Deterministic simulator for mixed-criticality EDF+SRP
//! scheduling on a single processor.
//!
//! Given a configuration, the crate synthesizes a plausible periodic task
//! set (utilizations via UUnifast, uniform periods, Bernoulli
//! criticality), assigns shared resources and critical sections, derives
//! Rate-Monotonic priorities plus Stack Resource Policy ceilings and
//! preemption levels, and simulates execution under Earliest-Deadline-
//! First with the SRP preemption rule and a one-way Normal-to-Overrun
//! criticality switch.
//!
//! # Architecture
//!
//! - **Config**: YAML configuration loading and validation
//! - **Synth**: randomized but seed-reproducible task-set generation
//! - **Srp**: priorities, resource ceilings, preemption levels
//! - **Engine**: discrete-time scheduling loop with the mode switch
//! - **Trace**: event recording, summaries, and the schedule artifact
//!
//! # Usage
//!
//! ```rust,no_run
//! use mcsim::{synthesize, Config, Rng, SimParams, Simulator};
//!
//! let config = Config::load("config.yaml").unwrap();
//! let mut rng = Rng::new(config.seed);
//! let (tasks, _resources) = synthesize(&config, &mut rng).unwrap();
//!
//! let params = SimParams {
//!     sim_time: config.simulation_time,
//!     dt: config.time_step,
//!     seed: config.seed,
//! };
//! let result = Simulator::new(tasks, params).run();
//! result.trace.dump();
//! ```

pub mod config;
pub mod engine;
pub mod fmt;
pub mod resource;
pub mod rng;
pub mod srp;
pub mod synth;
pub mod task;
pub mod trace;
pub mod types;
pub mod uunifast;

// Re-export the main public types for convenience.
pub use config::{Config, ConfigError, DEFAULT_SEED, DEFAULT_TIME_STEP};
pub use engine::{Job, Mode, SimParams, SimResult, Simulator};
pub use resource::Resource;
pub use rng::Rng;
pub use synth::synthesize;
pub use task::{Criticality, CriticalSection, Task};
pub use trace::{Schedule, Slice, Trace, TraceEvent, TraceKind, TraceSummary};
pub use types::{JobId, Priority, ResourceId, TaskId, Time, CEILING_FLOOR};
pub use uunifast::{uunifast, SynthError};
