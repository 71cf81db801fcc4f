//! Newtype wrappers and type aliases for domain concepts.
//!
//! Newtypes for identifiers (task IDs, resource IDs, job IDs) prevent
//! silent type confusion. Type aliases for quantities (simulated time,
//! priority ranks) provide self-documenting code without the boilerplate
//! of implementing arithmetic traits.

/// Task identifier. Doubles as the index into the task arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskId(pub usize);

/// Shared-resource identifier. Doubles as the index into the resource arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResourceId(pub usize);

/// Job identifier, assigned monotonically in release order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct JobId(pub u64);

/// Simulated time, in the same unit as configured task periods.
pub type Time = f64;

/// Static priority rank: 1 is the highest priority, larger is lower.
pub type Priority = u32;

/// Ceiling of a resource no task uses: lower than any real priority rank.
pub const CEILING_FLOOR: Priority = Priority::MAX;
