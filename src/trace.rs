//! Trace event recording and the schedule artifact.
//!
//! Every scheduling action (release, dispatch, preemption, critical
//! section entry/exit, completion, mode switch, drop, deadline miss) is
//! recorded as a [`TraceEvent`] with a simulated timestamp. The
//! [`Schedule`] is the persisted artifact: the ordered execution slices
//! plus the seed that reproduces the run.

use std::io;

use serde::Serialize;

use crate::fmt::FmtT;
use crate::types::{JobId, ResourceId, TaskId, Time};

/// A single trace event produced by the simulator.
#[derive(Debug, Clone)]
pub struct TraceEvent {
    /// Simulated time at which this event occurred.
    pub time: Time,
    /// The kind of event.
    pub kind: TraceKind,
}

/// The type of scheduling event recorded.
#[derive(Debug, Clone, PartialEq)]
pub enum TraceKind {
    /// A job was released into the ready set.
    Released {
        job: JobId,
        task: TaskId,
        deadline: Time,
        budget: Time,
    },
    /// A job was dispatched to the processor.
    Started { job: JobId, task: TaskId },
    /// The running job was preempted by another job.
    Preempted { job: JobId, task: TaskId, by: JobId },
    /// The running job entered a critical section.
    EnteredCs {
        job: JobId,
        task: TaskId,
        resource: ResourceId,
    },
    /// The running job left its critical section.
    ExitedCs { job: JobId, task: TaskId },
    /// A job consumed its whole budget and completed.
    Completed { job: JobId, task: TaskId },
    /// An HC job overran its normal budget: the system entered Overrun.
    ModeSwitch { job: JobId, task: TaskId },
    /// A low-criticality job was discarded because of Overrun mode.
    Dropped { job: JobId, task: TaskId },
    /// A job was still incomplete past its absolute deadline.
    DeadlineMiss {
        job: JobId,
        task: TaskId,
        deadline: Time,
    },
}

/// A complete simulation trace, containing all events in chronological
/// order.
#[derive(Debug, Clone, Default)]
pub struct Trace {
    events: Vec<TraceEvent>,
}

impl Trace {
    pub(crate) fn new() -> Self {
        Trace { events: Vec::new() }
    }

    pub(crate) fn record(&mut self, time: Time, kind: TraceKind) {
        self.events.push(TraceEvent { time, kind });
    }

    /// All events in chronological order.
    pub fn events(&self) -> &[TraceEvent] {
        &self.events
    }

    /// The event kinds without their timestamps. Useful for comparing two
    /// runs that differ only in time-step quantization.
    pub fn kinds(&self) -> Vec<TraceKind> {
        self.events.iter().map(|e| e.kind.clone()).collect()
    }

    /// Count the number of releases of a task.
    pub fn release_count(&self, task: TaskId) -> usize {
        self.events
            .iter()
            .filter(|e| matches!(e.kind, TraceKind::Released { task: t, .. } if t == task))
            .count()
    }

    /// Count the number of completed jobs of a task.
    pub fn completion_count(&self, task: TaskId) -> usize {
        self.completion_times(task).len()
    }

    /// Times at which jobs of a task completed.
    pub fn completion_times(&self, task: TaskId) -> Vec<Time> {
        self.events
            .iter()
            .filter(|e| matches!(e.kind, TraceKind::Completed { task: t, .. } if t == task))
            .map(|e| e.time)
            .collect()
    }

    /// Count the deadline misses of a task.
    pub fn miss_count(&self, task: TaskId) -> usize {
        self.events
            .iter()
            .filter(|e| matches!(e.kind, TraceKind::DeadlineMiss { task: t, .. } if t == task))
            .count()
    }

    /// Count all preemption events.
    pub fn preemption_count(&self) -> usize {
        self.events
            .iter()
            .filter(|e| matches!(e.kind, TraceKind::Preempted { .. }))
            .count()
    }

    /// Count all dropped low-criticality jobs.
    pub fn drop_count(&self) -> usize {
        self.events
            .iter()
            .filter(|e| matches!(e.kind, TraceKind::Dropped { .. }))
            .count()
    }

    /// The time of the Normal-to-Overrun switch, if one happened.
    pub fn mode_switch_at(&self) -> Option<Time> {
        self.events
            .iter()
            .find(|e| matches!(e.kind, TraceKind::ModeSwitch { .. }))
            .map(|e| e.time)
    }

    /// Aggregate counters over the whole trace.
    pub fn summary(&self) -> TraceSummary {
        let mut summary = TraceSummary {
            total_events: self.events.len(),
            ..TraceSummary::default()
        };
        for event in &self.events {
            match &event.kind {
                TraceKind::Released { .. } => summary.releases += 1,
                TraceKind::Started { .. } => summary.dispatches += 1,
                TraceKind::Preempted { .. } => summary.preemptions += 1,
                TraceKind::EnteredCs { .. } => summary.cs_entries += 1,
                TraceKind::ExitedCs { .. } => summary.cs_exits += 1,
                TraceKind::Completed { .. } => summary.completions += 1,
                TraceKind::ModeSwitch { .. } => summary.mode_switches += 1,
                TraceKind::Dropped { .. } => summary.drops += 1,
                TraceKind::DeadlineMiss { .. } => summary.deadline_misses += 1,
            }
        }
        summary
    }

    /// Pretty-print the trace for debugging.
    pub fn dump(&self) {
        for event in &self.events {
            let desc = match &event.kind {
                TraceKind::Released {
                    job,
                    task,
                    deadline,
                    budget,
                } => format!(
                    "RELEASE  job={} task={} deadline={:.3} budget={:.3}",
                    job.0, task.0, deadline, budget
                ),
                TraceKind::Started { job, task } => {
                    format!("START    job={} task={}", job.0, task.0)
                }
                TraceKind::Preempted { job, task, by } => {
                    format!("PREEMPT  job={} task={} by={}", job.0, task.0, by.0)
                }
                TraceKind::EnteredCs {
                    job,
                    task,
                    resource,
                } => format!(
                    "CS_ENTER job={} task={} resource={}",
                    job.0, task.0, resource.0
                ),
                TraceKind::ExitedCs { job, task } => {
                    format!("CS_EXIT  job={} task={}", job.0, task.0)
                }
                TraceKind::Completed { job, task } => {
                    format!("COMPLETE job={} task={}", job.0, task.0)
                }
                TraceKind::ModeSwitch { job, task } => {
                    format!("OVERRUN  job={} task={}", job.0, task.0)
                }
                TraceKind::Dropped { job, task } => {
                    format!("DROP     job={} task={}", job.0, task.0)
                }
                TraceKind::DeadlineMiss {
                    job,
                    task,
                    deadline,
                } => format!(
                    "MISS     job={} task={} deadline={:.3}",
                    job.0, task.0, deadline
                ),
            };
            eprintln!("[{}] {}", FmtT(event.time), desc);
        }
    }
}

/// Aggregate event counters for a trace.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TraceSummary {
    pub total_events: usize,
    pub releases: usize,
    pub dispatches: usize,
    pub preemptions: usize,
    pub cs_entries: usize,
    pub cs_exits: usize,
    pub completions: usize,
    pub mode_switches: usize,
    pub drops: usize,
    pub deadline_misses: usize,
}

impl std::fmt::Display for TraceSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Trace Summary:")?;
        writeln!(f, "  releases:        {}", self.releases)?;
        writeln!(f, "  dispatches:      {}", self.dispatches)?;
        writeln!(f, "  preemptions:     {}", self.preemptions)?;
        writeln!(f, "  cs_entries:      {}", self.cs_entries)?;
        writeln!(f, "  cs_exits:        {}", self.cs_exits)?;
        writeln!(f, "  completions:     {}", self.completions)?;
        writeln!(f, "  mode_switches:   {}", self.mode_switches)?;
        writeln!(f, "  drops:           {}", self.drops)?;
        write!(f, "  deadline_misses: {}", self.deadline_misses)
    }
}

/// One contiguous execution interval of a task on the processor.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Slice {
    pub task_id: usize,
    pub start_time: Time,
    pub end_time: Time,
}

/// The persisted schedule artifact: the seed that reproduces the run plus
/// the ordered execution slices.
#[derive(Debug, Clone, Serialize)]
pub struct Schedule {
    pub seed: u64,
    pub slices: Vec<Slice>,
}

impl Schedule {
    pub(crate) fn new(seed: u64) -> Self {
        Schedule {
            seed,
            slices: Vec::new(),
        }
    }

    /// Append an executed interval, merging it into the previous slice
    /// when the same task ran without interruption.
    pub(crate) fn record(&mut self, task: TaskId, start: Time, end: Time) {
        if let Some(last) = self.slices.last_mut() {
            if last.task_id == task.0 && (start - last.end_time).abs() < 1e-9 {
                last.end_time = end;
                return;
            }
        }
        self.slices.push(Slice {
            task_id: task.0,
            start_time: start,
            end_time: end,
        });
    }

    /// Total processor time a task received.
    pub fn total_runtime(&self, task: TaskId) -> Time {
        self.slices
            .iter()
            .filter(|s| s.task_id == task.0)
            .map(|s| s.end_time - s.start_time)
            .sum()
    }

    /// Serialize the artifact as pretty-printed JSON.
    pub fn write_json(&self, writer: impl io::Write) -> serde_json::Result<()> {
        serde_json::to_writer_pretty(writer, self)
    }

    /// The artifact as a JSON string.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schedule_merges_contiguous_slices() {
        let mut schedule = Schedule::new(0);
        schedule.record(TaskId(1), 0.0, 0.001);
        schedule.record(TaskId(1), 0.001, 0.002);
        schedule.record(TaskId(2), 0.002, 0.003);
        schedule.record(TaskId(1), 0.005, 0.006);

        assert_eq!(schedule.slices.len(), 3);
        assert_eq!(schedule.slices[0].task_id, 1);
        assert_eq!(schedule.slices[0].end_time, 0.002);
        assert_eq!(schedule.slices[1].task_id, 2);
        // A gap splits slices even for the same task.
        assert_eq!(schedule.slices[2].start_time, 0.005);
    }

    #[test]
    fn test_total_runtime() {
        let mut schedule = Schedule::new(0);
        schedule.record(TaskId(0), 0.0, 2.0);
        schedule.record(TaskId(1), 2.0, 3.0);
        schedule.record(TaskId(0), 5.0, 6.5);
        assert!((schedule.total_runtime(TaskId(0)) - 3.5).abs() < 1e-12);
        assert!((schedule.total_runtime(TaskId(1)) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_schedule_json_shape() {
        let mut schedule = Schedule::new(7);
        schedule.record(TaskId(0), 0.0, 1.0);
        let json = schedule.to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["seed"], 7);
        assert_eq!(value["slices"][0]["task_id"], 0);
        assert_eq!(value["slices"][0]["start_time"], 0.0);
        assert_eq!(value["slices"][0]["end_time"], 1.0);
    }

    #[test]
    fn test_summary_counts() {
        let mut trace = Trace::new();
        trace.record(
            0.0,
            TraceKind::Released {
                job: JobId(1),
                task: TaskId(0),
                deadline: 10.0,
                budget: 3.0,
            },
        );
        trace.record(
            0.0,
            TraceKind::Started {
                job: JobId(1),
                task: TaskId(0),
            },
        );
        trace.record(
            3.0,
            TraceKind::Completed {
                job: JobId(1),
                task: TaskId(0),
            },
        );
        let summary = trace.summary();
        assert_eq!(summary.total_events, 3);
        assert_eq!(summary.releases, 1);
        assert_eq!(summary.dispatches, 1);
        assert_eq!(summary.completions, 1);
        assert_eq!(summary.preemptions, 0);
    }
}
