//! Mixed-criticality periodic task model.
//!
//! A task is a periodic source of jobs. Low-criticality (LC) tasks have a
//! single execution budget; high-criticality (HC) tasks carry an extra
//! budget that becomes available after the system switches to Overrun
//! mode. Critical sections are intervals of a job's *executed* time during
//! which the job holds a shared resource.

use crate::types::{Priority, ResourceId, TaskId, Time};

/// Criticality level of a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Criticality {
    Low,
    High,
}

/// A resource-holding window inside a task's execution budget.
///
/// `start` is measured in cumulative executed time within one job, not
/// wall clock: a job preempted mid-section is still inside it when it
/// resumes. The interval is half-open: the job holds the resource while
/// its executed time lies in `[start, start + duration)`.
#[derive(Debug, Clone, PartialEq)]
pub struct CriticalSection {
    pub resource: ResourceId,
    pub start: Time,
    pub duration: Time,
}

impl CriticalSection {
    pub fn end(&self) -> Time {
        self.start + self.duration
    }

    pub fn contains(&self, exec: Time) -> bool {
        exec >= self.start && exec < self.end()
    }
}

/// A periodic task.
///
/// The task arena is indexed by id: `tasks[i].id == TaskId(i)`. Priority
/// and preemption level are written by the scheduling-parameter pass
/// ([`crate::srp`]); until then they are 0.
#[derive(Debug, Clone)]
pub struct Task {
    pub id: TaskId,
    pub criticality: Criticality,
    pub period: Time,
    /// Relative deadline; always equal to the period in this system.
    pub deadline: Time,
    /// Normal-mode execution budget. The only budget for LC tasks.
    pub wcet1: Time,
    /// Additional budget granted to HC tasks in Overrun mode. Zero for LC.
    pub wcet2: Time,
    /// Time of the first release. Synthesis emits 0; hand-built task sets
    /// may stagger releases.
    pub release_offset: Time,
    /// Resources this task uses.
    pub resources: Vec<ResourceId>,
    /// Critical sections, ordered by start.
    pub critical_sections: Vec<CriticalSection>,
    /// Static base priority, 1 = highest.
    pub priority: Priority,
    /// SRP preemption level, 1 = highest.
    pub preemption_level: Priority,
}

impl Task {
    /// Create a task with deadline = period and no resources assigned yet.
    pub fn new(
        id: TaskId,
        criticality: Criticality,
        period: Time,
        wcet1: Time,
        wcet2: Time,
    ) -> Self {
        Task {
            id,
            criticality,
            period,
            deadline: period,
            wcet1,
            wcet2,
            release_offset: 0.0,
            resources: Vec::new(),
            critical_sections: Vec::new(),
            priority: 0,
            preemption_level: 0,
        }
    }

    pub fn is_high(&self) -> bool {
        self.criticality == Criticality::High
    }

    /// Normal-mode utilization (wcet1 / period).
    pub fn utilization(&self) -> f64 {
        self.wcet1 / self.period
    }

    /// Worst-case utilization: includes the Overrun budget for HC tasks.
    pub fn max_utilization(&self) -> f64 {
        match self.criticality {
            Criticality::High => (self.wcet1 + self.wcet2) / self.period,
            Criticality::Low => self.wcet1 / self.period,
        }
    }

    /// The critical section a job of this task holds at executed time
    /// `exec`, if any.
    ///
    /// With nested sections, the innermost (shortest) one is active; ties
    /// go to the earliest start.
    pub fn active_cs(&self, exec: Time) -> Option<&CriticalSection> {
        let mut best: Option<&CriticalSection> = None;
        for cs in &self.critical_sections {
            if !cs.contains(exec) {
                continue;
            }
            match best {
                None => best = Some(cs),
                Some(b)
                    if cs.duration < b.duration
                        || (cs.duration == b.duration && cs.start < b.start) =>
                {
                    best = Some(cs)
                }
                Some(_) => {}
            }
        }
        best
    }
}
