//! Discrete-time EDF+SRP simulation engine.
//!
//! The engine advances a fixed time step and, at each tick, runs the same
//! sub-steps in the same order: release due jobs, drop LC jobs when in
//! Overrun, record deadline misses, pick the job to run, log critical
//! section transitions, execute one step, check for an HC overrun (the
//! Normal-to-Overrun switch), and retire completed jobs. The fixed
//! ordering is what makes a run fully deterministic given its inputs.
//!
//! Selection is EDF by absolute deadline, except that a job inside a
//! critical section competes with its task's preemption level instead:
//! a candidate may take the processor from a section-holder only when its
//! effective priority beats that level. That is the Stack Resource Policy
//! rule; conflicting resource access is prevented by the comparison
//! itself, so resources never block.

use tracing::{debug, info};

use crate::task::{Criticality, Task};
use crate::trace::{Schedule, Trace, TraceKind};
use crate::types::{JobId, TaskId, Time};

/// System-wide criticality mode. The transition is one-way within a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Normal,
    Overrun,
}

/// A released instance of a task, owned by the simulator.
#[derive(Debug, Clone)]
pub struct Job {
    /// Originating task (index into the task arena).
    pub task: TaskId,
    /// Unique id, monotonic in release order.
    pub id: JobId,
    /// Scheduled release time.
    pub release: Time,
    /// Absolute deadline: release + task deadline.
    pub deadline: Time,
    /// Cumulative executed time within this job.
    pub exec: Time,
    /// Remaining execution budget.
    pub remaining: Time,
    /// Whether the job held a resource at the previous tick.
    in_cs: bool,
    /// Whether a deadline miss has already been recorded.
    missed: bool,
}

/// Parameters of one simulation run.
#[derive(Debug, Clone, Copy)]
pub struct SimParams {
    /// Total simulated duration, in the period unit.
    pub sim_time: Time,
    /// Time step. Fixed for the whole run.
    pub dt: Time,
    /// Seed recorded in the schedule artifact.
    pub seed: u64,
}

/// Everything a run produces: the event trace and the schedule artifact.
#[derive(Debug, Clone)]
pub struct SimResult {
    pub trace: Trace,
    pub schedule: Schedule,
    /// Mode at the end of the run.
    pub final_mode: Mode,
}

/// The simulator. Consumes a task arena whose scheduling parameters
/// (priorities, preemption levels) have already been derived.
pub struct Simulator {
    tasks: Vec<Task>,
    params: SimParams,
}

impl Simulator {
    pub fn new(tasks: Vec<Task>, params: SimParams) -> Self {
        debug_assert!(tasks.iter().enumerate().all(|(i, t)| t.id.0 == i));
        Simulator { tasks, params }
    }

    /// Run the simulation to `sim_time` and return the trace and schedule.
    pub fn run(self) -> SimResult {
        let dt = self.params.dt;
        let mut trace = Trace::new();
        let mut schedule = Schedule::new(self.params.seed);

        let mut next_release: Vec<Time> =
            self.tasks.iter().map(|t| t.release_offset).collect();
        let mut ready: Vec<Job> = Vec::new();
        let mut running: Option<Job> = None;
        let mut mode = Mode::Normal;
        let mut next_job_id: u64 = 0;

        let mut now: Time = 0.0;
        while now < self.params.sim_time {
            // Release every instance that has come due, in task-id order.
            // In Overrun mode LC releases are suppressed, but their
            // release points keep advancing.
            for (i, task) in self.tasks.iter().enumerate() {
                while next_release[i] <= now {
                    let release = next_release[i];
                    next_release[i] += task.period;

                    if mode == Mode::Overrun && !task.is_high() {
                        debug!(task = i, time = release, "suppressed LC release in overrun");
                        continue;
                    }

                    let budget = match (task.criticality, mode) {
                        (Criticality::High, Mode::Overrun) => task.wcet1 + task.wcet2,
                        _ => task.wcet1,
                    };
                    next_job_id += 1;
                    let job = Job {
                        task: task.id,
                        id: JobId(next_job_id),
                        release,
                        deadline: release + task.deadline,
                        exec: 0.0,
                        remaining: budget,
                        in_cs: false,
                        missed: false,
                    };
                    info!(
                        job = job.id.0,
                        task = i,
                        deadline = job.deadline,
                        budget,
                        "RELEASE"
                    );
                    trace.record(
                        now,
                        TraceKind::Released {
                            job: job.id,
                            task: task.id,
                            deadline: job.deadline,
                            budget,
                        },
                    );
                    ready.push(job);
                }
            }

            // Overrun mode keeps the ready set free of LC jobs.
            if mode == Mode::Overrun {
                self.drop_low(&mut ready, now, &mut trace);
            }

            // Record deadline misses. A miss is an event, not a failure:
            // the job stays and keeps executing.
            for job in running.iter_mut().chain(ready.iter_mut()) {
                if !job.missed && now > job.deadline && job.remaining > 0.0 {
                    job.missed = true;
                    info!(job = job.id.0, task = job.task.0, "MISS");
                    trace.record(
                        now,
                        TraceKind::DeadlineMiss {
                            job: job.id,
                            task: job.task,
                            deadline: job.deadline,
                        },
                    );
                }
            }

            // Pick the job to run. An idle processor takes the best ready
            // job unconditionally; a running job is preempted only when
            // the best candidate beats its threshold: its preemption
            // level while it holds a resource, its own effective priority
            // otherwise.
            match running.take() {
                None => {
                    if let Some(i) = self.best_ready(&ready) {
                        let job = ready.remove(i);
                        info!(job = job.id.0, task = job.task.0, "START");
                        trace.record(
                            now,
                            TraceKind::Started {
                                job: job.id,
                                task: job.task,
                            },
                        );
                        running = Some(job);
                    }
                }
                Some(current) => {
                    let preempt = self.best_ready(&ready).filter(|&i| {
                        let task = &self.tasks[current.task.0];
                        let threshold = match task.active_cs(current.exec) {
                            Some(_) => task.preemption_level as f64,
                            None => self.effective_priority(&current),
                        };
                        self.effective_priority(&ready[i]) < threshold
                    });
                    match preempt {
                        Some(i) => {
                            let candidate = ready.remove(i);
                            info!(
                                job = current.id.0,
                                task = current.task.0,
                                by = candidate.id.0,
                                "PREEMPT"
                            );
                            trace.record(
                                now,
                                TraceKind::Preempted {
                                    job: current.id,
                                    task: current.task,
                                    by: candidate.id,
                                },
                            );
                            trace.record(
                                now,
                                TraceKind::Started {
                                    job: candidate.id,
                                    task: candidate.task,
                                },
                            );
                            ready.push(current);
                            running = Some(candidate);
                        }
                        None => running = Some(current),
                    }
                }
            }

            // Log critical-section transitions of the running job.
            if let Some(job) = running.as_mut() {
                let task = &self.tasks[job.task.0];
                let active = task.active_cs(job.exec);
                match (job.in_cs, active) {
                    (false, Some(cs)) => {
                        info!(
                            job = job.id.0,
                            task = job.task.0,
                            resource = cs.resource.0,
                            "CS_ENTER"
                        );
                        trace.record(
                            now,
                            TraceKind::EnteredCs {
                                job: job.id,
                                task: job.task,
                                resource: cs.resource,
                            },
                        );
                    }
                    (true, None) => {
                        info!(job = job.id.0, task = job.task.0, "CS_EXIT");
                        trace.record(
                            now,
                            TraceKind::ExitedCs {
                                job: job.id,
                                task: job.task,
                            },
                        );
                    }
                    _ => {}
                }
                job.in_cs = active.is_some();
            }

            // Execute one time step.
            if let Some(job) = running.as_mut() {
                job.exec += dt;
                job.remaining -= dt;
                schedule.record(job.task, now, now + dt);
            }

            // An HC job past its normal budget in Normal mode triggers
            // the criticality switch: every HC job gains its Overrun
            // budget and LC jobs are discarded.
            if mode == Mode::Normal {
                if let Some(job) = running.as_mut() {
                    let task = &self.tasks[job.task.0];
                    if task.is_high() && job.exec > task.wcet1 {
                        mode = Mode::Overrun;
                        info!(
                            job = job.id.0,
                            task = job.task.0,
                            exec = job.exec,
                            wcet1 = task.wcet1,
                            "OVERRUN"
                        );
                        trace.record(
                            now,
                            TraceKind::ModeSwitch {
                                job: job.id,
                                task: job.task,
                            },
                        );
                        job.remaining += task.wcet2;
                        for waiting in ready.iter_mut() {
                            let wtask = &self.tasks[waiting.task.0];
                            if wtask.is_high() {
                                waiting.remaining += wtask.wcet2;
                            }
                        }
                        self.drop_low(&mut ready, now, &mut trace);
                    }
                }
            }

            // Retire the running job once its budget is spent.
            if let Some(job) = running.take() {
                if job.remaining <= 0.0 {
                    info!(job = job.id.0, task = job.task.0, exec = job.exec, "COMPLETE");
                    trace.record(
                        now,
                        TraceKind::Completed {
                            job: job.id,
                            task: job.task,
                        },
                    );
                } else {
                    running = Some(job);
                }
            }

            now += dt;
        }

        SimResult {
            trace,
            schedule,
            final_mode: mode,
        }
    }

    /// Effective priority of a job: its absolute deadline, or the task's
    /// preemption level while the job holds a resource. Both live in the
    /// same numeric domain; a section-holder is thereby elevated to
    /// compete with the smallest deadlines.
    fn effective_priority(&self, job: &Job) -> f64 {
        let task = &self.tasks[job.task.0];
        match task.active_cs(job.exec) {
            Some(_) => task.preemption_level as f64,
            None => job.deadline,
        }
    }

    /// Index of the ready job with the smallest effective priority; ties
    /// break on job id (earlier release wins).
    fn best_ready(&self, ready: &[Job]) -> Option<usize> {
        let mut best: Option<(usize, f64, JobId)> = None;
        for (i, job) in ready.iter().enumerate() {
            let eff = self.effective_priority(job);
            let better = match best {
                None => true,
                Some((_, best_eff, best_id)) => {
                    eff < best_eff || (eff == best_eff && job.id < best_id)
                }
            };
            if better {
                best = Some((i, eff, job.id));
            }
        }
        best.map(|(i, _, _)| i)
    }

    /// Discard every LC job in the ready set, logging each drop.
    fn drop_low(&self, ready: &mut Vec<Job>, now: Time, trace: &mut Trace) {
        ready.retain(|job| {
            if self.tasks[job.task.0].is_high() {
                return true;
            }
            info!(job = job.id.0, task = job.task.0, "DROP");
            trace.record(
                now,
                TraceKind::Dropped {
                    job: job.id,
                    task: job.task,
                },
            );
            false
        });
    }
}
