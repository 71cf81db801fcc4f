//! Task-set synthesis pipeline.
//!
//! Synthesis runs as a fixed sequence of randomized generators over one
//! seeded [`Rng`]: utilizations (UUnifast), periods and criticalities,
//! resource assignment, critical-section placement, then the derived
//! scheduling parameters (priorities, ceilings, preemption levels).
//! Given the same config and seed the pipeline is fully reproducible.

use crate::config::Config;
use crate::resource::Resource;
use crate::rng::Rng;
use crate::srp;
use crate::task::{Criticality, CriticalSection, Task};
use crate::types::{ResourceId, TaskId};
use crate::uunifast::{uunifast, SynthError};

/// Run the whole synthesis pipeline and return the task and resource
/// arenas, ready for simulation.
pub fn synthesize(config: &Config, rng: &mut Rng) -> Result<(Vec<Task>, Vec<Resource>), SynthError> {
    let mut tasks = generate_tasks(config, rng)?;
    let mut resources = generate_resources(config.num_resources);
    assign_resources(config, &mut tasks, &mut resources, rng);
    place_critical_sections(config, &mut tasks, rng)?;
    srp::assign_priorities(&mut tasks);
    srp::compute_ceilings(&tasks, &mut resources);
    srp::assign_preemption_levels(&mut tasks, &resources);
    Ok((tasks, resources))
}

/// Generate the periodic task records.
///
/// Utilizations come from UUnifast so they sum to `total_utility`;
/// each period is uniform in `period_range` and wcet1 = utilization *
/// period, which preserves the utilization sum exactly. Criticality is an
/// independent Bernoulli draw; HC tasks get an extra Overrun budget of
/// `wcet_ratio` times wcet1.
pub fn generate_tasks(config: &Config, rng: &mut Rng) -> Result<Vec<Task>, SynthError> {
    if config.total_utility > config.num_tasks as f64 {
        return Err(SynthError::UtilizationExceedsTasks {
            total: config.total_utility,
            tasks: config.num_tasks,
        });
    }
    let utilizations = uunifast(config.num_tasks, config.total_utility, rng)?;

    let mut tasks = Vec::with_capacity(config.num_tasks);
    for (i, &u) in utilizations.iter().enumerate() {
        let period = rng.range(config.period_range[0], config.period_range[1]);
        let wcet1 = u * period;

        let criticality = if rng.chance(config.high_ratio) {
            Criticality::High
        } else {
            Criticality::Low
        };
        let wcet2 = match criticality {
            Criticality::High => rng.range(config.wcet_ratio[0], config.wcet_ratio[1]) * wcet1,
            Criticality::Low => 0.0,
        };

        tasks.push(Task::new(TaskId(i), criticality, period, wcet1, wcet2));
    }
    Ok(tasks)
}

/// Allocate the resource arena with empty assignment lists.
pub fn generate_resources(count: usize) -> Vec<Resource> {
    (0..count).map(|i| Resource::new(ResourceId(i))).collect()
}

/// Randomly assign resources to tasks.
///
/// Each task draws a usage count from the `resource_usage` range and
/// takes that many distinct resources from a fresh random permutation.
/// Both sides of the task-resource relation are recorded.
pub fn assign_resources(
    config: &Config,
    tasks: &mut [Task],
    resources: &mut [Resource],
    rng: &mut Rng,
) {
    for task in tasks {
        let count = rng.range_inclusive(config.resource_usage[0], config.resource_usage[1]);
        let order = rng.permutation(resources.len());
        for &ri in order.iter().take(count) {
            task.resources.push(ResourceId(ri));
            resources[ri].tasks.push(task.id);
        }
    }
}

/// Place critical sections inside each task's wcet1 window.
///
/// The total section time is a random fraction (bounded by `cs_factor`)
/// of wcet1, split across the sections with UUnifast; the remaining free
/// time is split into gaps before, between, and after them. Sections are
/// laid out sequentially with a cursor walk, so they are pairwise
/// disjoint by construction. Resources repeat round-robin when a task has
/// more sections than resources. Tasks without resources get no sections.
pub fn place_critical_sections(
    config: &Config,
    tasks: &mut [Task],
    rng: &mut Rng,
) -> Result<(), SynthError> {
    for task in tasks.iter_mut() {
        task.critical_sections.clear();
        if task.resources.is_empty() {
            continue;
        }

        let sections = rng
            .range_inclusive(config.cs_range[0], config.cs_range[1])
            .max(1);
        let total = task.wcet1 * rng.uniform() * config.cs_factor;
        if total <= 0.0 {
            continue;
        }

        let durations = uunifast(sections, total, rng)?;
        let free = (task.wcet1 - total).max(0.0);
        let gaps = split_or_zeros(sections + 1, free, rng)?;

        let mut cursor = gaps[0];
        for (i, &duration) in durations.iter().enumerate() {
            let resource = task.resources[i % task.resources.len()];
            task.critical_sections.push(CriticalSection {
                resource,
                start: cursor,
                duration,
            });
            cursor += duration + gaps[i + 1];
        }
    }
    Ok(())
}

/// UUnifast split that degrades to all-zero parts when there is nothing
/// to distribute.
fn split_or_zeros(parts: usize, total: f64, rng: &mut Rng) -> Result<Vec<f64>, SynthError> {
    if total <= 0.0 {
        Ok(vec![0.0; parts])
    } else {
        uunifast(parts, total, rng)
    }
}
