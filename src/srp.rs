//! Scheduling-parameter derivation: Rate-Monotonic priorities, resource
//! ceilings, and Stack Resource Policy preemption levels.

use crate::resource::Resource;
use crate::task::Task;
use crate::types::{Priority, CEILING_FLOOR};

/// Assign Rate-Monotonic static priorities: shorter period means a
/// numerically smaller (higher) priority. Ties break on task id. The
/// arena order is left untouched; only the priority fields are written.
pub fn assign_priorities(tasks: &mut [Task]) {
    let mut order: Vec<usize> = (0..tasks.len()).collect();
    order.sort_by(|&a, &b| {
        tasks[a]
            .period
            .total_cmp(&tasks[b].period)
            .then(tasks[a].id.cmp(&tasks[b].id))
    });
    for (rank, &idx) in order.iter().enumerate() {
        tasks[idx].priority = (rank + 1) as Priority;
    }
}

/// Compute each resource's ceiling: the smallest priority rank among its
/// assigned tasks, or [`CEILING_FLOOR`] when unused.
pub fn compute_ceilings(tasks: &[Task], resources: &mut [Resource]) {
    debug_assert!(tasks.iter().enumerate().all(|(i, t)| t.id.0 == i));
    for resource in resources {
        resource.ceiling = resource
            .tasks
            .iter()
            .map(|&tid| tasks[tid.0].priority)
            .min()
            .unwrap_or(CEILING_FLOOR);
    }
}

/// Assign each task its preemption level: the minimum of its base
/// priority and the ceilings of all resources it uses.
pub fn assign_preemption_levels(tasks: &mut [Task], resources: &[Resource]) {
    debug_assert!(resources.iter().enumerate().all(|(i, r)| r.id.0 == i));
    for task in tasks {
        let mut level = task.priority;
        for &rid in &task.resources {
            level = level.min(resources[rid.0].ceiling);
        }
        task.preemption_level = level;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::Criticality;
    use crate::types::{ResourceId, TaskId};

    fn task(id: usize, period: f64) -> Task {
        Task::new(TaskId(id), Criticality::Low, period, period / 10.0, 0.0)
    }

    #[test]
    fn test_rate_monotonic_order() {
        let mut tasks = vec![task(0, 50.0), task(1, 10.0), task(2, 30.0)];
        assign_priorities(&mut tasks);
        assert_eq!(tasks[0].priority, 3);
        assert_eq!(tasks[1].priority, 1);
        assert_eq!(tasks[2].priority, 2);
    }

    #[test]
    fn test_equal_periods_tie_break_on_id() {
        let mut tasks = vec![task(0, 20.0), task(1, 20.0), task(2, 10.0)];
        assign_priorities(&mut tasks);
        assert_eq!(tasks[2].priority, 1);
        assert_eq!(tasks[0].priority, 2);
        assert_eq!(tasks[1].priority, 3);
    }

    #[test]
    fn test_ceiling_is_min_assigned_priority() {
        let mut tasks = vec![task(0, 10.0), task(1, 20.0), task(2, 30.0)];
        assign_priorities(&mut tasks);

        let mut resources = vec![Resource::new(ResourceId(0)), Resource::new(ResourceId(1))];
        resources[0].tasks = vec![TaskId(1), TaskId(2)];
        compute_ceilings(&tasks, &mut resources);

        assert_eq!(resources[0].ceiling, 2);
        // Unused resource keeps the sentinel ceiling.
        assert_eq!(resources[1].ceiling, CEILING_FLOOR);
    }

    #[test]
    fn test_preemption_level_is_min_of_priority_and_ceilings() {
        let mut tasks = vec![task(0, 10.0), task(1, 20.0), task(2, 30.0)];
        assign_priorities(&mut tasks);

        let mut resources = vec![Resource::new(ResourceId(0))];
        resources[0].tasks = vec![TaskId(0), TaskId(2)];
        tasks[0].resources = vec![ResourceId(0)];
        tasks[2].resources = vec![ResourceId(0)];
        compute_ceilings(&tasks, &mut resources);
        assign_preemption_levels(&mut tasks, &resources);

        // Ceiling of the shared resource is task 0's priority (1).
        assert_eq!(resources[0].ceiling, 1);
        assert_eq!(tasks[0].preemption_level, 1);
        // Task 1 uses no resource: level equals its base priority.
        assert_eq!(tasks[1].preemption_level, 2);
        // Task 2 is elevated to the shared ceiling.
        assert_eq!(tasks[2].preemption_level, 1);
    }
}
