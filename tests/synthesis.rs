//! Synthesis-to-simulation properties over generated task sets.

use mcsim::{synthesize, Config, Criticality, Mode, Rng, SimParams, Simulator, TaskId};

fn config(yaml: &str) -> Config {
    Config::from_yaml(yaml).unwrap()
}

fn base_yaml() -> String {
    "\
num_resources: 3
num_tasks: 6
total_utility: 0.5
period_range: [10.0, 100.0]
deadline_ratio: [1.0, 1.0]
wcet_ratio: [0.2, 0.5]
high_ratio: 0.4
resource_usage: [0, 2]
cs_factor: 0.3
cs_range: [1, 2]
simulation_time: 200.0
"
    .to_string()
}

/// Identical config and seed produce byte-identical schedules and
/// identical event sequences.
#[test]
fn test_fixed_seed_is_reproducible() {
    let cfg = config(&base_yaml());

    let run = || {
        let mut rng = Rng::new(123);
        let (tasks, _) = synthesize(&cfg, &mut rng).unwrap();
        let params = SimParams {
            sim_time: cfg.simulation_time,
            dt: cfg.time_step,
            seed: 123,
        };
        Simulator::new(tasks, params).run()
    };

    let a = run();
    let b = run();

    assert_eq!(a.schedule.to_json().unwrap(), b.schedule.to_json().unwrap());
    assert_eq!(a.trace.events().len(), b.trace.events().len());
    for (x, y) in a.trace.events().iter().zip(b.trace.events()) {
        assert_eq!(x.time, y.time);
        assert_eq!(x.kind, y.kind);
    }
}

/// Same seed, same synthesized task set, field by field.
#[test]
fn test_synthesis_is_deterministic() {
    let cfg = config(&base_yaml());
    let mut rng_a = Rng::new(7);
    let mut rng_b = Rng::new(7);
    let (tasks_a, res_a) = synthesize(&cfg, &mut rng_a).unwrap();
    let (tasks_b, res_b) = synthesize(&cfg, &mut rng_b).unwrap();

    assert_eq!(tasks_a.len(), tasks_b.len());
    for (a, b) in tasks_a.iter().zip(&tasks_b) {
        assert_eq!(a.period, b.period);
        assert_eq!(a.wcet1, b.wcet1);
        assert_eq!(a.wcet2, b.wcet2);
        assert_eq!(a.criticality, b.criticality);
        assert_eq!(a.resources, b.resources);
        assert_eq!(a.critical_sections, b.critical_sections);
        assert_eq!(a.priority, b.priority);
        assert_eq!(a.preemption_level, b.preemption_level);
    }
    for (a, b) in res_a.iter().zip(&res_b) {
        assert_eq!(a.tasks, b.tasks);
        assert_eq!(a.ceiling, b.ceiling);
    }
}

/// A single task at half utilization runs alone, never misses, and never
/// switches modes.
#[test]
fn test_single_task_half_utilization() {
    let cfg = config(
        "\
num_resources: 0
num_tasks: 1
total_utility: 0.5
period_range: [10.0, 10.0]
deadline_ratio: [1.0, 1.0]
wcet_ratio: [0.2, 0.5]
high_ratio: 0.0
resource_usage: [0, 0]
cs_factor: 0.3
cs_range: [1, 2]
simulation_time: 30.0
",
    );
    let mut rng = Rng::new(1);
    let (tasks, _) = synthesize(&cfg, &mut rng).unwrap();
    assert_eq!(tasks.len(), 1);
    assert!((tasks[0].utilization() - 0.5).abs() < 1e-12);
    assert_eq!(tasks[0].period, 10.0);
    assert_eq!(tasks[0].criticality, Criticality::Low);

    let result = Simulator::new(
        tasks,
        SimParams {
            sim_time: cfg.simulation_time,
            dt: cfg.time_step,
            seed: 1,
        },
    )
    .run();
    assert_eq!(result.trace.miss_count(TaskId(0)), 0);
    assert!(result.trace.mode_switch_at().is_none());
    assert_eq!(result.trace.completion_count(TaskId(0)), 3);
}

/// With high_ratio zero there are no HC tasks and the mode never
/// switches, whatever the load.
#[test]
fn test_zero_high_ratio_never_switches() {
    let yaml = base_yaml().replace("high_ratio: 0.4", "high_ratio: 0.0");
    let cfg = config(&yaml);
    for seed in 0..10 {
        let mut rng = Rng::new(seed);
        let (tasks, _) = synthesize(&cfg, &mut rng).unwrap();
        assert!(tasks.iter().all(|t| t.criticality == Criticality::Low));
        assert!(tasks.iter().all(|t| t.wcet2 == 0.0));

        let result = Simulator::new(
            tasks,
            SimParams {
                sim_time: 100.0,
                dt: cfg.time_step,
                seed,
            },
        )
        .run();
        assert!(result.trace.mode_switch_at().is_none());
        assert_eq!(result.final_mode, Mode::Normal);
        assert_eq!(result.trace.drop_count(), 0);
    }
}

/// With no resources every task has an empty critical-section list and
/// the scheduler degenerates to pure EDF.
#[test]
fn test_no_resources_is_pure_edf() {
    let yaml = base_yaml()
        .replace("num_resources: 3", "num_resources: 0")
        .replace("resource_usage: [0, 2]", "resource_usage: [0, 0]");
    let cfg = config(&yaml);
    for seed in 0..10 {
        let mut rng = Rng::new(seed);
        let (tasks, resources) = synthesize(&cfg, &mut rng).unwrap();
        assert!(resources.is_empty());
        for task in &tasks {
            assert!(task.critical_sections.is_empty());
            // Without resources the preemption level is just the base
            // priority, so SRP never shields anything.
            assert_eq!(task.preemption_level, task.priority);
        }

        let result = Simulator::new(
            tasks,
            SimParams {
                sim_time: 100.0,
                dt: cfg.time_step,
                seed,
            },
        )
        .run();
        assert_eq!(result.trace.summary().cs_entries, 0);
        assert_eq!(result.trace.summary().cs_exits, 0);
    }
}

/// A lightly loaded LC-only system with short critical sections and
/// deadlines much longer than any blocking keeps every deadline.
#[test]
fn test_light_load_all_lc_meets_deadlines() {
    let yaml = base_yaml()
        .replace("high_ratio: 0.4", "high_ratio: 0.0")
        .replace("total_utility: 0.5", "total_utility: 0.3")
        .replace("period_range: [10.0, 100.0]", "period_range: [50.0, 100.0]")
        .replace("cs_factor: 0.3", "cs_factor: 0.1");
    let cfg = config(&yaml);
    let mut rng = Rng::new(3);
    let (tasks, _) = synthesize(&cfg, &mut rng).unwrap();
    let n = tasks.len();
    let result = Simulator::new(
        tasks,
        SimParams {
            sim_time: 200.0,
            dt: cfg.time_step,
            seed: 3,
        },
    )
    .run();
    for i in 0..n {
        assert_eq!(result.trace.miss_count(TaskId(i)), 0, "task {i} missed");
    }
}
