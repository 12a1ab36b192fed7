//! Small Cohort Demo
//!
//! Builds a synthetic twelve-student roster, runs the full assignment
//! pipeline and prints the resulting placements. Set `RUST_LOG=info` to
//! watch the pipeline milestones.
//!
//! Run with: cargo run -p small-cohort

use classplan::prelude::*;
use classplan::{LanguageRanking, RunReport, ScienceRanking};

fn student(
    id: u32,
    gender: Gender,
    languages: [u8; 5],
    sciences: [u8; 3],
    schoolmate: Option<u32>,
    test_score: f64,
) -> StudentRecord {
    StudentRecord {
        id: StudentId(id),
        gender,
        languages: LanguageRanking::new(languages.map(classplan::LanguageId)).unwrap(),
        sciences: ScienceRanking::new(sciences.map(classplan::ScienceId)).unwrap(),
        schoolmate: schoolmate.map(StudentId),
        test_score,
    }
}

fn build_roster() -> Roster {
    let records = vec![
        student(1, Gender::Female, [1, 2, 3, 4, 5], [1, 2, 3], None, 82.0),
        student(2, Gender::Male, [2, 1, 3, 5, 4], [2, 1, 3], Some(5), 74.5),
        student(3, Gender::Female, [3, 2, 1, 4, 5], [1, 2, 3], None, 91.0),
        student(4, Gender::Female, [1, 3, 2, 5, 4], [3, 1, 2], None, 66.0),
        student(5, Gender::Male, [2, 3, 1, 4, 5], [1, 2, 3], None, 79.5),
        student(6, Gender::Female, [5, 1, 2, 3, 4], [2, 3, 1], None, 85.0),
        student(7, Gender::Female, [1, 2, 4, 3, 5], [1, 3, 2], Some(4), 70.0),
        student(8, Gender::Male, [3, 1, 2, 5, 4], [2, 1, 3], None, 88.0),
        student(9, Gender::Female, [4, 2, 1, 3, 5], [1, 2, 3], None, 77.0),
        student(10, Gender::Female, [2, 1, 4, 5, 3], [3, 2, 1], None, 69.5),
        student(11, Gender::Female, [1, 4, 2, 3, 5], [1, 2, 3], None, 93.0),
        student(12, Gender::Female, [5, 2, 3, 1, 4], [2, 3, 1], None, 72.0),
    ];
    Roster::new(records).expect("demo roster is valid")
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    println!("Classplan Small Cohort Demo");
    println!("===========================\n");

    let roster = build_roster();
    let config = PlanConfig::default()
        .with_num_classes(3)
        .with_max_class_size(5);

    println!(
        "Cohort: {} students, {} classes, capacity {} per class\n",
        roster.len(),
        config.cohort.num_classes,
        config.cohort.max_class_size
    );

    let planner = Planner::new(config.clone());
    let plan = match planner.plan(&roster) {
        Ok(plan) => plan,
        Err(err) => {
            eprintln!("No assignment: {err}");
            std::process::exit(1);
        }
    };

    println!(
        "Status: {} (objective {}, {} nodes in {} ms)\n",
        plan.status, plan.objective, plan.stats.nodes, plan.stats.elapsed_ms
    );
    println!(
        "Best-match science pair: {} and {}\n",
        plan.best_pair.lo(),
        plan.best_pair.hi()
    );

    println!("Student | Class | Language | Sciences");
    println!("--------+-------+----------+---------");
    for p in &plan.placements {
        println!(
            "{:>7} | {:>5} | {:>8} | {} and {}",
            p.student, p.class, p.language, p.sciences[0], p.sciences[1]
        );
    }

    println!("\nClass sizes:");
    for (class, count) in plan.class_sizes() {
        println!("  class {class}: {count} students");
    }

    let report = RunReport::new(&plan, &config);
    match report.to_toml_string() {
        Ok(rendered) => println!("\n--- run report (TOML) ---\n{rendered}"),
        Err(err) => eprintln!("report rendering failed: {err}"),
    }
}
