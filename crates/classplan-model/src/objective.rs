//! Stratified preference objective.
//!
//! Rewards grow with a power of the rank distance so that one satisfied
//! top choice outweighs several satisfied lower choices, and a missed top
//! choice additionally costs a flat penalty. Penalties are encoded
//! affinely: `-P * (1 - indicator)` becomes `+P * indicator` plus a `-P`
//! constant, keeping the objective linear.

use classplan_config::WeightConfig;
use classplan_core::{Roster, LANGUAGE_COUNT, SCIENCE_COUNT};

use crate::builder::AssignmentModel;

/// Adds every per-student preference term to the model's objective.
///
/// Indicator booleans are shared with the capacity families through the
/// model's indicator cache, so this adds terms but no new channeling.
pub fn apply_preference_objective(
    assignment: &mut AssignmentModel,
    roster: &Roster,
    weights: &WeightConfig,
) {
    let students = assignment.students.clone();
    let model = &mut assignment.model;

    for (record, vars) in roster.students().iter().zip(&students) {
        for (position, &language) in record.languages.by_rank().iter().enumerate() {
            let rank = position + 1;
            let lit = model.equals_indicator(vars.language, i32::from(language.0));
            let reward = weights.language_importance * strat_weight(LANGUAGE_COUNT, rank, weights);
            if reward != 0 {
                model.add_objective_term(reward, lit);
            }
            if rank == 1 && weights.language_penalty != 0 {
                model.add_objective_term(weights.language_penalty, lit);
                model.add_objective_offset(-weights.language_penalty);
            }
        }

        for (position, &subject) in record.sciences.by_rank().iter().enumerate() {
            let rank = position + 1;
            let base = strat_weight(SCIENCE_COUNT, rank, weights);
            for slot in 0..2 {
                let lit = model.equals_indicator(vars.science[slot], i32::from(subject.0));
                let reward = weights.science_importance[slot] * base;
                if reward != 0 {
                    model.add_objective_term(reward, lit);
                }
                // Slot distinctness lets at most one slot hold the top
                // subject, so the two indicators sum to 0 or 1.
                if rank == 1 && weights.science_penalty != 0 {
                    model.add_objective_term(weights.science_penalty, lit);
                }
            }
            if rank == 1 && weights.science_penalty != 0 {
                model.add_objective_offset(-weights.science_penalty);
            }
        }
    }
}

/// `(domain - rank) ^ stratification`, the reward ladder for one rank.
fn strat_weight(domain: usize, rank: usize, weights: &WeightConfig) -> i64 {
    ((domain - rank) as i64).pow(weights.stratification)
}

#[cfg(test)]
mod tests {
    use super::*;
    use classplan_config::PlanConfig;
    use classplan_core::{SciencePair, ScienceId};
    use classplan_test::cohorts;

    #[test]
    fn offsets_accumulate_per_student() {
        let roster = cohorts::plain_roster(3);
        let config = PlanConfig::default();
        let pair = SciencePair::new(ScienceId(1), ScienceId(2)).unwrap();
        let mut built = AssignmentModel::build(&roster, pair, &config).unwrap();
        apply_preference_objective(&mut built, &roster, &config.weights);
        // Each student contributes -language_penalty - science_penalty.
        assert_eq!(built.model().objective().offset(), 3 * (-10 - 100));
    }

    #[test]
    fn top_choice_assignment_scores_maximum() {
        let roster = cohorts::plain_roster(1);
        let config = PlanConfig::default();
        let pair = SciencePair::new(ScienceId(1), ScienceId(2)).unwrap();
        let mut built = AssignmentModel::build(&roster, pair, &config).unwrap();
        apply_preference_objective(&mut built, &roster, &config.weights);

        let record = &roster.students()[0];
        let vars = built.students()[0];
        let mut values = vec![0i32; built.model().num_vars()];
        values[vars.class.index()] = 1;
        values[vars.language.index()] = i32::from(record.languages.top().0);
        values[vars.science[0].index()] = i32::from(record.sciences.by_rank()[0].0);
        values[vars.science[1].index()] = i32::from(record.sciences.by_rank()[1].0);
        // Resolve every indicator against the chosen assignment.
        for constraint in built.model().constraints() {
            if let crate::constraint::ConstraintKind::IffEq { lit, var, value } = constraint.kind {
                values[lit.index()] = i32::from(values[var.index()] == value);
            }
        }

        // Top language: 4^4; top science in slot 1: 2^4; second science in
        // slot 2: 1^4. Penalties: language avoided, science top covered by
        // slot 1 (+100 * 1 - 100 = 0).
        let expected = 256 + 16 + 1 + (10 - 10) + (100 - 100);
        assert_eq!(built.model().objective().evaluate(&values), expected);
    }

    #[test]
    fn missed_top_choices_cost_penalties() {
        let roster = cohorts::plain_roster(1);
        let config = PlanConfig::default();
        let pair = SciencePair::new(ScienceId(1), ScienceId(2)).unwrap();
        let mut built = AssignmentModel::build(&roster, pair, &config).unwrap();
        apply_preference_objective(&mut built, &roster, &config.weights);

        let record = &roster.students()[0];
        let vars = built.students()[0];
        let ranks = record.languages.by_rank();
        let sci = record.sciences.by_rank();
        let mut values = vec![0i32; built.model().num_vars()];
        values[vars.class.index()] = 2;
        // Second-choice language, sciences at ranks 2 and 3.
        values[vars.language.index()] = i32::from(ranks[1].0);
        values[vars.science[0].index()] = i32::from(sci[1].0);
        values[vars.science[1].index()] = i32::from(sci[2].0);
        for constraint in built.model().constraints() {
            if let crate::constraint::ConstraintKind::IffEq { lit, var, value } = constraint.kind {
                values[lit.index()] = i32::from(values[var.index()] == value);
            }
        }

        // Language rank 2: 3^4 - 10 penalty. Sciences: slot1 rank 2 gives
        // 1^4, slot2 rank 3 gives 0; top science missed entirely: -100.
        let expected = 81 - 10 + 1 + 0 - 100;
        assert_eq!(built.model().objective().evaluate(&values), expected);
    }
}
