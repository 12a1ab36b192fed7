//! Builds the assignment model for a validated roster.
//!
//! One class variable, one language variable and two ordered science-slot
//! variables are declared per student, then the nine hard-constraint
//! families are posted. No feasibility pre-check happens here; a
//! contradictory rule set is the engine's to discover.

use classplan_config::PlanConfig;
use classplan_core::{
    Placement, Roster, SciencePair, StudentId, LANGUAGE_COUNT, SCIENCE_COUNT,
};

use crate::constraint::{family, ConstraintKind};
use crate::error::ModelError;
use crate::model::Model;
use crate::var::VarId;

/// The decision variables of one student.
#[derive(Debug, Clone, Copy)]
pub struct StudentVars {
    pub id: StudentId,
    pub class: VarId,
    pub language: VarId,
    pub science: [VarId; 2],
}

/// A fully constrained model plus the per-student handles needed to decode
/// an engine's value vector back into placements.
#[derive(Debug)]
pub struct AssignmentModel {
    pub(crate) model: Model,
    pub(crate) students: Vec<StudentVars>,
}

impl AssignmentModel {
    /// Declares all variables and posts every hard-constraint family.
    ///
    /// The science pair gating the privileged class must already be chosen;
    /// it is immutable for the rest of the run.
    pub fn build(
        roster: &Roster,
        best_pair: SciencePair,
        config: &PlanConfig,
    ) -> Result<Self, ModelError> {
        let mut model = Model::new();
        let num_classes = i32::from(config.cohort.num_classes);
        let class_capacity = i64::from(config.cohort.max_class_size);

        let mut students = Vec::with_capacity(roster.len());
        for record in roster.students() {
            let id = record.id;
            let class = model.new_int_var(format!("s{id}_class"), 1, num_classes)?;
            let language = model.new_int_var(format!("s{id}_lang"), 1, LANGUAGE_COUNT as i32)?;
            let science = [
                model.new_int_var(format!("s{id}_sci1"), 1, SCIENCE_COUNT as i32)?,
                model.new_int_var(format!("s{id}_sci2"), 1, SCIENCE_COUNT as i32)?,
            ];
            for var in [class, language, science[0], science[1]] {
                model.mark_search_var(var);
            }
            students.push(StudentVars {
                id,
                class,
                language,
                science,
            });
        }

        // 1. At most max_class_size students per class.
        for class in 1..=num_classes {
            let terms: Vec<VarId> = students
                .iter()
                .map(|s| model.equals_indicator(s.class, class))
                .collect();
            model.post(
                family::CLASS_CAPACITY,
                ConstraintKind::SumLe {
                    terms,
                    bound: class_capacity,
                },
            );
        }

        // 2. A language may span at most two classes.
        for language in 1..=LANGUAGE_COUNT as i32 {
            let terms: Vec<VarId> = students
                .iter()
                .map(|s| model.equals_indicator(s.language, language))
                .collect();
            model.post(
                family::LANGUAGE_CAPACITY,
                ConstraintKind::SumLe {
                    terms,
                    bound: 2 * class_capacity,
                },
            );
        }

        // 3. A subject may be taken at most 3 * max_class_size times,
        //    counting both slots.
        for subject in 1..=SCIENCE_COUNT as i32 {
            let terms: Vec<VarId> = students
                .iter()
                .flat_map(|s| s.science)
                .map(|slot| model.equals_indicator(slot, subject))
                .collect();
            model.post(
                family::SCIENCE_CAPACITY,
                ConstraintKind::SumLe {
                    terms,
                    bound: 3 * class_capacity,
                },
            );
        }

        // 4. The two slots of one student name different subjects.
        for s in &students {
            model.post(
                family::SLOT_DISTINCTNESS,
                ConstraintKind::NeVar(s.science[0], s.science[1]),
            );
        }

        // 5. A declared schoolmate shares the class. Links may form chains
        //    or cycles; equality composes transitively in the engine.
        for (record, s) in roster.students().iter().zip(&students) {
            if let Some(mate) = record.schoolmate {
                let mate_position = roster
                    .position_of(mate)
                    .expect("roster validation resolves schoolmate links");
                model.post(
                    family::SCHOOLMATE,
                    ConstraintKind::EqVar(s.class, students[mate_position].class),
                );
            }
        }

        // 6. Privileged class membership is equivalent to holding the best
        //    pair in either slot order.
        let pair_lo = i32::from(best_pair.lo().0);
        let pair_hi = i32::from(best_pair.hi().0);
        let privileged = i32::from(config.rules.privileged_class.0);
        for s in &students {
            let forward = {
                let slot1_lo = model.equals_indicator(s.science[0], pair_lo);
                let slot2_hi = model.equals_indicator(s.science[1], pair_hi);
                let lit = model.new_bool_var(format!("s{}_pair_fwd", s.id));
                model.post(
                    family::PRIVILEGED_PAIR,
                    ConstraintKind::IffAnd {
                        lit,
                        operands: vec![slot1_lo, slot2_hi],
                    },
                );
                lit
            };
            let reverse = {
                let slot1_hi = model.equals_indicator(s.science[0], pair_hi);
                let slot2_lo = model.equals_indicator(s.science[1], pair_lo);
                let lit = model.new_bool_var(format!("s{}_pair_rev", s.id));
                model.post(
                    family::PRIVILEGED_PAIR,
                    ConstraintKind::IffAnd {
                        lit,
                        operands: vec![slot1_hi, slot2_lo],
                    },
                );
                lit
            };
            let in_privileged = model.equals_indicator(s.class, privileged);
            model.post(
                family::PRIVILEGED_PAIR,
                ConstraintKind::SumEqVar {
                    terms: vec![forward, reverse],
                    target: in_privileged,
                },
            );
        }

        // 7. The configured gender subgroup shares one class, anchored to
        //    its first member.
        let mut subgroup = roster
            .students()
            .iter()
            .zip(&students)
            .filter(|(record, _)| record.gender == config.rules.gender_subgroup)
            .map(|(_, s)| s.class);
        if let Some(anchor) = subgroup.next() {
            for class in subgroup {
                model.post(family::GENDER_COHESION, ConstraintKind::EqVar(class, anchor));
            }
        }

        // 8. Ranking the designated language first forces it. Fires for
        //    that one language only.
        let forced = i32::from(config.rules.forced_language.0);
        for (record, s) in roster.students().iter().zip(&students) {
            if record.languages.top() == config.rules.forced_language {
                model.post(family::FORCED_LANGUAGE, ConstraintKind::EqConst(s.language, forced));
            }
        }

        // 9. The coupled language and the coupled class imply each other,
        //    for every student.
        let coupled_language = i32::from(config.rules.coupled_language.0);
        let coupled_class = i32::from(config.rules.coupled_class.0);
        for s in &students {
            let has_language = model.equals_indicator(s.language, coupled_language);
            let in_class = model.equals_indicator(s.class, coupled_class);
            model.post(
                family::LANGUAGE_CLASS_COUPLING,
                ConstraintKind::EqVar(has_language, in_class),
            );
        }

        Ok(Self { model, students })
    }

    /// The underlying model.
    pub fn model(&self) -> &Model {
        &self.model
    }

    /// Per-student variable handles, in roster order.
    pub fn students(&self) -> &[StudentVars] {
        &self.students
    }

    /// Decodes an engine value vector into per-student placements.
    ///
    /// The vector must assign every declared variable, which is what a
    /// feasible engine outcome guarantees.
    pub fn decode(&self, values: &[i32]) -> Vec<Placement> {
        self.students
            .iter()
            .map(|s| Placement {
                student: s.id,
                class: classplan_core::ClassId(values[s.class.index()] as u8),
                language: classplan_core::LanguageId(values[s.language.index()] as u8),
                sciences: [
                    classplan_core::ScienceId(values[s.science[0].index()] as u8),
                    classplan_core::ScienceId(values[s.science[1].index()] as u8),
                ],
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use classplan_core::ScienceId;
    use classplan_test::cohorts;

    fn count_family(model: &AssignmentModel, name: &str) -> usize {
        model
            .model()
            .constraints()
            .iter()
            .filter(|c| c.family == name)
            .count()
    }

    #[test]
    fn declares_four_search_vars_per_student() {
        let roster = cohorts::plain_roster(4);
        let config = PlanConfig::default();
        let pair = SciencePair::new(ScienceId(1), ScienceId(2)).unwrap();
        let built = AssignmentModel::build(&roster, pair, &config).unwrap();
        assert_eq!(built.model().search_vars().len(), 4 * 4);
        assert_eq!(built.students().len(), 4);
    }

    #[test]
    fn posts_expected_family_counts() {
        let roster = cohorts::plain_roster(5);
        let config = PlanConfig::default();
        let pair = SciencePair::new(ScienceId(2), ScienceId(3)).unwrap();
        let built = AssignmentModel::build(&roster, pair, &config).unwrap();

        // Capacities: one per class, language and subject.
        assert_eq!(count_family(&built, family::CLASS_CAPACITY), 3);
        assert_eq!(count_family(&built, family::LANGUAGE_CAPACITY), 5);
        assert_eq!(count_family(&built, family::SCIENCE_CAPACITY), 3);
        // Per-student families.
        assert_eq!(count_family(&built, family::SLOT_DISTINCTNESS), 5);
        assert_eq!(count_family(&built, family::PRIVILEGED_PAIR), 3 * 5);
        assert_eq!(count_family(&built, family::LANGUAGE_CLASS_COUPLING), 5);
        // plain_roster declares no schoolmates and an all-female cohort.
        assert_eq!(count_family(&built, family::SCHOOLMATE), 0);
        assert_eq!(count_family(&built, family::GENDER_COHESION), 0);
    }

    #[test]
    fn schoolmate_links_become_class_equalities() {
        let roster = cohorts::paired_roster();
        let config = PlanConfig::default();
        let pair = SciencePair::new(ScienceId(1), ScienceId(2)).unwrap();
        let built = AssignmentModel::build(&roster, pair, &config).unwrap();
        assert_eq!(count_family(&built, family::SCHOOLMATE), 1);
        let eq = built
            .model()
            .constraints()
            .iter()
            .find(|c| c.family == family::SCHOOLMATE)
            .unwrap();
        assert!(matches!(eq.kind, ConstraintKind::EqVar(_, _)));
    }

    #[test]
    fn forced_language_posts_only_for_top_rankers() {
        let roster = cohorts::forced_language_roster();
        let config = PlanConfig::default();
        let pair = SciencePair::new(ScienceId(1), ScienceId(2)).unwrap();
        let built = AssignmentModel::build(&roster, pair, &config).unwrap();
        // Exactly one student ranks language 4 first.
        assert_eq!(count_family(&built, family::FORCED_LANGUAGE), 1);
    }

    #[test]
    fn capacity_bounds_follow_config() {
        let roster = cohorts::plain_roster(3);
        let config = PlanConfig::default().with_max_class_size(7);
        let pair = SciencePair::new(ScienceId(1), ScienceId(3)).unwrap();
        let built = AssignmentModel::build(&roster, pair, &config).unwrap();
        for constraint in built.model().constraints() {
            if let ConstraintKind::SumLe { bound, .. } = &constraint.kind {
                match constraint.family {
                    family::CLASS_CAPACITY => assert_eq!(*bound, 7),
                    family::LANGUAGE_CAPACITY => assert_eq!(*bound, 14),
                    family::SCIENCE_CAPACITY => assert_eq!(*bound, 21),
                    other => panic!("unexpected SumLe family {other}"),
                }
            }
        }
    }
}
