//! Depth-first branch-and-bound with constraint propagation.
//!
//! Domains are single-word bitsets (the model caps values at 63).
//! Propagation runs every constraint filter to a fixpoint; search branches
//! on the registered search variables smallest-domain-first and prunes on
//! an objective upper bound that is exact per indicator channel.

use std::collections::HashMap;
use std::time::Instant;

use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use smallvec::SmallVec;
use tracing::{debug, info};

use classplan_model::{ConstraintKind, Model, VarId};

use crate::engine::{SolveEngine, SolveOptions, ValueOrdering};
use crate::outcome::{SearchStats, SolveOutcome, SolveStatus};

/// A variable domain as a bitset: bit `v` set means value `v` is possible.
type Dom = u64;

/// The default conforming engine.
///
/// Complete over the model vocabulary: a finished search either proves
/// optimality of its incumbent or infeasibility of the constraint set.
/// Limits degrade the verdict to FEASIBLE or UNKNOWN, never to a partial
/// assignment.
#[derive(Debug, Clone, Copy, Default)]
pub struct BranchBoundSolver;

impl BranchBoundSolver {
    pub fn new() -> Self {
        Self
    }
}

impl SolveEngine for BranchBoundSolver {
    fn solve(&self, model: &Model, options: &SolveOptions) -> SolveOutcome {
        let started = Instant::now();
        info!(
            event = "search_start",
            vars = model.num_vars(),
            constraints = model.constraints().len(),
            search_vars = model.search_vars().len(),
        );

        let mut search = Search::new(model, options, started);
        let initial: Vec<Dom> = model
            .vars()
            .iter()
            .map(|def| mask_range(def.lb, def.ub))
            .collect();
        search.explore(initial);

        let stats = SearchStats {
            nodes: search.nodes,
            backtracks: search.backtracks,
            elapsed_ms: started.elapsed().as_millis() as u64,
        };
        let status = match (search.stopped, search.best.is_some()) {
            (false, true) => SolveStatus::Optimal,
            (false, false) => SolveStatus::Infeasible,
            (true, true) => SolveStatus::Feasible,
            (true, false) => SolveStatus::Unknown,
        };
        let (objective, values) = match search.best {
            Some((objective, values)) => (Some(objective), Some(values)),
            None => (None, None),
        };

        info!(
            event = "search_end",
            status = %status,
            nodes = stats.nodes,
            backtracks = stats.backtracks,
            elapsed_ms = stats.elapsed_ms,
            objective = objective.unwrap_or(0),
        );
        SolveOutcome {
            status,
            values,
            objective,
            stats,
        }
    }
}

/// Precomputed objective structure for one channel variable: the summed
/// gain of choosing each of its values, via the indicator booleans
/// reified on it.
struct ChannelGroup {
    var: VarId,
    gains: Vec<(i32, i64)>,
}

struct Search<'m> {
    model: &'m Model,
    value_order: Vec<Vec<i32>>,
    channel_groups: Vec<ChannelGroup>,
    loose_terms: Vec<(i64, VarId)>,
    deadline: Option<Instant>,
    node_limit: Option<u64>,
    nodes: u64,
    backtracks: u64,
    best: Option<(i64, Vec<i32>)>,
    stopped: bool,
}

impl<'m> Search<'m> {
    fn new(model: &'m Model, options: &SolveOptions, started: Instant) -> Self {
        let (channel_groups, loose_terms) = split_objective(model);
        let value_order = build_value_order(model, options, &channel_groups);
        Self {
            model,
            value_order,
            channel_groups,
            loose_terms,
            deadline: options.time_limit.map(|limit| started + limit),
            node_limit: options.node_limit,
            nodes: 0,
            backtracks: 0,
            best: None,
            stopped: false,
        }
    }

    fn explore(&mut self, mut doms: Vec<Dom>) {
        if self.stopped {
            return;
        }
        self.nodes += 1;
        if self.hit_limit() {
            self.stopped = true;
            return;
        }
        if propagate(self.model, &mut doms).is_err() {
            self.backtracks += 1;
            return;
        }
        if let Some((incumbent, _)) = &self.best {
            if self.bound(&doms) <= *incumbent {
                self.backtracks += 1;
                return;
            }
        }
        let Some(var) = self.pick_var(&doms) else {
            self.record(&doms);
            return;
        };
        let domain = doms[var.index()];
        let order: SmallVec<[i32; 8]> = self.value_order[var.index()]
            .iter()
            .copied()
            .filter(|&value| contains(domain, value))
            .collect();
        for value in order {
            if self.stopped {
                return;
            }
            let mut child = doms.clone();
            child[var.index()] = 1u64 << value;
            self.explore(child);
        }
    }

    fn hit_limit(&self) -> bool {
        if let Some(limit) = self.node_limit {
            if self.nodes > limit {
                return true;
            }
        }
        if let Some(deadline) = self.deadline {
            // Batched: node 1 and every 64th node after it.
            if self.nodes & 63 == 1 && Instant::now() >= deadline {
                return true;
            }
        }
        false
    }

    /// Smallest unfixed search-variable domain; auxiliary variables only
    /// when every search variable is fixed but propagation left one open.
    fn pick_var(&self, doms: &[Dom]) -> Option<VarId> {
        let mut best: Option<(u32, VarId)> = None;
        for &var in self.model.search_vars() {
            let size = doms[var.index()].count_ones();
            if size > 1 && best.map_or(true, |(b, _)| size < b) {
                best = Some((size, var));
            }
        }
        if best.is_none() {
            for var in self.model.var_ids() {
                let size = doms[var.index()].count_ones();
                if size > 1 && best.map_or(true, |(b, _)| size < b) {
                    best = Some((size, var));
                }
            }
        }
        best.map(|(_, var)| var)
    }

    /// Upper bound on the objective over every completion of `doms`.
    ///
    /// Exact per channel variable (the gain of its best remaining value);
    /// terms outside any channel contribute their independent maximum.
    fn bound(&self, doms: &[Dom]) -> i64 {
        let mut total = self.model.objective().offset();
        for group in &self.channel_groups {
            let domain = doms[group.var.index()];
            let mut covered: Dom = 0;
            let mut best: Option<i64> = None;
            for &(value, gain) in &group.gains {
                if contains(domain, value) {
                    covered |= 1u64 << value;
                    best = Some(best.map_or(gain, |b| b.max(gain)));
                }
            }
            if domain & !covered != 0 {
                // Some remaining value carries no gain at all.
                best = Some(best.map_or(0, |b| b.max(0)));
            }
            total += best.unwrap_or(0);
        }
        for &(coeff, var) in &self.loose_terms {
            let domain = doms[var.index()];
            let extreme = if coeff > 0 {
                dom_max(domain)
            } else {
                dom_min(domain)
            };
            total += coeff * i64::from(extreme);
        }
        total
    }

    fn record(&mut self, doms: &[Dom]) {
        let values: Vec<i32> = doms.iter().map(|&d| dom_min(d)).collect();
        let objective = self.model.objective().evaluate(&values);
        let improves = self
            .best
            .as_ref()
            .map_or(true, |(incumbent, _)| objective > *incumbent);
        if improves {
            debug!(event = "incumbent", objective, node = self.nodes);
            self.best = Some((objective, values));
        }
    }
}

/// Partitions the objective into per-channel gains and loose terms.
///
/// A term belongs to a channel when its variable is the literal of exactly
/// one reified equality; choosing the channel value then contributes the
/// summed gain of that value's literals, which makes the bound exact per
/// channel.
fn split_objective(model: &Model) -> (Vec<ChannelGroup>, Vec<(i64, VarId)>) {
    let mut lit_channel: HashMap<VarId, Option<(VarId, i32)>> = HashMap::new();
    for constraint in model.constraints() {
        if let ConstraintKind::IffEq { lit, var, value } = constraint.kind {
            lit_channel
                .entry(lit)
                .and_modify(|slot| *slot = None)
                .or_insert(Some((var, value)));
        }
    }

    let mut gains: HashMap<VarId, HashMap<i32, i64>> = HashMap::new();
    let mut loose = Vec::new();
    for &(coeff, term_var) in model.objective().terms() {
        match lit_channel.get(&term_var) {
            Some(Some((channel, value))) => {
                *gains
                    .entry(*channel)
                    .or_default()
                    .entry(*value)
                    .or_insert(0) += coeff;
            }
            _ => loose.push((coeff, term_var)),
        }
    }

    let mut groups: Vec<ChannelGroup> = gains
        .into_iter()
        .map(|(var, by_value)| {
            let mut gains: Vec<(i32, i64)> = by_value.into_iter().collect();
            gains.sort_unstable();
            ChannelGroup { var, gains }
        })
        .collect();
    groups.sort_unstable_by_key(|group| group.var);
    (groups, loose)
}

/// Per-variable value orders for branching.
fn build_value_order(
    model: &Model,
    options: &SolveOptions,
    channel_groups: &[ChannelGroup],
) -> Vec<Vec<i32>> {
    let mut orders: Vec<Vec<i32>> = model
        .vars()
        .iter()
        .map(|def| (def.lb..=def.ub).collect())
        .collect();
    match options.ordering {
        ValueOrdering::Ascending => {}
        ValueOrdering::ObjectiveGain => {
            for group in channel_groups {
                let by_value: HashMap<i32, i64> = group.gains.iter().copied().collect();
                orders[group.var.index()].sort_by_key(|value| {
                    (-by_value.get(value).copied().unwrap_or(0), *value)
                });
            }
        }
        ValueOrdering::Shuffled { seed } => {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            for order in &mut orders {
                order.shuffle(&mut rng);
            }
        }
    }
    orders
}

struct Conflict;

fn mask_range(lb: i32, ub: i32) -> Dom {
    debug_assert!((0..=63).contains(&lb) && lb <= ub && ub <= 63);
    let width = (ub - lb + 1) as u32;
    let ones = if width == 64 { !0u64 } else { (1u64 << width) - 1 };
    ones << lb
}

fn contains(d: Dom, v: i32) -> bool {
    (0..64).contains(&v) && d >> v & 1 == 1
}

fn fixed_value(d: Dom) -> Option<i32> {
    (d.count_ones() == 1).then(|| d.trailing_zeros() as i32)
}

fn dom_min(d: Dom) -> i32 {
    d.trailing_zeros() as i32
}

fn dom_max(d: Dom) -> i32 {
    63 - d.leading_zeros() as i32
}

fn set(doms: &mut [Dom], var: VarId, narrowed: Dom) -> Result<bool, Conflict> {
    if narrowed == 0 {
        return Err(Conflict);
    }
    if doms[var.index()] != narrowed {
        doms[var.index()] = narrowed;
        Ok(true)
    } else {
        Ok(false)
    }
}

/// Runs every constraint filter to a fixpoint.
fn propagate(model: &Model, doms: &mut [Dom]) -> Result<(), Conflict> {
    loop {
        let mut changed = false;
        for constraint in model.constraints() {
            changed |= filter(&constraint.kind, doms)?;
        }
        if !changed {
            return Ok(());
        }
    }
}

fn filter(kind: &ConstraintKind, doms: &mut [Dom]) -> Result<bool, Conflict> {
    let mut changed = false;
    match kind {
        ConstraintKind::EqVar(x, y) => {
            let meet = doms[x.index()] & doms[y.index()];
            changed |= set(doms, *x, meet)?;
            changed |= set(doms, *y, meet)?;
        }
        ConstraintKind::NeVar(x, y) => {
            if let Some(v) = fixed_value(doms[x.index()]) {
                changed |= set(doms, *y, doms[y.index()] & !(1u64 << v))?;
            }
            if let Some(v) = fixed_value(doms[y.index()]) {
                changed |= set(doms, *x, doms[x.index()] & !(1u64 << v))?;
            }
        }
        ConstraintKind::EqConst(x, value) => {
            if !(0..=63).contains(value) {
                return Err(Conflict);
            }
            changed |= set(doms, *x, doms[x.index()] & (1u64 << value))?;
        }
        ConstraintKind::SumLe { terms, bound } => {
            let committed: i64 = terms
                .iter()
                .map(|t| i64::from(dom_min(doms[t.index()])))
                .sum();
            if committed > *bound {
                return Err(Conflict);
            }
            if committed == *bound {
                // Every remaining term is forced to its minimum.
                for t in terms {
                    let d = doms[t.index()];
                    if fixed_value(d).is_none() {
                        changed |= set(doms, *t, 1u64 << dom_min(d))?;
                    }
                }
            }
        }
        ConstraintKind::SumEqVar { terms, target } => {
            let lo: i64 = terms
                .iter()
                .map(|t| i64::from(dom_min(doms[t.index()])))
                .sum();
            let hi: i64 = terms
                .iter()
                .map(|t| i64::from(dom_max(doms[t.index()])))
                .sum();
            let window = if lo > 63 || hi < 0 {
                0
            } else {
                mask_range(lo.max(0) as i32, hi.min(63) as i32)
            };
            changed |= set(doms, *target, doms[target.index()] & window)?;
            if let Some(t) = fixed_value(doms[target.index()]) {
                let t = i64::from(t);
                if lo == t {
                    for term in terms {
                        let d = doms[term.index()];
                        if fixed_value(d).is_none() {
                            changed |= set(doms, *term, 1u64 << dom_min(d))?;
                        }
                    }
                } else if hi == t {
                    for term in terms {
                        let d = doms[term.index()];
                        if fixed_value(d).is_none() {
                            changed |= set(doms, *term, 1u64 << dom_max(d))?;
                        }
                    }
                }
            }
        }
        ConstraintKind::IffEq { lit, var, value } => {
            if !(0..=63).contains(value) {
                // The equality can never hold.
                changed |= set(doms, *lit, doms[lit.index()] & 0b01)?;
                return Ok(changed);
            }
            match fixed_value(doms[lit.index()]) {
                Some(1) => changed |= set(doms, *var, doms[var.index()] & (1u64 << value))?,
                Some(_) => changed |= set(doms, *var, doms[var.index()] & !(1u64 << value))?,
                None => {}
            }
            if !contains(doms[var.index()], *value) {
                changed |= set(doms, *lit, doms[lit.index()] & 0b01)?;
            } else if fixed_value(doms[var.index()]) == Some(*value) {
                changed |= set(doms, *lit, doms[lit.index()] & 0b10)?;
            }
        }
        ConstraintKind::IffAnd { lit, operands } => {
            if fixed_value(doms[lit.index()]) == Some(1) {
                for op in operands {
                    changed |= set(doms, *op, doms[op.index()] & 0b10)?;
                }
            }
            let any_false = operands
                .iter()
                .any(|op| fixed_value(doms[op.index()]) == Some(0));
            let all_true = operands
                .iter()
                .all(|op| fixed_value(doms[op.index()]) == Some(1));
            if any_false {
                changed |= set(doms, *lit, doms[lit.index()] & 0b01)?;
            } else if all_true {
                changed |= set(doms, *lit, doms[lit.index()] & 0b10)?;
            } else if fixed_value(doms[lit.index()]) == Some(0) {
                let open: SmallVec<[VarId; 4]> = operands
                    .iter()
                    .copied()
                    .filter(|op| fixed_value(doms[op.index()]).is_none())
                    .collect();
                if let &[only] = open.as_slice() {
                    // All other operands are 1, so this one carries the 0.
                    changed |= set(doms, only, doms[only.index()] & 0b01)?;
                }
            }
        }
    }
    Ok(changed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn solve(model: &Model, options: &SolveOptions) -> SolveOutcome {
        BranchBoundSolver::new().solve(model, options)
    }

    #[test]
    fn equality_chain_is_solved_by_propagation_alone() {
        let mut model = Model::new();
        let x = model.new_int_var("x", 0, 9).unwrap();
        let y = model.new_int_var("y", 0, 9).unwrap();
        let z = model.new_int_var("z", 0, 9).unwrap();
        model.post("test", ConstraintKind::EqVar(x, y));
        model.post("test", ConstraintKind::EqVar(y, z));
        model.post("test", ConstraintKind::EqConst(z, 4));

        let outcome = solve(&model, &SolveOptions::default());
        assert_eq!(outcome.status, SolveStatus::Optimal);
        assert_eq!(outcome.values.unwrap(), vec![4, 4, 4]);
        assert_eq!(outcome.stats.nodes, 1);
    }

    #[test]
    fn contradictory_constants_are_infeasible() {
        let mut model = Model::new();
        let x = model.new_int_var("x", 0, 1).unwrap();
        model.post("test", ConstraintKind::EqConst(x, 0));
        model.post("test", ConstraintKind::EqConst(x, 1));

        let outcome = solve(&model, &SolveOptions::default());
        assert_eq!(outcome.status, SolveStatus::Infeasible);
        assert!(outcome.values.is_none());
        assert!(outcome.objective.is_none());
    }

    #[test]
    fn disequality_with_objective_picks_the_better_side() {
        let mut model = Model::new();
        let x = model.new_int_var("x", 0, 1).unwrap();
        let y = model.new_int_var("y", 0, 1).unwrap();
        model.post("test", ConstraintKind::NeVar(x, y));
        model.add_objective_term(1, y);

        let outcome = solve(&model, &SolveOptions::default());
        assert_eq!(outcome.status, SolveStatus::Optimal);
        assert_eq!(outcome.objective, Some(1));
        assert_eq!(outcome.values.unwrap(), vec![0, 1]);
    }

    #[test]
    fn sum_le_caps_the_reward() {
        let mut model = Model::new();
        let bools: Vec<VarId> = (0..3).map(|i| model.new_bool_var(format!("b{i}"))).collect();
        model.post(
            "test",
            ConstraintKind::SumLe {
                terms: bools.clone(),
                bound: 1,
            },
        );
        for &b in &bools {
            model.add_objective_term(1, b);
        }

        let outcome = solve(&model, &SolveOptions::default());
        assert_eq!(outcome.status, SolveStatus::Optimal);
        assert_eq!(outcome.objective, Some(1));
        let values = outcome.values.unwrap();
        assert_eq!(values.iter().sum::<i32>(), 1);
    }

    #[test]
    fn reified_equality_channels_both_directions() {
        let mut model = Model::new();
        let x = model.new_int_var("x", 1, 3).unwrap();
        let lit = model.equals_indicator(x, 2);
        model.post("test", ConstraintKind::EqConst(lit, 1));

        let outcome = solve(&model, &SolveOptions::default());
        assert_eq!(outcome.status, SolveStatus::Optimal);
        assert_eq!(outcome.values.unwrap()[x.index()], 2);

        // And the reverse: excluding the value drives the literal to 0.
        let mut model = Model::new();
        let x = model.new_int_var("x", 1, 3).unwrap();
        let lit = model.equals_indicator(x, 2);
        model.post("test", ConstraintKind::EqConst(x, 3));
        let outcome = solve(&model, &SolveOptions::default());
        assert_eq!(outcome.status, SolveStatus::Optimal);
        assert_eq!(outcome.values.unwrap()[lit.index()], 0);
    }

    #[test]
    fn conjunction_literal_follows_operands() {
        let mut model = Model::new();
        let a = model.new_bool_var("a");
        let b = model.new_bool_var("b");
        let lit = model.new_bool_var("lit");
        model.post(
            "test",
            ConstraintKind::IffAnd {
                lit,
                operands: vec![a, b],
            },
        );
        model.post("test", ConstraintKind::EqConst(lit, 1));
        let outcome = solve(&model, &SolveOptions::default());
        assert_eq!(outcome.status, SolveStatus::Optimal);
        assert_eq!(outcome.values.unwrap(), vec![1, 1, 1]);

        let mut model = Model::new();
        let a = model.new_bool_var("a");
        let b = model.new_bool_var("b");
        let lit = model.new_bool_var("lit");
        model.post(
            "test",
            ConstraintKind::IffAnd {
                lit,
                operands: vec![a, b],
            },
        );
        model.post("test", ConstraintKind::EqConst(lit, 0));
        model.post("test", ConstraintKind::EqConst(a, 1));
        let outcome = solve(&model, &SolveOptions::default());
        assert_eq!(outcome.status, SolveStatus::Optimal);
        assert_eq!(outcome.values.unwrap()[b.index()], 0);
    }

    #[test]
    fn boolean_sum_equality_propagates_both_ways() {
        let mut model = Model::new();
        let b1 = model.new_bool_var("b1");
        let b2 = model.new_bool_var("b2");
        let target = model.new_bool_var("t");
        model.post(
            "test",
            ConstraintKind::SumEqVar {
                terms: vec![b1, b2],
                target,
            },
        );
        model.post("test", ConstraintKind::EqConst(target, 0));
        let outcome = solve(&model, &SolveOptions::default());
        assert_eq!(outcome.status, SolveStatus::Optimal);
        assert_eq!(outcome.values.unwrap(), vec![0, 0, 0]);

        let mut model = Model::new();
        let b1 = model.new_bool_var("b1");
        let b2 = model.new_bool_var("b2");
        let target = model.new_bool_var("t");
        model.post(
            "test",
            ConstraintKind::SumEqVar {
                terms: vec![b1, b2],
                target,
            },
        );
        model.post("test", ConstraintKind::EqConst(target, 1));
        model.post("test", ConstraintKind::EqConst(b1, 0));
        let outcome = solve(&model, &SolveOptions::default());
        assert_eq!(outcome.status, SolveStatus::Optimal);
        assert_eq!(outcome.values.unwrap()[b2.index()], 1);
    }

    #[test]
    fn gain_ordering_finds_the_best_channel_value_first() {
        let mut model = Model::new();
        let x = model.new_int_var("x", 1, 3).unwrap();
        model.mark_search_var(x);
        let one = model.equals_indicator(x, 1);
        let two = model.equals_indicator(x, 2);
        let three = model.equals_indicator(x, 3);
        model.add_objective_term(5, one);
        model.add_objective_term(9, two);
        model.add_objective_term(2, three);

        let outcome = solve(&model, &SolveOptions::default());
        assert_eq!(outcome.status, SolveStatus::Optimal);
        assert_eq!(outcome.objective, Some(9));
        assert_eq!(outcome.values.unwrap()[x.index()], 2);
    }

    #[test]
    fn zero_time_limit_is_unknown() {
        let mut model = Model::new();
        let x = model.new_int_var("x", 0, 5).unwrap();
        let y = model.new_int_var("y", 0, 5).unwrap();
        model.post("test", ConstraintKind::NeVar(x, y));

        let options = SolveOptions {
            time_limit: Some(Duration::ZERO),
            ..SolveOptions::default()
        };
        let outcome = solve(&model, &options);
        assert_eq!(outcome.status, SolveStatus::Unknown);
        assert!(outcome.values.is_none());
    }

    #[test]
    fn node_limit_keeps_the_incumbent_as_feasible() {
        let mut model = Model::new();
        let x = model.new_int_var("x", 0, 5).unwrap();
        let y = model.new_int_var("y", 0, 5).unwrap();
        model.add_objective_term(1, x);
        model.add_objective_term(1, y);

        // Enough nodes to reach a first leaf, far too few to finish.
        let options = SolveOptions {
            node_limit: Some(10),
            ordering: ValueOrdering::Ascending,
            ..SolveOptions::default()
        };
        let outcome = solve(&model, &options);
        assert_eq!(outcome.status, SolveStatus::Feasible);
        assert!(outcome.objective.is_some());
        assert!(outcome.values.is_some());

        // Zero nodes cannot even produce an incumbent.
        let options = SolveOptions {
            node_limit: Some(0),
            ..SolveOptions::default()
        };
        let outcome = solve(&model, &options);
        assert_eq!(outcome.status, SolveStatus::Unknown);
    }

    #[test]
    fn shuffled_ordering_is_reproducible() {
        let build = || {
            let mut model = Model::new();
            let x = model.new_int_var("x", 0, 3).unwrap();
            let y = model.new_int_var("y", 0, 3).unwrap();
            model.post("test", ConstraintKind::NeVar(x, y));
            model.add_objective_term(2, x);
            model
        };
        let options = SolveOptions {
            ordering: ValueOrdering::Shuffled { seed: 42 },
            ..SolveOptions::default()
        };
        let first = solve(&build(), &options);
        let second = solve(&build(), &options);
        assert_eq!(first.status, SolveStatus::Optimal);
        assert_eq!(first.objective, second.objective);
        assert_eq!(first.values, second.values);
    }
}
