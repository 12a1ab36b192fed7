//! The solver-ready model: variables, constraints and objective.

use std::collections::HashMap;

use crate::constraint::{family, Constraint, ConstraintKind};
use crate::error::ModelError;
use crate::var::{VarDef, VarId};

/// Largest value a variable domain may reach, so engines can hold a domain
/// in one machine word.
pub const MAX_DOMAIN_VALUE: i32 = 63;

/// A linear objective over declared variables, to be maximized.
///
/// The constant offset carries the affine part of missed-top-choice
/// penalties, keeping every variable term a plain `coeff * var` product.
#[derive(Debug, Clone, Default)]
pub struct LinearObjective {
    terms: Vec<(i64, VarId)>,
    offset: i64,
}

impl LinearObjective {
    /// The `(coefficient, variable)` products.
    pub fn terms(&self) -> &[(i64, VarId)] {
        &self.terms
    }

    /// The constant added to every evaluation.
    pub fn offset(&self) -> i64 {
        self.offset
    }

    /// Evaluates the objective against a full value vector.
    pub fn evaluate(&self, values: &[i32]) -> i64 {
        self.offset
            + self
                .terms
                .iter()
                .map(|&(coeff, var)| coeff * values[var.index()] as i64)
                .sum::<i64>()
    }
}

/// A constraint model under construction.
///
/// Variables are declared once, constraints posted once; the model is then
/// handed to an engine and never mutated. Indicator variables created
/// through [`Model::equals_indicator`] are cached per `(variable, value)`
/// pair so every constraint family shares one boolean per condition.
///
/// # Examples
///
/// ```
/// use classplan_model::Model;
///
/// let mut model = Model::new();
/// let x = model.new_int_var("x", 1, 3).unwrap();
/// let is_two = model.equals_indicator(x, 2);
/// // Asking again returns the same boolean.
/// assert_eq!(model.equals_indicator(x, 2), is_two);
/// assert_eq!(model.num_vars(), 2);
/// ```
#[derive(Debug, Default)]
pub struct Model {
    vars: Vec<VarDef>,
    constraints: Vec<Constraint>,
    objective: LinearObjective,
    search_vars: Vec<VarId>,
    indicators: HashMap<(VarId, i32), VarId>,
}

impl Model {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares an integer variable over the contiguous domain `lb..=ub`.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::InvalidDomain`] for an empty domain or one
    /// outside `0..=63`.
    pub fn new_int_var(
        &mut self,
        name: impl Into<String>,
        lb: i32,
        ub: i32,
    ) -> Result<VarId, ModelError> {
        let name = name.into();
        if lb > ub || lb < 0 || ub > MAX_DOMAIN_VALUE {
            return Err(ModelError::InvalidDomain { name, lb, ub });
        }
        let id = VarId::new(self.vars.len());
        self.vars.push(VarDef { name, lb, ub });
        Ok(id)
    }

    /// Declares a 0/1 variable.
    pub fn new_bool_var(&mut self, name: impl Into<String>) -> VarId {
        let id = VarId::new(self.vars.len());
        self.vars.push(VarDef {
            name: name.into(),
            lb: 0,
            ub: 1,
        });
        id
    }

    /// Returns a boolean linked to `var == value` by a full reification,
    /// creating and posting it on first use.
    ///
    /// The boolean is shared: every caller asking for the same condition
    /// receives the same variable, so no family duplicates the channeling
    /// logic.
    pub fn equals_indicator(&mut self, var: VarId, value: i32) -> VarId {
        if let Some(&lit) = self.indicators.get(&(var, value)) {
            return lit;
        }
        let name = format!("{}_is_{}", self.vars[var.index()].name, value);
        let lit = self.new_bool_var(name);
        self.post(
            family::CHANNEL,
            ConstraintKind::IffEq { lit, var, value },
        );
        self.indicators.insert((var, value), lit);
        lit
    }

    /// Posts a constraint under the given family name.
    pub fn post(&mut self, family: &'static str, kind: ConstraintKind) {
        self.constraints.push(Constraint { family, kind });
    }

    /// Marks a variable as a branching target for the engine.
    ///
    /// Every other variable must be functionally determined by the search
    /// variables through the posted constraints.
    pub fn mark_search_var(&mut self, var: VarId) {
        self.search_vars.push(var);
    }

    /// Adds `coeff * var` to the objective.
    pub fn add_objective_term(&mut self, coeff: i64, var: VarId) {
        self.objective.terms.push((coeff, var));
    }

    /// Shifts the objective by a constant.
    pub fn add_objective_offset(&mut self, delta: i64) {
        self.objective.offset += delta;
    }

    pub fn num_vars(&self) -> usize {
        self.vars.len()
    }

    /// Handles of all declared variables, in declaration order.
    pub fn var_ids(&self) -> impl Iterator<Item = VarId> + '_ {
        (0..self.vars.len()).map(VarId::new)
    }

    pub fn var(&self, id: VarId) -> &VarDef {
        &self.vars[id.index()]
    }

    pub fn vars(&self) -> &[VarDef] {
        &self.vars
    }

    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    pub fn objective(&self) -> &LinearObjective {
        &self.objective
    }

    pub fn search_vars(&self) -> &[VarId] {
        &self.search_vars
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_bad_domains() {
        let mut model = Model::new();
        assert!(model.new_int_var("empty", 3, 2).is_err());
        assert!(model.new_int_var("negative", -1, 2).is_err());
        assert!(model.new_int_var("wide", 0, 64).is_err());
        assert!(model.new_int_var("ok", 0, 63).is_ok());
    }

    #[test]
    fn indicators_are_shared() {
        let mut model = Model::new();
        let x = model.new_int_var("x", 1, 5).unwrap();
        let a = model.equals_indicator(x, 3);
        let b = model.equals_indicator(x, 3);
        let c = model.equals_indicator(x, 4);
        assert_eq!(a, b);
        assert_ne!(a, c);
        // One channel constraint per distinct condition.
        let channels = model
            .constraints()
            .iter()
            .filter(|c| c.family == family::CHANNEL)
            .count();
        assert_eq!(channels, 2);
    }

    #[test]
    fn objective_evaluates_with_offset() {
        let mut model = Model::new();
        let x = model.new_int_var("x", 0, 5).unwrap();
        let b = model.new_bool_var("b");
        model.add_objective_term(2, x);
        model.add_objective_term(10, b);
        model.add_objective_offset(-7);
        let values = vec![3, 1];
        assert_eq!(model.objective().evaluate(&values), 2 * 3 + 10 - 7);
    }
}
