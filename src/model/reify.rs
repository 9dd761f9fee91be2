//! Shared linear reification helpers. `cp_sat`'s builder exposes booleans,
//! `add_le`/`add_ge`/`add_eq`, and builds a weighted sum via
//! `LinearExpr: FromIterator<(i64, BoolVar)>` (the same construction the
//! teacher's two-stage solve uses for its credit-sum expressions); no
//! `OnlyEnforceIf`-style reified-clause API was used anywhere in the teacher
//! codebase. Every reification here is therefore a fresh bool var bounded by
//! linear inequalities expressed as single weighted sums, the same shape the
//! teacher used to reify GenEd option variables.

use cp_sat::builder::{BoolVar, CpModelBuilder, LinearExpr};

/// `Σ vars`, built via the weighted-pair `FromIterator` the teacher's solve
/// uses for its per-semester credit sums.
pub fn sum_expr(vars: &[BoolVar]) -> LinearExpr {
    vars.iter().map(|v| (1i64, v.clone())).collect()
}

/// A signed weighted sum: `Σ coeff_i * term_i`. The single place arithmetic
/// between multiple literals is ever required; every caller that needs to
/// combine several groups under one objective builds one `terms` vector and
/// collects it once, rather than adding `LinearExpr` values together.
pub fn weighted_sum(terms: &[(i64, BoolVar)]) -> LinearExpr {
    terms.iter().map(|(c, v)| (*c, v.clone())).collect()
}

pub fn at_most_one(model: &mut CpModelBuilder, vars: &[BoolVar]) {
    if vars.is_empty() {
        return;
    }
    model.add_le(sum_expr(vars), LinearExpr::from(1));
}

pub fn exactly(model: &mut CpModelBuilder, vars: &[BoolVar], n: i64) {
    model.add_eq(sum_expr(vars), LinearExpr::from(n));
}

pub fn force_zero(model: &mut CpModelBuilder, vars: &[BoolVar]) {
    if vars.is_empty() {
        return;
    }
    model.add_eq(sum_expr(vars), LinearExpr::from(0));
}

/// Pins a bool var to 1. The mirror of [`force_zero`], used to hard-code a
/// combined-activity indicator as constant-true at slots already occupied by
/// a fixed (already-solved) lab assignment (§4.3).
pub fn force_one(model: &mut CpModelBuilder, var: &BoolVar) {
    model.add_eq(LinearExpr::from(var.clone()), LinearExpr::from(1));
}

/// `x ⇒ x_twin`, encoded as the linear inequality `x ≤ x_twin` (§4.2 rule 2).
pub fn implies(model: &mut CpModelBuilder, x: &BoolVar, x_twin: &BoolVar) {
    model.add_le(LinearExpr::from(x.clone()), LinearExpr::from(x_twin.clone()));
}

/// A fresh bool var `result == OR(vars)`, enforced in both directions:
/// `result ≥ v` for each `v`, and `result ≤ Σvars`. Used for the lecture
/// phase's per-slot combined-activity indicator, which the post-break and
/// spread penalties need to read in both truth directions.
pub fn reify_or(model: &mut CpModelBuilder, vars: &[BoolVar]) -> BoolVar {
    let result = model.new_bool_var();
    for v in vars {
        model.add_ge(LinearExpr::from(result.clone()), LinearExpr::from(v.clone()));
    }
    model.add_le(LinearExpr::from(result.clone()), sum_expr(vars));
    result
}

/// A fresh bool var `result` such that `result == AND(positives) AND NOT(OR(negatives))`,
/// enforced in both directions. Used for gap detection: `gap = busy_{i-1} AND
/// busy_{i+1} AND NOT busy_i`.
///
/// Every inequality here compares two independently built `LinearExpr`
/// values (never adds or subtracts one `LinearExpr` from another): `result ≤
/// 1 - n` is rearranged to `result + n ≤ 1` so the left side is a single
/// weighted sum, and `result ≥ Σpositives - Σnegatives - (m-1)` (`m` =
/// `positives.len()`) is rearranged to `result - Σpositives + Σnegatives ≥
/// n - (k-1)` (`n = negatives.len()`, `k = m + n`) for the same reason.
pub fn reify_conjunction(
    model: &mut CpModelBuilder,
    positives: &[BoolVar],
    negatives: &[BoolVar],
) -> BoolVar {
    let result = model.new_bool_var();
    for p in positives {
        model.add_le(LinearExpr::from(result.clone()), LinearExpr::from(p.clone()));
    }
    for n in negatives {
        let lhs = weighted_sum(&[(1, result.clone()), (1, n.clone())]);
        model.add_le(lhs, LinearExpr::from(1));
    }

    let k = (positives.len() + negatives.len()) as i64;
    let mut terms = Vec::with_capacity(1 + positives.len() + negatives.len());
    terms.push((1, result.clone()));
    for p in positives {
        terms.push((-1, p.clone()));
    }
    for n in negatives {
        terms.push((1, n.clone()));
    }
    model.add_ge(weighted_sum(&terms), LinearExpr::from(negatives.len() as i64 - (k - 1)));
    result
}

/// A fresh bool var bounded above by `OR(vars)`: `result ≤ Σvars`. One-directional
/// on purpose — used only inside a minimize/maximize objective where the search
/// direction itself pushes `result` to 1 whenever any underlying var is 1, so the
/// reverse inequality would be redundant machinery for a soft term.
pub fn reify_or_upper_bound(model: &mut CpModelBuilder, vars: &[BoolVar]) -> BoolVar {
    let result = model.new_bool_var();
    if vars.is_empty() {
        model.add_eq(LinearExpr::from(result.clone()), LinearExpr::from(0));
    } else {
        model.add_le(LinearExpr::from(result.clone()), sum_expr(vars));
    }
    result
}

/// A fresh bool var bounded below by the overflow of `vars` past 1:
/// `result ≥ Σvars − 1`, rearranged as `result - Σvars ≥ -1` so the bound
/// side is a single weighted sum. Used for the defensive duplicate-room
/// conflict penalty, which should always price out at 0 under a valid
/// solution.
pub fn reify_overflow_past_one(model: &mut CpModelBuilder, vars: &[BoolVar]) -> BoolVar {
    let result = model.new_bool_var();
    let mut terms = Vec::with_capacity(1 + vars.len());
    terms.push((1, result.clone()));
    for v in vars {
        terms.push((-1, v.clone()));
    }
    model.add_ge(weighted_sum(&terms), LinearExpr::from(-1));
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use cp_sat::proto::{CpSolverStatus, SatParameters};

    fn solve(model: CpModelBuilder) -> cp_sat::proto::CpSolverResponse {
        let response = model.solve_with_parameters(&SatParameters::default());
        assert_eq!(response.status(), CpSolverStatus::Optimal);
        response
    }

    #[test]
    fn implies_forbids_x_true_twin_false() {
        let mut model = CpModelBuilder::default();
        let x = model.new_bool_var();
        let twin = model.new_bool_var();
        implies(&mut model, &x, &twin);
        force_one(&mut model, &x);
        let response = solve(model);
        assert!(twin.solution_value(&response));
    }

    #[test]
    fn reify_or_is_true_iff_any_input_is_true() {
        let mut model = CpModelBuilder::default();
        let a = model.new_bool_var();
        let b = model.new_bool_var();
        let result = reify_or(&mut model, &[a.clone(), b.clone()]);
        force_zero(&mut model, &[a.clone(), b.clone()]);
        let response = solve(model);
        assert!(!result.solution_value(&response));
    }

    #[test]
    fn reify_or_forces_true_when_an_input_is_forced_true() {
        let mut model = CpModelBuilder::default();
        let a = model.new_bool_var();
        let b = model.new_bool_var();
        let result = reify_or(&mut model, &[a.clone(), b.clone()]);
        force_one(&mut model, &a);
        let response = solve(model);
        assert!(result.solution_value(&response));
    }

    #[test]
    fn reify_conjunction_detects_a_gap() {
        let mut model = CpModelBuilder::default();
        let prev = model.new_bool_var();
        let curr = model.new_bool_var();
        let next = model.new_bool_var();
        let gap = reify_conjunction(&mut model, &[prev.clone(), next.clone()], &[curr.clone()]);
        force_one(&mut model, &prev);
        force_one(&mut model, &next);
        force_zero(&mut model, &[curr.clone()]);
        let response = solve(model);
        assert!(gap.solution_value(&response));
    }

    #[test]
    fn reify_conjunction_is_false_when_the_middle_is_busy() {
        let mut model = CpModelBuilder::default();
        let prev = model.new_bool_var();
        let curr = model.new_bool_var();
        let next = model.new_bool_var();
        let gap = reify_conjunction(&mut model, &[prev.clone(), next.clone()], &[curr.clone()]);
        force_one(&mut model, &prev);
        force_one(&mut model, &next);
        force_one(&mut model, &curr);
        let response = solve(model);
        assert!(!gap.solution_value(&response));
    }

    #[test]
    fn at_most_one_rejects_two_simultaneous_trues() {
        let mut model = CpModelBuilder::default();
        let a = model.new_bool_var();
        let b = model.new_bool_var();
        at_most_one(&mut model, &[a.clone(), b.clone()]);
        force_one(&mut model, &a);
        force_one(&mut model, &b);
        let response = model.solve_with_parameters(&SatParameters::default());
        assert_eq!(response.status(), CpSolverStatus::Infeasible);
    }
}
