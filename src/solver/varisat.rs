use varisat::ExtendFormula;

use crate::cnf::SatFormat;
use crate::cnf::cnf::SatEncoding;
use crate::error::EncodingError;

use super::solution::{Solution, Status};

/// Solves a hard-only encoding in-process. Gives the same [`Solution`] shape
/// an external solver would, with `OptimumFound` meaning satisfiable.
pub fn solve_embedded(enc: &SatEncoding) -> Result<Solution, EncodingError> {
    if !enc.soft().is_empty() {
        return Err(EncodingError::SoftClausesInCnf(enc.soft().len()));
    }

    let mut solver = varisat::Solver::new();
    let vars = (0..enc.literal_count())
        .map(|_| solver.new_var())
        .collect::<Vec<_>>();

    for clause in enc.hard().clauses() {
        let lits = clause
            .lits
            .iter()
            .map(|&l| to_lit(&vars, l))
            .collect::<Result<Vec<_>, _>>()?;
        solver.add_clause(&lits);
    }

    let status = match solver.solve() {
        Ok(true) => Status::OptimumFound,
        Ok(false) => Status::Unsatisfiable,
        Err(_) => Status::Unknown,
    };

    let mut assignments = Vec::new();
    if status == Status::OptimumFound {
        assignments = vec![false; vars.len()];
        for lit in solver.model().unwrap_or_default() {
            if let Some(slot) = assignments.get_mut(lit.var().index()) {
                *slot = lit.is_positive();
            }
        }
    }

    Ok(Solution {
        format: SatFormat::Cnf,
        status,
        cost: 0,
        assignments,
    })
}

fn to_lit(vars: &[varisat::Var], lit: i32) -> Result<varisat::Lit, EncodingError> {
    let idx = (lit.unsigned_abs() as usize)
        .checked_sub(1)
        .ok_or(EncodingError::ZeroLiteral)?;
    let var = vars.get(idx).ok_or(EncodingError::UnknownValue(lit))?;
    Ok(varisat::Lit::from_var(*var, lit > 0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_model() {
        let mut enc = SatEncoding::new();
        enc.add_hard(vec![1, 2]).expect("hard");
        enc.add_hard(vec![-1]).expect("hard");
        let sol = solve_embedded(&enc).expect("solve");
        assert_eq!(sol.status, Status::OptimumFound);
        assert_eq!(sol.assignments, vec![false, true]);
        assert!(enc.evaluate(&sol.assignments).hard_satisfied);
    }

    #[test]
    fn detects_unsat() {
        let mut enc = SatEncoding::new();
        enc.add_hard(vec![1]).expect("hard");
        enc.add_hard(vec![-1]).expect("hard");
        let sol = solve_embedded(&enc).expect("solve");
        assert_eq!(sol.status, Status::Unsatisfiable);
        assert!(sol.assignments.is_empty());
    }

    #[test]
    fn refuses_soft_clauses() {
        let mut enc = SatEncoding::new();
        enc.add_soft(2, vec![1]).expect("soft");
        assert_eq!(
            solve_embedded(&enc),
            Err(EncodingError::SoftClausesInCnf(1))
        );
    }
}
