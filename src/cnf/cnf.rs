use crate::error::EncodingError;
use crate::proto::{LitTranslator, ProtoEncoding};

use super::clause::{Clause, ClauseCollection, check_comment};

/// Low-level encoding over signed DIMACS literals. Tracks the largest
/// variable seen so the problem line can be written without a second pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SatEncoding {
    literal_count: u32,
    comments: Vec<String>,
    hard: ClauseCollection<i32>,
    soft: ClauseCollection<i32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Evaluation {
    pub hard_satisfied: bool,
    pub violated_soft: usize,
    pub cost: u64,
}

impl SatEncoding {
    pub fn new() -> Self {
        Self::default()
    }

    /// Numbers every clause of `proto` through `translator`. Comments keep
    /// their anchors. The literal count covers every translated literal, even
    /// ones that ended up in no clause.
    pub fn from_proto(proto: &ProtoEncoding, translator: &LitTranslator) -> Result<Self, EncodingError> {
        let hard = proto.hard().try_map(|c| translator.translate_clause(c))?;
        let soft = proto.soft().try_map(|c| translator.translate_clause(c))?;

        let mut out = Self {
            literal_count: u32::try_from(translator.len()).map_err(|_| EncodingError::IndexOverflow)?,
            comments: proto.comments().to_vec(),
            hard,
            soft,
        };
        let widest = out
            .hard
            .clauses()
            .chain(out.soft.clauses())
            .flat_map(|c| c.lits.iter())
            .map(|l| l.unsigned_abs())
            .max()
            .unwrap_or(0);
        out.literal_count = out.literal_count.max(widest);
        Ok(out)
    }

    pub fn literal_count(&self) -> u32 {
        self.literal_count
    }

    pub fn hard(&self) -> &ClauseCollection<i32> {
        &self.hard
    }

    pub fn soft(&self) -> &ClauseCollection<i32> {
        &self.soft
    }

    pub fn comments(&self) -> &[String] {
        &self.comments
    }

    pub fn clause_count(&self) -> usize {
        self.hard.len() + self.soft.len()
    }

    /// The WCNF hard-clause weight: one more than the total soft cost.
    pub fn top(&self) -> u64 {
        self.soft.total_cost().saturating_add(1)
    }

    pub fn comment(&mut self, text: impl Into<String>) -> Result<(), EncodingError> {
        self.comments.push(check_comment(text.into())?);
        Ok(())
    }

    pub fn comment_hard(&mut self, text: impl Into<String>) -> Result<(), EncodingError> {
        self.hard.comment(text)
    }

    pub fn comment_soft(&mut self, text: impl Into<String>) -> Result<(), EncodingError> {
        self.soft.comment(text)
    }

    pub fn add_hard(&mut self, lits: Vec<i32>) -> Result<(), EncodingError> {
        self.add_clause(Clause::hard(lits))
    }

    pub fn add_soft(&mut self, cost: u64, lits: Vec<i32>) -> Result<(), EncodingError> {
        self.add_clause(Clause::soft(cost, lits))
    }

    pub fn add_clause(&mut self, clause: Clause<i32>) -> Result<(), EncodingError> {
        for &lit in &clause.lits {
            if lit == 0 {
                return Err(EncodingError::ZeroLiteral);
            }
            self.literal_count = self.literal_count.max(lit.unsigned_abs());
        }
        if clause.is_hard() {
            self.hard.add(clause);
        } else {
            self.soft.add(clause);
        }
        Ok(())
    }

    pub fn eval_lit_partial(lit: i32, assignment: &[bool]) -> Option<bool> {
        let idx = (lit.unsigned_abs() as usize).checked_sub(1)?;
        assignment.get(idx).map(|&v| if lit > 0 { v } else { !v })
    }

    pub fn eval_clause_partial(clause: &[i32], assignment: &[bool]) -> Option<bool> {
        let mut any_unknown = false;
        for &lit in clause {
            match Self::eval_lit_partial(lit, assignment) {
                Some(true) => return Some(true),
                Some(false) => {}
                None => any_unknown = true,
            }
        }
        if any_unknown { None } else { Some(false) }
    }

    /// Checks `assignment` (variable `i + 1` at position `i`) against the
    /// encoding. Clauses that can't be decided count as violated.
    pub fn evaluate(&self, assignment: &[bool]) -> Evaluation {
        let hard_satisfied = self
            .hard
            .clauses()
            .all(|c| Self::eval_clause_partial(&c.lits, assignment) == Some(true));
        let mut violated_soft = 0usize;
        let mut cost = 0u64;
        for c in self.soft.clauses() {
            if Self::eval_clause_partial(&c.lits, assignment) != Some(true) {
                violated_soft += 1;
                cost = cost.saturating_add(c.cost);
            }
        }
        Evaluation {
            hard_satisfied,
            violated_soft,
            cost,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::proto::{Family, Numbering};

    #[test]
    fn tracks_largest_magnitude() {
        let mut enc = SatEncoding::new();
        enc.add_hard(vec![1, -7]).expect("hard");
        enc.add_soft(2, vec![3]).expect("soft");
        assert_eq!(enc.literal_count(), 7);
        assert_eq!(enc.clause_count(), 2);
        assert_eq!(enc.add_hard(vec![2, 0]), Err(EncodingError::ZeroLiteral));
        assert_eq!(enc.hard().len(), 1);
    }

    #[test]
    fn top_exceeds_soft_total() {
        let mut enc = SatEncoding::new();
        assert_eq!(enc.top(), 1);
        enc.add_soft(3, vec![1]).expect("soft");
        enc.add_soft(5, vec![-1]).expect("soft");
        assert_eq!(enc.top(), 9);
    }

    #[test]
    fn evaluate_reports_cost() {
        let mut enc = SatEncoding::new();
        enc.add_hard(vec![1, 2]).expect("hard");
        enc.add_soft(3, vec![-1]).expect("soft");
        enc.add_soft(5, vec![-2]).expect("soft");
        let e = enc.evaluate(&[true, false]);
        assert!(e.hard_satisfied);
        assert_eq!(e.violated_soft, 1);
        assert_eq!(e.cost, 3);
        let e = enc.evaluate(&[false, false]);
        assert!(!e.hard_satisfied);
    }

    #[test]
    fn short_assignment_counts_undecided_as_violated() {
        let mut enc = SatEncoding::new();
        enc.add_hard(vec![1, 2]).expect("hard");
        enc.add_hard(vec![-1, 3]).expect("hard");
        enc.add_soft(3, vec![-1]).expect("soft");
        enc.add_soft(5, vec![-2]).expect("soft");
        let e = enc.evaluate(&[true]);
        // [1, 2] is decided by variable 1, [-1, 3] and [-2] are not
        assert!(!e.hard_satisfied);
        assert_eq!(e.violated_soft, 2);
        assert_eq!(e.cost, 8);
        assert_eq!(enc.evaluate(&[]).cost, 8);
    }

    #[test]
    fn from_proto_keeps_comments_and_counts_unused() {
        let mut proto = ProtoEncoding::new();
        proto.comment("header").expect("comment");
        let mut x = proto.var1().expect("var");
        let a = x.lit(&mut proto, 0).expect("lit");
        x.lit(&mut proto, 1).expect("lit");
        proto.comment_hard("first").expect("comment");
        proto.add_hard([a.neg()]).expect("hard");
        let t = LitTranslator::from_encoding(&proto, Numbering::Registration).expect("translator");
        let enc = SatEncoding::from_proto(&proto, &t).expect("translate");
        assert_eq!(enc.literal_count(), 2);
        assert_eq!(enc.comments(), ["header".to_string()]);
        let lines = enc.hard().lines(|c| format!("{:?}", c.lits)).collect::<Vec<_>>();
        assert_eq!(lines, vec!["c first", "[-1]"]);
    }
}
