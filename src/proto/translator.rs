use std::collections::HashMap;
use std::fmt;

use crate::cnf::clause::Clause;
use crate::error::EncodingError;

use super::encoding::ProtoEncoding;
use super::literal::ProtoLit;

/// How a translator numbers the registered literals.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Numbering {
    /// Family allocation order, then registration order within each family.
    #[default]
    Registration,
    /// Sorted by `(variable, index)`. Costs a sort but gives stable,
    /// readable numbers.
    Sorted,
}

/// Bijection between non-negated [`ProtoLit`]s and DIMACS variables `1..`.
#[derive(Debug, Clone, Default)]
pub struct LitTranslator {
    forward: HashMap<ProtoLit, i32>,
    reverse: HashMap<i32, ProtoLit>,
}

impl LitTranslator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_encoding(enc: &ProtoEncoding, numbering: Numbering) -> Result<Self, EncodingError> {
        let mut lits = enc
            .registered_literals()
            .flat_map(|set| set.iter())
            .collect::<Vec<_>>();
        if numbering == Numbering::Sorted {
            lits.sort_by_key(|l| (l.variable(), l.index()));
        }

        let mut out = Self::new();
        out.forward.reserve(lits.len());
        out.reverse.reserve(lits.len());
        for (i, lit) in lits.into_iter().enumerate() {
            let value = i32::try_from(i + 1).map_err(|_| EncodingError::IndexOverflow)?;
            out.add(lit.clone(), value)?;
        }
        Ok(out)
    }

    /// Adds one translation by hand.
    pub fn add(&mut self, key: ProtoLit, value: i32) -> Result<(), EncodingError> {
        if value < 1 {
            return Err(EncodingError::NonPositiveValue(value));
        }
        if key.is_negated() {
            return Err(EncodingError::NegatedKey(key.to_string()));
        }
        if self.forward.contains_key(&key) {
            return Err(EncodingError::DuplicateKey(key.to_string()));
        }
        if self.reverse.contains_key(&value) {
            return Err(EncodingError::DuplicateValue(value));
        }
        self.forward.insert(key.clone(), value);
        self.reverse.insert(value, key);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.forward.len()
    }

    pub fn is_empty(&self) -> bool {
        self.forward.is_empty()
    }

    /// The positive number of `lit`, ignoring its polarity.
    pub fn value_of(&self, lit: &ProtoLit) -> Result<i32, EncodingError> {
        self.forward
            .get(lit)
            .copied()
            .ok_or_else(|| EncodingError::UnregisteredLiteral(lit.to_string()))
    }

    /// The DIMACS literal: negative when `lit` is negated.
    pub fn signed_value_of(&self, lit: &ProtoLit) -> Result<i32, EncodingError> {
        let v = self.value_of(lit)?;
        Ok(if lit.is_negated() { -v } else { v })
    }

    pub fn literal_of(&self, value: i32) -> Result<&ProtoLit, EncodingError> {
        self.reverse
            .get(&value)
            .ok_or(EncodingError::UnknownValue(value))
    }

    pub fn translate_clause(&self, clause: &Clause<ProtoLit>) -> Result<Clause<i32>, EncodingError> {
        let lits = clause
            .lits
            .iter()
            .map(|l| self.signed_value_of(l))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Clause {
            cost: clause.cost,
            lits,
        })
    }
}

impl fmt::Display for LitTranslator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut pairs = self.reverse.iter().collect::<Vec<_>>();
        pairs.sort_by_key(|(v, _)| **v);
        for (value, lit) in pairs {
            writeln!(f, "{lit} = {value}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::proto::family::Family;

    fn sample() -> ProtoEncoding {
        let mut enc = ProtoEncoding::new();
        let mut x = enc.var1().expect("var");
        let mut y = enc.var1().expect("var");
        y.lit(&mut enc, 5).expect("lit");
        x.lit(&mut enc, 2).expect("lit");
        x.lit(&mut enc, 0).expect("lit");
        y.lit(&mut enc, 1).expect("lit");
        enc
    }

    #[test]
    fn registration_order_groups_by_family() {
        let enc = sample();
        let t = LitTranslator::from_encoding(&enc, Numbering::Registration).expect("translator");
        let order = (1..=4)
            .map(|v| {
                let l = t.literal_of(v).expect("lit");
                (l.variable(), l.index())
            })
            .collect::<Vec<_>>();
        assert_eq!(order, vec![(0, 2), (0, 0), (1, 5), (1, 1)]);
    }

    #[test]
    fn sorted_order() {
        let enc = sample();
        let t = LitTranslator::from_encoding(&enc, Numbering::Sorted).expect("translator");
        let order = (1..=4)
            .map(|v| {
                let l = t.literal_of(v).expect("lit");
                (l.variable(), l.index())
            })
            .collect::<Vec<_>>();
        assert_eq!(order, vec![(0, 0), (0, 2), (1, 1), (1, 5)]);
        assert_eq!(t.literal_of(5), Err(EncodingError::UnknownValue(5)));
    }

    #[test]
    fn manual_add_validates() {
        let mut t = LitTranslator::new();
        let a = ProtoLit::new(0, 0).expect("lit");
        let b = ProtoLit::new(0, 1).expect("lit");
        assert_eq!(t.add(a.clone(), 0), Err(EncodingError::NonPositiveValue(0)));
        assert!(matches!(t.add(a.neg(), 1), Err(EncodingError::NegatedKey(_))));
        t.add(a.clone(), 1).expect("add");
        assert!(matches!(t.add(a.clone(), 2), Err(EncodingError::DuplicateKey(_))));
        assert_eq!(t.add(b.clone(), 1), Err(EncodingError::DuplicateValue(1)));
        assert!(matches!(
            t.value_of(&b),
            Err(EncodingError::UnregisteredLiteral(_))
        ));
        assert_eq!(t.signed_value_of(&a.neg()).expect("value"), -1);
    }

    #[test]
    fn display_lists_by_value() {
        let mut t = LitTranslator::new();
        let a = ProtoLit::new(0, 4).expect("lit").named("a", &[4]);
        let b = ProtoLit::new(1, 0).expect("lit");
        t.add(b, 2).expect("add");
        t.add(a, 1).expect("add");
        assert_eq!(t.to_string(), "a[4] = 1\n(1, 0) = 2\n");
        assert_eq!(LitTranslator::new().to_string(), "");
    }

    #[test]
    fn translates_clause_with_polarity() {
        let enc = sample();
        let t = LitTranslator::from_encoding(&enc, Numbering::Sorted).expect("translator");
        let a = ProtoLit::new(0, 2).expect("lit");
        let b = ProtoLit::new(1, 5).expect("lit");
        let clause = Clause::soft(4, vec![a.neg(), b]);
        assert_eq!(
            t.translate_clause(&clause).expect("translate"),
            Clause::soft(4, vec![-2, 4])
        );
    }
}
