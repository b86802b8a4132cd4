use std::sync::atomic::{AtomicU64, Ordering};

use indexmap::IndexSet;

use crate::cnf::clause::{Clause, ClauseCollection, check_comment};
use crate::error::EncodingError;

use super::family::{Var1, Var2, Var3, VarN};
use super::literal::{MAX_VARIABLES, ProtoLit};

static NEXT_ID: AtomicU64 = AtomicU64::new(0);

/// Clauses over [`ProtoLit`]s. Literals are registered per variable family
/// as they are fetched; the registration order later drives numbering.
/// Clones keep the id, so families of the original still address them.
#[derive(Debug, Clone)]
pub struct ProtoEncoding {
    id: u64,
    variables: Vec<IndexSet<ProtoLit>>,
    names: Vec<Option<String>>,
    comments: Vec<String>,
    hard: ClauseCollection<ProtoLit>,
    soft: ClauseCollection<ProtoLit>,
}

impl Default for ProtoEncoding {
    fn default() -> Self {
        Self {
            id: NEXT_ID.fetch_add(1, Ordering::Relaxed),
            variables: Vec::new(),
            names: Vec::new(),
            comments: Vec::new(),
            hard: ClauseCollection::new(),
            soft: ClauseCollection::new(),
        }
    }
}

impl ProtoEncoding {
    pub fn new() -> Self {
        Self::default()
    }

    /// Identifies this encoding to the families it allocates.
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Allocates the next variable id.
    pub fn new_variable(&mut self, name: Option<&str>) -> Result<u8, EncodingError> {
        if self.variables.len() >= MAX_VARIABLES {
            return Err(EncodingError::VariableCapacity(MAX_VARIABLES));
        }
        let id = self.variables.len() as u8;
        self.variables.push(IndexSet::new());
        self.names.push(name.map(str::to_owned));
        Ok(id)
    }

    pub fn var1(&mut self) -> Result<Var1, EncodingError> {
        Ok(Var1::new(self.id, self.new_variable(None)?))
    }

    /// `dim1` is the size of the last axis.
    pub fn var2(&mut self, dim1: usize, symmetric: bool) -> Result<Var2, EncodingError> {
        Ok(Var2::new(self.id, self.new_variable(None)?, dim1, symmetric))
    }

    pub fn var3(&mut self, dim1: usize, dim2: usize) -> Result<Var3, EncodingError> {
        Ok(Var3::new(self.id, self.new_variable(None)?, dim1, dim2))
    }

    pub fn var_n(&mut self, arity: usize) -> Result<VarN, EncodingError> {
        Ok(VarN::new(self.id, self.new_variable(None)?, arity))
    }

    pub fn variable_count(&self) -> usize {
        self.variables.len()
    }

    pub fn variable_name(&self, variable: u8) -> Option<&str> {
        self.names.get(variable as usize)?.as_deref()
    }

    /// Builds and registers the literal `(variable, index)`.
    pub fn literal(&mut self, variable: u8, index: u32) -> Result<ProtoLit, EncodingError> {
        let lit = ProtoLit::new(variable, index)?;
        self.register(lit.clone())?;
        Ok(lit)
    }

    /// Registers a non-negated literal. Returns false if it was already known.
    pub fn register(&mut self, lit: ProtoLit) -> Result<bool, EncodingError> {
        if lit.is_negated() {
            return Err(EncodingError::NegatedKey(lit.to_string()));
        }
        let set = self
            .variables
            .get_mut(lit.variable() as usize)
            .ok_or(EncodingError::UnknownVariable(lit.variable()))?;
        Ok(set.insert(lit))
    }

    pub fn is_registered(&self, lit: &ProtoLit) -> bool {
        self.variables
            .get(lit.variable() as usize)
            .is_some_and(|set| set.contains(lit))
    }

    /// Registered literals per family, in allocation order.
    pub fn registered_literals(&self) -> impl Iterator<Item = &IndexSet<ProtoLit>> {
        self.variables.iter()
    }

    pub fn registered_count(&self) -> usize {
        self.variables.iter().map(IndexSet::len).sum()
    }

    pub fn add_hard(&mut self, lits: impl IntoIterator<Item = ProtoLit>) -> Result<(), EncodingError> {
        self.add_clause(Clause::hard(lits.into_iter().collect()))
    }

    pub fn add_soft(
        &mut self,
        cost: u64,
        lits: impl IntoIterator<Item = ProtoLit>,
    ) -> Result<(), EncodingError> {
        self.add_clause(Clause::soft(cost, lits.into_iter().collect()))
    }

    pub fn add_hards<I>(&mut self, clauses: I) -> Result<(), EncodingError>
    where
        I: IntoIterator,
        I::Item: IntoIterator<Item = ProtoLit>,
    {
        for clause in clauses {
            self.add_hard(clause)?;
        }
        Ok(())
    }

    /// Adds to the hard or soft side depending on the cost. Every literal's
    /// positive form must have been registered.
    pub fn add_clause(&mut self, clause: Clause<ProtoLit>) -> Result<(), EncodingError> {
        if let Some(lit) = clause.lits.iter().find(|l| !self.is_registered(l)) {
            return Err(EncodingError::UnregisteredLiteral(lit.to_string()));
        }
        if clause.is_hard() {
            self.hard.add(clause);
        } else {
            self.soft.add(clause);
        }
        Ok(())
    }

    /// Comment emitted at the top of the file.
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

    pub fn comments(&self) -> &[String] {
        &self.comments
    }

    pub fn hard(&self) -> &ClauseCollection<ProtoLit> {
        &self.hard
    }

    pub fn soft(&self) -> &ClauseCollection<ProtoLit> {
        &self.soft
    }

    /// Human readable rendering of both clause sets, for debugging encodings
    /// before they are numbered.
    pub fn debug_lines(&self) -> impl Iterator<Item = String> + '_ {
        let fmt = |c: &Clause<ProtoLit>| {
            let lits = c
                .lits
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(" ");
            if c.is_hard() {
                format!("HARD: {lits}")
            } else {
                format!("SOFT {}: {lits}", c.cost)
            }
        };
        self.hard.lines(fmt).chain(self.soft.lines(fmt))
    }
}
