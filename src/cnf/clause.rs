use crate::error::EncodingError;

use super::dimacs::comment_line;

/// A clause with its violation cost. Cost 0 means hard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Clause<T> {
    pub cost: u64,
    pub lits: Vec<T>,
}

impl<T> Clause<T> {
    pub fn hard(lits: Vec<T>) -> Self {
        Self { cost: 0, lits }
    }

    pub fn soft(cost: u64, lits: Vec<T>) -> Self {
        Self { cost, lits }
    }

    pub fn is_hard(&self) -> bool {
        self.cost == 0
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Comment {
    text: String,
    anchor: usize,
}

/// Clauses in insertion order plus comments anchored to clause positions. A
/// comment's anchor is the clause count when it was added, so it is emitted
/// right before the next clause.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClauseCollection<T> {
    clauses: Vec<Clause<T>>,
    comments: Vec<Comment>,
}

impl<T> Default for ClauseCollection<T> {
    fn default() -> Self {
        Self {
            clauses: Vec::new(),
            comments: Vec::new(),
        }
    }
}

impl<T> ClauseCollection<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, clause: Clause<T>) {
        self.clauses.push(clause);
    }

    pub fn comment(&mut self, text: impl Into<String>) -> Result<(), EncodingError> {
        let text = check_comment(text.into())?;
        self.comments.push(Comment {
            text,
            anchor: self.clauses.len(),
        });
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.clauses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    pub fn clauses(&self) -> impl Iterator<Item = &Clause<T>> {
        self.clauses.iter()
    }

    pub fn total_cost(&self) -> u64 {
        self.clauses
            .iter()
            .fold(0u64, |acc, c| acc.saturating_add(c.cost))
    }

    /// Replays the collection as output lines, with each comment rendered as
    /// `c <text>` before the clause at its anchor. Comments anchored past the
    /// last clause trail the output.
    pub fn lines<'a, F>(&'a self, format: F) -> Lines<'a, T, F>
    where
        F: Fn(&Clause<T>) -> String,
    {
        Lines {
            collection: self,
            format,
            clause: 0,
            comment: 0,
        }
    }

    /// Maps every clause through `f`, keeping the comments at their anchors.
    pub fn try_map<U, E, F>(&self, mut f: F) -> Result<ClauseCollection<U>, E>
    where
        F: FnMut(&Clause<T>) -> Result<Clause<U>, E>,
    {
        let clauses = self.clauses.iter().map(&mut f).collect::<Result<_, _>>()?;
        Ok(ClauseCollection {
            clauses,
            comments: self.comments.clone(),
        })
    }
}

pub(crate) fn check_comment(text: String) -> Result<String, EncodingError> {
    if text.contains('\n') || text.contains('\r') {
        return Err(EncodingError::CommentLineBreak(text));
    }
    Ok(text)
}

pub struct Lines<'a, T, F> {
    collection: &'a ClauseCollection<T>,
    format: F,
    clause: usize,
    comment: usize,
}

impl<T, F> Iterator for Lines<'_, T, F>
where
    F: Fn(&Clause<T>) -> String,
{
    type Item = String;

    fn next(&mut self) -> Option<String> {
        if let Some(c) = self.collection.comments.get(self.comment) {
            if c.anchor <= self.clause {
                self.comment += 1;
                return Some(comment_line(&c.text));
            }
        }
        let clause = self.collection.clauses.get(self.clause)?;
        self.clause += 1;
        Some((self.format)(clause))
    }
}
