use std::fmt;

use thiserror::Error;

use crate::cnf::SatFormat;
use crate::error::EncodingError;
use crate::proto::{LitTranslator, ProtoLit};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("invalid solution: solver output is empty")]
    Empty,
    #[error("invalid solution: no status line")]
    MissingStatus,
    #[error("invalid solution: no objective line")]
    MissingCost,
    #[error("invalid solution: bad objective value {0:?}")]
    InvalidCost(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    OptimumFound,
    Unsatisfiable,
    Unknown,
}

impl Status {
    fn parse(text: &str) -> Self {
        match text.trim() {
            "OPTIMUM FOUND" => Status::OptimumFound,
            "UNSATISFIABLE" => Status::Unsatisfiable,
            _ => Status::Unknown,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Status::OptimumFound => "OPTIMUM FOUND",
            Status::Unsatisfiable => "UNSATISFIABLE",
            Status::Unknown => "UNKNOWN",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A decoded solver answer. `assignments[i]` is the value of DIMACS
/// variable `i + 1`; it is empty unless the status is `OptimumFound`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Solution {
    pub format: SatFormat,
    pub status: Status,
    pub cost: u64,
    pub assignments: Vec<bool>,
}

impl Solution {
    /// Decodes solver stdout using the `s`/`o`/`v` line protocol. `o` lines
    /// are only read, and required, for WCNF; the lowest one wins.
    pub fn parse(format: SatFormat, output: &str) -> Result<Self, DecodeError> {
        if output.is_empty() {
            return Err(DecodeError::Empty);
        }

        let mut status = None::<&str>;
        let mut values = "";
        let mut cost = None::<u64>;

        for line in output.lines() {
            if let Some(rest) = line.strip_prefix("s ") {
                status = Some(rest);
            } else if let Some(rest) = line.strip_prefix("v ") {
                values = rest;
            } else if let Some(rest) = line.strip_prefix("o ") {
                if format != SatFormat::Wcnf {
                    continue;
                }
                let rest = rest.trim();
                let c = rest
                    .parse::<u64>()
                    .map_err(|_| DecodeError::InvalidCost(rest.to_string()))?;
                cost = Some(cost.map_or(c, |prev| prev.min(c)));
            }
        }

        let status = match status {
            Some(s) if !s.trim().is_empty() => Status::parse(s),
            _ => return Err(DecodeError::MissingStatus),
        };
        let cost = match (format, cost) {
            (SatFormat::Wcnf, None) => return Err(DecodeError::MissingCost),
            (_, c) => c.unwrap_or(0),
        };

        let assignments = if status == Status::OptimumFound {
            values
                .chars()
                .filter(|c| !c.is_whitespace())
                .map(|c| c == '1')
                .collect()
        } else {
            Vec::new()
        };

        Ok(Self {
            format,
            status,
            cost,
            assignments,
        })
    }

    /// The assignment as proto literals, negated where the value is false.
    pub fn as_proto_lits(&self, translator: &LitTranslator) -> Result<Vec<ProtoLit>, EncodingError> {
        let mut out = Vec::with_capacity(self.assignments.len());
        for (i, &value) in self.assignments.iter().enumerate() {
            let v = i32::try_from(i + 1).map_err(|_| EncodingError::IndexOverflow)?;
            let lit = translator.literal_of(v)?;
            out.push(if value { lit.clone() } else { lit.neg() });
        }
        Ok(out)
    }

    /// Truth value of `lit` under this solution, honoring its polarity.
    pub fn value_of(&self, translator: &LitTranslator, lit: &ProtoLit) -> Result<Option<bool>, EncodingError> {
        let v = translator.value_of(lit)?;
        let value = self.assignments.get(v as usize - 1).copied();
        Ok(value.map(|b| b != lit.is_negated()))
    }
}

impl fmt::Display for Solution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "s {}", self.status)?;
        if self.format == SatFormat::Wcnf {
            writeln!(f, "o {}", self.cost)?;
        }
        f.write_str("v ")?;
        for &b in &self.assignments {
            f.write_str(if b { "1" } else { "0" })?;
        }
        Ok(())
    }
}
