use std::fmt;
use std::hash::{Hash, Hasher};
use std::ops::Not;
use std::sync::Arc;

use crate::error::EncodingError;

const NEGATION_MASK: u8 = 0x80;
const VARIABLE_MASK: u8 = 0x7f;

/// Number of variable families an encoding can hold. The id lives in the low
/// seven bits of the tag; the top bit is the polarity.
pub const MAX_VARIABLES: usize = 127;

/// A literal that has not been given a DIMACS number yet: a variable family
/// id, an index within that family and a polarity.
///
/// Identity is `(variable, index)`. Polarity and the display name are not
/// part of equality or hashing, so a literal and its negation map to the
/// same translation key.
#[derive(Debug, Clone)]
pub struct ProtoLit {
    tag: u8,
    index: u32,
    name: Option<Arc<str>>,
}

impl ProtoLit {
    pub fn new(variable: u8, index: u32) -> Result<Self, EncodingError> {
        if variable as usize >= MAX_VARIABLES {
            return Err(EncodingError::VariableCapacity(MAX_VARIABLES));
        }
        Ok(Self {
            tag: variable,
            index,
            name: None,
        })
    }

    pub fn variable(&self) -> u8 {
        self.tag & VARIABLE_MASK
    }

    pub fn index(&self) -> u32 {
        self.index
    }

    pub fn is_negated(&self) -> bool {
        self.tag & NEGATION_MASK != 0
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Flips the polarity.
    pub fn neg(&self) -> Self {
        Self {
            tag: self.tag ^ NEGATION_MASK,
            index: self.index,
            name: self.name.clone(),
        }
    }

    /// The non-negated form, which is what gets registered and translated.
    pub fn pos(&self) -> Self {
        Self {
            tag: self.tag & VARIABLE_MASK,
            index: self.index,
            name: self.name.clone(),
        }
    }

    pub fn with_name(mut self, name: impl Into<Arc<str>>) -> Self {
        let name = name.into();
        if !name.is_empty() {
            self.name = Some(name);
        }
        self
    }

    /// Labels the literal as `name[c0, c1, ...]`, or plain `name` when no
    /// coordinates are given.
    pub fn named(self, name: &str, coords: &[usize]) -> Self {
        if coords.is_empty() {
            return self.with_name(name);
        }
        let joined = coords
            .iter()
            .map(|c| c.to_string())
            .collect::<Vec<_>>()
            .join(", ");
        self.with_name(format!("{name}[{joined}]"))
    }
}

impl PartialEq for ProtoLit {
    fn eq(&self, other: &Self) -> bool {
        self.variable() == other.variable() && self.index == other.index
    }
}

impl Eq for ProtoLit {}

impl Hash for ProtoLit {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.variable().hash(state);
        self.index.hash(state);
    }
}

impl Not for ProtoLit {
    type Output = ProtoLit;

    fn not(self) -> Self::Output {
        self.neg()
    }
}

impl Not for &ProtoLit {
    type Output = ProtoLit;

    fn not(self) -> Self::Output {
        self.neg()
    }
}

impl fmt::Display for ProtoLit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.is_negated() { "-" } else { "" };
        match &self.name {
            Some(name) => write!(f, "{sign}{name}"),
            None => write!(f, "{sign}({}, {})", self.variable(), self.index),
        }
    }
}
