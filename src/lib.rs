//! Build SAT and weighted MaxSAT instances over named, coordinate-addressed
//! literals, write them as DIMACS CNF/WCNF, run an external solver and map
//! its answer back onto the original literals.

pub mod bench;
pub mod cnf;
pub mod error;
pub mod instance;
pub mod proto;
pub mod solver;

pub use cnf::SatFormat;
pub use cnf::clause::{Clause, ClauseCollection};
pub use cnf::cnf::SatEncoding;
pub use error::EncodingError;
pub use proto::{Family, LitTranslator, Numbering, ProtoEncoding, ProtoLit};
pub use solver::{ProcessStatus, Solution, SolverConfig, SolverResult, SolverRunner, Status};
