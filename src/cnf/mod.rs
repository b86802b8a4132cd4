pub mod clause;
#[allow(clippy::module_inception)]
pub mod cnf;
pub mod dimacs;

/// Output format of an encoding, and the matching solver output convention.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum SatFormat {
    /// Plain SAT, `p cnf`.
    Cnf,
    /// Weighted MaxSAT, `p wcnf`.
    Wcnf,
}

impl SatFormat {
    pub fn extension(self) -> &'static str {
        match self {
            SatFormat::Cnf => "cnf",
            SatFormat::Wcnf => "wcnf",
        }
    }

    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext {
            "cnf" => Some(SatFormat::Cnf),
            "wcnf" => Some(SatFormat::Wcnf),
            _ => None,
        }
    }
}
