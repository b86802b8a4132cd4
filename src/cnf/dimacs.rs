use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};

use crate::error::EncodingError;

use super::SatFormat;
use super::clause::Clause;
use super::cnf::SatEncoding;

pub fn comment_line(text: &str) -> String {
    format!("c {text}")
}

pub fn cnf_problem_line(literal_count: u32, clause_count: usize) -> String {
    format!("p cnf {literal_count} {clause_count}")
}

pub fn wcnf_problem_line(literal_count: u32, clause_count: usize, top: u64) -> String {
    format!("p wcnf {literal_count} {clause_count} {top}")
}

pub fn cnf_clause_line(lits: &[i32]) -> String {
    let mut out = String::with_capacity(lits.len() * 4 + 1);
    for lit in lits {
        out.push_str(&lit.to_string());
        out.push(' ');
    }
    out.push('0');
    out
}

pub fn wcnf_clause_line(lits: &[i32], weight: u64) -> String {
    format!("{weight} {}", cnf_clause_line(lits))
}

/// Every line of the CNF file, in order. Fails when soft clauses exist.
pub fn cnf_lines(enc: &SatEncoding) -> Result<Vec<String>, EncodingError> {
    if !enc.soft().is_empty() {
        return Err(EncodingError::SoftClausesInCnf(enc.soft().len()));
    }
    let mut out = enc
        .comments()
        .iter()
        .map(|c| comment_line(c))
        .collect::<Vec<_>>();
    out.push(cnf_problem_line(enc.literal_count(), enc.hard().len()));
    out.push(comment_line("Hard clauses"));
    out.extend(enc.hard().lines(|c: &Clause<i32>| cnf_clause_line(&c.lits)));
    Ok(out)
}

/// Every line of the WCNF file. Hard clauses carry `top` as their weight.
pub fn wcnf_lines(enc: &SatEncoding) -> Vec<String> {
    let top = enc.top();
    let weighted = |c: &Clause<i32>| {
        let weight = if c.is_hard() { top } else { c.cost };
        wcnf_clause_line(&c.lits, weight)
    };
    let mut out = enc
        .comments()
        .iter()
        .map(|c| comment_line(c))
        .collect::<Vec<_>>();
    out.push(wcnf_problem_line(enc.literal_count(), enc.clause_count(), top));
    out.push(comment_line("Hard clauses"));
    out.extend(enc.hard().lines(weighted));
    out.push(comment_line("Soft clauses"));
    out.extend(enc.soft().lines(weighted));
    out
}

pub fn dimacs_lines(enc: &SatEncoding, format: SatFormat) -> Result<Vec<String>, EncodingError> {
    match format {
        SatFormat::Cnf => cnf_lines(enc),
        SatFormat::Wcnf => Ok(wcnf_lines(enc)),
    }
}

pub fn to_dimacs(enc: &SatEncoding, format: SatFormat) -> Result<String, EncodingError> {
    let mut out = String::new();
    for line in dimacs_lines(enc, format)? {
        out.push_str(&line);
        out.push('\n');
    }
    Ok(out)
}

pub fn write_dimacs<W: Write>(w: &mut W, enc: &SatEncoding, format: SatFormat) -> Result<()> {
    for line in dimacs_lines(enc, format)? {
        writeln!(w, "{line}")?;
    }
    Ok(())
}

/// Replaces `path` with the encoding in the requested format.
pub fn write_file(path: &Path, enc: &SatEncoding, format: SatFormat) -> Result<()> {
    let lines = dimacs_lines(enc, format)?;
    let file = File::create(path).with_context(|| format!("failed to create {}", path.display()))?;
    let mut w = BufWriter::new(file);
    for line in lines {
        writeln!(w, "{line}")?;
    }
    w.flush()
        .with_context(|| format!("failed to write {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cnf_bit_exact() {
        let mut enc = SatEncoding::new();
        enc.comment("made by a test").expect("comment");
        enc.add_hard(vec![1, -2]).expect("hard");
        enc.add_hard(vec![2, 3]).expect("hard");
        let text = to_dimacs(&enc, SatFormat::Cnf).expect("cnf");
        assert_eq!(
            text,
            "c made by a test\np cnf 3 2\nc Hard clauses\n1 -2 0\n2 3 0\n"
        );
    }

    #[test]
    fn cnf_refuses_soft_clauses() {
        let mut enc = SatEncoding::new();
        enc.add_soft(1, vec![1]).expect("soft");
        assert_eq!(
            to_dimacs(&enc, SatFormat::Cnf),
            Err(EncodingError::SoftClausesInCnf(1))
        );
    }

    #[test]
    fn wcnf_uses_top_for_hard() {
        let mut enc = SatEncoding::new();
        enc.add_hard(vec![1, 2]).expect("hard");
        enc.comment_soft("prefer not 1").expect("comment");
        enc.add_soft(3, vec![-1]).expect("soft");
        enc.add_soft(5, vec![-2]).expect("soft");
        let lines = wcnf_lines(&enc);
        assert_eq!(
            lines,
            vec![
                "p wcnf 2 3 9",
                "c Hard clauses",
                "9 1 2 0",
                "c Soft clauses",
                "c prefer not 1",
                "3 -1 0",
                "5 -2 0",
            ]
        );
    }

    #[test]
    fn writer_matches_string_output() {
        let mut enc = SatEncoding::new();
        enc.comment("header").expect("comment");
        enc.add_hard(vec![-3, 1]).expect("hard");
        enc.comment_soft("soft part").expect("comment");
        enc.add_soft(2, vec![2]).expect("soft");
        let mut buf = Vec::<u8>::new();
        write_dimacs(&mut buf, &enc, SatFormat::Wcnf).expect("write");
        let text = String::from_utf8(buf).expect("utf8");
        assert_eq!(text, to_dimacs(&enc, SatFormat::Wcnf).expect("wcnf"));
        assert!(text.starts_with("c header\np wcnf 3 2 3\n"));

        let mut buf = Vec::<u8>::new();
        assert!(write_dimacs(&mut buf, &enc, SatFormat::Cnf).is_err());
        assert!(buf.is_empty());
    }

    #[test]
    fn empty_clause_is_just_terminator() {
        assert_eq!(cnf_clause_line(&[]), "0");
        assert_eq!(wcnf_clause_line(&[], 4), "4 0");
    }
}
