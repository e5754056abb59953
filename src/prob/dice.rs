//! Compact dice-notation parsing: "2d6+3" style expressions into exact
//! distributions.
//!
//! This is a presentation tool, not a strict validator: malformed numeric
//! input degrades to a safe default instead of erroring, so the pipeline
//! always has a distribution to work with.

use crate::prob::pmf::{convolve_n, Pmf};

/// Parses `+`-separated terms, each either a bare integer constant or
/// `<N>d<S>` (N dice with S sides), and returns the distribution of their
/// sum.
pub fn parse_dice_expression(text: &str) -> Pmf {
    let mut total = Pmf::point_mass(0);
    for term in text.split('+') {
        total = total.convolve(&parse_term(term));
    }
    total
}

fn parse_term(term: &str) -> Pmf {
    let term = term.trim();
    match term.find(['d', 'D']) {
        None => Pmf::point_mass(parse_constant(term)),
        Some(split) => {
            let count = parse_die_number(&term[..split]);
            let sides = parse_die_number(&term[split + 1..]);
            convolve_n(count, &Pmf::uniform_die(sides))
        }
    }
}

/// Bare constants may legitimately be 0; anything unparsable becomes 1.
fn parse_constant(raw: &str) -> usize {
    raw.trim().parse().unwrap_or(1)
}

/// Die counts and side counts default to 1 when missing or invalid and are
/// clamped to at least 1.
fn parse_die_number(raw: &str) -> usize {
    match raw.trim().parse::<usize>() {
        Ok(value) if value >= 1 => value,
        _ => 1,
    }
}
