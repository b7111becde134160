use std::collections::HashMap;
use std::fmt;

use tracing::error;

/// Half-open token range [i, j). Width-1 spans are leaves.
pub type Span = (usize, usize);

/// Reference to the best sub-derivation of `symbol` over [start, end).
#[derive(Debug, Clone, PartialEq)]
pub struct BackLink {
  pub symbol: String,
  pub start: usize,
  pub end: usize,
}

impl BackLink {
  pub fn new(symbol: &str, start: usize, end: usize) -> Self {
    Self {
      symbol: symbol.to_string(),
      start,
      end,
    }
  }
}

impl fmt::Display for BackLink {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}[{}..{}]", self.symbol, self.start, self.end)
  }
}

/// How the best derivation of a (span, nonterminal) entry was produced:
/// a terminal word for width-1 spans, or the two best children for wider
/// spans. Exactly one backpointer is kept per entry.
#[derive(Debug, Clone, PartialEq)]
pub enum Backpointer {
  Word(String),
  Split(BackLink, BackLink),
}

impl fmt::Display for Backpointer {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::Word(w) => write!(f, "'{}'", w),
      Self::Split(l, r) => write!(f, "{} {}", l, r),
    }
  }
}

/// Best backpointer per (span, nonterminal) pair. Populated in lockstep
/// with a [`ProbTable`] by the chart builder.
#[derive(Debug, Default, PartialEq)]
pub struct BackpointerTable(HashMap<Span, HashMap<String, Backpointer>>);

impl BackpointerTable {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn get(&self, span: Span, symbol: &str) -> Option<&Backpointer> {
    self.0.get(&span).and_then(|m| m.get(symbol))
  }

  pub fn contains(&self, span: Span, symbol: &str) -> bool {
    self.get(span, symbol).is_some()
  }

  pub fn insert(&mut self, span: Span, symbol: String, bp: Backpointer) {
    self.0.entry(span).or_default().insert(symbol, bp);
  }

  pub fn len(&self) -> usize {
    self.0.values().map(HashMap::len).sum()
  }

  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }

  /// (span, nonterminal, backpointer) triples sorted by width, then start,
  /// then nonterminal, for deterministic display and inspection.
  pub fn sorted_entries(&self) -> Vec<(Span, &str, &Backpointer)> {
    let mut entries = self
      .0
      .iter()
      .flat_map(|(span, m)| m.iter().map(|(nt, bp)| (*span, nt.as_str(), bp)))
      .collect::<Vec<_>>();
    entries.sort_by_key(|((i, j), nt, _)| (j - i, *i, nt.to_string()));
    entries
  }

  /// Shape check for test harnesses: spans must satisfy i < j, width-1
  /// entries must hold a terminal word, wider entries must hold a pair of
  /// child links. Reports each violation and returns false.
  pub fn check_format(&self) -> bool {
    let mut ok = true;
    for ((i, j), nt, bp) in self.sorted_entries() {
      if i >= j {
        error!("backpointer span ({}, {}) is not a valid span", i, j);
        ok = false;
        continue;
      }
      match bp {
        Backpointer::Word(_) if j - i != 1 => {
          error!("span ({}, {}) entry {} holds a word but has width {}", i, j, nt, j - i);
          ok = false;
        }
        Backpointer::Split(_, _) if j - i == 1 => {
          error!("width-1 span ({}, {}) entry {} holds child links", i, j, nt);
          ok = false;
        }
        _ => {}
      }
    }
    ok
  }
}

impl fmt::Display for BackpointerTable {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    for ((i, j), nt, bp) in self.sorted_entries() {
      writeln!(f, "{}..{}: {} -> {}", i, j, nt, bp)?;
    }
    Ok(())
  }
}

/// Log2-probability of the best derivation per (span, nonterminal) pair.
#[derive(Debug, Default, PartialEq)]
pub struct ProbTable(HashMap<Span, HashMap<String, f64>>);

impl ProbTable {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn get(&self, span: Span, symbol: &str) -> Option<f64> {
    self.0.get(&span).and_then(|m| m.get(symbol)).copied()
  }

  pub fn insert(&mut self, span: Span, symbol: String, logprob: f64) {
    self.0.entry(span).or_default().insert(symbol, logprob);
  }

  pub fn len(&self) -> usize {
    self.0.values().map(HashMap::len).sum()
  }

  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }

  pub fn sorted_entries(&self) -> Vec<(Span, &str, f64)> {
    let mut entries = self
      .0
      .iter()
      .flat_map(|(span, m)| m.iter().map(|(nt, lp)| (*span, nt.as_str(), *lp)))
      .collect::<Vec<_>>();
    entries.sort_by_key(|((i, j), nt, _)| (j - i, *i, nt.to_string()));
    entries
  }

  /// Shape check for test harnesses: spans must satisfy i < j and every
  /// stored value must be a finite log2-probability, hence <= 0.
  pub fn check_format(&self) -> bool {
    let mut ok = true;
    for ((i, j), nt, lp) in self.sorted_entries() {
      if i >= j {
        error!("probability span ({}, {}) is not a valid span", i, j);
        ok = false;
        continue;
      }
      if !lp.is_finite() || lp > 0.0 {
        error!("span ({}, {}) entry {} has log probability {}", i, j, nt, lp);
        ok = false;
      }
    }
    ok
  }
}

impl fmt::Display for ProbTable {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    for ((i, j), nt, lp) in self.sorted_entries() {
      writeln!(f, "{}..{}: {} = {}", i, j, nt, lp)?;
    }
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_backpointer_format_accepts_well_shaped_tables() {
    let mut table = BackpointerTable::new();
    table.insert((0, 1), "NP".to_string(), Backpointer::Word("miami".to_string()));
    table.insert((1, 2), "VP".to_string(), Backpointer::Word("flights".to_string()));
    table.insert(
      (0, 2),
      "S".to_string(),
      Backpointer::Split(BackLink::new("NP", 0, 1), BackLink::new("VP", 1, 2)),
    );
    assert!(table.check_format());
  }

  #[test]
  fn test_backpointer_format_rejects_word_in_wide_span() {
    let mut table = BackpointerTable::new();
    table.insert((0, 2), "S".to_string(), Backpointer::Word("miami".to_string()));
    assert!(!table.check_format());
  }

  #[test]
  fn test_backpointer_format_rejects_split_in_leaf_span() {
    let mut table = BackpointerTable::new();
    table.insert(
      (0, 1),
      "S".to_string(),
      Backpointer::Split(BackLink::new("A", 0, 1), BackLink::new("B", 1, 1)),
    );
    assert!(!table.check_format());
  }

  #[test]
  fn test_format_rejects_inverted_spans() {
    let mut table = BackpointerTable::new();
    table.insert((2, 2), "S".to_string(), Backpointer::Word("x".to_string()));
    assert!(!table.check_format());

    let mut probs = ProbTable::new();
    probs.insert((3, 1), "S".to_string(), -1.0);
    assert!(!probs.check_format());
  }

  #[test]
  fn test_prob_format_rejects_positive_or_non_finite() {
    let mut probs = ProbTable::new();
    probs.insert((0, 1), "NP".to_string(), 0.5);
    assert!(!probs.check_format());

    let mut probs = ProbTable::new();
    probs.insert((0, 1), "NP".to_string(), f64::NEG_INFINITY);
    assert!(!probs.check_format());

    let mut probs = ProbTable::new();
    probs.insert((0, 1), "NP".to_string(), -1.0);
    probs.insert((0, 1), "Det".to_string(), 0.0);
    assert!(probs.check_format());
  }
}
