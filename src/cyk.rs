use std::collections::HashSet;

use tracing::debug;

use crate::chart::{BackLink, Backpointer, BackpointerTable, ProbTable};
use crate::grammar::Grammar;

/// Membership checking: can the grammar's start symbol derive the whole
/// token sequence? Unweighted CKY over sets of nonterminals.
pub fn recognize(g: &Grammar, tokens: &[&str]) -> bool {
  assert!(!tokens.is_empty(), "cannot recognize an empty token sequence");
  let n = tokens.len();

  // sets[i][j] holds every nonterminal deriving tokens[i..j]
  let mut sets = vec![vec![HashSet::new(); n + 1]; n + 1];

  for (i, word) in tokens.iter().enumerate() {
    sets[i][i + 1] = g
      .lexical_rules(word)
      .iter()
      .map(|r| r.lhs.clone())
      .collect();
  }

  for width in 2..=n {
    for start in 0..=n - width {
      let end = start + width;
      let mut derived = HashSet::new();
      for mid in start + 1..end {
        for rule in g.binary_rules() {
          if let Some((b, c)) = rule.rhs.as_nonterminals() {
            if sets[start][mid].contains(b) && sets[mid][end].contains(c) {
              derived.insert(rule.lhs.clone());
            }
          }
        }
      }
      sets[start][end] = derived;
    }
  }

  sets[0][n].contains(&g.start)
}

/// Viterbi CKY: for every derivable (span, nonterminal) pair, record the
/// best derivation's backpointer and its log2-probability.
///
/// Probabilities accumulate additively in log2-space; candidates replace a
/// stored entry only when strictly greater, so among equal-probability ties
/// the first candidate in grammar declaration order wins.
pub fn build_chart(g: &Grammar, tokens: &[&str]) -> (BackpointerTable, ProbTable) {
  assert!(!tokens.is_empty(), "cannot parse an empty token sequence");
  let n = tokens.len();

  let mut table = BackpointerTable::new();
  let mut probs = ProbTable::new();

  for (i, word) in tokens.iter().enumerate() {
    let span = (i, i + 1);
    for rule in g.lexical_rules(word) {
      let lp = rule.prob.log2();
      // a valid grammar has one lexical rule per (lhs, word); keep the
      // more probable one if duplicates slip through
      if probs.get(span, &rule.lhs).is_none_or(|stored| stored < lp) {
        table.insert(span, rule.lhs.clone(), Backpointer::Word((*word).to_string()));
        probs.insert(span, rule.lhs.clone(), lp);
      }
    }
  }

  // strictly increasing width: every narrower span is complete before any
  // span that contains it
  for width in 2..=n {
    for start in 0..=n - width {
      let end = start + width;
      for mid in start + 1..end {
        for rule in g.binary_rules() {
          let Some((b, c)) = rule.rhs.as_nonterminals() else {
            continue;
          };
          let (Some(lp_b), Some(lp_c)) = (probs.get((start, mid), b), probs.get((mid, end), c))
          else {
            continue;
          };
          let candidate = lp_b + lp_c + rule.prob.log2();
          if probs
            .get((start, end), &rule.lhs)
            .is_none_or(|stored| stored < candidate)
          {
            table.insert(
              (start, end),
              rule.lhs.clone(),
              Backpointer::Split(BackLink::new(b, start, mid), BackLink::new(c, mid, end)),
            );
            probs.insert((start, end), rule.lhs.clone(), candidate);
          }
        }
      }
    }
  }

  debug!(tokens = n, entries = table.len(), "built Viterbi chart");
  (table, probs)
}
