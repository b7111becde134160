use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::Path;
use std::rc::Rc;
use std::str::FromStr;

use crate::parse_grammar::parse;
use crate::rules::{Rhs, Rule};
use crate::Err;

/// Tolerance for checking that probabilities conditioned on the same
/// left-hand side sum to 1.
const PROB_SUM_TOLERANCE: f64 = 1e-6;

/// A probabilistic context-free grammar in Chomsky Normal Form, indexed
/// for CKY parsing.
///
/// `rules` keeps declaration order; the index maps hand out rules in that
/// same order, so every lookup is deterministic across repeated calls.
/// Equal-probability ties during parsing are resolved by this order.
#[derive(Debug)]
pub struct Grammar {
  pub start: String,
  rules: Vec<Rc<Rule>>,
  binary: Vec<Rc<Rule>>,
  rhs_index: HashMap<Rhs, Vec<Rc<Rule>>>,
  lhs_index: HashMap<String, Vec<Rc<Rule>>>,
}

impl Grammar {
  /// Builds and verifies a grammar. Fails on any CNF or probability
  /// violation; no parse may run against an unverified grammar.
  pub fn new(start: String, rules: Vec<Rule>) -> Result<Self, Err> {
    if rules.is_empty() {
      return Err("empty ruleset".into());
    }

    let rules = rules.into_iter().map(Rc::new).collect::<Vec<_>>();

    let mut rhs_index: HashMap<Rhs, Vec<Rc<Rule>>> = HashMap::new();
    let mut lhs_index: HashMap<String, Vec<Rc<Rule>>> = HashMap::new();
    let mut binary = Vec::new();

    for rule in rules.iter() {
      rhs_index
        .entry(rule.rhs.clone())
        .or_insert_with(Vec::new)
        .push(rule.clone());
      lhs_index
        .entry(rule.lhs.clone())
        .or_insert_with(Vec::new)
        .push(rule.clone());
      if rule.is_binary() {
        binary.push(rule.clone());
      }
    }

    let g = Self {
      start,
      rules,
      binary,
      rhs_index,
      lhs_index,
    };
    g.verify()?;
    Ok(g)
  }

  pub fn read_from_file<P: AsRef<Path>>(path: P) -> Result<Self, Err> {
    fs::read_to_string(path)?.parse()
  }

  pub fn is_nonterminal(&self, symbol: &str) -> bool {
    self.lhs_index.contains_key(symbol)
  }

  /// All rules in declaration order.
  pub fn rules(&self) -> &[Rc<Rule>] {
    &self.rules
  }

  /// All two-nonterminal rules in declaration order. This is the iteration
  /// order the chart builder uses, and therefore the tie-break order for
  /// equal-probability derivations.
  pub fn binary_rules(&self) -> &[Rc<Rule>] {
    &self.binary
  }

  /// Rules with this exact right-hand side, declaration order. Missing keys
  /// yield an empty slice rather than creating an entry.
  pub fn rules_for_rhs(&self, rhs: &Rhs) -> &[Rc<Rule>] {
    self.rhs_index.get(rhs).map(Vec::as_slice).unwrap_or(&[])
  }

  /// Rules headed by this nonterminal, declaration order.
  pub fn rules_for_lhs(&self, lhs: &str) -> &[Rc<Rule>] {
    self.lhs_index.get(lhs).map(Vec::as_slice).unwrap_or(&[])
  }

  /// Unary rules deriving this terminal word.
  pub fn lexical_rules(&self, word: &str) -> &[Rc<Rule>] {
    self.rules_for_rhs(&Rhs::Terminal(word.to_string()))
  }

  /// Checks that the grammar is a valid PCFG in CNF: unary right-hand
  /// sides are terminals (not defined nonterminals), binary right-hand
  /// sides name defined nonterminals, every probability is in (0, 1], and
  /// probabilities per left-hand side sum to 1.
  pub fn verify(&self) -> Result<(), Err> {
    for (lhs, rules) in self.lhs_index.iter() {
      let mut total = 0.0;
      for rule in rules {
        if !(rule.prob > 0.0 && rule.prob <= 1.0) {
          return Err(format!("rule {:?} has probability outside (0, 1]", rule.to_string()).into());
        }
        match &rule.rhs {
          Rhs::Terminal(w) => {
            if self.is_nonterminal(w) {
              return Err(
                format!("rule {:?} derives the nonterminal {} as a terminal", rule.to_string(), w)
                  .into(),
              );
            }
          }
          Rhs::Nonterminals(b, c) => {
            for symbol in [b, c] {
              if !self.is_nonterminal(symbol) {
                return Err(
                  format!("rule {:?} uses undefined nonterminal {}", rule.to_string(), symbol)
                    .into(),
                );
              }
            }
          }
        }
        total += rule.prob;
      }
      if (total - 1.0).abs() > PROB_SUM_TOLERANCE {
        return Err(format!("probabilities for {} sum to {}, not 1", lhs, total).into());
      }
    }
    Ok(())
  }
}

impl fmt::Display for Grammar {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    writeln!(f, "{} ; 1.0", self.start)?;
    for rule in self.rules.iter() {
      writeln!(f, "{}", rule)?;
    }
    Ok(())
  }
}

impl FromStr for Grammar {
  type Err = Err;

  /// Parses and verifies a grammar. If the text carries no start-symbol
  /// declaration, the first rule's left-hand side is the start symbol.
  fn from_str(s: &str) -> Result<Self, Self::Err> {
    let (start, rules) = parse(s)?;
    let start = match start {
      Some(s) => s,
      None => rules
        .first()
        .map(|r| r.lhs.clone())
        .ok_or("empty ruleset")?,
    };
    Self::new(start, rules)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  const TOY: &str = r#"
    S ; 1.0
    S -> NP VP ; 1.0
    NP -> she ; 0.5
    NP -> fish ; 0.5
    VP -> V NP ; 1.0
    V -> eats ; 1.0
  "#;

  #[test]
  fn test_indexes_keep_declaration_order() {
    let g: Grammar = TOY.parse().unwrap();

    assert_eq!(g.start, "S");
    assert_eq!(g.rules().len(), 5);

    let np = g.rules_for_lhs("NP");
    assert_eq!(np.len(), 2);
    assert_eq!(np[0].rhs.as_terminal(), Some("she"));
    assert_eq!(np[1].rhs.as_terminal(), Some("fish"));

    let binary = g.binary_rules();
    assert_eq!(binary.len(), 2);
    assert_eq!(binary[0].lhs, "S");
    assert_eq!(binary[1].lhs, "VP");
  }

  #[test]
  fn test_missing_keys_are_empty() {
    let g: Grammar = TOY.parse().unwrap();
    assert!(g.lexical_rules("cleveland").is_empty());
    assert!(g.rules_for_lhs("PP").is_empty());
    assert!(
      g.rules_for_rhs(&Rhs::Nonterminals("VP".to_string(), "NP".to_string()))
        .is_empty()
    );
  }

  #[test]
  fn test_start_defaults_to_first_lhs() {
    let g: Grammar = "S -> a ; 1.0".parse().unwrap();
    assert_eq!(g.start, "S");
  }

  #[test]
  fn test_verify_rejects_unary_nonterminal() {
    // S -> NP with NP defined as a nonterminal is not CNF
    let err = "S -> NP ; 1.0\nNP -> miami ; 1.0".parse::<Grammar>();
    assert!(err.is_err());
  }

  #[test]
  fn test_verify_rejects_undefined_nonterminal() {
    let err = "S -> NP VP ; 1.0\nNP -> miami ; 1.0".parse::<Grammar>();
    assert!(err.is_err());
  }

  #[test]
  fn test_verify_rejects_bad_sums() {
    let err = "S -> NP NP ; 1.0\nNP -> miami ; 0.5\nNP -> cleveland ; 0.2"
      .parse::<Grammar>();
    assert!(err.is_err());
  }

  #[test]
  fn test_verify_rejects_probability_out_of_range() {
    assert!("S -> a ; 0.0".parse::<Grammar>().is_err());
    assert!("S -> a ; 1.5".parse::<Grammar>().is_err());
    assert!("S -> a ; -0.25".parse::<Grammar>().is_err());
  }

  #[test]
  fn test_display_round_trips() {
    let g: Grammar = TOY.parse().unwrap();
    let g2: Grammar = g.to_string().parse().unwrap();
    assert_eq!(g2.start, g.start);
    assert_eq!(g2.rules(), g.rules());
  }
}
