#[macro_use]
extern crate lazy_static;

pub mod chart;
pub mod cyk;
pub mod grammar;
pub mod parse_grammar;
pub mod rules;
pub mod tree;

pub use crate::chart::{BackLink, Backpointer, BackpointerTable, ProbTable, Span};
pub use crate::grammar::Grammar;
pub use crate::rules::{Rhs, Rule};
pub use crate::tree::{get_tree, ParseTree};

/// Boxed static error type
pub type Err = Box<dyn std::error::Error + 'static>;

impl Grammar {
  /// Membership checking: true iff the token sequence is in the language
  /// described by this grammar.
  pub fn is_in_language(&self, tokens: &[&str]) -> bool {
    cyk::recognize(self, tokens)
  }

  /// Runs Viterbi CKY and returns the backpointer table and the parallel
  /// log2-probability table.
  pub fn parse_with_backpointers(&self, tokens: &[&str]) -> (BackpointerTable, ProbTable) {
    cyk::build_chart(self, tokens)
  }

  /// Full pipeline: best parse of the whole input under the start symbol,
  /// with its log2-probability. `None` when the input is not in the
  /// language.
  pub fn parse(&self, tokens: &[&str]) -> Option<(ParseTree, f64)> {
    let (table, probs) = self.parse_with_backpointers(tokens);
    let logprob = probs.get((0, tokens.len()), &self.start)?;
    Some((get_tree(&table, 0, tokens.len(), &self.start), logprob))
  }
}

#[test]
fn test_end_to_end() {
  let g: Grammar = r#"
    # fragment of a flight-query grammar, binarized by hand
    S ; 1.0
    S -> NP VP ; 1.0
    NP -> flights ; 0.4
    NP -> PP NP ; 0.2
    PP -> P NP ; 1.0
    NP -> miami ; 0.2
    NP -> cleveland ; 0.2
    VP -> V NP ; 1.0
    V -> leave ; 1.0
    P -> from ; 1.0
  "#
  .parse()
  .unwrap();

  let tokens = ["flights", "leave", "miami"];
  assert!(g.is_in_language(&tokens));

  let (table, probs) = g.parse_with_backpointers(&tokens);
  assert!(table.check_format());
  assert!(probs.check_format());

  let (tree, logprob) = g.parse(&tokens).unwrap();
  assert_eq!(format!("{}", tree), "(S (NP flights) (VP (V leave) (NP miami)))");
  assert!(logprob <= 0.0);
  assert_eq!(tree.leaves(), tokens);

  assert!(!g.is_in_language(&["miami", "flights"]));
  assert_eq!(g.parse(&["miami", "flights"]), None);
}
