use std::fmt;

use crate::chart::{Backpointer, BackpointerTable};

/// A parse tree over a CNF derivation: leaves pair a nonterminal with the
/// terminal word it derives, branches pair a nonterminal with exactly two
/// subtrees.
#[derive(Debug, Clone, PartialEq)]
pub enum ParseTree {
  Leaf {
    label: String,
    word: String,
  },
  Branch {
    label: String,
    left: Box<ParseTree>,
    right: Box<ParseTree>,
  },
}

impl ParseTree {
  pub fn leaf(label: &str, word: &str) -> Self {
    Self::Leaf {
      label: label.to_string(),
      word: word.to_string(),
    }
  }

  pub fn branch(label: &str, left: ParseTree, right: ParseTree) -> Self {
    Self::Branch {
      label: label.to_string(),
      left: Box::new(left),
      right: Box::new(right),
    }
  }

  pub fn label(&self) -> &str {
    match self {
      Self::Leaf { label, .. } => label,
      Self::Branch { label, .. } => label,
    }
  }

  pub fn is_leaf(&self) -> bool {
    match self {
      Self::Leaf { .. } => true,
      _ => false,
    }
  }

  /// The terminal words at the tree's leaves, left to right. For a tree
  /// reconstructed over span (i, j) these are exactly tokens[i..j].
  pub fn leaves(&self) -> Vec<&str> {
    match self {
      Self::Leaf { word, .. } => vec![word],
      Self::Branch { left, right, .. } => {
        let mut words = left.leaves();
        words.append(&mut right.leaves());
        words
      }
    }
  }
}

impl fmt::Display for ParseTree {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::Leaf { label, word } => write!(f, "({} {})", label, word),
      Self::Branch { label, left, right } => write!(f, "({} {} {})", label, left, right),
    }
  }
}

/// Reconstructs the parse tree rooted in `symbol` over the span [i, j) by
/// walking the backpointer table.
///
/// The (span, symbol) entry must exist: callers confirm derivability first,
/// via membership checking or a table lookup. Requesting an absent entry is
/// a usage error and panics.
pub fn get_tree(table: &BackpointerTable, i: usize, j: usize, symbol: &str) -> ParseTree {
  let bp = table
    .get((i, j), symbol)
    .unwrap_or_else(|| panic!("no derivation of {} over span {}..{}", symbol, i, j));

  match bp {
    Backpointer::Word(word) => ParseTree::leaf(symbol, word),
    Backpointer::Split(left, right) => ParseTree::branch(
      symbol,
      get_tree(table, left.start, left.end, &left.symbol),
      get_tree(table, right.start, right.end, &right.symbol),
    ),
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::chart::BackLink;
  use crate::grammar::Grammar;

  #[test]
  fn test_leaf_reconstruction() {
    let mut table = BackpointerTable::new();
    table.insert((0, 1), "S".to_string(), Backpointer::Word("a".to_string()));
    assert_eq!(get_tree(&table, 0, 1, "S"), ParseTree::leaf("S", "a"));
  }

  #[test]
  fn test_branch_reconstruction() {
    let mut table = BackpointerTable::new();
    table.insert((0, 1), "NP".to_string(), Backpointer::Word("miami".to_string()));
    table.insert((1, 2), "VP".to_string(), Backpointer::Word("flights".to_string()));
    table.insert(
      (0, 2),
      "S".to_string(),
      Backpointer::Split(BackLink::new("NP", 0, 1), BackLink::new("VP", 1, 2)),
    );

    let tree = get_tree(&table, 0, 2, "S");
    assert_eq!(
      tree,
      ParseTree::branch(
        "S",
        ParseTree::leaf("NP", "miami"),
        ParseTree::leaf("VP", "flights")
      )
    );
    assert_eq!(format!("{}", tree), "(S (NP miami) (VP flights))");
  }

  #[test]
  fn test_leaves_match_input_tokens() {
    let g: Grammar = r#"
      S ; 1.0
      S -> NP VP ; 1.0
      NP -> she ; 0.5
      NP -> fish ; 0.5
      VP -> V NP ; 1.0
      V -> eats ; 1.0
    "#
    .parse()
    .unwrap();

    let tokens = ["she", "eats", "fish"];
    let (table, _) = g.parse_with_backpointers(&tokens);
    let tree = get_tree(&table, 0, tokens.len(), &g.start);
    assert_eq!(tree.leaves(), tokens);
    assert_eq!(tree.label(), "S");
  }

  #[test]
  #[should_panic(expected = "no derivation")]
  fn test_missing_entry_panics() {
    let table = BackpointerTable::new();
    get_tree(&table, 0, 2, "S");
  }
}
