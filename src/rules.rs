use std::fmt;

/// The right-hand side of a CNF rule: either a single terminal word,
/// or exactly two nonterminal symbols. Arity outside {1, 2} is
/// unrepresentable.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Rhs {
  Terminal(String),
  Nonterminals(String, String),
}

impl Rhs {
  pub fn is_terminal(&self) -> bool {
    match self {
      Self::Terminal(_) => true,
      _ => false,
    }
  }

  pub fn is_binary(&self) -> bool {
    match self {
      Self::Nonterminals(_, _) => true,
      _ => false,
    }
  }

  pub fn as_terminal(&self) -> Option<&str> {
    match self {
      Self::Terminal(w) => Some(w),
      _ => None,
    }
  }

  pub fn as_nonterminals(&self) -> Option<(&str, &str)> {
    match self {
      Self::Nonterminals(b, c) => Some((b, c)),
      _ => None,
    }
  }
}

impl fmt::Display for Rhs {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::Terminal(w) => write!(f, "{}", w),
      Self::Nonterminals(b, c) => write!(f, "{} {}", b, c),
    }
  }
}

/// A PCFG production with its conditional probability.
/// `prob` is the linear-space probability from the grammar file; the
/// chart builder converts to log2 at use sites.
#[derive(Debug, Clone, PartialEq)]
pub struct Rule {
  pub lhs: String,
  pub rhs: Rhs,
  pub prob: f64,
}

impl Rule {
  pub fn new(lhs: String, rhs: Rhs, prob: f64) -> Self {
    Self { lhs, rhs, prob }
  }

  pub fn is_lexical(&self) -> bool {
    self.rhs.is_terminal()
  }

  pub fn is_binary(&self) -> bool {
    self.rhs.is_binary()
  }
}

impl fmt::Display for Rule {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{} -> {} ; {}", self.lhs, self.rhs, self.prob)
  }
}

#[test]
fn test_rhs_accessors() {
  let lex = Rhs::Terminal("miami".to_string());
  assert!(lex.is_terminal() && !lex.is_binary());
  assert_eq!(lex.as_terminal(), Some("miami"));
  assert_eq!(lex.as_nonterminals(), None);

  let bin = Rhs::Nonterminals("NP".to_string(), "VP".to_string());
  assert!(bin.is_binary() && !bin.is_terminal());
  assert_eq!(bin.as_nonterminals(), Some(("NP", "VP")));
  assert_eq!(bin.as_terminal(), None);
}

#[test]
fn test_rule_display() {
  let r = Rule::new(
    "S".to_string(),
    Rhs::Nonterminals("NP".to_string(), "VP".to_string()),
    0.5,
  );
  assert_eq!(format!("{}", r), "S -> NP VP ; 0.5");

  let r = Rule::new("NP".to_string(), Rhs::Terminal("miami".to_string()), 1.0);
  assert_eq!(format!("{}", r), "NP -> miami ; 1");
}
