/// Line-based parsing of PCFG grammar files.
///
/// Each non-blank, non-comment line is either a rule
/// `LHS -> SYM [SYM] ; PROB`, or a start-symbol declaration `SYM ; PROB`
/// (no arrow). Lines starting with `#` are comments. The probability on a
/// start declaration is accepted and ignored.
use regex::Regex;

use crate::rules::{Rhs, Rule};
use crate::Err;

/// helper macro for initializing a regex with lazy_static!
macro_rules! regex_static {
  ($name:ident, $pattern:expr) => {
    lazy_static! {
      static ref $name: Regex = Regex::new($pattern).unwrap();
    }
  };
}

regex_static!(
  RULE_LINE,
  r"^(?P<lhs>[^\s;]+)\s*->\s*(?P<rhs>[^;]+?)\s*;\s*(?P<prob>\S+)$"
);
regex_static!(START_LINE, r"^(?P<sym>[^\s;]+)\s*;\s*(?P<prob>\S+)$");

fn parse_prob(s: &str, lineno: usize) -> Result<f64, Err> {
  s.parse::<f64>()
    .map_err(|_| format!("line {}: bad probability {:?}", lineno, s).into())
}

fn parse_rule(line: &str, lineno: usize) -> Result<Rule, Err> {
  let caps = RULE_LINE
    .captures(line)
    .ok_or_else(|| -> Err { format!("line {}: malformed rule {:?}", lineno, line).into() })?;

  let lhs = caps["lhs"].to_string();
  let prob = parse_prob(&caps["prob"], lineno)?;

  let symbols = caps["rhs"].split_whitespace().collect::<Vec<_>>();
  let rhs = match symbols.as_slice() {
    [w] => Rhs::Terminal(w.to_string()),
    [b, c] => Rhs::Nonterminals(b.to_string(), c.to_string()),
    _ => {
      return Err(
        format!(
          "line {}: rule must have one or two right-hand-side symbols, got {}",
          lineno,
          symbols.len()
        )
        .into(),
      );
    }
  };

  Ok(Rule::new(lhs, rhs, prob))
}

/// Parses grammar text into an optional start-symbol declaration and the
/// rules in declaration order.
pub fn parse(s: &str) -> Result<(Option<String>, Vec<Rule>), Err> {
  let mut start = None;
  let mut rules = Vec::new();

  for (idx, line) in s.lines().enumerate() {
    let lineno = idx + 1;
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
      continue;
    }

    if line.contains("->") {
      rules.push(parse_rule(line, lineno)?);
    } else {
      let caps = START_LINE.captures(line).ok_or_else(|| -> Err {
        format!("line {}: malformed start declaration {:?}", lineno, line).into()
      })?;
      parse_prob(&caps["prob"], lineno)?;
      start = Some(caps["sym"].to_string());
    }
  }

  Ok((start, rules))
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_parse_rules_and_start() {
    let (start, rules) = parse(
      r#"
        # toy grammar
        S ; 1.0
        S -> NP VP ; 1.0

        NP -> miami ; 1.0
        VP -> flights ; 1.0
      "#,
    )
    .unwrap();

    assert_eq!(start.as_deref(), Some("S"));
    assert_eq!(rules.len(), 3);
    assert_eq!(
      rules[0],
      Rule::new(
        "S".to_string(),
        Rhs::Nonterminals("NP".to_string(), "VP".to_string()),
        1.0
      )
    );
    assert_eq!(
      rules[1],
      Rule::new("NP".to_string(), Rhs::Terminal("miami".to_string()), 1.0)
    );
  }

  #[test]
  fn test_missing_start_declaration() {
    let (start, rules) = parse("S -> a ; 1.0").unwrap();
    assert_eq!(start, None);
    assert_eq!(rules.len(), 1);
  }

  #[test]
  fn test_bad_probability() {
    assert!(parse("S -> NP VP ; one").is_err());
    assert!(parse("S ; huh").is_err());
  }

  #[test]
  fn test_rhs_arity() {
    assert!(parse("S -> A B C ; 0.5").is_err());
    assert!(parse("S -> ; 0.5").is_err());
  }
}
