use std::env;
use std::io;
use std::io::Write;
use std::process;

use tracing_subscriber::EnvFilter;

use chartreuse::{get_tree, Err, Grammar};

fn usage(prog_name: &str) -> String {
  format!(
    r"Usage: {} GRAMMAR_FILE [options]

Reads whitespace-separated sentences from stdin and prints the best parse.

Options:
  -h, --help    Print this message
  -c, --chart   Print the backpointer and probability tables
  -q, --quiet   Only report membership, don't print trees",
    prog_name
  )
}

fn parse(g: &Grammar, sentence: &str, print_chart: bool, print_trees: bool) -> Result<(), Err> {
  let tokens = sentence.split_whitespace().collect::<Vec<_>>();
  if tokens.is_empty() {
    return Ok(());
  }

  if !g.is_in_language(&tokens) {
    println!("not in language");
    return Ok(());
  }

  let (table, probs) = g.parse_with_backpointers(&tokens);

  if print_chart {
    println!("backpointers:\n{}", table);
    println!("log2 probabilities:\n{}", probs);
  }

  if print_trees {
    let logprob = probs
      .get((0, tokens.len()), &g.start)
      .expect("start symbol missing from chart for in-language input");
    let tree = get_tree(&table, 0, tokens.len(), &g.start);
    println!("{}", tree);
    println!("log2 probability: {}", logprob);
  } else {
    println!("in language");
  }

  Ok(())
}

struct Args {
  filename: String,
  print_chart: bool,
  print_trees: bool,
}

impl Args {
  fn make_error_message(msg: &str, prog_name: impl AsRef<str>) -> String {
    format!("argument error: {}.\n\n{}", msg, usage(prog_name.as_ref()))
  }

  fn parse(v: Vec<String>) -> Result<Self, String> {
    if v.is_empty() {
      return Err(Self::make_error_message("bad argument vector", "chartreuse"));
    }

    let args_len = v.len();
    let mut iter = v.into_iter();
    let prog_name = iter.next().unwrap();

    if args_len < 2 {
      return Err(Self::make_error_message("not enough arguments", prog_name));
    }

    let mut filename: Option<String> = None;
    let mut print_chart = false;
    let mut print_trees = true;

    for o in iter {
      if o == "-h" || o == "--help" {
        println!("{}", usage(&prog_name));
        process::exit(0);
      } else if o == "-c" || o == "--chart" {
        print_chart = true;
      } else if o == "-q" || o == "--quiet" {
        print_trees = false;
      } else if filename.is_none() {
        filename = Some(o);
      } else {
        return Err(Self::make_error_message("invalid arguments", prog_name));
      }
    }

    if let Some(filename) = filename {
      Ok(Self {
        filename,
        print_chart,
        print_trees,
      })
    } else {
      Err(Self::make_error_message("missing filename", prog_name))
    }
  }
}

fn main() -> Result<(), Err> {
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::from_default_env())
    .init();

  let opts = match Args::parse(env::args().collect()) {
    Ok(opts) => opts,
    Err(msg) => {
      eprintln!("{}", msg);
      process::exit(255);
    }
  };

  let g: Grammar = Grammar::read_from_file(&opts.filename)?;

  let mut input = String::new();
  loop {
    print!("> ");
    io::stdout().flush()?;

    match io::stdin().read_line(&mut input) {
      Ok(_) => {
        if input.is_empty() {
          // ctrl+d
          return Ok(());
        }
        input.make_ascii_lowercase();
        parse(&g, input.trim(), opts.print_chart, opts.print_trees)?;
        input.clear();
      }
      Err(error) => return Err(error.into()),
    }
  }
}
