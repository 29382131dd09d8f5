//! Query text handling: normalization for change detection and
//! canonicalization for log deduplication.
//!
//! Both operate on a small jq lexer that only knows enough to keep string
//! literals intact and to drop comments.

use crate::engine;
use crate::error::EvalError;

/// The identity query, substituted for an empty editor.
pub const IDENTITY: &str = ".";

/// Keywords that always get a space on both sides in canonical form.
const KEYWORDS: &[&str] = &[
  "and", "or", "if", "then", "elif", "else", "end", "as", "def", "reduce", "foreach", "try", "catch", "label", "import",
  "include",
];

/// Operators rendered as ` op ` in canonical form.
const SPACED_OPS: &[&str] = &[
  "|", "=", "|=", "+=", "-=", "*=", "/=", "%=", "//=", "==", "!=", "<", "<=", ">", ">=", "//",
];

/// Multi-character operators, longest first.
const MULTI_OPS: &[&str] = &[
  "//=", "|=", "+=", "-=", "*=", "/=", "%=", "==", "!=", "<=", ">=", "//",
];

/// Collapse whitespace outside string literals, drop comments and
/// substitute the identity query for empty input.
///
/// The result is never empty and is the only form handed to the evaluator.
pub fn normalize(raw: &str) -> String {
  let chars: Vec<char> = raw.chars().collect();
  let mut out = String::with_capacity(raw.len());
  let mut pending_space = false;
  let mut i = 0;

  while i < chars.len() {
    let c = chars[i];
    if c.is_whitespace() {
      pending_space = true;
      i += 1;
      continue;
    }
    if c == '#' {
      i = comment_end(&chars, i);
      pending_space = true;
      continue;
    }

    if pending_space && !out.is_empty() {
      out.push(' ');
    }
    pending_space = false;

    if c == '"' {
      let end = string_end(&chars, i);
      out.extend(&chars[i..end]);
      i = end;
    } else {
      out.push(c);
      i += 1;
    }
  }

  if out.is_empty() { IDENTITY.to_string() } else { out }
}

/// Parse the query with the engine's parser and re-serialize its tokens.
///
/// Queries differing only in spacing or comments share a canonical form.
pub fn canonicalize(query: &str) -> Result<String, EvalError> {
  engine::parse_check(query)?;
  Ok(serialize(&tokenize(query)))
}

fn comment_end(chars: &[char], mut i: usize) -> usize {
  while i < chars.len() && chars[i] != '\n' {
    i += 1;
  }
  i
}

/// Index just past the string literal starting at `start`, following
/// `\(...)` interpolations. Unterminated strings run to the end.
fn string_end(chars: &[char], start: usize) -> usize {
  let mut i = start + 1;
  while i < chars.len() {
    match chars[i] {
      '"' => return i + 1,
      '\\' if chars.get(i + 1) == Some(&'(') => i = interpolation_end(chars, i + 2),
      '\\' => i += 2,
      _ => i += 1,
    }
  }
  chars.len()
}

fn interpolation_end(chars: &[char], mut i: usize) -> usize {
  let mut depth = 1;
  while i < chars.len() {
    match chars[i] {
      '"' => {
        i = string_end(chars, i);
        continue;
      }
      '(' => depth += 1,
      ')' => {
        depth -= 1;
        if depth == 0 {
          return i + 1;
        }
      }
      _ => {}
    }
    i += 1;
  }
  chars.len()
}

fn is_ident_start(c: char) -> bool {
  c.is_ascii_alphabetic() || c == '_'
}

fn is_ident_char(c: char) -> bool {
  c.is_ascii_alphanumeric() || c == '_'
}

/// Consume an identifier (with `::` module separators) starting at `i`.
fn ident_end(chars: &[char], mut i: usize) -> usize {
  while i < chars.len() {
    if is_ident_char(chars[i]) {
      i += 1;
    } else if chars[i] == ':' && chars.get(i + 1) == Some(&':') && chars.get(i + 2).is_some_and(|c| is_ident_start(*c)) {
      i += 2;
    } else {
      break;
    }
  }
  i
}

fn number_end(chars: &[char], mut i: usize) -> usize {
  while i < chars.len() && (chars[i].is_ascii_digit() || chars[i] == '.') {
    i += 1;
  }
  if i < chars.len() && matches!(chars[i], 'e' | 'E') {
    let mut j = i + 1;
    if j < chars.len() && matches!(chars[j], '+' | '-') {
      j += 1;
    }
    if j < chars.len() && chars[j].is_ascii_digit() {
      i = j;
      while i < chars.len() && chars[i].is_ascii_digit() {
        i += 1;
      }
    }
  }
  i
}

fn tokenize(query: &str) -> Vec<String> {
  let chars: Vec<char> = query.chars().collect();
  let mut tokens = Vec::new();
  let mut i = 0;

  while i < chars.len() {
    let c = chars[i];
    let start = i;

    if c.is_whitespace() {
      i += 1;
      continue;
    }
    if c == '#' {
      i = comment_end(&chars, i);
      continue;
    }

    i = match c {
      '"' => string_end(&chars, i),
      '.' if chars.get(i + 1) == Some(&'.') => i + 2,
      '.' if chars.get(i + 1).is_some_and(|n| is_ident_start(*n)) => ident_end(&chars, i + 1),
      '.' if chars.get(i + 1).is_some_and(char::is_ascii_digit) => number_end(&chars, i),
      '$' | '@' => ident_end(&chars, i + 1),
      c if is_ident_start(c) => ident_end(&chars, i),
      c if c.is_ascii_digit() => number_end(&chars, i),
      _ => {
        let rest: String = chars[i..chars.len().min(i + 3)].iter().collect();
        match MULTI_OPS.iter().find(|op| rest.starts_with(*op)) {
          Some(op) => i + op.chars().count(),
          None => i + 1,
        }
      }
    };

    tokens.push(chars[start..i].iter().collect());
  }

  tokens
}

fn serialize(tokens: &[String]) -> String {
  let mut out = String::new();
  let mut brackets: Vec<char> = Vec::new();
  let mut prev: Option<&str> = None;

  for tok in tokens {
    let tok = tok.as_str();
    match tok {
      "(" | "[" | "{" => brackets.push(tok.chars().next().unwrap_or('(')),
      ")" | "]" | "}" => {
        brackets.pop();
      }
      _ => {}
    }

    if SPACED_OPS.contains(&tok) {
      push_space(&mut out);
      out.push_str(tok);
      out.push(' ');
    } else if tok == "," || tok == ";" || (tok == ":" && brackets.last() == Some(&'{')) {
      out.push_str(tok);
      out.push(' ');
    } else {
      if let Some(p) = prev
        && needs_space(p, tok)
      {
        push_space(&mut out);
      }
      out.push_str(tok);
    }

    prev = Some(tok);
  }

  out.trim().to_string()
}

fn push_space(out: &mut String) {
  if !out.is_empty() && !out.ends_with(' ') {
    out.push(' ');
  }
}

fn needs_space(prev: &str, next: &str) -> bool {
  let opens_group = matches!(prev, "(" | "[" | "{");
  let closes_group = matches!(next, ")" | "]" | "}" | "?");
  if opens_group || closes_group {
    return false;
  }
  if KEYWORDS.contains(&prev) || KEYWORDS.contains(&next) {
    return true;
  }

  let last = prev.chars().last().unwrap_or(' ');
  let first = next.chars().next().unwrap_or(' ');
  is_ident_char(last) && (is_ident_char(first) || first == '$' || first == '@')
}
