//! Where the document comes from.

use jqlive_core::{Document, Error, Result};
use std::io::{IsTerminal, Read};
use std::path::Path;
use tracing::debug;

/// Load the document from `file` if given, else from piped stdin, else
/// fall back to the built-in sample.
pub fn load_document(file: Option<&Path>) -> Result<Document> {
  if let Some(path) = file {
    let text = std::fs::read_to_string(path)
      .map_err(|e| Error::Startup(format!("Failed to read {}: {}", path.display(), e)))?;
    debug!(path = %path.display(), bytes = text.len(), "Loaded input file");
    return Ok(Document::new(text));
  }

  let stdin = std::io::stdin();
  if stdin.is_terminal() {
    debug!("stdin is a terminal, using the sample document");
    return Ok(Document::sample());
  }

  read_document(stdin.lock())
}

/// Read a whole stream as the document text
pub fn read_document(mut reader: impl Read) -> Result<Document> {
  let mut text = String::new();
  reader
    .read_to_string(&mut text)
    .map_err(|e| Error::Startup(format!("Failed to read stdin: {}", e)))?;
  debug!(bytes = text.len(), "Read input from stdin");
  Ok(Document::new(text))
}

#[cfg(test)]
mod tests {
  use super::*;
  use tempfile::TempDir;

  #[test]
  fn test_read_document() {
    let doc = read_document(&b"{\"x\": 1}\n"[..]).unwrap();
    assert_eq!(&**doc.input(), "{\"x\": 1}\n");
    assert_eq!(doc.output(), "");
  }

  #[test]
  fn test_invalid_utf8_is_startup_error() {
    let result = read_document(&[0xff, 0xfe, 0x00][..]);
    assert!(matches!(result, Err(Error::Startup(_))));
  }

  #[test]
  fn test_file_input() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("in.json");
    std::fs::write(&path, "[1, 2]").unwrap();

    let doc = load_document(Some(&path)).unwrap();
    assert_eq!(&**doc.input(), "[1, 2]");

    let missing = load_document(Some(&temp.path().join("nope.json")));
    assert!(matches!(missing, Err(Error::Startup(_))));
  }
}
