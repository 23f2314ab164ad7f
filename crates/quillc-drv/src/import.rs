//! `#import "path"` splicing (SPEC_FULL.md §6, out of `quillc-par`'s scope).
//!
//! The lexer has no dedicated import token: `#` lexes as an `Unknown("#")`
//! token and `import` as a plain `Ident`, exactly as `original_source/src/
//! main.cxx` treats them. This pass scans the already-tokenized stream for
//! the three-token sequence `# import "<path>"`, lexes the referenced file
//! independently, and splices its entire token stream in at the position
//! the three import tokens stood — once, non-recursively. An import whose
//! own source contains a further `#import` is left untouched; the base
//! spec scopes only the single-level splice described here.

use std::path::{Path, PathBuf};

use quillc_lex::{Token, TokenKind};

#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    #[error("cannot read imported file '{0}': {1}")]
    Read(PathBuf, std::io::Error),
}

/// Resolves every top-level `#import "path"` in `tokens`, relative to
/// `base_dir` (the importing file's own directory). Returns the spliced
/// token stream.
pub fn splice_imports(tokens: Vec<Token>, base_dir: &Path) -> Result<Vec<Token>, ImportError> {
    let mut out = Vec::with_capacity(tokens.len());
    let mut i = 0;
    while i < tokens.len() {
        if let Some((path_text, consumed)) = match_import(&tokens[i..]) {
            let path = base_dir.join(&path_text);
            let source =
                std::fs::read_to_string(&path).map_err(|e| ImportError::Read(path.clone(), e))?;
            out.extend(quillc_lex::lex(source.trim()));
            i += consumed;
        } else {
            out.push(tokens[i].clone());
            i += 1;
        }
    }
    Ok(out)
}

/// Matches `Unknown("#")`, `Ident("import")`, `StringLit(path)` at the start
/// of `tokens`, returning the import path and how many tokens it spans.
fn match_import(tokens: &[Token]) -> Option<(String, usize)> {
    let hash = tokens.first()?;
    if hash.kind != TokenKind::Unknown || hash.value != "#" {
        return None;
    }
    let ident = tokens.get(1)?;
    if ident.kind != TokenKind::Ident || ident.value != "import" {
        return None;
    }
    let path = tokens.get(2)?;
    if path.kind != TokenKind::StringLit {
        return None;
    }
    Some((path.value.clone(), 3))
}
