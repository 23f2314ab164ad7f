//! quillc-drv - the thin driver binary crate.
//!
//! Wires lexer → parser → `quillc-gen` together: reads a source file,
//! splices `#import`s, lexes, parses, checks the recoverable-error latch,
//! and hands the tree to [`quillc_gen::generate`]. Invoking an external
//! `clang`-family linker to turn the resulting `.ll` text into a native
//! executable is out of scope (SPEC_FULL.md §1) — this crate stops once it
//! has written that text out.

pub mod cli;
pub mod diagnostics;
pub mod import;

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context as _};
use log::debug;

use quillc_util::Handler;

pub use cli::{Cli, Target};

/// Resolved compilation settings for one invocation (base spec's `Config`,
/// scaled down to what `quillc`'s CLI actually exposes — flag parsing and
/// native-toolchain invocation are out of scope, so there is no
/// `opt_level`/`library_paths`/`incremental` here the way a full driver's
/// `Config` would carry).
pub struct Config {
    pub input: PathBuf,
    pub output: Option<PathBuf>,
    pub target: Target,
    pub emit_tokens: bool,
    pub emit_ast: bool,
}

impl From<Cli> for Config {
    fn from(cli: Cli) -> Self {
        Self {
            input: cli.input,
            output: cli.output,
            target: cli.target,
            emit_tokens: cli.emit_tokens,
            emit_ast: cli.emit_ast,
        }
    }
}

/// One compilation: owns nothing across calls to [`Session::compile`], the
/// same way `quillc-gen::generate` owns nothing across calls — there is no
/// process-wide compiler state (SPEC_FULL.md §5).
pub struct Session {
    config: Config,
}

impl Session {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Runs the whole pipeline for `self.config.input`, writing the
    /// generated IR to `self.config.output` (or stdout) on success.
    pub fn compile(&self) -> anyhow::Result<()> {
        let path = &self.config.input;
        let base_dir = path.parent().unwrap_or_else(|| Path::new("."));

        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading '{}'", path.display()))?;
        // Base spec §6: leading/trailing newlines are trimmed before lexing.
        let source = raw.trim_matches('\n').to_string();

        let tokens = quillc_lex::lex(&source);
        let tokens = import::splice_imports(tokens, base_dir)
            .with_context(|| format!("splicing #import in '{}'", path.display()))?;

        if self.config.emit_tokens {
            for token in &tokens {
                eprintln!("{token:?}");
            }
        }

        let handler = Handler::new();
        let ast = quillc_par::parse(tokens, &handler);

        if self.config.emit_ast {
            eprintln!("{ast:#?}");
        }

        if handler.has_errors() {
            diagnostics::render_all(&handler.diagnostics(), path, &source);
            bail!(
                "{} error(s) while parsing '{}'",
                handler.error_count(),
                path.display()
            );
        }

        debug!(
            "lowering {} top-level item(s) for target {}",
            ast.len(),
            self.config.target
        );
        let module_name = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("quill_module");
        let ir = quillc_gen::generate(&ast, module_name, self.config.target.triple())
            .context("code generation failed")?;

        self.write_output(&ir)
    }

    fn write_output(&self, ir: &str) -> anyhow::Result<()> {
        match &self.config.output {
            Some(path) => {
                std::fs::write(path, ir)
                    .with_context(|| format!("writing output to '{}'", path.display()))?;
            }
            None => {
                std::io::stdout()
                    .write_all(ir.as_bytes())
                    .context("writing output to stdout")?;
            }
        }
        Ok(())
    }
}

/// Entry point called by `main`. Installs `env_logger` (respecting
/// `--verbose`), then runs one compilation per the parsed [`Cli`].
pub fn run() -> anyhow::Result<()> {
    let cli = <Cli as clap::Parser>::parse();

    let mut builder = env_logger::Builder::from_default_env();
    if cli.verbose {
        builder.filter_level(log::LevelFilter::Debug);
    }
    let _ = builder.try_init();

    let session = Session::new(Config::from(cli));
    session.compile()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write as _;

    fn write_source(dir: &tempfile::TempDir, name: &str, contents: &str) -> PathBuf {
        let path = dir.path().join(name);
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        path
    }

    #[test]
    fn compiles_hello_world_to_llvm_ir() {
        let dir = tempfile::tempdir().unwrap();
        let input = write_source(&dir, "hello.quill", "fn main():void {\n    printnum(42)\n}\n");
        let output = dir.path().join("hello.ll");

        let session = Session::new(Config {
            input,
            output: Some(output.clone()),
            target: Target::Linux,
            emit_tokens: false,
            emit_ast: false,
        });
        session.compile().expect("compilation should succeed");

        let ir = std::fs::read_to_string(&output).unwrap();
        assert!(ir.contains("@printnum"));
        assert!(ir.contains("x86_64-pc-linux-gnu"));
    }

    #[test]
    fn parse_errors_abort_before_codegen() {
        let dir = tempfile::tempdir().unwrap();
        let input = write_source(&dir, "broken.quill", "let x : number = \n");

        let session = Session::new(Config {
            input,
            output: Some(dir.path().join("broken.ll")),
            target: Target::Linux,
            emit_tokens: false,
            emit_ast: false,
        });
        assert!(session.compile().is_err());
    }

    #[test]
    fn import_splices_referenced_file_once() {
        let dir = tempfile::tempdir().unwrap();
        write_source(&dir, "shared.quill", "fn helper():void {\n    printnum(1)\n}\n");
        let input = write_source(
            &dir,
            "main.quill",
            "#import \"shared.quill\"\nfn main():void {\n    helper()\n}\n",
        );
        let output = dir.path().join("main.ll");

        let session = Session::new(Config {
            input,
            output: Some(output.clone()),
            target: Target::Linux,
            emit_tokens: false,
            emit_ast: false,
        });
        session.compile().expect("compilation should succeed");

        let ir = std::fs::read_to_string(&output).unwrap();
        assert!(ir.contains("@helper"));
    }
}
