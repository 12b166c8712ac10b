//! Inline child scripts.
//!
//! A [`Script`] is source text handed to a runtime (`python3`, `sh`, ...)
//! instead of a file on disk. Before running, the source is wrapped with the
//! lines that drive the child's side of the exchange and written to a
//! uniquely named temporary file. The file is removed when the exchange
//! finishes, whether it succeeded or not.
//!
//! # Example
//!
//! ```
//! use stdio_exchange::script::Script;
//!
//! let script = Script::new("output = sorted(input)")
//!     .prologue("import csconnector\ncsconnector.init_environment()")
//!     .on_input("input = csconnector.get_input()")
//!     .on_output("csconnector.set_output(output)")
//!     .suffix(".py");
//!
//! let text = script.render(true, true);
//! assert!(text.starts_with("import csconnector\n"));
//! assert!(text.ends_with("csconnector.set_output(output)\n"));
//! ```

use std::io::Write;
use std::path::PathBuf;

use tempfile::TempPath;
use tracing::trace;

use crate::error::Result;

/// Script source plus the glue lines placed around it.
#[derive(Debug, Clone, Default)]
pub struct Script {
    source: String,
    prologue: Option<String>,
    on_input: Option<String>,
    on_output: Option<String>,
    suffix: String,
    dir: Option<PathBuf>,
}

impl Script {
    /// Wrap `source` with no glue lines.
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            ..Self::default()
        }
    }

    /// Lines placed before everything else (imports, initialization).
    pub fn prologue(mut self, lines: impl Into<String>) -> Self {
        self.prologue = Some(lines.into());
        self
    }

    /// Lines that read the input payload; only emitted when the call sends one.
    pub fn on_input(mut self, lines: impl Into<String>) -> Self {
        self.on_input = Some(lines.into());
        self
    }

    /// Lines that write the output payload; only emitted when the call expects one.
    pub fn on_output(mut self, lines: impl Into<String>) -> Self {
        self.on_output = Some(lines.into());
        self
    }

    /// File name suffix, e.g. `.py`. Some runtimes care.
    pub fn suffix(mut self, suffix: impl Into<String>) -> Self {
        self.suffix = suffix.into();
        self
    }

    /// Write the temporary file under `dir` instead of the system temp dir.
    pub fn dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.dir = Some(dir.into());
        self
    }

    /// Full file text for a call with or without input/output.
    pub fn render(&self, has_input: bool, has_output: bool) -> String {
        let mut text = String::new();
        let mut push = |lines: &str| {
            text.push_str(lines);
            if !lines.ends_with('\n') {
                text.push('\n');
            }
        };

        if let Some(lines) = &self.prologue {
            push(lines);
        }
        if has_input {
            if let Some(lines) = &self.on_input {
                push(lines);
            }
        }
        push(&self.source);
        if has_output {
            if let Some(lines) = &self.on_output {
                push(lines);
            }
        }
        text
    }

    /// Write the rendered script to a fresh temporary file.
    ///
    /// The returned path deletes the file when dropped.
    pub(crate) fn materialize(&self, has_input: bool, has_output: bool) -> Result<TempPath> {
        let mut builder = tempfile::Builder::new();
        builder.prefix("exchange-").suffix(&self.suffix);
        let mut file = match &self.dir {
            Some(dir) => builder.tempfile_in(dir)?,
            None => builder.tempfile()?,
        };

        file.write_all(self.render(has_input, has_output).as_bytes())?;
        file.flush()?;

        let path = file.into_temp_path();
        trace!(path = %path.display(), "script written");
        Ok(path)
    }
}
