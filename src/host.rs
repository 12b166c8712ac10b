//! Host side: spawn a child, hand it one payload, collect one payload back.
//!
//! Mirrors [`Channel`](crate::Channel) from the parent's point of view. In
//! token-framed mode a fresh [`SessionToken`] is sent as the first stdin line
//! and stripped from the front of the child's stdout before decoding.
//!
//! Four call shapes are supported:
//!
//! | method | sends input | decodes output |
//! |---|---|---|
//! | [`Runner::call`] | yes | yes |
//! | [`Runner::call_no_output`] | yes | no |
//! | [`Runner::call_output_only`] | no | yes |
//! | [`Runner::call_silent`] | no | no |
//!
//! Calls without input still send the token line followed by `""`, so a child
//! reading its input never blocks on an empty stdin.
//!
//! # Example
//!
//! ```ignore
//! use stdio_exchange::host::Runner;
//!
//! let exchange = Runner::new("python3")
//!     .arg("sort_double.py")
//!     .timeout(std::time::Duration::from_secs(10))
//!     .call::<_, Vec<f64>>(&vec![3.0, 1.0, 2.0])
//!     .await?;
//! assert_eq!(exchange.output, vec![2.0, 4.0, 6.0]);
//! ```

use std::ffi::OsString;
use std::path::PathBuf;
use std::process::{ExitStatus, Stdio};
use std::time::{Duration, Instant};

use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::process::{Child, Command};
use tracing::{debug, warn};

use crate::codec::JsonCodec;
use crate::config::Framing;
use crate::error::{ExchangeError, Result};
use crate::script::Script;
use crate::token::SessionToken;

/// Payload sent to children when the call carries no input.
const EMPTY_INPUT: &str = "";

/// Result of one completed exchange with a child.
#[derive(Debug)]
pub struct Exchange<T> {
    /// Decoded child output.
    pub output: T,
    /// Everything the child wrote to stderr.
    pub stderr: String,
    /// Child exit status (always success here).
    pub status: ExitStatus,
    /// Wall time from spawn to exit.
    pub elapsed: Duration,
}

/// Raw output of a finished child.
struct Finished {
    stdout: Vec<u8>,
    stderr: String,
    status: ExitStatus,
    elapsed: Duration,
}

/// Builder and driver for child-process exchanges.
#[derive(Debug, Clone)]
pub struct Runner {
    program: OsString,
    args: Vec<OsString>,
    framing: Framing,
    timeout: Option<Duration>,
    current_dir: Option<PathBuf>,
    script: Option<Script>,
}

impl Runner {
    /// Create a runner for `program` (token-framed, no timeout).
    pub fn new(program: impl Into<OsString>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            framing: Framing::Token,
            timeout: None,
            current_dir: None,
            script: None,
        }
    }

    /// Create a runner that hands inline `script` source to `runtime`.
    ///
    /// The rendered script is written to a temporary file whose path is
    /// appended after any configured arguments. The file is deleted once
    /// the call returns, on success and on every error path.
    pub fn script(runtime: impl Into<OsString>, script: Script) -> Self {
        Self {
            script: Some(script),
            ..Self::new(runtime)
        }
    }

    /// Append one argument.
    pub fn arg(mut self, arg: impl Into<OsString>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Append several arguments.
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Set the framing the child expects.
    pub fn framing(mut self, framing: Framing) -> Self {
        self.framing = framing;
        self
    }

    /// Kill the child if it runs longer than `timeout`.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Run the child in `dir`.
    pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.current_dir = Some(dir.into());
        self
    }

    /// Send `input` to the child and decode its single output payload.
    ///
    /// # Errors
    ///
    /// - [`ExchangeError::ChildFailed`] on a non-zero exit
    /// - [`ExchangeError::Timeout`] if the timeout elapsed
    /// - [`ExchangeError::MissingToken`] if framed output lacks the token
    /// - [`ExchangeError::MalformedInput`] if the output is not valid JSON
    pub async fn call<I, O>(&self, input: &I) -> Result<Exchange<O>>
    where
        I: Serialize + ?Sized,
        O: DeserializeOwned,
    {
        let token = self.session_token();
        let finished = self.run(&token, input, true, true).await?;
        Self::decode_output(&token, self.framing, finished)
    }

    /// Send `input` to a child that produces no output payload.
    ///
    /// Returns the wall time the child ran for.
    pub async fn call_no_output<I>(&self, input: &I) -> Result<Duration>
    where
        I: Serialize + ?Sized,
    {
        let token = self.session_token();
        let finished = self.run(&token, input, true, false).await?;
        Ok(Self::discard_output(finished))
    }

    /// Run a child that takes no input and decode its single output payload.
    pub async fn call_output_only<O>(&self) -> Result<Exchange<O>>
    where
        O: DeserializeOwned,
    {
        let token = self.session_token();
        let finished = self.run(&token, EMPTY_INPUT, false, true).await?;
        Self::decode_output(&token, self.framing, finished)
    }

    /// Run a child with neither input nor output payload.
    ///
    /// Returns the wall time the child ran for.
    pub async fn call_silent(&self) -> Result<Duration> {
        let token = self.session_token();
        let finished = self.run(&token, EMPTY_INPUT, false, false).await?;
        Ok(Self::discard_output(finished))
    }

    fn decode_output<O: DeserializeOwned>(
        token: &SessionToken,
        framing: Framing,
        finished: Finished,
    ) -> Result<Exchange<O>> {
        let body = if framing == Framing::Token {
            token.strip_from(&finished.stdout)?
        } else {
            &finished.stdout[..]
        };
        let output = JsonCodec::decode(body)?;

        Ok(Exchange {
            output,
            stderr: finished.stderr,
            status: finished.status,
            elapsed: finished.elapsed,
        })
    }

    fn discard_output(finished: Finished) -> Duration {
        if !finished.stdout.is_empty() {
            debug!(len = finished.stdout.len(), "ignoring child stdout");
        }
        finished.elapsed
    }

    /// Run `program --version` and return its trimmed output.
    ///
    /// Some interpreters print the version on stderr; it is used when
    /// stdout is empty.
    pub async fn version(&self) -> Result<String> {
        let out = Command::new(&self.program)
            .arg("--version")
            .stdin(Stdio::null())
            .output()
            .await?;

        if !out.status.success() {
            return Err(ExchangeError::ChildFailed {
                status: out.status,
                stderr: String::from_utf8_lossy(&out.stderr).into_owned(),
            });
        }

        let text = if out.stdout.is_empty() {
            out.stderr
        } else {
            out.stdout
        };
        Ok(String::from_utf8_lossy(&text).trim().to_string())
    }

    /// True if `program --version` runs successfully.
    pub async fn is_available(&self) -> bool {
        self.version().await.is_ok()
    }

    fn session_token(&self) -> SessionToken {
        match self.framing {
            Framing::Token => SessionToken::generate(),
            Framing::Unframed => SessionToken::default(),
        }
    }

    async fn run<I>(
        &self,
        token: &SessionToken,
        input: &I,
        has_input: bool,
        has_output: bool,
    ) -> Result<Finished>
    where
        I: Serialize + ?Sized,
    {
        let mut stdin_bytes = token.as_bytes().to_vec();
        stdin_bytes.extend(JsonCodec::encode(input)?);

        // Lives until this function returns; dropping it deletes the file.
        let script_path = match &self.script {
            Some(script) => Some(script.materialize(has_input, has_output)?),
            None => None,
        };

        let mut command = Command::new(&self.program);
        command.args(&self.args);
        if let Some(path) = &script_path {
            command.arg(path.as_os_str());
        }
        command
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        if let Some(dir) = &self.current_dir {
            command.current_dir(dir);
        }

        let started = Instant::now();
        let mut child = command.spawn()?;
        debug!(program = ?self.program, pid = ?child.id(), "child spawned");

        let exchange = Self::drive(&mut child, stdin_bytes);
        let outcome = match self.timeout {
            Some(limit) => tokio::time::timeout(limit, exchange)
                .await
                .map_err(|_| limit),
            None => Ok(exchange.await),
        };
        let (stdout, stderr, status) = match outcome {
            Ok(result) => result?,
            Err(limit) => {
                warn!(program = ?self.program, ?limit, "child timed out, killing");
                if let Err(e) = child.kill().await {
                    warn!("failed to kill child: {}", e);
                }
                return Err(ExchangeError::Timeout(limit));
            }
        };
        let elapsed = started.elapsed();

        let stderr = String::from_utf8_lossy(&stderr).into_owned();
        if !status.success() {
            return Err(ExchangeError::ChildFailed { status, stderr });
        }

        debug!(?elapsed, stdout_len = stdout.len(), "child finished");
        Ok(Finished {
            stdout,
            stderr,
            status,
            elapsed,
        })
    }

    /// Feed stdin and drain stdout/stderr concurrently, then wait for exit.
    async fn drive(
        child: &mut Child,
        stdin_bytes: Vec<u8>,
    ) -> Result<(Vec<u8>, Vec<u8>, ExitStatus)> {
        let stdin = child.stdin.take();
        let stdout = child.stdout.take();
        let stderr = child.stderr.take();

        let feed = async move {
            if let Some(mut pipe) = stdin {
                match pipe.write_all(&stdin_bytes).await {
                    // Child may exit without reading its input.
                    Err(e) if e.kind() == std::io::ErrorKind::BrokenPipe => {}
                    other => other?,
                }
                // Dropping the pipe closes the child's stdin.
            }
            Ok::<_, std::io::Error>(())
        };
        let read_out = async move {
            let mut buf = Vec::new();
            if let Some(mut pipe) = stdout {
                pipe.read_to_end(&mut buf).await?;
            }
            Ok::<_, std::io::Error>(buf)
        };
        let read_err = async move {
            let mut buf = Vec::new();
            if let Some(mut pipe) = stderr {
                pipe.read_to_end(&mut buf).await?;
            }
            Ok::<_, std::io::Error>(buf)
        };

        let ((), out, err) = tokio::try_join!(feed, read_out, read_err)?;
        let status = child.wait().await?;
        Ok((out, err, status))
    }
}
