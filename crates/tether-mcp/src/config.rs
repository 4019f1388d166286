//! Launch configuration for a stdio MCP server.

use std::collections::BTreeMap;
use std::process::Stdio;
use std::time::Duration;

use crate::error::{McpError, McpResult};

/// Default bound on handshake plus capability listing.
pub const DEFAULT_HANDSHAKE_TIMEOUT: Duration = Duration::from_secs(30);

/// How to start the capability provider process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct McpServerConfig {
    pub program: String,
    pub args: Vec<String>,
    pub env: BTreeMap<String, String>,
    pub handshake_timeout: Duration,
}

impl McpServerConfig {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            env: BTreeMap::new(),
            handshake_timeout: DEFAULT_HANDSHAKE_TIMEOUT,
        }
    }

    /// Parse a whitespace separated command line such as
    /// `"node dist/index.js"`.
    pub fn from_command_line(command_line: &str) -> McpResult<Self> {
        let mut parts = command_line.split_whitespace();
        let program = parts.next().ok_or(McpError::EmptyCommand)?;
        Ok(Self::new(program).with_args(parts))
    }

    #[must_use]
    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.args
            .extend(args.into_iter().map(|arg| arg.as_ref().to_string()));
        self
    }

    #[must_use]
    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }

    #[must_use]
    pub fn with_handshake_timeout(mut self, timeout: Duration) -> Self {
        self.handshake_timeout = timeout;
        self
    }

    /// The command line as a single string, for logs and errors.
    pub fn display_command(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }

    pub(crate) fn command(&self) -> McpResult<tokio::process::Command> {
        if self.program.trim().is_empty() {
            return Err(McpError::EmptyCommand);
        }

        let mut cmd = tokio::process::Command::new(&self.program);
        cmd.args(&self.args)
            .envs(&self.env)
            .stderr(Stdio::inherit())
            .kill_on_drop(true);
        Ok(cmd)
    }
}
