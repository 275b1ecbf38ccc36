use std::process::Command;

pub const AWS_CLI: &str = "aws";

// The CLI exits with 254 when the service rejected the call and 255 on
// client-side failures; both are treated as non-fatal during deployment.
const BENIGN_EXIT_CODES: [i32; 2] = [254, 255];
const ALREADY_EXISTS: &str = "already exists";
const RESOURCE_NOT_FOUND: &str = "ResourceNotFoundException";
const DISPLAY_WIDTH: usize = 80;

/// A single `aws` invocation, kept as an argument vector so nothing is ever
/// interpolated into a shell string.
#[derive(Debug, Clone, PartialEq)]
pub struct AwsCommand {
    args: Vec<String>,
}

impl AwsCommand {
    pub fn new<I, S>(args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn region(self, region: &str) -> Self {
        self.arg("--region").arg(region)
    }

    pub fn with_profile(self, profile: Option<&str>) -> Self {
        match profile {
            Some(profile) => self.arg("--profile").arg(profile),
            None => self,
        }
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// Service and operation, e.g. `lambda get-function`.
    pub fn operation(&self) -> String {
        self.args
            .iter()
            .take(2)
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// The value following `flag`, if the flag was passed.
    pub fn flag_value(&self, flag: &str) -> Option<&str> {
        self.args
            .iter()
            .position(|arg| arg == flag)
            .and_then(|index| self.args.get(index + 1))
            .map(String::as_str)
    }

    /// The command line as logged, cut to a single readable line.
    pub fn display(&self) -> String {
        let full = format!("{} {}", AWS_CLI, self.args.join(" "));
        if full.chars().count() > DISPLAY_WIDTH {
            let truncated: String = full.chars().take(DISPLAY_WIDTH).collect();
            format!("{}...", truncated)
        } else {
            full
        }
    }
}

/// What a finished CLI process reported back.
#[derive(Debug, Clone, Default)]
pub struct CommandOutput {
    pub status: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum CommandOutcome {
    Completed(String),
    Tolerated { status: Option<i32>, detail: String },
    Failed { status: Option<i32>, detail: String },
}

#[derive(Debug, Clone, PartialEq)]
pub enum ProbeOutcome {
    Found,
    Absent,
    Failed { status: Option<i32>, detail: String },
}

impl CommandOutput {
    pub fn success(stdout: impl Into<String>) -> Self {
        Self {
            status: Some(0),
            stdout: stdout.into(),
            stderr: String::new(),
        }
    }

    pub fn failure(status: i32, stderr: impl Into<String>) -> Self {
        Self {
            status: Some(status),
            stdout: String::new(),
            stderr: stderr.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == Some(0)
    }

    fn has_benign_status(&self) -> bool {
        self.status
            .is_some_and(|status| BENIGN_EXIT_CODES.contains(&status))
    }

    fn mentions(&self, needle: &str) -> bool {
        let needle = needle.to_lowercase();
        self.stdout.to_lowercase().contains(&needle) || self.stderr.to_lowercase().contains(&needle)
    }

    fn detail(&self) -> String {
        let stderr = self.stderr.trim();
        if stderr.is_empty() {
            self.stdout.trim().to_string()
        } else {
            stderr.to_string()
        }
    }

    /// Classify the result of a command that changes cloud state.
    pub fn classify(&self) -> CommandOutcome {
        if self.is_success() {
            CommandOutcome::Completed(self.stdout.trim().to_string())
        } else if self.has_benign_status() || self.mentions(ALREADY_EXISTS) {
            CommandOutcome::Tolerated {
                status: self.status,
                detail: self.detail(),
            }
        } else {
            CommandOutcome::Failed {
                status: self.status,
                detail: self.detail(),
            }
        }
    }

    /// Classify the result of a read used to decide whether a resource exists.
    pub fn probe(&self) -> ProbeOutcome {
        if self.is_success() {
            ProbeOutcome::Found
        } else if self.mentions(RESOURCE_NOT_FOUND) || self.has_benign_status() {
            ProbeOutcome::Absent
        } else {
            ProbeOutcome::Failed {
                status: self.status,
                detail: self.detail(),
            }
        }
    }
}

/// Runs CLI commands to completion and captures their output.
pub trait CommandRunner {
    fn run(&self, command: &AwsCommand) -> std::io::Result<CommandOutput>;
}

#[derive(Debug, Clone)]
pub struct SystemRunner {
    program: String,
}

impl SystemRunner {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl Default for SystemRunner {
    fn default() -> Self {
        Self::new(AWS_CLI)
    }
}

impl CommandRunner for SystemRunner {
    fn run(&self, command: &AwsCommand) -> std::io::Result<CommandOutput> {
        let output = Command::new(&self.program).args(command.args()).output()?;

        Ok(CommandOutput {
            status: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}
