use async_trait::async_trait;
use std::process::Stdio;
use tokio::process::Command;

#[derive(Clone, Debug)]
pub struct ProcessOutput {
    pub status: i32,
    pub stdout: String,
    pub stderr: String,
}

impl ProcessOutput {
    pub fn success(&self) -> bool {
        self.status == 0
    }
}

/// Subprocess collaborator: spawn with stdin closed, capture both streams, report the exit
/// code. Used by extraction strategies that shell out to an external tool.
#[async_trait]
pub trait Process: Send + Sync {
    async fn run(&self, program: &str, args: &[String]) -> Result<ProcessOutput, std::io::Error>;
}

#[derive(Clone, Copy, Debug, Default)]
pub struct TokioProcess;

#[async_trait]
impl Process for TokioProcess {
    async fn run(&self, program: &str, args: &[String]) -> Result<ProcessOutput, std::io::Error> {
        tracing::debug!(program, ?args, "starting subprocess");
        let output = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await?;

        let status = output.status.code().unwrap_or(-1);
        tracing::debug!(program, status, "subprocess finished");

        Ok(ProcessOutput {
            status,
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}
