use async_trait::async_trait;
use parking_lot::Mutex;
use silo_extract::{Process, ProcessOutput};
use std::collections::VecDeque;

/// A [`Process`] fake that replays a fixed script of outputs, one per call, and records the
/// arguments it was invoked with. Returns an I/O error if called more times than scripted.
pub struct ScriptedProcess {
    script: Mutex<VecDeque<ProcessOutput>>,
    calls: Mutex<Vec<(String, Vec<String>)>>,
}

impl ScriptedProcess {
    pub fn new(script: impl IntoIterator<Item = ProcessOutput>) -> Self {
        Self {
            script: Mutex::new(script.into_iter().collect()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn succeeding() -> Self {
        Self::new([ProcessOutput { status: 0, stdout: String::new(), stderr: String::new() }])
    }

    pub fn calls(&self) -> Vec<(String, Vec<String>)> {
        self.calls.lock().clone()
    }
}

#[async_trait]
impl Process for ScriptedProcess {
    async fn run(&self, program: &str, args: &[String]) -> Result<ProcessOutput, std::io::Error> {
        self.calls.lock().push((program.to_string(), args.to_vec()));
        self.script
            .lock()
            .pop_front()
            .ok_or_else(|| std::io::Error::other("ScriptedProcess script exhausted"))
    }
}
