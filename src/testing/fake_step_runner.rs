use std::path::Path;
use std::sync::Mutex;

use crate::domain::{AppError, ProjectCommandContext};
use crate::ports::{CustomStepRunner, StepRunner};

/// Scripted step runner: fixed output or fixed error, counts invocations.
pub struct FakeStepRunner {
    output: String,
    error: Option<String>,
    pub calls: Mutex<u32>,
    pub seen_args: Mutex<Vec<Vec<String>>>,
}

impl FakeStepRunner {
    pub fn returning(output: &str) -> Self {
        FakeStepRunner {
            output: output.to_string(),
            error: None,
            calls: Mutex::new(0),
            seen_args: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(details: &str) -> Self {
        FakeStepRunner { error: Some(details.to_string()), ..Self::returning("") }
    }
}

impl StepRunner for FakeStepRunner {
    fn run(
        &self,
        _ctx: &ProjectCommandContext,
        extra_args: &[String],
        _path: &Path,
    ) -> Result<String, AppError> {
        *self.calls.lock().unwrap() += 1;
        self.seen_args.lock().unwrap().push(extra_args.to_vec());
        match &self.error {
            Some(details) => Err(AppError::Step(details.clone())),
            None => Ok(self.output.clone()),
        }
    }
}

/// Scripted `run` step runner: records commands, succeeds with empty output.
#[derive(Default)]
pub struct FakeCustomStepRunner {
    pub commands: Mutex<Vec<String>>,
    pub error: Option<String>,
}

impl CustomStepRunner for FakeCustomStepRunner {
    fn run(
        &self,
        _ctx: &ProjectCommandContext,
        command: &str,
        _path: &Path,
    ) -> Result<String, AppError> {
        self.commands.lock().unwrap().push(command.to_string());
        match &self.error {
            Some(details) => Err(AppError::Step(details.clone())),
            None => Ok(String::new()),
        }
    }
}
