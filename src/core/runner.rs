use serde::Serialize;

use crate::domain::commands::{Command, CommandOutput};
use crate::domain::ports::CommandHandler;
use crate::utils::error::ErrorCategory;

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum CommandReport {
    Ok {
        index: usize,
        output: CommandOutput,
    },
    Failed {
        index: usize,
        category: String,
        message: String,
        suggestion: String,
    },
}

impl CommandReport {
    pub fn is_ok(&self) -> bool {
        matches!(self, CommandReport::Ok { .. })
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub succeeded: usize,
    pub failed: usize,
    pub reports: Vec<CommandReport>,
    /// Category of the first failure, if any.
    #[serde(skip)]
    pub first_failure: Option<ErrorCategory>,
}

/// Replays commands in order against a handler. A failed command is
/// reported and the run moves on to the next one unless `fail_fast` is set.
pub struct ScriptRunner<H: CommandHandler> {
    handler: H,
    fail_fast: bool,
}

impl<H: CommandHandler> ScriptRunner<H> {
    pub fn new(handler: H) -> Self {
        Self {
            handler,
            fail_fast: false,
        }
    }

    pub fn with_fail_fast(mut self, fail_fast: bool) -> Self {
        self.fail_fast = fail_fast;
        self
    }

    pub fn handler(&self) -> &H {
        &self.handler
    }

    pub async fn run(&self, commands: Vec<Command>) -> RunSummary {
        tracing::info!("Running {} commands", commands.len());

        let mut summary = RunSummary {
            succeeded: 0,
            failed: 0,
            reports: Vec::with_capacity(commands.len()),
            first_failure: None,
        };

        for (index, command) in commands.into_iter().enumerate() {
            tracing::debug!("Command #{}: {:?}", index, command);
            match self.handler.handle(command).await {
                Ok(output) => {
                    summary.succeeded += 1;
                    summary.reports.push(CommandReport::Ok { index, output });
                }
                Err(e) => {
                    tracing::warn!("Command #{} failed: {}", index, e);
                    summary.failed += 1;
                    summary.first_failure.get_or_insert(e.category());
                    summary.reports.push(CommandReport::Failed {
                        index,
                        category: format!("{:?}", e.category()),
                        message: e.to_string(),
                        suggestion: e.recovery_suggestion(),
                    });
                    if self.fail_fast {
                        tracing::info!("Stopping after failed command #{}", index);
                        break;
                    }
                }
            }
        }

        tracing::info!(
            "Finished: {} succeeded, {} failed",
            summary.succeeded,
            summary.failed
        );
        summary
    }
}
