use crate::error::{ProcessError, Result};
use std::time::{Duration, Instant};

/// Wall-clock budget for one pipeline invocation.
#[derive(Debug, Clone, Copy)]
pub struct Deadline {
    started: Instant,
    budget: Option<Duration>,
}

impl Deadline {
    pub fn start(budget: Option<Duration>) -> Self {
        Self {
            started: Instant::now(),
            budget,
        }
    }

    pub fn unbounded() -> Self {
        Self::start(None)
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    pub fn check(&self) -> Result<()> {
        match self.budget {
            Some(budget) if self.started.elapsed() > budget => Err(ProcessError::Timeout {
                budget_secs: budget.as_secs_f64(),
            }),
            _ => Ok(()),
        }
    }
}
