//! # Bounded Retry Stages
//!
//! Small state machine shared by research and synthesis: a capability is
//! attempted up to `max_attempts` times, then the run moves to a
//! deterministic fallback.
//!
//! ```text
//! Attempting --fail--> Retrying --fail--> FallingBack --> Done
//!      |                   |
//!      +------ok-----------+-------------------------------> Done
//! ```

use serde::{Deserialize, Serialize};

/// Stage of a bounded retry run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RetryStage {
    /// First attempt in flight
    Attempting,
    /// A later attempt in flight
    Retrying,
    /// Attempts exhausted, degraded path in flight
    FallingBack,
    /// Finished
    Done,
}

/// Outcome recorded when the machine reaches `Done`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RetryOutcome {
    Primary,
    Fallback,
}

#[derive(Debug, Clone)]
pub struct RetryMachine {
    /// Current stage
    pub stage: RetryStage,
    /// Attempts started so far
    pub attempts: u32,
    /// Attempts allowed before falling back
    pub max_attempts: u32,
    outcome: Option<RetryOutcome>,
}

impl RetryMachine {
    pub fn new(max_attempts: u32) -> Self {
        Self {
            stage: RetryStage::Attempting,
            attempts: 0,
            max_attempts: max_attempts.max(1),
            outcome: None,
        }
    }

    /// Synthesis allows one retry after the first schema failure.
    pub fn synthesis() -> Self {
        Self::new(2)
    }

    /// Research gets a single attempt before direct search.
    pub fn research() -> Self {
        Self::new(1)
    }

    /// Whether another attempt should be started.
    pub fn should_attempt(&self) -> bool {
        matches!(self.stage, RetryStage::Attempting | RetryStage::Retrying)
    }

    /// Record the start of an attempt, returning its 1-based number.
    pub fn begin_attempt(&mut self) -> u32 {
        self.attempts += 1;
        self.attempts
    }

    /// The current attempt succeeded.
    pub fn succeed(&mut self) {
        self.stage = RetryStage::Done;
        self.outcome = Some(RetryOutcome::Primary);
    }

    /// The current attempt failed recoverably. Returns `true` if another attempt follows.
    pub fn fail(&mut self) -> bool {
        if self.attempts >= self.max_attempts {
            self.stage = RetryStage::FallingBack;
            false
        } else {
            self.stage = RetryStage::Retrying;
            true
        }
    }

    /// Skip any remaining attempts and go straight to the fallback.
    pub fn fall_back(&mut self) {
        self.stage = RetryStage::FallingBack;
    }

    /// The fallback produced a result.
    pub fn finish_fallback(&mut self) {
        self.stage = RetryStage::Done;
        self.outcome = Some(RetryOutcome::Fallback);
    }

    pub fn is_falling_back(&self) -> bool {
        self.stage == RetryStage::FallingBack
    }

    pub fn outcome(&self) -> Option<RetryOutcome> {
        self.outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_synthesis_retry_then_fallback() {
        let mut machine = RetryMachine::synthesis();
        assert_eq!(machine.stage, RetryStage::Attempting);

        assert_eq!(machine.begin_attempt(), 1);
        assert!(machine.fail());
        assert_eq!(machine.stage, RetryStage::Retrying);

        assert_eq!(machine.begin_attempt(), 2);
        assert!(!machine.fail());
        assert!(machine.is_falling_back());
        assert!(!machine.should_attempt());

        machine.finish_fallback();
        assert_eq!(machine.stage, RetryStage::Done);
        assert_eq!(machine.outcome(), Some(RetryOutcome::Fallback));
    }

    #[test]
    fn test_success_on_retry() {
        let mut machine = RetryMachine::synthesis();
        machine.begin_attempt();
        machine.fail();
        machine.begin_attempt();
        machine.succeed();
        assert_eq!(machine.stage, RetryStage::Done);
        assert_eq!(machine.outcome(), Some(RetryOutcome::Primary));
        assert_eq!(machine.attempts, 2);
    }

    #[test]
    fn test_research_has_single_attempt() {
        let mut machine = RetryMachine::research();
        machine.begin_attempt();
        assert!(!machine.fail());
        assert!(machine.is_falling_back());
    }
}
