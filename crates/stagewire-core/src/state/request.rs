//! Shared request lifecycle.

use stagewire_proto::{Config, InputMode};
use tracing::debug;

use crate::StateError;

/// Lifecycle phase of the current request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    /// Waiting for the ready handshake
    NotReady,
    /// Accepting input
    Ready,
    /// Input ended; output may be produced
    InputEnded,
    /// Output ended; waiting for reset or session end
    OutputEnded,
    /// Interrupted; waiting for reset or session end
    Interrupted,
    /// Session over
    SessionEnded,
}

/// Lifecycle state shared by both roles.
///
/// The configuration accepted by [`ready`](Self::ready) survives resets, so
/// readiness is a property of the session while the phase belongs to the
/// current request.
#[derive(Debug, Clone)]
pub struct RequestState {
    phase: Phase,
    config: Option<Config>,
}

impl Default for RequestState {
    fn default() -> Self {
        Self::new()
    }
}

impl RequestState {
    /// Create a state waiting for the ready handshake.
    pub fn new() -> Self {
        Self { phase: Phase::NotReady, config: None }
    }

    /// Current phase
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Accepted session configuration, once ready.
    pub fn config(&self) -> Option<&Config> {
        self.config.as_ref()
    }

    /// Input mode of the session, once ready.
    pub fn input_mode(&self) -> Option<InputMode> {
        self.config.as_ref().map(|config| config.input_mode)
    }

    /// Whether the ready handshake completed.
    pub fn is_ready(&self) -> bool {
        self.config.is_some()
    }

    /// Whether input of the current request has ended.
    pub fn input_ended(&self) -> bool {
        matches!(self.phase, Phase::InputEnded | Phase::OutputEnded)
    }

    /// Whether output of the current request has ended.
    pub fn output_ended(&self) -> bool {
        self.phase == Phase::OutputEnded
    }

    /// Whether the current request was interrupted.
    pub fn is_interrupted(&self) -> bool {
        self.phase == Phase::Interrupted
    }

    /// Whether the session is over.
    pub fn session_ended(&self) -> bool {
        self.phase == Phase::SessionEnded
    }

    /// Fail unless the session is live and the request not interrupted.
    pub fn ensure_live(&self) -> Result<(), StateError> {
        match self.phase {
            Phase::SessionEnded => Err(StateError::SessionEnded),
            Phase::Interrupted => Err(StateError::Interrupted),
            _ => Ok(()),
        }
    }

    /// Fail unless live and ready.
    pub fn ensure_ready(&self) -> Result<(), StateError> {
        self.ensure_live()?;
        if self.phase == Phase::NotReady {
            return Err(StateError::NotReady);
        }
        Ok(())
    }

    /// Fail unless input may still be produced.
    pub fn ensure_input_open(&self) -> Result<(), StateError> {
        self.ensure_ready()?;
        if self.input_ended() {
            return Err(StateError::InputAlreadyEnded);
        }
        Ok(())
    }

    /// Fail unless output may be produced: input ended, output not ended.
    pub fn ensure_output_open(&self) -> Result<(), StateError> {
        self.ensure_live()?;
        match self.phase {
            Phase::NotReady | Phase::Ready => Err(StateError::InputNotEnded),
            Phase::OutputEnded => Err(StateError::OutputAlreadyEnded),
            _ => Ok(()),
        }
    }

    /// Fail unless the configured input mode is `expected`.
    pub fn ensure_input_mode(&self, expected: InputMode) -> Result<(), StateError> {
        match self.input_mode() {
            Some(actual) if actual != expected => {
                Err(StateError::WrongInputMode { expected, actual })
            },
            _ => Ok(()),
        }
    }

    /// Accept the session configuration and mark the request ready.
    ///
    /// # Errors
    ///
    /// `SessionEnded`, `Interrupted`, or `AlreadyReady`.
    pub fn ready(&mut self, config: Config) -> Result<(), StateError> {
        self.ensure_live()?;
        if self.config.is_some() {
            return Err(StateError::AlreadyReady);
        }

        debug!(input_mode = ?config.input_mode, chat_id = ?config.chat_id, "request ready");
        self.config = Some(config);
        self.phase = Phase::Ready;
        Ok(())
    }

    /// End input for the current request.
    pub fn end_input(&mut self) -> Result<(), StateError> {
        self.ensure_input_open()?;

        debug!("input ended");
        self.phase = Phase::InputEnded;
        Ok(())
    }

    /// End output for the current request.
    ///
    /// Completeness of the output is checked by the role wrappers, which own
    /// the registries.
    pub fn end_output(&mut self) -> Result<(), StateError> {
        self.ensure_output_open()?;

        debug!("output ended");
        self.phase = Phase::OutputEnded;
        Ok(())
    }

    /// Interrupt the current request from any live phase.
    pub fn interrupt(&mut self) -> Result<(), StateError> {
        match self.phase {
            Phase::SessionEnded => Err(StateError::SessionEnded),
            Phase::Interrupted => Err(StateError::AlreadyInterrupted),
            _ => {
                debug!(from = ?self.phase, "request interrupted");
                self.phase = Phase::Interrupted;
                Ok(())
            },
        }
    }

    /// End the session. Terminal.
    pub fn end_session(&mut self) -> Result<(), StateError> {
        if self.phase == Phase::SessionEnded {
            return Err(StateError::SessionEnded);
        }

        debug!(from = ?self.phase, "session ended");
        self.phase = Phase::SessionEnded;
        Ok(())
    }

    /// Start the next request of the session.
    ///
    /// Clears the input, output and interrupt flags. Configuration and
    /// readiness are kept.
    pub fn reset(&mut self) -> Result<(), StateError> {
        if self.phase == Phase::SessionEnded {
            return Err(StateError::SessionEnded);
        }

        self.phase = if self.config.is_some() { Phase::Ready } else { Phase::NotReady };
        debug!(phase = ?self.phase, "request reset");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ready_state() -> RequestState {
        let mut state = RequestState::new();
        state.ready(Config::default()).unwrap();
        state
    }

    #[test]
    fn ready_only_once() {
        let mut state = ready_state();
        assert_eq!(state.ready(Config::default()), Err(StateError::AlreadyReady));
        assert_eq!(state.phase(), Phase::Ready);
    }

    #[test]
    fn end_input_requires_ready() {
        let mut state = RequestState::new();
        assert_eq!(state.end_input(), Err(StateError::NotReady));
        assert_eq!(state.phase(), Phase::NotReady);
    }

    #[test]
    fn end_input_only_once() {
        let mut state = ready_state();
        state.end_input().unwrap();
        assert_eq!(state.end_input(), Err(StateError::InputAlreadyEnded));
    }

    #[test]
    fn output_requires_ended_input() {
        let mut state = ready_state();
        assert_eq!(state.end_output(), Err(StateError::InputNotEnded));

        state.end_input().unwrap();
        state.end_output().unwrap();
        assert_eq!(state.end_output(), Err(StateError::OutputAlreadyEnded));
    }

    #[test]
    fn interrupt_is_one_shot_and_blocks_everything() {
        let mut state = ready_state();
        state.interrupt().unwrap();

        assert_eq!(state.interrupt(), Err(StateError::AlreadyInterrupted));
        assert_eq!(state.end_input(), Err(StateError::Interrupted));
        assert_eq!(state.end_output(), Err(StateError::Interrupted));
        assert_eq!(state.ready(Config::default()), Err(StateError::Interrupted));
    }

    #[test]
    fn interrupt_before_ready() {
        let mut state = RequestState::new();
        state.interrupt().unwrap();
        state.reset().unwrap();
        assert_eq!(state.phase(), Phase::NotReady);
        state.ready(Config::default()).unwrap();
    }

    #[test]
    fn reset_keeps_readiness() {
        let mut state = ready_state();
        state.end_input().unwrap();
        state.interrupt().unwrap();

        state.reset().unwrap();
        assert_eq!(state.phase(), Phase::Ready);
        assert!(state.is_ready());
        state.end_input().unwrap();
    }

    #[test]
    fn session_end_is_terminal() {
        let mut state = ready_state();
        state.end_session().unwrap();

        assert_eq!(state.end_session(), Err(StateError::SessionEnded));
        assert_eq!(state.reset(), Err(StateError::SessionEnded));
        assert_eq!(state.interrupt(), Err(StateError::SessionEnded));
        assert_eq!(state.end_input(), Err(StateError::SessionEnded));
    }

    #[test]
    fn input_mode_mismatch_reported() {
        let state = ready_state();
        assert_eq!(
            state.ensure_input_mode(InputMode::Audio),
            Err(StateError::WrongInputMode { expected: InputMode::Audio, actual: InputMode::Text })
        );
        assert_eq!(state.ensure_input_mode(InputMode::Text), Ok(()));
    }
}
