//! Encoding session state machine

use std::fmt;
use thiserror::Error;

/// Encoding session states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SessionState {
    /// Engine allocated, not yet configured
    #[default]
    Created,
    /// Parameters applied and engine initialized for output
    Configured,
    /// At least one chunk has been fed
    Encoding,
    /// Finalization flushed, no further input accepted
    Finished,
    /// Engine freed; terminal
    Released,
}

impl SessionState {
    /// Get the string representation
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Configured => "configured",
            Self::Encoding => "encoding",
            Self::Finished => "finished",
            Self::Released => "released",
        }
    }

    /// Whether input may be fed or the stream finished in this state
    pub const fn accepts_input(&self) -> bool {
        matches!(self, Self::Configured | Self::Encoding)
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Error when an invalid state transition is attempted
#[derive(Debug, Clone, Error)]
#[error("Invalid state transition: cannot {action} while in {current_state} state")]
pub struct InvalidStateTransition {
    pub current_state: SessionState,
    pub action: String,
}

/// Session lifecycle entity.
///
/// State machine:
///   CREATED -> CONFIGURED (configure)
///   CONFIGURED | ENCODING -> ENCODING (feed)
///   CONFIGURED | ENCODING -> FINISHED (finish)
///   any -> RELEASED (release)
#[derive(Debug, Default)]
pub struct SessionLifecycle {
    state: SessionState,
}

impl SessionLifecycle {
    /// Create a lifecycle in the created state
    pub fn new() -> Self {
        Self {
            state: SessionState::Created,
        }
    }

    /// Get the current state
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Check if already released
    pub fn is_released(&self) -> bool {
        self.state == SessionState::Released
    }

    /// Check that configuration is allowed, without transitioning
    pub fn check_configure(&self) -> Result<(), InvalidStateTransition> {
        self.require(self.state == SessionState::Created, "configure")
    }

    /// Transition from CREATED to CONFIGURED
    pub fn configure(&mut self) -> Result<(), InvalidStateTransition> {
        self.check_configure()?;
        self.state = SessionState::Configured;
        Ok(())
    }

    /// Transition from CONFIGURED or ENCODING to ENCODING
    pub fn feed(&mut self) -> Result<(), InvalidStateTransition> {
        self.require(self.state.accepts_input(), "feed")?;
        self.state = SessionState::Encoding;
        Ok(())
    }

    /// Transition from CONFIGURED or ENCODING to FINISHED
    pub fn finish(&mut self) -> Result<(), InvalidStateTransition> {
        self.require(self.state.accepts_input(), "finish")?;
        self.state = SessionState::Finished;
        Ok(())
    }

    /// Transition from any state to RELEASED.
    ///
    /// Returns `false` when the session was already released.
    pub fn release(&mut self) -> bool {
        if self.is_released() {
            return false;
        }
        self.state = SessionState::Released;
        true
    }

    fn require(&self, allowed: bool, action: &str) -> Result<(), InvalidStateTransition> {
        if allowed {
            Ok(())
        } else {
            Err(InvalidStateTransition {
                current_state: self.state,
                action: action.to_string(),
            })
        }
    }
}
