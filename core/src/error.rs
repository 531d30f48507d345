// src/error.rs
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FlowError {
  #[error("Step not found: {step_name}")]
  StepNotFound { step_name: String },

  #[error("Step already defined: {step_name}")]
  DuplicateStep { step_name: String },

  #[error("Handler missing for non-optional step: {step_name}")]
  HandlerMissing { step_name: String },

  #[error("No pipeline registered for context type {context_type}")]
  NotRegistered { context_type: &'static str },

  #[error("Context type mismatch (expected {expected_type})")]
  TypeMismatch { expected_type: &'static str },
}

pub type FlowResult<T, E = FlowError> = std::result::Result<T, E>;
