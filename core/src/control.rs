// src/control.rs

//! Flow signals returned by handlers and the outcome of a whole run.

/// Returned by a handler to let the run proceed or end it here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineControl {
  Continue,
  /// No further handlers of this step or later steps run.
  Stop,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineResult {
  /// Every step ran or was skipped.
  Completed,
  /// A handler returned [`PipelineControl::Stop`].
  Stopped,
}

impl PipelineResult {
  pub fn is_completed(self) -> bool {
    matches!(self, PipelineResult::Completed)
  }
}
