// tests/pipeline_execution_tests.rs
mod common;

use common::*;
use serial_test::serial;
use std::sync::Arc;
use storefront_flow::{ContextData, FlowError, Pipeline, PipelineControl, PipelineResult};

fn three_step_pipeline() -> Pipeline<TestContext, TestError> {
  Pipeline::<TestContext, TestError>::new(&[("step1", false, None), ("step2", false, None), ("step3", false, None)])
}

#[tokio::test]
#[serial]
async fn test_pipeline_runs_steps_in_order() -> anyhow::Result<()> {
  setup_tracing();
  let mut pipeline = three_step_pipeline();
  pipeline.on_step("step1", create_simple_handler("step1", " S1"))?;
  pipeline.on_step("step2", create_simple_handler("step2", " S2"))?;
  pipeline.on_step("step3", create_simple_handler("step3", " S3"))?;

  let ctx = ContextData::new(TestContext::default());
  let result = pipeline.run(ctx.clone()).await?;

  assert_eq!(result, PipelineResult::Completed);
  let guard = ctx.read();
  assert_eq!(guard.counter, 3);
  assert_eq!(guard.message, " S1 S2 S3");
  assert_eq!(guard.steps_executed, vec!["step1", "step2", "step3"]);
  Ok(())
}

#[tokio::test]
#[serial]
async fn test_pipeline_stops_on_pipeline_control_stop() -> anyhow::Result<()> {
  setup_tracing();
  let mut pipeline = three_step_pipeline();
  pipeline.on_step("step1", create_simple_handler("step1", "A"))?;
  pipeline.on_step("step2", create_simple_handler("step2", "B"))?;
  pipeline.on_step("step3", create_simple_handler("step3", "C"))?;

  let ctx = ContextData::new(TestContext {
    should_stop_at: Some("step2".to_string()),
    ..Default::default()
  });
  let result = pipeline.run(ctx.clone()).await?;

  assert_eq!(result, PipelineResult::Stopped);
  let guard = ctx.read();
  assert_eq!(guard.message, "AB");
  assert_eq!(guard.steps_executed, vec!["step1", "step2"]);
  Ok(())
}

#[tokio::test]
#[serial]
async fn test_pipeline_propagates_handler_error() -> anyhow::Result<()> {
  setup_tracing();
  let mut pipeline = three_step_pipeline();
  pipeline.on_step("step1", create_simple_handler("step1", "Good"))?;
  pipeline.on_step("step2", create_failing_handler("step2", "I am a bad step!"))?;
  pipeline.on_step("step3", create_simple_handler("step3", "NeverRun"))?;

  let ctx = ContextData::new(TestContext::default());
  let result = pipeline.run(ctx.clone()).await;

  assert_eq!(result, Err(TestError::Handler("I am a bad step!".to_string())));
  assert_eq!(ctx.read().steps_executed, vec!["step1", "step2"]);
  Ok(())
}

#[tokio::test]
#[serial]
async fn test_missing_handler_on_required_step_fails() -> anyhow::Result<()> {
  setup_tracing();
  let mut pipeline = three_step_pipeline();
  pipeline.on_step("step1", create_simple_handler("step1", "x"))?;
  pipeline.on_step("step3", create_simple_handler("step3", "z"))?;

  let result = pipeline.run(ContextData::new(TestContext::default())).await;

  assert_eq!(
    result,
    Err(TestError::Flow(FlowError::HandlerMissing {
      step_name: "step2".to_string()
    }))
  );
  Ok(())
}

#[tokio::test]
#[serial]
async fn test_optional_step_without_handler_is_skipped() -> anyhow::Result<()> {
  setup_tracing();
  let mut pipeline =
    Pipeline::<TestContext, TestError>::new(&[("first", false, None), ("maybe", true, None), ("last", false, None)]);
  pipeline.on_step("first", create_simple_handler("first", "1"))?;
  pipeline.on_step("last", create_simple_handler("last", "3"))?;

  let ctx = ContextData::new(TestContext::default());
  assert_eq!(pipeline.run(ctx.clone()).await?, PipelineResult::Completed);
  assert_eq!(ctx.read().message, "13");
  Ok(())
}

#[tokio::test]
#[serial]
async fn test_skip_condition_reads_context() -> anyhow::Result<()> {
  setup_tracing();
  let mut pipeline = three_step_pipeline();
  pipeline.on_step("step1", create_simple_handler("step1", "a"))?;
  pipeline.on_step("step2", create_simple_handler("step2", "b"))?;
  pipeline.on_step("step3", create_simple_handler("step3", "c"))?;
  pipeline.set_skip_condition("step2", Some(Arc::new(|ctx: &ContextData<TestContext>| ctx.read().counter >= 1)))?;

  let ctx = ContextData::new(TestContext::default());
  pipeline.run(ctx.clone()).await?;

  assert_eq!(ctx.read().steps_executed, vec!["step1", "step3"]);
  Ok(())
}

#[tokio::test]
#[serial]
async fn test_multiple_handlers_run_in_registration_order() -> anyhow::Result<()> {
  setup_tracing();
  let mut pipeline = Pipeline::<TestContext, TestError>::new(&[("only", false, None)]);
  pipeline.on_step("only", create_simple_handler("only", "first"))?;
  pipeline.on_step("only", |ctx: ContextData<TestContext>| async move {
    ctx.write().message.push_str("-second");
    Ok::<_, TestError>(PipelineControl::Continue)
  })?;

  let ctx = ContextData::new(TestContext::default());
  pipeline.run(ctx.clone()).await?;

  assert_eq!(ctx.read().message, "first-second");
  Ok(())
}

#[test]
fn test_registering_unknown_step_is_rejected() {
  let mut pipeline = three_step_pipeline();
  let result = pipeline.on_step("nope", create_simple_handler("nope", ""));
  assert_eq!(
    result,
    Err(FlowError::StepNotFound {
      step_name: "nope".to_string()
    })
  );
}

#[test]
fn test_structural_changes() {
  let mut pipeline = three_step_pipeline();
  assert!(pipeline.insert_after("step1", "step1b", true).is_ok());
  assert_eq!(pipeline.step_names(), vec!["step1", "step1b", "step2", "step3"]);

  assert_eq!(
    pipeline.insert_after("step2", "step3", false),
    Err(FlowError::DuplicateStep {
      step_name: "step3".to_string()
    })
  );

  pipeline.remove_step("step2");
  pipeline.remove_step("does_not_exist");
  assert_eq!(pipeline.step_names(), vec!["step1", "step1b", "step3"]);
}

#[tokio::test]
#[serial]
async fn test_set_optional_toggles_missing_handler_check() -> anyhow::Result<()> {
  setup_tracing();
  let mut pipeline = three_step_pipeline();
  pipeline.on_step("step1", create_simple_handler("step1", "a"))?;
  pipeline.on_step("step3", create_simple_handler("step3", "c"))?;

  pipeline.set_optional("step2", true)?;
  let ctx = ContextData::new(TestContext::default());
  let result = pipeline.run(ctx.clone()).await?;
  assert!(result.is_completed());
  assert_eq!(ctx.read().steps_executed, vec!["step1", "step3"]);

  pipeline.set_optional("step2", false)?;
  let result = pipeline.run(ContextData::new(TestContext::default())).await;
  assert_eq!(
    result,
    Err(TestError::Flow(FlowError::HandlerMissing {
      step_name: "step2".to_string()
    }))
  );

  assert_eq!(
    pipeline.set_optional("nope", true),
    Err(FlowError::StepNotFound {
      step_name: "nope".to_string()
    })
  );
  Ok(())
}

#[tokio::test]
#[serial]
async fn test_stopped_run_is_not_completed() -> anyhow::Result<()> {
  setup_tracing();
  let mut pipeline = three_step_pipeline();
  pipeline.on_step("step1", create_simple_handler("step1", "a"))?;
  pipeline.on_step("step2", create_simple_handler("step2", "b"))?;
  pipeline.on_step("step3", create_simple_handler("step3", "c"))?;

  let ctx = ContextData::new(TestContext {
    should_stop_at: Some("step1".to_string()),
    ..Default::default()
  });
  let result = pipeline.run(ctx).await?;
  assert!(!result.is_completed());
  Ok(())
}

#[test]
fn test_context_views_share_one_value() {
  let ctx = ContextData::new(TestContext::default());
  let handle = ctx.clone();
  {
    let mut guard = handle.write();
    guard.counter = 7;
    guard.message.push_str("shared");
  }

  assert_eq!(&*ctx.map_read(|c| c.message.as_str()), "shared");

  let copy = ctx.snapshot();
  ctx.write().counter += 1;
  assert_eq!(copy.counter, 7);
  assert_eq!(ctx.read().counter, 8);
}
