use std::collections::HashMap;

use chrono::Utc;
use tracing::info;
use uuid::Uuid;

use crate::error::{PipelineError, Result};
use crate::io::RunReport;
use crate::llm::{
    FINAL_ANSWER_KEY, INTERMEDIATE_ANSWER_KEY, ModelClient, QUESTION_KEY, REASONING_TEMPLATE,
    REFINEMENT_TEMPLATE, VERIFICATION_TEMPLATE, VERIFIED_ANSWER_KEY,
};
use crate::models::PromptTemplate;
use crate::stages::{SequentialPipeline, Stage};

/// Build the reason → refine → verify pipeline
///
/// Input: `question`. Output: `verified_answer`.
pub fn chain_of_thought_pipeline() -> Result<SequentialPipeline> {
    let stages = vec![
        Stage::new(
            "reasoner",
            PromptTemplate::new(REASONING_TEMPLATE)?,
            INTERMEDIATE_ANSWER_KEY,
        ),
        Stage::new(
            "refiner",
            PromptTemplate::new(REFINEMENT_TEMPLATE)?,
            FINAL_ANSWER_KEY,
        ),
        Stage::new(
            "verifier",
            PromptTemplate::new(VERIFICATION_TEMPLATE)?,
            VERIFIED_ANSWER_KEY,
        ),
    ];

    SequentialPipeline::new(
        vec![QUESTION_KEY.to_string()],
        stages,
        vec![VERIFIED_ANSWER_KEY.to_string()],
    )
}

fn question_inputs(question: &str) -> HashMap<String, String> {
    HashMap::from([(QUESTION_KEY.to_string(), question.to_string())])
}

/// Answer a question with reasoning, refinement and verification
pub async fn iterative_cot_response(client: &dyn ModelClient, question: &str) -> Result<String> {
    chain_of_thought_pipeline()?
        .run_single(client, &question_inputs(question))
        .await
}

/// Same as [`iterative_cot_response`], returning a full run report
pub async fn iterative_cot_report(
    client: &dyn ModelClient,
    model: &str,
    question: &str,
) -> Result<RunReport> {
    let pipeline = chain_of_thought_pipeline()?;
    let run_id = Uuid::new_v4();
    let started_at = Utc::now();
    info!("Run {}: starting chain of thought", run_id);

    let mut run = pipeline
        .run_traced(client, &question_inputs(question))
        .await?;
    let verified_answer = run
        .outputs
        .remove(VERIFIED_ANSWER_KEY)
        .ok_or_else(|| PipelineError::UnknownOutput(VERIFIED_ANSWER_KEY.to_string()))?;

    let report = RunReport {
        run_id,
        started_at,
        finished_at: Utc::now(),
        model: model.to_string(),
        question: question.to_string(),
        stages: run.stages,
        verified_answer,
    };
    info!(
        "Run {}: complete, {}ms waiting on model",
        run_id,
        report.model_time_ms()
    );
    Ok(report)
}
