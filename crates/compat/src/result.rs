use crate::compat::finish_reason::normalize_finish_reason;
use crate::types::{FinishReason, GenerateResult, GenerateStep, StepEntry, Steps};

/// Rewrite `finishReason` on a generate result and on each of its steps.
///
/// A result without `finishReason` is returned as is, steps included. Only
/// `steps` entries that are objects are touched, and only their
/// `finishReason`; nothing deeper is visited. The result is taken by value,
/// so callers keeping a clone never observe a change.
pub fn normalize_generate_result(mut result: GenerateResult) -> GenerateResult {
    let Some(reason) = result.finish_reason.as_ref() else {
        return result;
    };
    result.finish_reason = Some(FinishReason::Unified(normalize_finish_reason(reason)));
    if let Some(Steps::List(entries)) = result.steps.as_mut() {
        for entry in entries.iter_mut() {
            if let StepEntry::Step(step) = entry {
                normalize_step(step);
            }
        }
    }
    result
}

fn normalize_step(step: &mut GenerateStep) {
    if let Some(reason) = step.finish_reason.as_ref() {
        step.finish_reason = Some(FinishReason::Unified(normalize_finish_reason(reason)));
    }
}
