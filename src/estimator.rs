/*!
 * Cost estimation and credit pre-flight for a translation run.
 *
 * Token counts are derived from the source word count with a fixed
 * tokens-per-word ratio plus a prompt overhead factor. Output is assumed
 * symmetric with input since translation roughly preserves length.
 */

use serde::{Deserialize, Serialize};

use crate::app_config::PricingTable;
use crate::errors::EstimationError;
use crate::providers::Provider;

/// Average tokens per word for prose, across the supported languages
const TOKENS_PER_WORD: f64 = 1.3;

/// Multiplier covering prompt scaffolding and formatting overhead
const PROMPT_OVERHEAD: f64 = 1.15;

const TOKENS_PER_MILLION: f64 = 1_000_000.0;

/// Projected token usage and cost for translating a document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CostEstimate {
    /// Source word count the estimate was derived from
    pub word_count: usize,

    /// Projected input tokens, overhead included
    pub input_tokens: u64,

    /// Projected output tokens (assumed symmetric with input)
    pub output_tokens: u64,

    /// Projected input cost in USD
    pub input_cost: f64,

    /// Projected output cost in USD
    pub output_cost: f64,

    /// Projected total cost in USD
    pub total_cost: f64,

    /// Model the prices were looked up for
    pub model: String,
}

/// Result of comparing an estimate against the account balance
#[derive(Debug, Clone, PartialEq)]
pub enum CreditStatus {
    /// Balance covers the projected cost
    Sufficient { remaining: f64 },

    /// Balance falls short of the projected cost
    Insufficient { required: f64, available: f64 },
}

/// Project token usage and cost for `word_count` source words under the
/// given model's pricing.
pub fn estimate(
    word_count: usize,
    model: &str,
    pricing: &PricingTable,
) -> Result<CostEstimate, EstimationError> {
    let prices = pricing
        .get(model)
        .ok_or_else(|| EstimationError::UnknownModel(model.to_string()))?;

    let tokens = (word_count as f64 * TOKENS_PER_WORD * PROMPT_OVERHEAD).ceil();
    let input_tokens = tokens as u64;
    let output_tokens = input_tokens;

    let input_cost = tokens / TOKENS_PER_MILLION * prices.input_per_mtok;
    let output_cost = tokens / TOKENS_PER_MILLION * prices.output_per_mtok;

    Ok(CostEstimate {
        word_count,
        input_tokens,
        output_tokens,
        input_cost,
        output_cost,
        total_cost: input_cost + output_cost,
        model: model.to_string(),
    })
}

/// Query the provider's balance endpoint and compare it against the
/// estimate. The caller decides whether an insufficient balance aborts
/// the run or merely warns.
pub async fn check_credit(
    provider: &dyn Provider,
    estimate: &CostEstimate,
) -> Result<CreditStatus, EstimationError> {
    let available = provider
        .remaining_credit()
        .await
        .map_err(|e| EstimationError::ServiceUnavailable(e.to_string()))?;

    if available >= estimate.total_cost {
        Ok(CreditStatus::Sufficient {
            remaining: available - estimate.total_cost,
        })
    } else {
        Ok(CreditStatus::Insufficient {
            required: estimate.total_cost,
            available,
        })
    }
}
