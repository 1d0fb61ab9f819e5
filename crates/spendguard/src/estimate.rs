// SPDX-FileCopyrightText: 2026 Spendguard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `spendguard estimate` command implementation.

use std::path::PathBuf;

use clap::{ArgGroup, Args};
use spendguard_config::LimitsConfig;
use spendguard_core::{Provider, SpendguardError};
use spendguard_cost::{CostBreakdown, RateCatalog, worst_case_estimate, worst_case_estimate_text};
use spendguard_providers::clamp_max_tokens;
use tracing::info;

use crate::input::read_input;

#[derive(Args, Debug)]
#[command(group(
    ArgGroup::new("input")
        .required(true)
        .args(["prompt", "prompt_file", "input_tokens"])
))]
pub struct EstimateArgs {
    #[arg(long)]
    pub provider: String,

    #[arg(long)]
    pub model: String,

    /// Prompt text; its token count is over-estimated from its length.
    #[arg(long)]
    pub prompt: Option<String>,

    /// Read the prompt text from a file (`-` reads stdin).
    #[arg(long, value_name = "FILE")]
    pub prompt_file: Option<PathBuf>,

    /// Exact input size, when already known.
    #[arg(long)]
    pub input_tokens: Option<i64>,

    /// The output allowance the call will be made with.
    #[arg(long)]
    pub max_output_tokens: i64,

    /// The call goes to the OpenAI Responses API rather than Chat Completions.
    #[arg(long)]
    pub responses_api: bool,
}

impl EstimateArgs {
    /// The output allowance after the provider-side ceiling.
    ///
    /// OpenAI rejects limits above a model's maximum, so the request is sent
    /// with the capped value and that is what the estimate must reserve.
    fn output_allowance(&self, limits: &LimitsConfig) -> i64 {
        if self.provider != Provider::OpenAi.as_str() {
            return self.max_output_tokens;
        }
        let cap = if self.responses_api {
            limits.openai_max_output_tokens
        } else {
            limits.openai_max_completion_tokens
        };
        clamp_max_tokens(self.max_output_tokens, cap)
    }
}

/// Run the `spendguard estimate` command.
pub fn run_estimate(
    args: &EstimateArgs,
    catalog: &RateCatalog,
    limits: &LimitsConfig,
) -> Result<CostBreakdown, SpendguardError> {
    let card = catalog.lookup(&args.provider, &args.model)?;
    let max_output_tokens = args.output_allowance(limits);

    let breakdown = match (&args.input_tokens, &args.prompt, &args.prompt_file) {
        (Some(tokens), _, _) => {
            worst_case_estimate(&args.provider, &args.model, card, *tokens, max_output_tokens)
        }
        (None, Some(prompt), _) => worst_case_estimate_text(
            &args.provider,
            &args.model,
            card,
            prompt,
            max_output_tokens,
        ),
        (None, None, Some(path)) => {
            let prompt = read_input(path)?;
            worst_case_estimate_text(
                &args.provider,
                &args.model,
                card,
                &prompt,
                max_output_tokens,
            )
        }
        (None, None, None) => {
            return Err(SpendguardError::validation(
                "input",
                "one of --prompt, --prompt-file or --input-tokens is required",
            ));
        }
    };

    info!(
        provider = %args.provider,
        model = %args.model,
        input_tokens = breakdown.usage.input_tokens,
        requested_output_tokens = args.max_output_tokens,
        max_output_tokens,
        cents = breakdown.cents(),
        "worst-case estimate"
    );
    Ok(breakdown)
}
