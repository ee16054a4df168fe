// SPDX-FileCopyrightText: 2026 Concierge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Model pricing tables and cost calculation.
//!
//! Prices are USD per million tokens, keyed by a model-id substring. Lookup
//! tries the longest key first so `gpt-4.1-mini` wins over `gpt-4.1`, and
//! falls back to a default price so cost tracking never silently drops a
//! record. Results are rounded to six decimal places.

use std::cmp::Reverse;

use concierge_config::model::PricingConfig;
use concierge_core::{PriceModel, TokenUsage};

/// Per-model pricing in USD per million tokens.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModelPricing {
    /// Cost per million input tokens.
    pub input_per_mtok: f64,
    /// Cost per million output tokens.
    pub output_per_mtok: f64,
}

impl ModelPricing {
    pub const fn new(input_per_mtok: f64, output_per_mtok: f64) -> Self {
        Self {
            input_per_mtok,
            output_per_mtok,
        }
    }
}

/// Fallback for models no key matches.
pub const DEFAULT_PRICING: ModelPricing = ModelPricing::new(1.00, 4.00);

/// Built-in price list, keyed by model-id substring.
pub const BUILTIN_PRICING: &[(&str, ModelPricing)] = &[
    // OpenAI
    ("gpt-5.2", ModelPricing::new(5.00, 20.00)),
    ("gpt-4.1-nano", ModelPricing::new(0.10, 0.40)),
    ("gpt-4.1-mini", ModelPricing::new(0.40, 1.60)),
    ("gpt-4.1", ModelPricing::new(2.00, 8.00)),
    ("gpt-4o-mini", ModelPricing::new(0.15, 0.60)),
    ("gpt-4o", ModelPricing::new(2.50, 10.00)),
    ("o3-mini", ModelPricing::new(1.10, 4.40)),
    // Anthropic
    ("claude-opus-4", ModelPricing::new(15.00, 75.00)),
    ("claude-sonnet-4", ModelPricing::new(3.00, 15.00)),
    ("claude-haiku-4", ModelPricing::new(0.80, 4.00)),
    // Google
    ("gemini-3-pro", ModelPricing::new(1.50, 10.00)),
    ("gemini-3-flash", ModelPricing::new(0.15, 0.60)),
    ("gemini-2.5-pro", ModelPricing::new(1.25, 10.00)),
    ("gemini-2.5-flash", ModelPricing::new(0.15, 0.60)),
    // Perplexity
    ("sonar-reasoning-pro", ModelPricing::new(2.00, 8.00)),
    ("sonar-pro", ModelPricing::new(3.00, 15.00)),
    ("sonar", ModelPricing::new(1.00, 1.00)),
    // Groq
    ("llama-3.3-70b", ModelPricing::new(0.59, 0.79)),
    ("mixtral-8x7b", ModelPricing::new(0.24, 0.24)),
    // OpenRouter (matched on the routed model name)
    ("deepseek-v3", ModelPricing::new(0.27, 1.10)),
    ("deepseek-r1", ModelPricing::new(0.55, 2.19)),
    ("kimi-k2", ModelPricing::new(0.60, 2.40)),
    ("grok-4", ModelPricing::new(3.00, 15.00)),
    ("llama-4", ModelPricing::new(0.15, 0.60)),
    ("qwen3-coder", ModelPricing::new(0.50, 2.00)),
];

/// Substring-keyed price table with a default fallback.
#[derive(Debug, Clone)]
pub struct PricingTable {
    /// Sorted by key length, longest first. Equal lengths keep insertion order.
    entries: Vec<(String, ModelPricing)>,
    default: ModelPricing,
}

impl PricingTable {
    /// Table built from explicit entries and a fallback price.
    pub fn new(
        entries: impl IntoIterator<Item = (String, ModelPricing)>,
        default: ModelPricing,
    ) -> Self {
        let mut deduped: Vec<(String, ModelPricing)> = Vec::new();
        for (key, pricing) in entries {
            if !deduped.iter().any(|(existing, _)| *existing == key) {
                deduped.push((key, pricing));
            }
        }
        deduped.sort_by_key(|(key, _)| Reverse(key.len()));
        Self {
            entries: deduped,
            default,
        }
    }

    /// The built-in price list with the default fallback.
    pub fn builtin() -> Self {
        Self::new(
            BUILTIN_PRICING
                .iter()
                .map(|(key, pricing)| (key.to_string(), *pricing)),
            DEFAULT_PRICING,
        )
    }

    /// The built-in list extended by `[pricing]` configuration.
    ///
    /// Overrides take precedence over built-in entries with the same key.
    pub fn from_config(config: &PricingConfig) -> Self {
        let overrides = config.overrides.iter().map(|(key, price)| {
            (
                key.clone(),
                ModelPricing::new(price.input_per_mtok, price.output_per_mtok),
            )
        });
        let builtin = BUILTIN_PRICING
            .iter()
            .map(|(key, pricing)| (key.to_string(), *pricing));
        Self::new(
            overrides.chain(builtin),
            ModelPricing::new(
                config.default_input_per_mtok,
                config.default_output_per_mtok,
            ),
        )
    }

    /// Look up pricing for a model identifier.
    pub fn pricing_for(&self, model: &str) -> ModelPricing {
        self.entries
            .iter()
            .find(|(key, _)| model.contains(key.as_str()))
            .map(|(_, pricing)| *pricing)
            .unwrap_or(self.default)
    }

    /// Cost of a recorded token usage for `model`.
    pub fn calculate_cost(&self, model: &str, usage: &TokenUsage) -> f64 {
        calculate_cost(usage, &self.pricing_for(model))
    }
}

impl Default for PricingTable {
    fn default() -> Self {
        Self::builtin()
    }
}

impl PriceModel for PricingTable {
    fn price(&self, model: &str, input_tokens: u32, output_tokens: u32) -> f64 {
        self.calculate_cost(model, &TokenUsage::new(input_tokens, output_tokens))
    }
}

/// Calculate cost in USD for a given token usage and pricing.
///
/// Formula: `(tokens / 1_000_000) * price_per_million` per token type, rounded
/// to six decimal places.
pub fn calculate_cost(usage: &TokenUsage, pricing: &ModelPricing) -> f64 {
    let input = (usage.input_tokens as f64 / 1_000_000.0) * pricing.input_per_mtok;
    let output = (usage.output_tokens as f64 / 1_000_000.0) * pricing.output_per_mtok;
    round_usd(input + output)
}

fn round_usd(value: f64) -> f64 {
    (value * 1_000_000.0).round() / 1_000_000.0
}
