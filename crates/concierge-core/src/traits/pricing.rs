// SPDX-FileCopyrightText: 2026 Concierge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Pricing function consumed by the cost policy.

/// Per-model price lookup.
///
/// Must be pure and offline; the cost policy calls it once per candidate
/// model on every turn.
pub trait PriceModel: Send + Sync {
    /// Cost in USD of a call to `model` with the given token counts.
    fn price(&self, model: &str, input_tokens: u32, output_tokens: u32) -> f64;
}
