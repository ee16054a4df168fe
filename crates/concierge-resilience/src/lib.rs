// SPDX-FileCopyrightText: 2026 Concierge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Resilience primitives for Concierge tool execution.
//!
//! Tool calls are retried a bounded number of times with linear backoff.
//! Errors whose message marks them as permanent (auth, bad input, missing
//! configuration) are returned on the first attempt.

pub mod retry;

pub use retry::{is_permanent, with_retry, RetryClassify, RetryPolicy};
