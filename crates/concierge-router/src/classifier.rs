// SPDX-FileCopyrightText: 2026 Concierge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Heuristic message complexity classification.
//!
//! Classifies user messages into simple/moderate/complex using length and
//! a fixed table of patterns. No LLM pre-call, no network, no latency.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Message complexity, cheapest to most demanding.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Complexity {
    /// Greetings, acknowledgements, time questions, very short messages.
    Simple,
    /// Ordinary questions and requests.
    Moderate,
    /// Code, analysis, long-form creation, deep explanations.
    Complex,
}

/// Result of classifying a message, with the rule that decided it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClassificationResult {
    pub complexity: Complexity,
    pub reason: &'static str,
}

/// Messages shorter than this may be simple by pattern.
const SHORT_PATTERN_LEN: usize = 30;
/// Messages shorter than this are always simple.
const VERY_SHORT_LEN: usize = 15;
/// Messages longer than this are always complex.
const LONG_LEN: usize = 500;

/// Greetings, acknowledgements, and time questions (anchored at the start).
static SIMPLE_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    vec![
        Regex::new(
            r"(?i)^(hi|hello|hey|thanks|thank you|yes|no|ok|okay|sure|good|great|bye|cool|nice|yep|nope|got it|alright)\b",
        )
        .unwrap(),
        Regex::new(r"(?i)^(what time|what day|what date)").unwrap(),
        Regex::new(r"(?i)^(gm|gn|good morning|good night|good evening)\b").unwrap(),
    ]
});

static COMPLEX_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    vec![
        // Code fences
        Regex::new(r"```").unwrap(),
        // Code keywords (case-sensitive)
        Regex::new(r"\b(function|class|import|export|const|let|var|def|async|await)\s").unwrap(),
        Regex::new(
            r"(?i)\b(analyze|compare|evaluate|research|strategy|proposal|implement|architect|design|refactor|debug|optimize)\b",
        )
        .unwrap(),
        // Long creation requests
        Regex::new(r"(?i)\b(write me|build|create|develop|code)\s.{20,}").unwrap(),
        // Deep explanations
        Regex::new(r"(?i)\b(explain|how does|why does|what happens when)\b.{50,}").unwrap(),
        Regex::new(r"(?i)\b(step.by.step|multi.?step|detailed|comprehensive|thorough)\b").unwrap(),
        Regex::new(r"(?i)\b(pros? and cons?|trade.?offs?|advantages|disadvantages)\b").unwrap(),
    ]
});

/// Classify a message. Pure and total: every input maps to a tier.
pub fn classify(message: &str) -> Complexity {
    classify_with_reason(message).complexity
}

/// Classify a message and report which rule decided it.
pub fn classify_with_reason(message: &str) -> ClassificationResult {
    let trimmed = message.trim();
    let len = trimmed.chars().count();

    let (complexity, reason) = if len < SHORT_PATTERN_LEN
        && SIMPLE_PATTERNS.iter().any(|p| p.is_match(trimmed))
    {
        (Complexity::Simple, "short conversational message")
    } else if len < VERY_SHORT_LEN {
        (Complexity::Simple, "very short message")
    } else if COMPLEX_PATTERNS.iter().any(|p| p.is_match(trimmed)) {
        (Complexity::Complex, "complex request indicators")
    } else if len > LONG_LEN {
        (Complexity::Complex, "long message")
    } else {
        (Complexity::Moderate, "standard complexity")
    };

    ClassificationResult { complexity, reason }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_simple_greetings() {
        assert_eq!(classify("hi"), Complexity::Simple);
        assert_eq!(classify("Hello there, how's it going"), Complexity::Simple);
        assert_eq!(classify("thanks a lot!"), Complexity::Simple);
        assert_eq!(classify("good morning friend"), Complexity::Simple);
    }

    #[test]
    fn classify_time_questions() {
        assert_eq!(classify("what time is it in Tokyo?"), Complexity::Simple);
        assert_eq!(
            classify_with_reason("What day is it today?").reason,
            "short conversational message"
        );
    }

    #[test]
    fn greeting_prefix_needs_short_message() {
        // 30+ chars: the greeting rule no longer applies.
        assert_eq!(
            classify("hello, can you tell me about the weather in Paris"),
            Complexity::Moderate
        );
    }

    #[test]
    fn very_short_messages_are_simple() {
        assert_eq!(classify("refactor it"), Complexity::Simple);
        assert_eq!(classify(""), Complexity::Simple);
        assert_eq!(classify("   "), Complexity::Simple);
    }

    #[test]
    fn classify_complex_analysis() {
        assert_eq!(
            classify("can you analyze our quarterly numbers"),
            Complexity::Complex
        );
        assert_eq!(
            classify("what are the pros and cons of remote work"),
            Complexity::Complex
        );
    }

    #[test]
    fn classify_code_blocks_complex() {
        assert_eq!(
            classify("can you fix this?\n```\nfn main() { panic!() }\n```"),
            Complexity::Complex
        );
    }

    #[test]
    fn code_keywords_are_case_sensitive() {
        assert_eq!(classify("what does const x = 5 mean"), Complexity::Complex);
        assert_eq!(classify("Const reminders are tiring to read"), Complexity::Moderate);
    }

    #[test]
    fn long_creation_request_is_complex() {
        assert_eq!(
            classify("build a landing page for my bakery business"),
            Complexity::Complex
        );
        assert_eq!(classify("please build it for me"), Complexity::Moderate);
    }

    #[test]
    fn long_messages_are_complex() {
        let message = "tell me a little more about it ".repeat(20);
        assert_eq!(
            classify_with_reason(&message),
            ClassificationResult {
                complexity: Complexity::Complex,
                reason: "long message"
            }
        );
    }

    #[test]
    fn classify_moderate() {
        assert_eq!(classify("what's the weather like today?"), Complexity::Moderate);
        assert_eq!(classify("remind me about the dentist"), Complexity::Moderate);
    }

    #[test]
    fn complexity_display_and_parse() {
        use std::str::FromStr;
        assert_eq!(Complexity::Moderate.to_string(), "moderate");
        assert_eq!(Complexity::from_str("complex").unwrap(), Complexity::Complex);
    }
}
