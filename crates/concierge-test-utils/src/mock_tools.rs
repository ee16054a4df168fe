// SPDX-FileCopyrightText: 2026 Concierge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock tools for exercising approval and retry paths.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use async_trait::async_trait;

use concierge_core::{ConciergeError, Tool, ToolOutput};

/// A tool that fails with a fixed message for its first `failures` calls.
pub struct FlakyTool {
    name: String,
    failures: u32,
    message: String,
    calls: Arc<AtomicU32>,
}

impl FlakyTool {
    pub fn new(name: impl Into<String>, failures: u32, message: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            failures,
            message: message.into(),
            calls: Arc::new(AtomicU32::new(0)),
        }
    }

    /// Shared call counter, readable after the tool is moved into a registry.
    pub fn calls(&self) -> Arc<AtomicU32> {
        self.calls.clone()
    }
}

#[async_trait]
impl Tool for FlakyTool {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        "Fails a fixed number of times, then succeeds"
    }

    async fn invoke(&self, _arguments: serde_json::Value) -> Result<ToolOutput, ConciergeError> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        if n <= self.failures {
            Err(ConciergeError::tool(&self.name, &self.message))
        } else {
            Ok(ToolOutput::text(format!("{} ok after {n} calls", self.name)))
        }
    }
}

/// A tool that echoes its `message` argument.
pub struct EchoTool {
    name: String,
}

impl EchoTool {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl Default for EchoTool {
    fn default() -> Self {
        Self::new("echo")
    }
}

#[async_trait]
impl Tool for EchoTool {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        "Echoes the input back"
    }

    async fn invoke(&self, arguments: serde_json::Value) -> Result<ToolOutput, ConciergeError> {
        let message = arguments["message"].as_str().unwrap_or("no message");
        Ok(ToolOutput::text(message))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn flaky_tool_recovers_after_failures() {
        let tool = FlakyTool::new("web_search", 1, "timeout");
        let calls = tool.calls();
        let err = tool.invoke(serde_json::Value::Null).await.unwrap_err();
        assert_eq!(err.to_string(), "tool `web_search` failed: timeout");
        let ok = tool.invoke(serde_json::Value::Null).await.unwrap();
        assert_eq!(ok.content, "web_search ok after 2 calls");
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn echo_tool_returns_message() {
        let out = EchoTool::default()
            .invoke(serde_json::json!({ "message": "hi" }))
            .await
            .unwrap();
        assert_eq!(out.content, "hi");
        assert!(!out.is_error);
    }
}
