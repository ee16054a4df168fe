// SPDX-FileCopyrightText: 2026 Concierge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Registry of the tools the agent can call, indexed by name.

use std::collections::HashMap;
use std::sync::Arc;

use concierge_core::Tool;

/// Registry of available tools, indexed by name.
#[derive(Clone, Default)]
pub struct ToolRegistry {
    tools: HashMap<String, Arc<dyn Tool>>,
}

impl ToolRegistry {
    /// Creates an empty tool registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a tool under its `name()`, replacing any tool of the same name.
    pub fn register(&mut self, tool: Arc<dyn Tool>) {
        self.tools.insert(tool.name().to_string(), tool);
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools.get(name).cloned()
    }

    /// Returns (name, description) pairs sorted by name.
    pub fn list(&self) -> Vec<(&str, &str)> {
        let mut entries: Vec<(&str, &str)> = self
            .tools
            .values()
            .map(|t| (t.name(), t.description()))
            .collect();
        entries.sort_by_key(|(name, _)| *name);
        entries
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use concierge_core::{ConciergeError, ToolOutput};

    struct NamedTool(&'static str);

    #[async_trait]
    impl Tool for NamedTool {
        fn name(&self) -> &str {
            self.0
        }

        fn description(&self) -> &str {
            "test tool"
        }

        async fn invoke(&self, _arguments: serde_json::Value) -> Result<ToolOutput, ConciergeError> {
            Ok(ToolOutput::text(self.0))
        }
    }

    #[test]
    fn register_and_lookup() {
        let mut registry = ToolRegistry::new();
        assert!(registry.is_empty());
        registry.register(Arc::new(NamedTool("web_search")));
        registry.register(Arc::new(NamedTool("check_email")));
        assert_eq!(registry.len(), 2);
        assert!(registry.get("web_search").is_some());
        assert!(registry.get("send_email").is_none());
    }

    #[test]
    fn list_is_sorted_by_name() {
        let mut registry = ToolRegistry::new();
        registry.register(Arc::new(NamedTool("wikipedia")));
        registry.register(Arc::new(NamedTool("check_calendar")));
        let names: Vec<&str> = registry.list().into_iter().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["check_calendar", "wikipedia"]);
    }

    #[test]
    fn re_registering_replaces() {
        let mut registry = ToolRegistry::new();
        registry.register(Arc::new(NamedTool("echo")));
        registry.register(Arc::new(NamedTool("echo")));
        assert_eq!(registry.len(), 1);
    }
}
