//! Flat, namespaced tool manifest built from the live sessions

use std::collections::HashSet;

use crate::logging::Logger;
use crate::types::ToolDescriptor;

use super::registry::SessionRegistry;
use super::{qualify, split_qualified_name, QUALIFIED_NAME_SEPARATOR};

/// Something left out of the catalog, and why
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedTool {
    pub server: String,
    /// `None` when the whole server was skipped
    pub tool: Option<String>,
    pub reason: String,
}

/// Tool manifest offered to the chat endpoint
#[derive(Debug, Clone, Default)]
pub struct ToolCatalog {
    tools: Vec<ToolDescriptor>,
    skipped: Vec<SkippedTool>,
}

impl ToolCatalog {
    /// List every session's tools, in registry order
    ///
    /// A session whose listing fails is skipped and the rest are still
    /// served. A tool is rejected unless its qualified name splits back
    /// into exactly its own server and tool, and no earlier tool took
    /// the same name.
    pub async fn build(registry: &SessionRegistry, logger: &dyn Logger) -> Self {
        let mut catalog = Self::default();
        let mut seen = HashSet::new();

        for (server, session) in registry.sessions() {
            let tools = match session.list_tools().await {
                Ok(tools) => tools,
                Err(e) => {
                    logger.warn(&format!(
                        "[ToolCatalog] Skipping server '{}': tool listing failed: {}",
                        server, e
                    ));
                    catalog.skipped.push(SkippedTool {
                        server: server.to_string(),
                        tool: None,
                        reason: e.to_string(),
                    });
                    continue;
                }
            };

            for tool in tools {
                let qualified = qualify(server, &tool.name);
                let rejection = if tool.name.contains(QUALIFIED_NAME_SEPARATOR) {
                    Some(format!("name contains '{}'", QUALIFIED_NAME_SEPARATOR))
                } else if split_qualified_name(&qualified) != Some((server, tool.name.as_str())) {
                    Some(format!("'{}' does not split back to this server and tool", qualified))
                } else if seen.contains(&qualified) {
                    Some(format!("'{}' is already in the catalog", qualified))
                } else {
                    None
                };

                if let Some(reason) = rejection {
                    logger.warn(&format!(
                        "[ToolCatalog] Rejecting tool '{}' on '{}': {}",
                        tool.name, server, reason
                    ));
                    catalog.skipped.push(SkippedTool {
                        server: server.to_string(),
                        tool: Some(tool.name),
                        reason,
                    });
                    continue;
                }

                let description = match tool.description.as_deref().map(str::trim) {
                    Some(desc) if !desc.is_empty() => format!("[{}] {}", server, desc),
                    _ => format!("[{}] {}", server, tool.name),
                };
                seen.insert(qualified.clone());
                catalog.tools.push(ToolDescriptor::new(qualified, description).with_schema(tool.input_schema));
            }
        }

        logger.debug(&format!(
            "[ToolCatalog] Built catalog with {} tools ({} skipped)",
            catalog.tools.len(),
            catalog.skipped.len()
        ));
        catalog
    }

    pub fn tools(&self) -> &[ToolDescriptor] {
        &self.tools
    }

    pub fn into_tools(self) -> Vec<ToolDescriptor> {
        self.tools
    }

    /// Servers and tools left out of the manifest
    pub fn skipped(&self) -> &[SkippedTool] {
        &self.skipped
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}
