//! Session registry, tool catalog and dispatch
//!
//! ```text
//!   SessionRegistry ── owns ──▶ Box<dyn ToolSession> per server
//!        │
//!        ├──▶ ToolCatalog     (server__tool manifest for the model)
//!        └──▶ ToolDispatcher  (server__tool call ─▶ owning session)
//! ```

mod registry;
mod catalog;
mod dispatcher;

pub use registry::SessionRegistry;
pub use catalog::{SkippedTool, ToolCatalog};
pub use dispatcher::ToolDispatcher;

/// Joins server and tool names into a qualified tool name
pub const QUALIFIED_NAME_SEPARATOR: &str = "__";

/// `docs` + `search` → `docs__search`
pub fn qualify(server: &str, tool: &str) -> String {
    format!("{}{}{}", server, QUALIFIED_NAME_SEPARATOR, tool)
}

/// Split at the first separator. Server names never contain it, so the
/// first occurrence is always the boundary.
pub fn split_qualified_name(qualified: &str) -> Option<(&str, &str)> {
    qualified.split_once(QUALIFIED_NAME_SEPARATOR)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_qualify_and_split() {
        assert_eq!(qualify("docs", "search"), "docs__search");
        assert_eq!(split_qualified_name("docs__search"), Some(("docs", "search")));
        assert_eq!(split_qualified_name("docs__search__v2"), Some(("docs", "search__v2")));
        assert_eq!(split_qualified_name("search"), None);
    }
}
