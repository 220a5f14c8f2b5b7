//! MCP server implementation for memorial.
//!
//! Exposes the read-only testimony operations as MCP tools for AI editors.

use std::borrow::Cow;
use std::fmt::Write;
use std::sync::Arc;

use clap::ValueEnum;
use rmcp::{
    ServerHandler, ServiceExt,
    handler::server::{router::tool::ToolRouter, wrapper::Parameters},
    model::{
        CallToolResult, Content, ErrorCode, ErrorData as McpError, ServerCapabilities, ServerInfo,
    },
    schemars, tool, tool_handler, tool_router,
    transport::stdio,
};
use serde::Deserialize;

use crate::cli::{DEFAULT_FEATURED_COUNT, DEFAULT_PER_PAGE};
use crate::commands::{self, Memorial, PREVIEW_LENGTH};
use crate::corpus::Category;
use crate::search::{SearchFilters, SortOrder};

/// Parameters for `search_testimonies` tool.
#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct SearchParams {
    #[schemars(description = "The search query; empty lists every testimony")]
    pub query: String,
    #[schemars(description = "Maximum number of results (default: 10)")]
    pub limit: Option<usize>,
    #[schemars(description = "Filter by category: family, elders, friends or colleagues")]
    pub category: Option<String>,
    #[schemars(description = "Filter by exact relationship (e.g., 'Sister')")]
    pub relationship: Option<String>,
    #[schemars(description = "Filter by author name substring")]
    pub author: Option<String>,
    #[schemars(description = "Comma-separated tags; any one must match")]
    pub tags: Option<String>,
    #[schemars(description = "Sort by relevance (default), author, title or page")]
    pub sort: Option<String>,
}

/// Parameters for `get_testimony` tool.
#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct GetParams {
    #[schemars(description = "Testimony id (e.g., 'rare-soul')")]
    pub id: String,
}

/// Parameters for `get_featured` tool.
#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct FeaturedParams {
    #[schemars(description = "Maximum number of testimonies (default: 6)")]
    pub count: Option<usize>,
}

/// Parameters for `get_page_images` tool.
#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct ImagesParams {
    #[schemars(description = "Magazine page number")]
    pub page: u32,
    #[schemars(description = "Last page of an inclusive range")]
    pub to: Option<u32>,
}

fn internal_error(context: &str, e: impl std::fmt::Display) -> McpError {
    McpError {
        code: ErrorCode::INTERNAL_ERROR,
        message: Cow::from(format!("{context}: {e}")),
        data: None,
    }
}

fn invalid_params(message: String) -> McpError {
    McpError {
        code: ErrorCode::INVALID_PARAMS,
        message: Cow::from(message),
        data: None,
    }
}

/// Parse the `sort` parameter the same way the CLI parses `--sort`.
fn parse_sort(sort: Option<&str>) -> Result<SortOrder, McpError> {
    match sort {
        None => Ok(SortOrder::default()),
        Some(s) => <SortOrder as ValueEnum>::from_str(s, true).map_err(|_| {
            invalid_params(format!(
                "invalid sort '{s}' (expected relevance, author, title or page)"
            ))
        }),
    }
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<CallToolResult, McpError> {
    let text = serde_json::to_string_pretty(value)
        .map_err(|e| internal_error("Serialization failed", e))?;
    Ok(CallToolResult::success(vec![Content::text(text)]))
}

/// MCP server exposing memorial tools.
#[derive(Clone)]
pub struct MemorialServer {
    memorial: Arc<Memorial>,
    tool_router: ToolRouter<Self>,
}

#[tool_router]
impl MemorialServer {
    #[must_use]
    pub fn new(memorial: Memorial) -> Self {
        Self {
            memorial: Arc::new(memorial),
            tool_router: Self::tool_router(),
        }
    }

    #[tool(description = "Fuzzy-search the memorial testimonies by title, author, content and tags")]
    async fn search_testimonies(
        &self,
        Parameters(params): Parameters<SearchParams>,
    ) -> Result<CallToolResult, McpError> {
        let no_matches = || {
            Ok(CallToolResult::success(vec![Content::text(format!(
                "No matches found for '{}'",
                params.query
            ))]))
        };

        // An unknown category can match nothing.
        let category = match params.category.as_deref().map(str::parse::<Category>) {
            Some(Ok(c)) => Some(c),
            Some(Err(_)) => return no_matches(),
            None => None,
        };

        let sort = parse_sort(params.sort.as_deref())?;

        let filters = SearchFilters {
            category,
            relationship: params.relationship.clone(),
            author: params.author.clone(),
            tags: commands::parse_tags(params.tags.clone()),
        };
        let limit = params.limit.unwrap_or(DEFAULT_PER_PAGE);

        let results = self
            .memorial
            .search(&params.query, &filters, sort, 1, limit)
            .map_err(|e| internal_error("Search failed", e))?;

        if results.items.is_empty() {
            return no_matches();
        }

        let mut output = String::new();
        for result in &results.items {
            let t = result.testimony;
            let _ = write!(
                output,
                "## {}\n**Id:** {}\n**Author:** {} ({})\n**Page:** {}\n\n{}\n\n",
                commands::highlighted_title(result),
                t.id,
                t.author,
                t.relationship,
                t.page,
                commands::preview(result, PREVIEW_LENGTH)
            );
        }
        let _ = write!(
            output,
            "*{} result(s) found, showing {}*",
            results.total_items,
            results.items.len()
        );

        Ok(CallToolResult::success(vec![Content::text(output)]))
    }

    #[tool(description = "Get one testimony by id, with its images and captions")]
    async fn get_testimony(
        &self,
        Parameters(params): Parameters<GetParams>,
    ) -> Result<CallToolResult, McpError> {
        let detail = self
            .memorial
            .get(&params.id)
            .map_err(|e| internal_error("Failed to get testimony", e))?;
        to_json(&detail)
    }

    #[tool(description = "List the distinct categories, relationships, authors and tags")]
    async fn list_filter_options(&self) -> Result<CallToolResult, McpError> {
        to_json(&self.memorial.filter_options())
    }

    #[tool(description = "Count testimonies overall and per category")]
    async fn get_stats(&self) -> Result<CallToolResult, McpError> {
        to_json(&self.memorial.stats())
    }

    #[tool(description = "Get the hand-picked featured testimonies")]
    async fn get_featured(
        &self,
        Parameters(params): Parameters<FeaturedParams>,
    ) -> Result<CallToolResult, McpError> {
        let count = params.count.unwrap_or(DEFAULT_FEATURED_COUNT);
        to_json(&self.memorial.featured(count))
    }

    #[tool(description = "List the images printed on a magazine page or page range")]
    async fn get_page_images(
        &self,
        Parameters(params): Parameters<ImagesParams>,
    ) -> Result<CallToolResult, McpError> {
        to_json(&self.memorial.page_images(params.page, params.to))
    }
}

#[tool_handler]
impl ServerHandler for MemorialServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(
                "memorial provides read access to the testimonies of Tony's memorial book. \
                Use search_testimonies to find testimonies, get_testimony to read one in full, \
                list_filter_options and get_stats to explore the collection, get_featured for \
                highlights, and get_page_images for photographs."
                    .into(),
            ),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }
}

/// Start the MCP server with stdio transport.
///
/// # Errors
///
/// Returns an error if the server fails to start or encounters a fatal error.
pub async fn serve(memorial: Memorial) -> anyhow::Result<()> {
    tracing::info!("starting MCP server on stdio");
    let server = MemorialServer::new(memorial);
    let service = server.serve(stdio()).await?;
    service.waiting().await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sort_defaults_to_relevance() {
        assert_eq!(parse_sort(None).unwrap(), SortOrder::Relevance);
    }

    #[test]
    fn sort_ignores_case() {
        assert_eq!(parse_sort(Some("Page")).unwrap(), SortOrder::Page);
        assert_eq!(parse_sort(Some("author")).unwrap(), SortOrder::Author);
    }

    #[test]
    fn unknown_sort_is_rejected() {
        let err = parse_sort(Some("newest")).unwrap_err();
        assert_eq!(err.code, ErrorCode::INVALID_PARAMS);
        assert!(err.message.contains("newest"));
    }
}
