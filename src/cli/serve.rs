use anyhow::Result;
use rmcp::handler::server::tool::ToolRouter;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::{CallToolResult, Content, Implementation, ServerCapabilities, ServerInfo};
use rmcp::transport::stdio;
use rmcp::{tool, tool_handler, tool_router, ErrorData as McpError, ServerHandler, ServiceExt};
use schemars::JsonSchema;
use serde::Deserialize;
use tracing::{error, info};

use crate::emit::{render_tree, TreeOutput};
use crate::ingest::Ingestor;
use crate::types::RepositoryRef;

#[derive(Clone)]
pub struct IngestServer {
    ingestor: Ingestor,
    tool_router: ToolRouter<Self>,
}

#[derive(Debug, Clone, Copy, Default, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum TreeFormat {
    /// Indented text tree
    #[default]
    Text,
    /// Nested JSON nodes with name, kind and children
    Json,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct DirectoryStructureRequest {
    #[schemars(description = "URL of the git repository (or owner/repo for GitHub)")]
    pub repo_url: String,

    #[schemars(description = "Output format: \"text\" (default) or \"json\"")]
    pub format: Option<TreeFormat>,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct ReadFilesRequest {
    #[schemars(description = "URL of the git repository (or owner/repo for GitHub)")]
    pub repo_url: String,

    #[schemars(description = "File paths to read, relative to the repository root")]
    pub file_paths: Vec<String>,
}

impl IngestServer {
    pub fn new(ingestor: Ingestor) -> Self {
        Self {
            ingestor,
            tool_router: Self::tool_router(),
        }
    }
}

#[tool_router]
impl IngestServer {
    #[tool(
        name = "github_directory_structure",
        description = "Clone a git repository and return its directory structure as a tree. Use this first to decide which files are worth reading."
    )]
    async fn github_directory_structure(
        &self,
        Parameters(request): Parameters<DirectoryStructureRequest>,
    ) -> Result<CallToolResult, McpError> {
        let tree = match self.ingestor.get_directory_structure(&request.repo_url).await {
            Ok(tree) => tree,
            Err(e) => return Ok(CallToolResult::error(vec![Content::text(format!("Error: {e}"))])),
        };

        let text = match request.format.unwrap_or_default() {
            TreeFormat::Text => render_tree(&tree),
            TreeFormat::Json => {
                let repo = RepositoryRef::new(&request.repo_url);
                TreeOutput::new(repo.url(), &tree).to_json()
            }
        };
        Ok(CallToolResult::success(vec![Content::text(text)]))
    }

    #[tool(
        name = "github_read_important_files",
        description = "Clone a git repository and return the contents of the given files as a JSON object keyed by path. Missing or unreadable files map to {\"error\", \"message\"} instead of content."
    )]
    async fn github_read_important_files(
        &self,
        Parameters(request): Parameters<ReadFilesRequest>,
    ) -> Result<CallToolResult, McpError> {
        match self
            .ingestor
            .get_important_files(&request.repo_url, &request.file_paths)
            .await
        {
            Ok(files) => Ok(CallToolResult::success(vec![Content::text(files.to_json())])),
            Err(e) => Ok(CallToolResult::error(vec![Content::text(format!("Error: {e}"))])),
        }
    }
}

#[tool_handler]
impl ServerHandler for IngestServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some("Explore remote git repositories without local access. Call 'github_directory_structure' to see the layout, then 'github_read_important_files' with the paths you need. Every call clones afresh; nothing is cached.".into()),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation::from_build_env(),
            ..Default::default()
        }
    }
}

/// Serve MCP over stdin/stdout until the client disconnects
pub async fn run_mcp_server(ingestor: Ingestor) -> Result<()> {
    info!("starting MCP server on stdio");

    let service = IngestServer::new(ingestor)
        .serve(stdio())
        .await
        .inspect_err(|e| error!(error = %e, "failed to start MCP server"))?;

    service.waiting().await?;
    info!("MCP client disconnected");
    Ok(())
}
