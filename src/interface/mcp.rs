//! MCP Server for borrow-ledger
//!
//! MCP Protocol (stdio) <-> application::BorrowListController
//!
//! 10 tools: borrow_list, borrow_filter, borrow_add, borrow_edit, borrow_delete,
//! borrow_field, borrow_submit, borrow_cancel, borrow_status, borrow_reload

use std::sync::Arc;

use rmcp::{
    handler::server::{tool::ToolCallContext, tool::ToolRouter, wrapper::Parameters},
    model::{
        CallToolRequestParams, CallToolResult, Content, Implementation, ListToolsResult,
        PaginatedRequestParams, ProtocolVersion, ServerCapabilities, ServerInfo,
    },
    service::{RequestContext, RoleServer},
    tool, tool_router,
    transport::stdio,
    ErrorData as McpError, ServerHandler, ServiceExt,
};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use crate::application::controller::{
    BorrowListController, DeleteOutcome, StatusChange, StatusFilter, SubmitOutcome,
};
use crate::application::error::AppError;
use crate::application::store::RecordStore;
use crate::application::view::ListView;
use crate::config::AppConfig;
use crate::domain::model::draft::FormField;
use crate::domain::model::id::RecordId;
use crate::domain::model::record::BorrowStatus;
use crate::infra::http_store::HttpBorrowRepository;

type Controller = BorrowListController<HttpBorrowRepository>;

// =============================================================================
// Public entry point
// =============================================================================

/// 一覧を一度取得してからMCP Serverを起動する。
pub async fn run(config: AppConfig) -> anyhow::Result<()> {
    let repo = HttpBorrowRepository::new(
        &config.api.base_url,
        &config.api.collection,
        config.api.timeout(),
    )?;
    tracing::info!(url = repo.collection_url(), "using borrow collection");

    let mut controller = BorrowListController::new(RecordStore::new(repo));
    controller.load().await;

    let server = BorrowLedgerServer::new(controller);
    let service = server.serve(stdio()).await?;
    service.waiting().await?;
    Ok(())
}

// =============================================================================
// MCP Server
// =============================================================================

#[derive(Clone)]
struct BorrowLedgerServer {
    controller: Arc<Mutex<Controller>>,
    tool_router: ToolRouter<Self>,
}

impl BorrowLedgerServer {
    fn new(controller: Controller) -> Self {
        Self {
            controller: Arc::new(Mutex::new(controller)),
            tool_router: Self::tool_router(),
        }
    }

    fn to_mcp_error(e: AppError) -> McpError {
        match e {
            AppError::Network(_) => McpError::internal_error(format!("{e}"), None),
            _ => McpError::invalid_params(format!("{e}"), None),
        }
    }

    /// メッセージ + 最新状態の描画
    fn reply(message: impl AsRef<str>, controller: &Controller) -> CallToolResult {
        CallToolResult::success(vec![Content::text(format!(
            "{}\n\n{}",
            message.as_ref(),
            ListView::render(controller)
        ))])
    }
}

// =============================================================================
// ServerHandler impl
// =============================================================================

impl ServerHandler for BorrowLedgerServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2025_03_26,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "borrow-ledger".to_string(),
                title: Some("Borrow Ledger: book loan records".to_string()),
                description: Some(
                    "List, add, edit and delete book borrow records kept in a REST collection."
                        .to_string(),
                ),
                version: env!("CARGO_PKG_VERSION").to_string(),
                icons: None,
                website_url: None,
            },
            instructions: Some(
                "Track who borrowed which book and whether it came back.\n\
                 \n\
                 `borrow_list` shows the table (IDs in the first column). \
                 Add: `borrow_add` → `borrow_field` per field → `borrow_submit`. \
                 Edit: `borrow_edit` → `borrow_field` → `borrow_submit`. \
                 Delete: `borrow_delete` → `borrow_submit`. `borrow_cancel` closes any form. \
                 `borrow_status` flips returned/not returned directly."
                    .to_string(),
            ),
        }
    }

    async fn list_tools(
        &self,
        _request: Option<PaginatedRequestParams>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, McpError> {
        Ok(ListToolsResult {
            tools: self.tool_router.list_all(),
            next_cursor: None,
            meta: None,
        })
    }

    async fn call_tool(
        &self,
        request: CallToolRequestParams,
        context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, McpError> {
        let tool_ctx = ToolCallContext::new(self, request, context);
        self.tool_router.call(tool_ctx).await
    }
}

// =============================================================================
// Request types
// =============================================================================

fn parse_filter(s: &str) -> Result<StatusFilter, McpError> {
    s.parse().map_err(|_| {
        McpError::invalid_params(
            format!("Unknown filter: '{s}'. Use: all, returned, not_returned"),
            None,
        )
    })
}

fn parse_status(s: &str) -> Result<BorrowStatus, McpError> {
    s.parse().map_err(|_| {
        McpError::invalid_params(
            format!("Unknown status: '{s}'. Use: returned, not_returned"),
            None,
        )
    })
}

fn parse_field(s: &str) -> Result<FormField, McpError> {
    s.parse().map_err(|_| {
        McpError::invalid_params(
            format!(
                "Unknown field: '{s}'. Use: bookName, borrower, borrowDate, returnDate, status"
            ),
            None,
        )
    })
}

fn parse_record_id(s: &str) -> Result<RecordId, McpError> {
    let s = s.trim();
    if s.is_empty() {
        return Err(McpError::invalid_params("id must not be empty", None));
    }
    Ok(RecordId::from(s))
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
struct McpNoArgs {}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
struct McpFilterRequest {
    #[schemars(description = "Status filter: all, returned, not_returned")]
    pub status: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
struct McpRecordRequest {
    #[schemars(description = "Record ID from the first column of `borrow_list`")]
    pub id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
struct McpFieldRequest {
    #[schemars(description = "Field: bookName, borrower, borrowDate, returnDate, status")]
    pub field: String,
    #[schemars(
        description = "New value. Dates as YYYY-MM-DD (empty returnDate = not returned yet). Status: returned / not_returned"
    )]
    #[serde(default)]
    pub value: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
struct McpStatusRequest {
    #[schemars(description = "Record ID from the first column of `borrow_list`")]
    pub id: String,
    #[schemars(description = "Target status: returned or not_returned")]
    pub status: String,
}

// =============================================================================
// Tool implementations
// =============================================================================

#[tool_router]
impl BorrowLedgerServer {
    #[tool(
        name = "borrow_list",
        description = "Show the borrow record table (filtered by the current status filter) and the open form, if any.",
        annotations(
            read_only_hint = true,
            destructive_hint = false,
            open_world_hint = false
        )
    )]
    async fn borrow_list(
        &self,
        #[allow(unused_variables)] Parameters(_req): Parameters<McpNoArgs>,
    ) -> Result<CallToolResult, McpError> {
        let ctl = self.controller.lock().await;
        Ok(CallToolResult::success(vec![Content::text(
            ListView::render(&*ctl),
        )]))
    }

    #[tool(
        name = "borrow_filter",
        description = "Filter the table by status: all, returned, not_returned. The underlying list is not changed.",
        annotations(
            read_only_hint = false,
            destructive_hint = false,
            idempotent_hint = true,
            open_world_hint = false
        )
    )]
    async fn borrow_filter(
        &self,
        Parameters(req): Parameters<McpFilterRequest>,
    ) -> Result<CallToolResult, McpError> {
        let filter = parse_filter(&req.status)?;
        let mut ctl = self.controller.lock().await;
        ctl.set_filter(filter);
        Ok(Self::reply(format!("Filter: {filter}"), &ctl))
    }

    #[tool(
        name = "borrow_add",
        description = "Open an empty add form (status defaults to not returned). Fill it with `borrow_field`, then `borrow_submit`.",
        annotations(
            read_only_hint = false,
            destructive_hint = false,
            idempotent_hint = true,
            open_world_hint = false
        )
    )]
    async fn borrow_add(
        &self,
        #[allow(unused_variables)] Parameters(_req): Parameters<McpNoArgs>,
    ) -> Result<CallToolResult, McpError> {
        let mut ctl = self.controller.lock().await;
        ctl.open_add();
        Ok(Self::reply("Add form opened.", &ctl))
    }

    #[tool(
        name = "borrow_edit",
        description = "Open the edit form for a record, pre-filled with its current values.",
        annotations(
            read_only_hint = false,
            destructive_hint = false,
            idempotent_hint = true,
            open_world_hint = false
        )
    )]
    async fn borrow_edit(
        &self,
        Parameters(req): Parameters<McpRecordRequest>,
    ) -> Result<CallToolResult, McpError> {
        let id = parse_record_id(&req.id)?;
        let mut ctl = self.controller.lock().await;
        ctl.open_edit(&id).map_err(Self::to_mcp_error)?;
        Ok(Self::reply(format!("Editing record {id}."), &ctl))
    }

    #[tool(
        name = "borrow_delete",
        description = "Ask for confirmation to delete a record. Confirm with `borrow_submit`, abort with `borrow_cancel`.",
        annotations(
            read_only_hint = false,
            destructive_hint = false,
            idempotent_hint = true,
            open_world_hint = false
        )
    )]
    async fn borrow_delete(
        &self,
        Parameters(req): Parameters<McpRecordRequest>,
    ) -> Result<CallToolResult, McpError> {
        let id = parse_record_id(&req.id)?;
        let mut ctl = self.controller.lock().await;
        ctl.open_delete(&id).map_err(Self::to_mcp_error)?;
        Ok(Self::reply(format!("Delete record {id}?"), &ctl))
    }

    #[tool(
        name = "borrow_field",
        description = "Set one field of the open add/edit form. Validation errors are shown next to the field immediately.",
        annotations(
            read_only_hint = false,
            destructive_hint = false,
            idempotent_hint = true,
            open_world_hint = false
        )
    )]
    async fn borrow_field(
        &self,
        Parameters(req): Parameters<McpFieldRequest>,
    ) -> Result<CallToolResult, McpError> {
        let field = parse_field(&req.field)?;
        let mut ctl = self.controller.lock().await;
        let error_count = ctl
            .change_field(field, &req.value)
            .map_err(Self::to_mcp_error)?
            .len();
        let message = match error_count {
            0 => format!("Set {field}. Form is valid."),
            n => format!("Set {field}. {n} field(s) need attention."),
        };
        Ok(Self::reply(message, &ctl))
    }

    #[tool(
        name = "borrow_submit",
        description = "Submit the open form: saves an add/edit form (blocked while fields are invalid) or confirms a pending delete. The form closes once the backend call finishes.",
        annotations(
            read_only_hint = false,
            destructive_hint = true,
            idempotent_hint = false,
            open_world_hint = true
        )
    )]
    async fn borrow_submit(
        &self,
        #[allow(unused_variables)] Parameters(_req): Parameters<McpNoArgs>,
    ) -> Result<CallToolResult, McpError> {
        let mut ctl = self.controller.lock().await;

        if ctl.modal().form().is_none() {
            let message = match ctl.confirm_delete().await.map_err(|e| match e {
                AppError::NoPendingDelete => McpError::invalid_params(
                    "Nothing to submit. Open a form with `borrow_add`, `borrow_edit` or `borrow_delete`.",
                    None,
                ),
                other => Self::to_mcp_error(other),
            })? {
                DeleteOutcome::Removed(id) => format!("Deleted record {id}."),
                DeleteOutcome::Failed => "Delete failed (backend error); list unchanged.".to_string(),
            };
            return Ok(Self::reply(message, &ctl));
        }

        let message = match ctl.submit().await.map_err(Self::to_mcp_error)? {
            SubmitOutcome::Invalid(errors) => {
                format!("Not saved: {} field(s) invalid.", errors.len())
            }
            SubmitOutcome::Saved(record) => format!(
                "Saved record {}.",
                record.id().map(|id| id.to_string()).unwrap_or_default()
            ),
            SubmitOutcome::Failed => "Save failed (backend error); list unchanged.".to_string(),
        };
        Ok(Self::reply(message, &ctl))
    }

    #[tool(
        name = "borrow_cancel",
        description = "Close the open add/edit/delete form without saving.",
        annotations(
            read_only_hint = false,
            destructive_hint = false,
            idempotent_hint = true,
            open_world_hint = false
        )
    )]
    async fn borrow_cancel(
        &self,
        #[allow(unused_variables)] Parameters(_req): Parameters<McpNoArgs>,
    ) -> Result<CallToolResult, McpError> {
        let mut ctl = self.controller.lock().await;
        ctl.cancel();
        Ok(Self::reply("Closed.", &ctl))
    }

    #[tool(
        name = "borrow_status",
        description = "Change a record's status directly (returned / not_returned) without opening the edit form.",
        annotations(
            read_only_hint = false,
            destructive_hint = false,
            idempotent_hint = true,
            open_world_hint = true
        )
    )]
    async fn borrow_status(
        &self,
        Parameters(req): Parameters<McpStatusRequest>,
    ) -> Result<CallToolResult, McpError> {
        let id = parse_record_id(&req.id)?;
        let status = parse_status(&req.status)?;
        let mut ctl = self.controller.lock().await;
        let message = match ctl
            .quick_status(&id, status)
            .await
            .map_err(Self::to_mcp_error)?
        {
            StatusChange::Unchanged => format!("Record {id} is already {status}."),
            StatusChange::Saved(_) => format!("Record {id} → {status}."),
            StatusChange::Failed => "Status change failed (backend error).".to_string(),
        };
        Ok(Self::reply(message, &ctl))
    }

    #[tool(
        name = "borrow_reload",
        description = "Fetch the whole collection from the backend again.",
        annotations(
            read_only_hint = false,
            destructive_hint = false,
            idempotent_hint = true,
            open_world_hint = true
        )
    )]
    async fn borrow_reload(
        &self,
        #[allow(unused_variables)] Parameters(_req): Parameters<McpNoArgs>,
    ) -> Result<CallToolResult, McpError> {
        let mut ctl = self.controller.lock().await;
        let count = ctl.load().await;
        Ok(Self::reply(format!("Loaded {count} record(s)."), &ctl))
    }
}

// =============================================================================
// Tests
// =============================================================================
