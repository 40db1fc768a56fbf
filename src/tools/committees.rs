//! Committee tools.
//!
//! Tools: search_committees, get_committee_details

use serde_json::{Map, Value as JsonValue};
use tracing::info;

use crate::context::ToolContext;
use crate::error::{McpError, Result};
use crate::models::{result_count, Committee, Page};
use crate::schema;
use crate::tools::{fetch, ToolDef, UpstreamCall};
use crate::validate::{optional_string, optional_string_list, pagination, required_path_id};

/// Get all committee tool definitions.
pub fn tools() -> Vec<ToolDef> {
    vec![
        ToolDef::new(
            "search_committees",
            "Search legislative committees by jurisdiction, chamber, classification, or parent.",
            schema!(object {
                optional: {
                    "jurisdiction": string => "Filter by jurisdiction name or ID",
                    "classification": string => "Committee classification, e.g. 'committee' or 'subcommittee'",
                    "parent": string => "ocd-organization ID of the parent committee",
                    "chamber": string => "Chamber of the committee, generally 'upper' or 'lower'",
                    "include": string_list => "Extra blocks to include: memberships, links, sources",
                    "page": integer => "Page number (provider default 1)",
                    "per_page": integer => "Results per page, at most 100 (provider default 20)"
                }
            }),
        ),
        ToolDef::new(
            "get_committee_details",
            "Get one committee by ID, optionally with its membership.",
            schema!(object {
                required: {
                    "committee_id": string => "Committee ID, e.g. 'ocd-organization/…'"
                },
                optional: {
                    "include": string_list => "Extra blocks to include: memberships, links, sources"
                }
            }),
        ),
    ]
}

/// Dispatch a committee tool call.
pub async fn dispatch(
    ctx: &ToolContext,
    name: &str,
    args: Map<String, JsonValue>,
) -> Result<JsonValue> {
    match name {
        "search_committees" => {
            let call = search_committees_call(&args)?;
            info!(jurisdiction = ?call.query.get_all("jurisdiction"), "searching committees");
            let body = fetch::<Page<Committee>>(ctx, &call).await?;
            info!(count = result_count(&body), "found committees");
            Ok(body)
        }
        "get_committee_details" => {
            let call = committee_details_call(&args)?;
            info!(path = %call.path(), "getting committee details");
            fetch::<Committee>(ctx, &call).await
        }
        _ => Err(McpError::UnknownTool(name.to_string())),
    }
}

/// Validate `search_committees` arguments into a `/committees` call.
pub fn search_committees_call(args: &Map<String, JsonValue>) -> Result<UpstreamCall> {
    let mut call = UpstreamCall::new(["committees"]);
    let q = &mut call.query;

    for field in ["jurisdiction", "classification", "parent", "chamber"] {
        q.push_opt(field, optional_string(args, field)?);
    }
    q.push_all("include", optional_string_list(args, "include")?);

    let (page, per_page) = pagination(args)?;
    q.push_opt("page", page).push_opt("per_page", per_page);

    Ok(call)
}

/// Validate `get_committee_details` arguments into a `/committees/{id}` call.
pub fn committee_details_call(args: &Map<String, JsonValue>) -> Result<UpstreamCall> {
    let id = required_path_id(args, "committee_id")?;
    let mut call = UpstreamCall::new(["committees".to_string(), id]);
    call.query
        .push_all("include", optional_string_list(args, "include")?);
    Ok(call)
}
