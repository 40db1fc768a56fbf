//! Jurisdiction tools.
//!
//! Tools: get_jurisdictions, get_jurisdiction_details

use serde_json::{Map, Value as JsonValue};
use tracing::info;

use crate::context::ToolContext;
use crate::error::{McpError, Result};
use crate::models::{result_count, Jurisdiction, Page};
use crate::schema;
use crate::tools::{fetch, ToolDef, UpstreamCall};
use crate::validate::{optional_string, optional_string_list, pagination, required_path_id};

/// Get all jurisdiction tool definitions.
pub fn tools() -> Vec<ToolDef> {
    vec![
        ToolDef::new(
            "get_jurisdictions",
            "List available jurisdictions (states, territories, municipalities).",
            schema!(object {
                optional: {
                    "classification": string => "Filter by jurisdiction type: state, municipality, country",
                    "include": string_list => "Extra blocks to include: organizations, legislative_sessions, latest_runs",
                    "page": integer => "Page number (provider default 1)",
                    "per_page": integer => "Results per page, at most 100 (provider default 52)"
                }
            }),
        ),
        ToolDef::new(
            "get_jurisdiction_details",
            "Get metadata for one jurisdiction, optionally with its chambers and sessions.",
            schema!(object {
                required: {
                    "jurisdiction_id": string => "Jurisdiction ID or abbreviation (e.g. 'ny', 'ca', 'tx')"
                },
                optional: {
                    "include": string_list => "Extra blocks to include: organizations, legislative_sessions, latest_runs"
                }
            }),
        ),
    ]
}

/// Dispatch a jurisdiction tool call.
pub async fn dispatch(
    ctx: &ToolContext,
    name: &str,
    args: Map<String, JsonValue>,
) -> Result<JsonValue> {
    match name {
        "get_jurisdictions" => {
            let call = jurisdictions_call(&args)?;
            info!(classification = ?call.query.get_all("classification"), "listing jurisdictions");
            let body = fetch::<Page<Jurisdiction>>(ctx, &call).await?;
            info!(count = result_count(&body), "found jurisdictions");
            Ok(body)
        }
        "get_jurisdiction_details" => {
            let call = jurisdiction_details_call(&args)?;
            info!(path = %call.path(), "getting jurisdiction details");
            fetch::<Jurisdiction>(ctx, &call).await
        }
        _ => Err(McpError::UnknownTool(name.to_string())),
    }
}

/// Validate `get_jurisdictions` arguments into a `/jurisdictions` call.
pub fn jurisdictions_call(args: &Map<String, JsonValue>) -> Result<UpstreamCall> {
    let mut call = UpstreamCall::new(["jurisdictions"]);
    let q = &mut call.query;

    q.push_opt("classification", optional_string(args, "classification")?);
    q.push_all("include", optional_string_list(args, "include")?);

    let (page, per_page) = pagination(args)?;
    q.push_opt("page", page).push_opt("per_page", per_page);

    Ok(call)
}

/// Validate `get_jurisdiction_details` arguments into a `/jurisdictions/{id}` call.
pub fn jurisdiction_details_call(args: &Map<String, JsonValue>) -> Result<UpstreamCall> {
    let id = required_path_id(args, "jurisdiction_id")?;
    let mut call = UpstreamCall::new(["jurisdictions".to_string(), id]);
    call.query
        .push_all("include", optional_string_list(args, "include")?);
    Ok(call)
}
