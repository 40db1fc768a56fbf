//! Event tools.
//!
//! Tools: search_events, get_event_details

use serde_json::{Map, Value as JsonValue};
use tracing::info;

use crate::context::ToolContext;
use crate::error::{McpError, Result};
use crate::models::{result_count, Event, Page};
use crate::schema;
use crate::tools::{fetch, ToolDef, UpstreamCall};
use crate::validate::{
    optional_bool, optional_string, optional_string_list, pagination, required_path_id,
};

/// Get all event tool definitions.
pub fn tools() -> Vec<ToolDef> {
    vec![
        ToolDef::new(
            "search_events",
            "Search legislative events such as hearings and floor sessions.",
            schema!(object {
                optional: {
                    "jurisdiction": string => "Filter by jurisdiction name or ID",
                    "deleted": boolean => "Return events marked as deleted",
                    "before": string => "Only events starting before this datetime (ISO 8601)",
                    "after": string => "Only events starting after this datetime (ISO 8601)",
                    "require_bills": boolean => "Only events with associated bills",
                    "include": string_list => "Extra blocks to include: links, sources, media, documents, participants, agenda",
                    "page": integer => "Page number (provider default 1)",
                    "per_page": integer => "Results per page, at most 100 (provider default 20)"
                }
            }),
        ),
        ToolDef::new(
            "get_event_details",
            "Get one legislative event by ID, optionally with its agenda and participants.",
            schema!(object {
                required: {
                    "event_id": string => "Event ID, e.g. 'ocd-event/…'"
                },
                optional: {
                    "include": string_list => "Extra blocks to include: links, sources, media, documents, participants, agenda"
                }
            }),
        ),
    ]
}

/// Dispatch an event tool call.
pub async fn dispatch(
    ctx: &ToolContext,
    name: &str,
    args: Map<String, JsonValue>,
) -> Result<JsonValue> {
    match name {
        "search_events" => {
            let call = search_events_call(&args)?;
            info!(jurisdiction = ?call.query.get_all("jurisdiction"), "searching events");
            let body = fetch::<Page<Event>>(ctx, &call).await?;
            info!(count = result_count(&body), "found events");
            Ok(body)
        }
        "get_event_details" => {
            let call = event_details_call(&args)?;
            info!(path = %call.path(), "getting event details");
            fetch::<Event>(ctx, &call).await
        }
        _ => Err(McpError::UnknownTool(name.to_string())),
    }
}

/// Validate `search_events` arguments into an `/events` call.
pub fn search_events_call(args: &Map<String, JsonValue>) -> Result<UpstreamCall> {
    let mut call = UpstreamCall::new(["events"]);
    let q = &mut call.query;

    q.push_opt("jurisdiction", optional_string(args, "jurisdiction")?);
    q.push_opt("deleted", optional_bool(args, "deleted")?);
    q.push_opt("before", optional_string(args, "before")?);
    q.push_opt("after", optional_string(args, "after")?);
    q.push_opt("require_bills", optional_bool(args, "require_bills")?);
    q.push_all("include", optional_string_list(args, "include")?);

    let (page, per_page) = pagination(args)?;
    q.push_opt("page", page).push_opt("per_page", per_page);

    Ok(call)
}

/// Validate `get_event_details` arguments into an `/events/{id}` call.
pub fn event_details_call(args: &Map<String, JsonValue>) -> Result<UpstreamCall> {
    let id = required_path_id(args, "event_id")?;
    let mut call = UpstreamCall::new(["events".to_string(), id]);
    call.query
        .push_all("include", optional_string_list(args, "include")?);
    Ok(call)
}
