//! Bill tools.
//!
//! Tools: search_bills, get_bill_details, get_bill_by_id

use serde_json::{Map, Value as JsonValue};
use tracing::info;

use crate::context::ToolContext;
use crate::error::{McpError, Result};
use crate::models::{result_count, Bill, Page};
use crate::schema;
use crate::tools::{fetch, ToolDef, UpstreamCall};
use crate::validate::{
    optional_string, optional_string_list, pagination, path_segment, required_path_segment,
    required_string,
};

/// Get all bill tool definitions.
pub fn tools() -> Vec<ToolDef> {
    vec![
        ToolDef::new(
            "search_bills",
            "Search for bills matching the given criteria. The upstream API expects either a \
             jurisdiction or a full-text query (q); other filters narrow the results further. \
             Returns a page of bills with pagination metadata.",
            schema!(object {
                optional: {
                    "jurisdiction": string => "Filter by jurisdiction name or ID (e.g. 'ca', 'New York')",
                    "session": string => "Filter by legislative session identifier",
                    "chamber": string => "Filter by chamber of origination ('upper' or 'lower')",
                    "identifier": string_list => "Only include bills with these identifiers (e.g. 'HB 123')",
                    "classification": string => "Filter by classification, e.g. bill or resolution",
                    "subject": string_list => "Filter by one or more subjects",
                    "updated_since": string => "Only bills updated since this date (YYYY-MM-DD)",
                    "created_since": string => "Only bills created since this date (YYYY-MM-DD)",
                    "action_since": string => "Only bills with an action since this date (YYYY-MM-DD)",
                    "sort": string => "Sort order, e.g. updated_desc, first_action_asc, latest_action_desc",
                    "sponsor": string => "Only bills sponsored by this name or person ID",
                    "sponsor_classification": string => "Restrict sponsor matches to this sponsorship type, e.g. primary",
                    "q": string => "Full-text search term",
                    "include": string_list => "Extra blocks to include: sponsorships, abstracts, other_titles, other_identifiers, actions, sources, documents, versions, votes, related_bills",
                    "page": integer => "Page number (provider default 1)",
                    "per_page": integer => "Results per page, at most 100 (provider default 10)"
                }
            }),
        ),
        ToolDef::new(
            "get_bill_details",
            "Get one bill by jurisdiction, session, and bill identifier. Use include to pull \
             in sponsors, actions, votes, versions, and other detail blocks.",
            schema!(object {
                required: {
                    "jurisdiction": string => "Jurisdiction identifier (e.g. 'ny', 'ca', 'tx')",
                    "session": string => "Legislative session identifier",
                    "bill_id": string => "Bill identifier (e.g. 'HB 123', 'SB456')"
                },
                optional: {
                    "include": string_list => "Extra blocks to include in the response"
                }
            }),
        ),
        ToolDef::new(
            "get_bill_by_id",
            "Get one bill by its OpenStates UUID (the part after 'ocd-bill/').",
            schema!(object {
                required: {
                    "bill_uuid": string => "OpenStates bill UUID, without the 'ocd-bill/' prefix"
                },
                optional: {
                    "include": string_list => "Extra blocks to include in the response"
                }
            }),
        ),
    ]
}

/// Dispatch a bill tool call.
pub async fn dispatch(
    ctx: &ToolContext,
    name: &str,
    args: Map<String, JsonValue>,
) -> Result<JsonValue> {
    match name {
        "search_bills" => {
            let call = search_bills_call(&args)?;
            info!(
                jurisdiction = ?call.query.get_all("jurisdiction"),
                q = ?call.query.get_all("q"),
                "searching bills"
            );
            let body = fetch::<Page<Bill>>(ctx, &call).await?;
            info!(count = result_count(&body), "found bills");
            Ok(body)
        }
        "get_bill_details" => {
            let call = bill_details_call(&args)?;
            info!(path = %call.path(), "getting bill details");
            fetch::<Bill>(ctx, &call).await
        }
        "get_bill_by_id" => {
            let call = bill_by_id_call(&args)?;
            info!(path = %call.path(), "getting bill by UUID");
            fetch::<Bill>(ctx, &call).await
        }
        _ => Err(McpError::UnknownTool(name.to_string())),
    }
}

/// Validate `search_bills` arguments into a `/bills` call.
pub fn search_bills_call(args: &Map<String, JsonValue>) -> Result<UpstreamCall> {
    let mut call = UpstreamCall::new(["bills"]);
    let q = &mut call.query;

    for field in [
        "jurisdiction",
        "session",
        "chamber",
        "classification",
        "updated_since",
        "created_since",
        "action_since",
        "sort",
        "sponsor",
        "sponsor_classification",
        "q",
    ] {
        q.push_opt(field, optional_string(args, field)?);
    }
    q.push_all("identifier", optional_string_list(args, "identifier")?);
    q.push_all("subject", optional_string_list(args, "subject")?);
    q.push_all("include", optional_string_list(args, "include")?);

    let (page, per_page) = pagination(args)?;
    q.push_opt("page", page).push_opt("per_page", per_page);

    Ok(call)
}

/// Validate `get_bill_details` arguments into a `/bills/{jurisdiction}/{session}/{bill_id}` call.
pub fn bill_details_call(args: &Map<String, JsonValue>) -> Result<UpstreamCall> {
    let jurisdiction = required_path_segment(args, "jurisdiction")?;
    let session = required_path_segment(args, "session")?;
    let bill_id = required_path_segment(args, "bill_id")?;

    let mut call = UpstreamCall::new(["bills".to_string(), jurisdiction, session, bill_id]);
    call.query
        .push_all("include", optional_string_list(args, "include")?);
    Ok(call)
}

/// Validate `get_bill_by_id` arguments into a `/bills/ocd-bill/{uuid}` call.
pub fn bill_by_id_call(args: &Map<String, JsonValue>) -> Result<UpstreamCall> {
    let uuid = required_string(args, "bill_uuid")?;
    let uuid = uuid.strip_prefix("ocd-bill/").unwrap_or(&uuid).to_string();
    let uuid = path_segment("bill_uuid", uuid)?;

    let mut call = UpstreamCall::new(["bills".to_string(), "ocd-bill".to_string(), uuid]);
    call.query
        .push_all("include", optional_string_list(args, "include")?);
    Ok(call)
}
