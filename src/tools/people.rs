//! People tools.
//!
//! Tools: search_people, get_legislators_by_location

use serde_json::{Map, Value as JsonValue};
use tracing::info;

use crate::context::ToolContext;
use crate::error::{McpError, Result};
use crate::models::{result_count, Page, Person};
use crate::schema;
use crate::tools::{fetch, ToolDef, UpstreamCall};
use crate::validate::{
    optional_string, optional_string_list, pagination, required_number_in_range,
};

/// Get all people tool definitions.
pub fn tools() -> Vec<ToolDef> {
    vec![
        ToolDef::new(
            "search_people",
            "Search legislators, governors, and other officials. The upstream API expects a \
             jurisdiction, a name, or one or more ids. Returns a page of people with their \
             current role, party, and district.",
            schema!(object {
                optional: {
                    "jurisdiction": string => "Filter by jurisdiction name or ID",
                    "name": string => "Filter by name, case-insensitive match",
                    "id": string_list => "Filter by one or more OpenStates person IDs",
                    "org_classification": string => "Filter by current role: legislature, executive, lower, upper, government",
                    "district": string => "Filter by district name",
                    "include": string_list => "Extra blocks to include: other_names, other_identifiers, links, sources, offices",
                    "page": integer => "Page number (provider default 1)",
                    "per_page": integer => "Results per page, at most 100 (provider default 10)"
                }
            }),
        ),
        ToolDef::new(
            "get_legislators_by_location",
            "Find the legislators who represent a geographic point.",
            schema!(object {
                required: {
                    "latitude": latitude => "Latitude in decimal degrees, -90 to 90",
                    "longitude": longitude => "Longitude in decimal degrees, -180 to 180"
                },
                optional: {
                    "include": string_list => "Extra blocks to include in each person"
                }
            }),
        ),
    ]
}

/// Dispatch a people tool call.
pub async fn dispatch(
    ctx: &ToolContext,
    name: &str,
    args: Map<String, JsonValue>,
) -> Result<JsonValue> {
    match name {
        "search_people" => {
            let call = search_people_call(&args)?;
            info!(
                jurisdiction = ?call.query.get_all("jurisdiction"),
                name = ?call.query.get_all("name"),
                "searching people"
            );
            let body = fetch::<Page<Person>>(ctx, &call).await?;
            info!(count = result_count(&body), "found people");
            Ok(body)
        }
        "get_legislators_by_location" => {
            let call = legislators_by_location_call(&args)?;
            info!(query = ?call.query.pairs(), "getting legislators for location");
            let body = fetch::<Page<Person>>(ctx, &call).await?;
            info!(count = result_count(&body), "found legislators for location");
            Ok(body)
        }
        _ => Err(McpError::UnknownTool(name.to_string())),
    }
}

/// Validate `search_people` arguments into a `/people` call.
pub fn search_people_call(args: &Map<String, JsonValue>) -> Result<UpstreamCall> {
    let mut call = UpstreamCall::new(["people"]);
    let q = &mut call.query;

    for field in ["jurisdiction", "name", "org_classification", "district"] {
        q.push_opt(field, optional_string(args, field)?);
    }
    q.push_all("id", optional_string_list(args, "id")?);
    q.push_all("include", optional_string_list(args, "include")?);

    let (page, per_page) = pagination(args)?;
    q.push_opt("page", page).push_opt("per_page", per_page);

    Ok(call)
}

/// Validate `get_legislators_by_location` arguments into a `/people.geo` call.
pub fn legislators_by_location_call(args: &Map<String, JsonValue>) -> Result<UpstreamCall> {
    let latitude = required_number_in_range(args, "latitude", -90.0, 90.0)?;
    let longitude = required_number_in_range(args, "longitude", -180.0, 180.0)?;

    let mut call = UpstreamCall::new(["people.geo"]);
    call.query
        .push("lat", latitude)
        .push("lng", longitude)
        .push_all("include", optional_string_list(args, "include")?);
    Ok(call)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn args(v: JsonValue) -> Map<String, JsonValue> {
        match v {
            JsonValue::Object(m) => m,
            _ => Map::new(),
        }
    }

    #[test]
    fn test_location_out_of_range() {
        let err = legislators_by_location_call(&args(json!({"latitude": 91, "longitude": 0})))
            .unwrap_err();
        assert!(matches!(err, McpError::InvalidArg { name, .. } if name == "latitude"));

        let err = legislators_by_location_call(&args(json!({"latitude": 0, "longitude": -180.5})))
            .unwrap_err();
        assert!(matches!(err, McpError::InvalidArg { name, .. } if name == "longitude"));
    }

    #[test]
    fn test_location_passes_values_through() {
        let call = legislators_by_location_call(&args(json!({
            "latitude": 40.7128,
            "longitude": -74.0060
        })))
        .unwrap();
        assert_eq!(call.path(), "/people.geo");
        assert_eq!(call.query.get_all("lat"), vec!["40.7128"]);
        assert_eq!(call.query.get_all("lng"), vec!["-74.006"]);
    }

    #[test]
    fn test_location_missing_fields() {
        let err = legislators_by_location_call(&args(json!({"longitude": 0}))).unwrap_err();
        assert!(matches!(err, McpError::MissingArg(f) if f == "latitude"));
        let err = legislators_by_location_call(&args(json!({"latitude": 0}))).unwrap_err();
        assert!(matches!(err, McpError::MissingArg(f) if f == "longitude"));
    }

    #[test]
    fn test_search_people_ids_repeat() {
        let call = search_people_call(&args(json!({
            "id": ["ocd-person/1", "ocd-person/2"],
            "org_classification": "upper"
        })))
        .unwrap();
        assert_eq!(call.query.get_all("id"), vec!["ocd-person/1", "ocd-person/2"]);
        assert_eq!(call.query.get_all("org_classification"), vec!["upper"]);
    }
}
