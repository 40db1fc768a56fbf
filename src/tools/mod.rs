//! Tool registry and category definitions.
//!
//! Provides the infrastructure for registering and dispatching MCP tools.

pub mod bills;
pub mod committees;
pub mod events;
pub mod jurisdictions;
pub mod people;
pub mod status;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};

use crate::context::ToolContext;
use crate::error::{McpError, Result};
use crate::models;
use crate::query::UpstreamQuery;

/// A tool definition for the MCP tools/list response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDef {
    /// Tool name (e.g., "search_bills")
    pub name: String,
    /// Tool description
    pub description: String,
    /// JSON Schema for the input parameters
    #[serde(rename = "inputSchema")]
    pub input_schema: JsonValue,
}

impl ToolDef {
    /// Create a new tool definition.
    pub fn new(name: &str, description: &str, input_schema: JsonValue) -> Self {
        Self {
            name: name.to_string(),
            description: description.to_string(),
            input_schema,
        }
    }
}

/// A validated upstream request: path segments and query string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpstreamCall {
    /// Path segments under the base URL
    pub segments: Vec<String>,
    /// Query-string pairs
    pub query: UpstreamQuery,
}

impl UpstreamCall {
    /// A call to `segments` with an empty query.
    pub fn new<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            segments: segments.into_iter().map(Into::into).collect(),
            query: UpstreamQuery::new(),
        }
    }

    /// The upstream path, for logging.
    pub fn path(&self) -> String {
        format!("/{}", self.segments.join("/"))
    }
}

/// Send one validated call and reshape the body through `T`.
pub(crate) async fn fetch<T>(ctx: &ToolContext, call: &UpstreamCall) -> Result<JsonValue>
where
    T: DeserializeOwned + Serialize,
{
    let segments: Vec<&str> = call.segments.iter().map(String::as_str).collect();
    let response = ctx.client().get(&segments, &call.query).await?;
    Ok(models::reshape::<T>(response.body))
}

/// Registry of all available tools.
pub struct ToolRegistry {
    tools: Vec<ToolDef>,
}

impl ToolRegistry {
    /// Create a new registry with all tools registered.
    pub fn new() -> Self {
        let mut tools = Vec::new();

        tools.extend(bills::tools());
        tools.extend(people::tools());
        tools.extend(committees::tools());
        tools.extend(events::tools());
        tools.extend(jurisdictions::tools());
        tools.extend(status::tools());

        Self { tools }
    }

    /// Get all tool definitions.
    pub fn tools(&self) -> &[ToolDef] {
        &self.tools
    }

    /// Whether a tool with this name is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.tools.iter().any(|t| t.name == name)
    }

    /// Dispatch a tool call to the appropriate handler.
    pub async fn dispatch(
        &self,
        ctx: &ToolContext,
        name: &str,
        args: Map<String, JsonValue>,
    ) -> Result<JsonValue> {
        match name {
            "search_bills" | "get_bill_details" | "get_bill_by_id" => {
                bills::dispatch(ctx, name, args).await
            }
            "search_people" | "get_legislators_by_location" => {
                people::dispatch(ctx, name, args).await
            }
            "search_committees" | "get_committee_details" => {
                committees::dispatch(ctx, name, args).await
            }
            "search_events" | "get_event_details" => events::dispatch(ctx, name, args).await,
            "get_jurisdictions" | "get_jurisdiction_details" => {
                jurisdictions::dispatch(ctx, name, args).await
            }
            "status" => status::dispatch(ctx, name, args).await,
            _ => Err(McpError::UnknownTool(name.to_string())),
        }
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Helper macro for creating JSON Schema for tool input parameters.
///
/// Each property is `"name": type` or `"name": type => "description"`.
#[macro_export]
macro_rules! schema {
    // Object with required and optional properties
    (object {
        required: { $($req_name:literal : $req_type:tt $(=> $req_desc:literal)?),* $(,)? },
        optional: { $($opt_name:literal : $opt_type:tt $(=> $opt_desc:literal)?),* $(,)? }
    }) => {{
        let mut required: Vec<&str> = Vec::new();
        $(required.push($req_name);)*

        let mut props = serde_json::Map::new();
        $(props.insert($req_name.to_string(), $crate::schema!(@prop $req_type $(, $req_desc)?));)*
        $(props.insert($opt_name.to_string(), $crate::schema!(@prop $opt_type $(, $opt_desc)?));)*

        serde_json::json!({
            "type": "object",
            "properties": props,
            "required": required
        })
    }};

    // Object with only required properties
    (object {
        required: { $($req_name:literal : $req_type:tt $(=> $req_desc:literal)?),* $(,)? }
    }) => {{
        let mut required: Vec<&str> = Vec::new();
        $(required.push($req_name);)*

        let mut props = serde_json::Map::new();
        $(props.insert($req_name.to_string(), $crate::schema!(@prop $req_type $(, $req_desc)?));)*

        serde_json::json!({
            "type": "object",
            "properties": props,
            "required": required
        })
    }};

    // Object with only optional properties
    (object {
        optional: { $($opt_name:literal : $opt_type:tt $(=> $opt_desc:literal)?),* $(,)? }
    }) => {{
        let mut props = serde_json::Map::new();
        $(props.insert($opt_name.to_string(), $crate::schema!(@prop $opt_type $(, $opt_desc)?));)*

        serde_json::json!({
            "type": "object",
            "properties": props,
            "required": []
        })
    }};

    // Empty object (no parameters)
    (object {}) => {{
        serde_json::json!({
            "type": "object",
            "properties": {},
            "required": []
        })
    }};

    (@prop $t:tt) => { $crate::schema!(@type $t) };
    (@prop $t:tt, $desc:literal) => {{
        let mut prop = $crate::schema!(@type $t);
        prop["description"] = serde_json::Value::from($desc);
        prop
    }};

    // Type mappings
    (@type string) => { serde_json::json!({"type": "string"}) };
    (@type number) => { serde_json::json!({"type": "number"}) };
    (@type integer) => { serde_json::json!({"type": "integer", "minimum": 1}) };
    (@type boolean) => { serde_json::json!({"type": "boolean"}) };
    (@type latitude) => { serde_json::json!({"type": "number", "minimum": -90, "maximum": 90}) };
    (@type longitude) => { serde_json::json!({"type": "number", "minimum": -180, "maximum": 180}) };
    (@type string_list) => {
        serde_json::json!({
            "anyOf": [
                {"type": "string"},
                {"type": "array", "items": {"type": "string"}}
            ]
        })
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_names_unique_and_routable() {
        let registry = ToolRegistry::new();
        let mut names: Vec<&str> = registry.tools().iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names.len(), 12);
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), 12, "duplicate tool names");

        for expected in [
            "search_bills",
            "get_bill_details",
            "get_bill_by_id",
            "search_people",
            "get_legislators_by_location",
            "search_committees",
            "get_committee_details",
            "search_events",
            "get_event_details",
            "get_jurisdictions",
            "get_jurisdiction_details",
            "status",
        ] {
            assert!(registry.contains(expected), "missing {}", expected);
        }
    }

    #[test]
    fn test_schemas_are_objects_with_descriptions() {
        for tool in ToolRegistry::new().tools() {
            assert!(!tool.description.is_empty(), "{} has no description", tool.name);
            assert_eq!(tool.input_schema["type"], "object", "{}", tool.name);
            let props = tool.input_schema["properties"].as_object().unwrap();
            for (prop, schema) in props {
                assert!(
                    schema.get("description").is_some(),
                    "{}.{} has no description",
                    tool.name,
                    prop
                );
            }
            for req in tool.input_schema["required"].as_array().unwrap() {
                assert!(props.contains_key(req.as_str().unwrap()));
            }
        }
    }

    #[test]
    fn test_schema_macro() {
        let schema = crate::schema!(object {
            required: { "id": string => "The id" },
            optional: { "page": integer }
        });
        assert_eq!(schema["required"], serde_json::json!(["id"]));
        assert_eq!(schema["properties"]["id"]["description"], "The id");
        assert_eq!(schema["properties"]["page"]["type"], "integer");
        assert!(schema["properties"]["page"].get("description").is_none());
    }

    #[test]
    fn test_upstream_call_path() {
        let call = UpstreamCall::new(["bills", "ca", "2023", "AB 1"]);
        assert_eq!(call.path(), "/bills/ca/2023/AB 1");
        assert!(call.query.is_empty());
    }
}
