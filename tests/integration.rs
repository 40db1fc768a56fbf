//! Integration tests for the MCP server.

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use openstates_mcp::{router, McpServer, Settings, ToolContext, ToolRegistry};
use serde_json::{json, Map, Value as JsonValue};
use tower::ServiceExt;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Create a tool context pointed at a mock upstream.
fn test_context(uri: &str) -> ToolContext {
    let settings = Settings::new(uri.parse().expect("valid mock URI"), "test-key");
    ToolContext::new(settings).expect("Failed to build context")
}

/// Create a tool context with a custom request timeout.
fn timeout_context(uri: &str, timeout: Duration) -> ToolContext {
    let settings =
        Settings::new(uri.parse().expect("valid mock URI"), "test-key").with_timeout(timeout);
    ToolContext::new(settings).expect("Failed to build context")
}

/// Helper to dispatch a tool call.
async fn call_tool(ctx: &ToolContext, name: &str, args: JsonValue) -> JsonValue {
    let args_map: Map<String, JsonValue> = match args {
        JsonValue::Object(m) => m,
        _ => Map::new(),
    };
    ToolRegistry::new()
        .dispatch(ctx, name, args_map)
        .await
        .unwrap_or_else(|e| panic!("Tool {} failed: {}", name, e))
}

/// Helper to dispatch a tool call and expect an error.
async fn call_tool_err(ctx: &ToolContext, name: &str, args: JsonValue) -> openstates_mcp::McpError {
    let args_map: Map<String, JsonValue> = match args {
        JsonValue::Object(m) => m,
        _ => Map::new(),
    };
    ToolRegistry::new()
        .dispatch(ctx, name, args_map)
        .await
        .expect_err(&format!("Expected tool {} to fail", name))
}

/// Send one JSON-RPC message through the server.
async fn rpc(server: &McpServer, message: JsonValue) -> JsonValue {
    let response = server
        .handle_line(&message.to_string())
        .await
        .expect("expected a response");
    serde_json::to_value(response).unwrap()
}

/// Parse the text payload of a tools/call result.
fn tool_payload(response: &JsonValue) -> JsonValue {
    let text = response["result"]["content"][0]["text"]
        .as_str()
        .expect("text content");
    serde_json::from_str(text).unwrap()
}

/// Mount a catch-all 200 responder.
async fn mount_ok(server: &MockServer, body: JsonValue) {
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

/// Query strings of every request the mock received.
async fn received_queries(server: &MockServer) -> Vec<String> {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .map(|r| r.url.query().unwrap_or("").to_string())
        .collect()
}

// =============================================================================
// Validation
// =============================================================================

#[tokio::test]
async fn test_required_fields_never_reach_network() {
    let upstream = MockServer::start().await;
    mount_ok(&upstream, json!({})).await;
    let ctx = test_context(&upstream.uri());

    let bill = json!({"jurisdiction": "ca", "session": "20232024", "bill_id": "AB 12"});
    let cases = vec![
        ("get_bill_details", bill.clone(), "jurisdiction"),
        ("get_bill_details", bill.clone(), "session"),
        ("get_bill_details", bill, "bill_id"),
        ("get_bill_by_id", json!({"bill_uuid": "abc"}), "bill_uuid"),
        ("get_legislators_by_location", json!({"latitude": 35.0, "longitude": -80.0}), "latitude"),
        ("get_legislators_by_location", json!({"latitude": 35.0, "longitude": -80.0}), "longitude"),
        ("get_committee_details", json!({"committee_id": "ocd-organization/1"}), "committee_id"),
        ("get_event_details", json!({"event_id": "ocd-event/1"}), "event_id"),
        ("get_jurisdiction_details", json!({"jurisdiction_id": "nc"}), "jurisdiction_id"),
    ];

    for (tool, mut args, field) in cases {
        args.as_object_mut().unwrap().remove(field);
        let err = call_tool_err(&ctx, tool, args).await;
        assert_eq!(err.kind(), "validation_error", "{}", tool);
        assert!(err.to_string().contains(field), "{}: {}", tool, err);
    }

    assert!(upstream.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_blank_required_field_is_missing() {
    let upstream = MockServer::start().await;
    let ctx = test_context(&upstream.uri());

    let err = call_tool_err(&ctx, "get_committee_details", json!({"committee_id": "   "})).await;
    assert_eq!(err.kind(), "validation_error");
    assert!(upstream.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_bill_path_fields_stay_single_segments() {
    let upstream = MockServer::start().await;
    mount_ok(&upstream, json!({})).await;
    let ctx = test_context(&upstream.uri());

    let err = call_tool_err(&ctx, "get_bill_by_id", json!({"bill_uuid": "a/b"})).await;
    assert_eq!(err.kind(), "validation_error");
    let err = call_tool_err(
        &ctx,
        "get_bill_details",
        json!({"jurisdiction": "ca", "session": "2023/2024", "bill_id": "AB 12"}),
    )
    .await;
    assert_eq!(err.kind(), "validation_error");
    assert!(err.to_string().contains("session"));

    assert!(upstream.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_invalid_pagination_rejected() {
    let upstream = MockServer::start().await;
    let ctx = test_context(&upstream.uri());

    for args in [json!({"page": 0}), json!({"per_page": -5}), json!({"page": "two"})] {
        let err = call_tool_err(&ctx, "search_bills", args.clone()).await;
        assert_eq!(err.kind(), "validation_error", "{}", args);
    }
    assert!(upstream.received_requests().await.unwrap().is_empty());
}

// =============================================================================
// Search Tools
// =============================================================================

#[tokio::test]
async fn test_optional_tools_with_no_args_send_one_bare_get() {
    for (tool, expected_path) in [
        ("search_bills", "/bills"),
        ("search_people", "/people"),
        ("search_committees", "/committees"),
        ("search_events", "/events"),
        ("get_jurisdictions", "/jurisdictions"),
    ] {
        let upstream = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(expected_path))
            .and(header("x-api-key", "test-key"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"results": [], "pagination": {"page": 1}})),
            )
            .expect(1)
            .mount(&upstream)
            .await;
        let ctx = test_context(&upstream.uri());

        let result = call_tool(&ctx, tool, json!({})).await;
        assert_eq!(result["results"], json!([]), "{}", tool);
        assert_eq!(received_queries(&upstream).await, vec![String::new()], "{}", tool);
    }
}

#[tokio::test]
async fn test_search_bills_passes_filters() {
    let upstream = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/bills"))
        .and(query_param("jurisdiction", "ca"))
        .and(query_param("q", "water rights"))
        .and(query_param("per_page", "100"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [{
                "id": "ocd-bill/1",
                "identifier": "AB 12",
                "title": "Water rights",
                "openstates_url": "https://openstates.org/ca/bills/20232024/AB12/"
            }],
            "pagination": {"per_page": 100, "page": 1, "max_page": 1, "total_items": 1}
        })))
        .expect(1)
        .mount(&upstream)
        .await;
    let ctx = test_context(&upstream.uri());

    let result = call_tool(
        &ctx,
        "search_bills",
        json!({"jurisdiction": "ca", "q": "water rights", "limit": 500, "include": ["sponsorships", "actions"]}),
    )
    .await;

    assert_eq!(result["results"][0]["identifier"], "AB 12");
    assert_eq!(
        result["results"][0]["openstates_url"],
        "https://openstates.org/ca/bills/20232024/AB12/"
    );
    assert_eq!(result["pagination"]["total_items"], 1);

    let queries = received_queries(&upstream).await;
    assert_eq!(queries.len(), 1);
    assert!(queries[0].contains("include=sponsorships&include=actions"), "{}", queries[0]);
}

#[tokio::test]
async fn test_search_is_not_cached() {
    let upstream = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/people"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"results": []})))
        .expect(2)
        .mount(&upstream)
        .await;
    let ctx = test_context(&upstream.uri());

    let args = json!({"jurisdiction": "nc", "name": "Smith", "page": 2});
    call_tool(&ctx, "search_people", args.clone()).await;
    call_tool(&ctx, "search_people", args).await;

    let queries = received_queries(&upstream).await;
    assert_eq!(queries.len(), 2);
    assert_eq!(queries[0], queries[1]);
    assert_eq!(queries[0], "jurisdiction=nc&name=Smith&page=2");
}

#[tokio::test]
async fn test_unexpected_body_shape_passes_through() {
    let upstream = MockServer::start().await;
    mount_ok(&upstream, json!({"results": "not-a-list", "note": "odd"})).await;
    let ctx = test_context(&upstream.uri());

    let result = call_tool(&ctx, "search_committees", json!({})).await;
    assert_eq!(result, json!({"results": "not-a-list", "note": "odd"}));
}

// =============================================================================
// Detail Tools
// =============================================================================

#[tokio::test]
async fn test_bill_details_path() {
    let upstream = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/bills/ca/20232024/AB%2012"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"id": "ocd-bill/1", "identifier": "AB 12"})),
        )
        .expect(1)
        .mount(&upstream)
        .await;
    let ctx = test_context(&upstream.uri());

    let result = call_tool(
        &ctx,
        "get_bill_details",
        json!({"jurisdiction": "ca", "session": "20232024", "bill_id": "AB 12"}),
    )
    .await;
    assert_eq!(result["identifier"], "AB 12");
}

#[tokio::test]
async fn test_bill_by_id_path() {
    let upstream = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/bills/ocd-bill/f0049138-1ad8-4506-a2a4-f4dd1251bbba"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "ocd-bill/f0049138"})))
        .expect(2)
        .mount(&upstream)
        .await;
    let ctx = test_context(&upstream.uri());

    call_tool(
        &ctx,
        "get_bill_by_id",
        json!({"bill_uuid": "f0049138-1ad8-4506-a2a4-f4dd1251bbba"}),
    )
    .await;
    call_tool(
        &ctx,
        "get_bill_by_id",
        json!({"bill_uuid": "ocd-bill/f0049138-1ad8-4506-a2a4-f4dd1251bbba"}),
    )
    .await;
}

#[tokio::test]
async fn test_committee_details_keeps_ocd_id() {
    let upstream = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/committees/ocd-organization/abc-123"))
        .and(query_param("include", "memberships"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "ocd-organization/abc-123",
            "name": "Appropriations",
            "memberships": [{"person_name": "Jane Doe"}]
        })))
        .expect(1)
        .mount(&upstream)
        .await;
    let ctx = test_context(&upstream.uri());

    let result = call_tool(
        &ctx,
        "get_committee_details",
        json!({"committee_id": "ocd-organization/abc-123", "include": "memberships"}),
    )
    .await;
    assert_eq!(result["name"], "Appropriations");
    assert_eq!(result["memberships"][0]["person_name"], "Jane Doe");
}

#[tokio::test]
async fn test_jurisdiction_details() {
    let upstream = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/jurisdictions/nc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "ocd-jurisdiction/country:us/state:nc/government",
            "name": "North Carolina",
            "classification": "state"
        })))
        .expect(1)
        .mount(&upstream)
        .await;
    let ctx = test_context(&upstream.uri());

    let result = call_tool(&ctx, "get_jurisdiction_details", json!({"jurisdiction_id": "nc"})).await;
    assert_eq!(result["name"], "North Carolina");
}

// =============================================================================
// Location Tools
// =============================================================================

#[tokio::test]
async fn test_location_out_of_range_never_reaches_network() {
    let upstream = MockServer::start().await;
    let ctx = test_context(&upstream.uri());

    let err = call_tool_err(
        &ctx,
        "get_legislators_by_location",
        json!({"latitude": 91, "longitude": 0}),
    )
    .await;
    assert_eq!(err.kind(), "validation_error");
    assert!(err.to_string().contains("latitude"));
    assert!(upstream.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_location_passes_coordinates() {
    let upstream = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/people.geo"))
        .and(query_param("lat", "40.7128"))
        .and(query_param("lng", "-74.006"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [{
                "id": "ocd-person/1",
                "name": "Jane Doe",
                "party": "Democratic",
                "current_role": {"title": "Senator", "org_classification": "upper", "district": "27"}
            }]
        })))
        .expect(1)
        .mount(&upstream)
        .await;
    let ctx = test_context(&upstream.uri());

    let result = call_tool(
        &ctx,
        "get_legislators_by_location",
        json!({"latitude": 40.7128, "longitude": -74.0060}),
    )
    .await;
    assert_eq!(result["results"][0]["current_role"]["district"], "27");
}

// =============================================================================
// Upstream Errors
// =============================================================================

#[tokio::test]
async fn test_rate_limit_surfaces_as_tool_error() {
    let upstream = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(429)
                .insert_header("retry-after", "30")
                .set_body_json(json!({"detail": "rate limit exceeded"})),
        )
        .expect(1)
        .mount(&upstream)
        .await;
    let server = McpServer::new(test_context(&upstream.uri()));

    let response = rpc(
        &server,
        json!({
            "jsonrpc": "2.0",
            "id": 7,
            "method": "tools/call",
            "params": {"name": "search_events", "arguments": {"jurisdiction": "tx"}}
        }),
    )
    .await;

    assert!(response.get("error").is_none());
    assert_eq!(response["result"]["isError"], true);
    let payload = tool_payload(&response);
    assert_eq!(payload["error"]["kind"], "upstream_http_error");
    assert_eq!(payload["error"]["status"], 429);
    assert_eq!(payload["error"]["retry_after_secs"], 30);
    assert!(payload["error"]["detail"]
        .as_str()
        .unwrap()
        .contains("rate limit exceeded"));
}

#[tokio::test]
async fn test_not_found_carries_status() {
    let upstream = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({"detail": "No such event"})))
        .mount(&upstream)
        .await;
    let ctx = test_context(&upstream.uri());

    let err = call_tool_err(&ctx, "get_event_details", json!({"event_id": "ocd-event/x"})).await;
    assert_eq!(err.kind(), "upstream_http_error");
    assert_eq!(err.upstream_status(), Some(404));
}

#[tokio::test]
async fn test_timeout_surfaces_as_upstream_timeout() {
    let upstream = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"results": []}))
                .set_delay(Duration::from_millis(500)),
        )
        .mount(&upstream)
        .await;
    let ctx = timeout_context(&upstream.uri(), Duration::from_millis(1));

    let err = call_tool_err(&ctx, "search_bills", json!({})).await;
    assert_eq!(err.kind(), "upstream_timeout");
}

#[tokio::test]
async fn test_unreachable_upstream() {
    let uri = {
        let upstream = MockServer::start().await;
        upstream.uri()
    };
    let ctx = test_context(&uri);

    let err = call_tool_err(&ctx, "get_jurisdictions", json!({})).await;
    assert_eq!(err.kind(), "upstream_connection_error");
}

// =============================================================================
// Status Tool
// =============================================================================

#[tokio::test]
async fn test_status_ok() {
    let upstream = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/jurisdictions"))
        .and(query_param("per_page", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"results": []})))
        .expect(1)
        .mount(&upstream)
        .await;
    let ctx = test_context(&upstream.uri());

    let result = call_tool(&ctx, "status", json!({})).await;
    assert_eq!(result["status"], "ok");
    assert_eq!(result["service"], "OpenStates MCP Server");
    assert_eq!(result["upstream"]["reachable"], true);
    assert_eq!(result["upstream"]["http_status"], 200);
    assert_eq!(result["server"]["api_configured"], true);
    assert!(result["detail"].as_str().is_some());
    assert!(result["system"]["process_uptime"].as_str().is_some());
    assert!(result["system"]["memory_mb"].is_number());
    assert!(result["system"]["cpu_percent"].is_number());
}

#[tokio::test]
async fn test_status_degraded() {
    let upstream = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
        .mount(&upstream)
        .await;
    let ctx = test_context(&upstream.uri());

    let result = call_tool(&ctx, "status", json!({})).await;
    assert_eq!(result["status"], "degraded");
    assert_eq!(result["upstream"]["http_status"], 503);
}

#[tokio::test]
async fn test_status_down() {
    let uri = {
        let upstream = MockServer::start().await;
        upstream.uri()
    };
    let ctx = test_context(&uri);

    let result = call_tool(&ctx, "status", json!({})).await;
    assert_eq!(result["status"], "down");
    assert_eq!(result["upstream"]["reachable"], false);
}

#[tokio::test]
async fn test_status_skip_probe() {
    let upstream = MockServer::start().await;
    let ctx = test_context(&upstream.uri());

    let result = call_tool(&ctx, "status", json!({"check_upstream": false})).await;
    assert_eq!(result["status"], "ok");
    assert_eq!(result["upstream"]["checked"], false);
    assert!(upstream.received_requests().await.unwrap().is_empty());
}

// =============================================================================
// Protocol
// =============================================================================

#[tokio::test]
async fn test_initialize_and_list() {
    let upstream = MockServer::start().await;
    let server = McpServer::new(test_context(&upstream.uri()));

    let response = rpc(
        &server,
        json!({"jsonrpc": "2.0", "id": 1, "method": "initialize", "params": {}}),
    )
    .await;
    assert_eq!(response["result"]["protocolVersion"], "2024-11-05");
    assert_eq!(response["result"]["serverInfo"]["name"], "openstates-mcp");
    assert!(server.is_initialized());

    let response = rpc(&server, json!({"jsonrpc": "2.0", "id": 2, "method": "tools/list"})).await;
    let tools = response["result"]["tools"].as_array().unwrap();
    assert_eq!(tools.len(), 12);
    assert!(tools.iter().all(|t| t["inputSchema"]["type"] == "object"));
}

#[tokio::test]
async fn test_notifications_get_no_response() {
    let upstream = MockServer::start().await;
    let server = McpServer::new(test_context(&upstream.uri()));

    let response = server
        .handle_line(&json!({"jsonrpc": "2.0", "method": "notifications/initialized"}).to_string())
        .await;
    assert!(response.is_none());
    assert!(server.is_initialized());

    let response = server
        .handle_line(&json!({"jsonrpc": "1.0", "method": "notifications/cancelled"}).to_string())
        .await;
    assert!(response.is_none());
}

#[tokio::test]
async fn test_envelope_errors() {
    let upstream = MockServer::start().await;
    let server = McpServer::new(test_context(&upstream.uri()));

    let response = serde_json::to_value(server.handle_line("{not json").await.unwrap()).unwrap();
    assert_eq!(response["error"]["code"], -32700);
    assert_eq!(response["id"], JsonValue::Null);
    assert!(response.as_object().unwrap().contains_key("id"));

    // Valid JSON that is not a request object
    let response = serde_json::to_value(server.handle_line("[1,2]").await.unwrap()).unwrap();
    assert_eq!(response["error"]["code"], -32600);
    assert!(response.as_object().unwrap().contains_key("id"));

    let response = rpc(&server, json!({"jsonrpc": "2.0", "id": 4})).await;
    assert_eq!(response["error"]["code"], -32600);
    assert_eq!(response["id"], 4);

    let response = rpc(&server, json!({"jsonrpc": "1.0", "id": 1, "method": "ping"})).await;
    assert_eq!(response["error"]["code"], -32600);

    let response = rpc(&server, json!({"jsonrpc": "2.0", "id": 2, "method": "resources/list"})).await;
    assert_eq!(response["error"]["code"], -32601);

    let response = rpc(
        &server,
        json!({"jsonrpc": "2.0", "id": 3, "method": "tools/call", "params": {"name": "delete_bills"}}),
    )
    .await;
    assert_eq!(response["error"]["code"], -32601);

    let response = rpc(
        &server,
        json!({"jsonrpc": "2.0", "id": 4, "method": "tools/call", "params": {"arguments": {}}}),
    )
    .await;
    assert_eq!(response["error"]["code"], -32602);

    let response = rpc(&server, json!({"jsonrpc": "2.0", "id": 5, "method": "ping"})).await;
    assert_eq!(response["result"], json!({}));
}

#[tokio::test]
async fn test_validation_error_result() {
    let upstream = MockServer::start().await;
    let server = McpServer::new(test_context(&upstream.uri()));

    let response = rpc(
        &server,
        json!({
            "jsonrpc": "2.0",
            "id": 9,
            "method": "tools/call",
            "params": {"name": "get_bill_details", "arguments": {"jurisdiction": "ca"}}
        }),
    )
    .await;
    assert_eq!(response["result"]["isError"], true);
    let payload = tool_payload(&response);
    assert_eq!(payload["error"]["kind"], "validation_error");
    assert!(payload["error"]["detail"].as_str().unwrap().contains("session"));
    assert!(payload["error"].get("status").is_none());
}

// =============================================================================
// Transports
// =============================================================================

#[tokio::test]
async fn test_stdio_serves_concurrent_requests() {
    let upstream = MockServer::start().await;
    mount_ok(&upstream, json!({"results": []})).await;
    let server = Arc::new(McpServer::new(test_context(&upstream.uri())));

    let input = [
        json!({"jsonrpc": "2.0", "id": 1, "method": "tools/call", "params": {"name": "search_bills", "arguments": {}}}),
        json!({"jsonrpc": "2.0", "method": "notifications/initialized"}),
        json!({"jsonrpc": "2.0", "id": 2, "method": "ping"}),
        json!({"jsonrpc": "2.0", "id": 3, "method": "tools/call", "params": {"name": "search_people", "arguments": {}}}),
    ]
    .iter()
    .map(|m| m.to_string())
    .collect::<Vec<_>>()
    .join("\n")
        + "\n";

    let output = server
        .serve(input.as_bytes(), Vec::new())
        .await
        .expect("serve failed");

    let mut ids: Vec<i64> = String::from_utf8(output)
        .unwrap()
        .lines()
        .map(|line| {
            let response: JsonValue = serde_json::from_str(line).unwrap();
            response["id"].as_i64().unwrap()
        })
        .collect();
    ids.sort_unstable();
    assert_eq!(ids, vec![1, 2, 3]);
    assert_eq!(upstream.received_requests().await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_stdio_survives_invalid_utf8() {
    let upstream = MockServer::start().await;
    let server = Arc::new(McpServer::new(test_context(&upstream.uri())));

    let mut input = Vec::new();
    input.extend_from_slice(b"{\"jsonrpc\": \"2.0\", \"id\": 1, \"method\": \"ping\"}\n");
    input.extend_from_slice(b"{\"jsonrpc\": \"2.0\", \"id\": 2, \"method\": \"p\xffng\"}\n");
    input.extend_from_slice(b"{\"jsonrpc\": \"2.0\", \"id\": 3, \"method\": \"ping\"}\n");

    let output = server
        .serve(input.as_slice(), Vec::new())
        .await
        .expect("serve failed");

    let responses: Vec<JsonValue> = String::from_utf8(output)
        .unwrap()
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();
    assert_eq!(responses.len(), 3);

    let mut answered: Vec<i64> = responses.iter().filter_map(|r| r["id"].as_i64()).collect();
    answered.sort_unstable();
    assert_eq!(answered, vec![1, 3]);

    let parse_errors: Vec<&JsonValue> = responses
        .iter()
        .filter(|r| r["error"]["code"] == -32700)
        .collect();
    assert_eq!(parse_errors.len(), 1);
    assert_eq!(parse_errors[0]["id"], JsonValue::Null);
}

#[tokio::test]
async fn test_http_transport() {
    let upstream = MockServer::start().await;
    let server = Arc::new(McpServer::new(test_context(&upstream.uri())));
    let app = router(server);

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/mcp")
                .header("content-type", "application/json")
                .body(Body::from(
                    json!({"jsonrpc": "2.0", "id": 1, "method": "tools/list"}).to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body: JsonValue = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["result"]["tools"].as_array().unwrap().len(), 12);

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/mcp")
                .body(Body::from(
                    json!({"jsonrpc": "2.0", "method": "notifications/initialized"}).to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::ACCEPTED);

    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body: JsonValue = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["status"], "ok");
    assert_eq!(body["upstream"]["checked"], false);
    assert!(upstream.received_requests().await.unwrap().is_empty());
}
