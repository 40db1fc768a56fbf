//! Typed records for OpenStates responses.
//!
//! Each record names the fields the API documents. Everything else, including
//! the blocks added by `include`, lands in `extra` and is passed back
//! unchanged.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};

/// Overflow for fields a record does not name.
pub type Extra = Map<String, JsonValue>;

/// Pagination block on list responses.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Pagination {
    /// Results per page
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub per_page: Option<u64>,
    /// Current page, starting at 1
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page: Option<u64>,
    /// Last available page
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_page: Option<u64>,
    /// Total matching records
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_items: Option<u64>,
    /// Fields not named above
    #[serde(flatten)]
    pub extra: Extra,
}

/// A list response: `{"results": [...], "pagination": {...}}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(bound(deserialize = "T: DeserializeOwned", serialize = "T: Serialize"))]
pub struct Page<T> {
    /// Records on this page
    pub results: Vec<T>,
    /// Paging metadata
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pagination: Option<Pagination>,
    /// Fields not named above
    #[serde(flatten)]
    pub extra: Extra,
}

/// Compact jurisdiction reference embedded in other records.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JurisdictionRef {
    /// OCD identifier
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Display name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Classification as reported by the API
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub classification: Option<String>,
    /// Fields not named above
    #[serde(flatten)]
    pub extra: Extra,
}

/// Compact organization reference (chamber, committee parent, ...).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OrganizationRef {
    /// OCD identifier
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Display name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Classification as reported by the API
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub classification: Option<String>,
    /// Fields not named above
    #[serde(flatten)]
    pub extra: Extra,
}

/// A bill or resolution.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Bill {
    /// OCD identifier
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Legislative session identifier
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session: Option<String>,
    /// Owning jurisdiction
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jurisdiction: Option<JurisdictionRef>,
    /// Originating chamber
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from_organization: Option<OrganizationRef>,
    /// Bill identifier such as `HB 1`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identifier: Option<String>,
    /// Title
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Classification as reported by the API
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub classification: Option<Vec<String>>,
    /// Subject tags
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<Vec<String>>,
    /// Page on openstates.org
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub openstates_url: Option<String>,
    /// Date of the first action
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_action_date: Option<String>,
    /// Date of the latest action
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latest_action_date: Option<String>,
    /// Description of the latest action
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latest_action_description: Option<String>,
    /// Date of the latest passage
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latest_passage_date: Option<String>,
    /// Record creation time
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    /// Record update time
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
    /// Fields not named above
    #[serde(flatten)]
    pub extra: Extra,
}

/// A person's current role.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CurrentRole {
    /// Title
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Chamber, e.g. `upper` or `lower`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub org_classification: Option<String>,
    /// Districts are strings for most states and numbers for some.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub district: Option<JsonValue>,
    /// OCD division identifier
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub division_id: Option<String>,
    /// Fields not named above
    #[serde(flatten)]
    pub extra: Extra,
}

/// A legislator, governor, or other official.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Person {
    /// OCD identifier
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Display name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Primary party
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub party: Option<String>,
    /// Current legislative role
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_role: Option<CurrentRole>,
    /// Owning jurisdiction
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jurisdiction: Option<JurisdictionRef>,
    /// Given name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub given_name: Option<String>,
    /// Family name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub family_name: Option<String>,
    /// Portrait URL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    /// Contact email
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Gender
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    /// Birth date
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub birth_date: Option<String>,
    /// Death date
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub death_date: Option<String>,
    /// Page on openstates.org
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub openstates_url: Option<String>,
    /// Record creation time
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    /// Record update time
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
    /// Fields not named above
    #[serde(flatten)]
    pub extra: Extra,
}

/// A committee or subcommittee.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Committee {
    /// OCD identifier
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Display name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Classification as reported by the API
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub classification: Option<String>,
    /// Parent organization identifier
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
    /// Chamber
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chamber: Option<String>,
    /// Owning jurisdiction
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jurisdiction: Option<JurisdictionRef>,
    /// Fields not named above
    #[serde(flatten)]
    pub extra: Extra,
}

/// Where an event takes place.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EventLocation {
    /// Display name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Website
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Fields not named above
    #[serde(flatten)]
    pub extra: Extra,
}

/// A hearing, floor session, or other scheduled event.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Event {
    /// OCD identifier
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Display name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Owning jurisdiction
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jurisdiction: Option<JurisdictionRef>,
    /// Description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Classification as reported by the API
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub classification: Option<String>,
    /// Start time
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,
    /// End time
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
    /// Whether the event spans the whole day
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub all_day: Option<bool>,
    /// Event status
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    /// Marked deleted upstream
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deleted: Option<bool>,
    /// Where the event takes place
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<EventLocation>,
    /// Fields not named above
    #[serde(flatten)]
    pub extra: Extra,
}

/// A state, territory, or municipality.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Jurisdiction {
    /// OCD identifier
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Display name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Classification as reported by the API
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub classification: Option<String>,
    /// OCD division identifier
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub division_id: Option<String>,
    /// Website
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Last bill scrape
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latest_bill_update: Option<String>,
    /// Last people scrape
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latest_people_update: Option<String>,
    /// Fields not named above
    #[serde(flatten)]
    pub extra: Extra,
}

/// Reshape a body through `T`, falling back to the raw body if it does not fit.
pub fn reshape<T>(body: JsonValue) -> JsonValue
where
    T: DeserializeOwned + Serialize,
{
    match serde_json::from_value::<T>(body.clone()) {
        Ok(record) => serde_json::to_value(record).unwrap_or(body),
        Err(e) => {
            tracing::warn!(
                record = std::any::type_name::<T>(),
                error = %e,
                "response did not match typed record, passing through raw body"
            );
            body
        }
    }
}

/// Number of entries in a list response's `results`, for logging.
pub fn result_count(body: &JsonValue) -> usize {
    body.get("results")
        .and_then(|r| r.as_array())
        .map_or(0, |r| r.len())
}
