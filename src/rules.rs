use serde::{Deserialize, Serialize};

/// A zone rate-limit rule as stored by the edge service.
///
/// `id` is assigned by the remote store: a locally-built desired rule never
/// carries one, a fetched rule always does. `threshold` and `period` define
/// the rate window; the tool carries them verbatim and never interprets them.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RateLimitRule {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub disabled: bool,
    #[serde(rename = "match", default)]
    pub matcher: TrafficMatcher,
    #[serde(default)]
    pub action: RuleAction,
    #[serde(default)]
    pub threshold: u64,
    #[serde(default)]
    pub period: u64,
}

/// Which traffic the rule counts, split into request and response criteria.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct TrafficMatcher {
    #[serde(default)]
    pub request: RequestMatcher,
    #[serde(default)]
    pub response: ResponseMatcher,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RequestMatcher {
    #[serde(default)]
    pub methods: Vec<String>,
    #[serde(default)]
    pub schemes: Vec<String>,
    #[serde(rename = "url", default)]
    pub url_pattern: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ResponseMatcher {
    #[serde(rename = "status", default)]
    pub statuses: Vec<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin_traffic: Option<bool>,
}

/// What happens once the threshold is exceeded within the period.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RuleAction {
    #[serde(default)]
    pub mode: String,
    #[serde(default)]
    pub timeout: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response: Option<ActionResponse>,
}

/// Custom response body served to throttled clients.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ActionResponse {
    pub content_type: String,
    pub body: String,
}
