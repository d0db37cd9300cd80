//! HTTP client for the EdgeShield v4 REST API.
//!
//! Every call is a single request. Failures are terminal for the invocation
//! and surface as [`Error`] values; nothing here retries.

use std::time::Duration;

use log::debug;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, USER_AGENT};
use reqwest::{Client, Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::config::Config;
use crate::error::Error;
use crate::reconcile::RuleStore;
use crate::rules::RateLimitRule;

/// Standard envelope wrapping every v4 API response.
#[derive(Debug, Deserialize)]
pub struct ApiEnvelope<T> {
    pub success: bool,
    #[serde(default)]
    pub errors: Vec<ApiError>,
    pub result: Option<T>,
    #[serde(default)]
    pub result_info: Option<ResultInfo>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiError {
    pub code: i64,
    pub message: String,
}

/// Pagination metadata reported alongside list results.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct ResultInfo {
    pub page: u32,
    pub per_page: u32,
    pub count: u32,
    pub total_count: u32,
    pub total_pages: u32,
}

/// An explicitly constructed API client.
///
/// There is deliberately no global handle: commands receive the client they
/// should talk through, and tests construct one against a mock server.
pub struct ApiClient {
    http: Client,
    cfg: Config,
}

impl ApiClient {
    pub fn new(cfg: Config) -> Result<Self, Error> {
        let mut default_headers = HeaderMap::new();
        default_headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&cfg.user_agent)
                .map_err(|e| Error::Configuration(format!("invalid user agent: {e}")))?,
        );
        let http = Client::builder()
            .default_headers(default_headers)
            .timeout(Duration::from_secs(cfg.timeout_secs))
            .use_rustls_tls()
            .build()
            .map_err(|e| Error::Configuration(e.to_string()))?;
        Ok(Self { http, cfg })
    }

    /// Resolve a zone name to its id. The v4 surface filters by exact name,
    /// so the first match wins; an empty result is a missing zone.
    pub async fn zone_id_by_name(&self, name: &str) -> Result<String, Error> {
        #[derive(Deserialize)]
        struct Zone {
            id: String,
        }
        let ctx = format!("zone lookup for \"{name}\"");
        let req = self.request(Method::GET, "/zones")?.query(&[("name", name)]);
        let env: ApiEnvelope<Vec<Zone>> = self.execute(req, &ctx).await?;
        let zones = unwrap_envelope(env, &ctx)?;
        match zones.into_iter().next() {
            Some(zone) => Ok(zone.id),
            None => Err(Error::NotFound(format!("zone \"{name}\""))),
        }
    }

    /// List every rule in the zone, following pagination transparently.
    /// Pages are fetched sequentially in ascending order and concatenated,
    /// so callers see one ordered result and never observe paging.
    pub async fn list_rules(&self, zone_id: &str) -> Result<Vec<RateLimitRule>, Error> {
        let (mut rules, first_info) = self.list_page(zone_id, 1).await?;
        for page in 2..=first_info.total_pages {
            let (items, info) = self.list_page(zone_id, page).await?;
            if info.total_pages != first_info.total_pages {
                // The listing shifted between calls; bail out rather than
                // return a sequence stitched from two different snapshots.
                return Err(Error::Remote(format!(
                    "rule listing for zone {zone_id} changed while paging (total_pages {} -> {})",
                    first_info.total_pages, info.total_pages
                )));
            }
            rules.extend(items);
        }
        Ok(rules)
    }

    async fn list_page(
        &self,
        zone_id: &str,
        page: u32,
    ) -> Result<(Vec<RateLimitRule>, ResultInfo), Error> {
        let ctx = format!("listing rules in zone {zone_id} (page {page})");
        let path = format!("/zones/{}/rate_limits", encode_path_segment(zone_id));
        let req = self.request(Method::GET, &path)?.query(&[
            ("page", page.to_string()),
            ("per_page", self.cfg.per_page.to_string()),
        ]);
        let env: ApiEnvelope<Vec<RateLimitRule>> = self.execute(req, &ctx).await?;
        if !env.success {
            return Err(Error::Remote(format!("{ctx}: {}", join_errors(&env.errors))));
        }
        let info = env
            .result_info
            .ok_or_else(|| Error::Remote(format!("{ctx}: missing result_info")))?;
        let items = env
            .result
            .ok_or_else(|| Error::Remote(format!("{ctx}: response envelope carried no result")))?;
        Ok((items, info))
    }

    pub async fn get_rule(&self, zone_id: &str, rule_id: &str) -> Result<RateLimitRule, Error> {
        let ctx = format!("rule {rule_id} in zone {zone_id}");
        let path = format!(
            "/zones/{}/rate_limits/{}",
            encode_path_segment(zone_id),
            encode_path_segment(rule_id)
        );
        let req = self.request(Method::GET, &path)?;
        let env: ApiEnvelope<RateLimitRule> = self.execute(req, &ctx).await?;
        unwrap_envelope(env, &ctx)
    }

    pub async fn create_rule(
        &self,
        zone_id: &str,
        rule: &RateLimitRule,
    ) -> Result<RateLimitRule, Error> {
        let ctx = format!("creating rule in zone {zone_id}");
        let path = format!("/zones/{}/rate_limits", encode_path_segment(zone_id));
        let req = self.request(Method::POST, &path)?.json(rule);
        let env: ApiEnvelope<RateLimitRule> = self.execute(req, &ctx).await?;
        unwrap_envelope(env, &ctx)
    }

    pub async fn update_rule(
        &self,
        zone_id: &str,
        rule_id: &str,
        rule: &RateLimitRule,
    ) -> Result<RateLimitRule, Error> {
        let ctx = format!("updating rule {rule_id} in zone {zone_id}");
        let path = format!(
            "/zones/{}/rate_limits/{}",
            encode_path_segment(zone_id),
            encode_path_segment(rule_id)
        );
        let req = self.request(Method::PUT, &path)?.json(rule);
        let env: ApiEnvelope<RateLimitRule> = self.execute(req, &ctx).await?;
        unwrap_envelope(env, &ctx)
    }

    pub async fn delete_rule(&self, zone_id: &str, rule_id: &str) -> Result<(), Error> {
        let ctx = format!("deleting rule {rule_id} in zone {zone_id}");
        let path = format!(
            "/zones/{}/rate_limits/{}",
            encode_path_segment(zone_id),
            encode_path_segment(rule_id)
        );
        let req = self.request(Method::DELETE, &path)?;
        let env: ApiEnvelope<serde_json::Value> = self.execute(req, &ctx).await?;
        if !env.success {
            return Err(Error::Remote(format!("{ctx}: {}", join_errors(&env.errors))));
        }
        Ok(())
    }

    fn request(&self, method: Method, path: &str) -> Result<RequestBuilder, Error> {
        let url = format!("{}{}", self.cfg.api_url, path);
        debug!("{method} {url}");
        Ok(self
            .http
            .request(method, &url)
            .header(AUTHORIZATION, self.auth_header()?)
            .header(ACCEPT, HeaderValue::from_static("application/json")))
    }

    fn auth_header(&self) -> Result<HeaderValue, Error> {
        HeaderValue::from_str(&format!("Bearer {}", self.cfg.token)).map_err(|_| {
            Error::Configuration("API token contains invalid header characters".into())
        })
    }

    async fn execute<T: DeserializeOwned>(
        &self,
        req: RequestBuilder,
        ctx: &str,
    ) -> Result<ApiEnvelope<T>, Error> {
        let res = req
            .send()
            .await
            .map_err(|e| Error::Remote(format!("{ctx}: {e}")))?;
        let status = res.status();
        if status == StatusCode::NOT_FOUND {
            return Err(Error::NotFound(ctx.to_string()));
        }
        let text = res
            .text()
            .await
            .map_err(|e| Error::Remote(format!("{ctx}: {e}")))?;
        if !status.is_success() {
            return Err(Error::Remote(format!("{ctx}: HTTP {status}: {text}")));
        }
        serde_json::from_str(&text)
            .map_err(|e| Error::Remote(format!("{ctx}: decoding response: {e}")))
    }
}

impl RuleStore for ApiClient {
    async fn fetch(&self, zone_id: &str, rule_id: &str) -> Result<RateLimitRule, Error> {
        self.get_rule(zone_id, rule_id).await
    }

    async fn apply(
        &self,
        zone_id: &str,
        rule_id: &str,
        desired: &RateLimitRule,
    ) -> Result<RateLimitRule, Error> {
        self.update_rule(zone_id, rule_id, desired).await
    }
}

fn unwrap_envelope<T>(env: ApiEnvelope<T>, ctx: &str) -> Result<T, Error> {
    if !env.success {
        return Err(Error::Remote(format!("{ctx}: {}", join_errors(&env.errors))));
    }
    env.result
        .ok_or_else(|| Error::Remote(format!("{ctx}: response envelope carried no result")))
}

fn join_errors(errors: &[ApiError]) -> String {
    if errors.is_empty() {
        return "API reported failure without error detail".to_string();
    }
    errors
        .iter()
        .map(|e| format!("{} (code {})", e.message, e.code))
        .collect::<Vec<_>>()
        .join("; ")
}

// Percent-encode one path segment so opaque ids can never splice the path.
fn encode_path_segment(seg: &str) -> String {
    urlencoding::encode(seg).into_owned()
}
