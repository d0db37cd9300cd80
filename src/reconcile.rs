//! Desired-vs-remote reconciliation for rate-limit rules.
//!
//! The update path never writes blindly: it fetches the current remote rule,
//! computes an explicit field-by-field diff against the locally-built desired
//! rule, and issues a single update only when something actually differs.

use std::collections::BTreeSet;
use std::fmt;

use log::{debug, info};

use crate::error::Error;
use crate::rules::{RateLimitRule, RequestMatcher, ResponseMatcher, RuleAction, TrafficMatcher};

/// Remote store operations the reconciler needs. Implemented by the HTTP
/// client; tests substitute an in-memory fake.
#[allow(async_fn_in_trait)]
pub trait RuleStore {
    /// Retrieve the current remote rule, or `Error::NotFound`.
    async fn fetch(&self, zone_id: &str, rule_id: &str) -> Result<RateLimitRule, Error>;

    /// Replace the remote rule with `desired` and return what the server
    /// actually stored.
    async fn apply(
        &self,
        zone_id: &str,
        rule_id: &str,
        desired: &RateLimitRule,
    ) -> Result<RateLimitRule, Error>;
}

/// One field-level difference between desired and remote state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDelta {
    pub field: String,
    pub desired: String,
    pub remote: String,
}

impl fmt::Display for FieldDelta {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {} -> {}", self.field, self.remote, self.desired)
    }
}

/// Outcome of comparing desired against remote state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Unchanged,
    Changed(Vec<FieldDelta>),
}

/// Result of a full reconcile pass. `Updated` carries the object the server
/// stored, which may differ from the desired rule that was sent.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Unchanged,
    Updated {
        deltas: Vec<FieldDelta>,
        stored: RateLimitRule,
    },
}

/// Compare two rules field by field.
///
/// `id` is excluded: the desired rule is built locally and never carries one.
/// Method, scheme and status lists compare as sets since the rule engine
/// matches them order-independently.
pub fn diff_rules(desired: &RateLimitRule, remote: &RateLimitRule) -> Decision {
    let mut deltas = Vec::new();
    diff_scalar(
        "description",
        &desired.description,
        &remote.description,
        &mut deltas,
    );
    diff_scalar("disabled", &desired.disabled, &remote.disabled, &mut deltas);
    diff_matcher(&desired.matcher, &remote.matcher, &mut deltas);
    diff_action(&desired.action, &remote.action, &mut deltas);
    diff_scalar(
        "threshold",
        &desired.threshold,
        &remote.threshold,
        &mut deltas,
    );
    diff_scalar("period", &desired.period, &remote.period, &mut deltas);
    if deltas.is_empty() {
        Decision::Unchanged
    } else {
        Decision::Changed(deltas)
    }
}

fn diff_matcher(desired: &TrafficMatcher, remote: &TrafficMatcher, out: &mut Vec<FieldDelta>) {
    diff_request(&desired.request, &remote.request, out);
    diff_response(&desired.response, &remote.response, out);
}

fn diff_request(desired: &RequestMatcher, remote: &RequestMatcher, out: &mut Vec<FieldDelta>) {
    diff_set(
        "match.request.methods",
        &desired.methods,
        &remote.methods,
        out,
    );
    diff_set(
        "match.request.schemes",
        &desired.schemes,
        &remote.schemes,
        out,
    );
    diff_scalar(
        "match.request.url",
        &desired.url_pattern,
        &remote.url_pattern,
        out,
    );
}

fn diff_response(desired: &ResponseMatcher, remote: &ResponseMatcher, out: &mut Vec<FieldDelta>) {
    diff_set(
        "match.response.status",
        &desired.statuses,
        &remote.statuses,
        out,
    );
    diff_scalar(
        "match.response.origin_traffic",
        &desired.origin_traffic,
        &remote.origin_traffic,
        out,
    );
}

fn diff_action(desired: &RuleAction, remote: &RuleAction, out: &mut Vec<FieldDelta>) {
    diff_scalar("action.mode", &desired.mode, &remote.mode, out);
    diff_scalar("action.timeout", &desired.timeout, &remote.timeout, out);
    match (&desired.response, &remote.response) {
        (Some(d), Some(r)) => {
            diff_scalar(
                "action.response.content_type",
                &d.content_type,
                &r.content_type,
                out,
            );
            diff_scalar("action.response.body", &d.body, &r.body, out);
        }
        (None, None) => {}
        (d, r) => diff_scalar("action.response", d, r, out),
    }
}

fn diff_scalar<T: PartialEq + fmt::Debug>(
    field: &str,
    desired: &T,
    remote: &T,
    out: &mut Vec<FieldDelta>,
) {
    if desired != remote {
        out.push(FieldDelta {
            field: field.to_string(),
            desired: format!("{desired:?}"),
            remote: format!("{remote:?}"),
        });
    }
}

// Order and duplicates are not semantically meaningful for these lists.
fn diff_set<T: Ord + fmt::Debug>(field: &str, desired: &[T], remote: &[T], out: &mut Vec<FieldDelta>) {
    let d: BTreeSet<&T> = desired.iter().collect();
    let r: BTreeSet<&T> = remote.iter().collect();
    if d != r {
        out.push(FieldDelta {
            field: field.to_string(),
            desired: format!("{d:?}"),
            remote: format!("{r:?}"),
        });
    }
}

/// Fetch the remote rule, compare, and converge with at most one write.
///
/// State machine per invocation:
/// fetch -> (not found: abort) -> compare -> (unchanged: done)
/// -> apply once -> done / report. No retries at any step.
pub async fn reconcile<S: RuleStore>(
    store: &S,
    zone_id: &str,
    rule_id: &str,
    desired: &RateLimitRule,
) -> Result<Outcome, Error> {
    let remote = store.fetch(zone_id, rule_id).await?;
    match diff_rules(desired, &remote) {
        Decision::Unchanged => {
            info!("rule {rule_id} already matches desired state; nothing to do");
            Ok(Outcome::Unchanged)
        }
        Decision::Changed(deltas) => {
            for delta in &deltas {
                debug!("field drift {delta}");
            }
            info!(
                "rule {rule_id} in zone {zone_id}: {} field(s) differ; updating",
                deltas.len()
            );
            let stored = store.apply(zone_id, rule_id, desired).await?;
            Ok(Outcome::Updated { deltas, stored })
        }
    }
}
