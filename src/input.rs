//! Builds the desired rule from either a JSON payload on stdin or inline
//! flags. The two modes are mutually exclusive, selected by `--stdin`.

use std::io::{self, Read};

use crate::cli::RuleFlags;
use crate::error::Error;
use crate::rules::{
    ActionResponse, RateLimitRule, RequestMatcher, ResponseMatcher, RuleAction, TrafficMatcher,
};

/// Produce exactly one desired rule for this invocation, before any remote
/// call is made.
pub fn desired_rule(flags: &RuleFlags) -> Result<RateLimitRule, Error> {
    if flags.stdin {
        rule_from_reader(io::stdin().lock())
    } else {
        Ok(rule_from_flags(flags))
    }
}

/// Decode a complete rule from a reader (stdin in production). A decode
/// failure aborts the command with no partial object.
pub fn rule_from_reader<R: Read>(mut reader: R) -> Result<RateLimitRule, Error> {
    let mut buf = String::new();
    reader
        .read_to_string(&mut buf)
        .map_err(|e| Error::MalformedInput(format!("reading stdin: {e}")))?;
    let mut rule: RateLimitRule =
        serde_json::from_str(&buf).map_err(|e| Error::MalformedInput(e.to_string()))?;
    // The remote store owns ids. Stripping one here lets a `describe
    // --json-output` document be piped straight back into `update --stdin`.
    rule.id = None;
    Ok(rule)
}

/// Build a rule from inline flags.
///
/// Flags that were not given fall through to their zero values (empty
/// string/list, zero integer), so the reconciler cannot distinguish "clear
/// this field" from "flag not set". Use `--stdin` with a full payload when
/// field-level precision matters.
pub fn rule_from_flags(flags: &RuleFlags) -> RateLimitRule {
    RateLimitRule {
        id: None,
        description: flags.description.clone(),
        disabled: flags.disabled,
        matcher: TrafficMatcher {
            request: RequestMatcher {
                methods: flags.methods.clone(),
                schemes: flags.schemes.clone(),
                url_pattern: flags.url.clone(),
            },
            response: ResponseMatcher {
                statuses: flags.status.clone(),
                origin_traffic: None,
            },
        },
        action: RuleAction {
            mode: flags.action.clone(),
            timeout: flags.timeout,
            response: action_response(flags),
        },
        threshold: flags.threshold,
        period: flags.period,
    }
}

// Only materialize the override when a flag asked for it, so a remote rule
// without one does not show perpetual drift.
fn action_response(flags: &RuleFlags) -> Option<ActionResponse> {
    if flags.response_content_type.is_empty() && flags.response_body.is_empty() {
        return None;
    }
    Some(ActionResponse {
        content_type: flags.response_content_type.clone(),
        body: flags.response_body.clone(),
    })
}
