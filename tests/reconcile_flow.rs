use std::cell::RefCell;

use edgelimit::error::Error;
use edgelimit::reconcile::{reconcile, Outcome, RuleStore};
use edgelimit::rules::{
    RateLimitRule, RequestMatcher, ResponseMatcher, RuleAction, TrafficMatcher,
};

/// In-memory stand-in for the remote store. Counts applies so tests can
/// assert the single-write contract.
struct FakeStore {
    remote: Option<RateLimitRule>,
    applied: RefCell<u32>,
}

impl FakeStore {
    fn with_remote(remote: RateLimitRule) -> Self {
        Self {
            remote: Some(remote),
            applied: RefCell::new(0),
        }
    }

    fn empty() -> Self {
        Self {
            remote: None,
            applied: RefCell::new(0),
        }
    }

    fn applies(&self) -> u32 {
        *self.applied.borrow()
    }
}

impl RuleStore for FakeStore {
    async fn fetch(&self, _zone_id: &str, rule_id: &str) -> Result<RateLimitRule, Error> {
        self.remote
            .clone()
            .ok_or_else(|| Error::NotFound(format!("rule {rule_id}")))
    }

    async fn apply(
        &self,
        _zone_id: &str,
        _rule_id: &str,
        desired: &RateLimitRule,
    ) -> Result<RateLimitRule, Error> {
        *self.applied.borrow_mut() += 1;
        // The server is authoritative: it keeps the id and may normalize
        // what it stores.
        let mut stored = desired.clone();
        stored.id = self.remote.as_ref().and_then(|r| r.id.clone());
        Ok(stored)
    }
}

fn desired_rule() -> RateLimitRule {
    RateLimitRule {
        id: None,
        description: "api throttle".into(),
        disabled: false,
        matcher: TrafficMatcher {
            request: RequestMatcher {
                methods: vec!["GET".into()],
                schemes: vec!["HTTPS".into()],
                url_pattern: "example.com/api/*".into(),
            },
            response: ResponseMatcher {
                statuses: vec![429],
                origin_traffic: None,
            },
        },
        action: RuleAction {
            mode: "simulate".into(),
            timeout: 300,
            response: None,
        },
        threshold: 20,
        period: 60,
    }
}

fn remote_copy() -> RateLimitRule {
    let mut remote = desired_rule();
    remote.id = Some("r-42".into());
    remote
}

#[tokio::test]
async fn matching_state_sends_no_update() {
    let store = FakeStore::with_remote(remote_copy());
    let outcome = reconcile(&store, "z-1", "r-42", &desired_rule())
        .await
        .unwrap();
    assert_eq!(outcome, Outcome::Unchanged);
    assert_eq!(store.applies(), 0);
}

#[tokio::test]
async fn drift_triggers_exactly_one_update() {
    let mut remote = remote_copy();
    remote.action.mode = "ban".into();
    let store = FakeStore::with_remote(remote);

    let outcome = reconcile(&store, "z-1", "r-42", &desired_rule())
        .await
        .unwrap();
    match outcome {
        Outcome::Updated { deltas, stored } => {
            assert_eq!(deltas.len(), 1);
            assert_eq!(deltas[0].field, "action.mode");
            // The store's object is the authoritative result.
            assert_eq!(stored.id.as_deref(), Some("r-42"));
            assert_eq!(stored.action.mode, "simulate");
        }
        Outcome::Unchanged => panic!("expected an update"),
    }
    assert_eq!(store.applies(), 1);
}

#[tokio::test]
async fn missing_rule_aborts_before_any_write() {
    let store = FakeStore::empty();
    let err = reconcile(&store, "z-1", "r-42", &desired_rule())
        .await
        .unwrap_err();
    assert!(matches!(err, Error::NotFound(_)));
    assert_eq!(store.applies(), 0);
}

#[tokio::test]
async fn reordered_collections_do_not_trigger_updates() {
    let desired = {
        let mut d = desired_rule();
        d.matcher.request.methods = vec!["POST".into(), "GET".into()];
        d.matcher.response.statuses = vec![403, 401];
        d
    };
    let remote = {
        let mut r = remote_copy();
        r.matcher.request.methods = vec!["GET".into(), "POST".into()];
        r.matcher.response.statuses = vec![401, 403];
        r
    };
    let store = FakeStore::with_remote(remote);
    let outcome = reconcile(&store, "z-1", "r-42", &desired).await.unwrap();
    assert_eq!(outcome, Outcome::Unchanged);
    assert_eq!(store.applies(), 0);
}
