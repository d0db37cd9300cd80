use assert_cmd::Command;
use httpmock::{Method::GET, MockServer};
use predicates::prelude::*;

const ZONE_ID: &str = "z-9d1f0e3d";

fn edgelimit(server: &MockServer) -> anyhow::Result<Command> {
    let mut cmd = Command::cargo_bin("edgelimit")?;
    cmd.env("EDGE_API_TOKEN", "test-token")
        .env("EDGE_API_URL", server.base_url())
        .env("EDGE_PER_PAGE", "5")
        .arg("--log-level")
        .arg("warn");
    Ok(cmd)
}

fn mock_zone_lookup(server: &MockServer) {
    server.mock(|when, then| {
        when.method(GET).path("/zones").query_param("name", "example.com");
        then.status(200).json_body(serde_json::json!({
            "success": true,
            "errors": [],
            "result": [{"id": ZONE_ID, "name": "example.com"}]
        }));
    });
}

fn rule_doc(id: &str) -> serde_json::Value {
    serde_json::json!({
        "id": id,
        "description": format!("rule {id}"),
        "disabled": false,
        "match": {
            "request": {"methods": ["GET"], "schemes": ["HTTPS"], "url": "example.com/*"},
            "response": {"status": [429]}
        },
        "action": {"mode": "simulate", "timeout": 60},
        "threshold": 10,
        "period": 60
    })
}

fn page_body(ids: &[&str], page: u32, total_pages: u32) -> serde_json::Value {
    serde_json::json!({
        "success": true,
        "errors": [],
        "result": ids.iter().map(|id| rule_doc(id)).collect::<Vec<_>>(),
        "result_info": {
            "page": page,
            "per_page": 5,
            "count": ids.len(),
            "total_count": 12,
            "total_pages": total_pages
        }
    })
}

#[test]
fn list_follows_pagination_in_order() -> anyhow::Result<()> {
    let server = MockServer::start();
    mock_zone_lookup(&server);

    let pages = [
        (1u32, vec!["r-01", "r-02", "r-03", "r-04", "r-05"]),
        (2, vec!["r-06", "r-07", "r-08", "r-09", "r-10"]),
        (3, vec!["r-11", "r-12"]),
    ];
    let mocks: Vec<_> = pages
        .iter()
        .map(|(page, ids)| {
            server.mock(|when, then| {
                when.method(GET)
                    .path(format!("/zones/{ZONE_ID}/rate_limits"))
                    .query_param("page", page.to_string())
                    .query_param("per_page", "5");
                then.status(200).json_body(page_body(ids, *page, 3));
            })
        })
        .collect();

    let assert = edgelimit(&server)?
        .arg("--zone")
        .arg("example.com")
        .arg("list")
        .assert()
        .success();

    let stdout = String::from_utf8(assert.get_output().stdout.clone())?;
    // All 12 rules surface as one result, in page order.
    let positions: Vec<usize> = (1..=12)
        .map(|n| {
            let id = format!("r-{n:02}");
            stdout.find(&id).unwrap_or_else(|| panic!("{id} missing from output"))
        })
        .collect();
    let mut sorted = positions.clone();
    sorted.sort_unstable();
    assert_eq!(positions, sorted, "rules out of page order");

    for mock in &mocks {
        assert_eq!(mock.hits(), 1);
    }
    Ok(())
}

#[test]
fn single_page_listing_makes_one_fetch() -> anyhow::Result<()> {
    let server = MockServer::start();
    mock_zone_lookup(&server);

    let page = server.mock(|when, then| {
        when.method(GET)
            .path(format!("/zones/{ZONE_ID}/rate_limits"))
            .query_param("page", "1");
        then.status(200).json_body(serde_json::json!({
            "success": true,
            "errors": [],
            "result": [rule_doc("r-01")],
            "result_info": {"page": 1, "per_page": 5, "count": 1, "total_count": 1, "total_pages": 1}
        }));
    });

    edgelimit(&server)?
        .arg("--zone")
        .arg("example.com")
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("r-01"));
    assert_eq!(page.hits(), 1);
    Ok(())
}

#[test]
fn page_count_shift_fails_closed() -> anyhow::Result<()> {
    let server = MockServer::start();
    mock_zone_lookup(&server);

    server.mock(|when, then| {
        when.method(GET)
            .path(format!("/zones/{ZONE_ID}/rate_limits"))
            .query_param("page", "1");
        then.status(200)
            .json_body(page_body(&["r-01", "r-02", "r-03", "r-04", "r-05"], 1, 3));
    });
    // A second page reporting a different total means the listing changed
    // between calls.
    server.mock(|when, then| {
        when.method(GET)
            .path(format!("/zones/{ZONE_ID}/rate_limits"))
            .query_param("page", "2");
        then.status(200)
            .json_body(page_body(&["r-06", "r-07", "r-08", "r-09", "r-10"], 2, 4));
    });

    edgelimit(&server)?
        .arg("--zone")
        .arg("example.com")
        .arg("list")
        .assert()
        .failure()
        .stderr(predicate::str::contains("changed while paging"));
    Ok(())
}

#[test]
fn empty_zone_prints_placeholder() -> anyhow::Result<()> {
    let server = MockServer::start();
    mock_zone_lookup(&server);

    server.mock(|when, then| {
        when.method(GET).path(format!("/zones/{ZONE_ID}/rate_limits"));
        then.status(200).json_body(serde_json::json!({
            "success": true,
            "errors": [],
            "result": [],
            "result_info": {"page": 1, "per_page": 5, "count": 0, "total_count": 0, "total_pages": 0}
        }));
    });

    edgelimit(&server)?
        .arg("--zone")
        .arg("example.com")
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("No rate-limit rules found."));
    Ok(())
}
