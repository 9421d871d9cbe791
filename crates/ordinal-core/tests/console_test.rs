// End-to-end reorder flows against a mocked console.
#![allow(clippy::unwrap_used)]

use pretty_assertions::assert_eq;
use secrecy::SecretString;
use serde_json::{Value, json};
use url::Url;
use wiremock::matchers::{body_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use ordinal_core::model::numbers_of;
use ordinal_core::{
    Console, ConsoleConfig, CoreError, DragOutcome, ExtCommunityList, FirewallChain, IpProtocol,
    LocalRouteFamily, LocalRoutePolicy, ReorderPhase, SaveOutcome,
};

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup() -> (MockServer, Console) {
    let server = MockServer::start().await;
    let config = ConsoleConfig::new(
        Url::parse(&server.uri()).unwrap(),
        SecretString::from("test-key".to_string()),
    );
    let console = Console::new(config).unwrap();
    (server, console)
}

fn ok(data: Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({ "success": true, "data": data }))
}

fn chain_rules() -> Value {
    json!([
        { "number": 10, "action": "accept", "description": "ssh" },
        { "number": 20, "action": "drop", "description": "telnet" },
        { "number": 30, "action": "reject", "description": "smb" },
    ])
}

// ── Tests ───────────────────────────────────────────────────────────

#[tokio::test]
async fn load_hits_console_once_until_forced() {
    let (server, console) = setup().await;
    let chain = FirewallChain::new(IpProtocol::Ipv4, "WAN_IN", false);

    Mock::given(method("GET"))
        .and(path("/api/v1/firewall/ipv4/chains/WAN_IN/rules"))
        .and(query_param("refresh", "false"))
        .respond_with(ok(chain_rules()))
        .expect(1)
        .mount(&server)
        .await;

    let first = console.load(&chain, false).await.unwrap();
    let second = console.load(&chain, false).await.unwrap();

    assert_eq!(numbers_of(&first), vec![10, 20, 30]);
    assert_eq!(first, second);
    assert_eq!(
        first[1].field("description"),
        Some(&json!("telnet"))
    );
}

#[tokio::test]
async fn chain_reorder_round_trip() {
    let (server, console) = setup().await;
    let chain = FirewallChain::new(IpProtocol::Ipv6, "LAN_IN", true);

    Mock::given(method("GET"))
        .and(path("/api/v1/firewall/ipv6/chains/LAN_IN/rules"))
        .and(query_param("custom", "true"))
        .and(query_param("refresh", "false"))
        .respond_with(ok(chain_rules()))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/v1/firewall/ipv6/chains/LAN_IN/rules/reorder"))
        .and(body_json(json!({
            "custom": true,
            "rules": [
                { "old_number": 30, "new_number": 10,
                  "rule_data": { "action": "reject", "description": "smb" } },
                { "old_number": 10, "new_number": 20,
                  "rule_data": { "action": "accept", "description": "ssh" } },
                { "old_number": 20, "new_number": 30,
                  "rule_data": { "action": "drop", "description": "telnet" } },
            ]
        })))
        .respond_with(ok(Value::Null))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/v1/firewall/ipv6/chains/LAN_IN/rules"))
        .and(query_param("refresh", "true"))
        .respond_with(ok(json!([
            { "number": 10, "action": "reject", "description": "smb" },
            { "number": 20, "action": "accept", "description": "ssh" },
            { "number": 30, "action": "drop", "description": "telnet" },
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let mut ctl = console.reorder(chain);
    ctl.load(false).await.unwrap();
    assert_eq!(ctl.drag(&[10, 20, 30], 2, Some(0)), DragOutcome::Moved);

    let outcome = ctl.save().await.unwrap();

    assert_eq!(
        outcome,
        SaveOutcome::Saved {
            entries: 3,
            refreshed: true
        }
    );
    assert_eq!(ctl.phase(), ReorderPhase::Clean);
    let shown = ctl.displayed();
    assert_eq!(shown[0].field("description"), Some(&json!("smb")));
}

#[tokio::test]
async fn policy_reorder_compacts_numbers() {
    let (server, console) = setup().await;
    let policy = LocalRoutePolicy::new(LocalRouteFamily::Ipv4, "uplinks");

    Mock::given(method("GET"))
        .and(path("/api/v1/policy/local-route/uplinks/rules"))
        .respond_with(ok(json!([
            { "number": 5, "table": "main" },
            { "number": 9, "table": "wan2" },
        ])))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/v1/policy/local-route/uplinks/rules/reorder"))
        .and(body_json(json!({
            "rules": [
                { "old_number": 9, "new_number": 5, "rule_data": { "table": "wan2" } },
                { "old_number": 5, "new_number": 6, "rule_data": { "table": "main" } },
            ]
        })))
        .respond_with(ok(Value::Null))
        .expect(1)
        .mount(&server)
        .await;

    let mut ctl = console.reorder(policy);
    ctl.load(false).await.unwrap();
    ctl.move_rule(9, 5);

    ctl.save().await.unwrap();
}

#[tokio::test]
async fn rejected_save_keeps_working_order() {
    let (server, console) = setup().await;
    let list = ExtCommunityList::new("PEERS");

    Mock::given(method("GET"))
        .and(path("/api/v1/policy/extcommunity-list/PEERS/rules"))
        .respond_with(ok(json!([
            { "number": 1, "regex": "rt:65000:1" },
            { "number": 2, "regex": "rt:65000:2" },
        ])))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/v1/policy/extcommunity-list/PEERS/rules/reorder"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": false,
            "data": null,
            "error": "commit failed"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let mut ctl = console.reorder(list);
    ctl.load(false).await.unwrap();
    ctl.move_rule(2, 1);

    let err = ctl.save().await.unwrap_err();

    assert!(matches!(err, CoreError::Rejected { ref message } if message == "commit failed"));
    assert_eq!(ctl.phase(), ReorderPhase::Dirty);
    assert_eq!(numbers_of(&ctl.displayed()), vec![2, 1]);
}

#[tokio::test]
async fn refresh_all_skips_collection_being_reordered() {
    let (server, console) = setup().await;
    let peers = ExtCommunityList::new("PEERS");
    let customers = ExtCommunityList::new("CUSTOMERS");

    for name in ["PEERS", "CUSTOMERS"] {
        Mock::given(method("GET"))
            .and(path(format!("/api/v1/policy/extcommunity-list/{name}/rules")))
            .respond_with(ok(json!([{ "number": 1 }, { "number": 2 }])))
            .mount(&server)
            .await;
    }

    console.load(&customers, false).await.unwrap();
    let mut ctl = console.reorder(peers.clone());
    ctl.load(false).await.unwrap();
    ctl.move_rule(2, 1);

    let summary = console.refresh_all().await;

    assert_eq!(summary.refreshed, 1);
    assert_eq!(summary.skipped, 1);
    assert!(console.stores().ext_community_lists.is_pinned(&peers));
    assert_eq!(numbers_of(&ctl.displayed()), vec![2, 1]);
}

#[tokio::test]
async fn missing_collection_maps_to_not_found() {
    let (server, console) = setup().await;
    let chain = FirewallChain::new(IpProtocol::Ipv4, "NOPE", false);

    Mock::given(method("GET"))
        .and(path("/api/v1/firewall/ipv4/chains/NOPE/rules"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "success": false,
            "error": "chain NOPE does not exist"
        })))
        .mount(&server)
        .await;

    let err = console.load(&chain, false).await.unwrap_err();

    assert!(matches!(err, CoreError::CollectionNotFound { .. }));
    assert!(console.stores().firewall_chains.last_error(&chain).is_some());
}

#[tokio::test]
async fn start_and_shutdown_without_interval() {
    let (_server, console) = setup().await;
    console.start().await;
    console.shutdown().await;
}
