mod common;

use axum::http::StatusCode;
use common::{FakeCliDevice, FakeNetconfDevice, TestApp};
use serde_json::json;

// ---------------------------------------------------------------------------
// CLI variant
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_create_loopback_sends_exact_values() {
    let app = TestApp::new(false);

    let (status, body) = app
        .post(
            "/create-loopback",
            json!({
                "interface_number": "50",
                "description": "uplink to core-1",
                "loopback_ip": "10.0.0.1/28"
            }),
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["ok"], true);
    assert_eq!(body["message"], "Configuration done successfully");
    assert!(body["data"]["response"].as_str().unwrap().contains("interface Loopback50"));

    assert_eq!(
        app.cli.commands(),
        vec![
            "configure terminal",
            "interface Loopback50",
            "description uplink to core-1",
            "ipv4 address 10.0.0.1 255.255.255.240",
            "commit",
            "end",
        ]
    );
    assert_eq!(app.cli.state.lock().closed_sessions, 1);
}

#[tokio::test]
async fn test_cli_round_trip_through_list() {
    let app = TestApp::new(false);
    app.post(
        "/create-loopback",
        json!({"interface_number": 50, "description": "test", "loopback_ip": "10.0.0.1/28"}),
    )
    .await;

    let (status, body) = app.get("/list-interfaces").await;
    assert_eq!(status, StatusCode::OK);
    let response = body["data"]["response"].as_str().unwrap();
    assert!(response.contains("Loopback50 is up"));
    assert!(response.contains("Description: test"));
    assert!(response.contains("Internet address is 10.0.0.1/28"));
}

#[tokio::test]
async fn test_remove_never_created_interface_is_device_rejection() {
    let app = TestApp::new(false);
    app.post(
        "/create-loopback",
        json!({"interface_number": 1, "loopback_ip": "192.0.2.1"}),
    )
    .await;
    let before = app.cli.state.lock().running.clone();

    let (status, body) = app
        .post("/remove-loopback", json!({"interface_number": 99}))
        .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["ok"], false);
    assert_eq!(body["kind"], "DeviceRejected");
    assert!(body["message"].as_str().unwrap().contains("Loopback99"));
    assert!(body["data"]["response"]
        .as_str()
        .unwrap()
        .contains("No configuration changes"));

    assert_eq!(app.cli.state.lock().running, before);

    // 服务继续正常处理后续请求
    let (status, _) = app.get("/list-interfaces").await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_remove_existing_interface() {
    let app = TestApp::new(false);
    app.post(
        "/create-loopback",
        json!({"interface_number": 7, "loopback_ip": "192.0.2.7/32"}),
    )
    .await;

    let (status, body) = app
        .post("/remove-loopback", json!({"interface_number": "Loopback7"}))
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Loopback Configuration deleted successfully");
    assert!(app.cli.state.lock().running.is_empty());
    assert!(app.cli.commands().contains(&"no interface Loopback7".to_string()));
}

#[tokio::test]
async fn test_description_injection_is_invalid_input() {
    let app = TestApp::new(false);

    let (status, body) = app
        .post(
            "/create-loopback",
            json!({
                "interface_number": 5,
                "description": "x\nno router bgp 65000",
                "loopback_ip": "10.0.0.5"
            }),
        )
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["kind"], "InvalidInput");
    assert_eq!(app.cli.connects(), 0);
}

#[tokio::test]
async fn test_description_edge_spaces_sent_verbatim() {
    let app = TestApp::new(false);

    let (status, _) = app
        .post(
            "/create-loopback",
            json!({
                "interface_number": 50,
                "description": "  core  uplink  ",
                "loopback_ip": "10.0.0.1/28"
            }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(app
        .cli
        .commands()
        .contains(&"description   core  uplink  ".to_string()));

    let (status, _) = app
        .post(
            "/configure-loopback",
            json!({
                "interface_number": 50,
                "description": "  core  uplink  ",
                "loopback_ip": "10.0.0.1/28"
            }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(app.netconf.payloads()[0].contains("<description>  core  uplink  </description>"));
}

#[tokio::test]
async fn test_blank_description_is_invalid_input() {
    let app = TestApp::new(false);

    for (path, description) in [("/create-loopback", ""), ("/configure-loopback", "   ")] {
        let (status, body) = app
            .post(
                path,
                json!({
                    "interface_number": 50,
                    "description": description,
                    "loopback_ip": "10.0.0.1/28"
                }),
            )
            .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["kind"], "InvalidInput");
        assert!(body["message"].as_str().unwrap().contains("Invalid description"));
    }
    assert_eq!(app.cli.connects(), 0);
    assert_eq!(app.netconf.connects(), 0);
}

// ---------------------------------------------------------------------------
// NETCONF variant
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_configure_loopback_payload_carries_exact_values() {
    let app = TestApp::new(false);

    let (status, body) = app
        .post(
            "/configure-loopback",
            json!({
                "interface_number": "50",
                "description": "test",
                "loopback_ip": "10.0.0.1",
                "subnet": "255.255.255.240"
            }),
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    assert!(body["data"]["reply"].as_str().unwrap().contains("<ok/>"));

    let payloads = app.netconf.payloads();
    assert_eq!(payloads.len(), 1);
    let payload = &payloads[0];
    assert!(payload.contains("<name>Loopback50</name>"));
    assert!(payload.contains("<description>test</description>"));
    assert!(payload.contains("<address>10.0.0.1</address>"));
    assert!(payload.contains("<netmask>255.255.255.240</netmask>"));
    assert_eq!(app.netconf.state.lock().closed_sessions, 1);
}

#[tokio::test]
async fn test_configure_then_show_round_trip() {
    let app = TestApp::new(false);

    let (status, _) = app
        .post(
            "/configure-loopback",
            json!({"interface_number": 50, "description": "test", "loopback_ip": "10.0.0.1/28"}),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = app.post("/show-loopback", json!({"interface_number": 50})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["ok"], true);

    let interface = &body["data"]["interface"];
    assert_eq!(interface["id"], 50);
    assert_eq!(interface["name"], "Loopback50");
    assert_eq!(interface["description"], "test");
    assert_eq!(interface["address"], "10.0.0.1");
    assert_eq!(interface["prefix_length"], 28);
    assert!(body["data"]["xml"].as_str().unwrap().contains("<address>10.0.0.1</address>"));
}

#[tokio::test]
async fn test_show_unknown_interface_is_empty_success() {
    let app = TestApp::new(false);

    let (status, body) = app.post("/show-loopback", json!({"interface_number": 12})).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["ok"], true);
    assert!(body["data"]["interface"].is_null());
}

#[tokio::test]
async fn test_netconf_delete_never_created_interface() {
    let app = TestApp::new(false);

    let (status, body) = app
        .post("/delete-loopback", json!({"interface_number": 99}))
        .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["kind"], "DeviceRejected");
    assert!(body["message"].as_str().unwrap().contains("data-missing"));
    assert!(body["data"]["response"].as_str().unwrap().contains("<rpc-error>"));
    assert!(app.netconf.state.lock().running.is_empty());
    assert_eq!(app.netconf.state.lock().closed_sessions, 1);
}

#[tokio::test]
async fn test_netconf_delete_configured_interface() {
    let app = TestApp::new(false);
    app.post(
        "/configure-loopback",
        json!({"interface_number": 3, "loopback_ip": "192.0.2.3", "subnet": 32}),
    )
    .await;

    let (status, _) = app.post("/delete-loopback", json!({"interface_number": 3})).await;
    assert_eq!(status, StatusCode::OK);
    assert!(app.netconf.state.lock().running.is_empty());
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_missing_interface_number_never_reaches_device() {
    let app = TestApp::new(false);

    for path in ["/create-loopback", "/configure-loopback"] {
        let (status, body) = app
            .post(path, json!({"description": "test", "loopback_ip": "10.0.0.1/28"}))
            .await;

        assert_eq!(status, StatusCode::BAD_REQUEST, "{}", path);
        assert_eq!(body["ok"], false);
        assert_eq!(body["kind"], "InvalidInput");
        assert!(body["message"].as_str().unwrap().contains("interface_number"));
    }

    assert_eq!(app.cli.connects(), 0);
    assert_eq!(app.netconf.connects(), 0);
}

#[tokio::test]
async fn test_malformed_body_is_invalid_input() {
    let app = TestApp::new(false);

    let (status, body) = app.call("POST", "/remove-loopback", Some("{not json")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["kind"], "InvalidInput");

    let (status, _) = app.call("POST", "/show-loopback", Some("[50]")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    assert_eq!(app.cli.connects(), 0);
    assert_eq!(app.netconf.connects(), 0);
}

// ---------------------------------------------------------------------------
// Transport failures
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_transport_failure_is_uniform_on_every_operation() {
    let app = TestApp::with_devices(
        FakeCliDevice::unreachable(),
        FakeNetconfDevice::unreachable(),
        false,
    );
    let body = json!({"interface_number": 50, "description": "test", "loopback_ip": "10.0.0.1/28"});

    let responses = vec![
        app.post("/create-loopback", body.clone()).await,
        app.get("/list-interfaces").await,
        app.post("/remove-loopback", body.clone()).await,
        app.post("/configure-loopback", body.clone()).await,
        app.post("/delete-loopback", body.clone()).await,
        app.post("/show-loopback", body.clone()).await,
    ];

    for (status, body) in responses {
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body["ok"], false);
        assert_eq!(body["kind"], "TransportError");
        assert!(body["message"].as_str().unwrap().contains("connection refused"));
    }

    let (_, health) = app.get("/health").await;
    assert_eq!(health["status"], "degraded");
    assert_eq!(health["details"]["last_outcome"]["outcome"], "TransportError");
}

// ---------------------------------------------------------------------------
// Dry-run gate
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_dry_run_echoes_state_changing_requests() {
    let app = TestApp::new(true);

    let cases = [
        (
            "/create-loopback",
            "create_loopback",
            json!({"interface_number": "50", "description": "test", "loopback_ip": "10.0.0.1/28"}),
        ),
        (
            "/remove-loopback",
            "remove_loopback",
            json!({"interface_number": 50}),
        ),
        (
            "/configure-loopback",
            "configure_loopback",
            json!({"interface_number": 50, "description": "test", "loopback_ip": "10.0.0.1", "subnet": "255.255.255.240"}),
        ),
        (
            "/delete-loopback",
            "delete_loopback",
            json!({"interface_number": 50, "extra": [1, 2, 3]}),
        ),
    ];

    for (path, operation, input) in cases {
        let (status, body) = app.post(path, input.clone()).await;

        assert_eq!(status, StatusCode::OK, "{}", path);
        assert_eq!(body["ok"], true);
        assert_eq!(body["message"], "dry run: no changes sent to device");
        assert_eq!(body["data"]["simulated"], true);
        assert_eq!(body["data"]["operation"], operation);
        assert_eq!(body["data"]["input"], input);
    }

    assert_eq!(app.cli.connects(), 0);
    assert_eq!(app.netconf.connects(), 0);
}

#[tokio::test]
async fn test_dry_run_echoes_invalid_fields_verbatim() {
    let app = TestApp::new(true);
    let input = json!({"description": "no interface number here"});

    let (status, body) = app.post("/loopback_configuration", input.clone()).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["input"], input);
    assert_eq!(app.cli.connects(), 0);
}

#[tokio::test]
async fn test_dry_run_echo_keeps_key_order() {
    let app = TestApp::new(true);
    let raw = r#"{"loopback_ip":"10.0.0.1/28","interface_number":50,"description":"test"}"#;

    let (status, body) = app.call("POST", "/create-loopback", Some(raw)).await;

    assert_eq!(status, StatusCode::OK);
    let keys: Vec<&str> = body["data"]["input"]
        .as_object()
        .unwrap()
        .keys()
        .map(String::as_str)
        .collect();
    assert_eq!(keys, ["loopback_ip", "interface_number", "description"]);
    assert_eq!(body["data"]["input"].to_string(), raw);
}

#[tokio::test]
async fn test_dry_run_read_endpoints_return_placeholder() {
    let app = TestApp::new(true);

    let (status, body) = app.get("/list-interfaces").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "dry run: device not contacted");
    assert_eq!(body["data"]["response"], "");

    let (status, body) = app.post("/show-loopback", json!({"interface_number": 50})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["simulated"], true);
    assert_eq!(body["data"]["operation"], "show_loopback");

    assert_eq!(app.cli.connects(), 0);
    assert_eq!(app.netconf.connects(), 0);
}

#[tokio::test]
async fn test_dry_run_rejects_non_json_body() {
    let app = TestApp::new(true);

    let (status, body) = app.call("POST", "/configure-loopback", Some("interface=50")).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["kind"], "InvalidInput");
}

#[tokio::test]
async fn test_dry_run_leaves_health_and_metrics_open() {
    let app = TestApp::new(true);

    let (status, body) = app.get("/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["details"]["dry_run"], true);

    let (status, _) = app.get("/health/live").await;
    assert_eq!(status, StatusCode::OK);
}

// ---------------------------------------------------------------------------
// Routing
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_legacy_paths_are_aliases() {
    let app = TestApp::new(false);

    let (status, _) = app
        .post(
            "/netconf_loopback_configuration",
            json!({"interface_number": 8, "loopback_ip": "192.0.2.8/32"}),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = app
        .post("/netconf_show_loopback", json!({"interface_number": 8}))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["interface"]["address"], "192.0.2.8");

    let (status, _) = app.get("/list_interfaces").await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_unknown_path_is_not_found() {
    let app = TestApp::new(true);
    let (status, _) = app.get("/loopbacks").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
