use mathhammer::server::routes::route_request;

#[test]
fn health_endpoint_returns_ok_json() {
    let response = route_request("GET", "/api/health", "");
    assert_eq!(response.status_code, 200);
    assert_eq!(response.content_type, "application/json");
    assert!(response.body.contains("\"status\": \"ok\""));
    assert!(response.body.contains("mathhammer-api"));
}

#[test]
fn rulesets_endpoint_lists_both_families() {
    let response = route_request("GET", "/api/rulesets", "");
    assert_eq!(response.status_code, 200);

    let payload: serde_json::Value =
        serde_json::from_str(&response.body).expect("response should be valid json");
    let rulesets = payload["rulesets"]
        .as_array()
        .expect("rulesets should be an array");
    assert_eq!(rulesets.len(), 2);
    assert_eq!(rulesets[0]["name"], "40k");
    assert_eq!(rulesets[1]["name"], "aos");
    assert_eq!(rulesets[0]["invulnerable_saves"], true);
    assert_eq!(rulesets[1]["invulnerable_saves"], false);
}

#[test]
fn roll_endpoint_resolves_a_full_pipeline() {
    let body = r#"{
        "ruleset": "40k",
        "attacks": "10",
        "hit": 3,
        "strength": 4,
        "toughness": 4,
        "ap": 1,
        "save": 3,
        "damage": "1",
        "wounds_per_model": 1
    }"#;
    let response = route_request("POST", "/api/roll", body);
    assert_eq!(response.status_code, 200);

    let payload: serde_json::Value =
        serde_json::from_str(&response.body).expect("response should be valid json");
    assert_eq!(payload["status"], "ok");
    assert_eq!(payload["ruleset"], "forty_k");

    let stages = payload["stages"].as_array().expect("stages present");
    assert_eq!(stages.len(), 6);
    assert_eq!(stages[0]["stage"], "attacks");
    assert_eq!(stages[5]["stage"], "killed");
    for stage in stages {
        let sum: f64 = stage["normal"]
            .as_array()
            .expect("normal is an array")
            .iter()
            .map(|v| v.as_f64().unwrap_or(0.0))
            .sum();
        assert!((sum - 1.0).abs() < 1e-9, "stage sums to {sum}");
    }

    assert!(payload["permalink"]
        .as_str()
        .expect("permalink present")
        .contains("attacks=10"));
}

#[test]
fn roll_endpoint_rejects_invalid_json() {
    let response = route_request("POST", "/api/roll", "{not json}");
    assert_eq!(response.status_code, 400);
    assert!(response.body.contains("Invalid request body"));
}

#[test]
fn roll_endpoint_rejects_illegal_fields_for_the_ruleset() {
    let body = r#"{"ruleset": "aos", "attacks": "6", "hit": 3, "wound": 4, "invulnerable": 4}"#;
    let response = route_request("POST", "/api/roll", body);
    assert_eq!(response.status_code, 400);
    assert!(response.body.contains("invulnerable"));
}

#[test]
fn unknown_route_is_a_404() {
    let response = route_request("GET", "/api/nope", "");
    assert_eq!(response.status_code, 404);
}

#[test]
fn index_page_is_served() {
    let response = route_request("GET", "/", "");
    assert_eq!(response.status_code, 200);
    assert!(response.content_type.starts_with("text/html"));
    assert!(response.body.contains("/api/roll"));
}

#[test]
fn http_string_carries_content_length_and_date() {
    let response = route_request("GET", "/api/health", "");
    let raw = response.to_http_string();
    assert!(raw.starts_with("HTTP/1.1 200 OK\r\n"));
    assert!(raw.contains("\r\nDate: "));
    assert!(raw.contains(&format!("Content-Length: {}", response.body.len())));
}
