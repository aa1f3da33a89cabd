//! Verify classification, filtering and instance parsing against the JSON
//! vectors stored in `test-vectors/`.
//!
//! Comparing parsed JSON (not raw strings) avoids false negatives from
//! field-ordering differences.

use bpm_core::{
    classify, filter_properties, AllowList, ApiError, BpmClient, ClientConfig, FieldSpec,
    HttpMethod, HttpResponse, TransportError,
};
use serde_json::Value;

const BASE_URL: &str = "http://localhost:9080/rest/bpm/wle/v1";

fn client() -> BpmClient {
    BpmClient::new(&ClientConfig::new(BASE_URL, "admin", "admin")).unwrap()
}

/// Parse the method string from test vectors into `HttpMethod`.
fn parse_method(s: &str) -> HttpMethod {
    match s {
        "GET" => HttpMethod::Get,
        "POST" => HttpMethod::Post,
        "PUT" => HttpMethod::Put,
        other => panic!("unknown method: {other}"),
    }
}

// ---------------------------------------------------------------------------
// Classify
// ---------------------------------------------------------------------------

#[test]
fn classify_test_vectors() {
    let raw = include_str!("../../test-vectors/classify.json");
    let vectors: Value = serde_json::from_str(raw).unwrap();

    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let outcome = match case.get("transport_error") {
            Some(message) => Err(TransportError::new(message.as_str().unwrap())),
            None => {
                let sim = &case["response"];
                Ok(HttpResponse::new(
                    sim["status"].as_u64().unwrap() as u16,
                    sim["body"].as_str().unwrap(),
                ))
            }
        };
        let result = classify(outcome);

        if let Some(expected) = case.get("expected_envelope") {
            let envelope = result.unwrap_or_else(|e| panic!("{name}: unexpected error {e}"));
            assert_eq!(serde_json::to_value(&envelope).unwrap(), *expected, "{name}: envelope");
            continue;
        }

        let expected = &case["expected_error"];
        let err = result.expect_err(name);
        assert_eq!(err.status() as u64, expected["status"].as_u64().unwrap(), "{name}: status");
        assert_eq!(err.message(), expected["message"].as_str().unwrap(), "{name}: message");
        match expected.get("text") {
            Some(text) => {
                assert!(matches!(err, ApiError::Transport(_)), "{name}: expected raw transport error");
                assert_eq!(err.to_string(), text.as_str().unwrap(), "{name}: text");
            }
            None => assert_eq!(err.data(), Some(&expected["data"]), "{name}: data"),
        }
    }
}

// ---------------------------------------------------------------------------
// Filter
// ---------------------------------------------------------------------------

#[test]
fn filter_test_vectors() {
    let raw = include_str!("../../test-vectors/filter.json");
    let vectors: Value = serde_json::from_str(raw).unwrap();

    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let specs: Vec<FieldSpec> = case["keep"]
            .as_array()
            .unwrap()
            .iter()
            .map(|k| FieldSpec::keep(Box::leak(k.as_str().unwrap().to_string().into_boxed_str())))
            .collect();
        let allow = AllowList::new(&specs);

        let once = filter_properties(case["input"].clone(), &allow);
        assert_eq!(once, case["expected"], "{name}: filtered");
        let twice = filter_properties(once.clone(), &allow);
        assert_eq!(twice, once, "{name}: idempotent");
    }
}

// ---------------------------------------------------------------------------
// Instance details
// ---------------------------------------------------------------------------

#[test]
fn instance_test_vectors() {
    let raw = include_str!("../../test-vectors/instance.json");
    let vectors: Value = serde_json::from_str(raw).unwrap();

    let c = client();
    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let id = case["input_id"].as_str().unwrap();
        let expected_req = &case["expected_request"];

        // Verify build
        let req = c.build_get_instance(id);
        assert_eq!(req.method, parse_method(expected_req["method"].as_str().unwrap()), "{name}: method");
        assert_eq!(req.url, format!("{BASE_URL}{}", expected_req["path"].as_str().unwrap()), "{name}: url");
        assert!(req.header("content-type").is_none(), "{name}: no body headers");

        // Verify parse
        let sim = &case["simulated_response"];
        let response = HttpResponse::new(sim["status"].as_u64().unwrap() as u16, sim["body"].to_string());
        let result = c.parse_instance(Ok(response));

        if let Some(expected_status) = case.get("expected_error") {
            let err = result.unwrap_err();
            assert_eq!(err.status() as u64, expected_status.as_u64().unwrap(), "{name}: status");
            assert_eq!(err.data(), Some(&sim["body"]), "{name}: error body untouched");
        } else {
            let envelope = result.unwrap();
            assert_eq!(envelope.status, "200", "{name}: status");
            assert_eq!(envelope.data, case["expected_result"], "{name}: parsed result");
        }
    }
}
