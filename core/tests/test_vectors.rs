//! Verify build/parse methods against JSON test vectors stored in `test-vectors/`.
//!
//! Each vector file describes inputs, expected requests, simulated responses,
//! and expected parse results. Request bodies are compared as parsed JSON, not
//! raw strings, so key order does not matter. Inputs write dates as
//! `{"date": "YYYY-MM-DD"}`; expected results list only the keys to check.
//! A case with `expected_build_error` names an operation the resource does
//! not support, so no request is built.

use warehouse_core::resource::{
    APPRENTICESHIPS, APPRENTICE_GRADUATIONS, CLIENTS, CURRENT_DIRECTORS, DIRECTOR_ENGAGEMENTS_BY_PERSON, EMPLOYMENTS,
    ENGAGEMENTS, LOCATIONS, PEOPLE, PROJECTS,
};
use warehouse_core::temporal::parse_date;
use warehouse_core::{
    ApiError, ErrorKind, HttpMethod, HttpRequest, HttpResponse, Listing, Record, Resource, Value, WarehouseClient,
};

const BASE_URL: &str = "http://localhost:3000";

fn client() -> WarehouseClient {
    WarehouseClient::new(BASE_URL)
}

fn resource(name: &str) -> &'static Resource {
    match name {
        "clients" => &CLIENTS,
        "projects" => &PROJECTS,
        "people" => &PEOPLE,
        "employments" => &EMPLOYMENTS,
        "engagements" => &ENGAGEMENTS,
        "locations" => &LOCATIONS,
        "apprenticeships" => &APPRENTICESHIPS,
        other => panic!("unknown resource: {other}"),
    }
}

fn listing(name: &str) -> &'static Listing {
    match name {
        "current_directors" => &CURRENT_DIRECTORS,
        "director_engagements_by_person" => &DIRECTOR_ENGAGEMENTS_BY_PERSON,
        "apprentice_graduations" => &APPRENTICE_GRADUATIONS,
        other => panic!("unknown listing: {other}"),
    }
}

/// Parse the method string from test vectors into `HttpMethod`.
fn parse_method(s: &str) -> HttpMethod {
    match s {
        "GET" => HttpMethod::Get,
        "POST" => HttpMethod::Post,
        "PUT" => HttpMethod::Put,
        "DELETE" => HttpMethod::Delete,
        other => panic!("unknown method: {other}"),
    }
}

fn input_value(json: &serde_json::Value) -> Value {
    match json {
        serde_json::Value::Object(map) if map.len() == 1 && map.contains_key("date") => {
            Value::Date(parse_date(map["date"].as_str().unwrap()).unwrap())
        }
        serde_json::Value::Object(_) => Value::Record(input_record(json)),
        serde_json::Value::Array(items) => Value::List(items.iter().map(input_value).collect()),
        other => Value::from(other.clone()),
    }
}

fn input_record(json: &serde_json::Value) -> Record {
    json.as_object()
        .unwrap()
        .iter()
        .map(|(k, v)| (k.clone(), input_value(v)))
        .collect()
}

fn pairs(json: &serde_json::Value) -> Vec<(String, String)> {
    json.as_array()
        .unwrap()
        .iter()
        .map(|h| {
            let arr = h.as_array().unwrap();
            (arr[0].as_str().unwrap().to_string(), arr[1].as_str().unwrap().to_string())
        })
        .collect()
}

fn simulated(case: &serde_json::Value) -> HttpResponse {
    let sim = &case["simulated_response"];
    HttpResponse {
        status: sim["status"].as_u64().unwrap() as u16,
        headers: Vec::new(),
        body: sim["body"].as_str().unwrap().to_string(),
    }
}

fn check_request(name: &str, req: &HttpRequest, expected: &serde_json::Value) {
    assert_eq!(req.method, parse_method(expected["method"].as_str().unwrap()), "{name}: method");
    assert_eq!(req.path, format!("{BASE_URL}{}", expected["path"].as_str().unwrap()), "{name}: path");
    if let Some(headers) = expected.get("headers") {
        assert_eq!(req.headers, pairs(headers), "{name}: headers");
    }
    if let Some(query) = expected.get("query") {
        assert_eq!(req.query, pairs(query), "{name}: query");
    }
    if let Some(body) = expected.get("body") {
        let req_body: serde_json::Value = serde_json::from_str(req.body.as_deref().unwrap()).unwrap();
        assert_eq!(&req_body, body, "{name}: body");
    }
}

fn check_subset(name: &str, record: &Record, expected: &serde_json::Value) {
    for (key, value) in expected.as_object().unwrap() {
        assert_eq!(record.get(key), Some(&Value::from(value.clone())), "{name}: field {key}");
    }
}

/// Typed checks for fields the subset comparison cannot express.
fn check_temporal(name: &str, record: &Record, case: &serde_json::Value) {
    if let Some(dates) = case.get("expected_dates") {
        for (key, date) in dates.as_object().unwrap() {
            let expected = parse_date(date.as_str().unwrap()).unwrap();
            assert_eq!(record[key.as_str()].as_date(), Some(expected), "{name}: date {key}");
        }
    }
    if let Some(instants) = case.get("expected_instants") {
        for key in instants.as_array().unwrap() {
            let key = key.as_str().unwrap();
            assert!(record[key].as_instant().is_some(), "{name}: instant {key}");
        }
    }
}

fn check_build_error(name: &str, result: Result<HttpRequest, ApiError>, expected: &serde_json::Value) {
    match result {
        Err(ApiError::Unsupported { operation, .. }) => {
            assert_eq!(operation, expected["operation"].as_str().unwrap(), "{name}: operation")
        }
        other => panic!("{name}: expected an unsupported operation, got {other:?}"),
    }
}

fn check_error(name: &str, err: &ApiError, expected: &serde_json::Value) {
    let kind = match expected["kind"].as_str().unwrap() {
        "NotFound" => ErrorKind::NotFound,
        "Authentication" => ErrorKind::Authentication,
        "Authorization" => ErrorKind::Authorization,
        "Validation" => ErrorKind::Validation,
        "Generic" => ErrorKind::Generic,
        other => panic!("{name}: unknown expected kind: {other}"),
    };
    assert_eq!(err.kind(), kind, "{name}: kind");
    let codes: Vec<&str> = err
        .descriptors()
        .iter()
        .filter_map(|d| d.code.as_ref().map(|c| c.as_str()))
        .collect();
    let expected_codes: Vec<&str> = expected["codes"]
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c.as_str().unwrap())
        .collect();
    assert_eq!(codes, expected_codes, "{name}: codes");
}

// ---------------------------------------------------------------------------
// Create
// ---------------------------------------------------------------------------

#[test]
fn create_test_vectors() {
    let raw = include_str!("../../test-vectors/create.json");
    let vectors: serde_json::Value = serde_json::from_str(raw).unwrap();

    let c = client();
    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let resource = resource(case["resource"].as_str().unwrap());
        let input = input_record(&case["input"]);

        let built = c.build_create(resource, &input);
        if let Some(expected) = case.get("expected_build_error") {
            check_build_error(name, built, expected);
            continue;
        }
        let req = built.unwrap();
        check_request(name, &req, &case["expected_request"]);

        let result = c.parse_create(resource, simulated(case));
        if let Some(expected_error) = case.get("expected_error") {
            check_error(name, &result.unwrap_err(), expected_error);
        } else {
            check_subset(name, &result.unwrap(), &case["expected_result"]);
        }
    }
}

// ---------------------------------------------------------------------------
// Update
// ---------------------------------------------------------------------------

#[test]
fn update_test_vectors() {
    let raw = include_str!("../../test-vectors/update.json");
    let vectors: serde_json::Value = serde_json::from_str(raw).unwrap();

    let c = client();
    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let resource = resource(case["resource"].as_str().unwrap());
        let id = case["input_id"].as_u64().unwrap();
        let input = input_record(&case["input"]);

        let built = c.build_update(resource, id, &input);
        if let Some(expected) = case.get("expected_build_error") {
            check_build_error(name, built, expected);
            continue;
        }
        let req = built.unwrap();
        check_request(name, &req, &case["expected_request"]);

        let result = c.parse_update(resource, simulated(case));
        if let Some(expected_error) = case.get("expected_error") {
            check_error(name, &result.unwrap_err(), expected_error);
        } else {
            assert!(result.is_ok(), "{name}: expected success");
        }
    }
}

// ---------------------------------------------------------------------------
// Find
// ---------------------------------------------------------------------------

#[test]
fn find_test_vectors() {
    let raw = include_str!("../../test-vectors/find.json");
    let vectors: serde_json::Value = serde_json::from_str(raw).unwrap();

    let c = client();
    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let expected_error = case.get("expected_error");

        if case["operation"] == "list" {
            let listing = listing(case["listing"].as_str().unwrap());
            let req = match case.get("input_id") {
                Some(id) => c.build_list_for(listing, id.as_u64().unwrap()),
                None => c.build_list(listing),
            };
            check_request(name, &req, &case["expected_request"]);
            let result = c.parse_list(listing, simulated(case));
            if let Some(expected_error) = expected_error {
                check_error(name, &result.unwrap_err(), expected_error);
                continue;
            }
            let records = result.unwrap();
            let expected = case["expected_result"].as_array().unwrap();
            assert_eq!(records.len(), expected.len(), "{name}: length");
            for (record, expected) in records.iter().zip(expected) {
                check_subset(name, record, expected);
                check_temporal(name, record, case);
            }
            continue;
        }

        let resource = resource(case["resource"].as_str().unwrap());
        match case["operation"].as_str().unwrap() {
            "find_all" => {
                let req = c.build_find_all(resource, &input_record(&case["filters"]));
                check_request(name, &req, &case["expected_request"]);
                let result = c.parse_find_all(resource, simulated(case));
                if let Some(expected_error) = expected_error {
                    check_error(name, &result.unwrap_err(), expected_error);
                    continue;
                }
                let records = result.unwrap();
                let expected = case["expected_result"].as_array().unwrap();
                assert_eq!(records.len(), expected.len(), "{name}: length");
                for (record, expected) in records.iter().zip(expected) {
                    check_subset(name, record, expected);
                }
            }
            "find_by_id" => {
                let id = case["input_id"].as_u64().unwrap();
                let req = c.build_find_by_id(resource, id);
                check_request(name, &req, &case["expected_request"]);
                let result = c.parse_find_by_id(resource, simulated(case));
                if let Some(expected_error) = expected_error {
                    check_error(name, &result.unwrap_err(), expected_error);
                    continue;
                }
                match (result.unwrap(), &case["expected_result"]) {
                    (None, serde_json::Value::Null) => {}
                    (Some(record), expected) if expected.is_object() => check_subset(name, &record, expected),
                    (got, expected) => panic!("{name}: got {got:?}, expected {expected}"),
                }
            }
            other => panic!("{name}: unknown operation: {other}"),
        }
    }
}
