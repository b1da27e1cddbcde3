use api_contract::ApiResponse;

#[test]
fn error_envelope_has_code_and_message() {
    let response = ApiResponse::<()>::error("INVALID.FORMAT", "not yaml");
    let value = serde_json::to_value(response).expect("serialize");
    assert_eq!(value["success"], false);
    assert!(value["data"].is_null());
    assert_eq!(value["error"]["code"], "INVALID.FORMAT");
    assert_eq!(value["error"]["message"], "not yaml");
}

#[test]
fn success_envelope_has_no_error() {
    let response = ApiResponse::success(vec![1, 2]);
    let value = serde_json::to_value(response).expect("serialize");
    assert_eq!(value["success"], true);
    assert_eq!(value["data"][1], 2);
    assert!(value["error"].is_null());
}
