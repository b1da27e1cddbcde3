//! 公式校验接口
//!
//! - POST /formulas/validate
//!
//! 同时给出两套语法的结论：`valid` 为部署时使用的宽松校验，
//! `submitValid` / `submitError` 为提交时的严格校验。

use api_contract::{FormulaValidateRequest, FormulaValidateResponse};
use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use gwc_formula::{check_submit_formula, is_valid_formula};

use crate::utils::response::bad_request_error;

pub async fn validate_formula(
    payload: Result<Json<FormulaValidateRequest>, JsonRejection>,
) -> Response {
    let Json(req) = match payload {
        Ok(payload) => payload,
        Err(rejection) => return bad_request_error(rejection.body_text()),
    };
    let submit = check_submit_formula(&req.formula);
    let response = FormulaValidateResponse {
        valid: is_valid_formula(&req.formula),
        submit_valid: submit.is_ok(),
        submit_error: submit.err().map(|err| err.to_string()),
        formula: req.formula,
    };
    (StatusCode::OK, Json(response)).into_response()
}

#[cfg(test)]
mod tests {
    use crate::handlers::test_support::{post, send, test_app};
    use axum::http::StatusCode;

    #[tokio::test]
    async fn arithmetic_passes_both_grammars() {
        let (status, body) = send(
            &test_app(),
            post("/formulas/validate", "application/json", r#"{"formula":"(A+B)*2"}"#),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["formula"], "(A+B)*2");
        assert_eq!(body["valid"], true);
        assert_eq!(body["submitValid"], true);
        assert!(body["submitError"].is_null());
    }

    #[tokio::test]
    async fn functions_pass_only_the_lenient_grammar() {
        let (status, body) = send(
            &test_app(),
            post("/api/formulas/validate", "application/json", r#"{"formula":"max(A, B)"}"#),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["valid"], true);
        assert_eq!(body["submitValid"], false);
        assert!(body["submitError"].is_string());
    }

    #[tokio::test]
    async fn unbalanced_parentheses_fail_submit_grammar() {
        let (_, body) = send(
            &test_app(),
            post("/formulas/validate", "application/json", r#"{"formula":"(A+B"}"#),
        )
        .await;
        assert_eq!(body["valid"], true);
        assert_eq!(body["submitValid"], false);
    }

    #[tokio::test]
    async fn missing_formula_is_bad_request() {
        let (status, body) = send(
            &test_app(),
            post("/formulas/validate", "application/json", r#"{"expr":"A"}"#),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "INVALID.REQUEST");
    }
}
