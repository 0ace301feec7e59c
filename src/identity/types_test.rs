use super::*;

// =============================================================================
// PasswordAuthRequest
// =============================================================================

#[test]
fn request_body_matches_wire_shape() {
    let body = PasswordAuthRequest { email: "a@example.com", password: "pw", return_secure_token: true };
    let json = serde_json::to_string(&body).unwrap();
    assert_eq!(json, r#"{"email":"a@example.com","password":"pw","returnSecureToken":true}"#);
}

// =============================================================================
// AuthResponse
// =============================================================================

#[test]
fn sign_in_response_deserializes() {
    let json = r#"{
        "kind": "identitytoolkit#VerifyPasswordResponse",
        "localId": "uid-1",
        "email": "a@example.com",
        "displayName": "",
        "idToken": "tok",
        "registered": true,
        "refreshToken": "refresh",
        "expiresIn": "3600"
    }"#;
    let resp: AuthResponse = serde_json::from_str(json).unwrap();
    assert_eq!(resp.local_id, "uid-1");
    assert_eq!(resp.id_token, "tok");
    assert_eq!(resp.expires_in, "3600");
    assert_eq!(resp.registered, Some(true));
}

#[test]
fn sign_up_response_without_registered() {
    let json = r#"{
        "kind": "identitytoolkit#SignupNewUserResponse",
        "idToken": "tok",
        "email": "b@example.com",
        "refreshToken": "r",
        "expiresIn": "3600",
        "localId": "uid-2"
    }"#;
    let resp: AuthResponse = serde_json::from_str(json).unwrap();
    assert_eq!(resp.local_id, "uid-2");
    assert!(resp.registered.is_none());
}

#[test]
fn response_missing_local_id_fails() {
    let json = r#"{"idToken": "tok", "email": "b@example.com", "expiresIn": "3600"}"#;
    assert!(serde_json::from_str::<AuthResponse>(json).is_err());
}

// =============================================================================
// IdentityError
// =============================================================================

#[test]
fn provider_code_only_for_rejections() {
    let rejected = IdentityError::Rejected { status: 400, code: "EMAIL_EXISTS".into(), message: String::new() };
    assert_eq!(rejected.provider_code(), Some("EMAIL_EXISTS"));
    assert_eq!(IdentityError::Request("boom".into()).provider_code(), None);
}

#[test]
fn rejection_retryable_only_for_throttle_and_server_errors() {
    let throttled =
        IdentityError::Rejected { status: 429, code: "TOO_MANY_ATTEMPTS_TRY_LATER".into(), message: String::new() };
    let invalid = IdentityError::Rejected { status: 400, code: "INVALID_PASSWORD".into(), message: String::new() };
    assert!(throttled.retryable());
    assert!(!invalid.retryable());
    assert!(!IdentityError::Parse("bad".into()).retryable());
}

#[test]
fn error_envelope_deserializes() {
    let json = r#"{"error":{"code":400,"message":"EMAIL_NOT_FOUND","errors":[{"message":"EMAIL_NOT_FOUND","domain":"global","reason":"invalid"}]}}"#;
    let env: ErrorEnvelope = serde_json::from_str(json).unwrap();
    assert_eq!(env.error.message, "EMAIL_NOT_FOUND");
}
