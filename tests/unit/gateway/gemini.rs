use super::*;

fn settings() -> GatewaySettings {
    GatewaySettings::default()
}

fn text_answer(text: &str) -> Value {
    json!({
        "candidates": [{
            "content": { "parts": [{ "text": text }] }
        }]
    })
}

#[test]
fn detect_request_carries_image_prompt_and_schema() {
    let req = build_detect_request(&[1, 2, 3], "image/jpeg");
    let parts = &req["contents"][0]["parts"];
    assert_eq!(parts[0]["inlineData"]["mimeType"], json!("image/jpeg"));
    assert_eq!(parts[0]["inlineData"]["data"], json!("AQID"));
    assert!(parts[1]["text"].as_str().unwrap().contains("bounding box"));
    assert_eq!(
        req["generationConfig"]["responseMimeType"],
        json!("application/json")
    );
    assert_eq!(
        req["generationConfig"]["responseSchema"]["required"],
        json!(["x", "y", "width", "height"])
    );
}

#[test]
fn enhance_request_asks_for_image_modality() {
    let req = build_enhance_request(&[1, 2, 3], "image/png", "make it epic");
    assert_eq!(
        req["generationConfig"]["responseModalities"],
        json!(["IMAGE"])
    );
    assert_eq!(req["contents"][0]["parts"][1]["text"], json!("make it epic"));
}

#[test]
fn detect_response_parses_box() {
    let v = text_answer(r#"{"x":0.4,"y":0.3,"width":0.2,"height":0.25}"#);
    let b = parse_detect_response(&v).unwrap();
    assert_eq!(b, BoundingBox::new(0.4, 0.3, 0.2, 0.25).unwrap());
}

#[test]
fn detect_response_tolerates_code_fence() {
    let v = text_answer("```json\n{\"x\":0.1,\"y\":0.1,\"width\":0.5,\"height\":0.5}\n```");
    assert!(parse_detect_response(&v).is_some());
}

#[test]
fn detect_no_face_signals_are_none() {
    assert!(parse_detect_response(&text_answer(r#"{"x":0,"y":0,"width":0,"height":0}"#)).is_none());
    assert!(parse_detect_response(&text_answer("   ")).is_none());
    assert!(parse_detect_response(&text_answer("not json")).is_none());
    assert!(parse_detect_response(&text_answer(r#"{"x":0.1}"#)).is_none());
    assert!(parse_detect_response(&json!({})).is_none());
    assert!(parse_detect_response(&json!({ "candidates": [] })).is_none());
}

#[test]
fn enhance_response_extracts_first_inline_image() {
    let v = json!({
        "candidates": [{
            "content": {
                "parts": [
                    { "text": "Here you go." },
                    { "inlineData": { "mimeType": "image/png", "data": "AQID" } },
                    { "inlineData": { "mimeType": "image/png", "data": "BAUG" } }
                ]
            }
        }]
    });
    let img = parse_enhance_response(&v, "image/jpeg").unwrap();
    assert_eq!(img.bytes, vec![1, 2, 3]);
    assert_eq!(img.mime_type, "image/png");
}

#[test]
fn enhance_response_without_image_is_hard_failure() {
    let err = parse_enhance_response(&text_answer("I cannot do that"), "image/png").unwrap_err();
    assert!(matches!(err, FrameError::Enhancement(_)));
    assert!(err.to_string().contains("no image was generated"));

    let bad = json!({
        "candidates": [{ "content": { "parts": [{ "inlineData": { "data": "%%%" } }] } }]
    });
    assert!(matches!(
        parse_enhance_response(&bad, "image/png"),
        Err(FrameError::Enhancement(_))
    ));
}

#[test]
fn enhance_response_falls_back_to_request_mime() {
    let v = json!({
        "candidates": [{ "content": { "parts": [{ "inline_data": { "data": "AQID" } }] } }]
    });
    assert_eq!(parse_enhance_response(&v, "image/jpeg").unwrap().mime_type, "image/jpeg");
}

#[test]
fn config_prefers_settings_then_gemini_key_then_api_key() {
    let mut s = settings();
    let env = |name: &str| match name {
        "GEMINI_API_KEY" => Some("from-gemini".to_string()),
        "API_KEY" => Some("from-api".to_string()),
        _ => None,
    };
    assert_eq!(GeminiConfig::resolve(&s, env).unwrap().api_key, "from-gemini");

    let only_api = |name: &str| (name == "API_KEY").then(|| "from-api".to_string());
    assert_eq!(GeminiConfig::resolve(&s, only_api).unwrap().api_key, "from-api");

    s.api_key = Some("from-config".to_string());
    assert_eq!(GeminiConfig::resolve(&s, env).unwrap().api_key, "from-config");
}

#[test]
fn config_without_key_is_error() {
    let err = GeminiConfig::resolve(&settings(), |_| None).unwrap_err();
    assert!(matches!(err, FrameError::Config(_)));
}

#[test]
fn config_base_url_defaults_and_trims() {
    let key = |name: &str| (name == "GEMINI_API_KEY").then(|| "k".to_string());
    let c = GeminiConfig::resolve(&settings(), key).unwrap();
    assert_eq!(c.base_url, DEFAULT_BASE_URL);
    assert_eq!(c.detect_model, DEFAULT_DETECT_MODEL);
    assert_eq!(c.enhance_model, DEFAULT_ENHANCE_MODEL);

    let mut s = settings();
    s.base_url = Some("http://localhost:8080/v1beta/".to_string());
    assert_eq!(
        GeminiConfig::resolve(&s, key).unwrap().base_url,
        "http://localhost:8080/v1beta"
    );

    s.base_url = Some("localhost".to_string());
    assert!(GeminiConfig::resolve(&s, key).is_err());
}

#[test]
fn debug_output_redacts_api_key() {
    let key = |name: &str| (name == "GEMINI_API_KEY").then(|| "super-secret".to_string());
    let c = GeminiConfig::resolve(&settings(), key).unwrap();
    assert!(!format!("{c:?}").contains("super-secret"));
}

#[test]
fn config_trims_api_key() {
    let key = |name: &str| (name == "GEMINI_API_KEY").then(|| "  abc123\n".to_string());
    assert_eq!(GeminiConfig::resolve(&settings(), key).unwrap().api_key, "abc123");
}

#[test]
fn config_rejects_key_not_valid_as_header() {
    let mut s = settings();
    s.api_key = Some("abc\n123".to_string());
    let err = GeminiConfig::resolve(&s, |_| None).unwrap_err();
    assert!(matches!(err, FrameError::Config(_)));
}
