use super::*;

#[test]
fn model_type_wire_names() {
    assert_eq!(serde_json::to_value(ModelType::CountGd).unwrap(), "countgd");
    assert_eq!(serde_json::to_value(ModelType::Yolo).unwrap(), "yolo");
    assert_eq!(serde_json::to_value(ModelType::RfDetr).unwrap(), "rfdetr");
}

#[test]
fn detect_params_defaults() {
    let p = DetectParams::default();
    assert_eq!(p.model_type, ModelType::CountGd);
    assert!((p.confidence_thresh - 0.35).abs() < 1e-12);
    assert!(!p.tiled);
}

#[test]
fn countgd_requires_prompt() {
    let p = DetectParams { text_prompt: Some("   ".into()), ..DetectParams::default() };
    assert!(matches!(p.validate(), Err(ApiError::InvalidParams(_))));
}

#[test]
fn countgd_prompt_is_trimmed() {
    let p = DetectParams { text_prompt: Some("  car  ".into()), ..DetectParams::default() };
    assert_eq!(p.validate().unwrap(), "car");
}

#[test]
fn closed_set_model_requires_file() {
    let p = DetectParams { model_type: ModelType::Yolo, text_prompt: Some("car".into()), ..DetectParams::default() };
    let err = p.validate().unwrap_err().to_string();
    assert!(err.contains("model file"));
}

#[test]
fn closed_set_model_sends_placeholder_prompt() {
    let p = DetectParams {
        model_type: ModelType::RfDetr,
        model_filename: Some("weights.pt".into()),
        ..DetectParams::default()
    };
    assert_eq!(p.validate().unwrap(), "detected_object");
}

#[test]
fn detect_params_deserialize_partial() {
    let p: DetectParams = serde_json::from_str(r#"{"model_type":"yolo","model_filename":"m.pt"}"#).unwrap();
    assert_eq!(p.model_type, ModelType::Yolo);
    assert_eq!(p.model_filename.as_deref(), Some("m.pt"));
    assert!((p.confidence_thresh - DEFAULT_CONFIDENCE_THRESH).abs() < 1e-12);
}
