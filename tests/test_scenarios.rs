mod common;

use common::*;
use vibecheck::{AnalyzerConfig, DecodeError, Response};

fn analyzer_with(detections: Vec<RawDetection>) -> Analyzer {
    Analyzer::new(DetectorState::with_detector(FixedDetector::new(detections)))
}

fn all_suggestions() -> Vec<String> {
    CanonicalLabel::ALL
        .into_iter()
        .filter_map(vibecheck::suggestions::suggestion_for)
        .map(str::to_string)
        .collect()
}

#[test]
fn test_blank_frame_without_model() -> anyhow::Result<()> {
    let analyzer = Analyzer::new(DetectorState::unavailable());
    let record = analyzer.analyze_image_bytes(&encode_png(&blank_frame(BACKDROP)))?;

    assert!(record.detected.is_empty());
    assert!(record.labels.is_empty());
    assert_eq!(record.score, 0);
    assert_eq!(record.suggestions, all_suggestions());
    assert!(!record.ready);

    Ok(())
}

#[test]
fn test_blank_frame_with_model() -> anyhow::Result<()> {
    let analyzer = analyzer_with(Vec::new());
    let record = analyzer.analyze_image_bytes(&encode_png(&blank_frame(BACKDROP)))?;

    assert!(record.detected.is_empty());
    assert_eq!(record.score, 0);
    assert_eq!(record.suggestions.len(), 5);
    assert!(record.ready);

    Ok(())
}

#[test]
fn test_book_is_scored() -> anyhow::Result<()> {
    let analyzer = analyzer_with(vec![raw(
        "book",
        0.65,
        BoundingBox::new(100.0, 100.0, 250.0, 200.0),
    )]);
    let record = analyzer.analyze(&blank_frame(BACKDROP));

    assert_eq!(record.detected.len(), 1);
    assert_eq!(record.detected[0].name, "book");
    assert_eq!(record.detected[0].label, CanonicalLabel::Books);
    assert_eq!(record.detected[0].confidence, 0.65);
    assert_eq!(record.labels, vec![CanonicalLabel::Books]);
    assert_eq!(record.score, 65);
    assert_eq!(record.suggestions.len(), 4);
    assert!(
        !record
            .suggestions
            .iter()
            .any(|s| s.as_str() == "Show a book (feminist lit even better)")
    );

    Ok(())
}

#[test]
fn test_book_with_extreme_shape_is_rejected() -> anyhow::Result<()> {
    let analyzer = analyzer_with(vec![raw(
        "book",
        0.65,
        BoundingBox::new(100.0, 100.0, 500.0, 200.0),
    )]);
    let record = analyzer.analyze(&blank_frame(BACKDROP));

    assert!(record.detected.is_empty());
    assert_eq!(record.score, 0);
    assert_eq!(record.suggestions.len(), 5);

    Ok(())
}

#[test]
fn test_green_cup_is_matcha() -> anyhow::Result<()> {
    let analyzer = analyzer_with(vec![raw(
        "cup",
        0.8,
        BoundingBox::new(100.0, 100.0, 200.0, 200.0),
    )]);
    let record = analyzer.analyze(&drink_frame(20));

    assert_eq!(record.labels, vec![CanonicalLabel::Matcha]);
    assert_eq!(record.score, 80);
    assert_eq!(record.detected[0].name, "cup");

    Ok(())
}

#[test]
fn test_cup_without_enough_green_is_rejected() -> anyhow::Result<()> {
    let analyzer = analyzer_with(vec![raw(
        "cup",
        0.8,
        BoundingBox::new(100.0, 100.0, 200.0, 200.0),
    )]);

    assert!(analyzer.analyze(&drink_frame(10)).detected.is_empty());
    assert!(analyzer.analyze(&drink_frame(0)).detected.is_empty());

    Ok(())
}

#[test]
fn test_confidence_floors() -> anyhow::Result<()> {
    let bbox = BoundingBox::new(100.0, 100.0, 200.0, 200.0);
    let analyzer = analyzer_with(vec![
        raw("teddy bear", 0.5, bbox),
        raw("book", 0.55, bbox),
        raw("cup", 0.65, bbox),
        raw("person", 0.99, bbox),
    ]);
    let record = analyzer.analyze(&drink_frame(100));

    assert_eq!(record.labels, vec![CanonicalLabel::Plushie]);
    assert_eq!(record.score, 50);

    Ok(())
}

#[test]
fn test_duplicates_score_best_confidence_once() -> anyhow::Result<()> {
    let bbox = BoundingBox::new(100.0, 100.0, 250.0, 200.0);
    let analyzer = analyzer_with(vec![raw("book", 0.65, bbox), raw("book", 0.9, bbox)]);
    let record = analyzer.analyze(&blank_frame(BACKDROP));

    assert_eq!(record.detected.len(), 2);
    assert_eq!(record.labels, vec![CanonicalLabel::Books]);
    assert_eq!(record.score, 90);
    assert_eq!(record.best_confidences().get(&CanonicalLabel::Books), Some(&0.9));
    assert_eq!(record.label_set().len(), 1);

    Ok(())
}

#[test]
fn test_score_is_capped() -> anyhow::Result<()> {
    let bbox = BoundingBox::new(100.0, 100.0, 200.0, 200.0);
    let analyzer = analyzer_with(vec![
        raw("teddy bear", 0.9, bbox),
        raw("book", 0.9, bbox),
        raw("cup", 0.9, bbox),
    ]);
    let record = analyzer.analyze(&drink_frame(100));

    assert_eq!(
        record.labels,
        vec![
            CanonicalLabel::Books,
            CanonicalLabel::Matcha,
            CanonicalLabel::Plushie
        ]
    );
    assert_eq!(record.score, 100);
    assert_eq!(
        record.suggestions,
        vec![
            "Show a camera".to_string(),
            "Wear wired earphones (visible in the upper frame)".to_string(),
        ]
    );

    Ok(())
}

#[test]
fn test_failing_model_keeps_ready() -> anyhow::Result<()> {
    let state = DetectorState::with_detector(FailingDetector);
    assert!(state.detect(&blank_frame(BACKDROP)).is_degraded());

    let analyzer = Analyzer::new(state);
    let record = analyzer.analyze(&blank_frame(BACKDROP));

    assert!(record.ready);
    assert!(record.detected.is_empty());
    assert_eq!(record.score, 0);

    Ok(())
}

#[test]
fn test_unavailable_outcome() -> anyhow::Result<()> {
    let state = DetectorState::unavailable();
    let outcome = state.detect(&blank_frame(BACKDROP));

    assert_eq!(outcome, DetectorOutcome::Unavailable);
    assert!(outcome.detections().is_empty());
    assert_eq!(state.backend_name(), None);

    Ok(())
}

#[test]
fn test_data_url_payload() -> anyhow::Result<()> {
    let analyzer = analyzer_with(vec![raw(
        "book",
        0.65,
        BoundingBox::new(100.0, 100.0, 250.0, 200.0),
    )]);
    let record = analyzer.analyze_payload(&data_url(&blank_frame(BACKDROP)))?;

    assert_eq!(record.score, 65);

    Ok(())
}

#[test]
fn test_line_wrapped_payload() -> anyhow::Result<()> {
    let analyzer = analyzer_with(vec![raw(
        "book",
        0.65,
        BoundingBox::new(100.0, 100.0, 250.0, 200.0),
    )]);
    let encoded = base64::Engine::encode(
        &base64::engine::general_purpose::STANDARD,
        encode_png(&blank_frame(BACKDROP)),
    );
    let wrapped: Vec<String> = encoded
        .as_bytes()
        .chunks(76)
        .map(|line| String::from_utf8_lossy(line).into_owned())
        .collect();
    let payload = format!("data:image/png;base64,{}\n", wrapped.join("\n"));
    assert!(wrapped.len() > 1);

    let record = analyzer.analyze_payload(payload.as_bytes())?;
    assert_eq!(record.score, 65);

    Ok(())
}

#[test]
fn test_invalid_config_leaves_model_unloaded() -> anyhow::Result<()> {
    let config = AnalyzerConfig {
        model_path: Some("does-not-exist.rten".into()),
        input_size: 0,
        ..AnalyzerConfig::default()
    };
    let state = DetectorState::load(&config);

    assert!(!state.is_ready());
    assert_eq!(state.detect(&blank_frame(BACKDROP)), DetectorOutcome::Unavailable);

    Ok(())
}

#[test]
fn test_undecodable_payloads() -> anyhow::Result<()> {
    let analyzer = analyzer_with(Vec::new());

    assert!(matches!(
        analyzer.analyze_payload(b"data:image/png;base64,"),
        Err(DecodeError::Empty)
    ));
    assert!(matches!(
        analyzer.analyze_payload(b"data:image/png;base64,@@@@"),
        Err(DecodeError::Base64(_))
    ));
    assert!(matches!(
        analyzer.analyze_image_bytes(b"definitely not an image"),
        Err(DecodeError::Image(_))
    ));

    Ok(())
}

#[test]
fn test_analysis_is_repeatable() -> anyhow::Result<()> {
    let analyzer = analyzer_with(vec![
        raw("book", 0.65, BoundingBox::new(100.0, 100.0, 250.0, 200.0)),
        raw("cup", 0.8, BoundingBox::new(100.0, 100.0, 200.0, 200.0)),
    ]);
    let payload = data_url(&drink_frame(20));

    let first = serde_json::to_string(&Response::success(analyzer.analyze_payload(&payload)?))?;
    let second = serde_json::to_string(&Response::success(analyzer.analyze_payload(&payload)?))?;
    assert_eq!(first, second);

    Ok(())
}

#[test]
fn test_response_json() -> anyhow::Result<()> {
    let analyzer = analyzer_with(vec![raw(
        "book",
        0.65,
        BoundingBox::new(100.0, 100.0, 250.0, 200.0),
    )]);
    let record = analyzer.analyze(&blank_frame(BACKDROP));
    let value = serde_json::to_value(Response::success(record))?;

    assert_eq!(value["ok"], true);
    assert!(value.get("error").is_none());
    assert_eq!(value["labels"], serde_json::json!(["Books"]));
    assert_eq!(value["score"], 65);
    assert_eq!(value["ready"], true);
    assert_eq!(value["detected"][0]["label"], "Books");
    assert_eq!(value["detected"][0]["confidence"], 0.65);

    let failure = serde_json::to_value(Response::failure(DecodeError::Empty, true))?;
    assert_eq!(failure["ok"], false);
    assert!(failure["error"].is_string());
    assert_eq!(failure["score"], 0);
    assert_eq!(failure["suggestions"], serde_json::json!([]));

    Ok(())
}

#[test]
fn test_heuristic_result_joins_record() -> anyhow::Result<()> {
    use vibecheck::EarphoneDetection;
    use vibecheck::analyzer::{build_record, earphone_detection};

    let weak = EarphoneDetection {
        detected: true,
        confidence: 0.65,
    };
    assert!(earphone_detection(&weak).is_none());
    assert!(earphone_detection(&EarphoneDetection::not_detected()).is_none());

    let strong = EarphoneDetection {
        detected: true,
        confidence: 0.8123,
    };
    let detection = earphone_detection(&strong).ok_or_else(|| anyhow::anyhow!("rejected"))?;
    assert_eq!(detection.name, "wired earphones");
    assert_eq!(detection.label, CanonicalLabel::WiredEarphones);
    assert_eq!(detection.confidence, 0.812);

    let record = build_record(vec![detection], true);
    assert_eq!(record.labels, vec![CanonicalLabel::WiredEarphones]);
    assert_eq!(record.score, 81);
    assert_eq!(record.suggestions.len(), 4);

    let value = serde_json::to_value(&record)?;
    assert_eq!(value["labels"], serde_json::json!(["Wired Earphones"]));

    Ok(())
}
