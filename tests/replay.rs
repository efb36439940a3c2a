//! Scripted replay tests

use std::path::Path;

use highlight_overlay::replay::{ReplayScript, ReplaySession, Step};
use highlight_overlay::{OverlayConfig, OverlayError, UpdatePolicy};

const PDF_SCRIPT: &str = r#"
document:
  fingerprint: deadbeef
  title: Paper
  format: pdf
  pages: 3
  scale: 1.5
steps:
  - op: load
  - op: mutate
    type: INITIAL
    page: 2
    highlight:
      id: a
      rects:
        "0": { left: 10, top: 10, width: 50, height: 20 }
        "1": { left: 10, top: 40, width: 30, height: 20 }
  - op: mutate
    type: set
    page: 3
    highlight:
      id: b
      rects:
        "0": { left: 0, top: 0, width: 10, height: 10 }
  - op: redraw
  - op: zoom
    scale: 2.0
"#;

fn load(script: &str, name: &str, config: &OverlayConfig) -> (ReplayScript, ReplaySession) {
    let script = ReplayScript::parse(script, Path::new(name)).unwrap();
    let session = ReplaySession::new(script.document.clone(), config);
    (script, session)
}

fn run(session: &ReplaySession, steps: &[Step]) {
    for step in steps {
        session.apply(step).unwrap();
    }
}

#[test]
fn test_pdf_script_summary() {
    let (script, session) = load(PDF_SCRIPT, "paper.yaml", &OverlayConfig::default());
    run(&session, &script.steps);

    let summary = session.summary();
    assert_eq!(summary.fingerprint, "deadbeef");
    assert_eq!(summary.format, "pdf");
    // a: 2 rects rendered on set, redraw, zoom; b: 1 rect likewise
    assert_eq!(summary.overlays, 9);
    assert_eq!(summary.redraw_registrations, 3);
    let ids: Vec<&str> = summary.highlights.iter().map(|h| h.id.as_str()).collect();
    assert_eq!(ids, vec!["a", "b"]);
    assert_eq!(summary.highlights[0].overlays, 6);
    assert_eq!(summary.highlights[0].registrations, 2);
}

#[test]
fn test_zoom_rerenders_at_new_scale() {
    let (script, session) = load(PDF_SCRIPT, "paper.yaml", &OverlayConfig::default());
    run(&session, &script.steps);

    let html = session.to_html();
    // left 10 at scale 1.5 then 2.0
    assert!(html.contains("left: 15px"));
    assert!(html.contains("left: 20px"));
    assert!(html.contains("width: 100px"));
}

#[test]
fn test_replace_policy_collapses_repeats() {
    let config = OverlayConfig {
        update_policy: UpdatePolicy::Replace,
        ..OverlayConfig::default()
    };
    let script = r#"
document: { fingerprint: fp, format: html }
steps:
  - op: load
  - op: mutate
    type: INITIAL
    page: 1
    highlight: { id: x, rects: { "0": { left: 1, top: 1, width: 1, height: 1 } } }
  - op: mutate
    type: SET
    page: 1
    highlight: { id: x, rects: { "0": { left: 2, top: 2, width: 2, height: 2 } } }
"#;
    let (script, session) = load(script, "replace.yml", &config);
    run(&session, &script.steps);

    let summary = session.summary();
    assert_eq!(summary.overlays, 1);
    assert!(session.to_html().contains("left: 2px"));
}

#[test]
fn test_delete_step_clears_highlight() {
    let json = r#"{
        "document": {"fingerprint": "fp", "format": "html", "pages": 1},
        "steps": [
            {"op": "load"},
            {"op": "mutate", "type": "INITIAL", "page": 1,
             "highlight": {"id": "a", "rects": {"0": {"left": 10, "top": 10, "width": 50, "height": 20}}}},
            {"op": "redraw", "page": 1},
            {"op": "delete", "page": 1, "id": "a"},
            {"op": "redraw"}
        ]
    }"#;
    let (script, session) = load(json, "clear.json", &OverlayConfig::default());
    run(&session, &script.steps);

    let summary = session.summary();
    assert_eq!(summary.overlays, 0);
    assert_eq!(summary.redraw_registrations, 0);
    assert!(!session.to_html().contains("text-highlight"));
}

#[test]
fn test_unknown_mutation_type_stops_replay() {
    let script = r#"
document: { fingerprint: fp, format: html }
steps:
  - op: load
  - op: mutate
    type: UPSERT
    page: 1
    highlight: { id: a, rects: { "0": { left: 1, top: 1, width: 1, height: 1 } } }
"#;
    let (script, session) = load(script, "bad.yaml", &OverlayConfig::default());
    session.apply(&script.steps[0]).unwrap();

    assert_eq!(
        session.apply(&script.steps[1]),
        Err(OverlayError::InvalidMutationType("UPSERT".to_string()))
    );
    assert_eq!(session.summary().overlays, 0);
}

#[test]
fn test_mutation_before_load_is_rejected() {
    let script = r#"
document: { fingerprint: fp, format: html }
steps:
  - op: delete
    page: 1
    id: a
"#;
    let (script, session) = load(script, "early.yaml", &OverlayConfig::default());
    assert_eq!(
        session.apply(&script.steps[0]),
        Err(OverlayError::UnknownDocument("fp".to_string()))
    );
}

#[test]
fn test_malformed_script_is_reported() {
    let err = ReplayScript::parse("document: [1, 2]", Path::new("x.yaml")).unwrap_err();
    assert!(err.starts_with("Invalid YAML script"));
    let err = ReplayScript::parse("{", Path::new("x.json")).unwrap_err();
    assert!(err.starts_with("Invalid JSON script"));
}
