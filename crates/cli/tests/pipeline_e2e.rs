// End-to-end pipeline tests: in-memory source and scorer, then a real
// HTTP round trip against a mock scoring service.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::fs;

use httpmock::prelude::*;
use scorebridge_cli::{enrich, run_pipeline};
use scorebridge_config::Settings;
use scorebridge_core::{record_from_value, Record};
use scorebridge_io::{RecordSource, SourceError};
use scorebridge_recon::MergeStrategy;
use scorebridge_scoring_client::{ScoredChunk, Scorer, ScoringClient, ScoringError};
use serde_json::{json, Value};
use tempfile::tempdir;

struct VecSource(Vec<Record>);

impl RecordSource for VecSource {
    fn describe(&self) -> String {
        "memory".into()
    }

    fn fetch(&self) -> Result<Vec<Record>, SourceError> {
        Ok(self.0.clone())
    }
}

/// Replays canned responses, one per call.
struct ScriptedScorer {
    responses: RefCell<VecDeque<Value>>,
    requests: RefCell<Vec<Vec<Record>>>,
}

impl ScriptedScorer {
    fn new(responses: Vec<Value>) -> Self {
        Self {
            responses: RefCell::new(responses.into()),
            requests: RefCell::new(Vec::new()),
        }
    }
}

impl Scorer for ScriptedScorer {
    fn score(&self, chunk: &[Record]) -> Result<ScoredChunk, ScoringError> {
        self.requests.borrow_mut().push(chunk.to_vec());
        let body = self.responses.borrow_mut().pop_front().unwrap_or(json!([]));
        let records = match body {
            Value::Array(items) => items.into_iter().map(record_from_value).collect(),
            _ => panic!("scripted responses are arrays"),
        };
        Ok(ScoredChunk { records, requested: chunk.len() })
    }
}

fn three_applications() -> Vec<Record> {
    vec![
        record_from_value(json!({"id_solicitud": 10, "id_cliente": 1, "monto_solicitado": 100, "edad": 30})),
        record_from_value(json!({"id_solicitud": 11, "id_cliente": 2, "monto_solicitado": 200, "edad": 41})),
        record_from_value(json!({"id_solicitud": 12, "id_cliente": 3, "monto_solicitado": 300, "edad": 52})),
    ]
}

#[test]
fn two_chunks_merge_back_in_source_order() {
    let scorer = ScriptedScorer::new(vec![
        json!([
            {"id_cliente": 1, "score": 0.2, "decision": "approved"},
            {"id_cliente": 2, "score": 0.7, "decision": "0"},
        ]),
        json!([{"id_cliente": 3, "score": 0.5, "decision": "rechazado"}]),
    ]);

    let out = enrich(&three_applications(), 2, &scorer).unwrap();

    let sizes: Vec<usize> = scorer.requests.borrow().iter().map(Vec::len).collect();
    assert_eq!(sizes, vec![2, 1]);
    assert_eq!(out.chunks, 2);
    assert_eq!(out.summary.strategy, MergeStrategy::Key);

    let decisions: Vec<&Value> = out.records.iter().map(|r| r.get("decision").unwrap()).collect();
    assert_eq!(decisions, vec![&json!("Aprobado"), &json!("Rechazado"), &json!("Rechazado")]);

    let amounts: Vec<&Value> = out.records.iter().map(|r| r.get("monto_solicitado").unwrap()).collect();
    assert_eq!(amounts, vec![&json!(100), &json!(200), &json!(300)]);
    assert_eq!(out.records[0].get("score_riesgo"), Some(&json!(0.2)));
    assert_eq!(out.records[1].get("decision_legacy"), Some(&json!("0")));
}

#[test]
fn results_out_of_order_still_land_on_their_keys() {
    let scorer = ScriptedScorer::new(vec![json!([
        {"id_cliente": 3, "score_riesgo": 0.9},
        {"id_cliente": 1, "score_riesgo": 0.1},
        {"id_cliente": 2, "score_riesgo": 0.4},
    ])]);

    let out = enrich(&three_applications(), 10, &scorer).unwrap();
    let ids: Vec<&Value> = out.records.iter().map(|r| r.get("id_cliente").unwrap()).collect();
    assert_eq!(ids, vec![&json!(1), &json!(2), &json!(3)]);
    assert_eq!(out.records[2].get("score_riesgo"), Some(&json!(0.9)));
    assert!(out.records[0].get("decision").is_none());
}

#[test]
fn keyless_results_of_wrong_length_abort_before_writing() {
    let dir = tempdir().unwrap();
    let mut settings = Settings::default();
    settings.pipeline.batch_size = 5;
    settings.output.path = dir.path().join("docs").join("data.json");

    let scorer = ScriptedScorer::new(vec![json!([{"score": 0.1}, {"score": 0.2}])]);
    let err = run_pipeline(&settings, &VecSource(three_applications()), &scorer).unwrap_err();

    assert_eq!(err.exit_code(), 63);
    assert!(!settings.output.path.exists());
}

#[test]
fn http_run_writes_projected_dashboard_file() {
    let server = MockServer::start();
    let first = server.mock(|when, then| {
        when.method(POST).path("/predict_batch").body_includes("\"id_cliente\":1");
        then.status(200).json_body(json!({
            "predicciones": [
                {"id_cliente": 1, "score_riesgo": 0.2, "decision": "Aprobado"},
                {"id_cliente": 2, "score_riesgo": 0.7, "decision": "Rechazado"},
            ]
        }));
    });
    let second = server.mock(|when, then| {
        when.method(POST).path("/predict_batch").body_includes("\"id_cliente\":3");
        then.status(200).json_body(json!([
            {"id_cliente": 3, "score_riesgo": 0.5, "decision": "no"},
        ]));
    });

    let dir = tempdir().unwrap();
    let mut settings = Settings::default();
    settings.pipeline.batch_size = 2;
    settings.output.path = dir.path().join("docs").join("data.json");

    let source = VecSource(vec![
        record_from_value(json!({"id_solicitud": 10, "id_cliente": "1", "sexo": "m", "comuna": " Ñuñoa ", "deuda_total": 5})),
        record_from_value(json!({"id_solicitud": 11, "id_cliente": 2, "sexo": "F", "edad": null})),
        record_from_value(json!({"id_solicitud": 12, "id_cliente": 3, "sexo": "x"})),
    ]);
    let client = ScoringClient::new(server.url("/predict_batch")).unwrap();

    let report = run_pipeline(&settings, &source, &client).unwrap();

    first.assert();
    second.assert();
    assert_eq!(report.extracted, 3);
    assert_eq!(report.chunks, 2);
    assert_eq!(report.results, 3);
    assert_eq!(report.unmatched, 0);
    assert_eq!(report.written, 3);

    let written: Vec<Value> = serde_json::from_str(&fs::read_to_string(&settings.output.path).unwrap()).unwrap();
    assert_eq!(written.len(), 3);
    assert_eq!(written[0]["id_cliente"], json!(1));
    assert_eq!(written[0]["sexo"], json!("M"));
    assert_eq!(written[0]["comuna"], json!("Ñuñoa"));
    assert_eq!(written[0]["decision"], json!("Aprobado"));
    assert!(written[0].get("deuda_total").is_none(), "deuda_total is not a dashboard column");
    assert_eq!(written[1]["edad"], json!(-1));
    assert_eq!(written[2]["sexo"], json!("NA"));
    assert_eq!(written[2]["decision"], json!("Rechazado"));
    assert_eq!(written[2]["etnia"], json!("No Informado"));
}

#[test]
fn remote_failure_on_later_chunk_leaves_no_output() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path("/predict_batch").body_includes("\"id_cliente\":1");
        then.status(200).json_body(json!([{"id_cliente": 1, "score_riesgo": 0.2}]));
    });
    server.mock(|when, then| {
        when.method(POST).path("/predict_batch").body_includes("\"id_cliente\":2");
        then.status(500).body("internal error");
    });

    let dir = tempdir().unwrap();
    let mut settings = Settings::default();
    settings.pipeline.batch_size = 1;
    settings.output.path = dir.path().join("data.json");

    let source = VecSource(three_applications());
    let client = ScoringClient::new(server.url("/predict_batch")).unwrap();
    let err = run_pipeline(&settings, &source, &client).unwrap_err();

    assert_eq!(err.exit_code(), 61);
    assert!(err.to_string().contains("chunk 2/3"));
    assert!(err.to_string().contains("internal error"));
    assert!(!settings.output.path.exists());
}
