use std::fs;
use tempfile::TempDir;

use deskroute_cli::batch::{intent_matches, parse_queries, run_batch, TestQuery};
use deskroute_cli::report::{render_answer, render_info, AskOutput};
use deskroute_cli::{App, AppOptions, DEFAULT_LOG_FILTER};
use deskroute_core::config::Settings;
use deskroute_core::traits::ResponseEvaluator;
use deskroute_core::types::{AnswerPath, Domain, Evaluation};
use tracing_subscriber::EnvFilter;

struct FixedEvaluator;

impl ResponseEvaluator for FixedEvaluator {
    fn evaluate(&self, _query: &str, _answer: &str) -> anyhow::Result<Evaluation> {
        Ok(Evaluation {
            relevance: 8.0,
            relevance_comment: "on topic".into(),
            completeness: 6.0,
            completeness_comment: "partial".into(),
            accuracy: 7.0,
            accuracy_comment: "grounded".into(),
            overall_score: 7.0,
        })
    }
}

fn offline_app(tmp: &TempDir) -> App {
    let root = tmp.path();
    fs::create_dir_all(root.join("hr_docs")).unwrap();
    fs::create_dir_all(root.join("tech_docs")).unwrap();
    fs::write(root.join("hr_docs/leave_policy.md"), "# Leave Policy\n\nEmployees receive 20 vacation days per year.\n").unwrap();
    fs::write(root.join("tech_docs/vpn.md"), "VPN Access\nInstall the VPN client. Sign in with your company account.\n").unwrap();
    // finance_docs is left missing on purpose

    let mut settings = Settings::default();
    settings.data.root = root.display().to_string();
    settings.retrieval.min_chunks_warning = 0;
    App::from_settings(settings, &AppOptions { offline: true, top_k: Some(3), no_evaluate: false }).expect("app")
}

#[test]
fn offline_app_answers_from_local_corpora() {
    let tmp = TempDir::new().unwrap();
    let app = offline_app(&tmp);
    assert!(!app.orchestrator.has_generator());
    assert!(!app.has_evaluator());
    assert_eq!(app.orchestrator.top_k(), 3);

    let response = app.orchestrator.answer("How many vacation days do I get?").expect("answer");
    assert_eq!(response.answers[0].path, AnswerPath::Fallback);
    assert!(app.evaluate(&response).is_none());

    let text = render_answer(&response, None);
    assert!(text.starts_with("Intent: HR\nPath: HR=fallback\nSources: leave_policy.md#0\n"));
    assert!(text.contains("Leave Policy:\n- Employees receive 20 vacation days per year."));
}

#[test]
fn missing_corpus_directory_answers_no_content() {
    let tmp = TempDir::new().unwrap();
    let app = offline_app(&tmp);
    let response = app.orchestrator.answer("Where do I send an invoice?").expect("answer");
    assert_eq!(response.domains(), vec![Domain::Finance]);
    assert!(response.text.contains("No relevant content was found in the Finance documentation"));
}

#[test]
fn json_output_flattens_the_response() {
    let tmp = TempDir::new().unwrap();
    let app = offline_app(&tmp);
    let response = app.orchestrator.answer("vpn access").expect("answer");
    let value = serde_json::to_value(AskOutput { response: &response, evaluation: None }).unwrap();
    assert_eq!(value["query"], "vpn access");
    assert_eq!(value["is_multi_domain"], false);
    assert_eq!(value["answers"][0]["domain"], "tech");
    assert_eq!(value["answers"][0]["path"], "fallback");
    assert!(value["evaluation"].is_null());
}

#[test]
fn info_lists_every_domain() {
    let tmp = TempDir::new().unwrap();
    let info = render_info(&offline_app(&tmp));
    assert!(info.contains("HR       hr_docs       chunks=1"));
    assert!(info.contains("Finance  finance_docs  chunks=0"));
    assert!(info.contains("Model: offline"));
    assert!(info.contains("generator=false classifier=false evaluator=false"));
}

#[test]
fn query_files_accept_all_layouts() {
    let labeled = parse_queries(r#"{"test_queries": [{"query": "reset vpn", "expected_intent": "Tech"}, "plain"]}"#).unwrap();
    assert_eq!(
        labeled,
        vec![
            TestQuery { query: "reset vpn".into(), expected_intent: Some("Tech".into()) },
            TestQuery { query: "plain".into(), expected_intent: None },
        ]
    );
    assert_eq!(parse_queries(r#"{"queries": [{"query": "q"}]}"#).unwrap().len(), 1);
    assert_eq!(parse_queries(r#"["a", "b"]"#).unwrap().len(), 2);
    assert!(parse_queries("not json").is_err());
}

#[test]
fn expected_intents_match_leniently() {
    assert!(intent_matches("Tech", "Tech"));
    assert!(intent_matches("finance", "Tech,Finance"));
    assert!(intent_matches("IT", "Tech"));
    assert!(intent_matches("Unknown", "Unclassified"));
    assert!(!intent_matches("HR", "Finance"));
}

#[test]
fn batch_run_reports_accuracy() {
    let tmp = TempDir::new().unwrap();
    let app = offline_app(&tmp);
    let queries = vec![
        TestQuery { query: "What is the vacation policy?".into(), expected_intent: Some("HR".into()) },
        TestQuery { query: "My laptop will not boot".into(), expected_intent: Some("Tech".into()) },
        TestQuery { query: "what is the weather today".into(), expected_intent: Some("Finance".into()) },
        TestQuery { query: "vpn".into(), expected_intent: None },
    ];
    let report = run_batch(&app, &queries);
    assert_eq!(report.total(), 4);
    assert_eq!(report.matches(), 2);
    assert!((report.accuracy() - 50.0).abs() < 1e-9);
    assert_eq!(report.outcomes[2].reported.as_deref(), Some("Unclassified"));
    assert_eq!(report.outcomes[2].matched, Some(false));
    assert_eq!(report.outcomes[3].matched, None);
    assert!(report.outcomes.iter().all(|o| o.evaluation.is_none()));
}

#[test]
fn evaluated_batch_writes_misclassifications() {
    let tmp = TempDir::new().unwrap();
    let app = offline_app(&tmp).with_evaluator(Box::new(FixedEvaluator));
    assert!(app.has_evaluator());
    let queries = vec![
        TestQuery { query: "What is the vacation policy?".into(), expected_intent: Some("HR".into()) },
        TestQuery { query: "vpn access".into(), expected_intent: Some("Finance".into()) },
        TestQuery { query: "what is the weather today".into(), expected_intent: Some("HR".into()) },
    ];
    let report = run_batch(&app, &queries);
    assert_eq!(report.outcomes[0].evaluation.as_ref().map(|e| e.overall_score), Some(7.0));
    // unclassified guidance is never scored
    assert!(report.outcomes[2].evaluation.is_none());

    let path = tmp.path().join("misclassifications.json");
    assert_eq!(report.write_misclassifications(&path).unwrap(), 2);
    let written: serde_json::Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
    let misses = written.as_array().unwrap();
    assert_eq!(misses.len(), 2);
    assert_eq!(misses[0]["id"], 2);
    assert_eq!(misses[0]["query"], "vpn access");
    assert_eq!(misses[0]["expected"], "Finance");
    assert_eq!(misses[0]["predicted"], "Tech");
    assert_eq!(misses[0]["evaluation"]["accuracy"], 7.0);
    assert_eq!(misses[1]["predicted"], "Unclassified");
    assert!(misses[1]["evaluation"].is_null());
}

#[test]
fn evaluation_is_rendered_after_the_answer() {
    let tmp = TempDir::new().unwrap();
    let app = offline_app(&tmp).with_evaluator(Box::new(FixedEvaluator));
    let response = app.orchestrator.answer("vpn access").expect("answer");
    let text = render_answer(&response, app.evaluate(&response).as_ref());
    assert!(text.ends_with("\n\nEvaluation: overall 7.0/10 (relevance 8, completeness 6, accuracy 7)\n"));
}

#[test]
fn default_log_filter_is_scoped_to_workspace_crates() {
    assert!(EnvFilter::try_new(DEFAULT_LOG_FILTER).is_ok());
    let directives: Vec<&str> = DEFAULT_LOG_FILTER.split(',').collect();
    assert!(directives.contains(&"deskroute=info"));
    assert!(!directives.contains(&"info"));
}

#[test]
fn bundled_queries_route_as_labelled() {
    // apps/deskroute-cli -> apps -> repo root
    let root = std::path::PathBuf::from(env!("CARGO_MANIFEST_DIR")).ancestors().nth(2).unwrap().to_path_buf();
    let mut settings = Settings::default();
    settings.data.root = root.join("data").display().to_string();
    let app = App::from_settings(settings, &AppOptions { offline: true, ..AppOptions::default() }).expect("app");
    assert!(app.corpora.iter().all(|c| !c.is_empty()));

    let queries = deskroute_cli::batch::load_queries(&root.join("tests/test_queries.json")).expect("queries");
    let report = run_batch(&app, &queries);
    let misses: Vec<&str> = report.outcomes.iter().filter(|o| o.matched != Some(true)).map(|o| o.query.as_str()).collect();
    assert!(misses.is_empty(), "misrouted: {:?}", misses);
    assert!(report.outcomes.iter().flat_map(|o| o.paths.iter()).all(|p| *p == AnswerPath::Fallback));
}
