use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use tdp_scrape::common::config::FetchConfig;
use tdp_scrape::network::{BatchOutcome, WikiClient};
use tdp_scrape::pipeline::{build_processor_table, run_scrape, ScrapePaths};
use tdp_scrape::table::io::{load_csv, save_titles};
use tdp_scrape::traits::{QueryTransport, TransportResponse};
use tdp_scrape::{Error, Result};

/// Replays queued responses in order and records every request.
struct ScriptedTransport {
    responses: Mutex<VecDeque<Result<TransportResponse>>>,
    requests: Mutex<Vec<Vec<(String, String)>>>,
}

impl ScriptedTransport {
    fn new(responses: Vec<Result<TransportResponse>>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            requests: Mutex::new(Vec::new()),
        }
    }

    fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    fn param(&self, request: usize, key: &str) -> Option<String> {
        self.requests.lock().unwrap()[request]
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.clone())
    }
}

#[async_trait]
impl QueryTransport for ScriptedTransport {
    async fn query(&self, params: &[(String, String)]) -> Result<TransportResponse> {
        self.requests.lock().unwrap().push(params.to_vec());
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(TransportResponse::new(500, "script exhausted")))
    }

    fn endpoint(&self) -> &str {
        "scripted"
    }
}

fn ok(body: &str) -> Result<TransportResponse> {
    Ok(TransportResponse::new(200, body))
}

fn config(batch_size: usize, max_retries: u32) -> FetchConfig {
    FetchConfig {
        batch_size,
        max_retries,
        ..FetchConfig::default()
    }
    .without_delays()
}

fn ask_body(entries: &[(&str, f64, u32)]) -> String {
    let results: Vec<String> = entries
        .iter()
        .map(|(title, tdp, cores)| {
            format!(
                r#""{title}":{{"printouts":{{"tdp":[{{"value":{tdp}}}],"core count":[{cores}],"thread count":[{threads}],"market segment":["Server"]}},"fullurl":"https://example.org/{title}"}}"#,
                threads = cores * 2
            )
        })
        .collect();
    format!(r#"{{"query":{{"results":{{{}}}}}}}"#, results.join(","))
}

fn titles(n: usize) -> Vec<String> {
    (1..=n).map(|i| format!("chip {i}")).collect()
}

#[tokio::test]
async fn test_api_error_batch_does_not_stop_the_run() {
    let transport = ScriptedTransport::new(vec![
        ok(&ask_body(&[("chip 1", 10.0, 2), ("chip 2", 20.0, 4)])),
        ok(r#"{"error":{"code":"smw-querytoolarge","info":"too complex"}}"#),
        ok(&ask_body(&[("chip 5", 65.0, 8)])),
    ]);
    let client = WikiClient::new(transport, config(2, 3)).unwrap();

    let report = client.fetch_processor_data(&titles(5)).await;

    assert_eq!(report.batches.len(), 3);
    assert!(matches!(report.batches[1].outcome, BatchOutcome::ApiError(_)));
    assert_eq!(report.successful_batches(), 2);
    let names: Vec<String> = report.records().into_iter().filter_map(|r| r.name).collect();
    assert_eq!(names, vec!["chip 1", "chip 2", "chip 5"]);
}

#[tokio::test]
async fn test_api_error_is_not_retried() {
    let transport = ScriptedTransport::new(vec![ok(r#"{"error":{"code":"x"}}"#)]);
    let client = WikiClient::new(transport, config(10, 3)).unwrap();

    let report = client.fetch_processor_data(&titles(3)).await;

    assert_eq!(report.batches.len(), 1);
    assert!(report.records().is_empty());
    assert_eq!(client.transport().request_count(), 1);
}

#[tokio::test]
async fn test_retry_then_success() {
    let transport = ScriptedTransport::new(vec![
        Ok(TransportResponse::new(502, "<html>Bad Gateway</html>")),
        Err(Error::Api("connection reset".to_string())),
        ok(&ask_body(&[("chip 1", 15.0, 2)])),
    ]);
    let client = WikiClient::new(transport, config(5, 3)).unwrap();

    let report = client.fetch_processor_data(&titles(1)).await;

    assert_eq!(report.successful_batches(), 1);
    assert_eq!(report.records().len(), 1);
    assert_eq!(client.transport().request_count(), 3);
}

#[tokio::test]
async fn test_exhausted_batch_is_skipped() {
    let transport = ScriptedTransport::new(vec![
        ok("not json"),
        ok("still not json"),
        ok(&ask_body(&[("chip 3", 35.0, 4)])),
    ]);
    let client = WikiClient::new(transport, config(2, 2)).unwrap();

    let report = client.fetch_processor_data(&titles(3)).await;

    match &report.batches[0].outcome {
        BatchOutcome::Exhausted { attempts, last_error } => {
            assert_eq!(*attempts, 2);
            assert!(last_error.contains("still not json"));
        }
        other => panic!("unexpected outcome: {other:?}"),
    }
    assert_eq!(report.lost_titles(), 2);
    assert_eq!(report.records().len(), 1);
}

#[tokio::test]
async fn test_batch_query_lists_titles_and_properties() {
    let transport = ScriptedTransport::new(vec![ok(&ask_body(&[]))]);
    let client = WikiClient::new(transport, config(50, 1)).unwrap();

    client
        .fetch_processor_data(&["amd/epyc/7763".to_string(), "arm/cortex-a72".to_string()])
        .await;

    let transport = client.transport();
    assert_eq!(transport.param(0, "action").as_deref(), Some("ask"));
    let query = transport.param(0, "query").unwrap();
    assert!(query.starts_with("[[amd/epyc/7763]] OR [[arm/cortex-a72]]|?tdp"));
    assert!(query.ends_with("|?market segment"));
}

#[tokio::test]
async fn test_title_listing_follows_continuation() {
    let transport = ScriptedTransport::new(vec![
        ok(r#"{"continue":{"cmcontinue":"page|B"},"query":{"categorymembers":[{"title":"a"},{"title":"b"}]}}"#),
        ok(r#"{"query":{"categorymembers":[{"title":"c"}]}}"#),
    ]);
    let client = WikiClient::new(transport, config(50, 3)).unwrap();

    let listed = client.fetch_all_titles().await.unwrap();

    assert_eq!(listed, vec!["a", "b", "c"]);
    let transport = client.transport();
    assert_eq!(transport.request_count(), 2);
    assert_eq!(transport.param(0, "cmcontinue"), None);
    assert_eq!(transport.param(1, "cmcontinue").as_deref(), Some("page|B"));
    assert_eq!(
        transport.param(0, "cmtitle").as_deref(),
        Some("Category:all microprocessor models")
    );
}

#[tokio::test]
async fn test_title_listing_parse_failure_is_fatal() {
    let transport = ScriptedTransport::new(vec![Ok(TransportResponse::new(
        503,
        "<html>maintenance</html>",
    ))]);
    let client = WikiClient::new(transport, config(50, 3)).unwrap();

    let err = client.fetch_all_titles().await.unwrap_err();
    match err {
        Error::ResponseParse { status, excerpt } => {
            assert_eq!(status, 503);
            assert!(excerpt.contains("maintenance"));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn test_scrape_run_builds_and_saves_table() {
    let dir = tempfile::tempdir().unwrap();
    let paths = ScrapePaths {
        titles: dir.path().join("titles.json"),
        cpu_tdp_csv: dir.path().join("cpu.csv"),
        external_csv: dir.path().join("absent.csv"),
    };
    save_titles(&titles(2), &paths.titles).unwrap();

    let transport = ScriptedTransport::new(vec![ok(&ask_body(&[
        ("chip 1", 20.0, 2),
        ("chip 2", 40.0, 4),
    ]))]);
    let client = WikiClient::new(transport, config(50, 3)).unwrap();

    let table = run_scrape(&client, &paths).await.unwrap().unwrap();
    assert_eq!(table.len(), 4);

    let saved = load_csv(&paths.cpu_tdp_csv).unwrap().unwrap();
    assert_eq!(saved.headers(), table.headers());
    assert_eq!(saved.len(), table.len());
    assert_eq!(saved.value(2, "name"), Some("default compute cluster"));
    assert_eq!(saved.value(2, "tdp (W)"), Some("10"));
    assert_eq!(saved.value(2, "threads"), Some("2"));

    // A second run finds the saved table and leaves it alone.
    let again = run_scrape(&client, &paths).await.unwrap();
    assert!(again.is_none());
    assert_eq!(client.transport().request_count(), 1);
}

#[tokio::test]
async fn test_duplicate_names_keep_first_in_response_order() {
    let transport = ScriptedTransport::new(vec![ok(&ask_body(&[
        ("Xeon Gold 6130 - Intel", 125.0, 16),
        ("Intel Xeon Gold 6130", 150.0, 16),
    ]))]);
    let client = WikiClient::new(transport, config(50, 1)).unwrap();

    let report = client
        .fetch_processor_data(&["Xeon Gold 6130 - Intel".to_string(), "Intel Xeon Gold 6130".to_string()])
        .await;
    let table = build_processor_table(&report.records(), None).unwrap();

    assert_eq!(table.value(0, "name"), Some("intel xeon gold 6130"));
    assert_eq!(table.value(0, "tdp (W)"), Some("125"));
    assert_eq!(table.value(1, "name"), Some("default compute cluster"));
}
