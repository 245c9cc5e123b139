//! Decoding of `api.php` responses.
//!
//! Two response shapes are understood: the category member listing
//! (`action=query&list=categorymembers`) and the Semantic MediaWiki `ask`
//! property query. Missing or oddly typed printouts become `None` here; only a
//! body that is not JSON at all is an error.

use chrono::DateTime;
use serde::Deserialize;
use serde_json::Value;

use crate::error::{response_parse_error, Result};
use crate::parsing::common::parse_number;
use crate::table::ProcessorRecord;
use crate::traits::TransportResponse;

/// Property names requested from the ask endpoint.
pub mod properties {
    pub const TDP: &str = "tdp";
    pub const FIRST_LAUNCHED: &str = "first launched";
    pub const CORE_COUNT: &str = "core count";
    pub const THREAD_COUNT: &str = "thread count";
    pub const MODEL: &str = "model";
    pub const NAME: &str = "name";
    pub const MARKET_SEGMENT: &str = "market segment";

    pub const ALL: [&str; 7] = [
        TDP,
        FIRST_LAUNCHED,
        CORE_COUNT,
        THREAD_COUNT,
        MODEL,
        NAME,
        MARKET_SEGMENT,
    ];
}

/// One page of category members.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CategoryPage {
    pub titles: Vec<String>,
    pub continuation: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CategoryResponse {
    #[serde(default)]
    query: Option<CategoryQuery>,
    #[serde(default, rename = "continue")]
    continuation: Option<Continuation>,
}

#[derive(Debug, Deserialize)]
struct CategoryQuery {
    #[serde(default)]
    categorymembers: Vec<CategoryMember>,
}

#[derive(Debug, Deserialize)]
struct CategoryMember {
    title: String,
}

#[derive(Debug, Deserialize)]
struct Continuation {
    #[serde(default)]
    cmcontinue: Option<String>,
}

/// Decoded ask response.
#[derive(Debug, Clone, PartialEq)]
pub enum AskPayload {
    /// The API reported an inline `error` object (pretty-printed).
    ApiError(String),
    /// Records that carried both a TDP and a core count.
    Records(Vec<ProcessorRecord>),
}

/// Build the ask query string for a batch of page titles.
pub fn build_ask_query(titles: &[String]) -> String {
    let conditions = titles
        .iter()
        .map(|t| format!("[[{t}]]"))
        .collect::<Vec<_>>()
        .join(" OR ");
    let printouts: String = properties::ALL.iter().map(|p| format!("|?{p}")).collect();
    format!("{conditions}{printouts}")
}

pub fn parse_category_page(response: &TransportResponse) -> Result<CategoryPage> {
    let parsed: CategoryResponse = serde_json::from_str(&response.body)
        .map_err(|_| response_parse_error(response.status, &response.body))?;
    Ok(CategoryPage {
        titles: parsed
            .query
            .map(|q| q.categorymembers.into_iter().map(|m| m.title).collect())
            .unwrap_or_default(),
        continuation: parsed
            .continuation
            .and_then(|c| c.cmcontinue)
            .filter(|c| !c.is_empty()),
    })
}

pub fn parse_ask_response(response: &TransportResponse) -> Result<AskPayload> {
    let value: Value = serde_json::from_str(&response.body)
        .map_err(|_| response_parse_error(response.status, &response.body))?;
    let Some(root) = value.as_object() else {
        return Err(response_parse_error(response.status, &response.body));
    };

    if let Some(error) = root.get("error") {
        let message = serde_json::to_string_pretty(error).unwrap_or_else(|_| error.to_string());
        return Ok(AskPayload::ApiError(message));
    }

    // Results keep the order of the response body.
    let records = root
        .get("query")
        .and_then(|q| q.get("results"))
        .and_then(Value::as_object)
        .map(|results| {
            results
                .iter()
                .filter_map(|(title, data)| parse_result(title, data))
                .collect()
        })
        .unwrap_or_default();
    Ok(AskPayload::Records(records))
}

fn parse_result(title: &str, data: &Value) -> Option<ProcessorRecord> {
    let empty = Value::Null;
    let printouts = data.get("printouts").unwrap_or(&empty);
    let first = |property: &str| {
        printouts
            .get(property)
            .and_then(Value::as_array)
            .and_then(|values| values.first())
    };

    let tdp = first(properties::TDP)
        .and_then(|v| v.get("value"))
        .and_then(number)
        .filter(|v| *v != 0.0)?;
    let cores = first(properties::CORE_COUNT)
        .and_then(number)
        .and_then(count)
        .filter(|c| *c != 0)?;
    let threads = first(properties::THREAD_COUNT)
        .and_then(number)
        .and_then(count)
        .map(f64::from);
    let launch_date = first(properties::FIRST_LAUNCHED)
        .and_then(|v| v.get("timestamp"))
        .and_then(number)
        .and_then(format_timestamp);

    let segments: Vec<String> = printouts
        .get(properties::MARKET_SEGMENT)
        .and_then(Value::as_array)
        .map(|values| values.iter().filter_map(segment_text).collect())
        .unwrap_or_default();

    let name = data
        .get("displaytitle")
        .and_then(Value::as_str)
        .filter(|s| !s.trim().is_empty())
        .unwrap_or(title);

    Some(ProcessorRecord {
        name: Some(name.to_string()),
        launch_date,
        source: data.get("fullurl").and_then(Value::as_str).map(String::from),
        intended_usage: (!segments.is_empty()).then(|| segments.join("; ")),
        tdp_watts: Some(tdp),
        cores: Some(cores),
        threads,
        process: None,
        die_area: None,
    })
}

/// Numbers arrive either as JSON numbers or as numeric strings.
fn number(value: &Value) -> Option<f64> {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => parse_number(s),
        _ => None,
    };
    parsed.filter(|v| v.is_finite())
}

fn count(value: f64) -> Option<u32> {
    (0.0..=u32::MAX as f64)
        .contains(&value)
        .then_some(value.trunc() as u32)
}

fn format_timestamp(seconds: f64) -> Option<String> {
    DateTime::from_timestamp(seconds.trunc() as i64, 0).map(|dt| dt.format("%Y-%m-%d").to_string())
}

/// Market segments are plain strings, or page objects carrying `fulltext`.
fn segment_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Object(o) => o.get("fulltext").and_then(Value::as_str).map(String::from),
        Value::Null => None,
        other => Some(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(body: &str) -> TransportResponse {
        TransportResponse::new(200, body)
    }

    #[test]
    fn test_build_ask_query() {
        let titles = vec!["intel/core i5/i5-7200u".to_string(), "amd/epyc/7763".to_string()];
        assert_eq!(
            build_ask_query(&titles),
            "[[intel/core i5/i5-7200u]] OR [[amd/epyc/7763]]|?tdp|?first launched|?core count|?thread count|?model|?name|?market segment"
        );
    }

    #[test]
    fn test_parse_category_page() {
        let body = r#"{"continue":{"cmcontinue":"page|ABC|123","continue":"-||"},
            "query":{"categorymembers":[{"pageid":1,"ns":0,"title":"a"},{"pageid":2,"ns":0,"title":"b"}]}}"#;
        let page = parse_category_page(&response(body)).unwrap();
        assert_eq!(page.titles, vec!["a", "b"]);
        assert_eq!(page.continuation.as_deref(), Some("page|ABC|123"));

        let last = parse_category_page(&response(r#"{"batchcomplete":"","query":{"categorymembers":[]}}"#)).unwrap();
        assert!(last.titles.is_empty());
        assert_eq!(last.continuation, None);
    }

    #[test]
    fn test_unparseable_body() {
        let resp = TransportResponse::new(503, "<html>Service Unavailable</html>");
        let err = parse_category_page(&resp).unwrap_err();
        assert!(matches!(err, crate::Error::ResponseParse { status: 503, .. }));
        assert!(parse_ask_response(&resp).is_err());
    }

    #[test]
    fn test_parse_ask_records() {
        let body = r#"{"query":{"results":{
            "intel/core i5/i5-7200u":{"printouts":{
                "tdp":[{"value":15,"unit":"W"}],
                "first launched":[{"timestamp":"1483488000","raw":"1/2017/1/4"}],
                "core count":[2],
                "thread count":[4],
                "market segment":["Mobile"]},
              "fulltext":"intel/core i5/i5-7200u",
              "fullurl":"https://en.wikichip.org/wiki/intel/core_i5/i5-7200u",
              "displaytitle":"Core i5-7200U - Intel"},
            "no-tdp":{"printouts":{"tdp":[],"core count":[4]},"displaytitle":""},
            "zero-cores":{"printouts":{"tdp":[{"value":5}],"core count":["0"]}}
        }}}"#;
        let AskPayload::Records(records) = parse_ask_response(&response(body)).unwrap() else {
            panic!("expected records");
        };
        assert_eq!(records.len(), 1);
        let r = &records[0];
        assert_eq!(r.name.as_deref(), Some("Core i5-7200U - Intel"));
        assert_eq!(r.launch_date.as_deref(), Some("2017-01-04"));
        assert_eq!(r.tdp_watts, Some(15.0));
        assert_eq!(r.cores, Some(2));
        assert_eq!(r.threads, Some(4.0));
        assert_eq!(r.intended_usage.as_deref(), Some("Mobile"));
        assert_eq!(
            r.source.as_deref(),
            Some("https://en.wikichip.org/wiki/intel/core_i5/i5-7200u")
        );
    }

    #[test]
    fn test_parse_ask_defaults() {
        let body = r#"{"query":{"results":{"arm/cortex-a72":{"printouts":{
            "tdp":[{"value":"1.5"}],"core count":[4],
            "market segment":[{"fulltext":"Embedded"},"Mobile"]}}}}}"#;
        let AskPayload::Records(records) = parse_ask_response(&response(body)).unwrap() else {
            panic!("expected records");
        };
        let r = &records[0];
        assert_eq!(r.name.as_deref(), Some("arm/cortex-a72"));
        assert_eq!(r.launch_date, None);
        assert_eq!(r.threads, None);
        assert_eq!(r.source, None);
        assert_eq!(r.intended_usage.as_deref(), Some("Embedded; Mobile"));
    }

    #[test]
    fn test_parse_ask_keeps_response_order() {
        let body = r#"{"query":{"results":{
            "Zeta 1":{"printouts":{"tdp":[{"value":10}],"core count":[2]}},
            "Alpha 1":{"printouts":{"tdp":[{"value":20}],"core count":[4]}},
            "Mu 1":{"printouts":{"tdp":[{"value":30}],"core count":[8]}}
        }}}"#;
        let AskPayload::Records(records) = parse_ask_response(&response(body)).unwrap() else {
            panic!("expected records");
        };
        let names: Vec<_> = records.iter().filter_map(|r| r.name.as_deref()).collect();
        assert_eq!(names, vec!["Zeta 1", "Alpha 1", "Mu 1"]);
    }

    #[test]
    fn test_parse_ask_error_and_empty_results() {
        let body = r#"{"error":{"code":"smw-querytoolarge","info":"query too large"}}"#;
        match parse_ask_response(&response(body)).unwrap() {
            AskPayload::ApiError(message) => assert!(message.contains("smw-querytoolarge")),
            other => panic!("unexpected payload: {other:?}"),
        }

        let body = r#"{"query":{"results":[],"meta":{"count":0}}}"#;
        assert_eq!(
            parse_ask_response(&response(body)).unwrap(),
            AskPayload::Records(Vec::new())
        );
    }
}
