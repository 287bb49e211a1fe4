//! HttpEndpoint against a mocked SPARQL endpoint.
//!
//! The endpoint uses a blocking client, so each session runs on a blocking
//! task while wiremock serves from the async runtime.

use serde_json::json;
use sparql_pager::config::{DEFAULT_GRAPH, SPARQL_RESULTS_JSON};
use sparql_pager::{
    Endpoint, FetchError, HttpEndpoint, PageFetcher, PagerConfig, PaginationDriver,
    PaginationSession, ParsedQuery, QueryRewriter, SessionStatus,
};
use std::net::TcpListener;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

const QUERY: &str = "SELECT ?s ?o WHERE { ?s <http://example.org/p> ?o }";

/// Serves `total` rows, honouring the LIMIT/OFFSET of each page query.
fn paged_rows(total: usize) -> impl Fn(&Request) -> ResponseTemplate + Send + Sync + 'static {
    move |request: &Request| {
        let query = request
            .url
            .query_pairs()
            .find(|(key, _)| key == "query")
            .map(|(_, value)| value.into_owned())
            .unwrap_or_default();
        let parsed = match ParsedQuery::parse(&query) {
            Ok(parsed) => parsed,
            Err(e) => return ResponseTemplate::new(400).set_body_string(e.to_string()),
        };
        let offset = parsed.offset().unwrap_or(0);
        let limit = parsed.limit().unwrap_or(usize::MAX);
        let rows: Vec<_> = (offset..total.min(offset.saturating_add(limit)))
            .map(|i| {
                json!({
                    "s": { "type": "uri", "value": format!("http://example.org/s{i}") },
                    "o": { "type": "literal", "value": i.to_string() },
                })
            })
            .collect();
        ResponseTemplate::new(200).set_body_json(json!({
            "head": { "vars": ["s", "o"] },
            "results": { "bindings": rows },
        }))
    }
}

async fn paginate(url: String, limit: usize) -> PaginationSession {
    tokio::task::spawn_blocking(move || {
        let config = PagerConfig::default();
        let endpoint = HttpEndpoint::new(&url, &config).unwrap();
        let plan = QueryRewriter::new(limit)
            .unwrap()
            .rewrite(ParsedQuery::parse(QUERY).unwrap());
        PaginationDriver::new(PageFetcher::new(endpoint)).run(plan)
    })
    .await
    .unwrap()
}

#[tokio::test(flavor = "multi_thread")]
async fn test_pages_are_requested_with_endpoint_parameters() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/sparql"))
        .and(query_param("default-graph-uri", DEFAULT_GRAPH))
        .and(query_param("format", SPARQL_RESULTS_JSON))
        .and(query_param("timeout", "300000"))
        .respond_with(paged_rows(5))
        .expect(3)
        .mount(&server)
        .await;

    let session = paginate(format!("{}/sparql", server.uri()), 2).await;

    assert_eq!(session.status(), &SessionStatus::Done);
    assert_eq!(session.calls(), 3);
    let values: Vec<&str> = session
        .bindings()
        .iter()
        .map(|b| b["o"]["value"].as_str().unwrap())
        .collect();
    assert_eq!(values, vec!["0", "1", "2", "3", "4"]);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_page_queries_carry_ordering_and_window() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(paged_rows(4))
        .mount(&server)
        .await;

    let session = paginate(server.uri(), 2).await;
    assert_eq!(session.calls(), 3);

    let requests = server.received_requests().await.unwrap();
    let offsets: Vec<usize> = requests
        .iter()
        .map(|request| {
            let query = request
                .url
                .query_pairs()
                .find(|(key, _)| key == "query")
                .map(|(_, value)| value.into_owned())
                .unwrap();
            let parsed = ParsedQuery::parse(&query).unwrap();
            let order: Vec<&str> = parsed.order().iter().map(|v| v.as_str()).collect();
            assert_eq!(order, vec!["s", "o"]);
            parsed.offset().unwrap_or(0)
        })
        .collect();
    assert_eq!(offsets, vec![0, 2, 4]);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_error_marker_body_fails_session() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(500)
                .set_body_string("Virtuoso 37000 Error SP030: SPARQL compiler, line 1: syntax error"),
        )
        .mount(&server)
        .await;

    let session = paginate(server.uri(), 2).await;

    assert!(matches!(
        session.status(),
        SessionStatus::Failed(FetchError::Endpoint(msg)) if msg.contains("SP030")
    ));
    assert_eq!(session.calls(), 1);
    assert!(session.bindings().is_empty());
}

#[tokio::test(flavor = "multi_thread")]
async fn test_undecodable_body_fails_session() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(502).set_body_string("<html>Bad Gateway</html>"))
        .mount(&server)
        .await;

    let session = paginate(server.uri(), 2).await;

    assert!(matches!(
        session.status(),
        SessionStatus::Failed(FetchError::Endpoint(_))
    ));
}

#[test]
fn test_connection_refused_is_network_error() {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let endpoint = HttpEndpoint::new(&format!("http://{addr}/sparql"), &PagerConfig::default())
        .unwrap();
    let err = endpoint.request(QUERY).unwrap_err();
    assert!(matches!(err, FetchError::Network(_)));
}
