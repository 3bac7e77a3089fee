use futures::StreamExt;
use retl_core::{Error, Extractor, ExtractorFactory, RuntimeEnv};
use retl_snowflake_extractor::SnowflakeExtractorFactory;
use serde_json::json;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn env_for(server: &MockServer) -> RuntimeEnv {
    RuntimeEnv::from_vars([
        ("CONNECTOR_NAME", "snowflake".to_string()),
        ("PIPELINE_NAME", "p1".to_string()),
        ("SNOWFLAKE_ACCOUNT", "org-acct".to_string()),
        ("SNOWFLAKE_DATABASE", "DB_1".to_string()),
        ("SNOWFLAKE_WAREHOUSE", "WH".to_string()),
        ("SNOWFLAKE_QUERY", "SELECT ID, NAME FROM T".to_string()),
        ("SNOWFLAKE_TOKEN", "secret-token".to_string()),
        ("SNOWFLAKE_BASE_URL", server.uri()),
    ])
}

#[tokio::test]
async fn test_streams_all_partitions() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v2/statements"))
        .and(header("authorization", "Bearer secret-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "statementHandle": "h-1",
            "resultSetMetaData": {
                "numRows": 3,
                "partitionInfo": [{"rowCount": 2}, {"rowCount": 1}],
                "rowType": [
                    {"name": "ID", "type": "fixed", "scale": 0},
                    {"name": "NAME", "type": "text"}
                ]
            },
            "data": [["1", "alpha"], ["2", null]]
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/v2/statements/h-1"))
        .and(query_param("partition", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [["3", "gamma"]]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let mut extractor = SnowflakeExtractorFactory.create(&env_for(&server)).unwrap();
    extractor.open().await.unwrap();

    let documents: Vec<_> = extractor.documents().collect().await;
    let documents: Vec<_> = documents.into_iter().map(Result::unwrap).collect();

    assert_eq!(documents.len(), 3);
    assert_eq!(documents[0]["ID"], 1);
    assert_eq!(documents[0]["NAME"], "alpha");
    assert!(documents[1]["NAME"].is_null());
    assert_eq!(documents[2]["NAME"], "gamma");
    let keys: Vec<_> = documents[0].keys().cloned().collect();
    assert_eq!(keys, vec!["ID", "NAME"]);

    extractor.close().await.unwrap();
}

#[tokio::test]
async fn test_empty_result_yields_nothing() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v2/statements"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "statementHandle": "h-2",
            "resultSetMetaData": {
                "numRows": 0,
                "partitionInfo": [],
                "rowType": [{"name": "ID", "type": "fixed", "scale": 0}]
            },
            "data": []
        })))
        .mount(&server)
        .await;

    let mut extractor = SnowflakeExtractorFactory.create(&env_for(&server)).unwrap();
    extractor.open().await.unwrap();
    assert_eq!(extractor.documents().count().await, 0);
}

#[tokio::test]
async fn test_failed_statement_surfaces_message() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v2/statements"))
        .respond_with(ResponseTemplate::new(422).set_body_json(json!({
            "code": "002003",
            "message": "Object 'T' does not exist"
        })))
        .mount(&server)
        .await;

    let mut extractor = SnowflakeExtractorFactory.create(&env_for(&server)).unwrap();
    match extractor.open().await {
        Err(Error::Connection(message)) => assert!(message.contains("does not exist")),
        other => panic!("unexpected result: {:?}", other.err()),
    }
}
