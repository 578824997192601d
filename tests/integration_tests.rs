//! Integration tests for the EVE API client.
//!
//! These tests use wiremock to simulate the API responses
//! and test the complete pipeline without hitting the real API.

use eveapi_xml::{
    ApiError, ApiErrorKind, Credentials, ErrorCategory, EveApiClient, EveApiClientConfig,
    EveApiError, FromRow, Query, RequestParams, Result, Row, RowSelector,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::net::TcpListener;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const ERRORS_FIXTURE: &str = include_str!("fixtures/errors.xml");

const SAMPLE_CHARACTERS_RESPONSE: &str = r#"<?xml version='1.0' encoding='UTF-8'?>
<eveapi version="2">
  <currentTime>2007-12-12 11:48:50</currentTime>
  <result>
    <rowset name="characters" key="characterID" columns="name,characterID,corporationName,corporationID">
      <row name="Mary" characterID="150267069" corporationName="Starbase Anchoring Corp" corporationID="150279367" />
      <row name="Marcus" characterID="150302299" corporationName="Marcus Corp" corporationID="150333466" />
      <row name="Dieinafire" characterID="150340823" corporationName="center for Advanced Studies" corporationID="1000169" />
    </rowset>
  </result>
  <cachedUntil>2007-12-12 12:48:50</cachedUntil>
</eveapi>"#;

const SAMPLE_ERROR_105_RESPONSE: &str = r#"<?xml version='1.0' encoding='UTF-8'?>
<eveapi version="2">
  <currentTime>2007-12-12 11:48:50</currentTime>
  <error code="105">Invalid characterID.</error>
  <cachedUntil>2007-12-12 11:53:50</cachedUntil>
</eveapi>"#;

const SAMPLE_ASSETS_RESPONSE: &str = r#"<?xml version='1.0' encoding='UTF-8'?>
<eveapi version="2">
  <currentTime>2008-02-04 22:04:34</currentTime>
  <result>
    <rowset name="assets" key="itemID" columns="itemID,locationID,typeID,quantity,flag,singleton">
      <row itemID="150354641" locationID="30000380" typeID="11019" quantity="1" flag="0" singleton="1">
        <rowset name="contents" key="itemID" columns="itemID,typeID,quantity,flag,singleton">
          <row itemID="150354709" typeID="16275" quantity="200000" flag="0" singleton="0" />
          <row itemID="150354710" typeID="16272" quantity="150000" flag="0" singleton="0" />
        </rowset>
      </row>
      <row itemID="150354706" locationID="30001984" typeID="11019" quantity="1" flag="0" singleton="1">
        <rowset name="contents" key="itemID" columns="itemID,typeID,quantity,flag,singleton">
          <row itemID="150354711" typeID="670" quantity="1" flag="5" singleton="1">
            <rowset name="contents" key="itemID" columns="itemID,typeID,quantity,flag,singleton">
              <row itemID="150354712" typeID="34" quantity="4000" flag="5" singleton="0" />
            </rowset>
          </row>
        </rowset>
      </row>
      <row itemID="150354713" locationID="60003760" typeID="23" quantity="8" flag="4" singleton="0" />
    </rowset>
  </result>
  <cachedUntil>2008-02-05 04:04:34</cachedUntil>
</eveapi>"#;

const SAMPLE_MEDALS_RESPONSE: &str = r#"<?xml version='1.0' encoding='UTF-8'?>
<eveapi version="2">
  <currentTime>2008-09-05 18:50:18</currentTime>
  <result>
    <rowset name="currentCorporation" key="medalID" columns="medalID,reason,status,issuerID,issued">
      <row medalID="3381" reason="Hardcore" status="public" issuerID="64106170" issued="2008-09-03 23:22:19" />
    </rowset>
    <rowset name="otherCorporations" key="medalID" columns="medalID,reason,status,issuerID,issued,corporationID,title,description">
      <row medalID="1150" reason="Excellent pilot" status="private" issuerID="1100002" issued="2008-05-12 21:09:03" corporationID="1000166" title="Old timer" description="Awarded to the old guard" />
      <row medalID="1151" reason="Fleet commander" status="public" issuerID="1100003" issued="2008-06-02 10:00:00" corporationID="1000167" title="Leader" description="Led the fleet" />
    </rowset>
  </result>
  <cachedUntil>2008-09-05 19:50:18</cachedUntil>
</eveapi>"#;

const SAMPLE_SERVER_STATUS_RESPONSE: &str = r#"<?xml version='1.0' encoding='UTF-8'?>
<eveapi version="2">
  <currentTime>2008-10-17 02:47:53</currentTime>
  <result>
    <serverOpen>True</serverOpen>
    <onlinePlayers>38102</onlinePlayers>
  </result>
  <cachedUntil>2008-10-17 02:50:53</cachedUntil>
</eveapi>"#;

const SAMPLE_NO_CACHE_RESPONSE: &str = r#"<?xml version='1.0' encoding='UTF-8'?>
<eveapi version="2">
  <currentTime>2007-12-12 11:48:50</currentTime>
  <result>
    <rowset name="characters" key="characterID" columns="name,characterID">
      <row name="Mary" characterID="150267069" />
    </rowset>
  </result>
</eveapi>"#;

fn test_config(base_url: &str) -> EveApiClientConfig {
    EveApiClientConfig {
        base_url: base_url.to_string(),
        user_agent: "eveapi-test/1.0".to_string(),
        connect_timeout_seconds: 2,
        read_timeout_seconds: 5,
        max_tries: 3,
        retry_delay: Duration::from_millis(50),
        ..Default::default()
    }
}

fn create_test_client(mock_server_uri: &str) -> EveApiClient {
    EveApiClient::with_config(Credentials::key(12345, "abc"), test_config(mock_server_uri))
        .unwrap()
}

fn fixture_path(name: &str) -> String {
    format!("{}/tests/fixtures/{}", env!("CARGO_MANIFEST_DIR"), name)
}

async fn mount_body(server: &MockServer, endpoint: &str, body: &str) {
    Mock::given(method("GET"))
        .and(path(endpoint))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_error_list_end_to_end() {
    let mock_server = MockServer::start().await;
    mount_body(&mock_server, "/eve/ErrorList.xml.aspx", ERRORS_FIXTURE).await;

    let client = create_test_client(&mock_server.uri());
    let result = client
        .error_list(RequestParams::new())
        .await
        .unwrap()
        .into_data()
        .unwrap();

    assert_eq!(result.value.len(), 61);
    assert!(result.value.iter().all(|e| e.code > 0 && !e.text.is_empty()));
    assert_eq!(result.value[0].code, 100);
    assert_eq!(result.fingerprint, "eve/ErrorList.xml.aspx:keyid:12345:vcode:abc");
    assert_eq!(result.cached_until.unwrap().timestamp(), 1200230078);
}

#[tokio::test]
async fn test_credentials_travel_in_query() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/account/Characters.xml.aspx"))
        .and(query_param("keyid", "12345"))
        .and(query_param("vcode", "abc"))
        .and(query_param("version", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_string(SAMPLE_CHARACTERS_RESPONSE))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = create_test_client(&mock_server.uri());
    let characters = client
        .characters(RequestParams::new())
        .await
        .unwrap()
        .into_value()
        .unwrap();

    assert_eq!(characters.len(), 3);
    assert_eq!(characters[0].name, "Mary");
    assert_eq!(characters[2].corporation_id, 1000169);
}

#[tokio::test]
async fn test_legacy_credentials_and_character_default() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(query_param("userid", "999"))
        .and(query_param("apikey", "aaa"))
        .and(query_param("characterid", "150267069"))
        .respond_with(ResponseTemplate::new(200).set_body_string(SAMPLE_ASSETS_RESPONSE))
        .expect(1)
        .mount(&mock_server)
        .await;

    let credentials = Credentials::legacy(999, "aaa").with_character(150267069);
    let client =
        EveApiClient::with_config(credentials, test_config(&mock_server.uri())).unwrap();
    let result = client.asset_list(RequestParams::new()).await;

    assert!(result.is_ok());
}

#[tokio::test]
async fn test_api_error_aborts_call() {
    let mock_server = MockServer::start().await;
    mount_body(&mock_server, "/char/AssetList.xml.aspx", SAMPLE_ERROR_105_RESPONSE).await;

    let save_dir = tempfile::tempdir().unwrap();
    let config = EveApiClientConfig {
        save_path: Some(save_dir.path().to_path_buf()),
        ..test_config(&mock_server.uri())
    };
    let client = EveApiClient::with_config(Credentials::key(12345, "abc"), config).unwrap();

    let result = client
        .asset_list(RequestParams::new().with("characterID", 1))
        .await;

    assert!(result.is_err());
    match result.unwrap_err() {
        EveApiError::Api(api) => {
            assert_eq!(api.kind, ApiErrorKind::InvalidCharacterId);
            assert_eq!(api.code, 105);
            assert_eq!(api.message, "Invalid characterID.");
        }
        other => panic!("Expected Api error, got {:?}", other),
    }

    // error responses are never saved
    assert!(!save_dir.path().join("12345").exists());

    let last = client.last_call().await;
    assert_eq!(
        last.fingerprint.as_deref(),
        Some("char/AssetList.xml.aspx:characterid:1:keyid:12345:vcode:abc")
    );
    assert!(last.raw_xml.unwrap().contains("code=\"105\""));
}

#[tokio::test]
async fn test_cache_timer_error_keeps_timing() {
    let mock_server = MockServer::start().await;
    mount_body(
        &mock_server,
        "/account/Characters.xml.aspx",
        r#"<?xml version='1.0' encoding='UTF-8'?>
<eveapi version="2">
  <currentTime>2007-12-12 11:48:50</currentTime>
  <error code="903">Rate limited.</error>
  <cachedUntil>2007-12-12 12:48:50</cachedUntil>
</eveapi>"#,
    )
    .await;

    let client = create_test_client(&mock_server.uri());
    let result = client.characters(RequestParams::new()).await;

    let retry_at = match result.unwrap_err() {
        EveApiError::Api(api) => {
            assert_eq!(api.kind, ApiErrorKind::ObeyCacheTimers);
            assert_eq!(api.category(), ErrorCategory::Exhausted);
            assert_eq!(
                api.current_time.map(|t| t.to_string()),
                Some("2007-12-12 11:48:50 UTC".to_string())
            );
            api.cached_until.unwrap()
        }
        other => panic!("Expected Api error, got {:?}", other),
    };
    assert_eq!(retry_at.to_string(), "2007-12-12 12:48:50 UTC");

    let last = client.last_call().await;
    assert_eq!(
        last.fingerprint.as_deref(),
        Some("account/Characters.xml.aspx:keyid:12345:vcode:abc")
    );
    assert_eq!(last.cached_until, Some(retry_at));
    assert_eq!(
        last.current_time.map(|t| t.to_string()),
        Some("2007-12-12 11:48:50 UTC".to_string())
    );
}

#[tokio::test]
async fn test_fingerprint_only_makes_no_request() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string(SAMPLE_CHARACTERS_RESPONSE))
        .expect(0)
        .mount(&mock_server)
        .await;

    let client = create_test_client(&mock_server.uri());

    let output = client
        .characters(RequestParams::new().just_hash())
        .await
        .unwrap();
    assert_eq!(
        output.fingerprint(),
        Some("account/Characters.xml.aspx:keyid:12345:vcode:abc")
    );

    let hash = client
        .fingerprint(Query::new("alliances", "eve/AllianceList.xml.aspx"))
        .await
        .unwrap();
    assert_eq!(hash, "eve/AllianceList.xml.aspx:keyid:12345:vcode:abc");
    assert_eq!(client.last_fingerprint().await, Some(hash));
}

#[tokio::test]
async fn test_http_error_status_is_not_retried() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404).set_body_string("Not here"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = create_test_client(&mock_server.uri());
    let result = client.characters(RequestParams::new()).await;

    match result.unwrap_err() {
        EveApiError::NetworkStatus { status, body } => {
            assert_eq!(status, Some(404));
            assert_eq!(body, "Not here");
        }
        other => panic!("Expected NetworkStatus error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_http_error_without_body() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = create_test_client(&mock_server.uri());
    let result = client.server_status(RequestParams::new()).await;

    match result.unwrap_err() {
        EveApiError::NetworkStatus { status, body } => {
            assert_eq!(status, Some(503));
            assert_eq!(body, "No Response Body!");
        }
        other => panic!("Expected NetworkStatus error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_transport_failures_exhaust_retries() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let accepted = Arc::new(AtomicUsize::new(0));

    let counter = accepted.clone();
    tokio::spawn(async move {
        while let Ok((socket, _)) = listener.accept().await {
            counter.fetch_add(1, Ordering::SeqCst);
            drop(socket);
        }
    });

    let client = create_test_client(&format!("http://{}", addr));
    let started = Instant::now();
    let result = client.characters(RequestParams::new()).await;

    match result.unwrap_err() {
        EveApiError::NetworkStatus { status, body } => {
            assert_eq!(status, None);
            assert!(!body.is_empty());
        }
        other => panic!("Expected NetworkStatus error, got {:?}", other),
    }
    assert_eq!(accepted.load(Ordering::SeqCst), 3);
    // two pauses between three attempts
    assert!(started.elapsed() >= Duration::from_millis(100));
}

#[tokio::test]
async fn test_successful_response_is_saved() {
    let mock_server = MockServer::start().await;
    mount_body(&mock_server, "/eve/ErrorList.xml.aspx", ERRORS_FIXTURE).await;

    let save_dir = tempfile::tempdir().unwrap();
    let config = EveApiClientConfig {
        save_path: Some(save_dir.path().to_path_buf()),
        ..test_config(&mock_server.uri())
    };
    let client = EveApiClient::with_config(Credentials::key(12345, "abc"), config).unwrap();
    client.error_list(RequestParams::new()).await.unwrap();

    let saved = save_dir
        .path()
        .join("12345")
        .join("errors")
        .join("1200230078.xml");
    assert_eq!(std::fs::read_to_string(saved).unwrap(), ERRORS_FIXTURE);
}

#[tokio::test]
async fn test_missing_cached_until() {
    let mock_server = MockServer::start().await;
    mount_body(&mock_server, "/account/Characters.xml.aspx", SAMPLE_NO_CACHE_RESPONSE).await;

    let client = create_test_client(&mock_server.uri());
    let result = client
        .characters(RequestParams::new())
        .await
        .unwrap()
        .into_data()
        .unwrap();

    assert!(result.cached_until.is_none());
    assert_eq!(result.value.len(), 1);

    let last = client.last_call().await;
    assert!(last.cached_until.is_none());
    assert_eq!(last.current_time, Some(result.current_time));
}

#[tokio::test]
async fn test_asset_tree() {
    let mock_server = MockServer::start().await;
    mount_body(&mock_server, "/corp/AssetList.xml.aspx", SAMPLE_ASSETS_RESPONSE).await;

    let client = create_test_client(&mock_server.uri());
    let assets = client
        .corporate_asset_list(RequestParams::new())
        .await
        .unwrap()
        .into_value()
        .unwrap();

    assert_eq!(assets.len(), 3);
    assert!(assets[0].is_container());
    assert_eq!(assets[0].contents.len(), 2);
    assert_eq!(assets[0].contents[0].quantity, 200000);

    let ship = &assets[1].contents[0];
    assert!(ship.is_container());
    assert_eq!(ship.contents[0].type_id, 34);
    assert_eq!(assets[1].nested_count(), 2);

    assert!(!assets[2].is_container());
    assert_eq!(assets[2].location_id, Some(60003760));
}

#[tokio::test]
async fn test_character_medals() {
    let mock_server = MockServer::start().await;
    mount_body(&mock_server, "/char/Medals.xml.aspx", SAMPLE_MEDALS_RESPONSE).await;

    let client = create_test_client(&mock_server.uri());
    let medals = client
        .character_medals(RequestParams::new().with("characterID", 150267069))
        .await
        .unwrap()
        .into_value()
        .unwrap();

    assert_eq!(medals.current_corporation.len(), 1);
    assert_eq!(medals.current_corporation[0].corporation_id, None);
    assert!(medals.current_corporation[0].is_public());

    assert_eq!(medals.other_corporations.len(), 2);
    assert_eq!(medals.other_corporations[0].corporation_id, Some(1000166));
    assert_eq!(
        medals.other_corporations[0].title.as_deref(),
        Some("Old timer")
    );
    assert!(!medals.other_corporations[0].is_public());
}

#[tokio::test]
async fn test_server_status() {
    let mock_server = MockServer::start().await;
    mount_body(&mock_server, "/Server/ServerStatus.xml.aspx", SAMPLE_SERVER_STATUS_RESPONSE).await;

    let client = create_test_client(&mock_server.uri());
    let status = client
        .server_status(RequestParams::new())
        .await
        .unwrap()
        .into_value()
        .unwrap();

    assert!(status.server_open);
    assert_eq!(status.online_players, 38102);
}

#[tokio::test]
async fn test_malformed_response() {
    let mock_server = MockServer::start().await;
    mount_body(&mock_server, "/account/Characters.xml.aspx", "<eveapi><result>").await;

    let client = create_test_client(&mock_server.uri());
    let result = client.characters(RequestParams::new()).await;

    match result.unwrap_err() {
        EveApiError::MalformedResponse { .. } => {}
        other => panic!("Expected MalformedResponse error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_blank_body_maps_to_no_rows() {
    let mock_server = MockServer::start().await;
    mount_body(&mock_server, "/account/Characters.xml.aspx", "").await;

    let client = create_test_client(&mock_server.uri());
    let characters = client
        .characters(RequestParams::new())
        .await
        .unwrap()
        .into_value()
        .unwrap();

    assert!(characters.is_empty());
}

#[tokio::test]
async fn test_local_file_source() {
    // no server: the file override must not touch the network
    let client = create_test_client("http://127.0.0.1:9");
    let result = client
        .error_list(RequestParams::new().with("url", fixture_path("errors.xml")))
        .await
        .unwrap()
        .into_data()
        .unwrap();

    assert_eq!(result.value.len(), 61);
    assert_eq!(result.fingerprint, "fixtures/errors.xml:keyid:12345:vcode:abc");
}

#[tokio::test]
async fn test_missing_local_file() {
    let client = create_test_client("http://127.0.0.1:9");
    let result = client
        .error_list(RequestParams::new().with("url", fixture_path("nope.xml")))
        .await;

    let err = result.unwrap_err();
    assert!(err.is_not_found());
    assert!(matches!(err, EveApiError::Io(_)));
}

#[tokio::test]
async fn test_url_override_reaches_other_server() {
    let mock_server = MockServer::start().await;
    mount_body(&mock_server, "/mirror/Characters.xml.aspx", SAMPLE_CHARACTERS_RESPONSE).await;

    let client = create_test_client("http://127.0.0.1:9");
    let url = format!("{}/mirror/Characters.xml.aspx", mock_server.uri());
    let result = client
        .characters(RequestParams::new().with("url", url))
        .await
        .unwrap()
        .into_data()
        .unwrap();

    assert_eq!(result.value.len(), 3);
    assert_eq!(
        result.fingerprint,
        "mirror/Characters.xml.aspx:keyid:12345:vcode:abc"
    );
}

#[derive(Debug)]
struct ErrorCode(u32);

impl FromRow for ErrorCode {
    fn from_row(row: &Row<'_>) -> Result<Self> {
        Ok(ErrorCode(row.parse("errorCode")?))
    }
}

#[tokio::test]
async fn test_custom_record_with_named_selector() {
    let mock_server = MockServer::start().await;
    mount_body(&mock_server, "/eve/ErrorList.xml.aspx", ERRORS_FIXTURE).await;

    let client = create_test_client(&mock_server.uri());
    let query = Query::new("errors", "eve/ErrorList.xml.aspx");
    let codes: Vec<ErrorCode> = client
        .execute_rows(query, &RowSelector::named("errors"))
        .await
        .unwrap()
        .into_value()
        .unwrap();

    assert_eq!(codes.len(), 61);
    assert_eq!(codes.last().map(|c| c.0), Some(999));
}

#[tokio::test]
async fn test_error_categories() {
    let err = EveApiError::from(ApiError::translate(
        200,
        "Current security level not high enough.",
    ));
    assert_eq!(
        err.api_error_kind(),
        Some(ApiErrorKind::SecurityLevelNotHighEnough)
    );
    assert_eq!(
        err.api_error_kind().map(|k| k.category()),
        Some(ErrorCategory::Authorization)
    );
    assert!(err.to_string().contains("Should you be using the full API Key?"));
    assert!(err.is_api_error());
    assert!(!err.is_retryable());
}
