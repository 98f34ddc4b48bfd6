use std::fs;
use tracing::info;

// Adds automatic logging to test
mod test_utils {
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    pub const SHARE_PRICE_PAGE: &str = r#"
<html><body>
<h3>Thursday, January 29, 2026</h3>
<table class="table">
  <tr><td><b>G Fund</b>&nbsp;</td><td>$19.1876</td></tr>
  <tr><td><b>F Fund</b>&nbsp;</td><td>$20.9901</td></tr>
  <tr><td><b>C Fund</b>&nbsp;</td><td>$99.12</td></tr>
  <tr><td><b>S Fund</b>&nbsp;</td><td>$88.45</td></tr>
  <tr><td><b>I Fund</b>&nbsp;</td><td>$47.02</td></tr>
</table>
<h3>Wednesday, January 28, 2026</h3>
<table class="table">
  <tr><td><b>C Fund</b>&nbsp;</td><td>$98.70</td></tr>
</table>
</body></html>
"#;

    /// Serves the same share price page for every month and one CSV per series.
    pub async fn create_mock_server() -> MockServer {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/daily-share-prices/"))
            .respond_with(ResponseTemplate::new(200).set_body_string(SHARE_PRICE_PAGE))
            .mount(&mock_server)
            .await;

        for (series_id, value) in [("DFF", "3.64"), ("DFEDTARL", "3.50"), ("DFEDTARU", ".")] {
            let body = format!("observation_date,{series_id}\n2026-01-28,3.33\n2026-01-29,{value}\n");
            Mock::given(method("GET"))
                .and(path("/graph/fredgraph.csv"))
                .and(query_param("id", series_id))
                .respond_with(ResponseTemplate::new(200).set_body_string(body))
                .mount(&mock_server)
                .await;
        }

        mock_server
    }
}

fn write_config(dir: &std::path::Path, base_url: &str) -> std::path::PathBuf {
    let config_path = dir.join("config.yaml");
    let config_content = format!(
        r#"
data_path: "{}"
providers:
  fred:
    base_url: "{base_url}"
  tsp:
    base_url: "{base_url}"
http:
  timeout_secs: 5
producer: "integration-test"
"#,
        dir.join("data").display()
    );
    fs::write(&config_path, config_content).expect("Failed to write config file");
    config_path
}

#[test_log::test(tokio::test)]
async fn test_full_app_flow_with_mock() {
    let mock_server = test_utils::create_mock_server().await;
    let temp_dir = tempfile::TempDir::new().expect("Failed to create temp dir");
    let config_path = write_config(temp_dir.path(), &mock_server.uri());
    let config_path = config_path.to_str().unwrap();

    let result = tspfed::run_command(tspfed::AppCommand::Update { period: None }, Some(config_path)).await;
    assert!(result.is_ok(), "Update failed with: {:?}", result.err());

    let data_dir = temp_dir.path().join("data");
    let latest = fs::read_to_string(data_dir.join("latest.json")).unwrap();
    info!(%latest, "Wrote latest payload");

    let payload: serde_json::Value = serde_json::from_str(&latest).unwrap();
    assert_eq!(payload["schema_version"], "v1");
    assert_eq!(payload["trade_date"], "2026-01-29");
    assert_eq!(payload["tsp"]["funds"]["C"], 99.12);
    assert_eq!(payload["tsp"]["funds"]["S"], 88.45);
    assert_eq!(payload["tsp"]["funds"]["I"], 47.02);
    assert_eq!(payload["tsp"]["funds"]["G"], 19.1876);
    assert_eq!(payload["tsp"]["funds"]["F"], 20.9901);
    assert_eq!(payload["fed"]["effective_fed_funds_rate"], 3.64);
    assert_eq!(payload["fed"]["target_lower"], 3.5);
    assert!(payload["fed"]["target_upper"].is_null());
    assert_eq!(payload["fed"]["source"].as_array().unwrap().len(), 3);
    assert_eq!(payload["meta"]["producer"], "integration-test");

    let snapshot = data_dir.join("snapshots").join("2026-01-29.json");
    assert_eq!(fs::read_to_string(&snapshot).unwrap(), latest);
    assert_eq!(
        fs::read_to_string(data_dir.join("last_published_date.txt")).unwrap(),
        "2026-01-29\n"
    );

    // Same trade date again: no new snapshot
    let result = tspfed::run_command(tspfed::AppCommand::Update { period: None }, Some(config_path)).await;
    assert!(result.is_ok(), "Second update failed with: {:?}", result.err());
    assert_eq!(fs::read_dir(data_dir.join("snapshots")).unwrap().count(), 1);

    let result = tspfed::run_command(tspfed::AppCommand::Show, Some(config_path)).await;
    assert!(result.is_ok(), "Show failed with: {:?}", result.err());
}

#[test_log::test(tokio::test)]
async fn test_pinned_month_flow_with_mock() {
    let mock_server = test_utils::create_mock_server().await;
    let temp_dir = tempfile::TempDir::new().expect("Failed to create temp dir");
    let config_path = write_config(temp_dir.path(), &mock_server.uri());

    let result = tspfed::run_command(
        tspfed::AppCommand::Update {
            period: Some(tspfed::providers::MonthYear {
                month: 1,
                year: 2026,
            }),
        },
        Some(config_path.to_str().unwrap()),
    )
    .await;
    assert!(result.is_ok(), "Update failed with: {:?}", result.err());

    let requests = mock_server.received_requests().await.unwrap();
    let tsp_requests: Vec<_> = requests
        .iter()
        .filter(|r| r.url.path() == "/daily-share-prices/")
        .collect();
    assert_eq!(tsp_requests.len(), 1);
    assert_eq!(
        tsp_requests[0].url.query(),
        Some("tsp_month=1&tsp_year=2026")
    );
}

#[test_log::test(tokio::test)]
async fn test_unreachable_endpoints_write_nothing() {
    let mock_server = wiremock::MockServer::start().await;
    let temp_dir = tempfile::TempDir::new().expect("Failed to create temp dir");
    let config_path = write_config(temp_dir.path(), &mock_server.uri());

    // Nothing mounted: every request gets a 404
    let result = tspfed::run_command(
        tspfed::AppCommand::Update { period: None },
        Some(config_path.to_str().unwrap()),
    )
    .await;

    let err = result.expect_err("Update should fail");
    assert!(err.to_string().starts_with("failed to fetch TSP latest prices"));
    assert!(!temp_dir.path().join("data").join("latest.json").exists());
}
