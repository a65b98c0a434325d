use clap::Parser;
use reqwest::StatusCode;
use serde_json::json;
use tokio::net::TcpListener;
use udm_server::config::Config;
use udm_server::{AppBuilder, adapters};

mod common;

fn config(extra: &[&str]) -> Config {
    let mut args = vec![
        "udm-server",
        "--website-base-url",
        "https://udm.example.com/",
        "--s3-website-bucket",
        "udm-website",
        "--sqs-queue-url",
        "http://127.0.0.1:1/000000000000/udm-messages",
        "--aws-region",
        "us-east-1",
        "--aws-endpoint",
        "http://127.0.0.1:1",
        "--aws-access-key",
        "test",
        "--aws-secret-key",
        "test",
        "--text-to-speech",
        "false",
    ];
    args.extend_from_slice(extra);
    Config::try_parse_from(args).unwrap()
}

#[tokio::test]
async fn test_builder_wires_routers() {
    common::setup_tracing();
    let config = config(&["--notify-channel", "disabled"]);
    config.validate().unwrap();

    let sdk_config = adapters::aws::load_sdk_config(&config.aws).await;
    let app = AppBuilder::new(config).with_aws(sdk_config).build().unwrap();

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let mgmt_listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let server_url = format!("http://{}", listener.local_addr().unwrap());
    let mgmt_url = format!("http://{}", mgmt_listener.local_addr().unwrap());
    tokio::spawn(async move { axum::serve(listener, app.router).await.unwrap() });
    tokio::spawn(async move { axum::serve(mgmt_listener, app.mgmt_router).await.unwrap() });

    let client = reqwest::Client::new();
    let resp = client.get(format!("{mgmt_url}/livez")).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    // Validation never reaches AWS, so it works with unreachable endpoints.
    let resp = client.post(format!("{server_url}/api/messages")).json(&json!({ "text": " " })).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_builder_requires_aws_configuration() {
    let config = config(&["--notify-channel", "disabled"]);
    assert!(AppBuilder::new(config).build().is_err());
}

#[tokio::test]
async fn test_builder_wires_sms_with_file_credentials() {
    let config = config(&[
        "--sms-source-phone",
        "+15550000001",
        "--sms-destination-phone",
        "+15550000002",
        "--twilio-creds-file",
        "/run/secrets/twilio.json",
    ]);
    config.validate().unwrap();

    let sdk_config = adapters::aws::load_sdk_config(&config.aws).await;
    assert!(AppBuilder::new(config).with_aws(sdk_config).with_http_client(reqwest::Client::new()).build().is_ok());
}
