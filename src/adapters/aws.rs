use crate::config::{AwsConfig, StorageConfig};
use aws_config::{BehaviorVersion, Region, SdkConfig};

/// Loads the shared AWS configuration, applying region, endpoint and static
/// credential overrides when present.
pub async fn load_sdk_config(config: &AwsConfig) -> SdkConfig {
    let mut loader = aws_config::defaults(BehaviorVersion::latest());

    if let Some(region) = &config.region {
        loader = loader.region(Region::new(region.clone()));
    }
    if let Some(endpoint) = &config.endpoint {
        loader = loader.endpoint_url(endpoint);
    }
    if let (Some(access_key), Some(secret_key)) = (&config.access_key, &config.secret_key) {
        loader = loader.credentials_provider(aws_credential_types::Credentials::new(
            access_key,
            secret_key,
            None,
            None,
            "static",
        ));
    }

    loader.load().await
}

#[must_use]
pub fn s3_client(sdk_config: &SdkConfig, storage: &StorageConfig) -> aws_sdk_s3::Client {
    let builder = aws_sdk_s3::config::Builder::from(sdk_config).force_path_style(storage.force_path_style);
    aws_sdk_s3::Client::from_conf(builder.build())
}

#[must_use]
pub fn sqs_client(sdk_config: &SdkConfig) -> aws_sdk_sqs::Client {
    aws_sdk_sqs::Client::new(sdk_config)
}

#[must_use]
pub fn polly_client(sdk_config: &SdkConfig) -> aws_sdk_polly::Client {
    aws_sdk_polly::Client::new(sdk_config)
}

#[must_use]
pub fn ssm_client(sdk_config: &SdkConfig) -> aws_sdk_ssm::Client {
    aws_sdk_ssm::Client::new(sdk_config)
}

#[must_use]
pub fn sns_client(sdk_config: &SdkConfig) -> aws_sdk_sns::Client {
    aws_sdk_sns::Client::new(sdk_config)
}
