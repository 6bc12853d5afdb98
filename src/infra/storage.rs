use anyhow::{anyhow, Result};
use aws_config::meta::region::RegionProviderChain;
use aws_config::BehaviorVersion;
use aws_config::Region;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client;
use bytes::Bytes;
use time::OffsetDateTime;
use url::Url;

use crate::config::AppConfig;

#[derive(Clone)]
pub struct ObjectStorage {
    client: Client,
    bucket: String,
    public_endpoint: String,
}

impl ObjectStorage {
    pub async fn new(config: &AppConfig) -> Result<Self> {
        let region_provider = RegionProviderChain::first_try(Region::new(config.s3_region.clone()));
        let shared_config = aws_config::defaults(BehaviorVersion::latest())
            .region(region_provider)
            .load()
            .await;

        let mut s3_builder = aws_sdk_s3::config::Builder::from(&shared_config)
            .region(shared_config.region().cloned())
            .endpoint_url(config.s3_endpoint.clone())
            .force_path_style(config.s3_force_path_style);
        if let Some(provider) = shared_config.credentials_provider() {
            s3_builder = s3_builder.credentials_provider(provider);
        }
        let s3_config = s3_builder.build();

        let client = Client::from_conf(s3_config);

        Ok(Self {
            client,
            bucket: config.s3_bucket.clone(),
            public_endpoint: config.s3_public_endpoint.clone(),
        })
    }

    pub fn client(&self) -> &Client {
        &self.client
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    /// Creates the bucket when it is missing. Failures are logged, not returned.
    pub async fn ensure_bucket(&self) {
        if self
            .client
            .head_bucket()
            .bucket(&self.bucket)
            .send()
            .await
            .is_ok()
        {
            tracing::debug!(bucket = %self.bucket, "bucket already exists");
            return;
        }

        match self.client.create_bucket().bucket(&self.bucket).send().await {
            Ok(_) => tracing::info!(bucket = %self.bucket, "bucket created"),
            Err(err) => {
                tracing::warn!(error = ?err, bucket = %self.bucket, "could not create bucket, assuming it exists")
            }
        }
    }

    pub async fn upload(&self, key: &str, body: Bytes, content_type: &str) -> Result<()> {
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .content_type(content_type)
            .body(ByteStream::from(body))
            .send()
            .await?;
        Ok(())
    }

    pub async fn remove(&self, key: &str) -> Result<()> {
        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await?;
        Ok(())
    }

    pub async fn exists(&self, key: &str) -> Result<bool> {
        match self
            .client
            .head_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
        {
            Ok(_) => Ok(true),
            Err(err) => {
                let err = err.into_service_error();
                if err.is_not_found() {
                    Ok(false)
                } else {
                    Err(err.into())
                }
            }
        }
    }

    /// Path-style URL of an object under the public endpoint.
    pub fn public_url(&self, key: &str) -> Result<String> {
        public_object_url(&self.public_endpoint, &self.bucket, key)
    }
}

fn public_object_url(public_endpoint: &str, bucket: &str, key: &str) -> Result<String> {
    let mut url = if public_endpoint.contains("://") {
        Url::parse(public_endpoint)?
    } else {
        Url::parse(&format!("http://{}", public_endpoint))?
    };

    url.path_segments_mut()
        .map_err(|_| anyhow!("public endpoint cannot be a base URL"))?
        .pop_if_empty()
        .push(bucket)
        .push(key);

    Ok(url.to_string())
}

/// Builds `<unix millis>-<filename>` with the filename reduced to
/// `[A-Za-z0-9._-]`, so the key always maps to exactly one URL path segment.
pub fn storage_key(original_filename: &str, now: OffsetDateTime) -> String {
    let millis = now.unix_timestamp_nanos() / 1_000_000;
    let sanitized: String = original_filename
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let sanitized = if sanitized.is_empty() {
        "image".to_string()
    } else {
        sanitized
    };

    format!("{}-{}", millis, sanitized)
}

/// Recovers the object key from a stored public URL (its final path segment).
pub fn key_from_url(image_url: &str) -> Option<String> {
    let url = Url::parse(image_url).ok()?;
    let segment = url.path_segments()?.last()?;
    if segment.is_empty() {
        None
    } else {
        Some(segment.to_string())
    }
}
