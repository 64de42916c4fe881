//! S3-compatible object storage provider.

use async_trait::async_trait;
use aws_sdk_s3::Client;
use aws_sdk_s3::config::{BehaviorVersion, Credentials, Region};
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::primitives::ByteStream as S3ByteStream;
use bytes::Bytes;
use tokio_util::io::ReaderStream;
use tracing::{debug, info};

use assethub_core::config::S3StorageConfig;
use assethub_core::error::{AppError, ErrorKind};
use assethub_core::result::AppResult;
use assethub_core::traits::storage::{ByteStream, StorageObjectMeta, StorageProvider};

/// S3-compatible storage provider. Storage paths are used as object keys.
#[derive(Debug, Clone)]
pub struct S3StorageProvider {
    client: Client,
    bucket: String,
    public_base_url: String,
}

impl S3StorageProvider {
    /// Create a new S3 storage provider.
    pub async fn new(config: &S3StorageConfig) -> AppResult<Self> {
        if config.bucket.is_empty() {
            return Err(AppError::configuration("storage.s3.bucket must be set"));
        }
        info!(
            endpoint = %config.endpoint,
            region = %config.region,
            bucket = %config.bucket,
            "Initializing S3 storage provider"
        );

        let mut loader =
            aws_config::defaults(BehaviorVersion::latest()).region(Region::new(config.region.clone()));
        if !config.access_key.is_empty() {
            loader = loader.credentials_provider(Credentials::new(
                config.access_key.clone(),
                config.secret_key.clone(),
                None,
                None,
                "assethub",
            ));
        }
        let shared = loader.load().await;

        let mut builder = aws_sdk_s3::config::Builder::from(&shared);
        if !config.endpoint.is_empty() {
            builder = builder.endpoint_url(&config.endpoint).force_path_style(true);
        }

        Ok(Self {
            client: Client::from_conf(builder.build()),
            bucket: config.bucket.clone(),
            public_base_url: public_base_url(config),
        })
    }

    fn key(path: &str) -> &str {
        path.trim_start_matches('/')
    }

    fn sdk_error(action: &str, path: &str, e: impl std::error::Error) -> AppError {
        AppError::new(
            ErrorKind::Storage,
            format!("Failed to {action} '{path}': {}", DisplayErrorContext(e)),
        )
    }
}

/// Base URL objects are publicly reachable under.
fn public_base_url(config: &S3StorageConfig) -> String {
    if !config.public_base_url.is_empty() {
        return config.public_base_url.trim_end_matches('/').to_string();
    }
    if !config.endpoint.is_empty() {
        return format!("{}/{}", config.endpoint.trim_end_matches('/'), config.bucket);
    }
    format!("https://{}.s3.{}.amazonaws.com", config.bucket, config.region)
}

#[async_trait]
impl StorageProvider for S3StorageProvider {
    fn provider_type(&self) -> &str {
        "s3"
    }

    async fn health_check(&self) -> AppResult<bool> {
        Ok(self
            .client
            .head_bucket()
            .bucket(&self.bucket)
            .send()
            .await
            .is_ok())
    }

    async fn read(&self, path: &str) -> AppResult<ByteStream> {
        let output = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(Self::key(path))
            .send()
            .await
            .map_err(|e| {
                if e.as_service_error().is_some_and(|se| se.is_no_such_key()) {
                    AppError::not_found(format!("File not found: {path}"))
                } else {
                    Self::sdk_error("read object", path, e)
                }
            })?;

        let reader = output.body.into_async_read();
        Ok(Box::pin(ReaderStream::new(reader)))
    }

    async fn read_bytes(&self, path: &str) -> AppResult<Bytes> {
        let output = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(Self::key(path))
            .send()
            .await
            .map_err(|e| {
                if e.as_service_error().is_some_and(|se| se.is_no_such_key()) {
                    AppError::not_found(format!("File not found: {path}"))
                } else {
                    Self::sdk_error("read object", path, e)
                }
            })?;

        let data = output
            .body
            .collect()
            .await
            .map_err(|e| Self::sdk_error("read object body", path, e))?;
        Ok(data.into_bytes())
    }

    async fn write(&self, path: &str, data: Bytes) -> AppResult<()> {
        let len = data.len();
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(Self::key(path))
            .content_length(len as i64)
            .body(S3ByteStream::from(data))
            .send()
            .await
            .map_err(|e| Self::sdk_error("write object", path, e))?;
        debug!(path, bytes = len, "Wrote object");
        Ok(())
    }

    async fn delete(&self, path: &str) -> AppResult<()> {
        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(Self::key(path))
            .send()
            .await
            .map_err(|e| Self::sdk_error("delete object", path, e))?;
        Ok(())
    }

    async fn copy(&self, from: &str, to: &str) -> AppResult<()> {
        self.client
            .copy_object()
            .bucket(&self.bucket)
            .copy_source(format!("{}/{}", self.bucket, Self::key(from)))
            .key(Self::key(to))
            .send()
            .await
            .map_err(|e| Self::sdk_error("copy object", from, e))?;
        debug!(from, to, "Copied object");
        Ok(())
    }

    async fn rename(&self, from: &str, to: &str) -> AppResult<()> {
        if !self.exists(from).await? {
            return Err(AppError::not_found(format!("File not found: {from}")));
        }
        self.copy(from, to).await?;
        self.delete(from).await?;
        debug!(from, to, "Moved object");
        Ok(())
    }

    async fn exists(&self, path: &str) -> AppResult<bool> {
        match self
            .client
            .head_object()
            .bucket(&self.bucket)
            .key(Self::key(path))
            .send()
            .await
        {
            Ok(_) => Ok(true),
            Err(e) if e.as_service_error().is_some_and(|se| se.is_not_found()) => Ok(false),
            Err(e) => Err(Self::sdk_error("stat object", path, e)),
        }
    }

    async fn metadata(&self, path: &str) -> AppResult<StorageObjectMeta> {
        let output = self
            .client
            .head_object()
            .bucket(&self.bucket)
            .key(Self::key(path))
            .send()
            .await
            .map_err(|e| {
                if e.as_service_error().is_some_and(|se| se.is_not_found()) {
                    AppError::not_found(format!("File not found: {path}"))
                } else {
                    Self::sdk_error("stat object", path, e)
                }
            })?;

        Ok(StorageObjectMeta {
            path: path.to_string(),
            size_bytes: output.content_length().unwrap_or_default().max(0) as u64,
            last_modified: output
                .last_modified()
                .and_then(|t| chrono::DateTime::from_timestamp(t.secs(), t.subsec_nanos())),
        })
    }

    fn public_url(&self, path: &str) -> Option<String> {
        Some(format!("{}/{}", self.public_base_url, Self::key(path)))
    }
}
