use crate::traits::{Storage, StorageError, StorageResult};
use crate::StorageBackend;
use async_trait::async_trait;
use bytes::Bytes;
use http::Method;
use object_store::aws::{AmazonS3, AmazonS3Builder};
use object_store::path::Path as ObjectPath;
use object_store::signer::Signer;
use object_store::{
    Attribute, AttributeValue, Attributes, ObjectStore, PutOptions, PutPayload,
    Result as ObjectResult,
};
use std::path::Path;
use std::time::Duration;

/// Explicit credentials for the S3 client. When absent, the ambient AWS credential chain
/// (environment, instance profile) is used.
#[derive(Clone, Debug)]
pub struct S3Credentials {
    pub access_key_id: String,
    pub secret_access_key: String,
}

/// Put options carrying the object's `Content-Type`, served back on signed GETs.
fn put_options(content_type: &str) -> PutOptions {
    let mut attributes = Attributes::new();
    attributes.insert(
        Attribute::ContentType,
        AttributeValue::from(content_type.to_string()),
    );
    PutOptions {
        attributes,
        ..Default::default()
    }
}

/// S3 storage implementation
#[derive(Clone)]
pub struct S3Storage {
    store: AmazonS3,
    bucket: String,
    region: String,
    endpoint_url: Option<String>, // Custom endpoint for S3-compatible providers
}

impl S3Storage {
    /// Create a new S3Storage instance
    ///
    /// # Arguments
    /// * `bucket` - S3 bucket name
    /// * `region` - AWS region (or region identifier for S3-compatible providers)
    /// * `endpoint_url` - Optional custom endpoint URL for S3-compatible providers
    ///   (e.g., "http://localhost:9000" for MinIO)
    /// * `credentials` - Optional explicit access key pair
    pub async fn new(
        bucket: String,
        region: String,
        endpoint_url: Option<String>,
        credentials: Option<S3Credentials>,
    ) -> StorageResult<Self> {
        let mut builder = AmazonS3Builder::from_env()
            .with_region(region.clone())
            .with_bucket_name(bucket.clone());

        if let Some(creds) = credentials {
            builder = builder
                .with_access_key_id(creds.access_key_id)
                .with_secret_access_key(creds.secret_access_key);
        }

        if let Some(ref endpoint) = endpoint_url {
            let allow_http = endpoint.starts_with("http://");
            builder = builder
                .with_endpoint(endpoint.clone())
                .with_allow_http(allow_http);
        }

        let store = builder
            .build()
            .map_err(|e| StorageError::ConfigError(e.to_string()))?;

        Ok(S3Storage {
            store,
            bucket,
            region,
            endpoint_url,
        })
    }

    /// Generate the (unsigned) object URL
    ///
    /// For AWS S3: https://{bucket}.s3.{region}.amazonaws.com/{key}
    /// For S3-compatible providers, path-style under the endpoint: {endpoint}/{bucket}/{key}
    fn generate_url(&self, key: &str) -> String {
        if let Some(ref endpoint) = self.endpoint_url {
            let base_url = endpoint.trim_end_matches('/');
            format!("{}/{}/{}", base_url, self.bucket, key)
        } else {
            format!(
                "https://{}.s3.{}.amazonaws.com/{}",
                self.bucket, self.region, key
            )
        }
    }
}

#[async_trait]
impl Storage for S3Storage {
    async fn upload_file(
        &self,
        local_path: &Path,
        storage_key: &str,
        content_type: &str,
    ) -> StorageResult<String> {
        if !crate::keys::validate_key(storage_key) {
            return Err(StorageError::InvalidKey(storage_key.to_string()));
        }

        let start = std::time::Instant::now();
        let data = tokio::fs::read(local_path).await.map_err(|e| {
            StorageError::UploadFailed(format!(
                "Failed to read {}: {}",
                local_path.display(),
                e
            ))
        })?;
        let size = data.len() as u64;
        let location = ObjectPath::from(storage_key.to_string());

        let result: ObjectResult<_> = self
            .store
            .put_opts(
                &location,
                PutPayload::from(Bytes::from(data)),
                put_options(content_type),
            )
            .await;

        result.map_err(|e| {
            tracing::error!(
                error = %e,
                bucket = %self.bucket,
                key = %storage_key,
                size_bytes = size,
                duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                "S3 upload failed"
            );
            StorageError::UploadFailed(e.to_string())
        })?;

        tracing::info!(
            bucket = %self.bucket,
            key = %storage_key,
            size_bytes = size,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "S3 upload successful"
        );

        Ok(self.generate_url(storage_key))
    }

    async fn get_presigned_url(
        &self,
        storage_key: &str,
        expires_in: Duration,
    ) -> StorageResult<String> {
        let location = ObjectPath::from(storage_key.to_string());
        let url_result: ObjectResult<_> = self
            .store
            .signed_url(Method::GET, &location, expires_in)
            .await;

        let url = url_result
            .map_err(|e| StorageError::BackendError(e.to_string()))?
            .to_string();

        Ok(url)
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::S3
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn credentials() -> Option<S3Credentials> {
        Some(S3Credentials {
            access_key_id: "AKIDEXAMPLE".to_string(),
            secret_access_key: "wJalrXUtnFEMI/K7MDENG+bPxRfiCYEXAMPLEKEY".to_string(),
        })
    }

    #[test]
    fn upload_sets_content_type_attribute() {
        let opts = put_options("application/pdf");
        let value: Option<&str> = opts
            .attributes
            .get(&Attribute::ContentType)
            .map(|v| v.as_ref());
        assert_eq!(value, Some("application/pdf"));
    }

    #[tokio::test]
    async fn object_url_uses_virtual_host_style_on_aws() {
        let storage = S3Storage::new(
            "docs".to_string(),
            "eu-west-1".to_string(),
            None,
            credentials(),
        )
        .await
        .unwrap();
        assert_eq!(
            storage.generate_url("converted/a.pdf"),
            "https://docs.s3.eu-west-1.amazonaws.com/converted/a.pdf"
        );
    }

    #[tokio::test]
    async fn object_url_uses_path_style_on_custom_endpoint() {
        let storage = S3Storage::new(
            "docs".to_string(),
            "us-east-1".to_string(),
            Some("http://localhost:9000/".to_string()),
            credentials(),
        )
        .await
        .unwrap();
        assert_eq!(
            storage.generate_url("converted/a.pdf"),
            "http://localhost:9000/docs/converted/a.pdf"
        );
    }

    #[tokio::test]
    async fn presigned_url_is_signed_locally() {
        let storage = S3Storage::new(
            "docs".to_string(),
            "eu-west-1".to_string(),
            None,
            credentials(),
        )
        .await
        .unwrap();

        let url = storage
            .get_presigned_url("converted/a.pdf", Duration::from_secs(3600))
            .await
            .unwrap();

        assert!(url.starts_with("https://"));
        assert!(url.contains("converted/a.pdf"));
        assert!(url.contains("X-Amz-Expires=3600"));
        assert!(url.contains("X-Amz-Signature="));
    }

    #[tokio::test]
    async fn upload_rejects_traversal_keys() {
        let storage = S3Storage::new(
            "docs".to_string(),
            "eu-west-1".to_string(),
            None,
            credentials(),
        )
        .await
        .unwrap();
        let result = storage
            .upload_file(Path::new("/tmp/nothing.pdf"), "../escape.pdf", "application/pdf")
            .await;
        assert!(matches!(result, Err(StorageError::InvalidKey(_))));
    }
}
