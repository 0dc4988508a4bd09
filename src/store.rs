//! Object store collaborator.
//!
//! [`ObjectStore`] is the seam between the CLI flow and the storage service.
//! [`S3Store`] is the real implementation on top of `aws-sdk-s3`; tests supply
//! their own.

use std::sync::{Arc, PoisonError, RwLock};

use async_trait::async_trait;
use aws_sdk_s3::config::{Credentials as SdkCredentials, Region};
use aws_sdk_s3::error::{DisplayErrorContext, ProvideErrorMetadata};
use aws_sdk_s3::operation::put_object::builders::PutObjectFluentBuilder;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::types::ObjectCannedAcl;
use aws_sdk_s3::Client;
use tracing::{debug, info};

use crate::error::UploadError;
use crate::progress::{ProgressEvent, ProgressHook, TrackableRequest};
use crate::request::{Credentials, UploadRequest};

#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Upload the whole file in one logical operation, applying the
    /// `public-read` ACL when requested. Returns once the transfer has
    /// completed or failed.
    async fn put_file(
        &self,
        request: &UploadRequest,
        progress: Option<ProgressHook>,
    ) -> Result<(), UploadError>;
}

/// Run a single upload against `store`.
///
/// The progress hook handed to the store is closed before this returns, so
/// notifications the store emits late never reach `progress`.
pub async fn execute<S>(
    store: &S,
    request: &UploadRequest,
    progress: Option<ProgressHook>,
) -> Result<(), UploadError>
where
    S: ObjectStore + ?Sized,
{
    let open = Arc::new(RwLock::new(true));
    let gated = progress.map(|hook| {
        let open = Arc::clone(&open);
        Arc::new(move |event: ProgressEvent| {
            let open = open.read().unwrap_or_else(PoisonError::into_inner);
            if *open {
                hook(event);
            }
        }) as ProgressHook
    });

    let result = store.put_file(request, gated).await;
    // waits for any notification already in flight
    *open.write().unwrap_or_else(PoisonError::into_inner) = false;
    result
}

/// Connection settings for [`S3Store`].
#[derive(Debug, Clone)]
pub struct StoreConfig {
    pub credentials: Credentials,
    pub region: String,
    /// Custom endpoint for S3-compatible services. Implies path-style addressing.
    pub endpoint: Option<String>,
}

#[derive(Debug, Clone)]
pub struct S3Store {
    client: Client,
}

impl S3Store {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    pub async fn connect(config: &StoreConfig) -> Self {
        let credentials = SdkCredentials::new(
            config.credentials.access_key_id(),
            config.credentials.secret_access_key(),
            None,
            None,
            "command-line",
        );

        let mut loader = aws_config::from_env()
            .region(Region::new(config.region.clone()))
            .credentials_provider(credentials);
        if let Some(endpoint) = &config.endpoint {
            loader = loader.endpoint_url(endpoint);
        }
        let shared = loader.load().await;

        let mut builder = aws_sdk_s3::config::Builder::from(&shared);
        if config.endpoint.is_some() {
            builder = builder.force_path_style(true);
        }
        debug!(region = %config.region, endpoint = ?config.endpoint, "configured s3 client");

        Self::new(Client::from_conf(builder.build()))
    }

    fn put_object(&self, request: &UploadRequest, body: ByteStream) -> PutObjectFluentBuilder {
        let builder = self
            .client
            .put_object()
            .bucket(request.bucket())
            .key(request.key())
            .body(body);

        if request.public_read() {
            builder.acl(ObjectCannedAcl::PublicRead)
        } else {
            builder
        }
    }
}

#[async_trait]
impl ObjectStore for S3Store {
    async fn put_file(
        &self,
        request: &UploadRequest,
        progress: Option<ProgressHook>,
    ) -> Result<(), UploadError> {
        let body = ByteStream::from_path(request.file()).await.map_err(|err| {
            UploadError::new(format!(
                "{}: {}",
                request.file().display(),
                DisplayErrorContext(&err)
            ))
        })?;

        info!(
            bucket = request.bucket(),
            key = request.key(),
            public_read = request.public_read(),
            "uploading {}",
            request.file().display()
        );

        let builder = self.put_object(request, body);
        let result = match progress {
            Some(hook) => {
                builder
                    .send_tracked(move |_chunk, written, total| {
                        hook(ProgressEvent::new(written, total));
                    })
                    .await
            }
            None => builder.send().await.map_err(aws_sdk_s3::Error::from),
        };

        result
            .map(|output| debug!(e_tag = ?output.e_tag(), "upload complete"))
            .map_err(|err| UploadError::new(service_message(&err)))
    }
}

/// The service's own message (e.g. "Access Denied"), else its error code,
/// else the full error chain for failures that never reached the service.
fn service_message(err: &aws_sdk_s3::Error) -> String {
    // `aws_sdk_s3::Error` itself does not implement `ProvideErrorMetadata`
    // in this SDK version; each variant's payload does.
    fn metadata_message<E: ProvideErrorMetadata>(inner: &E) -> Option<String> {
        ProvideErrorMetadata::message(inner)
            .or_else(|| ProvideErrorMetadata::code(inner))
            .map(str::to_owned)
    }

    use aws_sdk_s3::Error as E;
    let found = match err {
        E::BucketAlreadyExists(inner) => metadata_message(inner),
        E::BucketAlreadyOwnedByYou(inner) => metadata_message(inner),
        E::InvalidObjectState(inner) => metadata_message(inner),
        E::NoSuchBucket(inner) => metadata_message(inner),
        E::NoSuchKey(inner) => metadata_message(inner),
        E::NoSuchUpload(inner) => metadata_message(inner),
        E::NotFound(inner) => metadata_message(inner),
        E::ObjectAlreadyInActiveTierError(inner) => metadata_message(inner),
        E::ObjectNotInActiveTierError(inner) => metadata_message(inner),
        E::Unhandled(inner) => metadata_message(inner),
        _ => None,
    };
    found.unwrap_or_else(|| DisplayErrorContext(err).to_string())
}
