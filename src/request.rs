use std::fmt;
use std::path::{Path, PathBuf};

use typed_builder::TypedBuilder;

/// Static access key pair taken from the command line. Held in memory only.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    access_key_id: String,
    secret_access_key: String,
}

impl Credentials {
    pub fn new(access_key_id: impl Into<String>, secret_access_key: impl Into<String>) -> Self {
        Self {
            access_key_id: access_key_id.into(),
            secret_access_key: secret_access_key.into(),
        }
    }

    pub fn access_key_id(&self) -> &str {
        &self.access_key_id
    }

    pub fn secret_access_key(&self) -> &str {
        &self.secret_access_key
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"** redacted **")
            .finish()
    }
}

/// A fully resolved upload: the key has already had its placeholder substituted.
///
/// Built once per invocation and consumed by a single upload call.
#[derive(Debug, Clone, PartialEq, Eq, TypedBuilder)]
pub struct UploadRequest {
    #[builder(setter(into))]
    bucket: String,

    #[builder(setter(into))]
    file: PathBuf,

    #[builder(setter(into))]
    key: String,

    /// Store the object with the `public-read` canned ACL.
    #[builder(default = false)]
    public_read: bool,
}

impl UploadRequest {
    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    pub fn file(&self) -> &Path {
        &self.file
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn public_read(&self) -> bool {
        self.public_read
    }
}
