//! Upload a single local file to an S3 bucket.
//!
//! The binary is a thin wrapper over [`app::run`]; everything it does is
//! reachable from here so the flow can be driven with a fake [`ObjectStore`].

pub mod app;
pub mod cli;
pub mod error;
pub mod key;
pub mod progress;
pub mod render;
pub mod request;
pub mod store;

pub use error::{Error, Result, UploadError};
pub use key::{resolve_key, Clock, SystemClock, UNIX_TIMESTAMP_TOKEN};
pub use progress::{ProgressEvent, ProgressHook, TrackableRequest};
pub use render::{ProgressRenderer, SharedOutput};
pub use request::{Credentials, UploadRequest};
pub use store::{ObjectStore, S3Store, StoreConfig};
