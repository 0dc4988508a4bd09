#![allow(dead_code)]

use std::future::ready;
use std::sync::{Arc, Mutex};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use s3_uploader::{
    app, Clock, ObjectStore, ProgressEvent, ProgressHook, SharedOutput, StoreConfig, UploadError,
    UploadRequest,
};

pub struct FixedClock(pub SystemTime);

impl FixedClock {
    pub fn at_secs(secs: u64) -> Self {
        Self(UNIX_EPOCH + Duration::from_secs(secs))
    }
}

impl Clock for FixedClock {
    fn now(&self) -> SystemTime {
        self.0
    }
}

#[derive(Default)]
struct FakeState {
    connects: Vec<StoreConfig>,
    calls: Vec<UploadRequest>,
    kept_hook: Option<ProgressHook>,
}

/// Records every call, emits scripted progress and returns a scripted outcome.
#[derive(Clone, Default)]
pub struct FakeStore {
    state: Arc<Mutex<FakeState>>,
    events: Vec<ProgressEvent>,
    failure: Option<String>,
}

impl FakeStore {
    pub fn succeeding() -> Self {
        Self::default()
    }

    pub fn failing(message: &str) -> Self {
        Self {
            failure: Some(message.to_owned()),
            ..Self::default()
        }
    }

    pub fn with_events(mut self, events: impl IntoIterator<Item = ProgressEvent>) -> Self {
        self.events = events.into_iter().collect();
        self
    }

    pub fn connects(&self) -> Vec<StoreConfig> {
        self.state.lock().unwrap().connects.clone()
    }

    pub fn calls(&self) -> Vec<UploadRequest> {
        self.state.lock().unwrap().calls.clone()
    }

    /// Fire the hook the store was handed, after the upload already returned.
    pub fn fire_late(&self, event: ProgressEvent) {
        let hook = self.state.lock().unwrap().kept_hook.clone();
        if let Some(hook) = hook {
            hook(event);
        }
    }
}

#[async_trait]
impl ObjectStore for FakeStore {
    async fn put_file(
        &self,
        request: &UploadRequest,
        progress: Option<ProgressHook>,
    ) -> Result<(), UploadError> {
        self.state.lock().unwrap().calls.push(request.clone());

        if let Some(hook) = &progress {
            for event in &self.events {
                hook(*event);
            }
        }
        self.state.lock().unwrap().kept_hook = progress;

        match &self.failure {
            Some(message) => Err(UploadError::new(message.clone())),
            None => Ok(()),
        }
    }
}

pub struct Harness {
    pub store: FakeStore,
    pub clock: FixedClock,
    buf: Arc<Mutex<Vec<u8>>>,
}

impl Harness {
    pub fn new(store: FakeStore) -> Self {
        tracing_subscriber::fmt()
            .with_test_writer()
            .try_init()
            .ok();

        Self {
            store,
            clock: FixedClock::at_secs(1_700_000_000),
            buf: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub async fn run(&self, args: &[&str]) -> u8 {
        let out: SharedOutput = self.buf.clone();
        let argv = std::iter::once("s3-uploader").chain(args.iter().copied());
        let store = self.store.clone();

        app::run(
            argv,
            |config| {
                store.state.lock().unwrap().connects.push(config);
                ready(store.clone())
            },
            &self.clock,
            out,
        )
        .await
    }

    pub fn stdout(&self) -> String {
        String::from_utf8(self.buf.lock().unwrap().clone()).unwrap()
    }
}

/// The five required flags, pointing at `file`.
pub fn required_args(file: &str) -> Vec<String> {
    [
        "--bucket",
        "mybucket",
        "--file",
        file,
        "--key",
        "uploads/test.txt",
        "--accessKey",
        "AKIDEXAMPLE",
        "--secretKey",
        "secret",
    ]
    .iter()
    .map(|s| (*s).to_owned())
    .collect()
}
