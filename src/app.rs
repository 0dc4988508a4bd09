//! Top-level flow: parse, resolve the key, upload once, report.
//!
//! Nothing in here exits the process. [`run`] returns the exit status and
//! `main` hands it to the OS.

use std::ffi::OsString;
use std::future::Future;

use tracing::{debug, info, warn};

use crate::cli::{self, Cli, Invocation};
use crate::error::{Error, Result};
use crate::key::{resolve_key, Clock};
use crate::render::{lock, ProgressRenderer, SharedOutput};
use crate::request::UploadRequest;
use crate::store::{self, ObjectStore, StoreConfig};

pub const EXIT_SUCCESS: u8 = 0;
pub const EXIT_FAILURE: u8 = 1;

/// Run one invocation end to end and return the process exit status.
///
/// `connect` is only called once the arguments parsed successfully, so a bad
/// command line never reaches the store.
pub async fn run<I, T, C, Fut, S>(args: I, connect: C, clock: &dyn Clock, out: SharedOutput) -> u8
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
    C: FnOnce(StoreConfig) -> Fut,
    Fut: Future<Output = S>,
    S: ObjectStore,
{
    let cli = match cli::parse(args) {
        Ok(Invocation::Upload(cli)) => cli,
        Ok(Invocation::Info(text)) => {
            if let Err(err) = write!(lock(&out), "{text}") {
                debug!(error = %err, "failed to write help");
            }
            return EXIT_SUCCESS;
        }
        Err(err) => return report(&out, Err(err), false),
    };

    let store = connect(cli.store_config()).await;
    let result = upload(&cli, &store, clock, out.clone()).await;
    report(&out, result, cli.progress)
}

/// Build the request from parsed flags and perform the upload.
///
/// The key placeholder is resolved here, at call time.
pub async fn upload<S>(cli: &Cli, store: &S, clock: &dyn Clock, out: SharedOutput) -> Result<()>
where
    S: ObjectStore + ?Sized,
{
    let request = UploadRequest::builder()
        .bucket(cli.bucket.clone())
        .file(cli.file.clone())
        .key(resolve_key(&cli.key, clock.now()))
        .public_read(cli.public)
        .build();
    debug!(?request, "resolved upload request");

    let hook = cli
        .progress
        .then(|| ProgressRenderer::new(out).into_hook());
    store::execute(store, &request, hook).await?;

    info!(bucket = request.bucket(), key = request.key(), "upload finished");
    Ok(())
}

/// Print the outcome and map it to an exit status.
///
/// `progress_shown` terminates the in-place progress line first.
pub fn report(out: &SharedOutput, result: Result<()>, progress_shown: bool) -> u8 {
    let mut out = lock(out);
    let (written, code) = match &result {
        Ok(()) => {
            let written = if progress_shown {
                writeln!(out).and_then(|()| writeln!(out))
            } else {
                Ok(())
            };
            (written.and_then(|()| writeln!(out, "Done!")), EXIT_SUCCESS)
        }
        Err(Error::Argument { message, usage }) => {
            (writeln!(out, "{}\n{usage}", message.trim_end()), EXIT_FAILURE)
        }
        Err(err @ Error::Upload(_)) => {
            warn!(error = %err, "upload failed");
            let written = if progress_shown { writeln!(out) } else { Ok(()) };
            (written.and_then(|()| writeln!(out, "{err}")), EXIT_FAILURE)
        }
    };

    if let Err(err) = written.and_then(|()| out.flush()) {
        debug!(error = %err, "failed to write result");
    }
    code
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;
    use crate::error::UploadError;

    fn buffer() -> (Arc<Mutex<Vec<u8>>>, SharedOutput) {
        let buf = Arc::new(Mutex::new(Vec::new()));
        let out: SharedOutput = buf.clone();
        (buf, out)
    }

    fn text(buf: &Arc<Mutex<Vec<u8>>>) -> String {
        String::from_utf8(buf.lock().unwrap().clone()).unwrap()
    }

    #[test]
    fn success_prints_done() {
        let (buf, out) = buffer();
        assert_eq!(report(&out, Ok(()), false), EXIT_SUCCESS);
        assert_eq!(text(&buf), "Done!\n");
    }

    #[test]
    fn success_after_progress_ends_line_and_leaves_blank_line() {
        let (buf, out) = buffer();
        assert_eq!(report(&out, Ok(()), true), EXIT_SUCCESS);
        assert_eq!(text(&buf), "\n\nDone!\n");
    }

    #[test]
    fn upload_failure_is_labelled() {
        let (buf, out) = buffer();
        let code = report(&out, Err(UploadError::new("access denied").into()), false);
        assert_eq!(code, EXIT_FAILURE);
        assert_eq!(text(&buf), "Error uploading: access denied\n");
    }

    #[test]
    fn argument_failure_prints_usage() {
        let (buf, out) = buffer();
        let err = Error::Argument {
            message: "error: missing --bucket\n".into(),
            usage: "Usage: s3-uploader\n".into(),
        };
        assert_eq!(report(&out, Err(err), false), EXIT_FAILURE);
        assert_eq!(text(&buf), "error: missing --bucket\nUsage: s3-uploader\n\n");
    }

    #[test]
    fn upload_failure_is_logged_at_warn() {
        let logs = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&logs);
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::WARN)
            .with_ansi(false)
            .with_writer(move || LogSink(Arc::clone(&sink)))
            .finish();

        let (_buf, out) = buffer();
        tracing::subscriber::with_default(subscriber, || {
            report(&out, Err(UploadError::new("access denied").into()), false)
        });

        let logs = text(&logs);
        assert!(logs.contains("WARN"), "{logs}");
        assert!(logs.contains("upload failed"), "{logs}");
        assert!(logs.contains("access denied"), "{logs}");
    }

    struct LogSink(Arc<Mutex<Vec<u8>>>);

    impl std::io::Write for LogSink {
        fn write(&mut self, bytes: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(bytes);
            Ok(bytes.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }
}
