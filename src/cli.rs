//! Command line flags.
//!
//! Flag names keep their historical camel-case spelling (`--accessKey`,
//! `--secretKey`) and there are no short aliases. Parse failures are returned
//! as [`Error::Argument`] rather than exiting, so the caller owns the exit code.

use std::ffi::OsString;
use std::path::PathBuf;

use clap::error::ErrorKind;
use clap::{ArgAction, CommandFactory, Parser};

use crate::error::{Error, Result};
use crate::request::Credentials;
use crate::store::StoreConfig;

#[derive(Debug, Clone, Parser)]
#[command(
    name = "s3-uploader",
    version,
    about = "Upload a single file to an S3 bucket",
    before_help = "S3 Uploader",
    help_template = "{before-help}\n{about-with-newline}\n{usage-heading} {usage}\n\nCommand options:\n{options}{after-help}",
    disable_help_flag = true,
    disable_version_flag = true
)]
pub struct Cli {
    /// The bucket where the file will be uploaded
    #[arg(long)]
    pub bucket: String,

    /// The file to upload
    #[arg(long)]
    pub file: PathBuf,

    /// The key of the object to create in S3; `%unix_timestamp%` is replaced with the current Unix time
    #[arg(long)]
    pub key: String,

    /// AWS Access Key
    #[arg(long = "accessKey", value_name = "ACCESS_KEY")]
    pub access_key: String,

    /// AWS Secret Key
    #[arg(long = "secretKey", value_name = "SECRET_KEY")]
    pub secret_key: String,

    /// Set public read acl
    #[arg(long)]
    pub public: bool,

    /// Print live transfer progress
    #[arg(long)]
    pub progress: bool,

    /// Region used to sign and route the request
    #[arg(long, default_value = "us-east-1")]
    pub region: String,

    /// Custom endpoint URL for S3-compatible stores
    #[arg(long)]
    pub endpoint: Option<String>,

    /// Display this screen
    #[arg(long, action = ArgAction::Help)]
    help: Option<bool>,

    /// Print version
    #[arg(long, action = ArgAction::Version)]
    version: Option<bool>,
}

impl Cli {
    pub fn credentials(&self) -> Credentials {
        Credentials::new(&self.access_key, &self.secret_key)
    }

    pub fn store_config(&self) -> StoreConfig {
        StoreConfig {
            credentials: self.credentials(),
            region: self.region.clone(),
            endpoint: self.endpoint.clone(),
        }
    }
}

/// What the process was asked to do.
#[derive(Debug)]
pub enum Invocation {
    Upload(Cli),
    /// `--help` or `--version`; the text is ready to print.
    Info(String),
}

pub fn parse<I, T>(args: I) -> Result<Invocation>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    match Cli::try_parse_from(args) {
        Ok(cli) => Ok(Invocation::Upload(cli)),
        Err(err) => match err.kind() {
            ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
                Ok(Invocation::Info(err.render().to_string()))
            }
            _ => Err(Error::Argument {
                message: err.render().to_string(),
                usage: usage(),
            }),
        },
    }
}

/// Help text listing every flag.
pub fn usage() -> String {
    Cli::command().render_help().to_string()
}
