//! Render or fetch the thumbnail of one archive frame.
//!
//! Usage:
//! ```
//! cargo run --features fits --bin thumbservice -- [OPTIONS] <FRAME>
//! ```
//!
//! `FRAME` is either a numeric frame id or an exact frame basename. On success the JSON
//! response is printed on stdout; on failure the JSON error body is printed on stderr and the
//! process exits with a non zero status.

use std::process::ExitCode;

use camino::Utf8PathBuf;
use clap::Parser;
use tracing::error;
use tracing_subscriber::EnvFilter;

use thumbservice::{
    alignment::UnavailableSolver,
    archive::ArchiveClient,
    conversion::{fits::FitsDecoder, render::RenderingConverter},
    remote_fetcher::RemoteFetcher,
    settings::{Settings, StorageSettings},
    storage::S3Store,
    ThumbnailError, ThumbnailPipeline, ThumbnailRequest, ThumbnailResponse,
};

#[derive(Parser, Debug)]
#[command(
    name = "thumbservice",
    about = "Generate or retrieve cached JPEG thumbnails of archive frames",
    long_about = None
)]
struct Args {
    /// Frame id, or exact frame basename
    frame: String,

    /// Thumbnail bounding box width in pixels
    #[arg(long)]
    width: Option<String>,

    /// Thumbnail bounding box height in pixels
    #[arg(long)]
    height: Option<String>,

    /// Label text
    #[arg(long)]
    label: Option<String>,

    /// Compose a color thumbnail from the red, visual and blue frames of the request
    #[arg(long)]
    color: bool,

    /// Apply a median filter before scaling
    #[arg(long)]
    median: bool,

    /// Upper clipping percentile of the intensity stretch
    #[arg(long)]
    percentile: Option<String>,

    /// JPEG quality (1-100)
    #[arg(long)]
    quality: Option<String>,

    /// Print a redirect location instead of the `{url, propid}` document
    #[arg(long)]
    image: bool,

    /// Value of the Authorization header forwarded to the archive API
    #[arg(long, env = "ARCHIVE_AUTHORIZATION")]
    token: Option<String>,

    /// Base URL of the archive API
    #[arg(long, env = "ARCHIVE_API_URL", default_value = "http://localhost/")]
    archive_api_url: String,

    /// Directory receiving transient files
    #[arg(long, env = "TMP_DIR", default_value = "/tmp")]
    tmp_dir: Utf8PathBuf,

    /// Bucket holding rendered thumbnails
    #[arg(long, env = "AWS_BUCKET", default_value = "thumbnails")]
    bucket: String,

    /// Object store region
    #[arg(long, env = "AWS_DEFAULT_REGION", default_value = "us-west-2")]
    region: String,

    /// Custom object store endpoint
    #[arg(long, env = "STORAGE_URL")]
    storage_url: Option<String>,

    #[arg(long, env = "AWS_ACCESS_KEY_ID", hide_env_values = true)]
    access_key_id: Option<String>,

    #[arg(long, env = "AWS_SECRET_ACCESS_KEY", hide_env_values = true)]
    secret_access_key: Option<String>,
}

impl Args {
    fn settings(&self) -> Settings {
        Settings::default()
            .with_archive_api_url(&self.archive_api_url)
            .with_tmp_dir(self.tmp_dir.clone())
            .with_storage(StorageSettings {
                bucket: self.bucket.clone(),
                region: self.region.clone(),
                endpoint_url: self.storage_url.clone(),
                access_key_id: self.access_key_id.clone(),
                secret_access_key: self.secret_access_key.clone(),
            })
    }

    fn request(&self) -> ThumbnailRequest {
        let flag = |set: bool| set.then(|| "true".to_string());
        let query = [
            ("width", self.width.clone()),
            ("height", self.height.clone()),
            ("label", self.label.clone()),
            ("color", flag(self.color)),
            ("median", flag(self.median)),
            ("percentile", self.percentile.clone()),
            ("quality", self.quality.clone()),
            ("image", flag(self.image)),
        ]
        .into_iter()
        .filter_map(|(name, value)| value.map(|value| (name.to_string(), value)))
        .collect();
        ThumbnailRequest::new(query, self.token.clone())
    }
}

fn run(args: &Args) -> Result<ThumbnailResponse, ThumbnailError> {
    let settings = args.settings();
    let frames = ArchiveClient::new(RemoteFetcher::new()?, settings.clone());
    let store = S3Store::new(&settings.storage)?;
    let converter = RenderingConverter::new(FitsDecoder);
    let pipeline = ThumbnailPipeline::new(settings, frames, store, converter, UnavailableSolver);

    let request = args.request();
    match args.frame.parse::<u64>() {
        Ok(frame_id) => pipeline.handle_frame_id(frame_id, &request),
        Err(_) => pipeline.handle_basename(&args.frame, &request),
    }
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    match run(&args) {
        Ok(response) => {
            println!("{}", response.to_json());
            ExitCode::SUCCESS
        }
        Err(err) => {
            error!("{}: {err}", args.frame);
            eprintln!("{}", err.to_body());
            ExitCode::FAILURE
        }
    }
}
