use anyhow::Context;
use silo_common::DataWarehouseSchema;
use silo_storage::WaitPolicy;
use std::path::PathBuf;
use std::time::Duration;

fn default_prefix() -> String {
    "rs_environment".to_string()
}

fn default_scratch_dir() -> PathBuf {
    PathBuf::from("/tmp/silo")
}

fn default_max_partitions() -> u32 {
    4
}

fn default_manifest_wait_timeout() -> Duration {
    Duration::from_secs(30 * 60)
}

fn default_manifest_poll_interval() -> Duration {
    Duration::from_secs(5)
}

/// The on-disk settings file: source warehouse connections plus run defaults. CLI flags and
/// environment variables (via [`CliOverrides`]) take precedence over whatever is written here.
#[derive(Debug, Clone, serde::Deserialize)]
pub struct FileConfig {
    pub design_root: PathBuf,
    pub bucket: String,
    #[serde(default = "default_prefix")]
    pub prefix: String,
    #[serde(default = "default_scratch_dir")]
    pub scratch_dir: PathBuf,
    #[serde(default = "default_max_partitions")]
    pub max_partitions: u32,
    #[serde(default)]
    pub keep_going: bool,
    #[serde(default)]
    pub dry_run: bool,
    #[serde(default = "default_manifest_wait_timeout", with = "humantime_serde")]
    pub manifest_wait_timeout: Duration,
    #[serde(default = "default_manifest_poll_interval", with = "humantime_serde")]
    pub manifest_poll_interval: Duration,
    /// Local filesystem root to emulate the object store against, instead of real S3. Only set
    /// for local development and tests.
    #[serde(default)]
    pub local_store_root: Option<PathBuf>,
    pub sources: Vec<DataWarehouseSchema>,
}

/// CLI-flag / environment-variable overrides for the handful of run-to-run knobs that make
/// sense to flip without editing the settings file. Composed with `#[command(flatten)]` into
/// both the `order` and `extract` subcommands.
#[derive(Debug, Clone, clap::Args)]
pub struct CliOverrides {
    /// Path to the YAML settings file.
    #[arg(long, env = "SILO_CONFIG_FILE")]
    pub config_file: PathBuf,

    #[arg(long, env = "SILO_DESIGN_ROOT")]
    pub design_root: Option<PathBuf>,

    #[arg(long, env = "SILO_BUCKET")]
    pub bucket: Option<String>,

    #[arg(long, env = "SILO_PREFIX")]
    pub prefix: Option<String>,

    #[arg(long, env = "SILO_SCRATCH_DIR")]
    pub scratch_dir: Option<PathBuf>,

    #[arg(long, env = "SILO_MAX_PARTITIONS")]
    pub max_partitions: Option<u32>,

    #[arg(long, env = "SILO_KEEP_GOING")]
    pub keep_going: bool,

    #[arg(long, env = "SILO_DRY_RUN")]
    pub dry_run: bool,

    #[arg(long, env = "SILO_MANIFEST_WAIT_TIMEOUT", value_parser = humantime::parse_duration)]
    pub manifest_wait_timeout: Option<Duration>,

    #[arg(long, env = "SILO_MANIFEST_POLL_INTERVAL", value_parser = humantime::parse_duration)]
    pub manifest_poll_interval: Option<Duration>,
}

/// The fully resolved configuration a run actually executes with.
#[derive(Debug, Clone)]
pub struct Config {
    pub design_root: PathBuf,
    pub bucket: String,
    pub prefix: String,
    pub scratch_dir: PathBuf,
    pub max_partitions: u32,
    pub keep_going: bool,
    pub dry_run: bool,
    pub manifest_wait_timeout: Duration,
    pub manifest_poll_interval: Duration,
    pub local_store_root: Option<PathBuf>,
    pub sources: Vec<DataWarehouseSchema>,
}

impl Config {
    pub fn load(cli: CliOverrides) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(&cli.config_file)
            .with_context(|| format!("reading config file '{}'", cli.config_file.display()))?;
        let file: FileConfig = serde_yml::from_str(&text)
            .with_context(|| format!("parsing config file '{}'", cli.config_file.display()))?;

        Ok(Config {
            design_root: cli.design_root.unwrap_or(file.design_root),
            bucket: cli.bucket.unwrap_or(file.bucket),
            prefix: cli.prefix.unwrap_or(file.prefix),
            scratch_dir: cli.scratch_dir.unwrap_or(file.scratch_dir),
            max_partitions: cli.max_partitions.unwrap_or(file.max_partitions),
            keep_going: cli.keep_going || file.keep_going,
            dry_run: cli.dry_run || file.dry_run,
            manifest_wait_timeout: cli.manifest_wait_timeout.unwrap_or(file.manifest_wait_timeout),
            manifest_poll_interval: cli.manifest_poll_interval.unwrap_or(file.manifest_poll_interval),
            local_store_root: file.local_store_root,
            sources: file.sources,
        })
    }

    pub fn wait_policy(&self) -> WaitPolicy {
        WaitPolicy {
            poll_interval: self.manifest_poll_interval,
            timeout: self.manifest_wait_timeout,
        }
    }
}
