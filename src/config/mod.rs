//! Configuration layer: typed settings with layered precedence (file → env → CLI).

use std::{
    net::{IpAddr, SocketAddr},
    num::NonZeroUsize,
    path::PathBuf,
    str::FromStr,
};

use clap::{Args, Parser, Subcommand, builder::BoolishValueParser};
use config::{Config, Environment, File};
use serde::Deserialize;
use thiserror::Error;
use tracing::level_filters::LevelFilter;

const DEFAULT_CONFIG_BASENAME: &str = "config/default";
const LOCAL_CONFIG_BASENAME: &str = "brezza";
const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 5001;
const DEFAULT_CONCURRENCY: usize = 10;
const DEFAULT_ARTICLES_DIR: &str = "./articles";
const DEFAULT_PAGES_DIR: &str = "./pages";
const DEFAULT_LAYOUTS_DIR: &str = "./layouts";
const DEFAULT_ASSETS_DIR: &str = "./assets";
const DEFAULT_FONTS_DIR: &str = "./fonts";
const DEFAULT_TARGET_DIR: &str = "./public";

/// Command-line arguments for the Brezza binary.
#[derive(Debug, Parser)]
#[command(name = "brezza", version, about = "Brezza static site generator")]
pub struct CliArgs {
    /// Optional path to a configuration file.
    #[arg(long = "config-file", env = "BREZZA_CONFIG_FILE", value_name = "PATH")]
    pub config_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Render the site into the target directory.
    Build(BuildArgs),
    /// Serve the target directory over plain HTTP for local preview.
    Serve(ServeArgs),
}

#[derive(Debug, Args, Default, Clone)]
pub struct BuildArgs {
    #[command(flatten)]
    pub overrides: BuildOverrides,
}

#[derive(Debug, Args, Default, Clone)]
pub struct ServeArgs {
    #[command(flatten)]
    pub overrides: ServeOverrides,
}

#[derive(Debug, Args, Default, Clone)]
pub struct BuildOverrides {
    /// Override the number of concurrent build workers.
    #[arg(long = "concurrency", value_name = "COUNT")]
    pub concurrency: Option<usize>,

    /// Disable automatic permalinks on headers.
    #[arg(long = "no-header-links", action = clap::ArgAction::SetTrue)]
    pub no_header_links: bool,

    /// Disable Retina.JS image attributes.
    #[arg(long = "no-retina", action = clap::ArgAction::SetTrue)]
    pub no_retina: bool,

    /// Rewrite root-relative image sources against the site base URL.
    #[arg(long = "absolute-urls", action = clap::ArgAction::SetTrue)]
    pub absolute_urls: bool,

    /// Shorthand for `--log-level debug`.
    #[arg(long, action = clap::ArgAction::SetTrue)]
    pub verbose: bool,

    /// Override the base log level (trace|debug|info|warn|error).
    #[arg(long = "log-level", value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Toggle JSON logging.
    #[arg(
        long = "log-json",
        value_name = "BOOL",
        value_parser = BoolishValueParser::new()
    )]
    pub log_json: Option<bool>,
}

#[derive(Debug, Args, Default, Clone)]
pub struct ServeOverrides {
    /// Override the listener host.
    #[arg(long = "host", value_name = "HOST")]
    pub host: Option<String>,

    /// Override the listener port.
    #[arg(long = "port", value_name = "PORT")]
    pub port: Option<u16>,

    /// Shorthand for `--log-level debug`.
    #[arg(long, action = clap::ArgAction::SetTrue)]
    pub verbose: bool,

    /// Override the base log level (trace|debug|info|warn|error).
    #[arg(long = "log-level", value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Toggle JSON logging.
    #[arg(
        long = "log-json",
        value_name = "BOOL",
        value_parser = BoolishValueParser::new()
    )]
    pub log_json: Option<bool>,
}

/// Fully-resolved settings after precedence resolution and validation.
#[derive(Debug, Clone)]
pub struct Settings {
    pub site: SiteSettings,
    pub build: BuildSettings,
    pub server: ServerSettings,
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone)]
pub struct SiteSettings {
    pub articles_dir: PathBuf,
    pub pages_dir: PathBuf,
    pub layouts_dir: PathBuf,
    pub assets_dir: PathBuf,
    pub fonts_dir: PathBuf,
    pub target_dir: PathBuf,
    pub base_url: String,
}

#[derive(Debug, Clone)]
pub struct BuildSettings {
    pub concurrency: NonZeroUsize,
    pub no_header_links: bool,
    pub no_retina: bool,
    pub absolute_urls: bool,
}

#[derive(Debug, Clone)]
pub struct ServerSettings {
    pub addr: SocketAddr,
}

#[derive(Debug, Clone)]
pub struct LoggingSettings {
    pub level: LevelFilter,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Copy)]
pub enum LogFormat {
    Json,
    Compact,
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to build configuration: {0}")]
    Build(#[from] config::ConfigError),
    #[error("invalid configuration for `{key}`: {reason}")]
    Invalid { key: &'static str, reason: String },
}

impl LoadError {
    fn invalid(key: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            key,
            reason: reason.into(),
        }
    }
}

/// Parse the command line and load settings in one step.
pub fn load_with_cli() -> Result<(CliArgs, Settings), LoadError> {
    let cli = CliArgs::parse();
    let settings = load(&cli)?;
    Ok((cli, settings))
}

/// Load settings using the configured precedence (file → environment → CLI).
pub fn load(cli: &CliArgs) -> Result<Settings, LoadError> {
    let mut builder = Config::builder()
        .add_source(File::with_name(DEFAULT_CONFIG_BASENAME).required(false))
        .add_source(File::with_name(LOCAL_CONFIG_BASENAME).required(false));

    if let Some(path) = cli.config_file.as_ref() {
        builder = builder.add_source(File::from(path.as_path()).required(true));
    }

    builder = builder.add_source(Environment::with_prefix("BREZZA").separator("__"));

    let mut raw: RawSettings = builder.build()?.try_deserialize()?;

    match cli.command.as_ref() {
        Some(Command::Build(args)) => raw.apply_build_overrides(&args.overrides),
        Some(Command::Serve(args)) => raw.apply_serve_overrides(&args.overrides),
        None => raw.apply_build_overrides(&BuildOverrides::default()),
    }

    Settings::from_raw(raw)
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawSettings {
    site: RawSiteSettings,
    build: RawBuildSettings,
    server: RawServerSettings,
    logging: RawLoggingSettings,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawSiteSettings {
    articles_dir: Option<PathBuf>,
    pages_dir: Option<PathBuf>,
    layouts_dir: Option<PathBuf>,
    assets_dir: Option<PathBuf>,
    fonts_dir: Option<PathBuf>,
    target_dir: Option<PathBuf>,
    base_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawBuildSettings {
    concurrency: Option<usize>,
    no_header_links: Option<bool>,
    no_retina: Option<bool>,
    absolute_urls: Option<bool>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawServerSettings {
    host: Option<String>,
    port: Option<u16>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawLoggingSettings {
    level: Option<String>,
    json: Option<bool>,
}

impl RawSettings {
    fn apply_build_overrides(&mut self, overrides: &BuildOverrides) {
        if let Some(concurrency) = overrides.concurrency {
            self.build.concurrency = Some(concurrency);
        }
        if overrides.no_header_links {
            self.build.no_header_links = Some(true);
        }
        if overrides.no_retina {
            self.build.no_retina = Some(true);
        }
        if overrides.absolute_urls {
            self.build.absolute_urls = Some(true);
        }
        self.apply_logging_overrides(overrides.verbose, &overrides.log_level, overrides.log_json);
    }

    fn apply_serve_overrides(&mut self, overrides: &ServeOverrides) {
        if let Some(host) = overrides.host.as_ref() {
            self.server.host = Some(host.clone());
        }
        if let Some(port) = overrides.port {
            self.server.port = Some(port);
        }
        self.apply_logging_overrides(overrides.verbose, &overrides.log_level, overrides.log_json);
    }

    fn apply_logging_overrides(
        &mut self,
        verbose: bool,
        log_level: &Option<String>,
        log_json: Option<bool>,
    ) {
        if verbose {
            self.logging.level = Some("debug".to_string());
        }
        if let Some(level) = log_level.as_ref() {
            self.logging.level = Some(level.clone());
        }
        if let Some(json) = log_json {
            self.logging.json = Some(json);
        }
    }
}

impl Settings {
    fn from_raw(raw: RawSettings) -> Result<Self, LoadError> {
        let RawSettings {
            site,
            build,
            server,
            logging,
        } = raw;

        let site = build_site_settings(site);
        let build = build_build_settings(build)?;
        let server = build_server_settings(server)?;
        let logging = build_logging_settings(logging)?;

        Ok(Self {
            site,
            build,
            server,
            logging,
        })
    }
}

fn build_site_settings(site: RawSiteSettings) -> SiteSettings {
    SiteSettings {
        articles_dir: site
            .articles_dir
            .unwrap_or_else(|| PathBuf::from(DEFAULT_ARTICLES_DIR)),
        pages_dir: site
            .pages_dir
            .unwrap_or_else(|| PathBuf::from(DEFAULT_PAGES_DIR)),
        layouts_dir: site
            .layouts_dir
            .unwrap_or_else(|| PathBuf::from(DEFAULT_LAYOUTS_DIR)),
        assets_dir: site
            .assets_dir
            .unwrap_or_else(|| PathBuf::from(DEFAULT_ASSETS_DIR)),
        fonts_dir: site
            .fonts_dir
            .unwrap_or_else(|| PathBuf::from(DEFAULT_FONTS_DIR)),
        target_dir: site
            .target_dir
            .unwrap_or_else(|| PathBuf::from(DEFAULT_TARGET_DIR)),
        base_url: site.base_url.unwrap_or_default(),
    }
}

fn build_build_settings(build: RawBuildSettings) -> Result<BuildSettings, LoadError> {
    let concurrency = build.concurrency.unwrap_or(DEFAULT_CONCURRENCY);
    let concurrency = NonZeroUsize::new(concurrency)
        .ok_or_else(|| LoadError::invalid("build.concurrency", "must be greater than zero"))?;

    Ok(BuildSettings {
        concurrency,
        no_header_links: build.no_header_links.unwrap_or(false),
        no_retina: build.no_retina.unwrap_or(false),
        absolute_urls: build.absolute_urls.unwrap_or(false),
    })
}

fn build_server_settings(server: RawServerSettings) -> Result<ServerSettings, LoadError> {
    let host = server.host.unwrap_or_else(|| DEFAULT_HOST.to_string());
    let port = server.port.unwrap_or(DEFAULT_PORT);
    if port == 0 {
        return Err(LoadError::invalid(
            "server.port",
            "port must be greater than zero",
        ));
    }

    let ip: IpAddr = host
        .parse()
        .map_err(|err| LoadError::invalid("server.host", format!("failed to parse: {err}")))?;

    Ok(ServerSettings {
        addr: SocketAddr::new(ip, port),
    })
}

fn build_logging_settings(logging: RawLoggingSettings) -> Result<LoggingSettings, LoadError> {
    let level = match logging.level {
        Some(level) => LevelFilter::from_str(level.as_str()).map_err(|err| {
            LoadError::invalid("logging.level", format!("failed to parse: {err}"))
        })?,
        None => LevelFilter::INFO,
    };

    let format = if logging.json.unwrap_or(false) {
        LogFormat::Json
    } else {
        LogFormat::Compact
    };

    Ok(LoggingSettings { level, format })
}
