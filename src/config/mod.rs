//! Configuration layer: typed settings with layered precedence (file → env → CLI).

use std::{num::NonZeroU32, path::PathBuf, str::FromStr, time::Duration};

use clap::{Args, Parser, Subcommand, ValueHint, builder::BoolishValueParser};
use config::{Config, Environment, File};
use serde::Deserialize;
use thiserror::Error;
use tracing::level_filters::LevelFilter;

const DEFAULT_CONFIG_BASENAME: &str = "config/default";
const LOCAL_CONFIG_BASENAME: &str = "vetrina";
const DEFAULT_CONTENT_PATH: &str = "data/content.json";
const DEFAULT_PAGE_SIZE: u32 = 10;
const DEFAULT_MAX_PAGE_SIZE: u32 = 100;
const DEFAULT_CACHE_TTL_SECS: u64 = 300;

/// Command-line arguments for the Vetrina binary.
#[derive(Debug, Parser)]
#[command(name = "vetrina", version, about = "Query blog content from a JSON content file")]
pub struct CliArgs {
    /// Optional path to a configuration file.
    #[arg(long = "config-file", env = "VETRINA_CONFIG_FILE", value_name = "PATH")]
    pub config_file: Option<PathBuf>,

    #[command(flatten)]
    pub overrides: GlobalOverrides,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Args, Default, Clone)]
pub struct GlobalOverrides {
    /// Override the content file to load.
    #[arg(long = "content", value_name = "PATH", value_hint = ValueHint::FilePath, global = true)]
    pub content_path: Option<PathBuf>,

    /// Override the base log level (trace|debug|info|warn|error).
    #[arg(long = "log-level", value_name = "LEVEL", global = true)]
    pub log_level: Option<String>,

    /// Toggle JSON logging.
    #[arg(
        long = "log-json",
        value_name = "BOOL",
        value_parser = BoolishValueParser::new(),
        global = true
    )]
    pub log_json: Option<bool>,

    /// Toggle the query cache.
    #[arg(
        long = "cache",
        value_name = "BOOL",
        value_parser = BoolishValueParser::new(),
        global = true
    )]
    pub cache_enabled: Option<bool>,

    /// Override the query cache time-to-live.
    #[arg(long = "cache-ttl-seconds", value_name = "SECONDS", global = true)]
    pub cache_ttl_seconds: Option<u64>,
}

#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// List posts matching filters.
    Posts(PostListArgs),
    /// Show a published post by slug.
    Post(SlugArgs),
    /// Posts sharing categories or tags with a post.
    Related(RelatedArgs),
    /// Most viewed published posts.
    Popular(LimitArgs),
    /// List categories with post counts.
    Categories(CategoryListArgs),
    /// Show a category and a page of its posts.
    Category(CategoryPostsArgs),
    /// Published post counts per tag.
    Tags,
}

#[derive(Debug, Args, Clone)]
pub struct PageArgs {
    /// 1-indexed page number.
    #[arg(long, default_value_t = 1)]
    pub page: u32,

    /// Items per page; defaults to `query.default_page_size`.
    #[arg(long = "page-size", value_name = "COUNT")]
    pub page_size: Option<u32>,
}

#[derive(Debug, Args, Clone)]
pub struct PostListArgs {
    #[command(flatten)]
    pub page: PageArgs,

    /// Case-insensitive text matched against title, excerpt and tags.
    #[arg(long)]
    pub search: Option<String>,

    /// Category slug; repeat to match any of several.
    #[arg(long = "category", value_name = "SLUG")]
    pub categories: Vec<String>,

    /// Tag; repeat to match any of several.
    #[arg(long = "tag", value_name = "TAG")]
    pub tags: Vec<String>,

    /// Author id.
    #[arg(long, value_name = "UUID")]
    pub author: Option<String>,

    /// draft|published|archived
    #[arg(long)]
    pub status: Option<String>,

    #[arg(long, value_name = "BOOL", value_parser = BoolishValueParser::new())]
    pub featured: Option<bool>,

    /// Earliest publish date (RFC 3339, inclusive).
    #[arg(long, value_name = "DATETIME")]
    pub from: Option<String>,

    /// Latest publish date (RFC 3339, inclusive).
    #[arg(long, value_name = "DATETIME")]
    pub to: Option<String>,

    /// published_at|updated_at|views|likes|title
    #[arg(long = "sort-by", value_name = "FIELD")]
    pub sort_by: Option<String>,

    /// asc|desc
    #[arg(long)]
    pub direction: Option<String>,

    /// Raw filter object; merged under the individual flags.
    #[arg(long = "filters-json", value_name = "JSON")]
    pub filters_json: Option<String>,

    /// Include drafts and archived posts.
    #[arg(long, action = clap::ArgAction::SetTrue)]
    pub admin: bool,
}

#[derive(Debug, Args, Clone)]
pub struct SlugArgs {
    #[arg(value_name = "SLUG")]
    pub slug: String,
}

#[derive(Debug, Args, Clone)]
pub struct RelatedArgs {
    #[arg(value_name = "SLUG")]
    pub slug: String,

    #[arg(long, default_value_t = 5)]
    pub limit: usize,
}

#[derive(Debug, Args, Clone)]
pub struct LimitArgs {
    /// Number of posts; capped at `query.max_page_size`.
    #[arg(long, default_value_t = 5)]
    pub limit: u32,
}

#[derive(Debug, Args, Clone)]
pub struct CategoryListArgs {
    #[command(flatten)]
    pub page: PageArgs,

    #[arg(long)]
    pub search: Option<String>,

    /// Only categories with (true) or without (false) published posts.
    #[arg(long = "has-posts", value_name = "BOOL", value_parser = BoolishValueParser::new())]
    pub has_posts: Option<bool>,

    /// name|post_count|created_at
    #[arg(long = "sort-by", value_name = "FIELD")]
    pub sort_by: Option<String>,

    /// asc|desc
    #[arg(long)]
    pub direction: Option<String>,
}

#[derive(Debug, Args, Clone)]
pub struct CategoryPostsArgs {
    #[arg(value_name = "SLUG")]
    pub slug: String,

    #[command(flatten)]
    pub page: PageArgs,
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub logging: LoggingSettings,
    pub query: QuerySettings,
    pub cache: CacheSettings,
    pub content: ContentSettings,
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

#[derive(Debug, Clone)]
pub struct QuerySettings {
    pub default_page_size: NonZeroU32,
    pub max_page_size: NonZeroU32,
}

#[derive(Debug, Clone)]
pub struct CacheSettings {
    pub enabled: bool,
    pub ttl: Duration,
    pub invalidate_on_write: bool,
}

#[derive(Debug, Clone)]
pub struct ContentSettings {
    pub path: PathBuf,
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

pub fn load(cli: &CliArgs) -> Result<Settings, LoadError> {
    let mut builder = Config::builder()
        .add_source(File::with_name(DEFAULT_CONFIG_BASENAME).required(false))
        .add_source(File::with_name(LOCAL_CONFIG_BASENAME).required(false));

    if let Some(path) = cli.config_file.as_ref() {
        builder = builder.add_source(File::from(path.as_path()).required(true));
    }

    builder = builder.add_source(Environment::with_prefix("VETRINA").separator("__"));

    let mut raw: RawSettings = builder.build()?.try_deserialize()?;
    raw.apply_overrides(&cli.overrides);

    Settings::from_raw(raw)
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawSettings {
    logging: RawLoggingSettings,
    query: RawQuerySettings,
    cache: RawCacheSettings,
    content: RawContentSettings,
}

impl RawSettings {
    fn apply_overrides(&mut self, overrides: &GlobalOverrides) {
        if let Some(path) = overrides.content_path.as_ref() {
            self.content.path = Some(path.clone());
        }
        if let Some(level) = overrides.log_level.as_ref() {
            self.logging.level = Some(level.clone());
        }
        if let Some(json) = overrides.log_json {
            self.logging.json = Some(json);
        }
        if let Some(enabled) = overrides.cache_enabled {
            self.cache.enabled = Some(enabled);
        }
        if let Some(seconds) = overrides.cache_ttl_seconds {
            self.cache.ttl_seconds = Some(seconds);
        }
    }
}

impl Settings {
    fn from_raw(raw: RawSettings) -> Result<Self, LoadError> {
        let RawSettings {
            logging,
            query,
            cache,
            content,
        } = raw;

        Ok(Self {
            logging: build_logging_settings(logging)?,
            query: build_query_settings(query)?,
            cache: build_cache_settings(cache),
            content: build_content_settings(content)?,
        })
    }
}

fn build_logging_settings(logging: RawLoggingSettings) -> Result<LoggingSettings, LoadError> {
    let level = match logging.level {
        Some(level) => LevelFilter::from_str(level.as_str()).map_err(|err| {
            LoadError::invalid("logging.level", format!("failed to parse: {err}"))
        })?,
        None => LevelFilter::WARN,
    };

    let format = if logging.json.unwrap_or(false) {
        LogFormat::Json
    } else {
        LogFormat::Compact
    };

    Ok(LoggingSettings { level, format })
}

fn build_query_settings(query: RawQuerySettings) -> Result<QuerySettings, LoadError> {
    let default_page_size = non_zero_u32(
        query.default_page_size.unwrap_or(DEFAULT_PAGE_SIZE),
        "query.default_page_size",
    )?;
    let max_page_size = non_zero_u32(
        query.max_page_size.unwrap_or(DEFAULT_MAX_PAGE_SIZE),
        "query.max_page_size",
    )?;

    if default_page_size > max_page_size {
        return Err(LoadError::invalid(
            "query.default_page_size",
            format!("must not exceed query.max_page_size ({max_page_size})"),
        ));
    }

    Ok(QuerySettings {
        default_page_size,
        max_page_size,
    })
}

fn build_cache_settings(cache: RawCacheSettings) -> CacheSettings {
    CacheSettings {
        enabled: cache.enabled.unwrap_or(true),
        ttl: Duration::from_secs(cache.ttl_seconds.unwrap_or(DEFAULT_CACHE_TTL_SECS)),
        invalidate_on_write: cache.invalidate_on_write.unwrap_or(true),
    }
}

fn build_content_settings(content: RawContentSettings) -> Result<ContentSettings, LoadError> {
    let path = content
        .path
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONTENT_PATH));
    if path.as_os_str().is_empty() {
        return Err(LoadError::invalid("content.path", "path must not be empty"));
    }
    Ok(ContentSettings { path })
}

fn non_zero_u32(value: u32, key: &'static str) -> Result<NonZeroU32, LoadError> {
    NonZeroU32::new(value).ok_or_else(|| LoadError::invalid(key, "must be greater than zero"))
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawLoggingSettings {
    level: Option<String>,
    json: Option<bool>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawQuerySettings {
    default_page_size: Option<u32>,
    max_page_size: Option<u32>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawCacheSettings {
    enabled: Option<bool>,
    ttl_seconds: Option<u64>,
    invalidate_on_write: Option<bool>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawContentSettings {
    path: Option<PathBuf>,
}

#[cfg(test)]
mod tests;
