use clap::Parser;

use super::*;

#[test]
fn cli_overrides_take_highest_precedence() {
    let mut raw = RawSettings::default();
    raw.cache.ttl_seconds = Some(60);
    raw.logging.level = Some("info".to_string());

    let overrides = GlobalOverrides {
        cache_ttl_seconds: Some(5),
        log_level: Some("debug".to_string()),
        ..Default::default()
    };

    raw.apply_overrides(&overrides);
    let settings = Settings::from_raw(raw).expect("valid settings");

    assert_eq!(settings.cache.ttl, Duration::from_secs(5));
    assert_eq!(settings.logging.level, LevelFilter::DEBUG);
}

#[test]
fn defaults_are_applied() {
    let settings = Settings::from_raw(RawSettings::default()).expect("valid settings");

    assert_eq!(settings.query.default_page_size.get(), DEFAULT_PAGE_SIZE);
    assert_eq!(settings.query.max_page_size.get(), DEFAULT_MAX_PAGE_SIZE);
    assert!(settings.cache.enabled);
    assert!(settings.cache.invalidate_on_write);
    assert_eq!(
        settings.cache.ttl,
        Duration::from_secs(DEFAULT_CACHE_TTL_SECS)
    );
    assert_eq!(settings.content.path, PathBuf::from(DEFAULT_CONTENT_PATH));
    assert!(matches!(settings.logging.format, LogFormat::Compact));
}

#[test]
fn zero_page_size_is_rejected() {
    let mut raw = RawSettings::default();
    raw.query.default_page_size = Some(0);

    let err = Settings::from_raw(raw).expect_err("zero page size");
    assert!(matches!(
        err,
        LoadError::Invalid {
            key: "query.default_page_size",
            ..
        }
    ));
}

#[test]
fn default_page_size_must_fit_under_maximum() {
    let mut raw = RawSettings::default();
    raw.query.default_page_size = Some(50);
    raw.query.max_page_size = Some(20);

    assert!(Settings::from_raw(raw).is_err());
}

#[test]
fn invalid_log_level_is_rejected() {
    let mut raw = RawSettings::default();
    raw.logging.level = Some("chatty".to_string());

    assert!(matches!(
        Settings::from_raw(raw),
        Err(LoadError::Invalid {
            key: "logging.level",
            ..
        })
    ));
}

#[test]
fn cli_json_logging_enforces_format() {
    let mut raw = RawSettings::default();
    raw.apply_overrides(&GlobalOverrides {
        log_json: Some(true),
        ..Default::default()
    });
    let settings = Settings::from_raw(raw).expect("valid settings");

    assert!(matches!(settings.logging.format, LogFormat::Json));
}

#[test]
fn parse_posts_arguments() {
    let args = CliArgs::parse_from([
        "vetrina",
        "posts",
        "--page",
        "2",
        "--page-size",
        "5",
        "--tag",
        "rust",
        "--tag",
        "angular",
        "--sort-by",
        "views",
        "--cache",
        "false",
    ]);

    assert_eq!(args.overrides.cache_enabled, Some(false));
    match args.command {
        Command::Posts(posts) => {
            assert_eq!(posts.page.page, 2);
            assert_eq!(posts.page.page_size, Some(5));
            assert_eq!(posts.tags, vec!["rust".to_string(), "angular".to_string()]);
            assert_eq!(posts.sort_by.as_deref(), Some("views"));
            assert!(!posts.admin);
        }
        _ => panic!("wrong command parsed"),
    }
}

#[test]
fn parse_global_overrides_before_subcommand() {
    let args = CliArgs::parse_from([
        "vetrina",
        "--content",
        "/tmp/content.json",
        "--log-level",
        "debug",
        "related",
        "hello-world",
        "--limit",
        "3",
    ]);

    assert_eq!(
        args.overrides.content_path.as_deref(),
        Some(std::path::Path::new("/tmp/content.json"))
    );
    match args.command {
        Command::Related(related) => {
            assert_eq!(related.slug, "hello-world");
            assert_eq!(related.limit, 3);
        }
        _ => panic!("wrong command parsed"),
    }
}
