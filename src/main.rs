use std::{process, sync::Arc};

use clap::Parser;
use serde::Serialize;
use time::{OffsetDateTime, format_description::well_known::Rfc3339};
use tracing::{Dispatch, Level, dispatcher, error, info};
use tracing_subscriber::fmt as tracing_fmt;
use uuid::Uuid;
use vetrina::{
    application::{
        error::AppError,
        filters::{CategoryFilters, DateRange, PostFilters},
        pagination::PageLimits,
        services::ContentServices,
    },
    cache::CacheConfig,
    config::{self, CategoryListArgs, CliArgs, Command, PostListArgs},
    domain::types::{CategorySortField, ContentStatus, PostSortField, SortDirection},
    infra::{error::InfraError, memory::InMemoryContentStore, seed, telemetry},
};

fn main() {
    if let Err(error) = run() {
        report_application_error(&error);
        process::exit(error.exit_code());
    }
}

fn report_application_error(error: &AppError) {
    if dispatcher::has_been_set() {
        error!(error = %error, "application error");
        return;
    }

    let subscriber = tracing_fmt()
        .with_writer(std::io::stderr)
        .with_max_level(Level::ERROR)
        .finish();
    let dispatch = Dispatch::new(subscriber);
    dispatcher::with_default(&dispatch, || {
        error!(error = %error, "application error");
    });
}

fn run() -> Result<(), AppError> {
    let cli = CliArgs::parse();
    let settings = config::load(&cli)
        .map_err(|err| InfraError::configuration(format!("failed to load configuration: {err}")))?;

    telemetry::init(&settings.logging)?;

    let seed = seed::load_seed(&settings.content.path)?;
    let store = Arc::new(InMemoryContentStore::from_seed(seed)?);
    let services = ContentServices::new(
        store,
        PageLimits::from(&settings.query),
        CacheConfig::from(&settings.cache),
    );
    info!(
        path = %settings.content.path.display(),
        cache_enabled = settings.cache.enabled,
        "Content services ready"
    );

    match cli.command {
        Command::Posts(args) => run_posts(&services, args),
        Command::Post(args) => {
            let post = services
                .posts
                .find_by_slug(&args.slug)?
                .ok_or_else(|| AppError::not_found("post", args.slug.as_str()))?;
            print_json(&post)
        }
        Command::Related(args) => print_json(&services.posts.related(&args.slug, args.limit)?),
        Command::Popular(args) => print_json(&services.posts.popular(args.limit)?),
        Command::Categories(args) => run_categories(&services, args),
        Command::Category(args) => {
            let category = services
                .categories
                .find_by_slug(&args.slug)?
                .ok_or_else(|| AppError::not_found("category", args.slug.as_str()))?;
            let posts = services.categories.posts_in_category(
                &args.slug,
                args.page.page,
                args.page.page_size,
            )?;
            print_json(&CategoryView {
                category: &category,
                posts: posts.as_ref(),
            })
        }
        Command::Tags => print_json(&services.posts.tag_counts()?),
    }
}

#[derive(Serialize)]
struct CategoryView<'a, C, P> {
    category: &'a C,
    posts: &'a P,
}

fn run_posts(services: &ContentServices, args: PostListArgs) -> Result<(), AppError> {
    let filters = post_filters(services, &args)?;
    let page = if args.admin {
        services
            .posts
            .query_admin(args.page.page, args.page.page_size, &filters)?
    } else {
        services
            .posts
            .query(args.page.page, args.page.page_size, &filters)?
    };
    print_json(page.as_ref())
}

fn run_categories(services: &ContentServices, args: CategoryListArgs) -> Result<(), AppError> {
    let mut filters = CategoryFilters {
        search: args.search,
        has_posts: args.has_posts,
        ..Default::default()
    };
    if let Some(field) = args.sort_by.as_deref() {
        filters.sort_by = CategorySortField::from_name(field);
    }
    if let Some(direction) = args.direction.as_deref() {
        filters.direction = parse_direction(direction)?;
    }
    let page = services
        .categories
        .query(args.page.page, args.page.page_size, &filters)?;
    print_json(page.as_ref())
}

/// Build post filters from `--filters-json` overlaid with individual flags.
fn post_filters(services: &ContentServices, args: &PostListArgs) -> Result<PostFilters, AppError> {
    let mut filters = match args.filters_json.as_deref() {
        Some(raw) => {
            let value: serde_json::Value = serde_json::from_str(raw)
                .map_err(|err| AppError::validation(format!("--filters-json: {err}")))?;
            PostFilters::from_json(value)?
        }
        None => PostFilters::default(),
    };

    if let Some(search) = args.search.as_ref() {
        filters.search = Some(search.clone());
    }
    for slug in &args.categories {
        let category = services
            .categories
            .find_by_slug(slug)?
            .ok_or_else(|| AppError::not_found("category", slug.as_str()))?;
        filters.categories.insert(category.category.id);
    }
    filters.tags.extend(args.tags.iter().cloned());
    if let Some(author) = args.author.as_deref() {
        filters.author = Some(
            Uuid::parse_str(author)
                .map_err(|err| AppError::validation(format!("--author: {err}")))?,
        );
    }
    if let Some(status) = args.status.as_deref() {
        filters.status = Some(ContentStatus::try_from(status).map_err(|()| {
            AppError::validation(format!("--status: unknown status `{status}`"))
        })?);
    }
    if args.featured.is_some() {
        filters.featured = args.featured;
    }
    if args.from.is_some() || args.to.is_some() {
        filters.date_range = DateRange {
            from: parse_datetime("--from", args.from.as_deref())?.or(filters.date_range.from),
            to: parse_datetime("--to", args.to.as_deref())?.or(filters.date_range.to),
        };
    }
    if let Some(field) = args.sort_by.as_deref() {
        filters.sort_by = PostSortField::from_name(field);
    }
    if let Some(direction) = args.direction.as_deref() {
        filters.direction = parse_direction(direction)?;
    }

    Ok(filters)
}

fn parse_direction(raw: &str) -> Result<SortDirection, AppError> {
    SortDirection::try_from(raw)
        .map_err(|()| AppError::validation(format!("--direction: expected asc or desc, got `{raw}`")))
}

fn parse_datetime(flag: &str, raw: Option<&str>) -> Result<Option<OffsetDateTime>, AppError> {
    raw.map(|value| {
        OffsetDateTime::parse(value, &Rfc3339)
            .map_err(|err| AppError::validation(format!("{flag}: {err}")))
    })
    .transpose()
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<(), AppError> {
    let rendered = serde_json::to_string_pretty(value)
        .map_err(|err| AppError::unexpected(format!("failed to encode output: {err}")))?;
    println!("{rendered}");
    Ok(())
}
