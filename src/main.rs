//! Command line client for the find-people lead-search API.

use std::env;
use std::path::PathBuf;

use chrono::Utc;
use clap::{Args, Parser, Subcommand};
use config::Config;
use dotenvy::dotenv;

use pushkind_leads::forms::profile::ProfileForm;
use pushkind_leads::forms::search::{RangeInput, SearchForm};
use pushkind_leads::models::config::AppConfig;
use pushkind_leads::repository::{FileSessionStore, HttpRepository};
use pushkind_leads::services::ServiceResult;
use pushkind_leads::services::auth::{CredentialProvider, SessionCredentials, sign_in};
use pushkind_leads::services::export::{
    ExportFormat, ExportScope, export_file_name, export_view, write_export,
};
use pushkind_leads::services::profile::{load_profile, save_profile, stored_api_key};
use pushkind_leads::services::search::SearchController;

type Credentials = SessionCredentials<FileSessionStore, HttpRepository>;

#[derive(Debug, Parser)]
#[command(name = "pushkind-leads", version, about = "Search and export leads")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run a search and export the fetched leads.
    Search(SearchArgs),
    /// Show or edit the account profile.
    #[command(subcommand)]
    Profile(ProfileCommand),
    /// Store the tokens returned by the sign-in redirect.
    Login(LoginArgs),
    /// Forget the stored session.
    Logout,
}

#[derive(Debug, Args)]
struct SearchArgs {
    /// Terms to include, e.g. `location=France,Spain`. Repeatable.
    #[arg(long, value_name = "FIELD=TERMS", value_parser = parse_field_terms)]
    include: Vec<(String, String)>,
    /// Terms to exclude, e.g. `currentJobTitle=intern`. Repeatable.
    #[arg(long, value_name = "FIELD=TERMS", value_parser = parse_field_terms)]
    exclude: Vec<(String, String)>,
    /// Lower headcount bound (exclusive).
    #[arg(long)]
    more_than: Option<String>,
    /// Upper headcount bound (inclusive).
    #[arg(long)]
    less_than_or_equal: Option<String>,
    /// Lead-search API key. Falls back to the configured or stored key.
    #[arg(long)]
    api_key: Option<String>,
    /// Number of pages to fetch.
    #[arg(long, default_value_t = 1)]
    pages: usize,
    #[arg(long, value_enum, default_value_t = ExportFormat::Json)]
    format: ExportFormat,
    #[arg(long, value_enum, default_value_t = ExportScope::All)]
    scope: ExportScope,
    /// Defaults to `find-people-results-<date>.<format>`.
    #[arg(long)]
    output: Option<PathBuf>,
}

#[derive(Debug, Subcommand)]
enum ProfileCommand {
    Show,
    Update {
        #[arg(long)]
        first_name: Option<String>,
        #[arg(long)]
        last_name: Option<String>,
        #[arg(long)]
        api_key: Option<String>,
    },
}

#[derive(Debug, Args)]
struct LoginArgs {
    #[arg(long)]
    access_token: String,
    #[arg(long)]
    refresh_token: Option<String>,
    /// Unix timestamp at which the access token expires.
    #[arg(long)]
    expires_at: Option<i64>,
}

fn parse_field_terms(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((field, terms)) if !field.trim().is_empty() => {
            Ok((field.trim().to_string(), terms.to_string()))
        }
        _ => Err(format!("expected FIELD=TERMS, got `{raw}`")),
    }
}

/// Picks the search key: command line, then configuration, then profile.
async fn resolve_api_key(
    args: &SearchArgs,
    config: &AppConfig,
    repo: &HttpRepository,
    credentials: &Credentials,
) -> String {
    let explicit = args
        .api_key
        .as_deref()
        .or(config.api_key.as_deref())
        .map(str::trim)
        .filter(|key| !key.is_empty());
    if let Some(key) = explicit {
        return key.to_string();
    }

    match stored_api_key(repo, credentials).await {
        Ok(key) => key.unwrap_or_default(),
        Err(err) => {
            log::warn!("No stored API key available: {err}");
            String::new()
        }
    }
}

async fn run_search(
    args: SearchArgs,
    config: &AppConfig,
    repo: HttpRepository,
    credentials: &Credentials,
) -> ServiceResult<()> {
    let api_key = resolve_api_key(&args, config, &repo, credentials).await;

    let mut form = SearchForm {
        api_key,
        headcount: RangeInput {
            more_than: args.more_than.unwrap_or_default(),
            less_than_or_equal: args.less_than_or_equal.unwrap_or_default(),
        },
        ..SearchForm::default()
    };
    for (field, terms) in &args.include {
        form = form.include(field, terms.as_str());
    }
    for (field, terms) in &args.exclude {
        form = form.exclude(field, terms.as_str());
    }

    let controller = SearchController::with_page_size(repo, config.page_size);
    controller.submit_form(form).await?;
    for page in 2..=args.pages {
        if !controller.view().has_more {
            log::info!("No more pages after page {}", page - 1);
            break;
        }
        controller.go_to_page(page).await?;
    }

    let view = controller.view();
    log::info!(
        "Fetched {} leads on {} pages, total reported: {}, cost: {}",
        view.all_leads.len(),
        view.page_numbers.len(),
        view.total.map_or_else(|| "n/a".to_string(), |total| total.to_string()),
        view.formatted_cost()
    );

    let now = Utc::now();
    let contents = export_view(&view, args.format, args.scope, now)?;
    let path = args
        .output
        .unwrap_or_else(|| PathBuf::from(export_file_name(args.format, now.date_naive())));
    write_export(&path, &contents)?;
    println!("{}", path.display());
    Ok(())
}

async fn run_profile(
    command: ProfileCommand,
    repo: &HttpRepository,
    credentials: &Credentials,
) -> ServiceResult<()> {
    let current = load_profile(repo, credentials).await?;

    let profile = match command {
        ProfileCommand::Show => current.unwrap_or_default(),
        ProfileCommand::Update {
            first_name,
            last_name,
            api_key,
        } => {
            let mut form = ProfileForm::from_profile(current.as_ref());
            if let Some(first_name) = first_name {
                form.first_name = first_name;
            }
            if let Some(last_name) = last_name {
                form.last_name = last_name;
            }
            if let Some(api_key) = api_key {
                form.api_key = api_key;
            }
            save_profile(repo, credentials, form, current.as_ref()).await?
        }
    };

    let mut shown = profile;
    if shown.api_key.is_some() {
        shown.api_key = Some("********".to_string());
    }
    match serde_json::to_string_pretty(&shown) {
        Ok(text) => println!("{text}"),
        Err(err) => log::error!("Failed to render profile: {err}"),
    }
    Ok(())
}

async fn run(cli: Cli, config: AppConfig) -> ServiceResult<()> {
    let repo = HttpRepository::new(&config)?;
    let credentials = SessionCredentials::new(
        FileSessionStore::new(&config.session_file),
        repo.clone(),
    );

    match cli.command {
        Command::Search(args) => run_search(args, &config, repo, &credentials).await,
        Command::Profile(command) => run_profile(command, &repo, &credentials).await,
        Command::Login(args) => sign_in(
            credentials.store(),
            &args.access_token,
            args.refresh_token.as_deref(),
            args.expires_at,
        ),
        Command::Logout => {
            credentials.clear();
            Ok(())
        }
    }
}

#[tokio::main]
async fn main() {
    dotenv().ok(); // Load .env file
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let cli = Cli::parse();

    // Select config profile (defaults to `local`).
    let app_env = env::var("APP_ENV").unwrap_or_else(|_| "local".into());

    let settings = Config::builder()
        // Add `./config/default.yaml`
        .add_source(config::File::with_name("config/default"))
        // Add environment-specific overrides
        .add_source(config::File::with_name(&format!("config/{}", app_env)).required(false))
        // Add settings from the environment (with a prefix of APP)
        .add_source(config::Environment::with_prefix("APP"))
        .build();

    let settings = match settings {
        Ok(settings) => settings,
        Err(err) => {
            log::error!("Error loading settings: {}", err);
            std::process::exit(1);
        }
    };

    let app_config = match settings.try_deserialize::<AppConfig>() {
        Ok(app_config) => app_config,
        Err(err) => {
            log::error!("Error loading app config: {}", err);
            std::process::exit(1);
        }
    };

    if let Err(err) = run(cli, app_config).await {
        log::error!("{err}");
        std::process::exit(1);
    }
}
