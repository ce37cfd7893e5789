//! Swallow command-line interface.
//!
//! Every command prints the JSON response envelope on stdout and exits
//! non-zero when the envelope reports an error. Logs go to stderr.

use std::io::{self, BufRead};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use swallow::app::{App, AppContext, Response};
use swallow::config::{resolve_home, AppConfig};
use swallow::content::Metadata;
use swallow::logging;
use swallow::settings::GithubSettings;
use swallow::site::{AuthorPatch, SiteConfigPatch};

#[derive(Parser)]
#[command(name = "swallow")]
#[command(about = "Write articles, preview the site and publish it to a git host")]
#[command(version)]
struct Cli {
    /// Application home (defaults to $SWALLOW_HOME or ~/.swallow)
    #[arg(long, global = true)]
    home: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Create the site tree with the generator if it is missing
    Init,
    /// List articles, optionally filtered by title or tag
    List {
        #[arg(default_value = "")]
        term: String,
    },
    /// Print an article's metadata and body
    Show { id: String },
    /// Create or update an article
    Save {
        /// Existing id or `about`; omit to create a new article
        #[arg(long, default_value = "")]
        id: String,
        #[arg(long, default_value = "")]
        title: String,
        /// Comma-separated tags
        #[arg(long, value_delimiter = ',')]
        tags: Vec<String>,
        #[arg(long, default_value = "")]
        description: String,
        /// Creation date (`YYYY-MM-DD HH:MM:SS`); defaults to now
        #[arg(long, default_value = "")]
        date: String,
        /// File holding the article body
        #[arg(long)]
        body_file: Option<PathBuf>,
    },
    /// Remove articles by id
    Remove {
        #[arg(required = true)]
        ids: Vec<String>,
    },
    /// Copy an image into an article's image directory
    Attach { id: String, image: PathBuf },
    /// Replace a site image such as the logo or favicon
    Asset {
        /// Path relative to the site directory, e.g. `static/logo.png`
        target: String,
        image: PathBuf,
    },
    /// Generate the site and force-push it to the configured repository
    Deploy,
    /// Run the live preview until Enter is pressed
    Preview,
    /// Read or edit the site configuration
    SiteConfig {
        #[command(subcommand)]
        action: SiteConfigAction,
    },
    /// Read or edit the publishing credentials
    Settings {
        #[command(subcommand)]
        action: SettingsAction,
    },
}

#[derive(Subcommand)]
enum SiteConfigAction {
    Get,
    /// Change only the given fields
    Set {
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        language: Option<String>,
        #[arg(long)]
        theme: Option<String>,
        #[arg(long)]
        copyright: Option<String>,
        #[arg(long)]
        author: Option<String>,
    },
}

#[derive(Subcommand)]
enum SettingsAction {
    Get,
    SetGithub {
        #[arg(long)]
        username: String,
        #[arg(long)]
        token: String,
        #[arg(long)]
        email: String,
        /// HTTPS URL of the repository
        #[arg(long)]
        repository: String,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let home = match cli.home.clone().map(Ok).unwrap_or_else(resolve_home) {
        Ok(home) => home,
        Err(e) => return fail(&format!("cannot resolve home: {}", e)),
    };
    let config = match AppConfig::load_or_init(&home) {
        Ok(config) => config,
        Err(e) => return fail(&e.to_string()),
    };
    logging::init(&config.log_level);

    let app = match AppContext::open(&home, config) {
        Ok(ctx) => App::new(ctx),
        Err(e) => {
            tracing::error!(error = %e, "cannot start");
            return fail(&e.to_string());
        }
    };

    let response = run(&app, cli.command);
    println!("{}", pretty(&response));
    if response.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

fn run(app: &App, command: Command) -> Response {
    match command {
        Command::Init => app.site_init(),
        Command::List { term } => app.article_list(&term),
        Command::Show { id } => app.article_get(&id),
        Command::Save {
            id,
            title,
            tags,
            description,
            date,
            body_file,
        } => {
            let body = match body_file.map(std::fs::read_to_string).transpose() {
                Ok(body) => body.unwrap_or_default(),
                Err(e) => return Response::error(format!("cannot read body: {}", e)),
            };
            let meta = Metadata {
                title,
                tags: tags.into_iter().map(|t| t.trim().to_string()).filter(|t| !t.is_empty()).collect(),
                description,
                date,
                lastmod: String::new(),
            };
            app.article_save(&id, meta, &body)
        }
        Command::Remove { ids } => app.article_remove(&ids),
        Command::Attach { id, image } => app.article_insert_image(&id, &image),
        Command::Asset { target, image } => app.select_conf_image(&target, &image),
        Command::Deploy => app.site_deploy(),
        Command::Preview => {
            let started = app.site_preview();
            if !started.is_success() {
                return started;
            }
            println!("{}", pretty(&started));
            eprintln!("press Enter to stop the preview");
            let mut line = String::new();
            let _ = io::stdin().lock().read_line(&mut line);
            app.close_preview()
        }
        Command::SiteConfig { action } => match action {
            SiteConfigAction::Get => app.site_config_get(),
            SiteConfigAction::Set {
                title,
                description,
                language,
                theme,
                copyright,
                author,
            } => app.site_config_save(SiteConfigPatch {
                title,
                description,
                default_content_language: language,
                theme,
                copyright,
                author: author.map(|name| AuthorPatch { name: Some(name) }),
            }),
        },
        Command::Settings { action } => match action {
            SettingsAction::Get => app.conf_get_github(),
            SettingsAction::SetGithub {
                username,
                token,
                email,
                repository,
            } => app.conf_save_github(GithubSettings {
                username,
                token,
                email,
                repository,
            }),
        },
    }
}

fn pretty(response: &Response) -> String {
    serde_json::to_string_pretty(response).unwrap_or_else(|_| response.to_json())
}

fn fail(msg: &str) -> ExitCode {
    println!("{}", pretty(&Response::error(msg)));
    ExitCode::FAILURE
}
