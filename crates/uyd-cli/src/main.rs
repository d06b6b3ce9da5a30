//! uyd - command-line host for the UYD website data layer.
//!
//! Loads site pages against the configured backend and prints the patched
//! page as JSON, followed by any notifications. Also drives the session
//! (login/refresh/logout) and the registration and newsletter forms.

use std::io::{self, BufRead, Write};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use uyd_core::forms::{
    submit_newsletter, FormFeedback, NewsletterForm, NewsletterOutcome, RegistrationForm,
    RegistrationHandler, RegistrationOutcome,
};
use uyd_core::notify::NotificationLog;
use uyd_core::view::templates;
use uyd_core::{ApiClient, Config, DataManager, Page};

#[derive(Parser)]
#[command(name = "uyd", version, about = "UYD website data layer")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Load the home page (stats, events, news, programs)
    Home,
    /// Load the events page
    Events,
    /// Load one event's details page
    Event { id: i64 },
    /// Load one news article's details page
    News { id: i64 },
    /// Log in and store the session tokens
    Login { email: Option<String> },
    /// Trade the stored refresh token for a new access token
    Refresh,
    /// Forget the session tokens
    Logout,
    /// Register for an event
    Register {
        event_id: i64,
        name: String,
        email: String,
        phone: String,
    },
    /// Subscribe to the newsletter
    Subscribe {
        email: String,
        /// Newsletter interests; the first one picks the list
        #[arg(long = "interest")]
        interests: Vec<String>,
    },
}

/// Initialize the tracing subscriber for logging
fn init_tracing() {
    // Use RUST_LOG env var to control log level (e.g., RUST_LOG=debug)
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(filter)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    init_tracing();

    let mut config = Config::load()?;
    let api = config.api_client()?;
    info!(base_url = api.base_url(), "uyd starting");

    match cli.command {
        Command::Home => {
            let (manager, log) = data_manager(&config, api, templates::home_page());
            let report = manager.init().await;
            print_page(&manager, &log)?;
            if report.loaded() == 0 {
                bail!("No home page data could be loaded");
            }
        }
        Command::Events => {
            let (manager, log) = data_manager(&config, api, templates::events_page());
            manager.load_all_events().await;
            print_page(&manager, &log)?;
        }
        Command::Event { id } => {
            let (manager, log) = data_manager(&config, api, templates::event_details_page());
            let found = manager.load_event(id).await.is_some();
            print_page(&manager, &log)?;
            if !found {
                bail!("Event {} could not be loaded", id);
            }
        }
        Command::News { id } => {
            let (manager, log) = data_manager(&config, api, templates::news_details_page());
            let found = manager.load_news_article(id).await.is_some();
            print_page(&manager, &log)?;
            if !found {
                bail!("News article {} could not be loaded", id);
            }
        }
        Command::Login { email } => {
            let email = match email.or_else(|| config.last_email.clone()) {
                Some(email) => email,
                None => prompt("Email: ")?,
            };
            let password = rpassword::prompt_password("Password: ")
                .context("Failed to read password")?;

            let tokens = api.login(&email, &password).await.context("Login failed")?;
            if let Some(ref refresh) = tokens.refresh {
                api.set_refresh_token(refresh)?;
            }
            if tokens.access.is_none() {
                bail!("Login response did not include an access token");
            }

            config.last_email = Some(email);
            config.save()?;
            println!("Logged in");
        }
        Command::Refresh => {
            let tokens = api.refresh_token().await.context("Token refresh failed")?;
            // Rotated refresh tokens replace the stored one
            if let Some(ref refresh) = tokens.refresh {
                api.set_refresh_token(refresh)?;
            }
            println!("Session refreshed");
        }
        Command::Logout => {
            api.logout()?;
            println!("Logged out");
        }
        Command::Register {
            event_id,
            name,
            email,
            phone,
        } => {
            let log = Arc::new(NotificationLog::new());
            let handler = RegistrationHandler::new(api, log.clone());
            let form = RegistrationForm::new(name, email, phone);

            let outcome = handler
                .submit(Some(event_id), &form, &mut FormFeedback::new())
                .await;
            print_notifications(&log);
            match outcome {
                RegistrationOutcome::Registered { .. } => {}
                RegistrationOutcome::Invalid(problems) => {
                    for problem in &problems {
                        eprintln!("{}", problem);
                    }
                    bail!("Registration form has {} invalid field(s)", problems.len());
                }
                _ => bail!("Registration was not completed"),
            }
        }
        Command::Subscribe { email, interests } => {
            let (manager, log) = data_manager(&config, api, Page::new());
            let form = NewsletterForm {
                interests,
                ..NewsletterForm::new(email)
            };

            let outcome = submit_newsletter(&manager, &form, &mut FormFeedback::new()).await;
            print_notifications(&log);
            match outcome? {
                NewsletterOutcome::Subscribed(_) => {}
                NewsletterOutcome::Invalid(problem) => bail!("{}", problem),
            }
        }
    }

    Ok(())
}

fn data_manager(config: &Config, api: ApiClient, page: Page) -> (DataManager, Arc<NotificationLog>) {
    let log = Arc::new(NotificationLog::new());
    let manager = DataManager::new(api, page, log.clone(), config.stale_policy);
    (manager, log)
}

fn print_page(manager: &DataManager, log: &NotificationLog) -> Result<()> {
    let page = serde_json::to_string_pretty(&manager.page())?;
    println!("{}", page);
    print_notifications(log);
    Ok(())
}

fn print_notifications(log: &NotificationLog) {
    for notification in log.drain() {
        eprintln!("[{}] {}", notification.level, notification.message);
    }
}

fn prompt(label: &str) -> Result<String> {
    print!("{}", label);
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    let value = line.trim().to_string();
    if value.is_empty() {
        bail!("No input given");
    }
    Ok(value)
}
