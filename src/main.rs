use clap::{Arg, ArgMatches, Command};
use color_eyre::{eyre::eyre, Result};
use std::sync::Arc;

mod adapters;
mod application;
mod domain;
mod ports;

use adapters::{
    api::{ApiClient, HttpTaskRepository},
    config::FileConfigStore,
    tui::{run_tui, App},
};
use application::TaskStore;
use domain::{StatusFilter, TaskDraft, TaskFilter, TaskId, TaskStatus};
use ports::{ConfigStore, Theme, API_URL_ENV};

fn cli() -> Command {
    Command::new("taskboard")
        .version(env!("CARGO_PKG_VERSION"))
        .about("A terminal dashboard for a task-tracking REST API")
        .long_about("Browse, search, create, edit and delete tasks stored behind a REST API.\n\nRun without a subcommand to open the interactive dashboard.")
        .arg(
            Arg::new("api-url")
                .long("api-url")
                .value_name("URL")
                .help(format!("Task API base URL (can also be set via {API_URL_ENV})"))
                .global(true),
        )
        .subcommand(
            Command::new("tasks")
                .about("Task operations")
                .subcommand_required(true)
                .subcommand(
                    Command::new("list")
                        .about("List tasks as JSON")
                        .arg(
                            Arg::new("search")
                                .long("search")
                                .short('s')
                                .value_name("TEXT")
                                .help("Only tasks whose title or description contains TEXT"),
                        )
                        .arg(
                            Arg::new("status")
                                .long("status")
                                .value_name("STATUS")
                                .default_value("all")
                                .help("all, todo, in-progress or completed"),
                        ),
                )
                .subcommand(
                    Command::new("get")
                        .about("Get a specific task by ID")
                        .arg(task_id_arg()),
                )
                .subcommand(
                    Command::new("create")
                        .about("Create a task")
                        .arg(
                            Arg::new("title")
                                .long("title")
                                .short('t')
                                .value_name("TITLE")
                                .required(true),
                        )
                        .arg(description_arg())
                        .arg(status_arg()),
                )
                .subcommand(
                    Command::new("update")
                        .about("Update a task; omitted fields keep their current value")
                        .arg(task_id_arg())
                        .arg(
                            Arg::new("title")
                                .long("title")
                                .short('t')
                                .value_name("TITLE"),
                        )
                        .arg(description_arg())
                        .arg(status_arg()),
                )
                .subcommand(
                    Command::new("delete")
                        .about("Delete a task")
                        .arg(task_id_arg()),
                )
                .subcommand(Command::new("counts").about("Show task counts per status")),
        )
        .subcommand(
            Command::new("config")
                .about("Configuration")
                .subcommand_required(true)
                .subcommand(Command::new("show").about("Print the effective configuration"))
                .subcommand(
                    Command::new("theme")
                        .about("Set the dashboard theme")
                        .arg(
                            Arg::new("theme")
                                .help("light or dark")
                                .required(true)
                                .index(1),
                        ),
                ),
        )
}

fn task_id_arg() -> Arg {
    Arg::new("task_id")
        .help("Task ID")
        .required(true)
        .index(1)
}

fn description_arg() -> Arg {
    Arg::new("description")
        .long("description")
        .short('d')
        .value_name("TEXT")
}

fn status_arg() -> Arg {
    Arg::new("status")
        .long("status")
        .value_name("STATUS")
        .help("todo, in-progress or completed")
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize color-eyre for better error reporting
    color_eyre::install()?;

    let matches = cli().get_matches();

    // Load configuration, then apply flag/env overrides
    let config_store = Arc::new(FileConfigStore::new()?);
    let config = config_store.load_config().await?.with_api_url_overrides(
        matches.get_one::<String>("api-url").cloned(),
        std::env::var(API_URL_ENV).ok(),
    );

    // Log to a file; the terminal belongs to the dashboard
    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&config.log_file)?;

    tracing_subscriber::fmt()
        .with_writer(std::sync::Mutex::new(log_file))
        .with_ansi(false)
        .with_max_level(tracing::Level::DEBUG)
        .init();

    // Create dependencies
    let api_client = ApiClient::new(config.api_base_url.clone())?;
    tracing::info!("Using task API at {}", api_client.base_url());
    let task_repo = Arc::new(HttpTaskRepository::new(api_client));
    let store = Arc::new(TaskStore::new(task_repo));

    match matches.subcommand() {
        Some(("tasks", tasks_matches)) => run_tasks_command(&store, tasks_matches).await,
        Some(("config", config_matches)) => match config_matches.subcommand() {
            Some(("show", _)) => {
                println!("{}", serde_json::to_string_pretty(&config)?);
                println!("# file: {}", config_store.path().display());
                Ok(())
            }
            Some(("theme", theme_matches)) => {
                let theme: Theme = required(theme_matches, "theme")?.parse()?;
                let mut stored = config_store.load_config().await?;
                stored.theme = theme;
                config_store.save_config(&stored).await?;
                println!("Theme set to {theme}");
                Ok(())
            }
            _ => Err(eyre!("Unknown config subcommand")),
        },
        None => {
            // Default behavior - run TUI
            let app = App::new(store, config_store, config);
            if let Err(e) = run_tui(app).await {
                eprintln!("❌ Application error: {e}");
                std::process::exit(1);
            }
            Ok(())
        }
        _ => Err(eyre!("Unknown command")),
    }
}

async fn run_tasks_command(store: &TaskStore, matches: &ArgMatches) -> Result<()> {
    match matches.subcommand() {
        Some(("list", list_matches)) => {
            store.load().await;
            let snapshot = store.snapshot().await;
            if let Some(error) = snapshot.error {
                fail("Failed to list tasks", &error);
            }

            let status: StatusFilter = required(list_matches, "status")?.parse()?;
            let search = list_matches
                .get_one::<String>("search")
                .cloned()
                .unwrap_or_default();
            let tasks = TaskFilter::new(search, status).apply(&snapshot.tasks);
            println!("{}", serde_json::to_string_pretty(&tasks)?);
        }
        Some(("get", get_matches)) => {
            let id = TaskId::parse(required(get_matches, "task_id")?)?;
            match store.get_by_id(&id).await {
                Ok(task) => println!("{}", serde_json::to_string_pretty(&task)?),
                Err(e) => fail("Failed to get task", &e.user_message()),
            }
        }
        Some(("create", create_matches)) => {
            let draft = TaskDraft::new(
                required(create_matches, "title")?,
                optional(create_matches, "description").unwrap_or_default(),
                parse_status(create_matches)?.unwrap_or_default(),
            );
            match store.create(&draft).await {
                Ok(task) => println!("{}", serde_json::to_string_pretty(&task)?),
                Err(e) => fail("Failed to create task", &e.user_message()),
            }
        }
        Some(("update", update_matches)) => {
            let id = TaskId::parse(required(update_matches, "task_id")?)?;
            let current = match store.get_by_id(&id).await {
                Ok(task) => task,
                Err(e) => fail("Failed to get task", &e.user_message()),
            };

            let mut draft = TaskDraft::from_task(&current);
            if let Some(title) = optional(update_matches, "title") {
                draft.title = title;
            }
            if let Some(description) = optional(update_matches, "description") {
                draft.description = description;
            }
            if let Some(status) = parse_status(update_matches)? {
                draft.status = status;
            }

            match store.update(&id, &draft).await {
                Ok(task) => println!("{}", serde_json::to_string_pretty(&task)?),
                Err(e) => fail("Failed to update task", &e.user_message()),
            }
        }
        Some(("delete", delete_matches)) => {
            let id = TaskId::parse(required(delete_matches, "task_id")?)?;
            match store.remove(&id).await {
                Ok(()) => println!("Deleted task {id}"),
                Err(e) => fail("Failed to delete task", &e.user_message()),
            }
        }
        Some(("counts", _)) => {
            store.load().await;
            if let Some(error) = store.error().await {
                fail("Failed to count tasks", &error);
            }
            println!("{}", serde_json::to_string_pretty(&store.counts().await)?);
        }
        _ => return Err(eyre!("Unknown tasks subcommand")),
    }

    Ok(())
}

fn required<'a>(matches: &'a ArgMatches, name: &str) -> Result<&'a str> {
    matches
        .get_one::<String>(name)
        .map(String::as_str)
        .ok_or_else(|| eyre!("missing required argument '{name}'"))
}

fn optional(matches: &ArgMatches, name: &str) -> Option<String> {
    matches.get_one::<String>(name).cloned()
}

fn parse_status(matches: &ArgMatches) -> Result<Option<TaskStatus>> {
    Ok(optional(matches, "status")
        .map(|s| s.parse::<TaskStatus>())
        .transpose()?)
}

fn fail(context: &str, message: &str) -> ! {
    eprintln!("❌ {context}: {message}");
    std::process::exit(1);
}
