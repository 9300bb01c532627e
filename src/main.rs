use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use colored::Colorize;
use eyre::{Result, eyre};
use std::path::PathBuf;
use taskflow::validate::{self, FieldError};
use taskflow::{Config, NewTask, Store, Task, TaskFilter, TaskPatch, TaskPriority, TaskStats, TaskStatus, User};
use tracing::Level;

#[derive(Parser)]
#[command(name = "taskflow")]
#[command(about = "Taskflow CLI - tasks and accounts kept in a local record store")]
#[command(version)]
struct Cli {
    /// Path to a YAML config file (default: ~/.config/taskflow/taskflow.yml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Directory holding the stored entries, overrides the config file
    #[arg(short, long)]
    data_dir: Option<PathBuf>,

    /// Log at debug level
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create an account and log in as it
    Register {
        #[arg(long)]
        email: String,
        #[arg(long)]
        name: String,
        #[arg(long)]
        password: String,
        /// Password confirmation (defaults to --password)
        #[arg(long)]
        confirm: Option<String>,
    },

    /// Log in with an existing account
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },

    /// End the current session
    Logout,

    /// Show the logged-in user
    Whoami,

    /// Add a task
    Add {
        title: String,
        #[arg(short, long, default_value = "")]
        description: String,
        #[arg(short, long, default_value_t = TaskPriority::Medium)]
        priority: TaskPriority,
        #[arg(short, long, default_value_t = TaskStatus::Todo)]
        status: TaskStatus,
        /// Due date as YYYY-MM-DD
        #[arg(long)]
        due: Option<NaiveDate>,
    },

    /// List tasks, optionally filtered
    List {
        /// Case-insensitive text to look for in titles and descriptions
        #[arg(short, long)]
        search: Option<String>,
        #[arg(long)]
        status: Option<TaskStatus>,
        #[arg(long)]
        priority: Option<TaskPriority>,
    },

    /// Edit fields of a task
    Update {
        id: String,
        #[arg(short, long)]
        title: Option<String>,
        #[arg(short, long)]
        description: Option<String>,
        #[arg(short, long)]
        priority: Option<TaskPriority>,
        #[arg(short, long)]
        status: Option<TaskStatus>,
        #[arg(long, conflicts_with = "clear_due")]
        due: Option<NaiveDate>,
        /// Remove the due date
        #[arg(long)]
        clear_due: bool,
    },

    /// Move a task to another status
    Status { id: String, status: TaskStatus },

    /// Delete a task
    Delete { id: String },

    /// Count tasks per status
    Stats,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(data_dir) = cli.data_dir {
        config.data_dir = data_dir;
    }

    // Setup tracing
    let level = if cli.verbose {
        Level::DEBUG
    } else {
        config.level()?
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    let store = Store::open(&config)?;
    run(&store, cli.command)
}

fn run(store: &Store, command: Commands) -> Result<()> {
    match command {
        Commands::Register {
            email,
            name,
            password,
            confirm,
        } => {
            let confirm = confirm.unwrap_or_else(|| password.clone());
            validate::validate_registration(&name, &email, &password, &confirm).map_err(invalid)?;
            let user = store.register_user(&email, &name, &password)?;
            println!("{} Welcome, {}!", "✓".green(), user.name.bold());
        }
        Commands::Login { email, password } => {
            validate::validate_login(&email, &password).map_err(invalid)?;
            let user = store.login_user(&email, &password)?;
            println!("{} Logged in as {}", "✓".green(), user.email.bold());
        }
        Commands::Logout => {
            store.clear_user();
            println!("Logged out");
        }
        Commands::Whoami => match store.get_user()? {
            Some(user) => println!("{} <{}>", user.name.bold(), user.email),
            None => println!("Not logged in"),
        },
        Commands::Add {
            title,
            description,
            priority,
            status,
            due,
        } => {
            require_user(store)?;
            validate::validate_title(&title).map_err(invalid)?;
            let task = store.create_task(NewTask {
                title: title.trim().to_string(),
                description: description.trim().to_string(),
                priority,
                status,
                due_date: due,
            })?;
            println!("{} Created task {}", "✓".green(), task.id);
        }
        Commands::List {
            search,
            status,
            priority,
        } => {
            require_user(store)?;
            let filter = TaskFilter {
                search,
                status,
                priority,
            };
            let tasks = store.get_tasks()?;
            let matched = filter.apply(&tasks);

            if matched.is_empty() {
                println!("No tasks found");
                println!("{}", filter.empty_message());
            }
            for task in matched {
                print_task(task);
            }
        }
        Commands::Update {
            id,
            title,
            description,
            priority,
            status,
            due,
            clear_due,
        } => {
            require_user(store)?;
            if let Some(title) = &title {
                validate::validate_title(title).map_err(invalid)?;
            }
            let patch = TaskPatch {
                title: title.map(|t| t.trim().to_string()),
                description: description.map(|d| d.trim().to_string()),
                priority,
                status,
                due_date: if clear_due { Some(None) } else { due.map(Some) },
            };
            let task = store
                .update_task(&id, patch)?
                .ok_or_else(|| eyre!("No task with id {}", id))?;
            print_task(&task);
        }
        Commands::Status { id, status } => {
            require_user(store)?;
            let task = store
                .update_task(&id, TaskPatch::status(status))?
                .ok_or_else(|| eyre!("No task with id {}", id))?;
            print_task(&task);
        }
        Commands::Delete { id } => {
            require_user(store)?;
            if !store.delete_task(&id)? {
                return Err(eyre!("No task with id {}", id));
            }
            println!("{} Deleted task {}", "✓".green(), id);
        }
        Commands::Stats => {
            require_user(store)?;
            let stats = TaskStats::from_tasks(&store.get_tasks()?);
            println!("Total:       {}", stats.total);
            println!("To do:       {}", stats.todo);
            println!("In progress: {}", stats.in_progress.to_string().yellow());
            println!("Completed:   {}", stats.completed.to_string().green());
        }
    }

    Ok(())
}

/// Task commands need a session, the same way the dashboard sends you to login
fn require_user(store: &Store) -> Result<User> {
    store
        .get_user()?
        .ok_or_else(|| eyre!("Not logged in. Run `taskflow login` or `taskflow register` first."))
}

fn invalid(errors: Vec<FieldError>) -> eyre::Report {
    for error in &errors {
        eprintln!("{} {}", "✗".red(), error);
    }
    eyre!("{} invalid field(s)", errors.len())
}

fn print_task(task: &Task) {
    let status = match task.status {
        TaskStatus::Todo => task.status.as_str().normal(),
        TaskStatus::InProgress => task.status.as_str().yellow(),
        TaskStatus::Completed => task.status.as_str().green(),
    };
    let priority = match task.priority {
        TaskPriority::Low => task.priority.as_str().normal(),
        TaskPriority::Medium => task.priority.as_str().yellow(),
        TaskPriority::High => task.priority.as_str().red(),
    };
    let due = task.due_date.map(|d| format!("  due {}", d)).unwrap_or_default();

    println!("{}  [{}] [{}] {}{}", task.id.dimmed(), status, priority, task.title.bold(), due);
    if !task.description.is_empty() {
        println!("    {}", task.description);
    }
}
