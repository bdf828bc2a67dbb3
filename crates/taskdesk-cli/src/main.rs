//! TaskDesk CLI - role-gated task dashboards from the terminal.
//!
//! Signs in against the TaskDesk API, keeps the session between runs, and
//! shows the Admin, Manager or Member dashboard for the signed-in user.

mod render;

use std::io::{self, Write};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use taskdesk_core::api::{ApiClient, ApiError};
use taskdesk_core::auth::{
    Credentials, FileSessionStore, KeyringSessionStore, MemorySessionStore, OrganizationForm, Role,
    SessionStore, SignUpForm,
};
use taskdesk_core::client::{SessionClient, SessionError};
use taskdesk_core::config::{Config, StorageBackend};
use taskdesk_core::http::{Method, ReqwestTransport, Request};
use taskdesk_core::models::{InviteRequest, StatusUpdate, TaskCategory, TaskDraft, TaskPriority, TaskStatus};
use taskdesk_core::utils::format_age;

type Api = ApiClient<ReqwestTransport, Box<dyn SessionStore>>;

const USAGE: &str = "\
Usage: taskdesk [--demo] [--ephemeral] <command> [args]

Account:
  signin [email]                              Sign in (prompts for password)
  signup <name> <email> <invite-token>        Create an account from an invitation
  register-org <organization> <name> <email>  Register a new organization
  signout                                     Forget the stored session
  whoami                                      Show the signed-in user
  resume                                      Renew the session from the refresh cookie

Dashboards:
  dashboard                                   Show the dashboard for your role
  tasks                                       List tasks
  show-task <id>                              Show one task in detail

Admin:
  invite <email> [role]                       Invite a user (default role Member)
  remove-user <id>                            Remove a user
  set-role <id> <role>                        Change a user's role

Manager:
  create-task <title> [category] [priority] [due-date]
  assign-task <task-id> <user-id>             Reassign a task to another member

Member:
  task-status <id> <status> [comment]         Update the status of an assigned task

Other:
  request <METHOD> <path> [json-body]         Send a raw authenticated request

Flags:
  --demo        Show sample data when the API cannot be reached
  --ephemeral   Keep the session in memory only";

/// Initialize the tracing subscriber for logging
fn init_tracing() {
    // Use RUST_LOG env var to control log level (e.g., RUST_LOG=debug)
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(filter)
        .init();
}

struct Options {
    demo: bool,
    ephemeral: bool,
    args: Vec<String>,
}

impl Options {
    fn parse(args: impl Iterator<Item = String>) -> Self {
        let mut options = Options {
            demo: false,
            ephemeral: false,
            args: Vec::new(),
        };
        for arg in args {
            match arg.as_str() {
                "--demo" => options.demo = true,
                "--ephemeral" => options.ephemeral = true,
                _ => options.args.push(arg),
            }
        }
        options
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    init_tracing();

    let options = Options::parse(std::env::args().skip(1));
    let Some((command, args)) = options.args.split_first() else {
        println!("{}", USAGE);
        return Ok(());
    };
    if command == "help" || command == "--help" || command == "-h" {
        println!("{}", USAGE);
        return Ok(());
    }

    let mut config = Config::load().unwrap_or_else(|e| {
        warn!(error = %e, "Failed to load config, using defaults");
        Config::default()
    });

    let store = open_store(&config, options.ephemeral)?;
    let transport = ReqwestTransport::new(config.api_url())?;
    info!(api = %transport.base_url(), "TaskDesk CLI starting");

    let session = SessionClient::new(transport, store)
        .with_refresh_method(config.refresh_method.as_method());
    session.restore();
    let api = ApiClient::new(Arc::new(session)).with_demo_mode(options.demo || config.demo_mode);

    let result = run(command, args, &api, &mut config).await;
    if let Err(ref e) = result {
        if requires_sign_in(e) {
            eprintln!("Please sign in again with `taskdesk signin`.");
        }
    }
    result
}

fn open_store(config: &Config, ephemeral: bool) -> Result<Box<dyn SessionStore>> {
    if ephemeral {
        return Ok(Box::new(MemorySessionStore::new()));
    }
    Ok(match config.storage {
        StorageBackend::File => Box::new(FileSessionStore::new(Config::cache_dir()?)),
        StorageBackend::Keyring => Box::new(KeyringSessionStore::new()),
        StorageBackend::Memory => Box::new(MemorySessionStore::new()),
    })
}

/// True for errors the user can only fix by signing in.
fn requires_sign_in(err: &anyhow::Error) -> bool {
    if let Some(e) = err.downcast_ref::<SessionError>() {
        return e.requires_sign_in();
    }
    if let Some(e) = err.downcast_ref::<ApiError>() {
        return e.requires_sign_in();
    }
    false
}

async fn run(command: &str, args: &[String], api: &Api, config: &mut Config) -> Result<()> {
    match command {
        "signin" => sign_in(api, config, args.first().cloned()).await,
        "signup" => sign_up(api, args).await,
        "register-org" => register_organization(api, args).await,
        "signout" => {
            api.session().sign_out();
            println!("Signed out.");
            Ok(())
        }
        "whoami" => {
            whoami(api);
            Ok(())
        }
        "resume" => resume(api).await,
        "dashboard" => dashboard(api).await,
        "tasks" => tasks(api).await,
        "show-task" => show_task(api, args).await,
        "invite" => invite(api, args).await,
        "remove-user" => {
            let id = arg(args, 0, "user id")?;
            api.remove_user(id).await?;
            println!("User removed!");
            Ok(())
        }
        "set-role" => {
            let id = arg(args, 0, "user id")?;
            let role = parse_role(arg(args, 1, "role")?)?;
            api.change_role(id, role).await?;
            println!("Role updated!");
            Ok(())
        }
        "create-task" => create_task(api, args).await,
        "assign-task" => assign_task(api, args).await,
        "task-status" => task_status(api, args).await,
        "request" => raw_request(api, args).await,
        other => bail!("Unknown command '{}'. Run `taskdesk help` for usage.", other),
    }
}

fn arg<'a>(args: &'a [String], index: usize, name: &str) -> Result<&'a str> {
    args.get(index)
        .map(String::as_str)
        .with_context(|| format!("Missing argument: <{}>", name))
}

fn parse_role(s: &str) -> Result<Role> {
    Role::parse(s).with_context(|| format!("Unknown role '{}' (expected Admin, Manager or Member)", s))
}

fn prompt(label: &str) -> Result<String> {
    print!("{}", label);
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin().read_line(&mut line)?;
    Ok(line.trim().to_string())
}

fn require_role(api: &Api) -> Result<Role> {
    match api.session().identity() {
        Some(identity) => Ok(identity.role),
        None => Err(SessionError::Authentication("Not signed in.".to_string()).into()),
    }
}

// ===== Account commands =====

async fn sign_in(api: &Api, config: &mut Config, email: Option<String>) -> Result<()> {
    let email = match email.or_else(|| config.last_email.clone()) {
        Some(email) => email,
        None => prompt("Email: ")?,
    };
    let password = rpassword::prompt_password(format!("Password for {}: ", email))?;

    let session = api.session().sign_in(&Credentials::new(email.clone(), password)).await?;
    println!("Login successful. Signed in as {} ({}).", session.identity.display_name(), session.role());

    config.last_email = Some(email);
    if let Err(e) = config.save() {
        warn!(error = %e, "Failed to save config");
    }
    Ok(())
}

async fn sign_up(api: &Api, args: &[String]) -> Result<()> {
    let name = arg(args, 0, "name")?.to_string();
    let email = arg(args, 1, "email")?.to_string();
    let token = args.get(2).cloned().unwrap_or_default();
    let password = rpassword::prompt_password("Choose a password: ")?;

    let form = SignUpForm {
        name,
        email,
        password,
        token,
    };
    api.session().sign_up(&form).await?;
    println!("Signup successful! Run `taskdesk signin` to continue.");
    Ok(())
}

async fn register_organization(api: &Api, args: &[String]) -> Result<()> {
    let organization = arg(args, 0, "organization")?.to_string();
    let name = arg(args, 1, "name")?.to_string();
    let email = arg(args, 2, "email")?.to_string();
    let password = rpassword::prompt_password("Choose a password: ")?;

    let form = OrganizationForm {
        name,
        email,
        password,
        organization,
    };
    api.session().register_organization(&form).await?;
    println!("Organization created! Run `taskdesk signin` to continue.");
    Ok(())
}

fn whoami(api: &Api) {
    match api.session().session() {
        Some(session) => {
            let identity = &session.identity;
            println!("{} ({})", identity.display_name(), session.role());
            if let Some(ref email) = identity.email {
                println!("  Email:        {}", email);
            }
            if let Some(ref organization) = identity.organization {
                println!("  Organization: {}", organization);
            }
            println!("  Token issued: {}", format_age(session.token_age()));
        }
        None => println!("Not signed in."),
    }
}

async fn resume(api: &Api) -> Result<()> {
    api.session().refresh().await?;
    match api.session().identity() {
        Some(identity) => println!("Session resumed for {} ({}).", identity.display_name(), identity.role),
        None => println!("Refresh succeeded, but no user is stored. Run `taskdesk signin`."),
    }
    Ok(())
}

// ===== Dashboards =====

async fn dashboard(api: &Api) -> Result<()> {
    match require_role(api)? {
        Role::Admin => {
            let (stats, users, invites) =
                futures::future::join3(api.task_stats(), api.users(), api.invites()).await;
            render::print_stats(&stats?);
            render::print_users("Users", &users?);
            render::print_invites(&invites?);
        }
        Role::Manager => {
            let (tasks, members) = futures::future::join(api.tasks(), api.members()).await;
            render::print_tasks("Team tasks", &tasks?);
            render::print_users("Members", &members?);
        }
        Role::Member => {
            render::print_member_tasks(&api.my_tasks().await?);
        }
    }
    Ok(())
}

async fn tasks(api: &Api) -> Result<()> {
    match require_role(api)? {
        Role::Member => render::print_member_tasks(&api.my_tasks().await?),
        Role::Admin | Role::Manager => render::print_tasks("Team tasks", &api.tasks().await?),
    }
    Ok(())
}

async fn show_task(api: &Api, args: &[String]) -> Result<()> {
    let id = arg(args, 0, "task id")?;
    let tasks = match require_role(api)? {
        Role::Member => api.my_tasks().await?,
        Role::Admin | Role::Manager => api.tasks().await?,
    };
    let task = tasks
        .value()
        .iter()
        .find(|t| t.id == id)
        .with_context(|| format!("No task with id {}", id))?;
    render::print_task_detail(task);
    Ok(())
}

// ===== Mutations =====

async fn invite(api: &Api, args: &[String]) -> Result<()> {
    let email = arg(args, 0, "email")?;
    let role = match args.get(1) {
        Some(role) => parse_role(role)?,
        None => Role::Member,
    };
    let invite = InviteRequest {
        email: email.to_string(),
        role,
    };
    invite.validate()?;
    api.send_invite(&invite).await?;
    println!("Invitation sent!");
    Ok(())
}

async fn create_task(api: &Api, args: &[String]) -> Result<()> {
    let mut draft = TaskDraft::new(arg(args, 0, "title")?);
    if let Some(category) = args.get(1) {
        draft.category = TaskCategory::parse(category)
            .with_context(|| format!("Unknown category '{}'", category))?;
    }
    if let Some(priority) = args.get(2) {
        draft.priority = TaskPriority::parse(priority)
            .with_context(|| format!("Unknown priority '{}'", priority))?;
    }
    if let Some(due) = args.get(3) {
        chrono::NaiveDate::parse_from_str(due, "%Y-%m-%d")
            .with_context(|| format!("Due date '{}' is not YYYY-MM-DD", due))?;
        draft.due_date = due.clone();
    }
    api.create_task(&draft).await?;
    println!("Task created");
    Ok(())
}

async fn assign_task(api: &Api, args: &[String]) -> Result<()> {
    let task_id = arg(args, 0, "task id")?;
    let user_id = arg(args, 1, "user id")?;
    let tasks = api.tasks().await?;
    if tasks.is_demo() {
        bail!("Cannot edit tasks while the API is unavailable");
    }
    let task = tasks
        .value()
        .iter()
        .find(|t| t.id == task_id)
        .with_context(|| format!("No task with id {}", task_id))?;

    let mut draft = TaskDraft::from(task);
    draft.assigned_to_id = user_id.to_string();
    api.update_task(task_id, &draft).await?;
    println!("Task updated");
    Ok(())
}

async fn task_status(api: &Api, args: &[String]) -> Result<()> {
    let id = arg(args, 0, "task id")?;
    let raw_status = arg(args, 1, "status")?;
    let status = TaskStatus::parse(raw_status)
        .with_context(|| format!("Unknown status '{}' (expected Todo, In Progress, Completed or Expired)", raw_status))?;
    let comment = args.get(2..).map(|rest| rest.join(" ")).unwrap_or_default();

    api.update_task_status(id, &StatusUpdate { status, comment }).await?;
    println!("Task updated");
    Ok(())
}

async fn raw_request(api: &Api, args: &[String]) -> Result<()> {
    let method = Method::from_bytes(arg(args, 0, "METHOD")?.to_ascii_uppercase().as_bytes())
        .context("Invalid HTTP method")?;
    let mut request = Request::new(method, arg(args, 1, "path")?);
    if let Some(body) = args.get(2) {
        let body: serde_json::Value = serde_json::from_str(body).context("Body is not valid JSON")?;
        request = request.json_value(body);
    }

    let response = api.session().request(request).await?;
    println!("{}", response.status());
    match response.json::<serde_json::Value>() {
        Ok(value) => println!("{}", serde_json::to_string_pretty(&value)?),
        Err(_) => println!("{}", response.text()),
    }
    Ok(())
}
