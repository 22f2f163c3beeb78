mod api;
mod error;
mod responder;
mod store;

use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use clap::{Args, Parser, Subcommand};
use counsel::admin::{AdminError, DEFAULT_ADMIN_PAGE_SIZE, UpdateUserRequest, filter_users};
use counsel::config::{ClientConfig, keys};
use counsel::laws::{ALL_ACTS, DEFAULT_PAGE_SIZE, filter_laws, total_pages};
use counsel::session::Session;
use counsel::{ConversationLog, Dispatcher, ReplySource};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use crate::api::Api;
use crate::error::CliError;
use crate::responder::ReqwestResponder;
use crate::store::FileStore;

#[derive(Parser, Debug)]
#[command(name = "legally-cli", about = "Legally legal-information assistant in the terminal")]
struct Cli {
    #[arg(long, env = "LEGALLY_API_BASE_URL")]
    base_url: Option<String>,

    #[arg(long, env = "LEGALLY_API_PREFIX")]
    api_prefix: Option<String>,

    #[arg(long, env = "LEGALLY_CHAT_URL")]
    chat_url: Option<String>,

    #[arg(long, env = "LEGALLY_CHAT_TIMEOUT_SECS")]
    chat_timeout_secs: Option<String>,

    #[arg(long, env = "LEGALLY_SESSION_FILE", default_value = ".legally-session.json")]
    session_file: PathBuf,

    #[command(subcommand)]
    command: Command,
}

impl Cli {
    /// Flags first, then the remaining `LEGALLY_*` variables.
    fn config(&self) -> Result<ClientConfig, CliError> {
        let overrides = [
            (keys::API_BASE_URL, &self.base_url),
            (keys::API_PREFIX, &self.api_prefix),
            (keys::CHAT_URL, &self.chat_url),
            (keys::CHAT_TIMEOUT_SECS, &self.chat_timeout_secs),
        ];
        let config = ClientConfig::from_lookup(|key| {
            overrides
                .iter()
                .find(|(k, _)| *k == key)
                .and_then(|(_, v)| (*v).clone())
                .or_else(|| std::env::var(key).ok())
        })?;
        Ok(config)
    }
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Wake the backend and check its health endpoint.
    Ping,
    /// Ask one question and print the answer.
    Ask {
        #[arg(required = true)]
        text: Vec<String>,
    },
    /// Interactive chat; `/quit` exits.
    Chat,
    /// Browse the law catalogue.
    Laws(LawsArgs),
    Admin(AdminCommand),
}

#[derive(Args, Debug)]
struct LawsArgs {
    #[arg(long, default_value_t = 1)]
    page: u64,
    #[arg(long, default_value_t = DEFAULT_PAGE_SIZE)]
    limit: u64,
    #[arg(long, default_value = "")]
    query: String,
    #[arg(long, default_value = ALL_ACTS)]
    act: String,
}

#[derive(Args, Debug)]
struct AdminCommand {
    #[command(subcommand)]
    command: AdminSubcommand,
}

#[derive(Subcommand, Debug)]
enum AdminSubcommand {
    Login {
        #[arg(long)]
        email: String,
        #[arg(long, env = "LEGALLY_ADMIN_PASSWORD")]
        password: String,
    },
    Logout,
    Dashboard,
    Users {
        #[arg(long, default_value_t = DEFAULT_ADMIN_PAGE_SIZE)]
        limit: u64,
        #[arg(long, default_value_t = 0)]
        offset: u64,
        #[arg(long, default_value = "")]
        search: String,
    },
    User {
        user_id: String,
    },
    Chats {
        user_id: String,
    },
    Update {
        user_id: String,
        #[arg(long, default_value = "")]
        email: String,
        #[arg(long, default_value = "")]
        phone: String,
        #[arg(long, default_value = "")]
        display_name: String,
    },
    Delete {
        user_id: String,
    },
    Queries {
        #[arg(long, default_value_t = DEFAULT_ADMIN_PAGE_SIZE)]
        limit: u64,
        #[arg(long, default_value_t = 0)]
        offset: u64,
    },
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let config = cli.config()?;
    let store = FileStore::new(&cli.session_file);

    match cli.command {
        Command::Ping => run_ping(config).await,
        Command::Ask { text } => run_ask(&config, &text.join(" ")).await,
        Command::Chat => run_chat(&config).await,
        Command::Laws(args) => run_laws(config, args).await,
        Command::Admin(admin) => run_admin(config, store, admin).await,
    }
}

async fn run_ping(config: ClientConfig) -> Result<(), CliError> {
    Api::new(config).ping().await?;
    println!("ok");
    Ok(())
}

async fn run_ask(config: &ClientConfig, text: &str) -> Result<(), CliError> {
    let dispatcher = Dispatcher::new(ReqwestResponder::new(config)?);
    let mut log = ConversationLog::new();
    if let Some(reply) = dispatcher.send(&mut log, text, now_ms()).await {
        print_reply(reply.source, &reply.text);
    }
    Ok(())
}

async fn run_chat(config: &ClientConfig) -> Result<(), CliError> {
    let dispatcher = Dispatcher::new(ReqwestResponder::new(config)?);
    let mut log = ConversationLog::new();
    let stdin = io::stdin();
    let mut line = String::new();

    eprintln!("Ask about a law, crime scenario, legal act, or regulation. /quit exits.");
    loop {
        eprint!("> ");
        io::stderr().flush()?;
        line.clear();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let text = line.trim();
        if text == "/quit" {
            break;
        }
        if let Some(reply) = dispatcher.send(&mut log, text, now_ms()).await {
            print_reply(reply.source, &reply.text);
        }
    }

    tracing::debug!(messages = log.len(), "chat session ended");
    Ok(())
}

async fn run_laws(config: ClientConfig, args: LawsArgs) -> Result<(), CliError> {
    let page = Api::new(config).laws(args.page, args.limit).await?;
    let matches = filter_laws(&page.items, &args.query, &args.act);
    if matches.is_empty() {
        println!("No results. Try a different search or act filter.");
    }
    for law in matches {
        let section = law.section.as_deref().map(|s| format!(" ({s})")).unwrap_or_default();
        println!("[{}] {}{section}\n    {}", law.act, law.title, law.summary);
    }
    println!("Page {} of {}", args.page, total_pages(page.total, args.limit));
    Ok(())
}

async fn run_admin(config: ClientConfig, store: FileStore, admin: AdminCommand) -> Result<(), CliError> {
    let api = Api::new(config);
    let mut session = Session::load(store);

    if let AdminSubcommand::Login { email, password } = &admin.command {
        let token = api.admin_login(email, password).await?;
        session.update(|s| s.admin_sign_in(email, &token))?;
        tracing::info!(path = %session.store().path().display(), "admin session saved");
        println!("logged in as {email}");
        return Ok(());
    }
    if matches!(admin.command, AdminSubcommand::Logout) {
        session.update(counsel::session::SessionState::admin_sign_out)?;
        println!("logged out");
        return Ok(());
    }

    let token = session.state().admin_token().map(str::to_owned).ok_or(CliError::MissingAdminToken)?;
    let result = run_admin_call(&api, &token, admin.command).await;
    if let Err(AdminError::Unauthorized) = &result {
        tracing::warn!("admin token rejected; clearing stored admin session");
        session.update(counsel::session::SessionState::admin_sign_out)?;
    }
    result.map_err(CliError::from)
}

async fn run_admin_call(api: &Api, token: &str, command: AdminSubcommand) -> Result<(), AdminError> {
    match command {
        AdminSubcommand::Dashboard => print_json(&api.dashboard(token).await?),
        AdminSubcommand::Users { limit, offset, search } => {
            let page = api.users(token, limit, offset).await?;
            print_json(&filter_users(&page.users, &search))
        }
        AdminSubcommand::User { user_id } => print_json(&api.user(token, &user_id).await?),
        AdminSubcommand::Chats { user_id } => print_json(&api.user_chats(token, &user_id).await?),
        AdminSubcommand::Update { user_id, email, phone, display_name } => {
            let update = UpdateUserRequest::from_form(&email, &phone, &display_name);
            print_json(&api.update_user(token, &user_id, &update).await?)
        }
        AdminSubcommand::Delete { user_id } => print_json(&api.delete_user(token, &user_id).await?),
        AdminSubcommand::Queries { limit, offset } => print_json(&api.queries(token, limit, offset).await?),
        AdminSubcommand::Login { .. } | AdminSubcommand::Logout => Ok(()),
    }
}

fn print_reply(source: ReplySource, text: &str) {
    if source == ReplySource::Fallback {
        eprintln!("(offline answer)");
    }
    println!("{text}\n");
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<(), AdminError> {
    let rendered = serde_json::to_string_pretty(value).map_err(|e| AdminError::Decode(e.to_string()))?;
    println!("{rendered}");
    Ok(())
}

#[allow(clippy::cast_precision_loss)]
fn now_ms() -> f64 {
    let Ok(duration) = SystemTime::now().duration_since(UNIX_EPOCH) else {
        return 0.0;
    };
    duration.as_millis() as f64
}
