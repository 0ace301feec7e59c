use std::sync::Arc;
use std::time::Duration;

use authgate::config::{
    DEFAULT_HTTP_CONNECT_TIMEOUT_SECS, DEFAULT_HTTP_REQUEST_TIMEOUT_SECS, DEFAULT_IDENTITY_BASE_URL,
    DEFAULT_SIGN_OUT_DELAY_MS, HttpTimeouts,
};
use authgate::{AuthFacade, Credentials, FacadeConfig, FacadeError, LogNavigator, ROLE_USER, Session, UserData};
use clap::{Args, Parser, Subcommand};
use serde_json::{Value, json};

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error(transparent)]
    Facade(#[from] FacadeError),
    #[error("invalid JSON output: {0}")]
    Json(#[from] serde_json::Error),
    #[error("sign-out task failed: {0}")]
    SignOut(#[from] tokio::task::JoinError),
}

#[derive(Parser, Debug)]
#[command(name = "authgate", about = "Firebase session and profile facade CLI")]
struct Cli {
    #[arg(long, env = "FIREBASE_API_KEY", hide_env_values = true)]
    api_key: String,

    #[arg(long, env = "FIREBASE_DB_URL")]
    db_url: String,

    #[arg(long, env = "FIREBASE_IDENTITY_URL", default_value = DEFAULT_IDENTITY_BASE_URL)]
    identity_url: String,

    #[arg(long, env = "SIGN_OUT_DELAY_MS", default_value_t = DEFAULT_SIGN_OUT_DELAY_MS)]
    sign_out_delay_ms: u64,

    #[arg(long, env = "HTTP_REQUEST_TIMEOUT_SECS", default_value_t = DEFAULT_HTTP_REQUEST_TIMEOUT_SECS)]
    request_timeout_secs: u64,

    #[arg(long, env = "HTTP_CONNECT_TIMEOUT_SECS", default_value_t = DEFAULT_HTTP_CONNECT_TIMEOUT_SECS)]
    connect_timeout_secs: u64,

    #[command(subcommand)]
    command: Command,
}

impl Cli {
    fn facade_config(&self) -> FacadeConfig {
        let mut config = FacadeConfig::new(self.api_key.clone(), self.db_url.clone());
        config.identity_base_url = self.identity_url.trim_end_matches('/').to_owned();
        config.sign_out_delay = Duration::from_millis(self.sign_out_delay_ms);
        config.timeouts =
            HttpTimeouts { request_secs: self.request_timeout_secs, connect_secs: self.connect_timeout_secs };
        config
    }
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create an account and store its profile.
    Register(ProfileArgs),
    /// Sign in and print the resulting session.
    Login(LoginArgs),
    /// Print the stored profile for a user id.
    Profile { user_id: String },
    /// Manage the admin approval queue.
    Admins(AdminsCommand),
}

#[derive(Args, Debug)]
struct ProfileArgs {
    #[arg(long)]
    email: String,
    #[arg(long)]
    password: String,
    #[arg(long)]
    username: Option<String>,
    #[arg(long)]
    name: Option<String>,
    #[arg(long)]
    surname: Option<String>,
    #[arg(long, default_value = ROLE_USER)]
    role: String,
}

impl ProfileArgs {
    fn into_user_data(self) -> UserData {
        UserData {
            email: self.email,
            username: self.username,
            name: self.name,
            surname: self.surname,
            password: self.password,
            role: self.role,
        }
    }
}

#[derive(Args, Debug)]
struct LoginArgs {
    #[arg(long)]
    email: String,
    #[arg(long)]
    password: String,
    /// Sign out again once signed in (waits out the sign-out delay).
    #[arg(long, default_value_t = false)]
    sign_out: bool,
}

#[derive(Args, Debug)]
struct AdminsCommand {
    #[command(subcommand)]
    command: AdminsSubcommand,
}

#[derive(Subcommand, Debug)]
enum AdminsSubcommand {
    /// List pending admin requests.
    List,
    /// Queue an admin request.
    Submit(ProfileArgs),
    /// Remove a pending admin request.
    Delete { admin_id: String },
    /// Count pending admin requests.
    Count,
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt().with_writer(std::io::stderr).init();

    let cli = Cli::parse();
    let facade = AuthFacade::from_config(&cli.facade_config(), Arc::new(LogNavigator))?;
    run(&facade, cli.command).await
}

async fn run(facade: &AuthFacade, command: Command) -> Result<(), CliError> {
    match command {
        Command::Register(args) => {
            facade.register(&args.into_user_data()).await?;
            print_json(&session_summary(facade.current_session().as_ref()))
        }
        Command::Login(args) => {
            facade.log_in(&Credentials::new(args.email, args.password)).await?;
            let summary = session_summary(facade.current_session().as_ref());
            if args.sign_out {
                facade.log_out().await?;
                tracing::info!(authenticated = facade.is_user_authenticated().get(), "session closed");
            }
            print_json(&summary)
        }
        Command::Profile { user_id } => {
            let profile = facade.get_user_data(&user_id).await?;
            print_json(&serde_json::to_value(profile)?)
        }
        Command::Admins(admins) => match admins.command {
            AdminsSubcommand::List => print_json(&facade.get_admins_to_approve().await?),
            AdminsSubcommand::Submit(args) => {
                let key = facade.save_admin_data(&args.into_user_data()).await?;
                print_json(&json!({ "name": key }))
            }
            AdminsSubcommand::Delete { admin_id } => {
                facade.delete_admin_data(&admin_id).await?;
                print_json(&json!({ "deleted": admin_id }))
            }
            AdminsSubcommand::Count => {
                let count = facade.sync_admin_request_count().await?;
                print_json(&json!({ "pending": count }))
            }
        },
    }
}

fn session_summary(session: Option<&Session>) -> Value {
    match session {
        Some(s) => json!({
            "userId": s.user_id(),
            "email": s.email(),
            "expiresAt": s.expires_at().unix_timestamp(),
        }),
        None => Value::Null,
    }
}

fn print_json(value: &Value) -> Result<(), CliError> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
