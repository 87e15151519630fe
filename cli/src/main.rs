use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use dropfarm::{ApiClient, ApiError, ClientConfig, ConfigError, NewRoutine, NewSchedule, Session};
use serde_json::Value;
use tracing_subscriber::EnvFilter;


#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
    #[error("{0}")]
    Api(#[from] ApiError),
    #[error("invalid JSON payload: {0}")]
    InvalidJson(#[from] serde_json::Error),
    #[error("missing argument `{0}`")]
    MissingArgument(&'static str),
}

#[derive(Parser, Debug)]
#[command(name = "dropfarm", about = "Dropfarm backend API CLI")]
struct Cli {
    #[arg(long, env = "DROPFARM_API_URL")]
    base_url: Option<String>,

    #[arg(long, env = "DROPFARM_SESSION_COOKIE", hide_env_values = true)]
    session_cookie: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    Auth(AuthCommand),
    Routines(RoutinesCommand),
    Schedules(SchedulesCommand),
}

#[derive(Args, Debug)]
struct AuthCommand {
    #[command(subcommand)]
    command: AuthSubcommand,
}

#[derive(Args, Debug)]
struct CredentialArgs {
    #[arg(long)]
    email: String,

    #[arg(long, env = "DROPFARM_PASSWORD", hide_env_values = true)]
    password: String,
}

#[derive(Subcommand, Debug)]
enum AuthSubcommand {
    Login(CredentialArgs),
    Register(CredentialArgs),
    Logout,
}

#[derive(Args, Debug)]
struct RoutinesCommand {
    #[command(subcommand)]
    command: RoutinesSubcommand,
}

#[derive(Subcommand, Debug)]
enum RoutinesSubcommand {
    List,
    Create(RoutineCreateArgs),
    Start { routine_id: i64 },
    Stop { routine_id: i64 },
}

#[derive(Args, Debug)]
struct RoutineCreateArgs {
    #[arg(long, help = "Raw JSON body; overrides the other flags")]
    data: Option<String>,

    #[arg(long, required_unless_present = "data")]
    name: Option<String>,

    #[arg(long)]
    description: Option<String>,

    #[arg(long, help = "JSON array of recorded steps")]
    steps: Option<String>,
}

#[derive(Args, Debug)]
struct SchedulesCommand {
    #[command(subcommand)]
    command: SchedulesSubcommand,
}

#[derive(Subcommand, Debug)]
enum SchedulesSubcommand {
    List,
    Create(ScheduleCreateArgs),
}

#[derive(Args, Debug)]
struct ScheduleCreateArgs {
    #[arg(long, help = "Raw JSON body; overrides the other flags")]
    data: Option<String>,

    #[arg(long, required_unless_present = "data")]
    routine_id: Option<i64>,

    #[arg(long, required_unless_present = "data")]
    interval_seconds: Option<i64>,

    #[arg(long, default_value_t = false)]
    inactive: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let _ = dotenvy::dotenv();
    init_tracing();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let config = build_config(cli.base_url.as_deref(), cli.session_cookie.as_deref())?;
    tracing::debug!(base_url = %config.base_url, "using backend");
    let session = Session::from_config(&config)?;

    match cli.command {
        Command::Auth(auth) => run_auth(&session, auth).await,
        Command::Routines(routines) => run_routines(session.client(), routines).await,
        Command::Schedules(schedules) => run_schedules(session.client(), schedules).await,
    }
}

fn build_config(base_url: Option<&str>, session_cookie: Option<&str>) -> Result<ClientConfig, CliError> {
    let config = match base_url {
        Some(url) => ClientConfig::new(url)?,
        None => ClientConfig::default(),
    };
    Ok(match session_cookie.filter(|c| !c.trim().is_empty()) {
        Some(cookie) => config.with_session_cookie(cookie)?,
        None => config,
    })
}

async fn run_auth(session: &Session, auth: AuthCommand) -> Result<(), CliError> {
    match auth.command {
        AuthSubcommand::Login(creds) => {
            let response = session.login(&creds.email, &creds.password).await?;
            print_json(&serde_json::to_value(&response)?)?;
            // Printed to stderr so stdout stays pure JSON.
            if let Some(cookie) = session.client().session_cookies().first() {
                eprintln!("DROPFARM_SESSION_COOKIE={cookie}");
            }
            Ok(())
        }
        AuthSubcommand::Register(creds) => {
            let json = session.register(&creds.email, &creds.password).await?;
            print_json(&json)
        }
        AuthSubcommand::Logout => {
            let json = session.logout().await?;
            print_json(&json)
        }
    }
}

async fn run_routines(client: &ApiClient, routines: RoutinesCommand) -> Result<(), CliError> {
    match routines.command {
        RoutinesSubcommand::List => {
            let list = client.routines().list().await?;
            print_json(&Value::Array(list))
        }
        RoutinesSubcommand::Create(args) => {
            let body = routine_body(args)?;
            let json = client.routines().create(&body).await?;
            print_json(&json)
        }
        RoutinesSubcommand::Start { routine_id } => {
            let json = client.routines().start(routine_id).await?;
            print_json(&json)
        }
        RoutinesSubcommand::Stop { routine_id } => {
            let json = client.routines().stop(routine_id).await?;
            print_json(&json)
        }
    }
}

async fn run_schedules(client: &ApiClient, schedules: SchedulesCommand) -> Result<(), CliError> {
    match schedules.command {
        SchedulesSubcommand::List => {
            let list = client.schedules().list().await?;
            print_json(&Value::Array(list))
        }
        SchedulesSubcommand::Create(args) => {
            let body = schedule_body(args)?;
            let json = client.schedules().create(&body).await?;
            print_json(&json)
        }
    }
}

fn routine_body(args: RoutineCreateArgs) -> Result<Value, CliError> {
    if let Some(data) = args.data {
        return Ok(serde_json::from_str(&data)?);
    }

    let name = args.name.ok_or(CliError::MissingArgument("name"))?;
    let mut routine = NewRoutine::new(name);
    if let Some(description) = args.description {
        routine = routine.with_description(description);
    }
    if let Some(steps) = args.steps {
        routine = routine.with_steps(serde_json::from_str(&steps)?);
    }
    Ok(serde_json::to_value(routine)?)
}

fn schedule_body(args: ScheduleCreateArgs) -> Result<Value, CliError> {
    if let Some(data) = args.data {
        return Ok(serde_json::from_str(&data)?);
    }

    let routine_id = args.routine_id.ok_or(CliError::MissingArgument("routine-id"))?;
    let interval_seconds = args.interval_seconds.ok_or(CliError::MissingArgument("interval-seconds"))?;
    let mut schedule = NewSchedule::new(routine_id, interval_seconds);
    if args.inactive {
        schedule = schedule.inactive();
    }
    Ok(serde_json::to_value(schedule)?)
}

fn print_json(value: &Value) -> Result<(), CliError> {
    let rendered = serde_json::to_string_pretty(value)?;
    println!("{rendered}");
    Ok(())
}
