use anyhow::{Context, Result};
use clamity::aws::client::{AwsClient, Filter};
use clamity::config::{Config, OutputFormat};
use clamity::output;
use clamity::resource::secret::{Secret, SecretType};
use clamity::resource::{
    new_resource, NetworkResources, Resource, ResourceKind, Secrets, UpdateProps,
};
use clamity::session::Session;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use tracing::Level;
use tracing_subscriber::fmt::writer::MakeWriterExt;

/// Inspect and manage cloud network resources and secrets
#[derive(Parser, Debug)]
#[command(name = "clamity", version = clamity::VERSION, about, long_about = None)]
struct Args {
    /// Region to operate in
    #[arg(short, long, global = true)]
    region: Option<String>,

    /// Output format for listings
    #[arg(short, long, global = true, value_enum)]
    output: Option<OutputFormat>,

    /// Endpoint URL override (gateways, local stacks)
    #[arg(long, global = true)]
    endpoint: Option<String>,

    /// Log level for debugging
    #[arg(long, global = true, value_enum, default_value = "off")]
    log_level: LogLevel,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List resources of a kind
    Show {
        /// Resource kind (e.g. vpc, subnet, route-table, secret)
        resource: ResourceKind,

        /// Filter, `name=value[,value...]`; repeatable
        #[arg(short, long = "filter", value_parser = parse_filter)]
        filters: Vec<Filter>,
    },

    /// Manage the secret store
    Secrets {
        #[command(subcommand)]
        action: SecretsAction,
    },
}

#[derive(Subcommand, Debug)]
enum SecretsAction {
    /// List secrets in the region
    List,

    /// Print a secret's value
    Read { name: String },

    /// Print a secret's metadata
    Details { name: String },

    /// Create a secret (updates it if the name already exists)
    Write {
        name: String,

        #[arg(short, long)]
        value: String,

        /// Description
        #[arg(short, long)]
        desc: Option<String>,

        /// Payload type; non-simple payloads are validated before writing
        #[arg(short = 't', long = "type", value_enum, default_value = "simple")]
        secret_type: SecretTypeArg,
    },

    /// Change a secret's description and/or value
    Update {
        name: String,

        #[arg(short, long)]
        desc: Option<String>,

        #[arg(short, long)]
        value: Option<String>,
    },

    /// Schedule a secret for deletion
    Delete { name: String },

    /// Undo a pending deletion
    Restore { name: String },

    /// Describe the known secret payload types
    Types,
}

/// clap-friendly mirror of the payload types.
#[derive(Debug, Clone, Copy, ValueEnum)]
enum SecretTypeArg {
    Simple,
    SshKey,
    RdsMysql,
}

impl From<SecretTypeArg> for SecretType {
    fn from(arg: SecretTypeArg) -> Self {
        match arg {
            SecretTypeArg::Simple => SecretType::Simple,
            SecretTypeArg::SshKey => SecretType::SshKey,
            SecretTypeArg::RdsMysql => SecretType::RdsMysql,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    fn to_tracing_level(self) -> Option<Level> {
        match self {
            LogLevel::Off => None,
            LogLevel::Error => Some(Level::ERROR),
            LogLevel::Warn => Some(Level::WARN),
            LogLevel::Info => Some(Level::INFO),
            LogLevel::Debug => Some(Level::DEBUG),
            LogLevel::Trace => Some(Level::TRACE),
        }
    }
}

fn parse_filter(raw: &str) -> Result<Filter, String> {
    let Some((name, values)) = raw.split_once('=') else {
        return Err(format!("filter '{raw}' is not name=value[,value...]"));
    };
    if name.is_empty() {
        return Err(format!("filter '{raw}' has an empty name"));
    }
    Ok(Filter::new(
        name,
        values.split(',').map(str::to_string).collect(),
    ))
}

fn setup_logging(level: LogLevel) -> Result<Option<tracing_appender::non_blocking::WorkerGuard>> {
    let Some(tracing_level) = level.to_tracing_level() else {
        return Ok(None);
    };

    let log_path = get_log_path();

    if let Some(parent) = log_path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }

    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .with_context(|| format!("Failed to open log file {}", log_path.display()))?;

    let (non_blocking, guard) = tracing_appender::non_blocking(file);

    tracing_subscriber::fmt()
        .with_max_level(tracing_level)
        .with_writer(non_blocking.with_max_level(tracing_level))
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(true)
        .with_line_number(true)
        .init();

    tracing::info!("clamity started with log level: {:?}", level);
    tracing::info!("Log file: {:?}", log_path);

    Ok(Some(guard))
}

fn get_log_path() -> PathBuf {
    if let Some(config_dir) = dirs::config_dir() {
        return config_dir.join("clamity").join("clamity.log");
    }
    if let Some(home) = dirs::home_dir() {
        return home.join(".clamity").join("clamity.log");
    }
    PathBuf::from("clamity.log")
}

fn main() {
    let args = Args::parse();
    if let Err(err) = run(args) {
        eprintln!("Error: {err:#}");
        std::process::exit(1);
    }
}

fn run(args: Args) -> Result<()> {
    let _log_guard = setup_logging(args.log_level)?;

    let config = Config::load();
    let settings = config.resolve(args.region, args.output, args.endpoint)?;
    tracing::info!("Using region: {}", settings.region);

    let client = AwsClient::from_env(settings.endpoint.clone())?;
    let session = Session::new(settings, Box::new(client));

    match args.command {
        Command::Show { resource, filters } => show(&session, resource, &filters),
        Command::Secrets { action } => secrets(&session, action),
    }
}

fn show(session: &Session, kind: ResourceKind, filters: &[Filter]) -> Result<()> {
    let format = session.settings().output;
    let region = session.region();

    if kind == ResourceKind::Secret {
        let mut secrets = Secrets::new(kind, region);
        secrets.fetch(session, filters)?;
        output::print_collection(&mut std::io::stdout(), &secrets, format)?;
    } else {
        let mut resources = NetworkResources::new(kind, region);
        resources.fetch(session, filters)?;
        output::print_collection(&mut std::io::stdout(), &resources, format)?;
    }
    Ok(())
}

fn secrets(session: &Session, action: SecretsAction) -> Result<()> {
    match action {
        SecretsAction::List => show(session, ResourceKind::Secret, &[]),

        SecretsAction::Read { name } => {
            let value = with_secret(session, &name, |session, secret| {
                secret.value(session).map(Clone::clone)
            })?;
            println!("{}", value.secret_string);
            Ok(())
        }

        SecretsAction::Details { name } => {
            let details = with_secret(session, &name, |session, secret| {
                let metadata = secret.details().clone();
                let value = secret.value(session)?.details.clone();
                Ok(serde_json::json!({ "metadata": metadata, "value": value }))
            })?;
            println!("{}", serde_json::to_string_pretty(&details)?);
            Ok(())
        }

        SecretsAction::Write {
            name,
            value,
            desc,
            secret_type,
        } => {
            let mut props = serde_json::json!({
                "name": name,
                "value": value,
                "type": SecretType::from(secret_type).key(),
            });
            if let Some(desc) = desc {
                props["desc"] = serde_json::json!(desc);
            }
            let mut secret = new_resource(ResourceKind::Secret, session.region(), props)?;
            secret.create(session)?;
            println!("wrote secret '{name}'");
            Ok(())
        }

        SecretsAction::Update { name, desc, value } => {
            with_secret(session, &name, |session, secret| {
                secret.update(
                    session,
                    UpdateProps {
                        description: desc.clone(),
                        value: value.clone(),
                    },
                )
            })?;
            println!("updated secret '{name}'");
            Ok(())
        }

        SecretsAction::Delete { name } => {
            let destroyed =
                with_secret(session, &name, |session, secret| secret.destroy(session))?;
            if destroyed {
                println!("scheduled secret '{name}' for deletion");
            } else {
                println!("secret '{name}' was already gone");
            }
            Ok(())
        }

        SecretsAction::Restore { name } => {
            Secret::restore_by_name(session, &name)?;
            println!("restored secret '{name}'");
            Ok(())
        }

        SecretsAction::Types => {
            for secret_type in SecretType::ALL {
                println!("{:<12} {}", secret_type.key(), secret_type.schema());
            }
            Ok(())
        }
    }
}

/// Fetch the region's secrets and run one operation against the named one.
fn with_secret<T>(
    session: &Session,
    name: &str,
    op: impl FnOnce(&Session, &mut Secret) -> Result<T, clamity::resource::ResourceError>,
) -> Result<T> {
    let mut secrets = Secrets::new(ResourceKind::Secret, session.region());
    secrets.fetch(session, &[])?;
    let secret = secrets.find_one_mut(name)?;
    Ok(op(session, secret)?)
}
