//! CLI Commands
//!
//! Maps the command tree onto [`StackdioClient`] operations.

pub mod output;

use anyhow::{Context, Result};
use clap::Subcommand;
use output::OutputFormat;
use serde_json::{json, Value};
use stackdio::config::{Config, ENV_ADMIN_PASSWORD, ENV_PASSWORD};
use stackdio::{Credentials, LogDate, LogType, PublicKey, Session, StackdioClient};
use std::path::Path;
use std::time::Duration;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Show the client and server API versions
    Version,
    /// Inspect or change the saved configuration
    #[command(subcommand)]
    Config(ConfigCommand),
    /// Cloud providers and provider types
    #[command(subcommand)]
    Providers(ProviderCommand),
    /// Regions
    #[command(subcommand)]
    Regions(RegionCommand),
    /// Availability zones
    #[command(subcommand)]
    Zones(ZoneCommand),
    /// Stacks
    #[command(subcommand)]
    Stacks(StackCommand),
    /// User settings
    #[command(subcommand)]
    Settings(SettingsCommand),
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Print the effective configuration
    Show,
    /// Save the API base URL
    SetUrl { url: String },
    /// Save the username
    SetUsername { username: String },
}

#[derive(Subcommand, Debug)]
pub enum ProviderCommand {
    List,
    /// List provider types
    Types,
    Get { id: u64 },
    Delete { id: u64 },
}

#[derive(Subcommand, Debug)]
pub enum RegionCommand {
    List,
    Get { id: u64 },
}

#[derive(Subcommand, Debug)]
pub enum ZoneCommand {
    List,
    Get { id: u64 },
}

#[derive(Subcommand, Debug)]
pub enum StackCommand {
    List,
    Get {
        id: u64,
    },
    /// Find stacks by KEY=VALUE filters
    Search {
        #[arg(value_parser = parse_filter)]
        filters: Vec<(String, String)>,
    },
    /// Launch a stack from a JSON or YAML definition
    Create {
        #[arg(short, long)]
        file: String,
    },
    Delete {
        id: u64,
    },
    /// List the actions currently allowed on a stack
    Actions {
        id: u64,
    },
    /// Run an action (launch, terminate, provision...) on a stack
    Action {
        id: u64,
        action: String,
    },
    History {
        id: u64,
    },
    Hosts {
        id: u64,
        /// Only print this field of every host
        #[arg(short, long)]
        key: Option<String>,
        /// Read the field from the EC2 metadata
        #[arg(long, requires = "key")]
        ec2: bool,
    },
    Logs {
        id: u64,
        /// provisioning, global-orchestration, orchestration or launch
        log_type: String,
        #[arg(long, default_value = "log")]
        level: String,
        /// `latest` or YYYYMMDD
        #[arg(long, default_value = "latest")]
        date: String,
        #[arg(long)]
        tail: Option<u32>,
    },
    /// Access rules of a stack
    Rules {
        id: u64,
    },
}

#[derive(Subcommand, Debug)]
pub enum SettingsCommand {
    /// Upload a public key (key text or path to a key file)
    PublicKey { key: String },
}

/// Parse a `KEY=VALUE` filter
fn parse_filter(raw: &str) -> Result<(String, String), String> {
    raw.split_once('=')
        .filter(|(key, _)| !key.is_empty())
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .ok_or_else(|| format!("invalid filter '{}', expected KEY=VALUE", raw))
}

/// Read a stack definition; `.yaml`/`.yml` files are parsed as YAML
fn read_stack_definition(path: &Path) -> Result<Value> {
    let content =
        std::fs::read_to_string(path).with_context(|| format!("Failed to read {:?}", path))?;

    let is_yaml = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("yaml") || e.eq_ignore_ascii_case("yml"));

    if is_yaml {
        serde_yaml::from_str(&content).with_context(|| format!("Invalid YAML in {:?}", path))
    } else {
        serde_json::from_str(&content).with_context(|| format!("Invalid JSON in {:?}", path))
    }
}

/// Build an authenticated client from the effective configuration
async fn connect(config: &Config) -> Result<StackdioClient> {
    let url = config
        .url
        .as_deref()
        .context("No stackdio URL configured. Set STACKDIO_URL or use --url")?;
    let username = config
        .username
        .as_deref()
        .context("No username configured. Set STACKDIO_USERNAME or use --username")?;
    let password = std::env::var(ENV_PASSWORD)
        .with_context(|| format!("{} is not set", ENV_PASSWORD))?;

    let mut session = Session::new(url, Credentials::new(username, password))?;
    if let (Some(admin), Ok(admin_password)) =
        (config.admin_username.as_deref(), std::env::var(ENV_ADMIN_PASSWORD))
    {
        session = session.with_admin_credentials(Credentials::new(admin, admin_password));
    }

    let timeout = config.timeout_secs.map(Duration::from_secs);
    let mut client = StackdioClient::from_session(session, timeout)?;
    client
        .authenticate()
        .await
        .context("Failed to authenticate against stackdio")?;

    Ok(client)
}

/// Run one command
pub async fn run(command: Command, config: Config, format: OutputFormat) -> Result<()> {
    match command {
        // Changes go to the saved file only, without environment/CLI overrides
        Command::Config(cmd) => match cmd {
            ConfigCommand::Show => format.print(&config),
            ConfigCommand::SetUrl { url } => Config::load().set_url(&url),
            ConfigCommand::SetUsername { username } => Config::load().set_username(&username),
        },
        Command::Version => {
            let client = connect(&config).await?;
            format.print(&json!({
                "client": stackdio::CLIENT_VERSION,
                "server": client.server_version().map(|v| v.to_string()),
            }))
        },
        Command::Providers(cmd) => {
            let client = connect(&config).await?;
            match cmd {
                ProviderCommand::List => format.print(&client.list_providers().await?),
                ProviderCommand::Types => format.print(&client.list_provider_types().await?),
                ProviderCommand::Get { id } => format.print(&client.get_provider(id, false).await?),
                ProviderCommand::Delete { id } => format.print(&client.delete_provider(id).await?),
            }
        },
        Command::Regions(cmd) => {
            let client = connect(&config).await?;
            match cmd {
                RegionCommand::List => format.print(&client.list_regions().await?),
                RegionCommand::Get { id } => format.print(&client.get_region(id, false).await?),
            }
        },
        Command::Zones(cmd) => {
            let client = connect(&config).await?;
            match cmd {
                ZoneCommand::List => format.print(&client.list_zones().await?),
                ZoneCommand::Get { id } => format.print(&client.get_zone(id, false).await?),
            }
        },
        Command::Stacks(cmd) => {
            let client = connect(&config).await?;
            run_stack_command(&client, cmd, format).await
        },
        Command::Settings(SettingsCommand::PublicKey { key }) => {
            let client = connect(&config).await?;
            format.print(&client.set_public_key(&PublicKey::from_arg(&key)).await?)
        },
    }
}

async fn run_stack_command(
    client: &StackdioClient,
    cmd: StackCommand,
    format: OutputFormat,
) -> Result<()> {
    match cmd {
        StackCommand::List => format.print(&client.list_stacks().await?),
        StackCommand::Get { id } => format.print(&client.get_stack(id, false).await?),
        StackCommand::Search { filters } => {
            let filters: Vec<(&str, &str)> = filters
                .iter()
                .map(|(k, v)| (k.as_str(), v.as_str()))
                .collect();
            format.print(&client.search_stacks(&filters).await?)
        },
        StackCommand::Create { file } => {
            let definition = read_stack_definition(Path::new(&file))?;
            format.print(&client.create_stack(&definition).await?)
        },
        StackCommand::Delete { id } => format.print(&client.delete_stack(id).await?),
        StackCommand::Actions { id } => format.print(&client.get_valid_stack_actions(id).await?),
        StackCommand::Action { id, action } => {
            format.print(&client.do_stack_action(id, &action).await?)
        },
        StackCommand::History { id } => format.print(&client.get_stack_history(id).await?),
        StackCommand::Hosts { id, key, ec2 } => match key {
            Some(key) => format.print(&client.describe_hosts(id, &key, ec2).await?),
            None => format.print(&client.get_stack_hosts(id).await?),
        },
        StackCommand::Logs {
            id,
            log_type,
            level,
            date,
            tail,
        } => {
            let log_type: LogType = log_type.parse()?;
            let level: stackdio::LogLevel = level.parse()?;
            let date: LogDate = date.parse()?;
            let text = client.get_logs(id, log_type, level, date, tail).await?;
            print!("{}", text);
            Ok(())
        },
        StackCommand::Rules { id } => format.print(&client.list_access_rules(id).await?),
    }
}
