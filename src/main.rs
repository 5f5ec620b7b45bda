use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use clap::{Parser, Subcommand};
use serde::Serialize;

use tumba_client::services::DEFAULT_POPULAR_LIMIT;
use tumba_client::{AppState, ClientConfig, CredentialStore, NetworkError};

#[derive(Parser, Debug)]
#[command(name = "tumba", version, about = "Command-line client for the TUMBA backend")]
struct Args {
    /// API base URL (overrides TUMBA_API_URL)
    #[arg(long)]
    api_url: Option<String>,

    /// Request timeout in seconds (overrides TUMBA_TIMEOUT_SECS)
    #[arg(long)]
    timeout: Option<u64>,

    /// Keychain service name (overrides TUMBA_KEYCHAIN_SERVICE)
    #[arg(long)]
    service: Option<String>,

    /// Legacy defaults file to migrate from (overrides TUMBA_LEGACY_STORE)
    #[arg(long)]
    legacy_store: Option<PathBuf>,

    /// Keep the session in memory instead of the OS keychain
    #[arg(long)]
    ephemeral: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Move a pre-keychain session into the keychain
    Migrate,
    /// Sign in and store the session
    SignIn {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Sign out and clear the stored session
    SignOut,
    /// Show the stored user
    Whoami,
    /// Fetch the signed-in account from the server
    Me,
    /// List posts
    Posts,
    /// Show one post
    Post { id: u64 },
    /// List tags, or search them
    Tags {
        #[arg(long)]
        search: Option<String>,
    },
    /// List the most used tags
    PopularTags {
        #[arg(long, default_value_t = DEFAULT_POPULAR_LIMIT)]
        limit: u32,
    },
    /// List comments on a post
    Comments { post_id: u64 },
}

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error(transparent)]
    Config(#[from] tumba_client::ConfigError),

    #[error(transparent)]
    Network(#[from] NetworkError),

    #[error("Failed to encode output: {0}")]
    Output(#[from] serde_json::Error),

    #[error("Not signed in")]
    NotSignedIn,
}

fn main() -> ExitCode {
    let _ = dotenvy::dotenv();
    env_logger::init();

    let args = Args::parse();
    let runtime = match tokio::runtime::Runtime::new() {
        Ok(runtime) => runtime,
        Err(e) => {
            eprintln!("error: failed to start runtime: {e}");
            return ExitCode::FAILURE;
        }
    };

    match runtime.block_on(run(args)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::debug!("Command failed: {:?}", e);
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn load_config(args: &Args) -> Result<ClientConfig, CliError> {
    let mut config = ClientConfig::from_env()?;
    if let Some(url) = &args.api_url {
        config.base_url = url.clone();
    }
    if let Some(secs) = args.timeout.filter(|secs| *secs > 0) {
        config.timeout = Duration::from_secs(secs);
    }
    if let Some(service) = &args.service {
        config.keychain_service = service.clone();
    }
    if let Some(path) = &args.legacy_store {
        config.legacy_store_path = Some(path.clone());
    }
    Ok(config)
}

async fn run(args: Args) -> Result<(), CliError> {
    let config = load_config(&args)?;
    let store = if args.ephemeral {
        CredentialStore::in_memory()
    } else {
        CredentialStore::keyring()
    };
    let state = AppState::new(config, store);

    // Earlier builds left the session in plaintext; move it before anything reads it.
    let migration = state.migrate_legacy();

    match args.command {
        Command::Migrate => match migration {
            Some(report) => {
                println!("token: {:?}", report.token);
                println!("user: {:?}", report.user);
            }
            None => println!("No legacy store configured"),
        },
        Command::SignIn { email, password } => {
            let user = state.auth.sign_in(&email, &password).await?;
            print_json(&user)?;
        }
        Command::SignOut => {
            state.auth.sign_out().await?;
            println!("Signed out");
        }
        Command::Whoami => {
            let user = state.auth.current_user().ok_or(CliError::NotSignedIn)?;
            print_json(&user)?;
        }
        Command::Me => print_json(&state.posts.current_user().await?)?,
        Command::Posts => print_json(&state.posts.posts().await?)?,
        Command::Post { id } => print_json(&state.posts.post(id).await?)?,
        Command::Tags { search } => {
            let tags = match search {
                Some(query) => state.tags.search_tags(&query).await?,
                None => state.tags.tags().await?,
            };
            print_json(&tags)?;
        }
        Command::PopularTags { limit } => print_json(&state.tags.popular_tags(limit).await?)?,
        Command::Comments { post_id } => {
            print_json(&state.comments.comments(post_id).await?)?;
        }
    }
    Ok(())
}

fn print_json<T: Serialize>(value: &T) -> Result<(), CliError> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
