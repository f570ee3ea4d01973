//! Zeek message registry CLI
//!
//! A command-line interface for running a message approval registry locally.

use clap::{Parser, Subcommand};
use zeek_messages::cli::{self, AppState};
use zeek_messages::crypto::Address;
use zeek_messages::deploy::{NetworkConfig, DEFAULT_CHAIN_ID, DEFAULT_GAS_LIMIT, DEFAULT_RPC_URL};
use zeek_messages::registry::DEFAULT_BASE_DELAY;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "zeek")]
#[command(author = "Darshan")]
#[command(version = "0.1.0")]
#[command(about = "Quorum-approved, time-delayed message registry", long_about = None)]
struct Cli {
    /// Data directory for registry storage
    #[arg(short, long, default_value = ".zeek_data")]
    data_dir: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Signer key operations
    Signer {
        #[command(subcommand)]
        action: SignerCommands,
    },

    /// Construct a new registry
    Init {
        /// Address of the constructing identity (must be a local key)
        #[arg(short, long)]
        from: String,

        /// Authorized signers (comma-separated)
        #[arg(short, long)]
        signers: String,

        /// Approvals required before acknowledgement
        #[arg(short, long, default_value = "1")]
        required: u8,

        /// Base delay in seconds
        #[arg(long, default_value_t = DEFAULT_BASE_DELAY)]
        delay: u64,
    },

    /// Submit a message
    Send {
        /// Signer address
        #[arg(short, long)]
        from: String,

        /// Message content
        #[arg(short, long)]
        message: String,
    },

    /// Approve a message
    Approve {
        /// Signer address
        #[arg(short, long)]
        from: String,

        /// Message nonce
        #[arg(short, long)]
        nonce: u64,
    },

    /// Acknowledge a message once quorum and delay are met
    Acknowledge {
        /// Signer address
        #[arg(short, long)]
        from: String,

        /// Message nonce
        #[arg(short, long)]
        nonce: u64,
    },

    /// Display registry information
    Info,

    /// Print the total number of messages
    Count,

    /// Print the last message content
    Last,

    /// Show a single message
    Show {
        /// Message nonce
        #[arg(short, long)]
        nonce: u64,
    },

    /// List all messages
    List,

    /// Print the event log
    Events {
        /// Output raw JSON
        #[arg(long)]
        json: bool,
    },

    /// Produce the deployment manifest for an external deployer
    Manifest {
        /// Output file path (prints to stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// RPC endpoint of the target network
        #[arg(long, default_value = DEFAULT_RPC_URL)]
        rpc_url: String,

        /// Chain id of the target network
        #[arg(long, default_value_t = DEFAULT_CHAIN_ID)]
        chain_id: u64,

        /// Gas limit for the constructor transaction
        #[arg(long, default_value_t = DEFAULT_GAS_LIMIT)]
        gas_limit: u64,
    },

    /// Export registry to file
    Export {
        /// Output file path
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Import registry from file
    Import {
        /// Input file path
        #[arg(short, long)]
        input: PathBuf,
    },

    /// Restore the registry from a backup
    Restore {
        /// Backup index (0 is the most recent)
        #[arg(short, long, default_value = "0")]
        backup: usize,
    },
}

#[derive(Subcommand)]
enum SignerCommands {
    /// Create a new signer key
    New {
        /// Optional label for the key
        #[arg(short, long)]
        label: Option<String>,
    },

    /// Import a signer key from a hex private key
    Import {
        /// Hex-encoded private key
        #[arg(short, long)]
        key: String,

        /// Optional label for the key
        #[arg(short, long)]
        label: Option<String>,
    },

    /// List local signer keys
    List,

    /// Print a signer's public details, including its EVM address
    Show {
        /// Signer address
        #[arg(short, long)]
        address: String,
    },

    /// Delete a local signer key
    Delete {
        /// Signer address
        #[arg(short, long)]
        address: String,
    },
}

fn parse_signers(raw: &str) -> Vec<Address> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(Address::from)
        .collect()
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logger
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    // Commands that don't need a loaded registry
    match &cli.command {
        Commands::Signer { action } => {
            return match action {
                SignerCommands::New { label } => cli::cmd_signer_new(&cli.data_dir, label.as_deref()),
                SignerCommands::Import { key, label } => {
                    cli::cmd_signer_import(&cli.data_dir, key, label.as_deref())
                }
                SignerCommands::List => cli::cmd_signer_list(&cli.data_dir),
                SignerCommands::Show { address } => {
                    cli::cmd_signer_show(&cli.data_dir, &Address::from(address.as_str()))
                }
                SignerCommands::Delete { address } => {
                    cli::cmd_signer_delete(&cli.data_dir, &Address::from(address.as_str()))
                }
            };
        }
        Commands::Init {
            from,
            signers,
            required,
            delay,
        } => {
            return cli::cmd_init(
                &cli.data_dir,
                &Address::from(from.as_str()),
                parse_signers(signers),
                *required,
                *delay,
            );
        }
        _ => {}
    }

    let mut state = AppState::load(cli.data_dir.clone())?;

    match cli.command {
        Commands::Signer { .. } | Commands::Init { .. } => unreachable!(),

        Commands::Send { from, message } => {
            cli::cmd_send(&mut state, &Address::from(from), &message)?;
        }

        Commands::Approve { from, nonce } => {
            cli::cmd_approve(&mut state, &Address::from(from), nonce)?;
        }

        Commands::Acknowledge { from, nonce } => {
            cli::cmd_acknowledge(&mut state, &Address::from(from), nonce)?;
        }

        Commands::Info => {
            cli::cmd_info(&state)?;
        }

        Commands::Count => {
            cli::cmd_count(&state)?;
        }

        Commands::Last => {
            cli::cmd_last(&state)?;
        }

        Commands::Show { nonce } => {
            cli::cmd_show(&state, nonce)?;
        }

        Commands::List => {
            cli::cmd_list(&state)?;
        }

        Commands::Events { json } => {
            cli::cmd_events(&state, json)?;
        }

        Commands::Manifest {
            output,
            rpc_url,
            chain_id,
            gas_limit,
        } => {
            let network = NetworkConfig {
                rpc_url,
                chain_id,
                gas_limit,
            };
            cli::cmd_manifest(&state, network, output.as_deref())?;
        }

        Commands::Export { output } => {
            cli::cmd_export(&state, &output)?;
        }

        Commands::Import { input } => {
            cli::cmd_import(&mut state, &input)?;
        }

        Commands::Restore { backup } => {
            cli::cmd_restore(&mut state, backup)?;
        }
    }

    Ok(())
}
