//! Command-line argument definitions.

use clap::{ArgAction, Args, Parser, Subcommand};

pub const DEFAULT_BASE_URL: &str = "https://api.example.com";

/// Token sent by commands that do not need a real credential.
pub const ANONYMOUS_TOKEN: &str = "token_null";

/// resty: call the API from the command line.
#[derive(Debug, Parser)]
#[command(name = "resty", version, about, long_about = None)]
pub struct Cli {
    /// API base URL.
    #[arg(long, env = "RESTY_BASE_URL", default_value = DEFAULT_BASE_URL, global = true)]
    pub base_url: String,

    /// API token sent as a bearer credential.
    #[arg(short, long, env = "RESTY_TOKEN", hide_env_values = true, global = true)]
    pub token: Option<String>,

    /// Do not verify TLS certificates.
    #[arg(long, env = "RESTY_INSECURE", global = true)]
    pub insecure: bool,

    /// Increase log verbosity (-v debug, -vv trace).
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// Selects which parts of a response are printed.
#[derive(Debug, Clone, Copy, Default, Args)]
pub struct OutputArgs {
    /// Print only the response headers.
    #[arg(short = 'H', long, conflicts_with = "body")]
    pub headers: bool,

    /// Print only the response body.
    #[arg(short, long)]
    pub body: bool,

    /// Print the body as compact JSON with no status line.
    #[arg(long)]
    pub raw: bool,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Basic request details as seen by the server.
    Check {
        #[command(flatten)]
        output: OutputArgs,
    },

    /// Authentication methods.
    Auth {
        #[command(subcommand)]
        command: AuthCommand,
    },

    /// Account methods.
    Account {
        #[command(subcommand)]
        command: AccountCommand,
    },

    /// List every registered method with its verb and path template.
    Methods,

    /// Invoke any registered method by path.
    ///
    /// Examples:
    ///   resty call auth.check
    ///   resty call account/identity
    ///   resty call check extra=1
    ///
    /// Values are parsed as JSON when possible (`n=3`, `ok=true`) and sent
    /// as strings otherwise.
    Call {
        /// Method path: `namespace.method`, `namespace/method` or a root method.
        method: String,

        /// Parameters as KEY=VALUE pairs.
        #[arg(value_name = "KEY=VALUE")]
        params: Vec<String>,

        #[command(flatten)]
        output: OutputArgs,
    },
}

#[derive(Debug, Subcommand)]
pub enum AuthCommand {
    /// Check request authentication.
    Check {
        #[command(flatten)]
        output: OutputArgs,
    },
}

#[derive(Debug, Subcommand)]
pub enum AccountCommand {
    /// Retrieve the authenticated account.
    Retrieve {
        #[command(flatten)]
        output: OutputArgs,
    },

    /// Show the account owner's identity.
    Identity {
        #[command(flatten)]
        output: OutputArgs,
    },
}
