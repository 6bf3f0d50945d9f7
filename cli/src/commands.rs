//! Command execution.

use std::io::Write;
use std::process::ExitCode;

use anyhow::{anyhow, bail, Context};
use resty_core::{ApiClient, ApiResponse, Params};
use serde_json::Value;
use tracing::debug;

use crate::cli::{AccountCommand, AuthCommand, Cli, Command, OutputArgs, ANONYMOUS_TOKEN};
use crate::output;

pub async fn run(cli: Cli, out: &mut impl Write) -> anyhow::Result<ExitCode> {
    let Cli {
        base_url,
        token,
        insecure,
        command,
        ..
    } = cli;

    let needs_token = matches!(command, Command::Auth { .. } | Command::Account { .. });
    let token = match token {
        Some(token) => token,
        None if needs_token => bail!(
            "You are not authenticated. Pass a token with --token or set RESTY_TOKEN."
        ),
        None => ANONYMOUS_TOKEN.to_string(),
    };

    let client = ApiClient::builder(&base_url)
        .token(token)
        .danger_accept_invalid_certs(insecure)
        .build()
        .with_context(|| format!("could not create a client for {base_url}"))?;
    debug!(?client, "client ready");

    let (res, output) = match command {
        Command::Methods => {
            for (path, method) in client.methods() {
                writeln!(out, "{:<7} {:<20} /{}", method.verb(), path, method.path())?;
            }
            return Ok(ExitCode::SUCCESS);
        }
        Command::Check { output } => (client.check().await?, output),
        Command::Auth {
            command: AuthCommand::Check { output },
        } => (client.auth().check().await?, output),
        Command::Account { command } => match command {
            AccountCommand::Retrieve { output } => (client.account().retrieve().await?, output),
            AccountCommand::Identity { output } => (client.account().identity().await?, output),
        },
        Command::Call {
            method,
            params,
            output,
        } => {
            let input = parse_params(&params)?;
            (client.call(&method, input).await?, output)
        }
    };

    print_response(out, &res, output)
}

fn print_response(out: &mut impl Write, res: &ApiResponse, args: OutputArgs) -> anyhow::Result<ExitCode> {
    writeln!(out, "{}", output::render(res, args)?)?;
    if res.status() >= 400 {
        Ok(ExitCode::FAILURE)
    } else {
        Ok(ExitCode::SUCCESS)
    }
}

/// Parses `KEY=VALUE` arguments. Values that parse as JSON keep their type;
/// anything else is sent as a string.
pub fn parse_params(args: &[String]) -> anyhow::Result<Params> {
    let mut params = Params::new();
    for arg in args {
        let (key, value) = arg
            .split_once('=')
            .ok_or_else(|| anyhow!("invalid parameter {arg:?}: expected KEY=VALUE"))?;
        if key.is_empty() {
            bail!("invalid parameter {arg:?}: empty key");
        }
        let value = serde_json::from_str(value).unwrap_or_else(|_| Value::String(value.to_string()));
        params.insert(key.to_string(), value);
    }
    Ok(params)
}
