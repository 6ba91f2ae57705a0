use std::path::Path;

use anyhow::Context;
use colored::Colorize;
use lot_dispatch::{Host, Response};
use lot_server::{InvokeRequest, LotServer, ServerConfig};
use serde_json::{json, Value};

use crate::cli::*;

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    let Cli {
        command,
        format,
        config,
        ..
    } = cli;
    let config = match config {
        Some(path) => ServerConfig::load(&path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => ServerConfig::default(),
    };

    match command {
        Command::Invoke(args) => cmd_invoke(&config, args, format),
        Command::Run(args) => cmd_run(&config, args, format),
        Command::Ops(_) => cmd_ops(&config, format),
        Command::Serve(args) => cmd_serve(config, args),
    }
}

fn cmd_invoke(
    config: &ServerConfig,
    args: InvokeArgs,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let host = config.build_host()?;
    let response = host.invoke(&args.operation, &args.args);
    println!("{}", render(&args.operation, &response, format));
    if !response.is_success() {
        anyhow::bail!("{} failed", args.operation);
    }
    Ok(())
}

fn cmd_run(config: &ServerConfig, args: RunArgs, format: OutputFormat) -> anyhow::Result<()> {
    let steps = load_script(&args.script)?;
    let host = config.build_host()?;
    let results = run_script(&host, &steps, args.fail_fast);

    for (step, response) in &results {
        println!("{}", render(&step.operation, response, format));
    }

    let failed = results.iter().filter(|(_, r)| !r.is_success()).count();
    if format == OutputFormat::Text {
        println!(
            "\n{} steps run, {} failed",
            results.len().to_string().bold(),
            if failed == 0 {
                failed.to_string().green()
            } else {
                failed.to_string().red()
            }
        );
    }
    if failed > 0 {
        anyhow::bail!("{failed} of {} steps failed", results.len());
    }
    Ok(())
}

fn cmd_ops(config: &ServerConfig, format: OutputFormat) -> anyhow::Result<()> {
    let table = config.operation_table()?;
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&table)?),
        OutputFormat::Text => {
            for (name, route) in table.iter() {
                println!(
                    "{:<24} {:<28} {}",
                    name.bold(),
                    route.to_string().cyan(),
                    route.usage().dimmed()
                );
            }
        }
    }
    Ok(())
}

fn cmd_serve(mut config: ServerConfig, args: ServeArgs) -> anyhow::Result<()> {
    if let Some(bind) = args.bind {
        config.bind_addr = bind
            .parse()
            .with_context(|| format!("invalid bind address {bind}"))?;
    }
    println!("Lotline server on {}", config.bind_addr.to_string().bold());
    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(LotServer::new(config).serve())?;
    Ok(())
}

fn load_script(path: &Path) -> anyhow::Result<Vec<InvokeRequest>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading script {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("parsing script {}", path.display()))
}

/// Run `steps` in order on one host, stopping early only under `fail_fast`.
fn run_script<'s>(
    host: &Host,
    steps: &'s [InvokeRequest],
    fail_fast: bool,
) -> Vec<(&'s InvokeRequest, Response)> {
    let mut results = Vec::with_capacity(steps.len());
    for step in steps {
        let response = host.invoke(&step.operation, &step.args);
        let stop = fail_fast && !response.is_success();
        results.push((step, response));
        if stop {
            break;
        }
    }
    results
}

fn render(operation: &str, response: &Response, format: OutputFormat) -> String {
    match format {
        OutputFormat::Json => render_json(operation, response).to_string(),
        OutputFormat::Text => match response {
            Response::Success { payload } if payload.is_empty() => {
                format!("{} {}", "✓".green().bold(), operation)
            }
            Response::Success { payload } => {
                let body = match serde_json::from_slice::<Value>(payload) {
                    Ok(v) => serde_json::to_string_pretty(&v).unwrap_or_default(),
                    Err(_) => String::from_utf8_lossy(payload).into_owned(),
                };
                format!("{} {}\n{}", "✓".green().bold(), operation, body)
            }
            Response::Failure { message } => {
                format!("{} {}: {}", "✗".red().bold(), operation, message.red())
            }
        },
    }
}

fn render_json(operation: &str, response: &Response) -> Value {
    match response {
        Response::Success { payload } => {
            let payload = if payload.is_empty() {
                Value::Null
            } else {
                serde_json::from_slice(payload).unwrap_or_else(|_| {
                    Value::String(String::from_utf8_lossy(payload).into_owned())
                })
            };
            json!({ "operation": operation, "status": response.status_code(), "payload": payload })
        }
        Response::Failure { message } => {
            json!({ "operation": operation, "status": response.status_code(), "error": message })
        }
    }
}
