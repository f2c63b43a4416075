use std::io::{self, BufRead, Write};

use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use chat_command_core::{CommandSpec, ParamKind};
use chat_command_engine::{DispatchError, Dispatcher};

mod demo;

#[derive(Debug, Parser)]
#[command(name = "chat-repl")]
#[command(about = "Interactive shell for the chat command engine")]
struct Cli {
    /// Command prefix; may be given more than once (longest match wins).
    #[arg(long, global = true, default_values_t = vec!["!".to_string()])]
    prefix: Vec<String>,
    /// Enable debug-level engine logging on stderr.
    #[arg(long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Read messages from stdin and dispatch each one.
    Repl,
    /// Dispatch a single message and exit.
    Run(RunArgs),
    /// Print the registered command signatures.
    Describe(DescribeArgs),
}

#[derive(Debug, Args)]
struct RunArgs {
    /// The message to dispatch, including its prefix.
    line: String,
}

#[derive(Debug, Args)]
struct DescribeArgs {
    /// Output format.
    #[arg(long, default_value = "text")]
    format: DescribeFormat,
}

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum DescribeFormat {
    Text,
    Json,
}

fn main() {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(io::stderr)
        .init();

    let result = match cli.command {
        Command::Repl => demo::build_dispatcher(cli.prefix).and_then(|d| run_repl(&d)),
        Command::Run(args) => {
            demo::build_dispatcher(cli.prefix).and_then(|d| run_line(&d, &args.line))
        }
        Command::Describe(args) => {
            demo::build_dispatcher(cli.prefix).and_then(|d| run_describe(&d, args.format))
        }
    };

    if let Err(err) = result {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn run_repl(dispatcher: &Dispatcher) -> Result<(), String> {
    let mut ctx = demo::demo_context();
    let stdin = io::stdin();
    let mut stdout = io::stdout();

    loop {
        print!("> ");
        stdout.flush().map_err(|e| format!("Failed to flush stdout: {e}"))?;

        let mut line = String::new();
        let read = stdin
            .lock()
            .read_line(&mut line)
            .map_err(|e| format!("Failed to read stdin: {e}"))?;
        if read == 0 {
            break;
        }

        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if line == "exit" || line == "quit" {
            break;
        }

        match dispatcher.dispatch(&mut ctx, line) {
            Ok(()) => {}
            Err(DispatchError::NoPrefix) => {
                println!("(not a command; try one of the configured prefixes)");
            }
            Err(err) => println!("!! {err}"),
        }
    }

    Ok(())
}

fn run_line(dispatcher: &Dispatcher, line: &str) -> Result<(), String> {
    let mut ctx = demo::demo_context();
    dispatcher.dispatch(&mut ctx, line).map_err(|e| e.to_string())
}

fn run_describe(dispatcher: &Dispatcher, format: DescribeFormat) -> Result<(), String> {
    let specs = dispatcher.registry().specs();
    match format {
        DescribeFormat::Json => {
            let json = serde_json::to_string_pretty(&specs)
                .map_err(|e| format!("Failed to serialize command specs: {e}"))?;
            println!("{json}");
        }
        DescribeFormat::Text => {
            for spec in specs {
                println!("{}", signature(spec));
                if let Some(description) = &spec.description {
                    println!("    {description}");
                }
                for sub in &spec.subcommands {
                    println!("    {} {}", spec.name, signature(sub));
                }
            }
        }
    }
    Ok(())
}

/// Renders a one-line usage signature: `<name>` for required parameters,
/// `[name]` for optional ones, `name...` for variadic collection.
fn signature(spec: &CommandSpec) -> String {
    let mut out = spec.name.clone();
    if !spec.aliases.is_empty() {
        out.push_str(&format!(" ({})", spec.aliases.join(", ")));
    }
    for param in &spec.params {
        out.push(' ');
        match param.kind {
            ParamKind::Variadic => out.push_str(&format!("{}...", param.name)),
            _ if param.is_required() => out.push_str(&format!("<{}>", param.name)),
            _ => out.push_str(&format!("[{}]", param.name)),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use chat_command_core::{ArgValue, ParamSpec};

    use super::*;

    #[test]
    fn test_signature_marks_parameter_shapes() {
        let spec = CommandSpec::new("ban")
            .with_param(ParamSpec::required("target", "member"))
            .with_param(ParamSpec::optional(
                "reason",
                "str",
                ArgValue::Str("none".into()),
            ));
        assert_eq!(signature(&spec), "ban <target> [reason]");
    }

    #[test]
    fn test_signature_shows_aliases_and_variadic() {
        let spec = CommandSpec::new("sum")
            .with_alias("add")
            .with_param(ParamSpec::required("values", "int").variadic());
        assert_eq!(signature(&spec), "sum (add) values...");
    }
}
