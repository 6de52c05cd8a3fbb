use crate::config::Config;
use crate::error::{FailureKind, PipelineFailure};
use crate::generator::ReleaseNotesGenerator;
use crate::providers::OpenAiProvider;
use crate::types::{GenerationRequest, OutputFormat, ReleaseNotesBundle, Style};
use crate::{log_debug, server, ui};

use anyhow::{Context, anyhow};
use clap::builder::{Styles, styling::AnsiColor};
use clap::{Parser, Subcommand, crate_version};
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;

const LOG_FILE: &str = "relnotes-debug.log";

/// CLI structure defining the available commands and global arguments
#[derive(Parser)]
#[command(
    author,
    version = crate_version!(),
    about = "relnotes: turn raw commit logs into structured release notes",
    long_about = "relnotes asks a chat-completion model to rewrite a commit log as release notes, validates the reply and emits it as JSON, markdown, HTML, text or social posts.",
    disable_version_flag = true,
    styles = get_styles(),
)]
pub struct Cli {
    /// Subcommands available for the CLI
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Path to a configuration file
    #[arg(
        short = 'c',
        long = "config",
        global = true,
        help = "Path to a configuration file"
    )]
    pub config: Option<PathBuf>,

    /// Log debug messages to a file
    #[arg(
        short = 'l',
        long = "log",
        global = true,
        help = "Log debug messages to a file"
    )]
    pub log: bool,

    /// Specify a custom log file path
    #[arg(
        long = "log-file",
        global = true,
        help = "Specify a custom log file path"
    )]
    pub log_file: Option<String>,

    /// Suppress non-essential output (spinners, status messages)
    #[arg(
        short = 'q',
        long = "quiet",
        global = true,
        help = "Suppress non-essential output"
    )]
    pub quiet: bool,

    /// Display the version
    #[arg(
        short = 'v',
        long = "version",
        global = true,
        help = "Display the version"
    )]
    pub version: bool,
}

/// Enumeration of available subcommands
#[derive(Subcommand)]
pub enum Commands {
    /// Run the HTTP service
    #[command(
        about = "Run the release notes HTTP service",
        long_about = "Serve POST /api/generateNotes and GET /health. The provider API key is read from the environment on every request."
    )]
    Serve {
        /// Address to listen on
        #[arg(long, help = "Address to listen on (default 127.0.0.1)")]
        listen: Option<String>,

        /// Port to listen on
        #[arg(short, long, help = "Port to listen on (default 3000)")]
        port: Option<u16>,
    },

    /// Generate release notes from a commit log
    #[command(
        about = "Generate release notes from a commit log",
        long_about = "Read a commit log from FILE (or stdin when omitted), generate release notes and print the selected rendering."
    )]
    Generate {
        /// File containing the commit log
        #[arg(help = "File containing the commit log; reads stdin when omitted")]
        file: Option<PathBuf>,

        /// Tone of the notes
        #[arg(short, long, help = "Tone of the notes: formal or casual")]
        style: Option<Style>,

        /// Product name to mention
        #[arg(long, help = "Product name to mention in the notes")]
        product: Option<String>,

        /// Version being released
        #[arg(long = "version-name", help = "Version being released")]
        version_name: Option<String>,

        /// Rendering to print
        #[arg(
            short,
            long,
            default_value = "json",
            help = "Output format: json, markdown, html, text, notes, twitter or linkedin"
        )]
        format: OutputFormat,

        /// Write the output to a file instead of stdout
        #[arg(short, long, help = "Write the output to a file instead of stdout")]
        output: Option<PathBuf>,
    },

    /// Print the JSON Schema of the release notes bundle
    #[command(about = "Print the JSON Schema of the release notes bundle")]
    Schema,
}

/// Define custom styles for Clap
fn get_styles() -> Styles {
    Styles::styled()
        .header(AnsiColor::Magenta.on_default().bold())
        .usage(AnsiColor::Cyan.on_default().bold())
        .literal(AnsiColor::Green.on_default().bold())
        .placeholder(AnsiColor::Yellow.on_default())
        .valid(AnsiColor::Blue.on_default().bold())
        .invalid(AnsiColor::Red.on_default().bold())
        .error(AnsiColor::Red.on_default().bold())
}

/// Parse the command-line arguments
pub fn parse_args() -> Cli {
    Cli::parse()
}

/// Main function to parse arguments and handle the command
pub async fn main() -> anyhow::Result<()> {
    let cli = parse_args();

    if cli.version {
        ui::print_version(crate_version!());
        return Ok(());
    }

    if cli.quiet {
        ui::set_quiet_mode(true);
    }

    // The server logs to stdout; everything else keeps stdout for output
    let serving = matches!(cli.command, Some(Commands::Serve { .. }));
    if cli.log {
        crate::logger::enable_logging();
        let log_file = cli.log_file.as_deref().unwrap_or(LOG_FILE);
        crate::logger::set_log_file(log_file)?;
        crate::logger::set_log_to_stdout(serving);
    } else if serving {
        crate::logger::enable_logging();
    } else {
        crate::logger::disable_logging();
    }

    let config = Config::load(cli.config.as_deref())?;

    if let Some(command) = cli.command {
        handle_command(command, config).await
    } else {
        // If no subcommand is provided, print the help
        let _ = Cli::parse_from(["relnotes", "--help"]);
        Ok(())
    }
}

/// Handle the command based on parsed arguments
pub async fn handle_command(command: Commands, config: Config) -> anyhow::Result<()> {
    match command {
        Commands::Serve { listen, port } => handle_serve(config, listen, port).await,
        Commands::Generate {
            file,
            style,
            product,
            version_name,
            format,
            output,
        } => {
            let mut request = GenerationRequest::new(read_commit_log(file.as_deref())?);
            if let Some(style) = style {
                request = request.with_style(style);
            }
            if let Some(product) = product {
                request = request.with_product_name(product);
            }
            if let Some(version) = version_name {
                request = request.with_version(version);
            }
            handle_generate(&config, &request, format, output.as_deref()).await
        }
        Commands::Schema => handle_schema(),
    }
}

/// Handle the `Serve` command
async fn handle_serve(
    mut config: Config,
    listen: Option<String>,
    port: Option<u16>,
) -> anyhow::Result<()> {
    if let Some(listen) = listen {
        config.server.listen_address = listen;
    }
    if let Some(port) = port {
        config.server.port = port;
    }
    log_debug!(
        "Handling 'serve' command on {}:{}",
        config.server.listen_address,
        config.server.port
    );

    ui::print_info(&format!(
        "Serving release notes on http://{}:{}",
        config.server.listen_address, config.server.port
    ));
    ui::print_setting("model", &config.provider.model);
    ui::print_setting("provider", &config.provider.base_url);
    ui::print_setting("api key variable", &config.provider.api_key_env);
    if config.provider.read_api_key().is_none() {
        ui::print_warning(&format!(
            "{} is not set; requests will fail until it is",
            config.provider.api_key_env
        ));
    }

    server::serve(config).await
}

/// Handle the `Generate` command
async fn handle_generate(
    config: &Config,
    request: &GenerationRequest,
    format: OutputFormat,
    output: Option<&Path>,
) -> anyhow::Result<()> {
    log_debug!(
        "Handling 'generate' command with format: {}, output: {:?}",
        format,
        output
    );

    let credential = config.provider.read_api_key();
    let provider = OpenAiProvider::from_settings(&config.provider)?;
    log_debug!("Using provider endpoint {}", provider.endpoint());
    let generator =
        ReleaseNotesGenerator::from_settings(&config.provider, Arc::new(provider), credential);

    let spinner = ui::create_spinner("Generating release notes...");
    let result = generator.generate(request).await;
    spinner.finish_and_clear();

    let bundle = result.map_err(|failure| {
        if let Some(detail) = failure.detail() {
            log_debug!("{} detail: {}", failure.kind(), detail);
        }
        anyhow!(failure_message(&failure, &config.provider.api_key_env))
    })?;

    write_output(&bundle, format, output)?;
    if let Some(path) = output {
        ui::print_success(&format!("Release notes written to {}", path.display()));
    }
    Ok(())
}

/// Message shown for a failed generation; a missing key names its variable
fn failure_message(failure: &PipelineFailure, api_key_env: &str) -> String {
    match failure.kind() {
        FailureKind::MissingCredential => {
            format!("Missing {api_key_env}: set it in the environment or a .env file")
        }
        kind => kind.public_message().to_string(),
    }
}

/// Handle the `Schema` command
fn handle_schema() -> anyhow::Result<()> {
    let schema = ReleaseNotesBundle::json_schema();
    println!(
        "{}",
        serde_json::to_string_pretty(&schema).context("Failed to serialize schema")?
    );
    Ok(())
}

fn read_commit_log(file: Option<&Path>) -> anyhow::Result<String> {
    match file {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read commit log from {}", path.display())),
        None => {
            let mut raw = String::new();
            std::io::stdin()
                .read_to_string(&mut raw)
                .context("Failed to read commit log from stdin")?;
            Ok(raw)
        }
    }
}

fn write_output(
    bundle: &ReleaseNotesBundle,
    format: OutputFormat,
    output: Option<&Path>,
) -> anyhow::Result<()> {
    let rendered = bundle
        .render(format)
        .context("Failed to render release notes")?;
    match output {
        Some(path) => std::fs::write(path, rendered)
            .with_context(|| format!("Failed to write {}", path.display())),
        None => {
            println!("{rendered}");
            Ok(())
        }
    }
}
