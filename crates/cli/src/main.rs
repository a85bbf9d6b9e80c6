// flowwait CLI
//
// Design Decision: Use clap derive with env fallbacks so CI jobs can configure via environment.
// Design Decision: Support text/json/yaml output formats for scripting.
// Design Decision: Exit non-zero unless a waited-on workflow Succeeded.
// Design Decision: Logs go to stderr so stdout stays machine-readable.

mod commands;
mod output;

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use clap::{Parser, Subcommand};
use flowwait_client::{CancellationToken, ClientOptions, ServerConfig, WorkflowClient};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "flowwait")]
#[command(about = "flowwait - Submit Argo workflows and wait for them to finish")]
#[command(version)]
pub struct Cli {
    /// Argo server URL
    #[arg(long, env = "ARGO_SERVER", default_value = "http://localhost:2746")]
    pub server: String,

    /// Bearer token for the Argo server
    #[arg(long, env = "ARGO_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Per-request HTTP timeout in seconds
    #[arg(long, env = "ARGO_REQUEST_TIMEOUT_SECS")]
    pub request_timeout: Option<u64>,

    /// Interval between status checks while waiting, in milliseconds
    #[arg(long, env = "FLOWWAIT_POLLING_INTERVAL_MS", default_value = "1000")]
    pub polling_interval_ms: u64,

    /// Output format
    #[arg(long, short, default_value = "text", value_parser = ["text", "json", "yaml"])]
    pub output: String,

    /// Suppress non-essential output
    #[arg(long, short)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create a workflow from a manifest file
    Submit {
        /// Manifest path (YAML or JSON), or - for stdin
        file: PathBuf,

        /// Namespace to create the workflow in
        #[arg(long, short, env = "ARGO_NAMESPACE", default_value = "default")]
        namespace: String,

        /// Wait for the workflow to complete
        #[arg(long, short)]
        wait: bool,

        /// Max wait time in seconds (waits indefinitely if omitted)
        #[arg(long, requires = "wait")]
        timeout: Option<u64>,
    },

    /// Show the current state of a workflow
    Get {
        /// Workflow name
        name: String,

        /// Workflow namespace
        #[arg(long, short, env = "ARGO_NAMESPACE", default_value = "default")]
        namespace: String,
    },

    /// Wait for a workflow to complete
    Wait {
        /// Workflow name
        name: String,

        /// Workflow namespace
        #[arg(long, short, env = "ARGO_NAMESPACE", default_value = "default")]
        namespace: String,

        /// Max wait time in seconds (waits indefinitely if omitted)
        #[arg(long)]
        timeout: Option<u64>,
    },
}

impl Cli {
    fn build_client(&self) -> Result<WorkflowClient> {
        let mut config = ServerConfig::new(&self.server)?;
        if let Some(token) = self.token.as_deref().filter(|t| !t.is_empty()) {
            config = config.with_token(token);
        }
        if let Some(secs) = self.request_timeout {
            if secs == 0 {
                anyhow::bail!("--request-timeout must be positive");
            }
            config = config.with_request_timeout(Duration::from_secs(secs));
        }

        let options = ClientOptions::new(Duration::from_millis(self.polling_interval_ms))?;
        Ok(WorkflowClient::from_argo_server(config, options)?)
    }
}

/// Cancel `token` on Ctrl-C
fn cancel_on_ctrl_c(token: CancellationToken) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupted, cancelling");
            token.cancel();
        }
    });
}

#[tokio::main]
async fn main() -> Result<()> {
    // A missing .env file is fine
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "flowwait=info,flowwait_client=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let client = cli.build_client()?;
    let output_format = output::OutputFormat::from_str(&cli.output);

    let cancel = CancellationToken::new();
    cancel_on_ctrl_c(cancel.clone());

    match cli.command {
        Commands::Submit {
            file,
            namespace,
            wait,
            timeout,
        } => {
            let args = commands::submit::SubmitArgs {
                namespace,
                file,
                wait,
                timeout,
            };
            commands::submit::run(&client, output_format, cli.quiet, args, &cancel).await
        }
        Commands::Get { name, namespace } => {
            commands::get::run(&client, output_format, cli.quiet, namespace, name, &cancel)
                .await
        }
        Commands::Wait {
            name,
            namespace,
            timeout,
        } => {
            commands::wait::run(
                &client,
                output_format,
                cli.quiet,
                namespace,
                name,
                timeout,
                &cancel,
            )
            .await
        }
    }
}
