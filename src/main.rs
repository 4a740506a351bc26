use clap::Parser;
use one_vm_facts::{
    ConnectionParams, FailureResponse, OneClient, OneResult, VmFactsResponse, VmSelector,
};
use serde::Serialize;
use std::process::ExitCode;
use std::time::Duration;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "one-vm-facts")]
#[command(about = "Gather facts about OpenNebula virtual machines", long_about = None)]
#[command(version)]
struct Cli {
    /// URL of the OpenNebula RPC server [fallback: ONE_URL]
    #[arg(long)]
    api_url: Option<String>,

    /// User to log in with [fallback: ONE_USERNAME]
    #[arg(long)]
    api_username: Option<String>,

    /// Password of the user [fallback: ONE_PASSWORD]
    #[arg(long)]
    api_password: Option<String>,

    /// VM ids to gather facts about (comma-separated or repeated; excludes --name)
    #[arg(long, visible_alias = "id", value_delimiter = ',')]
    ids: Vec<String>,

    /// Exact VM name, or a regex if it starts with '~' ('~*' ignores case)
    #[arg(long)]
    name: Option<String>,

    /// Maximum number of VM detail requests in flight
    #[arg(long, default_value_t = 4)]
    concurrency: usize,

    /// Per-request timeout in seconds
    #[arg(long)]
    timeout_secs: Option<u64>,

    /// Accept invalid TLS certificates
    #[arg(long)]
    insecure: bool,

    /// Pretty-print the JSON output
    #[arg(long)]
    pretty: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("one_vm_facts=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let pretty = cli.pretty;

    match run(cli).await {
        Ok(response) => {
            info!(vms = response.vms.len(), "done");
            emit(&response, pretty)
        }
        Err(e) => {
            error!(error = %e, "failed to gather VM facts");
            emit(&FailureResponse::new(e.to_string()), pretty);
            ExitCode::FAILURE
        }
    }
}

impl Cli {
    /// `--ids` together with `--name` is reported as a failure payload, not a usage error.
    fn selector(&self) -> OneResult<VmSelector> {
        VmSelector::from_params(Some(self.ids.clone()), self.name.clone())
    }
}

async fn run(cli: Cli) -> OneResult<VmFactsResponse> {
    let selector = cli.selector()?;

    let mut builder = OneClient::builder()
        .connection_params(ConnectionParams {
            api_url: cli.api_url,
            api_username: cli.api_username,
            api_password: cli.api_password,
        })
        .detail_concurrency(cli.concurrency)
        .accept_invalid_certs(cli.insecure);
    if let Some(secs) = cli.timeout_secs {
        builder = builder.request_timeout(Duration::from_secs(secs));
    }

    let client = builder.build()?;
    client.vm_facts(&selector).await
}

fn emit<T: Serialize>(payload: &T, pretty: bool) -> ExitCode {
    let rendered = if pretty {
        serde_json::to_string_pretty(payload)
    } else {
        serde_json::to_string(payload)
    };
    match rendered {
        Ok(json) => {
            println!("{}", json);
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(error = %e, "failed to serialize output");
            ExitCode::FAILURE
        }
    }
}
