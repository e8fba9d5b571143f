mod functions;

use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use function_broker_sdk::{BrokerClient, Registration, RegistrationRetry};
use serde_json::Value;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

/// Demo mini-app for the function broker
#[derive(Parser, Debug)]
#[command(name = "mini-app-demo")]
#[command(version)]
struct Cli {
    /// Application id to register under
    #[arg(long, env = "MINI_APP_NAME", default_value = "mini-app-b")]
    app_name: String,

    /// Address to serve the exposed functions on
    #[arg(long, env = "MINI_APP_LISTEN", default_value = "0.0.0.0:3001")]
    listen: SocketAddr,

    /// Base URL of the broker gateway
    #[arg(long, env = "BROKER_URL", default_value = "http://localhost:3000")]
    gateway_url: String,

    /// Base URL the broker should use to reach this app
    /// (default: http://localhost:<listen port>)
    #[arg(long, env = "MINI_APP_ADVERTISE_URL")]
    advertise_url: Option<String>,

    /// Registration attempts before giving up
    #[arg(long, default_value_t = 5)]
    register_attempts: u32,

    /// Delay between registration attempts (e.g. "2s", "500ms")
    #[arg(long, default_value = "2s", value_parser = humantime::parse_duration)]
    register_backoff: Duration,

    /// Call a peer's function through the broker, as `target:function`
    #[arg(long = "call", value_name = "TARGET:FUNCTION")]
    calls: Vec<CallTarget>,

    /// JSON object sent as the payload of every `--call`
    #[arg(long, value_parser = parse_json)]
    payload: Option<Value>,

    /// Register and run the calls, then exit instead of serving
    #[arg(long)]
    once: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct CallTarget {
    app: String,
    function: String,
}

impl FromStr for CallTarget {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once(':') {
            Some((app, function)) if !app.is_empty() && !function.is_empty() => Ok(Self {
                app: app.to_owned(),
                function: function.to_owned(),
            }),
            _ => Err(format!("expected TARGET:FUNCTION, got '{s}'")),
        }
    }
}

fn parse_json(s: &str) -> Result<Value, String> {
    match serde_json::from_str(s) {
        Ok(value @ Value::Object(_)) => Ok(value),
        Ok(_) => Err("payload must be a JSON object".to_owned()),
        Err(e) => Err(format!("invalid JSON payload: {e}")),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let client = BrokerClient::new(&cli.gateway_url).context("invalid gateway URL")?;
    let advertise = cli
        .advertise_url
        .clone()
        .unwrap_or_else(|| format!("http://localhost:{}", cli.listen.port()));
    let registration = Registration::new(&cli.app_name, functions::EXPOSED, [advertise]);
    let retry = RegistrationRetry::default()
        .with_max_attempts(cli.register_attempts)
        .with_backoff(cli.register_backoff);

    if cli.once {
        register(&client, &registration, retry).await;
        run_calls(&client, &cli.app_name, &cli.calls, cli.payload.as_ref()).await;
        return Ok(());
    }

    let listener = TcpListener::bind(cli.listen)
        .await
        .with_context(|| format!("failed to bind {}", cli.listen))?;
    tracing::info!(app = %cli.app_name, addr = %listener.local_addr()?, "mini-app listening");

    // Callers that learn about us from the broker land in the accept backlog
    // until the server below starts polling it.
    register(&client, &registration, retry).await;

    let server = axum::serve(listener, functions::router())
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "failed to listen for Ctrl+C");
            }
        })
        .into_future();
    let calls = run_calls(&client, &cli.app_name, &cli.calls, cli.payload.as_ref());

    let (served, ()) = tokio::join!(server, calls);
    served.context("mini-app server failed")
}

async fn register(client: &BrokerClient, registration: &Registration, retry: RegistrationRetry) {
    if let Err(e) = client.register_with_retry(registration, retry).await {
        tracing::error!(
            app = %registration.application_id,
            error = %e,
            "giving up on broker registration, serving anyway"
        );
    }
}

async fn run_calls(
    client: &BrokerClient,
    caller: &str,
    calls: &[CallTarget],
    payload: Option<&Value>,
) {
    for target in calls {
        match client
            .call_function(caller, &target.app, &target.function, payload)
            .await
        {
            Ok(result) => {
                tracing::info!(target_app = %target.app, function = %target.function, "call succeeded");
                println!("{}:{} -> {result}", target.app, target.function);
            }
            Err(e) => {
                tracing::error!(
                    target_app = %target.app,
                    function = %target.function,
                    error = %e,
                    "call failed"
                );
            }
        }
    }
}
