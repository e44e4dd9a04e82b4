use std::time::Duration;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use shipyard_client::models::{Deployment, GenerateRequest, NewProject};
use shipyard_client::{ApiClient, StatusPoller};
use shipyard_core::environment::{from_pairs, parse_assignment, Environment};
use shipyard_core::types::DbId;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Command-line client for the Shipyard API.
#[derive(Parser)]
#[command(name = "shipyard", version)]
struct Cli {
    /// Server root URL.
    #[arg(long, global = true, env = "SHIPYARD_API_URL", default_value = "http://localhost:3000")]
    api_url: String,

    /// Bearer token sent with every request.
    #[arg(long, global = true, env = "SHIPYARD_TOKEN", hide_env_values = true)]
    token: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Check server health.
    Health,
    /// Manage projects.
    #[command(subcommand)]
    Projects(ProjectCommand),
    /// List a project's deployments.
    Deployments { project: DbId },
    /// Create a pending deployment.
    NewDeployment {
        project: DbId,
        /// Environment entries as KEY=VALUE.
        #[arg(long = "env", value_name = "KEY=VALUE")]
        env: Vec<String>,
    },
    /// Generate code from a prompt.
    Generate {
        #[arg(long)]
        project: DbId,
        #[arg(long)]
        prompt: String,
        #[arg(long)]
        model: Option<String>,
        #[arg(long)]
        temperature: Option<f32>,
        #[arg(long)]
        max_tokens: Option<u32>,
        #[command(flatten)]
        watch: WatchArgs,
    },
    /// Build a deployment.
    Build {
        #[arg(long)]
        project: DbId,
        #[arg(long)]
        deployment: DbId,
        /// Replace the deployment's environment with these KEY=VALUE entries.
        #[arg(long = "env", value_name = "KEY=VALUE")]
        env: Vec<String>,
        #[command(flatten)]
        watch: WatchArgs,
    },
    /// Publish a deployment.
    Deploy {
        #[arg(long)]
        project: DbId,
        #[arg(long)]
        deployment: DbId,
        #[command(flatten)]
        watch: WatchArgs,
    },
    /// Show a deployment's current status.
    Status { deployment: DbId },
    /// Print a deployment's build log.
    Logs { deployment: DbId },
    /// Poll a deployment until it is deployed or failed.
    Watch {
        deployment: DbId,
        #[arg(long, default_value_t = 5)]
        interval_secs: u64,
    },
    /// Manage project environment variables.
    #[command(subcommand)]
    Env(EnvCommand),
}

#[derive(Subcommand)]
enum ProjectCommand {
    List,
    Show { id: DbId },
    Create {
        name: String,
        #[arg(long)]
        description: Option<String>,
    },
    Delete { id: DbId },
}

#[derive(Subcommand)]
enum EnvCommand {
    List { project: DbId },
    /// Set KEY=VALUE.
    Set { project: DbId, assignment: String },
    Unset { project: DbId, key: String },
}

#[derive(Args)]
struct WatchArgs {
    /// Poll until the deployment settles.
    #[arg(long)]
    watch: bool,
    #[arg(long, default_value_t = 5)]
    interval_secs: u64,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "shipyard_client=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let client = ApiClient::new(cli.api_url, cli.token);

    match cli.command {
        Command::Health => print_json(&client.health().await?)?,

        Command::Projects(ProjectCommand::List) => {
            for project in client.list_projects().await? {
                println!("{}  {:<9}  {}", project.id, project.status, project.name);
            }
        }
        Command::Projects(ProjectCommand::Show { id }) => {
            let project = client.get_project(id).await?;
            println!("{} ({})", project.name, project.status);
            for path in project.files.keys() {
                println!("  {path}");
            }
        }
        Command::Projects(ProjectCommand::Create { name, description }) => {
            let project = client
                .create_project(&NewProject {
                    name,
                    description,
                    ..Default::default()
                })
                .await?;
            println!("{}", project.id);
        }
        Command::Projects(ProjectCommand::Delete { id }) => {
            client.delete_project(id).await?;
        }

        Command::Deployments { project } => {
            for deployment in client.list_deployments(project).await? {
                print_deployment(&deployment);
            }
        }
        Command::NewDeployment { project, env } => {
            let environment = parse_env(&env)?;
            let deployment = client.create_deployment(project, &environment).await?;
            println!("{}", deployment.id);
        }

        Command::Generate {
            project,
            prompt,
            model,
            temperature,
            max_tokens,
            watch,
        } => {
            let id = client
                .generate(&GenerateRequest {
                    project_id: project,
                    prompt,
                    model,
                    temperature,
                    max_tokens,
                })
                .await?;
            println!("{id}");
            if watch.watch {
                follow(&client, id, watch.interval_secs).await?;
            }
        }
        Command::Build {
            project,
            deployment,
            env,
            watch,
        } => {
            let environment = if env.is_empty() {
                None
            } else {
                Some(parse_env(&env)?)
            };
            println!(
                "{}",
                client.build(project, deployment, environment.as_ref()).await?
            );
            if watch.watch {
                follow(&client, deployment, watch.interval_secs).await?;
            }
        }
        Command::Deploy {
            project,
            deployment,
            watch,
        } => {
            println!("{}", client.deploy(project, deployment).await?);
            if watch.watch {
                follow(&client, deployment, watch.interval_secs).await?;
            }
        }

        Command::Status { deployment } => {
            print_deployment(&client.deployment_status(deployment).await?);
        }
        Command::Logs { deployment } => {
            for line in client.deployment_logs(deployment).await? {
                println!("{line}");
            }
        }
        Command::Watch {
            deployment,
            interval_secs,
        } => follow(&client, deployment, interval_secs).await?,

        Command::Env(EnvCommand::List { project }) => {
            for var in client.list_environment(project).await? {
                println!("{}={}", var.key, var.value);
            }
        }
        Command::Env(EnvCommand::Set {
            project,
            assignment,
        }) => {
            let (key, value) = parse_assignment(&assignment)?;
            client.set_environment_variable(project, &key, &value).await?;
        }
        Command::Env(EnvCommand::Unset { project, key }) => {
            client.delete_environment_variable(project, &key).await?;
        }
    }

    Ok(())
}

/// Poll until the deployment settles, printing new log lines as they
/// appear. Ctrl-C stops polling.
async fn follow(client: &ApiClient, id: DbId, interval_secs: u64) -> anyhow::Result<()> {
    let cancel = CancellationToken::new();
    let on_signal = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            on_signal.cancel();
        }
    });

    let poller = StatusPoller::new(Duration::from_secs(interval_secs));
    let mut printed = 0;
    let deployment = poller
        .poll(client, id, &cancel, |d| {
            for line in d.build_logs.iter().skip(printed) {
                println!("  {line}");
            }
            printed = printed.max(d.build_logs.len());
        })
        .await
        .with_context(|| format!("watching deployment {id}"))?;

    print_deployment(&deployment);
    Ok(())
}

/// Parse `KEY=VALUE` flags. Entries with an empty value are dropped.
fn parse_env(entries: &[String]) -> anyhow::Result<Environment> {
    let pairs = entries
        .iter()
        .map(|raw| parse_assignment(raw))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(from_pairs(pairs))
}

fn print_deployment(deployment: &Deployment) {
    println!(
        "{}  {:<8}  {}",
        deployment.id,
        deployment.status,
        deployment.url.as_deref().unwrap_or("-")
    );
}

fn print_json(value: &serde_json::Value) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
