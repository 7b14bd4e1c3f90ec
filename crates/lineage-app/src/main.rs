//! # Lineage - Inherited creatures for every participant
//!
//! This is the main entry point that wires everything together.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │  main.rs (this file) - Dependency Injection & Wiring            │
//! │    │                                                            │
//! │    ├── Loads:   LineageConfig (shared)                          │
//! │    ├── Creates: InMemoryGateway from the snapshot (adapter)     │
//! │    ├── Creates: LogNotifier / InboxNotifier (adapter)           │
//! │    ├── Creates: ClaimResolver, PairingWorkflow (use case)       │
//! │    └── Runs:    One command, then saves the snapshot            │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Usage:
//!   lineage resolve <participant>   - Claim or create the participant's entity
//!   lineage adopt <participant>     - Put a new offspring up for adoption
//!   lineage pair <a> <b>            - Propose and accept in one go
//!   lineage profile <participant>   - Show genes and family
//!   lineage queue                   - List unclaimed offspring

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use lineage_adapter::{InMemoryGateway, InboxNotifier, LogNotifier, ThreadRngDice};
use lineage_domain::{Response, Soul};
use lineage_shared::{LineageConfig, NotifierKind};
use lineage_usecase::{
    ChildSummary, ClaimResolver, EntityStore, NotificationGateway, PairingOutcome,
    PairingWorkflow, ParticipantActions, PersistenceGateway,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "lineage")]
#[command(about = "Lineage - Claim, adopt and pair inherited creatures")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file (.yaml, .yml or .json)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Snapshot file, overrides the configured one
    #[arg(short, long, global = true)]
    state: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Claim a waiting offspring, or create a fresh entity
    Resolve {
        #[arg(value_parser = parse_soul)]
        participant: Soul,
    },
    /// Roll a new offspring and leave it in the queue
    Adopt {
        #[arg(value_parser = parse_soul)]
        participant: Soul,
    },
    /// Propose from `a` to `b` and accept on b's behalf
    Pair {
        #[arg(value_parser = parse_soul)]
        a: Soul,
        #[arg(value_parser = parse_soul)]
        b: Soul,
        #[arg(short, long, default_value = "Shall we?")]
        message: String,
    },
    /// Show a participant's genes, parents and children
    Profile {
        #[arg(value_parser = parse_soul)]
        participant: Soul,
    },
    /// List offspring waiting for a soul
    Queue,
}

fn parse_soul(raw: &str) -> Result<Soul, String> {
    let id: u64 = raw
        .parse()
        .map_err(|e| format!("'{}' is not a participant id: {}", raw, e))?;
    if id == 0 {
        return Err("participant id 0 is reserved for unclaimed entities".to_string());
    }
    Ok(Soul::new(id))
}

/// Everything a command needs, wired once
struct App {
    gateway: InMemoryGateway,
    inbox: Option<InboxNotifier>,
    store: Arc<EntityStore>,
    resolver: Arc<ClaimResolver>,
    pairing: PairingWorkflow,
    actions: ParticipantActions,
}

impl App {
    fn wire(gateway: InMemoryGateway, notifier_kind: NotifierKind) -> Self {
        let inbox = match notifier_kind {
            NotifierKind::Inbox => Some(InboxNotifier::new()),
            NotifierKind::Log => None,
        };
        let notifier: Arc<dyn NotificationGateway> = match &inbox {
            Some(inbox) => Arc::new(inbox.clone()),
            None => Arc::new(LogNotifier::new()),
        };
        let persistence: Arc<dyn PersistenceGateway> = Arc::new(gateway.clone());

        let store = Arc::new(EntityStore::new(Arc::new(ThreadRngDice::new())));
        let resolver = Arc::new(ClaimResolver::new(
            persistence.clone(),
            notifier.clone(),
            store.clone(),
        ));
        let pairing = PairingWorkflow::new(
            persistence.clone(),
            notifier.clone(),
            resolver.clone(),
            store.clone(),
        );
        let actions = ParticipantActions::new(persistence, notifier, resolver.clone(), store.clone());

        Self {
            gateway,
            inbox,
            store,
            resolver,
            pairing,
            actions,
        }
    }

    async fn run(&self, command: Commands) -> anyhow::Result<()> {
        match command {
            Commands::Resolve { participant } => {
                let entity = self.resolver.resolve(participant).await?;
                println!("{}: {}", participant, self.store.dominant(&entity)?);
            }
            Commands::Adopt { participant } => {
                let child = self.actions.adopt(participant).await?;
                println!("Adopted: {}", self.store.dominant(&child)?);
            }
            Commands::Pair { a, b, message } => {
                let key = self.pairing.propose(a, b, message).await?;
                match self.pairing.respond(key, b, Response::Accept).await? {
                    Some(PairingOutcome::Paired { offspring, .. }) => {
                        println!("Offspring: {}", self.store.dominant(&offspring)?);
                    }
                    Some(PairingOutcome::Rejected { .. }) | None => {
                        anyhow::bail!("proposal {} was not accepted", key);
                    }
                }
            }
            Commands::Profile { participant } => {
                let profile = self.actions.profile(participant).await?;
                println!("Soul:     {}", profile.soul);
                println!("Genes:    {}", profile.dominant);
                let parents: Vec<String> = profile.parents.iter().map(|p| p.to_string()).collect();
                println!("Parents:  {}", display_list(&parents));
                let children: Vec<String> = profile
                    .children
                    .iter()
                    .map(|child| match child {
                        ChildSummary::Claimed(soul) => soul.to_string(),
                        ChildSummary::Husk(queue_id) => format!("husk {}", queue_id),
                    })
                    .collect();
                println!("Children: {}", display_list(&children));
            }
            Commands::Queue => {
                let pending = self.actions.pending_queue().await?;
                if pending.is_empty() {
                    println!("No offspring waiting");
                }
                for entry in pending {
                    let parents: Vec<String> = entry.parents.iter().map(|p| p.to_string()).collect();
                    println!(
                        "{} {} (parents: {})",
                        entry.queue_id,
                        entry.dominant,
                        display_list(&parents)
                    );
                }
            }
        }
        Ok(())
    }

    fn print_inbox(&self) {
        let Some(inbox) = &self.inbox else {
            return;
        };
        for (participant, notification) in inbox.drain_all() {
            println!("[{}] {}", participant, notification);
        }
    }
}

fn display_list(items: &[String]) -> String {
    if items.is_empty() {
        "none".to_string()
    } else {
        items.join(", ")
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => LineageConfig::from_file(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => LineageConfig::default(),
    };
    if let Some(state) = cli.state {
        config.snapshot_path = state;
    }

    // Initialize logging
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    // ========================================
    // Dependency Injection - Wire up the system
    // ========================================

    let gateway = InMemoryGateway::load_snapshot(&config.snapshot_path)
        .await
        .with_context(|| format!("failed to load state {}", config.snapshot_path.display()))?;
    let app = App::wire(gateway, config.notifier);

    // ========================================
    // Run the command
    // ========================================

    let outcome = app.run(cli.command).await;
    app.print_inbox();
    outcome?;

    app.gateway.save_snapshot(&config.snapshot_path).await?;
    info!(path = %config.snapshot_path.display(), "Done");
    Ok(())
}
