//! Gallery Shell
//!
//! Line-oriented render surface for the gallery engine. Reads one command per
//! line from stdin, forwards it as a UI event and prints every render
//! directive the engine emits.
//!
//! # Usage
//!
//! ```bash
//! # Against the live API (token from the config file or GALLERY_API_TOKEN)
//! gallery-shell
//!
//! # Seeded in-memory data, no network
//! gallery-shell --offline
//!
//! # Directives as JSON lines, verbose logging on stderr
//! RUST_LOG=debug gallery-shell --offline --json
//! ```
//!
//! # Environment Variables
//!
//! - `GALLERY_API_URL`, `GALLERY_API_TOKEN`: API location and credentials
//! - `GALLERY_ERROR_DISMISS_SECS`: error toast delay
//! - `GALLERY_STRICT_CONTRACTS`: report contract violations as errors
//! - `RUST_LOG`: log level (trace, debug, info, warn, error)

mod command;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc::UnboundedReceiver;
use tracing::{info, warn};

use gallery_core::{
    default_config_path, load_config_from_path, ConfigOverrides, DialogueView, Gallery,
    GalleryConfig, HttpClient, InMemoryClient, RenderDirective, ResourceClient, Surface, UiEvent,
};

use command::{Command, HELP};

/// Terminal surface for the photo gallery
#[derive(Debug, Parser)]
#[command(name = "gallery-shell", version, about)]
struct Args {
    /// Config file (defaults to ~/.config/photo-gallery/gallery.toml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// API base URL
    #[arg(long)]
    api_url: Option<String>,

    /// API authorization token
    #[arg(long)]
    token: Option<String>,

    /// Use seeded in-memory data instead of the API
    #[arg(long)]
    offline: bool,

    /// Report contract violations as errors
    #[arg(long, conflicts_with = "lenient")]
    strict: bool,

    /// Log contract violations and carry on
    #[arg(long)]
    lenient: bool,

    /// Print directives as JSON lines
    #[arg(long)]
    json: bool,
}

impl Args {
    fn overrides(&self) -> ConfigOverrides {
        let strict_contracts = match (self.strict, self.lenient) {
            (true, _) => Some(true),
            (_, true) => Some(false),
            _ => None,
        };
        ConfigOverrides {
            base_url: self.api_url.clone(),
            auth_token: self.token.clone(),
            strict_contracts,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr so stdout carries only directives
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("gallery_shell=info".parse()?)
                .add_directive("gallery_core=warn".parse()?),
        )
        .with_writer(std::io::stderr)
        .with_target(true)
        .init();

    let args = Args::parse();
    let mut config = load_config_from_path(args.config.clone().or_else(default_config_path))
        .context("Failed to load configuration")?;
    args.overrides().apply(&mut config);
    config.validate()?;
    info!(source = %config.source(), strict = config.strict_contracts, "Configuration loaded");

    if args.offline {
        run(Arc::new(InMemoryClient::seeded()), config, args.json).await
    } else {
        let client = HttpClient::from_config(&config).context("Failed to build HTTP client")?;
        run(Arc::new(client), config, args.json).await
    }
}

async fn run<C: ResourceClient>(
    client: Arc<C>,
    config: GalleryConfig,
    json: bool,
) -> anyhow::Result<()> {
    let (surface, mut directives) = Surface::channel();
    let mut gallery = Gallery::new(client, config, surface);

    let loaded = gallery.load().await;
    flush(&mut directives, json)?;
    if let Err(err) = loaded {
        warn!(error = %err, "Initial load failed");
    }
    println!("{HELP}");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                match Command::parse(&line) {
                    Ok(None) => {}
                    Ok(Some(Command::Quit)) => break,
                    Ok(Some(command)) => execute(&mut gallery, command),
                    Err(err) => eprintln!("! {err}"),
                }
            }
            Some(completion) = gallery.next_completion() => {
                gallery.handle_completion(completion);
            }
        }
        flush(&mut directives, json)?;
    }

    info!(pending = gallery.pending_requests(), "Shell closed");
    Ok(())
}

fn execute<C: ResourceClient>(gallery: &mut Gallery<C>, command: Command) {
    let event = match command {
        Command::Event(event) => event,
        Command::View(n) | Command::Like(n) | Command::Remove(n) => {
            let Some(card_id) = gallery.section().iter().nth(n - 1).map(|c| c.id().clone())
            else {
                eprintln!("! no card at position {n}");
                return;
            };
            match command {
                Command::View(_) => UiEvent::CardImageClicked { card_id },
                Command::Like(_) => UiEvent::CardLikeClicked { card_id },
                _ => UiEvent::CardRemoveClicked { card_id },
            }
        }
        Command::List => {
            for (i, card) in gallery.section().iter().enumerate() {
                let snapshot = card.snapshot();
                println!(
                    "{:>3}. {} [{} {}]{}",
                    i + 1,
                    snapshot.title,
                    if snapshot.liked { "♥" } else { "♡" },
                    snapshot.like_count,
                    if snapshot.removable { " (yours)" } else { "" }
                );
            }
            return;
        }
        Command::Help => {
            println!("{HELP}");
            return;
        }
        Command::Quit => return,
    };

    if let Err(err) = gallery.handle_event(event) {
        eprintln!("! {err}");
    }
}

fn flush(directives: &mut UnboundedReceiver<RenderDirective>, json: bool) -> anyhow::Result<()> {
    while let Ok(directive) = directives.try_recv() {
        if json {
            println!("{}", serde_json::to_string(&directive)?);
        } else {
            println!("{}", describe(&directive));
        }
    }
    Ok(())
}

fn describe(directive: &RenderDirective) -> String {
    let label = directive.label();
    match directive {
        RenderDirective::ProfileRendered {
            display_name, bio, ..
        } => format!("[{label}] {display_name}: {bio}"),
        RenderDirective::CardsRendered { cards } => {
            let titles: Vec<_> = cards.iter().map(|c| c.title.as_str()).collect();
            format!("[{label}] {} cards: {}", cards.len(), titles.join(", "))
        }
        RenderDirective::CardInserted { card, position } => {
            format!("[{label}] {} ({position:?})", card.title)
        }
        RenderDirective::CardRemoved { card_id } => format!("[{label}] {card_id}"),
        RenderDirective::CardLikesUpdated {
            card_id,
            like_count,
            liked,
        } => format!("[{label}] {card_id} likes={like_count} liked={liked}"),
        RenderDirective::DialogueOpened { kind, view } => match view {
            DialogueView::Form { fields } => {
                let fields: Vec<_> = fields.iter().map(|(k, v)| format!("{k}={v:?}")).collect();
                format!("[{label}] {kind} {}", fields.join(" "))
            }
            DialogueView::Image { title, image_url } => {
                format!("[{label}] {kind} {title} <{image_url}>")
            }
            DialogueView::Confirm => format!("[{label}] {kind} (confirm?)"),
        },
        RenderDirective::DialogueClosed { kind } | RenderDirective::ListenersDetached { kind } => {
            format!("[{label}] {kind}")
        }
        RenderDirective::ListenersAttached { kind, listeners } => {
            format!("[{label}] {kind} {listeners:?}")
        }
        RenderDirective::SubmitState {
            kind,
            enabled,
            label: text,
            ..
        } => format!("[{label}] {kind} \"{text}\" enabled={enabled}"),
        RenderDirective::FieldValidity { kind, field, error } => match error {
            Some(message) => format!("[{label}] {kind}.{field}: {message}"),
            None => format!("[{label}] {kind}.{field}: ok"),
        },
        RenderDirective::ErrorShown {
            message,
            seconds_left,
        } => format!("[{label}] {message} ({seconds_left}s)"),
        RenderDirective::ErrorCountdown { seconds_left } => format!("[{label}] {seconds_left}s"),
        RenderDirective::ErrorHidden => format!("[{label}]"),
    }
}
