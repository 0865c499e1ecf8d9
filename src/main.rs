use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use playhook::backend::HtmlPage;
use playhook::sink::JsonLinesSink;
use playhook::{ActionEvent, Adapter, AdapterConfig, DispatchOutcome, PageDom};
use std::io::{self, BufRead};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::sync::mpsc;

#[derive(Parser)]
#[command(name = "playhook", version, about = "Mirror a web player page's state and drive its controls")]
struct Cli {
    /// JSON file overriding selectors, icon shapes and intervals
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run one poll tick and print the sink calls as JSON lines
    Snapshot {
        #[arg(long)]
        page: PathBuf,
    },
    /// Dispatch one action against a page and print what was clicked
    Act {
        #[arg(long)]
        page: PathBuf,
        /// Action name, e.g. toggle-play or NEXT_SONG
        action: String,
    },
    /// Poll continuously; sink calls go to stdout, actions are read from stdin
    Watch {
        #[arg(long, required_unless_present = "url", conflicts_with = "url")]
        page: Option<PathBuf>,
        /// Open a live page in headless Chrome
        #[arg(long)]
        url: Option<String>,
        /// Stop after this many milliseconds instead of waiting for Ctrl-C
        #[arg(long)]
        duration_ms: Option<u64>,
    },
}

fn load_config(path: Option<&Path>) -> Result<AdapterConfig> {
    match path {
        Some(path) => Ok(AdapterConfig::from_file(path)?),
        None => Ok(AdapterConfig::default()),
    }
}

fn open_page(path: &Path) -> Result<HtmlPage> {
    HtmlPage::from_file(path).with_context(|| format!("opening {}", path.display()))
}

async fn watch<D: PageDom + 'static>(dom: D, config: AdapterConfig, duration: Option<Duration>) -> Result<()> {
    let adapter = Adapter::new(dom, JsonLinesSink::new(io::stdout()), config)?;
    let (tx, rx) = mpsc::channel::<ActionEvent>(32);

    // stdin is blocking; feed the action channel from a plain thread
    std::thread::spawn(move || {
        for line in io::stdin().lock().lines() {
            let Ok(line) = line else { break };
            if let Some(event) = ActionEvent::parse_line(&line) {
                if tx.blocking_send(event).is_err() {
                    break;
                }
            }
        }
    });

    let deadline = async {
        match duration {
            Some(d) => tokio::time::sleep(d).await,
            None => std::future::pending::<()>().await,
        }
    };

    tokio::select! {
        _ = adapter.run(rx) => {}
        _ = deadline => {}
        res = tokio::signal::ctrl_c() => res.context("waiting for Ctrl-C")?,
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Command::Snapshot { page } => {
            let adapter = Adapter::new(open_page(&page)?, JsonLinesSink::new(io::stdout()), config)?;
            adapter.tick();
        }
        Command::Act { page, action } => {
            let adapter = Adapter::new(open_page(&page)?, JsonLinesSink::new(io::sink()), config)?;
            let event = ActionEvent::parse_line(&action).context("empty action name")?;
            let outcome = adapter.handle_action(&event);
            let target = match outcome {
                DispatchOutcome::Clicked { .. } => {
                    adapter.dom().clicks().last().and_then(|n| adapter.dom().describe(n))
                }
                _ => None,
            };
            let report = serde_json::json!({ "result": outcome, "target": target });
            println!("{}", serde_json::to_string(&report)?);
        }
        Command::Watch { page, url, duration_ms } => {
            let duration = duration_ms.map(Duration::from_millis);
            match (page, url) {
                (Some(page), _) => watch(open_page(&page)?, config, duration).await?,
                (None, Some(url)) => watch_url(&url, config, duration).await?,
                (None, None) => anyhow::bail!("either --page or --url is required"),
            }
        }
    }
    Ok(())
}

#[cfg(feature = "cdp")]
async fn watch_url(url: &str, config: AdapterConfig, duration: Option<Duration>) -> Result<()> {
    let page = playhook::backend::CdpPage::launch(url, 1280, 720)?;
    watch(page, config, duration).await
}

#[cfg(not(feature = "cdp"))]
async fn watch_url(_url: &str, _config: AdapterConfig, _duration: Option<Duration>) -> Result<()> {
    anyhow::bail!("--url needs playhook built with the `cdp` feature")
}
