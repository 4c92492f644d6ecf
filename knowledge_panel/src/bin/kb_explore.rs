//! Load a knowledge payload from disk and print the derived panel views.
//!
//! ```text
//! kb_explore <payload.json> [--config panel.toml] [--message TEXT]
//!            [--category NAME] [--entity NAME]
//! ```

use std::error::Error;
use std::path::PathBuf;

use knowledge_panel::{KnowledgePanel, LoadState, PanelLoader};
use security_kb::{KnowledgeError, PanelConfig};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Default)]
struct Args {
    payload: PathBuf,
    config: Option<PathBuf>,
    messages: Vec<String>,
    category: Option<String>,
    entity: Option<String>,
}

fn parse_args() -> Result<Args, String> {
    let mut args = Args::default();
    let mut payload = None;
    let mut iter = std::env::args().skip(1);

    while let Some(arg) = iter.next() {
        let mut value = |flag: &str| iter.next().ok_or_else(|| format!("{} needs a value", flag));
        match arg.as_str() {
            "--config" => args.config = Some(PathBuf::from(value("--config")?)),
            "--message" => args.messages.push(value("--message")?),
            "--category" => args.category = Some(value("--category")?),
            "--entity" => args.entity = Some(value("--entity")?),
            flag if flag.starts_with("--") => return Err(format!("unknown flag {}", flag)),
            path => payload = Some(PathBuf::from(path)),
        }
    }

    args.payload = payload.ok_or("usage: kb_explore <payload.json> [options]")?;
    Ok(args)
}

fn print_json(value: &impl serde::Serialize) -> Result<(), Box<dyn Error>> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn explore(panel: &mut KnowledgePanel, args: &Args) -> Result<(), Box<dyn Error>> {
    for message in &args.messages {
        panel.observe_message(message);
    }

    if let Some(category) = &args.category {
        panel.select_category(category)?;
        if let Some(entity) = &args.entity {
            panel.select_entity(entity)?;
        }
    } else if let Some(entity) = &args.entity {
        print_json(&panel.relationships_for(entity)?)?;
    }

    print_json(&panel.current_view()?)?;

    let active = panel.active_relationships();
    if !active.is_empty() {
        print_json(&active)?;
    }
    Ok(())
}

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = parse_args()?;
    let config = match &args.config {
        Some(path) => PanelConfig::load(path)?,
        None => PanelConfig::default(),
    };

    let mut loader = PanelLoader::new(config);
    let ticket = loader.begin();
    tracing::info!(session = %loader.session(), payload = %args.payload.display(), "Reading payload");

    match std::fs::read_to_string(&args.payload) {
        Ok(doc) => {
            let payload = serde_json::from_str(&doc).map_err(KnowledgeError::from)?;
            loader.complete(ticket, &payload);
        }
        Err(err) => {
            loader.fail(ticket, err.to_string());
        }
    }

    if let LoadState::Failed(err) = loader.state() {
        return Err(err.clone().into());
    }
    let panel = loader
        .panel_mut()
        .ok_or("knowledge payload was not published")?;
    explore(panel, &args)
}
