// Copyright (c) 2024-2026 Pigo Contributors
//
// SPDX-License-Identifier: Apache-2.0
mod cli;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use cli::{Cli, Commands};
use pigo_config::{Config, ModelConfig};
use pigo_core::{
    list_sessions, sessions_root, spawn_listener, system_prompt, AgentEvent, Emitter,
    InterruptController, Session, SessionStore, StopReason, TurnLoop,
};
use pigo_model::{Message, ModelProvider};
use pigo_tools::{BashTool, EditTool, FindTool, GrepTool, LsTool, ReadTool, ToolRegistry, WriteTool};
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{filter::EnvFilter, fmt, prelude::*};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let mut config = pigo_config::load(cli.config.as_deref()).context("loading configuration")?;
    if let Some(model_override) = &cli.model {
        config.model = pigo_model::resolve_model_cfg(&config.model, model_override);
    }

    if let Some(command) = &cli.command {
        return run_command(command, &config);
    }

    run_repl(cli, config).await
}

async fn run_repl(cli: Cli, config: Config) -> anyhow::Result<()> {
    let allowed_root = resolve_allowed_root(cli.allowed_root.as_deref(), &config)?;

    let mut model_cfg = config.model.clone();
    let mut model = build_model(&model_cfg)?;

    let mut registry = ToolRegistry::new();
    registry.register(BashTool { default_timeout_secs: config.tools.bash_timeout_secs });
    registry.register(ReadTool);
    registry.register(WriteTool);
    registry.register(EditTool);
    registry.register(GrepTool);
    registry.register(FindTool);
    registry.register(LsTool);
    let registry = Arc::new(registry);

    let emitter = Arc::new(Emitter::new());
    let _render_sub = emitter.subscribe(Box::new(render_event));
    emitter.emit(&AgentEvent::AgentStart);

    let interrupt = Arc::new(InterruptController::new());
    spawn_listener(interrupt.clone());

    let mut turn_loop = TurnLoop::new(model.clone(), registry.clone(), emitter.clone(), &config.agent);

    let mut session = Session::new(config.agent.max_context_chars, model_cfg.name.clone(), allowed_root.clone());

    let resume_id = cli.resume.as_ref().map(|id| -> anyhow::Result<String> {
        if id.is_empty() { latest_session_id() } else { Ok(id.clone()) }
    }).transpose()?;

    let mut store = if let Some(id) = resume_id {
        session.id = id.clone();
        let events_path = sessions_root().join(&id).join("events.jsonl");
        let loaded = pigo_core::load_messages(&events_path)
            .with_context(|| format!("loading session '{id}'"))?;
        session.replace_messages(loaded);
        println!("Resumed session {id} ({} messages)", session.messages.len());
        SessionStore::open(&session.id).context("reopening resumed session store")?
    } else {
        session.push(Message::system(system_prompt(config.agent.system_prompt.as_deref(), &allowed_root)));
        let mut store = SessionStore::open(&session.id).context("opening session store")?;
        store.append_lifecycle(&AgentEvent::AgentStart)?;
        store.append_message(session.messages.last().expect("system message just pushed"))?;
        store
    };

    println!("pigo — session {}. Type /q to quit, /usage for token usage.", session.id);

    let mut rl = DefaultEditor::new().context("initializing line editor")?;

    if let Some(initial) = cli.prompt.clone() {
        run_turn(&turn_loop, &mut session, &mut store, &interrupt, &initial).await?;
    }

    loop {
        match rl.readline("pigo> ") {
            Ok(line) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                let _ = rl.add_history_entry(line);

                if let Some(rest) = line.strip_prefix('/') {
                    match parse_command(rest) {
                        Command::Quit => {
                            emitter.emit(&AgentEvent::AgentEnd);
                            store.append_lifecycle(&AgentEvent::AgentEnd)?;
                            return Ok(());
                        }
                        Command::Usage => print_usage(&session),
                        Command::ModelSwitch(name) => {
                            if name.is_empty() {
                                println!("usage: /model <name>");
                                continue;
                            }
                            model_cfg = pigo_model::resolve_model_cfg(&model_cfg, &name);
                            match build_model(&model_cfg) {
                                Ok(m) => {
                                    model = m;
                                    session.model_name = model_cfg.name.clone();
                                    turn_loop =
                                        TurnLoop::new(model.clone(), registry.clone(), emitter.clone(), &config.agent);
                                    println!("Switched to {}/{}", model_cfg.provider, model_cfg.name);
                                }
                                Err(e) => eprintln!("[pigo] failed to switch model: {e}"),
                            }
                        }
                        Command::Save(alias) => save_session(&session, alias.as_deref())?,
                        Command::Load(id) => {
                            if id.is_empty() {
                                println!("usage: /load <id>");
                                continue;
                            }
                            let events_path = sessions_root().join(&id).join("events.jsonl");
                            match pigo_core::load_messages(&events_path) {
                                Ok(loaded) => {
                                    session.id = id.clone();
                                    session.replace_messages(loaded);
                                    store = SessionStore::open(&session.id).context("reopening loaded session")?;
                                    println!("Loaded session {id} ({} messages)", session.messages.len());
                                }
                                Err(e) => eprintln!("[pigo] could not load session '{id}': {e}"),
                            }
                        }
                        Command::Sessions => print_sessions()?,
                        Command::Unknown(name) => println!("unknown command: /{name}"),
                    }
                    continue;
                }

                run_turn(&turn_loop, &mut session, &mut store, &interrupt, line).await?;
            }
            Err(ReadlineError::Interrupted) => std::process::exit(130),
            Err(ReadlineError::Eof) => {
                emitter.emit(&AgentEvent::AgentEnd);
                store.append_lifecycle(&AgentEvent::AgentEnd)?;
                return Ok(());
            }
            Err(e) => {
                eprintln!("[pigo] readline error: {e}");
                return Err(e.into());
            }
        }
    }
}

async fn run_turn(
    turn_loop: &TurnLoop,
    session: &mut Session,
    store: &mut SessionStore,
    interrupt: &InterruptController,
    prompt: &str,
) -> anyhow::Result<()> {
    let cancel = CancellationToken::new();
    interrupt.start_turn(cancel.clone());
    let before = session.messages.len();
    let stop = turn_loop.process_input(session, prompt, cancel).await;
    interrupt.end_turn();

    for msg in &session.messages[before..] {
        store.append_message(msg)?;
    }
    store.append_lifecycle(&AgentEvent::TurnEnd { stop_reason: stop })?;

    match stop {
        StopReason::Completed => {}
        StopReason::Interrupted => println!("[pigo] interrupted"),
        StopReason::IterationLimit => println!("[pigo] stopped: iteration limit reached"),
        StopReason::Error => eprintln!("[pigo] turn ended with an error"),
    }
    Ok(())
}

enum Command {
    Quit,
    Usage,
    ModelSwitch(String),
    Save(Option<String>),
    Load(String),
    Sessions,
    Unknown(String),
}

fn parse_command(line: &str) -> Command {
    let mut parts = line.splitn(2, char::is_whitespace);
    let name = parts.next().unwrap_or("");
    let rest = parts.next().unwrap_or("").trim();
    match name {
        "q" | "quit" => Command::Quit,
        "usage" => Command::Usage,
        "model" => Command::ModelSwitch(rest.to_string()),
        "save" => Command::Save(if rest.is_empty() { None } else { Some(rest.to_string()) }),
        "load" => Command::Load(rest.to_string()),
        "sessions" => Command::Sessions,
        other => Command::Unknown(other.to_string()),
    }
}

fn print_usage(session: &Session) {
    println!(
        "tokens: prompt={} completion={} total={}  context: {:.1}% of {} chars",
        session.usage.prompt,
        session.usage.completion,
        session.usage.total,
        session.context_fraction() * 100.0,
        session.max_context_chars,
    );
}

fn save_session(session: &Session, alias: Option<&str>) -> anyhow::Result<()> {
    let Some(name) = alias else {
        println!("Session id: {}", session.id);
        return Ok(());
    };
    let mut alias_store = SessionStore::open(name).with_context(|| format!("opening alias session '{name}'"))?;
    for msg in &session.messages {
        alias_store.append_message(msg)?;
    }
    println!("Saved session as '{name}' (original id: {})", session.id);
    Ok(())
}

fn print_sessions() -> anyhow::Result<()> {
    let sessions = list_sessions()?;
    if sessions.is_empty() {
        println!("No saved sessions found.");
        println!("Sessions are stored in: {}", sessions_root().display());
    } else {
        for id in &sessions {
            println!("{id}");
        }
        println!("\nTotal: {} session(s)", sessions.len());
    }
    Ok(())
}

fn latest_session_id() -> anyhow::Result<String> {
    list_sessions()?.into_iter().next().context("no saved sessions to resume")
}

fn build_model(cfg: &ModelConfig) -> anyhow::Result<Arc<dyn ModelProvider>> {
    Ok(Arc::from(pigo_model::from_config(cfg)?))
}

fn resolve_allowed_root(override_path: Option<&Path>, config: &Config) -> anyhow::Result<PathBuf> {
    let raw = match override_path {
        Some(p) => p.to_path_buf(),
        None => match &config.allowed_root {
            Some(p) => PathBuf::from(p),
            None => std::env::current_dir().context("resolving current directory")?,
        },
    };
    let canonical = raw
        .canonicalize()
        .with_context(|| format!("allowed root '{}' does not exist", raw.display()))?;
    anyhow::ensure!(canonical.is_dir(), "allowed root '{}' is not a directory", canonical.display());
    Ok(canonical)
}

fn render_event(event: &AgentEvent) {
    match event {
        AgentEvent::ToolStart { name, args } => println!("  -> {name} {args}"),
        AgentEvent::ToolEnd { name, for_user, is_error, silent } => {
            if *silent {
                return;
            }
            let marker = if *is_error { "error" } else { "ok" };
            println!("  <- {name} [{marker}] {for_user}");
        }
        AgentEvent::MessageEnd { text } => {
            if !text.trim().is_empty() {
                println!("{text}");
            }
        }
        AgentEvent::ContextCompacted { chars_before, chars_after } => {
            println!("[pigo] compacted history: {chars_before} -> {chars_after} chars");
        }
        AgentEvent::Error(msg) => eprintln!("[pigo] error: {msg}"),
        _ => {}
    }
}

fn run_command(cmd: &Commands, config: &Config) -> anyhow::Result<()> {
    match cmd {
        Commands::ShowConfig => {
            println!("{}", serde_yaml::to_string(config).unwrap_or_default());
            Ok(())
        }
        Commands::Sessions { limit } => {
            let sessions = list_sessions()?;
            if sessions.is_empty() {
                println!("No saved sessions found.");
                println!("Sessions are stored in: {}", sessions_root().display());
            } else {
                for id in sessions.iter().take(*limit) {
                    println!("{id}");
                }
                println!("\nTotal: {} session(s)", sessions.len());
            }
            Ok(())
        }
    }
}

fn init_logging(verbosity: u8) {
    let level = match verbosity {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let _ = tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(filter)
        .try_init();
}
