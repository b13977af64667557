//! Interactive line-oriented session.
//!
//! Reads one command per line from stdin, drives an in-memory
//! `ThreadRegistry` and prints the branch views as plain text. The session
//! subscribes to registry events and reports every active-thread change.

use std::io::{self, BufRead, IsTerminal, Write};

use anyhow::{Context, Result, anyhow, bail};
use chrono::Utc;
use forkline_core::config::{Config, DisplayConfig};
use forkline_core::core::events::{RegistryEvent, RegistryEventRx};
use forkline_core::core::registry::ThreadRegistry;
use forkline_core::core::thread::{BranchKind, Role, Thread, ThreadId};
use forkline_core::core::time::format_relative_timestamp;
use forkline_tui::common::line_to_plain;
use forkline_tui::thread::{flatten_registry, tree_lines};
use forkline_tui::{BranchHistoryView, BranchMarkerView, open_branch};
use tracing::debug;

const HELP: &str = "\
Commands:
  new [note]              start a new root thread and switch to it
  say <role> <text>       append a message (role: user, assistant, system, tool)
  fork <index> [note]     branch the active thread after <index> messages and switch to it
  checkpoint [note]       snapshot the active thread as a branch
  note [text]             set (or clear) the active thread's branch note
  up                      switch to the active thread's parent
  branches [id]           list branches of a thread (default: active)
  open <n>                open branch <n> from the last listing
  marker [id]             show the inline marker for a thread (default: active)
  switch <id>             switch to a thread by id or unique prefix
  show                    print the active thread
  tree                    print every thread as a tree
  delete <id>             delete a thread (its branches move up)
  json [id]               print a thread as JSON (default: active)
  ago <timestamp>         format an RFC 3339 timestamp the way branch rows do
  help                    show this help
  quit                    exit";

/// A parsed session command.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Command {
    New(Option<String>),
    Say(Role, String),
    Fork(usize, Option<String>),
    Checkpoint(Option<String>),
    Note(Option<String>),
    Up,
    Branches(Option<String>),
    Open(usize),
    Marker(Option<String>),
    Switch(String),
    Show,
    Tree,
    Delete(String),
    Json(Option<String>),
    Ago(String),
    Help,
    Quit,
}

fn optional(rest: &str) -> Option<String> {
    let rest = rest.trim();
    (!rest.is_empty()).then(|| rest.to_string())
}

fn required(rest: &str, usage: &str) -> Result<String> {
    optional(rest).ok_or_else(|| anyhow!("usage: {usage}"))
}

impl Command {
    /// Parses one input line. Blank lines and `#` comments yield `None`.
    fn parse(line: &str) -> Result<Option<Self>> {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            return Ok(None);
        }
        let (word, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));

        let command = match word {
            "new" => Command::New(optional(rest)),
            "say" => {
                let (role, text) = rest
                    .trim()
                    .split_once(char::is_whitespace)
                    .ok_or_else(|| anyhow!("usage: say <role> <text>"))?;
                Command::Say(role.parse()?, text.trim().to_string())
            }
            "fork" => {
                let rest = rest.trim();
                let (index, note) = rest.split_once(char::is_whitespace).unwrap_or((rest, ""));
                let index: usize = index
                    .parse()
                    .with_context(|| format!("invalid message index '{index}'"))?;
                Command::Fork(index, optional(note))
            }
            "checkpoint" => Command::Checkpoint(optional(rest)),
            "note" => Command::Note(optional(rest)),
            "up" => Command::Up,
            "branches" | "ls" => Command::Branches(optional(rest)),
            "open" => {
                let n = required(rest, "open <n>")?;
                let n: usize = n
                    .parse()
                    .with_context(|| format!("invalid branch number '{n}'"))?;
                Command::Open(n)
            }
            "marker" => Command::Marker(optional(rest)),
            "switch" => Command::Switch(required(rest, "switch <id>")?),
            "show" => Command::Show,
            "tree" => Command::Tree,
            "delete" => Command::Delete(required(rest, "delete <id>")?),
            "json" => Command::Json(optional(rest)),
            "ago" => Command::Ago(required(rest, "ago <timestamp>")?),
            "help" | "?" => Command::Help,
            "quit" | "exit" => Command::Quit,
            other => bail!("unknown command '{other}' (try 'help')"),
        };
        Ok(Some(command))
    }
}

/// Whether the session should keep reading input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

pub struct Session<W: Write> {
    registry: ThreadRegistry,
    events: RegistryEventRx,
    display: DisplayConfig,
    /// Thread ids from the most recent `branches` listing, in row order.
    last_listing: Vec<ThreadId>,
    out: W,
}

impl<W: Write> Session<W> {
    pub fn new(mut registry: ThreadRegistry, display: DisplayConfig, out: W) -> Self {
        let events = registry.subscribe();
        Self {
            registry,
            events,
            display,
            last_listing: Vec::new(),
            out,
        }
    }

    /// Executes one input line and reports any resulting active-thread change.
    pub fn handle_line(&mut self, line: &str) -> Result<Flow> {
        let result = match Command::parse(line) {
            Ok(Some(command)) => self.execute(command),
            Ok(None) => Ok(Flow::Continue),
            Err(e) => Err(e),
        };
        self.report_events()?;
        result
    }

    fn execute(&mut self, command: Command) -> Result<Flow> {
        match command {
            Command::New(note) => {
                let id = self.registry.create_root(note);
                writeln!(self.out, "Created thread {}", id.short())?;
                self.registry.switch_to_thread(&id)?;
            }
            Command::Say(role, text) => {
                let id = self.active_id()?;
                let index = self.registry.append_message(&id, role, text)?;
                writeln!(self.out, "[{index}] {role}")?;
            }
            Command::Fork(index, note) => {
                let parent = self.active_id()?;
                let id = self
                    .registry
                    .create_branch(&parent, index, note, BranchKind::ManualFork)?;
                writeln!(
                    self.out,
                    "Forked {} from {} at message {index}",
                    id.short(),
                    parent.short()
                )?;
                self.registry.switch_to_thread(&id)?;
            }
            Command::Checkpoint(note) => {
                let parent = self.active_id()?;
                let len = self.active_thread()?.messages.len();
                let id = self
                    .registry
                    .create_branch(&parent, len, note, BranchKind::AutoCheckpoint)?;
                writeln!(self.out, "Checkpoint {} saved", id.short())?;
            }
            Command::Note(note) => {
                let id = self.active_id()?;
                self.registry.set_branch_note(&id, note)?;
                let thread = self.active_thread()?;
                let label = thread.display_note(&self.display.untitled_label).to_string();
                writeln!(self.out, "Note: {label}")?;
            }
            Command::Up => {
                let parent = self
                    .active_thread()?
                    .parent_id()
                    .cloned()
                    .ok_or_else(|| anyhow!("active thread has no parent"))?;
                self.registry.switch_to_thread(&parent)?;
            }
            Command::Branches(id) => self.list_branches(id.as_deref())?,
            Command::Open(n) => self.open_listed(n)?,
            Command::Marker(id) => {
                let id = self.id_or_active(id.as_deref())?;
                let thread = self.lookup(&id)?;
                if thread.is_root() {
                    bail!("thread {} is not a branch", thread.id.short());
                }
                let line = BranchMarkerView::new(thread, &self.display).line();
                writeln!(self.out, "{}", line_to_plain(&line))?;
            }
            Command::Switch(raw) => {
                let id = self.resolve_id(&raw)?;
                self.registry.switch_to_thread(&id)?;
            }
            Command::Show => self.show_active()?,
            Command::Tree => {
                let items = flatten_registry(&self.registry);
                if items.is_empty() {
                    writeln!(self.out, "No threads.")?;
                }
                let lines = tree_lines(
                    &items,
                    self.registry.active_thread_id(),
                    &self.display,
                    Utc::now(),
                );
                for line in &lines {
                    writeln!(self.out, "{}", line_to_plain(line))?;
                }
            }
            Command::Delete(raw) => {
                let id = self.resolve_id(&raw)?;
                let removed = self.registry.delete_thread(&id)?;
                self.last_listing.retain(|listed| listed != &removed.id);
                writeln!(self.out, "Deleted {}", removed.id.short())?;
            }
            Command::Json(id) => {
                let id = self.id_or_active(id.as_deref())?;
                let thread = self.lookup(&id)?;
                let json = serde_json::to_string_pretty(thread).context("serialize thread")?;
                writeln!(self.out, "{json}")?;
            }
            Command::Ago(raw) => {
                let text = format_relative_timestamp(&raw, Utc::now(), &self.display.date_format);
                writeln!(self.out, "{text}")?;
            }
            Command::Help => writeln!(self.out, "{HELP}")?,
            Command::Quit => return Ok(Flow::Quit),
        }
        Ok(Flow::Continue)
    }

    fn list_branches(&mut self, raw: Option<&str>) -> Result<()> {
        let id = self.id_or_active(raw)?;
        let view = BranchHistoryView::new(&self.registry, &id, &self.display);
        let listing: Vec<ThreadId> = (0..view.len())
            .filter_map(|idx| view.target(idx).cloned())
            .collect();
        let lines = view.lines();

        self.last_listing = listing;
        if lines.is_empty() {
            writeln!(self.out, "No branches.")?;
        }
        for line in &lines {
            writeln!(self.out, "{}", line_to_plain(line))?;
        }
        Ok(())
    }

    fn open_listed(&mut self, n: usize) -> Result<()> {
        let id = n
            .checked_sub(1)
            .and_then(|idx| self.last_listing.get(idx))
            .cloned()
            .ok_or_else(|| anyhow!("no branch #{n} in the last listing"))?;
        if !open_branch(&mut self.registry, &id) {
            writeln!(self.out, "Branch {} is no longer available.", id.short())?;
        }
        Ok(())
    }

    fn show_active(&mut self) -> Result<()> {
        let thread = self.active_thread()?;
        let path = self
            .registry
            .lineage(&thread.id)
            .iter()
            .map(|t| t.display_note(&self.display.untitled_label).to_string())
            .collect::<Vec<_>>()
            .join(" › ");
        let header = format!("Thread {}  {path}", thread.id.short());
        let messages: Vec<String> = thread
            .messages
            .iter()
            .enumerate()
            .map(|(idx, m)| format!("  [{idx}] {}: {}", m.role, m.content))
            .collect();

        writeln!(self.out, "{header}")?;
        for message in messages {
            writeln!(self.out, "{message}")?;
        }
        Ok(())
    }

    /// Prints active-thread changes; other events only go to the log.
    fn report_events(&mut self) -> Result<()> {
        let events: Vec<_> = self.events.try_iter().collect();
        for event in events {
            match &*event {
                RegistryEvent::ActiveThreadChanged { current, .. } => {
                    match current.as_ref().and_then(|id| self.registry.thread(id)) {
                        Some(thread) => writeln!(
                            self.out,
                            "Active thread: {} ({})",
                            thread.id.short(),
                            thread.display_note(&self.display.untitled_label)
                        )?,
                        None => writeln!(self.out, "No active thread.")?,
                    }
                }
                other => debug!(event = ?other, "registry event"),
            }
        }
        Ok(())
    }

    fn active_id(&self) -> Result<ThreadId> {
        self.registry
            .active_thread_id()
            .cloned()
            .ok_or_else(|| anyhow!("no active thread (start one with 'new')"))
    }

    fn active_thread(&self) -> Result<&Thread> {
        self.registry
            .active_thread()
            .ok_or_else(|| anyhow!("no active thread (start one with 'new')"))
    }

    fn lookup(&self, id: &ThreadId) -> Result<&Thread> {
        self.registry
            .thread(id)
            .ok_or_else(|| anyhow!("thread not found: {id}"))
    }

    fn id_or_active(&self, raw: Option<&str>) -> Result<ThreadId> {
        match raw {
            Some(raw) => self.resolve_id(raw),
            None => self.active_id(),
        }
    }

    /// Resolves a full id or a unique prefix (a trailing `…` is ignored so
    /// short ids can be pasted back). Unknown ids pass through unchanged for
    /// the registry to reject.
    fn resolve_id(&self, raw: &str) -> Result<ThreadId> {
        let raw = raw.trim().trim_end_matches('…').trim();
        if raw.is_empty() {
            bail!("thread id must not be empty");
        }
        let exact = ThreadId::from(raw);
        if self.registry.contains(&exact) {
            return Ok(exact);
        }

        let matches: Vec<&ThreadId> = self
            .registry
            .threads()
            .map(|t| &t.id)
            .filter(|id| id.as_str().starts_with(raw))
            .collect();
        match matches.as_slice() {
            [only] => Ok((*only).clone()),
            [] => Ok(exact),
            _ => bail!("ambiguous thread prefix '{raw}' ({} matches)", matches.len()),
        }
    }

    #[cfg(test)]
    fn registry(&self) -> &ThreadRegistry {
        &self.registry
    }
}

pub fn run(config: &Config) -> Result<()> {
    let stdin = io::stdin();
    let interactive = stdin.is_terminal();
    let mut session = Session::new(ThreadRegistry::new(), config.display.clone(), io::stdout());

    if interactive {
        println!("forkline: type 'help' for commands");
    }

    let mut lines = stdin.lock().lines();
    loop {
        if interactive {
            print!("forkline> ");
            io::stdout().flush().context("flush prompt")?;
        }
        let Some(line) = lines.next() else { break };
        let line = line.context("read command")?;

        match session.handle_line(&line) {
            Ok(Flow::Quit) => break,
            Ok(Flow::Continue) => {}
            Err(e) => eprintln!("error: {e:#}"),
        }
    }
    Ok(())
}
