use std::io::{BufRead, Write};

use anyhow::{bail, Result};

use crate::core::{rule_to_dsl, Window};
use crate::platform::WindowSource;
use crate::session::Session;

const HELP: &str = "\
commands:
  list                      list active rules
  show <n>                  print rule n as DSL
  set <n> <key> <value...>  set a field (e.g. set 0 workspace 2 silent)
  unset <n> <key>           clear a field
  rename <n> [name...]      rename rule n (no name clears it)
  delete <n>                delete rule n
  disable <n>               disable rule n
  undo | redo               walk the change history
  history                   list recorded changes
  explain <class> [title...]  show the cascade for a window
  check                     analyze the ruleset
  export                    print the ruleset as DSL
  quit";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellCommand {
    List,
    Show(usize),
    Set {
        index: usize,
        key: String,
        value: String,
    },
    Unset {
        index: usize,
        key: String,
    },
    Rename {
        index: usize,
        name: String,
    },
    Delete(usize),
    Disable(usize),
    Undo,
    Redo,
    History,
    Explain(Window),
    Check,
    Export,
    Help,
    Quit,
}

/// Parse one input line. Blank lines yield `None`.
pub fn parse_command(line: &str) -> Result<Option<ShellCommand>> {
    let args: Vec<&str> = line.split_whitespace().collect();
    let Some((&cmd, rest)) = args.split_first() else {
        return Ok(None);
    };

    let command = match cmd {
        "list" | "ls" => ShellCommand::List,
        "show" => ShellCommand::Show(parse_index(rest, "show <n>")?),
        "set" => {
            if rest.len() < 3 {
                bail!("Usage: set <n> <key> <value...>");
            }
            ShellCommand::Set {
                index: parse_index(rest, "set <n> <key> <value...>")?,
                key: rest[1].to_string(),
                value: text_after(line, 3).to_string(),
            }
        }
        "unset" => {
            if rest.len() != 2 {
                bail!("Usage: unset <n> <key>");
            }
            ShellCommand::Unset {
                index: parse_index(rest, "unset <n> <key>")?,
                key: rest[1].to_string(),
            }
        }
        "rename" => ShellCommand::Rename {
            index: parse_index(rest, "rename <n> [name...]")?,
            name: text_after(line, 2).to_string(),
        },
        "delete" | "rm" => ShellCommand::Delete(parse_index(rest, "delete <n>")?),
        "disable" => ShellCommand::Disable(parse_index(rest, "disable <n>")?),
        "undo" => ShellCommand::Undo,
        "redo" => ShellCommand::Redo,
        "history" => ShellCommand::History,
        "explain" => {
            let Some(class) = rest.first() else {
                bail!("Usage: explain <class> [title...]");
            };
            let mut window = Window::with_class(*class);
            let title = text_after(line, 2);
            if !title.is_empty() {
                window.title = Some(title.to_string());
            }
            ShellCommand::Explain(window)
        }
        "check" => ShellCommand::Check,
        "export" => ShellCommand::Export,
        "help" | "?" => ShellCommand::Help,
        "quit" | "exit" => ShellCommand::Quit,
        _ => bail!("Unknown command: {} (try 'help')", cmd),
    };
    Ok(Some(command))
}

/// The raw text following the first `count` words, inner spacing kept.
fn text_after(line: &str, count: usize) -> &str {
    let mut rest = line.trim_start();
    for _ in 0..count {
        let end = rest.find(char::is_whitespace).unwrap_or(rest.len());
        rest = rest[end..].trim_start();
    }
    rest.trim_end()
}

fn parse_index(args: &[&str], usage: &str) -> Result<usize> {
    match args.first() {
        Some(raw) => match raw.parse() {
            Ok(index) => Ok(index),
            Err(_) => bail!("Invalid rule index: {}", raw),
        },
        None => bail!("Usage: {}", usage),
    }
}

/// Run one command. Returns `false` once the session should end.
pub fn execute(
    session: &mut Session,
    windows: Option<&dyn WindowSource>,
    command: ShellCommand,
    out: &mut impl Write,
) -> Result<bool> {
    match command {
        ShellCommand::List => {
            for (index, rule) in session.ruleset().iter().enumerate() {
                writeln!(out, "{}: {}", index, rule.display_name(index))?;
            }
            if !session.disabled().is_empty() {
                writeln!(out, "({} disabled)", session.disabled().len())?;
            }
        }
        ShellCommand::Show(index) => match session.ruleset().get(index) {
            Some(rule) => write!(out, "{}", rule_to_dsl(rule))?,
            None => bail!("No rule at index {}", index),
        },
        ShellCommand::Set { index, key, value } => session.set_field(index, &key, &value)?,
        ShellCommand::Unset { index, key } => {
            if !session.unset_field(index, &key)? {
                writeln!(out, "{} was not set", key)?;
            }
        }
        ShellCommand::Rename { index, name } => session.rename(index, &name)?,
        ShellCommand::Delete(index) => {
            session.delete(index)?;
        }
        ShellCommand::Disable(index) => session.disable(index)?,
        ShellCommand::Undo if !session.history().can_undo() => writeln!(out, "nothing to undo")?,
        ShellCommand::Undo => {
            if let Some(kind) = session.undo()? {
                writeln!(out, "undid {}", kind)?;
            }
        }
        ShellCommand::Redo if !session.history().can_redo() => writeln!(out, "nothing to redo")?,
        ShellCommand::Redo => {
            if let Some(kind) = session.redo()? {
                writeln!(out, "redid {}", kind)?;
            }
        }
        ShellCommand::History => {
            let history = session.history();
            if history.is_empty() {
                writeln!(out, "no changes recorded")?;
                return Ok(true);
            }
            writeln!(
                out,
                "{}/{} change(s), {} undoable",
                history.len(),
                history.capacity(),
                history.cursor()
            )?;
            for (i, record) in history.records().iter().enumerate() {
                let marker = if i < history.cursor() { ' ' } else { '~' };
                writeln!(
                    out,
                    "{}{} {} [{}] {}",
                    marker,
                    record.timestamp.format("%H:%M:%S"),
                    record.kind,
                    record.index,
                    record.description
                )?;
            }
        }
        ShellCommand::Explain(window) => write!(out, "{}", session.resolve(&window)?)?,
        ShellCommand::Check => {
            let snapshot = match windows.map(|source| source.windows()).transpose() {
                Ok(snapshot) => snapshot,
                Err(e) => {
                    tracing::warn!("Window list unavailable, skipping orphan check: {:#}", e);
                    None
                }
            };
            let report = session.analyze(snapshot.as_deref())?;
            if report.is_clean() {
                writeln!(out, "no issues in {} rule(s)", session.ruleset().len())?;
            } else {
                writeln!(out, "{}", report)?;
            }
        }
        ShellCommand::Export => write!(out, "{}", session.export())?,
        ShellCommand::Help => writeln!(out, "{}", HELP)?,
        ShellCommand::Quit => return Ok(false),
    }
    Ok(true)
}

/// Read commands line by line until EOF or `quit`. Command errors are
/// reported and the loop continues.
pub fn run(
    session: &mut Session,
    windows: Option<&dyn WindowSource>,
    input: impl BufRead,
    out: &mut impl Write,
) -> Result<()> {
    writeln!(
        out,
        "editing {} ({} rule(s), 'help' lists commands)",
        session.settings().config_path.display(),
        session.ruleset().len()
    )?;
    for line in input.lines() {
        let line = line?;
        let outcome = parse_command(&line)
            .and_then(|cmd| cmd.map_or(Ok(true), |cmd| execute(session, windows, cmd, out)));
        match outcome {
            Ok(true) => {}
            Ok(false) => break,
            Err(e) => writeln!(out, "error: {:#}", e)?,
        }
        out.flush()?;
    }
    Ok(())
}
