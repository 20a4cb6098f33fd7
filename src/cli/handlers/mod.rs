use std::io::{self, BufRead, Write};

use tracing::info;

use crate::cli::commands::{Cli, Commands};
use crate::cli::output::*;
use crate::io::clipboard::{Clipboard, MemoryClipboard, SystemClipboard};
use crate::io::paths::{self, ListLocation, ListScope, resolve_list};
use crate::io::store::{self, JsonFileStore};
use crate::model::config::Config;
use crate::tui::{self, app::App};

type CmdResult = Result<(), Box<dyn std::error::Error>>;

/// Route a parsed command line to its handler
pub fn dispatch(cli: Cli, config: &Config) -> CmdResult {
    let json = cli.json;
    match &cli.command {
        None => {
            // Bare `dotdot` opens tasks.dot in the working directory
            let local = cli.local || cli.name.is_none();
            let location = resolve_list(cli.name.as_deref(), local, cli.file.as_deref())?;
            cmd_open(&location, config, cli.no_clipboard)
        }
        Some(_) if cli.name.is_some() => Err(format!(
            "unexpected argument '{}' before subcommand",
            cli.name.as_deref().unwrap_or_default()
        )
        .into()),
        Some(Commands::Open(args)) => {
            let location = resolve_list(args.name.as_deref(), cli.local, cli.file.as_deref())?;
            cmd_open(&location, config, cli.no_clipboard)
        }
        Some(Commands::List) => cmd_list(cli.local, json),
        Some(Commands::Delete(args)) => {
            if args.name.is_none() && cli.file.is_none() {
                return Err("delete command requires a name".into());
            }
            let location = resolve_list(args.name.as_deref(), cli.local, cli.file.as_deref())?;
            let stdin = io::stdin();
            cmd_delete(&location, args.yes, json, &mut stdin.lock(), &mut io::stdout())
        }
        Some(Commands::Info(args)) => {
            let location = resolve_list(args.name.as_deref(), cli.local, cli.file.as_deref())?;
            cmd_info(&location, json)
        }
    }
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

pub fn cmd_open(location: &ListLocation, config: &Config, no_clipboard: bool) -> CmdResult {
    info!(path = %location.path.display(), "opening task list");
    let store = JsonFileStore::new(&location.path).with_backup(config.storage.backup);
    let clipboard: Box<dyn Clipboard> = if no_clipboard {
        Box::new(MemoryClipboard::default())
    } else {
        Box::new(SystemClipboard::new())
    };
    let mut app = App::open(Box::new(store), clipboard, config)
        .with_list_name(location.display_name());
    tui::run(&mut app)
}

pub fn cmd_list(local: bool, json: bool) -> CmdResult {
    let dir = if local {
        std::env::current_dir()?
    } else {
        paths::global_tasks_dir()
    };
    let names = store::list_task_lists(&dir)?;
    if json {
        let entries: Vec<ListEntryJson> = names
            .iter()
            .map(|name| ListEntryJson {
                name: name.clone(),
                path: dir.join(format!("{name}.{}", paths::LIST_EXTENSION)),
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&entries)?);
    } else {
        for line in format_list(&names, local) {
            println!("{line}");
        }
    }
    Ok(())
}

/// Delete a list after a y/N confirmation read from `input`
pub fn cmd_delete(
    location: &ListLocation,
    yes: bool,
    json: bool,
    input: &mut dyn BufRead,
    out: &mut dyn Write,
) -> CmdResult {
    let path = &location.path;
    if !path.exists() {
        return Err(format!("Task list file does not exist: {}", path.display()).into());
    }
    if !yes {
        write!(
            out,
            "Are you sure you want to delete '{}'? (y/N): ",
            path.display()
        )?;
        out.flush()?;
        let mut answer = String::new();
        input.read_line(&mut answer)?;
        if !is_yes(&answer) {
            writeln!(out, "Deletion cancelled")?;
            return Ok(());
        }
    }
    store::delete_task_list(path)?;
    if json {
        let body = DeletedJson {
            deleted: path.clone(),
        };
        writeln!(out, "{}", serde_json::to_string_pretty(&body)?)?;
    } else {
        writeln!(out, "Successfully deleted task list: {}", path.display())?;
    }
    Ok(())
}

pub fn cmd_info(location: &ListLocation, json: bool) -> CmdResult {
    let info = store::file_info(&location.path)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&info)?);
    } else {
        let scope = match location.scope {
            ListScope::Global => "global",
            ListScope::Local => "local",
            ListScope::File => "file",
        };
        println!("Name:     {} ({scope})", location.name());
        for line in format_file_info(&info) {
            println!("{line}");
        }
    }
    Ok(())
}
