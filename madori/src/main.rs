mod core;
mod platform;
mod session;
mod shell;
mod suggest;

use std::path::PathBuf;

use anyhow::Result;
use argh::FromArgs;
use tracing_subscriber::EnvFilter;

use crate::core::{rule_to_dsl, Settings, Window};
use crate::platform::{HyprctlSource, JsonFileSource, WindowSource};
use crate::session::Session;

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Madori - inspect and edit Hyprland window rules
#[derive(FromArgs)]
struct Cli {
    #[argh(subcommand)]
    command: Option<SubCommand>,
}

#[derive(FromArgs)]
#[argh(subcommand)]
enum SubCommand {
    Check(CheckCmd),
    Explain(ExplainCmd),
    List(ListCmd),
    Export(ExportCmd),
    Windows(WindowsCmd),
    Suggest(SuggestCmd),
    Shell(ShellCmd),
    Version(VersionCmd),
}

/// Analyze the rules for duplicates, conflicts and dead patterns
#[derive(FromArgs)]
#[argh(subcommand, name = "check")]
struct CheckCmd {
    /// config file to read instead of the default
    #[argh(option)]
    config: Option<PathBuf>,
    /// saved `hyprctl clients -j` output used for orphan detection
    #[argh(option)]
    clients: Option<PathBuf>,
    /// query the running compositor for orphan detection
    #[argh(switch)]
    live: bool,
    /// print the report as JSON
    #[argh(switch)]
    json: bool,
}

/// Show which rules apply to a window and what they change
#[derive(FromArgs)]
#[argh(subcommand, name = "explain")]
struct ExplainCmd {
    /// config file to read instead of the default
    #[argh(option)]
    config: Option<PathBuf>,
    /// window class
    #[argh(option)]
    class: Option<String>,
    /// window title
    #[argh(option)]
    title: Option<String>,
    /// class the window was created with
    #[argh(option)]
    initial_class: Option<String>,
    /// title the window was created with
    #[argh(option)]
    initial_title: Option<String>,
    /// workspace name
    #[argh(option)]
    workspace: Option<String>,
}

/// List rules in cascade order
#[derive(FromArgs)]
#[argh(subcommand, name = "list")]
struct ListCmd {
    /// config file to read instead of the default
    #[argh(option)]
    config: Option<PathBuf>,
}

/// Print the rules back as windowrule blocks
#[derive(FromArgs)]
#[argh(subcommand, name = "export")]
struct ExportCmd {
    /// config file to read instead of the default
    #[argh(option)]
    config: Option<PathBuf>,
}

/// Show the cascade summary for every open window
#[derive(FromArgs)]
#[argh(subcommand, name = "windows")]
struct WindowsCmd {
    /// config file to read instead of the default
    #[argh(option)]
    config: Option<PathBuf>,
    /// saved `hyprctl clients -j` output instead of the live list
    #[argh(option)]
    clients: Option<PathBuf>,
}

/// Suggest rules for catalog applications no rule covers
#[derive(FromArgs)]
#[argh(subcommand, name = "suggest")]
struct SuggestCmd {
    /// config file to read instead of the default
    #[argh(option)]
    config: Option<PathBuf>,
    /// application catalog (JSON)
    #[argh(option)]
    catalog: PathBuf,
}

/// Edit the rules interactively, reading commands from stdin
#[derive(FromArgs)]
#[argh(subcommand, name = "shell")]
struct ShellCmd {
    /// config file to read instead of the default
    #[argh(option)]
    config: Option<PathBuf>,
    /// saved `hyprctl clients -j` output used by `check`
    #[argh(option)]
    clients: Option<PathBuf>,
}

/// Show version information
#[derive(FromArgs)]
#[argh(subcommand, name = "version")]
struct VersionCmd {}

fn main() -> Result<()> {
    let cli: Cli = argh::from_env();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        None => {
            // No subcommand - show help (simulate --help)
            let args: Vec<&str> = vec!["madori", "--help"];
            if let Err(e) = Cli::from_args(&args[..1], &args[1..]) {
                println!("{}", e.output);
            }
            Ok(())
        }
        Some(SubCommand::Version(_)) => {
            println!("madori {}", VERSION);
            Ok(())
        }
        Some(SubCommand::Check(cmd)) => run_check(cmd),
        Some(SubCommand::Explain(cmd)) => run_explain(cmd),
        Some(SubCommand::List(cmd)) => {
            let session = load_session(cmd.config)?;
            for (index, rule) in session.ruleset().iter().enumerate() {
                println!("{}: {}", index, rule.display_name(index));
            }
            Ok(())
        }
        Some(SubCommand::Export(cmd)) => {
            let session = load_session(cmd.config)?;
            print!("{}", session.export());
            Ok(())
        }
        Some(SubCommand::Windows(cmd)) => run_windows(cmd),
        Some(SubCommand::Suggest(cmd)) => run_suggest(cmd),
        Some(SubCommand::Shell(cmd)) => {
            let mut session = load_session(cmd.config)?;
            let source = window_source(cmd.clients, true);
            let stdin = std::io::stdin();
            let mut stdout = std::io::stdout();
            shell::run(&mut session, source.as_deref(), stdin.lock(), &mut stdout)
        }
    }
}

fn load_session(config: Option<PathBuf>) -> Result<Session> {
    let settings = Settings::resolve(config);
    tracing::debug!("Using config {:?}", settings.config_path);
    Session::load(settings)
}

/// A saved client dump takes precedence over the live compositor.
fn window_source(clients: Option<PathBuf>, live: bool) -> Option<Box<dyn WindowSource>> {
    match clients {
        Some(path) => Some(Box::new(JsonFileSource::new(path))),
        None if live => Some(Box::new(HyprctlSource::default())),
        None => None,
    }
}

fn run_check(cmd: CheckCmd) -> Result<()> {
    let session = load_session(cmd.config)?;
    let windows = match window_source(cmd.clients, cmd.live) {
        Some(source) => Some(source.windows()?),
        None => None,
    };

    let report = session.analyze(windows.as_deref())?;
    if cmd.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else if report.is_clean() {
        println!("No issues in {} rule(s)", session.ruleset().len());
    } else {
        println!("{}", report);
    }
    if report.errors() > 0 {
        std::process::exit(1);
    }
    Ok(())
}

fn run_explain(cmd: ExplainCmd) -> Result<()> {
    let session = load_session(cmd.config)?;
    let window = Window {
        class: cmd.class,
        title: cmd.title,
        initial_class: cmd.initial_class,
        initial_title: cmd.initial_title,
        workspace_name: cmd.workspace,
        workspace_id: None,
    };
    print!("{}", session.resolve(&window)?);
    Ok(())
}

fn run_windows(cmd: WindowsCmd) -> Result<()> {
    let session = load_session(cmd.config)?;
    let windows = match window_source(cmd.clients, true) {
        Some(source) => source.windows()?,
        None => Vec::new(),
    };

    for window in &windows {
        let result = session.resolve(window)?;
        println!("{}: {}", window.label(), result.summary);
    }
    Ok(())
}

fn run_suggest(cmd: SuggestCmd) -> Result<()> {
    let session = load_session(cmd.config)?;
    let catalog = suggest::load_catalog(&cmd.catalog)?;

    let missing = suggest::uncovered(&catalog, session.ruleset());
    if missing.is_empty() {
        println!("Every catalog application is covered by a rule");
        return Ok(());
    }
    for app in missing {
        println!("# {} ({})", app.name, app.source);
        println!("{}", rule_to_dsl(&suggest::suggested_rule(app)));
    }
    Ok(())
}
