use crate::core::context_generator::{build_context_output, format_output};
use crate::core::file_selector::{App, Outcome, Session, run_tui};
use crate::core::settings::{Settings, scheme_names};
use crate::core::token_counter::{NaiveTokenizer, TokenCounter};
use crate::domain::models::{OutputTarget, PickConfig};
use crate::domain::tree::build_tree;
use crate::infra::file_system::{FileSystem, OsFileSystem};
use crate::infra::ignore_list::{self, PathFilter};
use crate::infra::logger::setup_logger;
use crate::infra::output::write_output;
use anyhow::{Context, bail};
use clap::Parser;
use log::{debug, info};
use std::collections::BTreeSet;
use std::fs;
use std::path::PathBuf;

const CONTROLS: &str = "\
Controls:
  ↑/k ↓/j      Move the cursor
  ←/h          Collapse directory or go to parent
  →/l/Enter    Expand directory or enter it
  Space        Toggle selection (directories apply to their contents)
  x            Exclude entry and remember it in .pickyignore
  p            Edit the prompt (Esc to finish)
  s            Settings
  g            Generate output and exit
  q/Ctrl+C     Quit";

#[derive(Parser, Debug)]
#[command(name = "picky", version)]
#[command(about = "Pick files from a directory tree into a single LLM context file", long_about = None)]
#[command(after_help = CONTROLS)]
pub struct Cli {
    /// Directory to browse
    pub directory: PathBuf,

    /// Output file, `-` for stdout
    #[arg(short, long, default_value = "selected.txt")]
    pub output: String,

    /// Copy the output to the clipboard instead of writing a file
    #[arg(long)]
    pub clipboard: bool,

    /// Comma-separated entry names to leave out of the tree
    #[arg(long, default_value = ".git")]
    pub exclude: String,

    /// Leave out paths matched by the root .gitignore
    #[arg(long)]
    pub gitignore: bool,

    /// Show emoji icons
    #[arg(long)]
    pub emoji: bool,

    /// Color scheme
    #[arg(long, default_value = "default")]
    pub scheme: String,

    /// Initial prompt text
    #[arg(long)]
    pub prompt: Option<String>,

    /// Write log output to this file instead of stderr
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

pub fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logger(cli.verbose, cli.log_file.as_deref())?;
    info!("Starting picky");

    let root = fs::canonicalize(&cli.directory)
        .with_context(|| format!("cannot resolve directory {}", cli.directory.display()))?;
    let config = build_config(&cli, root.to_string_lossy().to_string())?;
    debug!("Configuration: {:?}", config);

    let fs = OsFileSystem;
    let (app, loaded) = start_session(&fs, &config)?;
    let session = run_tui(app)?;
    end_session(&fs, &config, loaded, session)
}

pub fn build_config(cli: &Cli, root_path: String) -> anyhow::Result<PickConfig> {
    let Some(settings) = Settings::with_scheme(cli.emoji, &cli.scheme) else {
        bail!(
            "unknown color scheme '{}' (available: {})",
            cli.scheme,
            scheme_names().join(", ")
        );
    };

    let output = if cli.clipboard {
        OutputTarget::Clipboard
    } else if cli.output == "-" {
        OutputTarget::Stdout
    } else {
        OutputTarget::File(PathBuf::from(&cli.output))
    };

    let exclude_names = cli
        .exclude
        .split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect();

    Ok(PickConfig {
        root_path,
        output,
        exclude_names,
        respect_gitignore: cli.gitignore,
        initial_prompt: cli.prompt.clone(),
        settings,
    })
}

/// Builds the filtered tree and its token counts. Also returns the ignore
/// set loaded from disk so the session can extend it.
pub fn start_session(
    fs: &dyn FileSystem,
    config: &PickConfig,
) -> anyhow::Result<(App, BTreeSet<String>)> {
    let loaded = ignore_list::load(fs, &config.root_path);

    let mut filter = PathFilter::new(
        &config.root_path,
        loaded.clone(),
        config.exclude_names.clone(),
    );
    if config.respect_gitignore {
        filter = filter.with_gitignore(fs);
    }

    info!("Scanning {}", config.root_path);
    let keep = |path: &str, is_dir: bool| filter.keep(path, is_dir);
    let tree = build_tree(fs, &config.root_path, Some(&keep)).context("build tree")?;

    let tokens = TokenCounter::new(fs, NaiveTokenizer).build_tree_token_map(&tree);

    let app = App::new(
        tree,
        tokens,
        config.settings.clone(),
        config.initial_prompt.clone().unwrap_or_default(),
    );
    Ok((app, loaded))
}

/// Persists the session's exclusions and, if asked for, writes the output.
pub fn end_session(
    fs: &dyn FileSystem,
    config: &PickConfig,
    loaded: BTreeSet<String>,
    session: Session,
) -> anyhow::Result<()> {
    if !session.new_ignores.is_empty() {
        let mut ignores = loaded;
        ignores.extend(session.new_ignores);
        ignore_list::save(fs, &config.root_path, &ignores).context("save ignores")?;
    }

    if session.outcome != Outcome::Generate {
        info!("Quit without generating output");
        return Ok(());
    }

    let output = build_context_output(fs, &session.tree, &session.state, &session.prompt);
    info!(
        "Generating output for {} files (~{} tokens)",
        output.files.len(),
        output.token_count
    );
    write_output(&format_output(&output), &config.output, fs)
}
