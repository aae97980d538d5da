//! scrivener - CLI entry point.

use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use scrivener::ai::provider::command_from_env;
use scrivener::classify::ChangeAnalysis;
use scrivener::config::{self, CommitStyle, UserPreferences};
use scrivener::diff::{ChangeSet, CollectMode, collect_change_set, open_repository};
use scrivener::{CommandProvider, Generation, Generator, TimeoutProvider};

/// Write a conventional commit message for your pending changes.
#[derive(Parser, Debug)]
#[command(name = "scrivener")]
#[command(about = "Write a conventional commit message for your pending changes")]
#[command(version)]
struct Cli {
    /// Repository to inspect
    #[arg(long, default_value = ".")]
    repo: PathBuf,

    /// Only describe staged changes
    #[arg(long)]
    staged: bool,

    /// Read a JSON change set from a file, or `-` for stdin, instead of git
    #[arg(long, value_name = "FILE")]
    input: Option<PathBuf>,

    /// Preferences file (defaults to .scrivener.json in the repository)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Subject style
    #[arg(long, value_enum)]
    style: Option<CommitStyle>,

    /// Maximum subject length (clamped to 20..=100)
    #[arg(long, value_name = "N")]
    max_length: Option<usize>,

    /// Never include a scope
    #[arg(long)]
    no_scope: bool,

    /// Include a body listing the changed files
    #[arg(long)]
    body: bool,

    /// Custom-style template, e.g. "[{Type}] {description}"
    #[arg(long)]
    template: Option<String>,

    /// Command that reads a prompt on stdin and prints a suggestion
    /// (defaults to $SCRIVENER_AI_COMMAND)
    #[arg(long, value_name = "CMD")]
    ai_command: Option<String>,

    /// Skip the AI command even if one is configured
    #[arg(long, conflicts_with = "ai_command")]
    no_ai: bool,

    /// Print the result as JSON
    #[arg(long)]
    json: bool,

    /// Print the classifier's reasoning to stderr
    #[arg(long)]
    explain: bool,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "scrivener=debug" } else { "scrivener=warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .without_time()
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    // Step 1: Get the change set
    let (changes, root) = match &cli.input {
        Some(input) => (read_change_set(input)?, Some(cli.repo.clone())),
        None => {
            let repo = open_repository(&cli.repo)
                .context("Not a git repository. Run scrivener from within a git repository or pass --input.")?;
            let mode = if cli.staged {
                CollectMode::Staged
            } else {
                CollectMode::WorkingTree
            };
            let changes = collect_change_set(&repo, mode).context("Failed to collect changes")?;
            (changes, repo.workdir().map(Path::to_path_buf))
        }
    };

    // Step 2: Resolve preferences
    let prefs = apply_overrides(
        config::load_or_default(cli.config.as_deref(), root.as_deref())
            .context("Failed to load preferences")?,
        &cli,
    );

    // Step 3: Generate
    let mut generator = Generator::new(prefs);
    let ai_command = if cli.no_ai {
        None
    } else {
        cli.ai_command.clone().or_else(command_from_env)
    };
    if let Some(command) = ai_command {
        generator = generator.with_provider(Box::new(TimeoutProvider::from_env(CommandProvider::new(command))));
    }

    let generation = generator
        .generate(&changes)
        .await
        .context("Failed to generate a commit message")?;

    if cli.explain {
        print_explanation(&generation.analysis);
    }
    for notice in &generation.notices {
        eprintln!("Warning: {notice}");
    }
    for warning in &generation.warnings {
        eprintln!("Note: {warning}");
    }

    // Step 4: Print
    print_generation(&generation, cli.json)?;

    Ok(())
}

/// Read a JSON change set from `path`, or stdin when it is `-`.
fn read_change_set(path: &Path) -> Result<ChangeSet> {
    let text = if path == Path::new("-") {
        let mut text = String::new();
        std::io::stdin()
            .read_to_string(&mut text)
            .context("Failed to read change set from stdin")?;
        text
    } else {
        std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?
    };
    serde_json::from_str(&text).context("Invalid change set JSON")
}

/// CLI flags win over file values.
fn apply_overrides(mut prefs: UserPreferences, cli: &Cli) -> UserPreferences {
    if let Some(style) = cli.style {
        prefs.style = style;
    }
    if let Some(max) = cli.max_length {
        prefs.max_subject_length = max;
    }
    if cli.no_scope {
        prefs.infer_scope = false;
    }
    if cli.body {
        prefs.include_body = true;
    }
    if let Some(template) = &cli.template {
        prefs.template = Some(template.clone());
        if cli.style.is_none() {
            prefs.style = CommitStyle::Custom;
        }
    }
    prefs.normalized()
}

fn print_generation(generation: &Generation, json: bool) -> Result<()> {
    if json {
        let text = serde_json::to_string_pretty(generation).context("Failed to serialize result")?;
        println!("{text}");
    } else {
        println!("{}", generation.message.format());
    }
    Ok(())
}

/// Print the classifier's reasoning.
fn print_explanation(analysis: &ChangeAnalysis) {
    eprintln!("Type scores:");
    for (ty, score) in analysis.scores.iter().filter(|(_, s)| *s > 0.0) {
        let marker = if ty == analysis.commit_type { "*" } else { " " };
        let name = ty.as_str();
        eprintln!("  {marker} {name:<9} {score:.1}");
    }
    eprintln!("Scope:      {}", analysis.scope.as_deref().unwrap_or("(none)"));
    eprintln!("Impact:     {}", analysis.impact);
    eprintln!(
        "Categories: {}",
        analysis.categories.iter().cloned().collect::<Vec<_>>().join(", ")
    );

    let content = &analysis.content;
    let signals: Vec<&str> = [
        (content.has_new_functions, "new functions"),
        (content.has_class_changes, "classes"),
        (content.has_imports, "imports"),
        (content.has_config_changes, "config"),
        (content.has_test_changes, "tests"),
        (content.has_null_checks, "null checks"),
        (content.has_validation, "validation"),
    ]
    .into_iter()
    .filter_map(|(on, name)| on.then_some(name))
    .collect();
    eprintln!(
        "Content:    {}",
        if signals.is_empty() { "(none)".to_string() } else { signals.join(", ") }
    );
    if let Some(kind) = content.dominant_change_kind {
        eprintln!("Dominant:   {kind}");
    }
    if let Some(rename) = &analysis.rename {
        eprintln!("Rename:     {} -> {} ({} files)", rename.old, rename.new, rename.files.len());
    }
    eprintln!();
}
