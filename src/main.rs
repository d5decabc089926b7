//! CLI entry point for keyring-sidebar
//!
//! Provides command-line interface for listing the sidebar built from a
//! places file, checking how selected uris resolve, and launching the GUI.

use anyhow::Context;
use clap::{Parser, Subcommand};
use colored::*;
use keyring_sidebar::config::{load_registry, DEFAULT_PLACES_PATH};
use keyring_sidebar::core::{CheckState, IdleScheduler, ManualScheduler, Sidebar};
use std::path::{Path, PathBuf};
use std::rc::Rc;

#[derive(Parser)]
#[command(name = "keyring-sidebar")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the sidebar rows and the active collection
    List {
        /// Path to the places file
        #[arg(short, long, default_value = DEFAULT_PLACES_PATH)]
        places: PathBuf,

        /// Uri to select (repeatable)
        #[arg(short, long = "select", value_name = "URI")]
        selected: Vec<String>,

        /// Show every place in the collection
        #[arg(long)]
        combined: bool,

        /// Print a JSON snapshot instead of the tree
        #[arg(long)]
        json: bool,
    },

    /// Resolve uris against the places file
    Select {
        /// Path to the places file
        #[arg(short, long, default_value = DEFAULT_PLACES_PATH)]
        places: PathBuf,

        /// Uris to select
        #[arg(required = true)]
        uris: Vec<String>,
    },

    /// Launch the GTK4 sidebar window
    Gui {
        /// Path to the places file
        #[arg(short, long, default_value = DEFAULT_PLACES_PATH)]
        places: PathBuf,
    },
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::List {
            places,
            selected,
            combined,
            json,
        } => list_sidebar(&places, &selected, combined, json)?,
        Commands::Select { places, uris } => select_uris(&places, &uris)?,
        Commands::Gui { places } => launch_gui(places)?,
    }

    Ok(())
}

/// Builds a sidebar from a places file and runs its first rebuild
fn open_sidebar(path: &Path) -> anyhow::Result<(Sidebar, Rc<ManualScheduler>)> {
    let registry = load_registry(path)
        .with_context(|| format!("Failed to load places from {}", path.display()))?;

    let scheduler = Rc::new(ManualScheduler::new());
    let idle: Rc<dyn IdleScheduler> = scheduler.clone();
    let sidebar = Sidebar::new(Rc::new(registry), idle);
    scheduler.run_pending();

    Ok((sidebar, scheduler))
}

/// Print the row tree with check and selection markers
fn list_sidebar(path: &Path, selected: &[String], combined: bool, json: bool) -> anyhow::Result<()> {
    let (sidebar, scheduler) = open_sidebar(path)?;

    if !selected.is_empty() {
        sidebar.set_selected_uris(selected.iter().cloned());
    }
    sidebar.set_combined(combined);
    scheduler.run_pending();

    if json {
        println!("{}", serde_json::to_string_pretty(&sidebar.snapshot(false))?);
        return Ok(());
    }

    println!("{}", format!("Places from: {}\n", path.display()).bold());

    for (index, row) in sidebar.rows().iter().enumerate() {
        if row.is_backend() {
            println!("{}", row.label().cyan().bold());
            continue;
        }

        let marker = match sidebar.check_state(index, true) {
            CheckState::Checked => "[x]".green(),
            CheckState::Unchecked => "[ ]".normal(),
            CheckState::Hidden => "   ".normal(),
        };
        let focus = match row.place() {
            Some(place) if sidebar.selected_place().as_ref() == Some(place) => "→".yellow(),
            _ => " ".normal(),
        };

        println!(
            "  {} {} {} {}",
            focus,
            marker,
            row.label(),
            row.uri().unwrap_or_default().dimmed()
        );
    }

    print_collection(&sidebar);
    Ok(())
}

/// Print how uris resolve to the selection and collection
fn select_uris(path: &Path, uris: &[String]) -> anyhow::Result<()> {
    let (sidebar, _scheduler) = open_sidebar(path)?;
    sidebar.set_selected_uris(uris.iter().cloned());

    let resolved = sidebar.selected_uris();
    for uri in uris {
        if resolved.contains(uri) {
            println!("{} {}", "✓".green(), uri);
        } else {
            println!("{} {} {}", "✗".red(), uri, "(no such place)".dimmed());
        }
    }

    print_collection(&sidebar);
    Ok(())
}

fn print_collection(sidebar: &Sidebar) {
    let members = sidebar.collection().elements();
    println!(
        "\n{} {} place{} in collection",
        "✓".green().bold(),
        members.len(),
        if members.len() == 1 { "" } else { "s" }
    );
    for place in members {
        println!("  {} {}", place.label(), place.uri().dimmed());
    }
}

#[cfg(feature = "gtk")]
fn launch_gui(places: PathBuf) -> anyhow::Result<()> {
    let app = keyring_sidebar::ui::App::new(places).map_err(anyhow::Error::msg)?;
    app.run();
    Ok(())
}

#[cfg(not(feature = "gtk"))]
fn launch_gui(_places: PathBuf) -> anyhow::Result<()> {
    println!("{}", "GUI not available in this build".yellow());
    println!("Rebuild with --features gtk");
    Ok(())
}
