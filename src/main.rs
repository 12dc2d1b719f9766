//! tweakset CLI
//!
//! Entry point for the `tweakset` command-line tool.

use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::PathBuf;
use std::process;

use tweakset::config::{EffectiveConfig, Settings};
use tweakset::pipeline::{self, PipelineError, PipelineResult};
use tweakset::{logging, GsettingsStore, Profile};

#[derive(Parser)]
#[command(name = "tweakset")]
#[command(about = "Apply declarative desktop settings through gsettings", version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Config file layered over ~/.config/tweakset/config.toml
    #[arg(long, short = 'c', global = true)]
    config: Option<PathBuf>,

    /// Window manager to switch to
    #[arg(long, global = true, value_parser = ["i3", "marco"])]
    wm: Option<String>,

    /// Wallpaper image path
    #[arg(long, global = true)]
    wallpaper: Option<String>,

    /// GTK and window manager theme
    #[arg(long, global = true)]
    theme: Option<String>,

    /// Debug logging
    #[arg(long, short = 'v', global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply the profile (default)
    Apply {
        /// Print the run report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show what would be applied without writing anything
    Plan {
        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },

    /// Print the effective configuration with provenance
    Config,
}

impl Cli {
    fn overrides(&self) -> Option<serde_json::Value> {
        let mut profile = serde_json::Map::new();
        if let Some(wm) = &self.wm {
            profile.insert("window_manager".to_string(), wm.clone().into());
        }
        if let Some(wallpaper) = &self.wallpaper {
            profile.insert("picture_filename".to_string(), wallpaper.clone().into());
        }
        if let Some(theme) = &self.theme {
            profile.insert("theme".to_string(), theme.clone().into());
        }

        if profile.is_empty() {
            None
        } else {
            Some(serde_json::json!({ "profile": profile }))
        }
    }
}

fn main() {
    let cli = Cli::parse();

    let result = load_config(&cli).and_then(|(effective, settings)| {
        logging::init(cli.verbose, &settings.logging.level);

        match cli.command {
            None => run_apply(&settings, false),
            Some(Commands::Apply { json }) => run_apply(&settings, json),
            Some(Commands::Plan { json }) => run_plan(&settings, json),
            Some(Commands::Config) => {
                match effective.to_json() {
                    Ok(json) => println!("{}", json),
                    Err(e) => {
                        eprintln!("Error serializing output: {}", e);
                        process::exit(1);
                    }
                }
                Ok(())
            }
        }
    });

    if let Err(e) = result {
        eprintln!("error: {}", e);
        process::exit(e.exit_code());
    }
}

fn load_config(cli: &Cli) -> PipelineResult<(EffectiveConfig, Settings)> {
    let user_path = EffectiveConfig::user_config_path();
    let effective =
        EffectiveConfig::build(user_path.as_deref(), cli.config.as_deref(), cli.overrides())?;
    let settings = effective.settings()?;
    Ok((effective, settings))
}

fn run_apply(settings: &Settings, json_output: bool) -> PipelineResult<()> {
    let profile = Profile::load(settings)?;
    let mut store = GsettingsStore::with_program(&settings.store.program);

    let report = pipeline::run_profile(&mut store, &profile, &settings.panel)?;
    if json_output {
        print_json(&report);
    }
    Ok(())
}

fn run_plan(settings: &Settings, json_output: bool) -> Result<(), PipelineError> {
    let profile = Profile::load(settings)?;
    let plan = pipeline::plan(&profile, &settings.panel);

    if json_output {
        print_json(&plan);
        return Ok(());
    }

    for entry in &plan.entries {
        println!("[{}] {}", entry.batch, entry.address);
        for planned in &entry.values {
            println!("    {}: {}", planned.key, planned.value);
        }
    }
    println!();
    println!(
        "Launcher registry: drop ids containing '{}', append {}",
        plan.stale_pattern,
        plan.launcher_ids.join(", ")
    );
    Ok(())
}

fn print_json<T: Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{}", json),
        Err(e) => {
            eprintln!("Error serializing output: {}", e);
            process::exit(1);
        }
    }
}
