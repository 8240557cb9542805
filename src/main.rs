//! plugsync — keeps plugin versions in sync across a marketplace repository
//!
//! Runs as a Claude Code `PreToolUse` hook (`plugsync hook`) and as a manual
//! tool for syncing, auditing and inventorying plugins.

use clap::Parser;
use plugsync::config::load_config;
use plugsync::inventory::Inventory;
use plugsync::sync::ManualSync;
use plugsync::{Version, hook, status};
use std::path::PathBuf;
use tracing::error;
use tracing_subscriber::{EnvFilter, fmt};

#[derive(Parser)]
#[command(name = "plugsync", about = "Plugin version synchronization guard")]
struct Cli {
    /// Increase verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Repository root (the hook prefers the payload's cwd)
    #[arg(long, global = true, default_value = ".")]
    root: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Subcommand)]
enum Command {
    /// Gate a pending git commit (reads hook JSON from stdin, prints the decision)
    Hook,
    /// Set a plugin's version in the manifest, catalog, skills and docs table
    Sync {
        /// Plugin directory name under plugins/
        plugin: String,
        /// New version (MAJOR.MINOR.PATCH)
        version: String,
    },
    /// Report plugins whose version records disagree
    Status {
        /// Only this plugin
        plugin: Option<String>,
    },
    /// Write plugin-manifest.json listing the plugin's files
    Inventory {
        /// Plugin directory, e.g. plugins/foo
        plugin_dir: PathBuf,
    },
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter =
        EnvFilter::try_from_env("PLUGSYNC_LOG").unwrap_or_else(|_| EnvFilter::new(default_level));
    // stdout carries the hook response
    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let code = match cli.command {
        Command::Hook => {
            hook::run(&cli.root);
            0
        }
        Command::Sync { plugin, version } => run_sync(&cli.root, &plugin, &version),
        Command::Status { plugin } => run_status(&cli.root, plugin.as_deref()),
        Command::Inventory { plugin_dir } => run_inventory(&cli.root, &plugin_dir),
    };
    std::process::exit(code);
}

fn run_sync(root: &std::path::Path, plugin: &str, version: &str) -> i32 {
    let version: Version = match version.parse() {
        Ok(v) => v,
        Err(e) => {
            error!("{e}");
            return 1;
        }
    };
    let config = load_config(root);

    let run = match ManualSync::run(root, &config, plugin, &version) {
        Ok(run) => run,
        Err(e) => {
            error!("{e}");
            return 1;
        }
    };

    println!("\nSynced {plugin} to v{version}:\n");
    for line in run.summary() {
        println!("  {line}");
    }

    let errors = run.error_count();
    if errors > 0 {
        println!("\n{errors} error(s) encountered. Check output above.");
        1
    } else {
        println!("\nAll locations updated successfully.");
        0
    }
}

fn run_status(root: &std::path::Path, plugin: Option<&str>) -> i32 {
    let config = load_config(root);
    let statuses = match status::collect(root, &config, plugin) {
        Ok(s) => s,
        Err(e) => {
            error!("{e}");
            return 1;
        }
    };

    let mut drifting = 0;
    for s in &statuses {
        print!("{s}");
        if !s.is_consistent() {
            drifting += 1;
        }
    }

    if drifting > 0 {
        println!("\n{drifting} plugin(s) out of sync. Run `plugsync sync <plugin> <version>`.");
        1
    } else {
        0
    }
}

fn run_inventory(root: &std::path::Path, plugin_dir: &std::path::Path) -> i32 {
    let config = load_config(root);
    let dir = root.join(plugin_dir);

    let result = Inventory::generate(&dir, &config).and_then(|inv| {
        let path = inv.write(&dir)?;
        Ok((inv, path))
    });
    match result {
        Ok((inv, path)) => {
            println!("Generated {}", path.display());
            println!("  version: {}", inv.version);
            println!("  files: {}", inv.files.len());
            println!("  preserve: {}", inv.preserve.join(", "));
            0
        }
        Err(e) => {
            error!("{e}");
            1
        }
    }
}
