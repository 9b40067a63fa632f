mod config;
mod contrib;
mod github;
mod growth;
mod heatmap;
mod help;
mod plum;
mod settings;
mod terminal;
mod theme;
mod visits;

use chrono::Weekday;
use clap::{Parser, Subcommand};
use config::{ContribConfig, PlumConfig};
use settings::Settings;
use std::io;
use std::path::PathBuf;
use theme::Theme;

#[derive(Parser)]
#[command(name = "plumterm")]
#[command(author = "Plum Terminal")]
#[command(version = "0.2.0")]
#[command(about = "Terminal generative art: plum-branch growth and contribution heatmaps", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Grow a branching plum animation
    Plum {
        /// Print the finished plum to stdout (no interactive display)
        #[arg(short, long)]
        print: bool,

        /// Keep growing new plums infinitely
        #[arg(short, long)]
        infinite: bool,

        /// Wait time between plums in infinite mode (seconds)
        #[arg(short, long, default_value = "4.0")]
        wait: f64,

        /// Random seed for reproducibility
        #[arg(short, long)]
        seed: Option<u64>,

        /// Theme override: light or dark
        #[arg(short, long)]
        theme: Option<String>,
    },

    /// Render a GitHub contribution heatmap
    Contrib {
        /// GitHub username (falls back to [github] user in the config file)
        user: Option<String>,

        /// Read the contribution feed from a JSON file instead of the network
        #[arg(short, long)]
        file: Option<PathBuf>,

        /// First day of the week: sun, mon, sat
        #[arg(short = 'w', long, default_value = "sun")]
        week_start: String,

        /// Theme override: light or dark
        #[arg(short, long)]
        theme: Option<String>,

        /// Skip the circular reveal on theme changes
        #[arg(long)]
        no_motion: bool,

        /// Visit-counter slug override
        #[arg(long)]
        slug: Option<String>,
    },

    /// Show the public visit counter
    Visits {
        /// Read the count without incrementing it
        #[arg(long)]
        peek: bool,

        /// Visit-counter slug override
        #[arg(long)]
        slug: Option<String>,
    },
}

fn main() -> io::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Plum {
            print,
            infinite,
            wait,
            seed,
            theme,
        } => {
            let config = PlumConfig {
                print,
                infinite,
                time_wait: wait,
                seed,
                theme_override: parse_theme(theme),
            };
            plum::run(config)?;
        }
        Commands::Contrib {
            user,
            file,
            week_start,
            theme,
            no_motion,
            slug,
        } => {
            let week_start = match week_start.to_lowercase().as_str() {
                "sun" | "sunday" => Weekday::Sun,
                "mon" | "monday" => Weekday::Mon,
                "sat" | "saturday" => Weekday::Sat,
                other => {
                    eprintln!("Unknown week start: {}. Using sunday.", other);
                    eprintln!("Available: sun, mon, sat");
                    Weekday::Sun
                }
            };
            let config = ContribConfig {
                user,
                file,
                week_start,
                theme_override: parse_theme(theme),
                motion: !no_motion,
                slug,
            };
            heatmap::run(config)?;
        }
        Commands::Visits { peek, slug } => {
            let settings = Settings::load();
            let slug = slug
                .or(settings.visits.slug)
                .unwrap_or_else(|| visits::DEFAULT_SLUG.to_string());
            let count = if peek {
                visits::peek(&slug)
            } else {
                visits::bump(&slug)
            };
            println!("plumterm visits: {}", visits::display(count));
        }
    }

    Ok(())
}

fn parse_theme(name: Option<String>) -> Option<Theme> {
    let name = name?;
    match Theme::from_name(&name) {
        Some(theme) => Some(theme),
        None => {
            eprintln!("Unknown theme: {}. Using the saved theme.", name);
            None
        }
    }
}
