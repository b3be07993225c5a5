use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use shared::{
    BriefingPipeline, Config, HistoryEntry, HistoryStore, Profile, ProfileStore, Units,
};
use std::io::{self as stdio, Write};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "briefing")]
#[command(about = "Generate a daily briefing from weather, headlines, and Claude")]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Fetch weather and news, then print an AI-written briefing
    Generate {
        /// Profile to use (prompts when several exist)
        #[arg(short, long)]
        profile: Option<String>,

        /// Ad-hoc city instead of a saved profile, e.g. "Paris, FR"
        #[arg(short, long, conflicts_with = "profile")]
        city: Option<String>,

        /// Units for an ad-hoc city (imperial, metric)
        #[arg(short, long, default_value = "imperial")]
        units: String,

        /// Do not record the briefing in history
        #[arg(long)]
        no_history: bool,
    },
    /// Manage saved profiles
    Profiles {
        #[command(subcommand)]
        action: ProfileAction,
    },
    /// Show past briefings for a profile
    History {
        #[arg(short, long)]
        profile: Option<String>,

        /// Print the briefing from this date (YYYY-MM-DD)
        #[arg(short, long)]
        date: Option<NaiveDate>,
    },
}

#[derive(Subcommand)]
enum ProfileAction {
    List,
    Add {
        name: String,

        #[arg(long)]
        city: String,

        #[arg(long, default_value = "imperial")]
        units: String,

        /// Repeat for each topic
        #[arg(long = "topic")]
        topics: Vec<String>,

        #[arg(long, default_value = "professional but conversational")]
        tone: String,

        #[arg(long, default_value = "3")]
        max_articles: u32,
    },
    Remove {
        name: String,
    },
}

fn parse_units(value: &str) -> Result<Units> {
    Units::parse(value)
        .ok_or_else(|| anyhow::anyhow!("Invalid units: {}. Use 'imperial' or 'metric'", value))
}

fn prompt_profile_selection(names: &[String]) -> Result<String> {
    println!("Which profile?");
    for (i, name) in names.iter().enumerate() {
        println!("  {}) {}", i + 1, name);
    }
    print!("\nEnter your choice (1-{}): ", names.len());
    stdio::stdout().flush()?;

    let mut input = String::new();
    stdio::stdin().read_line(&mut input)?;

    input
        .trim()
        .parse::<usize>()
        .ok()
        .and_then(|n| n.checked_sub(1))
        .and_then(|i| names.get(i))
        .cloned()
        .ok_or_else(|| anyhow::anyhow!("Invalid selection. Please choose 1-{}.", names.len()))
}

/// Resolve the profile name to use, prompting when there is more than one
fn choose_profile(store: &ProfileStore, requested: Option<String>) -> Result<(String, Profile)> {
    let profiles = store.load()?;

    let name = match requested {
        Some(name) => name,
        None => {
            let names: Vec<String> = profiles.keys().cloned().collect();
            match names.len() {
                0 => anyhow::bail!(
                    "No profiles yet. Create one with `briefing profiles add <name> --city <city>` or pass --city."
                ),
                1 => names[0].clone(),
                _ => prompt_profile_selection(&names)?,
            }
        }
    };

    let profile = profiles
        .get(&name)
        .cloned()
        .ok_or_else(|| anyhow::anyhow!("Profile '{}' not found", name))?;
    Ok((name, profile))
}

async fn generate(
    config: &Config,
    profile: Option<String>,
    city: Option<String>,
    units: &str,
    no_history: bool,
) -> Result<()> {
    let (name, profile) = match city {
        Some(city) => {
            let profile = Profile {
                units: parse_units(units)?,
                ..Profile::for_location(city)
            };
            (None, profile)
        }
        None => {
            let store = ProfileStore::in_dir(&config.data_dir);
            let (name, profile) = choose_profile(&store, profile)?;
            (Some(name), profile)
        }
    };

    println!("\n📍 {} · {}", profile.city, profile.units.as_str());
    println!("🌤️  Fetching weather and news, then summarizing with Claude...");

    let pipeline = BriefingPipeline::from_config(config);
    let briefing = pipeline
        .generate_briefing(&profile, &config.credentials)
        .await?;

    println!("\n📋 Your Briefing ({})\n", briefing.generated_label());
    println!("{}", briefing.text);

    println!("\n📰 Headlines");
    for group in &briefing.news.topics {
        println!("  {} ({} articles)", group.topic, group.headlines.len());
        for headline in &group.headlines {
            println!("    - {} ({})", headline.title, headline.source);
            println!("      {}", headline.url);
        }
    }

    if let (Some(name), false) = (name, no_history) {
        let history = HistoryStore::in_dir(&config.data_dir);
        if let Err(e) = history.record(&name, HistoryEntry::from_briefing(&briefing)) {
            tracing::warn!(error = %e, "Could not save briefing to history");
        }
    }

    Ok(())
}

fn profiles(config: &Config, action: ProfileAction) -> Result<()> {
    let store = ProfileStore::in_dir(&config.data_dir);

    match action {
        ProfileAction::List => {
            let profiles = store.load()?;
            if profiles.is_empty() {
                println!("No profiles yet.");
            }
            for (name, profile) in &profiles {
                println!(
                    "{}: {} · {} · topics: {}",
                    name,
                    profile.city,
                    profile.units.as_str(),
                    profile.topics.join(", ")
                );
            }
        }
        ProfileAction::Add {
            name,
            city,
            units,
            topics,
            tone,
            max_articles,
        } => {
            let profile = Profile {
                city,
                units: parse_units(&units)?,
                topics,
                briefing_tone: tone,
                max_articles_per_topic: max_articles,
            };
            store.create(&name, profile)?;
            println!("✓ Profile '{}' created", name);
        }
        ProfileAction::Remove { name } => {
            store.remove(&name)?;
            HistoryStore::in_dir(&config.data_dir)
                .forget(&name)
                .context("Profile removed, but its history could not be cleared")?;
            println!("✓ Profile '{}' deleted", name);
        }
    }

    Ok(())
}

fn history(config: &Config, profile: Option<String>, date: Option<NaiveDate>) -> Result<()> {
    let store = ProfileStore::in_dir(&config.data_dir);
    let (name, _) = choose_profile(&store, profile)?;
    let history = HistoryStore::in_dir(&config.data_dir);

    match date {
        Some(date) => {
            let entry = history
                .find(&name, date)?
                .ok_or_else(|| anyhow::anyhow!("No briefing for '{}' on {}", name, date))?;
            println!("📅 {} · Generated at {}\n", entry.date, entry.generated_at);
            println!("{}", entry.briefing);
        }
        None => {
            let entries = history.load(&name)?;
            if entries.is_empty() {
                println!("No past briefings for '{}'.", name);
            }
            for entry in entries {
                println!("  {}  (generated at {})", entry.date, entry.generated_at);
            }
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(stdio::stderr))
        .init();

    let args = Args::parse();
    let config = Config::from_env()?;

    match args.command {
        Command::Generate {
            profile,
            city,
            units,
            no_history,
        } => generate(&config, profile, city, &units, no_history).await,
        Command::Profiles { action } => profiles(&config, action),
        Command::History { profile, date } => history(&config, profile, date),
    }
}
