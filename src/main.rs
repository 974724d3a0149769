use anyhow::Context;
use chopped::chef::{default_roster, ChefProvider};
use chopped::game::state::RoundStatus;
use chopped::game::GameEngine;
use chopped::gateway::{GatewayClient, GatewayConfig};
use chopped::ingredients::{get_ingredients, get_random_basket};
use chopped::prompts::CourseType;
use clap::{Parser, Subcommand};
use std::io::Write as _;
use std::sync::Arc;
use tracing::{debug, error};

/// Run AI-driven Chopped-style cooking competitions from the terminal
#[derive(Parser)]
#[command(name = "chopped")]
#[command(about = "Chopped AI - four chefs, one basket, one winner", long_about = None)]
struct Cli {
    /// Enable verbose output (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run an interactive competition as the operator
    Play {
        /// AI gateway API key
        #[arg(long, env = "AI_GATEWAY_API_KEY", hide_env_values = true)]
        api_key: Option<String>,

        /// Override the gateway base URL
        #[arg(long, env = "CHOPPED_GATEWAY_URL")]
        gateway_url: Option<String>,

        /// Disable provider personas in dish prompts
        #[arg(long)]
        no_personas: bool,

        /// Skip the pre-round name/bio/portrait generation
        #[arg(long)]
        skip_intros: bool,
    },
    /// Print the default chef roster and model table
    Roster,
    /// List catalog ingredients for a course
    Ingredients {
        /// Course type: appetizer, entree, dessert or mystery
        #[arg(long, default_value = "appetizer")]
        course: String,

        /// Show first-appearance season/episode details
        #[arg(long)]
        details: bool,
    },
    /// Draw one random basket for a course
    Basket {
        /// Course type: appetizer, entree, dessert or mystery
        #[arg(long, default_value = "appetizer")]
        course: String,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let log_level = match cli.verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(log_level)
        .with_target(cli.verbose >= 2)
        .init();

    debug!("chopped started with verbosity level: {}", cli.verbose);

    let result = match cli.command {
        Commands::Play {
            api_key,
            gateway_url,
            no_personas,
            skip_intros,
        } => run_play(api_key, gateway_url, no_personas, skip_intros).await,
        Commands::Roster => run_roster(),
        Commands::Ingredients { course, details } => run_ingredients(&course, details),
        Commands::Basket { course } => run_basket(&course),
    };

    if let Err(e) = result {
        error!("Fatal error: {}", e);
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn parse_course(raw: &str) -> anyhow::Result<CourseType> {
    match raw.to_ascii_lowercase().as_str() {
        "appetizer" => Ok(CourseType::Appetizer),
        "entree" => Ok(CourseType::Entree),
        "dessert" => Ok(CourseType::Dessert),
        "mystery" => Ok(CourseType::Mystery),
        other => anyhow::bail!("unknown course type: {other}"),
    }
}

fn parse_provider(raw: &str) -> Option<ChefProvider> {
    ChefProvider::all()
        .into_iter()
        .find(|p| p.as_str() == raw.trim().to_ascii_lowercase())
}

fn read_line(prompt: &str) -> anyhow::Result<String> {
    print!("{prompt}");
    std::io::stdout().flush()?;
    let mut line = String::new();
    std::io::stdin().read_line(&mut line)?;
    Ok(line.trim().to_string())
}

fn run_roster() -> anyhow::Result<()> {
    println!("{:<12} {:<12} {:<36} {}", "id", "name", "model", "image model");
    for chef in default_roster() {
        println!(
            "{:<12} {:<12} {:<36} {}",
            chef.id, chef.name, chef.model_id, chef.image_model_id
        );
    }
    Ok(())
}

fn run_ingredients(course: &str, details: bool) -> anyhow::Result<()> {
    let course = parse_course(course)?;
    for option in get_ingredients(course, details) {
        println!("{}", option.label);
    }
    Ok(())
}

fn run_basket(course: &str) -> anyhow::Result<()> {
    let course = parse_course(course)?;
    let basket = get_random_basket(course)?;
    println!("{}", basket.labels().join(" \u{2022} "));
    Ok(())
}

async fn run_play(
    api_key: Option<String>,
    gateway_url: Option<String>,
    no_personas: bool,
    skip_intros: bool,
) -> anyhow::Result<()> {
    let mut config = GatewayConfig {
        api_key: api_key.unwrap_or_default(),
        ..GatewayConfig::default()
    };
    if let Some(url) = gateway_url {
        config.base_url = url;
    }
    let client = GatewayClient::new(config).context("failed to build gateway client")?;
    let mut engine = GameEngine::new(Arc::new(client), default_roster(), !no_personas);

    println!("== CHOPPED AI ==");

    if !skip_intros {
        println!("Introducing the chefs...");
        engine.generate_intros()?;
        engine.run_intros().await;
        for chef in engine.chefs() {
            let bio = chef.bio.as_deref().unwrap_or("");
            println!("  {} ({}): {}", chef.name, chef.id, bio);
        }
    }

    while engine.state().status != RoundStatus::Completed {
        let upcoming = engine.state().round_number + 1;
        let course = CourseType::for_round(upcoming);
        println!("\n-- Round {upcoming}: {course} --");

        let input = read_line("Enter 4 ingredients (comma-separated) or press Enter to randomize: ")?;
        let labels: Vec<String> = if input.is_empty() {
            let basket = get_random_basket(course)?;
            println!("Basket: {}", basket.labels().join(" \u{2022} "));
            basket.labels().to_vec()
        } else {
            input.split(',').map(|s| s.trim().to_string()).collect()
        };

        if let Err(e) = engine.submit_basket(labels) {
            eprintln!("{e}");
            continue;
        }

        println!("The chefs are cooking...");
        engine.run_round().await;

        for id in engine.state().active.clone() {
            let name = engine.chef(id).map(|c| c.name.clone()).unwrap_or_default();
            match engine.state().dishes.get(&id) {
                Some(dish) => {
                    let photo = if dish.image_ref.is_some() {
                        "[photo]"
                    } else {
                        "[no photo]"
                    };
                    println!("\n{name} ({id}) presents: {} {photo}", dish.title);
                    println!("  {}", dish.narrative);
                }
                None => println!("\n{name} ({id}) failed to plate a dish."),
            }
        }

        loop {
            let raw = read_line("\nWho gets CHOPPED? ")?;
            let Some(target) = parse_provider(&raw) else {
                eprintln!("pick one of: openai, anthropic, google, xai");
                continue;
            };
            match engine.eliminate(target) {
                Ok(()) => break,
                Err(e) => eprintln!("{e}"),
            }
        }
    }

    if let Some(winner) = engine.winner() {
        let name = engine
            .chef(winner)
            .map(|c| c.name.clone())
            .unwrap_or_else(|| winner.to_string());
        println!("\n{name} wins the competition!");
    }
    Ok(())
}
