use anyhow::{Context, Result};
use simplelog::{ColorChoice, TermLogger, TerminalMode};
use std::env;
use std::io::Read;
use std::path::Path;
use strum::IntoEnumIterator;
use wayfare::cli::{self, CliArgs, Command};
use wayfare::config::Config;
use wayfare::context::StandardContext;
use wayfare::model::{ActivityCategory, ItineraryDisplay, ParsedItinerary, StructuredItinerary};
use wayfare::planner::{RawItinerary, ResponseFormat, TripRequest, build_prompt};
use wayfare::store::{self, LocalStore};

fn main() -> Result<()> {
    let mut args = env::args();
    let binary_name = args.next().unwrap_or_else(|| "wayfare".to_string());
    let binary_name = Path::new(&binary_name)
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| "wayfare".to_string());

    let CliArgs {
        root,
        verbose,
        command,
    } = match cli::parse_args(args) {
        Ok(parsed) => parsed,
        Err(msg) => {
            eprintln!("Error: {}", msg);
            eprintln!("Run '{} --help' for usage.", binary_name);
            std::process::exit(2);
        }
    };

    let ctx = StandardContext::new(root);
    let config = Config::load_or_default(&ctx)?;

    let level = if verbose {
        log::LevelFilter::Debug
    } else {
        config.log_level_filter()
    };
    // Another logger may already be installed when embedded; that's fine.
    let _ = TermLogger::init(
        level,
        simplelog::Config::default(),
        TerminalMode::Stderr,
        ColorChoice::Auto,
    );

    let rules = config.category_rules();

    match command {
        Command::Help => cli::print_help(&binary_name),
        Command::Parse { input, json } => {
            let text = read_input(input.as_deref())?;
            print_itinerary(&wayfare::model::parse_with_rules(&text, &rules), json)?;
        }
        Command::ImportJson { input, json } => {
            let text = read_input(input.as_deref())?;
            let structured = StructuredItinerary::from_json(&text)?;
            print_itinerary(&structured.to_parsed(&rules), json)?;
        }
        Command::Prompt {
            locations,
            days,
            interests,
            structured,
        } => {
            let request = TripRequest::new(
                locations,
                days.unwrap_or(config.default_duration),
                interests,
            );
            request.validate(config.max_days)?;
            let format = if structured {
                ResponseFormat::Structured
            } else {
                config.response_format
            };
            println!("{}", build_prompt(&request, format));
        }
        Command::Save { user, name, input } => {
            let text = read_input(input.as_deref())?;
            if text.trim().is_empty() {
                anyhow::bail!("Nothing to save: input is empty");
            }
            let content = match StructuredItinerary::from_json(&text) {
                Ok(it) => RawItinerary::Structured(it),
                Err(_) => RawItinerary::Text(text),
            };
            let uid = user.unwrap_or_else(|| config.default_user.clone());
            let store = LocalStore::open(&ctx)?;
            let id = store::save_raw_itinerary(&store, &uid, &name, content)?;
            println!("{}", id);
        }
        Command::List { user } => {
            let uid = user.unwrap_or_else(|| config.default_user.clone());
            let store = LocalStore::open(&ctx)?;
            for (id, saved) in store::list_itineraries(&store, &uid)? {
                let view = saved.content.view(&rules);
                println!(
                    "{}  {}  {}  ({} days)",
                    id,
                    saved.created_at.format("%Y-%m-%d %H:%M"),
                    saved.name,
                    view.days.len()
                );
            }
            for place in store::saved_places(&store, &uid)? {
                println!("saved  {:?}  {}  {}", place.kind, place.name, place.district);
            }
        }
        Command::Categories => {
            for rule in rules.rules() {
                println!("{:<14} {}", rule.category, rule.keywords.join(", "));
            }
            let unused: Vec<String> = ActivityCategory::iter()
                .filter(|c| *c != ActivityCategory::General)
                .filter(|c| !rules.rules().iter().any(|r| r.category == *c))
                .map(|c| c.to_string())
                .collect();
            if !unused.is_empty() {
                println!("(no rules for: {})", unused.join(", "));
            }
            println!("{:<14} (fallback)", ActivityCategory::General);
        }
    }
    Ok(())
}

fn read_input(path: Option<&Path>) -> Result<String> {
    match path {
        Some(p) => std::fs::read_to_string(p)
            .with_context(|| format!("Failed to read '{}'", p.display())),
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read stdin")?;
            Ok(buf)
        }
    }
}

fn print_itinerary(parsed: &ParsedItinerary, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(parsed)?);
    } else if parsed.is_empty() {
        println!("(no itinerary found)");
    } else {
        print!("{}", parsed.to_timeline_string());
    }
    Ok(())
}
