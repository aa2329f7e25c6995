// File: ./src/cli.rs
//! Shared command-line interface logic: argument handling and help text.

use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Help,
    /// Free-text itinerary from a file, or stdin when `None`.
    Parse { input: Option<PathBuf>, json: bool },
    /// Structured JSON itinerary from a file, or stdin.
    ImportJson { input: Option<PathBuf>, json: bool },
    Prompt {
        locations: String,
        days: Option<u32>,
        interests: String,
        structured: bool,
    },
    Save {
        user: Option<String>,
        name: String,
        input: Option<PathBuf>,
    },
    List { user: Option<String> },
    Categories,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CliArgs {
    pub root: Option<PathBuf>,
    pub verbose: bool,
    pub command: Command,
}

fn input_arg(value: Option<String>) -> Option<PathBuf> {
    value.filter(|v| v != "-").map(PathBuf::from)
}

/// Parses everything after the binary name.
pub fn parse_args<I: IntoIterator<Item = String>>(args: I) -> Result<CliArgs, String> {
    let mut root = None;
    let mut verbose = false;
    let mut json = false;
    let mut structured = false;
    let mut user = None;
    let mut name = None;
    let mut locations = None;
    let mut interests = None;
    let mut days = None;
    let mut positional: Vec<String> = Vec::new();

    let mut iter = args.into_iter();
    while let Some(arg) = iter.next() {
        let mut value_for = |flag: &str| -> Result<String, String> {
            iter.next()
                .ok_or_else(|| format!("Missing value for {}", flag))
        };
        match arg.as_str() {
            "-h" | "--help" => {
                return Ok(CliArgs {
                    root,
                    verbose,
                    command: Command::Help,
                });
            }
            "-r" | "--root" => root = Some(PathBuf::from(value_for(&arg)?)),
            "-v" | "--verbose" => verbose = true,
            "--json" => json = true,
            "--structured" => structured = true,
            "--user" => user = Some(value_for(&arg)?),
            "--name" => name = Some(value_for(&arg)?),
            "--locations" => locations = Some(value_for(&arg)?),
            "--interests" => interests = Some(value_for(&arg)?),
            "--days" => {
                let raw = value_for(&arg)?;
                days = Some(
                    raw.parse::<u32>()
                        .map_err(|_| format!("Invalid number of days: '{}'", raw))?,
                );
            }
            flag if flag.starts_with("--") => return Err(format!("Unknown option: {}", flag)),
            _ => positional.push(arg),
        }
    }

    let mut positional = positional.into_iter();
    let command = match positional.next().as_deref() {
        None | Some("help") => Command::Help,
        Some("parse") => Command::Parse {
            input: input_arg(positional.next()),
            json,
        },
        Some("import-json") => Command::ImportJson {
            input: input_arg(positional.next()),
            json,
        },
        Some("prompt") => Command::Prompt {
            locations: locations.ok_or("prompt requires --locations")?,
            days,
            interests: interests.ok_or("prompt requires --interests")?,
            structured,
        },
        Some("save") => Command::Save {
            user,
            name: name.ok_or("save requires --name")?,
            input: input_arg(positional.next()),
        },
        Some("list") => Command::List { user },
        Some("categories") => Command::Categories,
        Some(other) => return Err(format!("Unknown command: {}", other)),
    };

    if let Some(extra) = positional.next() {
        return Err(format!("Unexpected argument: {}", extra));
    }

    Ok(CliArgs {
        root,
        verbose,
        command,
    })
}

pub fn print_help(binary_name: &str) {
    println!(
        "Wayfare v{} - Day-by-day itineraries from AI travel plans",
        env!("CARGO_PKG_VERSION")
    );
    println!();
    println!("USAGE:");
    println!("    {} parse [FILE|-] [--json]", binary_name);
    println!("    {} import-json [FILE|-] [--json]", binary_name);
    println!(
        "    {} prompt --locations <places> --interests <text> [--days N] [--structured]",
        binary_name
    );
    println!("    {} save --name <name> [--user <uid>] [FILE|-]", binary_name);
    println!("    {} list [--user <uid>]", binary_name);
    println!("    {} categories", binary_name);
    println!();
    println!("OPTIONS:");
    println!("    -r, --root <path>     Use a different directory for config and data.");
    println!("    -v, --verbose         Log debug output to stderr.");
    println!("    --json                Print the parsed itinerary as JSON.");
    println!("    -h, --help            Show this help message.");
    println!();
    println!("TEXT FORMAT:");
    println!("    Lines before the first day heading form the overview.");
    println!("    Day 1: Arrival        Day heading (also '## Day 1', '**Day 1**', 'Day 1 - ...')");
    println!("    9:00 AM - Check in    Timed activity (HH:MM, optional AM/PM, then - or :)");
    println!("    Explore Fort Kochi    Untimed activity");
    println!();
    println!("EXAMPLES:");
    println!("    {} parse plan.md", binary_name);
    println!("    cat plan.md | {} parse --json", binary_name);
    println!(
        "    {} prompt --locations Munnar --days 3 --interests \"tea, hiking\"",
        binary_name
    );
    println!("    {} save --name \"Munnar - 3 days\" plan.md", binary_name);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(s: &[&str]) -> Vec<String> {
        s.iter().map(|a| a.to_string()).collect()
    }

    #[test]
    fn test_parse_command() {
        let a = parse_args(args(&["-v", "parse", "plan.md", "--json"])).unwrap();
        assert!(a.verbose);
        assert_eq!(
            a.command,
            Command::Parse {
                input: Some(PathBuf::from("plan.md")),
                json: true
            }
        );

        let stdin = parse_args(args(&["parse", "-"])).unwrap();
        assert_eq!(
            stdin.command,
            Command::Parse {
                input: None,
                json: false
            }
        );
    }

    #[test]
    fn test_prompt_requires_fields() {
        assert!(parse_args(args(&["prompt", "--locations", "Kochi"])).is_err());
        let a = parse_args(args(&[
            "prompt",
            "--locations",
            "Kochi",
            "--interests",
            "food",
            "--days",
            "2",
        ]))
        .unwrap();
        assert_eq!(
            a.command,
            Command::Prompt {
                locations: "Kochi".to_string(),
                days: Some(2),
                interests: "food".to_string(),
                structured: false
            }
        );
    }

    #[test]
    fn test_errors() {
        assert!(parse_args(args(&["--days", "two", "prompt"])).is_err());
        assert!(parse_args(args(&["frobnicate"])).is_err());
        assert!(parse_args(args(&["--root"])).is_err());
        assert!(parse_args(args(&["list", "extra"])).is_err());
        assert_eq!(parse_args(args(&[])).unwrap().command, Command::Help);
    }
}
