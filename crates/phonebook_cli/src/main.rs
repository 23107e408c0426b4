//! `phonebook` command-line entry point.
//!
//! # Responsibility
//! - Resolve configuration once, start logging, open the selected store.
//! - Map subcommands onto `CharacterService` operations.

use clap::{Parser, Subcommand};
use log::error;
use phonebook_core::logging::{LOG_DIR_ENV, LOG_LEVEL_ENV};
use phonebook_core::{
    default_log_level, init_logging, open_store, Character, CharacterService, CharacterStore,
    NewCharacter, StorageConfig,
};
use std::collections::BTreeSet;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "phonebook")]
#[command(about = "NPC phonebook and GM notes pad", version)]
struct Cli {
    /// Log level (trace|debug|info|warn|error)
    #[arg(long, env = LOG_LEVEL_ENV)]
    log_level: Option<String>,
    /// Absolute directory for rolling log files
    #[arg(long, env = LOG_DIR_ENV)]
    log_dir: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Add a character
    Add {
        name: String,
        role: String,
        bio: String,
        /// Image filename shown on the profile
        #[arg(long)]
        image: Option<String>,
    },
    /// List characters
    List {
        /// Only characters visible to players
        #[arg(long)]
        available: bool,
    },
    /// Show one character
    Show { id: String },
    /// Make exactly the given characters available; everyone else is hidden
    Toggle { ids: Vec<String> },
    /// Change availability of one character
    Mark {
        id: String,
        #[arg(long, conflicts_with = "unavailable", required_unless_present = "unavailable")]
        available: bool,
        #[arg(long)]
        unavailable: bool,
    },
    /// Print GM notes
    Notes,
    /// Overwrite GM notes
    SaveNotes {
        #[arg(long, default_value = "")]
        hooks: String,
        #[arg(long, default_value = "")]
        previous_session: String,
        #[arg(long, default_value = "")]
        misc: String,
    },
    /// Create the default town roster in an empty store
    Seed,
}

fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("event=cli_exit module=cli status=error error={err}");
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let cwd = std::env::current_dir()?;
    let log_dir = match cli.log_dir {
        Some(dir) if dir.is_absolute() => dir,
        Some(dir) => cwd.join(dir),
        None => cwd.join("logs"),
    };
    let log_level = cli.log_level.as_deref().unwrap_or(default_log_level());
    init_logging(log_level, &log_dir)?;

    let config = StorageConfig::from_env()?;
    let service = CharacterService::new(open_store(&config)?);

    match cli.command {
        Commands::Add {
            name,
            role,
            bio,
            image,
        } => {
            let mut input = NewCharacter::new(name, role, bio);
            input.image = image;
            let character = service.create_character_with(input)?;
            println!("added {}", character.id);
        }
        Commands::List { available } => {
            let characters = if available {
                service.list_available_characters()?
            } else {
                service.list_characters()?
            };
            if characters.is_empty() {
                println!("No characters found.");
            }
            for character in &characters {
                print_row(character);
            }
        }
        Commands::Show { id } => {
            let character = service.get_character(&id)?;
            println!("id:        {}", character.id);
            println!("name:      {}", character.name);
            println!("role:      {}", character.role);
            println!("image:     {}", character.image);
            println!("available: {}", character.available);
            println!();
            println!("{}", character.bio);
        }
        Commands::Toggle { ids } => {
            let available_ids = ids.into_iter().collect::<BTreeSet<_>>();
            service.update_availability(&available_ids)?;
            print_available(&service)?;
        }
        Commands::Mark {
            id,
            available,
            unavailable: _,
        } => {
            if available {
                service.mark_available(&id)?;
            } else {
                service.mark_unavailable(&id)?;
            }
            print_available(&service)?;
        }
        Commands::Notes => {
            let notes = service.load_notes()?;
            println!("# Hooks\n{}\n", notes.hooks);
            println!("# Previous session\n{}\n", notes.previous_session);
            println!("# Misc\n{}", notes.misc);
        }
        Commands::SaveNotes {
            hooks,
            previous_session,
            misc,
        } => {
            service.save_notes(hooks, previous_session, misc)?;
            println!("notes saved");
        }
        Commands::Seed => {
            let created = service.seed_roster()?;
            println!("seeded {created} characters");
        }
    }

    Ok(())
}

fn print_row(character: &Character) {
    let marker = if character.available { "*" } else { " " };
    println!(
        "{marker} {:<28} {:<28} {}",
        character.id, character.name, character.role
    );
}

fn print_available<S: CharacterStore>(
    service: &CharacterService<S>,
) -> Result<(), Box<dyn std::error::Error>> {
    let available = service.list_available_characters()?;
    println!("{} available", available.len());
    for character in &available {
        print_row(character);
    }
    Ok(())
}
