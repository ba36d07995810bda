use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use clap::{ArgGroup, CommandFactory, Parser};
use log::{error, info, warn};
use simplelog::{ConfigBuilder, LevelFilter, WriteLogger};

use mtgtool::core::config::{self, CliOverrides, ResolvedConfig};
use mtgtool::core::deck::{DeckError, ParsedDeck, parse_deck_file};
use mtgtool::core::prefetch::{DescriptionCache, Prefetcher};
use mtgtool::core::repository::CardRepository;
use mtgtool::core::store::JsonCardStore;
use mtgtool::core::template::Template;
use mtgtool::tui;

const EXIT_FAILURE: u8 = 1;
const EXIT_CONFIG: u8 = 2;

#[derive(Parser)]
#[command(name = "mtgtool", about = "Magic: The Gathering card lookup and deck browser")]
#[command(group(ArgGroup::new("mode").args(["card", "translation", "deck", "test_parser"])))]
struct Args {
    /// (Original English) name of a card to show
    #[arg(short = 'c', value_name = "NAME")]
    card: Option<String>,

    /// Set code selecting one printing of the -c card
    #[arg(short = 'p', value_name = "SET", requires = "card")]
    set: Option<String>,

    /// Translated name of a card to find the English name for
    #[arg(short = 't', value_name = "NAME")]
    translation: Option<String>,

    /// Deck file to browse
    #[arg(short = 'd', value_name = "FILE")]
    deck: Option<PathBuf>,

    /// Run a deck file through the parser and print the entries
    #[arg(long = "test-parser", value_name = "FILE")]
    test_parser: Option<PathBuf>,

    /// Suppress informational notes
    #[arg(short, long)]
    quiet: bool,

    /// Card data file (MTGJSON AllSets-x.json)
    #[arg(long, value_name = "PATH")]
    data: Option<PathBuf>,

    /// Description template file
    #[arg(long, value_name = "PATH")]
    template_file: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    dotenv::dotenv().ok();
    init_logging();

    info!("mtgtool starting up");

    let config = match config::load_config() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{e}");
            return ExitCode::from(EXIT_CONFIG);
        }
    };
    let cli = CliOverrides {
        quiet: args.quiet,
        data: args.data.clone(),
        template_file: args.template_file.clone(),
    };
    let resolved = match config::resolve(&config, &cli) {
        Ok(resolved) => resolved,
        Err(e) => {
            eprintln!("{e}");
            return ExitCode::from(EXIT_CONFIG);
        }
    };

    // A bad template is fatal before any card data is touched
    let template = match Template::parse(&resolved.template_text) {
        Ok(template) => template,
        Err(e) => {
            error!("Template rejected: {}", e);
            eprintln!("Template error: {e}");
            return ExitCode::from(EXIT_CONFIG);
        }
    };
    info!("Template validated ({} fields)", template.fields().count());

    if let Some(path) = &args.test_parser {
        return test_parser(path);
    }

    let needs_store = args.card.is_some() || args.translation.is_some() || args.deck.is_some();
    if !needs_store {
        if let Err(e) = Args::command().print_help() {
            warn!("Failed to print help: {}", e);
        }
        return ExitCode::SUCCESS;
    }

    // Parse the deck before loading the (large) card data
    let deck = match &args.deck {
        Some(path) => match read_deck(path) {
            Ok(deck) => Some(deck),
            Err(code) => return code,
        },
        None => None,
    };

    let store = match JsonCardStore::load(&resolved.data_path) {
        Ok(store) => store,
        Err(e) => {
            error!("Card data unavailable: {}", e);
            eprintln!("{e}");
            return ExitCode::from(EXIT_FAILURE);
        }
    };
    let repository = Arc::new(CardRepository::new(Arc::new(store), template, resolved.quiet));

    if let Some(deck) = deck {
        return browse(repository, deck, &resolved).await;
    }
    if let Some(name) = &args.translation {
        return translate(&repository, name);
    }
    match &args.card {
        Some(name) => lookup(&repository, name, args.set.as_deref()),
        None => ExitCode::SUCCESS,
    }
}

/// Log to `~/.mtgtool/mtgtool.log`; the TUI owns the terminal.
fn init_logging() {
    let log_config = ConfigBuilder::new().set_time_format_rfc3339().build();

    let Some(dir) = config::data_dir() else {
        return;
    };
    if fs::create_dir_all(&dir).is_err() {
        return;
    }
    if let Ok(log_file) = File::create(dir.join("mtgtool.log")) {
        let _ = WriteLogger::init(LevelFilter::Debug, log_config, log_file);
    }
}

fn lookup(repository: &CardRepository, name: &str, set: Option<&str>) -> ExitCode {
    let session = match repository.open() {
        Ok(session) => session,
        Err(e) => {
            eprintln!("{e}");
            return ExitCode::from(EXIT_FAILURE);
        }
    };
    match session.resolve(name, set) {
        Ok(description) => {
            println!("{description}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("{e}");
            ExitCode::from(EXIT_FAILURE)
        }
    }
}

fn translate(repository: &CardRepository, foreign_name: &str) -> ExitCode {
    let translations = match repository.open().and_then(|s| s.translate(foreign_name)) {
        Ok(translations) => translations,
        Err(e) => {
            eprintln!("{e}");
            return ExitCode::from(EXIT_FAILURE);
        }
    };
    if translations.is_empty() {
        eprintln!("Found no card translated to: {foreign_name}");
        return ExitCode::from(EXIT_FAILURE);
    }
    for t in translations {
        println!("'{foreign_name}' is the {} name for: {}", t.language, t.name);
    }
    ExitCode::SUCCESS
}

fn read_deck(path: &Path) -> Result<ParsedDeck, ExitCode> {
    parse_deck_file(path).map_err(|e| {
        match e {
            DeckError::Io(ref io_error) if io_error.kind() == io::ErrorKind::NotFound => {
                eprintln!("No deck file: {}", path.display());
            }
            e => eprintln!("{e}"),
        }
        ExitCode::from(EXIT_FAILURE)
    })
}

fn test_parser(path: &Path) -> ExitCode {
    match read_deck(path) {
        Ok(deck) => {
            info!("{} parsed as {} format", path.display(), deck.format);
            for entry in &deck.entries {
                println!("{} {} {}", entry.is_sideboard, entry.count, entry.name);
            }
            ExitCode::SUCCESS
        }
        Err(code) => code,
    }
}

async fn browse(
    repository: Arc<CardRepository>,
    deck: ParsedDeck,
    config: &ResolvedConfig,
) -> ExitCode {
    let entries = deck.display_order();
    let names = entries.iter().map(|e| e.name.clone()).collect();
    let cache = DescriptionCache::new();
    let prefetcher = Prefetcher::spawn(repository.clone(), names, cache.clone());

    let result = tui::run(
        &repository,
        entries,
        deck.has_sideboard,
        cache,
        config.list_width,
    );

    // The worker stops before its next lookup and closes its session
    prefetcher.cancel();
    match prefetcher.join().await {
        Ok(report) => info!("Prefetch stopped: {:?}", report),
        Err(e) => warn!("Prefetch failed: {}", e),
    }

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Browser failed: {}", e);
            eprintln!("{e}");
            ExitCode::from(EXIT_FAILURE)
        }
    }
}
