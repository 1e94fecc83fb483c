//! Guestlist CLI - bulk guest import from spreadsheets
//!
//! # Main Commands
//!
//! ```bash
//! guestlist serve                                   # Start HTTP server (port 3000)
//! guestlist import invitados.xlsx --wedding <id>    # Import valid guests
//! guestlist template --lang en -o guests.xlsx       # Write the example workbook
//! ```
//!
//! # Inspection Commands
//!
//! ```bash
//! guestlist preview invitados.xlsx                  # Show what would be imported
//! guestlist preview invitados.xlsx --json           # Same, as JSON rows
//! guestlist guests --wedding <id>                   # List a wedding's guests
//! ```

use clap::{Parser, Subcommand};
use guestlist::{
    parse_guest_file, write_template, GuestStore, ImportError, MemoryStore, ServerConfig,
    SupabaseClient, TemplateLanguage, WeddingState,
};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "guestlist")]
#[command(about = "Import wedding guests from Excel spreadsheets", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse a spreadsheet and show the preview without importing
    Preview {
        /// Input .xlsx / .xls file
        input: PathBuf,

        /// Print the rows as JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Parse a spreadsheet and insert its valid guests
    Import {
        /// Input .xlsx / .xls file
        input: PathBuf,

        /// Wedding the guests belong to
        #[arg(short, long)]
        wedding: String,

        /// Run against an in-memory store instead of the hosted one
        #[arg(long)]
        dry_run: bool,
    },

    /// Write the example workbook
    Template {
        /// Header language: es or en
        #[arg(short, long, default_value = "es")]
        lang: TemplateLanguage,

        /// Output file (default: the language's template file name)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// List the guests of a wedding
    Guests {
        /// Wedding id
        #[arg(short, long)]
        wedding: String,
    },

    /// Start HTTP server
    Serve {
        /// Port to listen on (default: GUESTLIST_PORT or 3000)
        #[arg(short, long)]
        port: Option<u16>,
    },
}

#[tokio::main]
async fn main() {
    // Load .env file (if present)
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Preview { input, json } => cmd_preview(&input, json),

        Commands::Import {
            input,
            wedding,
            dry_run,
        } => cmd_import(&input, &wedding, dry_run).await,

        Commands::Template { lang, output } => cmd_template(lang, output.as_deref()),

        Commands::Guests { wedding } => cmd_guests(&wedding).await,

        Commands::Serve { port } => cmd_serve(port).await,
    };

    if let Err(e) = result {
        eprintln!("❌ Error: {}", e);
        std::process::exit(1);
    }
}

fn cmd_preview(input: &Path, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    eprintln!("📄 Reading: {}", input.display());

    let preview = parse_guest_file(input)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&preview.rows())?);
    } else {
        println!("{}", preview.render_table());
    }

    if preview.invalid_count() > 0 {
        eprintln!(
            "⚠️  {} rows will be skipped on import",
            preview.invalid_count()
        );
    }
    Ok(())
}

async fn cmd_import(
    input: &Path,
    wedding: &str,
    dry_run: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    if dry_run {
        eprintln!("🧪 Dry run: nothing is sent to the hosted store");
        run_import(&MemoryStore::new(), input, wedding).await
    } else {
        let store = SupabaseClient::from_env()?;
        run_import(&store, input, wedding).await
    }
}

async fn run_import<S: GuestStore>(
    store: &S,
    input: &Path,
    wedding: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let file_name = input
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or_default()
        .to_string();

    let mut state = WeddingState::new(wedding);
    let mut session = state.open_import();

    eprintln!("📄 Processing: {}", input.display());
    let bytes = fs::read(input)?;
    let preview = session.load_file(&file_name, &bytes)?;
    eprintln!("{}", preview.render_table());

    if preview.valid_count() == 0 {
        return Err(ImportError::NoValidRecords.into());
    }

    let outcome = state.commit_import(&mut session, store).await?;
    eprintln!("\n✅ {}", outcome.message());
    if state.is_loaded() {
        eprintln!(
            "   {} guests on wedding {}",
            state.guests().len(),
            state.wedding_id()
        );
    }

    Ok(())
}

fn cmd_template(
    lang: TemplateLanguage,
    output: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let path = output
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from(lang.file_name()));

    write_template(lang, &path)?;
    eprintln!("💾 Template written to: {}", path.display());
    Ok(())
}

async fn cmd_guests(wedding: &str) -> Result<(), Box<dyn std::error::Error>> {
    let store = SupabaseClient::from_env()?;
    let mut state = WeddingState::new(wedding);
    state.refresh(&store).await?;

    if state.guests().is_empty() {
        eprintln!("📋 No guests yet for wedding {}", wedding);
        return Ok(());
    }

    eprintln!("📋 Guests ({}):\n", state.guests().len());
    for guest in state.guests() {
        let plus_one = match (guest.plus_one.unwrap_or(false), guest.plus_one_name.as_deref()) {
            (true, Some(name)) => format!(" +1 {}", name),
            (true, None) => " +1".to_string(),
            (false, _) => String::new(),
        };
        println!(
            "  {}{}  {}  {}",
            guest.full_name,
            plus_one,
            guest.email.as_deref().unwrap_or("-"),
            guest.table_assignment.as_deref().unwrap_or("-"),
        );
    }
    Ok(())
}

async fn cmd_serve(port: Option<u16>) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = ServerConfig::from_env()?;
    if let Some(port) = port {
        config.port = port;
    }
    guestlist::server::start_server(config).await?;
    Ok(())
}
