mod commands;
mod output;

use clap::{Parser, Subcommand};
use simplelog::{ColorChoice, ConfigBuilder, LevelFilter, TermLogger, TerminalMode};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "storypage",
    version,
    about = "Extract story template payloads from PDF pages"
)]
struct Cli {
    /// Log debug details to stderr
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Only log errors
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Describe every page of a PDF and write page records and backgrounds
    Describe {
        /// Path to the PDF file
        pdf_file: PathBuf,

        /// Output directory for page records and background images
        #[arg(short = 'O', long = "out", value_name = "DIR")]
        out: PathBuf,

        /// Custom JSON font table (default: builtin table)
        #[arg(long = "fonts", value_name = "FILE")]
        fonts: Option<PathBuf>,

        /// Template record JSON to validate and write next to the pages
        #[arg(short, long, value_name = "FILE")]
        template: Option<PathBuf>,

        /// Text elements carried per page record
        #[arg(long, default_value_t = storypage_core::payload::DEFAULT_MAX_TEXT_ELEMENTS)]
        max_text_elements: usize,

        /// Story template id to put in every page record
        #[arg(long, value_name = "ID")]
        story_template_id: Option<i64>,
    },
    /// Print a layout summary of every page (text boxes, fonts, images)
    Inspect {
        /// Path to the PDF file
        pdf_file: PathBuf,

        /// Output format: table (default) or json
        #[arg(short, long, default_value = "table")]
        output: String,
    },
    /// Validate a template record file and print it as posted
    Template {
        /// Path to template JSON file
        file: PathBuf,
    },
    /// Manage and inspect font tables
    Fonts {
        #[command(subcommand)]
        action: FontsAction,
    },
}

#[derive(Subcommand)]
enum FontsAction {
    /// List the builtin font tables
    List,
    /// Validate a custom font table file
    Validate {
        /// Path to JSON font table
        file: PathBuf,
    },
}

fn init_logging(verbose: bool, quiet: bool) {
    let level = if verbose {
        LevelFilter::Debug
    } else if quiet {
        LevelFilter::Error
    } else {
        LevelFilter::Warn
    };
    let config = ConfigBuilder::new()
        .set_time_level(LevelFilter::Off)
        .set_target_level(LevelFilter::Off)
        .build();
    // Logging is best effort; a second init or a missing terminal is not fatal.
    let _ = TermLogger::init(level, config, TerminalMode::Stderr, ColorChoice::Auto);
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    let result = match cli.command {
        Commands::Describe {
            pdf_file,
            out,
            fonts,
            template,
            max_text_elements,
            story_template_id,
        } => commands::describe::run(commands::describe::DescribeArgs {
            pdf_file,
            out_dir: out,
            fonts,
            template,
            max_text_elements,
            story_template_id,
        }),
        Commands::Inspect { pdf_file, output } => commands::inspect::run(pdf_file, &output),
        Commands::Template { file } => commands::template::run(&file),
        Commands::Fonts { action } => match action {
            FontsAction::List => commands::fonts::list(),
            FontsAction::Validate { file } => commands::fonts::validate(&file),
        },
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
