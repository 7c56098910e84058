//! Command-line surface of the `inkboard` binary.

use crate::app::{App, AppConfig};
use crate::diagram;
use crate::error::AppResult;
use crate::shortcuts::ShortcutRegistry;
use clap::{Parser, Subcommand};
use inkboard_core::templates::Template;
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(name = "inkboard", version, about = "Headless whiteboard canvas tools")]
pub struct Cli {
    /// JSON file with tool defaults (colors, stroke width, font).
    #[arg(long, global = true, env = "INKBOARD_TOOLS")]
    pub tools: Option<PathBuf>,

    /// JSON file with engine thresholds (history capacity, handle size).
    #[arg(long, global = true, env = "INKBOARD_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Render a saved board to PNG.
    Render {
        input: PathBuf,
        #[arg(short, long)]
        output: PathBuf,
        #[arg(long, default_value_t = 1280)]
        width: u32,
        #[arg(long, default_value_t = 800)]
        height: u32,
        /// TrueType/OpenType font for text elements.
        #[arg(long, env = "INKBOARD_FONT")]
        font: Option<PathBuf>,
        #[arg(long, default_value = "#ffffff")]
        background: String,
    },
    /// Lay out a flow diagram from text like "start -> check -> end".
    Generate {
        text: String,
        /// Board to append to.
        #[arg(short, long)]
        input: Option<PathBuf>,
        #[arg(short, long)]
        output: PathBuf,
    },
    /// Insert a built-in template (sticky-notes, flow).
    Template {
        name: Template,
        #[arg(short, long)]
        input: Option<PathBuf>,
        #[arg(short, long)]
        output: PathBuf,
    },
    /// List keyboard shortcuts.
    Shortcuts,
}

/// Execute a parsed command line.
pub fn run(cli: Cli) -> AppResult<()> {
    let mut config = AppConfig::default();
    if let Some(path) = &cli.tools {
        config.load_tools(path)?;
    }
    if let Some(path) = &cli.config {
        config.load_engine(path)?;
    }

    match cli.command {
        Command::Render {
            input,
            output,
            width,
            height,
            font,
            background,
        } => {
            config.width = width;
            config.height = height;
            config.font_path = font;
            config.set_background(&background)?;
            let mut app = App::new(config)?;
            app.open(&input)?;
            app.export_png(&output)
        }
        Command::Generate {
            text,
            input,
            output,
        } => {
            let mut app = open_or_new(config, input.as_deref())?;
            let ids = diagram::generate(app.board_mut(), &text);
            log::info!("Generated {} diagram elements", ids.len());
            app.save(&output)
        }
        Command::Template {
            name,
            input,
            output,
        } => {
            let mut app = open_or_new(config, input.as_deref())?;
            app.board_mut().insert_template(name);
            app.save(&output)
        }
        Command::Shortcuts => {
            ShortcutRegistry::print_all();
            Ok(())
        }
    }
}

fn open_or_new(config: AppConfig, input: Option<&Path>) -> AppResult<App> {
    let mut app = App::new(config)?;
    if let Some(path) = input {
        app.open(path)?;
    }
    Ok(app)
}
