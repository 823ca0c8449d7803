//! uexbot - Star Citizen trading data from the UEX API
//!
//! Runs one bot command locally and prints its reply. Paged replies open a
//! small terminal pager; everything else is printed as text.

use std::io::{self, IsTerminal};
use std::panic;
use std::time::Duration;

use clap::Parser;
use crossterm::{
    event::{self, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing_subscriber::EnvFilter;

use uexbot::app::App;
use uexbot::bot::{Bot, Outcome};
use uexbot::cli::{Cli, Config};
use uexbot::commands::{Embed, PagedView, Reply};
use uexbot::ui;

/// Sets up a panic hook that restores the terminal before printing the panic message.
fn setup_panic_hook() {
    let original_hook = panic::take_hook();
    panic::set_hook(Box::new(move |panic_info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        original_hook(panic_info);
    }));
}

/// Logs go to stderr so they never mix with replies or the pager
fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();
}

fn print_embed(embed: &Embed) {
    if !embed.title.is_empty() {
        println!("{}", embed.title);
        println!("{}", "=".repeat(embed.title.chars().count()));
    }
    println!("{}", embed.description);
    if let Some(footer) = &embed.footer {
        println!();
        println!("{}", footer);
    }
}

/// Browses a paged reply until the user quits
fn run_pager(view: PagedView, user: u64) -> Result<(), Box<dyn std::error::Error>> {
    setup_panic_hook();

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(view, user);

    loop {
        app.tick();
        terminal.draw(|f| {
            ui::render_pager(f, &app);
            if app.show_help {
                ui::render_help_overlay(f);
            }
        })?;

        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                app.handle_key(key);
            }
        }

        if app.should_quit {
            break;
        }
    }

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;

    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // .env is optional
    let _ = dotenvy::dotenv();
    init_tracing();

    let cli = Cli::parse();
    let config = match Config::from_cli(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    let bot = Bot::from_config(&config)?;
    match bot.execute(&config.invocation, &cli.command).await {
        Outcome::Reply(Reply { embed, view, .. }) => match view {
            Some(view) if !config.plain && io::stdout().is_terminal() => {
                run_pager(view, config.invocation.user_id)?;
            }
            _ => print_embed(&embed),
        },
        Outcome::Suggestions(suggestions) => {
            for suggestion in suggestions {
                println!("{}\t{}", suggestion.value, suggestion.label);
            }
        }
        Outcome::Warmed(results) => {
            for (name, result) in results {
                match result {
                    Ok(rows) => println!("{}: {} rows", name, rows),
                    Err(e) => println!("{}: failed ({})", name, e),
                }
            }
        }
    }

    Ok(())
}
