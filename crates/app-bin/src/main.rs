// ============================
// crates/app-bin/src/main.rs
// ============================
//! Terminal front-end for the memoria lobby/feed core.
//!
//! One command per line, handled to completion before the next is read,
//! so the core sees the same single-threaded event sequence the original
//! screens produced.
use std::path::{Path, PathBuf};

use clap::Parser;
use memoria_app_lib::access::gate::AccessDecision;
use memoria_app_lib::config::Settings;
use memoria_app_lib::error::AppError;
use memoria_app_lib::feed::{FeedController, FeedRefresh, PickOutcome, RemoveOutcome};
use memoria_app_lib::storage::FlatFileStore;
use memoria_app_lib::AppState;
use memoria_common::PostRecord;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

/// Posts longer than this many words are previewed with a read-more hint.
const READ_MORE_WORDS: usize = 40;

#[derive(Parser)]
#[command(name = "memoria", about = "Shared-memories lobby and feed")]
struct Cli {
    /// Path to the configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Override the data directory
    #[arg(long)]
    data_dir: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize configuration
    let mut settings = match &cli.config {
        Some(path) => Settings::load_from(path)?,
        None => Settings::load()?,
    };
    if let Some(data_dir) = cli.data_dir {
        settings.data_dir = data_dir;
    }

    // Initialize tracing
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(settings.log_level.clone()));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let state = AppState::from_settings(settings)?;
    let mut feed = state.feed();

    // Restore the active lobby from the previous run, if any
    match feed.load_feed().await {
        Ok(FeedRefresh::Loaded(count)) => {
            if let Some(code) = feed.active_code() {
                println!("Restored lobby {code} ({count} posts).");
            }
        },
        Ok(FeedRefresh::NoSession) => {
            println!("Welcome! `generate` a new lobby code or `login <code>` to join one.");
        },
        Err(err) => eprintln!("{}", err.user_message()),
    }
    println!("Type `help` for commands.");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let (command, rest) = split_command(&line);
        match command {
            "" => {},
            "help" => print_help(),
            "generate" => handle_generate(&state).await,
            "login" => handle_login(&state, &mut feed, rest).await,
            "feed" => handle_reload(&mut feed).await,
            "show" => render_feed(&feed),
            "text" => {
                feed.set_draft_text(rest);
                println!("Draft text set.");
            },
            "pick" => handle_pick(&mut feed, rest).await,
            "post" => handle_post(&mut feed).await,
            "remove" => handle_remove(&mut feed, rest),
            "save" => handle_save(&feed, rest).await,
            "read" => handle_read(&feed, rest),
            "quit" | "exit" => break,
            other => println!("Unknown command: {other}. Type `help`."),
        }
    }

    Ok(())
}

fn print_help() {
    println!("  generate        create a new lobby code and make it active");
    println!("  login <code>    join an existing lobby");
    println!("  feed            reload the feed from the server");
    println!("  show            show the feed as currently loaded");
    println!("  text <words>    set the draft text for the next post");
    println!("  pick <path>     select an image for the next post");
    println!("  post            submit the draft");
    println!("  remove <uri>    clear the selection, or hide posts with that image");
    println!("  save <uri>      save an image to the gallery");
    println!("  read <n>        show the full text of post n");
    println!("  quit            leave");
}

async fn handle_generate(state: &AppState<FlatFileStore>) {
    match state.code_issuer().issue().await {
        Ok(issued) => {
            println!("Generated code: {}", issued.code);
            if !issued.registered {
                println!("Could not register the code with the server.");
            }
            println!("It is now your active lobby; `feed` to enter it.");
        },
        Err(err) => eprintln!("{}", err.user_message()),
    }
}

async fn handle_login(
    state: &AppState<FlatFileStore>,
    feed: &mut FeedController<FlatFileStore>,
    code: &str,
) {
    match state.gate().validate_code(&code.into()).await {
        Ok(AccessDecision::Granted) => {
            println!("Valid code! Entering the lobby...");
            handle_reload(feed).await;
        },
        Ok(AccessDecision::Denied) => println!("{}", AppError::CodeNotFound.user_message()),
        Err(err) => eprintln!("{}", err.user_message()),
    }
}

async fn handle_reload(feed: &mut FeedController<FlatFileStore>) {
    match feed.load_feed().await {
        Ok(FeedRefresh::Loaded(_)) => render_feed(feed),
        Ok(FeedRefresh::NoSession) => {
            println!("No active lobby. `generate` a code or `login <code>` first.");
        },
        Err(err) => eprintln!("{}", err.user_message()),
    }
}

async fn handle_pick(feed: &mut FeedController<FlatFileStore>, path: &str) {
    if path.is_empty() {
        println!("Pick cancelled.");
        return;
    }
    match feed.pick_image(Path::new(path)).await {
        Ok(PickOutcome::Picked(uri)) => println!("Image selected: {uri}"),
        Ok(PickOutcome::Cancelled) => println!("Pick cancelled."),
        Err(err) => eprintln!("{}", err.user_message()),
    }
}

async fn handle_post(feed: &mut FeedController<FlatFileStore>) {
    match feed.submit_post().await {
        Ok(()) => println!("Posted! It will appear on the next `feed`."),
        Err(err) => eprintln!("{}", err.user_message()),
    }
}

fn handle_remove(feed: &mut FeedController<FlatFileStore>, uri: &str) {
    match feed.remove_post(uri) {
        RemoveOutcome::ClearedSelection => println!("Image selection cleared."),
        RemoveOutcome::RemovedFromFeed(count) => println!("{count} post(s) hidden from this feed."),
    }
}

async fn handle_save(feed: &FeedController<FlatFileStore>, uri: &str) {
    // With no argument, save the pending selection
    let target = if uri.is_empty() {
        match feed.selected_image() {
            Some(selected) => selected.to_owned(),
            None => {
                println!("Nothing selected; `save <uri>` to save a posted image.");
                return;
            },
        }
    } else {
        uri.to_owned()
    };

    match feed.export_image(&target).await {
        Ok(()) => println!("Image saved to the gallery!"),
        Err(err) => eprintln!("{}", err.user_message()),
    }
}

fn handle_read(feed: &FeedController<FlatFileStore>, index: &str) {
    let Ok(index) = index.parse::<usize>() else {
        println!("`read <n>` with a post number from `show`.");
        return;
    };
    match feed.posts().get(index) {
        Some(post) => match &post.text {
            Some(text) => println!("{text}"),
            None => println!("Post {index} has no text."),
        },
        None => println!("No post {index}."),
    }
}

fn render_feed(feed: &FeedController<FlatFileStore>) {
    if let Some(uri) = feed.selected_image() {
        println!("[selected image: {uri}]");
    }

    if feed.posts().is_empty() {
        println!("No posts yet. Share a memory!");
        return;
    }

    for (index, post) in feed.posts().iter().enumerate() {
        render_post(index, post);
    }
}

fn render_post(index: usize, post: &PostRecord) {
    println!("--- post {index} ({})", post.created_at.format("%Y-%m-%d %H:%M"));
    if let Some(uri) = &post.image_uri {
        println!("  [image: {uri}]");
    }
    if let Some(text) = &post.text {
        let (shown, truncated) = preview(text, READ_MORE_WORDS);
        println!("  {shown}");
        if truncated {
            println!("  (`read {index}` for the rest)");
        }
    }
}

/// Truncate `text` to `max_words` words; the flag reports whether
/// anything was cut.
fn preview(text: &str, max_words: usize) -> (String, bool) {
    let words: Vec<&str> = text.split_whitespace().collect();
    if words.len() <= max_words {
        (text.to_owned(), false)
    } else {
        (format!("{} …", words[..max_words].join(" ")), true)
    }
}

fn split_command(line: &str) -> (&str, &str) {
    let line = line.trim();
    match line.split_once(char::is_whitespace) {
        Some((command, rest)) => (command, rest.trim()),
        None => (line, ""),
    }
}
