//! Interactive browsing session.

use console::style;
use tokio::io::{AsyncBufReadExt, BufReader};

use anidex::preferences::{JsonFileStore, PreferenceStore, Rating};
use anidex::session::PageChange;

use super::AppContext;
use crate::cli::helpers::{
    print_details, print_error, print_page, print_recommendations, spawn_navigation_indicator,
};

const HELP: &str = "\
  /<text>   search (empty `/` shows the top listing)
  n, p      next / previous page
  g <n>     go to page n
  o <id>    open a title
  r <id>    recommendations for a title
  l <id>    like a title from the current page
  d <id>    dislike a title from the current page
  q         quit";

/// A parsed input line.
#[derive(Debug, PartialEq, Eq)]
enum Action {
    Search(String),
    Next,
    Previous,
    Goto(u32),
    Open(u64),
    Recommend(u64),
    Like(u64),
    Dislike(u64),
    Help,
    Quit,
    Unknown,
}

fn parse_action(line: &str) -> Action {
    let line = line.trim();
    if let Some(query) = line.strip_prefix('/') {
        return Action::Search(query.trim().to_string());
    }

    let mut parts = line.split_whitespace();
    let cmd = parts.next().unwrap_or("");
    let arg = parts.next();
    let id = arg.and_then(|a| a.parse::<u64>().ok());

    match (cmd, id) {
        ("n", _) => Action::Next,
        ("p", _) => Action::Previous,
        ("g", Some(page)) => u32::try_from(page).map(Action::Goto).unwrap_or(Action::Unknown),
        ("o", Some(id)) => Action::Open(id),
        ("r", Some(id)) => Action::Recommend(id),
        ("l", Some(id)) => Action::Like(id),
        ("d", Some(id)) => Action::Dislike(id),
        ("?" | "h" | "help", _) => Action::Help,
        ("q" | "quit" | "exit", _) => Action::Quit,
        _ => Action::Unknown,
    }
}

/// Rate a title from the page currently shown.
async fn rate_from_page(
    ctx: &AppContext,
    prefs: &mut PreferenceStore<JsonFileStore>,
    id: u64,
    rating: Rating,
) -> anyhow::Result<()> {
    let state = ctx.session.state().await;
    let found = state
        .search_results
        .as_ref()
        .and_then(|p| p.data.iter().find(|a| a.mal_id == id))
        .cloned();

    match found {
        Some(anime) if prefs.is_rated(id) => {
            println!("{} {} is already rated", style("!").yellow(), anime.title);
        }
        Some(anime) => {
            let title = anime.display_title().to_string();
            prefs.rate(anime, rating)?;
            println!("{} {:?}: {}", style("✓").green(), rating, title);
        }
        None => println!("{} {} is not on this page", style("!").yellow(), id),
    }
    Ok(())
}

async fn show_results(ctx: &AppContext) {
    let state = ctx.session.state().await;
    if ctx.session.special_chars_sanitized().await {
        println!(
            "{} Special characters were removed from your search",
            style("!").yellow()
        );
    }
    if print_error(&state) {
        return;
    }
    if let Some(results) = &state.search_results {
        print_page(results, state.current_page);
    }
}

pub async fn cmd_browse(ctx: &AppContext, initial_query: Option<String>) -> anyhow::Result<()> {
    let session = &ctx.session;
    let _indicator = spawn_navigation_indicator(session.throttle());
    let mut prefs = ctx.preferences();

    session
        .submit_query(initial_query.as_deref().unwrap_or(""))
        .await;
    show_results(ctx).await;
    println!("{}", style("Type ? for commands").dim());

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        match parse_action(&line) {
            Action::Search(query) => {
                session.store().set_current_page(1).await;
                session.submit_query(&query).await;
                show_results(ctx).await;
            }
            action @ (Action::Next | Action::Previous | Action::Goto(_)) => {
                let current = session.state().await.current_page;
                let target = match action {
                    Action::Next => current + 1,
                    Action::Previous => current.saturating_sub(1).max(1),
                    Action::Goto(page) => page.max(1),
                    _ => current,
                };
                match session.change_page(target).await {
                    PageChange::Changed => show_results(ctx).await,
                    PageChange::Unchanged => println!("{}", style("Already there").dim()),
                    PageChange::Busy => println!("{}", style("Still loading, try again").dim()),
                }
            }
            Action::Open(id) => {
                session.open_details(id).await;
                let state = session.state().await;
                if !print_error(&state) {
                    if let Some(anime) = &state.anime_details {
                        print_details(anime);
                    }
                }
            }
            Action::Recommend(id) => {
                session.load_recommendations(id).await;
                let state = session.state().await;
                if !print_error(&state) {
                    print_recommendations(&state.recommendations);
                }
            }
            Action::Like(id) => rate_from_page(ctx, &mut prefs, id, Rating::Liked).await?,
            Action::Dislike(id) => rate_from_page(ctx, &mut prefs, id, Rating::Disliked).await?,
            Action::Help => println!("{}", HELP),
            Action::Quit => break,
            Action::Unknown => println!("{}", style("Unknown command, ? for help").dim()),
        }
    }

    Ok(())
}
