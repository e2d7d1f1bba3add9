//! One-shot catalog commands.

use console::style;

use super::AppContext;
use crate::cli::helpers::{
    print_details, print_error, print_page, print_recommendations, spawn_navigation_indicator,
};

/// Search and print one page of results.
pub async fn cmd_search(ctx: &AppContext, query: &str, page: u32) -> anyhow::Result<()> {
    let session = &ctx.session;
    session.store().set_current_page(page).await;
    session.submit_query(query).await;

    let state = session.state().await;
    if session.special_chars_sanitized().await {
        println!(
            "{} Special characters were removed from your search",
            style("!").yellow()
        );
    }
    if print_error(&state) {
        anyhow::bail!("search failed");
    }
    if let Some(results) = &state.search_results {
        print_page(results, state.current_page);
    }
    Ok(())
}

/// Print one page of the top listing.
pub async fn cmd_top(ctx: &AppContext, page: u32) -> anyhow::Result<()> {
    let session = &ctx.session;
    session.store().set_current_page(page).await;
    session.submit_query("").await;

    let state = session.state().await;
    if print_error(&state) {
        anyhow::bail!("top listing failed");
    }
    if let Some(results) = &state.search_results {
        print_page(results, state.current_page);
    }
    Ok(())
}

/// Print a title's details, optionally with recommendations.
pub async fn cmd_show(ctx: &AppContext, id: u64, with_recommendations: bool) -> anyhow::Result<()> {
    let session = &ctx.session;
    let indicator = spawn_navigation_indicator(session.throttle());
    session.open_details(id).await;
    indicator.abort();

    let state = session.state().await;
    if print_error(&state) {
        anyhow::bail!("could not load title {}", id);
    }
    if let Some(anime) = &state.anime_details {
        print_details(anime);
    }

    if with_recommendations {
        session.load_recommendations(id).await;
        let state = session.state().await;
        if print_error(&state) {
            anyhow::bail!("could not load recommendations for {}", id);
        }
        print_recommendations(&state.recommendations);
    }
    Ok(())
}

pub async fn cmd_recommend(ctx: &AppContext, id: u64) -> anyhow::Result<()> {
    let session = &ctx.session;
    session.load_recommendations(id).await;

    let state = session.state().await;
    if print_error(&state) {
        anyhow::bail!("could not load recommendations for {}", id);
    }
    print_recommendations(&state.recommendations);
    Ok(())
}
