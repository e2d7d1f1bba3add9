//! Like/dislike commands.

use console::style;

use anidex::models::Anime;
use anidex::preferences::Rating;

use super::AppContext;
use crate::cli::helpers::print_error;

async fn fetch_title(ctx: &AppContext, id: u64) -> anyhow::Result<Anime> {
    let store = ctx.session.store();
    store.get_anime_details(id).await;

    let state = store.snapshot().await;
    if print_error(&state) {
        anyhow::bail!("could not load title {}", id);
    }
    state
        .anime_details
        .ok_or_else(|| anyhow::anyhow!("title {} not found", id))
}

async fn rate(ctx: &AppContext, id: u64, rating: Rating) -> anyhow::Result<()> {
    let mut prefs = ctx.preferences();
    if let Some(existing) = prefs.rating_of(id) {
        println!(
            "{} Title {} is already {}",
            style("!").yellow(),
            id,
            rating_label(existing)
        );
        return Ok(());
    }

    let anime = fetch_title(ctx, id).await?;
    let title = anime.display_title().to_string();
    prefs.rate(anime, rating)?;

    println!("{} {} {}", style("✓").green(), rating_label(rating), title);
    Ok(())
}

fn rating_label(rating: Rating) -> &'static str {
    match rating {
        Rating::Liked => "liked",
        Rating::Disliked => "disliked",
    }
}

pub async fn cmd_like(ctx: &AppContext, id: u64) -> anyhow::Result<()> {
    rate(ctx, id, Rating::Liked).await
}

pub async fn cmd_dislike(ctx: &AppContext, id: u64) -> anyhow::Result<()> {
    rate(ctx, id, Rating::Disliked).await
}

/// Print both preference lists.
pub fn cmd_prefs(ctx: &AppContext) -> anyhow::Result<()> {
    let prefs = ctx.preferences();

    for (label, list) in [("Liked", prefs.liked()), ("Disliked", prefs.disliked())] {
        println!("\n{}", style(format!("{} ({})", label, list.len())).bold());
        println!("{}", "-".repeat(40));
        if list.is_empty() {
            println!("{}", style("none").dim());
        }
        for anime in list {
            println!("{:>7}  {}", style(anime.mal_id).dim(), anime.display_title());
        }
    }
    Ok(())
}

/// Offer a few unrated titles from the top listing.
pub async fn cmd_suggest(ctx: &AppContext, page: u32) -> anyhow::Result<()> {
    let store = ctx.session.store();
    store.get_top_anime(page).await;

    let state = store.snapshot().await;
    if print_error(&state) {
        anyhow::bail!("top listing failed");
    }

    let available = state
        .search_results
        .map(|p| p.data)
        .unwrap_or_default();
    let candidates = ctx.preferences().candidates(&available);

    if candidates.is_empty() {
        println!(
            "{} Everything on this page is already rated, try --page {}",
            style("!").yellow(),
            page + 1
        );
        return Ok(());
    }

    for anime in candidates {
        println!(
            "{:>7}  {}  {}",
            style(anime.mal_id).dim(),
            anime.display_title(),
            style(anime.genre_names()).dim()
        );
    }
    println!(
        "\n{}",
        style("Rate with `anidex like <id>` or `anidex dislike <id>`").dim()
    );
    Ok(())
}
