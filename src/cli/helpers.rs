//! Shared rendering helpers for CLI commands.

use std::time::Duration;

use chrono::DateTime;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tokio::task::JoinHandle;

use anidex::models::{Anime, AnimePage, Recommendation};
use anidex::store::AppState;
use anidex::throttle::NavigationThrottle;

/// Truncate to `max_chars` characters, appending `suffix` when cut.
pub fn truncate_text(text: Option<&str>, max_chars: usize, suffix: &str) -> String {
    let Some(text) = text else {
        return String::new();
    };
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let cut: String = text.chars().take(max_chars).collect();
    format!("{}{}", cut, suffix)
}

/// Render an RFC 3339 timestamp as e.g. "April 3, 1998".
pub fn format_date(date: Option<&str>) -> String {
    date.and_then(|d| DateTime::parse_from_rfc3339(d).ok())
        .map(|d| d.format("%B %-d, %Y").to_string())
        .unwrap_or_else(|| "Unknown".to_string())
}

/// Show a countdown spinner whenever the throttle is delaying.
pub fn spawn_navigation_indicator(throttle: &NavigationThrottle) -> JoinHandle<()> {
    let mut rx = throttle.subscribe();
    tokio::spawn(async move {
        let mut spinner: Option<ProgressBar> = None;
        while rx.changed().await.is_ok() {
            let status = rx.borrow_and_update().clone();
            if status.is_navigating {
                let pb = spinner.get_or_insert_with(|| {
                    let pb = ProgressBar::new_spinner();
                    pb.set_style(
                        ProgressStyle::default_spinner()
                            .template("{spinner:.cyan} {msg}")
                            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
                    );
                    pb.enable_steady_tick(Duration::from_millis(100));
                    pb
                });
                pb.set_message(format!(
                    "Pacing requests, about {}s...",
                    status.current_delay_secs
                ));
            } else if let Some(pb) = spinner.take() {
                pb.finish_and_clear();
            }
        }
    })
}

pub fn print_error(state: &AppState) -> bool {
    match &state.error {
        Some(e) => {
            println!("{} {}", style("✗").red(), e);
            true
        }
        None => false,
    }
}

pub fn print_page(page: &AnimePage, current_page: u32) {
    if page.is_empty() {
        println!("{} No results", style("!").yellow());
        return;
    }

    for anime in &page.data {
        let score = anime
            .score
            .map(|s| format!("{:.2}", s))
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{:>7}  {:<48} {:>5}  {}",
            style(anime.mal_id).dim(),
            truncate_text(Some(anime.display_title()), 45, "..."),
            score,
            style(anime.kind.as_deref().unwrap_or("")).dim()
        );
    }

    let total = page.total_pages();
    if total > 0 {
        let more = if page.has_next_page() { " (more)" } else { "" };
        println!(
            "\n{}",
            style(format!("Page {} of {}{}", current_page, total, more)).dim()
        );
    }
}

pub fn print_details(anime: &Anime) {
    println!("\n{}", style(anime.display_title()).bold());
    if anime.title != anime.display_title() {
        println!("{}", style(&anime.title).dim());
    }
    if let Some(jp) = &anime.title_japanese {
        println!("{}", style(jp).dim());
    }
    println!("{}", "-".repeat(40));

    let field = |label: &str, value: String| println!("{:<14} {}", label, value);
    field("ID:", anime.mal_id.to_string());
    if let Some(kind) = &anime.kind {
        field("Type:", kind.clone());
    }
    if let Some(episodes) = anime.episodes {
        field("Episodes:", episodes.to_string());
    }
    if let Some(status) = &anime.status {
        field("Status:", status.clone());
    }
    if let Some(score) = anime.score {
        let votes = anime
            .scored_by
            .map(|n| format!(" ({} votes)", n))
            .unwrap_or_default();
        field("Score:", format!("{:.2}{}", score, votes));
    }
    if let Some(rank) = anime.rank {
        field("Rank:", format!("#{}", rank));
    }
    if let Some(aired) = &anime.aired {
        field(
            "Aired:",
            format!(
                "{} to {}",
                format_date(aired.from.as_deref()),
                format_date(aired.to.as_deref())
            ),
        );
    }
    if !anime.genres.is_empty() {
        field("Genres:", anime.genre_names());
    }
    if let Some(synopsis) = &anime.synopsis {
        println!("\n{}", truncate_text(Some(synopsis), 600, "..."));
    }
}

pub fn print_recommendations(recs: &[Recommendation]) {
    if recs.is_empty() {
        println!("{} No recommendations", style("!").yellow());
        return;
    }
    println!("\n{}", style("Recommendations").bold());
    for rec in recs {
        println!(
            "{:>7}  {:<48} {} votes",
            style(rec.entry.mal_id).dim(),
            truncate_text(Some(&rec.entry.title), 45, "..."),
            rec.votes
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_text() {
        assert_eq!(truncate_text(None, 5, "..."), "");
        assert_eq!(truncate_text(Some("short"), 5, "..."), "short");
        assert_eq!(truncate_text(Some("longer text"), 6, "..."), "longer...");
        // Counts characters, not bytes
        assert_eq!(truncate_text(Some("進撃の巨人"), 2, "…"), "進撃…");
    }

    #[test]
    fn test_format_date() {
        assert_eq!(
            format_date(Some("1998-04-03T00:00:00+00:00")),
            "April 3, 1998"
        );
        assert_eq!(format_date(Some("not a date")), "Unknown");
        assert_eq!(format_date(None), "Unknown");
    }
}
