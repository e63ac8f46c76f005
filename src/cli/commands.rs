use chrono::{DateTime, Utc};
use futures::StreamExt;
use tracing::{info, warn};

use crate::app::{AppContext, Result, ThicketError};
use crate::domain::{CommentTree, FeedType, Item, ItemRole};
use crate::normalizer::html_to_text;

/// Load `pages` batches of `feed`, returning stories in the order they
/// arrived.
pub async fn collect_stories(ctx: &AppContext, feed: FeedType, pages: usize) -> Result<Vec<Item>> {
    let mut controller = ctx.feed_controller();
    controller.load_feed(feed).await?;
    controller.settle().await;

    for _ in 1..pages {
        if !controller.load_more() {
            break;
        }
        controller.settle().await;
    }

    Ok(controller.stories().to_vec())
}

pub async fn list_stories(ctx: &AppContext, feed: FeedType, pages: usize) -> Result<()> {
    let stories = collect_stories(ctx, feed, pages).await?;

    if stories.is_empty() {
        println!("No stories in {}", feed.label());
        return Ok(());
    }

    let now = Utc::now();
    for (index, story) in stories.iter().enumerate() {
        println!("{}", format_story(index + 1, story, now));
    }
    Ok(())
}

/// One story as a two-line listing entry.
pub fn format_story(rank: usize, story: &Item, now: DateTime<Utc>) -> String {
    let host = story
        .host()
        .map(|h| format!(" ({})", h))
        .unwrap_or_default();
    format!(
        "{:>3}. {}{}\n     {} points by {} {} ago | {} comments | id {}",
        rank,
        story.display_title(),
        host,
        story.score,
        story.display_author(),
        story.age(now),
        story.comment_count(),
        story.id
    )
}

/// Resolve a story and expand its full comment tree.
pub async fn collect_thread(ctx: &AppContext, id: i64) -> Result<(Item, CommentTree)> {
    let story = ctx.resolver.resolve(id, ItemRole::Story).await?;
    let mut expander = ctx.tree_expander();
    expander.expand(story.id, &story.child_ids);
    let tree = expander
        .settle()
        .await
        .cloned()
        .ok_or_else(|| ThicketError::Other(format!("Thread {} was abandoned", id)))?;

    info!(id, comments = tree.len(), dropped = tree.dropped(), "Thread expanded");
    Ok((story, tree))
}

pub async fn show_thread(ctx: &AppContext, id: i64) -> Result<()> {
    let (story, tree) = collect_thread(ctx, id).await?;
    print!("{}", format_thread(&story, &tree, Utc::now()));
    Ok(())
}

/// Story header followed by every comment in canonical order, indented by
/// depth.
pub fn format_thread(story: &Item, tree: &CommentTree, now: DateTime<Utc>) -> String {
    let mut out = format!("{}\n", format_story(1, story, now));
    if let Some(text) = story.text.as_deref() {
        out.push('\n');
        for line in html_to_text(text).lines() {
            out.push_str(&format!("     {}\n", line));
        }
    }
    out.push('\n');

    for node in tree.flatten() {
        let pad = "    ".repeat(node.depth);
        out.push_str(&format!(
            "{}{} {} ago\n",
            pad,
            node.item.display_author(),
            node.item.age(now)
        ));
        let text = html_to_text(node.item.text.as_deref().unwrap_or(""));
        for line in text.lines() {
            out.push_str(&format!("{}  {}\n", pad, line));
        }
        out.push('\n');
    }

    if tree.dropped() > 0 {
        out.push_str(&format!(
            "({} replies unavailable or removed)\n",
            tree.dropped()
        ));
    }
    out
}

/// Print each item as pretty JSON as soon as it resolves. Fails only when
/// none of them could be fetched.
pub async fn show_items(ctx: &AppContext, ids: &[i64]) -> Result<()> {
    let mut results = Box::pin(ctx.parallel_fetcher.resolve_stream(ids, ItemRole::Story));

    let mut failed = 0;
    while let Some((id, result)) = results.next().await {
        match result {
            Ok(item) => println!("{}", serde_json::to_string_pretty(&item)?),
            Err(e) => {
                warn!(id, error = %e, "Item unavailable");
                eprintln!("Item {}: {}", id, e);
                failed += 1;
            }
        }
    }

    if failed > 0 && failed == ids.len() {
        return Err(ThicketError::Other(format!(
            "None of the {} requested items could be fetched",
            ids.len()
        )));
    }
    Ok(())
}
