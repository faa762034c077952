use std::time::Duration;

use tokio::sync::mpsc;

use moodtrack_core::models::NewEntry;
use moodtrack_core::Entry;

use crate::commands::Client;
use crate::error::CliError;

const WATCH_POLL_INTERVAL: Duration = Duration::from_millis(200);

pub async fn run_list(client: &Client, limit: u64, page: u64, as_json: bool) -> Result<(), CliError> {
    let skip = page * limit;
    let fetched = match client.api().entries(skip, limit).await {
        Ok(page) => page,
        // Read path: fall back to the cached snapshot when one exists.
        Err(error) => {
            let Some(cached) = client.cache().cached_entries() else {
                return Err(error.into());
            };
            tracing::warn!("entries fetch failed, showing cached snapshot: {error}");
            for line in format_entry_lines(&cached) {
                println!("{line}");
            }
            println!("(cached snapshot; refresh failed: {error})");
            return Ok(());
        }
    };

    if as_json {
        println!("{}", serde_json::to_string_pretty(&fetched.items)?);
        return Ok(());
    }

    if fetched.items.is_empty() {
        println!("No entries on page {page}.");
        return Ok(());
    }

    for line in format_entry_lines(&fetched.items) {
        println!("{line}");
    }
    if fetched.has_more(skip + fetched.items.len() as u64, limit) {
        println!("(more entries available; use --page {})", page + 1);
    }
    Ok(())
}

pub async fn run_add(
    client: &Client,
    title: Option<&str>,
    content_parts: &[String],
    wait: bool,
) -> Result<(), CliError> {
    let content = content_parts.join(" ");
    if content.trim().is_empty() {
        return Err(CliError::EmptyContent);
    }

    let draft = NewEntry::new(title.map(ToString::to_string), content);
    let entry = client.api().create_entry(&draft).await?;
    client.cache().merge_entry(&entry);
    println!("{}", entry.id);

    if let Some(mood) = entry.mood {
        println!("mood: {mood}");
        return Ok(());
    }
    if !wait {
        println!("Mood is still being scored; check later with `moodtrack entries show {}`.", entry.id);
        return Ok(());
    }

    wait_for_mood(client, entry.id).await;
    Ok(())
}

pub async fn run_show(client: &Client, entry_id: i64) -> Result<(), CliError> {
    let entry = client.api().entry(entry_id).await?;

    if let Some(title) = entry.title.as_deref() {
        println!("title: {title}");
    }
    println!("created: {}", entry.created_at.format("%Y-%m-%d %H:%M"));
    println!("mood: {}", mood_label(entry.mood));
    println!();
    println!("{}", entry.content);
    Ok(())
}

/// Block until the poller either resolves the mood or gives up.
async fn wait_for_mood(client: &Client, entry_id: i64) {
    let (sender, mut receiver) = mpsc::unbounded_channel();
    let subscription = client.events().subscribe(move |published| {
        if let Some(entry) = published {
            let _ = sender.send((entry.id, entry.mood));
        }
    });

    println!("Waiting for the mood score... (Ctrl-C to stop)");
    client.poller().watch(entry_id);
    let settled = async {
        while client.poller().is_watching(entry_id) {
            tokio::time::sleep(WATCH_POLL_INTERVAL).await;
        }
    };
    tokio::select! {
        () = settled => {}
        _ = tokio::signal::ctrl_c() => {
            client.poller().cancel_all();
            println!("Stopped waiting.");
        }
    }
    subscription.unsubscribe();

    let mut resolved = None;
    while let Ok((id, mood)) = receiver.try_recv() {
        if id == entry_id && mood.is_some() {
            resolved = mood;
        }
    }
    match resolved {
        Some(mood) => println!("mood: {mood}"),
        None => println!(
            "Mood was not resolved in time; check later with `moodtrack entries show {entry_id}`."
        ),
    }
}

fn format_entry_lines(entries: &[Entry]) -> Vec<String> {
    entries
        .iter()
        .map(|entry| {
            let date = entry.created_at.format("%Y-%m-%d %H:%M");
            let preview = entry_preview(entry, 48);
            format!(
                "{:<8}  {:<4}  {date}  {preview}",
                entry.id,
                mood_label(entry.mood)
            )
        })
        .collect()
}

fn entry_preview(entry: &Entry, max_chars: usize) -> String {
    let source = entry.title.as_deref().unwrap_or(&entry.content);
    let first_line = source.lines().next().unwrap_or("").trim();
    let collapsed = first_line.split_whitespace().collect::<Vec<_>>().join(" ");

    if collapsed.chars().count() <= max_chars {
        collapsed
    } else {
        let take_len = max_chars.saturating_sub(3);
        let mut truncated = collapsed.chars().take(take_len).collect::<String>();
        truncated.push_str("...");
        truncated
    }
}

fn mood_label(mood: Option<u8>) -> String {
    mood.map_or_else(|| "-".to_string(), |score| score.to_string())
}
