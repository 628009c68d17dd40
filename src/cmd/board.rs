//! Board commands: `planify init`, `planify board`, `planify check`.

use anyhow::{Context, Result};

use planify::repository::{CollectionSource, SeedReason};

use super::super::Cli;
use super::{load_repository, open_repository};

fn describe(source: &CollectionSource) -> String {
    match source {
        CollectionSource::Loaded => "loaded".to_string(),
        CollectionSource::Seeded(SeedReason::Missing) => "seeded (missing)".to_string(),
        CollectionSource::Seeded(SeedReason::Empty) => "seeded (empty)".to_string(),
        CollectionSource::Seeded(SeedReason::Corrupt(e)) => format!("seeded (corrupt: {})", e),
        CollectionSource::Seeded(SeedReason::Io(e)) => format!("seeded (read failed: {})", e),
    }
}

pub async fn cmd_init(cli: &Cli) -> Result<()> {
    let (repo, load) = load_repository(cli).await?;
    let saved = repo.save().await.context("Failed to write documents")?;

    println!();
    println!("Data directory: {}", repo.store().root().display());
    println!("  {:<8} {:>3}  {}", "cards", repo.cards().len(), describe(&load.cards));
    println!("  {:<8} {:>3}  {}", "lanes", repo.lanes().len(), describe(&load.lanes));
    println!("  {:<8} {:>3}  {}", "floors", repo.floors().len(), describe(&load.floors));
    println!("  {:<8} {:>3}  {}", "users", repo.users().len(), describe(&load.users));
    if load.repaired_cards > 0 {
        println!("  {} card(s) moved to the first lane", load.repaired_cards);
    }
    if !saved.locked {
        println!("  (written without the process lock)");
    }
    println!();
    Ok(())
}

pub async fn cmd_board(cli: &Cli) -> Result<()> {
    let repo = open_repository(cli).await?;

    println!();
    for lane in repo.lanes_ordered() {
        let cards = repo.cards_in_lane(&lane.id);
        println!("{} ({})", lane.title, cards.len());
        for card in cards {
            let flag = if card.deadline_overdue() {
                "  [overdue]"
            } else if card.deadline_due_tomorrow() {
                "  [due tomorrow]"
            } else {
                ""
            };
            println!(
                "  {:<10} {:<9} {:<8} {:<12} {}{}",
                card.asset_tag,
                repo.status_text(card.status),
                card.locater_id,
                card.person_name,
                card.id,
                flag
            );
        }
    }
    println!();
    Ok(())
}

pub async fn cmd_check(cli: &Cli, card_id: &str, level: Option<i32>) -> Result<()> {
    let repo = open_repository(cli).await?;

    let card = repo
        .card(card_id)
        .with_context(|| format!("Card {} not found", card_id))?;
    let level = match level {
        Some(level) => level,
        None => repo
            .floors()
            .first()
            .map(|f| f.level)
            .context("No floors defined; pass --level")?,
    };

    match repo.can_move_to_in_use(card, level) {
        Ok(()) => println!("{} can move to in use", card.asset_tag),
        Err(reason) => println!("{} cannot move to in use: {}", card.asset_tag, reason),
    }
    Ok(())
}
