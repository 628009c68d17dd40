//! `planify floors`

use anyhow::Result;

use super::super::Cli;
use super::open_repository;

pub async fn cmd_floors(cli: &Cli) -> Result<()> {
    let repo = open_repository(cli).await?;

    println!();
    if repo.floors().is_empty() {
        println!("No floors defined.");
        println!();
        return Ok(());
    }

    for floor in repo.floors() {
        println!(
            "{} (level {}) - {} / {}",
            floor.name, floor.level, floor.company, floor.building
        );
        if let Some(image) = &floor.image_path {
            println!("  image: {}", image);
        }
        for table in &floor.tables {
            let (x, y, w, h) = table.canvas_rect();
            println!(
                "  {:<8} {:<16} at ({:.0}, {:.0}) {:.0}x{:.0} rot {}",
                table.id, table.name, x, y, w, h, table.rotation
            );
            for seat in &table.seats {
                let occupants: Vec<String> = repo
                    .cards_at_locater(&seat.locater_id)
                    .iter()
                    .map(|c| c.asset_tag.clone())
                    .collect();
                println!(
                    "    {:<8} {:<10} {}",
                    seat.locater_id,
                    seat.role,
                    occupants.join(", ")
                );
            }
        }
    }
    println!();
    Ok(())
}
