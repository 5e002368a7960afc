//! Administrative CLI modes
//!
//! Code minting and the results tally run against the same database as the
//! server but print to stdout and exit; they never start the HTTP listener.

use pairvote_common::db::{access_codes, participants, votes};
use pairvote_common::Result;
use sqlx::SqlitePool;

/// Mint `count` access codes and print them, one per line
pub async fn mint_codes(
    pool: &SqlitePool,
    count: u32,
    max_uses: i64,
    label: Option<&str>,
) -> Result<()> {
    for _ in 0..count {
        let code = access_codes::mint_code(pool, max_uses, label).await?;
        println!("{}", code);
    }

    Ok(())
}

/// Print participation figures and per-component win counts
pub async fn print_tally(pool: &SqlitePool) -> Result<()> {
    let participant_count = participants::count_participants(pool).await?;
    println!("participants: {}", participant_count);

    println!("access codes:");
    for code in access_codes::list_codes(pool).await? {
        let state = if code.disabled { " (disabled)" } else { "" };
        let label = code.label.as_deref().unwrap_or("-");
        println!(
            "  {}  {}/{} uses  label={}{}",
            code.code, code.uses, code.max_uses, label, state
        );
    }

    println!("wins by component:");
    let mut current_component = String::new();
    for (component, method, wins) in votes::tally(pool).await? {
        if component != current_component {
            println!("  {}:", component);
            current_component = component;
        }
        println!("    {:>4}  {}", wins, method);
    }

    Ok(())
}
