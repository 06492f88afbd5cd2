use std::path::Path;

use colored::Colorize;

use st_dice::{DiceCommand, RollGroup, RollOptions};
use st_session::{LocalTable, MemberId, SessionConfig};

pub fn run(
    players: usize,
    npcs: usize,
    rounds: u32,
    seed: u64,
    out: Option<&Path>,
) -> Result<(), String> {
    let config = SessionConfig::for_user("gm").with_seed(seed);
    let mut table = LocalTable::new(&config);

    for n in 1..=players {
        table
            .join(MemberId::from(format!("peer-{n}")), None)
            .map_err(|e| format!("join failed: {e}"))?;
    }
    for _ in 0..npcs {
        table
            .gm_action(|engine| engine.add_npc())
            .map_err(|e| format!("GM action failed: {e}"))?;
    }

    println!(
        "  {} {}",
        "Table".bold(),
        format!("({players} players, {npcs} NPCs, {rounds} rounds, seed={seed})").dimmed()
    );

    let ids: Vec<MemberId> = table.player_ids().cloned().collect();
    for round in 1..=rounds {
        for id in &ids {
            let group = RollGroup::new(["1d20"]).with_label(format!("Round {round}"));
            table
                .player_action(id, |client| client.roll(&[group], RollOptions::default()))
                .map_err(|e| format!("roll failed: {e}"))?;
            table
                .player_action(id, |client| Ok(client.set_played_during_turn(true)))
                .map_err(|e| format!("turn update failed: {e}"))?;

            match natural_d20(&table, id) {
                Some(20) => {
                    table
                        .gm_action(|engine| {
                            engine.fire_good_confetti();
                        })
                        .map_err(|e| format!("GM action failed: {e}"))?;
                }
                Some(1) => {
                    table
                        .gm_action(|engine| {
                            engine.fire_bad_confetti();
                        })
                        .map_err(|e| format!("GM action failed: {e}"))?;
                }
                _ => {}
            }
        }
        if round < rounds {
            table
                .gm_action(|engine| {
                    engine.reset_played_during_turn();
                })
                .map_err(|e| format!("GM action failed: {e}"))?;
        }
    }

    if !table.is_consistent() {
        return Err("players diverged from the GM session".into());
    }

    let session = table.gm().engine().session();
    println!(
        "  {} snapshots broadcast, every player in sync",
        table.gm().revision()
    );
    println!();
    super::print_session(session);

    if let Some(path) = out {
        let json = serde_json::to_string_pretty(session)
            .map_err(|e| format!("failed to encode snapshot: {e}"))?;
        std::fs::write(path, json)
            .map_err(|e| format!("failed to write {}: {e}", path.display()))?;
        println!();
        println!("  Snapshot saved to {}", path.display());
    }

    Ok(())
}

/// The d20 face of the player's most recent roll, as the GM recorded it.
fn natural_d20(table: &LocalTable, id: &MemberId) -> Option<i32> {
    table
        .gm()
        .engine()
        .session()
        .players
        .get(id)?
        .latest_roll()?
        .commands()
        .find(|c| c.command == DiceCommand::D20)
        .map(|c| c.value)
}
