pub mod dice;
pub mod roll;
pub mod show;
pub mod table;

use colored::Colorize;
use comfy_table::{ContentArrangement, Table};

use st_session::{Session, SessionMember};

/// Print the session's flags and a roster table.
fn print_session(session: &Session) {
    let paused = if session.paused {
        "paused".yellow().bold().to_string()
    } else {
        "running".green().to_string()
    };
    println!("  {} ({paused})", "Session".bold());
    println!(
        "  Confetti: {} good, {} bad",
        session.good_confetti, session.bad_confetti
    );
    if session.tl_draw_doc.is_some() {
        println!("  {}", "Shared drawing attached".dimmed());
    }
    println!();

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Name", "Role", "Points", "Played", "Rolls", "Last roll"]);

    table.add_row(roster_row(&session.gm.member, "GM"));
    for npc in &session.gm.npcs {
        table.add_row(roster_row(npc, "NPC"));
    }
    for player in session.players.values() {
        table.add_row(roster_row(player, "Player"));
    }

    println!("{table}");
    println!();
    println!(
        "  {} members ({} NPCs, {} players)",
        1 + session.gm.npcs.len() + session.players.len(),
        session.gm.npcs.len(),
        session.players.len()
    );
}

fn roster_row(member: &SessionMember, role: &str) -> Vec<String> {
    let name = match &member.character {
        Some(character) => format!("{} ({})", member.player_name, character.name),
        None => member.player_name.clone(),
    };
    let last = member
        .latest_roll()
        .map(ToString::to_string)
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "—".to_string());
    vec![
        name,
        role.to_string(),
        member.points.clone(),
        if member.played_during_turn { "yes" } else { "no" }.to_string(),
        member.rolls.len().to_string(),
        last,
    ]
}
