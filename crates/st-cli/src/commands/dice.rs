use comfy_table::{ContentArrangement, Table};

use st_dice::{CommandSetId, format_detailed_result};

pub fn run() -> Result<(), String> {
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Id", "Dice", "Faces"]);

    for id in CommandSetId::ALL {
        let commands = id.commands();
        let dice = commands
            .iter()
            .map(|c| c.name())
            .collect::<Vec<_>>()
            .join(", ");
        let faces = match commands.first() {
            Some(&command) => {
                let range = command.faces();
                if range.end() - range.start() < 3 {
                    range
                        .map(|v| format_detailed_result(command, v))
                        .collect::<Vec<_>>()
                        .join(" / ")
                } else {
                    format!("{} to {}", range.start(), range.end())
                }
            }
            None => String::new(),
        };
        table.add_row(vec![id.as_str().to_string(), dice, faces]);
    }

    println!("{table}");
    println!();
    println!("  {} command sets", CommandSetId::ALL.len());

    Ok(())
}
