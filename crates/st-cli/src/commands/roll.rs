use colored::Colorize;
use rand::SeedableRng;
use rand::rngs::StdRng;

use st_dice::{DisplayState, RollGroup, RollOptions, format_labels, simplify_rolls};

pub fn run(
    ids: &[String],
    modifier: Option<i32>,
    label: Option<&str>,
    list: bool,
    seed: Option<u64>,
) -> Result<(), String> {
    let mut group = RollGroup::new(ids.iter().cloned());
    if let Some(m) = modifier {
        group = group.with_modifier(m);
    }
    if let Some(l) = label {
        group = group.with_label(l);
    }
    let options = if list {
        RollOptions::listed()
    } else {
        RollOptions::default()
    };

    let mut rng = match seed {
        Some(s) => StdRng::seed_from_u64(s),
        None => StdRng::from_os_rng(),
    };
    let result = st_dice::roll(&[group], options, &mut rng).map_err(|e| e.to_string())?;

    let labels = format_labels(&result);
    if !labels.is_empty() {
        println!("  {}", labels.bold());
    }
    for simplified in simplify_rolls(&result) {
        let mut request = simplified.cells.join(" + ");
        if let Some(m) = simplified.modifier.filter(|m| *m != 0) {
            request.push_str(&format!(" {m:+}"));
        }
        println!("  {}", request.dimmed());
    }

    match result.display_state() {
        DisplayState::Hidden => println!("  {}", "(nothing rolled)".dimmed()),
        DisplayState::Listed => println!("  {result}"),
        DisplayState::Total(total) => {
            println!("  {result}");
            println!("  {} {}", "Total:".bold(), total.to_string().bold());
        }
    }

    Ok(())
}
