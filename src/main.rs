// Only compile UI module when TUI feature is enabled
#[cfg(feature = "tui")]
mod ui;

use anyhow::{bail, Result};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use mystic_companion::{
    export_text, logging, simulate_turn, write_export, AppConfig, BirthForm, CompanionGenerator,
    Reading, CATALOG,
};

#[derive(Parser)]
#[command(name = "mystic-companion", version, about = "Find your spirit companion 🧚")]
struct Cli {
    /// JSON config file (falls back to $MYSTIC_COMPANION_CONFIG)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Fixed seed for chat flavor text
    #[arg(long, global = true)]
    seed: Option<u64>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Interactive terminal UI (default)
    Tui,
    /// Print the sky snapshot and companion match
    Reading {
        #[command(flatten)]
        form: FormArgs,
        /// Emit JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Run a scripted chat and print the log
    Chat {
        #[command(flatten)]
        form: FormArgs,
        /// Message to send; repeat for several turns
        #[arg(short, long = "message")]
        messages: Vec<String>,
        /// Also write the log under the export directory
        #[arg(long)]
        export: bool,
    },
    /// List the companion catalog
    Catalog {
        #[arg(long)]
        json: bool,
    },
}

/// Overrides for the configured default form
#[derive(Args, Default)]
struct FormArgs {
    #[arg(long)]
    name: Option<String>,
    /// YYYY-MM-DD
    #[arg(long)]
    date: Option<String>,
    /// HH:MM
    #[arg(long)]
    time: Option<String>,
    #[arg(long, allow_hyphen_values = true)]
    lat: Option<String>,
    #[arg(long, allow_hyphen_values = true)]
    lon: Option<String>,
}

impl FormArgs {
    fn apply(self, defaults: &BirthForm) -> BirthForm {
        BirthForm {
            name: self.name.unwrap_or_else(|| defaults.name.clone()),
            birth_date: self.date.unwrap_or_else(|| defaults.birth_date.clone()),
            birth_time: self.time.unwrap_or_else(|| defaults.birth_time.clone()),
            latitude: self.lat.unwrap_or_else(|| defaults.latitude.clone()),
            longitude: self.lon.unwrap_or_else(|| defaults.longitude.clone()),
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = AppConfig::load(cli.config.as_deref())?;
    let generator = CompanionGenerator {
        flavor_seed: cli.seed.or(config.flavor_seed),
    };

    match cli.command.unwrap_or(Command::Tui) {
        Command::Tui => run_ui_mode(&config, generator),
        Command::Reading { form, json } => {
            logging::init_stderr(&config.log_filter);
            let session = build_session(&generator, form.apply(&config.defaults))?;
            if json {
                println!("{}", serde_json::to_string_pretty(&session.reading)?);
            } else {
                println!("{}", render_reading(&session.reading));
            }
            Ok(())
        }
        Command::Chat { form, messages, export } => {
            logging::init_stderr(&config.log_filter);
            let session = build_session(&generator, form.apply(&config.defaults))?;

            let messages = if messages.is_empty() {
                vec!["Hello, who are you?".to_string()]
            } else {
                messages
            };

            let mut chat = session.chat;
            for message in &messages {
                chat = simulate_turn(chat, &session.reading, message);
            }

            println!("{}", export_text(&chat.log));

            if export {
                let path = write_export(&chat.log, &config.export_dir, session.reading.record.name())?;
                eprintln!("✓ Chat log saved to {}", path.display());
            }
            Ok(())
        }
        Command::Catalog { json } => {
            if json {
                println!("{}", serde_json::to_string_pretty(&CATALOG)?);
            } else {
                println!("📚 Companion catalog v{}", CATALOG.version);
                for a in CATALOG.archetypes {
                    println!(
                        "  {:<14} {:<6} vibration {:>2}-{:<2}  {}",
                        a.display_name(),
                        a.element.as_str(),
                        a.vibration_min,
                        a.vibration_max,
                        a.description
                    );
                }
            }
            Ok(())
        }
    }
}

fn build_session(
    generator: &CompanionGenerator,
    form: BirthForm,
) -> Result<mystic_companion::Session> {
    match generator.generate_from_form(&form) {
        Ok(session) => Ok(session),
        Err(errors) => {
            for err in &errors {
                eprintln!("❌ {}: {}", err.field().label(), err);
            }
            bail!("{} invalid form field(s)", errors.len())
        }
    }
}

fn render_reading(reading: &Reading) -> String {
    let sky = &reading.sky;
    let m = &reading.matched;
    let mut out = Vec::new();

    out.push(format!("✨ Astrological snapshot for {}", reading.record.name()));
    out.push(format!("  Sun (approx):  {:>6.2}° → {} (house {})", sky.sun_longitude, sky.sun_sign, sky.sun_house));
    out.push(format!("  Moon (approx): {:>6.2}° → {} (house {})", sky.moon_longitude, sky.moon_sign, sky.moon_house));
    out.push(format!("  Ascendant:     {:>6.2}° → {}", sky.ascendant, sky.ascendant_sign));
    out.push(format!(
        "  Moon:          {} {} ({}% lit, {})",
        sky.moon_phase.emoji(),
        sky.moon_phase,
        sky.illumination_percent(),
        if sky.waxing { "waxing" } else { "waning" }
    ));
    out.push(format!("  Vibration:     {} ({})", m.vibration.score, m.vibration.realm.as_str()));
    out.push(format!("  Bioregion:     {}", m.folklore_tag));
    out.push(String::new());
    out.push(format!("🔮 Companion: {} - {}", m.archetype.display_name(), m.archetype.description));
    out.push(format!("🌕 Harmony:   {}% ({} tone)", m.harmony, m.tone.as_str()));
    out.push(String::new());
    out.push("🎨 Gallery".to_string());
    for pick in &m.gallery {
        out.push(format!("  {:<16} {:<14} {}", pick.role.title(), pick.archetype.display_name(), pick.reason));
    }

    out.join("\n")
}

#[cfg(feature = "tui")]
fn run_ui_mode(config: &AppConfig, generator: CompanionGenerator) -> Result<()> {
    let _guard = logging::init_file(&config.log_dir, &config.log_filter)?;

    let mut app = ui::App::new(config.defaults.clone(), generator, config.export_dir.clone());
    ui::run_ui(&mut app)?;

    println!("✅ Farewell from your companions");
    Ok(())
}

#[cfg(not(feature = "tui"))]
fn run_ui_mode(_config: &AppConfig, _generator: CompanionGenerator) -> Result<()> {
    eprintln!("❌ TUI mode not available!");
    eprintln!("   Rebuild with: cargo build --features tui");
    eprintln!("   Or use the web UI: cargo run --bin mystic-server --features server");
    std::process::exit(1);
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_negative_coordinates_parse() {
        let cli = Cli::try_parse_from(["mystic-companion", "reading", "--lat", "-33.9", "--lon", "-0.12"]).unwrap();
        match cli.command {
            Some(Command::Reading { form, .. }) => {
                assert_eq!(form.lat.as_deref(), Some("-33.9"));
                assert_eq!(form.lon.as_deref(), Some("-0.12"));
            }
            _ => panic!("expected reading subcommand"),
        }
    }

    #[test]
    fn test_form_args_override_defaults() {
        let args = FormArgs {
            name: Some("Ada".to_string()),
            ..FormArgs::default()
        };
        let form = args.apply(&BirthForm::default());
        assert_eq!(form.name, "Ada");
        assert_eq!(form.birth_date, BirthForm::default().birth_date);
    }

    #[test]
    fn test_render_reading_mentions_companion() {
        let session = CompanionGenerator::new()
            .generate_from_form(&BirthForm::default())
            .unwrap();
        let text = render_reading(&session.reading);
        assert!(text.contains(&session.reading.matched.archetype.display_name()));
        assert!(text.contains("Harmony"));
    }
}
