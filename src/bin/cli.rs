//! Keiba Roulette CLI - pick a venue, see its main race, spin for a number

use anyhow::{Context, Result};
use chrono::{Datelike, NaiveDateTime, NaiveTime};
use clap::{Parser, Subcommand};
use colored::{ColoredString, Colorize};
use dialoguer::{theme::ColorfulTheme, Input, Select};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use keiba_roulette::calendar::{
    current_weekend, format_for_display, now_local, parse_compact_date, pivot_date,
    to_compact_date, weekday_label,
};
use keiba_roulette::draw::{
    race_card, spin_ticks, FieldSize, RaceSlot, SpinRequest, SPIN_STAGES, SPIN_TICK,
};
use keiba_roulette::feed::{FeedConfig, HttpScheduleSource, IcsCalendarSource, ScheduleSource, StaticScheduleSource};
use keiba_roulette::resolver::grade_rank;
use keiba_roulette::{
    FallbackTier, FeatureRaceInfo, FeatureRaceResolver, MainRaceSelector, ScheduleTables, VenueSet,
};

#[derive(Parser)]
#[command(name = "keiba-roulette")]
#[command(author, version, about = "Weekend venue lookup and winning-number roulette", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Run in interactive mode
    #[arg(short, long)]
    interactive: bool,

    /// Base URL of the monthly schedule feed
    #[arg(long, env = "KEIBA_FEED_URL")]
    base_url: Option<String>,

    /// Season calendar (.ics) path or URL
    #[arg(long, env = "KEIBA_CALENDAR_URL")]
    calendar_url: Option<String>,

    /// Read schedule documents from a local JSON file instead of the feed
    #[arg(long)]
    schedule_file: Option<PathBuf>,

    /// Skip the calendar fallback
    #[arg(long)]
    no_calendar: bool,

    /// Print results as JSON
    #[arg(long)]
    json: bool,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// List venues running on a weekend
    Venues {
        /// Any date in the weekend (YYYYMMDD format, default: now)
        #[arg(short, long)]
        date: Option<String>,
    },

    /// Show a venue's main race
    MainRace {
        /// Venue name (e.g. 東京)
        #[arg(short, long)]
        venue: String,

        /// Reference date (YYYYMMDD format, default: now)
        #[arg(short, long)]
        date: Option<String>,
    },

    /// Show a venue's race card with the main race flagged
    Races {
        /// Venue name (e.g. 東京)
        #[arg(short, long)]
        venue: String,

        /// Reference date (YYYYMMDD format, default: now)
        #[arg(short, long)]
        date: Option<String>,
    },

    /// Draw a winning number for a race
    Spin {
        /// Venue name (e.g. 東京)
        #[arg(short, long)]
        venue: String,

        /// Race number (1-12)
        #[arg(short, long)]
        race: u8,

        /// Field size (2-18). Defaults to the race's field size.
        #[arg(short, long)]
        total: Option<u8>,

        /// Skip the progress animation
        #[arg(long)]
        quick: bool,
    },
}

/// Resolvers wired to the configured sources
struct App {
    runtime: tokio::runtime::Runtime,
    selector: MainRaceSelector,
    json: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(if cli.verbose { Level::DEBUG } else { Level::WARN })
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set tracing subscriber")?;

    let app = build_app(&cli)?;

    if !cli.json {
        println!("{}", "Keiba Roulette v0.1.0".cyan().bold());
        println!();
    }

    if cli.interactive {
        run_interactive(&app)?;
    } else if let Some(command) = cli.command {
        match command {
            Commands::Venues { date } => {
                list_venues(&app, reference_instant(date.as_deref())?)?;
            }
            Commands::MainRace { venue, date } => {
                show_main_race(&app, &venue, reference_instant(date.as_deref())?)?;
            }
            Commands::Races { venue, date } => {
                show_races(&app, &venue, reference_instant(date.as_deref())?)?;
            }
            Commands::Spin {
                venue,
                race,
                total,
                quick,
            } => {
                run_spin(&app, &venue, race, total, !quick)?;
            }
        }
    } else {
        println!("Use --help for usage information or --interactive for interactive mode.");
    }

    Ok(())
}

fn build_app(cli: &Cli) -> Result<App> {
    let defaults = FeedConfig::default();
    let config = FeedConfig {
        base_url: cli.base_url.clone().unwrap_or(defaults.base_url),
        calendar_url: cli.calendar_url.clone().unwrap_or(defaults.calendar_url),
        ..Default::default()
    };
    let tables = Arc::new(ScheduleTables::default());

    let primary: Arc<dyn ScheduleSource> = match &cli.schedule_file {
        Some(path) => Arc::new(
            StaticScheduleSource::from_json_file(path)
                .with_context(|| format!("Failed to load schedule file {:?}", path))?,
        ),
        None => Arc::new(
            HttpScheduleSource::new(config.clone()).context("Failed to create HTTP client")?,
        ),
    };

    let mut resolver = FeatureRaceResolver::new(primary, tables);
    if !cli.no_calendar {
        let calendar = IcsCalendarSource::new(&config).context("Failed to create HTTP client")?;
        resolver = resolver.with_calendar(Arc::new(calendar));
    }

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to create tokio runtime")?;

    Ok(App {
        runtime,
        selector: MainRaceSelector::new(resolver),
        json: cli.json,
    })
}

/// Midnight of `date`, or the current JST time
fn reference_instant(date: Option<&str>) -> Result<NaiveDateTime> {
    match date {
        Some(s) => {
            let date = parse_compact_date(s).with_context(|| format!("Bad --date {:?}", s))?;
            Ok(date.and_time(NaiveTime::MIN))
        }
        None => Ok(now_local()),
    }
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn grade_colored(grade: &str) -> ColoredString {
    match grade_rank(grade) {
        1 => grade.red().bold(),
        2 => grade.magenta(),
        3 => grade.green(),
        _ => grade.normal(),
    }
}

fn spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(message.to_string());
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    pb
}

fn tables(app: &App) -> &ScheduleTables {
    app.selector.resolver().tables()
}

/// This weekend's venues, or the month's usual venues when no feed answers
fn weekend_venues(app: &App, now: NaiveDateTime) -> (VenueSet, bool) {
    let (venues, tier) = app
        .runtime
        .block_on(app.selector.resolver().weekend_venues(now.date()));
    (venues, tier == FallbackTier::MonthlyTable)
}

fn list_venues(app: &App, now: NaiveDateTime) -> Result<()> {
    let (saturday, sunday) = current_weekend(now.date());

    let pb = spinner("Loading schedule...");
    let (venues, from_table) = weekend_venues(app, now);
    pb.finish_and_clear();

    if app.json {
        return print_json(&serde_json::json!({
            "saturday": to_compact_date(saturday),
            "sunday": to_compact_date(sunday),
            "venues": venues,
            "monthly_fallback": from_table,
        }));
    }

    println!(
        "{}: {}/{}({}) - {}/{}({})",
        "開催場 (Venues)".yellow().bold(),
        saturday.month(),
        saturday.day(),
        weekday_label(saturday),
        sunday.month(),
        sunday.day(),
        weekday_label(sunday)
    );
    if from_table {
        println!(
            "{}",
            format!("(開催データなし: {}月の主な開催場を表示)", saturday.month()).dimmed()
        );
    }
    println!("{}", "-".repeat(30));

    for venue in &venues {
        println!("  {}", venue);
    }
    println!();
    println!("Total: {} venues", venues.len());

    Ok(())
}

fn fetch_main_race(app: &App, venue: &str, now: NaiveDateTime) -> FeatureRaceInfo {
    let pivot = pivot_date(now);
    let pb = spinner(&format!("Resolving main race at {}...", venue));
    let info = app
        .runtime
        .block_on(app.selector.main_race_for(venue, pivot));
    pb.finish_and_clear();
    info
}

fn print_main_race(venue: &str, info: &FeatureRaceInfo) {
    println!("{} {}", "メインレース (Main race):".yellow().bold(), venue);

    if info.is_unassigned() {
        println!("  {}", "重賞なし (no graded race this weekend)".dimmed());
        return;
    }

    let when = match format_for_display(&info.date) {
        Ok(display) if info.days_until == 0 => format!("{} (本日)", display),
        Ok(display) => format!("{} (あと{}日)", display, info.days_until),
        Err(_) => String::new(),
    };

    println!("  {} {} {}", info.name.bold(), grade_colored(&info.grade), when);
}

fn show_main_race(app: &App, venue: &str, now: NaiveDateTime) -> Result<()> {
    let info = fetch_main_race(app, venue, now);

    if app.json {
        return print_json(&info);
    }

    print_main_race(venue, &info);
    Ok(())
}

fn venue_card(app: &App, venue: &str, now: NaiveDateTime) -> Result<(FeatureRaceInfo, Vec<RaceSlot>)> {
    if !tables(app).is_known_venue(venue) {
        anyhow::bail!("Unknown venue: {}", venue);
    }
    let info = fetch_main_race(app, venue, now);
    let card = race_card(venue, Some(&info), tables(app));
    Ok((info, card))
}

fn show_races(app: &App, venue: &str, now: NaiveDateTime) -> Result<()> {
    let (info, card) = venue_card(app, venue, now)?;

    if app.json {
        return print_json(&serde_json::json!({
            "venue": venue,
            "main_race": info,
            "races": card,
        }));
    }

    print_main_race(venue, &info);
    println!();
    println!("{:>6} {:<30} {:>6}", "レース", "", "頭数");
    println!("{}", "-".repeat(46));
    for slot in &card {
        let label = if slot.is_main {
            slot.label.yellow().bold()
        } else {
            slot.label.normal()
        };
        println!("{:>6} {:<30} {:>6}", slot.race_no, label, slot.field_size);
    }

    Ok(())
}

fn animate_spin() {
    let pb = ProgressBar::new(100);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{bar:40.yellow/red}] {pos:>3}% {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-"),
    );

    for (stage, percent) in spin_ticks() {
        pb.set_message(SPIN_STAGES[stage].message);
        pb.set_position(percent.round() as u64);
        std::thread::sleep(SPIN_TICK);
    }

    pb.finish_and_clear();
}

fn run_spin(app: &App, venue: &str, race: u8, total: Option<u8>, animate: bool) -> Result<()> {
    if !venue.trim().is_empty() && !tables(app).is_known_venue(venue) {
        anyhow::bail!("Unknown venue: {}", venue);
    }

    let slot = race_card(venue, None, tables(app))
        .into_iter()
        .find(|slot| slot.race_no == race);

    let race_label = slot.as_ref().map(|s| s.race_no.to_string()).unwrap_or_default();
    let total = total
        .or_else(|| slot.as_ref().map(|s| s.field_size))
        .unwrap_or_else(|| FieldSize::default().get());

    let request = match SpinRequest::new(venue, &race_label, total) {
        Ok(request) => request,
        Err(e) => {
            println!("{}", "選択不能".dimmed());
            println!("{} {}", "⚠️ 開催地とレースを選んでください！".red(), e);
            return Err(e.into());
        }
    };

    if animate && !app.json {
        animate_spin();
    }

    let number = request.draw(&mut rand::thread_rng());

    if app.json {
        return print_json(&serde_json::json!({
            "venue": request.venue,
            "race": race,
            "total": request.total.get(),
            "number": number,
        }));
    }

    println!("{} {}R ({}頭)", request.venue, race, request.total.get());
    println!(
        "{}  {}",
        "【 確 定 】".yellow().bold(),
        number.to_string().bright_yellow().bold()
    );

    Ok(())
}

/// Step the field size with +/- (or type it) until the user spins
fn choose_field_size(theme: &ColorfulTheme, start: FieldSize) -> Result<FieldSize> {
    let mut size = start;
    let actions = ["スピン！", "+1", "-1", "頭数を入力"];

    loop {
        let action = Select::with_theme(theme)
            .with_prompt(format!("頭数: {}", size.get()))
            .items(&actions)
            .default(0)
            .interact()?;

        match action {
            0 => return Ok(size),
            1 => size = size.adjust(1),
            2 => size = size.adjust(-1),
            _ => {
                let total: u8 = Input::with_theme(theme)
                    .with_prompt("頭数 (2-18)")
                    .default(size.get())
                    .interact_text()?;
                match FieldSize::new(total) {
                    Ok(valid) => size = valid,
                    Err(e) => println!("{}: {}", "Error".red(), e),
                }
            }
        }
    }
}

fn run_interactive(app: &App) -> Result<()> {
    println!("{}", "Interactive mode".green().bold());
    println!();

    let theme = ColorfulTheme::default();
    let now = now_local();

    loop {
        let (venues, from_table) = weekend_venues(app, now);
        let mut options: Vec<String> = venues.into_vec();
        let quit_idx = options.len();
        options.push("Quit".to_string());

        let prompt = if from_table {
            format!("{}月の主な開催場を選択", now.month())
        } else {
            "開催地を選択".to_string()
        };

        let selection = Select::with_theme(&theme)
            .with_prompt(prompt)
            .items(&options)
            .default(0)
            .interact()?;

        if selection == quit_idx {
            println!("Goodbye!");
            break;
        }
        let venue = options[selection].clone();

        let (info, card) = match venue_card(app, &venue, now) {
            Ok(found) => found,
            Err(e) => {
                println!("{}: {}", "Error".red(), e);
                continue;
            }
        };
        println!();
        print_main_race(&venue, &info);
        println!();

        let labels: Vec<&str> = card.iter().map(|slot| slot.label.as_str()).collect();
        let race_idx = Select::with_theme(&theme)
            .with_prompt("レースを選択")
            .items(&labels)
            .default(card.iter().position(|s| s.is_main).unwrap_or(0))
            .interact()?;
        let slot = &card[race_idx];

        let start = FieldSize::new(slot.field_size).unwrap_or_default();
        let total = choose_field_size(&theme, start)?;

        println!();
        if let Err(e) = run_spin(app, &venue, slot.race_no, Some(total.get()), true) {
            println!("{}: {}", "Error".red(), e);
        }
        println!();
    }

    Ok(())
}
