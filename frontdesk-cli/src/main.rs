//! frontdesk - open-house reception desk
//!
//! Thin shell over frontdesk-core. A session file on disk is the desk's
//! state: `import` creates one from a registration file, every other
//! subcommand loads it, runs one core operation, and writes it back when
//! something mutated. `export` emits the canonical dated roster.

use anyhow::{anyhow, Context, Result};
use chrono::Local;
use clap::{Parser, ValueEnum};
use std::fs;
use std::path::{Path, PathBuf};
use tabled::{
    settings::{object::Rows, Alignment, Modify, Style},
    Table, Tabled,
};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use frontdesk_core::config::DeskConfig;
use frontdesk_core::export;
use frontdesk_core::matcher::{self, kana, Query};
use frontdesk_core::roster::stats::{CapacitySeverity, ProgramStats};
use frontdesk_core::roster::{AttendanceState, AttendeeRecord, RecordId, RosterStore};

/// Log levels
#[derive(Debug, Clone, ValueEnum)]
enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    fn to_filter_directive(&self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

/// Attendance states settable from the command line
#[derive(Debug, Clone, Copy, ValueEnum)]
enum StatusArg {
    Present,
    Absent,
    Pending,
}

impl From<StatusArg> for AttendanceState {
    fn from(arg: StatusArg) -> Self {
        match arg {
            StatusArg::Present => AttendanceState::Present,
            StatusArg::Absent => AttendanceState::Absent,
            StatusArg::Pending => AttendanceState::Pending,
        }
    }
}

#[derive(Parser, Debug)]
#[clap(
    name = "frontdesk",
    about = "Reception desk for a campus open-house: check-in, search, roster export",
    version
)]
struct Cli {
    #[clap(subcommand)]
    command: Command,

    /// Desk configuration YAML (program catalog and counting policy)
    #[clap(long, global = true)]
    config: Option<PathBuf>,

    /// Set log level
    #[clap(long, default_value = "warn", global = true)]
    log_level: LogLevel,
}

#[derive(Parser, Debug)]
enum Command {
    /// Load a registration file into a new desk session
    Import {
        /// Input file (split-name or combined-name schema)
        file: PathBuf,

        /// Session file to create
        #[clap(long, default_value = "roster.json")]
        session: PathBuf,
    },

    /// Autocomplete suggestions for a partial name (capped at 10)
    Suggest {
        query: String,

        /// Session file
        #[clap(long, default_value = "roster.json")]
        session: PathBuf,

        /// Emit JSON instead of text
        #[clap(long)]
        json: bool,
    },

    /// Full search for a name
    Search {
        query: String,

        #[clap(long, default_value = "roster.json")]
        session: PathBuf,

        #[clap(long)]
        json: bool,
    },

    /// Register a walk-in (checked in on the spot)
    Add {
        #[clap(long, default_value = "")]
        kanji: String,

        #[clap(long, default_value = "")]
        kana: String,

        /// Destination program name
        #[clap(long)]
        program: String,

        #[clap(long, default_value = "roster.json")]
        session: PathBuf,
    },

    /// Mark attendance for a record found by exact name
    Mark {
        identifier: String,

        #[clap(long)]
        status: StatusArg,

        #[clap(long, default_value = "roster.json")]
        session: PathBuf,
    },

    /// Move a record to another program
    Move {
        identifier: String,

        #[clap(long)]
        program: String,

        #[clap(long, default_value = "roster.json")]
        session: PathBuf,
    },

    /// Edit a program's seat limit for this session
    Capacity {
        /// Program id (display number)
        #[clap(long)]
        id: u32,

        #[clap(long)]
        max: usize,

        #[clap(long, default_value = "roster.json")]
        session: PathBuf,
    },

    /// Per-program head counts and the absentee list
    Stats {
        #[clap(long, default_value = "roster.json")]
        session: PathBuf,

        #[clap(long)]
        json: bool,
    },

    /// Write the canonical dated roster export
    Export {
        #[clap(long, default_value = "roster.json")]
        session: PathBuf,

        /// Output path; defaults to the dated filename
        #[clap(long)]
        out: Option<PathBuf>,
    },
}

fn initialize_tracing(log_level: &LogLevel) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log_level.to_filter_directive()));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr) // logs to stderr, results to stdout
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    initialize_tracing(&cli.log_level);

    match cli.command {
        Command::Import { file, session } => {
            let config = DeskConfig::load_or_default(cli.config.as_deref())
                .context("Failed to load desk configuration")?;
            import_command(&config, &file, &session)
        }
        Command::Suggest {
            query,
            session,
            json,
        } => query_command(&session, &query, true, json),
        Command::Search {
            query,
            session,
            json,
        } => query_command(&session, &query, false, json),
        Command::Add {
            kanji,
            kana,
            program,
            session,
        } => add_command(&session, &kanji, &kana, &program),
        Command::Mark {
            identifier,
            status,
            session,
        } => mark_command(&session, &identifier, status.into()),
        Command::Move {
            identifier,
            program,
            session,
        } => move_command(&session, &identifier, &program),
        Command::Capacity { id, max, session } => capacity_command(&session, id, max),
        Command::Stats { session, json } => stats_command(&session, json),
        Command::Export { session, out } => export_command(&session, out),
    }
}

fn load_session(path: &Path) -> Result<RosterStore> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read session file {}", path.display()))?;
    let store: RosterStore = serde_json::from_str(&text)
        .with_context(|| format!("Failed to parse session file {}", path.display()))?;
    debug!(
        "Loaded session with {} record(s) from {}",
        store.records().len(),
        path.display()
    );
    Ok(store)
}

fn write_session(store: &RosterStore, path: &Path) -> Result<()> {
    fs::write(path, serde_json::to_string_pretty(store)?)
        .with_context(|| format!("Failed to write session file {}", path.display()))?;
    info!(
        "Wrote session with {} record(s) to {}",
        store.records().len(),
        path.display()
    );
    Ok(())
}

fn find_record_id(store: &RosterStore, identifier: &str) -> Result<RecordId> {
    store
        .find_by_identifier(identifier)
        .map(|r| r.id)
        .ok_or_else(|| anyhow!("参加者が見つかりませんでした: {identifier}"))
}

fn import_command(config: &DeskConfig, file: &Path, session: &Path) -> Result<()> {
    let text =
        fs::read_to_string(file).with_context(|| format!("Failed to read {}", file.display()))?;
    let mut store = RosterStore::from_config(config);
    let summary = store.import_csv(&text)?;
    write_session(&store, session)?;

    println!("{}件のデータを読み込みました", summary.accepted);
    if summary.skipped > 0 {
        println!("{}件の不完全な行をスキップしました", summary.skipped);
    }
    println!("session: {}", session.display());
    Ok(())
}

fn query_command(session: &Path, query: &str, capped: bool, json: bool) -> Result<()> {
    let store = load_session(session)?;
    let query = Query::new(query);
    let hits = if capped {
        matcher::suggest(store.records(), &query)
    } else {
        matcher::search(store.records(), &query)
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&hits)?);
        return Ok(());
    }

    if hits.is_empty() {
        if query.is_empty() {
            return Ok(());
        }
        // Zero matches on a real query: offer registration, prefilled by
        // the script the operator typed in.
        println!("該当する参加者が見つかりませんでした。");
        let raw = query.raw();
        let prefill = match kana::classify(raw) {
            kana::Script::Katakana => format!("--kana {raw}"),
            kana::Script::Hiragana => format!("--kana {}", kana::hiragana_to_katakana(raw)),
            kana::Script::Other => format!("--kanji {raw}"),
        };
        println!("新規追加: frontdesk add {prefill} --program <プログラム名>");
        return Ok(());
    }

    for record in hits {
        print_record(record);
    }
    Ok(())
}

fn print_record(record: &AttendeeRecord) {
    let name = match (record.kanji.is_empty(), record.kana.is_empty()) {
        (false, false) => format!("{} ({})", record.kanji, record.kana),
        (false, true) => record.kanji.clone(),
        _ => record.kana.clone(),
    };
    let mut choices = Vec::new();
    if !record.first_choice.is_empty() {
        choices.push(format!("第一希望: {}", record.first_choice));
    }
    if !record.second_choice.is_empty() {
        choices.push(format!("第二希望: {}", record.second_choice));
    }
    if !record.third_choice.is_empty() {
        choices.push(format!("第三希望: {}", record.third_choice));
    }
    let choices = if choices.is_empty() {
        "希望情報なし".to_string()
    } else {
        choices.join(" / ")
    };
    println!(
        "{name}  [{}]  {}  ({}) {}",
        record.attendance.label(),
        record.program,
        record.registration.label(),
        choices
    );
}

fn add_command(session: &Path, kanji: &str, kana: &str, program: &str) -> Result<()> {
    let mut store = load_session(session)?;
    let (name, program_name) = {
        let record = store.add_walk_in(kanji, kana, program)?;
        (record.display_name().to_string(), record.program.clone())
    };
    write_session(&store, session)?;
    println!("{name}さんを{program_name}に追加し、出席登録しました");
    Ok(())
}

fn mark_command(session: &Path, identifier: &str, state: AttendanceState) -> Result<()> {
    let mut store = load_session(session)?;
    let id = find_record_id(&store, identifier)?;
    store.set_attendance(id, state)?;
    write_session(&store, session)?;
    println!("{identifier}さんを{}に設定しました", state.label());
    Ok(())
}

fn move_command(session: &Path, identifier: &str, program: &str) -> Result<()> {
    let mut store = load_session(session)?;
    let id = find_record_id(&store, identifier)?;
    let old = store
        .record(id)
        .expect("record resolved above")
        .program
        .clone();
    store.reassign(id, program)?;
    write_session(&store, session)?;
    println!("{identifier}さんのプログラムを{old}から{program}に変更しました");
    Ok(())
}

fn capacity_command(session: &Path, id: u32, max: usize) -> Result<()> {
    let mut store = load_session(session)?;
    store.set_capacity(id, max)?;
    let name = store
        .program_by_id(id)
        .expect("program resolved above")
        .name
        .clone();
    write_session(&store, session)?;
    println!("{name}の最大人数を{max}人に変更しました");
    Ok(())
}

#[derive(Tabled)]
struct StatsTableRow {
    #[tabled(rename = "No.")]
    id: u32,
    #[tabled(rename = "プログラム")]
    program: String,
    #[tabled(rename = "出席/最大")]
    present: String,
    #[tabled(rename = "事前登録")]
    pre_registered: String,
    #[tabled(rename = "当日")]
    walk_ins: usize,
    #[tabled(rename = "欠席")]
    absent: usize,
    #[tabled(rename = "状態")]
    status: String,
}

#[derive(serde::Serialize)]
struct StatsOutput<'a> {
    programs: Vec<ProgramStats>,
    absentees: Vec<&'a AttendeeRecord>,
}

fn stats_command(session: &Path, json: bool) -> Result<()> {
    let store = load_session(session)?;
    let stats = store.program_stats();

    if json {
        let output = StatsOutput {
            programs: stats,
            absentees: store.absentees(),
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    let rows: Vec<StatsTableRow> = stats
        .iter()
        .map(|s| StatsTableRow {
            id: s.program_id,
            program: s.program_name.clone(),
            present: format!("{}/{}", s.present, s.max_members),
            pre_registered: format!("{}/{}", s.pre_registered_present, s.pre_registered),
            walk_ins: s.walk_ins,
            absent: s.absent,
            status: {
                let severity = match s.severity {
                    CapacitySeverity::Over => "定員超過",
                    CapacitySeverity::AtLimit => "定員到達",
                    CapacitySeverity::Ok => "",
                };
                if s.full && severity.is_empty() {
                    "満員".to_string()
                } else if s.full {
                    format!("満員・{severity}")
                } else {
                    severity.to_string()
                }
            },
        })
        .collect();

    let table = Table::new(&rows)
        .with(Style::rounded())
        .with(Modify::new(Rows::first()).with(Alignment::center()))
        .to_string();
    println!("{table}");

    let absentees = store.absentees();
    if !absentees.is_empty() {
        println!("\n欠席者:");
        for record in absentees {
            println!("  {}  ({})", record.display_name(), record.program);
        }
    }
    Ok(())
}

fn export_command(session: &Path, out: Option<PathBuf>) -> Result<()> {
    let store = load_session(session)?;
    if store.records().is_empty() {
        return Err(anyhow!("出力するデータがありません"));
    }
    let out = out.unwrap_or_else(|| {
        PathBuf::from(export::export_filename(Local::now().date_naive(), "csv"))
    });
    fs::write(&out, export::export_csv(store.records()))
        .with_context(|| format!("Failed to write {}", out.display()))?;
    println!("{}", out.display());
    Ok(())
}
