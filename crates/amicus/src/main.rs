//! `amicus` - CLI for QR attendance logging
//!
//! This binary signs operators in, generates check-in payloads, runs the
//! scan loop, and manages the persisted attendance log.

#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

use chrono::Utc;
use clap::Parser;
use tokio::sync::mpsc;
use tracing::warn;

use amicus::auth::Session;
use amicus::cli::{
    Cli, Command, ConfigCommand, DeleteCommand, ExportCommand, GenerateCommand, ListCommand,
    LogCommand, LoginCommand, ScanCommand, WhoamiCommand,
};
use amicus::export::{export_filename, to_csv, write_csv};
use amicus::record::AttendanceRecord;
use amicus::scanner::{LineFeedSource, ScanSource};
use amicus::store::FileBackend;
use amicus::{init_logging, Config, IngestPipeline, RecordStore};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    init_logging(cli.verbosity());

    // Load configuration
    let config = Config::load_from(cli.config.clone())?;

    // Execute the command
    match cli.command {
        Command::Login(cmd) => handle_login(&config, &cmd),
        Command::Logout => handle_logout(&config),
        Command::Whoami(cmd) => handle_whoami(&config, &cmd),
        Command::Generate(cmd) => handle_generate(&config, &cmd),
        Command::Scan(cmd) => handle_scan(&config, cmd).await,
        Command::Log(cmd) => handle_log(&config, &cmd),
        Command::List(cmd) => handle_list(&config, &cmd),
        Command::Delete(cmd) => handle_delete(&config, &cmd),
        Command::Export(cmd) => handle_export(&config, &cmd),
        Command::Config(cmd) => handle_config(&config, cmd),
    }
}

fn backend(config: &Config) -> anyhow::Result<FileBackend> {
    Ok(FileBackend::open(config.state_dir())?)
}

fn open_store(config: &Config) -> anyhow::Result<RecordStore> {
    Ok(RecordStore::load(Box::new(backend(config)?)))
}

fn handle_login(config: &Config, cmd: &LoginCommand) -> anyhow::Result<()> {
    let session = Session::login(
        cmd.role.into(),
        &cmd.username,
        &cmd.password,
        &cmd.name,
        &cmd.course,
    )?;
    session.save(&backend(config)?)?;

    // role() is always Some for a fresh login.
    if let Some(role) = session.role() {
        println!("Signed in as {} ({role})", cmd.name);
    }
    Ok(())
}

fn handle_logout(config: &Config) -> anyhow::Result<()> {
    Session::clear(&backend(config)?)?;
    println!("Signed out.");
    Ok(())
}

fn handle_whoami(config: &Config, cmd: &WhoamiCommand) -> anyhow::Result<()> {
    let session = Session::load(&backend(config)?);

    if cmd.json {
        println!("{}", serde_json::to_string_pretty(&session)?);
        return Ok(());
    }

    match session {
        Session::SignedOut => println!("Not signed in."),
        Session::User(user) => {
            println!("{} (user)", user.full_name);
            println!("  Username: {}", user.username);
            println!("  Course:   {}", user.course);
        }
        Session::Admin(admin) => {
            println!("{} (admin)", admin.full_name);
            println!("  Username: {}", admin.username);
            println!("  Course:   {}", admin.course);
            println!("  Tab:      {:?}", admin.tab);
        }
    }
    Ok(())
}

fn handle_generate(config: &Config, cmd: &GenerateCommand) -> anyhow::Result<()> {
    let session = Session::load(&backend(config)?);
    let (full_name, course) = match &session {
        Session::User(user) => (user.full_name.clone(), user.course.clone()),
        Session::Admin(admin) => (admin.full_name.clone(), admin.course.clone()),
        Session::SignedOut => return Err(amicus::auth::AuthError::SignedOut.into()),
    };

    let payload = match &cmd.id {
        // A badge id makes this an identity payload for that person.
        Some(badge) => amicus::SessionPayload::new_identity(
            badge.clone(),
            full_name,
            Some(cmd.department.clone().unwrap_or(course)),
            cmd.email.clone(),
            Utc::now(),
        ),
        None => {
            let mut payload = amicus::SessionPayload::new_session(full_name, Utc::now());
            payload.department = Some(course);
            payload
        }
    };
    let encoded = payload.encode()?;

    match &cmd.output {
        Some(path) => {
            std::fs::write(path, &encoded)?;
            println!("Wrote check-in payload {} to {}", payload.id, path.display());
        }
        None => println!("{encoded}"),
    }
    Ok(())
}

async fn handle_scan(config: &Config, cmd: ScanCommand) -> anyhow::Result<()> {
    Session::load(&backend(config)?).require_admin()?;

    let mut store = open_store(config)?;
    let pipeline = IngestPipeline::new(config.scanner.debounce_ms);
    let mut source = LineFeedSource::new(cmd.input.clone(), &config.scanner_config());

    let (tx, mut rx) = mpsc::channel(64);
    source.start(tx).await?;
    println!("Scanning... press Ctrl-C to stop.");

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            message = rx.recv() => {
                let Some(text) = message else { break };
                match pipeline.ingest(&mut store, &text, Utc::now()) {
                    Ok(record) => {
                        println!(
                            "Recorded {} ({}) at {}",
                            record.session_name,
                            record.session_id,
                            record.scan_time()
                        );
                        if cmd.once {
                            break;
                        }
                        // Brief pause so the operator can read the confirmation.
                        tokio::time::sleep(config.cooldown()).await;
                    }
                    Err(e) => {
                        if e.should_notify(&text) {
                            warn!(error = %e, "Scan not recorded");
                        }
                    }
                }
            }
        }
    }

    source.stop().await?;
    println!("Scanner stopped. {} records in the log.", store.len());
    Ok(())
}

fn handle_log(config: &Config, cmd: &LogCommand) -> anyhow::Result<()> {
    Session::load(&backend(config)?).require_admin()?;

    let mut store = open_store(config)?;
    let record = AttendanceRecord::manual(&cmd.id, Utc::now());
    let record_id = record.id.clone();
    store.append(record)?;

    println!("Recorded manual entry {record_id} for {}", cmd.id);
    Ok(())
}

fn handle_list(config: &Config, cmd: &ListCommand) -> anyhow::Result<()> {
    Session::load(&backend(config)?).require_admin()?;
    let store = open_store(config)?;

    let records: Vec<&AttendanceRecord> = match &cmd.date {
        Some(date) => store.filter_by_date(date),
        None => store.records().iter().collect(),
    };

    if cmd.json {
        println!("{}", serde_json::to_string_pretty(&records)?);
        return Ok(());
    }

    if records.is_empty() {
        println!("No attendance records.");
        return Ok(());
    }

    if cmd.by_session {
        let groups = match &cmd.date {
            Some(_) => group_filtered(&records),
            None => store.group_by_session(),
        };
        for (session_id, members) in groups {
            println!("{session_id} ({} scans)", members.len());
            for record in members {
                print_record(record, "  ");
            }
        }
    } else {
        println!("Attendance records ({})", records.len());
        for record in &records {
            print_record(record, "  ");
        }
    }
    Ok(())
}

/// Partition a date-filtered record slice by session id, preserving
/// first-seen group order. The unfiltered case goes through
/// [`RecordStore::group_by_session`].
fn group_filtered<'a>(
    records: &[&'a AttendanceRecord],
) -> Vec<(String, Vec<&'a AttendanceRecord>)> {
    let mut groups: Vec<(String, Vec<&AttendanceRecord>)> = Vec::new();
    for &record in records {
        match groups.iter_mut().find(|(id, _)| *id == record.session_id) {
            Some((_, members)) => members.push(record),
            None => groups.push((record.session_id.clone(), vec![record])),
        }
    }
    groups
}

fn print_record(record: &AttendanceRecord, indent: &str) {
    println!(
        "{indent}{} {}  {}  {}  {}  [{}]",
        record.scan_date(),
        record.scan_time(),
        record.session_name,
        record.session_id,
        record.department,
        record.id
    );
}

fn handle_delete(config: &Config, cmd: &DeleteCommand) -> anyhow::Result<()> {
    Session::load(&backend(config)?).require_admin()?;

    if !cmd.yes {
        println!("This will permanently delete record {}.", cmd.id);
        println!("Use --yes to confirm.");
        return Ok(());
    }

    let mut store = open_store(config)?;
    if store.delete_by_id(&cmd.id)? {
        println!("Deleted record {}.", cmd.id);
    } else {
        println!("No record with id {}.", cmd.id);
    }
    Ok(())
}

fn handle_export(config: &Config, cmd: &ExportCommand) -> anyhow::Result<()> {
    Session::load(&backend(config)?).require_admin()?;
    let store = open_store(config)?;

    let records: Vec<&AttendanceRecord> = match &cmd.date {
        Some(date) => store.filter_by_date(date),
        None => store.records().iter().collect(),
    };

    let style = cmd.style.map_or(config.export.style, Into::into);
    let csv = match to_csv(&records, style) {
        Ok(csv) => csv,
        Err(e) if e.is_empty_export() => {
            println!("No records to export.");
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };

    let path = cmd.output.clone().unwrap_or_else(|| {
        config
            .export_dir()
            .join(export_filename(cmd.date.as_deref(), Utc::now()))
    });
    write_csv(&path, &csv)?;

    println!("Exported {} records to {}", records.len(), path.display());
    Ok(())
}

fn handle_config(config: &Config, cmd: ConfigCommand) -> anyhow::Result<()> {
    match cmd {
        ConfigCommand::Show { json } => {
            if json {
                println!("{}", serde_json::to_string_pretty(config)?);
            } else {
                println!("Current Configuration");
                println!("=====================");
                println!();
                println!("[Storage]");
                println!("  State directory:  {}", config.state_dir().display());
                println!();
                println!("[Scanner]");
                println!("  FPS:              {}", config.scanner.fps);
                println!("  Box (px):         {}", config.scanner.box_px);
                println!("  Rear facing:      {}", config.scanner.rear_facing);
                println!("  Debounce (ms):    {}", config.scanner.debounce_ms);
                println!("  Cooldown (ms):    {}", config.scanner.cooldown_ms);
                println!();
                println!("[Export]");
                println!("  Style:            {:?}", config.export.style);
                println!("  Output directory: {}", config.export_dir().display());
            }
        }
        ConfigCommand::Path => {
            println!("{}", Config::default_config_path().display());
        }
        ConfigCommand::Validate { file } => {
            let path = file.unwrap_or_else(Config::default_config_path);
            println!("Validating configuration: {}", path.display());
            match Config::load_from(Some(path)) {
                Ok(_) => println!("Configuration is valid."),
                Err(e) => println!("Configuration error: {e}"),
            }
        }
    }
    Ok(())
}
