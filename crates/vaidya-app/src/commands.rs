use anyhow::{anyhow, bail, Context, Result};
use std::path::Path;
use vaidya_chat::{ChatSession, FAILURE_RAW_TEXT};
use vaidya_persist::{
    AppointmentStatus, AppointmentWrite, Collection, NewAppointment, PersistClient, WriteOutcome,
};

use crate::app::build_assistant;
use crate::cli::{AppointmentCommand, BookArgs, FeedbackArgs, HistoryCommand};
use crate::config::Config;

pub async fn ask(config: &Config, persist: PersistClient, query: &str, html: bool) -> Result<()> {
    let assistant = build_assistant(config)?;
    let mut session = ChatSession::open_with(assistant, persist).await;

    let turn = session
        .send(query)
        .await
        .cloned()
        .ok_or_else(|| anyhow!("Nothing to ask: the query is blank"))?;

    if html || turn.raw_text == FAILURE_RAW_TEXT {
        println!("{}", turn.response);
    } else {
        println!("{}", turn.raw_text);
    }

    if let Some(entry) = session.new_chat().await {
        println!("\n(saved as conversation {})", entry.id);
    }
    Ok(())
}

pub async fn history(persist: &PersistClient, command: HistoryCommand) -> Result<()> {
    let repo = persist.chat_history();
    match command {
        HistoryCommand::List { all } => {
            let entries = if all { repo.load().await } else { repo.load_active().await };
            if entries.is_empty() {
                println!("No conversations yet.");
            }
            for entry in entries {
                println!(
                    "{}  {}  {} ({} turns)",
                    entry.id,
                    entry.created_at.format("%Y-%m-%d %H:%M"),
                    entry.short_preview(),
                    entry.chats.len()
                );
            }
        }
        HistoryCommand::Show { id } => {
            let entry = repo
                .get(id)
                .await
                .ok_or_else(|| anyhow!("No conversation with id {}", id))?;
            for turn in &entry.chats {
                println!("> {}\n\n{}\n", turn.text, turn.raw_text);
            }
        }
        HistoryCommand::Export { dir } => {
            let path = repo.export_to(&dir).await.context("Failed to export chat history")?;
            println!("Exported to {}", path.display());
        }
        HistoryCommand::Import { file } => import(persist, &file).await?,
        HistoryCommand::Delete { id } => report(repo.delete(id).await)?,
        HistoryCommand::Clear => report(repo.clear_all().await)?,
        HistoryCommand::Dump { collection } => {
            let collection = Collection::from_name(&collection)
                .ok_or_else(|| anyhow!("Unknown collection: {}", collection))?;
            let records = persist.dump(collection).await?;
            println!("{}", serde_json::to_string_pretty(&records)?);
        }
    }
    Ok(())
}

async fn import(persist: &PersistClient, file: &Path) -> Result<()> {
    let (entries, outcome) = persist
        .chat_history()
        .import_from(file)
        .await
        .with_context(|| format!("Failed to import chat history from {}", file.display()))?;
    println!("Imported {} conversations", entries.len());
    report(outcome)
}

pub async fn appointments(persist: &PersistClient, command: AppointmentCommand) -> Result<()> {
    let repo = persist.appointments();
    match command {
        AppointmentCommand::List => {
            let appointments = repo.load_all().await;
            if appointments.is_empty() {
                println!("No appointments.");
            }
            for a in appointments {
                println!(
                    "{}  {:<10} {} {}  {} with {}",
                    a.id, a.status, a.date, a.time, a.name, a.doctor_name
                );
            }
        }
        AppointmentCommand::Show { id } => {
            let appointment = repo
                .get_by_id(id.as_str())
                .await
                .ok_or_else(|| anyhow!("Appointment not found: {}", id))?;
            println!("{}", serde_json::to_string_pretty(&appointment)?);
        }
        AppointmentCommand::Book(args) => book(persist, args).await?,
        AppointmentCommand::Respond { id, status } => {
            let status: AppointmentStatus = status.parse()?;
            let notice = repo.handle_doctor_response(id.as_str(), status).await?;
            println!("{}", serde_json::to_string_pretty(&notice)?);
        }
    }
    Ok(())
}

async fn book(persist: &PersistClient, args: BookArgs) -> Result<()> {
    let mut request = NewAppointment::new(args.name, args.email, args.doctor, args.date, args.time);
    if let Some(id) = args.id {
        request = request.with_id(id);
    }
    match persist.appointments().save(request).await? {
        AppointmentWrite::Stored(id) => println!("Booked appointment {}", id),
        AppointmentWrite::Degraded { id, reason } => {
            println!("Booked appointment {} (local copy only: {})", id, reason)
        }
    }
    Ok(())
}

pub async fn feedback(persist: &PersistClient, args: FeedbackArgs) -> Result<()> {
    let entry = persist
        .feedback()
        .record(Some(args.chat_id), args.message_index, args.positive)
        .await
        .context("Failed to save feedback")?;
    println!("Recorded feedback {}", entry.id);
    Ok(())
}

pub fn show_config(config: &Config) -> Result<()> {
    print!("{}", toml::to_string_pretty(&config.redacted())?);
    Ok(())
}

fn report(outcome: WriteOutcome) -> Result<()> {
    if outcome.is_failed() {
        bail!("Nothing was stored: {}", outcome);
    }
    if outcome.is_partial() {
        tracing::warn!(%outcome, "write reached only one backend");
    }
    println!("Done ({})", outcome);
    Ok(())
}
