//! Import command handler

use anyhow::{Context, Result, bail};
use colored::*;
use is_terminal::IsTerminal;

use super::ImportArgs;
use crate::api::TaskApiClient;
use crate::cli::output::{print_mapping, print_preview, print_summary};
use crate::cli::review::{ReviewAction, prompt_file_path, review_mapping};
use crate::config::Config;
use crate::import::{
    AssigneeDirectory, DryRunCreator, ImportResult, ImportSession, TaskField,
};

/// Handle the import command
pub async fn handle_import_command(args: &ImportArgs, config: &Config) -> Result<()> {
    let mut session = ImportSession::new(args.project);
    session.load_file(&args.file)?;
    apply_overrides(&mut session, args)?;

    let interactive =
        !args.yes && std::io::stdin().is_terminal() && std::io::stdout().is_terminal();

    if interactive {
        if !review(&mut session)? {
            println!("{}", "Import cancelled.".yellow());
            return Ok(());
        }
    } else {
        print_mapping(session.mapping());
        println!();
        if let Some(sheet) = session.sheet() {
            print_preview(sheet, session.mapping());
        }
        if !session.can_import() {
            bail!(
                "No column is mapped to the title field. Use --map title=<Column> to choose one."
            );
        }
    }

    let result = if args.dry_run {
        dry_run(&mut session).await?
    } else {
        import_with_api(&mut session, config).await?
    };

    print_summary(&result);
    if !result.errors.is_empty() {
        bail!(
            "{} of {} tasks failed to import",
            result.failed(),
            result.failed() + result.succeeded
        );
    }
    Ok(())
}

/// Apply `--map` and `--unmap` on top of the suggested mapping
fn apply_overrides(session: &mut ImportSession, args: &ImportArgs) -> Result<()> {
    let headers = session
        .sheet()
        .map(|s| s.headers.clone())
        .unwrap_or_default();

    for entry in &args.map {
        session.mapping_mut().apply_override(entry, &headers)?;
    }
    for name in &args.unmap {
        let field: TaskField = name.parse()?;
        session.mapping_mut().clear(field);
    }
    Ok(())
}

/// Interactive review loop; returns false when the user cancels
fn review(session: &mut ImportSession) -> Result<bool> {
    loop {
        match review_mapping(session)? {
            ReviewAction::Import => return Ok(true),
            ReviewAction::Cancel => return Ok(false),
            ReviewAction::ChooseAnotherFile => {
                session.back_to_upload()?;
                loop {
                    let path = prompt_file_path()?;
                    match session.load_file(&path) {
                        Ok(()) => break,
                        Err(e) => eprintln!("{} {:#}", "Error:".red(), e),
                    }
                }
            }
        }
    }
}

async fn dry_run(session: &mut ImportSession) -> Result<ImportResult> {
    println!();
    println!("{}", "Dry run: no tasks will be created".yellow());

    let creator = DryRunCreator::new();
    session.import(&creator, None).await?;
    let result = finished_result(session)?;

    for (id, task) in creator.into_created() {
        let payload = serde_json::to_string(&task).context("Failed to serialize task")?;
        println!("  {} {}", format!("#{}", id).dimmed(), payload);
    }
    Ok(result)
}

async fn import_with_api(session: &mut ImportSession, config: &Config) -> Result<ImportResult> {
    let client = TaskApiClient::new(&config.api)?;

    let project = client
        .get_project(session.project_id())
        .await
        .with_context(|| format!("Failed to load project {}", session.project_id()))?;
    println!();
    println!(
        "Importing into project {} {}",
        project.name.bright_green().bold(),
        format!("(#{})", project.id).dimmed()
    );
    if let Some(state) = &project.state {
        log::info!("Project state: {}", state);
    }
    if let Some(total) = project.total_tasks {
        println!("{}", format!("Project currently has {} tasks", total).dimmed());
    }

    let assignees = if session.mapping().column(TaskField::Assignee).is_some() {
        let users = client
            .list_users()
            .await
            .context("Failed to load users for assignee lookup")?;
        let directory = AssigneeDirectory::from_users(&users);
        if directory.is_empty() {
            log::warn!("No active users found; assignees will be left empty");
        } else {
            log::info!("Resolving assignees against {} names and emails", directory.len());
        }
        Some(directory)
    } else {
        None
    };

    session.import(&client, assignees.as_ref()).await?;
    finished_result(session)
}

/// Result of a finished session; a blocked import has none
fn finished_result(session: &ImportSession) -> Result<ImportResult> {
    log::debug!("Import session is {}", session.step());
    session
        .result()
        .cloned()
        .context("Import blocked: title column is not mapped")
}
