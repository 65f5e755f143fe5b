//! Draft command implementation.

use std::io::{self, Write};

use teoremer_domain::traits::{DraftQuery, ItemStore};
use teoremer_domain::{DraftId, NewDraft};
use teoremer_workflow::Transition;

use crate::cli::{DraftAction, DraftArgs};
use crate::commands::{parse_final_id, read_body, Session};
use crate::config::OutputFormat;
use crate::error::{CliError, Result};
use crate::output::Formatter;

/// Execute the draft command.
pub fn execute_draft(args: DraftArgs, session: &mut Session, formatter: &Formatter) -> Result<()> {
    let actor = session.actor()?;
    let Session { store, workflow, ledger, .. } = session;

    match args.action {
        DraftAction::New {
            itemtype,
            body,
            file,
            parent,
        } => {
            let body = read_body(body, file)?;
            let mut new = NewDraft::new(itemtype.into(), body, actor);
            if let Some(parent) = parent {
                new = new.with_parent(parse_final_id(&parent)?);
            }

            let draft = workflow.create_draft(store, new)?;
            match formatter.format() {
                OutputFormat::Table => println!(
                    "{}",
                    formatter.success(&format!("Created {} draft {}", draft.itemtype, draft.id))
                ),
                _ => println!("{}", formatter.format_draft(&draft)?),
            }
        }

        DraftAction::Edit { id, body, file } => {
            let body = read_body(body, file)?;
            let draft = workflow.edit_body(store, actor, DraftId::from_value(id), &body)?;
            match formatter.format() {
                OutputFormat::Table => println!("{}", formatter.success(&format!("Updated draft {}", draft.id))),
                _ => println!("{}", formatter.format_draft(&draft)?),
            }
        }

        DraftAction::Show { id } => {
            let draft = workflow.view_draft(&*store, actor, DraftId::from_value(id))?;
            println!("{}", formatter.format_draft(&draft)?);
        }

        DraftAction::List {
            itemtype,
            status,
            limit,
        } => {
            let drafts = store.query_drafts(&DraftQuery {
                itemtype: itemtype.map(Into::into),
                status: status.map(Into::into),
                created_by: Some(actor),
                limit,
            })?;
            println!("{}", formatter.format_drafts(&drafts)?);
        }

        DraftAction::Check { id } => {
            let issues = workflow.check(&*store, actor, DraftId::from_value(id))?;
            println!("{}", formatter.format_issues(&issues)?);
        }

        DraftAction::Review { id } => {
            report(workflow.to_review(store, actor, DraftId::from_value(id))?, formatter)?;
        }

        DraftAction::Revert { id } => {
            report(workflow.to_draft(store, actor, DraftId::from_value(id))?, formatter)?;
        }

        DraftAction::Publish { id } => {
            let outcome = workflow.to_final(store, actor, DraftId::from_value(id))?;
            if let Transition::Published(item) = &outcome {
                ledger.rescore(store, &item.final_id)?;
            }
            report(outcome, formatter)?;
        }

        DraftAction::Delete { id, yes } => {
            let id = DraftId::from_value(id);
            // Surface a missing draft before prompting.
            let draft = workflow.view_draft(&*store, actor, id)?;

            if !yes {
                println!("About to delete {} draft {}.", draft.itemtype, draft.id);
                print!("Continue? [y/N] ");
                io::stdout().flush()?;

                let mut response = String::new();
                io::stdin().read_line(&mut response)?;

                if !response.trim().eq_ignore_ascii_case("y") {
                    println!("{}", formatter.info("Operation cancelled"));
                    return Ok(());
                }
            }

            report(workflow.delete(store, actor, id)?, formatter)?;
        }
    }

    Ok(())
}

/// Print a transition outcome; a refused transition is an error.
fn report(outcome: Transition, formatter: &Formatter) -> Result<()> {
    println!("{}", formatter.format_transition(&outcome)?);
    match outcome {
        Transition::Blocked(issues) => Err(CliError::Blocked(issues.len())),
        _ => Ok(()),
    }
}
