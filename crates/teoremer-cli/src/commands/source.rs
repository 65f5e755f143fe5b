//! Source and citation command implementation.

use teoremer_domain::{DraftId, NewSource, SourceId, ValidationId, ValidationTarget};

use crate::cli::{SourceAction, SourceArgs, SourceFields};
use crate::commands::{parse_final_id, Session};
use crate::config::OutputFormat;
use crate::error::{CliError, Result};
use crate::output::Formatter;

impl From<SourceFields> for NewSource {
    fn from(fields: SourceFields) -> Self {
        NewSource {
            sourcetype: fields.sourcetype,
            authors: fields.authors,
            editors: fields.editors,
            title: fields.title,
            publisher: fields.publisher,
            year: fields.year,
            volume: fields.volume,
            number: fields.number,
            series: fields.series,
            address: fields.address,
            edition: fields.edition,
            month: fields.month,
            journal: fields.journal,
            pages: fields.pages,
            isbn10: fields.isbn10,
            isbn13: fields.isbn13,
            note: fields.note,
        }
    }
}

/// Execute the source command.
pub fn execute_source(args: SourceArgs, session: &mut Session, formatter: &Formatter) -> Result<()> {
    match args.action {
        SourceAction::Add(fields) => {
            if fields.sourcetype.trim().is_empty() {
                return Err(CliError::InvalidInput("Source type cannot be empty".to_string()));
            }
            let actor = session.actor()?;
            let node = session.ledger.create_source(&mut session.store, actor, fields.into())?;

            match formatter.format() {
                OutputFormat::Table => println!(
                    "{}\n{}",
                    formatter.success(&format!("Registered source {}", node.id)),
                    node.citation()
                ),
                _ => println!("{}", formatter.format_source(&node, &[])?),
            }
        }

        SourceAction::List => {
            let sources = session.ledger.sources(&session.store)?;
            println!("{}", formatter.format_sources(&sources)?);
        }

        SourceAction::Show { id } => {
            let id = SourceId::from_value(id);
            let node = session.ledger.source(&session.store, id)?;
            let evidence = session.ledger.entries_citing(&session.store, id)?;
            println!("{}", formatter.format_source(&node, &evidence)?);
        }

        SourceAction::Cite {
            source,
            item,
            draft,
            location,
        } => {
            let actor = session.actor()?;
            let target = match (item, draft) {
                (Some(item), _) => ValidationTarget::Final(parse_final_id(&item)?),
                (None, Some(draft)) => ValidationTarget::Draft(DraftId::from_value(draft)),
                (None, None) => {
                    return Err(CliError::InvalidInput("Pass --item or --draft".to_string()));
                }
            };

            let entry = session.ledger.record(
                &mut session.store,
                target,
                SourceId::from_value(source),
                actor,
                location.as_deref(),
            )?;

            match formatter.format() {
                OutputFormat::Table => println!(
                    "{}",
                    formatter.success(&format!("Recorded validation {} for {}", entry.id, entry.target))
                ),
                _ => println!("{}", formatter.format_validations(&[(entry, 1)])?),
            }
        }

        SourceAction::Endorse { validation } => {
            let actor = session.actor()?;
            let id = ValidationId::from_string(validation.trim()).map_err(CliError::InvalidInput)?;
            let endorsement = session.ledger.endorse(&mut session.store, id, actor)?;

            match formatter.format() {
                OutputFormat::Table => println!(
                    "{}",
                    formatter.success(&format!("Endorsed validation {}", endorsement.validation))
                ),
                _ => println!("{}", endorsement.validation),
            }
        }
    }

    Ok(())
}
