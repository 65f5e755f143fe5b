//! Published item command implementation.

use teoremer_domain::traits::{FinalQuery, ItemStore};
use teoremer_domain::{FinalStatus, ValidationTarget};

use crate::cli::{ItemAction, ItemArgs};
use crate::commands::{parse_final_id, Session};
use crate::config::OutputFormat;
use crate::error::Result;
use crate::output::Formatter;

/// Execute the item command.
pub fn execute_item(args: ItemArgs, session: &mut Session, formatter: &Formatter) -> Result<()> {
    match args.action {
        ItemAction::Show { id } => {
            let actor = session.actor()?;
            let id = parse_final_id(&id)?;
            let item = session.workflow.view_final(&session.store, actor, &id)?;
            let points = session.ledger.item_points(&session.store, &id)?;
            let evidence = session
                .ledger
                .entries_for(&session.store, &ValidationTarget::Final(id))?;
            println!("{}", formatter.format_final(&item, points, &evidence)?);
        }

        ItemAction::List {
            itemtype,
            parent,
            by,
            suspended,
            limit,
        } => {
            let created_by = by.map(|name| session.resolve_user(&name)).transpose()?;
            let parent = parent.map(|p| parse_final_id(&p)).transpose()?;
            let status = if suspended {
                FinalStatus::Suspended
            } else {
                FinalStatus::Final
            };

            let items = session.store.query_finals(&FinalQuery {
                itemtype: itemtype.map(Into::into),
                status: Some(status),
                created_by,
                parent,
                limit,
            })?;
            println!("{}", formatter.format_finals(&items)?);
        }

        ItemAction::Suspend { id, restore } => {
            let actor = session.actor()?;
            let id = parse_final_id(&id)?;
            let status = if restore {
                FinalStatus::Final
            } else {
                FinalStatus::Suspended
            };

            let item = session
                .workflow
                .set_final_status(&mut session.store, actor, &id, status)?;
            match formatter.format() {
                OutputFormat::Table => println!(
                    "{}",
                    formatter.success(&format!("{} is now {}", item.final_id, item.status))
                ),
                _ => println!("{}", formatter.format_finals(std::slice::from_ref(&item))?),
            }
        }
    }

    Ok(())
}
