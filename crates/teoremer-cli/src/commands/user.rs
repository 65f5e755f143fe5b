//! User command implementation.

use teoremer_domain::traits::{DraftQuery, FinalQuery, ItemStore};
use teoremer_domain::FinalStatus;

use crate::cli::{UserAction, UserArgs};
use crate::commands::Session;
use crate::config::OutputFormat;
use crate::error::{CliError, Result};
use crate::output::Formatter;

/// Execute the user command.
pub fn execute_user(args: UserArgs, session: &mut Session, formatter: &Formatter) -> Result<()> {
    match args.action {
        UserAction::Add { name } => {
            let name = name.trim();
            if name.is_empty() {
                return Err(CliError::InvalidInput("User name cannot be empty".to_string()));
            }
            let user = session.store.create_user(name)?;
            tracing::info!(user = %user.id, name = %user.name, "user registered");

            match formatter.format() {
                OutputFormat::Table => println!("{}", formatter.success(&format!("Registered user '{}'", user.name))),
                _ => println!("{}", formatter.format_users(std::slice::from_ref(&user))?),
            }
        }

        UserAction::List => {
            let users = session.store.list_users()?;
            println!("{}", formatter.format_users(&users)?);
        }

        UserAction::Show { name } => {
            let name = match name.as_deref().or(session.user_name()) {
                Some(name) => name.to_string(),
                None => return Err(CliError::NoUser),
            };
            let user = session.resolve_user(&name)?;

            let published = session.store.query_finals(&FinalQuery {
                created_by: Some(user),
                status: Some(FinalStatus::Final),
                ..Default::default()
            })?;
            println!("{}", formatter.format_finals(&published)?);

            // Drafts are private to their author.
            if session.user_name() == Some(name.as_str()) {
                let drafts = session.store.query_drafts(&DraftQuery {
                    created_by: Some(user),
                    ..Default::default()
                })?;
                if formatter.format() == OutputFormat::Table {
                    println!();
                }
                println!("{}", formatter.format_drafts(&drafts)?);
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::testing;

    #[test]
    fn test_add_and_list_users() {
        let mut session = testing::session();
        let formatter = Formatter::new(OutputFormat::Quiet, false);

        execute_user(UserArgs { action: UserAction::Add { name: "bob".to_string() } }, &mut session, &formatter).unwrap();
        assert!(session.resolve_user("bob").is_ok());

        let duplicate = execute_user(UserArgs { action: UserAction::Add { name: "bob".to_string() } }, &mut session, &formatter);
        assert!(matches!(duplicate, Err(CliError::Store(_))));
    }

    #[test]
    fn test_blank_name_rejected() {
        let mut session = testing::session();
        let formatter = Formatter::new(OutputFormat::Quiet, false);
        let result = execute_user(UserArgs { action: UserAction::Add { name: "  ".to_string() } }, &mut session, &formatter);
        assert!(matches!(result, Err(CliError::InvalidInput(_))));
    }
}
