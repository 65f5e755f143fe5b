//! Media command implementation.

use std::path::Path;

use teoremer_domain::traits::ItemStore;
use teoremer_domain::{MediaId, MediaItem, MediaKind};

use crate::cli::{MediaAction, MediaArgs};
use crate::commands::Session;
use crate::config::OutputFormat;
use crate::error::{CliError, Result};
use crate::output::Formatter;

/// Execute the media command.
pub fn execute_media(args: MediaArgs, session: &mut Session, formatter: &Formatter) -> Result<()> {
    match args.action {
        MediaAction::Add { id, path, thumbnail } => {
            let public_id = MediaId::new(id).map_err(CliError::InvalidInput)?;
            if !Path::new(&path).is_file() {
                return Err(CliError::InvalidInput(format!("No such file: {}", path)));
            }
            let kind = if thumbnail {
                MediaKind::Thumbnail
            } else {
                MediaKind::Original
            };

            session.store.add_media(&MediaItem {
                public_id: public_id.clone(),
                path,
                kind,
            })?;
            tracing::info!(media = %public_id, thumbnail, "media registered");

            match formatter.format() {
                OutputFormat::Table => println!("{}", formatter.success(&format!("Registered media {}", public_id))),
                _ => println!("{}", public_id),
            }
        }
    }

    Ok(())
}
