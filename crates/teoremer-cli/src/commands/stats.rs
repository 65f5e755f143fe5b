//! Stats command implementation.

use teoremer_domain::traits::ItemStore;

use crate::commands::Session;
use crate::error::Result;
use crate::output::Formatter;

/// Execute the stats command.
pub fn execute_stats(session: &Session, formatter: &Formatter) -> Result<()> {
    let counts = session.store.count_items()?;
    println!("{}", formatter.format_counts(&counts)?);
    Ok(())
}
