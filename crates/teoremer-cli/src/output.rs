//! Output formatting for the CLI.

use crate::config::OutputFormat;
use crate::error::Result;
use colored::*;
use serde_json::{json, Value};
use tabled::{
    builder::Builder,
    settings::{object::Rows, Alignment, Modify, Style},
};
use teoremer_domain::traits::ItemCounts;
use teoremer_domain::{DraftItem, FinalItem, Issue, ItemType, RefNode, User, ValidationEntry};
use teoremer_workflow::Transition;

/// Output formatter.
pub struct Formatter {
    format: OutputFormat,
    color_enabled: bool,
}

fn draft_json(d: &DraftItem) -> Value {
    json!({
        "id": d.id.value(),
        "itemtype": d.itemtype.as_str(),
        "status": d.status.as_str(),
        "body": d.body,
        "created_by": d.created_by.value(),
        "parent": d.parent.as_ref().map(|p| p.to_string()),
        "created_at": d.created_at,
        "modified_at": d.modified_at
    })
}

fn final_json(f: &FinalItem) -> Value {
    json!({
        "id": f.final_id.to_string(),
        "itemtype": f.itemtype.as_str(),
        "status": f.status.as_str(),
        "body": f.body,
        "created_by": f.created_by.value(),
        "parent": f.parent.as_ref().map(|p| p.to_string()),
        "created_at": f.created_at
    })
}

fn validation_json(entry: &ValidationEntry, endorsements: usize) -> Value {
    json!({
        "id": entry.id.to_string(),
        "target": entry.target.to_string(),
        "source": entry.source.value(),
        "location": entry.location,
        "created_by": entry.created_by.value(),
        "created_at": entry.created_at,
        "endorsements": endorsements
    })
}

fn source_json(node: &RefNode) -> Value {
    let f = &node.fields;
    json!({
        "id": node.id.value(),
        "sourcetype": f.sourcetype,
        "authors": f.authors,
        "editors": f.editors,
        "title": f.title,
        "publisher": f.publisher,
        "year": f.year,
        "volume": f.volume,
        "number": f.number,
        "series": f.series,
        "address": f.address,
        "edition": f.edition,
        "month": f.month,
        "journal": f.journal,
        "pages": f.pages,
        "isbn10": f.isbn10,
        "isbn13": f.isbn13,
        "note": f.note,
        "citation": node.citation(),
        "created_by": node.created_by.value(),
        "created_at": node.created_at
    })
}

/// First line of a body, shortened for tables.
fn preview(body: &str) -> String {
    let line = body.lines().next().unwrap_or("").trim();
    if line.chars().count() > 48 {
        format!("{}…", line.chars().take(47).collect::<String>())
    } else {
        line.to_string()
    }
}

impl Formatter {
    /// Create a new formatter.
    pub fn new(format: OutputFormat, color_enabled: bool) -> Self {
        Self {
            format,
            color_enabled,
        }
    }

    /// Selected output format.
    pub fn format(&self) -> OutputFormat {
        self.format
    }

    fn table(&self, header: &[&str], rows: Vec<Vec<String>>) -> String {
        let mut builder = Builder::default();
        builder.push_record(header.iter().map(|h| h.to_string()));
        for row in rows {
            builder.push_record(row);
        }

        let mut table = builder.build();
        table
            .with(Style::rounded())
            .with(Modify::new(Rows::first()).with(Alignment::center()));
        table.to_string()
    }

    /// Format users.
    pub fn format_users(&self, users: &[User]) -> Result<String> {
        match self.format {
            OutputFormat::Json => {
                let values: Vec<Value> = users
                    .iter()
                    .map(|u| json!({ "id": u.id.value(), "name": u.name, "created_at": u.created_at }))
                    .collect();
                Ok(serde_json::to_string_pretty(&values)?)
            }
            OutputFormat::Quiet => Ok(users.iter().map(|u| u.name.clone()).collect::<Vec<_>>().join("\n")),
            OutputFormat::Table => {
                if users.is_empty() {
                    return Ok(self.colorize("No users found.", "yellow"));
                }
                let rows = users
                    .iter()
                    .map(|u| vec![u.id.to_string(), u.name.clone()])
                    .collect();
                Ok(self.table(&["ID", "Name"], rows))
            }
        }
    }

    /// Format drafts.
    pub fn format_drafts(&self, drafts: &[DraftItem]) -> Result<String> {
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(&drafts.iter().map(draft_json).collect::<Vec<_>>())?),
            OutputFormat::Quiet => Ok(drafts.iter().map(|d| d.id.to_string()).collect::<Vec<_>>().join("\n")),
            OutputFormat::Table => {
                if drafts.is_empty() {
                    return Ok(self.colorize("No drafts found.", "yellow"));
                }
                let rows = drafts
                    .iter()
                    .map(|d| {
                        vec![
                            d.id.to_string(),
                            d.itemtype.to_string(),
                            d.status.to_string(),
                            d.parent.as_ref().map(|p| p.to_string()).unwrap_or_default(),
                            preview(&d.body),
                        ]
                    })
                    .collect();
                Ok(self.table(&["ID", "Type", "Status", "Parent", "Body"], rows))
            }
        }
    }

    /// Format a single draft with its full body.
    pub fn format_draft(&self, draft: &DraftItem) -> Result<String> {
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(&draft_json(draft))?),
            OutputFormat::Quiet => Ok(draft.id.to_string()),
            OutputFormat::Table => {
                let mut out = format!(
                    "{} {} ({})\n",
                    self.colorize(&format!("Draft {}", draft.id), "cyan"),
                    draft.itemtype,
                    draft.status
                );
                if let Some(parent) = &draft.parent {
                    out.push_str(&format!("Proof of {}\n", parent));
                }
                out.push('\n');
                out.push_str(&draft.body);
                Ok(out)
            }
        }
    }

    /// Format published items.
    pub fn format_finals(&self, items: &[FinalItem]) -> Result<String> {
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(&items.iter().map(final_json).collect::<Vec<_>>())?),
            OutputFormat::Quiet => Ok(items.iter().map(|f| f.final_id.to_string()).collect::<Vec<_>>().join("\n")),
            OutputFormat::Table => {
                if items.is_empty() {
                    return Ok(self.colorize("No items found.", "yellow"));
                }
                let rows = items
                    .iter()
                    .map(|f| {
                        vec![
                            f.final_id.to_string(),
                            f.itemtype.to_string(),
                            f.status.to_string(),
                            f.parent.as_ref().map(|p| p.to_string()).unwrap_or_default(),
                            preview(&f.body),
                        ]
                    })
                    .collect();
                Ok(self.table(&["ID", "Type", "Status", "Parent", "Body"], rows))
            }
        }
    }

    /// Format a published item with its evidence and trust.
    pub fn format_final(&self, item: &FinalItem, points: f64, evidence: &[(ValidationEntry, usize)]) -> Result<String> {
        match self.format {
            OutputFormat::Json => {
                let mut value = final_json(item);
                value["points"] = json!(points);
                value["validations"] = evidence.iter().map(|(e, n)| validation_json(e, *n)).collect();
                Ok(serde_json::to_string_pretty(&value)?)
            }
            OutputFormat::Quiet => Ok(item.final_id.to_string()),
            OutputFormat::Table => {
                let mut out = format!("{} ({})\n", self.colorize(&item.to_string(), "cyan"), item.status);
                if let Some(parent) = &item.parent {
                    out.push_str(&format!("Proof of {}\n", parent));
                }
                out.push_str(&format!("Trust: {:.2}\n\n", points));
                out.push_str(&item.body);
                if !evidence.is_empty() {
                    out.push_str("\n\n");
                    out.push_str(&self.validations_table(evidence));
                }
                Ok(out)
            }
        }
    }

    /// Format validation entries.
    pub fn format_validations(&self, evidence: &[(ValidationEntry, usize)]) -> Result<String> {
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(
                &evidence.iter().map(|(e, n)| validation_json(e, *n)).collect::<Vec<_>>(),
            )?),
            OutputFormat::Quiet => Ok(evidence.iter().map(|(e, _)| e.id.to_string()).collect::<Vec<_>>().join("\n")),
            OutputFormat::Table => {
                if evidence.is_empty() {
                    return Ok(self.colorize("No citations found.", "yellow"));
                }
                Ok(self.validations_table(evidence))
            }
        }
    }

    fn validations_table(&self, evidence: &[(ValidationEntry, usize)]) -> String {
        let rows = evidence
            .iter()
            .map(|(e, n)| {
                vec![
                    e.id.to_string(),
                    e.target.to_string(),
                    e.source.to_string(),
                    e.location.clone().unwrap_or_default(),
                    n.to_string(),
                ]
            })
            .collect();
        self.table(&["Validation", "Target", "Source", "Location", "Endorsements"], rows)
    }

    /// Format sources.
    pub fn format_sources(&self, sources: &[RefNode]) -> Result<String> {
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(&sources.iter().map(source_json).collect::<Vec<_>>())?),
            OutputFormat::Quiet => Ok(sources.iter().map(|s| s.id.to_string()).collect::<Vec<_>>().join("\n")),
            OutputFormat::Table => {
                if sources.is_empty() {
                    return Ok(self.colorize("No sources found.", "yellow"));
                }
                let rows = sources
                    .iter()
                    .map(|s| vec![s.id.to_string(), s.fields.sourcetype.clone(), s.citation()])
                    .collect();
                Ok(self.table(&["ID", "Type", "Citation"], rows))
            }
        }
    }

    /// Format a source and the evidence citing it.
    pub fn format_source(&self, source: &RefNode, evidence: &[(ValidationEntry, usize)]) -> Result<String> {
        match self.format {
            OutputFormat::Json => {
                let mut value = source_json(source);
                value["validations"] = evidence.iter().map(|(e, n)| validation_json(e, *n)).collect();
                Ok(serde_json::to_string_pretty(&value)?)
            }
            OutputFormat::Quiet => Ok(source.id.to_string()),
            OutputFormat::Table => {
                let mut out = format!("{} [{}]\n{}", self.colorize(&source.to_string(), "cyan"), source.fields.sourcetype, source.citation());
                if !evidence.is_empty() {
                    out.push_str("\n\n");
                    out.push_str(&self.validations_table(evidence));
                }
                Ok(out)
            }
        }
    }

    /// Format blocking issues.
    pub fn format_issues(&self, issues: &[Issue]) -> Result<String> {
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(
                &issues.iter().map(|i| i.to_string()).collect::<Vec<_>>(),
            )?),
            OutputFormat::Quiet | OutputFormat::Table => {
                if issues.is_empty() {
                    return Ok(self.success("No issues found"));
                }
                Ok(issues
                    .iter()
                    .map(|i| self.warning(&i.to_string()))
                    .collect::<Vec<_>>()
                    .join("\n"))
            }
        }
    }

    /// Format the outcome of a transition.
    pub fn format_transition(&self, outcome: &Transition) -> Result<String> {
        if let (OutputFormat::Json, Transition::Blocked(issues)) = (self.format, outcome) {
            return Ok(serde_json::to_string_pretty(&json!({
                "outcome": "blocked",
                "issues": issues.iter().map(|i| i.to_string()).collect::<Vec<_>>()
            }))?);
        }
        match outcome {
            Transition::Moved(draft) => match self.format {
                OutputFormat::Table => Ok(self.success(&format!("Draft {} is now in {}", draft.id, draft.status))),
                _ => self.format_draft(draft),
            },
            Transition::Published(item) => match self.format {
                OutputFormat::Table => Ok(self.success(&format!("Published as {}", item.final_id))),
                _ => self.format_final(item, 0.0, &[]),
            },
            Transition::Deleted(id) => match self.format {
                OutputFormat::Json => Ok(serde_json::to_string_pretty(&json!({ "deleted": id.value() }))?),
                OutputFormat::Quiet => Ok(id.to_string()),
                OutputFormat::Table => Ok(self.success(&format!("Deleted draft {}", id))),
            },
            Transition::Blocked(issues) => self.format_issues(issues),
        }
    }

    /// Format item counts.
    pub fn format_counts(&self, counts: &ItemCounts) -> Result<String> {
        let types = [ItemType::Definition, ItemType::Theorem, ItemType::Proof];
        let get = |map: &std::collections::BTreeMap<ItemType, usize>, t: &ItemType| map.get(t).copied().unwrap_or(0);

        match self.format {
            OutputFormat::Json => {
                let per_type: serde_json::Map<String, Value> = types
                    .iter()
                    .map(|t| {
                        (
                            t.as_str().to_string(),
                            json!({
                                "final": get(&counts.finals, t),
                                "review": get(&counts.in_review, t),
                                "draft": get(&counts.drafts, t)
                            }),
                        )
                    })
                    .collect();
                Ok(serde_json::to_string_pretty(&json!({ "items": per_type, "users": counts.users }))?)
            }
            OutputFormat::Quiet => Ok(counts.finals.values().sum::<usize>().to_string()),
            OutputFormat::Table => {
                let rows = types
                    .iter()
                    .map(|t| {
                        vec![
                            t.to_string(),
                            get(&counts.finals, t).to_string(),
                            get(&counts.in_review, t).to_string(),
                            get(&counts.drafts, t).to_string(),
                        ]
                    })
                    .collect();
                let mut out = self.table(&["Type", "Published", "In review", "Drafts"], rows);
                out.push_str(&format!("\n{} registered user(s)", counts.users));
                Ok(out)
            }
        }
    }

    /// Format a success message.
    pub fn success(&self, message: &str) -> String {
        self.colorize(&format!("✓ {}", message), "green")
    }

    /// Format an error message.
    pub fn error(&self, message: &str) -> String {
        self.colorize(&format!("✗ {}", message), "red")
    }

    /// Format an info message.
    pub fn info(&self, message: &str) -> String {
        self.colorize(&format!("ℹ {}", message), "blue")
    }

    /// Format a warning message.
    pub fn warning(&self, message: &str) -> String {
        self.colorize(&format!("⚠ {}", message), "yellow")
    }

    /// Colorize text if color is enabled.
    fn colorize(&self, text: &str, color: &str) -> String {
        if !self.color_enabled {
            return text.to_string();
        }

        match color {
            "red" => text.red().to_string(),
            "green" => text.green().to_string(),
            "blue" => text.blue().to_string(),
            "yellow" => text.yellow().to_string(),
            "cyan" => text.cyan().to_string(),
            _ => text.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use teoremer_domain::{DraftId, DraftStatus, FinalId, FinalStatus, UserId};

    fn create_test_draft() -> DraftItem {
        DraftItem {
            id: DraftId::from_value(7),
            itemtype: ItemType::Theorem,
            status: DraftStatus::Review,
            body: "There are infinitely many primes.\nProof sketch follows.".to_string(),
            created_by: UserId::from_value(1),
            parent: None,
            created_at: 1_700_000_000,
            modified_at: 1_700_000_100,
        }
    }

    fn create_test_final() -> FinalItem {
        FinalItem {
            final_id: FinalId::new("T3").unwrap(),
            itemtype: ItemType::Theorem,
            status: FinalStatus::Final,
            body: "There are infinitely many primes.".to_string(),
            created_by: UserId::from_value(1),
            parent: None,
            created_at: 1_700_000_200,
        }
    }

    #[test]
    fn test_json_format() {
        let formatter = Formatter::new(OutputFormat::Json, false);
        let output = formatter.format_drafts(&[create_test_draft()]).unwrap();
        let parsed: Value = serde_json::from_str(&output).unwrap();
        assert_eq!(parsed[0]["status"], "review");
        assert_eq!(parsed[0]["itemtype"], "theorem");
    }

    #[test]
    fn test_quiet_format() {
        let formatter = Formatter::new(OutputFormat::Quiet, false);
        let output = formatter.format_finals(&[create_test_final()]).unwrap();
        assert_eq!(output, "T3");
    }

    #[test]
    fn test_table_format() {
        let formatter = Formatter::new(OutputFormat::Table, false);
        let output = formatter.format_drafts(&[create_test_draft()]).unwrap();
        assert!(output.contains("Status"));
        assert!(output.contains("There are infinitely many primes."));
        assert!(!output.contains("Proof sketch"));
    }

    #[test]
    fn test_empty_drafts() {
        let formatter = Formatter::new(OutputFormat::Table, false);
        let output = formatter.format_drafts(&[]).unwrap();
        assert!(output.contains("No drafts found"));
    }

    #[test]
    fn test_blocked_transition() {
        let formatter = Formatter::new(OutputFormat::Table, false);
        let output = formatter
            .format_transition(&Transition::Blocked(vec![Issue::NoContents]))
            .unwrap();
        assert_eq!(output, "⚠ No contents");

        let json = Formatter::new(OutputFormat::Json, false)
            .format_transition(&Transition::Blocked(vec![Issue::NoContents]))
            .unwrap();
        let parsed: Value = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed["issues"][0], "No contents");
    }

    #[test]
    fn test_counts_table() {
        let mut counts = ItemCounts::default();
        counts.finals.insert(ItemType::Definition, 4);
        counts.users = 2;
        let output = Formatter::new(OutputFormat::Table, false).format_counts(&counts).unwrap();
        assert!(output.contains("Published"));
        assert!(output.contains("2 registered user(s)"));
    }

    #[test]
    fn test_colorize_disabled() {
        let formatter = Formatter::new(OutputFormat::Table, false);
        let msg = formatter.success("test");
        assert_eq!(msg, "✓ test");
    }

    #[test]
    fn test_preview_truncates() {
        let long = "x".repeat(100);
        assert_eq!(preview(&long).chars().count(), 48);
        assert_eq!(preview("short\nsecond"), "short");
    }
}
