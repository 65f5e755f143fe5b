//! Body scanner - extracts cross-references from item bodies
//!
//! Marker syntax:
//!
//! | Marker | Meaning |
//! |--------|---------|
//! | `[text@ID]`, `[@ID]` | reference to published item `ID` |
//! | `[text!ID]`, `[!ID]` | reference to media entry `ID` |
//! | `[text#tag]`, `[#tag]` | category tag |
//! | `#T42` | shorthand item reference (type letter + number) |
//!
//! Text inside `$$...$$` and `$...$` is mathematics and is never scanned.
//! An unpaired `$` or `$$` is ordinary text.

use std::collections::BTreeSet;
use std::sync::LazyLock;

use regex::Regex;

use crate::{FinalId, MediaId};

static TAG_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[([^#\]]*)#([\w -]+)\]").expect("valid tag regex"));

static ITEM_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[([^@\]]*)@([0-9A-Za-z_]+)\]").expect("valid item regex"));

static MEDIA_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[([^!\]]*)!([0-9A-Za-z_]+)\]").expect("valid media regex"));

static ITEM_SHORTHAND: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:^|[^\w&])#([DTP][0-9]+)\b").expect("valid shorthand regex"));

/// References found in a body
///
/// Pure function of the text: the same body always yields the same sets,
/// and repeated references collapse.
///
/// # Examples
///
/// ```
/// use teoremer_domain::BodyScanner;
///
/// let scan = BodyScanner::new("By [Lemma@T3] and [the figure!f1], see also [@T3].");
/// assert_eq!(scan.item_refs().len(), 1);
/// assert_eq!(scan.media_refs().len(), 1);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BodyScanner {
    item_refs: BTreeSet<FinalId>,
    media_refs: BTreeSet<MediaId>,
    tags: BTreeSet<String>,
}

impl BodyScanner {
    /// Scan a body
    pub fn new(body: &str) -> Self {
        let mut scan = Self::default();
        let text = strip_math(body);

        let text = TAG_MARKER.replace_all(&text, |caps: &regex::Captures<'_>| {
            let tag = caps[2].trim();
            if !tag.is_empty() {
                scan.tags.insert(tag.to_string());
            }
            " "
        });

        let text = ITEM_MARKER.replace_all(&text, |caps: &regex::Captures<'_>| {
            if let Ok(id) = FinalId::new(&caps[2]) {
                scan.item_refs.insert(id);
            }
            " "
        });

        let text = MEDIA_MARKER.replace_all(&text, |caps: &regex::Captures<'_>| {
            if let Ok(id) = MediaId::new(&caps[2]) {
                scan.media_refs.insert(id);
            }
            " "
        });

        for caps in ITEM_SHORTHAND.captures_iter(&text) {
            if let Ok(id) = FinalId::new(&caps[1]) {
                scan.item_refs.insert(id);
            }
        }

        scan
    }

    /// Distinct referenced item ids, sorted
    pub fn item_refs(&self) -> &BTreeSet<FinalId> {
        &self.item_refs
    }

    /// Distinct referenced media ids, sorted
    pub fn media_refs(&self) -> &BTreeSet<MediaId> {
        &self.media_refs
    }

    /// Distinct tags, sorted
    pub fn tags(&self) -> &BTreeSet<String> {
        &self.tags
    }
}

/// Replace closed math segments with a single space
///
/// A delimiter without a partner opens no math; the text after it is
/// scanned as usual.
fn strip_math(body: &str) -> String {
    let mut out = String::with_capacity(body.len());
    for (math, block) in segments(body, "$$") {
        if math {
            out.push(' ');
            continue;
        }
        for (math, inline) in segments(block, "$") {
            if math {
                out.push(' ');
            } else {
                out.push_str(inline);
            }
        }
    }
    out
}

/// Split on `delim`, flagging the parts enclosed by a delimiter pair
fn segments<'a>(text: &'a str, delim: &str) -> Vec<(bool, &'a str)> {
    let parts: Vec<&str> = text.split(delim).collect();
    // even count: the last delimiter is unclosed
    let unclosed = parts.len() % 2 == 0;
    let last = parts.len() - 1;
    parts
        .into_iter()
        .enumerate()
        .map(|(i, part)| (i % 2 == 1 && !(unclosed && i == last), part))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(scan: &BodyScanner) -> Vec<&str> {
        scan.item_refs().iter().map(|id| id.as_str()).collect()
    }

    #[test]
    fn test_item_markers() {
        let scan = BodyScanner::new("Use [the lemma@T12] with [@D3].");
        assert_eq!(ids(&scan), vec!["D3", "T12"]);
        assert!(scan.media_refs().is_empty());
    }

    #[test]
    fn test_media_markers() {
        let scan = BodyScanner::new("[Figure!q25tY] and [!abc]");
        let media: Vec<&str> = scan.media_refs().iter().map(|m| m.as_str()).collect();
        assert_eq!(media, vec!["abc", "q25tY"]);
    }

    #[test]
    fn test_tags_are_not_references() {
        let scan = BodyScanner::new("[group#group theory] [#algebra]");
        assert!(scan.item_refs().is_empty());
        assert_eq!(scan.tags().len(), 2);
        assert!(scan.tags().contains("group theory"));
    }

    #[test]
    fn test_shorthand_reference() {
        let scan = BodyScanner::new("See item #T42");
        assert_eq!(ids(&scan), vec!["T42"]);
    }

    #[test]
    fn test_shorthand_ignores_tags_and_entities() {
        let scan = BodyScanner::new("[see #T1] and &#91; and x#D2");
        assert!(scan.item_refs().is_empty());
        assert!(scan.tags().contains("T1"));
    }

    #[test]
    fn test_duplicates_collapse() {
        let scan = BodyScanner::new("[@T1] [x@T1] #T1 [@T1]");
        assert_eq!(ids(&scan), vec!["T1"]);
    }

    #[test]
    fn test_math_is_not_scanned() {
        let scan = BodyScanner::new("$[@T1]$ and $$[@T2]$$ but [@T3]");
        assert_eq!(ids(&scan), vec!["T3"]);
    }

    #[test]
    fn test_unpaired_dollar_is_text() {
        let scan = BodyScanner::new("It costs $5. See [@T99]");
        assert_eq!(ids(&scan), vec!["T99"]);

        let scan = BodyScanner::new("$x$ then $$ open [@T4] and $[@T5]$");
        assert_eq!(ids(&scan), vec!["T4"]);
    }

    #[test]
    fn test_empty_body() {
        let scan = BodyScanner::new("");
        assert!(scan.item_refs().is_empty());
        assert!(scan.media_refs().is_empty());
        assert!(scan.tags().is_empty());
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn marker() -> impl Strategy<Value = String> {
        prop_oneof![
            "[a-z ]{0,6}".prop_map(|s| s),
            "[DTP][0-9]{1,3}".prop_map(|id| format!("[@{}]", id)),
            "[a-z0-9]{1,5}".prop_map(|id| format!("[!{}]", id)),
            "[DTP][0-9]{1,3}".prop_map(|id| format!(" #{}", id)),
            Just("$".to_string()),
        ]
    }

    proptest! {
        /// Property: scanning is deterministic
        #[test]
        fn test_scan_is_deterministic(parts in prop::collection::vec(marker(), 0..12)) {
            let body = parts.concat();
            prop_assert_eq!(BodyScanner::new(&body), BodyScanner::new(&body));
        }

        /// Property: repeating the body adds no new references
        #[test]
        fn test_repetition_collapses(parts in prop::collection::vec(marker(), 0..12)) {
            let body = parts.concat().replace('$', "");
            let once = BodyScanner::new(&body);
            let twice = BodyScanner::new(&format!("{} {}", body, body));
            prop_assert_eq!(once.item_refs(), twice.item_refs());
            prop_assert_eq!(once.media_refs(), twice.media_refs());
        }

        /// Property: a leading unpaired `$` hides nothing
        #[test]
        fn test_unpaired_dollar_hides_nothing(parts in prop::collection::vec(marker(), 0..12)) {
            let body = parts.concat().replace('$', "");
            let plain = BodyScanner::new(&body);
            let prefixed = BodyScanner::new(&format!("${}", body));
            prop_assert_eq!(plain.item_refs(), prefixed.item_refs());
            prop_assert_eq!(plain.media_refs(), prefixed.media_refs());
        }

        /// Property: marker order does not matter
        #[test]
        fn test_order_independent(mut parts in prop::collection::vec(marker(), 0..12)) {
            parts.retain(|p| p != "$");
            let forward = BodyScanner::new(&parts.join(" "));
            parts.reverse();
            let backward = BodyScanner::new(&parts.join(" "));
            prop_assert_eq!(forward.item_refs(), backward.item_refs());
            prop_assert_eq!(forward.media_refs(), backward.media_refs());
        }
    }
}
