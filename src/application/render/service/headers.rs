//! Header anchors with per-document id deduplication.
//!
//! Matches heading lines of level 2 or deeper, with an optional explicit id:
//!
//!   ## header
//!   ## header (#header-id)
//!
//! Level-1 headings are left to the Markdown stage; only matching `##` or
//! more also keeps code comments out of the matches.

use std::collections::HashMap;

use once_cell::sync::Lazy;
use regex::Regex;

use super::collapse_html;
use crate::application::render::types::RenderOptions;

static HEADER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^(#{2,})\s+(.*?)(\s+\(#(.*)\))?$").unwrap());

/// Tracks ids assigned so far in a single document render. Every emitted id
/// is unique: repeated explicit ids gain a `-N` suffix, and headers without
/// an explicit id draw from a document-wide sequential counter that advances
/// for every header processed.
#[derive(Debug, Default)]
struct HeaderRegistry {
    seen: HashMap<String, usize>,
    sequence: usize,
}

impl HeaderRegistry {
    fn assign(&mut self, explicit: Option<&str>) -> String {
        let id = match explicit {
            None | Some("") => format!("section-{}", self.sequence),
            Some(given) => match self.seen.get_mut(given) {
                Some(occurrence) => {
                    let id = format!("{given}-{occurrence}");
                    *occurrence += 1;
                    id
                }
                None => {
                    self.seen.insert(given.to_string(), 1);
                    given.to_string()
                }
            },
        };
        self.sequence += 1;
        id
    }
}

/// Replace Markdown headers with HTML equivalents carrying stable, unique
/// ids and (unless disabled) self-referencing permalinks. Implemented as an
/// explicit fold over matches so the registry state stays local.
pub(crate) fn anchor_headers(source: &str, options: &RenderOptions) -> String {
    let mut registry = HeaderRegistry::default();
    let mut out = String::with_capacity(source.len());
    let mut last = 0;

    for caps in HEADER_RE.captures_iter(source) {
        let whole = caps.get(0).unwrap();
        out.push_str(&source[last..whole.start()]);

        let level = caps[1].len();
        let title = &caps[2];
        let id = registry.assign(caps.get(4).map(|m| m.as_str()));

        let snippet = if options.no_header_links {
            format!("\n<h{level}>{title}</h{level}>\n")
        } else {
            format!(
                "\n<h{level} id=\"{id}\">\n  <a href=\"#{id}\">{title}</a>\n</h{level}>\n"
            )
        };
        out.push_str(&collapse_html(&snippet));

        last = whole.end();
    }

    out.push_str(&source[last..]);
    out
}
