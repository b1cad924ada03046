//! The operator's link table: (source, dest) address pairs and their link ids.

use anyhow::{bail, Context, Result};
use log::{debug, warn};
use ndnmap_common::types::LinkId;
use std::io::BufRead;

/// One `<id> <source> <dest>` line of the link table file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkEntry {
    pub link_id: LinkId,
    pub source_addr: String,
    pub dest_addr: String,
}

/// Immutable mapping from an address pair to its operator-assigned link id.
///
/// Built once at startup and shared read-only with the dispatcher. Lookups
/// scan in file order, so the first of two duplicate pairs wins. The table is
/// bounded by the operator's link count and small by design.
#[derive(Debug, Clone, Default)]
pub struct LinkTable {
    entries: Vec<LinkEntry>,
    skipped: usize,
}

impl LinkTable {
    /// Load `count` entries from a line-oriented reader.
    ///
    /// Lines that do not parse into exactly `<id> <source> <dest>` are
    /// skipped and counted; running out of input before `count` usable
    /// entries have been read is an error. Input past the requested count is
    /// left unread.
    pub fn load(reader: impl BufRead, count: usize) -> Result<Self> {
        let mut entries = Vec::with_capacity(count);
        let mut skipped = 0;

        for line in reader.lines() {
            if entries.len() == count {
                break;
            }
            let line = line.context("reading link table")?;
            match parse_line(&line) {
                Some(entry) => {
                    debug!(
                        "link {}: {} -> {}",
                        entry.link_id, entry.source_addr, entry.dest_addr
                    );
                    entries.push(entry);
                }
                None => {
                    if !line.trim().is_empty() {
                        warn!("skipping malformed link table line: {:?}", line);
                    }
                    skipped += 1;
                }
            }
        }

        if entries.len() < count {
            bail!(
                "link table ended after {} usable entries, {} requested",
                entries.len(),
                count
            );
        }

        Ok(Self { entries, skipped })
    }

    /// Resolve an address pair to its link id.
    pub fn lookup(&self, source_addr: &str, dest_addr: &str) -> Option<LinkId> {
        self.entries
            .iter()
            .find(|e| e.source_addr == source_addr && e.dest_addr == dest_addr)
            .map(|e| e.link_id)
    }

    /// Iterates over the entries in file order.
    pub fn entries(&self) -> impl Iterator<Item = &LinkEntry> {
        self.entries.iter()
    }

    /// Number of loaded entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the table holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of malformed lines skipped during load.
    pub fn skipped_lines(&self) -> usize {
        self.skipped
    }
}

/// Parse one file line into an entry; exactly three whitespace-separated
/// tokens with an integer first token.
fn parse_line(line: &str) -> Option<LinkEntry> {
    let mut tokens = line.split_whitespace();
    let link_id = LinkId(tokens.next()?.parse().ok()?);
    let source_addr = tokens.next()?.to_string();
    let dest_addr = tokens.next()?.to_string();
    if tokens.next().is_some() {
        return None;
    }
    Some(LinkEntry {
        link_id,
        source_addr,
        dest_addr,
    })
}
