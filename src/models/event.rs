// src/models/event.rs

//! Change events and the per-run notification digest.

use serde::{Deserialize, Serialize};

use crate::models::{Quantity, Snapshot};

/// One reported change for a region, produced by reconciliation.
///
/// `region` is always the stable region key, not the display label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ChangeEvent {
    /// First time this region has ever been observed. Carries the full
    /// snapshot; no per-item events are emitted for the same run.
    NewRegion { region: String, snapshot: Snapshot },

    /// Item present now but absent from the previous snapshot.
    ItemAdded {
        region: String,
        name: String,
        quantity: Quantity,
    },

    /// Item present in both snapshots with a different quantity.
    /// Transitions into and out of `Unknown` count as changes.
    QuantityChanged {
        region: String,
        name: String,
        old: Quantity,
        new: Quantity,
    },

    /// Item present previously but absent now.
    ItemRemoved { region: String, name: String },
}

/// Digest entry for one region: its display label plus its events.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DigestSection {
    pub label: String,
    pub events: Vec<ChangeEvent>,
}

/// Aggregated per-run digest handed to the notifier.
///
/// Sections appear in region discovery order and regions with zero
/// events are never included.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Digest {
    pub sections: Vec<DigestSection>,
}

impl Digest {
    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    /// Total number of events across all sections.
    pub fn event_count(&self) -> usize {
        self.sections.iter().map(|s| s.events.len()).sum()
    }

    /// Render the digest as notification text.
    pub fn render(&self) -> String {
        let mut blocks = Vec::new();
        for section in &self.sections {
            let mut lines = Vec::new();
            for event in &section.events {
                match event {
                    ChangeEvent::NewRegion { snapshot, .. } => {
                        lines.push(format!("📌 First sighting of region {}", section.label));
                        for (name, qty) in snapshot.iter() {
                            lines.push(format!("    {}: {}", name, qty));
                        }
                    }
                    ChangeEvent::ItemAdded { name, quantity, .. } => {
                        lines.push(format!(
                            "🆕 {}: new item {} (stock {})",
                            section.label, name, quantity
                        ));
                    }
                    ChangeEvent::QuantityChanged { name, old, new, .. } => {
                        lines.push(format!(
                            "🔔 {}: {} stock {} → {}",
                            section.label, name, old, new
                        ));
                    }
                    ChangeEvent::ItemRemoved { name, .. } => {
                        lines.push(format!("❌ {}: {} no longer listed", section.label, name));
                    }
                }
            }
            blocks.push(lines.join("\n"));
        }
        blocks.join("\n\n")
    }
}

/// Split rendered digest text into chunks no longer than `limit` bytes,
/// breaking on line boundaries where possible. Telegram rejects messages
/// over 4096 characters.
pub fn chunk_message(text: &str, limit: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current = String::new();

    for line in text.lines() {
        if !current.is_empty() && current.len() + line.len() + 1 > limit {
            chunks.push(std::mem::take(&mut current));
        }

        // A single oversized line is split hard.
        if line.len() > limit {
            let mut rest = line;
            while rest.len() > limit {
                let mut cut = limit;
                while !rest.is_char_boundary(cut) {
                    cut -= 1;
                }
                let (head, tail) = rest.split_at(cut);
                chunks.push(head.to_string());
                rest = tail;
            }
            current = rest.to_string();
            continue;
        }

        if !current.is_empty() {
            current.push('\n');
        }
        current.push_str(line);
    }

    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RawItem;

    fn section_with(events: Vec<ChangeEvent>) -> DigestSection {
        DigestSection {
            label: "VPS / EU".to_string(),
            events,
        }
    }

    #[test]
    fn test_render_quantity_change() {
        let digest = Digest {
            sections: vec![section_with(vec![ChangeEvent::QuantityChanged {
                region: "fid=1".into(),
                name: "Widget".into(),
                old: Quantity::Known(5),
                new: Quantity::Known(3),
            }])],
        };
        assert_eq!(digest.render(), "🔔 VPS / EU: Widget stock 5 → 3");
    }

    #[test]
    fn test_render_new_region_lists_items() {
        let snapshot = Snapshot::build(vec![
            RawItem::new("Widget", Quantity::Known(5)),
            RawItem::new("Gadget", Quantity::Unknown),
        ]);
        let digest = Digest {
            sections: vec![section_with(vec![ChangeEvent::NewRegion {
                region: "fid=1".into(),
                snapshot,
            }])],
        };
        let text = digest.render();
        assert!(text.starts_with("📌 First sighting of region VPS / EU"));
        assert!(text.contains("    Widget: 5"));
        assert!(text.contains("    Gadget: unknown"));
    }

    #[test]
    fn test_render_removed_and_added() {
        let digest = Digest {
            sections: vec![section_with(vec![
                ChangeEvent::ItemAdded {
                    region: "fid=1".into(),
                    name: "Gizmo".into(),
                    quantity: Quantity::Known(1),
                },
                ChangeEvent::ItemRemoved {
                    region: "fid=1".into(),
                    name: "Widget".into(),
                },
            ])],
        };
        let text = digest.render();
        assert!(text.contains("🆕 VPS / EU: new item Gizmo (stock 1)"));
        assert!(text.contains("❌ VPS / EU: Widget no longer listed"));
    }

    #[test]
    fn test_empty_digest() {
        let digest = Digest::default();
        assert!(digest.is_empty());
        assert_eq!(digest.event_count(), 0);
        assert_eq!(digest.render(), "");
    }

    #[test]
    fn test_chunk_message_respects_lines() {
        let text = "aaaa\nbbbb\ncccc";
        let chunks = chunk_message(text, 9);
        assert_eq!(chunks, vec!["aaaa\nbbbb".to_string(), "cccc".to_string()]);
    }

    #[test]
    fn test_chunk_message_splits_oversized_line() {
        let text = "x".repeat(25);
        let chunks = chunk_message(&text, 10);
        assert_eq!(chunks.len(), 3);
        assert!(chunks.iter().all(|c| c.len() <= 10));
        assert_eq!(chunks.concat(), text);
    }

    #[test]
    fn test_chunk_message_fits_in_one() {
        let chunks = chunk_message("short", 100);
        assert_eq!(chunks, vec!["short".to_string()]);
    }
}
