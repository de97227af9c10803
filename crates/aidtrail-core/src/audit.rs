use aidtrail_types::Notification;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Hash-chained audit entry wrapping one emitted notification.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEntry {
    pub entry_id: String,
    pub index: u64,
    pub timestamp: DateTime<Utc>,
    pub notification: Notification,
    pub previous_hash: Option<String>,
    pub entry_hash: String,
}

/// Append-only notification log with hash-chain proofs.
///
/// No in-place mutation APIs are exposed; every emitted notification becomes
/// an additional record, so external observers can reconstruct full unit
/// history from the trail alone.
#[derive(Debug, Default, Clone)]
pub struct AuditTrail {
    entries: Vec<AuditEntry>,
}

impl AuditTrail {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    pub fn entries(&self) -> &[AuditEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn append(&mut self, notification: Notification) -> &AuditEntry {
        let index = self.entries.len() as u64;
        let timestamp = Utc::now();
        let previous_hash = self.entries.last().map(|entry| entry.entry_hash.clone());
        let entry_hash =
            compute_entry_hash(index, timestamp, &notification, previous_hash.as_deref());

        self.entries.push(AuditEntry {
            entry_id: Uuid::new_v4().to_string(),
            index,
            timestamp,
            notification,
            previous_hash,
            entry_hash,
        });

        // Just pushed, so last() is present.
        self.entries.last().expect("entry just appended")
    }

    pub fn verify_chain(&self) -> bool {
        let mut previous_hash: Option<String> = None;
        for entry in &self.entries {
            let expected_hash = compute_entry_hash(
                entry.index,
                entry.timestamp,
                &entry.notification,
                previous_hash.as_deref(),
            );
            if entry.entry_hash != expected_hash {
                return false;
            }
            if entry.previous_hash != previous_hash {
                return false;
            }
            previous_hash = Some(entry.entry_hash.clone());
        }
        true
    }
}

fn compute_entry_hash(
    index: u64,
    timestamp: DateTime<Utc>,
    notification: &Notification,
    previous_hash: Option<&str>,
) -> String {
    let material = serde_json::json!({
        "index": index,
        "timestamp": timestamp,
        "notification": notification,
        "previous_hash": previous_hash,
    });

    let bytes = serde_json::to_vec(&material).unwrap_or_default();
    blake3::hash(&bytes).to_hex().to_string()
}
