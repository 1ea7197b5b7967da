//! Per-server status records produced by an initialization pass.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Connection health of one configured server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ServerStatus {
    Connected,
    Disconnected,
    Error,
}

/// Tool as listed in status output (un-namespaced).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolSummary {
    pub name: String,
    pub description: String,
}

/// Status of one enabled server after an initialization attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerRecord {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Display locator only.
    pub url: String,
    pub status: ServerStatus,
    pub tools: Vec<ToolSummary>,
}

/// Records keyed by server id, kept in insertion order.
#[derive(Debug, Clone, Default)]
pub struct ServerRegistry {
    records: Vec<ServerRecord>,
    index: HashMap<String, usize>,
}

impl ServerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a record. A record with the same id is replaced in place.
    pub fn insert(&mut self, record: ServerRecord) {
        match self.index.get(&record.id) {
            Some(&position) => self.records[position] = record,
            None => {
                self.index.insert(record.id.clone(), self.records.len());
                self.records.push(record);
            }
        }
    }

    pub fn get(&self, id: &str) -> Option<&ServerRecord> {
        self.index.get(id).map(|&position| &self.records[position])
    }

    pub fn records(&self) -> &[ServerRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Tools of connected servers, flattened in registry order.
    pub fn available_tools(&self) -> Vec<ToolSummary> {
        self.records
            .iter()
            .filter(|record| record.status == ServerStatus::Connected)
            .flat_map(|record| record.tools.iter().cloned())
            .collect()
    }

    pub fn connected_count(&self) -> usize {
        self.records
            .iter()
            .filter(|record| record.status == ServerStatus::Connected)
            .count()
    }

    pub fn clear(&mut self) {
        self.records.clear();
        self.index.clear();
    }
}
