// std imports
use std::collections::HashMap;

// 3rd party imports
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};
use tokio::task::{JoinError, JoinHandle};
use tracing::warn;

/// Category of a per row warning
///
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum WarningCategory {
    /// Record could not be retrieved
    Retrieval,
    /// Peptide is not part of the protein sequence
    PeptidesNotFound,
    /// No structural model for the protein
    ModelNotAvailable,
}

impl WarningCategory {
    pub const ALL: [Self; 3] = [
        Self::Retrieval,
        Self::PeptidesNotFound,
        Self::ModelNotAvailable,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Self::Retrieval => "retrieval",
            Self::PeptidesNotFound => "peptides not found",
            Self::ModelNotAvailable => "model not available",
        }
    }
}

/// Warning raised for a single row
///
#[derive(Debug, Clone, PartialEq)]
pub struct Warning {
    pub category: WarningCategory,
    pub item: String,
}

impl Warning {
    pub fn new(category: WarningCategory, item: String) -> Self {
        Self { category, item }
    }
}

/// One list of offending items per warning category
///
#[derive(Debug, Clone, Default)]
pub struct WarningBuckets {
    buckets: HashMap<WarningCategory, Vec<String>>,
}

impl WarningBuckets {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, warning: Warning) {
        self.buckets
            .entry(warning.category)
            .or_default()
            .push(warning.item);
    }

    /// Items of the category in the order they were received
    ///
    pub fn items(&self, category: WarningCategory) -> &[String] {
        self.buckets
            .get(&category)
            .map(|items| items.as_slice())
            .unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.values().all(|items| items.is_empty())
    }

    /// Logs each non-empty category once with its first item and the number of items
    ///
    pub fn report(&self) {
        for category in WarningCategory::ALL {
            let items = self.items(category);
            if let Some(first) = items.first() {
                warn!(
                    "There were {} \"{}\" warnings, e.g.: {}",
                    items.len(),
                    category.label(),
                    first
                );
            }
        }
    }
}

/// Task owning the warning buckets. Workers send their warnings through a channel.
///
pub struct WarningCollector {
    sender: UnboundedSender<Warning>,
    handle: JoinHandle<WarningBuckets>,
}

impl WarningCollector {
    /// Spawns the collector task
    ///
    pub fn start() -> Self {
        let (sender, receiver) = unbounded_channel();
        let handle = tokio::spawn(Self::collect(receiver));
        Self { sender, handle }
    }

    async fn collect(mut receiver: UnboundedReceiver<Warning>) -> WarningBuckets {
        let mut buckets = WarningBuckets::new();
        while let Some(warning) = receiver.recv().await {
            buckets.push(warning);
        }
        buckets
    }

    /// Returns a new sender for a worker
    ///
    pub fn sender(&self) -> UnboundedSender<Warning> {
        self.sender.clone()
    }

    /// Closes the channel and returns the buckets once every sender is dropped
    ///
    pub async fn finish(self) -> Result<WarningBuckets, JoinError> {
        drop(self.sender);
        self.handle.await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_collector() {
        let collector = WarningCollector::start();
        let mut handles = Vec::new();
        for idx in 0..10 {
            let sender = collector.sender();
            handles.push(tokio::spawn(async move {
                sender
                    .send(Warning::new(WarningCategory::Retrieval, format!("P{idx}")))
                    .unwrap();
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }
        let buckets = collector.finish().await.unwrap();
        assert_eq!(buckets.items(WarningCategory::Retrieval).len(), 10);
        assert!(buckets.items(WarningCategory::ModelNotAvailable).is_empty());
        assert!(!buckets.is_empty());
        buckets.report();
    }
}
