//! test utilities: an off-chain whitelist tree and a span recorder.

use crate::merkle::{hash_pair, leaf_hash};
use alloy_primitives::{Address, B256};

/// Builds whitelist trees the same way the off-chain tooling does.
///
/// Leaves keep their input order, pairs are hashed with [`hash_pair`], and an
/// unpaired node at the end of a level is promoted unchanged.
#[derive(Debug, Clone)]
pub struct WhitelistTree {
    members: Vec<Address>,
    levels: Vec<Vec<B256>>,
}

impl WhitelistTree {
    /// Builds the tree for `members`.
    pub fn new(members: &[Address]) -> Self {
        let mut levels = vec![members.iter().copied().map(leaf_hash).collect::<Vec<_>>()];
        while levels.last().is_some_and(|level| level.len() > 1) {
            let below = &levels[levels.len() - 1];
            let above = below
                .chunks(2)
                .map(|pair| match pair {
                    [left, right] => hash_pair(*left, *right),
                    [single] => *single,
                    _ => unreachable!("chunks(2) yields one or two nodes"),
                })
                .collect();
            levels.push(above);
        }
        Self {
            members: members.to_vec(),
            levels,
        }
    }

    /// Root digest, or zero for an empty whitelist.
    pub fn root(&self) -> B256 {
        self.levels
            .last()
            .and_then(|level| level.first().copied())
            .unwrap_or(B256::ZERO)
    }

    /// Sibling path for `member`, or `None` if it is not whitelisted.
    pub fn proof(&self, member: Address) -> Option<Vec<B256>> {
        let mut index = self.members.iter().position(|m| *m == member)?;
        let mut proof = Vec::new();
        for level in &self.levels[..self.levels.len() - 1] {
            if let Some(sibling) = level.get(index ^ 1) {
                proof.push(*sibling);
            }
            index /= 2;
        }
        Some(proof)
    }
}

#[cfg(test)]
pub(crate) use spans::SpanCollector;

#[cfg(test)]
mod spans {
    use std::{
        collections::BTreeMap,
        fmt::Debug,
        sync::{Arc, Mutex},
    };
    use tracing::{
        field::{Field, Visit},
        span::{Attributes, Id, Record},
        subscriber::{set_default, DefaultGuard},
        Subscriber,
    };
    use tracing_subscriber::{
        layer::{Context, SubscriberExt},
        Layer,
    };

    /// Fields of one span, as their `Debug` renderings.
    #[derive(Debug, Clone, Default)]
    pub(crate) struct SpanRecord {
        id: u64,
        name: &'static str,
        fields: BTreeMap<&'static str, String>,
    }

    impl SpanRecord {
        pub(crate) fn field(&self, name: &str) -> Option<&str> {
            self.fields.get(name).map(String::as_str)
        }
    }

    impl Visit for SpanRecord {
        fn record_debug(&mut self, field: &Field, value: &dyn Debug) {
            self.fields.insert(field.name(), format!("{value:?}"));
        }
    }

    /// Layer that keeps every span it sees, including fields recorded late.
    #[derive(Debug, Clone, Default)]
    pub(crate) struct SpanCollector {
        spans: Arc<Mutex<Vec<SpanRecord>>>,
    }

    impl SpanCollector {
        pub(crate) fn new() -> Self {
            Self::default()
        }

        /// Most recently opened span called `name`.
        pub(crate) fn find_span(&self, name: &str) -> Option<SpanRecord> {
            let spans = self.spans.lock().unwrap();
            spans.iter().rev().find(|span| span.name == name).cloned()
        }

        pub(crate) fn as_default(&self) -> DefaultGuard {
            set_default(tracing_subscriber::registry().with(self.clone()))
        }
    }

    impl<S: Subscriber> Layer<S> for SpanCollector {
        fn on_new_span(&self, attrs: &Attributes<'_>, id: &Id, _ctx: Context<'_, S>) {
            let mut record = SpanRecord {
                id: id.into_u64(),
                name: attrs.metadata().name(),
                ..Default::default()
            };
            attrs.record(&mut record);
            self.spans.lock().unwrap().push(record);
        }

        fn on_record(&self, id: &Id, values: &Record<'_>, _ctx: Context<'_, S>) {
            // the registry reuses ids of closed spans, so the newest match wins
            let mut spans = self.spans.lock().unwrap();
            if let Some(record) = spans.iter_mut().rev().find(|span| span.id == id.into_u64()) {
                values.record(record);
            }
        }
    }
}
