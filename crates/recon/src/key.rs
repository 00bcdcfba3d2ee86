use std::collections::HashMap;

use crate::model::{CompositeKey, Record};

/// Composite key -> records sharing it, with keys kept in first-seen order.
#[derive(Debug, Default)]
pub struct KeyIndex<'a> {
    order: Vec<CompositeKey>,
    groups: HashMap<CompositeKey, Vec<&'a Record>>,
    records: usize,
}

impl<'a> KeyIndex<'a> {
    pub fn build(records: &'a [Record]) -> Self {
        let mut order = Vec::new();
        let mut groups: HashMap<CompositeKey, Vec<&'a Record>> = HashMap::new();

        for record in records {
            let key = record.key();
            match groups.get_mut(&key) {
                Some(group) => group.push(record),
                None => {
                    order.push(key.clone());
                    groups.insert(key, vec![record]);
                }
            }
        }

        Self {
            order,
            groups,
            records: records.len(),
        }
    }

    /// Keys in first-appearance order.
    pub fn keys(&self) -> impl Iterator<Item = &CompositeKey> {
        self.order.iter()
    }

    pub fn get(&self, key: &CompositeKey) -> Option<&[&'a Record]> {
        self.groups.get(key).map(|g| g.as_slice())
    }

    pub fn contains_key(&self, key: &CompositeKey) -> bool {
        self.groups.contains_key(key)
    }

    pub fn key_count(&self) -> usize {
        self.order.len()
    }

    pub fn record_count(&self) -> usize {
        self.records
    }

    pub fn is_empty(&self) -> bool {
        self.records == 0
    }

    /// Keys held by more than one record, in first-appearance order.
    pub fn duplicates(&self) -> Vec<(&CompositeKey, usize)> {
        self.order
            .iter()
            .filter_map(|k| {
                let n = self.groups.get(k).map_or(0, |g| g.len());
                (n > 1).then_some((k, n))
            })
            .collect()
    }
}
