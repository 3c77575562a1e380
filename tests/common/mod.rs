//! In-memory table store for exercising the migration engine.

#![allow(dead_code)]

use async_trait::async_trait;
use dynamo_migrate::{SeedItem, StoreError, TableSchema, TableStore};
use serde_json::json;
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Mutex;
use tokio::time::Instant;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Create(String),
    Delete(String),
    Seed(String),
}

#[derive(Default)]
struct State {
    tables: HashMap<String, Vec<SeedItem>>,
    calls: Vec<Call>,
    seed_times: Vec<Instant>,
    never_ready: HashSet<String>,
    scripted: HashMap<(Op, String), VecDeque<StoreError>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Op {
    Create,
    Delete,
    Seed,
}

#[derive(Default)]
pub struct MemoryStore {
    state: Mutex<State>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-create `table` as if an earlier run had made it.
    pub fn with_table(self, table: &str) -> Self {
        self.state
            .lock()
            .unwrap()
            .tables
            .insert(table.to_string(), Vec::new());
        self
    }

    /// Seed writes to `table` always report the table as missing.
    pub fn never_ready(self, table: &str) -> Self {
        self.state
            .lock()
            .unwrap()
            .never_ready
            .insert(table.to_string());
        self
    }

    /// Queue errors returned by the next `op` calls on `table`.
    pub fn fail(self, op: Op, table: &str, errors: Vec<StoreError>) -> Self {
        self.state
            .lock()
            .unwrap()
            .scripted
            .entry((op, table.to_string()))
            .or_default()
            .extend(errors);
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn seed_times(&self) -> Vec<Instant> {
        self.state.lock().unwrap().seed_times.clone()
    }

    pub fn has_table(&self, table: &str) -> bool {
        self.state.lock().unwrap().tables.contains_key(table)
    }

    pub fn items(&self, table: &str) -> Vec<SeedItem> {
        self.state
            .lock()
            .unwrap()
            .tables
            .get(table)
            .cloned()
            .unwrap_or_default()
    }

    fn scripted(state: &mut State, op: Op, table: &str) -> Option<StoreError> {
        state
            .scripted
            .get_mut(&(op, table.to_string()))
            .and_then(VecDeque::pop_front)
    }
}

#[async_trait]
impl TableStore for MemoryStore {
    async fn create_table(&self, schema: &TableSchema) -> Result<(), StoreError> {
        let mut state = self.state.lock().unwrap();
        let table = schema.table_name.clone();
        state.calls.push(Call::Create(table.clone()));

        if let Some(err) = Self::scripted(&mut state, Op::Create, &table) {
            return Err(err);
        }
        if state.tables.contains_key(&table) {
            return Err(StoreError::AlreadyExists(table));
        }
        state.tables.insert(table, Vec::new());
        Ok(())
    }

    async fn delete_table(&self, table_name: &str) -> Result<(), StoreError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(Call::Delete(table_name.to_string()));

        if let Some(err) = Self::scripted(&mut state, Op::Delete, table_name) {
            return Err(err);
        }
        match state.tables.remove(table_name) {
            Some(_) => Ok(()),
            None => Err(StoreError::NotFound(table_name.to_string())),
        }
    }

    async fn batch_write_items(
        &self,
        table_name: &str,
        items: &[SeedItem],
    ) -> Result<(), StoreError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(Call::Seed(table_name.to_string()));
        state.seed_times.push(Instant::now());

        if let Some(err) = Self::scripted(&mut state, Op::Seed, table_name) {
            return Err(err);
        }
        if state.never_ready.contains(table_name) {
            return Err(StoreError::NotFound(table_name.to_string()));
        }
        match state.tables.get_mut(table_name) {
            Some(stored) => {
                stored.extend_from_slice(items);
                Ok(())
            }
            None => Err(StoreError::NotFound(table_name.to_string())),
        }
    }
}

pub fn seed(id: &str) -> SeedItem {
    serde_json::from_value(json!({ "id": id, "name": format!("user {id}") })).unwrap()
}

/// Migration file source for `table` with `seeds` items.
pub fn migration_source(table: &str, seeds: usize) -> String {
    let seeds: Vec<SeedItem> = (0..seeds).map(|i| seed(&format!("{table}-{i}"))).collect();
    json!({
        "Table": {
            "TableName": table,
            "AttributeDefinitions": [{ "AttributeName": "id", "AttributeType": "S" }],
            "KeySchema": [{ "AttributeName": "id", "KeyType": "HASH" }],
            "ProvisionedThroughput": { "ReadCapacityUnits": 1, "WriteCapacityUnits": 1 }
        },
        "Seeds": seeds
    })
    .to_string()
}
