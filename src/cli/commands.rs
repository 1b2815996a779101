//! CLI command implementations
//!
//! Each command opens the two snapshot files under `data_dir`
//! (`dictionaries.json`, `clocks.json`), runs against in-memory indexes and
//! writes back only the files whose index changed.
//!
//! Counters are written before dictionaries. A crash between the two leaves
//! the counters ahead, which only costs gaps in the ID space. Opening also
//! raises any counter that is behind its dictionary, so files saved by an
//! older build, or restored out of step, never cause an ID to be reissued.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde_json::{json, Map, Value};

use crate::clock::{Clock, CounterIndex};
use crate::config::StoreConfig;
use crate::encoding::{Dictionary, DictionaryIndex, KeyEncoder, PackedKey, Resource};
use crate::entity::Key;
use crate::index::Snapshot;
use crate::observability::{log_event, Event, Logger};
use crate::persistence::{open_index, save_index};
use crate::store::CancellationToken;

use super::args::Command;
use super::errors::{CliError, CliResult};
use super::io::{stdout, write_error, write_response};

const DICTIONARIES_FILE: &str = "dictionaries.json";
const COUNTERS_FILE: &str = "clocks.json";

/// The encoder and its backing files.
struct Workspace {
    data_dir: PathBuf,
    encoder: KeyEncoder<DictionaryIndex, CounterIndex>,
    dictionaries_at_open: Arc<Snapshot<Key, Key, u64>>,
    counters_at_open: Arc<Snapshot<Key, (), u64>>,
}

impl Workspace {
    fn open(config: &StoreConfig) -> CliResult<Self> {
        let dictionaries: DictionaryIndex =
            open_index(&config.data_dir.join(DICTIONARIES_FILE), config)?;
        let counters: CounterIndex = open_index(&config.data_dir.join(COUNTERS_FILE), config)?;
        let dictionaries_at_open = dictionaries.snapshot();
        let counters_at_open = counters.snapshot();

        let workspace = Self {
            data_dir: config.data_dir.clone(),
            encoder: KeyEncoder::new(dictionaries, Clock::new(counters)),
            dictionaries_at_open,
            counters_at_open,
        };
        workspace.encoder.reconcile(&CancellationToken::new())?;
        Ok(workspace)
    }

    /// Writes back every index whose snapshot moved since `open`.
    fn save_changes(&self) -> CliResult<()> {
        let counters = self.encoder.clock().store();
        if !Arc::ptr_eq(&self.counters_at_open, &counters.snapshot()) {
            save_index(&self.data_dir.join(COUNTERS_FILE), counters)?;
        }

        let dictionaries = self.encoder.dictionaries();
        if !Arc::ptr_eq(&self.dictionaries_at_open, &dictionaries.snapshot()) {
            save_index(&self.data_dir.join(DICTIONARIES_FILE), dictionaries)?;
        }
        Ok(())
    }
}

/// Load configuration (defaults if no path) and apply its log level.
pub fn load_config(path: Option<&Path>) -> CliResult<StoreConfig> {
    let config = match path {
        Some(path) => StoreConfig::load(path)?,
        None => StoreConfig::default(),
    };
    Logger::set_min_severity(config.severity()?);

    log_event(
        Event::ConfigLoaded,
        &[
            ("data_dir", &config.data_dir.display().to_string()),
            ("log_level", &config.log_level),
        ],
    );
    Ok(config)
}

/// Run a parsed command and print its response to stdout.
pub fn run_command(command: Command) -> CliResult<()> {
    run_command_to(command, &mut stdout())
}

/// Run a parsed command and write its one-line response to `out`.
///
/// Failures are written as an error response too, then returned.
pub fn run_command_to<W: Write>(command: Command, out: &mut W) -> CliResult<()> {
    let config = load_config(command.config_path().map(PathBuf::as_path));
    let result = config.and_then(|config| execute(&config, command));

    match result {
        Ok(response) => write_response(out, response),
        Err(err) => {
            write_error(out, &err)?;
            Err(err)
        }
    }
}

/// Run `command` against `config`, returning the response payload.
pub fn execute(config: &StoreConfig, command: Command) -> CliResult<Value> {
    match command {
        Command::Encode {
            namespace,
            resource,
            relationship,
            ..
        } => encode(config, &namespace, &resource, &relationship),
        Command::Decode { packed, .. } => decode(config, &packed),
        Command::Tick { name, .. } => tick(config, &name),
        Command::Dump { .. } => dump(config),
    }
}

pub fn encode(
    config: &StoreConfig,
    namespace: &str,
    resource: &str,
    relationship: &str,
) -> CliResult<Value> {
    let workspace = Workspace::open(config)?;
    let resource = Resource::new(namespace, resource)?;
    let relationship = Key::new(relationship)?;

    let packed = workspace
        .encoder
        .pack(&resource, &relationship, &CancellationToken::new())?;
    workspace.save_changes()?;

    let ids = packed.unpack();
    Ok(json!({
        "packed": packed.value(),
        "hex": packed.to_string(),
        "namespace_id": ids.namespace_id,
        "relationship_id": ids.relationship_id,
        "resource_id": ids.resource_id,
    }))
}

pub fn decode(config: &StoreConfig, packed: &str) -> CliResult<Value> {
    let workspace = Workspace::open(config)?;
    let packed = parse_packed(packed)?;

    let (resource, relationship) = workspace
        .encoder
        .decode(packed)
        .ok_or_else(|| CliError::UnknownKey(packed.to_string()))?;

    Ok(json!({
        "packed": packed.value(),
        "namespace": resource.namespace,
        "resource": resource.name,
        "relationship": relationship,
    }))
}

pub fn tick(config: &StoreConfig, name: &str) -> CliResult<Value> {
    let workspace = Workspace::open(config)?;
    let name = Key::new(name)?;

    let value = workspace
        .encoder
        .clock()
        .tick(&name, &CancellationToken::new())?;
    workspace.save_changes()?;

    Ok(json!({ "name": name, "value": value }))
}

pub fn dump(config: &StoreConfig) -> CliResult<Value> {
    let workspace = Workspace::open(config)?;

    let snapshot = workspace.encoder.dictionaries().snapshot();
    let mut dictionaries = Map::new();
    for dictionary in Dictionary::ALL {
        let entries: Map<String, Value> = snapshot
            .partition(&dictionary.hash_key())
            .map(|doc| (doc.range_key().to_string(), json!(doc.payload())))
            .collect();
        if !entries.is_empty() {
            dictionaries.insert(dictionary.as_str().to_string(), Value::Object(entries));
        }
    }

    let mut counters = Map::new();
    for doc in workspace.encoder.clock().store().snapshot().documents() {
        counters.insert(doc.hash_key().to_string(), json!(doc.payload()));
    }

    Ok(json!({
        "dictionaries": dictionaries,
        "counters": counters,
    }))
}

fn parse_packed(raw: &str) -> CliResult<PackedKey> {
    let value = match raw.strip_prefix("0x") {
        Some(hex) => u64::from_str_radix(hex, 16),
        None => raw.parse::<u64>(),
    };
    value
        .map(PackedKey::from_raw)
        .map_err(|e| CliError::InvalidArgument(format!("packed key '{}': {}", raw, e)))
}
