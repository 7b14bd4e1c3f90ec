//! Snapshot Codec - Versioned JSON for the whole store
//!
//! ```json
//! {
//!   "version": 1,
//!   "lastQueueId": 3,
//!   "entities": [{ "soul": 7, "genes": [...], "children": [{ "pending": 3 }], "parents": [] }],
//!   "pending": [{ "queueId": 3, "entity": { "soul": 0, ... } }]
//! }
//! ```
//!
//! Records are plain serde DTOs. Every decoded entity goes back through
//! `Entity::from_parts`, so a snapshot can never smuggle in a malformed gene.

use std::collections::HashSet;

use lineage_domain::{ChildRef, Entity, Gene, QueueId, Sex, Soul};
use lineage_usecase::StorageError;
use serde::{Deserialize, Serialize};

pub const SNAPSHOT_VERSION: u32 = 1;

/// Store contents in domain types
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Snapshot {
    pub entities: Vec<Entity>,
    pub pending: Vec<(QueueId, Entity)>,
    pub last_queue_id: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotRecord {
    pub version: u32,
    #[serde(default)]
    pub last_queue_id: u64,
    #[serde(default)]
    pub entities: Vec<EntityRecord>,
    #[serde(default)]
    pub pending: Vec<PendingRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityRecord {
    pub soul: u64,
    pub genes: Vec<GeneRecord>,
    #[serde(default)]
    pub children: Vec<ChildRecord>,
    #[serde(default)]
    pub parents: Vec<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingRecord {
    pub queue_id: u64,
    pub entity: EntityRecord,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneRecord {
    pub str: f64,
    pub con: f64,
    pub dex: f64,
    pub chr: f64,
    pub wis: f64,
    pub int: f64,
    pub sex: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChildRecord {
    Soul(u64),
    Pending(u64),
}

fn codec_error(message: impl Into<String>) -> StorageError {
    StorageError::Codec {
        message: message.into(),
    }
}

// ========== Genes ==========

pub fn encode_gene(gene: &Gene) -> GeneRecord {
    let [str, con, dex, chr, wis, int] = gene.stats();
    GeneRecord {
        str,
        con,
        dex,
        chr,
        wis,
        int,
        sex: gene.sex().as_str().to_string(),
    }
}

pub fn decode_gene(record: &GeneRecord) -> Result<Gene, StorageError> {
    let sex = Sex::from_symbol(&record.sex)
        .ok_or_else(|| codec_error(format!("unknown sex marker {:?}", record.sex)))?;
    let gene = Gene::new(
        [
            record.str,
            record.con,
            record.dex,
            record.chr,
            record.wis,
            record.int,
        ],
        sex,
    );
    gene.validate().map_err(|e| codec_error(e.to_string()))?;
    Ok(gene)
}

// ========== Entities ==========

pub fn encode_entity(entity: &Entity) -> EntityRecord {
    EntityRecord {
        soul: entity.soul().get(),
        genes: entity.genes().iter().map(encode_gene).collect(),
        children: entity
            .children()
            .iter()
            .map(|child| {
                if child.is_placeholder() {
                    ChildRecord::Pending((child.raw() & !ChildRef::PLACEHOLDER_FLAG) as u64)
                } else {
                    ChildRecord::Soul(child.raw() as u64)
                }
            })
            .collect(),
        parents: entity.parents().iter().map(Soul::get).collect(),
    }
}

pub fn decode_entity(record: &EntityRecord) -> Result<Entity, StorageError> {
    let [first, second] = record.genes.as_slice() else {
        return Err(codec_error(format!(
            "entity {} has {} genes, expected 2",
            record.soul,
            record.genes.len()
        )));
    };
    let genes = [decode_gene(first)?, decode_gene(second)?];

    let children = record.children.iter().map(|child| match child {
        ChildRecord::Soul(soul) => ChildRef::soul(Soul::new(*soul)),
        ChildRecord::Pending(queue_id) => ChildRef::placeholder(QueueId::new(*queue_id)),
    });
    let parents = record.parents.iter().copied().map(Soul::new);

    Entity::from_parts(Soul::new(record.soul), genes, children, parents)
        .map_err(|e| codec_error(format!("entity {}: {}", record.soul, e)))
}

// ========== Snapshots ==========

pub fn encode_snapshot(snapshot: &Snapshot) -> SnapshotRecord {
    SnapshotRecord {
        version: SNAPSHOT_VERSION,
        last_queue_id: snapshot.last_queue_id,
        entities: snapshot.entities.iter().map(encode_entity).collect(),
        pending: snapshot
            .pending
            .iter()
            .map(|(queue_id, entity)| PendingRecord {
                queue_id: queue_id.get(),
                entity: encode_entity(entity),
            })
            .collect(),
    }
}

pub fn decode_snapshot(record: &SnapshotRecord) -> Result<Snapshot, StorageError> {
    if record.version != SNAPSHOT_VERSION {
        return Err(codec_error(format!(
            "unsupported snapshot version {}",
            record.version
        )));
    }

    let mut seen = HashSet::new();
    let mut entities = Vec::with_capacity(record.entities.len());
    for entry in &record.entities {
        let entity = decode_entity(entry)?;
        if !entity.is_claimed() {
            return Err(codec_error("stored entity has no soul"));
        }
        if !seen.insert(entity.soul()) {
            return Err(codec_error(format!("duplicate soul {}", entity.soul())));
        }
        entities.push(entity);
    }

    let mut queue_ids = HashSet::new();
    let mut pending = Vec::with_capacity(record.pending.len());
    for entry in &record.pending {
        let entity = decode_entity(&entry.entity)?;
        if entity.is_claimed() {
            return Err(codec_error(format!(
                "pending entry {} is already claimed",
                entry.queue_id
            )));
        }
        if !queue_ids.insert(entry.queue_id) {
            return Err(codec_error(format!(
                "duplicate queue id {}",
                entry.queue_id
            )));
        }
        pending.push((QueueId::new(entry.queue_id), entity));
    }

    let highest = record.pending.iter().map(|p| p.queue_id).max().unwrap_or(0);

    Ok(Snapshot {
        entities,
        pending,
        last_queue_id: record.last_queue_id.max(highest),
    })
}

pub fn to_json(snapshot: &Snapshot) -> Result<String, StorageError> {
    serde_json::to_string_pretty(&encode_snapshot(snapshot)).map_err(|e| codec_error(e.to_string()))
}

pub fn from_json(json: &str) -> Result<Snapshot, StorageError> {
    let record: SnapshotRecord =
        serde_json::from_str(json).map_err(|e| codec_error(e.to_string()))?;
    decode_snapshot(&record)
}
