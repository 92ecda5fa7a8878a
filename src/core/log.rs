use hashbrown::HashMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use crate::{
    engine::traits::DupeKey,
    qso::{Qso, QsoPatch},
    types::QsoId,
};

use super::indices::VecIndex;

/// Version written into [`LogSnapshot`].
pub const SNAPSHOT_FORMAT_VERSION: u16 = 1;

/// Log mutation failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LogError {
    /// A required field is blank.
    #[error("qso is missing required field `{0}`")]
    MissingField(&'static str),
    /// Another QSO already uses this id.
    #[error("qso id already in log: {0}")]
    DuplicateId(QsoId),
    /// No QSO with this id.
    #[error("no qso with id {0}")]
    MissingQso(QsoId),
}

/// Plain, serializable copy of a log for collaborators that persist it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogSnapshot {
    /// Always [`SNAPSHOT_FORMAT_VERSION`] when written by this crate.
    pub format_version: u16,
    /// Records in logging order.
    pub qsos: Vec<Qso>,
}

/// Ordered in-memory QSO log with call and duplicate indices.
#[derive(Debug, Default)]
pub struct QsoLog {
    records: HashMap<QsoId, Qso>,
    order: Vec<QsoId>,
    by_call: VecIndex<String>,
    by_dupe: VecIndex<DupeKey>,
}

impl QsoLog {
    /// Empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuilds a log from a snapshot, validating every record.
    pub fn from_snapshot(snapshot: LogSnapshot) -> Result<Self, LogError> {
        let mut log = Self::new();
        for qso in snapshot.qsos {
            log.insert(qso)?;
        }
        Ok(log)
    }

    /// Copies the log into a [`LogSnapshot`].
    pub fn export_snapshot(&self) -> LogSnapshot {
        LogSnapshot {
            format_version: SNAPSHOT_FORMAT_VERSION,
            qsos: self.to_vec(),
        }
    }

    /// Appends `qso`. Fails on a blank call/date/time/band or a reused id.
    pub fn insert(&mut self, qso: Qso) -> Result<(), LogError> {
        if let Some(field) = qso.missing_required_field() {
            return Err(LogError::MissingField(field));
        }
        if self.records.contains_key(&qso.id) {
            return Err(LogError::DuplicateId(qso.id));
        }

        self.insert_indices(&qso);
        self.order.push(qso.id.clone());
        self.records.insert(qso.id.clone(), qso);
        Ok(())
    }

    /// Replaces the stored QSO with the same id, keeping its position.
    pub fn update(&mut self, qso: Qso) -> Result<(), LogError> {
        if let Some(field) = qso.missing_required_field() {
            return Err(LogError::MissingField(field));
        }
        let old = self
            .records
            .remove(&qso.id)
            .ok_or_else(|| LogError::MissingQso(qso.id.clone()))?;

        self.remove_indices(&old);
        self.insert_indices(&qso);
        self.records.insert(qso.id.clone(), qso);
        Ok(())
    }

    /// Applies `patch` to the QSO `id`. The patched record must still be complete.
    pub fn patch(&mut self, id: &str, patch: &QsoPatch) -> Result<(), LogError> {
        let mut rec = self
            .records
            .get(id)
            .cloned()
            .ok_or_else(|| LogError::MissingQso(id.to_string()))?;
        patch.apply_to(&mut rec);
        self.update(rec)
    }

    /// Deletes `id` and returns the record.
    pub fn remove(&mut self, id: &str) -> Result<Qso, LogError> {
        let rec = self
            .records
            .remove(id)
            .ok_or_else(|| LogError::MissingQso(id.to_string()))?;
        self.remove_indices(&rec);
        if let Some(pos) = self.order.iter().position(|x| x == id) {
            self.order.remove(pos);
        }
        Ok(rec)
    }

    /// Replaces the whole log. On error the current contents are kept.
    pub fn load(&mut self, qsos: Vec<Qso>) -> Result<(), LogError> {
        let fresh = Self::from_snapshot(LogSnapshot {
            format_version: SNAPSHOT_FORMAT_VERSION,
            qsos,
        })?;
        *self = fresh;
        Ok(())
    }

    /// Appends every acceptable QSO and skips the rest. Returns how many were added.
    pub fn import(&mut self, qsos: Vec<Qso>) -> usize {
        let mut added = 0usize;
        for qso in qsos {
            let call = qso.call.clone();
            match self.insert(qso) {
                Ok(()) => added += 1,
                Err(err) => warn!(%call, %err, "skipping imported qso"),
            }
        }
        added
    }

    /// Drops every record.
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// QSO by id.
    pub fn get(&self, id: &str) -> Option<&Qso> {
        self.records.get(id)
    }

    /// Last `n` QSOs, oldest first.
    pub fn recent(&self, n: usize) -> Vec<&Qso> {
        let start = self.order.len().saturating_sub(n);
        self.order[start..]
            .iter()
            .filter_map(|id| self.records.get(id))
            .collect()
    }

    /// Owned form of [`Self::recent`].
    pub fn recent_cloned(&self, n: usize) -> Vec<Qso> {
        self.recent(n).into_iter().cloned().collect()
    }

    /// QSOs with exactly this call, in logging order.
    pub fn by_call(&self, call: &str) -> Vec<&Qso> {
        self.by_call
            .get(call)
            .into_iter()
            .flat_map(|ids| ids.iter())
            .filter_map(|id| self.records.get(id))
            .collect()
    }

    /// Owned form of [`Self::by_call`].
    pub fn by_call_cloned(&self, call: &str) -> Vec<Qso> {
        self.by_call(call).into_iter().cloned().collect()
    }

    /// Indexed equivalent of [`crate::engine::is_duplicate`] over this log.
    pub fn is_duplicate(&self, candidate: &Qso) -> bool {
        self.contains_key(&DupeKey::of(candidate))
    }

    /// True when some QSO carries `key`.
    pub fn contains_key(&self, key: &DupeKey) -> bool {
        self.by_dupe.get(key).is_some_and(|ids| !ids.is_empty())
    }

    /// QSOs in logging order.
    pub fn iter(&self) -> impl Iterator<Item = &Qso> + '_ {
        self.order.iter().filter_map(|id| self.records.get(id))
    }

    /// Owned copy in logging order.
    pub fn to_vec(&self) -> Vec<Qso> {
        self.iter().cloned().collect()
    }

    /// Ids in logging order.
    pub fn ordered_ids(&self) -> &[QsoId] {
        &self.order
    }

    /// Number of QSOs.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// True when the log holds nothing.
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    fn insert_indices(&mut self, rec: &Qso) {
        self.by_call
            .entry(rec.call.clone())
            .or_default()
            .push(rec.id.clone());
        self.by_dupe
            .entry(DupeKey::of(rec))
            .or_default()
            .push(rec.id.clone());
    }

    fn remove_indices(&mut self, rec: &Qso) {
        Self::remove_from_vec_index(&mut self.by_call, &rec.call, &rec.id);
        Self::remove_from_vec_index(&mut self.by_dupe, &DupeKey::of(rec), &rec.id);
    }

    fn remove_from_vec_index<K>(index: &mut VecIndex<K>, key: &K, id: &str)
    where
        K: std::hash::Hash + Eq,
    {
        let Some(ids) = index.get_mut(key) else {
            return;
        };
        if let Some(pos) = ids.iter().position(|x| x == id) {
            ids.remove(pos);
        }
        if ids.is_empty() {
            index.remove(key);
        }
    }
}
