use crate::error::StorageError;
use std::collections::HashMap;
use std::sync::RwLock;

/// 按硬件地址唯一的自增 id 表，网关与模块共用。
pub(crate) struct IdentityTable {
    state: RwLock<IdentityState>,
}

struct IdentityState {
    ids: HashMap<String, i64>,
    next_id: i64,
}

impl IdentityTable {
    pub(crate) fn new() -> Self {
        Self {
            state: RwLock::new(IdentityState {
                ids: HashMap::new(),
                next_id: 1,
            }),
        }
    }

    pub(crate) fn find(&self, uuid: &str) -> Result<Option<i64>, StorageError> {
        let state = self
            .state
            .read()
            .map_err(|_| StorageError::new("lock failed"))?;
        Ok(state.ids.get(uuid).copied())
    }

    /// 地址已存在时返回 Conflict
    pub(crate) fn insert(&self, uuid: &str, what: &str) -> Result<i64, StorageError> {
        let mut state = self
            .state
            .write()
            .map_err(|_| StorageError::new("lock failed"))?;
        if state.ids.contains_key(uuid) {
            return Err(StorageError::conflict(format!("{what} exists: {uuid}")));
        }
        let id = state.next_id;
        state.next_id += 1;
        state.ids.insert(uuid.to_string(), id);
        Ok(id)
    }

    pub(crate) fn entries(&self) -> Result<Vec<(i64, String)>, StorageError> {
        let state = self
            .state
            .read()
            .map_err(|_| StorageError::new("lock failed"))?;
        let mut entries: Vec<(i64, String)> = state
            .ids
            .iter()
            .map(|(uuid, id)| (*id, uuid.clone()))
            .collect();
        entries.sort_by_key(|(id, _)| *id);
        Ok(entries)
    }
}
