//! 传感器模块内存存储实现

use super::identity::IdentityTable;
use crate::error::StorageError;
use crate::models::ModuleRecord;
use crate::traits::ModuleStore;

/// 传感器模块内存存储
pub struct InMemoryModuleStore {
    table: IdentityTable,
}

impl InMemoryModuleStore {
    pub fn new() -> Self {
        Self {
            table: IdentityTable::new(),
        }
    }
}

impl Default for InMemoryModuleStore {
    fn default() -> Self {
        Self::new()
    }
}

fn unclaimed(id: i64, uuid: String) -> ModuleRecord {
    ModuleRecord {
        id,
        uuid,
        location_id: None,
        friendly_name: None,
    }
}

#[async_trait::async_trait]
impl ModuleStore for InMemoryModuleStore {
    async fn find_module(&self, uuid: &str) -> Result<Option<ModuleRecord>, StorageError> {
        Ok(self
            .table
            .find(uuid)?
            .map(|id| unclaimed(id, uuid.to_string())))
    }

    async fn create_module(&self, uuid: &str) -> Result<ModuleRecord, StorageError> {
        let id = self.table.insert(uuid, "module")?;
        Ok(unclaimed(id, uuid.to_string()))
    }

    async fn list_modules(&self) -> Result<Vec<ModuleRecord>, StorageError> {
        Ok(self
            .table
            .entries()?
            .into_iter()
            .map(|(id, uuid)| unclaimed(id, uuid))
            .collect())
    }
}
