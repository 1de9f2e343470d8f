//! 网关内存存储实现

use super::identity::IdentityTable;
use crate::error::StorageError;
use crate::models::GatewayRecord;
use crate::traits::GatewayStore;

/// 网关内存存储
pub struct InMemoryGatewayStore {
    table: IdentityTable,
}

impl InMemoryGatewayStore {
    /// 创建新的网关存储
    pub fn new() -> Self {
        Self {
            table: IdentityTable::new(),
        }
    }
}

impl Default for InMemoryGatewayStore {
    fn default() -> Self {
        Self::new()
    }
}

fn unclaimed(id: i64, uuid: String) -> GatewayRecord {
    GatewayRecord {
        id,
        uuid,
        location_id: None,
        friendly_name: None,
    }
}

#[async_trait::async_trait]
impl GatewayStore for InMemoryGatewayStore {
    async fn find_gateway(&self, uuid: &str) -> Result<Option<GatewayRecord>, StorageError> {
        Ok(self
            .table
            .find(uuid)?
            .map(|id| unclaimed(id, uuid.to_string())))
    }

    async fn create_gateway(&self, uuid: &str) -> Result<GatewayRecord, StorageError> {
        let id = self.table.insert(uuid, "gateway")?;
        Ok(unclaimed(id, uuid.to_string()))
    }

    async fn list_gateways(&self) -> Result<Vec<GatewayRecord>, StorageError> {
        Ok(self
            .table
            .entries()?
            .into_iter()
            .map(|(id, uuid)| unclaimed(id, uuid))
            .collect())
    }
}
