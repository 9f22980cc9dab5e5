use std::sync::Arc;

use async_trait::async_trait;
use entity::Employee;
use tokio::sync::RwLock;

use super::{EmployeeStore, StoreError, StoreResult};

/// Process-local store that keeps records in insertion order.
#[derive(Clone, Debug, Default)]
pub struct MemoryEmployeeStore {
    records: Arc<RwLock<Vec<Employee>>>,
}

impl MemoryEmployeeStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

#[async_trait]
impl EmployeeStore for MemoryEmployeeStore {
    async fn list(&self) -> StoreResult<Vec<Employee>> {
        Ok(self.records.read().await.clone())
    }

    async fn find(&self, id: i32) -> StoreResult<Option<Employee>> {
        let records = self.records.read().await;
        Ok(records.iter().find(|record| record.id == id).cloned())
    }

    async fn insert(&self, employee: Employee) -> StoreResult<Employee> {
        let mut records = self.records.write().await;
        if records.iter().any(|record| record.id == employee.id) {
            return Err(StoreError::Conflict(employee.id));
        }
        records.push(employee.clone());
        Ok(employee)
    }

    async fn save(&self, employee: &Employee) -> StoreResult<()> {
        let mut records = self.records.write().await;
        let record = records
            .iter_mut()
            .find(|record| record.id == employee.id)
            .ok_or(StoreError::Missing(employee.id))?;
        record.name = employee.name.clone();
        Ok(())
    }

    async fn remove(&self, id: i32) -> StoreResult<()> {
        let mut records = self.records.write().await;
        let index = records
            .iter()
            .position(|record| record.id == id)
            .ok_or(StoreError::Missing(id))?;
        records.remove(index);
        Ok(())
    }
}
