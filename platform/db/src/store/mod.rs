//! The record store behind the `/employees` handlers.
//!
//! Handlers only see [`EmployeeStore`]; which backend sits behind it is a
//! startup decision. Every operation is a single read or a single write, so a
//! handler that reads and then writes is exposed to last-writer-wins races
//! between concurrent requests. Backends only guarantee that each individual
//! call is safe to run concurrently.

mod db;
mod memory;

use async_trait::async_trait;
use entity::Employee;
use sea_orm::DbErr;
use thiserror::Error;

pub use db::DbEmployeeStore;
pub use memory::MemoryEmployeeStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("employee {0} already exists")]
    Conflict(i32),
    #[error("employee {0} does not exist")]
    Missing(i32),
    #[error(transparent)]
    Database(#[from] DbErr),
}

pub type StoreResult<T> = Result<T, StoreError>;

#[async_trait]
pub trait EmployeeStore: Send + Sync {
    /// Every record, in the backend's scan order.
    async fn list(&self) -> StoreResult<Vec<Employee>>;

    async fn find(&self, id: i32) -> StoreResult<Option<Employee>>;

    /// Inserts without checking for an existing id first; duplicates surface
    /// as whatever the backend raises.
    async fn insert(&self, employee: Employee) -> StoreResult<Employee>;

    /// Persists the mutable fields of an already stored record.
    async fn save(&self, employee: &Employee) -> StoreResult<()>;

    async fn remove(&self, id: i32) -> StoreResult<()>;

    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }
}
