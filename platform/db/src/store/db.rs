use async_trait::async_trait;
use entity::{Employee, employees};
use sea_orm::{
    ActiveValue::Set, ColumnTrait, EntityTrait, QueryFilter, SqlErr, sea_query::Expr,
};
use tracing::debug;

use super::{EmployeeStore, StoreError, StoreResult};
use crate::DbPool;

/// sea-orm backed store; works against any backend the pool was opened with.
#[derive(Clone, Debug)]
pub struct DbEmployeeStore {
    db: DbPool,
}

impl DbEmployeeStore {
    pub fn new(db: DbPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl EmployeeStore for DbEmployeeStore {
    async fn list(&self) -> StoreResult<Vec<Employee>> {
        let rows = employees::Entity::find().all(&self.db).await?;
        Ok(rows.into_iter().map(Employee::from).collect())
    }

    async fn find(&self, id: i32) -> StoreResult<Option<Employee>> {
        let row = employees::Entity::find_by_id(id).one(&self.db).await?;
        Ok(row.map(Employee::from))
    }

    async fn insert(&self, employee: Employee) -> StoreResult<Employee> {
        let model = employees::ActiveModel {
            id: Set(employee.id),
            name: Set(employee.name.clone()),
        };
        employees::Entity::insert(model)
            .exec_without_returning(&self.db)
            .await
            .map_err(|err| match err.sql_err() {
                Some(SqlErr::UniqueConstraintViolation(_)) => StoreError::Conflict(employee.id),
                _ => StoreError::Database(err),
            })?;
        debug!(id = employee.id, "employee row inserted");
        Ok(employee)
    }

    async fn save(&self, employee: &Employee) -> StoreResult<()> {
        let result = employees::Entity::update_many()
            .col_expr(employees::Column::Name, Expr::value(employee.name.clone()))
            .filter(employees::Column::Id.eq(employee.id))
            .exec(&self.db)
            .await?;
        if result.rows_affected == 0 {
            return Err(StoreError::Missing(employee.id));
        }
        Ok(())
    }

    async fn remove(&self, id: i32) -> StoreResult<()> {
        let result = employees::Entity::delete_by_id(id).exec(&self.db).await?;
        if result.rows_affected == 0 {
            return Err(StoreError::Missing(id));
        }
        Ok(())
    }

    async fn ping(&self) -> StoreResult<()> {
        self.db.ping().await.map_err(Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{DatabaseSettings, IN_MEMORY_URL, connect};
    use migration::{Migrator, MigratorTrait};

    async fn migrated_pool() -> DbPool {
        let settings = DatabaseSettings::default().with_url(IN_MEMORY_URL);
        let db = connect(&settings).await.unwrap();
        Migrator::up(&db, None).await.unwrap();
        db
    }

    async fn store() -> DbEmployeeStore {
        DbEmployeeStore::new(migrated_pool().await)
    }

    #[tokio::test]
    async fn records_survive_connection_reacquire() {
        let db = migrated_pool().await;
        let store = DbEmployeeStore::new(db.clone());
        store.insert(Employee::new(1, Some("Jame"))).await.unwrap();

        let sqlite = db.get_sqlite_connection_pool();
        for _ in 0..3 {
            let conn = sqlite.acquire().await.unwrap();
            drop(conn);
        }
        assert_eq!(sqlite.size(), 1);
        assert_eq!(
            store.find(1).await.unwrap(),
            Some(Employee::new(1, Some("Jame")))
        );
    }

    #[tokio::test]
    async fn insert_then_find_round_trips() {
        let store = store().await;
        store.insert(Employee::new(1, Some("Jame"))).await.unwrap();
        let found = store.find(1).await.unwrap();
        assert_eq!(found, Some(Employee::new(1, Some("Jame"))));
        assert_eq!(store.find(2).await.unwrap(), None);
    }

    #[tokio::test]
    async fn duplicate_primary_key_is_rejected() {
        let store = store().await;
        store.insert(Employee::new(1, Some("Jame"))).await.unwrap();
        let err = store
            .insert(Employee::new(1, Some("Jone")))
            .await
            .unwrap_err();
        assert!(
            matches!(err, StoreError::Conflict(1) | StoreError::Database(_)),
            "got {err:?}"
        );
        assert_eq!(store.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn save_and_remove_report_missing_rows() {
        let store = store().await;
        let ghost = Employee::new(7, Some("Ghost"));
        assert!(matches!(
            store.save(&ghost).await,
            Err(StoreError::Missing(7))
        ));
        assert!(matches!(store.remove(7).await, Err(StoreError::Missing(7))));
    }

    #[tokio::test]
    async fn save_overwrites_name_only() {
        let store = store().await;
        store.insert(Employee::new(3, Some("Smith"))).await.unwrap();
        store.save(&Employee::new(3, None::<&str>)).await.unwrap();
        assert_eq!(store.find(3).await.unwrap(), Some(Employee::new(3, None::<&str>)));
        store.remove(3).await.unwrap();
        assert!(store.list().await.unwrap().is_empty());
        store.ping().await.unwrap();
    }
}
