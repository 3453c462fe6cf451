//! Typed access to gateway tables.

pub mod catalog;
pub mod social;

use std::{marker::PhantomData, sync::Arc};

use jesprec_core::{
    admin::RecordPatch,
    domain::{Record, RowId},
    errors::DomainError,
};
use serde_json::Value;

use crate::{
    error::GatewayError,
    filter::{Order, Query},
    gateway::Gateway,
};

pub use catalog::CatalogRepository;
pub use social::{SocialOrderRepository, ORDER_NOT_FOUND};

/// Decodes rows of `T::TABLE` and validates records before they are written.
pub struct TableRepository<T: Record> {
    gateway: Arc<dyn Gateway>,
    _record: PhantomData<fn() -> T>,
}

impl<T: Record> Clone for TableRepository<T> {
    fn clone(&self) -> Self {
        Self::new(self.gateway.clone())
    }
}

impl<T: Record> TableRepository<T> {
    pub fn new(gateway: Arc<dyn Gateway>) -> Self {
        Self { gateway, _record: PhantomData }
    }

    pub fn gateway(&self) -> &Arc<dyn Gateway> {
        &self.gateway
    }

    pub async fn list(&self, order: Option<Order>) -> Result<Vec<T>, GatewayError> {
        let query = match order {
            Some(order) => Query::new().order(order),
            None => Query::new(),
        };
        self.list_where(&query).await
    }

    pub async fn list_where(&self, query: &Query) -> Result<Vec<T>, GatewayError> {
        let rows = self.gateway.select(T::TABLE, query).await?;
        decode_rows(rows)
    }

    pub async fn find(&self, id: &RowId) -> Result<Option<T>, GatewayError> {
        let rows = self.list_where(&Query::by_id(id).limit(1)).await?;
        Ok(rows.into_iter().next())
    }

    pub async fn insert(&self, record: &T) -> Result<T, GatewayError> {
        record.validate()?;
        let row = serde_json::to_value(record)?;
        let inserted = self.gateway.insert(T::TABLE, vec![row]).await?;
        first_row(inserted, || format!("insert into {} returned no rows", T::TABLE))
    }

    pub async fn update(&self, id: &RowId, record: &T) -> Result<T, GatewayError> {
        record.validate()?;
        let mut row = serde_json::to_value(record)?;
        if let Some(columns) = row.as_object_mut() {
            columns.remove("id");
            columns.remove("created_at");
        }
        self.write_patch(id, row).await
    }

    pub async fn patch(&self, id: &RowId, patch: &RecordPatch) -> Result<T, GatewayError> {
        if patch.table() != T::TABLE {
            return Err(DomainError::InvariantViolation(format!(
                "patch for `{}` cannot be applied to `{}`",
                patch.table(),
                T::TABLE
            ))
            .into());
        }
        let row = patch.to_row()?;
        self.write_patch(id, row).await
    }

    pub async fn delete(&self, id: &RowId) -> Result<u64, GatewayError> {
        self.gateway.delete(T::TABLE, &Query::by_id(id)).await
    }

    pub async fn count(&self) -> Result<u64, GatewayError> {
        self.gateway.count(T::TABLE, &Query::new()).await
    }

    async fn write_patch(&self, id: &RowId, row: Value) -> Result<T, GatewayError> {
        let updated = self.gateway.update(T::TABLE, row, &Query::by_id(id)).await?;
        let table = T::TABLE;
        match decode_rows::<T>(updated)?.into_iter().next() {
            Some(record) => Ok(record),
            None => Err(GatewayError::NotFound(format!("no `{table}` row with id {id}"))),
        }
    }
}

pub(crate) fn decode_rows<T: Record>(rows: Vec<Value>) -> Result<Vec<T>, GatewayError> {
    rows.into_iter()
        .map(|row| serde_json::from_value(row).map_err(GatewayError::from))
        .collect()
}

fn first_row<T: Record>(rows: Vec<Value>, empty: impl FnOnce() -> String) -> Result<T, GatewayError> {
    match decode_rows::<T>(rows)?.into_iter().next() {
        Some(record) => Ok(record),
        None => Err(GatewayError::Decode(empty())),
    }
}
