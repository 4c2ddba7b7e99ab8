use serde_json::Value;
use std::collections::{BTreeSet, HashMap};
use std::marker::PhantomData;
use std::sync::Arc;
use tracing::{debug, instrument};

use crate::errors::ServiceError;
use crate::models::Entity;
use crate::queries::{resolve, QueryFields, QueryOptions};
use crate::store::{Column, DeleteOutcome, ForeignKeys, Store, Tables};

/// CRUD, list and relation operations for one entity type.
pub struct EntityService<E> {
    store: Arc<Store>,
    default_page_size: Option<u64>,
    _entity: PhantomData<fn() -> E>,
}

impl<E> Clone for EntityService<E> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            default_page_size: self.default_page_size,
            _entity: PhantomData,
        }
    }
}

impl<E> EntityService<E>
where
    E: Entity + QueryFields,
{
    /// Creates a new service over `store`
    pub fn new(store: Arc<Store>, default_page_size: Option<u64>) -> Self {
        Self {
            store,
            default_page_size,
            _entity: PhantomData,
        }
    }

    fn options(&self, params: &HashMap<String, String>) -> Result<QueryOptions, ServiceError> {
        Ok(QueryOptions::from_params(params, E::DATE_PARAM)?
            .with_default_page_size(self.default_page_size))
    }

    /// Raw row
    #[instrument(skip(self), fields(kind = %E::KIND))]
    pub async fn get(&self, id: i32) -> Result<E, ServiceError> {
        self.store
            .read(|tables| E::table(tables).get(id).cloned())
            .await
            .ok_or_else(|| ServiceError::not_found(E::KIND, id))
    }

    /// Shaped view with derived names and counts
    #[instrument(skip(self), fields(kind = %E::KIND))]
    pub async fn view(&self, id: i32) -> Result<Value, ServiceError> {
        self.store
            .read(|tables| match E::table(tables).get(id) {
                Some(row) => row.view(tables),
                None => Err(ServiceError::not_found(E::KIND, id)),
            })
            .await
    }

    /// Filtered, sorted and paged collection
    #[instrument(skip(self, params), fields(kind = %E::KIND))]
    pub async fn list(&self, params: &HashMap<String, String>) -> Result<Vec<E>, ServiceError> {
        let options = self.options(params)?;
        debug!(?options, "listing");
        Ok(self
            .store
            .read(|tables| resolve(E::table(tables), &options))
            .await)
    }

    pub async fn create(&self, row: E) -> Result<E, ServiceError> {
        self.store.create(row).await
    }

    pub async fn update(&self, id: i32, row: E) -> Result<E, ServiceError> {
        self.store.update(id, row).await
    }

    pub async fn delete(&self, id: i32) -> Result<DeleteOutcome, ServiceError> {
        self.store.delete::<E>(id).await
    }

    /// Rows of `T` whose `column` points at row `id`.
    #[instrument(skip(self, params), fields(kind = %E::KIND, related = %T::KIND))]
    pub async fn dependents<T>(
        &self,
        id: i32,
        column: Column,
        params: &HashMap<String, String>,
    ) -> Result<Vec<T>, ServiceError>
    where
        T: Entity + QueryFields,
    {
        let options = QueryOptions::from_params(params, T::DATE_PARAM)?
            .with_default_page_size(self.default_page_size);
        self.store
            .read(|tables| {
                self.ensure_live(tables, id)?;
                Ok(resolve(tables.referencing::<T>(column, id), &options))
            })
            .await
    }

    /// The single row of `T` whose unique `column` points at row `id`.
    #[instrument(skip(self), fields(kind = %E::KIND, related = %T::KIND))]
    pub async fn dependent<T: Entity>(&self, id: i32, column: Column) -> Result<Option<T>, ServiceError> {
        self.store
            .read(|tables| {
                self.ensure_live(tables, id)?;
                Ok(tables.referencing::<T>(column, id).next().cloned())
            })
            .await
    }

    /// Rows of `T` reached from row `id` through join rows of `J`.
    ///
    /// `from` is the join column pointing at this entity, `to` the one
    /// pointing at `T`. Each target row appears once, in id order before
    /// query options are applied.
    #[instrument(skip(self, params), fields(kind = %E::KIND, via = %J::KIND, related = %T::KIND))]
    pub async fn linked<J, T>(
        &self,
        id: i32,
        from: Column,
        to: Column,
        params: &HashMap<String, String>,
    ) -> Result<Vec<T>, ServiceError>
    where
        J: Entity,
        T: Entity + QueryFields,
    {
        let options = QueryOptions::from_params(params, T::DATE_PARAM)?
            .with_default_page_size(self.default_page_size);
        self.store
            .read(|tables| {
                self.ensure_live(tables, id)?;
                let targets: BTreeSet<i32> = tables
                    .referencing::<J>(from, id)
                    .filter_map(|join| join.foreign_key(to))
                    .collect();
                let table = T::table(tables);
                let rows = targets.into_iter().filter_map(|target| table.get(target));
                Ok(resolve(rows, &options))
            })
            .await
    }

    /// Live row count
    pub async fn count(&self) -> i32 {
        self.store.read(|tables| E::table(tables).count()).await
    }

    fn ensure_live(&self, tables: &Tables, id: i32) -> Result<(), ServiceError> {
        if E::table(tables).contains(id) {
            Ok(())
        } else {
            Err(ServiceError::not_found(E::KIND, id))
        }
    }
}
