use std::collections::HashSet;

use sea_orm::{DatabaseTransaction, DbErr, EntityTrait, IntoActiveModel, TransactionTrait};
use tracing::{debug, warn};

use crate::{
    entities::{NaturalKey, country},
    store,
};

/// Trims keys, drops empty ones and collapses repeats, keeping first-seen order.
pub fn normalize_keys<S: AsRef<str>>(raw: &[S]) -> Vec<String> {
    let mut seen = HashSet::new();
    raw.iter()
        .map(|k| k.as_ref().trim())
        .filter(|k| !k.is_empty())
        .filter(|k| seen.insert(k.to_string()))
        .map(str::to_string)
        .collect()
}

/// Looks `key` up and inserts it when missing. The insert runs under a
/// savepoint; if a concurrent writer got there first the unique index
/// rejects it and the existing row is read back once.
pub async fn resolve_one<T: NaturalKey>(
    txn: &DatabaseTransaction,
    key: &str,
) -> Result<T::Model, DbErr>
where
    T::Model: IntoActiveModel<T::ActiveModel>,
{
    if let Some(found) = store::find_by_key::<T, _>(txn, key).await? {
        return Ok(found);
    }

    let savepoint = txn.begin().await?;
    let inserted = T::insert(T::with_key(key)).exec_with_returning(&savepoint).await;
    match inserted {
        Ok(created) => {
            savepoint.commit().await?;
            debug!(kind = T::KIND, key = %key, "created tag");
            Ok(created)
        },
        Err(err) if store::is_unique_violation(&err) => {
            savepoint.rollback().await?;
            warn!(kind = T::KIND, key = %key, "lost insert race, re-reading existing row");
            store::find_by_key::<T, _>(txn, key).await?.ok_or(err)
        },
        Err(err) => Err(err),
    }
}

/// Resolves every key in `raw`, in input order, without duplicates.
pub async fn resolve_all<T: NaturalKey>(
    txn: &DatabaseTransaction,
    raw: &[String],
) -> Result<Vec<T::Model>, DbErr>
where
    T::Model: IntoActiveModel<T::ActiveModel>,
{
    let mut out = Vec::new();
    for key in normalize_keys(raw) {
        out.push(resolve_one::<T>(txn, &key).await?);
    }
    Ok(out)
}

pub async fn resolve_country(
    txn: &DatabaseTransaction,
    code: Option<&str>,
) -> Result<Option<country::Model>, DbErr> {
    match code.map(str::trim).filter(|c| !c.is_empty()) {
        Some(code) => resolve_one::<country::Entity>(txn, code).await.map(Some),
        None => Ok(None),
    }
}

pub fn ids<T: NaturalKey>(models: &[<T as EntityTrait>::Model]) -> Vec<i32> {
    models.iter().map(T::id).collect()
}
