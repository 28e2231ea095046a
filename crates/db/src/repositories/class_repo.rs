//! Repository for the `classes` table.

use campus_core::types::DbId;
use sqlx::PgPool;

use super::PgTx;
use crate::models::class::{Class, CreateClass};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, name, code, capacity, current_enrollment, created_at, updated_at";

/// Provides CRUD operations and seat-counter maintenance for classes.
pub struct ClassRepo;

impl ClassRepo {
    /// Insert a new class with an empty seat counter.
    pub async fn create(pool: &PgPool, input: &CreateClass) -> Result<Class, sqlx::Error> {
        let query = format!(
            "INSERT INTO classes (name, code, capacity)
             VALUES ($1, $2, $3)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Class>(&query)
            .bind(&input.name)
            .bind(&input.code)
            .bind(input.capacity)
            .fetch_one(pool)
            .await
    }

    /// Find a class by its internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Class>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM classes WHERE id = $1");
        sqlx::query_as::<_, Class>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List classes ordered by name, then id.
    pub async fn list(pool: &PgPool, limit: i64, offset: i64) -> Result<Vec<Class>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM classes ORDER BY name, id LIMIT $1 OFFSET $2");
        sqlx::query_as::<_, Class>(&query)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Lock the given classes for the rest of the transaction.
    ///
    /// Rows are locked in ascending id order so two transfers between the
    /// same pair of classes cannot deadlock.
    pub async fn lock_many(tx: &mut PgTx<'_>, ids: &[DbId]) -> Result<Vec<Class>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM classes WHERE id = ANY($1) ORDER BY id FOR UPDATE"
        );
        sqlx::query_as::<_, Class>(&query)
            .bind(ids)
            .fetch_all(&mut **tx)
            .await
    }

    /// Shift the seat counter by `delta`, flooring the result at zero.
    pub async fn adjust_enrollment(
        tx: &mut PgTx<'_>,
        id: DbId,
        delta: i32,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE classes SET
                current_enrollment = GREATEST(current_enrollment + $2, 0),
                updated_at = NOW()
             WHERE id = $1",
        )
        .bind(id)
        .bind(delta)
        .execute(&mut **tx)
        .await?;
        Ok(())
    }
}
