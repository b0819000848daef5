//! SQLite-backed person store
//!
//! Deletes are soft: `deleted_at` is set and every query excludes those rows.

use async_trait::async_trait;
use chrono::Utc;
use rollcall_common::db::{fold_case, Enrichment, Person, PersonInput};
use rollcall_common::Result;
use sqlx::{QueryBuilder, Sqlite, SqlitePool};

use super::{PersonFilter, PersonPage, PersonStore};
use crate::pagination::Pagination;

const PERSON_COLUMNS: &str =
    "id, created_at, updated_at, deleted_at, name, surname, patronymic, age, gender, country";

#[derive(Clone)]
pub struct SqlitePersonStore {
    pool: SqlitePool,
}

impl SqlitePersonStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

/// Case-folded substring pattern with LIKE wildcards escaped
fn like_pattern(value: &str) -> String {
    let escaped = fold_case(value)
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}

fn push_filters(builder: &mut QueryBuilder<'_, Sqlite>, filter: &PersonFilter) {
    builder.push(" WHERE deleted_at IS NULL");

    if let Some(name) = &filter.name {
        builder
            .push(" AND name_folded LIKE ")
            .push_bind(like_pattern(name))
            .push(" ESCAPE '\\'");
    }

    if let Some(surname) = &filter.surname {
        builder
            .push(" AND surname_folded LIKE ")
            .push_bind(like_pattern(surname))
            .push(" ESCAPE '\\'");
    }

    if let Some(gender) = &filter.gender {
        builder.push(" AND gender = ").push_bind(gender.clone());
    }

    if let Some(country) = &filter.country {
        builder.push(" AND country = ").push_bind(country.clone());
    }
}

#[async_trait]
impl PersonStore for SqlitePersonStore {
    async fn create(&self, input: &PersonInput, enrichment: &Enrichment) -> Result<Person> {
        let now = Utc::now();
        let sql = format!(
            "INSERT INTO people (created_at, updated_at, name, surname, name_folded,
                                 surname_folded, patronymic, age, gender, country)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
             RETURNING {}",
            PERSON_COLUMNS
        );

        let person = sqlx::query_as::<_, Person>(&sql)
            .bind(now)
            .bind(now)
            .bind(&input.name)
            .bind(&input.surname)
            .bind(fold_case(&input.name))
            .bind(fold_case(&input.surname))
            .bind(&input.patronymic)
            .bind(enrichment.age)
            .bind(&enrichment.gender)
            .bind(&enrichment.country)
            .fetch_one(&self.pool)
            .await?;

        Ok(person)
    }

    async fn get(&self, id: i64) -> Result<Option<Person>> {
        let sql = format!(
            "SELECT {} FROM people WHERE id = ? AND deleted_at IS NULL",
            PERSON_COLUMNS
        );

        let person = sqlx::query_as::<_, Person>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(person)
    }

    async fn update(
        &self,
        id: i64,
        input: &PersonInput,
        enrichment: &Enrichment,
    ) -> Result<Option<Person>> {
        let sql = format!(
            "UPDATE people
             SET name = ?, surname = ?, name_folded = ?, surname_folded = ?, patronymic = ?,
                 age = ?, gender = ?, country = ?, updated_at = ?
             WHERE id = ? AND deleted_at IS NULL
             RETURNING {}",
            PERSON_COLUMNS
        );

        let person = sqlx::query_as::<_, Person>(&sql)
            .bind(&input.name)
            .bind(&input.surname)
            .bind(fold_case(&input.name))
            .bind(fold_case(&input.surname))
            .bind(&input.patronymic)
            .bind(enrichment.age)
            .bind(&enrichment.gender)
            .bind(&enrichment.country)
            .bind(Utc::now())
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(person)
    }

    async fn delete(&self, id: i64) -> Result<bool> {
        let now = Utc::now();
        let result = sqlx::query(
            "UPDATE people SET deleted_at = ?, updated_at = ? WHERE id = ? AND deleted_at IS NULL",
        )
        .bind(now)
        .bind(now)
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn list(&self, filter: &PersonFilter, pagination: Pagination) -> Result<PersonPage> {
        let mut count_query = QueryBuilder::<Sqlite>::new("SELECT COUNT(*) FROM people");
        push_filters(&mut count_query, filter);
        let total: i64 = count_query
            .build_query_scalar::<i64>()
            .fetch_one(&self.pool)
            .await?;

        let mut select_query =
            QueryBuilder::<Sqlite>::new(format!("SELECT {} FROM people", PERSON_COLUMNS));
        push_filters(&mut select_query, filter);
        select_query
            .push(" ORDER BY id LIMIT ")
            .push_bind(pagination.limit)
            .push(" OFFSET ")
            .push_bind(pagination.offset);

        let records = select_query
            .build_query_as::<Person>()
            .fetch_all(&self.pool)
            .await?;

        Ok(PersonPage { records, total })
    }
}
