use sqlx::PgPool;
use tracing::debug;
use uuid::Uuid;

use super::{StoreError, DUPLICATE_KEY_CODE};
use crate::models::category::{Category, NewCategory};

/// Parse a raw path segment into a category id.
///
/// Anything that is not a valid UUID surfaces as a cast failure on the
/// `id` path, which the classifier turns into a 400 in production.
pub fn parse_category_id(raw: &str) -> Result<Uuid, StoreError> {
    Uuid::parse_str(raw).map_err(|_| StoreError::Cast {
        path: "id".to_string(),
        value: raw.to_string(),
    })
}

/// Insert a new category.
///
/// The pre-save hook fires immediately before the row is written. Unique
/// violations are mapped into a duplicate-key error carrying the driver
/// diagnostic with the offending value quoted.
pub async fn insert(pool: &PgPool, new: &NewCategory) -> Result<Category, StoreError> {
    new.validate()?;
    pre_save(new);

    sqlx::query_as::<_, Category>(
        r#"
        INSERT INTO categories (id, name, slug)
        VALUES ($1, $2, $3)
        RETURNING id, name, slug, created_at, updated_at
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(&new.name)
    .bind(&new.slug)
    .fetch_one(pool)
    .await
    .map_err(|err| map_insert_error(err, new))
}

pub async fn list(pool: &PgPool) -> Result<Vec<Category>, StoreError> {
    let categories = sqlx::query_as::<_, Category>(
        "SELECT id, name, slug, created_at, updated_at FROM categories ORDER BY created_at",
    )
    .fetch_all(pool)
    .await?;

    Ok(categories)
}

pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Category>, StoreError> {
    let category = sqlx::query_as::<_, Category>(
        "SELECT id, name, slug, created_at, updated_at FROM categories WHERE id = $1",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(category)
}

/// Diagnostic hook run immediately before a category row is persisted.
fn pre_save(new: &NewCategory) {
    debug!(name = %new.name, slug = %new.slug, "About to save a category to the DB");
}

/// Resolve which unique constraint tripped and rebuild the diagnostic in
/// the driver convention: duplicate-key code plus the offending value in
/// double quotes, so the classifier's extraction always has something to
/// find.
fn map_insert_error(err: sqlx::Error, new: &NewCategory) -> StoreError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.is_unique_violation() {
            let (field, value) = match db_err.constraint() {
                Some("categories_slug_key") => ("slug", new.slug.as_str()),
                _ => ("name", new.name.as_str()),
            };
            return StoreError::DuplicateKey {
                errmsg: duplicate_key_errmsg(field, value),
            };
        }
    }
    StoreError::from(err)
}

fn duplicate_key_errmsg(field: &str, value: &str) -> String {
    format!(
        "E{DUPLICATE_KEY_CODE} duplicate key error index: categories_{field}_key dup key: {{ {field}: \"{value}\" }}"
    )
}
