//! Catalog repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide bulk reads of resources/categories/languages for one import run.
//! - Provide name-keyed upserts for lookup entities.
//! - Persist one resource (row + language links) per transaction.
//!
//! # Invariants
//! - `insert_resource` / `update_resource` commit or roll back as a unit.
//! - `update_resource` never writes counter columns.
//! - Language links are stored with their input position and read back in
//!   that order.

use crate::db::DbError;
use crate::model::resource::{Category, Language, Resource, ResourceId};
use rusqlite::{params, Connection, Row, Transaction, TransactionBehavior};
use std::collections::HashMap;
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

const RESOURCE_SELECT_SQL: &str = "SELECT
    r.uuid,
    r.name,
    r.url,
    r.paid,
    r.notes,
    r.upvotes,
    r.downvotes,
    r.times_clicked,
    c.id AS category_id,
    c.name AS category_name
FROM resources r
INNER JOIN categories c ON c.id = r.category_id";

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for catalog persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    Db(DbError),
    NotFound(ResourceId),
    InvalidData(String),
    MissingRequiredTable(&'static str),
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "resource not found: {id}"),
            Self::InvalidData(message) => write!(f, "invalid persisted catalog data: {message}"),
            Self::MissingRequiredTable(table) => write!(f, "missing required table `{table}`"),
            Self::MissingRequiredColumn { table, column } => {
                write!(f, "missing required column `{table}.{column}`")
            }
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Storage collaborator consumed by the importer.
pub trait CatalogRepository {
    /// Loads every persisted resource with its category and languages.
    fn list_resources(&self) -> RepoResult<Vec<Resource>>;
    /// Loads every persisted category.
    fn list_categories(&self) -> RepoResult<Vec<Category>>;
    /// Loads every persisted language.
    fn list_languages(&self) -> RepoResult<Vec<Language>>;
    /// Returns the category named `name`, creating it when absent.
    fn ensure_category(&mut self, name: &str) -> RepoResult<Category>;
    /// Returns the language named `name`, creating it when absent.
    fn ensure_language(&mut self, name: &str) -> RepoResult<Language>;
    /// Persists a new resource and its language links in one transaction.
    fn insert_resource(&mut self, resource: &Resource) -> RepoResult<ResourceId>;
    /// Overwrites mutable fields and language links in one transaction.
    fn update_resource(&mut self, resource: &Resource) -> RepoResult<()>;
    /// Gets one resource by its url.
    fn get_resource_by_url(&self, url: &str) -> RepoResult<Option<Resource>>;
}

/// SQLite-backed catalog repository.
pub struct SqliteCatalogRepository<'conn> {
    conn: &'conn mut Connection,
}

impl<'conn> SqliteCatalogRepository<'conn> {
    /// Constructs a repository from a migrated/ready connection.
    ///
    /// # Errors
    /// - Returns `MissingRequiredTable` / `MissingRequiredColumn` when the
    ///   connection was not bootstrapped through `db::open_db*`.
    pub fn try_new(conn: &'conn mut Connection) -> RepoResult<Self> {
        ensure_catalog_connection_ready(conn)?;
        Ok(Self { conn })
    }
}

impl CatalogRepository for SqliteCatalogRepository<'_> {
    fn list_resources(&self) -> RepoResult<Vec<Resource>> {
        let mut links = load_all_language_links(self.conn)?;
        let mut stmt = self
            .conn
            .prepare(&format!("{RESOURCE_SELECT_SQL} ORDER BY r.url ASC;"))?;
        let mut rows = stmt.query([])?;
        let mut resources = Vec::new();
        while let Some(row) = rows.next()? {
            let uuid_text: String = row.get("uuid")?;
            let languages = links.remove(&uuid_text).unwrap_or_default();
            resources.push(parse_resource_row(row, languages)?);
        }
        Ok(resources)
    }

    fn list_categories(&self) -> RepoResult<Vec<Category>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, name FROM categories ORDER BY name ASC;")?;
        let categories = stmt
            .query_map([], |row| {
                Ok(Category {
                    id: row.get(0)?,
                    name: row.get(1)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(categories)
    }

    fn list_languages(&self) -> RepoResult<Vec<Language>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, name FROM languages ORDER BY name ASC;")?;
        let languages = stmt
            .query_map([], |row| {
                Ok(Language {
                    id: row.get(0)?,
                    name: row.get(1)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(languages)
    }

    fn ensure_category(&mut self, name: &str) -> RepoResult<Category> {
        self.conn.execute(
            "INSERT OR IGNORE INTO categories (name) VALUES (?1);",
            [name],
        )?;
        let id = self.conn.query_row(
            "SELECT id FROM categories WHERE name = ?1;",
            [name],
            |row| row.get(0),
        )?;
        Ok(Category {
            id,
            name: name.to_string(),
        })
    }

    fn ensure_language(&mut self, name: &str) -> RepoResult<Language> {
        self.conn.execute(
            "INSERT OR IGNORE INTO languages (name) VALUES (?1);",
            [name],
        )?;
        let id = self.conn.query_row(
            "SELECT id FROM languages WHERE name = ?1;",
            [name],
            |row| row.get(0),
        )?;
        Ok(Language {
            id,
            name: name.to_string(),
        })
    }

    fn insert_resource(&mut self, resource: &Resource) -> RepoResult<ResourceId> {
        let uuid_text = resource.uuid.to_string();
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;

        tx.execute(
            "INSERT INTO resources (
                uuid,
                name,
                url,
                category_id,
                paid,
                notes,
                upvotes,
                downvotes,
                times_clicked
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9);",
            params![
                uuid_text.as_str(),
                resource.name.as_str(),
                resource.url.as_str(),
                resource.category.id,
                resource.paid.map(bool_to_int),
                resource.notes.as_str(),
                resource.upvotes,
                resource.downvotes,
                resource.times_clicked,
            ],
        )?;
        write_language_links(&tx, uuid_text.as_str(), &resource.languages)?;

        // Dropping `tx` on any early return above rolls the insert back.
        tx.commit()?;
        Ok(resource.uuid)
    }

    fn update_resource(&mut self, resource: &Resource) -> RepoResult<()> {
        let uuid_text = resource.uuid.to_string();
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;

        let changed = tx.execute(
            "UPDATE resources
             SET
                name = ?1,
                url = ?2,
                category_id = ?3,
                paid = ?4,
                notes = ?5,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE uuid = ?6;",
            params![
                resource.name.as_str(),
                resource.url.as_str(),
                resource.category.id,
                resource.paid.map(bool_to_int),
                resource.notes.as_str(),
                uuid_text.as_str(),
            ],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound(resource.uuid));
        }

        tx.execute(
            "DELETE FROM resource_languages WHERE resource_uuid = ?1;",
            [uuid_text.as_str()],
        )?;
        write_language_links(&tx, uuid_text.as_str(), &resource.languages)?;

        tx.commit()?;
        Ok(())
    }

    fn get_resource_by_url(&self, url: &str) -> RepoResult<Option<Resource>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{RESOURCE_SELECT_SQL} WHERE r.url = ?1;"))?;
        let mut rows = stmt.query([url])?;
        let Some(row) = rows.next()? else {
            return Ok(None);
        };

        let uuid_text: String = row.get("uuid")?;
        let languages = load_language_links(self.conn, uuid_text.as_str())?;
        Ok(Some(parse_resource_row(row, languages)?))
    }
}

fn write_language_links(
    tx: &Transaction<'_>,
    resource_uuid: &str,
    languages: &[Language],
) -> RepoResult<()> {
    for (position, language) in languages.iter().enumerate() {
        tx.execute(
            "INSERT INTO resource_languages (resource_uuid, language_id, position)
             VALUES (?1, ?2, ?3);",
            params![resource_uuid, language.id, link_position(position)?],
        )?;
    }
    Ok(())
}

fn link_position(position: usize) -> RepoResult<i64> {
    i64::try_from(position).map_err(|_| {
        RepoError::InvalidData(format!(
            "language position {position} does not fit resource_languages.position"
        ))
    })
}

fn load_all_language_links(conn: &Connection) -> RepoResult<HashMap<String, Vec<Language>>> {
    let mut stmt = conn.prepare(
        "SELECT rl.resource_uuid, l.id, l.name
         FROM resource_languages rl
         INNER JOIN languages l ON l.id = rl.language_id
         ORDER BY rl.resource_uuid ASC, rl.position ASC;",
    )?;
    let mut rows = stmt.query([])?;
    let mut links: HashMap<String, Vec<Language>> = HashMap::new();
    while let Some(row) = rows.next()? {
        let resource_uuid: String = row.get(0)?;
        links.entry(resource_uuid).or_default().push(Language {
            id: row.get(1)?,
            name: row.get(2)?,
        });
    }
    Ok(links)
}

fn load_language_links(conn: &Connection, resource_uuid: &str) -> RepoResult<Vec<Language>> {
    let mut stmt = conn.prepare(
        "SELECT l.id, l.name
         FROM resource_languages rl
         INNER JOIN languages l ON l.id = rl.language_id
         WHERE rl.resource_uuid = ?1
         ORDER BY rl.position ASC;",
    )?;
    let languages = stmt
        .query_map([resource_uuid], |row| {
            Ok(Language {
                id: row.get(0)?,
                name: row.get(1)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(languages)
}

fn parse_resource_row(row: &Row<'_>, languages: Vec<Language>) -> RepoResult<Resource> {
    let uuid_text: String = row.get("uuid")?;
    let uuid = Uuid::parse_str(&uuid_text).map_err(|_| {
        RepoError::InvalidData(format!("invalid uuid value `{uuid_text}` in resources.uuid"))
    })?;

    let paid = match row.get::<_, Option<i64>>("paid")? {
        None => None,
        Some(0) => Some(false),
        Some(1) => Some(true),
        Some(other) => {
            return Err(RepoError::InvalidData(format!(
                "invalid paid value `{other}` in resources.paid"
            )));
        }
    };

    Ok(Resource {
        uuid,
        name: row.get("name")?,
        url: row.get("url")?,
        category: Category {
            id: row.get("category_id")?,
            name: row.get("category_name")?,
        },
        languages,
        paid,
        notes: row.get("notes")?,
        upvotes: row.get("upvotes")?,
        downvotes: row.get("downvotes")?,
        times_clicked: row.get("times_clicked")?,
    })
}

fn ensure_catalog_connection_ready(conn: &Connection) -> RepoResult<()> {
    for table in ["categories", "languages", "resources", "resource_languages"] {
        if !table_exists(conn, table)? {
            return Err(RepoError::MissingRequiredTable(table));
        }
    }

    for column in ["uuid", "url", "category_id", "paid", "notes", "times_clicked"] {
        if !table_has_column(conn, "resources", column)? {
            return Err(RepoError::MissingRequiredColumn {
                table: "resources",
                column,
            });
        }
    }

    if !table_has_column(conn, "resource_languages", "position")? {
        return Err(RepoError::MissingRequiredColumn {
            table: "resource_languages",
            column: "position",
        });
    }

    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn table_has_column(conn: &Connection, table: &str, column: &str) -> RepoResult<bool> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table});"))?;
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let current: String = row.get(1)?;
        if current == column {
            return Ok(true);
        }
    }
    Ok(false)
}

fn bool_to_int(value: bool) -> i64 {
    if value {
        1
    } else {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::{link_position, RepoError};

    #[test]
    fn link_position_accepts_in_range_values() {
        assert_eq!(link_position(0).unwrap(), 0);
        assert_eq!(link_position(41).unwrap(), 41);
    }

    #[test]
    fn link_position_rejects_values_beyond_i64() {
        if usize::BITS < 64 {
            return;
        }
        let err = link_position(usize::MAX).unwrap_err();
        assert!(matches!(err, RepoError::InvalidData(_)));
    }
}
