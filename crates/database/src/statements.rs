use crate::error::DbError;
use configuration::is_sql_identifier;

/// Every SQL statement issued against the contacts table.
///
/// The table name is validated and substituted exactly once, here. All values
/// coming from requests are bound as parameters (`$1`, `$2`, ...).
#[derive(Debug, Clone)]
pub struct Statements {
    pub table: String,
    pub create_table: String,
    pub select_all: String,
    pub select_by_id: String,
    pub insert: String,
    pub update: String,
    pub delete: String,
}

impl Statements {
    pub fn for_table(table: &str) -> Result<Self, DbError> {
        if !is_sql_identifier(table) {
            return Err(DbError::InvalidSchema(format!(
                "{table:?} is not a valid table name"
            )));
        }

        let columns = "id, firstName AS first_name, lastName AS last_name, email, phone";

        Ok(Self {
            table: table.to_string(),
            create_table: format!(
                r#"
                CREATE TABLE IF NOT EXISTS {table} (
                    id        BIGSERIAL PRIMARY KEY,
                    firstName TEXT NOT NULL DEFAULT '',
                    lastName  TEXT NOT NULL DEFAULT '',
                    email     TEXT NOT NULL UNIQUE,
                    phone     TEXT NOT NULL DEFAULT ''
                )
                "#
            ),
            select_all: format!("SELECT {columns} FROM {table} ORDER BY id"),
            select_by_id: format!("SELECT {columns} FROM {table} WHERE id = $1"),
            insert: format!(
                "INSERT INTO {table} (firstName, lastName, email, phone) VALUES ($1, $2, $3, $4) RETURNING id"
            ),
            update: format!(
                "UPDATE {table} SET firstName = $1, lastName = $2, email = $3, phone = $4 WHERE id = $5"
            ),
            delete: format!("DELETE FROM {table} WHERE id = $1"),
        })
    }
}
