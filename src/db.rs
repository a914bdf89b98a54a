use crate::error::{RentRadarError, Result};
use crate::value::{ColumnInfo, Table, Value};
use rusqlite::{params_from_iter, Connection};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use tracing::{error, info};

/// Handle over one embedded database session bound to a file path.
///
/// The session opens eagerly on construction and is released either by an
/// explicit `close` or when the handle is dropped, so scope exit always
/// runs the release exactly once. Every operation on a closed handle
/// fails; `close` on a closed handle is a no-op.
pub struct Database {
    path: PathBuf,
    conn: Option<Connection>,
}

impl Database {
    /// Open a read-write session at the given path, creating the backing
    /// file if it does not exist.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let conn = Connection::open(&path).map_err(|source| {
            error!(path = %path.display(), %source, "failed to open database");
            RentRadarError::Connection {
                path: path.display().to_string(),
                source,
            }
        })?;
        info!(path = %path.display(), "opened database");
        Ok(Database {
            path,
            conn: Some(conn),
        })
    }

    /// Open an in-memory database for testing
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(|source| RentRadarError::Connection {
            path: ":memory:".to_string(),
            source,
        })?;
        Ok(Database {
            path: PathBuf::from(":memory:"),
            conn: Some(conn),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether the underlying session is still open
    pub fn is_live(&self) -> bool {
        self.conn.is_some()
    }

    /// Release the session. Idempotent: closing an already-closed handle
    /// is a no-op. A failed engine-side close keeps the handle live.
    pub fn close(&mut self) -> Result<()> {
        let Some(conn) = self.conn.take() else {
            return Ok(());
        };
        match conn.close() {
            Ok(()) => {
                info!(path = %self.path.display(), "closed database");
                Ok(())
            }
            Err((conn, source)) => {
                self.conn = Some(conn);
                error!(path = %self.path.display(), %source, "failed to close database");
                Err(RentRadarError::Connection {
                    path: self.path.display().to_string(),
                    source,
                })
            }
        }
    }

    fn conn(&self) -> Result<&Connection> {
        self.conn
            .as_ref()
            .ok_or_else(|| RentRadarError::Closed(self.path.display().to_string()))
    }

    // ==================== Query Execution ====================

    /// Execute a SQL statement with no bind parameters
    pub fn execute(&self, sql: &str) -> Result<Table> {
        self.execute_with(sql, &[])
    }

    /// Execute a SQL statement, binding `params` positionally to its `?n`
    /// placeholders, and materialize the full result eagerly.
    ///
    /// This is the single query logging site: the literal SQL text logs at
    /// info level, and any failure logs the SQL and the engine diagnostic
    /// at error level before propagating.
    pub fn execute_with(&self, sql: &str, params: &[Value]) -> Result<Table> {
        let conn = self.conn()?;
        info!(sql = %sql, "executing query");
        run_statement(conn, sql, params).map_err(|source| {
            error!(sql = %sql, %source, "query failed");
            RentRadarError::Query {
                sql: sql.to_string(),
                source,
            }
        })
    }

    // ==================== Schema Introspection ====================

    /// Names of all user tables, in the order the engine catalog reports
    /// them
    pub fn list_tables(&self) -> Result<Vec<String>> {
        let result = self.execute(
            "SELECT name FROM sqlite_master WHERE type = 'table' AND name NOT LIKE 'sqlite_%'",
        )?;
        Ok(result
            .rows()
            .iter()
            .filter_map(|row| match row.first() {
                Some(Value::Text(name)) => Some(name.clone()),
                _ => None,
            })
            .collect())
    }

    /// Column names and declared types for one table, in declared order.
    /// The table name is bound as a parameter to the table-valued pragma,
    /// never interpolated.
    pub fn table_schema(&self, table: &str) -> Result<Vec<ColumnInfo>> {
        let result = self.execute_with(
            "SELECT name, type FROM pragma_table_info(?1)",
            &[Value::from(table)],
        )?;
        // The engine cannot hold a zero-column table, so no columns means
        // no table.
        if result.is_empty() {
            return Err(RentRadarError::UnknownTable(table.to_string()));
        }
        Ok(result
            .rows()
            .iter()
            .map(|row| ColumnInfo {
                name: row[0].to_string(),
                column_type: row[1].to_string(),
            })
            .collect())
    }

    /// Per-table schema for every table in the catalog. Fails whole if any
    /// per-table introspection fails; an empty database yields an empty
    /// mapping.
    pub fn database_schema(&self) -> Result<BTreeMap<String, Vec<ColumnInfo>>> {
        let mut schema = BTreeMap::new();
        for table in self.list_tables()? {
            let columns = self.table_schema(&table)?;
            schema.insert(table, columns);
        }
        Ok(schema)
    }

    // ==================== Bulk Load ====================

    /// Load a tabular batch into `table` with replace-if-exists semantics,
    /// returning the number of rows loaded.
    ///
    /// The target table name is the one place an identifier is
    /// interpolated (DDL cannot bind identifiers); it is quote-escaped.
    /// Row values are always bound.
    pub fn load_table(&self, table: &str, batch: &Table) -> Result<usize> {
        if batch.columns().is_empty() {
            return Err(RentRadarError::EmptyBatch(table.to_string()));
        }
        info!(table, rows = batch.len(), "loading table");

        let ident = quote_identifier(table);
        self.execute(&format!("DROP TABLE IF EXISTS {ident}"))?;

        let column_defs: Vec<String> = batch
            .columns()
            .iter()
            .enumerate()
            .map(|(index, name)| {
                format!(
                    "{} {}",
                    quote_identifier(name),
                    infer_column_type(batch, index)
                )
            })
            .collect();
        self.execute(&format!(
            "CREATE TABLE {ident} ({})",
            column_defs.join(", ")
        ))?;

        let column_list: Vec<String> = batch
            .columns()
            .iter()
            .map(|name| quote_identifier(name))
            .collect();
        let placeholders: Vec<String> = (1..=batch.columns().len())
            .map(|index| format!("?{index}"))
            .collect();
        let insert = format!(
            "INSERT INTO {ident} ({}) VALUES ({})",
            column_list.join(", "),
            placeholders.join(", ")
        );
        for row in batch.rows() {
            self.execute_with(&insert, row)?;
        }
        Ok(batch.len())
    }

    /// Load a CSV or JSON file into `table`, replacing any existing table
    /// of that name. The format is taken from `format` when given,
    /// otherwise from the file extension; anything else fails with
    /// `UnsupportedFormat`.
    pub fn load_file(&self, path: &Path, table: &str, format: Option<&str>) -> Result<usize> {
        let format = match format {
            Some(f) => f.to_ascii_lowercase(),
            None => path
                .extension()
                .and_then(|ext| ext.to_str())
                .unwrap_or_default()
                .to_ascii_lowercase(),
        };
        let batch = match format.as_str() {
            "csv" => read_csv_file(path)?,
            "json" => read_json_file(path)?,
            _ => return Err(RentRadarError::UnsupportedFormat(format)),
        };
        self.load_table(table, &batch)
    }
}

impl Drop for Database {
    fn drop(&mut self) {
        if self.conn.is_some() {
            let _ = self.close();
        }
    }
}

fn run_statement(conn: &Connection, sql: &str, params: &[Value]) -> rusqlite::Result<Table> {
    let mut stmt = conn.prepare(sql)?;
    let columns: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();
    let mut rows = stmt.query(params_from_iter(params.iter()))?;
    let mut out = Vec::new();
    while let Some(row) = rows.next()? {
        let mut record = Vec::with_capacity(columns.len());
        for index in 0..columns.len() {
            record.push(Value::from(row.get_ref(index)?));
        }
        out.push(record);
    }
    Ok(Table::new(columns, out))
}

fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Declared type for a batch column, from its first non-missing value
fn infer_column_type(batch: &Table, index: usize) -> &'static str {
    for row in batch.rows() {
        match &row[index] {
            Value::Null | Value::Absent => continue,
            Value::Integer(_) | Value::Boolean(_) => return "INTEGER",
            Value::Float(_) => return "REAL",
            _ => return "TEXT",
        }
    }
    "TEXT"
}

fn read_json_file(path: &Path) -> Result<Table> {
    let file = File::open(path)?;
    let body: serde_json::Value = serde_json::from_reader(BufReader::new(file))?;
    let records = match body {
        serde_json::Value::Array(records) => records,
        other => vec![other],
    };
    Ok(Table::from_records(&records))
}

fn read_csv_file(path: &Path) -> Result<Table> {
    let content = std::fs::read_to_string(path)?;
    let mut records = parse_csv(&content);
    if records.is_empty() {
        return Ok(Table::new(Vec::new(), Vec::new()));
    }
    let columns = records.remove(0);
    let rows = records
        .into_iter()
        .map(|fields| {
            (0..columns.len())
                .map(|index| fields.get(index).map(|f| csv_value(f)).unwrap_or(Value::Null))
                .collect()
        })
        .collect();
    Ok(Table::new(columns, rows))
}

/// Minimal CSV reader: comma-separated, double-quoted fields with doubled
/// quotes for embedded quotes, newlines allowed inside quoted fields.
fn parse_csv(content: &str) -> Vec<Vec<String>> {
    let mut records = Vec::new();
    let mut record: Vec<String> = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut pending = false;
    let mut chars = content.chars().peekable();

    while let Some(c) = chars.next() {
        if in_quotes {
            if c == '"' {
                if chars.peek() == Some(&'"') {
                    chars.next();
                    field.push('"');
                } else {
                    in_quotes = false;
                }
            } else {
                field.push(c);
            }
            continue;
        }
        match c {
            '"' => {
                in_quotes = true;
                pending = true;
            }
            ',' => {
                record.push(std::mem::take(&mut field));
                pending = true;
            }
            '\r' => {}
            '\n' => {
                if pending || !field.is_empty() || !record.is_empty() {
                    record.push(std::mem::take(&mut field));
                    records.push(std::mem::take(&mut record));
                    pending = false;
                }
            }
            _ => {
                field.push(c);
                pending = true;
            }
        }
    }
    if pending || !field.is_empty() || !record.is_empty() {
        record.push(field);
        records.push(record);
    }
    records
}

fn csv_value(field: &str) -> Value {
    if field.is_empty() {
        return Value::Null;
    }
    if let Ok(i) = field.parse::<i64>() {
        return Value::Integer(i);
    }
    if let Ok(f) = field.parse::<f64>() {
        return Value::Float(f);
    }
    match field {
        "true" => Value::Boolean(true),
        "false" => Value::Boolean(false),
        _ => Value::Text(field.to_string()),
    }
}
