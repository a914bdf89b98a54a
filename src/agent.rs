use crate::db::Database;
use crate::error::Result;
use crate::value::{ColumnInfo, Table, Value};
use std::collections::BTreeMap;
use std::path::Path;

/// Fixed catalog of domain lookups over the listing tables.
///
/// Wraps a [`Database`] by composition; every method is a thin
/// specialization of the generic executor with a fixed SQL template and
/// 0 to 2 bind parameters. Key values are always bound, never
/// interpolated. A key that matches no rows yields an empty table, not an
/// error, and no method enforces uniqueness of presumed-unique keys.
///
/// Column names in the templates reproduce the stored casing exactly,
/// which mixes camelCase and snake_case across tables.
pub struct QueryAgent {
    db: Database,
}

impl QueryAgent {
    /// Open the database at the given path
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let db = Database::open(path)?;
        Ok(QueryAgent { db })
    }

    /// Open an in-memory database for testing
    pub fn open_in_memory() -> Result<Self> {
        let db = Database::open_in_memory()?;
        Ok(QueryAgent { db })
    }

    /// Wrap an already-open database handle
    pub fn new(db: Database) -> Self {
        QueryAgent { db }
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    /// Release the underlying session
    pub fn close(&mut self) -> Result<()> {
        self.db.close()
    }

    // ==================== Generic Surface ====================

    pub fn execute(&self, sql: &str) -> Result<Table> {
        self.db.execute(sql)
    }

    pub fn execute_with(&self, sql: &str, params: &[Value]) -> Result<Table> {
        self.db.execute_with(sql, params)
    }

    pub fn list_tables(&self) -> Result<Vec<String>> {
        self.db.list_tables()
    }

    pub fn table_schema(&self, table: &str) -> Result<Vec<ColumnInfo>> {
        self.db.table_schema(table)
    }

    pub fn database_schema(&self) -> Result<BTreeMap<String, Vec<ColumnInfo>>> {
        self.db.database_schema()
    }

    // ==================== Properties ====================

    pub fn get_all_properties(&self) -> Result<Table> {
        self.db.execute("SELECT * FROM properties")
    }

    pub fn get_property_by_property_id(&self, property_id: &str) -> Result<Table> {
        self.db.execute_with(
            "SELECT * FROM properties WHERE property_id = ?1",
            &[Value::from(property_id)],
        )
    }

    pub fn get_property_features_by_property_id(&self, property_id: &str) -> Result<Table> {
        self.db.execute_with(
            "SELECT * FROM property_features WHERE property_id = ?1",
            &[Value::from(property_id)],
        )
    }

    pub fn get_owners_by_property_id(&self, property_id: &str) -> Result<Table> {
        self.db.execute_with(
            "SELECT * FROM property_owners WHERE property_id = ?1",
            &[Value::from(property_id)],
        )
    }

    pub fn get_properties_by_owner_id(&self, owner_id: &str) -> Result<Table> {
        self.db.execute_with(
            "SELECT * FROM property_owners WHERE owner_id = ?1",
            &[Value::from(owner_id)],
        )
    }

    // ==================== Counties ====================

    pub fn get_county_by_id(&self, id: &str) -> Result<Table> {
        self.db.execute_with(
            "SELECT * FROM counties WHERE id = ?1",
            &[Value::from(id)],
        )
    }

    pub fn get_all_counties(&self) -> Result<Table> {
        self.db.execute("SELECT * FROM counties")
    }

    // ==================== Market Statistics ====================

    pub fn get_market_stats_by_zip(&self, zip_code: i64) -> Result<Table> {
        self.db.execute_with(
            "SELECT * FROM market_stats WHERE zipCode = ?1",
            &[Value::from(zip_code)],
        )
    }

    pub fn get_market_stats_by_bedrooms(&self, bedrooms: i64) -> Result<Table> {
        self.db.execute_with(
            "SELECT * FROM market_stats WHERE bedrooms = ?1",
            &[Value::from(bedrooms)],
        )
    }

    pub fn get_historic_market_stats_by_zip(&self, zip_code: i64) -> Result<Table> {
        self.db.execute_with(
            "SELECT * FROM historic_market_stats WHERE zipCode = ?1",
            &[Value::from(zip_code)],
        )
    }

    pub fn get_historic_market_stats_by_bedrooms(
        &self,
        bedrooms: i64,
        zip_code: i64,
    ) -> Result<Table> {
        self.db.execute_with(
            "SELECT * FROM historic_market_stats WHERE bedrooms = ?1 AND zipCode = ?2",
            &[Value::from(bedrooms), Value::from(zip_code)],
        )
    }

    // ==================== Rentals and Sales ====================

    pub fn get_long_term_rentals_by_property_id(&self, property_id: &str) -> Result<Table> {
        self.db.execute_with(
            "SELECT * FROM long_term_rentals WHERE property_id = ?1",
            &[Value::from(property_id)],
        )
    }

    pub fn get_all_long_term_rentals(&self) -> Result<Table> {
        self.db.execute("SELECT * FROM long_term_rentals")
    }

    pub fn get_sale_listings_by_property_id(&self, property_id: &str) -> Result<Table> {
        self.db.execute_with(
            "SELECT * FROM sale_listings WHERE property_id = ?1",
            &[Value::from(property_id)],
        )
    }

    pub fn get_all_sale_listings(&self) -> Result<Table> {
        self.db.execute("SELECT * FROM sale_listings")
    }

    // ==================== Taxes and Assessments ====================

    pub fn get_property_taxes_by_property_id(&self, property_id: &str) -> Result<Table> {
        self.db.execute_with(
            "SELECT * FROM property_taxes WHERE property_id = ?1",
            &[Value::from(property_id)],
        )
    }

    pub fn get_property_taxes_by_year(&self, year: &str) -> Result<Table> {
        self.db.execute_with(
            "SELECT * FROM property_taxes WHERE year = ?1",
            &[Value::from(year)],
        )
    }

    pub fn get_property_taxes_by_property_id_and_year(
        &self,
        property_id: &str,
        year: &str,
    ) -> Result<Table> {
        self.db.execute_with(
            "SELECT * FROM property_taxes WHERE property_id = ?1 AND year = ?2",
            &[Value::from(property_id), Value::from(year)],
        )
    }

    pub fn get_tax_assessments_by_property_id(&self, property_id: &str) -> Result<Table> {
        self.db.execute_with(
            "SELECT * FROM tax_assessments WHERE property_id = ?1",
            &[Value::from(property_id)],
        )
    }

    pub fn get_tax_assessment_by_id(&self, assessment_id: &str) -> Result<Table> {
        self.db.execute_with(
            "SELECT * FROM tax_assessments WHERE assessment_id = ?1",
            &[Value::from(assessment_id)],
        )
    }

    pub fn get_tax_assessment_by_property_id_and_year(
        &self,
        property_id: &str,
        year: &str,
    ) -> Result<Table> {
        self.db.execute_with(
            "SELECT * FROM tax_assessments WHERE property_id = ?1 AND year = ?2",
            &[Value::from(property_id), Value::from(year)],
        )
    }

    // ==================== Property Types ====================

    pub fn get_property_type_by_id(&self, id: &str) -> Result<Table> {
        self.db.execute_with(
            "SELECT * FROM property_types WHERE id = ?1",
            &[Value::from(id)],
        )
    }

    pub fn get_all_property_types(&self) -> Result<Table> {
        self.db.execute("SELECT * FROM property_types")
    }

    pub fn get_description_by_property_type(&self, property_type: &str) -> Result<Table> {
        self.db.execute_with(
            "SELECT description FROM property_types WHERE propertyType = ?1",
            &[Value::from(property_type)],
        )
    }
}
