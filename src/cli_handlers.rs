use crate::agent::QueryAgent;
use crate::db::Database;
use crate::error::{RentRadarError, Result};
use crate::ingest::RentCastClient;
use crate::normalize::normalize;
use crate::value::{Table, Value};
use std::path::Path;

/// Handle the tables command
pub fn handle_tables(db_path: &Path) -> Result<()> {
    let db = Database::open(db_path)?;
    for table in db.list_tables()? {
        println!("{table}");
    }
    Ok(())
}

/// Handle the schema command
pub fn handle_schema(db_path: &Path, table: Option<&str>, json: bool) -> Result<()> {
    let db = Database::open(db_path)?;
    match table {
        Some(name) => {
            let columns = db.table_schema(name)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&columns)?);
            } else {
                for column in columns {
                    println!("{}  {}", column.name, column.column_type);
                }
            }
        }
        None => {
            let schema = db.database_schema()?;
            if json {
                println!("{}", serde_json::to_string_pretty(&schema)?);
            } else {
                for (table, columns) in schema {
                    println!("{table}");
                    for column in columns {
                        println!("  {}  {}", column.name, column.column_type);
                    }
                }
            }
        }
    }
    Ok(())
}

/// Handle the query command
pub fn handle_query(db_path: &Path, sql: &str, params: &[String], json: bool) -> Result<()> {
    let db = Database::open(db_path)?;
    let params: Vec<Value> = params.iter().map(|p| parse_param(p)).collect();
    let result = db.execute_with(sql, &params)?;
    print_result(&result, json)
}

/// Handle the load command
pub fn handle_load(db_path: &Path, file: &Path, table: &str, format: Option<&str>) -> Result<()> {
    let db = Database::open(db_path)?;
    let rows = db.load_file(file, table, format)?;
    println!("Loaded {rows} rows into {table} from {}", file.display());
    Ok(())
}

/// Handle the sync command
pub fn handle_sync(
    db_path: &Path,
    endpoint: &str,
    table: &str,
    api_key: Option<&str>,
    limit: u64,
    query: &[String],
) -> Result<()> {
    let api_key = match api_key {
        Some(key) => key.to_string(),
        None => std::env::var("RENTCAST_API_KEY").map_err(|_| {
            RentRadarError::InvalidArguments(
                "missing API key: pass --api-key or set RENTCAST_API_KEY".to_string(),
            )
        })?,
    };
    let query = parse_query_pairs(query)?;

    let client = RentCastClient::new(api_key)?;
    let records = client.fetch_all(endpoint, &query, limit)?;
    let batch = Table::from_records(&records);

    let db = Database::open(db_path)?;
    let rows = db.load_table(table, &batch)?;
    println!("Synced {rows} rows into {table} from {endpoint}");
    Ok(())
}

/// Handle the property command
pub fn handle_property(db_path: &Path, property_id: &str, json: bool) -> Result<()> {
    let agent = QueryAgent::open(db_path)?;
    let property = agent.get_property_by_property_id(property_id)?;
    if property.is_empty() {
        println!("No property found for id {property_id}");
        return Ok(());
    }
    print_result(&property, json)?;

    // the features table only exists once that endpoint has been synced
    if agent.list_tables()?.iter().any(|t| t == "property_features") {
        let features = agent.get_property_features_by_property_id(property_id)?;
        if !features.is_empty() {
            println!();
            println!("Features:");
            print_result(&features, json)?;
        }
    }
    Ok(())
}

/// Handle the market command
pub fn handle_market(
    db_path: &Path,
    zip: Option<i64>,
    bedrooms: Option<i64>,
    history: bool,
    json: bool,
) -> Result<()> {
    let agent = QueryAgent::open(db_path)?;
    let result = match (history, zip, bedrooms) {
        (false, Some(zip), None) => agent.get_market_stats_by_zip(zip)?,
        (false, None, Some(bedrooms)) => agent.get_market_stats_by_bedrooms(bedrooms)?,
        (true, Some(zip), None) => agent.get_historic_market_stats_by_zip(zip)?,
        (true, Some(zip), Some(bedrooms)) => {
            agent.get_historic_market_stats_by_bedrooms(bedrooms, zip)?
        }
        _ => {
            return Err(RentRadarError::InvalidArguments(
                "market needs --zip or --bedrooms; combine them only with --history".to_string(),
            ))
        }
    };
    print_result(&result, json)
}

/// Handle the taxes command
pub fn handle_taxes(db_path: &Path, property_id: &str, year: Option<&str>, json: bool) -> Result<()> {
    let agent = QueryAgent::open(db_path)?;
    let result = match year {
        Some(year) => agent.get_property_taxes_by_property_id_and_year(property_id, year)?,
        None => agent.get_property_taxes_by_property_id(property_id)?,
    };
    print_result(&result, json)
}

/// Interpret a CLI parameter string as the narrowest scalar it parses to
fn parse_param(raw: &str) -> Value {
    if raw.eq_ignore_ascii_case("null") {
        return Value::Null;
    }
    if let Ok(i) = raw.parse::<i64>() {
        return Value::Integer(i);
    }
    if let Ok(f) = raw.parse::<f64>() {
        return Value::Float(f);
    }
    match raw {
        "true" => Value::Boolean(true),
        "false" => Value::Boolean(false),
        _ => Value::Text(raw.to_string()),
    }
}

fn parse_query_pairs(pairs: &[String]) -> Result<Vec<(String, String)>> {
    pairs
        .iter()
        .map(|pair| {
            pair.split_once('=')
                .map(|(key, value)| (key.to_string(), value.to_string()))
                .ok_or_else(|| {
                    RentRadarError::InvalidArguments(format!(
                        "query parameter must be key=value, got {pair}"
                    ))
                })
        })
        .collect()
}

fn print_result(result: &Table, json: bool) -> Result<()> {
    if json {
        let records: Vec<Value> = result.records().into_iter().map(normalize).collect();
        println!("{}", serde_json::to_string_pretty(&records)?);
        return Ok(());
    }

    if result.columns().is_empty() {
        println!("(no result)");
        return Ok(());
    }

    let rendered: Vec<Vec<String>> = result
        .rows()
        .iter()
        .map(|row| row.iter().map(|value| value.to_string()).collect())
        .collect();
    let mut widths: Vec<usize> = result.columns().iter().map(|c| c.len()).collect();
    for row in &rendered {
        for (index, cell) in row.iter().enumerate() {
            widths[index] = widths[index].max(cell.len());
        }
    }

    let header = result
        .columns()
        .iter()
        .enumerate()
        .map(|(index, column)| format!("{:<width$}", column, width = widths[index]))
        .collect::<Vec<_>>()
        .join("  ");
    println!("{header}");
    println!("{}", "-".repeat(header.len()));
    for row in rendered {
        let line = row
            .iter()
            .enumerate()
            .map(|(index, cell)| format!("{:<width$}", cell, width = widths[index]))
            .collect::<Vec<_>>()
            .join("  ");
        println!("{line}");
    }
    println!("({} rows)", result.len());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_param_narrows_types() {
        assert_eq!(parse_param("42"), Value::Integer(42));
        assert_eq!(parse_param("4.5"), Value::Float(4.5));
        assert_eq!(parse_param("true"), Value::Boolean(true));
        assert_eq!(parse_param("null"), Value::Null);
        assert_eq!(parse_param("p1"), Value::Text("p1".to_string()));
    }

    #[test]
    fn test_parse_query_pairs() {
        let pairs = vec!["city=Charlottesville".to_string(), "state=VA".to_string()];
        let parsed = parse_query_pairs(&pairs).unwrap();
        assert_eq!(
            parsed,
            vec![
                ("city".to_string(), "Charlottesville".to_string()),
                ("state".to_string(), "VA".to_string()),
            ]
        );

        let bad = vec!["nope".to_string()];
        assert!(matches!(
            parse_query_pairs(&bad),
            Err(RentRadarError::InvalidArguments(_))
        ));
    }
}
