use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "rentradar")]
#[command(about = "Real estate market data platform")]
#[command(version = "0.1.0")]
pub struct Cli {
    /// Path to the database file
    #[arg(long, global = true, default_value = "rentradar.db")]
    pub db: PathBuf,

    /// Emit rows as JSON instead of a text table
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List the tables in the database
    Tables,

    /// Show the schema of one table, or of the whole database
    Schema {
        /// Table name (omit for every table)
        table: Option<String>,
    },

    /// Run a SQL statement
    Query {
        /// SQL text, with ?1..?n placeholders for parameters
        sql: String,
        /// Positional bind parameter (repeatable)
        #[arg(long = "param")]
        params: Vec<String>,
    },

    /// Load a CSV or JSON file into a table, replacing it
    Load {
        /// Path to the data file
        file: PathBuf,
        /// Target table name
        #[arg(long)]
        table: String,
        /// File format (inferred from the extension when omitted)
        #[arg(long)]
        format: Option<String>,
    },

    /// Fetch listings from the RentCast API into a table
    Sync {
        /// API endpoint, e.g. /listings/rental/long-term
        endpoint: String,
        /// Target table name
        #[arg(long)]
        table: String,
        /// API key (falls back to the RENTCAST_API_KEY variable)
        #[arg(long)]
        api_key: Option<String>,
        /// Page size
        #[arg(long, default_value_t = crate::ingest::DEFAULT_PAGE_LIMIT)]
        limit: u64,
        /// Extra query parameter as key=value (repeatable)
        #[arg(long = "query")]
        query: Vec<String>,
    },

    /// Look up a property and its features by property id
    Property {
        property_id: String,
    },

    /// Market statistics by zip code or bedroom count
    Market {
        /// Zip code
        #[arg(long)]
        zip: Option<i64>,
        /// Bedroom count
        #[arg(long)]
        bedrooms: Option<i64>,
        /// Use the historic series instead of the current snapshot
        #[arg(long)]
        history: bool,
    },

    /// Property tax records for a property
    Taxes {
        property_id: String,
        /// Restrict to one tax year
        #[arg(long)]
        year: Option<String>,
    },
}
