use clap::Parser;
use rentradar::cli::{Cli, Commands};
use rentradar::cli_handlers;
use std::process;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let db = cli.db;
    let json = cli.json;

    let result = match cli.command {
        Commands::Tables => cli_handlers::handle_tables(&db),
        Commands::Schema { table } => cli_handlers::handle_schema(&db, table.as_deref(), json),
        Commands::Query { sql, params } => cli_handlers::handle_query(&db, &sql, &params, json),
        Commands::Load {
            file,
            table,
            format,
        } => cli_handlers::handle_load(&db, &file, &table, format.as_deref()),
        Commands::Sync {
            endpoint,
            table,
            api_key,
            limit,
            query,
        } => cli_handlers::handle_sync(&db, &endpoint, &table, api_key.as_deref(), limit, &query),
        Commands::Property { property_id } => {
            cli_handlers::handle_property(&db, &property_id, json)
        }
        Commands::Market {
            zip,
            bedrooms,
            history,
        } => cli_handlers::handle_market(&db, zip, bedrooms, history, json),
        Commands::Taxes { property_id, year } => {
            cli_handlers::handle_taxes(&db, &property_id, year.as_deref(), json)
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}
