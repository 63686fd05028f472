use sirchange::errors::*;
use sirchange::input::SimulationConfig;
use sirchange::logging;
use sirchange::output::{create_tables, write_draw};
use sirchange::util::*;

use log::{error, info};
use rand::Rng;
use rand_xoshiro::rand_core::SeedableRng;
use rand_xoshiro::Xoshiro256PlusPlus;

use std::iter::FromIterator;
use std::path::{Path, PathBuf};
use std::time::Instant;

fn main() {
    logging::init();
    if let Err(e) = run() {
        error!("{}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    // Read JSON data from file specified in first command-line argument or from stdin
    let args: Vec<String> = std::env::args().collect();
    let json_data = read_input(&args)?;
    let config: SimulationConfig = serde_json::from_str(&json_data)?;

    let graph = config.model.assemble()?;

    // If we were given a config file, resolve the output path relative to it
    let output_path = config.output_path.as_ref().map(|output_path| {
        match args.get(1).and_then(|p| Path::new(p).parent()) {
            Some(parent) => parent.join(output_path),
            None => PathBuf::from(output_path),
        }
    });

    // Write to DB file specified in config file
    // (or use in-memory database if not specified)
    let mut db_connection = match &output_path {
        Some(db_path) => {
            if db_path.exists() {
                return Err(Error::InvalidInputPath(db_path.display().to_string()));
            }
            rusqlite::Connection::open(db_path)?
        },
        None => rusqlite::Connection::open_in_memory()?,
    };

    let rng_seed = config.rng_seed.unwrap_or_else(|| rand::thread_rng().gen());
    let mut rng = Xoshiro256PlusPlus::seed_from_u64(rng_seed);

    {
        let db_transaction = db_connection.transaction()?;
        create_tables(&db_transaction, &[
            ("rng_seed", rng_seed.to_string()),
            ("n_draws", config.n_draws.to_string()),
            ("n_free", graph.n_free().to_string()),
        ])?;
        db_transaction.commit()?;
    }

    let start = Instant::now();
    for draw in 0..config.n_draws {
        let point = graph.sample_prior(&mut rng);
        let trace = graph.evaluate(&point)?;
        let observations = graph.sample_observations(&point, &trace, &mut rng);

        let db_transaction = db_connection.transaction()?;
        write_draw(&db_transaction, &graph, draw, &point, &trace, observations.as_deref())?;
        db_transaction.commit()?;
    }
    info!("{} draws in {} s", config.n_draws, start.elapsed().as_secs_f64());

    if config.write_to_stdout.unwrap_or(false) {
        info!("Writing DB to stdout in JSON format...");

        let tables = vec![
            ("Meta", vec!["key", "value"]),
            ("Parameters", vec!["draw", "name", "value"]),
            ("Series", vec!["draw", "name", "day", "value"]),
        ];
        let mut db_json_data = Vec::with_capacity(tables.len());
        for (table_name, col_names) in &tables {
            db_json_data.push((
                String::from(*table_name),
                db_table_to_json_object(&db_connection, table_name, col_names)?,
            ));
        }
        let db_json_data = serde_json::Map::from_iter(db_json_data);

        println!("{}", serde_json::to_string_pretty(&db_json_data)?);
    }

    info!("...done.");
    Ok(())
}
