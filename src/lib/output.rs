use crate::errors::*;
use crate::graph::{ModelGraph, NodeValue, Trace};

use std::convert::TryFrom;
use unindent::unindent;

const META_SQL: &str = "INSERT INTO Meta VALUES (?, ?);";
const PARAMETERS_SQL: &str = "INSERT INTO Parameters VALUES (?,?,?);";
const SERIES_SQL: &str = "INSERT INTO Series VALUES (?,?,?,?);";

pub fn to_i64(x: usize) -> i64 {
    i64::try_from(x).unwrap_or(i64::MAX)
}

/// Creates the output tables and records run metadata.
pub fn create_tables(
    db_transaction: &rusqlite::Transaction, meta: &[(&str, String)]
) -> Result<()> {
    db_transaction.execute_batch(&unindent("
        CREATE TABLE Meta (key, value);
        CREATE TABLE Parameters (draw INTEGER, name TEXT, value REAL);
        CREATE TABLE Series (draw INTEGER, name TEXT, day INTEGER, value REAL);
    "))?;
    let mut insert_meta = db_transaction.prepare(META_SQL)?;
    for (key, value) in meta {
        insert_meta.execute(rusqlite::params![key, value])?;
    }
    Ok(())
}

/// Writes one prior-predictive draw: its parameter values, every
/// deterministic series, and the simulated observations.
///
/// SIR trajectories are split into `S_t`, `I_t` and `new_I_t`.
pub fn write_draw(
    db_transaction: &rusqlite::Transaction,
    graph: &ModelGraph,
    draw: usize,
    point: &[f64],
    trace: &Trace,
    observations: Option<&[f64]>,
) -> Result<()> {
    let mut insert_parameter = db_transaction.prepare(PARAMETERS_SQL)?;
    let mut insert_series = db_transaction.prepare(SERIES_SQL)?;
    let draw = to_i64(draw);

    for ((name, _), value) in graph.free_variables().zip(point) {
        insert_parameter.execute(rusqlite::params![draw, name, value])?;
    }

    let mut write_series = |name: &str, values: &[f64]| -> Result<()> {
        for (day, value) in values.iter().enumerate() {
            insert_series.execute(rusqlite::params![draw, name, to_i64(day), value])?;
        }
        Ok(())
    };

    for (name, value) in trace.iter() {
        match value {
            NodeValue::Series(values) => write_series(name, values)?,
            NodeValue::Trajectory(trajectory) => {
                write_series("S_t", &trajectory.susceptible)?;
                write_series("I_t", &trajectory.infected)?;
                write_series("new_I_t", &trajectory.new_infections)?;
            },
        }
    }

    if let (Some(observations), Some(likelihood)) = (observations, graph.likelihood()) {
        write_series(&likelihood.name, observations)?;
    }
    Ok(())
}
