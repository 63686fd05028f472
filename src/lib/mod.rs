//! Discrete-time SIR model whose transmission rate changes smoothly at
//! inferred change points, coupled to a delayed, heavy-tailed observation
//! model of reported cases.
//!
//! [`model::ModelAssembler`] turns prior configuration and observed data into
//! a [`graph::ModelGraph`], which an external sampler can evaluate through
//! `log_prob`/`grad_log_prob` or receive as a Stan program via
//! [`stan::StanModel`].

pub mod errors;
pub mod logging;
pub mod util;
pub mod numeric;
pub mod transition;
pub mod schedule;
pub mod sir;
pub mod delay;
pub mod priors;
pub mod dist;
pub mod graph;
pub mod model;
pub mod input;
pub mod stan;
pub mod output;
