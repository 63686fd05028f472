use sirchange::errors::*;
use sirchange::graph::GraphSummary;
use sirchange::input::ModelInput;
use sirchange::logging;
use sirchange::stan::StanModel;
use sirchange::util::*;

use log::{error, info};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
struct OutputData {
    summary: GraphSummary,
    named_outputs: Vec<String>,
    stan_code: String,
    stan_data: serde_json::Value,
}

fn main() {
    logging::init();
    match run() {
        Ok(output_data) => {
            match serde_json::to_string_pretty(&output_data) {
                Ok(json_data) => println!("{}", json_data),
                Err(e) => {
                    error!("{}", e);
                    std::process::exit(1);
                }
            }
        },
        Err(e) => {
            error!("{}", e);
            if let Ok(json_data) = serde_json::to_string(&e) {
                println!("{}", json_data);
            }
            std::process::exit(1);
        }
    }
}

fn run() -> Result<OutputData> {
    // Read input from file specified in first command-line argument or from stdin;
    // an optional second argument names a file to write the Stan program to
    let args: Vec<String> = std::env::args().collect();
    let json_data = read_input(&args)?;
    let input = ModelInput::from_json(&json_data)?;

    let graph = input.assemble()?;

    let stan_model = StanModel::new(&graph);
    let stan_code = stan_model.generate_stan_code();
    if let Some(stan_path) = args.get(2) {
        write_data_to_file(stan_path, &stan_code)?;
        info!("wrote Stan program to {}", stan_path);
    }

    Ok(OutputData {
        summary: graph.summary(),
        named_outputs: graph.named_outputs().iter().map(|s| s.to_string()).collect(),
        stan_data: stan_model.data_json(),
        stan_code,
    })
}
