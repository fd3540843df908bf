//! Entrypoint for the flower classifier CLI. Reads a base64 payload from
//! the file given as the first argument, runs the model on it and prints
//! `<label>|<confidence>` on stdout

use anyhow::Result;
use florascan::config;
use florascan::preprocess;
use florascan::torch::TorchModel;
use std::{env, fs, process};
use tracing::debug;

fn get_args() -> String {
    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        println!("Error|0.0");
        process::exit(1);
    }

    args[1].clone()
}

fn main() -> Result<()> {
    env::set_var("RUST_LOG", config::RUST_LOG);
    tracing_subscriber::fmt::init();

    let b64_file = get_args();

    let payload = fs::read_to_string(&b64_file)?;
    let image = preprocess::decode_base64(&payload)?;
    debug!("decoded {} bytes of image data from {b64_file}", image.len());

    let settings = config::settings();
    let model = TorchModel::new(&settings.model_file)?;
    let prediction = model.classify(&image)?;

    println!("{prediction}");
    Ok(())
}
