use std::process;

use clap::Parser;

use textbundler::cli::{self, Args};

fn main() {
  env_logger::init();

  let args = Args::parse();
  if let Err(err) = cli::run(&args) {
    eprintln!("{err}");
    process::exit(1);
  }
}
