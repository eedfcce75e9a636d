use std::{fs::File, os::unix::prelude::AsRawFd, path::Path};

use ftsm::{
    Surface,
    config::Config,
    die,
    export::{Exporter, JsonExporter, Report, TsvExporter},
    max_threads,
};

include!(concat!(env!("OUT_DIR"), "/version.rs"));

use clap::Parser;

/// minimum energy paths on sampled two-dimensional surfaces
#[derive(Parser, Debug)]
#[command(author, about, long_about = None)]
struct Args {
    /// input file
    #[arg(value_parser, default_value_t = String::from("ftsm.toml"))]
    infile: String,

    /// Overwrite existing output from a previous run. Defaults to false.
    #[arg(short, long, default_value_t = false)]
    overwrite: bool,

    /// Print the git commit hash and exit. Defaults to false.
    #[arg(short, long, default_value_t = false)]
    version: bool,

    /// Set the maximum number of threads to use. Defaults to 0, which means to
    /// use as many threads as there are CPUS.
    #[arg(short, long, default_value_t = 0)]
    threads: usize,

    /// Serialize the input file to JSON and exit.
    #[arg(short, default_value_t = false, hide = true)]
    json: bool,
}

fn load_config(infile: &str) -> Config {
    match Config::load(infile) {
        Ok(c) => c,
        Err(e) => die!("{e}"),
    }
}

fn main() -> Result<(), std::io::Error> {
    env_logger::init();
    let args = Args::parse();
    if args.version {
        println!("version: {}", version());
        return Ok(());
    }
    if args.json {
        let config = load_config(&args.infile);
        match serde_json::to_string(&config) {
            Ok(s) => println!("{}", s),
            Err(e) => {
                die!("failed to serialize {} with {e}", args.infile);
            }
        };
        return Ok(());
    }
    let path = Path::new("ftsm.out");
    if path.exists() && !args.overwrite {
        die!("existing ftsm output. overwrite with -o/--overwrite");
    }
    // load before redirecting so a bad input file fails on the terminal
    let config = load_config(&args.infile);
    let outfile = File::create(path)?;
    let logfile = File::create("ftsm.log")?;
    let out_fd = outfile.as_raw_fd();
    let log_fd = logfile.as_raw_fd();
    // redirect stdout to outfile and stderr to logfile
    unsafe {
        libc::dup2(out_fd, 1);
        libc::dup2(log_fd, 2);
    }
    println!("PID: {}", std::process::id());
    println!("version: {}", version());
    println!("{config}");
    max_threads(args.threads);

    let surface = match Surface::load_file(&config.surface) {
        Ok(s) => s,
        Err(e) => die!("failed to load surface from {}: {e}", config.surface),
    };
    let grid = surface.grid();
    let (lo, hi) = grid.value().range();
    println!(
        "loaded {} x {} grid spanning {}",
        grid.y().len(),
        grid.x().len(),
        surface.bounds()
    );
    println!("energy range: [{lo:.8}, {hi:.8}]");
    println!(
        "triangulated into {} triangles\n",
        surface.interpolator().triangles()
    );

    let outcome = match ftsm::run(&surface, &config) {
        Ok(o) => o,
        Err(e) => die!("string method failed: {e}"),
    };
    println!("initial free energy sum: {:.8}", outcome.initial_score);
    println!(
        "Best iteration: {} with free energy sum: {:.8}\n",
        outcome.best.iteration, outcome.best.score
    );

    let report = Report::new(&outcome, &surface);
    println!("Final string:");
    report.write_table(&mut std::io::stdout())?;
    println!();

    TsvExporter::new(&config.output).export(&report)?;
    JsonExporter::new("ftsm.json").export(&report)?;

    println!("normal termination of ftsm");

    Ok(())
}
