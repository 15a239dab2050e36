//! Styx CLI - stream an RDF file through the bounded decode bridge.
//!
//! Usage:
//!   styx data/sensors.nt
//!   styx data/events.nq --json --capacity 32
//!   styx data/export.dat --format nquads --base http://example.org/data/

use clap::Parser;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::process;
use std::sync::Arc;
use std::time::Instant;
use styx::{BoundedAsyncParser, PoolConfig, RdfFormat, WorkerPool};

#[derive(Parser, Debug)]
#[command(name = "styx")]
#[command(about = "Stream RDF statements from a file through the bounded asynchronous decode bridge")]
struct Args {
    /// Input file path (N-Triples or N-Quads)
    input: String,

    /// Serialization format: ntriples, nquads, or auto (by file extension)
    #[arg(short, long, default_value = "auto")]
    format: String,

    /// Base IRI for resolving relative references
    #[arg(short, long)]
    base: Option<String>,

    /// Queue capacity: how many statements the decoder may run ahead
    #[arg(short, long, default_value = "100")]
    capacity: usize,

    /// Print statements as JSON objects instead of N-Quads lines
    #[arg(long)]
    json: bool,

    /// Stop after this many statements (0 = no limit)
    #[arg(short, long, default_value = "0")]
    limit: u64,
}

fn main() {
    let args = Args::parse();

    let format = match args.format.to_lowercase().as_str() {
        "auto" => {
            let extension =
                Path::new(&args.input).extension().and_then(|e| e.to_str()).unwrap_or("");
            match RdfFormat::from_extension(extension) {
                Some(format) => format,
                None => {
                    eprintln!("Error: cannot detect the format of {}", args.input);
                    eprintln!("Use --format ntriples or --format nquads");
                    process::exit(1);
                }
            }
        }
        "ntriples" | "nt" => RdfFormat::NTriples,
        "nquads" | "nq" => RdfFormat::NQuads,
        other => {
            eprintln!("Error: unknown format: {}", other);
            eprintln!("Valid options: ntriples, nquads, auto");
            process::exit(1);
        }
    };

    let file = match File::open(&args.input) {
        Ok(file) => file,
        Err(e) => {
            eprintln!("Error: cannot open {}: {}", args.input, e);
            process::exit(1);
        }
    };

    let pool = Arc::new(WorkerPool::new(PoolConfig::default()));
    let parser = BoundedAsyncParser::with_capacity(Arc::clone(&pool), args.capacity);

    eprintln!("Styx - bounded asynchronous RDF decoding");
    eprintln!("Input: {}", args.input);
    eprintln!("Format: {}", format);
    eprintln!("Queue capacity: {}", args.capacity);
    eprintln!();

    let mut statements = match parser.parse_format(BufReader::new(file), format, args.base.as_deref())
    {
        Ok(statements) => statements,
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    };

    // Ctrl-C cancels the stream from the signal thread; iteration then
    // winds down cleanly without reporting an error.
    let cancel = statements.cancel_handle();
    if let Err(e) = ctrlc::set_handler(move || cancel.cancel()) {
        eprintln!("Warning: could not install the Ctrl-C handler: {}", e);
    }

    let start = Instant::now();
    let mut count: u64 = 0;
    let mut failed = false;

    while statements.has_next() {
        match statements.next_statement() {
            Ok(statement) => {
                if args.json {
                    match serde_json::to_string(&statement) {
                        Ok(line) => println!("{}", line),
                        Err(e) => {
                            eprintln!("Error: cannot serialize statement: {}", e);
                            failed = true;
                            break;
                        }
                    }
                } else {
                    println!("{}", statement);
                }
                count += 1;
                if args.limit > 0 && count >= args.limit {
                    break;
                }
            }
            Err(e) => {
                eprintln!("Error: {}", e);
                failed = true;
                break;
            }
        }
    }

    if let Err(e) = statements.close() {
        eprintln!("Error: {}", e);
        failed = true;
    }
    drop(statements);

    let elapsed = start.elapsed().as_secs_f64();
    eprintln!();
    eprintln!("Statements: {}", count);
    eprintln!("Elapsed: {:.3} s", elapsed);
    if elapsed > 0.0 {
        eprintln!("Rate: {:.0} statements/s", count as f64 / elapsed);
    }

    pool.shutdown();
    if failed {
        process::exit(1);
    }
}
