use std::{fs, process, sync::Arc};

use clap::Parser;
use feelib::{Library, diagnostics::LogSink, run_script_with};

/// feelib runs call scripts against the FEEL built-in function library.
///
/// A script holds one call per line, such as
/// `sublist [[1, 2, 3], -2] => [2, 3]`.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Treats the contents argument as the path of a script file.
    #[arg(short, long)]
    file: bool,

    /// Pipe mode prints the result of every call.
    #[arg(short, long)]
    pipe_mode: bool,

    /// Reports failed calls through the log (filtered by `RUST_LOG`).
    #[arg(short, long)]
    verbose: bool,

    /// Lists the built-in functions and their aliases, then exits.
    #[arg(short, long)]
    list: bool,

    #[arg(required_unless_present = "list")]
    contents: Option<String>,
}

fn main() {
    let args = Args::parse();

    if args.list {
        for signature in Library::functions() {
            let aliases = signature.aliases
                                   .iter()
                                   .map(|a| format!(", \"{a}\""))
                                   .collect::<String>();
            println!("{}{aliases} ({} arguments)", signature.name, signature.arity);
        }
        return;
    }

    let library = if args.verbose {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("feelib=error")).init();
        Library::with_sink(Arc::new(LogSink))
    } else {
        Library::new()
    };

    let contents = args.contents.unwrap_or_default();
    let script = if args.file {
        fs::read_to_string(&contents).unwrap_or_else(|_| {
                                         eprintln!("Failed to read the input file '{contents}'. Perhaps this file does not exist?");
                                         process::exit(1);
                                     })
    } else {
        contents
    };

    if let Err(e) = run_script_with(&library, &script, args.pipe_mode) {
        eprintln!("{e}");
        process::exit(1);
    }
}
