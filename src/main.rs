
extern crate clap;
#[macro_use] extern crate log;
extern crate fern;
extern crate chrono;
extern crate regex;
extern crate term_grid;
extern crate thiserror;

pub mod assembler;

use clap::{Arg, ArgMatches, App};
use term_grid::{Grid, GridOptions, Direction, Filling, Cell};

use std::fs::File;
use std::path::{Path, PathBuf};

fn main() {
    let args = process_arguments();
    initialize_logging(args.occurrences_of("verbose"));

    debug!("Arguments:\n\tVerbosity: {}\n\tPreprocess Only: {}\n\tOutfile: {}\n\tInfile: {}",
        verbosity_filter(args.occurrences_of("verbose")),
        args.is_present("preprocess"),
        args.value_of("output").unwrap_or("None"),
        args.value_of("INPUT").unwrap_or("None")
    );

    // INPUT is required, so clap has already rejected a missing value.
    let ipath = Path::new(args.value_of("INPUT").unwrap_or_default());

    // Open the path in read-only mode, returns `io::Result<File>`
    let ifile = match File::open(&ipath) {
        Err(err) => {
            error!("fatal: unable to open input file `{}`: {}", ipath.display(), err);
            std::process::exit(1);
        },
        Ok(file) => file,
    };

    if args.is_present("preprocess") {
        match assembler::preprocess(Box::new(ifile)) {
            Ok(records) => for record in records.iter() {
                println!("{}", record);
            },
            Err(err) => {
                error!("{}", err);
                std::process::exit(1);
            },
        }
        return;
    }

    let opath = match args.value_of("output") {
        Some(filename) => PathBuf::from(filename),
        None => ipath.with_extension("bin"),
    };

    // The output is written unbuffered so that bytes for every line before
    // a fault are on disk when the process exits.
    let mut ofile = match File::create(&opath) {
        Err(err) => {
            error!("fatal: unable to open output file `{}`: {}", opath.display(), err);
            std::process::exit(1);
        },
        Ok(file) => file,
    };

    let listing = match assembler::assemble(Box::new(ifile), &mut ofile) {
        Ok(listing) => listing,
        Err(err) => {
            error!("{}", err);
            error!("stopped assembly of `{}`; `{}` holds the lines before the fault", ipath.display(), opath.display());
            std::process::exit(1);
        },
    };

    if args.is_present("print-debug") {
        print_listing(&listing);
    }

    info!("wrote `{}`", opath.display());
}

fn print_listing(listing: &[assembler::Entry]) {
    let mut grid = Grid::new(GridOptions {
        filling:     Filling::Spaces(1),
        direction:   Direction::LeftToRight,
    });

    for entry in listing.iter() {
        grid.add(Cell::from(format!("0x{:04X}:", entry.offset)));
        grid.add(Cell::from(format!("{}", entry.instruction)));
        grid.add(Cell::from("=>".to_string()));
        grid.add(Cell::from(format!("{}", entry.encoded)));
    }

    println!("{}", grid.fit_into_columns(4));
}

fn process_arguments() -> ArgMatches<'static> {
    App::new(env!("CARGO_PKG_NAME"))
        .version(env!("CARGO_PKG_VERSION"))
        .author(env!("CARGO_PKG_AUTHORS"))
        .about(env!("CARGO_PKG_DESCRIPTION"))
        .arg(Arg::with_name("INPUT")
            .help("Sets the input file to use")
            .required(true)
            .multiple(false)
            .index(1))
        .arg(Arg::with_name("verbose")
            .short("v")
            .multiple(true)
            .takes_value(false)
            .help("Sets the level of verbosity"))
        .arg(Arg::with_name("output")
            .short("o")
            .takes_value(true)
            .help("write output to an outfile (defaults to INPUT with a .bin extension)"))
        .arg(Arg::with_name("preprocess")
            .short("e")
            .takes_value(false)
            .help("classify and echo each source line without assembling"))
        .arg(Arg::with_name("print-debug")
            .short("d")
            .alias("show")
            .alias("s")
            .takes_value(false)
            .help("prints the listing alongside the machine code to STDOUT"))
        .get_matches()
}

fn verbosity_filter(verbosity: u64) -> log::LevelFilter {
    match verbosity {
        0 => log::LevelFilter::Error,
        1 => log::LevelFilter::Warn,
        2 => log::LevelFilter::Info,
        _ => log::LevelFilter::Debug,
    }
}

fn initialize_logging(verbosity: u64) {
    fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "{}[{}][{}] {}",
                chrono::Local::now().format("[%Y-%m-%d][%H:%M:%S]"),
                record.target(),
                record.level(),
                message
            ))
        })
        .level(verbosity_filter(verbosity))
        .chain(std::io::stdout())
        .apply().ok();
}
