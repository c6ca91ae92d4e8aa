#[macro_use]
extern crate clap;

use std::path::Path;
use std::process;

use clap::Arg;

fn main() {
    let matches = app_from_crate!()
        .arg(
            Arg::with_name("INPUT")
                .help("Sets the source file to emulate")
                .required(true)
                .index(1),
        )
        .arg(
            Arg::with_name("MODEL")
                .help("Sets the memory model (sc, tso or pso)")
                .required(true)
                .index(2),
        )
        .arg(
            Arg::with_name("MODE")
                .help("Sets the execution mode (random, interactive or mc)")
                .required(true)
                .index(3),
        )
        .arg(
            Arg::with_name("TRACING")
                .help("Turns snapshot tracing on or off")
                .required(true)
                .index(4),
        )
        .arg(
            Arg::with_name("IP")
                .help("Initial instruction pointer of each thread")
                .required(true)
                .multiple(true)
                .index(5),
        )
        .get_matches();

    if let Err(err) = emulate(&matches) {
        eprintln!("{}", err);
        process::exit(1);
    }
}

fn emulate(matches: &clap::ArgMatches) -> Result<(), wmx::Error> {
    let input = matches.value_of("INPUT").unwrap();
    let model = matches.value_of("MODEL").unwrap().parse()?;
    let mode = matches.value_of("MODE").unwrap().parse()?;
    let tracing = matches.value_of("TRACING").unwrap().parse()?;
    let entry_points = matches
        .values_of("IP")
        .unwrap()
        .map(|value| {
            value
                .parse::<usize>()
                .map_err(|_| wmx::Error::BadInstructionPointer(value.to_string()))
        })
        .collect::<Result<Vec<_>, _>>()?;

    wmx::run_file(Path::new(input), model, mode, tracing, &entry_points)
}
