use std::fmt;
use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::str::FromStr;

use util::ParseEnumError;
use wmm::executor::{
    explore, run, ControllableExecutor, ExecutionError, InteractiveScheduler, RandomScheduler,
};
use wmm::memory::{MemoryModel, MemorySubsystem};

/// How the next transition of the configuration is chosen.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExecutionMode {
    Random,
    Interactive,
    ModelChecking,
}

impl FromStr for ExecutionMode {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<ExecutionMode, ParseEnumError> {
        match s {
            "random" => Ok(ExecutionMode::Random),
            "interactive" => Ok(ExecutionMode::Interactive),
            "mc" => Ok(ExecutionMode::ModelChecking),
            _ => Err(ParseEnumError {
                value: s.to_string(),
                enum_name: "ExecutionMode",
            }),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Tracing {
    On,
    Off,
}

impl Tracing {
    pub fn is_on(self) -> bool {
        self == Tracing::On
    }
}

impl FromStr for Tracing {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Tracing, ParseEnumError> {
        match s {
            "on" => Ok(Tracing::On),
            "off" => Ok(Tracing::Off),
            _ => Err(ParseEnumError {
                value: s.to_string(),
                enum_name: "Tracing",
            }),
        }
    }
}

#[derive(Debug)]
pub enum Error {
    Io(io::Error, PathBuf),
    Parse(wmasm::Error),
    Setup(ParseEnumError),
    BadInstructionPointer(String),
    NoThreads,
    EntryPointOutOfRange {
        thread: usize,
        entry: usize,
        instructions: usize,
    },
    Execution(ExecutionError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Io(err, path) => {
                write!(f, "Reading input file \"{}\" failed: {}", path.display(), err)
            }
            Error::Parse(err) => {
                writeln!(f, "Parsing input failed:")?;
                write!(f, "{}", err)
            }
            Error::Setup(err) => write!(f, "{}", err),
            Error::BadInstructionPointer(value) => {
                write!(f, "Initial instruction pointer \"{}\" is not a number", value)
            }
            Error::NoThreads => f.write_str("Expected a positive number of instruction pointers"),
            Error::EntryPointOutOfRange {
                thread,
                entry,
                instructions,
            } => write!(
                f,
                "Thread {} starts at instruction {}, but the program only has {}",
                thread, entry, instructions
            ),
            Error::Execution(err) => write!(f, "{}", err),
        }
    }
}

impl From<wmasm::Error> for Error {
    fn from(err: wmasm::Error) -> Error {
        Error::Parse(err)
    }
}

impl From<ParseEnumError> for Error {
    fn from(err: ParseEnumError) -> Error {
        Error::Setup(err)
    }
}

impl From<ExecutionError> for Error {
    fn from(err: ExecutionError) -> Error {
        Error::Execution(err)
    }
}

/// Parses the file at `input` and drives it to termination under the given
/// model and execution mode.
pub fn run_file(
    input: &Path,
    model: MemoryModel,
    mode: ExecutionMode,
    tracing: Tracing,
    entry_points: &[usize],
) -> Result<(), Error> {
    let source = read_source(input)?;
    run_source(&source, model, mode, tracing, entry_points)
}

pub fn run_source(
    source: &str,
    model: MemoryModel,
    mode: ExecutionMode,
    tracing: Tracing,
    entry_points: &[usize],
) -> Result<(), Error> {
    if entry_points.is_empty() {
        return Err(Error::NoThreads);
    }

    let descriptor = Rc::new(wmasm::parse(source)?);
    for (thread, &entry) in entry_points.iter().enumerate() {
        if entry > descriptor.instructions.len() {
            return Err(Error::EntryPointOutOfRange {
                thread,
                entry,
                instructions: descriptor.instructions.len(),
            });
        }
    }

    let memory = MemorySubsystem::new(model, &descriptor, entry_points.len());
    let mut executor = ControllableExecutor::new(memory, &descriptor, entry_points);

    let stdout = io::stdout();
    let mut out = stdout.lock();
    match mode {
        ExecutionMode::Random => {
            let mut scheduler = RandomScheduler::from_time();
            run(&mut executor, &mut scheduler, tracing.is_on(), &mut out)?
        }
        ExecutionMode::Interactive => {
            run(&mut executor, &mut InteractiveScheduler, tracing.is_on(), &mut out)?
        }
        ExecutionMode::ModelChecking => explore(&executor, tracing.is_on(), &mut out)?,
    }
    Ok(())
}

fn read_source(path: &Path) -> Result<String, Error> {
    let file = File::open(path).map_err(|err| Error::Io(err, path.to_owned()))?;
    let mut source = String::new();
    BufReader::new(file)
        .read_to_string(&mut source)
        .map_err(|err| Error::Io(err, path.to_owned()))?;
    Ok(source)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn execution_mode_words() {
        assert_eq!("random".parse(), Ok(ExecutionMode::Random));
        assert_eq!("interactive".parse(), Ok(ExecutionMode::Interactive));
        assert_eq!("mc".parse(), Ok(ExecutionMode::ModelChecking));
        assert!("model-checking".parse::<ExecutionMode>().is_err());
    }

    #[test]
    fn tracing_words() {
        assert_eq!("on".parse(), Ok(Tracing::On));
        assert_eq!("off".parse(), Ok(Tracing::Off));
        assert!("ON".parse::<Tracing>().is_err());
    }

    #[test]
    fn memory_model_words() {
        assert_eq!("sc".parse(), Ok(MemoryModel::Sc));
        assert_eq!("tso".parse(), Ok(MemoryModel::Tso));
        assert_eq!("pso".parse(), Ok(MemoryModel::Pso));
        assert!("so".parse::<MemoryModel>().is_err());
    }

    #[test]
    fn zero_threads_is_a_setup_error() {
        let result = run_source(
            "r = 1;",
            MemoryModel::Sc,
            ExecutionMode::Random,
            Tracing::Off,
            &[],
        );
        assert!(matches!(result, Err(Error::NoThreads)));
    }

    #[test]
    fn entry_point_past_the_end_is_rejected() {
        let result = run_source(
            "r = 1;",
            MemoryModel::Sc,
            ExecutionMode::Random,
            Tracing::Off,
            &[2],
        );
        assert!(matches!(result, Err(Error::EntryPointOutOfRange { .. })));
    }
}
