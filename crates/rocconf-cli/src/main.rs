//! `roc-compile`: compiles HGCROC JSON settings into a `page,register,value` CSV.

mod settings;

use std::{
    fs::File,
    io::{self, BufWriter},
    path::{Path, PathBuf},
    process::ExitCode,
};

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, ValueEnum};
use log::{LevelFilter, info};
use rocconf::{
    compiler::{OverflowPolicy, SettingsCompiler},
    lut,
    render::{ValueFormat, write_csv},
};

const LONG_ABOUT: &str = "\
Compile one or more JSON settings files for the HGCROC into the value of every
page/register pair, written as page,register,value rows.

Each settings object maps page-name patterns to parameter values:

  { \"Global_Analog_0\": { \"ON_pa\": 0, \"Gain_conv\": 4 } }

Page and parameter names are the ones used in the chip documentation. A page
pattern is a regular expression matched against the whole page name, so all
channels are selected with \"Channel_.*\" (not \"Channel_*\").

A file may hold one settings object or a list of them. Objects are applied in
order, file after file, after the documented defaults, so general rules can be
given first and exceptions after them:

  [
    { \"Channel_.*\": { \"Inputdac\": 31 } },
    { \"Channel_42\": { \"Inputdac\": 12 } }
  ]";

#[derive(Parser, Debug)]
#[command(
    name = "roc-compile",
    version,
    about = "Compile HGCROC JSON settings into a page,register,value CSV",
    long_about = LONG_ABOUT
)]
struct Cli {
    /// One (or more, in order) JSON settings files to compile
    #[arg(required = true, value_name = "SETTING_FILE")]
    setting_files: Vec<PathBuf>,

    /// File to write the compiled settings to, `-` for stdout
    /// [default: first settings file with a .csv extension]
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Don't apply the documented defaults before the settings files
    #[arg(long)]
    no_defaults: bool,

    /// How register values are written
    #[arg(long, value_enum, default_value_t = Format::Hex)]
    format: Format,

    /// Keep the low bits of values too wide for their parameter instead of failing
    #[arg(long)]
    truncate: bool,

    /// More logging (-v info, -vv debug, -vvv trace); RUST_LOG overrides
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    Hex,
    Decimal,
    Binary,
}

impl From<Format> for ValueFormat {
    fn from(value: Format) -> Self {
        match value {
            Format::Hex => ValueFormat::Hex,
            Format::Decimal => ValueFormat::Decimal,
            Format::Binary => ValueFormat::Binary,
        }
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };

    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();
}

fn run(cli: &Cli) -> Result<()> {
    let layers = settings::load_all(&cli.setting_files)?;
    let registry = lut::hgcroc().context("built-in register map is invalid")?;

    let overflow = if cli.truncate {
        OverflowPolicy::Truncate
    } else {
        OverflowPolicy::Reject
    };

    let registers = SettingsCompiler::new(registry)
        .prepend_defaults(!cli.no_defaults)
        .overflow(overflow)
        .compile(&layers)?;

    let output = match &cli.output {
        Some(output) => output.clone(),
        None => settings::default_output(&cli.setting_files[0]),
    };

    if output == Path::new("-") {
        write_csv(&registers, cli.format.into(), io::stdout().lock())?;
    } else {
        let file = File::create(&output)
            .with_context(|| format!("failed to create {}", output.display()))?;
        write_csv(&registers, cli.format.into(), BufWriter::new(file))
            .with_context(|| format!("failed to write {}", output.display()))?;
        info!("wrote {} registers to {}", registers.len(), output.display());
    }

    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("error: {error:#}");
            ExitCode::FAILURE
        }
    }
}
