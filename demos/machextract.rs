#[macro_use]
extern crate log;

use std::fs::{File, OpenOptions};
use std::io::Cursor;
use std::path::PathBuf;
use std::process::exit;

use anyhow::{bail, Context, Result};
use memmap::Mmap;
use structopt::StructOpt;

use mach_extract::{plan, Extractor, MachFile, Selection};

#[derive(Debug, StructOpt)]
#[structopt(
    name = "machextract",
    about = "Copy Mach-O segments and sections into a raw binary, laid out by their addresses"
)]
struct Opt {
    /// Verbose mode (-v, -vv, -vvv)
    #[structopt(short, long, parse(from_occurrences))]
    verbose: u8,

    /// Print the mach header and load commands instead of extracting
    #[structopt(short, long)]
    list: bool,

    /// Extract every section of the segment
    #[structopt(short = "s", long = "segment", number_of_values = 1)]
    segments: Vec<String>,

    /// Extract the section
    #[structopt(short = "S", long = "section", number_of_values = 1)]
    sections: Vec<String>,

    /// Mach-O file to read
    #[structopt(parse(from_os_str))]
    input: PathBuf,

    /// Raw binary to write
    #[structopt(parse(from_os_str), required_unless = "list")]
    output: Option<PathBuf>,
}

fn main() {
    let opt = Opt::from_args();

    init_logger(opt.verbose);

    if let Err(err) = run(&opt) {
        eprintln!("error: {:#}", err);

        exit(1);
    }
}

fn init_logger(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    let mut builder = pretty_env_logger::formatted_builder();

    builder.parse_filters(&std::env::var("RUST_LOG").unwrap_or_else(|_| level.to_owned()));

    let _ = builder.try_init();
}

fn run(opt: &Opt) -> Result<()> {
    let selection = Selection::with_names(opt.segments.iter().cloned(), opt.sections.iter().cloned());

    if !opt.list && selection.is_empty() {
        bail!("at least one segment or section must be specified");
    }

    let file = File::open(&opt.input).with_context(|| format!("open input file {:?}", opt.input))?;
    let mmap = unsafe { Mmap::map(&file) }.with_context(|| format!("map input file {:?}", opt.input))?;
    let mut mach = MachFile::parse(Cursor::new(&mmap[..])).with_context(|| format!("parse {:?}", opt.input))?;

    if opt.list {
        print!("{}", mach.header);

        for (i, cmd) in mach.commands.iter().enumerate() {
            println!("Load command {}", i);
            print!("{}", cmd);
        }

        if !selection.is_empty() {
            println!("Placements");

            for placement in plan(&mach.commands, &selection)? {
                println!("{}", placement);
            }
        }

        return Ok(());
    }

    let path = match opt.output {
        Some(ref path) => path,
        None => bail!("no output file specified"),
    };

    let output = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(path)
        .with_context(|| format!("create output file {:?}", path))?;

    let summary = Extractor::new(output)
        .extract(&mut mach, &selection)
        .with_context(|| format!("extract from {:?}", opt.input))?;

    info!("{}", summary);

    Ok(())
}
