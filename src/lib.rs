#[macro_use]
extern crate log;
#[macro_use]
extern crate bitflags;

mod commands;
mod consts;
mod cursor;
#[cfg(feature = "display")]
mod display;
mod errors;
mod extract;
mod loader;

pub use crate::commands::{LoadCommand, Section, SectionAttributes, SectionFlags, Segment, SegmentFlags};
pub use crate::consts::*;
pub use crate::cursor::{BoundedReader, ReadStringExt};
pub use crate::errors::{MachError, Result};
pub use crate::extract::{extract_file, plan, ExtractSummary, Extractor, Placement, Selection};
pub use crate::loader::{Arch32, Arch64, AddressWidth, Endian, MachArch, MachCommand, MachFile, MachHeader};
