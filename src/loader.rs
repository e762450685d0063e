use std::fmt;
use std::io::{Read, Seek};

use byteorder::{BigEndian, ByteOrder, LittleEndian};

use crate::commands::{LoadCommand, Section, Segment};
use crate::consts::*;
use crate::cursor::BoundedReader;
use crate::errors::*;

/// The address width of a Mach-O file, fixed by its magic.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum AddressWidth {
    Bits32,
    Bits64,
}

/// The byte order of every field following the magic.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Endian {
    Little,
    Big,
}

impl fmt::Display for Endian {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Endian::Little => write!(f, "little endian"),
            Endian::Big => write!(f, "big endian"),
        }
    }
}

pub trait MachArch {
    const WIDTH: AddressWidth;

    /// size of the header following the magic
    const HEADER_SIZE: usize;

    fn parse_mach_header<O: ByteOrder, R: Read + Seek>(magic: u32, buf: &mut BoundedReader<R>) -> Result<MachHeader>;
}

pub enum Arch32 {}
pub enum Arch64 {}

impl MachArch for Arch32 {
    const WIDTH: AddressWidth = AddressWidth::Bits32;
    const HEADER_SIZE: usize = MACH_HEADER_SIZE;

    fn parse_mach_header<O: ByteOrder, R: Read + Seek>(magic: u32, buf: &mut BoundedReader<R>) -> Result<MachHeader> {
        buf.ensure(Self::HEADER_SIZE, MachError::TruncatedHeader)?;

        let header = MachHeader {
            magic,
            cputype: buf.read_i32::<O>()?,
            cpusubtype: buf.read_i32::<O>()?,
            filetype: buf.read_u32::<O>()?,
            ncmds: buf.read_u32::<O>()?,
            sizeofcmds: buf.read_u32::<O>()?,
            flags: buf.read_u32::<O>()?,
        };

        Ok(header)
    }
}

impl MachArch for Arch64 {
    const WIDTH: AddressWidth = AddressWidth::Bits64;
    const HEADER_SIZE: usize = MACH_HEADER_64_SIZE;

    fn parse_mach_header<O: ByteOrder, R: Read + Seek>(magic: u32, buf: &mut BoundedReader<R>) -> Result<MachHeader> {
        buf.ensure(Self::HEADER_SIZE, MachError::TruncatedHeader)?;

        let header = MachHeader {
            magic,
            cputype: buf.read_i32::<O>()?,
            cpusubtype: buf.read_i32::<O>()?,
            filetype: buf.read_u32::<O>()?,
            ncmds: buf.read_u32::<O>()?,
            sizeofcmds: buf.read_u32::<O>()?,
            flags: buf.read_u32::<O>()?,
        };

        // reserved
        buf.read_u32::<O>()?;

        Ok(header)
    }
}

/// The mach header appears at the very beginning of the object file.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct MachHeader {
    /// mach magic number identifier
    pub magic: u32,
    /// cpu specifier
    pub cputype: cpu_type_t,
    /// machine specifier
    pub cpusubtype: cpu_subtype_t,
    /// type of file
    pub filetype: u32,
    /// number of load commands
    pub ncmds: u32,
    /// the size of all the load commands
    pub sizeofcmds: u32,
    /// flags
    pub flags: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MachCommand(pub LoadCommand, pub usize);

impl MachCommand {
    pub fn command(&self) -> &LoadCommand {
        &self.0
    }

    pub fn cmdsize(&self) -> usize {
        self.1
    }
}

/// A parsed Mach-O file which owns its byte source.
///
/// The source stays with the file so section contents can be read after
/// parsing, see `Section::read` and `Segment::read`.
#[derive(Debug)]
pub struct MachFile<R> {
    pub header: MachHeader,
    pub width: AddressWidth,
    pub endian: Endian,
    pub commands: Vec<MachCommand>,
    reader: BoundedReader<R>,
}

impl<R: Read + Seek> MachFile<R> {
    pub fn parse(source: R) -> Result<MachFile<R>> {
        let mut buf = BoundedReader::new(source)?;

        buf.ensure(4, MachError::TruncatedHeader)?;

        let mut raw = [0u8; 4];

        raw.copy_from_slice(&buf.read_bytes(4)?);

        let magic = LittleEndian::read_u32(&raw);

        match magic {
            MH_MAGIC => Self::parse_mach_file::<Arch32, LittleEndian>(magic, buf, Endian::Little),
            MH_CIGAM => Self::parse_mach_file::<Arch32, BigEndian>(magic, buf, Endian::Big),
            MH_MAGIC_64 => Self::parse_mach_file::<Arch64, LittleEndian>(magic, buf, Endian::Little),
            MH_CIGAM_64 => Self::parse_mach_file::<Arch64, BigEndian>(magic, buf, Endian::Big),
            FAT_MAGIC | FAT_CIGAM => Err(MachError::UnsupportedFormat(magic)),
            _ => Err(MachError::InvalidMagic(raw)),
        }
    }

    fn parse_mach_file<A: MachArch, O: ByteOrder>(
        magic: u32,
        mut buf: BoundedReader<R>,
        endian: Endian,
    ) -> Result<MachFile<R>> {
        let header = A::parse_mach_header::<O, R>(magic, &mut buf)?;

        debug!("parsed mach-o file header ({:?}, {}): {:?}", A::WIDTH, endian, header);

        // ncmds is untrusted, the list grows with what actually parses
        let mut commands = Vec::new();

        for _ in 0..header.ncmds {
            let (cmd, cmdsize) = LoadCommand::parse::<O, R>(&mut buf)?;

            commands.push(MachCommand(cmd, cmdsize));
        }

        debug!("parsed {} load commands", commands.len());

        Ok(MachFile {
            header,
            width: A::WIDTH,
            endian,
            commands,
            reader: buf,
        })
    }

    pub fn is_64bit(&self) -> bool {
        self.width == AddressWidth::Bits64
    }

    pub fn is_bigend(&self) -> bool {
        self.endian == Endian::Big
    }

    /// The segments in load command order.
    pub fn segments(&self) -> impl Iterator<Item = &Segment> {
        self.commands.iter().filter_map(|MachCommand(cmd, _)| cmd.segment())
    }

    /// Every section of every segment, in file order.
    pub fn sections(&self) -> impl Iterator<Item = &Section> {
        self.segments().flat_map(|segment| segment.sections.iter())
    }

    pub fn find_segment(&self, segname: &str) -> Option<&Segment> {
        self.segments().find(|segment| segment.segname == segname)
    }

    /// Find a section by name, optionally restricted to the segment holding it.
    pub fn find_section(&self, segname: Option<&str>, sectname: &str) -> Option<&Section> {
        self.segments()
            .filter(|segment| segname.map_or(true, |name| segment.segname == name))
            .flat_map(|segment| segment.sections.iter())
            .find(|section| section.sectname == sectname)
    }

    /// Borrow the load commands together with the reader they were parsed from.
    pub fn split_mut(&mut self) -> (&[MachCommand], &mut BoundedReader<R>) {
        (&self.commands, &mut self.reader)
    }

    pub fn reader(&mut self) -> &mut BoundedReader<R> {
        &mut self.reader
    }

    pub fn into_inner(self) -> R {
        self.reader.into_inner()
    }
}
