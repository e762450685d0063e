use std::convert::TryFrom;
use std::io::{Read, Seek};

use byteorder::ByteOrder;

use crate::consts::*;
use crate::cursor::BoundedReader;
use crate::errors::*;

bitflags! {
    /// Constants for the flags field of the segment_command
    pub struct SegmentFlags: u32 {
        /// the file contents for this segment is for the high part of the VM space,
        /// the low part is zero filled (for stacks in core files)
        const HIGHVM = SG_HIGHVM;
        /// this segment is the VM that is allocated by a fixed VM library,
        /// for overlap checking in the link editor
        const FVMLIB = SG_FVMLIB;
        /// this segment has nothing that was relocated in it and nothing relocated to it,
        /// that is it maybe safely replaced without relocation
        const NORELOC = SG_NORELOC;
        /// This segment is protected.
        const PROTECTED_VERSION_1 = SG_PROTECTED_VERSION_1;
    }
}

bitflags! {
    /// Constants for the section attributes part of the flags field of a section structure.
    pub struct SectionAttributes: u32 {
        /// User setable attributes
        const USR = SECTION_ATTRIBUTES_USR;
        /// section contains only true machine instructions
        const PURE_INSTRUCTIONS = S_ATTR_PURE_INSTRUCTIONS;
        /// section contains coalesced symbols that are not to be in a ranlib table of contents
        const NO_TOC = S_ATTR_NO_TOC;
        /// ok to strip static symbols in this section in files with the MH_DYLDLINK flag
        const STRIP_STATIC_SYMS = S_ATTR_STRIP_STATIC_SYMS;
        /// no dead stripping
        const NO_DEAD_STRIP = S_ATTR_NO_DEAD_STRIP;
        /// blocks are live if they reference live blocks
        const LIVE_SUPPORT = S_ATTR_LIVE_SUPPORT;
        /// Used with i386 code stubs written on by dyld
        const SELF_MODIFYING_CODE = S_ATTR_SELF_MODIFYING_CODE;
        /// a debug section
        const DEBUG = S_ATTR_DEBUG;
        /// system setable attributes
        const SYS = SECTION_ATTRIBUTES_SYS;
        /// section contains some machine instructions
        const SOME_INSTRUCTIONS = S_ATTR_SOME_INSTRUCTIONS;
        /// section has external relocation entries
        const EXT_RELOC = S_ATTR_EXT_RELOC;
        /// section has local relocation entries
        const LOC_RELOC = S_ATTR_LOC_RELOC;
    }
}

/// The load commands directly follow the mach header.
///
/// Only the segment commands are interpreted, everything else is kept as
/// its id and size so the command stream can be walked.
#[derive(Debug, Clone, PartialEq)]
pub enum LoadCommand {
    /// The segment load command indicates that a part of this file is to be
    /// mapped into the task's address space.
    ///
    /// The size of this segment in memory, vmsize, maybe equal to or
    /// larger than the amount to map from this file, filesize.
    /// The file is mapped starting at fileoff to the beginning of
    /// the segment in memory, vmaddr.  The rest of the memory of the segment,
    /// if any, is allocated zero fill on demand.  If the segment has sections
    /// then the section structures directly follow the segment command and
    /// their size is reflected in cmdsize.
    Segment(Segment),
    /// The 64-bit segment load command indicates that a part of this file is to be
    /// mapped into a 64-bit task's address space.
    Segment64(Segment),
    /// Any other command, skipped without looking at its payload.
    Command {
        /// type of load command
        cmd: u32,
        /// total size of command in bytes
        cmdsize: u32,
    },
}

impl LoadCommand {
    /// Parse one load command at the current position.
    ///
    /// On success the reader sits right after the command, `cmdsize` bytes
    /// from where it started, whatever the command body held.
    pub fn parse<O: ByteOrder, R: Read + Seek>(buf: &mut BoundedReader<R>) -> Result<(LoadCommand, usize)> {
        buf.ensure(LOAD_COMMAND_HEADER_SIZE, MachError::TruncatedLoadCommand)?;

        let begin = buf.position()?;
        let cmd = buf.read_u32::<O>()?;
        let cmdsize = buf.read_u32::<O>()?;

        if begin + u64::from(cmdsize) > buf.len() {
            return Err(MachError::TruncatedLoadCommand(cmdsize as usize, begin));
        }
        if (cmdsize as usize) < LOAD_COMMAND_HEADER_SIZE {
            return Err(MachError::InvalidLoadCommandSize(cmdsize));
        }

        let body = cmdsize as usize - LOAD_COMMAND_HEADER_SIZE;

        trace!("parsing load command 0x{:x} with {} bytes at 0x{:x}", cmd, cmdsize, begin);

        let cmd = match cmd {
            LC_SEGMENT => LoadCommand::Segment(Segment::parse_segment::<O, R>(buf, body)?),
            LC_SEGMENT_64 => LoadCommand::Segment64(Segment::parse_segment64::<O, R>(buf, body)?),
            _ => LoadCommand::Command { cmd, cmdsize },
        };

        buf.seek_to(begin + u64::from(cmdsize))?;

        Ok((cmd, cmdsize as usize))
    }

    pub fn cmd(&self) -> u32 {
        match *self {
            LoadCommand::Segment(_) => LC_SEGMENT,
            LoadCommand::Segment64(_) => LC_SEGMENT_64,
            LoadCommand::Command { cmd, .. } => cmd,
        }
    }

    pub fn name(&self) -> &'static str {
        match *self {
            LoadCommand::Segment(_) => "LC_SEGMENT",
            LoadCommand::Segment64(_) => "LC_SEGMENT_64",
            LoadCommand::Command { .. } => "LC_COMMAND",
        }
    }

    pub fn segment(&self) -> Option<&Segment> {
        match *self {
            LoadCommand::Segment(ref segment) | LoadCommand::Segment64(ref segment) => Some(segment),
            LoadCommand::Command { .. } => None,
        }
    }

    pub fn is_64bit(&self) -> bool {
        match *self {
            LoadCommand::Segment64(_) => true,
            _ => false,
        }
    }
}

/// A named region of the file mapped into the address space, made up of zero or more sections.
#[derive(Debug, Clone, PartialEq)]
pub struct Segment {
    /// segment name
    pub segname: String,
    /// memory address of this segment
    pub vmaddr: u64,
    /// memory size of this segment
    pub vmsize: u64,
    /// file offset of this segment
    pub fileoff: u64,
    /// amount to map from the file
    pub filesize: u64,
    /// maximum VM protection
    pub maxprot: vm_prot_t,
    /// initial VM protection
    pub initprot: vm_prot_t,
    /// number of sections in segment
    pub nsects: u32,
    /// flags
    pub flags: SegmentFlags,
    /// sections
    pub sections: Vec<Section>,
}

impl Segment {
    fn parse_segment<O: ByteOrder, R: Read + Seek>(buf: &mut BoundedReader<R>, budget: usize) -> Result<Segment> {
        if budget < SEGMENT_COMMAND_SIZE {
            return Err(MachError::TruncatedSegmentHeader(SEGMENT_COMMAND_SIZE, budget));
        }

        let mut segment = Segment {
            segname: buf.read_fixed_size_string(NAME_SIZE)?,
            vmaddr: u64::from(buf.read_u32::<O>()?),
            vmsize: u64::from(buf.read_u32::<O>()?),
            fileoff: u64::from(buf.read_u32::<O>()?),
            filesize: u64::from(buf.read_u32::<O>()?),
            maxprot: buf.read_i32::<O>()?,
            initprot: buf.read_i32::<O>()?,
            nsects: buf.read_u32::<O>()?,
            flags: SegmentFlags::from_bits_truncate(buf.read_u32::<O>()?),
            sections: Vec::new(),
        };

        let mut budget = budget - SEGMENT_COMMAND_SIZE;

        for _ in 0..segment.nsects {
            if budget < SECTION_SIZE {
                return Err(MachError::TruncatedSectionHeader(SECTION_SIZE, budget));
            }

            segment.sections.push(Section::parse_section::<O, R>(buf)?);

            budget -= SECTION_SIZE;
        }

        segment.check_section_labels();

        Ok(segment)
    }

    fn parse_segment64<O: ByteOrder, R: Read + Seek>(buf: &mut BoundedReader<R>, budget: usize) -> Result<Segment> {
        if budget < SEGMENT_COMMAND_64_SIZE {
            return Err(MachError::TruncatedSegmentHeader(SEGMENT_COMMAND_64_SIZE, budget));
        }

        let mut segment = Segment {
            segname: buf.read_fixed_size_string(NAME_SIZE)?,
            vmaddr: buf.read_u64::<O>()?,
            vmsize: buf.read_u64::<O>()?,
            fileoff: buf.read_u64::<O>()?,
            filesize: buf.read_u64::<O>()?,
            maxprot: buf.read_i32::<O>()?,
            initprot: buf.read_i32::<O>()?,
            nsects: buf.read_u32::<O>()?,
            flags: SegmentFlags::from_bits_truncate(buf.read_u32::<O>()?),
            sections: Vec::new(),
        };

        let mut budget = budget - SEGMENT_COMMAND_64_SIZE;

        for _ in 0..segment.nsects {
            if budget < SECTION_64_SIZE {
                return Err(MachError::TruncatedSectionHeader(SECTION_64_SIZE, budget));
            }

            segment.sections.push(Section::parse_section64::<O, R>(buf)?);

            budget -= SECTION_64_SIZE;
        }

        segment.check_section_labels();

        Ok(segment)
    }

    // The section's segname is only a label, a mismatch is reported but kept.
    fn check_section_labels(&self) {
        for section in &self.sections {
            if section.segname != self.segname {
                warn!(
                    "section `{}` claims segment `{}` but belongs to `{}`",
                    section.sectname, section.segname, self.segname
                );
            }
        }
    }

    /// Read the file content of this segment.
    pub fn read<R: Read + Seek>(&self, buf: &mut BoundedReader<R>) -> Result<Vec<u8>> {
        buf.read_region(&self.segname, self.fileoff, self.filesize)
    }
}

/// The flags field of a section structure is separated into two parts a section
/// type and section attributes.
///
/// The section types are mutually exclusive (it can only have one type)
/// but the section attributes are not (it may have more than one attribute).
///
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub struct SectionFlags(pub u32);

impl SectionFlags {
    pub fn sect_type(self) -> u32 {
        self.0 & SECTION_TYPE
    }

    pub fn sect_attrs(self) -> SectionAttributes {
        SectionAttributes::from_bits_truncate(self.0 & SECTION_ATTRIBUTES)
    }

    pub fn is_zerofill(self) -> bool {
        self.sect_type() == S_ZEROFILL
    }

    pub fn type_name(self) -> Option<&'static str> {
        get_section_type_name(self.sect_type())
    }
}

impl From<SectionFlags> for u32 {
    fn from(flags: SectionFlags) -> u32 {
        flags.0
    }
}

/// A section is a named sub-region of a segment with its own address, size and file offset.
///
/// The zero fill sections have no file content, their bytes only exist in memory.
#[derive(Debug, Clone, PartialEq)]
pub struct Section {
    /// name of this section
    pub sectname: String,
    /// segment this section goes in
    pub segname: String,
    /// memory address of this section
    pub addr: u64,
    /// size in bytes of this section
    pub size: u64,
    /// file offset of this section
    pub offset: u32,
    /// section alignment (power of 2)
    pub align: u32,
    /// file offset of relocation entries
    pub reloff: u32,
    /// number of relocation entries
    pub nreloc: u32,
    // flags (section type and attributes)
    pub flags: SectionFlags,
    /// reserved (for offset or index)
    pub reserved1: u32,
    /// reserved (for count or sizeof)
    pub reserved2: u32,
    /// reserved
    pub reserved3: u32,
}

impl Section {
    fn parse_section<O: ByteOrder, R: Read + Seek>(buf: &mut BoundedReader<R>) -> Result<Section> {
        let section = Section {
            sectname: buf.read_fixed_size_string(NAME_SIZE)?,
            segname: buf.read_fixed_size_string(NAME_SIZE)?,
            addr: u64::from(buf.read_u32::<O>()?),
            size: u64::from(buf.read_u32::<O>()?),
            offset: buf.read_u32::<O>()?,
            align: buf.read_u32::<O>()?,
            reloff: buf.read_u32::<O>()?,
            nreloc: buf.read_u32::<O>()?,
            flags: SectionFlags(buf.read_u32::<O>()?),
            reserved1: buf.read_u32::<O>()?,
            reserved2: buf.read_u32::<O>()?,
            reserved3: 0,
        };

        trace!("parsed section {},{} at 0x{:x}", section.segname, section.sectname, section.addr);

        Ok(section)
    }

    fn parse_section64<O: ByteOrder, R: Read + Seek>(buf: &mut BoundedReader<R>) -> Result<Section> {
        let section = Section {
            sectname: buf.read_fixed_size_string(NAME_SIZE)?,
            segname: buf.read_fixed_size_string(NAME_SIZE)?,
            addr: buf.read_u64::<O>()?,
            size: buf.read_u64::<O>()?,
            offset: buf.read_u32::<O>()?,
            align: buf.read_u32::<O>()?,
            reloff: buf.read_u32::<O>()?,
            nreloc: buf.read_u32::<O>()?,
            flags: SectionFlags(buf.read_u32::<O>()?),
            reserved1: buf.read_u32::<O>()?,
            reserved2: buf.read_u32::<O>()?,
            reserved3: buf.read_u32::<O>()?,
        };

        trace!("parsed section {},{} at 0x{:x}", section.segname, section.sectname, section.addr);

        Ok(section)
    }

    /// The section has no file content, either it is empty or zero filled on demand.
    pub fn is_zero(&self) -> bool {
        self.size == 0 || self.flags.is_zerofill()
    }

    /// Read the content of this section, zero sections never touch the file.
    pub fn read<R: Read + Seek>(&self, buf: &mut BoundedReader<R>) -> Result<Vec<u8>> {
        if self.is_zero() {
            let too_large = || MachError::OutOfRange {
                name: self.sectname.clone(),
                offset: u64::from(self.offset),
                size: self.size,
                len: buf.len(),
            };
            let size = usize::try_from(self.size).map_err(|_| too_large())?;
            let mut data = Vec::new();

            data.try_reserve_exact(size).map_err(|_| too_large())?;
            data.resize(size, 0);

            Ok(data)
        } else {
            buf.read_region(&self.sectname, u64::from(self.offset), self.size)
        }
    }
}

#[cfg(test)]
pub mod tests {
    use std::io::Cursor;

    use byteorder::{BigEndian, LittleEndian};

    use super::*;

    include!("testdata.rs");

    macro_rules! parse_command {
        ($buf:expr) => {{
            let data: &[u8] = &$buf[..];
            let mut cur = BoundedReader::new(Cursor::new(data)).unwrap();

            LoadCommand::parse::<LittleEndian, _>(&mut cur)
        }};
    }

    fn section(flags: u32, offset: u32, size: u64) -> Section {
        Section {
            sectname: "__bss".to_owned(),
            segname: SEG_DATA.to_owned(),
            addr: 0x2000,
            size,
            offset,
            align: 0,
            reloff: 0,
            nreloc: 0,
            flags: SectionFlags(flags),
            reserved1: 0,
            reserved2: 0,
            reserved3: 0,
        }
    }

    #[test]
    fn test_parse_segment64() {
        let mut cur = BoundedReader::new(Cursor::new(&LC_SEGMENT_64_TEXT_DATA[..])).unwrap();

        let (cmd, cmdsize) = LoadCommand::parse::<LittleEndian, _>(&mut cur).unwrap();

        assert_eq!(cmdsize, 232);
        assert_eq!(cmd.cmd(), LC_SEGMENT_64);
        assert_eq!(cur.position().unwrap(), 232);

        let segment = cmd.segment().unwrap();

        assert_eq!(segment.segname, SEG_TEXT);
        assert_eq!(segment.vmaddr, 0x100000000);
        assert_eq!(segment.vmsize, 0x1000);
        assert_eq!(segment.fileoff, 0);
        assert_eq!(segment.filesize, 0x1000);
        assert_eq!(segment.maxprot, VM_PROT_READ | VM_PROT_EXECUTE);
        assert_eq!(segment.initprot, VM_PROT_READ | VM_PROT_EXECUTE);
        assert!(segment.flags.is_empty());
        assert_eq!(
            segment.sections.iter().map(|s| s.sectname.as_str()).collect::<Vec<_>>(),
            vec![SECT_TEXT, "__cstring"]
        );

        let text = &segment.sections[0];

        assert_eq!(text.segname, SEG_TEXT);
        assert_eq!(text.addr, 0x100000f50);
        assert_eq!(text.size, 0x30);
        assert_eq!(text.offset, 0xf50);
        assert_eq!(text.align, 4);
        assert_eq!(text.flags.sect_type(), S_REGULAR);
        assert_eq!(
            text.flags.sect_attrs(),
            SectionAttributes::PURE_INSTRUCTIONS | SectionAttributes::SOME_INSTRUCTIONS
        );

        let cstring = &segment.sections[1];

        assert_eq!(cstring.flags.sect_type(), S_CSTRING_LITERALS);
        assert_eq!(cstring.flags.type_name(), Some("S_CSTRING_LITERALS"));
    }

    #[test]
    fn test_parse_segment32_big_endian() {
        let mut cur = BoundedReader::new(Cursor::new(&LC_SEGMENT_DATA_BE[..])).unwrap();

        let (cmd, cmdsize) = LoadCommand::parse::<BigEndian, _>(&mut cur).unwrap();

        assert_eq!(cmdsize, 124);
        assert_eq!(cmd.name(), "LC_SEGMENT");
        assert!(!cmd.is_64bit());

        let segment = cmd.segment().unwrap();

        assert_eq!(segment.segname, SEG_DATA);
        assert_eq!(segment.vmaddr, 0x3000);
        assert_eq!(segment.vmsize, 0x1000);
        assert_eq!(segment.fileoff, 0x2000);
        assert_eq!(segment.filesize, 0x800);
        assert_eq!(segment.maxprot, 7);
        assert_eq!(segment.initprot, 3);
        assert_eq!(segment.nsects, 1);

        let bss = &segment.sections[0];

        assert_eq!(bss.sectname, SECT_BSS);
        assert_eq!(bss.addr, 0x3800);
        assert_eq!(bss.size, 0x40);
        assert!(bss.flags.is_zerofill());
        assert!(bss.is_zero());
    }

    #[test]
    fn test_skip_unknown_command() {
        let (cmd, cmdsize) = parse_command!(LC_UUID_DATA).unwrap();

        assert_eq!(cmd, LoadCommand::Command { cmd: 0x1b, cmdsize: 24 });
        assert_eq!(cmdsize, 24);
        assert_eq!(cmd.segment(), None);
    }

    #[test]
    fn test_invalid_command_size() {
        match parse_command!([0x1b, 0, 0, 0, 4, 0, 0, 0]) {
            Err(MachError::InvalidLoadCommandSize(4)) => {}
            res => panic!("unexpected result: {:?}", res),
        }
    }

    #[test]
    fn test_truncated_command() {
        match parse_command!([0x1b, 0, 0, 0, 24, 0]) {
            Err(MachError::TruncatedLoadCommand(8, 0)) => {}
            res => panic!("unexpected result: {:?}", res),
        }

        match parse_command!(LC_UUID_DATA[..20]) {
            Err(MachError::TruncatedLoadCommand(24, 0)) => {}
            res => panic!("unexpected result: {:?}", res),
        }
    }

    #[test]
    fn test_truncated_segment_header() {
        // a LC_SEGMENT_64 claiming only 16 bytes of body
        let mut data = vec![0x19, 0, 0, 0, 24, 0, 0, 0];

        data.extend_from_slice(&[0; 16]);

        match parse_command!(data) {
            Err(MachError::TruncatedSegmentHeader(64, 16)) => {}
            res => panic!("unexpected result: {:?}", res),
        }
    }

    #[test]
    fn test_truncated_section_header() {
        // the __TEXT segment declares two sections but its cmdsize only covers one
        let mut data = LC_SEGMENT_64_TEXT_DATA[..152].to_vec();

        data[4] = 152;

        match parse_command!(data) {
            Err(MachError::TruncatedSectionHeader(80, 0)) => {}
            res => panic!("unexpected result: {:?}", res),
        }
    }

    #[test]
    fn test_read_zerofill_section() {
        let data = [0xffu8; 16];
        let mut cur = BoundedReader::new(Cursor::new(&data[..])).unwrap();

        // nonsense offset, never looked at
        let bss = section(S_ZEROFILL | S_ATTR_NO_DEAD_STRIP, 0xdead_beef, 0x20);

        assert_eq!(bss.read(&mut cur).unwrap(), vec![0; 0x20]);

        let empty = section(S_REGULAR, 0xdead_beef, 0);

        assert_eq!(empty.read(&mut cur).unwrap(), Vec::<u8>::new());
    }

    #[test]
    fn test_read_oversized_zerofill_section() {
        let data = [0xffu8; 16];
        let mut cur = BoundedReader::new(Cursor::new(&data[..])).unwrap();

        let bss = section(S_ZEROFILL, 0, u64::max_value());

        match bss.read(&mut cur) {
            Err(MachError::OutOfRange {
                ref name,
                offset: 0,
                size,
                len: 16,
            }) if name == "__bss" && size == u64::max_value() => {}
            res => panic!("unexpected result: {:?}", res),
        }
    }

    #[test]
    fn test_read_section_boundary() {
        let data: Vec<u8> = (0..32).collect();
        let mut cur = BoundedReader::new(Cursor::new(&data[..])).unwrap();

        assert_eq!(section(S_REGULAR, 28, 3).read(&mut cur).unwrap(), vec![28, 29, 30]);

        match section(S_REGULAR, 28, 4).read(&mut cur) {
            Err(MachError::OutOfRange { ref name, offset: 28, size: 4, len: 32 }) if name == "__bss" => {}
            res => panic!("unexpected result: {:?}", res),
        }
    }

    #[test]
    fn test_read_segment() {
        let data: Vec<u8> = (0..32).collect();
        let mut cur = BoundedReader::new(Cursor::new(&data[..])).unwrap();
        let mut segment = Segment {
            segname: SEG_TEXT.to_owned(),
            vmaddr: 0,
            vmsize: 0x1000,
            fileoff: 8,
            filesize: 4,
            maxprot: 5,
            initprot: 5,
            nsects: 0,
            flags: SegmentFlags::empty(),
            sections: vec![],
        };

        assert_eq!(segment.read(&mut cur).unwrap(), vec![8, 9, 10, 11]);

        segment.filesize = 24;

        assert!(segment.read(&mut cur).is_err());

        segment.filesize = 23;

        assert_eq!(segment.read(&mut cur).unwrap().len(), 23);
    }
}
