use std::fmt;

use crate::commands::{LoadCommand, Section, Segment};
use crate::consts::*;
use crate::extract::{ExtractSummary, Placement};
use crate::loader::{MachCommand, MachHeader};

impl fmt::Display for MachHeader {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Mach header\n")?;
        write!(
            f,
            "      magic cputype cpusubtype  caps    filetype ncmds sizeofcmds      \
             flags\n"
        )?;
        write!(
            f,
            " 0x{:08x} {:7} {:10}  0x{:02x}  {:10} {:5} {:10} 0x{:08x}\n",
            self.magic,
            self.cputype,
            get_cpu_subtype_type(self.cpusubtype),
            get_cpu_subtype_feature(self.cpusubtype),
            self.filetype,
            self.ncmds,
            self.sizeofcmds,
            self.flags
        )
    }
}

impl fmt::Display for MachCommand {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let MachCommand(ref cmd, cmdsize) = *self;

        match *cmd {
            LoadCommand::Segment(ref segment) | LoadCommand::Segment64(ref segment) => {
                print_segment_command(f, cmd, cmdsize, segment)
            }
            LoadCommand::Command { cmd, .. } => {
                write!(f, "      cmd 0x{:08x}\n", cmd)?;
                write!(f, "  cmdsize {}\n", cmdsize)
            }
        }
    }
}

fn print_segment_command(f: &mut fmt::Formatter, cmd: &LoadCommand, cmdsize: usize, segment: &Segment) -> fmt::Result {
    let is_64bit = cmd.is_64bit();

    write!(f, "      cmd {}\n", cmd.name())?;
    write!(f, "  cmdsize {}\n", cmdsize)?;
    write!(f, "  segname {}\n", segment.segname)?;
    if is_64bit {
        write!(f, "   vmaddr 0x{:016x}\n", segment.vmaddr)?;
        write!(f, "   vmsize 0x{:016x}\n", segment.vmsize)?;
    } else {
        write!(f, "   vmaddr 0x{:08x}\n", segment.vmaddr)?;
        write!(f, "   vmsize 0x{:08x}\n", segment.vmsize)?;
    }
    write!(f, "  fileoff {}\n", segment.fileoff)?;
    write!(f, " filesize {}\n", segment.filesize)?;
    write!(f, "  maxprot 0x{:08x}\n", segment.maxprot)?;
    write!(f, " initprot 0x{:08x}\n", segment.initprot)?;
    write!(f, "   nsects {}\n", segment.sections.len())?;
    write!(f, "    flags 0x{:x}\n", segment.flags.bits())?;

    for section in &segment.sections {
        print_section(f, segment, section, is_64bit)?;
    }

    Ok(())
}

fn print_section(f: &mut fmt::Formatter, segment: &Segment, section: &Section, is_64bit: bool) -> fmt::Result {
    write!(f, "Section\n")?;
    write!(f, "  sectname {}\n", section.sectname)?;
    write!(
        f,
        "   segname {}{}",
        section.segname,
        if segment.segname != section.segname {
            " (does not match segment)\n"
        } else {
            "\n"
        }
    )?;
    if is_64bit {
        write!(f, "      addr 0x{:016x}\n", section.addr)?;
        write!(f, "      size 0x{:016x}\n", section.size)?;
    } else {
        write!(f, "      addr 0x{:08x}\n", section.addr)?;
        write!(f, "      size 0x{:08x}\n", section.size)?;
    }
    write!(f, "    offset {}\n", section.offset)?;
    write!(
        f,
        "     align 2^{} ({})\n",
        section.align,
        1u64.checked_shl(section.align).unwrap_or(0)
    )?;
    write!(f, "    reloff {}\n", section.reloff)?;
    write!(f, "    nreloc {}\n", section.nreloc)?;
    let flags: u32 = section.flags.into();
    write!(f, "     flags 0x{:08x}\n", flags)?;
    write!(
        f,
        " reserved1 {}{}",
        section.reserved1,
        match section.flags.sect_type() {
            S_SYMBOL_STUBS | S_LAZY_SYMBOL_POINTERS | S_LAZY_DYLIB_SYMBOL_POINTERS | S_NON_LAZY_SYMBOL_POINTERS => {
                " (index into indirect symbol table)\n"
            }
            _ => "\n",
        }
    )?;
    write!(
        f,
        " reserved2 {}{}",
        section.reserved2,
        if section.flags.sect_type() == S_SYMBOL_STUBS {
            " (size of stubs)\n"
        } else {
            "\n"
        }
    )
}

impl<'a> fmt::Display for Placement<'a> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "0x{:08x} {:>16},{:<16} addr 0x{:016x} size 0x{:x}",
            self.offset, self.section.segname, self.section.sectname, self.section.addr, self.section.size
        )
    }
}

impl fmt::Display for ExtractSummary {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.origin {
            Some(origin) => write!(
                f,
                "wrote {} sections ({} bytes) rebased at 0x{:x}, skipped {} zero sections",
                self.written, self.end, origin, self.skipped_zero
            ),
            None => write!(f, "nothing to write, skipped {} zero sections", self.skipped_zero),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::{Cursor, Write};
    use std::str;

    use crate::extract::{plan, Selection};
    use crate::loader::MachFile;

    use super::*;

    include!("testdata.rs");

    static HELLO_MACHO_LC: &str = "hello:
Load command 0
      cmd LC_SEGMENT_64
  cmdsize 232
  segname __TEXT
   vmaddr 0x0000000100000000
   vmsize 0x0000000000001000
  fileoff 0
 filesize 4096
  maxprot 0x00000005
 initprot 0x00000005
   nsects 2
    flags 0x0
Section
  sectname __text
   segname __TEXT
      addr 0x0000000100000f50
      size 0x0000000000000030
    offset 3920
     align 2^4 (16)
    reloff 0
    nreloc 0
     flags 0x80000400
 reserved1 0
 reserved2 0
Section
  sectname __cstring
   segname __TEXT
      addr 0x0000000100000f80
      size 0x0000000000000020
    offset 3968
     align 2^0 (1)
    reloff 0
    nreloc 0
     flags 0x00000002
 reserved1 0
 reserved2 0
Load command 1
      cmd 0x0000001b
  cmdsize 24
";

    macro_rules! assert_nodiff {
        ($left:expr, $right:expr) => {{
            let mut w = Vec::new();
            let mut diffs = 0;

            for diff in diff::lines($left, $right) {
                match diff {
                    diff::Result::Left(l) => {
                        diffs += 1;
                        write!(w, "-{}\n", l).unwrap()
                    }
                    diff::Result::Both(_, _) => {}
                    diff::Result::Right(r) => {
                        diffs += 1;
                        write!(w, "+{}\n", r).unwrap()
                    }
                }
            }

            if diffs > 0 {
                info!("found {} diffs:\n{}", diffs, String::from_utf8(w).unwrap());
            }

            assert_eq!($left, $right);
        }};
    }

    #[test]
    fn test_display_mach_header() {
        let data = hello_macho_64();
        let file = MachFile::parse(Cursor::new(&data[..])).unwrap();

        assert_eq!(
            file.header.to_string(),
            "Mach header
      magic cputype cpusubtype  caps    filetype ncmds sizeofcmds      flags
 0xfeedfacf 16777223          3  0x00           2     2        256 0x00200085
"
        );
    }

    #[test]
    fn test_display_load_commands() {
        let _ = pretty_env_logger::try_init();

        let data = hello_macho_64();
        let file = MachFile::parse(Cursor::new(&data[..])).unwrap();
        let mut w = Vec::<u8>::new();

        write!(w, "hello:\n").unwrap();

        for (i, cmd) in file.commands.iter().enumerate() {
            write!(w, "Load command {}\n", i).unwrap();
            write!(w, "{}", cmd).unwrap();
        }

        let dump = str::from_utf8(w.as_slice()).unwrap();

        assert_nodiff!(dump, HELLO_MACHO_LC);
    }

    #[test]
    fn test_display_placements() {
        let data = hello_macho_64();
        let file = MachFile::parse(Cursor::new(&data[..])).unwrap();
        let placements = plan(&file.commands, &Selection::new().section("__cstring")).unwrap();

        assert_eq!(
            placements[0].to_string(),
            "0x00000000           __TEXT,__cstring        addr 0x0000000100000f80 size 0x20"
        );
    }

    #[test]
    fn test_display_summary() {
        let summary = ExtractSummary {
            origin: Some(0x1000),
            written: 2,
            skipped_zero: 1,
            end: 0x28,
        };

        assert_eq!(
            summary.to_string(),
            "wrote 2 sections (40 bytes) rebased at 0x1000, skipped 1 zero sections"
        );
        assert_eq!(
            ExtractSummary::default().to_string(),
            "nothing to write, skipped 0 zero sections"
        );
    }
}
