use std::collections::HashSet;
use std::io::{Read, Seek, SeekFrom, Write};

use crate::commands::Section;
use crate::errors::*;
use crate::loader::{MachCommand, MachFile};

/// The segment and section names requested for extraction.
///
/// A section is selected when its own name is requested, or when the segment
/// name it is labelled with is.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Selection {
    segments: HashSet<String>,
    sections: HashSet<String>,
}

impl Selection {
    pub fn new() -> Self {
        Selection::default()
    }

    pub fn with_names<I, J, S, T>(segments: I, sections: J) -> Self
    where
        I: IntoIterator<Item = S>,
        J: IntoIterator<Item = T>,
        S: Into<String>,
        T: Into<String>,
    {
        Selection {
            segments: segments.into_iter().map(Into::into).collect(),
            sections: sections.into_iter().map(Into::into).collect(),
        }
    }

    pub fn segment<S: Into<String>>(mut self, segname: S) -> Self {
        self.segments.insert(segname.into());
        self
    }

    pub fn section<S: Into<String>>(mut self, sectname: S) -> Self {
        self.sections.insert(sectname.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty() && self.sections.is_empty()
    }

    pub fn matches(&self, section: &Section) -> bool {
        self.sections.contains(&section.sectname) || self.segments.contains(&section.segname)
    }
}

/// Where a selected section lands in the output.
#[derive(Debug, Clone, PartialEq)]
pub struct Placement<'a> {
    /// output offset, the section address minus the rebase origin
    pub offset: u64,
    pub section: &'a Section,
}

/// Compute the output placement of every selected section with file content.
///
/// Sections are visited segment by segment in load command order, never
/// sorted by address. The first selected non-zero section fixes the rebase
/// origin; zero sections are dropped before that. A section below the origin
/// fails the whole plan with `InvalidPlacement`.
pub fn plan<'a>(commands: &'a [MachCommand], selection: &Selection) -> Result<Vec<Placement<'a>>> {
    let mut origin = None;
    let mut placements = Vec::new();

    let selected = commands
        .iter()
        .filter_map(|MachCommand(cmd, _)| cmd.segment())
        .flat_map(|segment| segment.sections.iter())
        .filter(|section| selection.matches(section));

    for section in selected {
        if section.is_zero() {
            trace!("skip zero section {},{}", section.segname, section.sectname);

            continue;
        }

        let base = *origin.get_or_insert_with(|| {
            debug!("rebase origin 0x{:x} from {},{}", section.addr, section.segname, section.sectname);

            section.addr
        });

        if section.addr < base {
            return Err(MachError::InvalidPlacement {
                sectname: section.sectname.clone(),
                addr: section.addr,
                origin: base,
            });
        }

        placements.push(Placement {
            offset: section.addr - base,
            section,
        });
    }

    debug!("selected {} sections", placements.len());

    Ok(placements)
}

/// The outcome of one extraction run.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ExtractSummary {
    /// rebase origin, `None` when nothing with file content was selected
    pub origin: Option<u64>,
    /// number of sections written
    pub written: usize,
    /// number of selected sections without file content
    pub skipped_zero: usize,
    /// end of the furthest write in the output
    pub end: u64,
}

/// Writes selected sections into an output at their rebased offsets.
///
/// The output is only ever written with seek then write, ranges that no
/// section covers are left as holes.
pub struct Extractor<W> {
    output: W,
}

impl<W: Write + Seek> Extractor<W> {
    pub fn new(output: W) -> Self {
        Extractor { output }
    }

    pub fn extract<R: Read + Seek>(&mut self, file: &mut MachFile<R>, selection: &Selection) -> Result<ExtractSummary> {
        if selection.is_empty() {
            return Err(MachError::EmptySelection);
        }

        let (commands, reader) = file.split_mut();
        let placements = plan(commands, selection)?;

        let mut summary = ExtractSummary {
            origin: placements.first().map(|p| p.section.addr),
            skipped_zero: commands
                .iter()
                .filter_map(|MachCommand(cmd, _)| cmd.segment())
                .flat_map(|segment| segment.sections.iter())
                .filter(|section| selection.matches(section) && section.is_zero())
                .count(),
            ..Default::default()
        };

        for Placement { offset, section } in placements {
            let data = section.read(reader)?;

            trace!(
                "write {},{} with {} bytes at 0x{:x}",
                section.segname,
                section.sectname,
                data.len(),
                offset
            );

            self.output.seek(SeekFrom::Start(offset))?;
            self.output.write_all(&data)?;

            summary.written += 1;
            summary.end = summary.end.max(offset + data.len() as u64);
        }

        self.output.flush()?;

        debug!("extracted {:?}", summary);

        Ok(summary)
    }

    pub fn into_inner(self) -> W {
        self.output
    }
}

/// Parse `input` and extract the selected sections into `output`.
///
/// The selection is checked before the input is looked at.
pub fn extract_file<R, W>(input: R, selection: &Selection, output: W) -> Result<ExtractSummary>
where
    R: Read + Seek,
    W: Write + Seek,
{
    if selection.is_empty() {
        return Err(MachError::EmptySelection);
    }

    let mut file = MachFile::parse(input)?;

    Extractor::new(output).extract(&mut file, selection)
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;
    use crate::commands::{LoadCommand, SectionFlags, Segment, SegmentFlags};
    use crate::consts::*;

    include!("testdata.rs");

    fn section(segname: &str, sectname: &str, addr: u64, size: u64, flags: u32) -> Section {
        Section {
            sectname: sectname.to_owned(),
            segname: segname.to_owned(),
            addr,
            size,
            offset: 0,
            align: 0,
            reloff: 0,
            nreloc: 0,
            flags: SectionFlags(flags),
            reserved1: 0,
            reserved2: 0,
            reserved3: 0,
        }
    }

    fn segment(segname: &str, sections: Vec<Section>) -> MachCommand {
        let segment = Segment {
            segname: segname.to_owned(),
            vmaddr: 0,
            vmsize: 0,
            fileoff: 0,
            filesize: 0,
            maxprot: 0,
            initprot: 0,
            nsects: sections.len() as u32,
            flags: SegmentFlags::empty(),
            sections,
        };

        MachCommand(LoadCommand::Segment64(segment), 0)
    }

    fn commands() -> Vec<MachCommand> {
        vec![
            segment(
                SEG_TEXT,
                vec![
                    section(SEG_TEXT, SECT_TEXT, 0x1000, 0x10, S_REGULAR),
                    section(SEG_TEXT, "__cstring", 0x1020, 0x8, S_CSTRING_LITERALS),
                ],
            ),
            MachCommand(LoadCommand::Command { cmd: 0x1b, cmdsize: 24 }, 24),
            segment(
                SEG_DATA,
                vec![
                    section(SEG_DATA, SECT_DATA, 0x2000, 0x8, S_REGULAR),
                    section(SEG_DATA, SECT_BSS, 0x2010, 0x100, S_ZEROFILL),
                    section(SEG_DATA, "__empty", 0x2110, 0, S_REGULAR),
                ],
            ),
        ]
    }

    fn offsets<'a>(placements: &[Placement<'a>]) -> Vec<(&'a str, u64)> {
        placements.iter().map(|p| (p.section.sectname.as_str(), p.offset)).collect()
    }

    #[test]
    fn test_selection() {
        let selection = Selection::new().segment(SEG_TEXT).section(SECT_DATA);

        assert!(!selection.is_empty());
        assert!(Selection::new().is_empty());
        assert!(Selection::with_names(Vec::<String>::new(), vec!["__text"]) == Selection::new().section("__text"));

        assert!(selection.matches(&section(SEG_TEXT, "__stubs", 0, 0, 0)));
        assert!(selection.matches(&section("__OTHER", SECT_DATA, 0, 0, 0)));
        assert!(!selection.matches(&section(SEG_DATA, SECT_BSS, 0, 0, 0)));
    }

    #[test]
    fn test_plan_by_segment() {
        let commands = commands();
        let placements = plan(&commands, &Selection::new().segment(SEG_TEXT)).unwrap();

        assert_eq!(offsets(&placements), vec![(SECT_TEXT, 0), ("__cstring", 0x20)]);
    }

    #[test]
    fn test_plan_by_section() {
        let commands = commands();
        let placements = plan(&commands, &Selection::new().section("__cstring").section(SECT_DATA)).unwrap();

        assert_eq!(offsets(&placements), vec![("__cstring", 0), (SECT_DATA, 0xfe0)]);
    }

    #[test]
    fn test_plan_skips_zero_sections() {
        let commands = commands();

        // the zero sections never become the origin
        let placements = plan(&commands, &Selection::new().section(SECT_BSS).section("__empty").section(SECT_DATA)).unwrap();

        assert_eq!(offsets(&placements), vec![(SECT_DATA, 0)]);

        let placements = plan(&commands, &Selection::new().section(SECT_BSS)).unwrap();

        assert!(placements.is_empty());
    }

    #[test]
    fn test_plan_keeps_visiting_order() {
        let commands = vec![segment(
            SEG_TEXT,
            vec![
                section(SEG_TEXT, "__first", 0x1000, 0x10, S_REGULAR),
                section(SEG_TEXT, "__after", 0x1800, 0x10, S_REGULAR),
                section(SEG_TEXT, "__overlap", 0x1008, 0x10, S_REGULAR),
            ],
        )];

        let placements = plan(&commands, &Selection::new().segment(SEG_TEXT)).unwrap();

        assert_eq!(offsets(&placements), vec![("__first", 0), ("__after", 0x800), ("__overlap", 0x8)]);
    }

    #[test]
    fn test_plan_below_origin() {
        let commands = vec![segment(
            SEG_TEXT,
            vec![
                section(SEG_TEXT, "__high", 0x2000, 0x10, S_REGULAR),
                section(SEG_TEXT, "__low", 0x1000, 0x10, S_REGULAR),
            ],
        )];

        match plan(&commands, &Selection::new().segment(SEG_TEXT)) {
            Err(MachError::InvalidPlacement { ref sectname, addr: 0x1000, origin: 0x2000 }) if sectname == "__low" => {}
            res => panic!("unexpected result: {:?}", res),
        }
    }

    #[test]
    fn test_invalid_placement_writes_nothing() {
        let mut file = MachFile::parse(Cursor::new(hello_macho_64())).unwrap();

        // put __cstring ahead of __text in visiting order
        if let LoadCommand::Segment64(ref mut segment) = file.commands[0].0 {
            segment.sections.reverse();
        }

        let mut extractor = Extractor::new(Cursor::new(Vec::new()));

        match extractor.extract(&mut file, &Selection::new().segment(SEG_TEXT)) {
            Err(MachError::InvalidPlacement { ref sectname, .. }) if sectname == SECT_TEXT => {}
            res => panic!("unexpected result: {:?}", res),
        }

        assert!(extractor.into_inner().into_inner().is_empty());
    }

    #[test]
    fn test_extract_hello_macho() {
        let _ = pretty_env_logger::try_init();

        let data = hello_macho_64();
        let mut output = Cursor::new(Vec::new());

        let summary = extract_file(Cursor::new(&data[..]), &Selection::new().segment(SEG_TEXT), &mut output).unwrap();

        assert_eq!(
            summary,
            ExtractSummary {
                origin: Some(0x100000f50),
                written: 2,
                skipped_zero: 0,
                end: 0x50,
            }
        );

        let output = output.into_inner();

        assert_eq!(output.len(), 0x50);
        assert_eq!(output[..0x30], (0..0x30u8).collect::<Vec<_>>()[..]);
        assert_eq!(&output[0x30..0x3f], b"Hello, world!\n\0");
        assert!(output[0x3f..].iter().all(|&b| b == 0));
    }

    #[test]
    fn test_extract_empty_selection() {
        let mut output = Cursor::new(Vec::new());

        // checked before the input is parsed
        match extract_file(Cursor::new(&b"garbage"[..]), &Selection::new(), &mut output) {
            Err(MachError::EmptySelection) => {}
            res => panic!("unexpected result: {:?}", res),
        }

        assert!(output.into_inner().is_empty());
    }
}
