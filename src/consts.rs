#![allow(dead_code)]
#![allow(non_camel_case_types)]

pub type cpu_type_t = i32;
pub type cpu_subtype_t = i32;
pub type vm_prot_t = i32;

// Capability bits used in the definition of cpu_type.
//

/// mask for architecture bits
pub const CPU_ARCH_MASK: cpu_type_t = 0xff000000u64 as cpu_type_t;
/// 64 bit ABI
pub const CPU_ARCH_ABI64: cpu_type_t = 0x01000000u64 as cpu_type_t;

/// mask for feature flags in the cpu subtype
pub const CPU_SUBTYPE_MASK: cpu_subtype_t = 0xff000000u64 as cpu_subtype_t;

//  Machine types known by all.
//

pub const CPU_TYPE_ANY: cpu_type_t = -1;

pub const CPU_TYPE_X86: cpu_type_t = 7;
pub const CPU_TYPE_I386: cpu_type_t = CPU_TYPE_X86;
pub const CPU_TYPE_X86_64: cpu_type_t = CPU_TYPE_X86 | CPU_ARCH_ABI64;
pub const CPU_TYPE_ARM: cpu_type_t = 12;
pub const CPU_TYPE_ARM64: cpu_type_t = CPU_TYPE_ARM | CPU_ARCH_ABI64;
pub const CPU_TYPE_POWERPC: cpu_type_t = 18;
pub const CPU_TYPE_POWERPC64: cpu_type_t = CPU_TYPE_POWERPC | CPU_ARCH_ABI64;

pub fn get_cpu_type_name(cputype: cpu_type_t) -> Option<&'static str> {
    match cputype {
        CPU_TYPE_ANY => Some("any"),
        CPU_TYPE_I386 => Some("i386"),
        CPU_TYPE_X86_64 => Some("x86_64"),
        CPU_TYPE_ARM => Some("arm"),
        CPU_TYPE_ARM64 => Some("arm64"),
        CPU_TYPE_POWERPC => Some("ppc"),
        CPU_TYPE_POWERPC64 => Some("ppc64"),
        _ => None,
    }
}

pub fn get_cpu_subtype_type(subtype: cpu_subtype_t) -> cpu_subtype_t {
    subtype & !CPU_SUBTYPE_MASK
}

pub fn get_cpu_subtype_feature(subtype: cpu_subtype_t) -> cpu_subtype_t {
    (subtype & CPU_SUBTYPE_MASK) >> 24
}

// Constant for the magic field of the mach_header (32-bit architectures)
//

/// the mach magic number
pub const MH_MAGIC: u32 = 0xfeedface;
/// NXSwapInt(MH_MAGIC)
pub const MH_CIGAM: u32 = 0xcefaedfe;

// Constant for the magic field of the mach_header_64 (64-bit architectures)
//

/// the 64-bit mach magic number
pub const MH_MAGIC_64: u32 = 0xfeedfacf;
/// NXSwapInt(MH_MAGIC_64)
pub const MH_CIGAM_64: u32 = 0xcffaedfe;

// Constants for the universal (fat) header, rejected by the loader.
//

/// the fat magic number
pub const FAT_MAGIC: u32 = 0xcafebabe;
/// NXSwapLong(FAT_MAGIC)
pub const FAT_CIGAM: u32 = 0xbebafeca;

// Constants for the filetype field of the mach_header
//

/// relocatable object file
pub const MH_OBJECT: u32 = 0x1;
/// demand paged executable file
pub const MH_EXECUTE: u32 = 0x2;
/// fixed VM shared library file
pub const MH_FVMLIB: u32 = 0x3;
/// core file
pub const MH_CORE: u32 = 0x4;
/// preloaded executable file
pub const MH_PRELOAD: u32 = 0x5;
/// dynamically bound shared library
pub const MH_DYLIB: u32 = 0x6;
/// dynamic link editor
pub const MH_DYLINKER: u32 = 0x7;
/// dynamically bound bundle file
pub const MH_BUNDLE: u32 = 0x8;
/// shared library stub for static linking only, no section contents
pub const MH_DYLIB_STUB: u32 = 0x9;
/// companion file with only debug sections
pub const MH_DSYM: u32 = 0xa;
/// x86_64 kexts
pub const MH_KEXT_BUNDLE: u32 = 0xb;

/// size of the mach_header fields following the magic
pub const MACH_HEADER_SIZE: usize = 24;
/// size of the mach_header_64 fields following the magic, including `reserved`
pub const MACH_HEADER_64_SIZE: usize = 28;

// Constants for the cmd field of the load commands this crate understands.
// Every other command is carried as an opaque `LoadCommand::Command`.

pub const LC_SEGMENT: u32 = 0x1; /* segment of this file to be mapped */
pub const LC_SEGMENT_64: u32 = 0x19; /* 64-bit segment of this file to be mapped */

/// cmd + cmdsize
pub const LOAD_COMMAND_HEADER_SIZE: usize = 8;

/// segname + 8 x u32
pub const SEGMENT_COMMAND_SIZE: usize = 16 + 8 * 4;
/// segname + 4 x u64 + 4 x u32
pub const SEGMENT_COMMAND_64_SIZE: usize = 16 + 4 * 8 + 4 * 4;
/// sectname + segname + 9 x u32
pub const SECTION_SIZE: usize = 16 + 16 + 9 * 4;
/// sectname + segname + 2 x u64 + 8 x u32
pub const SECTION_64_SIZE: usize = 16 + 16 + 2 * 8 + 8 * 4;

/// length of the null padded segment and section names
pub const NAME_SIZE: usize = 16;

// Constants for the flags field of the segment_command

/// the file contents for this segment is for the high part of the VM space,
/// the low part is zero filled (for stacks in core files)
pub const SG_HIGHVM: u32 = 0x1;
/// this segment is the VM that is allocated by a fixed VM library,
/// for overlap checking in the link editor
pub const SG_FVMLIB: u32 = 0x2;
/// this segment has nothing that was relocated in it and nothing relocated to it,
/// that is it maybe safely replaced without relocation
pub const SG_NORELOC: u32 = 0x4;
/// This segment is protected.  If the segment starts at file offset 0,
/// the first page of the segment is not protected.
/// All other pages of the segment are protected.
pub const SG_PROTECTED_VERSION_1: u32 = 0x8;

// VM protection bits of maxprot and initprot

pub const VM_PROT_NONE: vm_prot_t = 0x0;
pub const VM_PROT_READ: vm_prot_t = 0x1;
pub const VM_PROT_WRITE: vm_prot_t = 0x2;
pub const VM_PROT_EXECUTE: vm_prot_t = 0x4;

// The flags field of a section structure is separated into two parts a section
// type and section attributes.
//

/// 256 section types
pub const SECTION_TYPE: u32 = 0x000000ff;
///  24 section attributes
pub const SECTION_ATTRIBUTES: u32 = 0xffffff00;

// Constants for the type of a section
//

/// regular section
pub const S_REGULAR: u32 = 0x0;
/// zero fill on demand section
pub const S_ZEROFILL: u32 = 0x1;
/// section with only literal C strings
pub const S_CSTRING_LITERALS: u32 = 0x2;
/// section with only 4 byte literals
pub const S_4BYTE_LITERALS: u32 = 0x3;
/// section with only 8 byte literals
pub const S_8BYTE_LITERALS: u32 = 0x4;
/// section with only pointers to literals
pub const S_LITERAL_POINTERS: u32 = 0x5;
/// section with only non-lazy symbol pointers
pub const S_NON_LAZY_SYMBOL_POINTERS: u32 = 0x6;
/// section with only lazy symbol pointers
pub const S_LAZY_SYMBOL_POINTERS: u32 = 0x7;
/// section with only symbol stubs, byte size of stub in the reserved2 field
pub const S_SYMBOL_STUBS: u32 = 0x8;
/// section with only function pointers for initialization
pub const S_MOD_INIT_FUNC_POINTERS: u32 = 0x9;
/// section with only function pointers for termination
pub const S_MOD_TERM_FUNC_POINTERS: u32 = 0xa;
/// section contains symbols that are to be coalesced
pub const S_COALESCED: u32 = 0xb;
/// zero fill on demand section (that can be larger than 4 gigabytes)
pub const S_GB_ZEROFILL: u32 = 0xc;
/// section with only pairs of function pointers for interposing
pub const S_INTERPOSING: u32 = 0xd;
/// section with only 16 byte literals
pub const S_16BYTE_LITERALS: u32 = 0xe;
/// section contains DTrace Object Format
pub const S_DTRACE_DOF: u32 = 0xf;
/// section with only lazy symbol pointers to lazy loaded dylibs
pub const S_LAZY_DYLIB_SYMBOL_POINTERS: u32 = 0x10;
/// template of initial values for TLVs
pub const S_THREAD_LOCAL_REGULAR: u32 = 0x11;
/// template of initial values for TLVs
pub const S_THREAD_LOCAL_ZEROFILL: u32 = 0x12;
/// TLV descriptors
pub const S_THREAD_LOCAL_VARIABLES: u32 = 0x13;
/// pointers to TLV descriptors
pub const S_THREAD_LOCAL_VARIABLE_POINTERS: u32 = 0x14;
/// functions to call to initialize TLV values
pub const S_THREAD_LOCAL_INIT_FUNCTION_POINTERS: u32 = 0x15;

pub fn get_section_type_name(secttype: u32) -> Option<&'static str> {
    match secttype {
        S_REGULAR => Some("S_REGULAR"),
        S_ZEROFILL => Some("S_ZEROFILL"),
        S_CSTRING_LITERALS => Some("S_CSTRING_LITERALS"),
        S_4BYTE_LITERALS => Some("S_4BYTE_LITERALS"),
        S_8BYTE_LITERALS => Some("S_8BYTE_LITERALS"),
        S_LITERAL_POINTERS => Some("S_LITERAL_POINTERS"),
        S_NON_LAZY_SYMBOL_POINTERS => Some("S_NON_LAZY_SYMBOL_POINTERS"),
        S_LAZY_SYMBOL_POINTERS => Some("S_LAZY_SYMBOL_POINTERS"),
        S_SYMBOL_STUBS => Some("S_SYMBOL_STUBS"),
        S_MOD_INIT_FUNC_POINTERS => Some("S_MOD_INIT_FUNC_POINTERS"),
        S_MOD_TERM_FUNC_POINTERS => Some("S_MOD_TERM_FUNC_POINTERS"),
        S_COALESCED => Some("S_COALESCED"),
        S_GB_ZEROFILL => Some("S_GB_ZEROFILL"),
        S_INTERPOSING => Some("S_INTERPOSING"),
        S_16BYTE_LITERALS => Some("S_16BYTE_LITERALS"),
        S_DTRACE_DOF => Some("S_DTRACE_DOF"),
        S_LAZY_DYLIB_SYMBOL_POINTERS => Some("S_LAZY_DYLIB_SYMBOL_POINTERS"),
        S_THREAD_LOCAL_REGULAR => Some("S_THREAD_LOCAL_REGULAR"),
        S_THREAD_LOCAL_ZEROFILL => Some("S_THREAD_LOCAL_ZEROFILL"),
        S_THREAD_LOCAL_VARIABLES => Some("S_THREAD_LOCAL_VARIABLES"),
        S_THREAD_LOCAL_VARIABLE_POINTERS => Some("S_THREAD_LOCAL_VARIABLE_POINTERS"),
        S_THREAD_LOCAL_INIT_FUNCTION_POINTERS => Some("S_THREAD_LOCAL_INIT_FUNCTION_POINTERS"),
        _ => None,
    }
}

// Constants for the section attributes part of the flags field of a section
// structure.
//

/// User setable attributes
pub const SECTION_ATTRIBUTES_USR: u32 = 0xff000000;
/// section contains only true machine instructions
pub const S_ATTR_PURE_INSTRUCTIONS: u32 = 0x80000000;
/// section contains coalesced symbols that are not to be in a ranlib table of contents
pub const S_ATTR_NO_TOC: u32 = 0x40000000;
/// ok to strip static symbols in this section in files with the MH_DYLDLINK flag
pub const S_ATTR_STRIP_STATIC_SYMS: u32 = 0x20000000;
/// no dead stripping
pub const S_ATTR_NO_DEAD_STRIP: u32 = 0x10000000;
/// blocks are live if they reference live blocks
pub const S_ATTR_LIVE_SUPPORT: u32 = 0x08000000;
/// Used with i386 code stubs written on by dyld
pub const S_ATTR_SELF_MODIFYING_CODE: u32 = 0x04000000;
/// a debug section
pub const S_ATTR_DEBUG: u32 = 0x02000000;
/// system setable attributes
pub const SECTION_ATTRIBUTES_SYS: u32 = 0x00ffff00;
/// section contains some machine instructions
pub const S_ATTR_SOME_INSTRUCTIONS: u32 = 0x00000400;
/// section has external relocation entries
pub const S_ATTR_EXT_RELOC: u32 = 0x00000200;
/// section has local relocation entries
pub const S_ATTR_LOC_RELOC: u32 = 0x00000100;

// The names of segments and sections in them are mostly meaningless to the
// link-editor.  These are the ones commonly asked for on the command line.
//

/// the pagezero segment which has no protections and catches NULL references for MH_EXECUTE files
pub const SEG_PAGEZERO: &str = "__PAGEZERO";
/// the tradition UNIX text segment
pub const SEG_TEXT: &str = "__TEXT";
/// the real text part of the text section no headers, and no padding
pub const SECT_TEXT: &str = "__text";
/// the tradition UNIX data segment
pub const SEG_DATA: &str = "__DATA";
/// the real initialized data section no padding, no bss overlap
pub const SECT_DATA: &str = "__data";
/// the real uninitialized data section no padding
pub const SECT_BSS: &str = "__bss";
/// the section common symbols are allocated in by the link editor
pub const SECT_COMMON: &str = "__common";
/// the segment containing all structs created and maintained by the link editor.
pub const SEG_LINKEDIT: &str = "__LINKEDIT";
