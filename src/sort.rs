//! Within-partition file ordering.
//!
//! Solid archives compress better when similarly-typed content sits
//! adjacent, so after packing each partition's file list can be reordered by
//! extension locality: already-incompressible media/archive formats are
//! grouped first and away from highly compressible text, the 7-Zip way.

use clap::ValueEnum;
use std::collections::HashMap;
use std::path::Path;
use std::sync::OnceLock;

use crate::packer::FileEntry;

/// Ordering applied to a partition's files after packing. No effect on
/// membership or aggregate size.
#[derive(ValueEnum, Copy, Clone, Debug, PartialEq, Eq)]
pub enum SortPolicy {
    /// Preserve discovery order.
    None,
    /// Sort by full path.
    Lexicographic,
    /// Group same-type files within each directory:
    /// (directory, extension rank, extension, basename).
    ExtLocal,
    /// Group by type across the whole partition, ignoring directories:
    /// (extension rank, extension, basename, directory).
    ExtGlobal,
}

/// Extensions in compression-affinity order: pre-compressed archives and
/// media first, then documents and source code, ending with symbols/debug
/// data. Unknown extensions sort after all of these.
const EXT_PRIORITY: &str = "\
7z xz lzma ace arc arj bz tbz bz2 tbz2 cab deb gz tgz ha lha lzh lzo lzx pak rar rpm sit zoo
zip jar ear war msi
3gp avi mov mpeg mpg mpe wmv
aac ape fla flac la mp3 m4a mp4 ofr ogg pac ra rm rka shn swa tta wv wma wav
swf
chm hxi hxs
gif jpeg jpg jp2 png tiff bmp ico psd psp
awg ps eps cgm dxf svg vrml wmf emf ai md
cad dwg pps key sxi
max 3ds
iso bin nrg mdf img pdi tar cpio xpi
vfd vhd vud vmc vsv
vmdk dsk nvram vmem vmsd vmsn vmss vmtm
inl inc idl acf asa h hpp hxx c cpp cxx rc java cs pas bas vb cls ctl frm dlg def
f77 f f90 f95
asm sql manifest dep
mak clw csproj vcproj sln dsp dsw
classf
bat cmd
xml xsd xsl xslt hxk hxc htm html xhtml xht mht mhtml htw asp aspx css cgi jsp shtml
awk sed hta js php php3 php4 php5 phptml pl pm py pyo rb sh tcl vbs
text txt tex ans asc srt reg ini doc docx mcw dot rtf hlp xls xlr xlt xlw ppt pdf
sxc sxd sxi sxg sxw stc sti stw stm odt ott odg otg odp otp ods ots odf
abw afp cwk lwp wpd wps wpt wrf wri
abf afm bdf fon mgf otf pcf pfa snf ttf
dbf mdb nsf ntf wdb db fdb gdb
exe dll ocx vbx sfx sys tlb awx com obj lib out o so
pdb pch idb ncb opt";

/// Rank given to extensions absent from the priority table.
const UNKNOWN_RANK: u32 = 999;

static EXT_RANKS: OnceLock<HashMap<&'static str, u32>> = OnceLock::new();

fn ext_ranks() -> &'static HashMap<&'static str, u32> {
    EXT_RANKS.get_or_init(|| {
        let mut map: HashMap<&'static str, u32> = EXT_PRIORITY
            .split_whitespace()
            .enumerate()
            .map(|(i, ext)| (ext, i as u32 + 1))
            .collect();
        map.insert("", 0);
        map
    })
}

/// Ordinal of `ext` (lowercase, without the dot) in the priority table.
pub fn ext_rank(ext: &str) -> u32 {
    ext_ranks().get(ext).copied().unwrap_or(UNKNOWN_RANK)
}

/// Sort key pieces for one path.
struct PathKey {
    dir: String,
    base: String,
    ext: String,
    rank: u32,
}

fn path_key(path: &Path) -> PathKey {
    let dir = path
        .parent()
        .map(|p| p.to_string_lossy().into_owned())
        .unwrap_or_default();
    let base = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let ext = path
        .extension()
        .map(|s| s.to_string_lossy().to_lowercase())
        .unwrap_or_default();
    let rank = ext_rank(&ext);
    PathKey { dir, base, ext, rank }
}

/// Reorders `entries` in place according to `policy`.
pub fn sort_entries(entries: &mut [FileEntry], policy: SortPolicy) {
    match policy {
        SortPolicy::None => {}
        SortPolicy::Lexicographic => entries.sort_by(|a, b| a.path.cmp(&b.path)),
        SortPolicy::ExtLocal => entries.sort_by_key(|e| {
            let k = path_key(&e.path);
            (k.dir, k.rank, k.ext, k.base)
        }),
        SortPolicy::ExtGlobal => entries.sort_by_key(|e| {
            let k = path_key(&e.path);
            (k.rank, k.ext, k.base, k.dir)
        }),
    }
}
