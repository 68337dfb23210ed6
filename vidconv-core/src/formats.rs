use serde::Serialize;

/// An output format offered to the user, with the encoder settings it maps to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FormatEntry {
    /// Label shown in the format selector (e.g. "MP4")
    pub label: &'static str,
    /// Video encoder handed to FFmpeg (e.g. "libx264")
    pub codec_id: &'static str,
    /// Container muxer passed with `-f` (e.g. "mpeg" for the `.mpeg-1` extension)
    pub muxer: &'static str,
}

impl FormatEntry {
    const fn new(label: &'static str, codec_id: &'static str, muxer: &'static str) -> Self {
        Self {
            label,
            codec_id,
            muxer,
        }
    }

    /// File extension for this format, without the leading dot.
    pub fn extension(&self) -> String {
        self.label.to_lowercase()
    }
}

/// Output formats in the order they are presented.
static FORMATS: [FormatEntry; 12] = [
    FormatEntry::new("MP4", "libx264", "mp4"),
    FormatEntry::new("WEBM", "libvpx", "webm"),
    FormatEntry::new("MOV", "mov", "mov"),
    FormatEntry::new("MPEG-1", "mpeg1video", "mpeg"),
    FormatEntry::new("MPEG-2", "mpeg2video", "mpeg"),
    FormatEntry::new("MPG", "mpeg2video", "mpeg"),
    FormatEntry::new("MPEGPS", "mpeg2video", "mpeg"),
    FormatEntry::new("MPEG4", "mpeg4", "mp4"),
    FormatEntry::new("AVI", "msmpeg4", "avi"),
    FormatEntry::new("WMV", "wmv2", "asf"),
    FormatEntry::new("FLV", "flv", "flv"),
    FormatEntry::new("3GPP", "h263p", "3gp"),
];

/// All output formats.
pub fn all() -> &'static [FormatEntry] {
    &FORMATS
}

/// Labels in presentation order.
pub fn labels() -> impl Iterator<Item = &'static str> {
    FORMATS.iter().map(|entry| entry.label)
}

/// The format selected when nothing else has been chosen.
pub fn default_format() -> &'static FormatEntry {
    &FORMATS[0]
}

/// Find the entry for a label. Labels are matched exactly.
pub fn find(label: &str) -> Option<&'static FormatEntry> {
    FORMATS.iter().find(|entry| entry.label == label)
}

/// Resolve the codec for a label, or `None` if the label is unknown.
pub fn lookup(label: &str) -> Option<&'static str> {
    find(label).map(|entry| entry.codec_id)
}

/// Extensions accepted by the input file picker.
pub fn supported_input_extensions() -> &'static [&'static str] {
    &[
        "webm", "mp4", "avi", "mkv", "mov", "mpeg1", "mpeg2", "mpeg4", "mpg", "wmv", "mpegps",
        "flv", "3gpp",
    ]
}

/// Check if a file extension is accepted as conversion input.
pub fn is_supported_extension(ext: &str) -> bool {
    let ext_lower = ext.to_lowercase();
    supported_input_extensions().iter().any(|e| *e == ext_lower)
}
