//! Stream representations an edit log can take on disk.

use std::fmt;

/// On-disk representation of an edit log
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StreamFormat {
    /// Compact, versioned binary records
    Binary,
    /// Structured-text (JSON) document
    Text,
}

impl StreamFormat {
    /// Lower-case name used in messages
    pub fn name(&self) -> &'static str {
        match self {
            StreamFormat::Binary => "binary",
            StreamFormat::Text => "text",
        }
    }
}

impl fmt::Display for StreamFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
