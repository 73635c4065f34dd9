use anyhow::{Context, Result};
use regex::Regex;

/// One unit of threat-intel work. Only two kinds exist and they never grow
/// independently of this pipeline, so a closed enum beats a trait object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Indicator {
    /// A candidate filename from a report. Never probed.
    Filename { name: String },
    /// A candidate URL, sanitized at check time.
    Url { raw: String },
}

/// Extensions considered already mitigated by other controls (executables,
/// scripts, containers the mail gateway strips). Filenames matching one of
/// these are not worth a blocking request.
const BLOCKED_EXTENSIONS: &[&str] = &[
    "ace", "ani", "apk", "app", "bat", "cab", "chm", "cmd", "com", "cpl",
    "dll", "exe", "hlp", "hta", "inf", "iso", "jar", "jnl", "jnt", "js",
    "jse", "lnk", "mht", "mhtml", "msh", "msh1", "msh1xml", "msh2",
    "msh2xml", "msi", "msp", "mst", "msu", "ocx", "ova", "ovf", "pif",
    "ps1", "ps1xml", "ps2", "ps2xml", "psc1", "psc2", "pub", "reg", "scf",
    "scr", "sct", "url", "vb", "vbe", "vbs", "vdi", "vhd", "vhdx", "vmcx",
    "vmdk", "vmx", "ws", "wsc", "wsf", "wsh", "xva",
];

/// Case-insensitive extension denylist applied to filename indicators
/// before they are recorded.
#[derive(Debug, Clone)]
pub struct PathFilter {
    re: Regex,
}

impl PathFilter {
    /// Builds the filter from a configured extension list; an empty list
    /// falls back to the built-in set. Leading dots are tolerated.
    pub fn new(extensions: &[String]) -> Result<Self> {
        let exts: Vec<String> = if extensions.is_empty() {
            BLOCKED_EXTENSIONS.iter().map(|e| e.to_string()).collect()
        } else {
            extensions
                .iter()
                .map(|e| regex::escape(e.trim_start_matches('.')))
                .collect()
        };

        let re = Regex::new(&format!(r"(?i)\.({})$", exts.join("|")))
            .context("building extension denylist")?;
        Ok(Self { re })
    }

    pub fn is_ignored(&self, name: &str) -> bool {
        self.re.is_match(name)
    }
}

impl Default for PathFilter {
    fn default() -> Self {
        // The built-in list contains no regex metacharacters.
        Self::new(&[]).expect("built-in extension list")
    }
}
