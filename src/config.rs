// src/config.rs

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{fs, path::Path};

/// Knobs for reading and writing a table file.
///
/// Every field has a default, so a YAML file only needs the keys it changes:
///
/// ```yaml
/// sniff_bytes: 8192
/// strict_width: false
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TableOptions {
    /// Size of the leading sample handed to the dialect sniffer.
    pub sniff_bytes: usize,
    /// Delimiters the sniffer will consider, most preferred first.
    pub candidate_delimiters: Vec<char>,
    /// Delimiter used on save when the file was never sniffed.
    pub default_delimiter: char,
    /// Reject data rows shorter than the schema. When off, short rows are kept
    /// and every filter excludes them.
    pub strict_width: bool,
}

impl Default for TableOptions {
    fn default() -> Self {
        Self {
            sniff_bytes: 4096,
            candidate_delimiters: vec![',', '\t', ';', '|', ':'],
            default_delimiter: ',',
            strict_width: true,
        }
    }
}

impl TableOptions {
    pub fn from_yaml_str(text: &str) -> Result<Self> {
        let opts: TableOptions = serde_yaml::from_str(text).context("parsing table options")?;
        opts.validate()?;
        Ok(opts)
    }

    pub fn from_yaml_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .with_context(|| format!("reading table options {:?}", path))?;
        Self::from_yaml_str(&text).with_context(|| format!("loading {:?}", path))
    }

    fn validate(&self) -> Result<()> {
        if self.sniff_bytes == 0 {
            anyhow::bail!("sniff_bytes must be greater than zero");
        }
        for c in self
            .candidate_delimiters
            .iter()
            .chain(std::iter::once(&self.default_delimiter))
        {
            if !c.is_ascii() || *c == '"' || *c == '\n' || *c == '\r' {
                anyhow::bail!("{:?} cannot be used as a delimiter", c);
            }
        }
        Ok(())
    }

    pub(crate) fn default_delimiter_byte(&self) -> u8 {
        // validate() restricts delimiters to ASCII; fall back for hand-built options
        u8::try_from(self.default_delimiter).unwrap_or(b',')
    }

    pub(crate) fn candidate_bytes(&self) -> Vec<u8> {
        self.candidate_delimiters
            .iter()
            .filter_map(|c| u8::try_from(*c).ok())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn partial_yaml_keeps_defaults() -> Result<()> {
        let opts = TableOptions::from_yaml_str("strict_width: false\n")?;
        assert!(!opts.strict_width);
        assert_eq!(opts.sniff_bytes, 4096);
        assert_eq!(opts.default_delimiter, ',');
        Ok(())
    }

    #[test]
    fn loads_from_file() -> Result<()> {
        let mut tmp = NamedTempFile::new()?;
        writeln!(tmp, "sniff_bytes: 128")?;
        writeln!(tmp, "candidate_delimiters: [';', ',']")?;
        let opts = TableOptions::from_yaml_file(tmp.path())?;
        assert_eq!(opts.sniff_bytes, 128);
        assert_eq!(opts.candidate_bytes(), vec![b';', b',']);
        Ok(())
    }

    #[test]
    fn rejects_unusable_delimiters() {
        assert!(TableOptions::from_yaml_str("default_delimiter: '\"'\n").is_err());
        assert!(TableOptions::from_yaml_str("sniff_bytes: 0\n").is_err());
        assert!(TableOptions::from_yaml_str("candidate_delimiters: ['é']\n").is_err());
    }
}
