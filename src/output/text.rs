//! Human-readable terminal output.
//!
//! Groups are listed in result order with the kept file marked `[KEEP]`,
//! followed by any skipped entries and a one-line summary. Colour is
//! optional so the same text can be written to files and pipes.

use std::io::{self, Write};

use bytesize::ByteSize;
use yansi::{Paint, Style};

use crate::duplicates::ScanResult;

const KEEP_MARKER: &str = "[KEEP]";

/// Plain-text formatter for a [`ScanResult`].
pub struct TextOutput<'a> {
    result: &'a ScanResult,
    color: bool,
}

impl<'a> TextOutput<'a> {
    /// Create a formatter with colour enabled.
    #[must_use]
    pub fn new(result: &'a ScanResult) -> Self {
        Self {
            result,
            color: true,
        }
    }

    /// Enable or disable ANSI colours.
    #[must_use]
    pub fn with_color(mut self, color: bool) -> Self {
        self.color = color;
        self
    }

    fn paint(&self, text: impl std::fmt::Display, style: Style) -> String {
        if self.color {
            text.paint(style).to_string()
        } else {
            text.to_string()
        }
    }

    /// Write the report.
    ///
    /// # Errors
    ///
    /// Returns any error from the writer.
    pub fn write_to<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        let summary = &self.result.summary;

        if self.result.groups.is_empty() {
            writeln!(writer, "{}", self.paint("No duplicates found.", Style::new().green()))?;
        }

        for (idx, group) in self.result.groups.iter().enumerate() {
            let hash = group.hash_hex();
            writeln!(
                writer,
                "{} {} files, {} each, sha256 {}",
                self.paint(format!("Group {}:", idx + 1), Style::new().bold()),
                group.len(),
                ByteSize::b(group.size),
                self.paint(hash.get(..12).unwrap_or(&hash), Style::new().dim()),
            )?;
            for (position, file) in group.files.iter().enumerate() {
                if position == 0 {
                    writeln!(
                        writer,
                        "  {} {}",
                        self.paint(KEEP_MARKER, Style::new().green().bold()),
                        file.path.display()
                    )?;
                } else {
                    writeln!(
                        writer,
                        "  {:width$} {}",
                        "",
                        file.path.display(),
                        width = KEEP_MARKER.len()
                    )?;
                }
            }
            writeln!(writer)?;
        }

        if !self.result.warnings.is_empty() {
            writeln!(
                writer,
                "{}",
                self.paint(
                    format!("Skipped {} file(s):", self.result.warnings.len()),
                    Style::new().yellow()
                )
            )?;
            for warning in &self.result.warnings {
                writeln!(writer, "  {warning}")?;
            }
            writeln!(writer)?;
        }

        writeln!(
            writer,
            "Summary: {} files scanned ({}), {} duplicate group(s), {} duplicate file(s), {} reclaimable",
            summary.total_files,
            summary.total_size_display(),
            summary.duplicate_groups,
            summary.duplicate_files,
            self.paint(summary.reclaimable_display(), Style::new().red().bold()),
        )?;

        Ok(())
    }

    /// Render the report into a string.
    #[must_use]
    pub fn to_text_string(&self) -> String {
        let mut buffer = Vec::new();
        // Writing to a Vec cannot fail
        let _ = self.write_to(&mut buffer);
        String::from_utf8_lossy(&buffer).into_owned()
    }
}
