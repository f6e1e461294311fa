//! Artifact framing
//!
//! Each included file is written as:
//!
//! ```text
//! \n<60 '='>\nFILE: <relative/path>\n<60 '='>\n<content>\n
//! ```

use std::io::{self, Write};

/// Width of the `=` separator line.
pub const SEPARATOR_WIDTH: usize = 60;

/// Append-only writer for the flattened artifact.
pub struct ArtifactWriter<W: Write> {
    inner: W,
    separator: String,
    bytes_written: u64,
}

impl<W: Write> ArtifactWriter<W> {
    pub fn new(inner: W) -> Self {
        Self { inner, separator: "=".repeat(SEPARATOR_WIDTH), bytes_written: 0 }
    }

    /// Frame and append one file.
    pub fn write_file(&mut self, relative_path: &str, content: &str) -> io::Result<()> {
        let header = format!("\n{sep}\nFILE: {relative_path}\n{sep}\n", sep = self.separator);
        self.put(header.as_bytes())?;
        self.put(content.as_bytes())?;
        self.put(b"\n")
    }

    pub fn bytes_written(&self) -> u64 {
        self.bytes_written
    }

    /// Flush and hand back the sink.
    pub fn finish(mut self) -> io::Result<W> {
        self.inner.flush()?;
        Ok(self.inner)
    }

    fn put(&mut self, bytes: &[u8]) -> io::Result<()> {
        self.inner.write_all(bytes)?;
        self.bytes_written += bytes.len() as u64;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::ArtifactWriter;

    #[test]
    fn frames_file_exactly() {
        let mut writer = ArtifactWriter::new(Vec::new());
        writer.write_file("src/main.py", "print('hi')").expect("write");
        let out = writer.finish().expect("finish");

        let sep = "=".repeat(60);
        let expected = format!("\n{sep}\nFILE: src/main.py\n{sep}\nprint('hi')\n");
        assert_eq!(String::from_utf8(out).expect("utf8"), expected);
    }

    #[test]
    fn tracks_bytes_across_files() {
        let mut writer = ArtifactWriter::new(Vec::new());
        writer.write_file("a", "").expect("write");
        writer.write_file("b", "xy").expect("write");
        let written = writer.bytes_written();
        let out = writer.finish().expect("finish");
        assert_eq!(written, out.len() as u64);
        // Empty content still gets its trailing newline.
        assert!(String::from_utf8(out).expect("utf8").contains("FILE: a\n"));
    }
}
