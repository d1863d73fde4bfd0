//! Polling tail of a growing log file.
//!
//! A read that hits EOF before `\n` rewinds to the start of that line, so the
//! same bytes are read again once the writer finishes the line.

use std::io::{self, BufRead, BufReader, Read, Seek, SeekFrom};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LineRead {
    /// One complete line, terminator removed.
    Line(String),
    /// No complete line available yet.
    Pending,
}

pub struct LogTailer<R> {
    reader: BufReader<R>,
    buf: Vec<u8>,
}

impl<R: Read + Seek> LogTailer<R> {
    /// Start tailing at the current end of `inner`; existing content is skipped.
    pub fn from_end(mut inner: R) -> io::Result<Self> {
        inner.seek(SeekFrom::End(0))?;
        Ok(Self::from_current(inner))
    }

    /// Start tailing wherever `inner` is positioned.
    pub fn from_current(inner: R) -> Self {
        Self {
            reader: BufReader::new(inner),
            buf: Vec::new(),
        }
    }

    pub fn poll(&mut self) -> io::Result<LineRead> {
        self.buf.clear();
        let n = self.reader.read_until(b'\n', &mut self.buf)?;
        if n == 0 {
            return Ok(LineRead::Pending);
        }
        if self.buf.last() != Some(&b'\n') {
            self.reader.seek_relative(-(n as i64))?;
            return Ok(LineRead::Pending);
        }

        self.buf.pop();
        if self.buf.last() == Some(&b'\r') {
            self.buf.pop();
        }
        Ok(LineRead::Line(String::from_utf8_lossy(&self.buf).into_owned()))
    }

    /// Every complete line available right now.
    pub fn drain(&mut self) -> io::Result<Vec<String>> {
        let mut lines = Vec::new();
        while let LineRead::Line(line) = self.poll()? {
            lines.push(line);
        }
        Ok(lines)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::OpenOptions;
    use std::io::Write;

    #[test]
    fn skips_existing_content_and_waits_for_full_lines() {
        let mut tmp = tempfile::NamedTempFile::new().unwrap();
        writeln!(tmp, "old line").unwrap();
        tmp.flush().unwrap();

        let file = OpenOptions::new().read(true).open(tmp.path()).unwrap();
        let mut tailer = LogTailer::from_end(file).unwrap();
        assert_eq!(tailer.poll().unwrap(), LineRead::Pending);

        write!(tmp, "half a ").unwrap();
        tmp.flush().unwrap();
        assert_eq!(tailer.poll().unwrap(), LineRead::Pending);
        assert_eq!(tailer.poll().unwrap(), LineRead::Pending);

        writeln!(tmp, "line").unwrap();
        tmp.flush().unwrap();
        assert_eq!(
            tailer.poll().unwrap(),
            LineRead::Line("half a line".to_string())
        );
        assert_eq!(tailer.poll().unwrap(), LineRead::Pending);
    }

    #[test]
    fn drain_returns_all_complete_lines() {
        let data = b"one\r\ntwo\nthr".to_vec();
        let mut tailer = LogTailer::from_current(io::Cursor::new(data));
        assert_eq!(tailer.drain().unwrap(), vec!["one", "two"]);
        assert_eq!(tailer.poll().unwrap(), LineRead::Pending);
    }
}
