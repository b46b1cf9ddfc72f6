//! Line-level streaming over a genotype matrix file.

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

/// Classification of one physical line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    /// First non-comment, non-blank line; column titles, ignored by the loader.
    Header,
    /// Starts with `#`.
    Comment,
    Data,
}

/// One physical line split into trimmed tab-separated fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatrixLine {
    /// 1-based physical line number.
    pub number: u64,
    pub kind: LineKind,
    pub fields: Vec<String>,
}

/// Iterator over lines of a tab-delimited genotype matrix.
pub struct MatrixReader<R> {
    inner: R,
    line: u64,
    header_seen: bool,
    buf: String,
}

impl<R> MatrixReader<R>
where
    R: BufRead,
{
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            line: 0,
            header_seen: false,
            buf: String::new(),
        }
    }

    /// Number of physical lines consumed so far.
    pub fn line_number(&self) -> u64 {
        self.line
    }
}

impl<R> Iterator for MatrixReader<R>
where
    R: BufRead,
{
    type Item = io::Result<MatrixLine>;

    fn next(&mut self) -> Option<Self::Item> {
        self.buf.clear();
        match self.inner.read_line(&mut self.buf) {
            Ok(0) => None,
            Ok(_) => {
                self.line += 1;
                let trimmed = self.buf.trim_end_matches(['\n', '\r']);
                let fields: Vec<String> = trimmed
                    .split('\t')
                    .map(|field| field.trim().to_string())
                    .collect();
                let blank = fields.iter().all(String::is_empty);
                let kind = if trimmed.starts_with('#') {
                    LineKind::Comment
                } else if !self.header_seen && !blank {
                    self.header_seen = true;
                    LineKind::Header
                } else {
                    LineKind::Data
                };

                Some(Ok(MatrixLine {
                    number: self.line,
                    kind,
                    fields,
                }))
            }
            Err(err) => Some(Err(err)),
        }
    }
}

/// Counts lines that do not start with `#`; used as the progress total.
///
/// Works on raw bytes so the count is available even when a later line is
/// not valid UTF-8.
pub fn count_data_lines(path: impl AsRef<Path>) -> io::Result<u64> {
    let reader = BufReader::new(File::open(path)?);
    let mut total = 0;
    for line in reader.split(b'\n') {
        if !line?.starts_with(b"#") {
            total += 1;
        }
    }
    Ok(total)
}
