//! One-value-per-line text files

use crate::{FsError, Result};
use std::fs::{self, File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::Path;

/// Read all non-blank lines, trimmed, preserving order
pub fn read_lines<P: AsRef<Path>>(path: P) -> Result<Vec<String>> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => FsError::NotFound(path.to_path_buf()),
        _ => FsError::Io(e),
    })?;

    Ok(content
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(String::from)
        .collect())
}

/// Parse integer identifiers from text, one per line, preserving order.
/// `path` is only used for diagnostics.
pub fn parse_id_lines(content: &str, path: &Path) -> Result<Vec<u32>> {
    let mut ids = Vec::new();

    for (idx, raw) in content.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() {
            continue;
        }
        let id = line.parse::<u32>().map_err(|_| FsError::MalformedLine {
            path: path.to_path_buf(),
            line: idx + 1,
            found: line.to_string(),
        })?;
        ids.push(id);
    }

    Ok(ids)
}

/// Read integer identifiers, one per line, preserving order
pub fn read_id_lines<P: AsRef<Path>>(path: P) -> Result<Vec<u32>> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => FsError::NotFound(path.to_path_buf()),
        _ => FsError::Io(e),
    })?;
    parse_id_lines(&content, path)
}

/// Overwrite `path` with one item per line
pub fn write_lines<P, I, T>(path: P, items: I) -> Result<()>
where
    P: AsRef<Path>,
    I: IntoIterator<Item = T>,
    T: std::fmt::Display,
{
    let mut out = String::new();
    for item in items {
        out.push_str(&item.to_string());
        out.push('\n');
    }
    fs::write(path.as_ref(), out)?;
    Ok(())
}

/// Append a single line, creating the file if needed
pub fn append_line<P: AsRef<Path>, T: std::fmt::Display>(path: P, item: T) -> Result<()> {
    let path = path.as_ref();
    let needs_newline = !ends_with_newline(path)?;

    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    if needs_newline {
        writeln!(file)?;
    }
    writeln!(file, "{}", item)?;
    file.flush()?;
    Ok(())
}

/// True for missing or empty files and files whose last byte is `\n`.
/// Hand-edited index files often lack the final newline.
fn ends_with_newline(path: &Path) -> Result<bool> {
    let mut file = match File::open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(true),
        Err(e) => return Err(e.into()),
    };

    if file.metadata()?.len() == 0 {
        return Ok(true);
    }

    let mut last = [0u8; 1];
    file.seek(SeekFrom::End(-1))?;
    file.read_exact(&mut last)?;
    Ok(last[0] == b'\n')
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_read_lines_skips_blanks() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("list.txt");
        fs::write(&path, "a.jpg\n\n  b.jpg  \nc.jpg").unwrap();

        assert_eq!(read_lines(&path).unwrap(), vec!["a.jpg", "b.jpg", "c.jpg"]);
    }

    #[test]
    fn test_read_lines_missing() {
        let dir = TempDir::new().unwrap();
        let err = read_lines(dir.path().join("missing.txt")).unwrap_err();
        assert!(matches!(err, FsError::NotFound(_)));
    }

    #[test]
    fn test_id_lines_keep_order() {
        let ids = parse_id_lines("5\n1\n\n9\n", Path::new("t.txt")).unwrap();
        assert_eq!(ids, vec![5, 1, 9]);
    }

    #[test]
    fn test_id_lines_report_bad_line() {
        let err = parse_id_lines("5\nfive\n", Path::new("t.txt")).unwrap_err();
        match err {
            FsError::MalformedLine { line, found, .. } => {
                assert_eq!(line, 2);
                assert_eq!(found, "five");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_append_then_write() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("ids.txt");

        append_line(&path, 3).unwrap();
        append_line(&path, 1).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "3\n1\n");

        write_lines(&path, [1, 3]).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "1\n3\n");
    }

    #[test]
    fn test_append_after_missing_final_newline() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("ids.txt");
        fs::write(&path, "5\n1").unwrap();

        append_line(&path, 9).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "5\n1\n9\n");
    }
}
