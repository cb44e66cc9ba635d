// json_io.rs (CLI only)
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;
use textcodec::WordList;

/// Human-readable form of a word list, for diffs and review.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct WordListSerde {
    pub words: Vec<String>,

    #[serde(default)]
    pub count: usize,

    // matches the fingerprint stored in block container headers
    #[serde(default)]
    pub fingerprint: u32,
}

impl From<&WordList> for WordListSerde {
    fn from(list: &WordList) -> Self {
        let words: Vec<String> = list
            .words()
            .map(|(_, w)| String::from_utf8_lossy(w).into_owned())
            .collect();
        Self {
            count: words.len(),
            words,
            fingerprint: list.fingerprint(),
        }
    }
}

pub fn write_reference_json(list: &WordList, path: impl AsRef<Path>, pretty: bool) -> io::Result<()> {
    let dto = WordListSerde::from(list);
    let file = File::create(path)?;
    let mut w = BufWriter::new(file);
    if pretty {
        serde_json::to_writer_pretty(&mut w, &dto).map_err(to_io)?;
    } else {
        serde_json::to_writer(&mut w, &dto).map_err(to_io)?;
        // newline for POSIX-y tools
        w.write_all(b"\n")?;
    }
    w.flush()
}

// Small adapter so we can stay in io::Result
fn to_io<E: std::error::Error + Send + Sync + 'static>(e: E) -> io::Error {
    io::Error::new(io::ErrorKind::Other, e)
}
