//! Loading search text and keyword lists.
//!
//! Text files may be FASTA, FASTQ or plain lines, optionally gzip
//! compressed. All records are concatenated into a single upper-case text.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use bio::alphabets::dna;
use bio::io::{fasta, fastq};
use flate2::read::MultiGzDecoder;
use log::debug;

/// Errors returned while loading input.
#[derive(thiserror::Error, Debug)]
pub enum InputError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse {format} record: {message}")]
    Record {
        format: &'static str,
        message: String,
    },
    #[error("Encountered non-UTF-8 symbols in sequence data")]
    NonUtf8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SequenceFormat {
    Fastq,
    Fasta,
    Lines,
}

fn is_gzip(path: &Path) -> bool {
    path.extension()
        .map(|ext| ext.eq_ignore_ascii_case("gz") || ext.eq_ignore_ascii_case("bgz"))
        .unwrap_or(false)
}

/// Guess the record format from the file extension, looking through `.gz`.
pub fn infer_format(path: &Path) -> SequenceFormat {
    let mut ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|s| s.to_ascii_lowercase())
        .unwrap_or_default();

    if ext == "gz" || ext == "bgz" {
        if let Some(stem) = path.file_stem() {
            ext = Path::new(stem)
                .extension()
                .and_then(|e| e.to_str())
                .map(|s| s.to_ascii_lowercase())
                .unwrap_or_default();
        }
    }

    match ext.as_str() {
        "fastq" | "fq" => SequenceFormat::Fastq,
        "fasta" | "fa" | "fna" => SequenceFormat::Fasta,
        _ => SequenceFormat::Lines,
    }
}

fn open_reader(path: &Path) -> Result<Box<dyn BufRead>, InputError> {
    let file = File::open(path)?;
    if is_gzip(path) {
        Ok(Box::new(BufReader::new(MultiGzDecoder::new(file))))
    } else {
        Ok(Box::new(BufReader::new(file)))
    }
}

fn push_upper(text: &mut String, bytes: &[u8]) -> Result<(), InputError> {
    let seq = std::str::from_utf8(bytes).map_err(|_| InputError::NonUtf8)?;
    text.extend(seq.chars().filter(|ch| !ch.is_whitespace()).map(|ch| ch.to_ascii_uppercase()));
    Ok(())
}

/// Read every sequence in `path` and join them into one text.
pub fn read_text(path: &Path) -> Result<String, InputError> {
    let format = infer_format(path);
    let reader = open_reader(path)?;
    let mut text = String::new();

    match format {
        SequenceFormat::Fastq => {
            for record in fastq::Reader::new(reader).records() {
                let record = record.map_err(|err| InputError::Record {
                    format: "FASTQ",
                    message: err.to_string(),
                })?;
                push_upper(&mut text, record.seq())?;
            }
        }
        SequenceFormat::Fasta => {
            for record in fasta::Reader::new(reader).records() {
                let record = record.map_err(|err| InputError::Record {
                    format: "FASTA",
                    message: err.to_string(),
                })?;
                push_upper(&mut text, record.seq())?;
            }
        }
        SequenceFormat::Lines => {
            let mut buf_reader = reader;
            let mut line = Vec::new();
            loop {
                line.clear();
                if buf_reader.read_until(b'\n', &mut line)? == 0 {
                    break;
                }
                push_upper(&mut text, &line)?;
            }
        }
    }

    debug!("Loaded {} chars ({:?}) from {}", text.len(), format, path.display());
    Ok(text)
}

/// Split a comma separated keyword list, dropping empty entries.
pub fn parse_keywords(list: &str) -> Vec<String> {
    list.split(',')
        .map(|word| word.trim().to_ascii_uppercase())
        .filter(|word| !word.is_empty())
        .collect()
}

/// True when `text` only uses DNA symbols (either case, `N` included).
pub fn is_dna(text: &str) -> bool {
    dna::n_alphabet().is_word(text.as_bytes())
}
