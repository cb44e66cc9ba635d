mod json_io;

use crate::json_io::write_reference_json;
use clap::{Arg, Command};
use rustc_hash::FxHashSet;
use std::fs;
use textcodec::char_class::is_word_byte;
use textcodec::dictionary_lib::dict_entry::is_indexable_length;
use textcodec::WordList;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    const BLUE: &str = "\x1B[1;34m"; // Bold Blue
    const RESET: &str = "\x1B[0m"; // Reset color

    let matches = Command::new("Dictionary Generator")
        .about(format!(
            "{BLUE}Dict Generator: word list artifacts for the text codec{RESET}"
        ))
        .after_help(
            "Examples:\n\
         \n\
         dict-generate -i words.txt --format packed --output en.txt\n\
         dict-generate -i words.txt --format zstd --lowercase --output en.zstd\n\
         \n\
         The generated files can be loaded with WordList::load().\n"
        )
        .arg(
            Arg::new("input")
                .short('i')
                .long("input")
                .value_name("file")
                .required(true)
                .help("Plain word list, words separated by whitespace"),
        )
        .arg(
            Arg::new("format")
                .short('f')
                .long("format")
                .value_name("format")
                .default_value("zstd")
                .value_parser(["packed", "zstd", "cbor", "json"])
                .help("Dictionary format: [packed|zstd|cbor|json]"),
        )
        .arg(
            Arg::new("lowercase")
                .long("lowercase")
                .action(clap::ArgAction::SetTrue)
                .help("Lowercase ASCII letters before deduplication"),
        )
        .arg(
            Arg::new("max-words")
                .long("max-words")
                .value_name("n")
                .value_parser(clap::value_parser!(usize))
                .help("Keep only the first <n> words"),
        )
        .arg(
            Arg::new("pretty")
                .long("pretty")
                .action(clap::ArgAction::SetTrue)
                .help("Pretty-print JSON when --format json")
        )
        .arg(
            Arg::new("output")
                .short('o')
                .long("output")
                .value_name("filename")
                .help("Write generated dictionary to <filename>. If not specified, a default filename is used."),
        )
        .get_matches();

    let input = matches
        .get_one::<String>("input")
        .map(String::as_str)
        .unwrap_or_default();
    let dict_format = matches.get_one::<String>("format").map(String::as_str);
    let lowercase = matches.get_flag("lowercase");
    let max_words = matches.get_one::<usize>("max-words").copied().unwrap_or(usize::MAX);
    let pretty_json = matches.get_flag("pretty"); // default compact if false

    let default_output = match dict_format {
        Some("packed") => "word_list.txt",
        Some("zstd") => "word_list.zstd",
        Some("cbor") => "word_list.cbor",
        Some("json") => "word_list.json",
        _ => "word_list.unknown",
    };

    let output_file = matches
        .get_one::<String>("output")
        .map(|s| s.as_str())
        .unwrap_or(default_output);

    let raw = fs::read(input)?;
    let (words, dropped) = normalize_words(&raw, lowercase, max_words);
    let list = WordList::from_words(&words)?;
    eprintln!(
        "{BLUE}{} words kept, {} dropped (duplicates or invalid){RESET}",
        words.len(),
        dropped
    );

    match dict_format {
        Some("packed") => {
            fs::write(output_file, list.as_bytes())?;
            eprintln!("{BLUE}Dictionary saved in packed format at: {output_file}{RESET}");
        }
        Some("zstd") => {
            list.save_compressed(output_file)?;
            eprintln!("{BLUE}Dictionary saved in ZSTD format at: {output_file}{RESET}");
        }
        Some("cbor") => {
            list.serialize_to_cbor(output_file)?;
            eprintln!("{BLUE}Dictionary saved in CBOR format at: {output_file}{RESET}");
        }
        Some("json") => {
            write_reference_json(&list, output_file, pretty_json)?;
            let style = if pretty_json { "pretty" } else { "compact" };
            eprintln!("{BLUE}Dictionary saved in JSON ({style}) at: {output_file}{RESET}");
        }
        other => {
            let format_str = other.unwrap_or("unknown");
            eprintln!("{BLUE}Unsupported format: {format_str}{RESET}");
        }
    }

    Ok(())
}

/// Splits on whitespace, optionally lowercases, drops invalid words and
/// duplicates (first occurrence wins). Returns the kept words and the drop count.
fn normalize_words(raw: &[u8], lowercase: bool, max_words: usize) -> (Vec<Vec<u8>>, usize) {
    let mut seen: FxHashSet<Vec<u8>> = FxHashSet::default();
    let mut kept = Vec::new();
    let mut dropped = 0;

    for token in raw.split(|b| b.is_ascii_whitespace()).filter(|t| !t.is_empty()) {
        let word = if lowercase {
            token.to_ascii_lowercase()
        } else {
            token.to_vec()
        };
        let valid = is_indexable_length(word.len()) && word.iter().all(|&b| is_word_byte(b));
        if !valid || kept.len() >= max_words || !seen.insert(word.clone()) {
            dropped += 1;
            continue;
        }
        kept.push(word);
    }
    (kept, dropped)
}
