use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, IsTerminal, Read, Write};
use std::path::Path;
use std::sync::Arc;

use clap::{Arg, Command};
use log::{debug, LevelFilter};

use textcodec::block::{BlockCodec, DEFAULT_BLOCK_SIZE};
use textcodec::utils::format_thousand;
use textcodec::{TextCodecConfig, WordList, DEFAULT_WORD_LIST};

const MODE_LIST: [&str; 2] = ["encode", "decode"];

fn read_input(input: &mut dyn Read, is_console: bool) -> Result<Vec<u8>, io::Error> {
    let mut buffer = Vec::new();

    if is_console {
        // Read chunks of data when input is from the console
        let mut chunk = [0; 1024]; // 1 KB chunks
        while let Ok(bytes_read) = input.read(&mut chunk) {
            if bytes_read == 0 {
                break;
            }
            buffer.extend_from_slice(&chunk[..bytes_read]);
        }
    } else {
        // Read the entire input at once when it's from a file
        input.read_to_end(&mut buffer)?;
    }

    Ok(buffer)
}

fn load_config(path: Option<&String>) -> Result<TextCodecConfig, Box<dyn std::error::Error>> {
    match path {
        Some(path) => {
            let text = fs::read_to_string(path)?;
            let config: TextCodecConfig = serde_json::from_str(&text)?;
            config.validate()?;
            debug!("loaded configuration from {}: {:?}", path, config);
            Ok(config)
        }
        None => Ok(TextCodecConfig::default()),
    }
}

fn load_word_list(path: Option<&String>) -> Result<Arc<WordList>, Box<dyn std::error::Error>> {
    match path {
        Some(path) => {
            let list = WordList::load(Path::new(path))?;
            debug!("loaded {} words from {}", list.len(), path);
            Ok(Arc::new(list))
        }
        None => Ok(Arc::clone(&DEFAULT_WORD_LIST)),
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    const BLUE: &str = "\x1B[1;34m";
    const RESET: &str = "\x1B[0m";

    let matches = Command::new("TextCodec Rust")
        .arg(
            Arg::new("mode")
                .short('m')
                .long("mode")
                .value_name("mode")
                .help("Operation: [encode|decode]")
                .required(true),
        )
        .arg(
            Arg::new("input")
                .short('i')
                .long("input")
                .value_name("file")
                .help("Read input from <file>."),
        )
        .arg(
            Arg::new("output")
                .short('o')
                .long("output")
                .value_name("file")
                .help("Write result to <file>."),
        )
        .arg(
            Arg::new("dict")
                .short('d')
                .long("dict")
                .value_name("file")
                .help("Static word list: packed text, .cbor or .zstd (default: built-in English list)"),
        )
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("json")
                .help("Codec configuration in JSON; missing fields take defaults"),
        )
        .arg(
            Arg::new("block_size")
                .short('b')
                .long("block-size")
                .value_name("bytes")
                .value_parser(clap::value_parser!(usize))
                .help("Maximum block size in bytes (default: 1 MiB)"),
        )
        .arg(
            Arg::new("parallel")
                .short('p')
                .long("parallel")
                .value_name("boolean")
                .default_value("true")
                .help("Process blocks in parallel: [true|false]"),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .action(clap::ArgAction::Count)
                .help("Increase log verbosity (-v debug, -vv trace)"),
        )
        .about(format!(
            "{BLUE}TextCodec Rust: Command Line Word Substitution Codec{RESET}"
        ))
        .get_matches();

    let level = match matches.get_count("verbose") {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    env_logger::Builder::from_default_env()
        .filter_level(level)
        .init();

    let mode = matches
        .get_one::<String>("mode")
        .map(String::as_str)
        .unwrap_or_default();
    if !MODE_LIST.contains(&mode) {
        eprintln!("Invalid mode: {}", mode);
        eprintln!("Valid Modes: {:?}", MODE_LIST);
        return Ok(());
    }
    let input_file = matches.get_one::<String>("input");
    let output_file = matches.get_one::<String>("output");
    let parallel = matches
        .get_one::<String>("parallel")
        .map_or(true, |value| value == "true");
    let block_size = matches
        .get_one::<usize>("block_size")
        .copied()
        .unwrap_or(DEFAULT_BLOCK_SIZE);

    let config = load_config(matches.get_one::<String>("config"))?;
    let words = load_word_list(matches.get_one::<String>("dict"))?;
    let mut codec = BlockCodec::new(config, words)?;
    codec.set_block_size(block_size)?;
    codec.set_parallel(parallel);

    // Determine input source
    let mut input: Box<dyn Read> = match input_file {
        Some(file_name) => Box::new(BufReader::new(File::open(file_name)?)),
        None => {
            if io::stdin().is_terminal() {
                eprintln!("{BLUE}Input text, <ctrl-z> or <ctrl-d> to submit:{RESET}");
            }
            Box::new(io::stdin())
        }
    };
    let is_console = input_file.is_none();
    let buffer = read_input(&mut *input, is_console)?;

    let (result, summary) = if mode == "encode" {
        let (data, stats) = codec.encode_with_stats(&buffer)?;
        let summary = format!(
            "{} -> {} bytes, {} of {} blocks transformed",
            format_thousand(buffer.len()),
            format_thousand(data.len()),
            stats.transformed,
            stats.blocks
        );
        (data, summary)
    } else {
        let data = codec.decode(&buffer)?;
        let summary = format!(
            "{} -> {} bytes",
            format_thousand(buffer.len()),
            format_thousand(data.len())
        );
        (data, summary)
    };

    let mut output = BufWriter::new(match output_file {
        Some(file_name) => Box::new(File::create(file_name)?) as Box<dyn Write>,
        None => Box::new(io::stdout()) as Box<dyn Write>,
    });
    output.write_all(&result)?;
    output.flush()?;

    let source = input_file.map_or("<stdin>", |s| s.as_str());
    let target = output_file.map_or("stdout", |s| s.as_str());
    eprintln!("{BLUE}{} completed: {source} -> {target} ({summary}){RESET}", capitalize(mode));

    Ok(())
}

fn capitalize(mode: &str) -> String {
    let mut chars = mode.chars();
    match chars.next() {
        Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
        None => String::new(),
    }
}
