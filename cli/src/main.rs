use std::error::Error;
use std::fs;
use std::io::{self, Read, Write};
use std::path::Path;

use clap::{Parser, ValueEnum};
use serde::Serialize;
use serde_json::Value;
use serde_urlform::{DecodeOptions, EncodeOptions, KeyMapping, NilEncoding, SpaceEncoding};
use tracing::{debug, info, Level};

#[derive(Parser, Debug)]
#[command(
    name = "urlform",
    version,
    about = "Convert between JSON and bracketed form-urlencoded strings"
)]
struct Args {
    /// Input file path (.json, .form or .txt). Omit or use '-' to read from stdin.
    input: Option<String>,

    /// Output file path (prints to stdout if omitted).
    #[arg(short, long, value_name = "file")]
    output: Option<String>,

    /// Force encode mode: JSON in, form string out.
    #[arg(short = 'e', long)]
    encode: bool,

    /// Force decode mode: form string in, JSON out.
    #[arg(short = 'd', long, conflicts_with = "encode")]
    decode: bool,

    /// Key mapping applied to object keys on the wire.
    #[arg(long = "key-mapping", value_enum, value_name = "mode", default_value_t = KeyMappingArg::Default)]
    key_mapping: KeyMappingArg,

    /// Omit null values instead of writing a bare key.
    #[arg(long = "drop-nil")]
    drop_nil: bool,

    /// Write spaces as '+' instead of %20.
    #[arg(long = "plus-spaces")]
    plus_spaces: bool,

    /// Sort keys alphabetically when encoding.
    #[arg(long)]
    sort: bool,

    /// JSON indentation when decoding (0 for compact output).
    #[arg(long, value_name = "number", default_value_t = 2)]
    indent: usize,

    /// Log codec activity to stderr at debug level.
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum KeyMappingArg {
    Default,
    Snake,
    Camel,
}

impl From<KeyMappingArg> for KeyMapping {
    fn from(value: KeyMappingArg) -> Self {
        match value {
            KeyMappingArg::Default => KeyMapping::UseDefaultKeys,
            KeyMappingArg::Snake => KeyMapping::SnakeCase,
            KeyMappingArg::Camel => KeyMapping::CamelCase,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Mode {
    Encode,
    Decode,
}

#[derive(Debug)]
enum InputSource {
    Stdin,
    File(String),
}

fn main() {
    if let Err(err) = run() {
        eprintln!("ERROR  {err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();
    init_tracing(args.verbose);

    let (input_text, input_source) = read_input(args.input.as_deref())?;
    let mode = resolve_mode(&args, &input_source)?;
    debug!(?mode, ?input_source, bytes = input_text.len(), "read input");

    match mode {
        Mode::Encode => run_encode(&args, &input_text, &input_source),
        Mode::Decode => run_decode(&args, &input_text, &input_source),
    }
}

fn init_tracing(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn run_encode(args: &Args, input: &str, input_source: &InputSource) -> Result<(), Box<dyn Error>> {
    let key_mapping = KeyMapping::from(args.key_mapping);
    let value = rename_keys(serde_json::from_str(input)?, &|key: &str| {
        key_mapping.encode(key).into_owned()
    });
    let mut options = EncodeOptions::new().with_alphabetize_keys(args.sort);
    if args.drop_nil {
        options = options.with_nil_encoding(NilEncoding::DropKey);
    }
    if args.plus_spaces {
        options = options.with_space_encoding(SpaceEncoding::PlusReplaced);
    }

    let output = output_path(args.output.as_deref());
    let mut writer = open_output(output)?;
    serde_urlform::to_writer_with_options(&mut writer, &value, &options)?;
    writer.flush()?;
    if let Some(path) = output {
        report_status(Mode::Encode, input_source, path);
    }
    Ok(())
}

fn run_decode(args: &Args, input: &str, input_source: &InputSource) -> Result<(), Box<dyn Error>> {
    let key_mapping = KeyMapping::from(args.key_mapping);

    // Files and pipes usually end with a newline that is not part of the last value.
    let wire = input.trim_end_matches(['\r', '\n']);
    let value: Value = serde_urlform::from_str_with_options(wire, &DecodeOptions::new())?;
    let value = rename_keys(value, &|key: &str| key_mapping.decode(key).into_owned());
    let output = output_path(args.output.as_deref());
    let mut writer = open_output(output)?;
    write_json(&mut writer, &value, args.indent)?;
    writer.flush()?;
    if let Some(path) = output {
        report_status(Mode::Decode, input_source, path);
    }
    Ok(())
}

/// JSON objects reach the codec as maps, whose keys are never mapped; treat
/// every object key as a field name instead.
fn rename_keys(value: Value, rename: &dyn Fn(&str) -> String) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(key, value)| (rename(&key), rename_keys(value, rename)))
                .collect(),
        ),
        Value::Array(items) => {
            Value::Array(items.into_iter().map(|item| rename_keys(item, rename)).collect())
        }
        other => other,
    }
}

fn resolve_mode(args: &Args, input_source: &InputSource) -> Result<Mode, Box<dyn Error>> {
    if args.encode {
        return Ok(Mode::Encode);
    }

    if args.decode {
        return Ok(Mode::Decode);
    }

    match input_source {
        InputSource::Stdin => Ok(Mode::Encode),
        InputSource::File(path) => match Path::new(path)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase())
            .as_deref()
        {
            Some("json") => Ok(Mode::Encode),
            Some("form" | "txt") => Ok(Mode::Decode),
            _ => Err("unable to auto-detect mode; use --encode or --decode".into()),
        },
    }
}

fn read_input(input: Option<&str>) -> Result<(String, InputSource), Box<dyn Error>> {
    match input {
        None | Some("-") => {
            let mut buf = String::new();
            io::stdin().read_to_string(&mut buf)?;
            Ok((buf, InputSource::Stdin))
        }
        Some(path) => {
            let buf = fs::read_to_string(path)?;
            Ok((buf, InputSource::File(path.to_string())))
        }
    }
}

/// `None` and `-` both mean stdout.
fn output_path(output: Option<&str>) -> Option<&Path> {
    output.filter(|path| *path != "-").map(Path::new)
}

fn open_output(path: Option<&Path>) -> io::Result<Box<dyn Write>> {
    Ok(match path {
        Some(path) => Box::new(io::BufWriter::new(fs::File::create(path)?)),
        None => Box::new(io::stdout().lock()),
    })
}

fn write_json(writer: &mut dyn Write, value: &Value, indent: usize) -> Result<(), Box<dyn Error>> {
    if indent == 0 {
        serde_json::to_writer(writer, value)?;
        return Ok(());
    }

    let indent_bytes = vec![b' '; indent];
    let formatter = serde_json::ser::PrettyFormatter::with_indent(&indent_bytes);
    let mut serializer = serde_json::Serializer::with_formatter(writer, formatter);
    value.serialize(&mut serializer)?;
    Ok(())
}

fn report_status(mode: Mode, input_source: &InputSource, output: &Path) {
    let input = match input_source {
        InputSource::Stdin => "stdin".to_string(),
        InputSource::File(path) => relative_to_cwd(Path::new(path)),
    };
    let verb = match mode {
        Mode::Encode => "encoded",
        Mode::Decode => "decoded",
    };
    info!(%input, output = %relative_to_cwd(output), "{verb} input");
}

fn relative_to_cwd(path: &Path) -> String {
    std::env::current_dir()
        .ok()
        .and_then(|cwd| path.strip_prefix(cwd).ok().map(Path::to_path_buf))
        .unwrap_or_else(|| path.to_path_buf())
        .display()
        .to_string()
}
