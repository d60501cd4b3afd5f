use std::fs;
use std::io::{self, Read, Write};
use std::path::PathBuf;
use std::process;

use clap::{Parser, ValueEnum};
use is_terminal::IsTerminal;
use tidyjson::{CommentPolicy, EolStyle, FormatOptions, Formatter, NumberAlignment};
use tracing_subscriber::EnvFilter;

/// A human-friendly JSON formatter with smart line breaks and table
/// alignment.
///
/// tjson reads JSON from stdin or files and writes it back formatted:
/// compact where possible, aligned into columns where siblings share a
/// shape. It can also minify, and it understands JSON-with-comments.
#[derive(Parser, Debug)]
#[command(name = "tjson")]
#[command(version, about, long_about = None)]
struct Args {
    /// Input file(s). Reads from stdin when none are given.
    #[arg(value_name = "FILE")]
    files: Vec<PathBuf>,

    /// Output file. Writes to stdout when not given.
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Colorize output for the terminal (stdout only).
    #[arg(long, value_enum, default_value = "auto")]
    color: ColorMode,

    /// Minify instead of formatting.
    #[arg(short, long)]
    compact: bool,

    /// Maximum total line length, including indentation.
    #[arg(short = 'w', long, default_value = "120")]
    max_width: usize,

    /// Maximum content width for inline elements and table rows,
    /// excluding indentation. Unlimited when not given.
    #[arg(long)]
    max_inline_length: Option<usize>,

    /// Spaces per indentation level.
    #[arg(short, long, default_value = "4")]
    indent: usize,

    /// Indent with tabs instead of spaces.
    #[arg(short = 't', long)]
    tabs: bool,

    /// Line ending style.
    #[arg(long, value_enum, default_value = "lf")]
    eol: EolArg,

    /// How to handle comments in the input.
    #[arg(long, value_enum, default_value = "error")]
    comments: CommentsArg,

    /// Accept trailing commas in the input.
    #[arg(long)]
    trailing_commas: bool,

    /// Carry blank lines from the input into the output.
    #[arg(long)]
    preserve_blanks: bool,

    /// Number alignment in table columns.
    #[arg(long, value_enum, default_value = "decimal")]
    number_align: NumberAlignArg,

    /// Maximum nesting depth for single-line containers (-1 disables).
    #[arg(long, default_value = "2")]
    max_inline_complexity: isize,

    /// Maximum nesting depth for table rows (-1 disables).
    #[arg(long, default_value = "2")]
    max_table_complexity: isize,

    /// Pad inside brackets of containers holding only primitives.
    #[arg(long)]
    simple_bracket_padding: bool,

    /// Don't pad inside brackets of containers holding containers.
    #[arg(long)]
    no_nested_bracket_padding: bool,

    /// Treat input as JSON Lines (one document per line).
    #[arg(long)]
    jsonl: bool,

    /// What to do with lines that fail to parse (with --jsonl).
    #[arg(long, value_enum, default_value = "fail")]
    jsonl_errors: JsonlErrors,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum EolArg {
    Lf,
    Crlf,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum CommentsArg {
    Error,
    Remove,
    Preserve,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum NumberAlignArg {
    Left,
    Right,
    Decimal,
    Normalize,
}

/// How to handle lines that fail to parse in JSON Lines mode.
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
enum JsonlErrors {
    /// Stop at the first bad line.
    #[default]
    Fail,
    /// Drop bad lines.
    Skip,
    /// Copy bad lines through unchanged.
    Passthrough,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ColorMode {
    Auto,
    Always,
    Never,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .compact()
        .init();

    let args = Args::parse();
    if let Err(e) = run(args) {
        eprintln!("tjson: {}", e);
        process::exit(1);
    }
}

fn run(args: Args) -> Result<(), Box<dyn std::error::Error>> {
    let input = if args.files.is_empty() {
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer)?;
        buffer
    } else {
        let mut combined = String::new();
        for path in &args.files {
            let content = fs::read_to_string(path)
                .map_err(|e| format!("cannot read '{}': {}", path.display(), e))?;
            combined.push_str(&content);
        }
        combined
    };

    let mut formatter = Formatter::new();
    apply_options(&mut formatter.options, &args);

    let output = if args.jsonl {
        process_jsonl(&input, &mut formatter, args.compact, args.jsonl_errors)?
    } else if args.compact {
        formatter.minify(&input)?
    } else {
        formatter.reformat(&input, 0)?
    };

    let output = if args.output.is_none() && should_colorize(args.color) {
        colorize(&output)
    } else {
        output
    };

    match args.output {
        Some(path) => fs::write(&path, &output)
            .map_err(|e| format!("cannot write '{}': {}", path.display(), e))?,
        None => io::stdout().write_all(output.as_bytes())?,
    }

    Ok(())
}

fn apply_options(opts: &mut FormatOptions, args: &Args) {
    opts.max_total_line_length = args.max_width;
    if let Some(cap) = args.max_inline_length {
        opts.max_inline_length = cap;
    }
    opts.indent_spaces = args.indent;
    opts.use_tab_to_indent = args.tabs;

    opts.json_eol_style = match args.eol {
        EolArg::Lf => EolStyle::Lf,
        EolArg::Crlf => EolStyle::Crlf,
    };
    opts.comment_policy = match args.comments {
        CommentsArg::Error => CommentPolicy::TreatAsError,
        CommentsArg::Remove => CommentPolicy::Remove,
        CommentsArg::Preserve => CommentPolicy::Preserve,
    };
    opts.number_list_alignment = match args.number_align {
        NumberAlignArg::Left => NumberAlignment::Left,
        NumberAlignArg::Right => NumberAlignment::Right,
        NumberAlignArg::Decimal => NumberAlignment::Decimal,
        NumberAlignArg::Normalize => NumberAlignment::Normalize,
    };

    opts.allow_trailing_commas = args.trailing_commas;
    opts.preserve_blank_lines = args.preserve_blanks;
    opts.max_inline_complexity = args.max_inline_complexity;
    opts.max_table_row_complexity = args.max_table_complexity;
    opts.simple_bracket_padding = args.simple_bracket_padding;
    opts.nested_bracket_padding = !args.no_nested_bracket_padding;
}

/// Format or minify one JSON document per input line.
fn process_jsonl(
    input: &str,
    formatter: &mut Formatter,
    compact: bool,
    error_policy: JsonlErrors,
) -> Result<String, Box<dyn std::error::Error>> {
    let mut output_lines = Vec::new();

    for (line_num, line) in input.lines().enumerate() {
        if line.trim().is_empty() {
            output_lines.push(String::new());
            continue;
        }

        let result = if compact {
            formatter.minify(line)
        } else {
            formatter.reformat(line, 0)
        };

        match result {
            Ok(formatted) => output_lines.push(formatted.trim_end().to_string()),
            Err(e) => match error_policy {
                JsonlErrors::Fail => return Err(format!("line {}: {}", line_num + 1, e).into()),
                JsonlErrors::Skip => continue,
                JsonlErrors::Passthrough => output_lines.push(line.to_string()),
            },
        }
    }

    let mut result = output_lines.join("\n");
    if !result.is_empty() {
        result.push('\n');
    }
    Ok(result)
}

fn should_colorize(mode: ColorMode) -> bool {
    match mode {
        ColorMode::Auto => io::stdout().is_terminal(),
        ColorMode::Always => true,
        ColorMode::Never => false,
    }
}

const RESET: &str = "\x1b[0m";
const KEY: &str = "\x1b[94m";
const STR: &str = "\x1b[32m";
const NUM: &str = "\x1b[36m";
const LIT: &str = "\x1b[35m";
const PUNCT: &str = "\x1b[2m";
const COMMENT: &str = "\x1b[90m";

/// ANSI-colorize formatted output. Works on the formatter's own output,
/// so the syntax is known-good; anything unrecognized passes through.
fn colorize(input: &str) -> String {
    let mut out = String::with_capacity(input.len() * 2);
    // true = the next string in this object is a property key
    let mut object_stack: Vec<bool> = Vec::new();
    let mut rest = input;

    while let Some(ch) = rest.chars().next() {
        match ch {
            '"' => {
                let len = string_token_len(rest);
                let color = if object_stack.last() == Some(&true) {
                    KEY
                } else {
                    STR
                };
                paint(&mut out, color, &rest[..len]);
                rest = &rest[len..];
            }
            '/' if rest.starts_with("//") => {
                let len = rest.find('\n').unwrap_or(rest.len());
                paint(&mut out, COMMENT, &rest[..len]);
                rest = &rest[len..];
            }
            '/' if rest.starts_with("/*") => {
                let len = rest.find("*/").map(|i| i + 2).unwrap_or(rest.len());
                paint(&mut out, COMMENT, &rest[..len]);
                rest = &rest[len..];
            }
            '-' | '0'..='9' => {
                let len = rest
                    .find(|c: char| {
                        !c.is_ascii_digit() && !matches!(c, '-' | '+' | '.' | 'e' | 'E')
                    })
                    .unwrap_or(rest.len());
                paint(&mut out, NUM, &rest[..len]);
                rest = &rest[len..];
            }
            't' if rest.starts_with("true") => {
                paint(&mut out, LIT, "true");
                rest = &rest[4..];
            }
            'f' if rest.starts_with("false") => {
                paint(&mut out, LIT, "false");
                rest = &rest[5..];
            }
            'n' if rest.starts_with("null") => {
                paint(&mut out, LIT, "null");
                rest = &rest[4..];
            }
            '{' => {
                object_stack.push(true);
                paint(&mut out, PUNCT, "{");
                rest = &rest[1..];
            }
            '}' => {
                object_stack.pop();
                paint(&mut out, PUNCT, "}");
                rest = &rest[1..];
            }
            '[' | ']' => {
                paint(&mut out, PUNCT, &rest[..1]);
                rest = &rest[1..];
            }
            ':' => {
                if let Some(expect_key) = object_stack.last_mut() {
                    *expect_key = false;
                }
                paint(&mut out, PUNCT, ":");
                rest = &rest[1..];
            }
            ',' => {
                if let Some(expect_key) = object_stack.last_mut() {
                    *expect_key = true;
                }
                paint(&mut out, PUNCT, ",");
                rest = &rest[1..];
            }
            _ => {
                out.push(ch);
                rest = &rest[ch.len_utf8()..];
            }
        }
    }

    out
}

/// Byte length of the string token at the start of `text`, including both
/// quotes, stopping early at a newline or end of input.
fn string_token_len(text: &str) -> usize {
    let mut escaped = false;
    for (i, ch) in text.char_indices().skip(1) {
        if escaped {
            escaped = false;
            continue;
        }
        match ch {
            '\\' => escaped = true,
            '"' => return i + 1,
            '\n' => return i,
            _ => {}
        }
    }
    text.len()
}

fn paint(out: &mut String, color: &str, text: &str) {
    out.push_str(color);
    out.push_str(text);
    out.push_str(RESET);
}
