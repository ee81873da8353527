// Command-line interface for uniast
//
// This binary converts between XWiki-flavoured Markdown and the Universal AST (UniAst), printed
// as JSON. The conversions themselves live in the uniast-markdown crate; this crate only deals with
// files, configuration and process exit codes.
//
// Usage:
//  uniast parse <input.md> [--output <file>]        - Markdown to UniAst JSON
//  uniast serialize <input.json> [--output <file>]  - UniAst JSON to Markdown
//  uniast roundtrip <input.md> [--output <file>]    - Markdown to UniAst and back
//
// `-` reads the input from stdin. Output goes to stdout unless --output is given.
//
// Configuration:
//
// The embedded defaults are layered with ./uniast.toml when present, then with the file given to
// --config. --internal-links overrides parser.support_flexmark_internal_links.

use clap::{Arg, ArgAction, ArgMatches, Command, ValueHint};
use log::debug;
use std::fs;
use std::io::{self, Read};
use std::sync::Arc;
use uniast_config::{Loader, UniastConfig};
use uniast_markdown::references::{
    DefaultInternalLinksSerializer, DefaultReferenceHandler, DefaultReferenceParser,
};
use uniast_markdown::{
    MarkdownParser, MarkdownParserConfiguration, MarkdownSerializer, UniAst,
};

fn input_arg(help: &'static str) -> Arg {
    Arg::new("input")
        .help(help)
        .required(true)
        .index(1)
        .value_hint(ValueHint::FilePath)
}

fn output_arg() -> Arg {
    Arg::new("output")
        .long("output")
        .short('o')
        .help("Output file path (defaults to stdout)")
        .value_hint(ValueHint::FilePath)
}

fn build_cli() -> Command {
    Command::new("uniast")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Convert between XWiki Markdown and the Universal AST")
        .long_about(
            "uniast is a command-line tool converting XWiki-flavoured Markdown (with \
            [[links]], ![[images]] and {{macros}}) to and from the Universal AST.\n\n\
            Examples:\n  \
            uniast parse page.md                  # UniAst JSON on stdout\n  \
            uniast parse page.md -o page.json     # UniAst JSON to a file\n  \
            uniast serialize page.json            # Markdown on stdout\n  \
            uniast roundtrip page.md              # Normalized Markdown\n  \
            cat page.md | uniast parse -          # Read from stdin",
        )
        .arg_required_else_help(true)
        .subcommand_required(true)
        .arg(
            Arg::new("config")
                .long("config")
                .value_name("PATH")
                .help("Path to a uniast.toml configuration file")
                .value_hint(ValueHint::FilePath)
                .global(true),
        )
        .arg(
            Arg::new("internal-links")
                .long("internal-links")
                .help("Keep standard Markdown links external, only [[...]] links are internal")
                .action(ArgAction::SetTrue)
                .global(true),
        )
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .short('v')
                .help("Log conversion details on stderr")
                .action(ArgAction::SetTrue)
                .global(true),
        )
        .subcommand(
            Command::new("parse")
                .about("Convert Markdown into UniAst JSON")
                .arg(input_arg("Markdown file, or - for stdin"))
                .arg(output_arg()),
        )
        .subcommand(
            Command::new("serialize")
                .about("Convert UniAst JSON into Markdown")
                .arg(input_arg("UniAst JSON file, or - for stdin"))
                .arg(output_arg()),
        )
        .subcommand(
            Command::new("roundtrip")
                .about("Convert Markdown into UniAst and back")
                .long_about(
                    "Parse Markdown and serialize the result again. The output is the \
                    normalized form of the input: '*' bullets, '_' emphasis, quoted macro \
                    parameters.",
                )
                .arg(input_arg("Markdown file, or - for stdin"))
                .arg(output_arg()),
        )
}

fn main() {
    let matches = build_cli().get_matches();

    let log_level = if matches.get_flag("verbose") {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Warn
    };
    env_logger::builder().filter_level(log_level).init();

    let config = load_cli_config(
        matches.get_one::<String>("config").map(|s| s.as_str()),
        matches.get_flag("internal-links"),
    );

    let runtime = tokio::runtime::Builder::new_current_thread()
        .build()
        .unwrap_or_else(|e| {
            eprintln!("Failed to start the async runtime: {e}");
            std::process::exit(1);
        });

    let (input, output) = match matches.subcommand() {
        Some((_, sub_matches)) => io_args(sub_matches),
        None => {
            eprintln!("Unknown subcommand. Use --help for usage information.");
            std::process::exit(1);
        }
    };
    let source = read_input(input);

    let result = match matches.subcommand_name() {
        Some("parse") => runtime.block_on(handle_parse_command(&source, &config)),
        Some("serialize") => runtime.block_on(handle_serialize_command(&source)),
        Some("roundtrip") => runtime.block_on(handle_roundtrip_command(&source, &config)),
        _ => {
            eprintln!("Unknown subcommand. Use --help for usage information.");
            std::process::exit(1);
        }
    };

    let content = result.unwrap_or_else(|e| {
        eprintln!("Conversion error: {e}");
        std::process::exit(1);
    });
    write_output(output, &content);
}

fn io_args(matches: &ArgMatches) -> (&str, Option<&str>) {
    let input = matches
        .get_one::<String>("input")
        .map(|s| s.as_str())
        .unwrap_or("-");
    let output = matches.get_one::<String>("output").map(|s| s.as_str());
    (input, output)
}

/// Handle the parse command: Markdown to pretty JSON.
async fn handle_parse_command(source: &str, config: &UniastConfig) -> Result<String, String> {
    let ast = build_parser(config)
        .parse_markdown(source)
        .await
        .map_err(|e| e.to_string())?;
    serde_json::to_string_pretty(&ast).map_err(|e| e.to_string())
}

/// Handle the serialize command: JSON to Markdown.
async fn handle_serialize_command(source: &str) -> Result<String, String> {
    let ast: UniAst = serde_json::from_str(source).map_err(|e| format!("invalid UniAst JSON: {e}"))?;
    build_serializer()
        .to_markdown(&ast)
        .await
        .map_err(|e| e.to_string())
}

/// Handle the roundtrip command: Markdown to UniAst and back.
async fn handle_roundtrip_command(source: &str, config: &UniastConfig) -> Result<String, String> {
    let ast = build_parser(config)
        .parse_markdown(source)
        .await
        .map_err(|e| e.to_string())?;
    debug!("round-tripping {} blocks", ast.blocks.len());
    build_serializer()
        .to_markdown(&ast)
        .await
        .map_err(|e| e.to_string())
}

fn build_parser(config: &UniastConfig) -> MarkdownParser {
    MarkdownParser::new(
        Arc::new(DefaultReferenceParser::default()),
        Arc::new(DefaultReferenceHandler),
        Arc::new(MarkdownParserConfiguration::from(&config.parser)),
    )
    .with_macros(Arc::new(config.macro_registry()))
}

fn build_serializer() -> MarkdownSerializer {
    MarkdownSerializer::new(Arc::new(DefaultInternalLinksSerializer))
}

fn read_input(path: &str) -> String {
    if path == "-" {
        let mut source = String::new();
        io::stdin().read_to_string(&mut source).unwrap_or_else(|e| {
            eprintln!("Error reading stdin: {e}");
            std::process::exit(1);
        });
        return source;
    }
    fs::read_to_string(path).unwrap_or_else(|e| {
        eprintln!("Error reading file '{path}': {e}");
        std::process::exit(1);
    })
}

fn write_output(output: Option<&str>, content: &str) {
    match output {
        Some(path) => fs::write(path, format!("{content}\n")).unwrap_or_else(|e| {
            eprintln!("Error writing file '{path}': {e}");
            std::process::exit(1);
        }),
        None => println!("{content}"),
    }
}

fn load_cli_config(explicit_path: Option<&str>, internal_links: bool) -> UniastConfig {
    let loader = Loader::new().with_optional_file("uniast.toml");
    let loader = if let Some(path) = explicit_path {
        loader.with_file(path)
    } else {
        loader
    };
    let loader = if internal_links {
        loader
            .set_override("parser.support_flexmark_internal_links", true)
            .unwrap_or_else(|err| {
                eprintln!("Failed to apply --internal-links: {err}");
                std::process::exit(1);
            })
    } else {
        loader
    };

    loader.build().unwrap_or_else(|err| {
        eprintln!("Failed to load configuration: {err}");
        std::process::exit(1);
    })
}
