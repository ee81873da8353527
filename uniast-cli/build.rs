use clap::{Arg, ArgAction, Command, ValueHint};
use clap_complete::{generate_to, shells::*};
use std::env;
use std::io::Error;

// Mirror of the command tree from src/main.rs
// We need to duplicate this here since build scripts can't access src/ modules
const SUBCOMMANDS: &[(&str, &str)] = &[
    ("parse", "Convert Markdown into UniAst JSON"),
    ("serialize", "Convert UniAst JSON into Markdown"),
    ("roundtrip", "Convert Markdown into UniAst and back"),
];

fn main() -> Result<(), Error> {
    let outdir = match env::var_os("OUT_DIR") {
        None => return Ok(()),
        Some(outdir) => outdir,
    };

    let mut cmd = Command::new("uniast")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Convert between XWiki Markdown and the Universal AST")
        .arg_required_else_help(true)
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
        );

    for (name, about) in SUBCOMMANDS {
        cmd = cmd.subcommand(
            Command::new(*name)
                .about(*about)
                .arg(
                    Arg::new("input")
                        .help("Input file, or - for stdin")
                        .required(true)
                        .index(1)
                        .value_hint(ValueHint::FilePath),
                )
                .arg(
                    Arg::new("output")
                        .long("output")
                        .short('o')
                        .help("Output file path (defaults to stdout)")
                        .value_hint(ValueHint::FilePath),
                ),
        );
    }

    // Generate completions for bash
    generate_to(Bash, &mut cmd, "uniast", &outdir)?;

    // Generate completions for zsh
    generate_to(Zsh, &mut cmd, "uniast", &outdir)?;

    // Generate completions for fish
    generate_to(Fish, &mut cmd, "uniast", &outdir)?;

    println!("cargo:warning=Shell completions generated in {outdir:?}");

    Ok(())
}
