//! `imgcrop` command-line tool

use anyhow::Result;
use clap::{value_parser, Arg, ArgAction, Command};
use imgcrop_value::{CodecOptions, Multiplicity};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

fn multiple_arg() -> Arg {
    Arg::new("multiple")
        .long("multiple")
        .action(ArgAction::SetTrue)
        .help("Property uses multi-valued (array) storage")
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Command::new("imgcrop")
        .version(imgcrop_value::VERSION)
        .about("Image crop field values and edit sessions")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(
            Command::new("decode")
                .about("Decode a stored property value")
                .arg(
                    Arg::new("raw")
                        .required(true)
                        .help("Stored value as JSON, or the bare stored string"),
                )
                .arg(multiple_arg()),
        )
        .subcommand(
            Command::new("encode")
                .about("Encode a structured value for storage")
                .arg(
                    Arg::new("json")
                        .required(true)
                        .help("Structured value as JSON"),
                )
                .arg(multiple_arg())
                .arg(
                    Arg::new("persist-crop-version")
                        .long("persist-crop-version")
                        .action(ArgAction::SetTrue)
                        .help("Also store lastCropVersion"),
                ),
        )
        .subcommand(
            Command::new("simulate")
                .about("Run a scripted edit session against an in-memory catalog")
                .arg(
                    Arg::new("config")
                        .long("config")
                        .value_parser(value_parser!(PathBuf))
                        .help("TOML config with [session] and [codec] tables"),
                ),
        );

    let matches = cli.get_matches();

    match matches.subcommand() {
        Some(("decode", args)) => {
            let raw = args.get_one::<String>("raw").map_or("", String::as_str);
            let multiplicity = Multiplicity::from(args.get_flag("multiple"));
            println!("{}", imgcrop_cli::decode(raw, multiplicity)?);
        }
        Some(("encode", args)) => {
            let json = args.get_one::<String>("json").map_or("", String::as_str);
            let multiplicity = Multiplicity::from(args.get_flag("multiple"));
            let options = CodecOptions {
                persist_crop_version: args.get_flag("persist-crop-version"),
            };
            println!("{}", imgcrop_cli::encode(json, multiplicity, options)?);
        }
        Some(("simulate", args)) => {
            let config = args.get_one::<PathBuf>("config");
            println!("{}", imgcrop_cli::simulate(config.map(PathBuf::as_path)).await?);
        }
        _ => {}
    }

    Ok(())
}
