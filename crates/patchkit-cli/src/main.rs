//! `patchkit` command-line entry point

use anyhow::Context;
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use patchkit_cli::{demo, init_tracing, DemoConfig};
use std::path::PathBuf;

fn cli() -> Command {
    Command::new("patchkit")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Scoped, stacked attribute patching")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("log-level")
                .long("log-level")
                .global(true)
                .help("Tracing filter when RUST_LOG is unset (e.g. debug)"),
        )
        .subcommand(
            Command::new("demo")
                .about("Patch Foo.foo and Foo.faa together and print both")
                .arg(
                    Arg::new("config")
                        .long("config")
                        .value_parser(value_parser!(PathBuf))
                        .help("TOML file with foo, faa and [patch] settings"),
                )
                .arg(
                    Arg::new("foo")
                        .long("foo")
                        .help("Value returned by the foo double"),
                )
                .arg(
                    Arg::new("faa")
                        .long("faa")
                        .help("Value returned by the faa double"),
                )
                .arg(
                    Arg::new("json")
                        .long("json")
                        .action(ArgAction::SetTrue)
                        .help("Output the full report as JSON"),
                ),
        )
        .subcommand(Command::new("config").about("Print the default demo configuration"))
}

fn demo_config(args: &ArgMatches) -> anyhow::Result<DemoConfig> {
    let mut config = match args.get_one::<PathBuf>("config") {
        Some(path) => DemoConfig::load(path)?,
        None => DemoConfig::new(),
    };
    if let Some(foo) = args.get_one::<String>("foo") {
        config = config.with_foo(foo.as_str());
    }
    if let Some(faa) = args.get_one::<String>("faa") {
        config = config.with_faa(faa.as_str());
    }
    Ok(config)
}

fn main() -> anyhow::Result<()> {
    let matches = cli().get_matches();
    init_tracing(matches.get_one::<String>("log-level").map(String::as_str));

    match matches.subcommand() {
        Some(("config", _)) => {
            print!("{}", DemoConfig::new().to_toml()?);
        }
        Some(("demo", args)) => run_demo(args)?,
        _ => unreachable!("clap enforces a subcommand"),
    }
    Ok(())
}

fn run_demo(args: &ArgMatches) -> anyhow::Result<()> {
    let config = demo_config(args)?;
    let report = demo::run(&config).context("demo failed")?;
    if args.get_flag("json") {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("{}", report.patched.line());
    }
    anyhow::ensure!(report.is_restored(), "Foo was not restored after the demo");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        cli().debug_assert();
    }

    #[test]
    fn subcommand_is_required() {
        assert!(cli().try_get_matches_from(["patchkit"]).is_err());
        assert!(cli().try_get_matches_from(["patchkit", "demo", "--json"]).is_ok());
    }

    #[test]
    fn flags_override_defaults() {
        let matches = cli()
            .try_get_matches_from(["patchkit", "demo", "--foo", "Hi"])
            .unwrap();
        let (_, args) = matches.subcommand().unwrap();
        let config = demo_config(args).unwrap();
        assert_eq!(config.foo, "Hi");
        assert_eq!(config.faa, "Bye!");
        run_demo(args).unwrap();
    }
}
