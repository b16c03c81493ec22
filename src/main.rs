use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::process;

use idl_bindgen::config::{rename_pairs, ConfigError};
use idl_bindgen::{Backend, BindingGenerator, ConfigFile, GenerationReporter, GeneratorConfig, ReportFormat, SourceLocator};

#[derive(Parser, Debug)]
#[command(name = "idl-bindgen")]
#[command(version)]
#[command(about = "Generate C++, Flow and JavaScript bindings from WebIDL documents")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate a C++ header and source file per definition
    Cpp {
        #[command(flatten)]
        common: CommonArgs,

        /// Namespace enclosing the generated classes
        #[arg(long)]
        namespace: Option<String>,

        /// Extension of the generated source files
        #[arg(long)]
        suffix: Option<String>,
    },

    /// Generate a Flow type declaration per definition
    Flow {
        #[command(flatten)]
        common: CommonArgs,
    },

    /// Generate one JavaScript module documenting every definition
    Js {
        #[command(flatten)]
        common: CommonArgs,

        /// Name of the generated module
        #[arg(long)]
        bundle: Option<String>,
    },

    /// Write the merged definitions back out as IDL
    Extract {
        #[command(flatten)]
        common: CommonArgs,
    },
}

#[derive(Args, Debug)]
struct CommonArgs {
    /// Local paths or http(s) URLs of IDL or HTML documents
    #[arg(required = true, value_name = "INPUTS")]
    inputs: Vec<String>,

    /// Output directory
    #[arg(long, value_name = "DIR")]
    out: Option<PathBuf>,

    /// Rename definitions and type references (can be specified multiple times)
    #[arg(long, num_args = 2, value_names = ["PATTERN", "REPLACEMENT"], action = ArgAction::Append)]
    rename: Vec<String>,

    /// Only keep definitions whose name matches every such pattern
    #[arg(long, value_name = "PATTERN")]
    only: Vec<String>,

    /// Drop definitions whose name matches any such pattern
    #[arg(long, value_name = "PATTERN")]
    skip: Vec<String>,

    /// Abort on the first document that cannot be sourced or parsed
    #[arg(long)]
    bail: bool,

    /// Merge partial and repeated definitions (default)
    #[arg(long, overrides_with = "no_merge")]
    merge: bool,

    /// Fail when a definition is declared more than once
    #[arg(long, overrides_with = "merge")]
    no_merge: bool,

    /// YAML configuration file
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Report format
    #[arg(long, value_enum, default_value = "console")]
    report: ReportArg,

    /// Log debug output
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum ReportArg {
    Console,
    Json,
    Yaml,
}

impl From<ReportArg> for ReportFormat {
    fn from(arg: ReportArg) -> Self {
        match arg {
            ReportArg::Console => ReportFormat::Console,
            ReportArg::Json => ReportFormat::Json,
            ReportArg::Yaml => ReportFormat::Yaml,
        }
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let (backend, common) = match &cli.command {
        Command::Cpp { common, .. } => (Backend::Cpp, common),
        Command::Flow { common } => (Backend::Flow, common),
        Command::Js { common, .. } => (Backend::JavaScript, common),
        Command::Extract { common } => (Backend::Idl, common),
    };

    init_tracing(common.verbose);

    let config = match build_config(&cli.command, common) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("\n❌ Error: {}", e);
            process::exit(1);
        }
    };

    let locators: Vec<SourceLocator> = common.inputs.iter().map(|input| SourceLocator::parse(input)).collect();
    let result = match BindingGenerator::new(config).run(backend, &locators).await {
        Ok(result) => result,
        Err(e) => {
            eprintln!("\n❌ Error: {}", e);
            eprintln!("\nNo files were written.");
            process::exit(1);
        }
    };

    let reporter = GenerationReporter::new().with_format(common.report.into());
    let report = reporter.generate_report(&result);
    match reporter.format_report(&report) {
        Ok(formatted) => println!("{}", formatted),
        Err(e) => {
            eprintln!("\n❌ Error: {}", e);
            process::exit(1);
        }
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_level.into()),
        )
        .with_writer(std::io::stderr)
        .init();
}

/// Config file values first, then command-line values appended or overriding
fn build_config(command: &Command, common: &CommonArgs) -> Result<GeneratorConfig, ConfigError> {
    let mut config = match &common.config {
        Some(path) => ConfigFile::load(path)?.into_config()?,
        None => GeneratorConfig::new(),
    };

    for pattern in &common.only {
        config = config.with_only(pattern)?;
    }
    for pattern in &common.skip {
        config = config.with_skip(pattern)?;
    }
    for (pattern, replacement) in rename_pairs(&common.rename)? {
        config = config.with_rename(&pattern, &replacement)?;
    }
    if common.bail {
        config = config.with_bail(true);
    }
    if common.no_merge {
        config = config.with_merge(false);
    } else if common.merge {
        config = config.with_merge(true);
    }
    if let Some(out) = &common.out {
        config = config.with_out_dir(out);
    }

    match command {
        Command::Cpp { namespace, suffix, .. } => {
            if let Some(namespace) = namespace {
                config.namespace = namespace.clone();
            }
            if let Some(suffix) = suffix {
                config.suffix = suffix.clone();
            }
        }
        Command::Js { bundle: Some(bundle), .. } => config.bundle = bundle.clone(),
        _ => {}
    }
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(args).unwrap()
    }

    fn config(args: &[&str]) -> GeneratorConfig {
        let cli = parse(args);
        let common = match &cli.command {
            Command::Cpp { common, .. }
            | Command::Flow { common }
            | Command::Js { common, .. }
            | Command::Extract { common } => common,
        };
        build_config(&cli.command, common).unwrap()
    }

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_rename_takes_pattern_and_replacement() {
        let config = config(&[
            "idl-bindgen", "flow", "a.idl", "--rename", "^RTC", "", "--rename", "Peer", "Connection",
        ]);
        assert_eq!(config.rules.rename.len(), 2);
        assert_eq!(config.rules.rename[1].apply("RTCPeer"), "RTCConnection");
    }

    #[test]
    fn test_merge_flags() {
        assert!(config(&["idl-bindgen", "extract", "a.idl"]).merge);
        assert!(!config(&["idl-bindgen", "extract", "a.idl", "--no-merge"]).merge);
        assert!(config(&["idl-bindgen", "extract", "a.idl", "--no-merge", "--merge"]).merge);
    }

    #[test]
    fn test_backend_options() {
        let cpp = config(&[
            "idl-bindgen", "cpp", "a.idl", "b.html", "--namespace", "webrtc", "--suffix", "cpp", "--out", "gen",
            "--bail",
        ]);
        assert_eq!(cpp.namespace, "webrtc");
        assert_eq!(cpp.suffix, "cpp");
        assert_eq!(cpp.out_dir, PathBuf::from("gen"));
        assert!(cpp.bail);

        let js = config(&["idl-bindgen", "js", "a.idl", "--bundle", "webrtc.js", "--only", "^RTC"]);
        assert_eq!(js.bundle, "webrtc.js");
        assert_eq!(js.namespace, "idl");
        assert!(js.rules.only[0].is_match("RTCPeer"));
    }

    #[test]
    fn test_inputs_are_required() {
        assert!(Cli::try_parse_from(["idl-bindgen", "cpp"]).is_err());
    }
}
