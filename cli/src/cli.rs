use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputModeArg {
    Split,
    HeaderOnly,
    FilePerType,
}

/// `generate` is the implicit default: its flags live directly on `Cli`
/// rather than behind a subcommand, so `xbc schema.xsd --output-dir out`
/// and `xbc generate schema.xsd --output-dir out` both work without the
/// flag-name collisions a sibling `GenerateArgs` struct would invite.
#[derive(Parser)]
#[clap(version, about)]
pub struct Cli {
    #[clap(subcommand)]
    pub command: Option<Command>,

    /// Schema documents to read (.xsd, .rng, .rnc, .dtd)
    #[clap(value_parser)]
    pub inputs: Vec<PathBuf>,

    /// Directory generated files are written into
    #[clap(long, default_value = "generated")]
    pub output_dir: PathBuf,

    /// Type-map file overriding the built-in XSD-builtin-to-Rust mapping
    #[clap(long)]
    pub type_map: Option<PathBuf>,

    /// Foreign namespace URI to module path, e.g. `http://example.com/order=order`
    #[clap(long = "namespace-map", value_parser = parse_key_val)]
    pub namespace_map: Vec<(String, String)>,

    /// How generated declarations are split across files
    #[clap(long, value_enum, default_value = "split")]
    pub output_mode: OutputModeArg,

    /// Print the file names that would be generated, without writing them
    #[clap(long)]
    pub list_outputs: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// Emit an example XML document for one element
    SampleDoc(SampleDocArgs),
    /// Download a schema transitively, following imports/includes
    Fetch(FetchArgs),
}

#[derive(Args)]
pub struct SampleDocArgs {
    #[clap(value_parser)]
    pub inputs: Vec<PathBuf>,

    /// Local name of the element to build a sample document for
    #[clap(long)]
    pub element: String,

    /// Target namespace of the element, empty for no namespace
    #[clap(long, default_value = "")]
    pub namespace: String,

    /// File to write the sample document to; stdout when absent
    #[clap(long)]
    pub output: Option<PathBuf>,

    /// Also populate optional (minOccurs=0) particles and attributes
    #[clap(long)]
    pub populate_optional: bool,

    /// Recursion depth limit for self-referential content models
    #[clap(long, default_value_t = 5)]
    pub max_depth: u32,
}

#[derive(Args)]
pub struct FetchArgs {
    #[clap(value_parser)]
    pub inputs: Vec<PathBuf>,

    #[clap(long, default_value = "fetched")]
    pub output_dir: PathBuf,

    /// File to write a URL-to-local-path manifest to
    #[clap(long)]
    pub manifest: Option<PathBuf>,

    /// Stop at the first fetch failure instead of continuing
    #[clap(long)]
    pub fail_fast: bool,
}

fn parse_key_val(input: &str) -> Result<(String, String), String> {
    let (key, value) = input.split_once('=').ok_or_else(|| format!("expected `key=value`, found `{input}`"))?;
    Ok((key.to_string(), value.to_string()))
}
