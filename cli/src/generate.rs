use std::collections::HashMap;

use xbc_codegen::{CodegenOptions, OutputMode};

use crate::cli::{Cli, OutputModeArg};
use crate::error::Error;
use crate::pipeline::load_schema_set;

pub fn run(args: &Cli) -> Result<(), Error> {
    let schema_set = load_schema_set(&args.inputs)?;

    let type_map = match &args.type_map {
        Some(path) => {
            let text = std::fs::read_to_string(path)?;
            xbc_codegen::TypeMap::parse(&text)?
        }
        None => xbc_codegen::TypeMap::defaults(),
    };

    let namespace_map: HashMap<String, String> = args.namespace_map.iter().cloned().collect();
    let options = CodegenOptions {
        namespace_map,
        mode: match args.output_mode {
            OutputModeArg::Split => OutputMode::Split,
            OutputModeArg::HeaderOnly => OutputMode::HeaderOnly,
            OutputModeArg::FilePerType => OutputMode::FilePerType,
        },
    };

    let files = xbc_codegen::generate(&schema_set, &type_map, &options)?;

    if args.list_outputs {
        for file in &files {
            println!("{}", file.file_name);
        }
        return Ok(());
    }

    std::fs::create_dir_all(&args.output_dir)?;
    for file in &files {
        let text = xbc_codegen::emit::emit_file(file)?;
        let full_path = args.output_dir.join(&file.file_name);
        if let Some(parent) = full_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&full_path, text)?;
        tracing::info!(file = %full_path.display(), "wrote generated file");
    }

    Ok(())
}
