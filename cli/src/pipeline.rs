//! Turns a list of schema file paths into a resolved [`SchemaSet`],
//! dispatching on file extension to the matching front end crate.

use std::path::Path;

use xbc_ir::SchemaSet;

use crate::error::Error;

pub fn load_schema_set(inputs: &[impl AsRef<Path>]) -> Result<SchemaSet, Error> {
    if inputs.is_empty() {
        return Err(Error::Usage("at least one schema input is required".to_string()));
    }

    let mut set = SchemaSet::new();
    for input in inputs {
        let path = input.as_ref();
        set.add_schema(load_one(path)?);
    }
    set.resolve()?;
    Ok(set)
}

fn load_one(path: &Path) -> Result<xbc_ir::Schema, Error> {
    let source = std::fs::read_to_string(path)?;
    let display = path.display().to_string();

    match path.extension().and_then(|e| e.to_str()) {
        Some("xsd") => xbc_xsd::parse_schema(&source)
            .map_err(anyhow::Error::from)
            .map_err(|source| Error::Parse { path: display, source }),
        Some("rng") => {
            let grammar = xbc_rng::parse_xml(&source).map_err(anyhow::Error::from).map_err(|source| Error::Parse {
                path: display.clone(),
                source,
            })?;
            let simplified =
                xbc_rng::simplify_grammar(grammar, None).map_err(anyhow::Error::from).map_err(|source| Error::Parse {
                    path: display.clone(),
                    source,
                })?;
            xbc_rng::translate(&simplified).map_err(anyhow::Error::from).map_err(|source| Error::Parse { path: display, source })
        }
        Some("rnc") => {
            let grammar = xbc_rng::compact::parse(&source).map_err(anyhow::Error::from).map_err(|source| Error::Parse {
                path: display.clone(),
                source,
            })?;
            let simplified =
                xbc_rng::simplify_grammar(grammar, None).map_err(anyhow::Error::from).map_err(|source| Error::Parse {
                    path: display.clone(),
                    source,
                })?;
            xbc_rng::translate(&simplified).map_err(anyhow::Error::from).map_err(|source| Error::Parse { path: display, source })
        }
        Some("dtd") => {
            let doctype = xbc_dtd::parse_dtd(&source).map_err(anyhow::Error::from).map_err(|source| Error::Parse {
                path: display,
                source,
            })?;
            Ok(xbc_dtd::translate(&doctype))
        }
        other => Err(Error::Usage(format!(
            "{display}: unrecognized schema extension {other:?}, expected one of xsd/rng/rnc/dtd"
        ))),
    }
}
