//! Transitive schema fetcher (spec §6.4 `fetch`): downloads an XSD and
//! follows its `xs:import`/`xs:include` `schemaLocation` attributes,
//! mirroring the teacher's own `HttpImportResolver` (`generator/src/main.rs`)
//! but recursing rather than resolving one import at a time.

use std::collections::{HashSet, VecDeque};
use std::path::PathBuf;

use anyhow::Context;

use crate::cli::FetchArgs;
use crate::error::Error;

const XSD_NAMESPACE: &str = "http://www.w3.org/2001/XMLSchema";

pub fn run(args: &FetchArgs) -> Result<(), Error> {
    if args.inputs.is_empty() {
        return Err(Error::Usage("fetch requires at least one starting schema URL or path".to_string()));
    }
    std::fs::create_dir_all(&args.output_dir)?;

    let mut manifest = Vec::new();
    let mut seen: HashSet<String> = HashSet::new();
    let mut queue: VecDeque<String> = args.inputs.iter().map(|p| p.to_string_lossy().into_owned()).collect();

    while let Some(location) = queue.pop_front() {
        if !seen.insert(location.clone()) {
            continue;
        }
        let fetched = fetch_one(&location);
        let text = match fetched {
            Ok(text) => text,
            Err(error) => {
                if args.fail_fast {
                    return Err(Error::Fetch { path: location, source: error });
                }
                tracing::warn!(url = %location, error = %error, "skipping unreachable schema");
                continue;
            }
        };

        let local_path = local_path_for(&args.output_dir, &location);
        if let Some(parent) = local_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&local_path, &text)?;
        manifest.push((location.clone(), local_path.display().to_string()));

        for dependency in discover_dependencies(&text) {
            if !seen.contains(&dependency) {
                queue.push_back(dependency);
            }
        }
    }

    if let Some(manifest_path) = &args.manifest {
        let mut body = String::new();
        for (url, path) in &manifest {
            body.push_str(&format!("{url} {path}\n"));
        }
        std::fs::write(manifest_path, body)?;
    }

    Ok(())
}

fn fetch_one(location: &str) -> Result<String, anyhow::Error> {
    if location.starts_with("http://") || location.starts_with("https://") {
        reqwest::blocking::get(location)
            .with_context(|| format!("fetching {location}"))?
            .text()
            .with_context(|| format!("reading response body from {location}"))
    } else {
        std::fs::read_to_string(location).with_context(|| format!("reading {location}"))
    }
}

fn local_path_for(output_dir: &std::path::Path, location: &str) -> PathBuf {
    let file_name = location.rsplit('/').next().unwrap_or(location);
    let file_name = if file_name.is_empty() { "schema.xsd" } else { file_name };
    output_dir.join(file_name)
}

/// Best-effort `schemaLocation` discovery: the fetcher does not need full
/// schema semantics, only enough structure to keep following references.
fn discover_dependencies(text: &str) -> Vec<String> {
    let Ok(document) = roxmltree::Document::parse(text) else {
        return Vec::new();
    };
    document
        .root_element()
        .descendants()
        .filter(|node| node.is_element() && node.tag_name().namespace() == Some(XSD_NAMESPACE))
        .filter(|node| matches!(node.tag_name().name(), "import" | "include"))
        .filter_map(|node| node.attribute("schemaLocation"))
        .map(|location| location.to_string())
        .collect()
}
