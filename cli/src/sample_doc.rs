//! Builds a placeholder-populated XML instance for one element declaration
//! (spec §6.4 `sample-doc`), walking the resolved Schema IR the same way
//! `xbc-codegen`'s particle/complex-type translators do, but emitting XML
//! events directly instead of Rust declarations.

use xbc_ir::{
    Compositor, ContentType, MaxOccurs, QName, SchemaSet, Term, XSD_NAMESPACE,
};
use xbc_xml::{QuickXmlWriter, XmlWriter};

use crate::cli::SampleDocArgs;
use crate::error::Error;
use crate::pipeline::load_schema_set;

pub fn run(args: &SampleDocArgs) -> Result<(), Error> {
    let schema_set = load_schema_set(&args.inputs)?;
    let element_name = QName::new(args.namespace.clone(), args.element.clone());
    let element = schema_set.lookup_element(&element_name).ok_or_else(|| {
        Error::Usage(format!("no element declaration found for {element_name}"))
    })?;

    let mut buffer = Vec::new();
    {
        let mut writer = QuickXmlWriter::new(&mut buffer);
        write_element(&schema_set, &mut writer, &element.name, &element.type_name, args, 0)
            .map_err(|e| Error::Io(std::io::Error::new(std::io::ErrorKind::Other, e.to_string())))?;
    }

    match &args.output {
        Some(path) => std::fs::write(path, buffer)?,
        None => {
            print!("{}", String::from_utf8_lossy(&buffer));
        }
    }
    Ok(())
}

fn write_element(
    schema_set: &SchemaSet,
    writer: &mut QuickXmlWriter<&mut Vec<u8>>,
    name: &QName,
    type_name: &QName,
    args: &SampleDocArgs,
    depth: u32,
) -> Result<(), xbc_xml::Error> {
    writer.start_element(name)?;

    if let Some(complex_type) = schema_set.lookup_complex_type(type_name) {
        for attribute in &complex_type.attribute_uses {
            if attribute.required || args.populate_optional {
                writer.attribute(&attribute.name, &sample_scalar(schema_set, &attribute.type_name))?;
            }
        }
        match &complex_type.content_type {
            ContentType::Empty => {}
            ContentType::Simple(simple_content) => {
                writer.characters(&sample_scalar(schema_set, &simple_content.base_type))?;
            }
            ContentType::ElementOnly(complex_content) | ContentType::Mixed(complex_content) => {
                if depth < args.max_depth {
                    if let Some(model_group) = &complex_content.model_group {
                        write_model_group(schema_set, writer, model_group, args, depth + 1)?;
                    }
                }
            }
        }
    } else {
        writer.characters(&sample_scalar(schema_set, type_name))?;
    }

    writer.end_element()
}

fn write_model_group(
    schema_set: &SchemaSet,
    writer: &mut QuickXmlWriter<&mut Vec<u8>>,
    model_group: &xbc_ir::ModelGroup,
    args: &SampleDocArgs,
    depth: u32,
) -> Result<(), xbc_xml::Error> {
    let particles: &[xbc_ir::Particle] = match model_group.compositor {
        // A sample document need only pick one branch of a choice.
        Compositor::Choice => &model_group.particles[..model_group.particles.len().min(1)],
        Compositor::Sequence | Compositor::All | Compositor::Interleave => &model_group.particles,
    };

    for particle in particles {
        if particle.occurrence.min_occurs == 0 && !args.populate_optional {
            continue;
        }
        let repeats = match particle.occurrence.max_occurs {
            MaxOccurs::Unbounded => particle.occurrence.min_occurs.max(1),
            MaxOccurs::Bounded(_) => particle.occurrence.min_occurs.max(1),
        };
        for _ in 0..repeats {
            match &particle.term {
                Term::Element(element) => {
                    write_element(schema_set, writer, &element.name, &element.type_name, args, depth)?;
                }
                Term::ElementRef(name) => {
                    if let Some(element) = schema_set.lookup_element(name) {
                        write_element(schema_set, writer, &element.name, &element.type_name, args, depth)?;
                    }
                }
                Term::GroupRef(name) => {
                    if let Some(group_def) = schema_set.lookup_model_group(name) {
                        write_model_group(schema_set, writer, &group_def.group, args, depth)?;
                    }
                }
                Term::Group(nested) => {
                    write_model_group(schema_set, writer, nested, args, depth)?;
                }
                Term::Wildcard(_) => {}
            }
        }
    }
    Ok(())
}

/// A representative lexical value for an XSD built-in or simple-type-derived
/// scalar, good enough to round-trip through the generated `read_*`/
/// `write_*` pair. Enumerations use their first member; a named type
/// otherwise walks its `base_type` chain down to the underlying built-in.
fn sample_scalar(schema_set: &SchemaSet, type_name: &QName) -> String {
    let mut current = type_name.clone();
    for _ in 0..16 {
        if current.namespace_uri == XSD_NAMESPACE {
            return builtin_sample(&current.local_name);
        }
        let Some(simple_type) = schema_set.lookup_simple_type(&current) else {
            return String::new();
        };
        if let Some(first) = simple_type.facet_set.enumeration.first() {
            return first.clone();
        }
        current = simple_type.base_type.clone();
    }
    String::new()
}

fn builtin_sample(local_name: &str) -> String {
    match local_name {
        "boolean" => "true".to_string(),
        "integer" | "int" | "long" | "short" | "byte" | "nonNegativeInteger" | "positiveInteger" | "unsignedInt"
        | "unsignedLong" | "unsignedShort" | "unsignedByte" | "nonPositiveInteger" | "negativeInteger" => {
            "0".to_string()
        }
        "decimal" | "double" | "float" => "0.0".to_string(),
        "date" => "2024-01-01".to_string(),
        "dateTime" => "2024-01-01T00:00:00".to_string(),
        "time" => "00:00:00".to_string(),
        "anyURI" => "urn:example:sample".to_string(),
        _ => "sample".to_string(),
    }
}
