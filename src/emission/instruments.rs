//! Emits the instruments compilation unit: the partial method
//! implementations and the sealed wrapper type behind each metric method.

use crate::emission::writer::SourceWriter;
use crate::emission::{TAG_GUARD_THRESHOLD, factory_qualified, file_preamble, group_by_namespace, loose_param_names};
use crate::model::{MetricMethod, MetricType, StrongTypeConfig, TagKind};
use crate::pipeline::{CancellationToken, Cancelled};

/// Render the instruments unit for the whole model.
///
/// # Errors
///
/// Returns [`Cancelled`] when the token fires mid-walk; no partial text is
/// surfaced in that case.
pub fn emit_instruments(
    model: &[MetricType],
    cancel: &CancellationToken,
) -> Result<String, Cancelled> {
    let mut writer = SourceWriter::new();
    file_preamble(&mut writer);

    let mut first_block = true;
    for (namespace, types) in group_by_namespace(model) {
        cancel.check()?;
        for ty in types {
            cancel.check()?;
            if !first_block {
                writer.blank();
            }
            first_block = false;

            if namespace.is_empty() {
                emit_type(&mut writer, ty, cancel)?;
            } else {
                writer.open(&format!("namespace {namespace}"));
                emit_type(&mut writer, ty, cancel)?;
                writer.close();
            }
        }
    }

    Ok(writer.into_string())
}

fn emit_type(
    writer: &mut SourceWriter,
    ty: &MetricType,
    cancel: &CancellationToken,
) -> Result<(), Cancelled> {
    let chain = ty.nesting_chain();
    for link in &chain {
        // Re-declare with the modifiers as written; they carry `partial`.
        let mut header = if link.modifiers.is_empty() {
            format!("partial {} {}", link.keyword, link.name)
        } else {
            format!("{} {} {}", link.modifiers, link.keyword, link.name)
        };
        if !link.constraints.is_empty() {
            header.push(' ');
            header.push_str(&link.constraints);
        }
        writer.open(&header);
    }

    for (index, method) in ty.methods.iter().enumerate() {
        cancel.check()?;
        if index > 0 {
            writer.blank();
        }
        emit_partial_impl(writer, ty, method);
        writer.blank();
        emit_wrapper(writer, method);
    }

    for _ in &chain {
        writer.close();
    }
    Ok(())
}

/// The implementing half of the user's partial factory method, forwarding to
/// the cached factory so every call site with the same meter shares one
/// instrument.
fn emit_partial_impl(writer: &mut SourceWriter, ty: &MetricType, method: &MetricMethod) {
    let params = method
        .params
        .iter()
        .map(|p| format!("{} {}", p.type_text, p.name))
        .collect::<Vec<_>>()
        .join(", ");

    writer.open(&format!(
        "{} {} {}({params})",
        method.modifiers, method.wrapper_name, method.name
    ));
    writer.line(&format!(
        "return {}.Create{}({});",
        factory_qualified(&ty.namespace),
        method.wrapper_name,
        method.meter_param_name()
    ));
    writer.close();
}

fn emit_wrapper(writer: &mut SourceWriter, method: &MetricMethod) {
    let instrument = format!(
        "global::System.Diagnostics.Metrics.{}<{}>",
        method.instrument.instrument_type_name(),
        method.value_type
    );

    if let Some(summary) = &method.doc_summary {
        writer.line("/// <summary>");
        writer.line(&format!("/// {summary}"));
        writer.line("/// </summary>");
    }
    writer.open(&format!("internal sealed class {}", method.wrapper_name));
    writer.line(&format!("private readonly {instrument} _instrument;"));
    writer.blank();
    writer.open(&format!("public {}({instrument} instrument)", method.wrapper_name));
    writer.line("_instrument = instrument;");
    writer.close();
    writer.blank();
    emit_record_method(writer, method);
    writer.close();
}

fn emit_record_method(writer: &mut SourceWriter, method: &MetricMethod) {
    let verb = method.instrument.record_method_name();
    let param_names = loose_param_names(&method.tag_keys);

    if method.strong_type_name.is_some() {
        emit_strong_tag_docs(writer, method);
    } else {
        for (key, param) in method.tag_keys.iter().zip(&param_names) {
            if let Some(description) = method.tag_descriptions.get(key) {
                writer.line(&format!("/// <param name=\"{param}\">{description}</param>"));
            }
        }
    }

    let mut params = format!("{} value", method.value_type);
    if let Some(carrier) = &method.strong_type_name {
        params.push_str(&format!(", global::{carrier} o"));
    } else {
        for param in &param_names {
            params.push_str(&format!(", object? {param}"));
        }
    }

    writer.open(&format!("public void {verb}({params})"));

    if method.tag_count() > TAG_GUARD_THRESHOLD {
        writer.open("if (!_instrument.Enabled)");
        writer.line("return;");
        writer.close();
        writer.blank();
    }

    if method.strong_type_name.is_some() && method.strong_type_is_reference {
        writer.open("if (o is null)");
        writer.line("throw new global::System.ArgumentNullException(nameof(o));");
        writer.close();
        writer.blank();
    }

    if method.tag_count() == 0 {
        writer.line(&format!("_instrument.{verb}(value);"));
    } else {
        writer.open("var tagList = new global::System.Diagnostics.TagList");
        if method.strong_type_name.is_some() {
            for config in &method.strong_type_configs {
                if !config.kind.is_leaf() {
                    continue;
                }
                let access = config.access_expr("o");
                let value = if config.kind == TagKind::Enum {
                    format!("{access}!.ToString()")
                } else {
                    access
                };
                writer.line(&format!("{{ \"{}\", {value} }},", config.tag_name));
            }
        } else {
            for (key, param) in method.tag_keys.iter().zip(&param_names) {
                writer.line(&format!("{{ \"{key}\", {param} }},"));
            }
        }
        // collection initializer, so the close brace needs the semicolon
        writer.close_with(";");
        writer.blank();
        writer.line(&format!("_instrument.{verb}(value, in tagList);"));
    }

    writer.close();
}

/// Harvested tag descriptions for a strong-type method, rendered as a
/// remarks block. Descriptions are keyed by the name path that resolved the
/// tag, so the lookup tries the override name first and the access path
/// second.
fn emit_strong_tag_docs(writer: &mut SourceWriter, method: &MetricMethod) {
    let documented: Vec<(&str, &str)> = method
        .strong_type_configs
        .iter()
        .filter(|config| config.kind.is_leaf())
        .filter_map(|config| {
            method
                .tag_descriptions
                .get(&config.tag_name)
                .or_else(|| method.tag_descriptions.get(&access_path_key(config)))
                .map(|description| (config.tag_name.as_str(), description.as_str()))
        })
        .collect();

    if documented.is_empty() {
        return;
    }

    writer.line("/// <remarks>");
    for (tag, description) in documented {
        writer.line(&format!("/// Tag \"{tag}\": {description}"));
    }
    writer.line("/// </remarks>");
}

fn access_path_key(config: &StrongTypeConfig) -> String {
    if config.path.is_empty() {
        config.name.clone()
    } else {
        format!("{}.{}", config.path, config.name)
    }
}
