//! Emits the factories compilation unit: one static holder class per
//! namespace, caching a wrapper instance per meter so repeated factory calls
//! reuse the same instrument.

use crate::emission::writer::SourceWriter;
use crate::emission::{
    METER_TYPE, file_preamble, group_by_namespace, lower_first, wrapper_qualified,
};
use crate::model::{MetricMethod, MetricType};
use crate::pipeline::{CancellationToken, Cancelled};

const HOLDER_NAME: &str = "GeneratedInstrumentFactory";

/// Render the factories unit for the whole model.
///
/// # Errors
///
/// Returns [`Cancelled`] when the token fires mid-walk; no partial text is
/// surfaced in that case.
pub fn emit_factories(
    model: &[MetricType],
    cancel: &CancellationToken,
) -> Result<String, Cancelled> {
    let mut writer = SourceWriter::new();
    file_preamble(&mut writer);

    let mut first_block = true;
    for (namespace, types) in group_by_namespace(model) {
        cancel.check()?;
        if !first_block {
            writer.blank();
        }
        first_block = false;

        if namespace.is_empty() {
            emit_holder(&mut writer, &types, cancel)?;
        } else {
            writer.open(&format!("namespace {namespace}"));
            emit_holder(&mut writer, &types, cancel)?;
            writer.close();
        }
    }

    Ok(writer.into_string())
}

fn emit_holder(
    writer: &mut SourceWriter,
    types: &[&MetricType],
    cancel: &CancellationToken,
) -> Result<(), Cancelled> {
    writer.open(&format!("internal static partial class {HOLDER_NAME}"));

    let mut first_entry = true;
    for ty in types {
        cancel.check()?;
        for method in &ty.methods {
            cancel.check()?;
            if !first_entry {
                writer.blank();
            }
            first_entry = false;
            emit_factory(writer, ty, method);
        }
    }

    writer.close();
    Ok(())
}

fn emit_factory(writer: &mut SourceWriter, ty: &MetricType, method: &MetricMethod) {
    let wrapper = wrapper_qualified(ty, &method.wrapper_name);
    let field = format!("_{}", lower_first(&method.wrapper_name));

    writer.line(&format!(
        "private static readonly global::System.Collections.Concurrent.ConcurrentDictionary<{METER_TYPE}, {wrapper}> {field} = new();"
    ));
    writer.blank();
    writer.open(&format!(
        "public static {wrapper} Create{}({METER_TYPE} meter)",
        method.wrapper_name
    ));
    writer.line(&format!(
        "return {field}.GetOrAdd(meter, static m => new {wrapper}(m.Create{}<{}>(\"{}\")));",
        method.instrument.instrument_type_name(),
        method.value_type,
        method.metric_name
    ));
    writer.close();
}
