//! CSV export of stored responses.

use std::borrow::Cow;

use crate::intake::model::ResponseRecord;

/// Download name sent in `Content-Disposition`.
pub const EXPORT_FILENAME: &str = "prenatal_export.csv";

const BOM: char = '\u{feff}';

pub const CSV_HEADER: [&str; 16] = [
    "id",
    "phone",
    "risk_level",
    "ga_weeks",
    "created_at",
    "iniciais",
    "idade",
    "sintomas_ids",
    "comorb_ids",
    "consultas_qtd",
    "pa_sys",
    "pa_dia",
    "peso",
    "altura",
    "imc",
    "habitos",
];

/// Field delimiter for the `sep` query parameter.
///
/// `tab` (any case) selects a tab; `,` `;` `|` are taken as-is; anything
/// else, or no parameter, falls back to `;`.
pub fn delimiter(sep: Option<&str>) -> char {
    let sep = sep.map(str::trim).unwrap_or_default();
    if sep.eq_ignore_ascii_case("tab") {
        return '\t';
    }
    match sep {
        "," => ',',
        "|" => '|',
        _ => ';',
    }
}

/// Quote a field when it contains the delimiter, a quote or a line break.
fn quote(field: &str, delim: char) -> Cow<'_, str> {
    if field.contains([delim, '"', '\n', '\r']) {
        Cow::Owned(format!("\"{}\"", field.replace('"', "\"\"")))
    } else {
        Cow::Borrowed(field)
    }
}

fn opt<T: ToString>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

/// Decimal with at least one fractional digit (`65.0`, `1.65`).
fn opt_decimal(value: Option<f64>) -> String {
    value.map(|v| format!("{v:?}")).unwrap_or_default()
}

fn join_ids(ids: &[u8]) -> String {
    ids.iter().map(u8::to_string).collect::<Vec<_>>().join("|")
}

fn record_fields(record: &ResponseRecord) -> [String; 16] {
    let a = &record.answers;
    [
        record.id.to_string(),
        record.phone.clone(),
        record.risk_level.to_string(),
        opt(record.gestational_weeks),
        record.created_at.to_rfc3339(),
        a.initials.clone().unwrap_or_default(),
        opt(a.age),
        join_ids(&a.symptom_ids),
        join_ids(&a.condition_ids),
        opt(a.prenatal_visits),
        opt(a.bp_systolic),
        opt(a.bp_diastolic),
        opt_decimal(a.weight_kg),
        opt_decimal(a.height_m),
        opt_decimal(a.bmi),
        opt(a.tobacco_alcohol.map(|used| if used { "sim" } else { "nao" })),
    ]
}

fn push_row<S: AsRef<str>>(out: &mut String, fields: &[S], delim: char) {
    for (i, field) in fields.iter().enumerate() {
        if i > 0 {
            out.push(delim);
        }
        out.push_str(&quote(field.as_ref(), delim));
    }
    out.push('\n');
}

/// Render records (already ordered) as a BOM-prefixed CSV document.
pub fn render_csv(records: &[ResponseRecord], delim: char) -> String {
    let mut out = String::new();
    out.push(BOM);
    push_row(&mut out, &CSV_HEADER[..], delim);
    for record in records {
        push_row(&mut out, &record_fields(record)[..], delim);
    }
    out
}
