//! Deterministic seed data for the liquibase fake-data CSV.
//!
//! Values are drawn from a generator seeded with the entity name, so
//! regenerating an entity reproduces the same rows.

use crate::context::FieldContext;

/// Rows written to the fake-data CSV of an entity.
pub const FAKE_DATA_ROWS: usize = 10;

const WORDS: [&str; 24] = [
    "alpha", "bravo", "copper", "delta", "ember", "fjord", "granite", "harbor", "indigo", "juniper",
    "kestrel", "lantern", "meadow", "nimbus", "orchid", "pioneer", "quartz", "river", "summit",
    "timber", "umber", "velvet", "willow", "zephyr",
];

/// Same hash as `java.lang.String#hashCode`, used as the seed.
pub fn string_hash_code(input: &str) -> i32 {
    input.encode_utf16().fold(0i32, |hash, unit| hash.wrapping_mul(31).wrapping_add(unit as i32))
}

/// Small xorshift generator; only reproducibility matters here.
struct SeededValues {
    state: u64,
}

impl SeededValues {
    fn new(seed: i32) -> Self {
        // xorshift never leaves the zero state
        let state = (seed as u32 as u64) ^ 0x9E37_79B9_7F4A_7C15;
        Self { state: if state == 0 { 1 } else { state } }
    }

    fn next(&mut self) -> u64 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.state = x;
        x
    }

    fn below(&mut self, bound: u64) -> u64 {
        self.next() % bound
    }

    fn word(&mut self) -> &'static str {
        WORDS[self.below(WORDS.len() as u64) as usize]
    }
}

fn fake_value(values: &mut SeededValues, field: &FieldContext, blob_dir: &str) -> String {
    if field.field_is_enum {
        let index = values.below(field.enum_values.len() as u64) as usize;
        return field.enum_values[index].clone();
    }
    match field.field_type.as_str() {
        "String" => format!("{} {}", values.word(), values.word()),
        "Integer" | "Long" => values.below(100_000).to_string(),
        "Float" | "Double" | "BigDecimal" => {
            format!("{}.{:02}", values.below(10_000), values.below(100))
        }
        "LocalDate" => format!("2020-{:02}-{:02}", values.below(12) + 1, values.below(28) + 1),
        "Instant" => format!(
            "2020-{:02}-{:02}T{:02}:{:02}:00",
            values.below(12) + 1,
            values.below(28) + 1,
            values.below(24),
            values.below(60)
        ),
        "Boolean" => (values.below(2) == 1).to_string(),
        "UUID" => format!(
            "{:08x}-{:04x}-4{:03x}-8{:03x}-{:012x}",
            values.next() as u32,
            values.next() as u16,
            values.below(0x1000),
            values.below(0x1000),
            values.next() & 0xFFFF_FFFF_FFFF
        ),
        "Blob" | "ImageBlob" => format!("{blob_dir}/hipster.png"),
        "TextBlob" => format!("{blob_dir}/hipster.txt"),
        _ => values.word().to_string(),
    }
}

fn has_content_type(field: &FieldContext) -> bool {
    matches!(field.field_type.as_str(), "Blob" | "ImageBlob")
}

/// Column names of the fake-data CSV, matching [`fake_rows`].
pub fn fake_header(fields: &[FieldContext]) -> Vec<String> {
    let mut header = vec!["id".to_string()];
    for field in fields {
        header.push(field.field_name_underscored.clone());
        if has_content_type(field) {
            header.push(format!("{}_content_type", field.field_name_underscored));
        }
    }
    header
}

/// Builds the fake-data rows of an entity.
///
/// The first column is the id; one column per field follows, plus the blob
/// content type column for binary fields. Blob cells point into `blob_dir`.
pub fn fake_rows(entity_name: &str, fields: &[FieldContext], blob_dir: &str) -> Vec<Vec<String>> {
    let mut values = SeededValues::new(string_hash_code(&entity_name.to_lowercase()));
    (1..=FAKE_DATA_ROWS)
        .map(|id| {
            let mut row = vec![id.to_string()];
            for field in fields {
                row.push(fake_value(&mut values, field, blob_dir));
                if has_content_type(field) {
                    row.push("image/png".to_string());
                }
            }
            row
        })
        .collect()
}
