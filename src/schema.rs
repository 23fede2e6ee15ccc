use serde_json::Value;

use crate::domain::ConfigDomain;
use crate::{AppError, AppResult};

/// Structural type of one schema field. Validation checks shape only;
/// cross-field business rules do not exist at this layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    /// Free-form string (paths, tokens, serialized lists).
    Text,
    /// Hex (`#rgb`/`#rrggbb`) or an ASCII CSS color name.
    Color,
    /// `true`/`false`, stored as 0/1.
    Boolean,
    /// Integer strictly greater than zero.
    PositiveInt,
    /// Non-negative integer (sizes, counts).
    NonNegativeInt,
    /// Epoch-millisecond instant, non-negative.
    Instant,
    /// One of a fixed set of strings.
    Enum(&'static [&'static str]),
}

#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    pub name: &'static str,
    pub field_type: FieldType,
    /// Nullable fields accept an explicit `null` (clearing an override).
    pub nullable: bool,
}

const fn required(name: &'static str, field_type: FieldType) -> FieldSpec {
    FieldSpec {
        name,
        field_type,
        nullable: false,
    }
}

const fn optional(name: &'static str, field_type: FieldType) -> FieldSpec {
    FieldSpec {
        name,
        field_type,
        nullable: true,
    }
}

pub const THEME_PRESETS: &[&str] = &["system", "light", "dark", "midnight"];
pub const SCREEN_SIZES: &[&str] = &["mobile", "tablet", "desktop"];
pub const DATABASE_PRESETS: &[&str] = &["balanced", "performance", "safety"];

const APPEARANCE_FIELDS: &[FieldSpec] = &[
    required("theme_preset", FieldType::Enum(THEME_PRESETS)),
    required("primary_color", FieldType::Color),
    required("background_color", FieldType::Color),
    required("screen_size", FieldType::Enum(SCREEN_SIZES)),
    required("width", FieldType::PositiveInt),
    required("height", FieldType::PositiveInt),
];

const DATABASE_SETTINGS_FIELDS: &[FieldSpec] = &[
    required("auto_backup", FieldType::Boolean),
    required("query_logging", FieldType::Boolean),
    required("schema_validation", FieldType::Boolean),
    required("performance_monitoring", FieldType::Boolean),
    required("backup_path", FieldType::Text),
    required("preset", FieldType::Enum(DATABASE_PRESETS)),
];

const MCP_CONFIG_FIELDS: &[FieldSpec] = &[
    optional("url", FieldType::Text),
    optional("token", FieldType::Text),
    required("connected", FieldType::Boolean),
    required("entities", FieldType::Text),
];

const MCP_SETTINGS_FIELDS: &[FieldSpec] = &[
    optional("url", FieldType::Text),
    optional("token", FieldType::Text),
    required("connected", FieldType::Boolean),
];

const PIHOLE_CONFIG_FIELDS: &[FieldSpec] = &[
    optional("url", FieldType::Text),
    optional("token", FieldType::Text),
    required("connected", FieldType::Boolean),
    optional("last_checked", FieldType::Instant),
];

const SETTINGS_FIELDS: &[FieldSpec] = &[
    optional("mcp_url", FieldType::Text),
    optional("mcp_token", FieldType::Text),
    required("mcp_connected", FieldType::Boolean),
];

const BACKUPS_FIELDS: &[FieldSpec] = &[
    optional("file_name", FieldType::Text),
    optional("size_bytes", FieldType::NonNegativeInt),
    optional("created_at", FieldType::Instant),
];

/// Fields of one domain's record, excluding the bookkeeping columns the
/// store stamps itself (`id`, `created_at`, `updated_at` for singletons).
pub fn domain_fields(domain: ConfigDomain) -> &'static [FieldSpec] {
    match domain {
        ConfigDomain::Appearance => APPEARANCE_FIELDS,
        ConfigDomain::DatabaseSettings => DATABASE_SETTINGS_FIELDS,
        ConfigDomain::McpConfig => MCP_CONFIG_FIELDS,
        ConfigDomain::McpSettings => MCP_SETTINGS_FIELDS,
        ConfigDomain::PiholeConfig => PIHOLE_CONFIG_FIELDS,
        ConfigDomain::Settings => SETTINGS_FIELDS,
        ConfigDomain::Backups => BACKUPS_FIELDS,
    }
}

fn field_spec(domain: ConfigDomain, name: &str) -> Option<&'static FieldSpec> {
    domain_fields(domain).iter().find(|spec| spec.name == name)
}

// CSS named colors the dashboard themes actually use; hex covers the rest.
const CSS_COLOR_NAMES: &[&str] = &[
    "black", "silver", "gray", "white", "maroon", "red", "purple", "fuchsia", "green", "lime",
    "olive", "yellow", "navy", "blue", "teal", "aqua", "orange", "transparent",
];

fn is_color(value: &str) -> bool {
    if let Some(hex) = value.strip_prefix('#') {
        return (hex.len() == 3 || hex.len() == 6) && hex.chars().all(|c| c.is_ascii_hexdigit());
    }
    CSS_COLOR_NAMES
        .iter()
        .any(|name| value.eq_ignore_ascii_case(name))
}

fn type_error(domain: ConfigDomain, field: &str, expected: &str, value: &Value) -> AppError {
    AppError::new(AppError::VALIDATION, "Field value does not match schema")
        .with_context("domain", domain.as_str())
        .with_context("field", field.to_string())
        .with_context("expected", expected.to_string())
        .with_context("got", value.to_string())
}

fn validate_value(domain: ConfigDomain, spec: &FieldSpec, value: &Value) -> AppResult<()> {
    if value.is_null() {
        if spec.nullable {
            return Ok(());
        }
        return Err(type_error(domain, spec.name, "non-null value", value));
    }

    match spec.field_type {
        FieldType::Text => {
            if !value.is_string() {
                return Err(type_error(domain, spec.name, "string", value));
            }
        }
        FieldType::Color => {
            let ok = value.as_str().map(is_color).unwrap_or(false);
            if !ok {
                return Err(type_error(domain, spec.name, "hex or CSS color", value));
            }
        }
        FieldType::Boolean => {
            if !value.is_boolean() {
                return Err(type_error(domain, spec.name, "boolean", value));
            }
        }
        FieldType::PositiveInt => {
            let ok = value.as_i64().map(|n| n > 0).unwrap_or(false);
            if !ok {
                return Err(type_error(domain, spec.name, "positive integer", value));
            }
        }
        FieldType::NonNegativeInt => {
            let ok = value.as_i64().map(|n| n >= 0).unwrap_or(false);
            if !ok {
                return Err(type_error(domain, spec.name, "non-negative integer", value));
            }
        }
        FieldType::Instant => {
            let ok = value.as_i64().map(|n| n >= 0).unwrap_or(false);
            if !ok {
                return Err(type_error(domain, spec.name, "epoch-ms instant", value));
            }
        }
        FieldType::Enum(members) => {
            let ok = value
                .as_str()
                .map(|s| members.contains(&s))
                .unwrap_or(false);
            if !ok {
                return Err(type_error(
                    domain,
                    spec.name,
                    &format!("one of {}", members.join("|")),
                    value,
                ));
            }
        }
    }
    Ok(())
}

/// Validate a partial field map against a domain's schema. Unknown field
/// names are rejected; absent fields are fine (upserts are merges).
pub fn validate_fields(
    domain: ConfigDomain,
    fields: &serde_json::Map<String, Value>,
) -> AppResult<()> {
    for (name, value) in fields {
        let spec = field_spec(domain, name).ok_or_else(|| {
            AppError::new(AppError::VALIDATION, "Unknown field for domain")
                .with_context("domain", domain.as_str())
                .with_context("field", name.clone())
        })?;
        validate_value(domain, spec, value)?;
    }
    Ok(())
}
