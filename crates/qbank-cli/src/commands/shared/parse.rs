use anyhow::Context;
use qbank_core::aggregate::KnownVersion;
use qbank_core::inputs::VariantInput;
use serde::de::DeserializeOwned;
use uuid::Uuid;

/// Parse a `snake_case` enum value using serde-deserialization.
pub fn parse_enum<T>(raw: &str, field: &str) -> anyhow::Result<T>
where
    T: DeserializeOwned,
{
    let normalized = raw.replace('-', "_");
    let json = format!("\"{normalized}\"");
    serde_json::from_str(&json).map_err(|error| anyhow::anyhow!("invalid {field} '{raw}': {error}"))
}

pub fn parse_id(raw: &str) -> anyhow::Result<Uuid> {
    Uuid::parse_str(raw.trim()).with_context(|| format!("invalid id '{raw}'"))
}

/// Parse `ID:VERSION`.
pub fn parse_known_version(raw: &str) -> anyhow::Result<KnownVersion> {
    let (id, version) = raw
        .rsplit_once(':')
        .with_context(|| format!("expected ID:VERSION, got '{raw}'"))?;
    let version = version
        .parse::<i64>()
        .with_context(|| format!("invalid version in '{raw}'"))?;
    Ok(KnownVersion::new(parse_id(id)?, version))
}

pub fn parse_variant_input(raw: &str) -> anyhow::Result<VariantInput> {
    serde_json::from_str(raw).context("invalid variant JSON")
}
