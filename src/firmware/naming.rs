use serde::Deserialize;

/// Naming convention for variant-qualified images. Some release channels
/// publish the variant images gzip-compressed; the base image is always a
/// plain `.bin`.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ArtifactNaming {
    Bin,
    BinGz,
}

/// Deterministic `(product, variant) → filename` mapping. No variant means
/// the regular full build.
pub fn filename(product: &str, variant: Option<&str>, naming: ArtifactNaming) -> String {
    match variant {
        None => format!("{product}.bin"),
        Some(variant) => match naming {
            ArtifactNaming::Bin => format!("{product}-{variant}.bin"),
            ArtifactNaming::BinGz => format!("{product}-{variant}.bin.gz"),
        },
    }
}
