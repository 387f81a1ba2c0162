use std::fmt;

use serde::Serialize;

use crate::common::format::Format;

pub const STORAGE_PREFIX: &str = "media";

/// Every rendition the pipeline can produce, in generation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum VariantKind {
    Original,
    Thumbnail,
    Small,
    Medium,
    Large,
}

impl VariantKind {
    pub const ALL: [VariantKind; 5] = [
        VariantKind::Original,
        VariantKind::Thumbnail,
        VariantKind::Small,
        VariantKind::Medium,
        VariantKind::Large,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            VariantKind::Original => "original",
            VariantKind::Thumbnail => "thumbnail",
            VariantKind::Small => "small",
            VariantKind::Medium => "medium",
            VariantKind::Large => "large",
        }
    }
}

impl fmt::Display for VariantKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fixed target for one kind. `width == 0` means "leave unchanged"
/// (only `original` uses it); `height == Some(width)` means square crop;
/// `height == None` preserves the original aspect ratio. The `format`
/// field is ignored for `original`, which keeps the source format.
#[derive(Debug, Clone, Copy)]
pub struct VariantConfig {
    pub width: u32,
    pub height: Option<u32>,
    pub format: Format,
    pub quality: u8,
}

/// Process-wide constants; the match is exhaustive so a kind without a
/// config cannot exist.
pub fn config(kind: VariantKind) -> VariantConfig {
    match kind {
        VariantKind::Original => VariantConfig {
            width: 0,
            height: None,
            format: Format::Jpg,
            quality: 100,
        },
        VariantKind::Thumbnail => VariantConfig {
            width: 150,
            height: Some(150),
            format: Format::Jpg,
            quality: 75,
        },
        VariantKind::Small => VariantConfig {
            width: 500,
            height: None,
            format: Format::Jpg,
            quality: 80,
        },
        VariantKind::Medium => VariantConfig {
            width: 1000,
            height: None,
            format: Format::Jpg,
            quality: 80,
        },
        VariantKind::Large => VariantConfig {
            width: 1200,
            height: None,
            format: Format::Jpg,
            quality: 80,
        },
    }
}

/// Minimum original width before a kind is attempted. Monotone
/// non-decreasing across small -> large.
pub fn threshold(kind: VariantKind) -> u32 {
    match kind {
        VariantKind::Original => 0,
        VariantKind::Thumbnail => 50,
        VariantKind::Small => 350,
        VariantKind::Medium => 700,
        VariantKind::Large => 1000,
    }
}

/// Which kinds are worth producing for an original of the given size.
/// Only the width gates: a tall narrow image and a short wide image of the
/// same width get the same set. `original` and `thumbnail` are always
/// included, whatever the input.
pub fn variants_to_generate(width: u32, _height: u32) -> Vec<VariantKind> {
    let mut kinds = vec![VariantKind::Original, VariantKind::Thumbnail];

    for kind in [VariantKind::Small, VariantKind::Medium, VariantKind::Large] {
        if width >= threshold(kind) {
            kinds.push(kind);
        }
    }

    kinds
}

/// Deterministic object key for one variant. `original` keeps the source
/// format and a bare name; every other kind is re-encoded to its fixed
/// format. Stable per (slug, kind): re-running a slug overwrites in place.
pub fn storage_path_for(slug: &str, kind: VariantKind, original_format: Format) -> String {
    match kind {
        VariantKind::Original => {
            format!("{}/{}.{}", STORAGE_PREFIX, slug, original_format.extension())
        }
        _ => format!(
            "{}/{}__{}.{}",
            STORAGE_PREFIX,
            slug,
            kind,
            config(kind).format.extension()
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_width_degenerates_to_original_and_thumbnail() {
        for width in [0, 1, 49] {
            let kinds = variants_to_generate(width, 3000);
            assert_eq!(kinds, vec![VariantKind::Original, VariantKind::Thumbnail]);
        }
    }

    #[test]
    fn thresholds_are_inclusive() {
        assert!(variants_to_generate(1000, 750).contains(&VariantKind::Large));
        assert!(!variants_to_generate(999, 750).contains(&VariantKind::Large));
    }

    #[test]
    fn height_does_not_gate() {
        assert_eq!(
            variants_to_generate(1200, 10),
            variants_to_generate(1200, 9000)
        );
    }

    #[test]
    fn kinds_come_back_in_generation_order() {
        assert_eq!(
            variants_to_generate(2000, 1500),
            vec![
                VariantKind::Original,
                VariantKind::Thumbnail,
                VariantKind::Small,
                VariantKind::Medium,
                VariantKind::Large,
            ]
        );
    }

    #[test]
    fn thresholds_are_monotone() {
        let mut last = 0;
        for kind in VariantKind::ALL {
            let t = threshold(kind);
            if kind != VariantKind::Original {
                assert!(t >= last, "{kind} threshold regressed");
            }
            last = t;
        }
    }

    #[test]
    fn original_path_keeps_the_source_format() {
        assert_eq!(
            storage_path_for("banner", VariantKind::Original, Format::Png),
            "media/banner.png"
        );
    }

    #[test]
    fn derived_paths_use_the_fixed_variant_format() {
        assert_eq!(
            storage_path_for("banner", VariantKind::Thumbnail, Format::Png),
            "media/banner__thumbnail.jpg"
        );
        assert_eq!(
            storage_path_for("banner", VariantKind::Large, Format::Gif),
            "media/banner__large.jpg"
        );
    }

    #[test]
    fn paths_are_stable_across_calls() {
        let a = storage_path_for("x", VariantKind::Medium, Format::Jpg);
        let b = storage_path_for("x", VariantKind::Medium, Format::Jpg);
        assert_eq!(a, b);
    }
}
