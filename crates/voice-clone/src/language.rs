use strum::VariantArray;

/// Languages the XTTS v2 model can speak
///
/// Codes are matched with exact casing; `zh-cn` is the only hyphenated one.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    strum::EnumString,
    strum::IntoStaticStr,
    strum::Display,
    strum::VariantArray,
)]
#[strum(serialize_all = "lowercase")]
pub enum Language {
    #[default]
    En,
    Es,
    Fr,
    De,
    It,
    Pt,
    Pl,
    Tr,
    Ru,
    Nl,
    Cs,
    Ar,
    #[strum(serialize = "zh-cn")]
    ZhCn,
    Ja,
    Hu,
    Ko,
    Hi,
}

impl Language {
    /// Wire code of this language
    pub fn as_str(self) -> &'static str {
        self.into()
    }

    /// Every supported code, in canonical order
    pub fn supported_codes() -> Vec<&'static str> {
        Self::VARIANTS.iter().map(|language| language.as_str()).collect()
    }
}
