//! Static bilingual table mapping category identifiers to folder names.

use std::str::FromStr;

/// Folder-name languages supported by the batch command. English is the
/// default; unrecognized codes fall back to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Language {
    #[default]
    En,
    PtBr,
}

/// (identifier, pt-BR folder name). English folder names equal the
/// identifier, so only the translated column is tabulated.
const PT_BR_FOLDERS: &[(&str, &str)] = &[
    ("teddy_bears", "ursinhos"),
    ("angels", "anjos"),
    ("names", "nomes"),
    ("cars", "carrinhos"),
    ("flowers", "flores"),
    ("animals", "animais"),
    ("hearts", "coracoes"),
    ("stars", "estrelas"),
    ("butterflies", "borboletas"),
    ("babies", "bebes"),
    ("christmas", "natal"),
    ("easter", "pascoa"),
    ("sports", "esportes"),
    ("food", "comida"),
    ("nature", "natureza"),
    ("other", "outros"),
];

impl Language {
    pub fn code(&self) -> &'static str {
        match self {
            Language::En => "en",
            Language::PtBr => "pt-BR",
        }
    }

    pub fn supported_codes() -> &'static [&'static str] {
        &["en", "pt-BR"]
    }

    /// Folder name for a canonical category identifier. Identifiers
    /// outside the table map to themselves.
    pub fn folder_name<'a>(&self, category_id: &'a str) -> &'a str {
        match self {
            Language::En => category_id,
            Language::PtBr => PT_BR_FOLDERS
                .iter()
                .find(|(id, _)| *id == category_id)
                .map(|(_, folder)| *folder)
                .unwrap_or(category_id),
        }
    }
}

impl FromStr for Language {
    type Err = std::convert::Infallible;

    /// Unsupported codes fall back to the default language rather than
    /// erroring, matching the table lookup behavior.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "pt-BR" | "pt-br" => Language::PtBr,
            _ => Language::En,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_english_maps_identity() {
        assert_eq!(Language::En.folder_name("flowers"), "flowers");
        assert_eq!(Language::En.folder_name("teddy_bears"), "teddy_bears");
    }

    #[test]
    fn test_pt_br_maps_translated() {
        assert_eq!(Language::PtBr.folder_name("flowers"), "flores");
        assert_eq!(Language::PtBr.folder_name("hearts"), "coracoes");
        assert_eq!(Language::PtBr.folder_name("other"), "outros");
    }

    #[test]
    fn test_unknown_identifier_maps_to_itself() {
        assert_eq!(Language::PtBr.folder_name("dragons"), "dragons");
        assert_eq!(Language::En.folder_name("dragons"), "dragons");
    }

    #[test]
    fn test_unsupported_code_falls_back_to_english() {
        let language: Language = "fr-FR".parse().unwrap();
        assert_eq!(language, Language::En);
        assert_eq!(language.folder_name("flowers"), "flowers");
    }

    #[test]
    fn test_supported_codes_parse() {
        assert_eq!("en".parse::<Language>().unwrap(), Language::En);
        assert_eq!("pt-BR".parse::<Language>().unwrap(), Language::PtBr);
    }

    #[test]
    fn test_table_covers_all_supported_categories() {
        for id in crate::category::SUPPORTED_CATEGORIES {
            assert!(
                PT_BR_FOLDERS.iter().any(|(table_id, _)| table_id == id),
                "missing pt-BR folder for {}",
                id
            );
        }
    }
}
