//! Localized user-facing strings
//!
//! The client ships English and Slovak catalogs. Every string shown to the
//! user goes through [`Language::text`]; unknown language codes fall back to
//! English.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// UI language
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    En,
    Sk,
}

impl Language {
    pub const ALL: [Language; 2] = [Language::En, Language::Sk];

    pub fn code(self) -> &'static str {
        match self {
            Language::En => "en",
            Language::Sk => "sk",
        }
    }

    /// Parse a language code, falling back to English for anything unknown
    pub fn from_code_lossy(code: &str) -> Self {
        code.parse().unwrap_or_default()
    }

    /// Look up a message in this language's catalog
    pub fn text(self, message: Message) -> &'static str {
        match self {
            Language::En => english(message),
            Language::Sk => slovak(message),
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Language {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // Accept region-qualified codes such as "sk-SK" or "en_US"
        let primary = s
            .split(['-', '_'])
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();
        match primary.as_str() {
            "en" => Ok(Language::En),
            "sk" => Ok(Language::Sk),
            _ => Err(format!("unsupported language: {}", s)),
        }
    }
}

/// Every user-facing string the client can produce
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Message {
    UploadFirst,
    UploadTwoFiles,
    Unexpected,
    SessionExpired,

    MergeFailed,
    SplitFailed,
    RemovePageFailed,
    ExtractFailed,
    ReorderFailed,
    AddPasswordFailed,
    RemovePasswordFailed,
    AddWatermarkFailed,
    RotatePagesFailed,
    ToImagesFailed,

    LoginCredentialsRequired,
    LoginInvalid,
    LoginFailed,
    RegisterFailed,
    AlreadyLoggedIn,
    LoggedOut,
    LoginRequired,
    AdminRequired,

    HistoryFetchFailed,
    HistorySearchFailed,
    HistoryExportFailed,
    HistoryDeleteFailed,
    HistoryDeleteAllFailed,
    HistoryClearNeedsConfirm,

    MergeTitle,
    MergeDescription,
    SplitTitle,
    SplitDescription,
    RemovePageTitle,
    RemovePageDescription,
    ExtractPagesTitle,
    ExtractPagesDescription,
    ReorderPagesTitle,
    ReorderPagesDescription,
    AddPasswordTitle,
    AddPasswordDescription,
    RemovePasswordTitle,
    RemovePasswordDescription,
    ToImagesTitle,
    ToImagesDescription,
    AddWatermarkTitle,
    AddWatermarkDescription,
    RotatePagesTitle,
    RotatePagesDescription,

    Saved,
}

fn english(message: Message) -> &'static str {
    use Message::*;
    match message {
        UploadFirst => "Please upload a PDF file first",
        UploadTwoFiles => "Please upload at least two PDF files",
        Unexpected => "An unexpected error occurred. Please try again.",
        SessionExpired => "Your session has expired. Please log in again.",

        MergeFailed => "Error merging PDFs. Please try again.",
        SplitFailed => "Error splitting PDF. Please try again.",
        RemovePageFailed => "Error removing page from PDF. Please try again.",
        ExtractFailed => "Error extracting pages from PDF. Please try again.",
        ReorderFailed => "Error reordering PDF pages. Please try again.",
        AddPasswordFailed => "Error adding password to PDF. Please try again.",
        RemovePasswordFailed => "Error removing password from PDF. Please try again.",
        AddWatermarkFailed => "Error adding watermark to PDF. Please try again.",
        RotatePagesFailed => "Error rotating PDF pages. Please try again.",
        ToImagesFailed => "Error converting PDF to images. Please try again.",

        LoginCredentialsRequired => "Please enter your email and password",
        LoginInvalid => "Invalid email or password",
        LoginFailed => "Login failed",
        RegisterFailed => "Registration failed. Please try again.",
        AlreadyLoggedIn => "You are already logged in",
        LoggedOut => "Logged out",
        LoginRequired => "Please log in first",
        AdminRequired => "Administrator access required",

        HistoryFetchFailed => "Failed to fetch history",
        HistorySearchFailed => "Failed to search history",
        HistoryExportFailed => "Failed to export history",
        HistoryClearNeedsConfirm => "Deleting all history requires --yes",
        HistoryDeleteFailed => "Failed to delete entry",
        HistoryDeleteAllFailed => "Failed to delete all history",

        MergeTitle => "Merge PDFs",
        MergeDescription => "Combine 2 PDF files into one document.",
        SplitTitle => "Split PDF",
        SplitDescription => "Split a PDF into two documents at a page.",
        RemovePageTitle => "Remove Page",
        RemovePageDescription => "Remove a single page from a PDF.",
        ExtractPagesTitle => "Extract Pages",
        ExtractPagesDescription => "Extract a range of pages into a new PDF.",
        ReorderPagesTitle => "Reorder Pages",
        ReorderPagesDescription => "Change the order of pages in a PDF.",
        AddPasswordTitle => "Add Password",
        AddPasswordDescription => "Protect a PDF with a password.",
        RemovePasswordTitle => "Remove Password",
        RemovePasswordDescription => "Remove password protection from a PDF.",
        ToImagesTitle => "PDF to Images",
        ToImagesDescription => "Convert every page of a PDF to an image.",
        AddWatermarkTitle => "Add Watermark",
        AddWatermarkDescription => "Stamp a text watermark on every page.",
        RotatePagesTitle => "Rotate Pages",
        RotatePagesDescription => "Rotate selected pages of a PDF.",

        Saved => "Saved",
    }
}

fn slovak(message: Message) -> &'static str {
    use Message::*;
    match message {
        UploadFirst => "Najprv nahrajte PDF súbor",
        UploadTwoFiles => "Nahrajte aspoň dva PDF súbory",
        Unexpected => "Nastala neočakávaná chyba. Skúste to znova.",
        SessionExpired => "Vaša relácia vypršala. Prihláste sa znova.",

        MergeFailed => "Chyba pri spájaní PDF súborov. Skúste to znova.",
        SplitFailed => "Chyba pri rozdeľovaní PDF. Skúste to znova.",
        RemovePageFailed => "Chyba pri odstraňovaní strany z PDF. Skúste to znova.",
        ExtractFailed => "Chyba pri extrahovaní strán z PDF. Skúste to znova.",
        ReorderFailed => "Chyba pri zmene poradia strán. Skúste to znova.",
        AddPasswordFailed => "Chyba pri pridávaní hesla do PDF. Skúste to znova.",
        RemovePasswordFailed => "Chyba pri odstraňovaní hesla z PDF. Skúste to znova.",
        AddWatermarkFailed => "Chyba pri pridávaní vodotlače. Skúste to znova.",
        RotatePagesFailed => "Chyba pri otáčaní strán PDF. Skúste to znova.",
        ToImagesFailed => "Chyba pri konverzii PDF na obrázky. Skúste to znova.",

        LoginCredentialsRequired => "Zadajte e-mail a heslo",
        LoginInvalid => "Nesprávne prihlasovacie údaje",
        LoginFailed => "Chyba pri prihlásení",
        RegisterFailed => "Registrácia zlyhala. Skúste to znova.",
        AlreadyLoggedIn => "Už ste prihlásený",
        LoggedOut => "Boli ste odhlásený",
        LoginRequired => "Najprv sa prihláste",
        AdminRequired => "Vyžaduje sa administrátorský prístup",

        HistoryFetchFailed => "Nepodarilo sa načítať históriu",
        HistorySearchFailed => "Nepodarilo sa vyhľadať v histórii",
        HistoryExportFailed => "Nepodarilo sa exportovať históriu",
        HistoryClearNeedsConfirm => "Vymazanie celej histórie vyžaduje --yes",
        HistoryDeleteFailed => "Nepodarilo sa odstrániť záznam",
        HistoryDeleteAllFailed => "Nepodarilo sa odstrániť celú históriu",

        MergeTitle => "Spojiť PDF",
        MergeDescription => "Spojte 2 PDF súbory do jedného dokumentu.",
        SplitTitle => "Rozdeliť PDF",
        SplitDescription => "Rozdeľte PDF na dva dokumenty podľa strany.",
        RemovePageTitle => "Odstrániť stranu",
        RemovePageDescription => "Odstráňte jednu stranu z PDF.",
        ExtractPagesTitle => "Extrahovať strany",
        ExtractPagesDescription => "Extrahujte rozsah strán do nového PDF.",
        ReorderPagesTitle => "Zmeniť poradie strán",
        ReorderPagesDescription => "Zmeňte poradie strán v PDF.",
        AddPasswordTitle => "Pridať heslo",
        AddPasswordDescription => "Ochráňte PDF heslom.",
        RemovePasswordTitle => "Odstrániť heslo",
        RemovePasswordDescription => "Odstráňte ochranu heslom z PDF.",
        ToImagesTitle => "PDF na obrázky",
        ToImagesDescription => "Skonvertujte každú stranu PDF na obrázok.",
        AddWatermarkTitle => "Pridať vodotlač",
        AddWatermarkDescription => "Pridajte textovú vodotlač na každú stranu.",
        RotatePagesTitle => "Otočiť strany",
        RotatePagesDescription => "Otočte vybrané strany PDF.",

        Saved => "Uložené",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("en", Language::En)]
    #[case("sk", Language::Sk)]
    #[case("sk-SK", Language::Sk)]
    #[case("EN_us", Language::En)]
    #[case("de", Language::En)]
    #[case("", Language::En)]
    fn test_from_code_lossy(#[case] code: &str, #[case] expected: Language) {
        assert_eq!(Language::from_code_lossy(code), expected);
    }

    #[test]
    fn test_catalogs_are_distinct_and_non_empty() {
        for message in [
            Message::UploadFirst,
            Message::MergeFailed,
            Message::RotatePagesFailed,
            Message::HistoryExportFailed,
            Message::HistoryClearNeedsConfirm,
        ] {
            let en = Language::En.text(message);
            let sk = Language::Sk.text(message);
            assert!(!en.is_empty());
            assert!(!sk.is_empty());
            assert_ne!(en, sk);
        }
    }

    #[test]
    fn test_display_matches_code() {
        assert_eq!(Language::Sk.to_string(), "sk");
    }
}
