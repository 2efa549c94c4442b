//! Static catalog of the ten PDF tools

use crate::i18n::{Language, Message};
use std::fmt;
use std::str::FromStr;

/// One PDF transformation offered by the backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToolKind {
    Merge,
    Split,
    RemovePage,
    ExtractPages,
    ReorderPages,
    AddPassword,
    RemovePassword,
    ToImages,
    AddWatermark,
    RotatePages,
}

impl ToolKind {
    /// Dashboard order
    pub const ALL: [ToolKind; 10] = [
        ToolKind::Merge,
        ToolKind::Split,
        ToolKind::RemovePage,
        ToolKind::ExtractPages,
        ToolKind::ReorderPages,
        ToolKind::AddPassword,
        ToolKind::RemovePassword,
        ToolKind::ToImages,
        ToolKind::AddWatermark,
        ToolKind::RotatePages,
    ];

    /// Stable identifier, also the translation key prefix
    pub fn key(self) -> &'static str {
        match self {
            ToolKind::Merge => "merge",
            ToolKind::Split => "split",
            ToolKind::RemovePage => "removePage",
            ToolKind::ExtractPages => "extractPages",
            ToolKind::ReorderPages => "reorderPages",
            ToolKind::AddPassword => "addPassword",
            ToolKind::RemovePassword => "removePassword",
            ToolKind::ToImages => "toImages",
            ToolKind::AddWatermark => "addWatermark",
            ToolKind::RotatePages => "rotatePages",
        }
    }

    /// Route path of the tool page; the CLI command is its last segment
    pub fn route(self) -> &'static str {
        match self {
            ToolKind::Merge => "/pdf/merge",
            ToolKind::Split => "/pdf/split",
            ToolKind::RemovePage => "/pdf/remove-page",
            ToolKind::ExtractPages => "/pdf/extract-pages",
            ToolKind::ReorderPages => "/pdf/reorder-pages",
            ToolKind::AddPassword => "/pdf/add-password",
            ToolKind::RemovePassword => "/pdf/remove-password",
            ToolKind::ToImages => "/pdf/to-images",
            ToolKind::AddWatermark => "/pdf/add-watermark",
            ToolKind::RotatePages => "/pdf/rotate-pages",
        }
    }

    pub fn command(self) -> &'static str {
        self.route().trim_start_matches("/pdf/")
    }

    pub fn icon(self) -> &'static str {
        match self {
            ToolKind::Merge => "Combine",
            ToolKind::Split => "Split",
            ToolKind::RemovePage => "FileX",
            ToolKind::ExtractPages => "FileDigit",
            ToolKind::ReorderPages => "FileCog",
            ToolKind::AddPassword => "Lock",
            ToolKind::RemovePassword => "Unlock",
            ToolKind::ToImages => "Image",
            ToolKind::AddWatermark => "Stamp",
            ToolKind::RotatePages => "RotateCw",
        }
    }

    /// Backend endpoint, relative to the API base URL
    pub fn endpoint(self) -> &'static str {
        match self {
            ToolKind::Merge => "/pdf/merge",
            ToolKind::Split => "/pdf/split",
            ToolKind::RemovePage => "/pdf/remove-page",
            ToolKind::ExtractPages => "/pdf/extract",
            ToolKind::ReorderPages => "/pdf/reorder",
            ToolKind::AddPassword => "/pdf/add-password",
            ToolKind::RemovePassword => "/pdf/remove-password",
            ToolKind::ToImages => "/pdf/to-images",
            ToolKind::AddWatermark => "/pdf/add-watermark",
            ToolKind::RotatePages => "/pdf/rotate",
        }
    }

    /// File name used when the response carries no `Content-Disposition`
    pub fn default_filename(self) -> &'static str {
        match self {
            ToolKind::Merge => "merged.pdf",
            ToolKind::Split => "split_result.zip",
            ToolKind::RemovePage => "modified.pdf",
            ToolKind::ExtractPages => "extracted.pdf",
            ToolKind::ReorderPages => "reordered.pdf",
            ToolKind::AddPassword => "protected.pdf",
            ToolKind::RemovePassword => "unprotected.pdf",
            ToolKind::ToImages => "images.zip",
            ToolKind::AddWatermark => "watermarked.pdf",
            ToolKind::RotatePages => "rotated.pdf",
        }
    }

    /// Number of PDF files the tool takes
    pub fn file_count(self) -> usize {
        match self {
            ToolKind::Merge => 2,
            _ => 1,
        }
    }

    pub fn title(self) -> Message {
        match self {
            ToolKind::Merge => Message::MergeTitle,
            ToolKind::Split => Message::SplitTitle,
            ToolKind::RemovePage => Message::RemovePageTitle,
            ToolKind::ExtractPages => Message::ExtractPagesTitle,
            ToolKind::ReorderPages => Message::ReorderPagesTitle,
            ToolKind::AddPassword => Message::AddPasswordTitle,
            ToolKind::RemovePassword => Message::RemovePasswordTitle,
            ToolKind::ToImages => Message::ToImagesTitle,
            ToolKind::AddWatermark => Message::AddWatermarkTitle,
            ToolKind::RotatePages => Message::RotatePagesTitle,
        }
    }

    pub fn description(self) -> Message {
        match self {
            ToolKind::Merge => Message::MergeDescription,
            ToolKind::Split => Message::SplitDescription,
            ToolKind::RemovePage => Message::RemovePageDescription,
            ToolKind::ExtractPages => Message::ExtractPagesDescription,
            ToolKind::ReorderPages => Message::ReorderPagesDescription,
            ToolKind::AddPassword => Message::AddPasswordDescription,
            ToolKind::RemovePassword => Message::RemovePasswordDescription,
            ToolKind::ToImages => Message::ToImagesDescription,
            ToolKind::AddWatermark => Message::AddWatermarkDescription,
            ToolKind::RotatePages => Message::RotatePagesDescription,
        }
    }

    /// Message shown when the backend rejects the request
    pub fn failure(self) -> Message {
        match self {
            ToolKind::Merge => Message::MergeFailed,
            ToolKind::Split => Message::SplitFailed,
            ToolKind::RemovePage => Message::RemovePageFailed,
            ToolKind::ExtractPages => Message::ExtractFailed,
            ToolKind::ReorderPages => Message::ReorderFailed,
            ToolKind::AddPassword => Message::AddPasswordFailed,
            ToolKind::RemovePassword => Message::RemovePasswordFailed,
            ToolKind::ToImages => Message::ToImagesFailed,
            ToolKind::AddWatermark => Message::AddWatermarkFailed,
            ToolKind::RotatePages => Message::RotatePagesFailed,
        }
    }

    pub fn card(self, language: Language) -> ToolCard {
        ToolCard {
            kind: self,
            title: language.text(self.title()),
            description: language.text(self.description()),
        }
    }
}

impl fmt::Display for ToolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for ToolKind {
    type Err = String;

    /// Accepts the key (`removePage`) or the command name (`remove-page`)
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ToolKind::ALL
            .into_iter()
            .find(|k| k.key().eq_ignore_ascii_case(s) || k.command() == s)
            .ok_or_else(|| format!("unknown tool: {}", s))
    }
}

/// Localized dashboard entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolCard {
    pub kind: ToolKind,
    pub title: &'static str,
    pub description: &'static str,
}

/// Every tool, localized, in dashboard order
pub fn dashboard(language: Language) -> Vec<ToolCard> {
    ToolKind::ALL.iter().map(|k| k.card(language)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use std::collections::HashSet;

    #[test]
    fn test_catalog_entries_are_unique() {
        let keys: HashSet<_> = ToolKind::ALL.iter().map(|k| k.key()).collect();
        let routes: HashSet<_> = ToolKind::ALL.iter().map(|k| k.route()).collect();
        let endpoints: HashSet<_> = ToolKind::ALL.iter().map(|k| k.endpoint()).collect();
        assert_eq!(keys.len(), 10);
        assert_eq!(routes.len(), 10);
        assert_eq!(endpoints.len(), 10);
    }

    #[rstest]
    #[case("merge", ToolKind::Merge)]
    #[case("remove-page", ToolKind::RemovePage)]
    #[case("removePage", ToolKind::RemovePage)]
    #[case("rotate-pages", ToolKind::RotatePages)]
    #[case("to-images", ToolKind::ToImages)]
    fn test_parse_tool(#[case] input: &str, #[case] expected: ToolKind) {
        assert_eq!(input.parse::<ToolKind>().unwrap(), expected);
    }

    #[test]
    fn test_parse_unknown_tool() {
        assert!("compress".parse::<ToolKind>().is_err());
    }

    #[test]
    fn test_dashboard_is_localized() {
        let en = dashboard(Language::En);
        let sk = dashboard(Language::Sk);
        assert_eq!(en.len(), 10);
        assert_eq!(en[0].title, "Merge PDFs");
        assert_ne!(en[0].title, sk[0].title);
        assert_eq!(en[9].kind, ToolKind::RotatePages);
    }

    #[test]
    fn test_only_merge_takes_two_files() {
        for kind in ToolKind::ALL {
            let expected = if kind == ToolKind::Merge { 2 } else { 1 };
            assert_eq!(kind.file_count(), expected, "{}", kind);
        }
    }
}
