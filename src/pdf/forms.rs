//! Per-tool parameter forms and their validation
//!
//! A form is validated as a whole: every failing field is reported, keyed by
//! its wire name. A form that fails validation is never sent. Once valid,
//! [`ToolForm::fields`] yields the text fields of the multipart body with
//! lists comma-joined.

use super::tools::ToolKind;
use crate::error::{Error, FieldError, Result};
use regex::Regex;
use std::sync::LazyLock;

static COLOR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^#[0-9A-Fa-f]{6}$").expect("valid color regex"));

pub const DEFAULT_DPI: u32 = 150;
pub const MAX_DPI: u32 = 600;
pub const MAX_FONT_SIZE: u32 = 500;
pub const ALLOWED_ROTATIONS: [i32; 6] = [90, 180, 270, -90, -180, -270];

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MergeForm {
    pub output_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SplitForm {
    pub split_at_page: u32,
    pub first_output_name: Option<String>,
    pub second_output_name: Option<String>,
}

impl Default for SplitForm {
    fn default() -> Self {
        Self {
            split_at_page: 1,
            first_output_name: None,
            second_output_name: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RemovePageForm {
    pub page_to_remove: u32,
    pub output_name: Option<String>,
}

impl Default for RemovePageForm {
    fn default() -> Self {
        Self {
            page_to_remove: 1,
            output_name: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExtractPagesForm {
    pub start_page: u32,
    pub end_page: u32,
    pub output_name: Option<String>,
}

impl Default for ExtractPagesForm {
    fn default() -> Self {
        Self {
            start_page: 1,
            end_page: 1,
            output_name: None,
        }
    }
}

/// `page_order` is kept as typed so malformed input can be reported
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReorderPagesForm {
    pub page_order: String,
    pub output_name: Option<String>,
}

/// Shared by add-password and remove-password
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PasswordForm {
    pub password: String,
    pub output_name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct WatermarkForm {
    pub watermark_text: String,
    pub opacity: Option<f32>,
    pub font_size: Option<u32>,
    pub color: Option<String>,
    pub rotation: Option<i32>,
    pub output_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RotatePagesForm {
    pub pages: Vec<u32>,
    pub rotations: Vec<i32>,
    pub output_name: Option<String>,
}

impl Default for RotatePagesForm {
    fn default() -> Self {
        Self {
            pages: Vec::new(),
            rotations: vec![90],
            output_name: None,
        }
    }
}

impl RotatePagesForm {
    /// Rotation per page. A single rotation applies to every page.
    pub fn resolved_rotations(&self) -> Vec<i32> {
        match self.rotations.as_slice() {
            [single] => vec![*single; self.pages.len()],
            many => many.to_vec(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ToImagesForm {
    pub dpi: u32,
}

impl Default for ToImagesForm {
    fn default() -> Self {
        Self { dpi: DEFAULT_DPI }
    }
}

/// Form values for one tool
#[derive(Debug, Clone, PartialEq)]
pub enum ToolForm {
    Merge(MergeForm),
    Split(SplitForm),
    RemovePage(RemovePageForm),
    ExtractPages(ExtractPagesForm),
    ReorderPages(ReorderPagesForm),
    AddPassword(PasswordForm),
    RemovePassword(PasswordForm),
    ToImages(ToImagesForm),
    AddWatermark(WatermarkForm),
    RotatePages(RotatePagesForm),
}

impl ToolForm {
    /// Form pre-filled with the tool's defaults
    pub fn new(kind: ToolKind) -> Self {
        match kind {
            ToolKind::Merge => ToolForm::Merge(MergeForm::default()),
            ToolKind::Split => ToolForm::Split(SplitForm::default()),
            ToolKind::RemovePage => ToolForm::RemovePage(RemovePageForm::default()),
            ToolKind::ExtractPages => ToolForm::ExtractPages(ExtractPagesForm::default()),
            ToolKind::ReorderPages => ToolForm::ReorderPages(ReorderPagesForm::default()),
            ToolKind::AddPassword => ToolForm::AddPassword(PasswordForm::default()),
            ToolKind::RemovePassword => ToolForm::RemovePassword(PasswordForm::default()),
            ToolKind::ToImages => ToolForm::ToImages(ToImagesForm::default()),
            ToolKind::AddWatermark => ToolForm::AddWatermark(WatermarkForm::default()),
            ToolKind::RotatePages => ToolForm::RotatePages(RotatePagesForm::default()),
        }
    }

    pub fn kind(&self) -> ToolKind {
        match self {
            ToolForm::Merge(_) => ToolKind::Merge,
            ToolForm::Split(_) => ToolKind::Split,
            ToolForm::RemovePage(_) => ToolKind::RemovePage,
            ToolForm::ExtractPages(_) => ToolKind::ExtractPages,
            ToolForm::ReorderPages(_) => ToolKind::ReorderPages,
            ToolForm::AddPassword(_) => ToolKind::AddPassword,
            ToolForm::RemovePassword(_) => ToolKind::RemovePassword,
            ToolForm::ToImages(_) => ToolKind::ToImages,
            ToolForm::AddWatermark(_) => ToolKind::AddWatermark,
            ToolForm::RotatePages(_) => ToolKind::RotatePages,
        }
    }

    /// Field-level errors of the form values alone
    pub fn errors(&self) -> Vec<FieldError> {
        let mut errors = Vec::new();

        match self {
            ToolForm::Merge(form) => {
                check_output_name(&mut errors, "output_name", &form.output_name);
            }
            ToolForm::Split(form) => {
                check_page(&mut errors, "split_at_page", form.split_at_page);
                check_output_name(&mut errors, "first_output_name", &form.first_output_name);
                check_output_name(&mut errors, "second_output_name", &form.second_output_name);
            }
            ToolForm::RemovePage(form) => {
                check_page(&mut errors, "page_to_remove", form.page_to_remove);
                check_output_name(&mut errors, "output_name", &form.output_name);
            }
            ToolForm::ExtractPages(form) => {
                check_page(&mut errors, "start_page", form.start_page);
                if form.end_page < form.start_page.max(1) {
                    errors.push(FieldError::new(
                        "end_page",
                        "must be greater than or equal to start_page",
                    ));
                }
                check_output_name(&mut errors, "output_name", &form.output_name);
            }
            ToolForm::ReorderPages(form) => {
                if let Err(message) = parse_page_order(&form.page_order) {
                    errors.push(FieldError::new("page_order", message));
                }
                check_output_name(&mut errors, "output_name", &form.output_name);
            }
            ToolForm::AddPassword(form) | ToolForm::RemovePassword(form) => {
                if form.password.is_empty() {
                    errors.push(FieldError::new("password", "required"));
                }
                check_output_name(&mut errors, "output_name", &form.output_name);
            }
            ToolForm::ToImages(form) => {
                if form.dpi == 0 || form.dpi > MAX_DPI {
                    errors.push(FieldError::new(
                        "dpi",
                        format!("must be between 1 and {}", MAX_DPI),
                    ));
                }
            }
            ToolForm::AddWatermark(form) => {
                if form.watermark_text.trim().is_empty() {
                    errors.push(FieldError::new("watermark_text", "required"));
                }
                if let Some(opacity) = form.opacity {
                    if !(0.0..=1.0).contains(&opacity) {
                        errors.push(FieldError::new("opacity", "must be between 0 and 1"));
                    }
                }
                if let Some(size) = form.font_size {
                    if size == 0 || size > MAX_FONT_SIZE {
                        errors.push(FieldError::new(
                            "font_size",
                            format!("must be between 1 and {}", MAX_FONT_SIZE),
                        ));
                    }
                }
                if let Some(ref color) = form.color {
                    if !COLOR_RE.is_match(color) {
                        errors.push(FieldError::new("color", "must be a hex color like #FF0000"));
                    }
                }
                if let Some(rotation) = form.rotation {
                    if !(-360..=360).contains(&rotation) {
                        errors.push(FieldError::new("rotation", "must be between -360 and 360"));
                    }
                }
                check_output_name(&mut errors, "output_name", &form.output_name);
            }
            ToolForm::RotatePages(form) => {
                if form.pages.is_empty() {
                    errors.push(FieldError::new("pages", "at least one page is required"));
                } else if form.pages.contains(&0) {
                    errors.push(FieldError::new("pages", "page numbers must be at least 1"));
                }
                if form.rotations.is_empty() {
                    errors.push(FieldError::new("rotations", "at least one rotation is required"));
                } else if form
                    .rotations
                    .iter()
                    .any(|r| !ALLOWED_ROTATIONS.contains(r))
                {
                    errors.push(FieldError::new(
                        "rotations",
                        "each rotation must be one of 90, 180, 270, -90, -180, -270",
                    ));
                } else if form.rotations.len() > 1 && form.rotations.len() != form.pages.len() {
                    errors.push(FieldError::new(
                        "rotations",
                        "give one rotation, or one per page",
                    ));
                }
                check_output_name(&mut errors, "output_name", &form.output_name);
            }
        }

        errors
    }

    pub fn validate(&self) -> Result<()> {
        into_result(self.errors())
    }

    /// Multipart text fields in wire order.
    ///
    /// Validates first; optional values that are unset are omitted.
    pub fn fields(&self) -> Result<Vec<(&'static str, String)>> {
        self.validate()?;

        let mut fields = Vec::new();
        match self {
            ToolForm::Merge(form) => {
                push_opt(&mut fields, "output_name", &form.output_name);
            }
            ToolForm::Split(form) => {
                fields.push(("split_at_page", form.split_at_page.to_string()));
                push_opt(&mut fields, "first_output_name", &form.first_output_name);
                push_opt(&mut fields, "second_output_name", &form.second_output_name);
            }
            ToolForm::RemovePage(form) => {
                fields.push(("page_to_remove", form.page_to_remove.to_string()));
                push_opt(&mut fields, "output_name", &form.output_name);
            }
            ToolForm::ExtractPages(form) => {
                fields.push(("start_page", form.start_page.to_string()));
                fields.push(("end_page", form.end_page.to_string()));
                push_opt(&mut fields, "output_name", &form.output_name);
            }
            ToolForm::ReorderPages(form) => {
                let order = parse_page_order(&form.page_order).map_err(|message| {
                    Error::Validation(vec![FieldError::new("page_order", message)])
                })?;
                fields.push(("page_order", join(&order)));
                push_opt(&mut fields, "output_name", &form.output_name);
            }
            ToolForm::AddPassword(form) | ToolForm::RemovePassword(form) => {
                fields.push(("password", form.password.clone()));
                push_opt(&mut fields, "output_name", &form.output_name);
            }
            ToolForm::ToImages(form) => {
                fields.push(("dpi", form.dpi.to_string()));
            }
            ToolForm::AddWatermark(form) => {
                fields.push(("watermark_text", form.watermark_text.clone()));
                push_opt(&mut fields, "opacity", &form.opacity);
                push_opt(&mut fields, "font_size", &form.font_size);
                push_opt(&mut fields, "color", &form.color);
                push_opt(&mut fields, "rotation", &form.rotation);
                push_opt(&mut fields, "output_name", &form.output_name);
            }
            ToolForm::RotatePages(form) => {
                fields.push(("pages", join(&form.pages)));
                fields.push(("rotations", join(&form.resolved_rotations())));
                push_opt(&mut fields, "output_name", &form.output_name);
            }
        }
        Ok(fields)
    }
}

/// Errors for the selected files plus the form values.
///
/// No file at all reports `file: required`.
pub fn submission_errors(file_count: usize, form: &ToolForm) -> Vec<FieldError> {
    let required = form.kind().file_count();
    let mut errors = Vec::new();
    if file_count == 0 {
        errors.push(FieldError::new("file", "required"));
    } else if file_count != required {
        errors.push(FieldError::new(
            "file",
            format!("exactly {} files are required", required),
        ));
    }
    errors.extend(form.errors());
    errors
}

pub fn validate_submission(file_count: usize, form: &ToolForm) -> Result<()> {
    into_result(submission_errors(file_count, form))
}

/// Whether the submit action is enabled
pub fn can_submit(file_count: usize, form: &ToolForm) -> bool {
    submission_errors(file_count, form).is_empty()
}

/// Parse a comma separated page order such as `"2,1,4,3"`
pub fn parse_page_order(input: &str) -> std::result::Result<Vec<u32>, String> {
    if input.trim().is_empty() {
        return Err("required".to_string());
    }

    input
        .split(',')
        .map(|part| {
            let part = part.trim();
            match part.parse::<u32>() {
                Ok(0) => Err("page numbers must be at least 1".to_string()),
                Ok(page) => Ok(page),
                Err(_) => Err(format!("'{}' is not a page number", part)),
            }
        })
        .collect()
}

fn check_page(errors: &mut Vec<FieldError>, field: &'static str, page: u32) {
    if page == 0 {
        errors.push(FieldError::new(field, "must be at least 1"));
    }
}

fn check_output_name(errors: &mut Vec<FieldError>, field: &'static str, name: &Option<String>) {
    let Some(name) = name else { return };
    let name = name.trim();
    if name.is_empty() {
        errors.push(FieldError::new(field, "must not be empty"));
    } else if !name.to_ascii_lowercase().ends_with(".pdf") {
        errors.push(FieldError::new(field, "must end with .pdf"));
    } else if name.contains(['/', '\\']) {
        errors.push(FieldError::new(field, "must be a file name, not a path"));
    }
}

fn push_opt<T: ToString>(
    fields: &mut Vec<(&'static str, String)>,
    name: &'static str,
    value: &Option<T>,
) {
    if let Some(value) = value {
        fields.push((name, value.to_string().trim().to_string()));
    }
}

fn join<T: ToString>(values: &[T]) -> String {
    values
        .iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join(",")
}

fn into_result(errors: Vec<FieldError>) -> Result<()> {
    if errors.is_empty() {
        Ok(())
    } else {
        Err(Error::Validation(errors))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn fields_of(form: &ToolForm) -> Vec<(&'static str, String)> {
        form.fields().unwrap()
    }

    fn error_fields(form: &ToolForm) -> Vec<&'static str> {
        form.errors().iter().map(|e| e.field).collect()
    }

    #[rstest]
    #[case("2,1,4,3", Some(vec![2, 1, 4, 3]))]
    #[case(" 3 , 1,2 ", Some(vec![3, 1, 2]))]
    #[case("a,b", None)]
    #[case("", None)]
    #[case("1,,2", None)]
    #[case("0,1", None)]
    #[case("-1", None)]
    fn test_parse_page_order(#[case] input: &str, #[case] expected: Option<Vec<u32>>) {
        assert_eq!(parse_page_order(input).ok(), expected);
    }

    #[test]
    fn test_reorder_form_normalizes_order() {
        let form = ToolForm::ReorderPages(ReorderPagesForm {
            page_order: "2, 1,4 ,3".into(),
            output_name: None,
        });
        assert_eq!(fields_of(&form), vec![("page_order", "2,1,4,3".to_string())]);
    }

    #[test]
    fn test_rotate_broadcasts_single_rotation() {
        let form = ToolForm::RotatePages(RotatePagesForm {
            pages: vec![1, 2, 3],
            rotations: vec![90],
            output_name: None,
        });
        assert_eq!(
            fields_of(&form),
            vec![
                ("pages", "1,2,3".to_string()),
                ("rotations", "90,90,90".to_string())
            ]
        );
    }

    #[test]
    fn test_rotate_validation() {
        let mismatch = ToolForm::RotatePages(RotatePagesForm {
            pages: vec![1, 2, 3],
            rotations: vec![90, 180],
            output_name: None,
        });
        assert_eq!(error_fields(&mismatch), vec!["rotations"]);

        let bad_angle = ToolForm::RotatePages(RotatePagesForm {
            pages: vec![1],
            rotations: vec![45],
            output_name: None,
        });
        assert_eq!(error_fields(&bad_angle), vec!["rotations"]);

        let no_pages = ToolForm::RotatePages(RotatePagesForm::default());
        assert_eq!(error_fields(&no_pages), vec!["pages"]);

        let negative = ToolForm::RotatePages(RotatePagesForm {
            pages: vec![2, 4],
            rotations: vec![-90, 270],
            output_name: Some("turned.pdf".into()),
        });
        assert!(negative.validate().is_ok());
    }

    #[test]
    fn test_extract_requires_ordered_range() {
        let form = ToolForm::ExtractPages(ExtractPagesForm {
            start_page: 5,
            end_page: 2,
            output_name: None,
        });
        assert_eq!(error_fields(&form), vec!["end_page"]);

        let zero = ToolForm::ExtractPages(ExtractPagesForm {
            start_page: 0,
            end_page: 0,
            output_name: None,
        });
        assert_eq!(error_fields(&zero), vec!["start_page", "end_page"]);
    }

    #[test]
    fn test_split_fields_and_output_names() {
        let form = ToolForm::Split(SplitForm {
            split_at_page: 3,
            first_output_name: Some("intro.pdf".into()),
            second_output_name: Some("rest.txt".into()),
        });
        assert_eq!(error_fields(&form), vec!["second_output_name"]);

        let form = ToolForm::Split(SplitForm {
            split_at_page: 3,
            first_output_name: Some("intro.pdf".into()),
            second_output_name: None,
        });
        assert_eq!(
            fields_of(&form),
            vec![
                ("split_at_page", "3".to_string()),
                ("first_output_name", "intro.pdf".to_string())
            ]
        );
    }

    #[test]
    fn test_output_name_rejects_paths() {
        let form = ToolForm::Merge(MergeForm {
            output_name: Some("../evil.pdf".into()),
        });
        assert_eq!(error_fields(&form), vec!["output_name"]);
    }

    #[test]
    fn test_password_required() {
        let add = ToolForm::AddPassword(PasswordForm::default());
        let remove = ToolForm::RemovePassword(PasswordForm::default());
        assert_eq!(error_fields(&add), vec!["password"]);
        assert_eq!(error_fields(&remove), vec!["password"]);
    }

    #[rstest]
    #[case(Some(1.5), None, None, None, vec!["opacity"])]
    #[case(None, Some(0), None, None, vec!["font_size"])]
    #[case(None, Some(501), None, None, vec!["font_size"])]
    #[case(None, None, Some("red"), None, vec!["color"])]
    #[case(None, None, None, Some(400), vec!["rotation"])]
    #[case(Some(0.3), Some(48), Some("#00ff00"), Some(-45), vec![])]
    fn test_watermark_extras(
        #[case] opacity: Option<f32>,
        #[case] font_size: Option<u32>,
        #[case] color: Option<&str>,
        #[case] rotation: Option<i32>,
        #[case] expected: Vec<&'static str>,
    ) {
        let form = ToolForm::AddWatermark(WatermarkForm {
            watermark_text: "CONFIDENTIAL".into(),
            opacity,
            font_size,
            color: color.map(str::to_string),
            rotation,
            output_name: None,
        });
        assert_eq!(error_fields(&form), expected);
    }

    #[test]
    fn test_watermark_fields_include_extras() {
        let form = ToolForm::AddWatermark(WatermarkForm {
            watermark_text: "DRAFT".into(),
            opacity: Some(0.5),
            color: Some("#FF0000".into()),
            ..WatermarkForm::default()
        });
        assert_eq!(
            fields_of(&form),
            vec![
                ("watermark_text", "DRAFT".to_string()),
                ("opacity", "0.5".to_string()),
                ("color", "#FF0000".to_string())
            ]
        );
    }

    #[rstest]
    #[case(0, false)]
    #[case(1, true)]
    #[case(150, true)]
    #[case(600, true)]
    #[case(601, false)]
    fn test_dpi_range(#[case] dpi: u32, #[case] valid: bool) {
        let form = ToolForm::ToImages(ToImagesForm { dpi });
        assert_eq!(form.validate().is_ok(), valid);
    }

    #[test]
    fn test_submission_requires_file_for_every_tool() {
        for kind in ToolKind::ALL {
            let form = ToolForm::new(kind);
            let errors = submission_errors(0, &form);
            assert_eq!(errors[0].to_string(), "file: required", "{}", kind);
            assert!(!can_submit(0, &form));
        }
    }

    #[test]
    fn test_merge_needs_exactly_two_files() {
        let form = ToolForm::new(ToolKind::Merge);
        assert!(!can_submit(1, &form));
        assert!(can_submit(2, &form));
        assert!(!can_submit(3, &form));
    }

    #[test]
    fn test_can_submit_with_defaults() {
        // Tools whose defaults are already valid
        for kind in [
            ToolKind::Split,
            ToolKind::RemovePage,
            ToolKind::ExtractPages,
            ToolKind::ToImages,
        ] {
            assert!(can_submit(1, &ToolForm::new(kind)), "{}", kind);
        }
        // Tools that need user input first
        for kind in [
            ToolKind::ReorderPages,
            ToolKind::AddPassword,
            ToolKind::RemovePassword,
            ToolKind::AddWatermark,
            ToolKind::RotatePages,
        ] {
            assert!(!can_submit(1, &ToolForm::new(kind)), "{}", kind);
        }
    }

    #[test]
    fn test_new_form_matches_kind() {
        for kind in ToolKind::ALL {
            assert_eq!(ToolForm::new(kind).kind(), kind);
        }
    }
}
