//! Command-line front end
//!
//! Every page of the tool suite is a subcommand. Each command declares the
//! guard it runs behind; the guard is checked against the rehydrated session
//! before anything is sent.

use crate::api::ApiClient;
use crate::auth::{AuthService, LoginCredentials, RegisterForm};
use crate::config::{normalize_base_url, ClientConfig};
use crate::error::Error;
use crate::history::{AdminHistory, HistoryPage, HistorySearch, HistoryService, DEFAULT_PAGE_SIZE};
use crate::i18n::{Language, Message};
use crate::pdf::{
    dashboard, DirectorySink, ExtractPagesForm, FileUploader, MergeForm, MultiFileUploader,
    PasswordForm, PdfFile, RemovePageForm, ReorderPagesForm, RotatePagesForm, SplitForm,
    ToImagesForm, ToolForm, ToolKind, ToolOperation, WatermarkForm,
};
use crate::session::{FileStore, Guard, GuardOutcome, SessionStore, HOME_PATH};
use anyhow::{anyhow, bail, Context};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(name = "pdf-tools")]
#[command(
    version,
    about = "Merge, split, protect, watermark and convert PDFs through a PDF tools server"
)]
pub struct Cli {
    #[arg(
        long,
        global = true,
        help = "API base URL (default: $PDF_TOOLS_API_URL or http://localhost:8080/api)"
    )]
    pub api_url: Option<String>,

    #[arg(
        long,
        global = true,
        help = "Directory holding the saved session (default: $PDF_TOOLS_HOME or ~/.pdf-tools)"
    )]
    pub home: Option<PathBuf>,

    #[arg(short, long, global = true, help = "Directory processed files are saved into")]
    pub output_dir: Option<PathBuf>,

    #[arg(long, global = true, help = "Request timeout in seconds")]
    pub timeout: Option<u64>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    #[command(about = "Log in and remember the session")]
    Login {
        #[arg(long, help = "Account email")]
        email: String,
        #[arg(long, env = "PDF_TOOLS_PASSWORD", hide_env_values = true, help = "Account password")]
        password: String,
    },
    #[command(about = "Create an account and log in")]
    Register {
        #[arg(long, help = "First name")]
        first_name: String,
        #[arg(long, help = "Last name")]
        last_name: String,
        #[arg(long, help = "Account email")]
        email: String,
        #[arg(long, help = "Password (at least 8 characters)")]
        password: String,
        #[arg(long, help = "Password again")]
        confirm_password: String,
    },
    #[command(about = "Forget the saved session")]
    Logout,
    #[command(about = "Show the current session")]
    Whoami,
    #[command(about = "List the available tools")]
    Tools,
    #[command(about = "Show or change the interface language")]
    Lang {
        #[arg(help = "Language code (en, sk)")]
        code: Option<String>,
    },
    #[command(about = "Merge two PDFs into one")]
    Merge {
        #[arg(help = "First PDF")]
        first: PathBuf,
        #[arg(help = "Second PDF")]
        second: PathBuf,
        #[arg(long, help = "Name of the merged file")]
        output_name: Option<String>,
    },
    #[command(about = "Split a PDF into two at a page")]
    Split {
        #[arg(help = "Input PDF")]
        input: PathBuf,
        #[arg(long, help = "Last page of the first part")]
        at: u32,
        #[arg(long, help = "Name of the first part")]
        first_name: Option<String>,
        #[arg(long, help = "Name of the second part")]
        second_name: Option<String>,
    },
    #[command(about = "Remove one page from a PDF")]
    RemovePage {
        #[arg(help = "Input PDF")]
        input: PathBuf,
        #[arg(long, help = "Page to remove (1-indexed)")]
        page: u32,
        #[arg(long, help = "Name of the output file")]
        output_name: Option<String>,
    },
    #[command(about = "Extract a range of pages")]
    ExtractPages {
        #[arg(help = "Input PDF")]
        input: PathBuf,
        #[arg(long, help = "First page (1-indexed)")]
        start: u32,
        #[arg(long, help = "Last page (inclusive)")]
        end: u32,
        #[arg(long, help = "Name of the output file")]
        output_name: Option<String>,
    },
    #[command(about = "Reorder the pages of a PDF")]
    ReorderPages {
        #[arg(help = "Input PDF")]
        input: PathBuf,
        #[arg(long, help = "New page order, e.g. 2,1,4,3")]
        order: String,
        #[arg(long, help = "Name of the output file")]
        output_name: Option<String>,
    },
    #[command(about = "Protect a PDF with a password")]
    AddPassword {
        #[arg(help = "Input PDF")]
        input: PathBuf,
        #[arg(long, help = "Password to set")]
        password: String,
        #[arg(long, help = "Name of the output file")]
        output_name: Option<String>,
    },
    #[command(about = "Remove password protection from a PDF")]
    RemovePassword {
        #[arg(help = "Input PDF")]
        input: PathBuf,
        #[arg(long, help = "Current password")]
        password: String,
        #[arg(long, help = "Name of the output file")]
        output_name: Option<String>,
    },
    #[command(about = "Convert every page to an image (zip)")]
    ToImages {
        #[arg(help = "Input PDF")]
        input: PathBuf,
        #[arg(long, help = "Resolution", default_value_t = crate::pdf::forms::DEFAULT_DPI)]
        dpi: u32,
    },
    #[command(about = "Stamp a text watermark on every page")]
    AddWatermark {
        #[arg(help = "Input PDF")]
        input: PathBuf,
        #[arg(long, help = "Watermark text")]
        text: String,
        #[arg(long, help = "Opacity between 0 and 1")]
        opacity: Option<f32>,
        #[arg(long, help = "Font size")]
        font_size: Option<u32>,
        #[arg(long, help = "Text color as #RRGGBB")]
        color: Option<String>,
        #[arg(long, allow_hyphen_values = true, help = "Text rotation in degrees")]
        rotation: Option<i32>,
        #[arg(long, help = "Name of the output file")]
        output_name: Option<String>,
    },
    #[command(about = "Rotate selected pages")]
    RotatePages {
        #[arg(help = "Input PDF")]
        input: PathBuf,
        #[arg(long, value_delimiter = ',', required = true, help = "Pages to rotate, e.g. 1,3,5")]
        pages: Vec<u32>,
        #[arg(
            long,
            value_delimiter = ',',
            allow_hyphen_values = true,
            default_value = "90",
            help = "One rotation for all pages, or one per page (90, 180, 270, -90, ...)"
        )]
        rotations: Vec<i32>,
        #[arg(long, help = "Name of the output file")]
        output_name: Option<String>,
    },
    #[command(subcommand, about = "Inspect and manage the operation history (admin)")]
    History(HistoryCommand),
}

#[derive(Subcommand, Debug)]
pub enum HistoryCommand {
    #[command(about = "List one page of history")]
    List {
        #[arg(long, default_value_t = 0, help = "Page number (0-based)")]
        page: u32,
        #[arg(long, default_value_t = DEFAULT_PAGE_SIZE, help = "Entries per page (1-100)")]
        size: u32,
    },
    #[command(about = "Search history")]
    Search {
        #[arg(long, help = "User id")]
        user_id: Option<i64>,
        #[arg(long, help = "Operation type, e.g. MERGE")]
        operation: Option<String>,
        #[arg(long, help = "Earliest date (ISO 8601)")]
        from: Option<String>,
        #[arg(long, help = "Latest date (ISO 8601)")]
        to: Option<String>,
        #[arg(long, help = "Country")]
        country: Option<String>,
        #[arg(long, help = "Source type, e.g. FRONTEND")]
        source: Option<String>,
        #[arg(long, default_value_t = 0, help = "Page number (0-based)")]
        page: u32,
        #[arg(long, default_value_t = DEFAULT_PAGE_SIZE, help = "Entries per page (1-100)")]
        size: u32,
    },
    #[command(about = "Delete one entry")]
    Delete {
        #[arg(help = "Entry id")]
        id: i64,
    },
    #[command(about = "Delete every entry")]
    Clear {
        #[arg(long, help = "Confirm deleting all history")]
        yes: bool,
    },
    #[command(about = "Export the history as CSV")]
    Export,
}

impl Command {
    /// Guard the command runs behind
    pub fn guard(&self) -> Guard {
        match self {
            Command::Login { .. } | Command::Register { .. } => Guard::RedirectIfAuthenticated,
            Command::Logout | Command::Whoami | Command::Lang { .. } => Guard::Public,
            Command::History(_) => Guard::Protected {
                require_admin: true,
            },
            _ => Guard::Protected {
                require_admin: false,
            },
        }
    }

    /// Tool, input files and form values for the ten tool commands
    pub fn tool_request(&self) -> Option<(Vec<PathBuf>, ToolForm)> {
        let request = match self {
            Command::Merge {
                first,
                second,
                output_name,
            } => (
                vec![first.clone(), second.clone()],
                ToolForm::Merge(MergeForm {
                    output_name: output_name.clone(),
                }),
            ),
            Command::Split {
                input,
                at,
                first_name,
                second_name,
            } => (
                vec![input.clone()],
                ToolForm::Split(SplitForm {
                    split_at_page: *at,
                    first_output_name: first_name.clone(),
                    second_output_name: second_name.clone(),
                }),
            ),
            Command::RemovePage {
                input,
                page,
                output_name,
            } => (
                vec![input.clone()],
                ToolForm::RemovePage(RemovePageForm {
                    page_to_remove: *page,
                    output_name: output_name.clone(),
                }),
            ),
            Command::ExtractPages {
                input,
                start,
                end,
                output_name,
            } => (
                vec![input.clone()],
                ToolForm::ExtractPages(ExtractPagesForm {
                    start_page: *start,
                    end_page: *end,
                    output_name: output_name.clone(),
                }),
            ),
            Command::ReorderPages {
                input,
                order,
                output_name,
            } => (
                vec![input.clone()],
                ToolForm::ReorderPages(ReorderPagesForm {
                    page_order: order.clone(),
                    output_name: output_name.clone(),
                }),
            ),
            Command::AddPassword {
                input,
                password,
                output_name,
            } => (
                vec![input.clone()],
                ToolForm::AddPassword(PasswordForm {
                    password: password.clone(),
                    output_name: output_name.clone(),
                }),
            ),
            Command::RemovePassword {
                input,
                password,
                output_name,
            } => (
                vec![input.clone()],
                ToolForm::RemovePassword(PasswordForm {
                    password: password.clone(),
                    output_name: output_name.clone(),
                }),
            ),
            Command::ToImages { input, dpi } => (
                vec![input.clone()],
                ToolForm::ToImages(ToImagesForm { dpi: *dpi }),
            ),
            Command::AddWatermark {
                input,
                text,
                opacity,
                font_size,
                color,
                rotation,
                output_name,
            } => (
                vec![input.clone()],
                ToolForm::AddWatermark(WatermarkForm {
                    watermark_text: text.clone(),
                    opacity: *opacity,
                    font_size: *font_size,
                    color: color.clone(),
                    rotation: *rotation,
                    output_name: output_name.clone(),
                }),
            ),
            Command::RotatePages {
                input,
                pages,
                rotations,
                output_name,
            } => (
                vec![input.clone()],
                ToolForm::RotatePages(RotatePagesForm {
                    pages: pages.clone(),
                    rotations: rotations.clone(),
                    output_name: output_name.clone(),
                }),
            ),
            _ => return None,
        };
        Some(request)
    }
}

impl Cli {
    /// Environment configuration with command-line overrides applied
    pub fn config(&self) -> crate::Result<ClientConfig> {
        let mut config = ClientConfig::from_env()?;
        if let Some(ref url) = self.api_url {
            config.base_url = normalize_base_url(url)?;
        }
        if let Some(ref home) = self.home {
            config.state_dir = home.clone();
        }
        if let Some(ref dir) = self.output_dir {
            config.output_dir = dir.clone();
        }
        if let Some(secs) = self.timeout {
            if secs == 0 {
                return Err(Error::InvalidConfig {
                    reason: "--timeout must be greater than zero".to_string(),
                });
            }
            config.timeout = Duration::from_secs(secs);
        }
        Ok(config)
    }
}

/// Application root: owns the session and shares it with every service
pub struct App {
    session: Arc<SessionStore>,
    client: ApiClient,
    sink: Arc<DirectorySink>,
}

impl App {
    pub fn new(config: ClientConfig) -> crate::Result<Self> {
        let storage = FileStore::open(&config.state_dir)?;
        let session = Arc::new(SessionStore::hydrated(Arc::new(storage), config.language));
        let sink = Arc::new(DirectorySink::new(&config.output_dir));
        let client = ApiClient::new(config, session.clone())?;
        Ok(Self {
            session,
            client,
            sink,
        })
    }

    fn language(&self) -> Language {
        self.session.language()
    }

    fn text(&self, message: Message) -> &'static str {
        self.language().text(message)
    }

    /// Localized error for display, logging the full error first
    fn fail(&self, error: Error, failure: Message) -> anyhow::Error {
        tracing::warn!(error = %error, "command failed");
        anyhow!(error.localized_message(self.language(), failure))
    }

    fn check_guard(&self, command: &Command) -> anyhow::Result<()> {
        match command.guard().check(&self.session) {
            GuardOutcome::Render => Ok(()),
            GuardOutcome::Redirect(HOME_PATH) if self.session.is_authenticated() => {
                if matches!(command.guard(), Guard::RedirectIfAuthenticated) {
                    bail!(self.text(Message::AlreadyLoggedIn))
                }
                bail!(self.text(Message::AdminRequired))
            }
            GuardOutcome::Redirect(_) => bail!(self.text(Message::LoginRequired)),
        }
    }

    pub async fn run(&self, command: Command) -> anyhow::Result<()> {
        self.check_guard(&command)?;

        if let Some((paths, form)) = command.tool_request() {
            return self.run_tool(paths, form).await;
        }

        match command {
            Command::Login { email, password } => {
                let auth = AuthService::new(self.client.clone());
                let session = auth
                    .login(&LoginCredentials { email, password })
                    .await
                    .map_err(|e| match e {
                        Error::Validation(_) => {
                            anyhow!(self.text(Message::LoginCredentialsRequired))
                        }
                        Error::HttpStatus { status: 401, .. } => {
                            anyhow!(self.text(Message::LoginInvalid))
                        }
                        other => self.fail(other, Message::LoginFailed),
                    })?;
                println!("{} ({})", session.email, session.role);
            }
            Command::Register {
                first_name,
                last_name,
                email,
                password,
                confirm_password,
            } => {
                let auth = AuthService::new(self.client.clone());
                let form = RegisterForm {
                    first_name,
                    last_name,
                    email,
                    password,
                    confirm_password,
                };
                let session = auth
                    .register(&form)
                    .await
                    .map_err(|e| self.fail(e, Message::RegisterFailed))?;
                println!("{} ({})", session.email, session.role);
            }
            Command::Logout => {
                AuthService::new(self.client.clone())
                    .logout()
                    .await
                    .context("failed to clear the saved session")?;
                println!("{}", self.text(Message::LoggedOut));
            }
            Command::Whoami => match self.session.current() {
                Some(session) => println!("{} ({})", session.email, session.role),
                None => println!("{}", self.text(Message::LoginRequired)),
            },
            Command::Tools => {
                for card in dashboard(self.language()) {
                    println!("{:<16} {:<18} {}", card.kind.command(), card.title, card.description);
                }
            }
            Command::Lang { code } => match code {
                Some(code) => {
                    let language: Language = code.parse().map_err(|e: String| anyhow!(e))?;
                    self.session.set_language(language)?;
                    println!("{}: {}", self.text(Message::Saved), language);
                }
                None => {
                    for language in Language::ALL {
                        let marker = if language == self.language() { "*" } else { " " };
                        println!("{} {}", marker, language);
                    }
                }
            },
            Command::History(command) => self.run_history(command).await?,
            _ => unreachable!("tool commands are handled above"),
        }
        Ok(())
    }

    async fn run_tool(&self, paths: Vec<PathBuf>, form: ToolForm) -> anyhow::Result<()> {
        let kind = form.kind();
        let files = self.select_files(kind, paths).await?;

        let operation = ToolOperation::new(kind, self.client.clone(), self.sink.clone());
        let interrupted = async {
            if tokio::signal::ctrl_c().await.is_err() {
                std::future::pending::<()>().await;
            }
        };

        let saved = operation
            .submit_with_cancel(&files, &form, interrupted)
            .await
            .map_err(|e| {
                anyhow!(operation
                    .last_error()
                    .unwrap_or_else(|| operation.error_message(&e)))
            })?;

        println!("{}", saved.path.display());
        Ok(())
    }

    async fn select_files(
        &self,
        kind: ToolKind,
        paths: Vec<PathBuf>,
    ) -> anyhow::Result<Vec<PdfFile>> {
        if kind.file_count() > 1 {
            let mut uploader = MultiFileUploader::new(kind.file_count());
            for path in &paths {
                uploader
                    .add_path(path)
                    .await
                    .with_context(|| self.text(Message::UploadTwoFiles))?;
            }
            return Ok(uploader.into_files());
        }

        let mut uploader = FileUploader::new();
        for path in &paths {
            uploader
                .select_path(path)
                .await
                .with_context(|| self.text(Message::UploadFirst))?;
        }
        Ok(uploader.take().into_iter().collect())
    }

    async fn run_history(&self, command: HistoryCommand) -> anyhow::Result<()> {
        let service = HistoryService::new(self.client.clone(), self.sink.clone());
        let mut history = AdminHistory::new(service);

        let page = match command {
            HistoryCommand::List { page, size } => history.load(page, size).await,
            HistoryCommand::Search {
                user_id,
                operation,
                from,
                to,
                country,
                source,
                page,
                size,
            } => {
                let filters = HistorySearch {
                    user_id,
                    operation_type: operation,
                    start_date: from,
                    end_date: to,
                    country,
                    source_type: source,
                };
                history.search_at(filters, page, size).await
            }
            HistoryCommand::Delete { id } => history.delete(id).await,
            HistoryCommand::Clear { yes } => {
                if !yes {
                    bail!(self.text(Message::HistoryClearNeedsConfirm));
                }
                history.delete_all().await
            }
            HistoryCommand::Export => {
                let result = history.export().await;
                let saved = result.map_err(|_| anyhow!(history_error(&history)))?;
                println!("{}", saved.path.display());
                return Ok(());
            }
        };

        match page {
            Ok(page) => print_history(page),
            Err(_) => bail!(history_error(&history)),
        }
        Ok(())
    }
}

fn history_error(history: &AdminHistory) -> String {
    history
        .error()
        .map(str::to_string)
        .unwrap_or_else(|| "history request failed".to_string())
}

fn print_history(page: &HistoryPage) {
    for record in &page.items {
        let when = record
            .timestamp_utc()
            .map(|ts| ts.format("%Y-%m-%d %H:%M:%S").to_string())
            .unwrap_or_else(|| record.timestamp.clone());
        println!(
            "{:>6}  {}  {:<24} {:<16} {:<10} {}",
            record.id,
            when,
            record.user_label(),
            record.operation_type,
            record.source_type.as_deref().unwrap_or("-"),
            record.country.as_deref().unwrap_or("-"),
        );
    }
    println!(
        "page {}/{} ({} total)",
        page.page + 1,
        page.pages.max(1),
        page.total
    );
}

/// Parse arguments, build the application root and run the command
pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = cli.config()?;
    tracing::debug!(
        base_url = %config.base_url,
        state_dir = %config.state_dir.display(),
        "configuration loaded"
    );

    let app = App::new(config)?;
    app.run(cli.command).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use pretty_assertions::assert_eq;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("pdf-tools").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_every_tool_has_a_command() {
        let cli = Cli::command();
        for kind in ToolKind::ALL {
            assert!(
                cli.find_subcommand(kind.command()).is_some(),
                "missing command for {}",
                kind
            );
        }
    }

    #[test]
    fn test_rotate_parses_lists() {
        let cli = parse(&[
            "rotate-pages",
            "in.pdf",
            "--pages",
            "1,2,3",
            "--rotations",
            "-90",
        ]);
        let (paths, form) = cli.command.tool_request().unwrap();
        assert_eq!(paths, vec![PathBuf::from("in.pdf")]);
        assert_eq!(
            form,
            ToolForm::RotatePages(RotatePagesForm {
                pages: vec![1, 2, 3],
                rotations: vec![-90],
                output_name: None,
            })
        );
    }

    #[test]
    fn test_merge_takes_two_paths() {
        let cli = parse(&["merge", "a.pdf", "b.pdf", "--output-name", "ab.pdf"]);
        let (paths, form) = cli.command.tool_request().unwrap();
        assert_eq!(paths.len(), 2);
        assert_eq!(form.kind(), ToolKind::Merge);
    }

    #[test]
    fn test_guards_per_command() {
        assert_eq!(
            parse(&["login", "--email", "a@b.c", "--password", "x"]).command.guard(),
            Guard::RedirectIfAuthenticated
        );
        assert_eq!(
            parse(&["history", "list"]).command.guard(),
            Guard::Protected {
                require_admin: true
            }
        );
        assert_eq!(
            parse(&["to-images", "x.pdf"]).command.guard(),
            Guard::Protected {
                require_admin: false
            }
        );
        assert_eq!(parse(&["whoami"]).command.guard(), Guard::Public);
    }

    #[test]
    fn test_to_images_default_dpi() {
        let cli = parse(&["to-images", "x.pdf"]);
        let (_, form) = cli.command.tool_request().unwrap();
        assert_eq!(form, ToolForm::ToImages(ToImagesForm { dpi: 150 }));
    }

    #[test]
    fn test_non_tool_commands_have_no_request() {
        assert!(parse(&["tools"]).command.tool_request().is_none());
        assert!(parse(&["history", "export"]).command.tool_request().is_none());
    }

    #[test]
    fn test_config_overrides() {
        let cli = parse(&[
            "--api-url",
            "https://pdf.example.com/",
            "--timeout",
            "5",
            "tools",
        ]);
        let config = cli.config().unwrap();
        assert_eq!(config.base_url.as_str(), "https://pdf.example.com/api");
        assert_eq!(config.timeout, Duration::from_secs(5));

        let cli = parse(&["--timeout", "0", "tools"]);
        assert!(cli.config().is_err());
    }

    #[tokio::test]
    async fn test_guard_blocks_anonymous_tool_use() {
        let dir = tempfile::TempDir::new().unwrap();
        let config = ClientConfig {
            state_dir: dir.path().to_path_buf(),
            output_dir: dir.path().to_path_buf(),
            ..ClientConfig::default()
        };
        let app = App::new(config).unwrap();

        let err = app
            .run(parse(&["to-images", "x.pdf"]).command)
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Please log in first");

        let err = app
            .run(parse(&["history", "list"]).command)
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Please log in first");
    }

    #[tokio::test]
    async fn test_history_clear_requires_confirmation() {
        let dir = tempfile::TempDir::new().unwrap();
        let config = ClientConfig {
            state_dir: dir.path().to_path_buf(),
            output_dir: dir.path().to_path_buf(),
            ..ClientConfig::default()
        };
        let app = App::new(config).unwrap();
        app.session
            .login(
                crate::session::AuthTokens {
                    access_token: "t".into(),
                    refresh_token: "r".into(),
                },
                "admin@example.com",
                crate::session::Role::Admin,
            )
            .unwrap();

        let err = app
            .run(parse(&["history", "clear"]).command)
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Deleting all history requires --yes");

        app.session.set_language(Language::Sk).unwrap();
        let err = app
            .run(parse(&["history", "clear"]).command)
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Vymazanie celej histórie vyžaduje --yes");
    }
}
