//! These structs provide the CLI interface for the fieldsales CLI.

use clap::{Parser, Subcommand};
use std::convert::Infallible;
use std::fmt::{Display, Formatter};
use std::ops::Deref;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::error;
use tracing_subscriber::filter::LevelFilter;

/// fieldsales: quotations and field-visit reports for field sales engineers.
///
/// Price a quotation line (with 18% GST and round off), render the quotation as a printable HTML
/// document, and validate and submit field-visit survey forms with their photos to your
/// organisation's field-visit service.
///
/// Run `fieldsales init` first to create the home directory and configuration.
#[derive(Debug, Parser, Clone)]
#[command(version)]
pub struct Args {
    #[clap(flatten)]
    common: Common,

    #[command(subcommand)]
    command: Command,
}

impl Args {
    pub fn new(common: Common, command: Command) -> Self {
        Self { common, command }
    }

    pub fn common(&self) -> &Common {
        &self.common
    }

    pub fn command(&self) -> &Command {
        &self.command
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Create the home directory and initialize the configuration file.
    ///
    /// The home directory holds `config.json`, a `quotations` directory where rendered documents
    /// are written, an `assets` directory for `logo.png` and `signature.png`, and a `.secrets`
    /// directory for the service token.
    Init(InitArgs),
    /// Render a quotation JSON file as a printable HTML document.
    Quote(QuoteArgs),
    /// Price a single line: discount, GST, round off and grand total.
    Price(PriceArgs),
    /// Spell out a number in words using lakh and crore.
    Words(WordsArgs),
    /// Check or submit a field-visit form.
    Visit(VisitArgs),
}

/// Arguments common to all subcommands.
#[derive(Debug, Parser, Clone)]
pub struct Common {
    /// The logging verbosity. One of, from least to most verbose:
    /// off, error, warn, info, debug, trace
    ///
    /// This can be overridden by RUST_LOG.
    #[arg(long, default_value_t = LevelFilter::INFO)]
    log_level: LevelFilter,

    /// The directory where fieldsales configuration and documents are held. Defaults to
    /// ~/fieldsales
    #[arg(long, env = "FIELDSALES_HOME", default_value_t = default_home())]
    home: DisplayPath,
}

impl Common {
    pub fn new(log_level: LevelFilter, home: PathBuf) -> Self {
        Self {
            log_level,
            home: home.into(),
        }
    }

    pub fn log_level(&self) -> LevelFilter {
        self.log_level
    }

    pub fn home(&self) -> &DisplayPath {
        &self.home
    }
}

/// Args for the `fieldsales init` command.
#[derive(Debug, Parser, Clone)]
pub struct InitArgs {
    /// The base URL of the field-visit service, e.g. https://visits.example.com/api. Can be left
    /// out if you only make quotations.
    #[arg(long, default_value = "")]
    service_url: String,

    /// The branch printed on quotations. Defaults to "Head Office".
    #[arg(long)]
    branch: Option<String>,

    /// A bearer token for the field-visit service. It is stored in .secrets/token.json.
    #[arg(long)]
    token: Option<String>,
}

impl InitArgs {
    pub fn new(
        service_url: impl Into<String>,
        branch: Option<String>,
        token: Option<String>,
    ) -> Self {
        Self {
            service_url: service_url.into(),
            branch,
            token,
        }
    }

    pub fn service_url(&self) -> &str {
        &self.service_url
    }

    pub fn branch(&self) -> Option<&str> {
        self.branch.as_deref()
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }
}

/// Args for the `fieldsales quote` command.
#[derive(Debug, Parser, Clone)]
pub struct QuoteArgs {
    /// A JSON file holding the quotation fields, e.g. {"quotationNo": "QT-1", "rate": "1000"}.
    /// Missing fields are left blank.
    #[arg(long)]
    input: PathBuf,

    /// Where to write the HTML. Defaults to $FIELDSALES_HOME/quotations/<quotation no>.html
    #[arg(long)]
    output: Option<PathBuf>,

    /// The logo image URI. Defaults to the configured logo.
    #[arg(long)]
    logo: Option<String>,

    /// The signature image URI. Defaults to the configured signature.
    #[arg(long)]
    signature: Option<String>,

    /// The branch label. Defaults to the configured branch.
    #[arg(long)]
    branch: Option<String>,
}

impl QuoteArgs {
    pub fn new(input: impl Into<PathBuf>, output: Option<PathBuf>) -> Self {
        Self {
            input: input.into(),
            output,
            logo: None,
            signature: None,
            branch: None,
        }
    }

    pub fn input(&self) -> &Path {
        &self.input
    }

    pub fn output(&self) -> Option<&Path> {
        self.output.as_deref()
    }

    pub fn logo(&self) -> Option<&str> {
        self.logo.as_deref()
    }

    pub fn signature(&self) -> Option<&str> {
        self.signature.as_deref()
    }

    pub fn branch(&self) -> Option<&str> {
        self.branch.as_deref()
    }
}

/// Args for the `fieldsales price` command.
#[derive(Debug, Parser, Clone)]
pub struct PriceArgs {
    /// The rate per unit. Text that is not a number counts as zero.
    #[arg(long)]
    rate: String,

    /// The quantity.
    #[arg(long, default_value = "1")]
    qty: String,

    /// The discount in percent.
    #[arg(long, default_value = "0")]
    discount: String,
}

impl PriceArgs {
    pub fn new(rate: impl Into<String>, qty: impl Into<String>, discount: impl Into<String>) -> Self {
        Self {
            rate: rate.into(),
            qty: qty.into(),
            discount: discount.into(),
        }
    }

    pub fn rate(&self) -> &str {
        &self.rate
    }

    pub fn qty(&self) -> &str {
        &self.qty
    }

    pub fn discount(&self) -> &str {
        &self.discount
    }
}

/// Args for the `fieldsales words` command.
#[derive(Debug, Parser, Clone)]
pub struct WordsArgs {
    /// A whole, non-negative number.
    number: u64,
}

impl WordsArgs {
    pub fn new(number: u64) -> Self {
        Self { number }
    }

    pub fn number(&self) -> u64 {
        self.number
    }
}

/// Args for the `fieldsales visit` command.
#[derive(Debug, Parser, Clone)]
pub struct VisitArgs {
    #[command(subcommand)]
    action: VisitSubcommand,
}

impl VisitArgs {
    pub fn action(&self) -> &VisitSubcommand {
        &self.action
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum VisitSubcommand {
    /// Walk the form through the wizard steps and report the first missing required field.
    Check(VisitCheckArgs),
    /// Validate the form and submit it, with photos, to the field-visit service.
    Submit(VisitSubmitArgs),
}

/// Args for the `fieldsales visit check` command.
#[derive(Debug, Parser, Clone)]
pub struct VisitCheckArgs {
    /// A JSON file holding the form fields, keyed by their camelCase names, e.g.
    /// {"clientCompanyName": "...", "mobileNumber": "..."}.
    #[arg(long)]
    form: PathBuf,
}

impl VisitCheckArgs {
    pub fn new(form: impl Into<PathBuf>) -> Self {
        Self { form: form.into() }
    }

    pub fn form(&self) -> &Path {
        &self.form
    }
}

/// Args for the `fieldsales visit submit` command.
#[derive(Debug, Parser, Clone)]
pub struct VisitSubmitArgs {
    /// A JSON file holding the form fields, keyed by their camelCase names.
    #[arg(long)]
    form: PathBuf,

    /// A photo to attach, as a path or file:// URI. Repeat for more photos; at most 8 are
    /// attached and the rest are ignored.
    #[arg(long = "photo")]
    photos: Vec<String>,
}

impl VisitSubmitArgs {
    pub fn new(form: impl Into<PathBuf>, photos: Vec<String>) -> Self {
        Self {
            form: form.into(),
            photos,
        }
    }

    pub fn form(&self) -> &Path {
        &self.form
    }

    pub fn photos(&self) -> &[String] {
        &self.photos
    }
}

fn default_home() -> DisplayPath {
    DisplayPath(match dirs::home_dir() {
        Some(home) => home.join("fieldsales"),
        None => {
            error!(
                "There was an error when trying to get your home directory. You can get around \
                this by providing --home or FIELDSALES_HOME instead of relying on the default \
                directory. If you continue using the program right now, you may have problems!",
            );
            PathBuf::from("fieldsales")
        }
    })
}

#[derive(Debug, Default, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct DisplayPath(PathBuf);

impl From<PathBuf> for DisplayPath {
    fn from(value: PathBuf) -> Self {
        DisplayPath(value)
    }
}

impl Deref for DisplayPath {
    type Target = Path;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl AsRef<Path> for DisplayPath {
    fn as_ref(&self) -> &Path {
        &self.0
    }
}

impl Display for DisplayPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.to_string_lossy())
    }
}

impl FromStr for DisplayPath {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(PathBuf::from(s)))
    }
}

impl DisplayPath {
    pub fn new(path: PathBuf) -> Self {
        Self(path)
    }

    pub fn path(&self) -> &Path {
        &self.0
    }
}
