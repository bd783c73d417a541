use crate::args::QuoteArgs;
use crate::commands::Out;
use crate::document;
use crate::error::{ErrorType, IntoResult};
use crate::model::{Amount, PricedLine, QuotationInput};
use crate::{utils, Config, Result};
use serde::Serialize;
use std::path::PathBuf;
use tracing::debug;

/// What `quote` produced.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteOutput {
    /// Where the HTML document was written.
    pub path: PathBuf,
    pub priced: PricedLine,
}

/// Renders the quotation in `args.input()` to an HTML document.
///
/// The logo, signature and branch label come from the arguments when given, otherwise from the
/// configuration. The document is written to `args.output()` or, by default, to
/// `$FIELDSALES_HOME/quotations/<quotation no>.html`.
///
/// # Errors
/// - Returns an error if the input cannot be read or parsed, or the document cannot be written.
pub async fn quote(config: Config, args: QuoteArgs) -> Result<Out<QuoteOutput>> {
    let input: QuotationInput = utils::deserialize(args.input())
        .await
        .pub_result(ErrorType::Io)?;

    let logo = match args.logo() {
        Some(logo) => logo.to_string(),
        None => config.logo_ref().pub_result(ErrorType::Config)?,
    };
    let signature = match args.signature() {
        Some(signature) => signature.to_string(),
        None => config.signature_ref().pub_result(ErrorType::Config)?,
    };
    let branch = args.branch().unwrap_or(config.branch_label());

    let (priced, html) = document::assemble_priced(&input, &logo, &signature, branch);

    let path = match args.output() {
        Some(path) => path.to_path_buf(),
        None => config
            .quotations()
            .join(format!("{}.html", utils::file_stem(&input.quotation_no))),
    };
    debug!("Writing quotation to {}", path.display());
    utils::write(&path, html).await.pub_result(ErrorType::Io)?;

    let message = format!(
        "Wrote quotation {} for a grand total of {} to {}",
        input.quotation_no,
        Amount::new(priced.rounded_total),
        path.display()
    );
    Ok(Out::new(message, QuoteOutput { path, priced }))
}
