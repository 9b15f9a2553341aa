//! `image-content types` command - show several content types at once.

use clap::Args;
use image_content::{ContentGetter, ContentServices, ALL_CONTENT_TYPES};

use crate::output::{content_types_body, print_json};

#[derive(Args)]
pub struct TypesArgs {
    /// Image digest (e.g. "sha256:...")
    pub image_digest: String,

    /// Account that owns the image
    #[arg(long)]
    pub account: String,

    /// Content type to include (repeatable; "all" selects every type)
    #[arg(long = "type", default_value = ALL_CONTENT_TYPES)]
    pub content_types: Vec<String>,

    /// Serve content of images whose analysis is still running
    #[arg(long)]
    pub allow_analyzing: bool,
}

pub fn execute(
    args: TypesArgs,
    services: &ContentServices,
) -> Result<(), Box<dyn std::error::Error>> {
    let content = ContentGetter::multi(
        services.clone(),
        args.account.as_str(),
        args.image_digest.as_str(),
        &args.content_types,
    )
    .get(args.allow_analyzing)?;

    tracing::debug!(types = content.len(), "Fetched image content types");
    print_json(&content_types_body(&args.image_digest, &content))
}
