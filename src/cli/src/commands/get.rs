//! `image-content get`, `manifest` and `dockerfile` commands - show one
//! content type of an image.

use clap::Args;
use image_content::{get_image_content, ContentGetter, ContentServices, NormalizedContent};

use crate::output::{content_body, print_json};

/// Arguments identifying one image.
#[derive(Args)]
pub struct ImageArgs {
    /// Image digest (e.g. "sha256:...")
    pub image_digest: String,

    /// Account that owns the image
    #[arg(long)]
    pub account: String,

    /// Serve content of images whose analysis is still running
    #[arg(long)]
    pub allow_analyzing: bool,
}

#[derive(Args)]
pub struct GetArgs {
    #[command(flatten)]
    pub image: ImageArgs,

    /// Content type: a package type, "manifest" or "dockerfile"
    #[arg(long = "type")]
    pub content_type: String,
}

pub fn execute(args: GetArgs, services: &ContentServices) -> Result<(), Box<dyn std::error::Error>> {
    let content_type = args.content_type;
    let image = args.image;
    tracing::debug!(
        account = %image.account,
        image_digest = %image.image_digest,
        content_type = %content_type,
        "Fetching image content"
    );

    let content = get_image_content(
        services,
        &image.account,
        &image.image_digest,
        &content_type,
        image.allow_analyzing,
    )?;
    render(&image, &content_type, &content)
}

pub fn execute_manifest(
    args: ImageArgs,
    services: &ContentServices,
) -> Result<(), Box<dyn std::error::Error>> {
    let content = ContentGetter::manifest(
        services.clone(),
        args.account.as_str(),
        args.image_digest.as_str(),
    )
    .get(args.allow_analyzing)?;
    render(&args, "manifest", &content)
}

pub fn execute_dockerfile(
    args: ImageArgs,
    services: &ContentServices,
) -> Result<(), Box<dyn std::error::Error>> {
    let content = ContentGetter::dockerfile(
        services.clone(),
        args.account.as_str(),
        args.image_digest.as_str(),
    )
    .get(args.allow_analyzing)?;
    render(&args, "dockerfile", &content)
}

fn render(
    image: &ImageArgs,
    content_type: &str,
    content: &NormalizedContent,
) -> Result<(), Box<dyn std::error::Error>> {
    print_json(&content_body(&image.image_digest, content_type, content))
}
