//! `image-content supported-types` command - list served content types.

use clap::Args;
use image_content::ContentServices;
use serde_json::json;

use crate::output::print_json;

#[derive(Args)]
pub struct SupportedTypesArgs {
    /// Print names only, one per line
    #[arg(short, long)]
    pub quiet: bool,
}

pub fn execute(
    args: SupportedTypesArgs,
    services: &ContentServices,
) -> Result<(), Box<dyn std::error::Error>> {
    let registry = services.registry();

    if args.quiet {
        for name in registry.content_types().chain(registry.metadata_types()) {
            println!("{name}");
        }
        return Ok(());
    }

    let content: Vec<&str> = registry.content_types().collect();
    let metadata: Vec<&str> = registry.metadata_types().collect();
    print_json(&json!({
        "content_types": content,
        "metadata_types": metadata,
    }))
}
