//! CLI command definitions and dispatch.

mod get;
mod supported_types;
mod types;

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use image_content::ContentServices;
use image_content_core::ContentConfig;

/// Image content: query analyzed image content from the local catalog.
#[derive(Parser)]
#[command(name = "image-content", version, about)]
pub struct Cli {
    /// Configuration file (YAML)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(Subcommand)]
pub enum Command {
    /// Show one content type (package type, manifest or dockerfile) of an image
    Get(get::GetArgs),
    /// Show the image manifest
    Manifest(get::ImageArgs),
    /// Show the image Dockerfile, migrating legacy storage on first read
    Dockerfile(get::ImageArgs),
    /// Show several package content types of an image at once
    Types(types::TypesArgs),
    /// List the content types the catalog serves
    SupportedTypes(supported_types::SupportedTypesArgs),
}

/// Load configuration from `path`, or the defaults when none is given.
pub fn load_config(path: Option<&Path>) -> image_content_core::Result<ContentConfig> {
    match path {
        Some(path) => ContentConfig::load(path),
        None => Ok(ContentConfig::default()),
    }
}

/// Dispatch a parsed CLI to the appropriate command handler.
pub fn dispatch(cli: Cli, config: &ContentConfig) -> Result<(), Box<dyn std::error::Error>> {
    let services = ContentServices::from_config(config);
    match cli.command {
        Command::Get(args) => get::execute(args, &services),
        Command::Manifest(args) => get::execute_manifest(args, &services),
        Command::Dockerfile(args) => get::execute_dockerfile(args, &services),
        Command::Types(args) => types::execute(args, &services),
        Command::SupportedTypes(args) => supported_types::execute(args, &services),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_get() {
        let cli = Cli::try_parse_from([
            "image-content",
            "get",
            "sha256:abc",
            "--account",
            "admin",
            "--type",
            "os",
            "--allow-analyzing",
        ])
        .unwrap();
        let Command::Get(args) = cli.command else {
            panic!("expected get");
        };
        assert_eq!(args.image.image_digest, "sha256:abc");
        assert_eq!(args.content_type, "os");
        assert!(args.image.allow_analyzing);
    }

    #[test]
    fn test_parse_dockerfile() {
        let cli = Cli::try_parse_from([
            "image-content",
            "--config",
            "/etc/image-content.yaml",
            "dockerfile",
            "sha256:abc",
            "--account",
            "admin",
        ])
        .unwrap();
        assert_eq!(
            cli.config.as_deref(),
            Some(Path::new("/etc/image-content.yaml"))
        );
        let Command::Dockerfile(args) = cli.command else {
            panic!("expected dockerfile");
        };
        assert_eq!(args.account, "admin");
        assert!(!args.allow_analyzing);
    }

    #[test]
    fn test_parse_types_repeated() {
        let cli = Cli::try_parse_from([
            "image-content",
            "types",
            "sha256:abc",
            "--account",
            "admin",
            "--type",
            "os",
            "--type",
            "java",
        ])
        .unwrap();
        let Command::Types(args) = cli.command else {
            panic!("expected types");
        };
        assert_eq!(args.content_types, vec!["os", "java"]);
    }

    #[test]
    fn test_types_defaults_to_all() {
        let cli =
            Cli::try_parse_from(["image-content", "types", "sha256:abc", "--account", "admin"])
                .unwrap();
        let Command::Types(args) = cli.command else {
            panic!("expected types");
        };
        assert_eq!(args.content_types, vec!["all"]);
    }

    #[test]
    fn test_load_config_default_and_file() {
        assert!(load_config(None).is_ok());

        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("config.yaml");
        std::fs::write(&path, "log_level: info\n").unwrap();
        let config = load_config(Some(&path)).unwrap();
        assert_eq!(config.log_level, image_content_core::LogLevel::Info);
    }

    #[test]
    fn test_dispatch_reports_missing_image() {
        let tmp = tempfile::tempdir().unwrap();
        let config =
            ContentConfig::from_yaml_str(&format!("data_dir: {}\n", tmp.path().display()))
                .unwrap();
        let cli = Cli::try_parse_from([
            "image-content",
            "get",
            "sha256:missing",
            "--account",
            "admin",
            "--type",
            "os",
        ])
        .unwrap();
        let err = dispatch(cli, &config).unwrap_err();
        let content_error = err
            .downcast_ref::<image_content_core::ContentError>()
            .unwrap();
        assert_eq!(content_error.http_status(), 404);
    }

    #[test]
    fn test_get_content_type_is_case_sensitive() {
        use image_content::{FileObjectStore, FileRecordStore, ObjectStore};
        use image_content_core::document::encode_envelope;
        use image_content_core::{AnalysisStatus, ImageRecord};

        let tmp = tempfile::tempdir().unwrap();
        let config =
            ContentConfig::from_yaml_str(&format!("data_dir: {}\n", tmp.path().display()))
                .unwrap();
        FileRecordStore::new(config.records_path())
            .upsert(ImageRecord::new("admin", "sha256:abc", AnalysisStatus::Analyzed))
            .unwrap();
        FileObjectStore::new(config.objects_path())
            .put(
                "admin",
                &config.content_category,
                "sha256:abc",
                &encode_envelope(&serde_json::json!({"os": {}})).unwrap(),
            )
            .unwrap();

        let parse = |content_type: &str| {
            Cli::try_parse_from([
                "image-content",
                "get",
                "sha256:abc",
                "--account",
                "admin",
                "--type",
                content_type,
            ])
            .unwrap()
        };

        dispatch(parse("os"), &config).unwrap();

        let err = dispatch(parse("OS"), &config).unwrap_err();
        let content_error = err
            .downcast_ref::<image_content_core::ContentError>()
            .unwrap();
        assert_eq!(content_error.http_status(), 400);
        assert_eq!(
            content_error.detail().unwrap().content_type.as_deref(),
            Some("OS")
        );
    }
}
