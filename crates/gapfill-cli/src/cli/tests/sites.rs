//! Tests for the sites subcommands.

use super::parse;
use crate::cli::{CliCommand, SiteFields, SitesCommand};
use gapfill_core::site::SiteRecord;

fn sites(args: &[&str]) -> SitesCommand {
    let mut full = vec!["gapfill", "sites"];
    full.extend_from_slice(args);
    match parse(&full) {
        CliCommand::Sites { action } => action,
        _ => panic!("expected Sites"),
    }
}

#[test]
fn cli_parse_sites_list() {
    assert!(matches!(sites(&["list"]), SitesCommand::List));
}

#[test]
fn cli_parse_sites_add() {
    match sites(&[
        "add",
        "AUTH",
        "--host",
        "gnss.example.org",
        "--protocol",
        "sftp",
        "--pattern",
        "AUTH%j%H.%yo",
        "--frequency",
        "hourly",
        "--letter-hour",
        "true",
    ]) {
        SitesCommand::Add { name, fields } => {
            assert_eq!(name, "AUTH");
            assert_eq!(fields.host.as_deref(), Some("gnss.example.org"));
            assert_eq!(fields.protocol.as_deref(), Some("sftp"));
            assert_eq!(fields.letter_hour, Some(true));
            assert!(fields.port.is_none());
        }
        _ => panic!("expected Add"),
    }
}

#[test]
fn cli_parse_sites_edit_rename() {
    match sites(&["edit", "old", "--rename", "new", "--port", "2121"]) {
        SitesCommand::Edit {
            name,
            rename,
            fields,
        } => {
            assert_eq!(name, "old");
            assert_eq!(rename.as_deref(), Some("new"));
            assert_eq!(fields.port, Some(2121));
        }
        _ => panic!("expected Edit"),
    }
}

#[test]
fn cli_parse_sites_remove() {
    match sites(&["remove", "AUTH"]) {
        SitesCommand::Remove { name } => assert_eq!(name, "AUTH"),
        _ => panic!("expected Remove"),
    }
}

#[test]
fn site_fields_only_overwrite_given_values() {
    let mut rec = SiteRecord::new("AUTH", "a.example.org", "ftp");
    rec.pattern = "AUTH%Y%m%d.dat".to_string();
    let fields = SiteFields {
        host: Some("b.example.org".to_string()),
        external_clock: Some(true),
        ..SiteFields::default()
    };
    fields.apply(&mut rec);
    assert_eq!(rec.host, "b.example.org");
    assert!(rec.external_clock);
    assert_eq!(rec.pattern, "AUTH%Y%m%d.dat");
    assert_eq!(rec.protocol, "ftp");
}

#[test]
fn sites_add_edit_remove_persist_to_file() {
    use crate::cli::commands::run_sites;
    use gapfill_core::config::GapfillConfig;
    use gapfill_core::site::SiteRegistry;

    let dir = tempfile::tempdir().unwrap();
    let cfg = GapfillConfig {
        sites_file: Some(dir.path().join("sites.json")),
        output_root: dir.path().join("downloads"),
        ..GapfillConfig::default()
    };
    let fields = SiteFields {
        host: Some("gnss.example.org".to_string()),
        pattern: Some("AUTH%Y%m%d.dat".to_string()),
        ..SiteFields::default()
    };
    run_sites(&cfg, SitesCommand::Add { name: "AUTH".to_string(), fields }).unwrap();
    // Duplicate names are refused.
    let dup = SiteFields {
        host: Some("other".to_string()),
        ..SiteFields::default()
    };
    assert!(run_sites(&cfg, SitesCommand::Add { name: "AUTH".to_string(), fields: dup }).is_err());

    run_sites(
        &cfg,
        SitesCommand::Edit {
            name: "AUTH".to_string(),
            rename: Some("AUTH2".to_string()),
            fields: SiteFields {
                protocol: Some("sftp".to_string()),
                ..SiteFields::default()
            },
        },
    )
    .unwrap();

    let registry = SiteRegistry::load(&dir.path().join("sites.json"), &cfg.output_root).unwrap();
    let site = registry.get("AUTH2").expect("renamed site");
    assert_eq!(site.port, 22, "protocol switch re-defaults the port");
    assert_eq!(site.pattern, "AUTH%Y%m%d.dat");
    assert!(registry.get("AUTH").is_none());

    run_sites(&cfg, SitesCommand::Remove { name: "AUTH2".to_string() }).unwrap();
    let registry = SiteRegistry::load(&dir.path().join("sites.json"), &cfg.output_root).unwrap();
    assert!(registry.sites().is_empty());
}
