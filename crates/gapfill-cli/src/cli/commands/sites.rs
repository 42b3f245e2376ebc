//! `gapfill sites` – list, add, edit and remove sites.

use anyhow::Result;
use gapfill_core::config::GapfillConfig;
use gapfill_core::site::SiteRecord;

use super::open_registry;
use crate::cli::{SiteFields, SitesCommand};

impl SiteFields {
    /// Overwrite the fields that were given on the command line.
    pub(crate) fn apply(self, rec: &mut SiteRecord) {
        if let Some(v) = self.host {
            rec.host = v;
        }
        if let Some(v) = self.protocol {
            rec.protocol = v;
        }
        if let Some(v) = self.port {
            rec.port = Some(v);
        }
        if let Some(v) = self.user {
            rec.user = v;
        }
        if let Some(v) = self.password {
            rec.password = v;
        }
        if let Some(v) = self.path {
            rec.path = v;
        }
        if let Some(v) = self.pattern {
            rec.pattern = v;
        }
        if let Some(v) = self.frequency {
            rec.frequency = v;
        }
        if let Some(v) = self.network {
            rec.network = v;
        }
        if let Some(v) = self.rate {
            rec.rate = v;
        }
        if let Some(v) = self.external_clock {
            rec.external_clock = v;
        }
        if let Some(v) = self.letter_hour {
            rec.use_letter_hour = v;
        }
        if let Some(v) = self.output_dir {
            rec.output_dir = Some(v);
        }
        if let Some(v) = self.station {
            rec.station_code = v;
        }
        if let Some(v) = self.format {
            rec.format = v;
        }
    }
}

pub fn run_sites(cfg: &GapfillConfig, action: SitesCommand) -> Result<()> {
    let mut registry = open_registry(cfg)?;
    match action {
        SitesCommand::List => {
            if registry.sites().is_empty() {
                println!("No sites in {}.", registry.path().display());
                return Ok(());
            }
            println!(
                "{:<16} {:<5} {:<28} {:<7} {:<8} {:<12} {}",
                "NAME", "PROTO", "HOST", "FREQ", "NETWORK", "RATE", "PATTERN"
            );
            for s in registry.sites() {
                println!(
                    "{:<16} {:<5} {:<28} {:<7} {:<8} {:<12} {}",
                    s.name,
                    s.protocol,
                    format!("{}:{}", s.host, s.port),
                    s.frequency,
                    s.network,
                    s.rate_label(),
                    s.pattern
                );
            }
        }
        SitesCommand::Add { name, fields } => {
            let mut rec = SiteRecord::new(&name, "", "ftp");
            fields.apply(&mut rec);
            let site = registry.add(rec)?;
            println!("Added site {} ({}://{}:{})", site.name, site.protocol, site.host, site.port);
        }
        SitesCommand::Edit {
            name,
            rename,
            fields,
        } => {
            let mut rec = registry
                .get(&name)
                .map(|s| s.to_record())
                .ok_or_else(|| anyhow::anyhow!("site {:?} not found", name))?;
            if let Some(new_name) = rename {
                rec.name = new_name;
            }
            // Stored ports are resolved; a protocol switch re-defaults them.
            if fields.protocol.is_some() && fields.port.is_none() {
                rec.port = None;
            }
            fields.apply(&mut rec);
            let site = registry.edit(&name, rec)?;
            println!("Updated site {}", site.name);
        }
        SitesCommand::Remove { name } => {
            let site = registry.delete(&name)?;
            println!(
                "Removed site {} (files in {} kept)",
                site.name,
                site.output_dir.display()
            );
        }
    }
    Ok(())
}
