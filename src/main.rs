use anyhow::{Context, Result, bail};
use clap::Parser;
use std::path::PathBuf;

use etdep::application::{ChangeVersionPreview, InstallPlanner};
use etdep::compat::CompatibilityChecker;
use etdep::diff;
use etdep::package::{Catalog, PackageRef, PackageRepository, PackageVersion};
use etdep::resolver::Resolver;

/// etdep - Etendo package dependency manager
///
/// Resolve, check and diff module dependencies against a JSON catalog of the
/// tracked package universe.
///
/// Examples:
///   etdep --catalog catalog.json resolve com.etendoerp:warehouse 1.2.0
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to the package catalog JSON file (also via ETDEP_CATALOG)
    #[arg(
        long = "catalog",
        short = 'c',
        env = "ETDEP_CATALOG",
        value_name = "FILE",
        global = true
    )]
    pub catalog: Option<PathBuf>,

    /// Override the catalog's installed core version
    #[arg(long = "core-version", value_name = "VERSION", global = true)]
    pub core_version: Option<String>,

    /// Emit JSON instead of plain text
    #[arg(long = "json", global = true)]
    pub json: bool,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Resolve the full dependency set of a package version
    Resolve(VersionArgs),

    /// Check a package version against the installed core
    Check(VersionArgs),

    /// Diff the dependencies of two versions of a package
    Diff(DiffArgs),

    /// Show the latest core-compatible version of a package
    Latest(PackageArgs),

    /// Show the install plan for a package version (dry run)
    Install(VersionArgs),

    /// Preview switching a package to another version (dry run)
    Change(DiffArgs),
}

#[derive(clap::Args, Debug)]
pub struct PackageArgs {
    /// The package in the format "group:artifact"
    #[arg(value_name = "GROUP:ARTIFACT")]
    pub package: String,
}

#[derive(clap::Args, Debug)]
pub struct VersionArgs {
    /// The package in the format "group:artifact"
    #[arg(value_name = "GROUP:ARTIFACT")]
    pub package: String,

    /// The package version
    #[arg(value_name = "VERSION")]
    pub version: String,
}

#[derive(clap::Args, Debug)]
pub struct DiffArgs {
    /// The package in the format "group:artifact"
    #[arg(value_name = "GROUP:ARTIFACT")]
    pub package: String,

    /// The version to diff from
    #[arg(value_name = "FROM")]
    pub from: String,

    /// The version to diff to
    #[arg(value_name = "TO")]
    pub to: String,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();

    let Some(path) = &cli.catalog else {
        bail!("No catalog given. Pass --catalog or set ETDEP_CATALOG.");
    };
    let mut catalog = Catalog::load(path)?;
    if let Some(core_version) = cli.core_version.clone() {
        catalog.set_core_version(core_version);
    }

    match &cli.command {
        Commands::Resolve(args) => resolve(&cli, &catalog, args),
        Commands::Check(args) => check(&cli, &catalog, args),
        Commands::Diff(args) => diff_versions(&cli, &catalog, args),
        Commands::Latest(args) => latest(&cli, &catalog, args),
        Commands::Install(args) => install(&cli, &catalog, args),
        Commands::Change(args) => change(&cli, &catalog, args),
    }
}

fn lookup(catalog: &Catalog, package: &PackageRef, version: &str) -> Result<PackageVersion> {
    catalog
        .version(&package.group, &package.artifact, version)
        .with_context(|| format!("Package version not found: {}@{}", package, version))
}

fn resolve(cli: &Cli, catalog: &Catalog, args: &VersionArgs) -> Result<()> {
    let package: PackageRef = args.package.parse()?;
    let package_version = lookup(catalog, &package, &args.version)?;

    let dependencies = Resolver::new(catalog).resolve(&package_version)?;
    if cli.json {
        println!("{}", serde_json::to_string_pretty(&dependencies)?);
    } else {
        for dependency in &dependencies {
            println!("{}", dependency);
        }
    }
    Ok(())
}

fn check(cli: &Cli, catalog: &Catalog, args: &VersionArgs) -> Result<()> {
    let package: PackageRef = args.package.parse()?;
    let report = CompatibilityChecker::new(catalog, catalog).check_version(
        &package.group,
        &package.artifact,
        &args.version,
    );

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("compatible: {}", report.compatible);
    if let Some(range) = &report.core_range {
        println!("core range: {}", range);
    }
    if let Some(core) = &report.current_core_version {
        println!("installed core: {}", core);
    }
    if let Some(error) = &report.error {
        println!("error: {}", error);
    }
    Ok(())
}

fn diff_versions(cli: &Cli, catalog: &Catalog, args: &DiffArgs) -> Result<()> {
    let package: PackageRef = args.package.parse()?;
    let from = lookup(catalog, &package, &args.from)?;
    let to = lookup(catalog, &package, &args.to)?;

    let entries = diff::diff(&from, &to);
    if cli.json {
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }

    for entry in &entries {
        println!(
            "{:?} {}:{} {} -> {}",
            entry.status,
            entry.group,
            entry.artifact,
            entry.rendered_version_a(),
            entry.rendered_version_b()
        );
    }
    Ok(())
}

fn latest(cli: &Cli, catalog: &Catalog, args: &PackageArgs) -> Result<()> {
    let package: PackageRef = args.package.parse()?;
    let version = CompatibilityChecker::new(catalog, catalog)
        .latest_compatible_or_latest(&package.group, &package.artifact)?;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&version)?);
    } else {
        println!("{}", version);
    }
    Ok(())
}

fn install(cli: &Cli, catalog: &Catalog, args: &VersionArgs) -> Result<()> {
    let package: PackageRef = args.package.parse()?;
    let plan = InstallPlanner::new(catalog, catalog).plan(
        &package.group,
        &package.artifact,
        &args.version,
    )?;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&plan)?);
        return Ok(());
    }

    println!("install {}@{}", plan.package, plan.version);
    println!("compatible with core: {}", plan.compatibility.compatible);
    for record in &plan.records {
        println!(
            "{} {} {}:{}:{}",
            record.format, record.version_status, record.group, record.artifact, record.version
        );
    }
    Ok(())
}

fn change(cli: &Cli, catalog: &Catalog, args: &DiffArgs) -> Result<()> {
    let package: PackageRef = args.package.parse()?;
    let preview = ChangeVersionPreview::new(catalog, catalog).preview(
        &package.group,
        &package.artifact,
        &args.from,
        &args.to,
    )?;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&preview)?);
        return Ok(());
    }

    println!("change {} {} -> {}", package, args.from, args.to);
    if preview.warning {
        println!("warning: target version is not compatible with the installed core");
    }
    for entry in &preview.entries {
        println!(
            "{:?} {}:{} {} -> {}",
            entry.status,
            entry.group,
            entry.artifact,
            entry.rendered_version_a(),
            entry.rendered_version_b()
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_cli_resolve_parsing() {
        let cli = Cli::try_parse_from([
            "etdep",
            "--catalog",
            "catalog.json",
            "resolve",
            "com.acme:foo",
            "1.0.0",
        ])
        .unwrap();
        match cli.command {
            Commands::Resolve(args) => {
                assert_eq!(args.package, "com.acme:foo");
                assert_eq!(args.version, "1.0.0");
            }
            _ => panic!("Expected Resolve command"),
        }
        assert_eq!(cli.catalog, Some(PathBuf::from("catalog.json")));
        assert!(!cli.json);
    }

    #[test]
    fn test_cli_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "etdep",
            "check",
            "com.acme:foo",
            "1.0.0",
            "--catalog",
            "catalog.json",
            "--core-version",
            "25.1.0",
            "--json",
        ])
        .unwrap();
        assert_eq!(cli.core_version.as_deref(), Some("25.1.0"));
        assert!(cli.json);
    }

    #[test]
    fn test_cli_diff_parsing() {
        let cli = Cli::try_parse_from([
            "etdep",
            "--catalog",
            "c.json",
            "diff",
            "com.acme:foo",
            "1.0.0",
            "2.0.0",
        ])
        .unwrap();
        match cli.command {
            Commands::Diff(args) => {
                assert_eq!(args.from, "1.0.0");
                assert_eq!(args.to, "2.0.0");
            }
            _ => panic!("Expected Diff command"),
        }
    }

    #[test]
    fn test_cli_no_subcommand_fails() {
        assert!(Cli::try_parse_from(["etdep", "com.acme:foo"]).is_err());
    }
}
