//! gorun CLI - build and run Go programs without installing them

use anyhow::{anyhow, Result};
use clap::{CommandFactory, Parser};
use tracing_subscriber::EnvFilter;

use gorun::core::{InstallRequest, PackageSpec};
use gorun::ops;
use gorun::GlobalContext;

mod cli;

use cli::Cli;

fn main() {
    match run() {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            eprintln!("error: {:#}", e);
            std::process::exit(1);
        }
    }
}

/// Returns the exit code of the launched program.
fn run() -> Result<i32> {
    let cli = Cli::parse();

    // stdout belongs to the launched program
    let filter = if cli.verbose {
        EnvFilter::new("gorun=debug")
    } else {
        EnvFilter::new("gorun=info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();

    let Some((package, args)) = cli.command.split_first() else {
        eprintln!("No package specified.");
        eprintln!("{}", Cli::command().render_usage());
        return Ok(1);
    };

    let package = package
        .to_str()
        .ok_or_else(|| anyhow!("package argument is not valid UTF-8: {:?}", package))?;
    let spec: PackageSpec = package.parse()?;

    let request = InstallRequest::new(spec)
        .with_tags(cli.tags)
        .with_verbose(cli.verbose);
    tracing::debug!("Package: {}", request.package);
    tracing::debug!("Arguments: {:?}", args);

    let ctx = GlobalContext::new(cli.home)?;

    let builder = ctx.builder();
    let executable = ops::ensure_installed(ctx.cache_dir(), &request, &builder)?;
    let code = ops::run(&executable, args)?;
    Ok(code)
}
