mod cli;
mod commands;
mod config;

use anyhow::Result;
use clap::Parser;
use config::Config;
use std::path::PathBuf;
use unikit::ProjectLayout;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cli::*;

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("unikit={level},unikit_cli={level}").into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Configure {
            project_root,
            exclude,
            file_types,
            export_dir,
            author,
            repo,
            show,
        } => {
            let changes = commands::configure::Changes {
                project_root,
                exclude,
                file_types,
                export_dir,
                author,
                repo,
            };
            commands::configure::handle(changes, show)?;
        }

        Commands::Remap { folder } => {
            let (_, project) = open(cli.project)?;
            commands::remap::handle(&project, &folder)?;
        }

        Commands::Namespace { select, exclude } => {
            let (config, project) = open(cli.project)?;
            let exclude = exclude.as_deref().unwrap_or(config.exclude());
            commands::namespace::handle(&project, &select, exclude)?;
        }

        Commands::Tree { types, root, all } => {
            let (config, project) = open(cli.project)?;
            let types = types.as_deref().unwrap_or(config.file_types());
            commands::tree::handle(&project, &root, types, all)?;
        }

        Commands::Export {
            select,
            out,
            name,
            types,
        } => {
            let (config, project) = open(cli.project)?;
            let out = out
                .or_else(|| config.export_dir.clone())
                .unwrap_or_else(|| project.root().to_path_buf());
            let types = types.as_deref().unwrap_or(config.file_types());
            commands::bundle::export(&project, &select, &out, name.as_deref(), types)?;
        }

        Commands::Import { bundle, root } => {
            let (_, project) = open(cli.project)?;
            commands::bundle::import(&project, &bundle, &root)?;
        }

        Commands::Tags { command } => {
            let (_, project) = open(cli.project)?;
            match command {
                TagsCommand::Show => {
                    commands::tags::show(&project)?;
                }

                TagsCommand::Save { tags, layers } => {
                    commands::tags::save(&project, tags, layers)?;
                }

                TagsCommand::Sync => {
                    commands::tags::sync(&project)?;
                }
            }
        }

        Commands::Package {
            name,
            author,
            version,
            repo,
            target,
        } => {
            let (config, project) = open(cli.project)?;
            let request = unikit::PackageRequest {
                base_name: name,
                author: author.or_else(|| config.author.clone()).unwrap_or_default(),
                version,
                repo: repo.or_else(|| config.repo.clone()).unwrap_or_default(),
                target_folder: target,
            };
            commands::package::handle(&project, &request)?;
        }
    }

    Ok(())
}

/// Load the config and resolve the project it or `--project` points at
fn open(project: Option<PathBuf>) -> Result<(Config, ProjectLayout)> {
    let config = Config::load()?;
    let project = commands::open_project(&config, project)?;
    Ok((config, project))
}
