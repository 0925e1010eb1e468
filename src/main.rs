mod error;
mod input;
mod logging;
mod parsers;
mod pipeline;
mod pipelines;
mod render;

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use clap::{ArgAction, Parser};

use crate::error::{ReportError, Result};
use crate::input::AnalysisInfo;
use crate::pipeline::{Report, StaticRoot};
use crate::pipelines::PipelineRegistry;
use crate::render::Templates;

#[derive(Debug, Parser)]
#[command(name = "bc-report")]
#[command(about = "Generate a static HTML report from a finished analysis folder")]
struct Cli {
    #[arg(short, long, action = ArgAction::Count, help = "Increase verbosity (-v info, -vv debug)")]
    verbose: u8,
    #[arg(long, help = "Add timestamps to log lines")]
    log_time: bool,
    #[arg(long, help = "Disable coloured logs")]
    no_color: bool,
    #[arg(short, long, help = "Overwrite the output folder if it exists")]
    force: bool,
    #[arg(short, long, help = "Registered pipeline name (e.g. base, rna_seq)")]
    pipeline: String,
    #[arg(long, help = "Extra static folder merged over the bundled assets")]
    static_dir: Option<PathBuf>,
    #[arg(help = "Finished analysis folder")]
    job_dir: PathBuf,
    #[arg(default_value = "./output", help = "Output folder")]
    out_dir: PathBuf,
}

fn main() {
    let cli = Cli::parse();
    match run(&cli) {
        Ok(()) => println!("{}", caveat_message(&cli.out_dir)),
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(1);
        }
    }
}

fn run(cli: &Cli) -> Result<()> {
    let dispatch = logging::build_dispatch(cli.verbose, cli.log_time, !cli.no_color);
    tracing::dispatcher::with_default(&dispatch, || {
        tracing::debug!(
            "using pipeline {} to parse {} into {}",
            cli.pipeline,
            cli.job_dir.display(),
            cli.out_dir.display()
        );
        if !cli.job_dir.is_dir() {
            return Err(ReportError::Configuration(format!(
                "job folder {} is not a readable directory",
                cli.job_dir.display()
            )));
        }
        let mut definition = PipelineRegistry::builtin().build(&cli.pipeline)?;
        if let Some(dir) = &cli.static_dir {
            definition.static_roots.push(StaticRoot::Dir(dir.clone()));
        }
        prepare_output_dir(&cli.out_dir, cli.force)?;

        let analysis_info = AnalysisInfo::load(&cli.job_dir)?;
        let templates = Templates::bundled()?;
        let mut report = Report::new(definition, analysis_info, templates, dispatch.clone());
        let report_root = report.generate(&cli.out_dir)?;
        tracing::info!("{} report written to {}", report.name(), report_root.display());
        Ok(())
    })
}

fn prepare_output_dir(out_dir: &Path, force: bool) -> Result<()> {
    if out_dir.exists() {
        if !force {
            return Err(ReportError::fs(
                out_dir,
                io::Error::new(
                    io::ErrorKind::AlreadyExists,
                    "cannot overwrite output folder (pass --force to overwrite)",
                ),
            ));
        }
        tracing::warn!("output folder {} already exists; removing it", out_dir.display());
        fs::remove_dir_all(out_dir).map_err(|e| ReportError::fs(out_dir, e))?;
    }
    fs::create_dir_all(out_dir).map_err(|e| ReportError::fs(out_dir, e))
}

fn caveat_message(out_dir: &Path) -> String {
    format!(
        "New output result is under {}.\n\n\
         The folder can be downloaded and viewed locally.\n\
         Quick reminder for serving the current folder over http:\n\n    \
         $ python3 -m http.server\n    \
         # Serving HTTP on 0.0.0.0 port 8000 ...\n",
        out_dir.display()
    )
}

#[cfg(test)]
#[path = "../tests/src_inline/main_inline.rs"]
mod tests;
