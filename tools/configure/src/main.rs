//! surge-configure - render a deployment template from option files

use std::path::PathBuf;

use clap::Parser;
use surge_configure::{Job, render_to};

/// Render a deployment template from option files
#[derive(Parser)]
#[command(name = "surge-configure", version)]
struct Args {
    /// Source template file
    #[arg(long, default_value = "template.yml")]
    template: PathBuf,

    /// Force the template file type (toml, yaml, json)
    #[arg(long, alias = "template_type")]
    template_type: Option<String>,

    /// Files containing substitute values; values in later files replace
    /// earlier ones [default: options.yml]
    #[arg(long = "options")]
    options: Vec<PathBuf>,

    /// Force the options file type (toml, yaml, json)
    #[arg(long, alias = "option_type")]
    option_type: Option<String>,

    /// Output file
    #[arg(long, default_value = "serverless.yml")]
    output: PathBuf,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let options = if args.options.is_empty() {
        vec![PathBuf::from("options.yml")]
    } else {
        args.options
    };
    let job = Job {
        template: args.template,
        template_type: args.template_type,
        options,
        option_type: args.option_type,
    };
    render_to(&job, &args.output)
        .map_err(|e| anyhow::anyhow!("Failed to generate file: {e}"))?;
    println!("done");
    Ok(())
}
