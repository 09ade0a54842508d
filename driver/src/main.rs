use anyhow::Context;
use bridge::BridgeServer;
use clap::Parser;
use generator::GeneratorConfig;
use migrationcore::render::{FrameMode, TimeWindow};
use migrationcore::session::ViewMode;
use std::path::PathBuf;
use workflow::config::{DataSource, WorkflowConfig};
use workflow::runner::Runner;

mod bridge;
mod generator;
mod workflow;

#[derive(Parser)]
#[command(author, version, about = "Animal migration map driver")]
struct Args {
    /// Load a workflow config from YAML; flags below override it
    #[arg(long)]
    workflow: Option<PathBuf>,
    /// Movebank CSV export to load
    #[arg(long, conflicts_with_all = ["sample", "synthetic"])]
    input: Option<PathBuf>,
    /// Use the bundled Arctic fox sample
    #[arg(long, default_value_t = false)]
    sample: bool,
    /// Generate this many random-walk tracks instead of reading a file
    #[arg(long)]
    synthetic: Option<usize>,
    /// Seed for --synthetic
    #[arg(long, default_value_t = 0)]
    seed: u64,
    /// Comma-separated subject ids to display (default: all)
    #[arg(long, value_delimiter = ',')]
    subjects: Vec<String>,
    /// static or animated
    #[arg(long)]
    view: Option<ViewMode>,
    /// Frame interval for the animated view, e.g. 7d or 12h
    #[arg(long)]
    interval: Option<TimeWindow>,
    /// cumulative or windowed
    #[arg(long)]
    frame_mode: Option<FrameMode>,
    /// Print the rendered artifact as JSON instead of a summary
    #[arg(long, default_value_t = false)]
    json: bool,
    /// Keep serving the rendered artifact over HTTP (Ctrl+C to stop)
    #[arg(long, default_value_t = false)]
    serve: bool,
}

impl Args {
    fn workflow_config(&self) -> anyhow::Result<WorkflowConfig> {
        let mut config = match &self.workflow {
            Some(path) => WorkflowConfig::load(path)?,
            None => WorkflowConfig::default(),
        };

        if let Some(path) = &self.input {
            config.source = DataSource::Csv { path: path.clone() };
        } else if let Some(subjects) = self.synthetic {
            config.source = DataSource::Synthetic(GeneratorConfig {
                subjects,
                seed: self.seed,
                ..Default::default()
            });
        } else if self.sample {
            config.source = DataSource::Sample;
        }
        if !self.subjects.is_empty() {
            config.subjects = self.subjects.clone();
        }
        if let Some(view) = self.view {
            config.session.view_mode = view;
        }
        if let Some(interval) = self.interval {
            config.session.interval = interval;
        }
        if let Some(frame_mode) = self.frame_mode {
            config.session.frame_mode = frame_mode;
        }
        Ok(config)
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let workflow_config = args.workflow_config()?;
    let runner = Runner::new(workflow_config);
    let model = runner.execute()?;

    if args.json {
        let rendered =
            serde_json::to_string_pretty(&model).context("serializing rendered artifact")?;
        println!("{}", rendered);
    } else {
        println!("{}", model.headline());
        println!("[{:?}] {}", model.summary.notice.level, model.summary.notice.message);
        if let Some(frame) = model.frame(0) {
            println!(
                "first frame {} ({} points)",
                frame.label,
                frame.view.point_count()
            );
        }
        println!(
            "pipeline: {} loads, {} renders",
            model.summary.counters.loads(),
            model.summary.counters.renders()
        );
    }

    if args.serve {
        let address = bridge::server::default_bind_address();
        println!("HTTP bridge on http://{} (Ctrl+C to stop)", address);
        BridgeServer::new(model).serve(address)?;
    }

    Ok(())
}
