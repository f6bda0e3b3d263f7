use crate::output::print_json;
use anyhow::Context;
use clap::Args;
use story_core::{
    config::Config,
    story::{create_story, CreateOptions, NewStory},
};
use std::path::Path;

#[derive(Args)]
pub struct NewArgs {
    /// Story id (e.g., F.10)
    #[arg(long)]
    id: String,
    /// Story title
    #[arg(long)]
    title: String,
    /// Story status
    #[arg(long, default_value = "Not Started")]
    status: String,
    /// Priority label (default from config, else "P2 (Medium)")
    #[arg(long)]
    priority: Option<String>,
    /// Dependencies list or 'None'
    #[arg(long, default_value = "None")]
    dependencies: String,
    /// Estimated effort
    #[arg(long, default_value = "TBD")]
    estimate: String,
    /// Target platform (default from config)
    #[arg(long)]
    target: Option<String>,
    /// Design reference link or None
    #[arg(long, default_value = "None")]
    design: String,
    /// Objective text
    #[arg(long, default_value = "TBD")]
    objective: String,
    /// Category index description override
    #[arg(long)]
    description: Option<String>,
    /// Category display name override
    #[arg(long)]
    epic: Option<String>,
    /// Update existing index rows
    #[arg(long)]
    update_existing: bool,
    /// Skip index updates
    #[arg(long)]
    no_indexes: bool,
    /// Overwrite an existing story file
    #[arg(long)]
    overwrite: bool,
    /// Print the path without writing anything
    #[arg(long)]
    dry_run: bool,
}

impl NewArgs {
    fn into_story(self, config: &Config) -> (NewStory, CreateOptions) {
        let mut story = NewStory::new(self.id, self.title, &config.defaults);
        story.status = self.status;
        if let Some(priority) = self.priority {
            story.priority = priority;
        }
        story.dependencies = self.dependencies;
        story.estimate = self.estimate;
        if let Some(target) = self.target {
            story.target = target;
        }
        story.design = self.design;
        story.objective = self.objective;
        story.description = self.description;
        story.epic = self.epic;

        let opts = CreateOptions {
            update_existing: self.update_existing,
            skip_indexes: self.no_indexes,
            overwrite: self.overwrite,
            dry_run: self.dry_run,
        };
        (story, opts)
    }
}

pub fn run(root: &Path, args: NewArgs, json: bool) -> anyhow::Result<()> {
    let config = Config::load(root).context("failed to load config")?;
    for warning in config.validate() {
        tracing::warn!("config: {}", warning.message);
    }

    let (story, opts) = args.into_story(&config);
    let report = create_story(root, &config, &story, opts)
        .with_context(|| format!("failed to create story '{}'", story.id))?;

    if json {
        print_json(&report)?;
    } else if report.dry_run {
        println!("Would write: {}", report.path.display());
    } else {
        println!("Created story: {}", report.path.display());
        if let (Some(global), Some(category)) = (&report.global_index, &report.category_index) {
            println!("Main README: {global}");
            println!("Epic README: {category}");
        }
    }

    if report.index_failed() {
        anyhow::bail!("story '{}' was written but an index update failed", story.id);
    }
    Ok(())
}
