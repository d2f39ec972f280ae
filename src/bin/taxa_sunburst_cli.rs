use clap::{Args, Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use taxa_sunburst_rs::config::{AggregationConfig, HierarchyLayout};
use taxa_sunburst_rs::error::Result;
use taxa_sunburst_rs::lineage::{LineageParser, PrefixStyle};
use taxa_sunburst_rs::tsv::{read_classifications, write_split_table};
use taxa_sunburst_rs::{build_sunburst, split_classifications, sunburst_from_split_table, tree_json};

#[derive(Debug, Parser)]
#[command(name = "taxa-sunburst")]
#[command(about = "Split taxonomic lineages and build sunburst hierarchies", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Split lineage strings of a classification table into rank columns
    Split {
        /// Tab-separated status/read/lineage table (may be .gz)
        input: PathBuf,
        /// Where to write the split table
        output: PathBuf,
        #[arg(long, value_enum, default_value = "normalized")]
        prefix_style: PrefixArg,
    },
    /// Build the sunburst JSON from a split table
    Sunburst {
        /// Split table written by `split`
        input: PathBuf,
        /// Where to write the JSON tree
        output: PathBuf,
        #[command(flatten)]
        aggregation: AggregationArgs,
    },
    /// Split and aggregate in one go
    Run {
        /// Tab-separated status/read/lineage table (may be .gz)
        input: PathBuf,
        #[arg(long, default_value = "taxa_classifications_splited.tsv")]
        split_out: PathBuf,
        #[arg(long, default_value = "taxa.json")]
        json_out: PathBuf,
        #[command(flatten)]
        aggregation: AggregationArgs,
    },
}

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum PrefixArg {
    Normalized,
    Verbatim,
}

impl From<PrefixArg> for PrefixStyle {
    fn from(arg: PrefixArg) -> Self {
        match arg {
            PrefixArg::Normalized => PrefixStyle::Normalized,
            PrefixArg::Verbatim => PrefixStyle::Verbatim,
        }
    }
}

#[derive(Debug, Args)]
struct AggregationArgs {
    /// TOML file with aggregation settings; flags below override it
    #[arg(long)]
    config: Option<PathBuf>,
    /// Phylum to keep by name (repeatable)
    #[arg(long = "phylum")]
    phyla: Vec<String>,
    #[arg(long, allow_negative_numbers = true)]
    genus_top_n: Option<i64>,
    #[arg(long, allow_negative_numbers = true)]
    species_top_n: Option<i64>,
    /// Count unclassified reads toward the total
    #[arg(long)]
    include_unclassified: bool,
    /// Required kingdom for classified reads ("any" disables the check)
    #[arg(long)]
    kingdom: Option<String>,
    /// Group kingdom -> phylum -> genus instead of phylum -> genus -> species
    #[arg(long)]
    by_kingdom: bool,
    #[arg(long, value_enum)]
    prefix_style: Option<PrefixArg>,
}

impl AggregationArgs {
    fn load(&self) -> Result<AggregationConfig> {
        let mut config = match &self.config {
            Some(path) => AggregationConfig::from_file(path)?,
            None => AggregationConfig::default(),
        };
        if !self.phyla.is_empty() {
            config.retained_phyla = self.phyla.clone();
        }
        if let Some(n) = self.genus_top_n {
            config.genus_top_n = n;
        }
        if let Some(n) = self.species_top_n {
            config.species_top_n = n;
        }
        if self.include_unclassified {
            config.filter.include_unclassified = true;
        }
        if let Some(kingdom) = &self.kingdom {
            config.filter.kingdom = if kingdom.eq_ignore_ascii_case("any") {
                None
            } else {
                Some(kingdom.clone())
            };
        }
        if self.by_kingdom {
            config.layout = HierarchyLayout::KingdomPhylumGenus;
        }
        if let Some(style) = self.prefix_style {
            config.prefix_style = style.into();
        }
        log::debug!("Aggregation config: {:?}", config);
        Ok(config)
    }
}

fn spinner(color: &str, message: &str) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    let template = format!("{{spinner:.{color}}} {{msg}}");
    if let Ok(style) = ProgressStyle::default_spinner()
        .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"])
        .template(&template)
    {
        spinner.set_style(style);
    }
    spinner.set_message(message.to_string());
    spinner
}

fn split(input: PathBuf, output: PathBuf, prefix_style: PrefixStyle) -> Result<()> {
    let sp = spinner("blue", "Splitting lineages...");
    let records = read_classifications(&input)?;
    let split_records = split_classifications(records, LineageParser::new(prefix_style));
    write_split_table(&output, &split_records)?;
    sp.finish_with_message(format!(
        "Split {} records into {}.",
        split_records.len(),
        output.display()
    ));
    Ok(())
}

fn sunburst(input: PathBuf, output: PathBuf, config: AggregationConfig) -> Result<()> {
    let sp = spinner("green", "Aggregating taxa...");
    let results = sunburst_from_split_table(&input, &config)?;
    tree_json::write_tree(&output, results.tree())?;
    sp.finish_with_message(format!(
        "{} reads in {} groups written to {}.",
        results.aggregation.total,
        results.aggregation.rows.len(),
        output.display()
    ));
    Ok(())
}

fn run(input: PathBuf, split_out: PathBuf, json_out: PathBuf, config: AggregationConfig) -> Result<()> {
    let sp = spinner("blue", "Splitting lineages...");
    let records = read_classifications(&input)?;
    let split_records = split_classifications(records, LineageParser::new(config.prefix_style));
    sp.finish_with_message(format!("Split {} records.", split_records.len()));

    let sp = spinner("green", "Aggregating taxa...");
    let results = build_sunburst(split_records, &config)?;
    sp.finish_with_message(format!(
        "Aggregated {} reads into {} groups.",
        results.aggregation.total,
        results.aggregation.rows.len()
    ));

    let sp = spinner("yellow", "Writing output files...");
    fs::write(&split_out, results.get_split_table()?)?;
    fs::write(&json_out, results.get_sunburst_json()?)?;
    sp.finish_with_message("Output files created.");
    Ok(())
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let outcome = match cli.command {
        Commands::Split {
            input,
            output,
            prefix_style,
        } => split(input, output, prefix_style.into()),
        Commands::Sunburst {
            input,
            output,
            aggregation,
        } => aggregation
            .load()
            .and_then(|config| sunburst(input, output, config)),
        Commands::Run {
            input,
            split_out,
            json_out,
            aggregation,
        } => aggregation
            .load()
            .and_then(|config| run(input, split_out, json_out, config)),
    };

    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e}");
            ExitCode::FAILURE
        }
    }
}
