use log::{LevelFilter, debug, error, info};
use rand::SeedableRng;
use rand::rngs::SmallRng;
use serde::Serialize;
use std::io::Write;
use std::time::Instant;

use vctargets::cli::core::{Commands, OutputSettings, get_cli};
use vctargets::cli::resources::{PartitionSettings, check_partition_settings};
use vctargets::cli::targets::{
    FlattenSettings, InputSettings, LocateSettings, ResolveQuery, ResolveSettings, StratBatchSettings, TargetsSettings,
    check_flatten_settings, check_locate_settings, check_resolve_settings, check_strat_batch_settings, check_targets_settings
};
use vctargets::cli::tracking::{TrackSettingSettings, TrackSettings, check_track_setting_settings, check_track_settings};
use vctargets::data_types::layout::TargetLayout;
use vctargets::data_types::manifest::Manifests;
use vctargets::data_types::pipeline_config::PipelineConfig;
use vctargets::parsing::manifests::load_manifests;
use vctargets::parsing::pipeline_config::load_pipeline_config;
use vctargets::parsing::stratifications::StratificationFiles;
use vctargets::resource_selection::{ResourceConfig, select_partition};
use vctargets::target_construction::TargetConstructor;
use vctargets::tracking::{TrackingError, stratification_tracking_files, update_analysis_tracking_file, update_analysis_tracking_files};
use vctargets::util::json_io::load_structured;

fn init_logging(verbosity: u8) {
    let filter_level: LevelFilter = match verbosity {
        0 => LevelFilter::Info,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace
    };
    env_logger::builder()
        .format_timestamp_millis()
        .filter_level(filter_level)
        .init();
}

/// Writes results to stdout, either as JSON or as one line per entry
fn emit<T: Serialize>(output: &OutputSettings, value: &T, lines: &[String]) {
    let mut stdout = std::io::stdout().lock();
    let result = if output.json {
        serde_json::to_writer_pretty(&mut stdout, value)
            .map_err(std::io::Error::from)
            .and_then(|()| writeln!(stdout))
    } else {
        lines.iter().try_for_each(|l| writeln!(stdout, "{l}"))
    };
    if let Err(e) = result {
        error!("Error while writing output: {e}");
        std::process::exit(exitcode::IOERR);
    }
}

/// Loads the configuration, manifests, and layout shared by the target subcommands
fn load_inputs(inputs: &InputSettings) -> (PipelineConfig, Manifests, TargetLayout) {
    info!("Loading pipeline configuration...");
    let config = match load_pipeline_config(&inputs.config_fn) {
        Ok(c) => c,
        Err(e) => {
            error!("Error while loading pipeline configuration: {e:#}");
            std::process::exit(exitcode::CONFIG);
        }
    };
    info!("Active genome build: {}", config.genome_build);

    info!("Loading manifests...");
    let manifests = match load_manifests(
        inputs.experimental_fn.as_deref(), inputs.reference_fn.as_deref(), inputs.comparisons_fn.as_deref()
    ) {
        Ok(m) => m,
        Err(e) => {
            error!("Error while loading manifests: {e:#}");
            std::process::exit(exitcode::DATAERR);
        }
    };
    debug!("Loaded {} comparisons", manifests.comparisons().len());

    let layout = match inputs.layout() {
        Ok(l) => l,
        Err(e) => {
            error!("Error while building output layout: {e:#}");
            std::process::exit(exitcode::CONFIG);
        }
    };
    (config, manifests, layout)
}

fn build_constructor<'a>(config: &'a PipelineConfig, manifests: &'a Manifests, layout: TargetLayout) -> TargetConstructor<'a> {
    match TargetConstructor::new(config, manifests, layout) {
        Ok(tc) => tc,
        Err(e) => {
            error!("Error while validating pipeline configuration: {e}");
            std::process::exit(exitcode::CONFIG);
        }
    }
}

fn run_targets(settings: TargetsSettings) {
    init_logging(settings.output.verbosity);
    let settings = match check_targets_settings(settings) {
        Ok(s) => s,
        Err(e) => {
            error!("Error while verifying settings: {e:#}");
            std::process::exit(exitcode::CONFIG);
        }
    };

    let (config, manifests, layout) = load_inputs(&settings.inputs);
    let constructor = build_constructor(&config, &manifests, layout);
    let targets = match constructor.construct_targets() {
        Ok(t) => t,
        Err(e) => {
            error!("Error while constructing targets: {e}");
            std::process::exit(exitcode::DATAERR);
        }
    };
    info!("Constructed {} report targets.", targets.len());
    emit(&settings.output, &targets, &targets);
}

fn run_resolve(settings: ResolveSettings) {
    init_logging(settings.output.verbosity);
    let settings = match check_resolve_settings(settings) {
        Ok(s) => s,
        Err(e) => {
            error!("Error while verifying settings: {e:#}");
            std::process::exit(exitcode::CONFIG);
        }
    };

    let (config, manifests, layout) = load_inputs(&settings.inputs);
    let constructor = build_constructor(&config, &manifests, layout);
    let group = settings.group.as_str();
    match settings.query {
        ResolveQuery::ToolOutputs => {
            let outputs = match constructor.comparison_tool_outputs(group, &settings.region) {
                Ok(o) => o,
                Err(e) => {
                    error!("Error while resolving tool outputs: {e}");
                    std::process::exit(exitcode::DATAERR);
                }
            };
            emit(&settings.output, &outputs, &outputs);
        },
        ResolveQuery::Subjects => {
            let subjects = match constructor.comparison_subjects(group) {
                Ok(s) => s,
                Err(e) => {
                    error!("Error while resolving subjects: {e}");
                    std::process::exit(exitcode::DATAERR);
                }
            };
            let lines: Vec<String> = subjects.iter().map(|s| s.to_string()).collect();
            emit(&settings.output, &subjects, &lines);
        },
        ResolveQuery::VariantTypes => {
            let categories = match constructor.variant_types(group) {
                Ok(c) => c,
                Err(e) => {
                    error!("Error while resolving variant types: {e}");
                    std::process::exit(exitcode::DATAERR);
                }
            };
            let lines: Vec<String> = categories.iter().map(|c| c.to_string()).collect();
            emit(&settings.output, &categories, &lines);
        }
    }
}

fn run_locate(settings: LocateSettings) {
    init_logging(settings.output.verbosity);
    let settings = match check_locate_settings(settings) {
        Ok(s) => s,
        Err(e) => {
            error!("Error while verifying settings: {e:#}");
            std::process::exit(exitcode::CONFIG);
        }
    };

    let (config, manifests, layout) = load_inputs(&settings.inputs);
    let constructor = build_constructor(&config, &manifests, layout);
    let resolved = match constructor.resolve_locator(settings.manifest, &settings.dataset) {
        Ok(r) => r,
        Err(e) => {
            error!("Error while locating dataset: {e}");
            std::process::exit(exitcode::DATAERR);
        }
    };
    debug!("Dataset {:?} uses {} transport", settings.dataset, resolved.scheme);
    emit(&settings.output, &resolved, &[resolved.locator.to_string()]);
}

fn run_flatten(settings: FlattenSettings) {
    init_logging(settings.output.verbosity);
    let settings = match check_flatten_settings(settings) {
        Ok(s) => s,
        Err(e) => {
            error!("Error while verifying settings: {e:#}");
            std::process::exit(exitcode::CONFIG);
        }
    };

    let (config, manifests, layout) = load_inputs(&settings.inputs);
    let constructor = build_constructor(&config, &manifests, layout);
    let definitions = match constructor.flatten_region_definitions() {
        Ok(d) => d,
        Err(e) => {
            error!("Error while flattening region definitions: {e}");
            std::process::exit(exitcode::CONFIG);
        }
    };
    let lines: Vec<String> = definitions.iter()
        .map(|(name, label, inclusion)| format!("{name}\t{label}\t{inclusion}"))
        .collect();
    emit(&settings.output, &definitions, &lines);
}

fn run_strat_batch(settings: StratBatchSettings) {
    init_logging(settings.output.verbosity);
    let settings = match check_strat_batch_settings(settings) {
        Ok(s) => s,
        Err(e) => {
            error!("Error while verifying settings: {e:#}");
            std::process::exit(exitcode::CONFIG);
        }
    };

    let (config, manifests, layout) = load_inputs(&settings.inputs);
    let constructor = build_constructor(&config, &manifests, layout);

    info!("Loading stratification listing...");
    let files = match StratificationFiles::from_tsv(&settings.stratifications_fn) {
        Ok(f) => f,
        Err(e) => {
            error!("Error while loading stratifications: {e:#}");
            std::process::exit(exitcode::DATAERR);
        }
    };
    let batch_count = constructor.stratification_batch_count(&files);
    info!("Loaded {} stratifications in {batch_count} batches.", files.len());

    match settings.batch {
        None => {
            emit(&settings.output, &batch_count, &[batch_count.to_string()]);
        },
        Some(batch_index) => {
            let batch = match constructor.stratification_batch(&files, batch_index) {
                Ok(b) => b,
                Err(e) => {
                    error!("Error while selecting stratification batch: {e}");
                    std::process::exit(exitcode::USAGE);
                }
            };
            let lines: Vec<String> = batch.iter()
                .map(|b| format!("{}\t{}\t{}", b.file.key(), b.file.relative_path().display(), b.target))
                .collect();
            emit(&settings.output, &batch, &lines);
        }
    }
}

fn load_track_config(settings: &TrackSettings) -> PipelineConfig {
    match load_pipeline_config(&settings.config_fn) {
        Ok(c) => c,
        Err(e) => {
            error!("Error while loading pipeline configuration: {e:#}");
            std::process::exit(exitcode::CONFIG);
        }
    }
}

/// Configuration problems and file system problems get distinct exit codes
fn tracking_exit_code(error: &TrackingError) -> exitcode::ExitCode {
    match error {
        TrackingError::Config(_) => exitcode::CONFIG,
        TrackingError::Io(_) => exitcode::IOERR
    }
}

fn run_track(settings: TrackSettings) {
    init_logging(settings.output.verbosity);
    let settings = match check_track_settings(settings, "track") {
        Ok(s) => s,
        Err(e) => {
            error!("Error while verifying settings: {e:#}");
            std::process::exit(exitcode::CONFIG);
        }
    };

    let config = load_track_config(&settings);
    let updates = match update_analysis_tracking_files(&config, &settings.results_prefix) {
        Ok(u) => u,
        Err(e) => {
            error!("Error while updating tracking files: {e}");
            std::process::exit(tracking_exit_code(&e));
        }
    };
    let lines: Vec<String> = updates.iter()
        .map(|(filename, outcome)| format!("{}\t{outcome:?}", filename.display()))
        .collect();
    let filenames: Vec<_> = updates.iter().map(|(f, _)| f).collect();
    emit(&settings.output, &filenames, &lines);
}

fn run_tracking_files(settings: TrackSettings) {
    init_logging(settings.output.verbosity);
    let settings = match check_track_settings(settings, "tracking-files") {
        Ok(s) => s,
        Err(e) => {
            error!("Error while verifying settings: {e:#}");
            std::process::exit(exitcode::CONFIG);
        }
    };

    let config = load_track_config(&settings);
    let filenames = match stratification_tracking_files(&config, &settings.results_prefix) {
        Ok(f) => f,
        Err(e) => {
            error!("Error while listing tracking files: {e}");
            std::process::exit(exitcode::CONFIG);
        }
    };
    let lines: Vec<String> = filenames.iter().map(|f| f.display().to_string()).collect();
    emit(&settings.output, &filenames, &lines);
}

fn run_track_setting(settings: TrackSettingSettings) {
    init_logging(settings.output.verbosity);
    let settings = match check_track_setting_settings(settings) {
        Ok(s) => s,
        Err(e) => {
            error!("Error while verifying settings: {e:#}");
            std::process::exit(exitcode::CONFIG);
        }
    };

    let outcome = match update_analysis_tracking_file(
        &settings.results_prefix, &settings.analysis_name, &settings.setting(), &settings.tracking_tag()
    ) {
        Ok(o) => o,
        Err(e) => {
            error!("Error while updating tracking file: {e}");
            std::process::exit(exitcode::IOERR);
        }
    };
    let line = format!("{outcome:?}");
    emit(&settings.output, &line, &[line.clone()]);
}

fn run_partition(settings: PartitionSettings) {
    init_logging(settings.output.verbosity);
    let settings = match check_partition_settings(settings) {
        Ok(s) => s,
        Err(e) => {
            error!("Error while verifying settings: {e:#}");
            std::process::exit(exitcode::CONFIG);
        }
    };

    let resources: ResourceConfig = match load_structured(&settings.resources_fn) {
        Ok(r) => r,
        Err(e) => {
            error!("Error while loading resources: {e:#}");
            std::process::exit(exitcode::CONFIG);
        }
    };

    let mut rng = match settings.seed {
        Some(seed) => SmallRng::seed_from_u64(seed),
        None => SmallRng::from_entropy()
    };
    let partition = match select_partition(&settings.partition, &resources.partitions, &mut rng) {
        Ok(p) => p,
        Err(e) => {
            error!("Error while selecting partition: {e}");
            std::process::exit(exitcode::CONFIG);
        }
    };
    emit(&settings.output, &partition, &[partition.to_string()]);
}

fn main() {
    let start_time = Instant::now();
    let cli = get_cli();
    match cli.command {
        Commands::Targets(settings) => run_targets(*settings),
        Commands::Resolve(settings) => run_resolve(*settings),
        Commands::Locate(settings) => run_locate(*settings),
        Commands::Flatten(settings) => run_flatten(*settings),
        Commands::StratBatch(settings) => run_strat_batch(*settings),
        Commands::Track(settings) => run_track(*settings),
        Commands::TrackingFiles(settings) => run_tracking_files(*settings),
        Commands::TrackSetting(settings) => run_track_setting(*settings),
        Commands::Partition(settings) => run_partition(*settings)
    }

    info!("Process finished successfully in {} seconds.", start_time.elapsed().as_secs_f64());
}

#[cfg(test)]
mod tests {
    use super::*;
    use vctargets::data_types::pipeline_config::ConfigError;

    #[test]
    fn test_tracking_exit_code() {
        let config_error = TrackingError::from(ConfigError::MissingStratifications { build: "grch38".to_string() });
        assert_eq!(tracking_exit_code(&config_error), exitcode::CONFIG);

        let io_error = TrackingError::from(std::io::Error::from(std::io::ErrorKind::PermissionDenied));
        assert_eq!(tracking_exit_code(&io_error), exitcode::IOERR);
    }
}
