//! scaffolder's entry point.
//! Parses arguments, loads the template configuration and context, runs the build
//! and the post-generation commands.

use std::io::Read;

use scaffolder::{
    builder::Builder,
    cli::{get_args, get_output_dir, Args},
    config::{load_config, load_context, parse_context},
    error::{default_error_handler, Result},
    executor::{Command, Executor},
    ignore::{build_ignore_set, read_ignore_file},
    logger::init_logger,
    merge::json_merge,
    platform::Platform,
    source::DirSource,
};

/// Main application entry point.
fn main() {
    let args = get_args();

    init_logger(args.verbose);

    if let Err(err) = run(args) {
        default_error_handler(err);
    }
}

fn read_context(args: &Args) -> Result<serde_json::Value> {
    if args.stdin {
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf)?;
        return parse_context(&buf);
    }
    match &args.context {
        Some(path) => load_context(path),
        None => Ok(serde_json::Value::Object(serde_json::Map::new())),
    }
}

/// Main application logic execution.
///
/// # Flow
/// 1. Loads the template configuration, command-line flags taking precedence
/// 2. Validates the output directory
/// 3. Reads the build context
/// 4. Builds the output tree
/// 5. Runs post-generation commands inside the output directory
fn run(args: Args) -> Result<()> {
    let config = load_config(&args.template)?;
    let merge = args.merge || config.merge;
    let output_root = get_output_dir(&args.output_dir, args.force || merge)?;
    let context = read_context(&args)?;

    let mut ignore_patterns = config.ignore.clone();
    ignore_patterns.extend(read_ignore_file(&args.template));
    let ignore = build_ignore_set(&ignore_patterns)?;

    let prefix = args.prefix.clone().unwrap_or(config.prefix.clone());
    let suffix = args.suffix.clone().unwrap_or(config.template_suffix.clone());
    let platform = Platform::current();

    let mut builder = Builder::new(prefix.clone(), DirSource::new(&args.template), merge)
        .with_platform(platform)
        .with_template_suffix(suffix)
        .with_ignore(ignore);
    if config.merge_json {
        builder.add_merge_fn(".json", json_merge);
    }

    let report = builder.build(&prefix, &output_root, &context)?;
    for entry in &report.entries {
        println!("{}: '{}'", entry.action, entry.path.display());
    }

    let commands: Vec<Command> = config
        .post_commands
        .iter()
        .chain(args.run.iter())
        .map(|cmd| Command::new(cmd.as_str(), false))
        .collect();
    if !commands.is_empty() {
        Executor::new(&output_root, platform)?.run_all(&commands)?;
    }

    println!("Template generation completed successfully in {}.", output_root.display());
    Ok(())
}
