use clap::{Arg, ArgAction, ArgMatches, Command};
use std::env;
use std::fs;
use std::path::Path;
use xenly::info;
use xenly::project::{self, DEFAULT_PROJECT};
use xenly::{repl, runner, EvalOptions, DEFAULT_MAX_DEPTH};

fn main() {
    env_logger::init();

    let matches = cli().get_matches_from(normalize_legacy_flags(env::args()));

    if matches.get_flag("help") {
        println!("{}", info::help_text());
        return;
    }
    if matches.get_flag("version") {
        println!("{}", info::version_banner());
        return;
    }
    if matches.get_flag("dumpversion") {
        println!("{}", info::dumpversion());
        return;
    }
    if matches.get_flag("dumpmachine") {
        println!("{}", info::machine());
        return;
    }
    if matches.get_flag("operatingsystem") {
        println!("{}", info::operating_system());
        return;
    }
    if matches.get_flag("path") {
        match env::current_exe() {
            Ok(path) => println!("{}", path.display()),
            Err(e) => {
                eprintln!("Error: cannot determine the executable path: {}", e);
                std::process::exit(1);
            }
        }
        return;
    }
    if matches.get_flag("author") {
        println!("{}", info::author());
        return;
    }
    if let Some(name) = matches.get_one::<String>("create-project") {
        scaffold(&project::project_dir_name(name));
        return;
    }
    if matches.get_flag("init") {
        scaffold(DEFAULT_PROJECT);
        return;
    }

    let options = eval_options(&matches);
    match matches.get_one::<String>("file") {
        Some(file_path) if !matches.get_flag("interactive") => run_file(file_path, options),
        _ => repl::start(options),
    }
}

fn cli() -> Command {
    Command::new("xenly")
        .about("Xenly expression and condition evaluator")
        .disable_help_flag(true)
        .disable_version_flag(true)
        .arg(
            Arg::new("file")
                .help("The Xenly source file to run")
                .value_name("FILE")
                .index(1),
        )
        .arg(flag("help").short('h').long("help").help("Display help information"))
        .arg(flag("version").short('v').long("version").help("Display version information"))
        .arg(flag("dumpversion").long("dumpversion").help("Display the version number only"))
        .arg(flag("dumpmachine").long("dumpmachine").help("Display the target processor"))
        .arg(flag("operatingsystem").long("operatingsystem").help("Display the operating system"))
        .arg(flag("path").short('p').long("path").help("Display the path to the executable"))
        .arg(flag("author").long("author").help("Display the author information"))
        .arg(
            Arg::new("create-project")
                .long("create-project")
                .value_name("NAME")
                .help("Create NAME_project/ with a main.xe"),
        )
        .arg(flag("init").long("init").help("Create xenly_project/ with a main.xe"))
        .arg(
            Arg::new("max-depth")
                .long("max-depth")
                .value_name("N")
                .value_parser(clap::value_parser!(u64).range(1..))
                .help("Maximum expression nesting depth"),
        )
        .arg(
            flag("interactive")
                .short('i')
                .long("interactive")
                .help("Start in interactive REPL mode")
                .conflicts_with("file"),
        )
}

fn flag(id: &'static str) -> Arg {
    Arg::new(id).action(ArgAction::SetTrue)
}

/// `-dv`, `-dm` and `-os` predate the long forms; clap only knows
/// single-character shorts, so they are rewritten before parsing.
fn normalize_legacy_flags(args: impl Iterator<Item = String>) -> Vec<String> {
    args.map(|arg| match arg.as_str() {
        "-dv" => "--dumpversion".to_string(),
        "-dm" => "--dumpmachine".to_string(),
        "-os" => "--operatingsystem".to_string(),
        _ => arg,
    })
    .collect()
}

fn eval_options(matches: &ArgMatches) -> EvalOptions {
    EvalOptions {
        max_depth: matches
            .get_one::<u64>("max-depth")
            .map(|depth| usize::try_from(*depth).unwrap_or(usize::MAX))
            .unwrap_or(DEFAULT_MAX_DEPTH),
    }
}

fn scaffold(dir_name: &str) {
    let parent = match env::current_dir() {
        Ok(dir) => dir,
        Err(e) => {
            eprintln!("Error: cannot read the current directory: {}", e);
            std::process::exit(1);
        }
    };

    match project::create_project(&parent, dir_name) {
        Ok(_) => println!("New Xenly project initialized in '{}' folder.", dir_name),
        Err(e) => {
            eprintln!("Error: unable to create project: {}", e);
            std::process::exit(1);
        }
    }
}

fn run_file(path: &str, options: EvalOptions) {
    let path = Path::new(path);

    if !path.exists() {
        eprintln!("Error: File '{}' not found", path.display());
        std::process::exit(1);
    }

    match fs::read_to_string(path) {
        Ok(source) => {
            let filename = path.display().to_string();
            if runner::run(&source, Some(&filename), options).is_err() {
                std::process::exit(1);
            }
        }
        Err(e) => {
            eprintln!("Error reading file '{}': {}", path.display(), e);
            std::process::exit(1);
        }
    }
}
