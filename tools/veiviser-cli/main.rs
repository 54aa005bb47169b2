use clap::{Parser, ValueEnum};
use std::fs;
use std::io::{self, Write};
use std::time::Instant;

use veiviser::data::load_answers;
use veiviser::prelude::*;

/// What the CLI should do with the loaded template.
#[derive(Debug, Clone, Copy, ValueEnum)]
enum ActionCli {
    /// List the sections that branch
    ShowBranching,
    /// Write per-section graph sources in Graphviz DOT format
    DumpGraphs,
    /// Check template design and, when answers are given, answer validity
    Check,
    /// Precompute transition maps and paths into a binary artifact
    Artifact,
}

/// A branching and traversal engine for question-graph templates
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Path to the template definition JSON file
    template_path: Option<String>,
    /// Optional path to the recorded answers JSON file
    answers_path: Option<String>,

    /// The action to perform
    #[arg(short, long, value_enum)]
    action: Option<ActionCli>,

    /// Limit graph actions to the given section ids
    #[arg(short, long, num_args = 1..)]
    sections: Vec<u32>,

    /// Add positions, ids and trunk/optional flags to graph labels
    #[arg(short, long)]
    debug: bool,

    /// Output directory for graph sources and artifacts
    #[arg(short, long, default_value = "tmp")]
    out: String,

    /// Run in interactive mode to be prompted for inputs
    #[arg(short = 'i', long, help = "Run in interactive 'human' mode")]
    human: bool,
}

fn main() {
    let cli = Cli::parse();

    if cli.human {
        run_interactive(&cli);
    } else {
        run_non_interactive(cli);
    }
}

fn run_action(
    template_path: String,
    answers_path: Option<String>,
    action: ActionCli,
    section_ids: &[u32],
    debug: bool,
    out: &str,
) {
    let total_start = Instant::now();

    // --- 1. File Loading ---
    let load_start = Instant::now();
    let definition = TemplateDefinition::from_file(&template_path).unwrap_or_else(|e| {
        exit_with_error(&format!(
            "Failed to read template file '{}': {}",
            &template_path, e
        ))
    });
    let answers = answers_path.map(|path| {
        load_answers(&path)
            .unwrap_or_else(|e| exit_with_error(&format!("Failed to load answers from '{}': {}", path, e)))
    });
    let load_duration = load_start.elapsed();

    // --- 2. Template Build ---
    let build_start = Instant::now();
    let template = Template::builder(definition)
        .build()
        .unwrap_or_else(|e| exit_with_error(&format!("Template build failed: {}", e)));
    let build_duration = build_start.elapsed();

    println!(
        "Built template '{}': {} sections, {} questions in {:?}",
        template.title(),
        template.ordered_sections().len(),
        template.questions().len(),
        build_duration
    );

    // --- 3. Action ---
    let action_start = Instant::now();
    for id in section_ids {
        if let Err(e) = template.require_section(SectionId(*id)) {
            exit_with_error(&format!("Bad --sections argument: {}", e));
        }
    }
    let sections: Vec<Section<'_>> = template
        .ordered_sections()
        .into_iter()
        .filter(|s| section_ids.is_empty() || section_ids.contains(&s.id().0))
        .collect();

    match action {
        ActionCli::ShowBranching => show_branching(&template, &sections),
        ActionCli::DumpGraphs => dump_graphs(&sections, debug, out),
        ActionCli::Check => check(&template, answers.as_ref()),
        ActionCli::Artifact => write_artifact(&template, out),
    }
    let action_duration = action_start.elapsed();

    // --- 4. Summary ---
    let total_duration = total_start.elapsed();
    println!("\n--- Performance Summary ---");
    println!("File Loading:    {:?}", load_duration);
    println!("Template Build:  {:?}", build_duration);
    println!("Action:          {:?}", action_duration);
    println!("---------------------------");
    println!("Total Execution: {:?}", total_duration);
    println!();
}

/// Lists branching sections the way template maintainers expect to read
/// them: one template line, one indented line per branching section.
fn show_branching(template: &Template, sections: &[Section<'_>]) {
    let branching: Vec<_> = sections.iter().filter(|s| s.branching()).collect();
    if branching.is_empty() {
        println!("\nNo branching sections.");
        return;
    }
    println!("\nTemplate \"{}\":", template.title());
    for section in branching {
        println!(
            "\t\"{}\" ({}), {} questions",
            section.full_title(),
            section.id(),
            section.questions().len()
        );
    }
}

fn dump_graphs(sections: &[Section<'_>], debug: bool, out: &str) {
    fs::create_dir_all(out)
        .unwrap_or_else(|e| exit_with_error(&format!("Failed to create '{}': {}", out, e)));
    println!();
    for section in sections {
        let path = format!("{}/{}", out, section.dot_source_filename());
        fs::write(&path, section.generate_dot_source(debug))
            .unwrap_or_else(|e| exit_with_error(&format!("Failed to write '{}': {}", path, e)));
        println!("  -> Wrote graph source to '{}'", path);
    }
}

fn check(template: &Template, answers: Option<&AnswerMap>) {
    println!("\n--- Design Check ---");
    if template.is_design_valid() {
        println!("Template design is valid.");
    } else {
        println!("Template design has problems, see the log for details.");
    }

    let Some(answers) = answers else {
        println!("\nNo answers file provided, skipping answer validation.");
        return;
    };

    println!("\n--- Answer Check ---");
    let unknown = template.list_unknown_answers(answers);
    if !unknown.is_empty() {
        println!("Answers not matching any question: {:?}", unknown);
    }

    let (valid, invalid) = template
        .find_validity_of_sections(answers)
        .unwrap_or_else(|e| exit_with_error(&format!("Validity check failed: {}", e)));
    println!("Valid sections: {}", valid.len());
    for id in &invalid {
        if let Some(section) = template.section(*id) {
            println!("  -> Incomplete: \"{}\" ({})", section.full_title(), id);
        }
    }

    let complete = template
        .validate_data(answers)
        .unwrap_or_else(|e| exit_with_error(&format!("Validation failed: {}", e)));
    println!(
        "Template is {}",
        if complete { "completely answered!" } else { "not complete yet." }
    );
}

fn write_artifact(template: &Template, out: &str) {
    fs::create_dir_all(out)
        .unwrap_or_else(|e| exit_with_error(&format!("Failed to create '{}': {}", out, e)));
    let artifact = template
        .generate_graph_artifact()
        .unwrap_or_else(|e| exit_with_error(&format!("Artifact generation failed: {}", e)));

    let path = format!("{}/graphs.bin", out);
    artifact
        .save(&path)
        .unwrap_or_else(|e| exit_with_error(&format!("Failed to save artifact: {}", e)));

    let paths: usize = artifact.sections.iter().map(|s| s.paths.len()).sum();
    println!(
        "\nWrote artifact for {} sections ({} paths) to '{}'",
        artifact.sections.len(),
        paths,
        path
    );
}

/// Runs the CLI in non-interactive mode, taking all arguments from the command line.
fn run_non_interactive(cli: Cli) {
    let template_path = cli.template_path.unwrap_or_else(|| {
        exit_with_error("Template path is required in non-interactive mode.");
    });
    let action = cli.action.unwrap_or(ActionCli::ShowBranching);

    run_action(
        template_path,
        cli.answers_path,
        action,
        &cli.sections,
        cli.debug,
        &cli.out,
    );
}

/// Runs the CLI in an interactive, human-friendly mode with prompts.
fn run_interactive(cli: &Cli) {
    println!("--- Veiviser Interactive Mode ---");

    let template_path = prompt_for_input("Enter template path", Some("data/template.json"));
    let answers_path_str = prompt_for_input("Enter answers path (optional)", None);
    let answers_path = if answers_path_str.is_empty() {
        None
    } else {
        Some(answers_path_str)
    };

    let action = loop {
        println!("\nPlease select an action:");
        println!("  1: Show branching sections");
        println!("  2: Dump section graphs (DOT)");
        println!("  3: Check template and answers");
        println!("  4: Write graph artifact");
        let choice_str = prompt_for_input("Enter choice", Some("1"));

        match choice_str.trim() {
            "1" => break ActionCli::ShowBranching,
            "2" => break ActionCli::DumpGraphs,
            "3" => break ActionCli::Check,
            "4" => break ActionCli::Artifact,
            _ => println!("Invalid choice. Please enter 1, 2, 3 or 4."),
        }
    };

    run_action(
        template_path,
        answers_path,
        action,
        &cli.sections,
        cli.debug,
        &cli.out,
    );
}

/// A helper function to prompt the user and read a line of input.
fn prompt_for_input(prompt_text: &str, default: Option<&str>) -> String {
    let mut line = String::new();
    let default_prompt = default.map_or("".to_string(), |d| format!(" [default: {}]", d));

    print!("> {}{}: ", prompt_text, default_prompt);
    io::stdout().flush().unwrap();

    io::stdin()
        .read_line(&mut line)
        .expect("Failed to read line");
    let trimmed = line.trim().to_string();

    if trimmed.is_empty() {
        default.unwrap_or("").to_string()
    } else {
        trimmed
    }
}

fn exit_with_error(message: &str) -> ! {
    eprintln!("\nError: {}", message);
    std::process::exit(1);
}
