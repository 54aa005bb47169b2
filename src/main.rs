use std::env;
use std::fs;

use veiviser::data::load_answers;
use veiviser::prelude::*;

fn main() {
    // Create output directory
    const TMP_DIR: &str = "tmp";
    if let Err(e) = fs::create_dir_all(TMP_DIR) {
        eprintln!("Failed to create tmp directory: {}", e);
        std::process::exit(1);
    }
    println!("Created output directory at '{}'", TMP_DIR);

    // Parse command line arguments
    let args: Vec<String> = env::args().collect();
    if args.len() < 2 || args.len() > 3 {
        eprintln!("Usage: cargo run -- <path/to/template.json> [path/to/answers.json]");
        std::process::exit(1);
    }

    let template_path = &args[1];
    let answers_path = args.get(2);

    println!("Loading template from: {}", template_path);

    // Load and build the template
    let definition = match TemplateDefinition::from_file(template_path) {
        Ok(definition) => definition,
        Err(e) => {
            eprintln!("Failed to read template file '{}': {}", template_path, e);
            std::process::exit(1);
        }
    };

    let template = match Template::builder(definition).build() {
        Ok(template) => template,
        Err(e) => {
            eprintln!("Template build failed: {}", e);
            std::process::exit(1);
        }
    };

    println!(
        "Built template '{}': {} sections, {} questions",
        template.title(),
        template.ordered_sections().len(),
        template.questions().len()
    );

    // Per-section branching summary and graph files
    println!("\nSection Graphs");
    for section in template.ordered_sections() {
        let map = section.generate_transition_map();
        println!(
            "  -> Section #{} '{}': {} transitions{}",
            section.id(),
            section.full_title(),
            map.len(),
            if section.branching() { " (branching)" } else { "" }
        );

        let dot_path = format!("{}/{}", TMP_DIR, section.dot_source_filename());
        if let Err(e) = fs::write(&dot_path, section.generate_dot_source(false)) {
            eprintln!("Failed to write graph file '{}': {}", dot_path, e);
            std::process::exit(1);
        }
        println!("     Wrote graph source to '{}'", dot_path);
    }

    // Without answers there is nothing left to do
    let Some(answers_path) = answers_path else {
        println!("\nNo answers file provided. Done.");
        return;
    };

    println!("\nLoading answers from: {}", answers_path);
    let answers = match load_answers(answers_path) {
        Ok(answers) => answers,
        Err(e) => {
            eprintln!("Failed to load answers from '{}': {}", answers_path, e);
            std::process::exit(1);
        }
    };

    let unknown = template.list_unknown_answers(&answers);
    if !unknown.is_empty() {
        println!("  -> Answers not matching any question: {:?}", unknown);
    }

    // Replay the answers through the graph
    println!("\nTraversal Replay");
    let mut current = template.first_question();
    let limit = template.questions().len();
    let mut visited = 0;
    while let Some(question) = current {
        let marker = if question.is_answered(&answers) { "answered" } else { "open" };
        println!("  -> q{} [{}]: {}", question.id(), marker, question);

        visited += 1;
        if visited > limit {
            println!("  -> Stopping: more steps than questions, graph cycles back");
            break;
        }
        current = match question.next_question(&answers, false) {
            Ok(next) => next,
            Err(e) => {
                println!("  -> Stopping: {}", e);
                break;
            }
        };
    }

    // Validity report
    println!("\nValidity");
    match template.find_validity_of_sections(&answers) {
        Ok((valid, invalid)) => {
            println!("  -> Valid sections: {}", valid.len());
            for id in &invalid {
                if let Some(section) = template.section(*id) {
                    println!("  -> Incomplete: #{} '{}'", id, section.full_title());
                }
            }
        }
        Err(e) => {
            eprintln!("Validity check failed: {}", e);
            std::process::exit(1);
        }
    }

    match template.validate_data(&answers) {
        Ok(true) => println!("\nTemplate is completely answered!"),
        Ok(false) => println!("\nTemplate is not complete yet."),
        Err(e) => {
            eprintln!("Validation failed: {}", e);
            std::process::exit(1);
        }
    }
    println!();
}
