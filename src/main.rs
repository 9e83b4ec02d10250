use clap::Parser;
use std::fs;
use transcript_edit::{
    EditConfig, EditEngine, EditRequest, EditResponse, generate_execution_id, read_transcript,
    write_transcript,
};

/// Apply one segment edit to a time-aligned transcript document
#[derive(Parser, Debug)]
#[command(name = "transcript-edit")]
#[command(version = "0.1.0")]
#[command(about = "Split, merge and retime transcript segments", long_about = None)]
struct Args {
    /// Transcript JSON document to edit
    #[arg(short, long)]
    file: String,

    /// JSON file containing the edit request (omit to read from stdin)
    #[arg(short, long)]
    edits: Option<String>,

    /// Engine configuration JSON (defaults apply when omitted)
    #[arg(short, long)]
    config: Option<String>,

    /// Output structured JSON instead of human-readable
    #[arg(short, long)]
    json: bool,

    /// Write output to file instead of stdout
    #[arg(short, long)]
    output: Option<String>,

    /// Persist the edited transcript back to --file
    #[arg(long)]
    in_place: bool,
}

fn main() {
    env_logger::init();

    let args = Args::parse();
    let response = run(&args);

    output_response(&response, args.json, args.output.as_ref());

    if !response.success {
        std::process::exit(1);
    }
}

fn run(args: &Args) -> EditResponse {
    let edit_request = match EditRequest::load(args.edits.as_deref()) {
        Ok(req) => req,
        Err(e) => return EditResponse::failure(generate_execution_id(), e.to_string()),
    };

    let execution_id = if edit_request.execution_id == "auto" {
        generate_execution_id()
    } else {
        edit_request.execution_id.clone()
    };

    let config = match args.config.as_ref().map(EditConfig::load).transpose() {
        Ok(config) => config.unwrap_or_default(),
        Err(e) => return EditResponse::failure(execution_id, e.to_string()),
    };

    let file = match read_transcript(&args.file) {
        Ok(file) => file,
        Err(e) => {
            return EditResponse::failure(
                execution_id,
                format!("Failed to read transcript '{}': {}", args.file, e),
            );
        }
    };

    if let Some(expected) = &edit_request.expected_checksum {
        if *expected != file.checksum {
            return EditResponse::failure(
                execution_id,
                format!("Checksum mismatch: expected {}, got {}", expected, file.checksum),
            );
        }
    }

    let operation = &edit_request.operation;
    if let Err(e) = file.transcript.validate() {
        log::error!("{} does not satisfy sequence invariants: {}", file.path, e);
        return EditResponse::rejected(execution_id, operation, &e);
    }

    let mut transcript = file.transcript;
    let mut engine = EditEngine::new(config);

    log::info!(
        "{}: applying {} to {}",
        execution_id,
        operation.name(),
        transcript.voice_data_id
    );

    let outcome = match transcript.apply(&mut engine, operation) {
        Ok(outcome) => outcome,
        Err(e) => return EditResponse::rejected(execution_id, operation, &e),
    };

    let final_checksum = if args.in_place {
        match write_transcript(&args.file, &transcript) {
            Ok(checksum) => Some(checksum),
            Err(e) => {
                return EditResponse::failure(
                    execution_id,
                    format!("Failed to write transcript '{}': {}", args.file, e),
                );
            }
        }
    } else {
        None
    };

    EditResponse::success(execution_id, operation, outcome, final_checksum)
}

/// Format and output the response
fn output_response(response: &EditResponse, json_mode: bool, output_path: Option<&String>) {
    let output = if json_mode {
        serde_json::to_string_pretty(response).unwrap_or_else(|_| {
            r#"{"error": "Failed to serialize response"}"#.to_string()
        })
    } else if response.success {
        let segments = response
            .outcome
            .as_ref()
            .map(|outcome| outcome.segments())
            .unwrap_or_default();

        let mut lines = vec![format!(
            "Applied {}",
            response.operation.as_deref().unwrap_or("edit")
        )];
        for segment in segments {
            lines.push(format!(
                "  {} [{:.2}, {:.2}) {}",
                segment.id,
                segment.start,
                segment.end(),
                segment.transcript(" ")
            ));
        }
        if let Some(checksum) = &response.final_checksum {
            lines.push(format!("Final checksum: {}", checksum));
        }
        lines.join("\n")
    } else {
        match &response.error_kind {
            Some(kind) => format!(
                "Error ({}): {}",
                kind,
                response.error.as_deref().unwrap_or("Unknown error")
            ),
            None => format!("Error: {}", response.error.as_deref().unwrap_or("Unknown error")),
        }
    };

    if let Some(path) = output_path {
        if let Err(e) = fs::write(path, &output) {
            eprintln!("Failed to write output to '{}': {}", path, e);
            std::process::exit(1);
        }
    } else {
        println!("{}", output);
    }
}
