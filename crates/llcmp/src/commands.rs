//! Command implementation: run the comparison and print the row.

use std::error::Error;

use llcmp::{CompareOptions, RunConfig, compare};
use tracing::{error, info};

use crate::cli::{Cli, EXIT_FAILURE, EXIT_SUCCESS};
use crate::terminal::{self, Spinner};

/// Validate inputs, compare both toolchains and print the result row.
pub fn run_command(cli: &Cli) -> i32 {
    let inputs = match cli.inputs() {
        Ok(inputs) => inputs,
        Err(flag) => {
            terminal::error(&format!("{flag} is not specified"));
            eprint!("{}", Cli::usage());
            return EXIT_FAILURE;
        }
    };

    info!(test = %inputs.test.display(), "running test");

    let options = CompareOptions::new()
        .with_run_config(RunConfig::new().with_tool(cli.tool.as_str()))
        .with_warmup_runs(cli.warmup_runs)
        .with_parallel(cli.parallel);

    let spinner =
        (!cli.silent).then(|| Spinner::new(format!("comparing {}", inputs.test.display())));

    match compare(inputs.t1, inputs.t2, inputs.test, &options) {
        Ok(comparison) => {
            if let Some(spinner) = spinner {
                spinner.finish_with_success(&format!("compared {}", comparison.test_name));
            }
            println!("{comparison}");
            EXIT_SUCCESS
        }
        Err(err) => {
            let message = error_chain(&err);
            match spinner {
                Some(spinner) => spinner.finish_with_failure(&message),
                None => terminal::error(&message),
            }
            error!(
                t1 = %inputs.t1.display(),
                t2 = %inputs.t2.display(),
                test = %inputs.test.display(),
                error = %message,
                "comparison failed"
            );
            EXIT_FAILURE
        }
    }
}

/// Join an error with all of its sources: `outer: inner: root`.
fn error_chain(err: &dyn Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}
