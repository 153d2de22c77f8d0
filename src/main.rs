#![allow(non_snake_case)]
use ComplexityCompass::Utils::logger::{init_logger, save_samples_to_csv, timestamped_log_name};
use ComplexityCompass::Utils::plots::{PlotSamples, plot_bounds, sample_bounds};
use ComplexityCompass::Utils::result_table::result_table;
use ComplexityCompass::asymptotic::analysis::AnalysisSession;
use ComplexityCompass::asymptotic::config::AnalysisConfig;
use ComplexityCompass::symbolic::parse_expr::INVALID_SYNTAX_WARNING;
use log::{error, info};
use std::io::{self, BufRead, Write};

const HELP: &str = "Enter a function of n (e.g. n^2 + 3*n*log(n) + 5).
Commands: :plot <file.png>  :csv <file.csv>  :help  :quit";

fn samples_of_last(session: &AnalysisSession, config: &AnalysisConfig) -> Option<PlotSamples> {
    let Some(analysis) = session.last() else {
        println!("nothing analyzed yet");
        return None;
    };
    let result = &analysis.result;
    Some(sample_bounds(
        &analysis.f,
        &analysis.g,
        &result.c_o,
        &result.c_omega,
        &config.plot,
    ))
}

fn main() {
    let config = match std::env::args().nth(1) {
        Some(path) => match AnalysisConfig::from_file(&path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("{}", e);
                std::process::exit(1);
            }
        },
        None => AnalysisConfig::default(),
    };
    let log_file = config.log_to_file.then(timestamped_log_name);
    init_logger(config.log_level, log_file.as_deref());
    info!("Complexity Compass started with {:?}", config);

    println!("{}", HELP);
    let mut session = AnalysisSession::new();
    let stdin = io::stdin();
    loop {
        print!("f(n) = ");
        let _ = io::stdout().flush();
        let mut line = String::new();
        match stdin.lock().read_line(&mut line) {
            Ok(0) => break,
            Ok(_) => {}
            Err(e) => {
                error!("cannot read input: {}", e);
                break;
            }
        }
        let line = line.trim();
        let (command, argument) = match line.split_once(char::is_whitespace) {
            Some((command, argument)) => (command, argument.trim()),
            None => (line, ""),
        };
        match command {
            "" => continue,
            ":quit" | ":q" => break,
            ":help" => println!("{}", HELP),
            ":plot" | ":csv" if argument.is_empty() => println!("usage: {} <file>", command),
            ":plot" => {
                if let Some(samples) = samples_of_last(&session, &config) {
                    match plot_bounds(&samples, argument) {
                        Ok(()) => println!("plot saved to {}", argument),
                        Err(e) => error!("{}", e),
                    }
                }
            }
            ":csv" => {
                if let Some(samples) = samples_of_last(&session, &config) {
                    match save_samples_to_csv(&samples, argument) {
                        Ok(()) => println!("samples saved to {}", argument),
                        Err(e) => error!("{}", e),
                    }
                }
            }
            _ => match session.submit(line, &config) {
                Ok(next) => {
                    session = next;
                    if let Some(analysis) = session.last() {
                        println!("{}", result_table(analysis));
                    }
                }
                Err(e) => {
                    println!("{}", INVALID_SYNTAX_WARNING);
                    info!("rejected input '{}': {}", line, e);
                }
            },
        }
    }
    info!("Program ended");
}
