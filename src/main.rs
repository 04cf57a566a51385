use anyhow::Context;
use clap::Parser;
use precip_processor::cli::{Args, setup_logging};
use precip_processor::report::{self, ConsoleReport, ReportCollector, TableExport, TextReport};
use precip_processor::{PrecipError, PrecipProcessor};
use std::process;

fn main() {
    let args = Args::parse();
    setup_logging(&args);

    let runtime = tokio::runtime::Runtime::new().unwrap_or_else(|e| {
        eprintln!("Failed to create async runtime: {}", e);
        process::exit(1);
    });

    let result = runtime.block_on(async {
        tokio::select! {
            result = run(&args) => result,
            _ = tokio::signal::ctrl_c() => {
                eprintln!("\nReceived CTRL+C, shutting down...");
                Err(PrecipError::processing_interrupted("Processing interrupted by user").into())
            }
        }
    });

    match result {
        Ok(()) => process::exit(0),
        Err(error) => {
            eprintln!("Error: {:#}", error);
            process::exit(1);
        }
    }
}

async fn run(args: &Args) -> anyhow::Result<()> {
    let config = args.to_config().context("Invalid configuration")?;

    let processor = PrecipProcessor::new(args.directory.clone(), config)
        .with_context(|| format!("Cannot scan {}", args.directory.display()))?;
    let scan = processor.process().await?;

    let mut collectors: Vec<Box<dyn ReportCollector>> = Vec::new();
    if !args.quiet {
        collectors.push(Box::new(ConsoleReport::new()));
    }
    if !args.no_files {
        collectors.push(Box::new(TextReport::new(args.output.clone())));
    }
    if args.csv || args.parquet {
        collectors.push(Box::new(
            TableExport::new(args.output.clone())
                .with_csv(args.csv)
                .with_parquet(args.parquet),
        ));
    }

    report::collect_all(&mut collectors, &scan).context("Failed to write reports")?;
    Ok(())
}
