use std::process::ExitCode;

use clap::{Parser, Subcommand};

use bfx::command;

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render SAM alignments as pairwise reference/query views
    #[command(visible_aliases = ["sam", "s2p"])]
    Sam2Pairwise(command::Sam2PairwiseCMD),
    /// Eyeball FASTQ records with quality bars and adapter dimming
    Fastq(command::FastqCMD),
    /// Preview a TSV file as a table
    Tsv(command::TsvCMD),
    /// List column names of a TSV file with example values
    Colname(command::ColnameCMD),
    /// Count lines, words and characters
    Wc(command::WcCMD),
    /// Count newlines with parallel readers
    Lc(command::LcCMD),
    /// Reverse complement sequences, IUPAC codes included
    Rc(command::RcCMD),
    /// Identify instrument and flowcell from read names
    Rname(command::RnameCMD),
    /// Check barcode uniformity across a sample sheet
    Checkbarcode(command::CheckBarcodeCMD),
    /// Merge two-column count files into one matrix
    Stats(command::StatsCMD),
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Sam2Pairwise(mut cmd) => cmd.try_execute(),
        Commands::Fastq(mut cmd) => cmd.try_execute(),
        Commands::Tsv(mut cmd) => cmd.try_execute(),
        Commands::Colname(mut cmd) => cmd.try_execute(),
        Commands::Wc(mut cmd) => cmd.try_execute(),
        Commands::Lc(mut cmd) => cmd.try_execute(),
        Commands::Rc(mut cmd) => cmd.try_execute(),
        Commands::Rname(mut cmd) => cmd.try_execute(),
        Commands::Checkbarcode(mut cmd) => cmd.try_execute(),
        Commands::Stats(mut cmd) => cmd.try_execute(),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        return ExitCode::FAILURE;
    }
    return ExitCode::SUCCESS;
}
