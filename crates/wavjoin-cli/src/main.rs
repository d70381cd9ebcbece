//! wavjoin CLI - Command-line interface for PCM WAV containers
//!
//! This binary joins WAV files, wraps raw PCM streams, inspects headers and
//! assembles manifest-driven recordings.

use clap::Parser;
use std::process::ExitCode;

use wavjoin_cli::commands;
use wavjoin_cli::error_log::ErrorLog;

mod cli_args;

use cli_args::{sort_order, Cli, Commands};

fn main() -> ExitCode {
    let cli = Cli::parse();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
        .format_timestamp_millis()
        .init();

    let error_log = if cli.no_log_file {
        ErrorLog::disabled()
    } else {
        ErrorLog::to_file(&cli.log_file)
    };

    let result = match cli.command {
        Commands::Join {
            inputs,
            output,
            sort,
            sort_numeric,
            max_workers,
            format,
            report,
            json,
        } => {
            let options = commands::join::JoinOptions {
                inputs,
                output,
                sort: sort_order(sort, sort_numeric),
                max_workers,
                override_format: format.resolve(),
                report,
                json,
            };
            commands::join::run(&options, &error_log)
        }
        Commands::Inspect { file, json } => commands::inspect::run(&file, json),
        Commands::Wrap {
            raw,
            mime,
            output,
            json,
        } => commands::wrap::run(&raw, &mime, output.as_deref(), json, &error_log),
        Commands::Assemble {
            manifest,
            name,
            ids,
            out_dir,
            max_workers,
            no_individual,
            json,
        } => {
            let options = commands::assemble::AssembleOptions {
                manifest,
                name,
                ids,
                out_dir,
                max_workers,
                individual: !no_individual,
                json,
            };
            commands::assemble::run(&options, &error_log)
        }
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            error_log.record(format!("{:#}", e));
            eprintln!("{}: {:#}", colored::Colorize::red("error"), e);
            ExitCode::from(1)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use wavjoin_cli::input::SortOrder;
    use wavjoin_core::FormatParameters;

    #[test]
    fn test_cli_parses_join() {
        let cli = Cli::try_parse_from([
            "wavjoin",
            "join",
            "a.wav",
            "b.wav",
            "-o",
            "out.wav",
            "--sort-numeric",
        ])
        .unwrap();
        match cli.command {
            Commands::Join {
                inputs,
                output,
                sort,
                sort_numeric,
                max_workers,
                format,
                ..
            } => {
                assert_eq!(inputs, vec!["a.wav", "b.wav"]);
                assert_eq!(output, Some(PathBuf::from("out.wav")));
                assert_eq!(sort_order(sort, sort_numeric), SortOrder::Numeric);
                assert_eq!(max_workers, 5);
                assert!(format.resolve().is_none());
            }
            _ => panic!("expected join command"),
        }
        assert_eq!(cli.log_file, PathBuf::from("logs.txt"));
        assert!(!cli.no_log_file);
    }

    #[test]
    fn test_cli_join_override_flags() {
        let cli = Cli::try_parse_from([
            "wavjoin", "join", "a.wav", "--channels", "2", "--rate", "48000", "--bits", "24",
        ])
        .unwrap();
        match cli.command {
            Commands::Join { format, .. } => {
                assert_eq!(format.resolve(), Some(FormatParameters::pcm(2, 48000, 24)));
            }
            _ => panic!("expected join command"),
        }
    }

    #[test]
    fn test_cli_join_override_from_descriptor() {
        let cli = Cli::try_parse_from([
            "wavjoin",
            "join",
            "a.wav",
            "--format",
            "audio/L16;rate=22050",
        ])
        .unwrap();
        match cli.command {
            Commands::Join { format, .. } => {
                assert_eq!(format.resolve(), Some(FormatParameters::mono(22050)));
            }
            _ => panic!("expected join command"),
        }
    }

    #[test]
    fn test_cli_rejects_partial_override() {
        assert!(Cli::try_parse_from(["wavjoin", "join", "a.wav", "--rate", "8000"]).is_err());
        assert!(Cli::try_parse_from([
            "wavjoin", "join", "a.wav", "--channels", "1", "--rate", "8000", "--bits", "12",
        ])
        .is_err());
        assert!(Cli::try_parse_from([
            "wavjoin", "join", "a.wav", "--channels", "1", "--rate", "8000", "--bits", "16",
            "--format", "audio/L16",
        ])
        .is_err());
    }

    #[test]
    fn test_cli_requires_inputs() {
        assert!(Cli::try_parse_from(["wavjoin", "join"]).is_err());
    }

    #[test]
    fn test_cli_parses_assemble() {
        let cli = Cli::try_parse_from([
            "wavjoin",
            "--no-log-file",
            "assemble",
            "manifest.json",
            "lesson",
            "--ids",
            "a",
            "b",
            "--no-individual",
        ])
        .unwrap();
        assert!(cli.no_log_file);
        match cli.command {
            Commands::Assemble {
                manifest,
                name,
                ids,
                out_dir,
                no_individual,
                ..
            } => {
                assert_eq!(manifest, PathBuf::from("manifest.json"));
                assert_eq!(name, "lesson");
                assert_eq!(ids, Some(vec!["a".to_string(), "b".to_string()]));
                assert_eq!(out_dir, PathBuf::from("."));
                assert!(no_individual);
            }
            _ => panic!("expected assemble command"),
        }
    }

    #[test]
    fn test_cli_parses_wrap() {
        let cli = Cli::try_parse_from(["wavjoin", "wrap", "chunk.pcm", "--mime", "audio/L16"]).unwrap();
        match cli.command {
            Commands::Wrap { raw, mime, output, json } => {
                assert_eq!(raw, PathBuf::from("chunk.pcm"));
                assert_eq!(mime, "audio/L16");
                assert!(output.is_none());
                assert!(!json);
            }
            _ => panic!("expected wrap command"),
        }
    }
}
