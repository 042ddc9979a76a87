//! Tests for the simulate subcommand.

use super::parse;
use crate::cli::{Cli, CliCommand};
use clap::Parser;

#[test]
fn cli_parse_simulate_defaults() {
    match parse(&["claim-retry", "simulate", "network error"]) {
        CliCommand::Simulate(args) => {
            assert_eq!(args.claim_id, "sim-claim");
            assert_eq!(args.tier, "common");
            assert_eq!(args.token_id, 0);
            assert!(!args.requires_proof);
            assert_eq!(args.queue_size, 0);
            assert_eq!(args.avg_processing_secs, 30);
            assert!(!args.json);
            assert_eq!(args.messages, vec!["network error".to_string()]);
        }
        _ => panic!("expected Simulate"),
    }
}

#[test]
fn cli_parse_simulate_flags() {
    match parse(&[
        "claim-retry",
        "simulate",
        "--claim-id",
        "badge-7",
        "--tier",
        "legendary",
        "--token-id",
        "7",
        "--requires-proof",
        "--queue-size",
        "12",
        "--avg-processing-secs",
        "5",
        "--json",
        "gas too low",
        "execution reverted",
    ]) {
        CliCommand::Simulate(args) => {
            assert_eq!(args.claim_id, "badge-7");
            assert_eq!(args.tier, "legendary");
            assert_eq!(args.token_id, 7);
            assert!(args.requires_proof);
            assert_eq!(args.queue_size, 12);
            assert_eq!(args.avg_processing_secs, 5);
            assert!(args.json);
            assert_eq!(args.messages, vec!["gas too low", "execution reverted"]);
        }
        _ => panic!("expected Simulate with flags"),
    }
}

#[test]
fn cli_simulate_requires_a_message() {
    assert!(Cli::try_parse_from(["claim-retry", "simulate"]).is_err());
}
