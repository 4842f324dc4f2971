//! A small CLI tool for preparing and checking commit-reveal ballots offline.
//! It uses the server's own digest function, so its output can be submitted
//! directly to `POST /elections/<election_id>/commit`.

use std::str::FromStr;

use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};

use ballotbox_backend::model::{
    common::{CandidateId, Identity},
    election::CommitHash,
};

const PROGRAM_NAME: &str = "commitment-cli";

const ABOUT_TEXT: &str = "Prepare and check commit-reveal ballot commitments.

EXIT CODES:
     0: Success, or the commitment matches.
   255: Ran successfully, but the commitment does not match.
 Other: Error.";

const COMMIT: &str = "commit";
const VERIFY: &str = "verify";

const CANDIDATE: &str = "candidate";
const IDENTITY: &str = "identity";
const NONCE: &str = "nonce";
const HASH: &str = "hash";

fn candidate_arg() -> Arg {
    Arg::new(CANDIDATE)
        .long(CANDIDATE)
        .help("The ID of the candidate to vote for")
        .value_parser(value_parser!(CandidateId))
        .action(ArgAction::Set)
        .required(true)
}

fn identity_arg() -> Arg {
    Arg::new(IDENTITY)
        .long(IDENTITY)
        .help("The voter identity the commitment is bound to")
        .action(ArgAction::Set)
        .required(true)
}

fn nonce_arg() -> Arg {
    Arg::new(NONCE)
        .long(NONCE)
        .help("The secret nonce, as a decimal 128-bit integer")
        .value_parser(value_parser!(u128))
        .action(ArgAction::Set)
}

/// Construct the CLI configuration.
fn cli() -> Command {
    // Make the build dirty when the toml changes.
    include_str!("../Cargo.toml");

    clap::command!(PROGRAM_NAME)
        .about(ABOUT_TEXT)
        .subcommand_required(true)
        .subcommand(
            Command::new(COMMIT)
                .about("Print a nonce and the commitment to submit. A random nonce is drawn if none is given.")
                .arg(candidate_arg())
                .arg(identity_arg())
                .arg(nonce_arg()),
        )
        .subcommand(
            Command::new(VERIFY)
                .about("Check that a commitment opens to the given ballot")
                .arg(candidate_arg())
                .arg(identity_arg())
                .arg(nonce_arg().required(true))
                .arg(
                    Arg::new(HASH)
                        .long(HASH)
                        .help("The commitment, as hex with an optional 0x prefix")
                        .action(ArgAction::Set)
                        .required(true),
                ),
        )
}

/// Errors that this program may produce.
#[derive(Debug, Eq, PartialEq)]
enum Error {
    /// An argument was syntactically valid but unusable.
    Input(String),
}

/// A ballot as the voter will later reveal it.
#[derive(Debug, Eq, PartialEq)]
struct Opening {
    candidate_id: CandidateId,
    identity: Identity,
    nonce: u128,
}

impl Opening {
    fn commit(&self) -> CommitHash {
        CommitHash::compute(self.candidate_id, self.nonce, &self.identity)
    }
}

fn opening(args: &ArgMatches) -> Result<Opening, Error> {
    // Required arguments are guaranteed to be present.
    let candidate_id = *args.get_one::<CandidateId>(CANDIDATE).unwrap();
    let identity = args.get_one::<String>(IDENTITY).unwrap();
    let identity = Identity::new(identity.as_str()).map_err(|e| Error::Input(e.to_string()))?;
    let nonce = args
        .get_one::<u128>(NONCE)
        .copied()
        .unwrap_or_else(rand::random);
    Ok(Opening {
        candidate_id,
        identity,
        nonce,
    })
}

/// Does the opening described by `args` match the given commitment?
fn verify(args: &ArgMatches) -> Result<bool, Error> {
    let opening = opening(args)?;
    let hash = args.get_one::<String>(HASH).unwrap();
    let expected = CommitHash::from_str(hash).map_err(|e| Error::Input(e.to_string()))?;
    Ok(opening.commit() == expected)
}

/// Run the requested command, report the result, and return the exit code.
fn run(args: &ArgMatches) -> u8 {
    let result = match args.subcommand() {
        Some((COMMIT, args)) => opening(args).map(|opening| {
            println!("nonce: {}", opening.nonce);
            println!("commitment: {}", opening.commit());
            0
        }),
        Some((VERIFY, args)) => verify(args).map(|matches| {
            if matches {
                println!("Commitment matches.");
                0
            } else {
                println!("Commitment does not match.");
                255
            }
        }),
        // `subcommand_required` rules this out.
        _ => unreachable!(),
    };
    result.unwrap_or_else(|Error::Input(msg)| {
        println!("Invalid input: {}", msg);
        1
    })
}

fn main() {
    let args = cli().get_matches();
    let exit_code = run(&args);
    std::process::exit(exit_code.into())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn known_commitment() -> String {
        let identity = Identity::new("v1").unwrap();
        CommitHash::compute(1, 42, &identity).to_string()
    }

    fn matches(command_line: &[&str]) -> ArgMatches {
        cli().try_get_matches_from(command_line).unwrap()
    }

    #[test]
    fn commit_is_deterministic_with_a_nonce() {
        log4rs_test_utils::test_logging::init_logging_once_for(["ballotbox_backend"], None, None);

        let args = matches(&[
            PROGRAM_NAME,
            COMMIT,
            "--candidate",
            "1",
            "--identity",
            "v1",
            "--nonce",
            "42",
        ]);
        let (_, args) = args.subcommand().unwrap();
        let opening = opening(args).unwrap();
        assert_eq!(opening.nonce, 42);
        assert_eq!(opening.commit().to_string(), known_commitment());
        assert_eq!(run(&matches(&[
            PROGRAM_NAME,
            COMMIT,
            "--candidate",
            "1",
            "--identity",
            "v1",
        ])), 0);
    }

    #[test]
    fn random_nonces_differ() {
        let command_line = [PROGRAM_NAME, COMMIT, "--candidate", "0", "--identity", "v1"];
        let first = matches(&command_line);
        let second = matches(&command_line);
        let first = opening(first.subcommand().unwrap().1).unwrap();
        let second = opening(second.subcommand().unwrap().1).unwrap();
        assert_ne!(first.nonce, second.nonce);
        assert_ne!(first.commit(), second.commit());
    }

    #[test]
    fn verification_exit_codes() {
        log4rs_test_utils::test_logging::init_logging_once_for(["ballotbox_backend"], None, None);

        let hash = known_commitment();
        let upper = format!("0x{}", hash.to_uppercase());
        let verify_with = |candidate: &str, nonce: &str, hash: &str| {
            run(&matches(&[
                PROGRAM_NAME,
                VERIFY,
                "--candidate",
                candidate,
                "--identity",
                "v1",
                "--nonce",
                nonce,
                "--hash",
                hash,
            ]))
        };

        assert_eq!(verify_with("1", "42", &hash), 0);
        assert_eq!(verify_with("1", "42", &upper), 0);
        assert_eq!(verify_with("0", "42", &hash), 255);
        assert_eq!(verify_with("1", "43", &hash), 255);
        assert_eq!(verify_with("1", "42", "not hex"), 1);
        assert_eq!(verify_with("1", "42", "abcd"), 1);
    }

    #[test]
    fn bad_cli_usage() {
        // No subcommand.
        cli().try_get_matches_from([PROGRAM_NAME]).unwrap_err();

        // Verification needs a nonce and a hash.
        cli()
            .try_get_matches_from([PROGRAM_NAME, VERIFY, "--candidate", "1", "--identity", "v1"])
            .unwrap_err();

        // Candidate IDs are unsigned.
        cli()
            .try_get_matches_from([PROGRAM_NAME, COMMIT, "--candidate", "-1", "--identity", "v1"])
            .unwrap_err();

        // Blank identities parse, but are rejected.
        assert_eq!(
            run(&matches(&[PROGRAM_NAME, COMMIT, "--candidate", "1", "--identity", " "])),
            1
        );
    }
}
