//! CLI arguments for the `swap-to-price` binary.

use {
    crate::domain::eth::{Address, U256},
    clap::{Parser, Subcommand},
    std::path::PathBuf,
};

/// Size and simulate trades that move a constant product pool to a target
/// price.
#[derive(Parser, Debug)]
#[command(version)]
pub struct Args {
    /// The log filter.
    #[arg(long, env, default_value = "info")]
    pub log: String,

    /// Output log events as JSON.
    #[arg(long, env)]
    pub log_json: bool,

    /// Path to the scenario file describing the tokens, pools and
    /// contracts to simulate against. This file should be in TOML format.
    #[arg(long, env)]
    pub config: PathBuf,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print the trade that would move a pool to the target price.
    Quote {
        #[command(flatten)]
        target: Target,
    },
    /// Execute the trade against the scenario ledger as its owner and print
    /// the resulting balances and reserves.
    Simulate {
        #[command(flatten)]
        target: Target,

        /// Maximum amount of token A to sell. Unlimited if omitted.
        #[arg(long)]
        max_spend_a: Option<U256>,

        /// Maximum amount of token B to sell. Unlimited if omitted.
        #[arg(long)]
        max_spend_b: Option<U256>,

        /// Seconds from now after which the swap must not execute anymore.
        #[arg(long, default_value = "300")]
        deadline_secs: u32,

        /// Receiver of the proceeds. Defaults to the scenario owner.
        #[arg(long)]
        recipient: Option<Address>,

        /// Print the collected metrics after the report.
        #[arg(long)]
        metrics: bool,
    },
}

/// The pool and the price to move it to. The pool is on target when
/// `reserve_a : reserve_b == numerator : denominator`.
#[derive(clap::Args, Debug)]
pub struct Target {
    /// Symbol or address of token A.
    #[arg(long)]
    pub token_a: String,

    /// Symbol or address of token B.
    #[arg(long)]
    pub token_b: String,

    #[arg(long)]
    pub numerator: U256,

    #[arg(long)]
    pub denominator: U256,
}
