use {
    crate::{
        domain::{
            chain::Chain,
            eth::{Deadline, TokenAddress, U256},
            executor::{GuardedExecutor, Outcome, SpendCaps, SwapToPrice},
            sizing::{self, Direction, Price},
        },
        infra::{
            cli,
            config::{self, Scenario},
            ledger::{Ledger, Transaction},
            observe,
            report,
        },
    },
    anyhow::{Context, Result},
    chrono::{Duration, Utc},
    clap::Parser,
};

pub async fn start(args: impl Iterator<Item = String>) {
    let args = cli::Args::parse_from(args);
    ::observe::tracing::initialize(&::observe::Config::new(&args.log, None, args.log_json));
    ::observe::metrics::setup_registry(Some("swap_to_price".to_owned()), None);
    tracing::info!("running swap-to-price with {args:#?}");

    if let Err(err) = run(args).await {
        tracing::error!(?err, "swap-to-price failed");
        std::process::exit(1);
    }
}

/// Loads the scenario, deploys it to a fresh ledger and executes the
/// command, printing its report as JSON.
pub async fn run(args: cli::Args) -> Result<()> {
    let scenario = config::file::load(&args.config).await;
    let ledger = Ledger::default();
    ledger.transact(|tx| tx.deploy_scenario(&scenario))?;
    let executor = GuardedExecutor::new(scenario.executor);

    let report = match args.command {
        cli::Command::Quote { target } => {
            let target = Target::resolve(&scenario, &target)?;
            serde_json::to_string_pretty(&quote(&ledger, &executor, &target)?)?
        }
        cli::Command::Simulate {
            target,
            max_spend_a,
            max_spend_b,
            deadline_secs,
            recipient,
            metrics,
        } => {
            let target = Target::resolve(&scenario, &target)?;
            let request = SwapToPrice {
                token_a: target.token_a,
                token_b: target.token_b,
                price: target.price,
                max_spend: SpendCaps {
                    a: max_spend_a.unwrap_or(U256::MAX),
                    b: max_spend_b.unwrap_or(U256::MAX),
                },
                recipient: recipient.unwrap_or(scenario.owner),
                deadline: Deadline(Utc::now() + Duration::seconds(deadline_secs.into())),
            };
            let simulation = simulate(&ledger, &executor, &scenario, &request)?;
            let mut report = serde_json::to_string_pretty(&simulation)?;
            if metrics {
                report.push('\n');
                report.push_str(&::observe::metrics::encode(
                    ::observe::metrics::get_registry(),
                ));
            }
            report
        }
    };

    println!("{report}");
    Ok(())
}

struct Target {
    token_a: TokenAddress,
    token_b: TokenAddress,
    price: Price,
}

impl Target {
    fn resolve(scenario: &Scenario, target: &cli::Target) -> Result<Self> {
        let token = |token: &str| {
            scenario
                .token(token)
                .with_context(|| format!("unknown token {token}"))
        };
        Ok(Self {
            token_a: token(&target.token_a)?,
            token_b: token(&target.token_b)?,
            price: Price::new(target.numerator, target.denominator),
        })
    }
}

fn quote(ledger: &Ledger, executor: &GuardedExecutor, target: &Target) -> Result<report::Quote> {
    ledger.view(|tx| -> Result<_> {
        let (pool, trade) = executor.quote(tx, target.token_a, target.token_b, target.price)?;
        let trade = if trade.is_noop() {
            None
        } else {
            let (token_in, token_out) = match trade.direction {
                Direction::AToB => (target.token_a, target.token_b),
                Direction::BToA => (target.token_b, target.token_a),
            };
            let (reserve_in, reserve_out) = match trade.direction {
                Direction::AToB => (pool.reserves.a, pool.reserves.b),
                Direction::BToA => (pool.reserves.b, pool.reserves.a),
            };
            let amount_out =
                sizing::amount_out(trade.amount_in, reserve_in, reserve_out, executor.fee())
                    .context("output amount overflows")?;
            Some(report::Trade {
                direction: trade.direction,
                token_in: name(tx, token_in),
                token_out: name(tx, token_out),
                amount_in: trade.amount_in,
                amount_out,
            })
        };
        Ok(report::Quote {
            pool: pool.into(),
            trade,
        })
    })
}

fn simulate(
    ledger: &Ledger,
    executor: &GuardedExecutor,
    scenario: &Scenario,
    request: &SwapToPrice,
) -> Result<report::Simulation> {
    let pool = |ledger: &Ledger| {
        ledger.view(|tx| {
            executor
                .quote(tx, request.token_a, request.token_b, request.price)
                .map(|(pool, _)| report::Pool::from(pool))
        })
    };

    // Failures are reported by the swap itself, which validates its request
    // before reading the pool.
    let before = pool(ledger);
    let outcome = ledger.transact(|tx| executor.swap_to_price(tx, scenario.owner, request))?;
    let before = before?;
    let after = pool(ledger)?;

    ledger.view(|tx| -> Result<_> {
        let trade = match outcome {
            Outcome::NoOp => None,
            Outcome::Swapped(swap) => Some(report::Trade {
                direction: swap.direction,
                token_in: name(tx, swap.token_in),
                token_out: name(tx, swap.token_out),
                amount_in: swap.amount_in,
                amount_out: swap.amount_out,
            }),
        };
        Ok(report::Simulation {
            outcome: outcome.label(),
            trade,
            before,
            after,
            recipient: report::Balances {
                owner: request.recipient,
                token_a: tx.balance_of(request.token_a, request.recipient),
                token_b: tx.balance_of(request.token_b, request.recipient),
            },
        })
    })
}

/// The symbol of a token, or its address if it has none.
fn name(tx: &Transaction, token: TokenAddress) -> String {
    tx.symbol(token)
        .map(str::to_owned)
        .unwrap_or_else(|| token.to_string())
}
